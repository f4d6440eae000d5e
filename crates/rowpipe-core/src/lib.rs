//! Rowpipe Core - resize planning and streaming scanline transforms
//!
//! This crate decides how to combine decoder sampling, cropping and scaling
//! to meet a size requirement, and executes the geometric and color
//! transforms one image row at a time between a decoder and an encoder.
//!
//! # Layers
//!
//! - [`geometry`], [`orientation`], [`pixel`]: value types
//! - [`requirements`]: what the caller asks for
//! - [`decision`]: how a given input will satisfy it
//! - [`proc`]: the streaming blocks that move pixels
//! - [`pipeline`]: wiring blocks between a source and a sink

pub mod config;
pub mod decision;
pub mod geometry;
pub mod orientation;
pub mod pipeline;
pub mod pixel;
pub mod proc;
pub mod requirements;

pub use config::{Configuration, SamplingMethod, DEFAULT_THRESHOLD_FOR_SKIPPING_SCALING};
pub use decision::{
    calculate_resize_decision, OrientationDecision, PrimaryRating, Rating, ResizeDecision,
};
pub use geometry::{GeometryError, Point, Ratio, Rect, RoundingMode, Size};
pub use orientation::Orientation;
pub use pipeline::{
    ImageBufferSink, ImageBufferSource, PipelineError, ScanlinePump, ScanlineSink, ScanlineSource,
    TransformPlan,
};
pub use pixel::{AlphaInfo, Color, ColorModel, ComponentsOrder, PixelSpecification, Scanline};
pub use proc::{Block, BlockError};
pub use requirements::{
    CropRequirement, RequirementError, ResizeMode, ResizeRequirement, RotateRequirement,
};
