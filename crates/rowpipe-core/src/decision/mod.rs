//! Planning: what to sample, crop, scale and rotate before any pixel moves.

mod orientation;
mod resize;

pub use orientation::OrientationDecision;
pub use resize::{calculate_resize_decision, PrimaryRating, Rating, ResizeDecision};
