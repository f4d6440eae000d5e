use crate::pixel::Scanline;

/// Rows indexed by row number, scanlines unless stated otherwise.
///
/// Rows arrive in order and are released through a monotonic low-water mark:
/// once `retire_below(y)` has run, rows under `y` are dropped and any row
/// that later arrives under the mark is discarded on arrival.
#[derive(Debug)]
pub(crate) struct RowStore<T = Scanline> {
    slots: Vec<Option<T>>,
    received: u32,
    retired_below: u32,
    buffered: usize,
    peak: usize,
}

impl<T> RowStore<T> {
    pub fn with_height(height: u32) -> Self {
        Self {
            slots: (0..height).map(|_| None).collect(),
            received: 0,
            retired_below: 0,
            buffered: 0,
            peak: 0,
        }
    }

    /// Store the next row.
    ///
    /// # Panics
    ///
    /// Panics if every row has already been received.
    pub fn push(&mut self, row: T) {
        let index = self.received;
        assert!(
            (index as usize) < self.slots.len(),
            "received more than {} rows",
            self.slots.len()
        );
        self.received += 1;
        if index < self.retired_below {
            return;
        }
        self.slots[index as usize] = Some(row);
        self.buffered += 1;
        self.peak = self.peak.max(self.buffered);
    }

    /// The row at `y`.
    ///
    /// # Panics
    ///
    /// Panics if the row has not arrived yet or was already retired.
    pub fn get(&self, y: u32) -> &T {
        match self.slots.get(y as usize).and_then(Option::as_ref) {
            Some(row) => row,
            None => panic!("row {y} is not buffered"),
        }
    }

    /// Drop every row under `y`.
    pub fn retire_below(&mut self, y: u32) {
        let end = y.min(self.slots.len() as u32);
        for index in self.retired_below..end {
            if self.slots[index as usize].take().is_some() {
                self.buffered -= 1;
            }
        }
        self.retired_below = self.retired_below.max(end);
    }

    pub fn retire_all(&mut self) {
        self.retire_below(self.slots.len() as u32);
    }

    /// Number of rows pushed so far, retired or not.
    #[inline]
    pub fn received(&self) -> u32 {
        self.received
    }

    #[inline]
    pub fn is_complete(&self) -> bool {
        self.received as usize == self.slots.len()
    }

    #[inline]
    pub fn buffered(&self) -> usize {
        self.buffered
    }

    /// Largest number of rows held at once.
    #[inline]
    pub fn peak(&self) -> usize {
        self.peak
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pixel::PixelSpecification;

    fn row(value: u8) -> Scanline {
        Scanline::from_bytes(PixelSpecification::GRAY, 1, vec![value]).unwrap()
    }

    #[test]
    fn test_push_and_get() {
        let mut store = RowStore::with_height(3);
        store.push(row(7));
        store.push(row(8));
        assert_eq!(store.get(1).data(), &[8]);
        assert_eq!(store.received(), 2);
        assert!(!store.is_complete());
        store.push(row(9));
        assert!(store.is_complete());
        assert_eq!(store.buffered(), 3);
    }

    #[test]
    fn test_retire_is_monotonic() {
        let mut store = RowStore::with_height(4);
        store.push(row(0));
        store.push(row(1));
        store.retire_below(1);
        assert_eq!(store.buffered(), 1);
        store.retire_below(0);
        assert_eq!(store.buffered(), 1);
        assert_eq!(store.get(1).data(), &[1]);
    }

    #[test]
    fn test_rows_under_mark_are_dropped_on_arrival() {
        let mut store = RowStore::with_height(4);
        store.retire_below(2);
        store.push(row(0));
        store.push(row(1));
        store.push(row(2));
        assert_eq!(store.buffered(), 1);
        assert_eq!(store.peak(), 1);
        assert_eq!(store.received(), 3);
    }

    #[test]
    fn test_retire_all_tracks_peak() {
        let mut store = RowStore::with_height(2);
        store.push(row(0));
        store.push(row(1));
        store.retire_all();
        assert_eq!(store.buffered(), 0);
        assert_eq!(store.peak(), 2);
    }

    #[test]
    fn test_holds_intermediate_rows() {
        let mut store: RowStore<Vec<i32>> = RowStore::with_height(3);
        store.push(vec![-1, 2]);
        store.push(vec![3, -4]);
        store.retire_below(1);
        assert_eq!(store.get(1), &vec![3, -4]);
        assert_eq!(store.buffered(), 1);
        assert_eq!(store.peak(), 2);
    }

    #[test]
    #[should_panic(expected = "not buffered")]
    fn test_get_retired_row_panics() {
        let mut store = RowStore::with_height(2);
        store.push(row(0));
        store.retire_below(1);
        store.get(0);
    }

    #[test]
    #[should_panic(expected = "received more than")]
    fn test_push_past_height_panics() {
        let mut store = RowStore::with_height(1);
        store.push(row(0));
        store.push(row(1));
    }
}
