use std::ops::Range;

/// The viewport grown by a margin in the scroll direction, so artwork starts
/// loading a little before a row actually scrolls into view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ObservationRegion {
    pub viewport_rows: usize,
    pub margin_rows: usize,
}

impl ObservationRegion {
    pub fn new(viewport_rows: usize, margin_rows: usize) -> Self {
        Self {
            viewport_rows: viewport_rows.max(1),
            margin_rows,
        }
    }

    /// Rows actually on screen when scrolled to `offset`.
    pub fn visible(&self, offset: usize, total: usize) -> Range<usize> {
        let start = offset.min(total);
        let end = offset.saturating_add(self.viewport_rows).min(total);
        start..end
    }

    /// Rows intersecting the observation region when scrolled to `offset`.
    pub fn intersecting(&self, offset: usize, total: usize) -> Range<usize> {
        let start = offset.saturating_sub(self.margin_rows).min(total);
        let end = offset
            .saturating_add(self.viewport_rows)
            .saturating_add(self.margin_rows)
            .min(total);
        start..end.max(start)
    }

    /// Largest offset that still fills the viewport.
    pub fn clamp_offset(&self, offset: usize, total: usize) -> usize {
        offset.min(total.saturating_sub(self.viewport_rows))
    }
}
