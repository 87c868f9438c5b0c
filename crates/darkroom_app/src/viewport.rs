use std::collections::BTreeSet;

use darkroom_core::PhotoId;

/// Fixed-height window over the photo ids, in listing order. Scrolling
/// moves the top row; the window never extends past either end.
pub(crate) struct Viewport {
    ids: Vec<PhotoId>,
    height: usize,
    top: usize,
}

impl Viewport {
    pub(crate) fn new(ids: Vec<PhotoId>, height: usize) -> Self {
        Self {
            ids,
            height: height.max(1),
            top: 0,
        }
    }

    pub(crate) fn visible(&self) -> BTreeSet<PhotoId> {
        let end = (self.top + self.height).min(self.ids.len());
        self.ids[self.top..end].iter().copied().collect()
    }

    pub(crate) fn scroll_to(&mut self, top: usize) {
        self.top = top.min(self.max_top());
    }

    pub(crate) fn scroll_by(&mut self, rows: usize) {
        self.scroll_to(self.top + rows);
    }

    pub(crate) fn at_bottom(&self) -> bool {
        self.top >= self.max_top()
    }

    fn max_top(&self) -> usize {
        self.ids.len().saturating_sub(self.height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn window_covers_the_first_rows() {
        let viewport = Viewport::new(vec![1, 2, 3, 4, 5, 6], 4);
        assert_eq!(viewport.visible(), [1, 2, 3, 4].into());
        assert!(!viewport.at_bottom());
    }

    #[test]
    fn scrolling_clamps_at_the_bottom() {
        let mut viewport = Viewport::new(vec![1, 2, 3, 4, 5, 6], 4);
        viewport.scroll_to(100);
        assert_eq!(viewport.visible(), [3, 4, 5, 6].into());
        assert!(viewport.at_bottom());
    }

    #[test]
    fn scroll_by_accumulates() {
        let mut viewport = Viewport::new(vec![1, 2, 3, 4, 5, 6], 2);
        viewport.scroll_by(1);
        viewport.scroll_by(2);
        assert_eq!(viewport.visible(), [4, 5].into());
    }

    #[test]
    fn short_lists_fit_in_one_window() {
        let viewport = Viewport::new(vec![1, 2], 4);
        assert_eq!(viewport.visible(), [1, 2].into());
        assert!(viewport.at_bottom());
    }

    #[test]
    fn empty_listing_yields_an_empty_window() {
        let viewport = Viewport::new(Vec::new(), 4);
        assert!(viewport.visible().is_empty());
        assert!(viewport.at_bottom());
    }
}
