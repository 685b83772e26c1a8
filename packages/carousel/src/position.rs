//! Wrap-around paging state for a single carousel.

use serde::{Deserialize, Serialize};

/// Position of one carousel: index of the leftmost fully visible item.
///
/// The position always lies in `[0, max_position()]`. Advancing past the end
/// wraps to 0 and retreating before the start wraps to the last position.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CarouselState {
    pub position: usize,
    pub item_count: usize,
    pub visible_count: usize,
}

impl CarouselState {
    pub fn new(item_count: usize, visible_count: usize) -> Self {
        Self {
            position: 0,
            item_count,
            visible_count,
        }
    }

    pub fn max_position(&self) -> usize {
        self.item_count.saturating_sub(self.visible_count)
    }

    /// Apply freshly measured counts, clamping the position into range.
    pub fn resize(&mut self, item_count: usize, visible_count: usize) {
        self.item_count = item_count;
        self.visible_count = visible_count;
        self.position = self.position.min(self.max_position());
    }

    pub fn advance(&mut self) -> usize {
        self.position = if self.position >= self.max_position() {
            0
        } else {
            self.position + 1
        };
        self.position
    }

    pub fn retreat(&mut self) -> usize {
        self.position = if self.position == 0 {
            self.max_position()
        } else {
            self.position - 1
        };
        self.position
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_advance_wraps_after_max() {
        let mut state = CarouselState::new(10, 4);
        assert_eq!(state.max_position(), 6);

        for n in 1..=20 {
            state.advance();
            assert_eq!(state.position, n % 7, "after {} advances", n);
        }
    }

    #[test]
    fn test_retreat_wraps_to_max() {
        let mut state = CarouselState::new(10, 4);
        assert_eq!(state.retreat(), 6);
        assert_eq!(state.retreat(), 5);
    }

    #[test]
    fn test_fewer_items_than_visible() {
        let mut state = CarouselState::new(3, 4);
        assert_eq!(state.max_position(), 0);
        assert_eq!(state.advance(), 0);
        assert_eq!(state.retreat(), 0);
    }

    #[test]
    fn test_resize_clamps() {
        let mut state = CarouselState::new(10, 2);
        state.position = 8;
        state.resize(10, 4);
        assert_eq!(state.position, 6);
    }
}
