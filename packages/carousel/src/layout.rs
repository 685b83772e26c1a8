//! Responsive sizing and offset geometry.

use serde::{Deserialize, Serialize};

/// Viewport width above which four items are shown.
pub const WIDE_BREAKPOINT: f64 = 900.0;

/// Viewport width above which three items are shown.
pub const MEDIUM_BREAKPOINT: f64 = 600.0;

/// Number of items visible at once for a viewport width.
pub fn visible_count(viewport_width: f64) -> usize {
    if viewport_width > WIDE_BREAKPOINT {
        4
    } else if viewport_width > MEDIUM_BREAKPOINT {
        3
    } else {
        2
    }
}

/// Horizontal bounding box of a rendered item.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ItemRect {
    pub left: f64,
    pub width: f64,
}

impl ItemRect {
    pub fn new(left: f64, width: f64) -> Self {
        Self { left, width }
    }

    pub fn right(&self) -> f64 {
        self.left + self.width
    }
}

/// Distance between the left edges of consecutive items.
///
/// Measured from the first two items. The gap falls back to zero with fewer
/// than two items or when the measured gap is negative or not finite.
pub fn step_width(items: &[ItemRect]) -> f64 {
    let Some(first) = items.first() else {
        return 0.0;
    };

    let gap = items
        .get(1)
        .map(|second| second.left - first.right())
        .filter(|gap| gap.is_finite() && *gap > 0.0)
        .unwrap_or(0.0);

    first.width + gap
}

/// Translation to apply to the track for `position`.
pub fn offset_for(position: usize, items: &[ItemRect]) -> f64 {
    position as f64 * step_width(items)
}
