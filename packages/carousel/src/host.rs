//! The boundary between the engine and the page that renders carousels.

use serde::{Deserialize, Serialize};

use crate::gesture::Direction;
use crate::layout::ItemRect;

/// What a rendered element does for its carousel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Role {
    /// The scrolling row holding the items.
    Track,
    /// Swipeable wrapper around the track.
    Viewport,
    /// Arrow button.
    Button(Direction),
}

/// A carousel element found in the current markup.
///
/// `id` must identify the rendered element instance: markup that is torn
/// down and rendered again should come back with a fresh id so it gets
/// wired again.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Element {
    pub id: String,
    pub carousel: String,
    pub role: Role,
}

impl Element {
    pub fn new(id: impl Into<String>, carousel: impl Into<String>, role: Role) -> Self {
        Self {
            id: id.into(),
            carousel: carousel.into(),
            role,
        }
    }
}

/// Rendering surface the engine drives.
///
/// Implementations discover markup, measure it, apply offsets and wire
/// listeners. Listeners feed [`crate::CarouselEvent`]s back into the engine.
pub trait CarouselHost {
    /// Every carousel element currently present.
    fn scan(&self) -> Vec<Element>;

    fn viewport_width(&self) -> f64;

    /// Bounding boxes of the items in a carousel's track, in order.
    fn item_rects(&self, carousel: &str) -> Vec<ItemRect>;

    /// Translate a carousel's track by `-offset` pixels.
    fn apply_offset(&mut self, carousel: &str, offset: f64);

    /// Attach listeners to an element. Called at most once per element id.
    fn bind(&mut self, element: &Element);

    /// Toggle the visual dragging flag on a carousel's viewport.
    fn set_dragging(&mut self, _carousel: &str, _dragging: bool) {}
}
