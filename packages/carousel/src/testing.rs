//! Testing utilities: an in-memory [`CarouselHost`].
//!
//! `FakeHost` renders fixed-width items, records every bind, offset and
//! dragging flag, and lets tests add, replace or remove carousels the way an
//! asynchronously rendering view layer would.
//!
//! ```ignore
//! use carousel::{testing::FakeHost, CarouselEngine};
//!
//! let mut host = FakeHost::new(1024.0).with_carousel("featured", 10);
//! let mut engine = CarouselEngine::new();
//! engine.init(&mut host);
//! engine.advance(&mut host, "featured");
//! assert_eq!(host.offset("featured"), Some(216.0));
//! ```

use std::cell::Cell;
use std::collections::HashMap;

use crate::gesture::Direction;
use crate::host::{CarouselHost, Element, Role};
use crate::layout::ItemRect;

pub const ITEM_WIDTH: f64 = 200.0;
pub const ITEM_GAP: f64 = 16.0;

pub struct FakeHost {
    pub width: f64,
    items: HashMap<String, usize>,
    elements: Vec<Element>,
    generation: usize,
    binds: HashMap<String, usize>,
    offsets: HashMap<String, f64>,
    dragging: HashMap<String, bool>,
    scans: Cell<usize>,
}

impl FakeHost {
    pub fn new(width: f64) -> Self {
        Self {
            width,
            items: HashMap::new(),
            elements: Vec::new(),
            generation: 0,
            binds: HashMap::new(),
            offsets: HashMap::new(),
            dragging: HashMap::new(),
            scans: Cell::new(0),
        }
    }

    pub fn with_carousel(mut self, name: &str, item_count: usize) -> Self {
        self.insert_carousel(name, item_count);
        self
    }

    /// Render a carousel: track, viewport and both arrow buttons.
    pub fn insert_carousel(&mut self, name: &str, item_count: usize) {
        self.generation += 1;
        let g = self.generation;
        self.items.insert(name.to_string(), item_count);
        self.elements.extend([
            Element::new(format!("{name}-track-{g}"), name, Role::Track),
            Element::new(format!("{name}-viewport-{g}"), name, Role::Viewport),
            Element::new(format!("{name}-prev-{g}"), name, Role::Button(Direction::Prev)),
            Element::new(format!("{name}-next-{g}"), name, Role::Button(Direction::Next)),
        ]);
    }

    /// A lone arrow button, possibly naming a carousel that does not exist.
    pub fn insert_button(&mut self, id: &str, carousel: &str, direction: Direction) {
        self.elements
            .push(Element::new(id, carousel, Role::Button(direction)));
    }

    pub fn remove_carousel(&mut self, name: &str) {
        self.items.remove(name);
        self.elements.retain(|e| e.carousel != name);
    }

    /// Tear down and render again with fresh element ids.
    pub fn replace_carousel(&mut self, name: &str, item_count: usize) {
        self.remove_carousel(name);
        self.insert_carousel(name, item_count);
    }

    pub fn set_item_count(&mut self, name: &str, item_count: usize) {
        self.items.insert(name.to_string(), item_count);
    }

    pub fn elements(&self) -> &[Element] {
        &self.elements
    }

    pub fn bind_count(&self, element_id: &str) -> usize {
        self.binds.get(element_id).copied().unwrap_or(0)
    }

    pub fn total_binds(&self) -> usize {
        self.binds.values().sum()
    }

    pub fn max_binds_per_element(&self) -> usize {
        self.binds.values().copied().max().unwrap_or(0)
    }

    pub fn offset(&self, carousel: &str) -> Option<f64> {
        self.offsets.get(carousel).copied()
    }

    pub fn is_dragging(&self, carousel: &str) -> bool {
        self.dragging.get(carousel).copied().unwrap_or(false)
    }

    pub fn scan_count(&self) -> usize {
        self.scans.get()
    }
}

impl CarouselHost for FakeHost {
    fn scan(&self) -> Vec<Element> {
        self.scans.set(self.scans.get() + 1);
        self.elements.clone()
    }

    fn viewport_width(&self) -> f64 {
        self.width
    }

    fn item_rects(&self, carousel: &str) -> Vec<ItemRect> {
        let count = self.items.get(carousel).copied().unwrap_or(0);
        (0..count)
            .map(|i| ItemRect::new(i as f64 * (ITEM_WIDTH + ITEM_GAP), ITEM_WIDTH))
            .collect()
    }

    fn apply_offset(&mut self, carousel: &str, offset: f64) {
        self.offsets.insert(carousel.to_string(), offset);
    }

    fn bind(&mut self, element: &Element) {
        *self.binds.entry(element.id.clone()).or_insert(0) += 1;
    }

    fn set_dragging(&mut self, carousel: &str, dragging: bool) {
        self.dragging.insert(carousel.to_string(), dragging);
    }
}
