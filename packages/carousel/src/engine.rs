//! Carousel engine: owns paging state, gesture trackers and the registry of
//! wired elements for every carousel on a page.
//!
//! The engine never reads the clock. Callers pass `Instant`s to the notify
//! methods and to [`CarouselEngine::tick`], which runs debounced work that
//! has come due.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::time::{Duration, Instant};

use serde::Serialize;
use tracing::{debug, trace};

use crate::debounce::Debouncer;
use crate::gesture::{Direction, GestureTracker, PointerEvent};
use crate::host::{CarouselHost, Element, Role};
use crate::layout::{offset_for, visible_count};
use crate::position::CarouselState;

/// Quiet period after the last resize before carousels reflow.
pub const RESIZE_DEBOUNCE: Duration = Duration::from_millis(100);

/// Quiet period after the last markup change before the page is re-scanned.
pub const RESCAN_DEBOUNCE: Duration = Duration::from_millis(120);

/// Input delivered by wired listeners.
#[derive(Debug, Clone, PartialEq)]
pub enum CarouselEvent {
    Button {
        carousel: String,
        direction: Direction,
    },
    Pointer {
        carousel: String,
        event: PointerEvent,
    },
}

impl CarouselEvent {
    pub fn button(carousel: impl Into<String>, direction: Direction) -> Self {
        Self::Button {
            carousel: carousel.into(),
            direction,
        }
    }

    pub fn pointer(carousel: impl Into<String>, event: PointerEvent) -> Self {
        Self::Pointer {
            carousel: carousel.into(),
            event,
        }
    }
}

/// Work done by one [`CarouselEngine::tick`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickOutcome {
    pub reflowed: bool,
    pub rescanned: bool,
    pub newly_bound: usize,
}

/// Serializable view of the engine state.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CarouselSnapshot {
    pub carousels: BTreeMap<String, CarouselState>,
    pub bound_elements: Vec<String>,
    pub rescan_pending: bool,
    pub resize_pending: bool,
}

pub struct CarouselEngine {
    carousels: BTreeMap<String, CarouselState>,
    gestures: HashMap<String, GestureTracker>,
    bound: HashSet<String>,
    resize: Debouncer,
    rescan: Debouncer,
}

impl Default for CarouselEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl CarouselEngine {
    pub fn new() -> Self {
        Self {
            carousels: BTreeMap::new(),
            gestures: HashMap::new(),
            bound: HashSet::new(),
            resize: Debouncer::new(RESIZE_DEBOUNCE),
            rescan: Debouncer::new(RESCAN_DEBOUNCE),
        }
    }

    // ========================================================================
    // Initialization
    // ========================================================================

    /// Scan the host and wire anything not wired yet. Safe to call any
    /// number of times; returns how many elements were newly bound.
    pub fn init<H: CarouselHost + ?Sized>(&mut self, host: &mut H) -> usize {
        let elements = host.scan();
        self.bind_new(host, &elements)
    }

    /// Full re-scan now: forget elements and carousels that disappeared,
    /// wire new ones and reflow every carousel.
    pub fn reinit<H: CarouselHost + ?Sized>(&mut self, host: &mut H) -> usize {
        self.rescan.cancel();
        let elements = host.scan();

        let present_ids: HashSet<&str> = elements.iter().map(|e| e.id.as_str()).collect();
        let present_tracks: HashSet<&str> = elements
            .iter()
            .filter(|e| e.role == Role::Track)
            .map(|e| e.carousel.as_str())
            .collect();

        let before = self.carousels.len();
        self.bound.retain(|id| present_ids.contains(id.as_str()));
        self.carousels
            .retain(|name, _| present_tracks.contains(name.as_str()));
        self.gestures
            .retain(|name, _| present_tracks.contains(name.as_str()));
        let dropped = before - self.carousels.len();

        let newly_bound = self.bind_new(host, &elements);
        self.reflow_all(host);

        debug!(
            carousels = self.carousels.len(),
            dropped,
            newly_bound,
            "Carousels re-initialized"
        );
        newly_bound
    }

    fn bind_new<H: CarouselHost + ?Sized>(&mut self, host: &mut H, elements: &[Element]) -> usize {
        let mut newly_bound = 0;

        for element in elements {
            if element.role == Role::Track && !self.carousels.contains_key(&element.carousel) {
                self.carousels
                    .insert(element.carousel.clone(), CarouselState::default());
                self.reflow(host, &element.carousel);
            }

            if self.bound.insert(element.id.clone()) {
                host.bind(element);
                newly_bound += 1;
            }
        }

        if newly_bound > 0 {
            debug!(newly_bound, carousels = self.carousels.len(), "Carousel elements bound");
        }
        newly_bound
    }

    // ========================================================================
    // Notifications and scheduling
    // ========================================================================

    /// The view layer inserted or replaced markup.
    pub fn notify_markup_changed(&mut self, now: Instant) {
        self.rescan.trigger(now);
    }

    pub fn notify_resize(&mut self, now: Instant) {
        self.resize.trigger(now);
    }

    /// Earliest instant at which [`tick`](Self::tick) has work to do.
    pub fn next_deadline(&self) -> Option<Instant> {
        match (self.resize.deadline(), self.rescan.deadline()) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    /// Run debounced work that is due at `now`.
    pub fn tick<H: CarouselHost + ?Sized>(&mut self, now: Instant, host: &mut H) -> TickOutcome {
        let mut outcome = TickOutcome::default();

        if self.rescan.fire(now) {
            outcome.rescanned = true;
            outcome.newly_bound = self.init(host);
        }
        if self.resize.fire(now) {
            outcome.reflowed = true;
            self.reflow_all(host);
        }

        outcome
    }

    // ========================================================================
    // Navigation
    // ========================================================================

    /// Route listener input. Returns the new position when the event moved
    /// a carousel.
    pub fn handle<H: CarouselHost + ?Sized>(
        &mut self,
        host: &mut H,
        event: &CarouselEvent,
    ) -> Option<usize> {
        match event {
            CarouselEvent::Button {
                carousel,
                direction,
            } => self.navigate(host, carousel, *direction),
            CarouselEvent::Pointer { carousel, event } => {
                if !self.carousels.contains_key(carousel) {
                    return None;
                }

                let tracker = self.gestures.entry(carousel.clone()).or_default();
                let was_dragging = tracker.is_dragging();
                let direction = tracker.decide(event);
                let is_dragging = tracker.is_dragging();

                if was_dragging != is_dragging {
                    host.set_dragging(carousel, is_dragging);
                }

                direction.and_then(|direction| self.navigate(host, carousel, direction))
            }
        }
    }

    pub fn advance<H: CarouselHost + ?Sized>(&mut self, host: &mut H, carousel: &str) -> Option<usize> {
        self.navigate(host, carousel, Direction::Next)
    }

    pub fn retreat<H: CarouselHost + ?Sized>(&mut self, host: &mut H, carousel: &str) -> Option<usize> {
        self.navigate(host, carousel, Direction::Prev)
    }

    fn navigate<H: CarouselHost + ?Sized>(
        &mut self,
        host: &mut H,
        carousel: &str,
        direction: Direction,
    ) -> Option<usize> {
        let state = self.carousels.get_mut(carousel)?;
        let items = host.item_rects(carousel);
        if items.is_empty() {
            return None;
        }

        state.resize(items.len(), visible_count(host.viewport_width()));
        let position = match direction {
            Direction::Next => state.advance(),
            Direction::Prev => state.retreat(),
        };
        host.apply_offset(carousel, offset_for(position, &items));

        trace!(carousel, ?direction, position, "Carousel moved");
        Some(position)
    }

    fn reflow<H: CarouselHost + ?Sized>(&mut self, host: &mut H, carousel: &str) {
        let Some(state) = self.carousels.get_mut(carousel) else {
            return;
        };
        let items = host.item_rects(carousel);
        state.resize(items.len(), visible_count(host.viewport_width()));
        if !items.is_empty() {
            host.apply_offset(carousel, offset_for(state.position, &items));
        }
    }

    fn reflow_all<H: CarouselHost + ?Sized>(&mut self, host: &mut H) {
        let names: Vec<String> = self.carousels.keys().cloned().collect();
        for name in names {
            self.reflow(host, &name);
        }
    }

    // ========================================================================
    // Inspection
    // ========================================================================

    pub fn position(&self, carousel: &str) -> Option<usize> {
        self.carousels.get(carousel).map(|s| s.position)
    }

    pub fn state(&self, carousel: &str) -> Option<&CarouselState> {
        self.carousels.get(carousel)
    }

    pub fn is_bound(&self, element_id: &str) -> bool {
        self.bound.contains(element_id)
    }

    pub fn carousel_count(&self) -> usize {
        self.carousels.len()
    }

    pub fn snapshot(&self) -> CarouselSnapshot {
        let mut bound_elements: Vec<String> = self.bound.iter().cloned().collect();
        bound_elements.sort();

        CarouselSnapshot {
            carousels: self.carousels.clone(),
            bound_elements,
            rescan_pending: self.rescan.is_pending(),
            resize_pending: self.resize.is_pending(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeHost;

    #[test]
    fn test_button_for_unknown_carousel_is_noop() {
        let mut host = FakeHost::new(1000.0).with_carousel("featured", 10);
        let mut engine = CarouselEngine::new();
        engine.init(&mut host);

        assert_eq!(
            engine.handle(&mut host, &CarouselEvent::button("missing", Direction::Next)),
            None
        );
        assert_eq!(engine.position("featured"), Some(0));
    }

    #[test]
    fn test_empty_carousel_never_moves() {
        let mut host = FakeHost::new(1000.0).with_carousel("empty", 0);
        let mut engine = CarouselEngine::new();
        engine.init(&mut host);

        assert_eq!(engine.advance(&mut host, "empty"), None);
        assert_eq!(host.offset("empty"), None);
    }

    #[test]
    fn test_navigation_recomputes_visible_count() {
        let mut host = FakeHost::new(1000.0).with_carousel("featured", 10);
        let mut engine = CarouselEngine::new();
        engine.init(&mut host);

        engine.retreat(&mut host, "featured");
        assert_eq!(engine.position("featured"), Some(6));

        // narrow viewport shows 2, so the last position is 8
        host.width = 500.0;
        engine.retreat(&mut host, "featured");
        assert_eq!(engine.position("featured"), Some(5));
        engine.advance(&mut host, "featured");
        engine.advance(&mut host, "featured");
        engine.advance(&mut host, "featured");
        assert_eq!(engine.position("featured"), Some(8));
    }

    #[test]
    fn test_next_deadline_is_earliest() {
        let start = Instant::now();
        let mut engine = CarouselEngine::new();
        assert_eq!(engine.next_deadline(), None);

        engine.notify_markup_changed(start);
        engine.notify_resize(start);
        assert_eq!(engine.next_deadline(), Some(start + RESIZE_DEBOUNCE));
    }
}
