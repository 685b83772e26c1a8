//! Headless carousel engine.
//!
//! A carousel is a fixed viewport over a horizontal row of items. The engine
//! keeps one wrap-around position per carousel, sizes the visible window from
//! the viewport width, turns swipes and drags into page steps, and wires each
//! rendered element exactly once. Rendering and event plumbing stay with the
//! embedding page through the [`CarouselHost`] trait.
//!
//! # Modules
//!
//! - [`engine`] - [`CarouselEngine`], events, snapshots
//! - [`position`] - wrap-around paging state
//! - [`layout`] - breakpoints and offset geometry
//! - [`gesture`] - swipe/drag recognition
//! - [`debounce`] - timestamp-driven debouncing
//! - [`host`] - the host trait and element descriptions
//! - [`testing`] - in-memory host for tests

pub mod debounce;
pub mod engine;
pub mod gesture;
pub mod host;
pub mod layout;
pub mod position;
pub mod testing;

pub use debounce::Debouncer;
pub use engine::{
    CarouselEngine, CarouselEvent, CarouselSnapshot, TickOutcome, RESCAN_DEBOUNCE,
    RESIZE_DEBOUNCE,
};
pub use gesture::{classify, Direction, GestureTracker, MouseButton, PointerEvent, SWIPE_THRESHOLD_PX};
pub use host::{CarouselHost, Element, Role};
pub use layout::{offset_for, step_width, visible_count, ItemRect};
pub use position::CarouselState;
