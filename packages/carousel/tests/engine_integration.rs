//! Integration tests for the carousel engine against the in-memory host.

use std::time::{Duration, Instant};

use carousel::{
    testing::{FakeHost, ITEM_GAP, ITEM_WIDTH},
    CarouselEngine, CarouselEvent, CarouselHost, Direction, MouseButton, PointerEvent,
    RESCAN_DEBOUNCE, RESIZE_DEBOUNCE,
};

const STEP: f64 = ITEM_WIDTH + ITEM_GAP;

fn wide_page() -> (FakeHost, CarouselEngine) {
    let mut host = FakeHost::new(1200.0).with_carousel("featured", 10);
    let mut engine = CarouselEngine::new();
    engine.init(&mut host);
    (host, engine)
}

fn drag(engine: &mut CarouselEngine, host: &mut FakeHost, dx: f64) -> Option<usize> {
    let events = [
        PointerEvent::MouseDown { x: 300.0, y: 50.0, button: MouseButton::Primary },
        PointerEvent::MouseMove { x: 300.0 + dx / 2.0, y: 50.0 },
        PointerEvent::MouseUp { x: 300.0 + dx, y: 50.0 },
    ];
    let mut result = None;
    for event in events {
        result = engine.handle(host, &CarouselEvent::pointer("featured", event));
    }
    result
}

fn swipe(engine: &mut CarouselEngine, host: &mut FakeHost, dx: f64, dy: f64) -> Option<usize> {
    let events = [
        PointerEvent::TouchStart { x: 300.0, y: 50.0, touches: 1 },
        PointerEvent::TouchMove { x: 300.0 + dx, y: 50.0 + dy, touches: 1 },
        PointerEvent::TouchEnd,
    ];
    let mut result = None;
    for event in events {
        result = engine.handle(host, &CarouselEvent::pointer("featured", event));
    }
    result
}

// ============================================================================
// Paging
// ============================================================================

#[test]
fn test_advances_cycle_through_seven_positions() {
    let (mut host, mut engine) = wide_page();

    for _ in 0..7 {
        engine.handle(&mut host, &CarouselEvent::button("featured", Direction::Next));
    }
    assert_eq!(engine.position("featured"), Some(0));
    assert_eq!(host.offset("featured"), Some(0.0));

    engine.handle(&mut host, &CarouselEvent::button("featured", Direction::Next));
    assert_eq!(engine.position("featured"), Some(1));
    assert_eq!(host.offset("featured"), Some(STEP));
}

#[test]
fn test_n_advances_equal_n_mod_seven() {
    for n in 0..30 {
        let (mut host, mut engine) = wide_page();
        for _ in 0..n {
            engine.advance(&mut host, "featured");
        }
        assert_eq!(engine.position("featured"), Some(n % 7), "after {} advances", n);
    }
}

#[test]
fn test_retreat_from_start_wraps_to_end() {
    let (mut host, mut engine) = wide_page();
    assert_eq!(
        engine.handle(&mut host, &CarouselEvent::button("featured", Direction::Prev)),
        Some(6)
    );
    assert_eq!(host.offset("featured"), Some(6.0 * STEP));
}

// ============================================================================
// Gestures
// ============================================================================

#[test]
fn test_drag_threshold() {
    let (mut host, mut engine) = wide_page();

    assert_eq!(drag(&mut engine, &mut host, -39.0), None);
    assert_eq!(engine.position("featured"), Some(0));

    assert_eq!(drag(&mut engine, &mut host, -41.0), Some(1));
    assert_eq!(drag(&mut engine, &mut host, 41.0), Some(0));
}

#[test]
fn test_swipe_threshold_and_direction() {
    let (mut host, mut engine) = wide_page();

    assert_eq!(swipe(&mut engine, &mut host, 39.0, 0.0), None);
    assert_eq!(engine.position("featured"), Some(0));

    // swipe right retreats, wrapping to the end
    assert_eq!(swipe(&mut engine, &mut host, 41.0, 0.0), Some(6));
    // mostly vertical: page scroll, not a swipe
    assert_eq!(swipe(&mut engine, &mut host, -80.0, 120.0), None);
    assert_eq!(engine.position("featured"), Some(6));
}

#[test]
fn test_dragging_flag_follows_gesture() {
    let (mut host, mut engine) = wide_page();

    engine.handle(
        &mut host,
        &CarouselEvent::pointer(
            "featured",
            PointerEvent::MouseDown { x: 0.0, y: 0.0, button: MouseButton::Primary },
        ),
    );
    assert!(host.is_dragging("featured"));

    engine.handle(
        &mut host,
        &CarouselEvent::pointer("featured", PointerEvent::MouseUp { x: 5.0, y: 0.0 }),
    );
    assert!(!host.is_dragging("featured"));

    engine.handle(
        &mut host,
        &CarouselEvent::pointer(
            "featured",
            PointerEvent::MouseDown { x: 0.0, y: 0.0, button: MouseButton::Middle },
        ),
    );
    assert!(!host.is_dragging("featured"));
}

#[test]
fn test_pointer_on_unknown_carousel_ignored() {
    let (mut host, mut engine) = wide_page();
    let event = CarouselEvent::pointer(
        "ghost",
        PointerEvent::MouseDown { x: 0.0, y: 0.0, button: MouseButton::Primary },
    );
    assert_eq!(engine.handle(&mut host, &event), None);
    assert!(!host.is_dragging("ghost"));
}

// ============================================================================
// Initialization
// ============================================================================

#[test]
fn test_second_init_binds_nothing() {
    let mut host = FakeHost::new(800.0).with_carousel("featured", 10);
    host.insert_button("orphan-next", "nowhere", Direction::Next);
    let mut engine = CarouselEngine::new();

    assert_eq!(engine.init(&mut host), 5);
    assert_eq!(engine.init(&mut host), 0);
    assert_eq!(engine.reinit(&mut host), 0);

    assert_eq!(host.total_binds(), 5);
    assert_eq!(host.max_binds_per_element(), 1);
    assert!(engine.is_bound("orphan-next"));
}

#[test]
fn test_markup_change_rescans_once_per_window() {
    let start = Instant::now();
    let mut host = FakeHost::new(1200.0);
    let mut engine = CarouselEngine::new();
    engine.init(&mut host);
    let scans = host.scan_count();

    host.insert_carousel("featured", 10);
    engine.notify_markup_changed(start);
    host.insert_carousel("latest", 6);
    engine.notify_markup_changed(start + Duration::from_millis(50));

    // still inside the window measured from the last change
    let early = engine.tick(start + RESCAN_DEBOUNCE, &mut host);
    assert!(!early.rescanned);
    assert_eq!(host.scan_count(), scans);

    let due = engine.tick(start + Duration::from_millis(50) + RESCAN_DEBOUNCE, &mut host);
    assert!(due.rescanned);
    assert_eq!(due.newly_bound, 8);
    assert_eq!(host.scan_count(), scans + 1);

    let after = engine.tick(start + Duration::from_secs(5), &mut host);
    assert!(!after.rescanned);
    assert_eq!(host.scan_count(), scans + 1);

    assert_eq!(engine.carousel_count(), 2);
    assert_eq!(engine.advance(&mut host, "latest"), Some(1));
}

#[test]
fn test_resize_reflow_is_debounced_and_clamps() {
    let start = Instant::now();
    let mut host = FakeHost::new(500.0).with_carousel("featured", 10);
    let mut engine = CarouselEngine::new();
    engine.init(&mut host);

    engine.retreat(&mut host, "featured");
    assert_eq!(engine.position("featured"), Some(8));

    host.width = 1200.0;
    engine.notify_resize(start);
    engine.notify_resize(start + Duration::from_millis(40));
    assert!(!engine.tick(start + Duration::from_millis(100), &mut host).reflowed);
    assert_eq!(engine.position("featured"), Some(8));

    let outcome = engine.tick(start + Duration::from_millis(40) + RESIZE_DEBOUNCE, &mut host);
    assert!(outcome.reflowed);
    assert_eq!(engine.position("featured"), Some(6));
    assert_eq!(host.offset("featured"), Some(6.0 * STEP));
}

#[test]
fn test_reinit_drops_removed_and_wires_replaced_markup() {
    let mut host = FakeHost::new(1200.0)
        .with_carousel("featured", 10)
        .with_carousel("latest", 8);
    let mut engine = CarouselEngine::new();
    engine.init(&mut host);
    engine.advance(&mut host, "featured");
    engine.advance(&mut host, "latest");

    host.remove_carousel("latest");
    host.replace_carousel("featured", 5);
    let newly_bound = engine.reinit(&mut host);

    assert_eq!(newly_bound, 4);
    assert_eq!(engine.position("latest"), None);
    assert_eq!(engine.carousel_count(), 1);
    // five items with four visible leave one step of travel
    assert_eq!(engine.position("featured"), Some(1));
    assert_eq!(engine.advance(&mut host, "featured"), Some(0));

    for element in host.elements() {
        assert_eq!(host.bind_count(&element.id), 1);
    }
}

#[test]
fn test_items_arriving_later_become_navigable() {
    let mut host = FakeHost::new(1200.0).with_carousel("featured", 0);
    let mut engine = CarouselEngine::new();
    engine.init(&mut host);
    assert_eq!(engine.advance(&mut host, "featured"), None);

    host.set_item_count("featured", 6);
    assert_eq!(engine.advance(&mut host, "featured"), Some(1));
    assert_eq!(host.item_rects("featured").len(), 6);
}

#[test]
fn test_snapshot_serializes() {
    let start = Instant::now();
    let (mut host, mut engine) = wide_page();
    engine.advance(&mut host, "featured");
    engine.notify_markup_changed(start);

    let json = serde_json::to_value(engine.snapshot()).unwrap();
    assert_eq!(json["carousels"]["featured"]["position"], 1);
    assert_eq!(json["carousels"]["featured"]["visibleCount"], 4);
    assert_eq!(json["carousels"]["featured"]["itemCount"], 10);
    assert_eq!(json["boundElements"].as_array().unwrap().len(), 4);
    assert_eq!(json["rescanPending"], true);
    assert_eq!(json["resizePending"], false);
}
