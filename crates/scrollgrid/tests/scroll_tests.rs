//! Scroll threshold, single-flight fetching and the viewport-fill loop.

use scrollgrid::{GridConfig, Record, ScrollMetrics};
use scrollgrid_testing::prelude::*;

fn rule(page_size: usize) -> GridTestRule<Record> {
    GridTestRule::new(
        GridConfig::new().with_page_size(page_size),
        record_templates(),
    )
}

#[test]
fn test_scroll_inside_threshold_fetches() {
    let mut rule = rule(20);
    let source = ManualSource::new();
    rule.set_fetch_source(source.clone());
    source.resolve_next((0..20).map(numbered_record).collect());
    rule.await_idle();
    assert!(!rule.grid().is_fetching());

    // 1000 - 500 - 460 = 40 < 50
    assert!(rule.dispatch_scroll(ScrollMetrics::new(1000.0, 500.0, 460.0)));
    assert_eq!(source.calls(), vec![(0, 20), (1, 20)]);
}

#[test]
fn test_scroll_outside_threshold_does_not_fetch() {
    let mut rule = rule(20);
    let source = ManualSource::new();
    rule.set_fetch_source(source.clone());
    source.resolve_next((0..20).map(numbered_record).collect());
    rule.await_idle();

    // 1000 - 500 - 450 = 50, not below 50
    assert!(!rule.dispatch_scroll(ScrollMetrics::new(1000.0, 500.0, 450.0)));
    assert!(!rule.dispatch_scroll(ScrollMetrics::new(1000.0, 500.0, 0.0)));
    assert_eq!(source.calls().len(), 1);
}

#[test]
fn test_scroll_offset_is_configurable() {
    let mut rule = GridTestRule::new(
        GridConfig::new().with_page_size(20).with_scroll_offset(200.0),
        record_templates(),
    );
    let source = ManualSource::new();
    rule.set_fetch_source(source.clone());
    source.resolve_next((0..20).map(numbered_record).collect());
    rule.await_idle();

    // 150 left, inside a 200px threshold
    assert!(rule.dispatch_scroll(ScrollMetrics::new(1000.0, 500.0, 350.0)));
}

#[test]
fn test_at_most_one_fetch_in_flight() {
    let mut rule = rule(20);
    let source = ManualSource::new();
    rule.set_fetch_source(source.clone());

    let near_bottom = ScrollMetrics::new(1000.0, 500.0, 499.0);
    for _ in 0..5 {
        assert!(!rule.dispatch_scroll(near_bottom));
        assert!(!rule.grid().fetch());
        assert_eq!(source.pending_count(), 1);
    }

    source.resolve_next((0..20).map(numbered_record).collect());
    rule.run_until_stalled();
    assert!(!rule.grid().is_fetching());

    // Interleave: scroll, second scroll while in flight, completion, scroll.
    assert!(rule.grid().on_scroll(near_bottom));
    assert!(!rule.grid().on_scroll(near_bottom));
    assert_eq!(source.pending_count(), 1);
    source.resolve_next(vec![]);
    rule.run_until_stalled();
    assert!(rule.grid().on_scroll(near_bottom));
    assert_eq!(source.pending_count(), 1);

    let pages: Vec<_> = source.calls().iter().map(|(page, _)| *page).collect();
    assert_eq!(pages, vec![0, 1, 2]);
}

#[test]
fn test_fill_loop_stops_when_viewport_is_filled() {
    // 500px viewport, 40px header, 40px rows, 2 rows per page:
    // the content overflows once 12 rows (6 pages) are laid out.
    let mut rule = rule(2);
    let source = FiniteSource::new(1000, numbered_record);

    rule.set_fetch_source(source.clone());

    assert_eq!(source.call_count(), 6);
    assert_eq!(rule.grid().item_count(), 12);
    assert!(rule.metrics().is_scrollable());
    assert!(!rule.grid().is_fetching());
}

#[test]
fn test_fill_loop_stops_at_empty_page() {
    let mut rule = rule(2);
    let source = FiniteSource::new(5, numbered_record);

    rule.set_fetch_source(source.clone());

    // pages of 2, 2, 1, then the empty page ends the loop
    assert_eq!(source.calls(), vec![(0, 2), (1, 2), (2, 2), (3, 2)]);
    assert_eq!(rule.grid().item_count(), 5);
    assert!(!rule.metrics().is_scrollable());
    assert!(!rule.grid().is_fetching());
}

#[test]
fn test_empty_page_does_not_end_scroll_fetching() {
    let mut rule = rule(2).with_viewport(Viewport::new(60.0, 40.0));
    let source = ScriptedSource::with_pages([records(&["a", "b"]), vec![], records(&["c"])]);
    rule.set_fetch_source(source.clone());

    assert!(rule.scroll_to_bottom());
    assert_eq!(rule.grid().item_count(), 2);

    // More data showed up upstream; the next scroll still asks for it.
    assert!(rule.scroll_to_bottom());
    assert_eq!(rule.grid().item_count(), 3);
    assert_eq!(source.calls(), vec![(0, 2), (1, 2), (2, 2)]);
}

#[test]
fn test_loading_indicator_follows_fetch() {
    let mut rule = rule(2);
    let source = ManualSource::new();
    rule.set_fetch_source(source.clone());

    assert!(rule.grid().is_loading());
    let tree = rule.tree().expect("a frame was drawn");
    assert!(tree.loading.is_some());

    source.resolve_next(vec![]);
    rule.await_idle();
    assert!(!rule.grid().is_loading());
    assert!(rule.tree().expect("a frame was drawn").loading.is_none());
}

#[test]
fn test_scroll_by_steps_toward_threshold() {
    let mut rule = rule(10).with_viewport(Viewport::new(200.0, 20.0).with_header_height(0.0));
    let source = FiniteSource::new(100, numbered_record);

    // Ten 20px rows exactly fill 200px without overflowing, so one fill fetch follows.
    rule.set_fetch_source(source.clone());
    assert_eq!(source.call_count(), 2);
    assert_eq!(rule.metrics().scroll_height, 400.0);
    let frames = rule.frames();
    assert!(frames > 0 && frames <= MAX_SETTLE_FRAMES);

    // 400 - 200 - 100 = 100 left
    assert!(!rule.scroll_by(100.0));
    // 400 - 200 - 160 = 40 left
    assert!(rule.scroll_by(60.0));
    assert_eq!(source.calls(), vec![(0, 10), (1, 10), (2, 10)]);
    assert!(rule.frames() > frames);

    let ids: Vec<_> = rule
        .grid()
        .with_items(|items| items.iter().map(|item| item["id"].clone()).collect());
    assert_eq!(ids.len(), 30);
    assert_eq!(ids[29], serde_json::json!(29));
}
