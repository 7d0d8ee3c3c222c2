//! Acceptance scenarios for the message list, driven through the public API.
//!
//! Uses the pixel tuning (`ListTuning::default()`): a one-line message
//! estimates to 70px and the viewport is 400x600.

use chatlist::list::{
    HeightCache, HeightEstimator, ListTuning, MessageList, PixelOffset, RowHeight, RowIndex,
    ScrollAlign, ScrollCommand, Viewport,
};
use chatlist::model::{Message, MessageId, Role};
use std::time::{Duration, Instant};

// ===== Test Helpers =====

fn make_message(id: &str, text: &str) -> Message {
    Message::new(
        MessageId::new(id).expect("valid message id"),
        Role::Assistant,
        text,
        "2025-12-25T10:00:00Z".parse().expect("valid timestamp"),
    )
}

fn conversation(count: usize) -> Vec<Message> {
    (0..count)
        .map(|i| make_message(&format!("msg-{i}"), &format!("reply number {i}")))
        .collect()
}

fn list_with(messages: &[Message]) -> MessageList {
    let mut list = MessageList::new(ListTuning::default());
    list.resize(Viewport::new(400, 600));
    list.sync(messages);
    list.flush();
    list.take_scroll_commands();
    list
}

fn tops(list: &MessageList) -> Vec<usize> {
    (0..list.len())
        .map(|i| list.row_top(RowIndex::new(i)).expect("row in range").get())
        .collect()
}

fn bottom_scrolls(commands: &[ScrollCommand]) -> Vec<RowIndex> {
    commands
        .iter()
        .filter_map(|command| match command {
            ScrollCommand::ToIndex {
                index,
                align: ScrollAlign::End,
                ..
            } => Some(*index),
            _ => None,
        })
        .collect()
}

// ===== Estimation =====

#[test]
fn empty_content_estimates_to_the_floor() {
    let estimator = HeightEstimator::new(&ListTuning::default());
    assert!(estimator.estimate("") >= estimator.min_height());

    let tall_floor = HeightEstimator::new(&ListTuning {
        min_height: 200,
        ..ListTuning::default()
    });
    assert_eq!(tall_floor.estimate("").get(), 200);
    assert_eq!(tall_floor.estimate("short").get(), 200);
}

#[test]
fn fenced_code_estimates_higher_than_equal_length_prose() {
    let estimator = HeightEstimator::new(&ListTuning::default());
    let code = format!("```rust\n{}```", "let x = compute(1);\n".repeat(20));
    let prose = "a".repeat(code.chars().count());

    assert!(estimator.estimate(&code) > estimator.estimate(&prose));
}

// ===== Measurement =====

#[test]
fn measurement_shifts_only_later_rows_by_the_delta() {
    let messages = conversation(10);
    let mut list = list_with(&messages);
    let before = tops(&list);
    let estimate = list.estimated_height(RowIndex::new(4)).expect("row 4").get();

    list.measure(RowIndex::new(4), estimate + 50);

    assert_eq!(
        list.cached_height(messages[4].id()),
        Some(RowHeight::new(estimate + 50).expect("non-zero"))
    );
    let after = tops(&list);
    for i in 0..=4 {
        assert_eq!(after[i], before[i], "row {i} must not move");
    }
    for i in 5..10 {
        assert_eq!(after[i], before[i] + 50, "row {i} must shift by the delta");
    }
}

#[test]
fn measurement_within_jitter_does_not_relayout() {
    let messages = conversation(3);
    let mut list = list_with(&messages);
    list.measure(RowIndex::new(1), 120);
    assert!(list.flush().is_some());

    assert!(!list.measure(RowIndex::new(1), 122));
    assert!(!list.measure(RowIndex::new(1), 118));
    assert_eq!(list.flush(), None);
    assert_eq!(list.cached_height(messages[1].id()).map(|h| h.get()), Some(120));
}

#[test]
fn cache_jitter_threshold_is_inclusive() {
    let id = MessageId::new("a").expect("valid id");
    let mut cache = HeightCache::new(2);
    cache.set(&id, RowHeight::clamped(100));

    assert!(!cache.set(&id, RowHeight::clamped(102)).is_change());
    assert!(cache.set(&id, RowHeight::clamped(103)).is_change());
}

#[test]
fn unmount_before_debounce_discards_the_measurement() {
    let messages = conversation(3);
    let mut list = list_with(&messages);
    let t0 = Instant::now();
    list.mount(RowIndex::new(2), 90);

    assert!(list.observe_resize(RowIndex::new(2), 300, t0));
    list.unmount(RowIndex::new(2));
    assert_eq!(list.tick(t0 + Duration::from_secs(1)), 0);

    assert_eq!(list.cached_height(messages[2].id()).map(|h| h.get()), Some(90));
}

#[test]
fn observed_resize_commits_after_the_quiet_period() {
    let messages = conversation(3);
    let mut list = list_with(&messages);
    let t0 = Instant::now();
    list.mount(RowIndex::new(0), 90);

    list.observe_resize(RowIndex::new(0), 150, t0);
    list.observe_resize(RowIndex::new(0), 200, t0 + Duration::from_millis(60));
    assert_eq!(list.tick(t0 + Duration::from_millis(120)), 0, "re-armed by the second observation");
    assert_eq!(list.tick(t0 + Duration::from_millis(170)), 1);

    assert_eq!(list.cached_height(messages[0].id()).map(|h| h.get()), Some(200));
}

// ===== Auto-scroll =====

#[test]
fn append_while_pinned_scrolls_to_the_new_row() {
    let mut messages = conversation(20);
    let mut list = list_with(&messages);
    assert!(list.is_pinned());

    messages.push(make_message("new", "fresh reply"));
    list.sync(&messages);

    assert_eq!(
        bottom_scrolls(&list.take_scroll_commands()),
        vec![RowIndex::new(20)]
    );
}

#[test]
fn append_while_scrolled_away_does_not_scroll() {
    let mut messages = conversation(20);
    let mut list = list_with(&messages);
    list.on_scroll(PixelOffset::new(0));
    assert!(!list.is_pinned());

    messages.push(make_message("new", "fresh reply"));
    list.sync(&messages);

    assert!(bottom_scrolls(&list.take_scroll_commands()).is_empty());
    assert_eq!(list.scroll_offset(), PixelOffset::new(0));
}

#[test]
fn fifty_appends_while_pinned_follow_the_newest_row() {
    let all = conversation(50);
    let mut list = MessageList::new(ListTuning::default());
    list.resize(Viewport::new(400, 600));

    for count in 1..=50 {
        list.sync(&all[..count]);
        list.flush();
        assert_eq!(
            bottom_scrolls(&list.take_scroll_commands()),
            vec![RowIndex::new(count - 1)],
            "append {count} must scroll to the bottom"
        );
    }

    assert_eq!(list.visible_window().last_index(), Some(RowIndex::new(49)));
    assert!(list.is_pinned());
}

// ===== Viewport =====

#[test]
fn width_change_clears_every_cached_height() {
    let messages = conversation(6);
    let mut list = list_with(&messages);
    for i in 0..6 {
        list.measure(RowIndex::new(i), 100 + i as u32);
    }

    let outcome = list.resize(Viewport::new(800, 600));

    assert!(outcome.width_changed);
    for message in &messages {
        assert_eq!(list.cached_height(message.id()), None);
    }
}

#[test]
fn height_change_keeps_cached_heights() {
    let messages = conversation(6);
    let mut list = list_with(&messages);
    list.measure(RowIndex::new(0), 100);

    let outcome = list.resize(Viewport::new(400, 300));

    assert!(!outcome.width_changed);
    assert_eq!(list.cached_height(messages[0].id()).map(|h| h.get()), Some(100));
}

#[test]
fn force_update_lays_out_again_from_the_estimates() {
    let messages = conversation(4);
    let mut list = list_with(&messages);
    list.measure(RowIndex::new(0), 500);
    list.flush();

    list.force_update();

    assert_eq!(list.cached_height(messages[0].id()), None);
    assert_eq!(list.total_height(), 4 * 70);
    assert_eq!(list.flush().map(|r| r.from), Some(RowIndex::new(0)));
}
