//! Tests for message row rendering and the frame procedure

use super::*;
use crate::list::{ListTuning, PixelOffset, Viewport};
use crate::model::{MessageId, Role, TokenUsage};
use crate::view::styles::ColorConfig;

// ===== Test Helpers =====

fn styles() -> MessageStyles {
    MessageStyles::with_color_config(ColorConfig::new(false))
}

fn make_message(id: &str, role: Role, text: &str) -> Message {
    Message::new(
        MessageId::new(id).expect("valid message id"),
        role,
        text,
        "2025-12-25T10:00:00Z".parse().expect("valid timestamp"),
    )
}

fn conversation(count: usize) -> Vec<Message> {
    (0..count)
        .map(|i| make_message(&format!("m{i}"), Role::User, &format!("message {i}")))
        .collect()
}

fn list_for(messages: &[Message], width: u32, height: u32) -> MessageList {
    let mut list = MessageList::new(ListTuning::terminal());
    list.resize(Viewport::new(width, height));
    list.sync(messages);
    list
}

fn line_text(line: &Line<'_>) -> String {
    line.spans.iter().map(|s| s.content.as_ref()).collect()
}

fn buffer_row(buf: &Buffer, y: u16) -> String {
    (0..buf.area.width)
        .map(|x| buf[(x, y)].symbol().to_string())
        .collect::<String>()
        .trim_end()
        .to_string()
}

// ===== Wrapping =====

#[test]
fn wrap_words_breaks_at_word_boundaries() {
    assert_eq!(
        wrap_words("the quick brown fox", 9),
        vec!["the quick", "brown fox"]
    );
}

#[test]
fn wrap_words_breaks_words_longer_than_width() {
    assert_eq!(wrap_words("abcdefghij", 4), vec!["abcd", "efgh", "ij"]);
    assert_eq!(wrap_words("ab abcdefgh", 4), vec!["ab", "abcd", "efgh"]);
}

#[test]
fn wrap_words_keeps_empty_line() {
    assert_eq!(wrap_words("", 10), vec![""]);
    assert_eq!(wrap_words("   ", 10), vec![""]);
}

#[test]
fn break_chars_counts_display_width() {
    assert_eq!(break_chars("日本語", 4), vec!["日本", "語"]);
    assert_eq!(break_chars("    x", 2), vec!["  ", "  ", "x"]);
}

// ===== Row rendering =====

#[test]
fn row_is_header_content_and_separator() {
    let lines = render_message(&make_message("m", Role::User, "hello"), 80, &styles());

    assert_eq!(lines.len(), 3);
    assert_eq!(line_text(&lines[0]), "You · 10:00");
    assert_eq!(line_text(&lines[1]), "hello");
    assert_eq!(line_text(&lines[2]), "");
}

#[test]
fn empty_content_still_gets_a_body_line() {
    let lines = render_message(&make_message("m", Role::Assistant, ""), 80, &styles());
    assert_eq!(lines.len(), 3);
}

#[test]
fn header_shows_token_total_when_known() {
    let message =
        make_message("m", Role::Assistant, "hi").with_usage(TokenUsage::new(10, 5));
    let lines = render_message(&message, 80, &styles());
    assert_eq!(line_text(&lines[0]), "Assistant · 10:00 · 15 tokens");
}

#[test]
fn code_block_lines_keep_indentation() {
    let message = make_message("m", Role::Assistant, "Try:\n```\n    indented  code\n```");
    let lines = render_message(&message, 80, &styles());
    let texts: Vec<String> = lines.iter().map(line_text).collect();

    assert_eq!(texts[1], "Try:");
    assert_eq!(texts[2], "```");
    assert_eq!(texts[3], "    indented  code");
    assert_eq!(texts[4], "```");
}

#[test]
fn narrower_width_renders_taller_rows() {
    let message = make_message("m", Role::User, &"word ".repeat(30));
    let wide = render_message(&message, 80, &styles());
    let narrow = render_message(&message, 20, &styles());
    assert!(row_height(&narrow) > row_height(&wide));
}

// ===== Frame procedure =====

#[test]
fn layout_frame_mounts_exactly_the_window() {
    let messages = conversation(20);
    let mut list = list_for(&messages, 40, 10);

    let (rendered, _) = layout_frame(&mut list, &messages, 40, &styles(), Instant::now());

    let window: Vec<RowIndex> = list.visible_window().indices().collect();
    assert_eq!(list.mounted_rows(), window);
    for index in window {
        assert!(rendered.contains_key(&index), "row {} not rendered", index.get());
    }
}

#[test]
fn duplicate_ids_do_not_shift_rendered_rows() {
    let messages = vec![
        make_message("m0", Role::User, "message 0"),
        make_message("m1", Role::User, "message 1"),
        make_message("m0", Role::User, "repeated"),
        make_message("m2", Role::User, "message 2"),
    ];
    let mut list = list_for(&messages, 40, 30);

    let (rendered, _) = layout_frame(&mut list, &messages, 40, &styles(), Instant::now());

    assert_eq!(list.len(), 3);
    let window: Vec<RowIndex> = list.visible_window().indices().collect();
    assert_eq!(list.mounted_rows(), window);
    assert_eq!(line_text(&rendered[&RowIndex::new(0)][1]), "message 0");
    assert_eq!(line_text(&rendered[&RowIndex::new(2)][1]), "message 2");
}

#[test]
fn mounted_rows_cache_their_rendered_height() {
    let messages = vec![
        make_message("a", Role::User, "short"),
        make_message("b", Role::Assistant, &"word ".repeat(30)),
    ];
    let mut list = list_for(&messages, 40, 30);

    let (rendered, _) = layout_frame(&mut list, &messages, 40, &styles(), Instant::now());

    for (i, message) in messages.iter().enumerate() {
        let expected = row_height(&rendered[&RowIndex::new(i)]);
        let cached = list.cached_height(message.id()).expect("measured");
        assert_eq!(cached.get(), expected);
    }
}

#[test]
fn rows_leaving_the_window_are_unmounted() {
    let messages = conversation(40);
    let mut list = list_for(&messages, 40, 10);
    layout_frame(&mut list, &messages, 40, &styles(), Instant::now());
    assert!(list.is_mounted(RowIndex::new(39)));

    list.scroll_to_top();
    layout_frame(&mut list, &messages, 40, &styles(), Instant::now());

    assert!(list.is_mounted(RowIndex::new(0)));
    assert!(!list.is_mounted(RowIndex::new(39)));
}

#[test]
fn width_change_remeasures_mounted_rows_at_new_width() {
    let messages = vec![make_message("a", Role::User, &"word ".repeat(30))];
    let mut list = list_for(&messages, 40, 30);
    layout_frame(&mut list, &messages, 40, &styles(), Instant::now());
    let wide = list.cached_height(messages[0].id()).expect("measured");

    let outcome = list.resize(Viewport::new(20, 30));
    assert!(outcome.width_changed);
    assert_eq!(list.cached_height(messages[0].id()), None);

    layout_frame(&mut list, &messages, 20, &styles(), Instant::now());
    let narrow = list.cached_height(messages[0].id()).expect("remeasured");
    assert!(narrow > wide);
    assert_eq!(
        narrow.get(),
        row_height(&render_message(&messages[0], 20, &styles()))
    );
}

#[test]
fn pinned_list_stays_at_bottom_after_measurement() {
    let messages = vec![
        make_message("a", Role::User, "short"),
        make_message("b", Role::Assistant, &"word ".repeat(200)),
    ];
    let mut list = list_for(&messages, 40, 5);
    assert!(list.is_pinned());

    layout_frame(&mut list, &messages, 40, &styles(), Instant::now());

    let bottom = list.total_height() - 5;
    assert_eq!(list.scroll_offset(), PixelOffset::new(bottom));
    assert!(list.is_pinned());
}

#[test]
fn draw_rows_places_rows_at_their_tops() {
    let messages = vec![
        make_message("a", Role::User, "first"),
        make_message("b", Role::Assistant, "second"),
    ];
    let mut list = list_for(&messages, 30, 10);
    let (rendered, _) = layout_frame(&mut list, &messages, 30, &styles(), Instant::now());

    let area = Rect::new(0, 0, 30, 10);
    let mut buf = Buffer::empty(area);
    draw_rows(&mut buf, area, &list, &rendered);

    assert_eq!(buffer_row(&buf, 0), "You · 10:00");
    assert_eq!(buffer_row(&buf, 1), "first");
    assert_eq!(buffer_row(&buf, 3), "Assistant · 10:00");
    assert_eq!(buffer_row(&buf, 4), "second");
}

#[test]
fn draw_rows_clips_rows_above_the_viewport() {
    let messages = conversation(10);
    let mut list = list_for(&messages, 30, 4);
    let (rendered, _) = layout_frame(&mut list, &messages, 30, &styles(), Instant::now());
    list.on_scroll(PixelOffset::new(1));
    let (rendered_after, _) = layout_frame(&mut list, &messages, 30, &styles(), Instant::now());
    assert!(!rendered.is_empty());

    let area = Rect::new(0, 0, 30, 4);
    let mut buf = Buffer::empty(area);
    draw_rows(&mut buf, area, &list, &rendered_after);

    assert_eq!(buffer_row(&buf, 0), "message 0");
    assert_eq!(buffer_row(&buf, 2), "You · 10:00");
}
