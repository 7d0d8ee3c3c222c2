//! Message list rendering for the terminal binding.
//!
//! A row is a role header, the wrapped content and a blank separator. Its
//! measured height is its line count, so the list engine works in terminal
//! rows. [`layout_frame`] is the per-frame procedure: it brings the engine's
//! mounted set in line with its visible window and flushes; [`draw_rows`]
//! paints the result at `row_top - scroll_offset`.

use super::constants::MAX_MEASURE_PASSES;
use super::styles::MessageStyles;
use crate::list::{MessageList, Relayout, RowIndex, RowPhase, CODE_FENCE};
use crate::model::Message;
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::text::{Line, Span};
use std::collections::HashMap;
use std::time::Instant;
use tracing::debug;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Rendered lines for the rows of one frame.
pub type RenderedRows = HashMap<RowIndex, Vec<Line<'static>>>;

// ===== Wrapping =====

/// Break `text` into chunks of at most `width` display columns.
///
/// Whitespace is kept verbatim. A character wider than `width` gets a
/// chunk of its own.
pub fn break_chars(text: &str, width: usize) -> Vec<String> {
    let width = width.max(1);
    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut current_width = 0;

    for c in text.chars() {
        let w = c.width().unwrap_or(0);
        if current_width + w > width && !current.is_empty() {
            chunks.push(std::mem::take(&mut current));
            current_width = 0;
        }
        current.push(c);
        current_width += w;
    }
    chunks.push(current);
    chunks
}

/// Greedy word wrap of one line to `width` display columns.
///
/// Runs of whitespace collapse to one space; words longer than the width
/// are broken. An empty line wraps to one empty line.
pub fn wrap_words(line: &str, width: usize) -> Vec<String> {
    let width = width.max(1);
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in line.split_whitespace() {
        let word_width = word.width();

        if !current.is_empty() {
            if current.width() + 1 + word_width <= width {
                current.push(' ');
                current.push_str(word);
                continue;
            }
            lines.push(std::mem::take(&mut current));
        }

        if word_width <= width {
            current.push_str(word);
        } else {
            let mut pieces = break_chars(word, width);
            current = pieces.pop().unwrap_or_default();
            lines.extend(pieces);
        }
    }

    if !current.is_empty() || lines.is_empty() {
        lines.push(current);
    }
    lines
}

// ===== Row rendering =====

fn header_line(message: &Message, styles: &MessageStyles) -> Line<'static> {
    let role = message.role();
    let mut spans = vec![
        Span::styled(role.label().to_string(), styles.header(role)),
        Span::styled(
            format!(" · {}", message.created_at().format("%H:%M")),
            styles.meta(),
        ),
    ];
    if let Some(usage) = message.usage() {
        spans.push(Span::styled(
            format!(" · {} tokens", usage.total()),
            styles.meta(),
        ));
    }
    Line::from(spans)
}

/// Render one message at `width` columns.
///
/// Fence lines and lines inside fenced blocks keep their whitespace and are
/// hard-broken; prose is word-wrapped.
pub fn render_message(message: &Message, width: u16, styles: &MessageStyles) -> Vec<Line<'static>> {
    let width = usize::from(width.max(1));
    let role = message.role();
    let mut lines = vec![header_line(message, styles)];
    let mut in_code = false;

    for raw in message.content().lines() {
        let is_fence = raw.trim_start().starts_with(CODE_FENCE);
        let (chunks, style) = if is_fence || in_code {
            (break_chars(raw, width), styles.code())
        } else {
            (wrap_words(raw, width), styles.body(role))
        };
        lines.extend(chunks.into_iter().map(|chunk| Line::styled(chunk, style)));
        if is_fence {
            in_code = !in_code;
        }
    }
    if message.content().is_empty() {
        lines.push(Line::default());
    }

    lines.push(Line::default());
    lines
}

/// Measured height of a rendered row.
pub fn row_height(lines: &[Line<'_>]) -> u32 {
    u32::try_from(lines.len()).unwrap_or(u32::MAX)
}

// ===== Frame procedure =====

/// Mount, measure and unmount rows until the mounted set matches the window.
///
/// Rows entering the window are mounted with their rendered height. Rows
/// waiting for a first measurement (after a width change or a forced update)
/// are measured synchronously. Mounted rows report their height through the
/// debounced observer path. Rows that left the window are unmounted.
/// Rendered lines are added to `rendered`.
pub fn measure_window(
    list: &mut MessageList,
    messages: &[Message],
    width: u16,
    styles: &MessageStyles,
    now: Instant,
    rendered: &mut RenderedRows,
) {
    for pass in 0..MAX_MEASURE_PASSES {
        let window = list.visible_window();
        let mut changed = false;

        for index in window.indices() {
            let Some(message) = list.message_index(index).and_then(|i| messages.get(i)) else {
                continue;
            };
            let lines = rendered
                .entry(index)
                .or_insert_with(|| render_message(message, width, styles));
            let height = row_height(lines);

            if !list.is_mounted(index) {
                changed |= list.mount(index, height);
            } else if list.row_phase(index) == Some(RowPhase::Measuring) {
                changed |= list.measure(index, height);
            } else {
                list.observe_resize(index, height, now);
            }
        }

        for index in list.mounted_rows() {
            if !window.contains(index) {
                list.unmount(index);
            }
        }

        if !changed && list.visible_window() == window {
            return;
        }
        debug!("Window moved during measurement pass {}", pass + 1);
    }
}

/// Measure the window and flush, repeating while the flush moves the window.
///
/// Returns the lines of every row in the final window and the last relayout.
pub fn layout_frame(
    list: &mut MessageList,
    messages: &[Message],
    width: u16,
    styles: &MessageStyles,
    now: Instant,
) -> (RenderedRows, Option<Relayout>) {
    let mut rendered = RenderedRows::new();
    let mut relayout = None;

    for _ in 0..MAX_MEASURE_PASSES {
        measure_window(list, messages, width, styles, now, &mut rendered);
        let window = list.visible_window();
        relayout = list.flush().or(relayout);
        if list.visible_window() == window {
            break;
        }
    }

    (rendered, relayout)
}

/// Paint the visible window into `area`, clipping rows at its edges.
///
/// Rows without rendered lines are left blank.
pub fn draw_rows(buf: &mut Buffer, area: Rect, list: &MessageList, rendered: &RenderedRows) {
    let offset = list.scroll_offset().get();
    let bottom = offset + usize::from(area.height);

    for placement in list.placements() {
        let Some(lines) = rendered.get(&placement.index) else {
            continue;
        };
        let top = placement.style.top.get();
        for (i, line) in lines.iter().enumerate() {
            let y = top + i;
            if y < offset || y >= bottom {
                continue;
            }
            // y - offset < area.height, which is a u16
            let row = area.y + (y - offset) as u16;
            buf.set_line(area.x, row, line, area.width);
        }
    }
}

#[cfg(test)]
#[path = "chat_list_tests.rs"]
mod tests;
