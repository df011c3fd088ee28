//! Status bar and message bar composition.
//!
//! Status bar layout: `<name> - <n> lines[ (modified)]` on the left and
//! `<row>/<count>` flush right, padded with spaces to the full width. When the
//! two do not fit, the right part is dropped and the left part is truncated.
//! The message bar shows the active prompt, else the ephemeral status message.

use core_state::EditorState;
use core_text::width::char_width;
use std::borrow::Cow;

/// Longest file name shown before truncation.
pub const NAME_MAX_CHARS: usize = 20;

pub struct StatusContext<'a> {
    pub file_name: Cow<'a, str>,
    pub line_count: usize,
    pub dirty: bool,
    /// 0-based cursor row.
    pub row: usize,
}

impl<'a> StatusContext<'a> {
    pub fn from_state(state: &'a EditorState, row: usize) -> Self {
        Self {
            file_name: Cow::Owned(state.display_name()),
            line_count: state.document.line_count(),
            dirty: state.is_dirty(),
            row,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusSegment<'a> {
    FileName(Cow<'a, str>),
    LineCount(usize),
    Modified,
    Position { row_1: usize, count: usize },
}

pub fn compose_status<'a>(ctx: &'a StatusContext<'a>) -> Vec<StatusSegment<'a>> {
    let name: String = ctx.file_name.chars().take(NAME_MAX_CHARS).collect();
    let mut segs = vec![
        StatusSegment::FileName(Cow::Owned(name)),
        StatusSegment::LineCount(ctx.line_count),
    ];
    if ctx.dirty {
        segs.push(StatusSegment::Modified);
    }
    segs.push(StatusSegment::Position {
        row_1: ctx.row + 1,
        count: ctx.line_count,
    });
    segs
}

/// Render segments into a bar exactly `width` cells wide.
pub fn format_status(segs: &[StatusSegment<'_>], width: usize) -> String {
    let mut left = String::new();
    let mut right = String::new();
    for seg in segs {
        match seg {
            StatusSegment::FileName(name) => left.push_str(name),
            StatusSegment::LineCount(n) => left.push_str(&format!(" - {n} lines")),
            StatusSegment::Modified => left.push_str(" (modified)"),
            StatusSegment::Position { row_1, count } => right = format!("{row_1}/{count}"),
        }
    }
    let mut out = truncate_to_width(&left, width);
    let mut used = display_width(&out);
    let right_w = display_width(&right);
    if used + right_w <= width {
        let gap = width - used - right_w;
        out.extend(std::iter::repeat_n(' ', gap));
        out.push_str(&right);
        used = width;
    }
    out.extend(std::iter::repeat_n(' ', width - used));
    out
}

pub fn build_status_line(state: &EditorState, row: usize, width: usize) -> String {
    let ctx = StatusContext::from_state(state, row);
    format_status(&compose_status(&ctx), width)
}

/// Message bar text and, when a prompt is active, the prompt cursor column.
pub fn build_message_line(state: &EditorState, width: usize) -> (String, Option<usize>) {
    match &state.prompt {
        Some(prompt) => {
            let text = truncate_to_width(&prompt.display(), width);
            let col = prompt.cursor_col().min(width.saturating_sub(1));
            (text, Some(col))
        }
        None => (
            state
                .status_text()
                .map(|t| truncate_to_width(t, width))
                .unwrap_or_default(),
            None,
        ),
    }
}

pub fn display_width(s: &str) -> usize {
    s.chars().map(char_width).sum()
}

/// Longest prefix of `s` occupying at most `width` cells.
pub fn truncate_to_width(s: &str, width: usize) -> String {
    let mut used = 0;
    let mut out = String::new();
    for c in s.chars() {
        let w = char_width(c);
        if used + w > width {
            break;
        }
        used += w;
        out.push(c);
    }
    out
}
