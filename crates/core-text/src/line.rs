//! A single document line: raw text plus a lazily built rendered form.
//!
//! Columns (`col`) count Unicode scalar values of the raw text. Rendered
//! columns (`rx`) count terminal cells after tab expansion. The rendered string
//! is cached per line and dropped whenever the raw text changes, so an edit
//! only ever invalidates the lines it touched.

use crate::width::{char_width, display_char, next_tab_stop};
use std::cell::OnceCell;

#[derive(Debug, Clone)]
pub struct Line {
    text: String,
    tab_stop: usize,
    rendered: OnceCell<String>,
}

impl PartialEq for Line {
    fn eq(&self, other: &Self) -> bool {
        self.text == other.text && self.tab_stop == other.tab_stop
    }
}

impl Eq for Line {}

impl Line {
    pub fn new(text: impl Into<String>, tab_stop: usize) -> Self {
        Self {
            text: text.into(),
            tab_stop: tab_stop.max(1),
            rendered: OnceCell::new(),
        }
    }

    /// Raw content.
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Length in characters.
    pub fn len(&self) -> usize {
        self.text.chars().count()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// True while the rendered cache is populated (used by tests to assert locality).
    pub fn is_render_cached(&self) -> bool {
        self.rendered.get().is_some()
    }

    /// Rendered form: tabs expanded, control characters replaced.
    pub fn rendered(&self) -> &str {
        self.rendered.get_or_init(|| {
            let mut out = String::with_capacity(self.text.len());
            let mut rx = 0usize;
            for c in self.text.chars() {
                if c == '\t' {
                    let next = next_tab_stop(rx, self.tab_stop);
                    out.extend(std::iter::repeat_n(' ', next - rx));
                    rx = next;
                } else {
                    out.push(display_char(c));
                    rx += char_width(c);
                }
            }
            out
        })
    }

    /// Total rendered width in terminal cells.
    pub fn render_width(&self) -> usize {
        self.col_to_rx(self.len())
    }

    /// Translate a character column into a rendered column.
    pub fn col_to_rx(&self, col: usize) -> usize {
        let mut rx = 0usize;
        for c in self.text.chars().take(col) {
            rx = if c == '\t' {
                next_tab_stop(rx, self.tab_stop)
            } else {
                rx + char_width(c)
            };
        }
        rx
    }

    /// Translate a rendered column back into the character column that covers it.
    /// Columns past the end clamp to `len()`.
    pub fn rx_to_col(&self, rx: usize) -> usize {
        let mut cur = 0usize;
        for (col, c) in self.text.chars().enumerate() {
            cur = if c == '\t' {
                next_tab_stop(cur, self.tab_stop)
            } else {
                cur + char_width(c)
            };
            if cur > rx {
                return col;
            }
        }
        self.len()
    }

    /// Rendered text visible in cells `[col_offset, col_offset + width)`.
    ///
    /// A wide glyph cut by either edge is replaced with spaces so the result never
    /// exceeds `width` cells and never shifts following cells.
    pub fn render_slice(&self, col_offset: usize, width: usize) -> String {
        let end = col_offset.saturating_add(width);
        let mut out = String::new();
        let mut rx = 0usize;
        for c in self.rendered().chars() {
            if rx >= end {
                break;
            }
            let w = char_width(c);
            let next = rx + w;
            if w == 0 {
                if rx > col_offset && rx <= end {
                    out.push(c);
                }
            } else if rx >= col_offset && next <= end {
                out.push(c);
            } else if next > col_offset {
                // straddles an edge: blank the visible part
                let visible = next.min(end) - rx.max(col_offset);
                out.extend(std::iter::repeat_n(' ', visible));
            }
            rx = next;
        }
        out
    }

    /// Character columns at which `query` starts (non-overlapping, left to right).
    pub fn match_cols(&self, query: &str) -> Vec<usize> {
        if query.is_empty() {
            return Vec::new();
        }
        self.text
            .match_indices(query)
            .map(|(byte, _)| self.text[..byte].chars().count())
            .collect()
    }

    pub(crate) fn set_tab_stop(&mut self, tab_stop: usize) {
        let tab_stop = tab_stop.max(1);
        if self.tab_stop != tab_stop {
            self.tab_stop = tab_stop;
            self.invalidate();
        }
    }

    pub(crate) fn insert(&mut self, col: usize, ch: char) {
        let byte = self.byte_index(col);
        self.text.insert(byte, ch);
        self.invalidate();
    }

    pub(crate) fn remove(&mut self, col: usize) -> char {
        let byte = self.byte_index(col);
        let ch = self.text.remove(byte);
        self.invalidate();
        ch
    }

    pub(crate) fn split_off(&mut self, col: usize) -> String {
        let byte = self.byte_index(col);
        let tail = self.text.split_off(byte);
        self.invalidate();
        tail
    }

    pub(crate) fn push_str(&mut self, s: &str) {
        if s.is_empty() {
            return;
        }
        self.text.push_str(s);
        self.invalidate();
    }

    fn invalidate(&mut self) {
        self.rendered.take();
    }

    fn byte_index(&self, col: usize) -> usize {
        self.text
            .char_indices()
            .nth(col)
            .map(|(b, _)| b)
            .unwrap_or(self.text.len())
    }
}
