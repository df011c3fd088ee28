//! Frame assembly and diff-minimized repaint.
//!
//! A `Frame` holds one string per terminal row: the visible text rows, then
//! the status bar, then the message bar. `RenderEngine` keeps the previously
//! emitted frame and, on the next render, rewrites only the rows whose content
//! changed. The first frame after construction, `invalidate()` or a size change
//! clears the whole screen and paints every row.
//!
//! Emission order per frame: hide cursor, (clear), changed rows as
//! `MoveTo(0, y) Print EraseToEol`, cursor placement, show cursor. The bytes are
//! produced through `writer::Writer` into a buffer the caller writes out.

use bitflags::bitflags;
use core_model::EditorModel;

pub mod render_engine;
pub mod status;
pub mod writer;

pub use render_engine::{RenderEngine, RenderMetrics, RenderMetricsSnapshot};

/// Banner shown on the blank, unnamed document.
pub const WELCOME: &str = concat!("tilde editor -- version ", env!("CARGO_PKG_VERSION"));

/// Marker drawn on rows past the end of the document.
pub const FILLER: &str = "~";

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct RowFlags: u8 {
        const REVERSE = 0b0000_0001; // inverse video (status bar)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Row {
    pub text: String,
    pub flags: RowFlags,
}

impl Row {
    fn plain(text: String) -> Self {
        Self {
            text,
            flags: RowFlags::empty(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub width: u16,
    pub rows: Vec<Row>,
    /// Screen cursor `(x, y)`.
    pub cursor: (u16, u16),
}

impl Frame {
    pub fn height(&self) -> u16 {
        self.rows.len() as u16
    }

    pub fn row_text(&self, y: usize) -> Option<&str> {
        self.rows.get(y).map(|r| r.text.as_str())
    }

    /// Build the candidate frame for the model's current state.
    pub fn build(model: &EditorModel) -> Frame {
        let state = model.state();
        let view = model.view();
        let doc = &state.document;
        let width = view.cols;
        let mut rows = Vec::with_capacity(view.rows + 2);

        let show_welcome = doc.is_blank() && state.file_name.is_none();
        for y in 0..view.rows {
            let file_row = y + view.row_offset;
            let text = match doc.line(file_row) {
                Some(line) => line.render_slice(view.col_offset, width),
                None if show_welcome && y == view.rows / 3 => welcome_row(width),
                None => status::truncate_to_width(FILLER, width),
            };
            rows.push(Row::plain(text));
        }

        rows.push(Row {
            text: status::build_status_line(state, view.cursor.row, width),
            flags: RowFlags::REVERSE,
        });
        let (message, prompt_col) = status::build_message_line(state, width);
        rows.push(Row::plain(message));

        let cursor = match prompt_col {
            Some(col) => (col as u16, (view.rows + 1) as u16),
            None => {
                let (y, x) = view.screen_cursor(doc);
                (x as u16, y as u16)
            }
        };

        Frame {
            width: width as u16,
            rows,
            cursor,
        }
    }
}

/// `~` followed by the centered banner, cut to `width`.
fn welcome_row(width: usize) -> String {
    let banner = status::truncate_to_width(WELCOME, width);
    let banner_w = status::display_width(&banner);
    let mut padding = (width - banner_w) / 2;
    let mut out = String::new();
    if padding > 0 {
        out.push_str(FILLER);
        padding -= 1;
    }
    out.extend(std::iter::repeat_n(' ', padding));
    out.push_str(&banner);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_state::EditorState;
    use core_text::Document;
    use pretty_assertions::assert_eq;

    #[test]
    fn filler_rows_past_document_end() {
        let st = EditorState::with_file(Document::from_text("ab\ncd"), "f.txt");
        let model = EditorModel::with_screen(st, 6, 10);
        let f = Frame::build(&model);
        let texts: Vec<_> = f.rows.iter().map(|r| r.text.as_str()).collect();
        assert_eq!(&texts[..4], &["ab", "cd", "~", "~"]);
        assert_eq!(f.rows[4].flags, RowFlags::REVERSE);
        assert_eq!(f.rows[5].text, "");
        assert_eq!(f.cursor, (0, 0));
    }

    #[test]
    fn welcome_banner_on_blank_unnamed_document() {
        let model = EditorModel::with_screen(EditorState::new(Document::new()), 12, 60);
        let f = Frame::build(&model);
        let banner_row = f.row_text(10 / 3).unwrap();
        assert!(banner_row.starts_with('~'));
        assert!(banner_row.contains(WELCOME));
        assert_eq!(f.row_text(0), Some(""));
    }

    #[test]
    fn banner_truncated_in_narrow_terminal() {
        assert_eq!(welcome_row(5), "tilde");
    }

    #[test]
    fn named_blank_document_has_no_banner() {
        let st = EditorState::with_file(Document::new(), "new.txt");
        let model = EditorModel::with_screen(st, 12, 60);
        let f = Frame::build(&model);
        assert!(f.rows.iter().all(|r| !r.text.contains(WELCOME)));
    }

    #[test]
    fn rows_follow_offsets() {
        let st = EditorState::with_file(Document::from_text("0123456789\nabcdefghij\nxyz"), "f");
        let mut model = EditorModel::with_screen(st, 4, 4);
        {
            let (state, view) = model.split_state_and_view();
            view.set_cursor(&state.document, core_text::Position::new(1, 6));
            view.scroll_to_cursor(&state.document);
        }
        assert_eq!(model.view().col_offset, 3);
        let f = Frame::build(&model);
        assert_eq!(f.row_text(0), Some("3456"));
        assert_eq!(f.row_text(1), Some("defg"));
        assert_eq!(f.cursor, (3, 1));
    }
}
