//! Cursor and viewport control.
//!
//! A `View` owns the cursor and the scroll window over the document. It never
//! edits text; it reads the `Document` to clamp and translate columns.
//!
//! Invariants (hold after every public call that takes the document):
//! * `cursor.row < doc.line_count()` and `cursor.col <= doc.line_len(cursor.row)`.
//! * After `scroll_to_cursor`, the cursor's rendered position lies inside
//!   `[row_offset, row_offset + rows) x [col_offset, col_offset + cols)`.
//!   Scrolling is a minimal clamp, never a recenter.
//!
//! Vertical motion keeps a sticky rendered column (`desired_rx`) so moving
//! through a short line and back restores the original column. Any horizontal
//! motion or explicit placement forgets it.

use core_events::Direction;
use core_state::EditorState;
use core_text::{Document, Position};
use tracing::trace;

/// Screen rows below the text area: status bar and message bar.
pub const CHROME_ROWS: u16 = 2;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct View {
    pub cursor: Position,
    desired_rx: Option<usize>,
    pub row_offset: usize,
    pub col_offset: usize,
    /// Text area height in rows.
    pub rows: usize,
    /// Text area width in cells.
    pub cols: usize,
}

/// New offset along one axis so that `pos` lies in `[offset, offset + extent)`.
/// Returns `offset` unchanged when it already does.
pub fn clamp_offset(offset: usize, pos: usize, extent: usize) -> usize {
    if extent == 0 || pos < offset {
        pos
    } else if pos >= offset + extent {
        pos + 1 - extent
    } else {
        offset
    }
}

impl View {
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            ..Self::default()
        }
    }

    pub fn desired_rx(&self) -> Option<usize> {
        self.desired_rx
    }

    /// Rendered column of the cursor.
    pub fn cursor_rx(&self, doc: &Document) -> usize {
        doc.line(self.cursor.row)
            .map(|l| l.col_to_rx(self.cursor.col))
            .unwrap_or(0)
    }

    /// Cursor position relative to the top-left of the text area.
    pub fn screen_cursor(&self, doc: &Document) -> (usize, usize) {
        (
            self.cursor.row.saturating_sub(self.row_offset),
            self.cursor_rx(doc).saturating_sub(self.col_offset),
        )
    }

    /// Pull the cursor back inside the document after external edits.
    pub fn clamp(&mut self, doc: &Document) {
        let last = doc.line_count().saturating_sub(1);
        if self.cursor.row > last {
            self.cursor.row = last;
        }
        let len = doc.line_len(self.cursor.row);
        if self.cursor.col > len {
            self.cursor.col = len;
        }
    }

    /// Place the cursor explicitly (clamped). Forgets the sticky column.
    pub fn set_cursor(&mut self, doc: &Document, pos: Position) {
        self.cursor = pos;
        self.desired_rx = None;
        self.clamp(doc);
    }

    pub fn move_cursor(&mut self, doc: &Document, dir: Direction) {
        match dir {
            Direction::Left => {
                if self.cursor.col > 0 {
                    self.cursor.col -= 1;
                } else if self.cursor.row > 0 {
                    self.cursor.row -= 1;
                    self.cursor.col = doc.line_len(self.cursor.row);
                }
                self.desired_rx = None;
            }
            Direction::Right => {
                if self.cursor.col < doc.line_len(self.cursor.row) {
                    self.cursor.col += 1;
                } else if self.cursor.row + 1 < doc.line_count() {
                    self.cursor.row += 1;
                    self.cursor.col = 0;
                }
                self.desired_rx = None;
            }
            Direction::Up => {
                if self.cursor.row > 0 {
                    self.move_vertically(doc, self.cursor.row - 1);
                }
            }
            Direction::Down => {
                if self.cursor.row + 1 < doc.line_count() {
                    self.move_vertically(doc, self.cursor.row + 1);
                }
            }
        }
        trace!(target: "runtime", row = self.cursor.row, col = self.cursor.col, "cursor_moved");
    }

    fn move_vertically(&mut self, doc: &Document, target: usize) {
        let desired = match self.desired_rx {
            Some(rx) => rx,
            None => self.cursor_rx(doc),
        };
        self.cursor.row = target.min(doc.line_count().saturating_sub(1));
        self.cursor.col = doc
            .line(self.cursor.row)
            .map(|l| l.rx_to_col(desired))
            .unwrap_or(0);
        self.desired_rx = Some(desired);
    }

    /// Move one screen up, keeping the sticky column.
    pub fn page_up(&mut self, doc: &Document) {
        let target = self.row_offset.saturating_sub(self.rows.max(1));
        if target != self.cursor.row {
            self.move_vertically(doc, target);
        }
    }

    /// Move one screen down, keeping the sticky column.
    pub fn page_down(&mut self, doc: &Document) {
        let page = self.rows.max(1);
        let last = doc.line_count().saturating_sub(1);
        let target = (self.row_offset + 2 * page - 1).min(last);
        if target != self.cursor.row {
            self.move_vertically(doc, target);
        }
    }

    pub fn home(&mut self) {
        self.cursor.col = 0;
        self.desired_rx = None;
    }

    pub fn end(&mut self, doc: &Document) {
        self.cursor.col = doc.line_len(self.cursor.row);
        self.desired_rx = None;
    }

    pub fn file_start(&mut self) {
        self.cursor = Position::origin();
        self.desired_rx = None;
    }

    pub fn file_end(&mut self, doc: &Document) {
        let last = doc.line_count().saturating_sub(1);
        self.cursor = Position::new(last, doc.line_len(last));
        self.desired_rx = None;
    }

    /// Adjust offsets minimally so the cursor is visible. Returns true when
    /// either offset changed.
    pub fn scroll_to_cursor(&mut self, doc: &Document) -> bool {
        self.clamp(doc);
        let rx = self.cursor_rx(doc);
        let row_offset = clamp_offset(self.row_offset, self.cursor.row, self.rows);
        let col_offset = clamp_offset(self.col_offset, rx, self.cols);
        let changed = row_offset != self.row_offset || col_offset != self.col_offset;
        if changed {
            trace!(target: "runtime", row_offset, col_offset, "viewport_scrolled");
        }
        self.row_offset = row_offset;
        self.col_offset = col_offset;
        changed
    }

    /// New text area size; re-clamps the offsets around the cursor.
    pub fn resize(&mut self, doc: &Document, rows: usize, cols: usize) {
        self.rows = rows;
        self.cols = cols;
        self.scroll_to_cursor(doc);
    }
}

/// Editor state plus its single view.
#[derive(Debug)]
pub struct EditorModel {
    state: EditorState,
    view: View,
}

impl EditorModel {
    pub fn new(state: EditorState) -> Self {
        Self {
            state,
            view: View::default(),
        }
    }

    /// Model sized for a terminal of `screen_rows x screen_cols`.
    pub fn with_screen(state: EditorState, screen_rows: u16, screen_cols: u16) -> Self {
        let mut model = Self::new(state);
        model.resize_screen(screen_rows, screen_cols);
        model
    }

    pub fn state(&self) -> &EditorState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut EditorState {
        &mut self.state
    }

    pub fn view(&self) -> &View {
        &self.view
    }

    pub fn view_mut(&mut self) -> &mut View {
        &mut self.view
    }

    pub fn document(&self) -> &Document {
        &self.state.document
    }

    /// Disjoint mutable borrows of the state and the view.
    pub fn split_state_and_view(&mut self) -> (&mut EditorState, &mut View) {
        (&mut self.state, &mut self.view)
    }

    /// Terminal size changed; the text area excludes the status and message bars.
    pub fn resize_screen(&mut self, screen_rows: u16, screen_cols: u16) {
        let rows = screen_rows.saturating_sub(CHROME_ROWS) as usize;
        self.view
            .resize(&self.state.document, rows, screen_cols as usize);
    }

    /// Screen size the view was last sized for.
    pub fn screen_size(&self) -> (u16, u16) {
        let rows = (self.view.rows as u16).saturating_add(CHROME_ROWS);
        (rows, self.view.cols as u16)
    }
}
