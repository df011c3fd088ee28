//! Line-oriented text buffer.
//!
//! A `Document` is an ordered sequence of `Line`s and always holds at least one
//! line (an empty document is a single empty line). All mutations validate
//! their coordinates first and return `TextError::OutOfBounds` without touching
//! the document when they are invalid. Each mutation drops the render cache of
//! the lines it modified and of no others.

use thiserror::Error;

mod line;
pub mod width;

pub use line::Line;
pub use width::DEFAULT_TAB_STOP;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum TextError {
    #[error("position ({row}, {col}) is outside the document")]
    OutOfBounds { row: usize, col: usize },
}

pub type TextResult<T> = Result<T, TextError>;

/// A logical position: row index and character column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, PartialOrd, Ord)]
pub struct Position {
    pub row: usize,
    pub col: usize,
}

impl Position {
    pub fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }
    pub fn origin() -> Self {
        Self::default()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchDirection {
    Forward,
    Backward,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    lines: Vec<Line>,
    tab_stop: usize,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// Empty document: one empty line.
    pub fn new() -> Self {
        Self::with_tab_stop(DEFAULT_TAB_STOP)
    }

    pub fn with_tab_stop(tab_stop: usize) -> Self {
        Self {
            lines: vec![Line::new("", tab_stop)],
            tab_stop: tab_stop.max(1),
        }
    }

    /// Build from raw lines (no newline characters). An empty iterator yields one empty line.
    pub fn from_lines<I, S>(lines: I, tab_stop: usize) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut lines: Vec<Line> = lines
            .into_iter()
            .map(|s| Line::new(s, tab_stop))
            .collect();
        if lines.is_empty() {
            lines.push(Line::new("", tab_stop));
        }
        Self {
            lines,
            tab_stop: tab_stop.max(1),
        }
    }

    /// Convenience constructor splitting on `\n`.
    pub fn from_text(text: &str) -> Self {
        Self::from_lines(text.split('\n'), DEFAULT_TAB_STOP)
    }

    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    pub fn line(&self, row: usize) -> Option<&Line> {
        self.lines.get(row)
    }

    /// Character length of `row` (0 for rows past the end).
    pub fn line_len(&self, row: usize) -> usize {
        self.lines.get(row).map(Line::len).unwrap_or(0)
    }

    pub fn lines(&self) -> impl Iterator<Item = &Line> {
        self.lines.iter()
    }

    /// Raw content of every line.
    pub fn to_lines(&self) -> Vec<String> {
        self.lines.iter().map(|l| l.as_str().to_string()).collect()
    }

    /// True for the single-empty-line document.
    pub fn is_blank(&self) -> bool {
        self.lines.len() == 1 && self.lines[0].is_empty()
    }

    pub fn tab_stop(&self) -> usize {
        self.tab_stop
    }

    pub fn set_tab_stop(&mut self, tab_stop: usize) {
        self.tab_stop = tab_stop.max(1);
        for line in &mut self.lines {
            line.set_tab_stop(self.tab_stop);
        }
    }

    fn check(&self, row: usize, col: usize) -> TextResult<()> {
        match self.lines.get(row) {
            Some(line) if col <= line.len() => Ok(()),
            _ => Err(TextError::OutOfBounds { row, col }),
        }
    }

    /// Insert `ch` at `(row, col)`; returns the position just after it.
    /// A `'\n'` is treated as `insert_newline`.
    pub fn insert_char(&mut self, row: usize, col: usize, ch: char) -> TextResult<Position> {
        if ch == '\n' {
            return self.insert_newline(row, col);
        }
        self.check(row, col)?;
        self.lines[row].insert(col, ch);
        Ok(Position::new(row, col + 1))
    }

    /// Backspace semantics: delete the character before `col`, or join `row` onto
    /// the previous line when `col == 0`. Returns the resulting cursor position.
    /// At `(0, 0)` nothing changes.
    pub fn delete_char(&mut self, row: usize, col: usize) -> TextResult<Position> {
        self.check(row, col)?;
        if col > 0 {
            self.lines[row].remove(col - 1);
            return Ok(Position::new(row, col - 1));
        }
        if row == 0 {
            return Ok(Position::origin());
        }
        let removed = self.lines.remove(row);
        let prev = &mut self.lines[row - 1];
        let join_col = prev.len();
        prev.push_str(removed.as_str());
        Ok(Position::new(row - 1, join_col))
    }

    /// Delete-key semantics: remove the character at `col`, or pull the next line
    /// up when `col` is at end of line. No-op at the end of the last line.
    pub fn delete_char_forward(&mut self, row: usize, col: usize) -> TextResult<()> {
        self.check(row, col)?;
        if col < self.lines[row].len() {
            self.lines[row].remove(col);
            return Ok(());
        }
        if row + 1 < self.lines.len() {
            let next = self.lines.remove(row + 1);
            self.lines[row].push_str(next.as_str());
        }
        Ok(())
    }

    /// Split `row` at `col`; returns the start of the new line.
    pub fn insert_newline(&mut self, row: usize, col: usize) -> TextResult<Position> {
        self.check(row, col)?;
        let tail = self.lines[row].split_off(col);
        self.lines.insert(row + 1, Line::new(tail, self.tab_stop));
        Ok(Position::new(row + 1, 0))
    }

    /// Insert a whole line before index `at` (`at == line_count()` appends).
    pub fn insert_line(&mut self, at: usize, text: impl Into<String>) -> TextResult<()> {
        if at > self.lines.len() {
            return Err(TextError::OutOfBounds { row: at, col: 0 });
        }
        self.lines.insert(at, Line::new(text, self.tab_stop));
        Ok(())
    }

    /// Remove line `row`, returning its raw text. Removing the only line leaves
    /// one empty line behind.
    pub fn delete_line(&mut self, row: usize) -> TextResult<String> {
        self.check(row, 0)?;
        let removed = self.lines.remove(row);
        if self.lines.is_empty() {
            self.lines.push(Line::new("", self.tab_stop));
        }
        Ok(removed.as_str().to_string())
    }

    /// Next occurrence of `query` starting strictly after (or before, for
    /// `Backward`) `from`, wrapping around the document. The match at `from`
    /// itself is returned only when it is the sole occurrence.
    pub fn find(
        &self,
        query: &str,
        from: Position,
        direction: SearchDirection,
    ) -> Option<Position> {
        if query.is_empty() {
            return None;
        }
        let n = self.lines.len();
        let origin = from.row.min(n - 1);
        for step in 0..=n {
            let row = match direction {
                SearchDirection::Forward => (origin + step) % n,
                SearchDirection::Backward => (origin + n - step % n) % n,
            };
            let cols = self.lines[row].match_cols(query);
            let hit = match (direction, step) {
                (SearchDirection::Forward, 0) => cols.into_iter().find(|c| *c > from.col),
                (SearchDirection::Backward, 0) => cols.into_iter().rev().find(|c| *c < from.col),
                (SearchDirection::Forward, _) => cols.into_iter().next(),
                (SearchDirection::Backward, _) => cols.into_iter().next_back(),
            };
            if let Some(col) = hit {
                return Some(Position::new(row, col));
            }
        }
        None
    }
}
