//! Editor state: the document plus the metadata around it.
//!
//! File identity and line-ending style, the modification counter, the
//! ephemeral status message, the active prompt and the quit confirmation
//! count all live here. Cursor and viewport live in `core-model`;
//! presentation of the status/message bars lives in `core-render`.

use core_text::{Document, Position, SearchDirection};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing::debug;

/// Line ending style detected from the source file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LineEnding {
    #[default]
    Lf,
    Cr,
    Crlf,
}

impl LineEnding {
    pub fn as_str(self) -> &'static str {
        match self {
            LineEnding::Lf => "\n",
            LineEnding::Cr => "\r",
            LineEnding::Crlf => "\r\n",
        }
    }
}

/// Result of normalizing line endings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedText {
    pub normalized: String,         // LF-only content
    pub original: LineEnding,       // majority style
    pub had_trailing_newline: bool, // input ended with a line terminator
    pub mixed: bool,                // more than one style present
}

/// Rewrite CRLF and lone CR to LF. The majority style wins ties in the order
/// CRLF, LF, CR.
pub fn normalize_line_endings(input: &str) -> NormalizedText {
    let mut counts = [0usize; 3]; // crlf, lf, cr
    let mut out = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\r' if chars.peek() == Some(&'\n') => {
                chars.next();
                counts[0] += 1;
                out.push('\n');
            }
            '\r' => {
                counts[2] += 1;
                out.push('\n');
            }
            '\n' => {
                counts[1] += 1;
                out.push('\n');
            }
            other => out.push(other),
        }
    }

    let styles = [LineEnding::Crlf, LineEnding::Lf, LineEnding::Cr];
    let mut original = LineEnding::Lf;
    let mut max = 0;
    for (style, count) in styles.into_iter().zip(counts) {
        if count > max {
            max = count;
            original = style;
        }
    }
    let mixed = counts.iter().filter(|c| **c > 0).count() > 1;

    NormalizedText {
        had_trailing_newline: out.ends_with('\n'),
        normalized: out,
        original,
        mixed,
    }
}

/// Ephemeral status message shown in the message bar until it expires.
#[derive(Debug, Clone)]
pub struct EphemeralMessage {
    pub text: String,
    pub expires_at: Instant,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptKind {
    SaveAs,
    Find,
}

impl PromptKind {
    pub fn label(self) -> &'static str {
        match self {
            PromptKind::SaveAs => "Save as: ",
            PromptKind::Find => "Search: ",
        }
    }

    pub fn hint(self) -> &'static str {
        match self {
            PromptKind::SaveAs => " (ESC to cancel)",
            PromptKind::Find => " (Use ESC/Arrows/Enter)",
        }
    }
}

/// Message-bar prompt collecting a line of input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptState {
    pub kind: PromptKind,
    input: String,
    /// Cursor and scroll offsets to restore when a search is cancelled.
    pub saved_cursor: Position,
    pub saved_offsets: (usize, usize),
    pub last_match: Option<Position>,
    pub direction: SearchDirection,
}

impl PromptState {
    pub fn new(kind: PromptKind, saved_cursor: Position, saved_offsets: (usize, usize)) -> Self {
        Self {
            kind,
            input: String::new(),
            saved_cursor,
            saved_offsets,
            last_match: None,
            direction: SearchDirection::Forward,
        }
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn push_char(&mut self, ch: char) {
        if !ch.is_control() {
            self.input.push(ch);
        }
    }

    pub fn backspace(&mut self) {
        self.input.pop();
    }

    /// Full message-bar text: label, input, hint.
    pub fn display(&self) -> String {
        format!("{}{}{}", self.kind.label(), self.input, self.kind.hint())
    }

    /// Column of the prompt cursor within the message bar.
    pub fn cursor_col(&self) -> usize {
        self.kind.label().chars().count()
            + self
                .input
                .chars()
                .map(core_text::width::char_width)
                .sum::<usize>()
    }
}

/// Top-level editor state container.
#[derive(Debug)]
pub struct EditorState {
    pub document: Document,
    pub file_name: Option<PathBuf>,
    /// Number of edits since the last load or save.
    pub dirty: u64,
    pub original_line_ending: LineEnding,
    pub had_trailing_newline: bool,
    pub ephemeral_status: Option<EphemeralMessage>,
    pub prompt: Option<PromptState>,
    /// Quit presses seen in a row while the document had unsaved changes.
    pub quit_presses: u32,
}

impl EditorState {
    pub fn new(document: Document) -> Self {
        Self {
            document,
            file_name: None,
            dirty: 0,
            original_line_ending: LineEnding::Lf,
            had_trailing_newline: true,
            ephemeral_status: None,
            prompt: None,
            quit_presses: 0,
        }
    }

    pub fn with_file(document: Document, path: impl Into<PathBuf>) -> Self {
        let mut state = Self::new(document);
        state.file_name = Some(path.into());
        state
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty > 0
    }

    pub fn mark_dirty(&mut self) {
        self.dirty = self.dirty.saturating_add(1);
    }

    pub fn mark_clean(&mut self) {
        self.dirty = 0;
    }

    pub fn file_path(&self) -> Option<&Path> {
        self.file_name.as_deref()
    }

    /// File name as shown in the status bar.
    pub fn display_name(&self) -> String {
        match &self.file_name {
            Some(p) => p
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| p.display().to_string()),
            None => "[No Name]".to_string(),
        }
    }

    /// Set an ephemeral status message with a fixed timeout duration.
    pub fn set_ephemeral<S: Into<String>>(&mut self, msg: S, ttl: Duration) {
        self.set_ephemeral_at(msg, ttl, Instant::now());
    }

    pub fn set_ephemeral_at<S: Into<String>>(&mut self, msg: S, ttl: Duration, now: Instant) {
        self.ephemeral_status = Some(EphemeralMessage {
            text: msg.into(),
            expires_at: now + ttl,
        });
    }

    /// Tick ephemeral status; returns true if the message expired and was cleared.
    pub fn tick_ephemeral(&mut self) -> bool {
        self.tick_ephemeral_at(Instant::now())
    }

    pub fn tick_ephemeral_at(&mut self, now: Instant) -> bool {
        if let Some(m) = &self.ephemeral_status
            && now >= m.expires_at
        {
            self.ephemeral_status = None;
            return true;
        }
        false
    }

    pub fn status_text(&self) -> Option<&str> {
        self.ephemeral_status.as_ref().map(|m| m.text.as_str())
    }

    pub fn begin_prompt(&mut self, prompt: PromptState) {
        debug!(target: "runtime", kind = ?prompt.kind, "prompt_begin");
        self.prompt = Some(prompt);
    }

    pub fn end_prompt(&mut self) -> Option<PromptState> {
        self.prompt.take()
    }

    pub fn is_prompting(&self) -> bool {
        self.prompt.is_some()
    }
}
