//! Terminal backend abstraction and the raw-mode termios implementation.
//!
//! The editor core only sees `TerminalBackend`: read one byte with a bounded
//! wait, query the viewport size, write raw bytes. `RawTerminal` is the real
//! session over stdin/stdout and restores the saved terminal mode when dropped,
//! so every exit path (normal quit, `?` error return, panic unwind) goes
//! through exactly one restore. `ScriptedTerminal` is an in-memory backend fed
//! from a byte script.

use std::collections::VecDeque;
use std::io;
use thiserror::Error;

mod raw;
mod size;

pub use raw::RawTerminal;
pub use size::{parse_cursor_report, size_from_cursor_report};

#[derive(Debug, Error)]
pub enum TerminalError {
    /// Raw mode or size query failed; fatal for the process.
    #[error("{op}: {source}")]
    Setup {
        op: &'static str,
        #[source]
        source: io::Error,
    },
    /// Read or write failed after setup.
    #[error("{op}: {source}")]
    Io {
        op: &'static str,
        #[source]
        source: io::Error,
    },
}

impl TerminalError {
    /// Name of the failing operation (`tcgetattr`, `read`, ...).
    pub fn op(&self) -> &'static str {
        match self {
            TerminalError::Setup { op, .. } | TerminalError::Io { op, .. } => op,
        }
    }
}

pub type TerminalResult<T> = Result<T, TerminalError>;

/// Adapter configuration shared by all backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TerminalOptions {
    /// Read timeout in deciseconds (termios VTIME). Clamped to at least 1.
    pub read_timeout_ds: u8,
}

impl Default for TerminalOptions {
    fn default() -> Self {
        Self { read_timeout_ds: 1 }
    }
}

pub trait TerminalBackend {
    /// Read a single byte. `Ok(None)` means the read timeout elapsed with no input.
    fn read_byte(&mut self) -> TerminalResult<Option<u8>>;
    /// Current viewport size as `(rows, cols)`.
    fn viewport_size(&mut self) -> TerminalResult<(u16, u16)>;
    /// Write and flush raw bytes.
    fn write_all(&mut self, bytes: &[u8]) -> TerminalResult<()>;
}

/// In-memory backend: input is a script of bytes and timeouts, output is captured.
#[derive(Debug, Default)]
pub struct ScriptedTerminal {
    input: VecDeque<Option<u8>>,
    size: (u16, u16),
    pub output: Vec<u8>,
}

impl ScriptedTerminal {
    pub fn new(rows: u16, cols: u16) -> Self {
        Self {
            input: VecDeque::new(),
            size: (rows, cols),
            output: Vec::new(),
        }
    }

    /// Queue bytes to be returned by `read_byte`.
    pub fn push_bytes(&mut self, bytes: &[u8]) {
        self.input.extend(bytes.iter().copied().map(Some));
    }

    /// Queue a read timeout.
    pub fn push_timeout(&mut self) {
        self.input.push_back(None);
    }

    pub fn resize(&mut self, rows: u16, cols: u16) {
        self.size = (rows, cols);
    }

    pub fn is_drained(&self) -> bool {
        self.input.is_empty()
    }
}

impl TerminalBackend for ScriptedTerminal {
    fn read_byte(&mut self) -> TerminalResult<Option<u8>> {
        match self.input.pop_front() {
            Some(next) => Ok(next),
            None => Err(TerminalError::Io {
                op: "read",
                source: io::Error::new(io::ErrorKind::UnexpectedEof, "input script exhausted"),
            }),
        }
    }

    fn viewport_size(&mut self) -> TerminalResult<(u16, u16)> {
        Ok(self.size)
    }

    fn write_all(&mut self, bytes: &[u8]) -> TerminalResult<()> {
        self.output.extend_from_slice(bytes);
        Ok(())
    }
}
