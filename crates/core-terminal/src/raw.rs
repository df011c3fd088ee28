//! Raw-mode session over stdin/stdout using rustix's termios API.
//!
//! Differs from `cfmakeraw` in one respect: `VMIN = 0, VTIME = n` so a read
//! returns after at most `n` deciseconds even when no key was pressed. That
//! bounded wait is what lets the main loop expire status messages and notice
//! resizes while idle.

use crate::size::size_from_cursor_report;
use crate::{TerminalBackend, TerminalError, TerminalOptions, TerminalResult};
use rustix::io::Errno;
use rustix::termios::{
    self, ControlModes, InputModes, LocalModes, OptionalActions, OutputModes, SpecialCodeIndex,
    Termios,
};
use std::io::{self, Write};
use tracing::{debug, info, warn};

/// Clear screen + home, written once when the session ends.
const EXIT_CLEAR: &[u8] = b"\x1b[2J\x1b[H";

/// Bytes written when the session ends. A panicking exit keeps the screen so
/// the panic message printed just before unwinding stays visible.
fn exit_sequence(panicking: bool) -> &'static [u8] {
    if panicking { &b"\r\n"[..] } else { EXIT_CLEAR }
}

/// Outcome of a zero-length read. With VMIN=0 that is normally the read
/// timeout, but a hung-up terminal also reads 0 immediately; it is told apart
/// by the terminal no longer answering `tcgetattr`.
fn zero_read(tty_alive: bool) -> TerminalResult<Option<u8>> {
    if tty_alive {
        return Ok(None);
    }
    Err(TerminalError::Io {
        op: "read",
        source: io::Error::new(io::ErrorKind::UnexpectedEof, "terminal hung up"),
    })
}

/// RAII raw-mode session. The saved terminal mode is restored exactly once: by
/// `restore()` or, failing that, by `Drop`.
pub struct RawTerminal {
    stdin: io::Stdin,
    stdout: io::Stdout,
    original: Termios,
    active: bool,
    /// Size measured through the cursor report, reused while the ioctl stays unusable.
    fallback_size: Option<(u16, u16)>,
}

impl std::fmt::Debug for RawTerminal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RawTerminal")
            .field("active", &self.active)
            .field("fallback_size", &self.fallback_size)
            .finish()
    }
}

fn setup_err(op: &'static str, e: Errno) -> TerminalError {
    TerminalError::Setup {
        op,
        source: io::Error::from(e),
    }
}

impl RawTerminal {
    /// Save the current mode and switch stdin to raw mode.
    pub fn enter(options: TerminalOptions) -> TerminalResult<Self> {
        let stdin = io::stdin();
        let original = termios::tcgetattr(&stdin).map_err(|e| setup_err("tcgetattr", e))?;

        let mut raw = original.clone();
        raw.input_modes.remove(
            InputModes::BRKINT
                | InputModes::ICRNL
                | InputModes::INPCK
                | InputModes::ISTRIP
                | InputModes::IXON,
        );
        raw.output_modes.remove(OutputModes::OPOST);
        raw.control_modes.insert(ControlModes::CS8);
        raw.local_modes.remove(
            LocalModes::ECHO | LocalModes::ICANON | LocalModes::IEXTEN | LocalModes::ISIG,
        );
        raw.special_codes[SpecialCodeIndex::VMIN] = 0;
        raw.special_codes[SpecialCodeIndex::VTIME] = options.read_timeout_ds.max(1);

        termios::tcsetattr(&stdin, OptionalActions::Flush, &raw)
            .map_err(|e| setup_err("tcsetattr", e))?;
        info!(
            target: "terminal",
            read_timeout_ds = options.read_timeout_ds.max(1),
            "raw_mode_entered"
        );

        Ok(Self {
            stdin,
            stdout: io::stdout(),
            original,
            active: true,
            fallback_size: None,
        })
    }

    /// Clear the screen and restore the saved mode. Idempotent.
    pub fn restore(&mut self) -> TerminalResult<()> {
        if !self.active {
            return Ok(());
        }
        self.active = false;
        if let Err(e) = self
            .stdout
            .write_all(exit_sequence(std::thread::panicking()))
            .and_then(|_| self.stdout.flush())
        {
            warn!(target: "terminal", ?e, "exit_clear_failed");
        }
        termios::tcsetattr(&self.stdin, OptionalActions::Flush, &self.original)
            .map_err(|e| setup_err("tcsetattr", e))?;
        info!(target: "terminal", "raw_mode_restored");
        Ok(())
    }

    /// Size query: the window-size ioctl first, the cursor position report when
    /// that fails or reports zero columns. The report is probed once per session.
    pub fn query_viewport_size(&mut self) -> TerminalResult<(u16, u16)> {
        match crossterm::terminal::size() {
            Ok((cols, rows)) if cols > 0 && rows > 0 => Ok((rows, cols)),
            other => {
                if let Some(size) = self.fallback_size {
                    return Ok(size);
                }
                debug!(target: "terminal", ?other, "size_ioctl_unusable");
                let size = size_from_cursor_report(self)?;
                self.fallback_size = Some(size);
                Ok(size)
            }
        }
    }
}

impl TerminalBackend for RawTerminal {
    fn read_byte(&mut self) -> TerminalResult<Option<u8>> {
        let mut buf = [0u8; 1];
        match rustix::io::read(&self.stdin, &mut buf[..]) {
            Ok(0) => zero_read(termios::tcgetattr(&self.stdin).is_ok()),
            Ok(_) => Ok(Some(buf[0])),
            Err(e) if e == Errno::AGAIN || e == Errno::INTR => Ok(None),
            Err(e) => Err(TerminalError::Io {
                op: "read",
                source: io::Error::from(e),
            }),
        }
    }

    fn viewport_size(&mut self) -> TerminalResult<(u16, u16)> {
        self.query_viewport_size()
    }

    fn write_all(&mut self, bytes: &[u8]) -> TerminalResult<()> {
        self.stdout
            .write_all(bytes)
            .and_then(|_| self.stdout.flush())
            .map_err(|source| TerminalError::Io { op: "write", source })
    }
}

impl Drop for RawTerminal {
    fn drop(&mut self) {
        if let Err(e) = self.restore() {
            warn!(target: "terminal", ?e, "restore_on_drop_failed");
        }
    }
}
