//! Viewport size fallback through the cursor position report.
//!
//! When the size ioctl is unavailable (or reports zero columns) we push the
//! cursor to the far bottom-right corner, ask the terminal where it ended up
//! (`ESC [ 6 n`) and parse the `ESC [ <rows> ; <cols> R` reply.

use crate::{TerminalBackend, TerminalError, TerminalResult};
use std::io;
use tracing::debug;

const PROBE: &[u8] = b"\x1b[999C\x1b[999B\x1b[6n";
const REPORT_MAX: usize = 32;
/// Consecutive read timeouts tolerated while waiting for the report.
const REPORT_TIMEOUTS: usize = 10;

/// Parse a cursor position report (`ESC [ rows ; cols` with optional trailing `R`).
pub fn parse_cursor_report(buf: &[u8]) -> Option<(u16, u16)> {
    let body = buf.strip_prefix(b"\x1b[")?;
    let body = body.strip_suffix(b"R").unwrap_or(body);
    let text = std::str::from_utf8(body).ok()?;
    let (rows, cols) = text.split_once(';')?;
    let rows: u16 = rows.parse().ok()?;
    let cols: u16 = cols.parse().ok()?;
    if rows == 0 || cols == 0 {
        return None;
    }
    Some((rows, cols))
}

/// Measure the viewport by probing the cursor position. Returns `(rows, cols)`.
pub fn size_from_cursor_report<T>(term: &mut T) -> TerminalResult<(u16, u16)>
where
    T: TerminalBackend + ?Sized,
{
    term.write_all(PROBE)?;
    let mut buf = Vec::with_capacity(REPORT_MAX);
    let mut timeouts = 0usize;
    while buf.len() < REPORT_MAX {
        match term.read_byte()? {
            Some(b'R') => break,
            Some(b) => buf.push(b),
            None => {
                timeouts += 1;
                if timeouts >= REPORT_TIMEOUTS {
                    break;
                }
            }
        }
    }
    match parse_cursor_report(&buf) {
        Some(size) => {
            debug!(target: "terminal", rows = size.0, cols = size.1, "cursor_report_size");
            Ok(size)
        }
        None => Err(TerminalError::Setup {
            op: "get_window_size",
            source: io::Error::new(
                io::ErrorKind::InvalidData,
                "malformed cursor position report",
            ),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ScriptedTerminal;
    use pretty_assertions::assert_eq;

    #[test]
    fn parses_report_with_and_without_terminator() {
        assert_eq!(parse_cursor_report(b"\x1b[24;80R"), Some((24, 80)));
        assert_eq!(parse_cursor_report(b"\x1b[50;132"), Some((50, 132)));
    }

    #[test]
    fn rejects_malformed_reports() {
        assert_eq!(parse_cursor_report(b"24;80R"), None);
        assert_eq!(parse_cursor_report(b"\x1b[24R"), None);
        assert_eq!(parse_cursor_report(b"\x1b[a;bR"), None);
        assert_eq!(parse_cursor_report(b"\x1b[0;80R"), None);
    }

    #[test]
    fn probe_returns_parsed_size() {
        let mut t = ScriptedTerminal::new(0, 0);
        t.push_timeout();
        t.push_bytes(b"\x1b[40;100R");
        assert_eq!(size_from_cursor_report(&mut t).unwrap(), (40, 100));
        assert_eq!(t.output, PROBE);
    }

    #[test]
    fn probe_without_reply_fails_with_op_name() {
        let mut t = ScriptedTerminal::new(0, 0);
        for _ in 0..REPORT_TIMEOUTS {
            t.push_timeout();
        }
        let err = size_from_cursor_report(&mut t).unwrap_err();
        assert_eq!(err.op(), "get_window_size");
    }
}
