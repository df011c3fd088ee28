//! Byte-level key decoder.
//!
//! States: `Normal`, `EscapeSeen` (after ESC), `Csi` (after `ESC [`), `Ss3`
//! (after `ESC O`) and `Utf8` (inside a multi-byte character). Every byte
//! either completes a key, advances a pending sequence, or discards it.
//!
//! Malformed input is never fatal. A pending sequence is dropped when:
//! * an unknown final byte arrives,
//! * it grows past `MAX_SEQUENCE_LEN` bytes,
//! * a control byte interrupts it (the control byte is then decoded normally),
//! * `max_pending_reads` consecutive read timeouts pass without completing it.
//!
//! A lone ESC followed by a timeout is the Esc key.

use core_events::{KeyCode, KeyEvent, KeyModifiers};
use tracing::debug;

const ESC: u8 = 0x1b;
const MAX_SEQUENCE_LEN: usize = 16;
pub const DEFAULT_MAX_PENDING_READS: usize = 3;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
enum State {
    #[default]
    Normal,
    EscapeSeen,
    Csi {
        params: Vec<u8>,
    },
    Ss3,
    Utf8 {
        buf: Vec<u8>,
        need: usize,
    },
}

impl State {
    fn name(&self) -> &'static str {
        match self {
            State::Normal => "normal",
            State::EscapeSeen => "escape",
            State::Csi { .. } => "csi",
            State::Ss3 => "ss3",
            State::Utf8 { .. } => "utf8",
        }
    }
}

#[derive(Debug)]
pub struct InputDecoder {
    state: State,
    max_pending_reads: usize,
    pending_reads: usize,
    discarded: u64,
}

impl Default for InputDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl InputDecoder {
    pub fn new() -> Self {
        Self::with_max_pending_reads(DEFAULT_MAX_PENDING_READS)
    }

    pub fn with_max_pending_reads(max_pending_reads: usize) -> Self {
        Self {
            state: State::Normal,
            max_pending_reads: max_pending_reads.max(1),
            pending_reads: 0,
            discarded: 0,
        }
    }

    /// True when no sequence is pending.
    pub fn is_idle(&self) -> bool {
        self.state == State::Normal
    }

    pub fn state_name(&self) -> &'static str {
        self.state.name()
    }

    /// Number of partial sequences dropped so far.
    pub fn discarded(&self) -> u64 {
        self.discarded
    }

    /// Feed one byte; returns a key once a complete one has been decoded.
    pub fn feed(&mut self, byte: u8) -> Option<KeyEvent> {
        self.pending_reads = 0;
        match std::mem::take(&mut self.state) {
            State::Normal => self.feed_normal(byte),
            State::EscapeSeen => self.feed_escape(byte),
            State::Csi { params } => self.feed_csi(params, byte),
            State::Ss3 => self.feed_ss3(byte),
            State::Utf8 { buf, need } => self.feed_utf8(buf, need, byte),
        }
    }

    /// Report a read timeout. Resolves a lone ESC and ages pending sequences.
    pub fn on_timeout(&mut self) -> Option<KeyEvent> {
        match self.state {
            State::Normal => None,
            State::EscapeSeen => {
                self.state = State::Normal;
                Some(KeyEvent::new(KeyCode::Esc))
            }
            _ => {
                self.pending_reads += 1;
                if self.pending_reads >= self.max_pending_reads {
                    self.discard("timeout");
                }
                None
            }
        }
    }

    fn discard(&mut self, reason: &'static str) {
        debug!(
            target: "input.decode",
            state = self.state.name(),
            reason,
            "malformed_sequence_discarded"
        );
        self.discarded += 1;
        self.state = State::Normal;
        self.pending_reads = 0;
    }

    fn feed_normal(&mut self, byte: u8) -> Option<KeyEvent> {
        match byte {
            ESC => {
                self.state = State::EscapeSeen;
                None
            }
            b'\r' => Some(KeyEvent::new(KeyCode::Enter)),
            b'\t' => Some(KeyEvent::new(KeyCode::Tab)),
            0x7f => Some(KeyEvent::new(KeyCode::Backspace)),
            0x00 => Some(KeyEvent::ctrl(' ')),
            0x01..=0x1a => Some(KeyEvent::ctrl((byte + 0x60) as char)),
            0x1c..=0x1f => Some(KeyEvent::ctrl((byte + 0x40) as char)),
            0x20..=0x7e => Some(KeyEvent::new(KeyCode::Char(byte as char))),
            0xc2..=0xdf => self.begin_utf8(byte, 1),
            0xe0..=0xef => self.begin_utf8(byte, 2),
            0xf0..=0xf4 => self.begin_utf8(byte, 3),
            _ => {
                self.discard("invalid_utf8_lead");
                None
            }
        }
    }

    fn begin_utf8(&mut self, lead: u8, need: usize) -> Option<KeyEvent> {
        let mut buf = Vec::with_capacity(need + 1);
        buf.push(lead);
        self.state = State::Utf8 { buf, need };
        None
    }

    fn feed_utf8(&mut self, mut buf: Vec<u8>, need: usize, byte: u8) -> Option<KeyEvent> {
        if !(0x80..=0xbf).contains(&byte) {
            self.state = State::Utf8 { buf, need };
            self.discard("truncated_utf8");
            return self.feed_normal(byte);
        }
        buf.push(byte);
        if buf.len() <= need {
            self.state = State::Utf8 { buf, need };
            return None;
        }
        match std::str::from_utf8(&buf).ok().and_then(|s| s.chars().next()) {
            Some(c) => Some(KeyEvent::new(KeyCode::Char(c))),
            None => {
                self.state = State::Utf8 { buf, need };
                self.discard("invalid_utf8");
                None
            }
        }
    }

    fn feed_escape(&mut self, byte: u8) -> Option<KeyEvent> {
        match byte {
            b'[' => {
                self.state = State::Csi { params: Vec::new() };
                None
            }
            b'O' => {
                self.state = State::Ss3;
                None
            }
            ESC => {
                // ESC ESC: the first one was a bare Esc press.
                self.state = State::EscapeSeen;
                Some(KeyEvent::new(KeyCode::Esc))
            }
            0x20..=0x7e => Some(KeyEvent::with_mods(
                KeyCode::Char(byte as char),
                KeyModifiers::ALT,
            )),
            _ => {
                self.state = State::EscapeSeen;
                self.discard("unexpected_after_escape");
                self.feed_normal(byte)
            }
        }
    }

    fn feed_csi(&mut self, mut params: Vec<u8>, byte: u8) -> Option<KeyEvent> {
        match byte {
            0x20..=0x3f => {
                params.push(byte);
                if params.len() > MAX_SEQUENCE_LEN {
                    self.state = State::Csi { params };
                    self.discard("sequence_too_long");
                } else {
                    self.state = State::Csi { params };
                }
                None
            }
            0x40..=0x7e => {
                let key = decode_csi(&params, byte);
                if key.is_none() {
                    self.state = State::Csi { params };
                    self.discard("unknown_csi_final");
                }
                key
            }
            _ => {
                self.state = State::Csi { params };
                self.discard("interrupted_csi");
                self.feed_normal(byte)
            }
        }
    }

    fn feed_ss3(&mut self, byte: u8) -> Option<KeyEvent> {
        match cursor_key(byte) {
            Some(code) => Some(KeyEvent::new(code)),
            None => {
                self.state = State::Ss3;
                self.discard("unknown_ss3_final");
                if byte < 0x20 { self.feed_normal(byte) } else { None }
            }
        }
    }
}

fn cursor_key(byte: u8) -> Option<KeyCode> {
    match byte {
        b'A' => Some(KeyCode::Up),
        b'B' => Some(KeyCode::Down),
        b'C' => Some(KeyCode::Right),
        b'D' => Some(KeyCode::Left),
        b'H' => Some(KeyCode::Home),
        b'F' => Some(KeyCode::End),
        _ => None,
    }
}

/// Decode a complete CSI sequence from its parameter bytes and final byte.
fn decode_csi(params: &[u8], final_byte: u8) -> Option<KeyEvent> {
    let text = std::str::from_utf8(params).ok()?;
    let mut fields = Vec::new();
    if !text.is_empty() {
        for part in text.split(';') {
            if part.is_empty() {
                fields.push(1u16);
            } else {
                fields.push(part.parse::<u16>().ok()?);
            }
        }
    }
    let mods = fields
        .get(1)
        .copied()
        .map(KeyModifiers::from_xterm_param)
        .unwrap_or_default();

    let code = if final_byte == b'~' {
        match fields.first().copied()? {
            1 | 7 => KeyCode::Home,
            3 => KeyCode::Delete,
            4 | 8 => KeyCode::End,
            5 => KeyCode::PageUp,
            6 => KeyCode::PageDown,
            _ => return None,
        }
    } else {
        cursor_key(final_byte)?
    };
    Some(KeyEvent::with_mods(code, mods))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn decode(bytes: &[u8]) -> Vec<KeyEvent> {
        let mut d = InputDecoder::new();
        bytes.iter().filter_map(|b| d.feed(*b)).collect()
    }

    #[test]
    fn arrows_and_specials() {
        assert_eq!(decode(b"\x1b[A"), vec![KeyEvent::new(KeyCode::Up)]);
        assert_eq!(decode(b"\x1b[D"), vec![KeyEvent::new(KeyCode::Left)]);
        assert_eq!(decode(b"\x1b[3~"), vec![KeyEvent::new(KeyCode::Delete)]);
        assert_eq!(decode(b"\x1b[5~"), vec![KeyEvent::new(KeyCode::PageUp)]);
        assert_eq!(decode(b"\x1b[6~"), vec![KeyEvent::new(KeyCode::PageDown)]);
        assert_eq!(decode(b"\x1b[1~"), vec![KeyEvent::new(KeyCode::Home)]);
        assert_eq!(decode(b"\x1b[4~"), vec![KeyEvent::new(KeyCode::End)]);
        assert_eq!(decode(b"\x1bOH"), vec![KeyEvent::new(KeyCode::Home)]);
        assert_eq!(decode(b"\x1b[F"), vec![KeyEvent::new(KeyCode::End)]);
    }

    #[test]
    fn modifier_parameter_decoded() {
        assert_eq!(
            decode(b"\x1b[1;5C"),
            vec![KeyEvent::with_mods(KeyCode::Right, KeyModifiers::CTRL)]
        );
        assert_eq!(
            decode(b"\x1b[3;2~"),
            vec![KeyEvent::with_mods(KeyCode::Delete, KeyModifiers::SHIFT)]
        );
    }

    #[test]
    fn control_bytes_become_ctrl_chars() {
        assert_eq!(decode(&[0x11]), vec![KeyEvent::ctrl('q')]);
        assert_eq!(decode(&[0x13]), vec![KeyEvent::ctrl('s')]);
        assert_eq!(decode(b"\r"), vec![KeyEvent::new(KeyCode::Enter)]);
        assert_eq!(decode(&[0x7f]), vec![KeyEvent::new(KeyCode::Backspace)]);
    }

    #[test]
    fn utf8_multibyte_is_one_char() {
        assert_eq!(
            decode("é漢".as_bytes()),
            vec![
                KeyEvent::new(KeyCode::Char('é')),
                KeyEvent::new(KeyCode::Char('漢'))
            ]
        );
    }

    #[test]
    fn lone_escape_resolves_on_timeout() {
        let mut d = InputDecoder::new();
        assert_eq!(d.feed(ESC), None);
        assert_eq!(d.on_timeout(), Some(KeyEvent::new(KeyCode::Esc)));
        assert!(d.is_idle());
    }

    #[test]
    fn unknown_final_discards_and_recovers() {
        let mut d = InputDecoder::new();
        let keys: Vec<_> = b"\x1b[9~x".iter().filter_map(|b| d.feed(*b)).collect();
        assert_eq!(keys, vec![KeyEvent::new(KeyCode::Char('x'))]);
        assert_eq!(d.discarded(), 1);
        assert!(d.is_idle());
    }

    #[test]
    fn stalled_sequence_discarded_after_bounded_timeouts() {
        let mut d = InputDecoder::with_max_pending_reads(2);
        d.feed(ESC);
        d.feed(b'[');
        d.feed(b'1');
        assert_eq!(d.state_name(), "csi");
        assert_eq!(d.on_timeout(), None);
        assert_eq!(d.state_name(), "csi");
        assert_eq!(d.on_timeout(), None);
        assert!(d.is_idle());
        assert_eq!(d.discarded(), 1);
        assert_eq!(d.feed(b'a'), Some(KeyEvent::new(KeyCode::Char('a'))));
    }

    #[test]
    fn overlong_sequence_discarded() {
        let mut d = InputDecoder::new();
        d.feed(ESC);
        d.feed(b'[');
        for _ in 0..=MAX_SEQUENCE_LEN {
            d.feed(b'1');
        }
        assert!(d.is_idle());
        assert_eq!(d.discarded(), 1);
    }

    #[test]
    fn control_byte_interrupting_csi_is_decoded() {
        assert_eq!(decode(b"\x1b[1\r"), vec![KeyEvent::new(KeyCode::Enter)]);
    }

    #[test]
    fn escape_escape_yields_esc_then_sequence() {
        assert_eq!(
            decode(b"\x1b\x1b[B"),
            vec![KeyEvent::new(KeyCode::Esc), KeyEvent::new(KeyCode::Down)]
        );
    }

    #[test]
    fn alt_char() {
        assert_eq!(
            decode(b"\x1bx"),
            vec![KeyEvent::with_mods(KeyCode::Char('x'), KeyModifiers::ALT)]
        );
    }
}
