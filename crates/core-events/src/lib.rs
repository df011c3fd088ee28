//! Shared vocabulary between the input decoder, the command dispatcher and the
//! binary: decoded keys and the editing commands they map to.

use std::fmt;

/// Logical key produced by the byte decoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyCode {
    Char(char),
    Enter,
    Esc,
    Backspace,
    Tab,
    Up,
    Down,
    Left,
    Right,
    Home,
    End,
    PageUp,
    PageDown,
    Delete,
}

bitflags::bitflags! {
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    pub struct KeyModifiers: u8 {
        const CTRL = 0b0000_0001;
        const ALT  = 0b0000_0010;
        const SHIFT= 0b0000_0100;
    }
}

impl KeyModifiers {
    /// Decode the xterm modifier parameter (`ESC [ 1 ; <m> A`): `m - 1` is a
    /// bitmask of shift(1), alt(2), ctrl(4).
    pub fn from_xterm_param(param: u16) -> Self {
        let bits = param.saturating_sub(1);
        let mut mods = KeyModifiers::empty();
        if bits & 1 != 0 {
            mods |= KeyModifiers::SHIFT;
        }
        if bits & 2 != 0 {
            mods |= KeyModifiers::ALT;
        }
        if bits & 4 != 0 {
            mods |= KeyModifiers::CTRL;
        }
        mods
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyEvent {
    pub code: KeyCode,
    pub mods: KeyModifiers,
}

impl KeyEvent {
    pub fn new(code: KeyCode) -> Self {
        Self {
            code,
            mods: KeyModifiers::empty(),
        }
    }

    pub fn with_mods(code: KeyCode, mods: KeyModifiers) -> Self {
        Self { code, mods }
    }

    pub fn ctrl(c: char) -> Self {
        Self::with_mods(KeyCode::Char(c), KeyModifiers::CTRL)
    }
}

impl fmt::Display for KeyEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}{:?}", self.code, self.mods)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

/// Discrete editing command. At most one is applied per decoded key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    InsertChar(char),
    InsertNewline,
    DeleteBackward,
    DeleteForward,
    Move(Direction),
    PageUp,
    PageDown,
    Home,
    End,
    FileStart,
    FileEnd,
    Save,
    Find,
    Quit,
    Redraw,
    Escape,
}

impl Command {
    pub const MOVE_UP: Command = Command::Move(Direction::Up);
    pub const MOVE_DOWN: Command = Command::Move(Direction::Down);
    pub const MOVE_LEFT: Command = Command::Move(Direction::Left);
    pub const MOVE_RIGHT: Command = Command::Move(Direction::Right);

    /// Stable name for logs. Never includes inserted text.
    pub fn name(&self) -> &'static str {
        match self {
            Command::InsertChar(_) => "insert_char",
            Command::InsertNewline => "insert_newline",
            Command::DeleteBackward => "delete_backward",
            Command::DeleteForward => "delete_forward",
            Command::Move(Direction::Up) => "move_up",
            Command::Move(Direction::Down) => "move_down",
            Command::Move(Direction::Left) => "move_left",
            Command::Move(Direction::Right) => "move_right",
            Command::PageUp => "page_up",
            Command::PageDown => "page_down",
            Command::Home => "home",
            Command::End => "end",
            Command::FileStart => "file_start",
            Command::FileEnd => "file_end",
            Command::Save => "save",
            Command::Find => "find",
            Command::Quit => "quit",
            Command::Redraw => "redraw",
            Command::Escape => "escape",
        }
    }
}
