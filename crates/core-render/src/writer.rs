//! Terminal command list serialized into a byte buffer.
//!
//! The engine pushes primitive operations in screen order; `flush_into` turns
//! them into ANSI sequences through crossterm's `queue!`. Nothing touches the
//! real terminal here, the caller hands the bytes to a `TerminalBackend`.
//!
//! Invariants:
//! * Commands preserve ordering.
//! * Positions are absolute with a (0,0) origin; the caller keeps them in bounds.

use crossterm::{
    cursor::{Hide, MoveTo, Show},
    queue,
    style::{Attribute, Print, SetAttribute},
    terminal::{Clear, ClearType},
};
use std::io::{self, Write};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    HideCursor,
    ShowCursor,
    ClearAll,
    MoveTo(u16, u16),
    /// Erase from the cursor to the end of the current line.
    ClearToEol,
    Reverse(bool),
    Print(String),
}

#[derive(Debug, Default)]
pub struct Writer {
    cmds: Vec<Command>,
}

impl Writer {
    pub fn new() -> Self {
        Self { cmds: Vec::new() }
    }
    pub fn hide_cursor(&mut self) {
        self.cmds.push(Command::HideCursor);
    }
    pub fn show_cursor(&mut self) {
        self.cmds.push(Command::ShowCursor);
    }
    pub fn clear_all(&mut self) {
        self.cmds.push(Command::ClearAll);
    }
    pub fn move_to(&mut self, x: u16, y: u16) {
        self.cmds.push(Command::MoveTo(x, y));
    }
    pub fn clear_to_eol(&mut self) {
        self.cmds.push(Command::ClearToEol);
    }
    pub fn reverse(&mut self, on: bool) {
        self.cmds.push(Command::Reverse(on));
    }
    pub fn print<S: Into<String>>(&mut self, s: S) {
        let s: String = s.into();
        if !s.is_empty() {
            self.cmds.push(Command::Print(s));
        }
    }

    /// Number of `Print` commands queued.
    pub fn print_count(&self) -> usize {
        self.cmds
            .iter()
            .filter(|c| matches!(c, Command::Print(_)))
            .count()
    }

    pub fn flush_into<W: Write>(self, out: &mut W) -> io::Result<()> {
        for c in self.cmds {
            match c {
                Command::HideCursor => queue!(out, Hide)?,
                Command::ShowCursor => queue!(out, Show)?,
                Command::ClearAll => queue!(out, Clear(ClearType::All))?,
                Command::MoveTo(x, y) => queue!(out, MoveTo(x, y))?,
                Command::ClearToEol => queue!(out, Clear(ClearType::UntilNewLine))?,
                Command::Reverse(true) => queue!(out, SetAttribute(Attribute::Reverse))?,
                Command::Reverse(false) => queue!(out, SetAttribute(Attribute::Reset))?,
                Command::Print(s) => queue!(out, Print(s))?,
            }
        }
        out.flush()
    }
}
