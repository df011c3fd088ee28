//! Fixed key to command table.

use core_events::{Command, Direction, KeyCode, KeyEvent, KeyModifiers};

/// Ctrl+letter bindings.
const CONTROL_TABLE: &[(char, Command)] = &[
    ('q', Command::Quit),
    ('s', Command::Save),
    ('f', Command::Find),
    ('l', Command::Redraw),
    ('h', Command::DeleteBackward),
];

fn control_binding(c: char) -> Option<Command> {
    CONTROL_TABLE
        .iter()
        .find(|(key, _)| *key == c)
        .map(|(_, cmd)| *cmd)
}

/// Map a decoded key to an editor command. Unbound keys yield `None`.
pub fn command_for(key: KeyEvent) -> Option<Command> {
    let ctrl = key.mods.contains(KeyModifiers::CTRL);
    match key.code {
        KeyCode::Char(c) if ctrl => control_binding(c.to_ascii_lowercase()),
        KeyCode::Char(_) if key.mods.contains(KeyModifiers::ALT) => None,
        KeyCode::Char(c) => Some(Command::InsertChar(c)),
        KeyCode::Tab => Some(Command::InsertChar('\t')),
        KeyCode::Enter => Some(Command::InsertNewline),
        KeyCode::Backspace => Some(Command::DeleteBackward),
        KeyCode::Delete => Some(Command::DeleteForward),
        KeyCode::Esc => Some(Command::Escape),
        KeyCode::Up => Some(Command::Move(Direction::Up)),
        KeyCode::Down => Some(Command::Move(Direction::Down)),
        KeyCode::Left => Some(Command::Move(Direction::Left)),
        KeyCode::Right => Some(Command::Move(Direction::Right)),
        KeyCode::Home if ctrl => Some(Command::FileStart),
        KeyCode::End if ctrl => Some(Command::FileEnd),
        KeyCode::Home => Some(Command::Home),
        KeyCode::End => Some(Command::End),
        KeyCode::PageUp => Some(Command::PageUp),
        KeyCode::PageDown => Some(Command::PageDown),
    }
}
