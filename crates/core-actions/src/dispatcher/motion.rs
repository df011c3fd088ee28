//! Cursor motion handling.

use super::DispatchResult;
use core_events::Command;
use core_model::View;
use core_state::EditorState;

pub(crate) fn handle_motion(cmd: Command, state: &EditorState, view: &mut View) -> DispatchResult {
    let doc = &state.document;
    let before = view.cursor;
    match cmd {
        Command::Move(dir) => view.move_cursor(doc, dir),
        Command::PageUp => view.page_up(doc),
        Command::PageDown => view.page_down(doc),
        Command::Home => view.home(),
        Command::End => view.end(doc),
        Command::FileStart => view.file_start(),
        Command::FileEnd => view.file_end(doc),
        _ => return DispatchResult::clean(),
    }
    if view.cursor == before {
        DispatchResult::clean()
    } else {
        DispatchResult::dirty()
    }
}
