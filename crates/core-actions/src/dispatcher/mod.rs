//! Dispatcher applying a `Command` to the editor model.
//!
//! Sub-modules:
//! * `edit`   - text mutation (insert/delete/newline)
//! * `motion` - cursor movement
//! * `prompt` - save-as and incremental find in the message bar
//!
//! The viewport is re-clamped around the cursor after every command.

use crate::io_ops;
use core_config::Settings;
use core_events::Command;
use core_model::EditorModel;
use core_state::{EditorState, PromptKind, PromptState};
use tracing::{debug, error};

mod edit;
mod motion;
mod prompt;

/// Outcome of dispatching a single `Command`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DispatchResult {
    /// Something visible may have changed.
    pub dirty: bool,
    pub quit: bool,
    /// The whole screen must be repainted (redraw request).
    pub invalidate: bool,
}

impl DispatchResult {
    pub fn dirty() -> Self {
        Self {
            dirty: true,
            ..Self::default()
        }
    }
    pub fn clean() -> Self {
        Self::default()
    }
    pub fn quit() -> Self {
        Self {
            dirty: true,
            quit: true,
            invalidate: false,
        }
    }
    pub fn invalidate() -> Self {
        Self {
            dirty: true,
            quit: false,
            invalidate: true,
        }
    }
}

pub fn dispatch(cmd: Command, model: &mut EditorModel, settings: &Settings) -> DispatchResult {
    let (state, view) = model.split_state_and_view();
    debug!(target: "actions.dispatch", command = cmd.name(), "dispatch");

    if cmd != Command::Quit {
        state.quit_presses = 0;
    }

    let result = if state.is_prompting() {
        prompt::handle_prompt(cmd, state, view, settings)
    } else {
        match cmd {
            Command::InsertChar(_)
            | Command::InsertNewline
            | Command::DeleteBackward
            | Command::DeleteForward => edit::handle_edit(cmd, state, view),
            Command::Move(_)
            | Command::PageUp
            | Command::PageDown
            | Command::Home
            | Command::End
            | Command::FileStart
            | Command::FileEnd => motion::handle_motion(cmd, state, view),
            Command::Save => save(state, view, settings),
            Command::Find => {
                let prompt = PromptState::new(
                    PromptKind::Find,
                    view.cursor,
                    (view.row_offset, view.col_offset),
                );
                state.begin_prompt(prompt);
                DispatchResult::dirty()
            }
            Command::Quit => quit(state, settings),
            Command::Redraw => DispatchResult::invalidate(),
            Command::Escape => DispatchResult::clean(),
        }
    };

    view.scroll_to_cursor(&state.document);
    result
}

/// Save to the current file, or ask for a name first.
fn save(state: &mut EditorState, view: &core_model::View, settings: &Settings) -> DispatchResult {
    if state.file_name.is_none() {
        let prompt = PromptState::new(
            PromptKind::SaveAs,
            view.cursor,
            (view.row_offset, view.col_offset),
        );
        state.begin_prompt(prompt);
        return DispatchResult::dirty();
    }
    write_out(state, settings);
    DispatchResult::dirty()
}

pub(crate) fn write_out(state: &mut EditorState, settings: &Settings) {
    match io_ops::save_state(state) {
        Ok(bytes) => {
            state.set_ephemeral(
                format!("{bytes} bytes written to disk"),
                settings.message_timeout,
            );
        }
        Err(e) => {
            error!(target: "io", error = %e, "file_write_error");
            state.set_ephemeral(
                format!("Can't save! I/O error: {e:#}"),
                settings.message_timeout,
            );
        }
    }
}

fn quit(state: &mut EditorState, settings: &Settings) -> DispatchResult {
    if state.is_dirty() && state.quit_presses < settings.quit_times {
        let remaining = settings.quit_times - state.quit_presses;
        state.quit_presses += 1;
        state.set_ephemeral(
            format!(
                "WARNING!!! File has unsaved changes. Press Ctrl-Q {remaining} more times to quit."
            ),
            settings.message_timeout,
        );
        return DispatchResult::dirty();
    }
    DispatchResult::quit()
}
