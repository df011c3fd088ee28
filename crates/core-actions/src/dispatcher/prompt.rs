//! Message-bar prompts: save-as and incremental find.
//!
//! Find searches as the query is typed, starting at the cursor position the
//! prompt was opened from. Arrow keys step to the next (Right/Down) or previous
//! (Left/Up) match, Enter keeps the cursor on the current match and Escape
//! restores the cursor and scroll offsets saved when the prompt opened.

use super::{DispatchResult, write_out};
use core_config::Settings;
use core_events::{Command, Direction};
use core_model::View;
use core_state::{EditorState, PromptKind, PromptState};
use core_text::{Document, Position, SearchDirection};
use std::path::PathBuf;
use tracing::debug;

pub(crate) fn handle_prompt(
    cmd: Command,
    state: &mut EditorState,
    view: &mut View,
    settings: &Settings,
) -> DispatchResult {
    let Some(mut prompt) = state.end_prompt() else {
        return DispatchResult::clean();
    };

    match cmd {
        Command::Escape => {
            cancel(prompt, state, view, settings);
            return DispatchResult::dirty();
        }
        Command::InsertNewline if !prompt.input().is_empty() => {
            accept(prompt, state, settings);
            return DispatchResult::dirty();
        }
        Command::InsertChar(ch) => {
            prompt.push_char(ch);
            if prompt.kind == PromptKind::Find {
                search_from_origin(&mut prompt, &state.document, view);
            }
        }
        Command::DeleteBackward => {
            prompt.backspace();
            if prompt.kind == PromptKind::Find {
                search_from_origin(&mut prompt, &state.document, view);
            }
        }
        Command::Move(dir) if prompt.kind == PromptKind::Find => {
            prompt.direction = match dir {
                Direction::Right | Direction::Down => SearchDirection::Forward,
                Direction::Left | Direction::Up => SearchDirection::Backward,
            };
            step(&mut prompt, &state.document, view);
        }
        _ => {}
    }

    state.begin_prompt(prompt);
    DispatchResult::dirty()
}

fn cancel(prompt: PromptState, state: &mut EditorState, view: &mut View, settings: &Settings) {
    match prompt.kind {
        PromptKind::SaveAs => {
            state.set_ephemeral("Save aborted", settings.message_timeout);
        }
        PromptKind::Find => {
            view.set_cursor(&state.document, prompt.saved_cursor);
            (view.row_offset, view.col_offset) = prompt.saved_offsets;
        }
    }
    debug!(target: "actions.dispatch", kind = ?prompt.kind, "prompt_cancelled");
}

fn accept(prompt: PromptState, state: &mut EditorState, settings: &Settings) {
    debug!(target: "actions.dispatch", kind = ?prompt.kind, "prompt_accepted");
    if prompt.kind == PromptKind::SaveAs {
        state.file_name = Some(PathBuf::from(prompt.input()));
        write_out(state, settings);
    }
}

/// Re-run the search after the query changed: a match at the origin itself counts.
fn search_from_origin(prompt: &mut PromptState, doc: &Document, view: &mut View) {
    let origin = prompt.saved_cursor;
    let query = prompt.input();
    let at_origin = !query.is_empty()
        && doc.line(origin.row).is_some_and(|l| {
            let text = l.as_str();
            text.char_indices()
                .nth(origin.col)
                .is_some_and(|(byte, _)| text[byte..].starts_with(query))
        });
    let hit = if at_origin {
        Some(origin)
    } else {
        doc.find(query, origin, SearchDirection::Forward)
    };
    land(prompt, doc, view, hit);
}

/// Move to the next match in the prompt's direction.
fn step(prompt: &mut PromptState, doc: &Document, view: &mut View) {
    let from = prompt.last_match.unwrap_or(prompt.saved_cursor);
    let hit = doc.find(prompt.input(), from, prompt.direction);
    land(prompt, doc, view, hit);
}

fn land(prompt: &mut PromptState, doc: &Document, view: &mut View, hit: Option<Position>) {
    prompt.last_match = hit;
    match hit {
        Some(pos) => view.set_cursor(doc, pos),
        None => view.set_cursor(doc, prompt.saved_cursor),
    }
}
