//! Text edit handling (insert/backspace/delete/newline).
//!
//! Coordinates come from the view cursor, which is clamped into the document,
//! so `OutOfBounds` should not happen. If it does, the edit is skipped and
//! logged; the editor keeps running.

use super::DispatchResult;
use core_events::Command;
use core_model::View;
use core_state::EditorState;
use core_text::{Position, TextResult};
use tracing::{debug, trace};

pub(crate) fn handle_edit(cmd: Command, state: &mut EditorState, view: &mut View) -> DispatchResult {
    view.clamp(&state.document);
    let before = view.cursor;
    let Position { row, col } = before;
    let doc = &mut state.document;

    let outcome: TextResult<Position> = match cmd {
        Command::InsertChar(ch) => doc.insert_char(row, col, ch),
        Command::InsertNewline => doc.insert_newline(row, col),
        Command::DeleteBackward => {
            if before == Position::origin() {
                return DispatchResult::clean();
            }
            doc.delete_char(row, col)
        }
        Command::DeleteForward => {
            if col == doc.line_len(row) && row + 1 == doc.line_count() {
                return DispatchResult::clean();
            }
            doc.delete_char_forward(row, col).map(|_| before)
        }
        _ => return DispatchResult::clean(),
    };

    match outcome {
        Ok(pos) => {
            view.set_cursor(&state.document, pos);
            state.mark_dirty();
            trace!(
                target: "actions.dispatch",
                op = cmd.name(),
                row = before.row,
                col = before.col,
                to_row = pos.row,
                to_col = pos.col,
                "edit"
            );
            DispatchResult::dirty()
        }
        Err(e) => {
            debug!(target: "actions.dispatch", op = cmd.name(), error = %e, "edit_out_of_bounds_ignored");
            DispatchResult::clean()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_text::Document;
    use pretty_assertions::assert_eq;

    fn setup(lines: &[&str], cursor: Position) -> (EditorState, View) {
        let st = EditorState::new(Document::from_lines(lines.iter().copied(), 8));
        let mut v = View::new(10, 40);
        v.set_cursor(&st.document, cursor);
        (st, v)
    }

    #[test]
    fn insert_advances_cursor_and_marks_dirty() {
        let (mut st, mut v) = setup(&["ac"], Position::new(0, 1));
        handle_edit(Command::InsertChar('b'), &mut st, &mut v);
        assert_eq!(st.document.to_lines(), vec!["abc"]);
        assert_eq!(v.cursor, Position::new(0, 2));
        assert!(st.is_dirty());
    }

    #[test]
    fn backspace_at_origin_is_clean_noop() {
        let (mut st, mut v) = setup(&["ab"], Position::origin());
        let r = handle_edit(Command::DeleteBackward, &mut st, &mut v);
        assert_eq!(r, DispatchResult::clean());
        assert!(!st.is_dirty());
    }

    #[test]
    fn backspace_joins_lines() {
        let (mut st, mut v) = setup(&["ab", "cd"], Position::new(1, 0));
        handle_edit(Command::DeleteBackward, &mut st, &mut v);
        assert_eq!(st.document.to_lines(), vec!["abcd"]);
        assert_eq!(v.cursor, Position::new(0, 2));
    }

    #[test]
    fn delete_forward_at_end_of_last_line_is_clean() {
        let (mut st, mut v) = setup(&["ab"], Position::new(0, 2));
        let r = handle_edit(Command::DeleteForward, &mut st, &mut v);
        assert!(!r.dirty);
        let (mut st, mut v) = setup(&["ab", "c"], Position::new(0, 2));
        handle_edit(Command::DeleteForward, &mut st, &mut v);
        assert_eq!(st.document.to_lines(), vec!["abc"]);
        assert_eq!(v.cursor, Position::new(0, 2));
    }

    #[test]
    fn newline_splits_line() {
        let (mut st, mut v) = setup(&["abcd"], Position::new(0, 2));
        handle_edit(Command::InsertNewline, &mut st, &mut v);
        assert_eq!(st.document.to_lines(), vec!["ab", "cd"]);
        assert_eq!(v.cursor, Position::new(1, 0));
    }

    #[test]
    fn stale_cursor_is_clamped_before_editing() {
        let (mut st, mut v) = setup(&["abc", "d"], Position::new(1, 1));
        st.document.delete_line(1).unwrap();
        handle_edit(Command::InsertChar('x'), &mut st, &mut v);
        assert_eq!(st.document.to_lines(), vec!["axbc"]);
    }
}
