use core_events::Direction;
use core_model::EditorModel;
use core_render::RenderEngine;
use core_state::EditorState;
use core_text::Document;
use pretty_assertions::assert_eq;

fn model(lines: usize) -> EditorModel {
    let text: Vec<String> = (0..lines).map(|i| format!("line {i}")).collect();
    let st = EditorState::with_file(Document::from_lines(text, 8), "t.txt");
    EditorModel::with_screen(st, 12, 40)
}

fn erase_count(bytes: &[u8]) -> usize {
    bytes.windows(3).filter(|w| *w == b"\x1b[K").count()
}

#[test]
fn change_in_one_row_touches_only_that_row() {
    let mut m = model(8);
    let mut eng = RenderEngine::new();
    eng.render(&m).unwrap();

    m.state_mut().document.insert_char(3, 0, 'X').unwrap();
    let out = eng.render(&m).unwrap();

    assert_eq!(eng.last_repainted_rows(), &[3]);
    assert_eq!(erase_count(&out), 1);
    let s = String::from_utf8(out).unwrap();
    assert!(s.contains("\x1b[4;1HXline 3\x1b[K"));
    assert!(!s.contains("\x1b[2J"));
}

#[test]
fn cursor_move_repaints_status_row_only() {
    let mut m = model(8);
    let mut eng = RenderEngine::new();
    eng.render(&m).unwrap();

    {
        let (state, view) = m.split_state_and_view();
        view.move_cursor(&state.document, Direction::Down);
        view.scroll_to_cursor(&state.document);
    }
    eng.render(&m).unwrap();
    // status bar sits right below the 10 text rows
    assert_eq!(eng.last_repainted_rows(), &[10]);
}

#[test]
fn scrolling_repaints_shifted_rows() {
    let mut m = model(30);
    let mut eng = RenderEngine::new();
    eng.render(&m).unwrap();
    {
        let (state, view) = m.split_state_and_view();
        view.file_end(&state.document);
        view.scroll_to_cursor(&state.document);
    }
    let out = eng.render(&m).unwrap();
    let s = String::from_utf8(out).unwrap();
    assert!(s.contains("line 29"));
    assert!(s.ends_with("\x1b[10;8H\x1b[?25h"));
    assert!(!eng.last_was_full());
}

#[test]
fn invalidate_repaints_full_screen() {
    let m = model(3);
    let mut eng = RenderEngine::new();
    eng.render(&m).unwrap();
    eng.render(&m).unwrap();
    assert!(eng.last_repainted_rows().is_empty());
    eng.invalidate();
    let out = eng.render(&m).unwrap();
    assert!(out.starts_with(b"\x1b[?25l\x1b[2J"));
    assert_eq!(eng.last_repainted_rows().len(), 12);
}
