use core_actions::dispatch;
use core_config::Settings;
use core_events::{Command, Direction};
use core_model::EditorModel;
use core_state::{EditorState, PromptKind};
use core_text::{Document, Position};
use pretty_assertions::assert_eq;

fn model(text: &str) -> EditorModel {
    EditorModel::with_screen(EditorState::new(Document::from_text(text)), 10, 40)
}

fn run(m: &mut EditorModel, cmds: &[Command]) {
    let settings = Settings::default();
    for cmd in cmds {
        dispatch(*cmd, m, &settings);
    }
}

fn type_str(m: &mut EditorModel, s: &str) {
    let cmds: Vec<Command> = s.chars().map(Command::InsertChar).collect();
    run(m, &cmds);
}

#[test]
fn typing_and_editing_sequence() {
    let mut m = model("");
    type_str(&mut m, "helo");
    run(
        &mut m,
        &[
            Command::MOVE_LEFT,
            Command::InsertChar('l'),
            Command::End,
            Command::InsertNewline,
        ],
    );
    type_str(&mut m, "world");
    run(&mut m, &[Command::DeleteBackward]);
    assert_eq!(m.document().to_lines(), vec!["hello", "worl"]);
    assert_eq!(m.view().cursor, Position::new(1, 4));
    assert!(m.state().is_dirty());
}

#[test]
fn right_wraps_and_left_unwraps() {
    let mut m = model("ab\ncd");
    run(&mut m, &[Command::End, Command::MOVE_RIGHT]);
    assert_eq!(m.view().cursor, Position::new(1, 0));
    run(&mut m, &[Command::MOVE_LEFT]);
    assert_eq!(m.view().cursor, Position::new(0, 2));
}

#[test]
fn find_types_steps_and_accepts() {
    let mut m = model("one\ntwo one\nthree one");
    run(&mut m, &[Command::Find]);
    assert!(m.state().is_prompting());
    type_str(&mut m, "one");
    assert_eq!(m.view().cursor, Position::new(0, 0));
    run(&mut m, &[Command::Move(Direction::Down)]);
    assert_eq!(m.view().cursor, Position::new(1, 4));
    run(&mut m, &[Command::Move(Direction::Right)]);
    assert_eq!(m.view().cursor, Position::new(2, 6));
    run(&mut m, &[Command::Move(Direction::Right)]);
    assert_eq!(m.view().cursor, Position::new(0, 0));
    run(&mut m, &[Command::Move(Direction::Up)]);
    assert_eq!(m.view().cursor, Position::new(2, 6));
    run(&mut m, &[Command::InsertNewline]);
    assert!(!m.state().is_prompting());
    assert_eq!(m.view().cursor, Position::new(2, 6));
    assert!(!m.state().is_dirty());
}

#[test]
fn find_keeps_overlapping_match_at_cursor() {
    let mut m = model("aaa");
    run(&mut m, &[Command::MOVE_RIGHT, Command::Find]);
    type_str(&mut m, "aa");
    assert_eq!(m.view().cursor, Position::new(0, 1));
}

#[test]
fn find_escape_restores_cursor() {
    let mut m = model("alpha\nbeta\ngamma");
    run(&mut m, &[Command::MOVE_DOWN, Command::MOVE_RIGHT, Command::Find]);
    type_str(&mut m, "gam");
    assert_eq!(m.view().cursor, Position::new(2, 0));
    run(&mut m, &[Command::Escape]);
    assert!(!m.state().is_prompting());
    assert_eq!(m.view().cursor, Position::new(1, 1));
}

#[test]
fn find_without_match_keeps_origin() {
    let mut m = model("abc");
    run(&mut m, &[Command::End, Command::Find]);
    type_str(&mut m, "zz");
    assert_eq!(m.view().cursor, Position::new(0, 3));
    assert_eq!(m.state().prompt.as_ref().and_then(|p| p.last_match), None);
}

#[test]
fn prompt_backspace_edits_query() {
    let mut m = model("ab\nax");
    run(&mut m, &[Command::Find]);
    type_str(&mut m, "ax");
    assert_eq!(m.view().cursor, Position::new(1, 0));
    run(&mut m, &[Command::DeleteBackward, Command::DeleteBackward]);
    assert_eq!(m.state().prompt.as_ref().map(|p| p.input().to_string()), Some(String::new()));
    assert_eq!(m.view().cursor, Position::origin());
}

#[test]
fn save_as_writes_file_and_cleans() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("saved.txt");
    let mut m = model("");
    type_str(&mut m, "hi");
    run(&mut m, &[Command::Save]);
    assert_eq!(
        m.state().prompt.as_ref().map(|p| p.kind),
        Some(PromptKind::SaveAs)
    );
    type_str(&mut m, path.to_str().unwrap());
    run(&mut m, &[Command::InsertNewline]);
    assert!(!m.state().is_prompting());
    assert!(!m.state().is_dirty());
    assert_eq!(std::fs::read_to_string(&path).unwrap(), "hi\n");
    assert_eq!(m.state().status_text(), Some("3 bytes written to disk"));
    // document untouched by prompt typing
    assert_eq!(m.document().to_lines(), vec!["hi"]);
}

#[test]
fn save_as_escape_aborts() {
    let mut m = model("x");
    run(&mut m, &[Command::Save, Command::InsertChar('f'), Command::Escape]);
    assert!(m.state().file_name.is_none());
    assert_eq!(m.state().status_text(), Some("Save aborted"));
}

#[test]
fn save_as_ignores_empty_enter() {
    let mut m = model("x");
    run(&mut m, &[Command::Save, Command::InsertNewline]);
    assert!(m.state().is_prompting());
}

#[test]
fn save_failure_reports_status() {
    let dir = tempfile::tempdir().unwrap();
    let st = EditorState::with_file(Document::from_text("x"), dir.path());
    let mut m = EditorModel::with_screen(st, 10, 40);
    run(&mut m, &[Command::InsertChar('y'), Command::Save]);
    assert!(m.state().status_text().unwrap().starts_with("Can't save!"));
    assert!(m.state().is_dirty());
}
