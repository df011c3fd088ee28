//! File IO helpers.
//!
//! Synchronous and minimal. Content is normalized to LF on read and the
//! original style (plus trailing newline presence) is restored on write.

use anyhow::{Context, Result};
use core_config::Settings;
use core_state::{EditorState, LineEnding, normalize_line_endings};
use core_text::Document;
use std::io;
use std::path::Path;
use tracing::{error, info};

/// Lines read from disk plus the metadata needed to write them back unchanged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedLines {
    pub lines: Vec<String>,
    pub line_ending: LineEnding,
    pub had_trailing_newline: bool,
    pub mixed_line_endings: bool,
}

/// Read `path` into lines without terminators.
pub fn read_lines(path: &Path) -> io::Result<LoadedLines> {
    let content = std::fs::read_to_string(path)?;
    let norm = normalize_line_endings(&content);
    let body = if norm.had_trailing_newline {
        &norm.normalized[..norm.normalized.len() - 1]
    } else {
        norm.normalized.as_str()
    };
    Ok(LoadedLines {
        lines: body.split('\n').map(str::to_string).collect(),
        line_ending: norm.original,
        had_trailing_newline: norm.had_trailing_newline,
        mixed_line_endings: norm.mixed,
    })
}

/// Join `lines` with `ending` (and a final `ending` when `trailing_newline`).
pub fn serialize_lines<S: AsRef<str>>(
    lines: &[S],
    ending: LineEnding,
    trailing_newline: bool,
) -> String {
    let sep = ending.as_str();
    let mut content = String::new();
    for (i, line) in lines.iter().enumerate() {
        content.push_str(line.as_ref());
        if i + 1 < lines.len() || trailing_newline {
            content.push_str(sep);
        }
    }
    content
}

/// Write `lines` to `path`; returns the number of bytes written.
pub fn write_lines<S: AsRef<str>>(
    path: &Path,
    lines: &[S],
    ending: LineEnding,
    trailing_newline: bool,
) -> io::Result<usize> {
    let content = serialize_lines(lines, ending, trailing_newline);
    std::fs::write(path, content.as_bytes())?;
    Ok(content.len())
}

/// Build the startup state for `path`.
///
/// A missing file yields an empty document carrying that name (saving creates
/// it). Any other read failure is logged and reported through the status
/// message, and the editor starts on an unnamed empty document so a later save
/// asks for a name instead of overwriting the file it could not read.
pub fn open_state(path: Option<&Path>, settings: &Settings) -> EditorState {
    let Some(path) = path else {
        return EditorState::new(Document::with_tab_stop(settings.tab_stop));
    };
    match read_lines(path) {
        Ok(loaded) => {
            info!(
                target: "io",
                lines = loaded.lines.len(),
                mixed = loaded.mixed_line_endings,
                "file_opened"
            );
            let doc = Document::from_lines(loaded.lines, settings.tab_stop);
            let mut state = EditorState::with_file(doc, path);
            state.original_line_ending = loaded.line_ending;
            state.had_trailing_newline = loaded.had_trailing_newline;
            state
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            info!(target: "io", "file_absent_new_document");
            EditorState::with_file(Document::with_tab_stop(settings.tab_stop), path)
        }
        Err(e) => {
            error!(target: "io", ?e, "file_open_error");
            let mut state = EditorState::new(Document::with_tab_stop(settings.tab_stop));
            state.set_ephemeral(format!("Can't open file: {e}"), settings.message_timeout);
            state
        }
    }
}

/// Write the document to its file. Marks the state clean on success.
pub fn save_state(state: &mut EditorState) -> Result<usize> {
    let path = state
        .file_name
        .clone()
        .context("document has no file name")?;
    let lines = state.document.to_lines();
    let written = write_lines(
        &path,
        &lines,
        state.original_line_ending,
        state.had_trailing_newline,
    )
    .with_context(|| format!("writing {}", path.display()))?;
    state.mark_clean();
    info!(target: "io", bytes = written, "file_saved");
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatch;
    use core_events::Command;
    use core_model::EditorModel;
    use core_state::PromptKind;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    #[test]
    fn read_lines_normalizes_and_sets_metadata() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sample.txt");
        {
            let mut f = std::fs::File::create(&path).unwrap();
            write!(f, "line1\r\nline2\nline3\r\n").unwrap();
        }
        let loaded = read_lines(&path).unwrap();
        assert_eq!(loaded.lines, vec!["line1", "line2", "line3"]);
        assert_eq!(loaded.line_ending, LineEnding::Crlf);
        assert!(loaded.mixed_line_endings);
        assert!(loaded.had_trailing_newline);
    }

    #[test]
    fn read_lines_without_trailing_newline() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("t.txt");
        std::fs::write(&path, "a\n\nb").unwrap();
        let loaded = read_lines(&path).unwrap();
        assert_eq!(loaded.lines, vec!["a", "", "b"]);
        assert!(!loaded.had_trailing_newline);
    }

    #[test]
    fn empty_file_is_one_empty_line() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.txt");
        std::fs::write(&path, "").unwrap();
        assert_eq!(read_lines(&path).unwrap().lines, vec![""]);
    }

    #[test]
    fn write_preserves_original_style() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.txt");
        let n = write_lines(&path, &["a", "b"], LineEnding::Crlf, true).unwrap();
        assert_eq!(n, 6);
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "a\r\nb\r\n");
        write_lines(&path, &["a", "b"], LineEnding::Lf, false).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "a\nb");
    }

    #[test]
    fn open_then_save_round_trips_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rt.txt");
        std::fs::write(&path, "x\ry\r").unwrap();
        let mut state = open_state(Some(&path), &Settings::default());
        assert_eq!(state.file_path(), Some(path.as_path()));
        state.mark_dirty();
        save_state(&mut state).unwrap();
        assert!(!state.is_dirty());
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "x\ry\r");
    }

    #[test]
    fn missing_file_opens_empty_named_document() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("new.txt");
        let state = open_state(Some(&path), &Settings::default());
        assert!(state.document.is_blank());
        assert_eq!(state.display_name(), "new.txt");
        assert!(state.status_text().is_none());
    }

    fn save_through_dispatch(state: EditorState) -> EditorModel {
        let mut model = EditorModel::with_screen(state, 10, 40);
        dispatch(Command::Save, &mut model, &Settings::default());
        model
    }

    #[test]
    fn unreadable_path_reports_status() {
        let dir = tempfile::tempdir().unwrap();
        // a directory cannot be read as a file
        let state = open_state(Some(dir.path()), &Settings::default());
        assert!(state.document.is_blank());
        assert!(state.file_path().is_none());
        assert!(state.status_text().unwrap().starts_with("Can't open file"));

        let model = save_through_dispatch(state);
        assert_eq!(
            model.state().prompt.as_ref().map(|p| p.kind),
            Some(PromptKind::SaveAs)
        );
        assert!(dir.path().is_dir());
    }

    #[test]
    fn save_after_failed_open_leaves_file_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("latin1.txt");
        let original = b"caf\xe9 au lait\n".to_vec();
        std::fs::write(&path, &original).unwrap();

        let state = open_state(Some(&path), &Settings::default());
        assert!(state.status_text().unwrap().starts_with("Can't open file"));
        let model = save_through_dispatch(state);

        assert!(model.state().is_prompting());
        assert_eq!(std::fs::read(&path).unwrap(), original);
    }

    #[test]
    fn save_without_name_fails_and_stays_dirty() {
        let mut state = EditorState::new(Document::from_text("x"));
        state.mark_dirty();
        assert!(save_state(&mut state).is_err());
        assert!(state.is_dirty());
    }
}
