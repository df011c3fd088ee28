//! Display width helpers.
//!
//! Every rendered-column decision in the workspace flows through this module so
//! the line cache, cursor translation and the renderer agree on how many
//! terminal cells a character occupies.
//!
//! Invariants:
//! - A tab advances to the next multiple of the tab stop (never zero cells).
//! - Control characters other than tab are displayed as a single `?` cell.
//! - Zero-width characters (combining marks) occupy no cell of their own.

use unicode_width::UnicodeWidthChar;

/// Default tab stop used when no configuration overrides it.
pub const DEFAULT_TAB_STOP: usize = 8;

/// Glyph substituted for control characters in the rendered form.
pub const CONTROL_GLYPH: char = '?';

/// Terminal cell width of a non-tab character as it appears in a rendered line.
pub fn char_width(c: char) -> usize {
    if c.is_control() {
        return 1;
    }
    c.width().unwrap_or(0)
}

/// Rendered column reached after a tab that starts at `rx`.
pub fn next_tab_stop(rx: usize, tab_stop: usize) -> usize {
    let stop = tab_stop.max(1);
    rx + (stop - rx % stop)
}

/// Character emitted for `c` in the rendered form (tabs are expanded by the caller).
pub fn display_char(c: char) -> char {
    if c.is_control() { CONTROL_GLYPH } else { c }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tab_advances_to_next_stop() {
        assert_eq!(next_tab_stop(0, 8), 8);
        assert_eq!(next_tab_stop(3, 8), 8);
        assert_eq!(next_tab_stop(8, 8), 16);
        assert_eq!(next_tab_stop(5, 4), 8);
    }

    #[test]
    fn zero_tab_stop_treated_as_one() {
        assert_eq!(next_tab_stop(3, 0), 4);
    }

    #[test]
    fn widths_ascii_cjk_combining_control() {
        assert_eq!(char_width('a'), 1);
        assert_eq!(char_width('漢'), 2);
        assert_eq!(char_width('\u{0301}'), 0);
        assert_eq!(char_width('\u{1}'), 1);
        assert_eq!(display_char('\u{1}'), CONTROL_GLYPH);
    }
}
