//! Source location derivation for error reporting.
//!
//! The scanner tracks a single byte cursor; nothing else is recorded during
//! parsing. When an error is raised, [`locate`] scans the source around the
//! cursor to recover the line number, column, and the text of the offending
//! line. Keeping this off the happy path keeps the scanner a bare cursor.

use serde::{Deserialize, Serialize};

/// A resolved source position: 1-based line, 0-based column, and the line text.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SourceLoc {
    /// 1-based line number
    pub line: u32,
    /// 0-based column, counted in characters
    pub column: u32,
    /// Text of the line containing the position, without the terminator
    pub line_text: String,
}

/// Derives line/column/line-text for a byte position in `source`.
///
/// Positions at or past the end of the buffer resolve to the last line.
/// Line terminators are `\n`; a trailing `\r` is stripped from the line text.
pub fn locate(source: &str, pos: usize) -> SourceLoc {
    let pos = pos.min(source.len());

    let start = source[..pos].rfind('\n').map(|i| i + 1).unwrap_or(0);
    let end = source[pos..]
        .find('\n')
        .map(|i| pos + i)
        .unwrap_or(source.len());

    let line = source[..start].matches('\n').count() as u32 + 1;
    let column = source[start..pos].chars().count() as u32;
    let line_text = source[start..end].trim_end_matches('\r').to_string();

    SourceLoc {
        line,
        column,
        line_text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn locates_first_line() {
        let loc = locate("hello world", 6);
        assert_eq!(loc.line, 1);
        assert_eq!(loc.column, 6);
        assert_eq!(loc.line_text, "hello world");
    }

    #[test]
    fn locates_later_lines_and_strips_cr() {
        let src = "one\r\ntwo\r\nthree";
        let loc = locate(src, src.find("two").unwrap() + 1);
        assert_eq!(loc.line, 2);
        assert_eq!(loc.column, 1);
        assert_eq!(loc.line_text, "two");
    }

    #[test]
    fn clamps_past_end() {
        let loc = locate("ab\ncd", 100);
        assert_eq!(loc.line, 2);
        assert_eq!(loc.line_text, "cd");
    }

    #[test]
    fn position_on_newline_belongs_to_preceding_line() {
        let src = "ab\ncd";
        let loc = locate(src, 2);
        assert_eq!(loc.line, 1);
        assert_eq!(loc.column, 2);
        assert_eq!(loc.line_text, "ab");
    }
}
