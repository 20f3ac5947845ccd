//! Line-oriented, byte-preserving view of one header file
//!
//! A [`SourceBuffer`] keeps every line's terminator exactly as read, so a
//! buffer that is never edited renders back to the original bytes. Edits are
//! addressed by 1-indexed line numbers.

use crate::error::{Result, ResultExt};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Line terminator as it appeared in the file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineEnding {
    Lf,
    CrLf,
    /// Last line of a file without a trailing newline
    Missing,
}

impl LineEnding {
    fn as_str(self) -> &'static str {
        match self {
            LineEnding::Lf => "\n",
            LineEnding::CrLf => "\r\n",
            LineEnding::Missing => "",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Line {
    text: String,
    ending: LineEnding,
}

/// Full text of one file as an ordered sequence of lines
#[derive(Debug, Clone)]
pub struct SourceBuffer {
    path: Option<PathBuf>,
    lines: Vec<Line>,
    modified: bool,
}

impl SourceBuffer {
    /// Builds a buffer from in-memory text
    pub fn from_text(text: &str) -> Self {
        let mut lines = Vec::new();
        let mut rest = text;
        while !rest.is_empty() {
            match rest.find('\n') {
                Some(idx) => {
                    let raw = &rest[..idx];
                    let (body, ending) = match raw.strip_suffix('\r') {
                        Some(body) => (body, LineEnding::CrLf),
                        None => (raw, LineEnding::Lf),
                    };
                    lines.push(Line {
                        text: body.to_string(),
                        ending,
                    });
                    rest = &rest[idx + 1..];
                }
                None => {
                    lines.push(Line {
                        text: rest.to_string(),
                        ending: LineEnding::Missing,
                    });
                    rest = "";
                }
            }
        }
        Self {
            path: None,
            lines,
            modified: false,
        }
    }

    /// Reads a file from disk
    pub fn read(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .context(format!("Failed to read {}", path.display()))?;
        let mut buffer = Self::from_text(&text);
        buffer.path = Some(path.to_path_buf());
        Ok(buffer)
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Number of lines in the buffer
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Whether any edit has been applied since the buffer was read
    pub fn is_modified(&self) -> bool {
        self.modified
    }

    /// Text of a 1-indexed line, without its terminator
    pub fn line(&self, number: usize) -> Option<&str> {
        number
            .checked_sub(1)
            .and_then(|idx| self.lines.get(idx))
            .map(|line| line.text.as_str())
    }

    /// All line texts, without terminators
    pub fn lines(&self) -> Vec<&str> {
        self.lines.iter().map(|line| line.text.as_str()).collect()
    }

    /// Renders the buffer back to text
    pub fn text(&self) -> String {
        let mut out = String::new();
        for line in &self.lines {
            out.push_str(&line.text);
            out.push_str(line.ending.as_str());
        }
        out
    }

    /// Terminator used for inserted lines: CRLF if the file already uses it
    fn preferred_ending(&self) -> LineEnding {
        if self.lines.iter().any(|l| l.ending == LineEnding::CrLf) {
            LineEnding::CrLf
        } else {
            LineEnding::Lf
        }
    }

    /// Replaces the text of a 1-indexed line, keeping its terminator
    ///
    /// Returns false when the line does not exist or already has that text.
    pub fn replace_line(&mut self, number: usize, text: impl Into<String>) -> bool {
        let text = text.into();
        let Some(line) = number
            .checked_sub(1)
            .and_then(|idx| self.lines.get_mut(idx))
        else {
            return false;
        };
        if line.text == text {
            return false;
        }
        line.text = text;
        self.modified = true;
        true
    }

    /// Inserts lines after the 1-indexed line `after`; `0` inserts at the top
    ///
    /// Inserted text may not contain newlines of its own; each element is one line.
    pub fn insert_after(&mut self, after: usize, new_lines: Vec<String>) {
        if new_lines.is_empty() {
            return;
        }
        let at = after.min(self.lines.len());
        let ending = self.preferred_ending();

        if at > 0 && self.lines[at - 1].ending == LineEnding::Missing {
            self.lines[at - 1].ending = ending;
        }
        let inserted: Vec<Line> = new_lines
            .into_iter()
            .map(|text| Line { text, ending })
            .collect();
        let count = inserted.len();
        self.lines.splice(at..at, inserted);
        debug!(
            "Inserted {count} line(s) after line {after} in {}",
            self.display_name()
        );
        self.modified = true;
    }

    /// Name used in log messages
    pub fn display_name(&self) -> String {
        self.path
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "<memory>".to_string())
    }

    /// Writes the buffer back to its path when it was modified
    ///
    /// Returns whether anything was written.
    pub fn write_if_modified(&self) -> Result<bool> {
        if !self.modified {
            return Ok(false);
        }
        let Some(path) = &self.path else {
            return Ok(false);
        };
        std::fs::write(path, self.text())
            .context(format!("Failed to write {}", path.display()))?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_roundtrip_preserves_bytes() {
        let inputs = [
            "a\nb\n",
            "a\r\nb\r\n",
            "no newline",
            "mixed\r\nends\nlast",
            "",
            "\n\n",
        ];
        for input in inputs {
            assert_eq!(SourceBuffer::from_text(input).text(), input);
        }
    }

    #[test]
    fn test_line_is_one_indexed() {
        let buffer = SourceBuffer::from_text("first\nsecond\n");
        assert_eq!(buffer.line(1), Some("first"));
        assert_eq!(buffer.line(2), Some("second"));
        assert_eq!(buffer.line(0), None);
        assert_eq!(buffer.line(3), None);
    }

    #[test]
    fn test_insert_after_middle() {
        let mut buffer = SourceBuffer::from_text("a\nc\n");
        buffer.insert_after(1, vec!["b".to_string()]);
        assert_eq!(buffer.text(), "a\nb\nc\n");
        assert!(buffer.is_modified());
    }

    #[test]
    fn test_insert_at_top() {
        let mut buffer = SourceBuffer::from_text("b\n");
        buffer.insert_after(0, vec!["a".to_string()]);
        assert_eq!(buffer.text(), "a\nb\n");
    }

    #[test]
    fn test_insert_after_last_line_without_newline() {
        let mut buffer = SourceBuffer::from_text("a\nb");
        buffer.insert_after(2, vec!["c".to_string()]);
        assert_eq!(buffer.text(), "a\nb\nc\n");
    }

    #[test]
    fn test_insert_uses_crlf_when_file_does() {
        let mut buffer = SourceBuffer::from_text("a\r\nc\r\n");
        buffer.insert_after(1, vec!["b".to_string()]);
        assert_eq!(buffer.text(), "a\r\nb\r\nc\r\n");
    }

    #[test]
    fn test_replace_line_keeps_terminator() {
        let mut buffer = SourceBuffer::from_text("  x\r\ny\n");
        assert!(buffer.replace_line(1, "  z"));
        assert!(!buffer.replace_line(1, "  z"));
        assert!(!buffer.replace_line(5, "nope"));
        assert_eq!(buffer.text(), "  z\r\ny\n");
    }

    #[test]
    fn test_write_if_modified() {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let path = dir.path().join("Header.h");
        std::fs::write(&path, "int a;\n").expect("Failed to write header");

        let mut buffer = SourceBuffer::read(&path).expect("Failed to read header");
        assert!(!buffer.write_if_modified().expect("write failed"));

        buffer.insert_after(1, vec!["int b;".to_string()]);
        assert!(buffer.write_if_modified().expect("write failed"));
        let written = std::fs::read_to_string(&path).expect("Failed to read back");
        assert_eq!(written, "int a;\nint b;\n");
    }
}
