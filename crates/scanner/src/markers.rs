//! Marker comment detection and bounded-lookahead association
//!
//! Markers are comment-embedded directives such as `/* @Entity */` or
//! `/// @Repository`. Each syntax knows both its unprocessed form and the
//! processed sentinel it is rewritten to, so a processed marker is never
//! reported as work to do.

use crate::lexer::CodeLine;
use headergen_core::entities::MarkerOccurrence;
use headergen_core::error::{Error, Result};
use regex::Regex;
use std::sync::LazyLock;

/// Lines that invoke a framework macro, e.g. `COMPONENT`, `DefineStandardPointers(User)`
static MACRO_CALL: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^[A-Z]\w*\s*(?:\([^;{}]*\)\s*;?|;)?$").ok());

static TEMPLATE_HEAD: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^template\s*<[^{};]*>$").ok());

static ACCESS_SPECIFIER: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"(?i)^\s*(public|private|protected)\s*:").ok());

/// How a marker is written in source
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerStyle {
    /// `/* @Name */`, processed as `/*--@Name--*/`
    Block,
    /// `/// @Name`, processed as `/* @Name */`
    DocLine,
    /// `/// @Name` with no processed form; consumed during extraction
    DocLineUnmutated,
}

/// Recognizer for one logical marker name
#[derive(Debug, Clone)]
pub struct MarkerSyntax {
    name: String,
    style: MarkerStyle,
    unprocessed: Regex,
    processed: Option<Regex>,
}

impl MarkerSyntax {
    pub fn new(name: &str, style: MarkerStyle) -> Result<Self> {
        if name.is_empty() || !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
            return Err(Error::invalid_input(format!("Invalid marker name '{name}'")));
        }
        let escaped = regex::escape(name);
        let (unprocessed, processed) = match style {
            MarkerStyle::Block => (
                format!(r"/\*\s*@{escaped}\s*\*/"),
                Some(format!(r"/\*--\s*@{escaped}\s*--\*/")),
            ),
            MarkerStyle::DocLine => (
                format!(r"///\s*@{escaped}\b"),
                Some(format!(r"/\*\s*@{escaped}\s*\*/")),
            ),
            MarkerStyle::DocLineUnmutated => (format!(r"///\s*@{escaped}\b"), None),
        };
        let compile = |pattern: &str| {
            Regex::new(pattern)
                .map_err(|e| Error::invalid_input(format!("Invalid marker pattern: {e}")))
        };
        Ok(Self {
            name: name.to_string(),
            style,
            unprocessed: compile(&unprocessed)?,
            processed: processed.as_deref().map(compile).transpose()?,
        })
    }

    /// `/* @Name */` style marker
    pub fn block(name: &str) -> Result<Self> {
        Self::new(name, MarkerStyle::Block)
    }

    /// `/// @Name` style marker
    pub fn doc_line(name: &str) -> Result<Self> {
        Self::new(name, MarkerStyle::DocLine)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn style(&self) -> MarkerStyle {
        self.style
    }

    /// Text the marker is rewritten to once processed
    pub fn processed_text(&self) -> Option<String> {
        match self.style {
            MarkerStyle::Block => Some(format!("/*--@{}--*/", self.name)),
            MarkerStyle::DocLine => Some(format!("/* @{} */", self.name)),
            MarkerStyle::DocLineUnmutated => None,
        }
    }

    /// Byte range of an unprocessed marker on the line, if any
    pub fn find_unprocessed(&self, line: &str) -> Option<std::ops::Range<usize>> {
        self.unprocessed
            .find_iter(line)
            .find(|m| !commented_out(line, m.start()))
            .map(|m| m.range())
    }

    /// Byte range of a processed marker on the line, if any
    pub fn find_processed(&self, line: &str) -> Option<std::ops::Range<usize>> {
        self.processed.as_ref().and_then(|re| {
            re.find_iter(line)
                .find(|m| !commented_out(line, m.start()))
                .map(|m| m.range())
        })
    }

    pub fn is_unprocessed(&self, line: &str) -> bool {
        self.find_unprocessed(line).is_some()
    }

    pub fn is_processed(&self, line: &str) -> bool {
        self.find_processed(line).is_some()
    }
}

/// A marker preceded by `//` on the same line is commented out
fn commented_out(line: &str, at: usize) -> bool {
    line[..at].contains("//")
}

/// Every occurrence of the marker, in line order
///
/// A line holding the processed form is reported as processed even if it
/// also happens to match the unprocessed pattern.
pub fn find_markers<S: AsRef<str>>(lines: &[S], syntax: &MarkerSyntax) -> Vec<MarkerOccurrence> {
    lines
        .iter()
        .enumerate()
        .filter_map(|(idx, line)| {
            let line = line.as_ref();
            let processed = if syntax.is_processed(line) {
                true
            } else if syntax.is_unprocessed(line) {
                false
            } else {
                return None;
            };
            Some(MarkerOccurrence {
                logical_name: syntax.name().to_string(),
                line: idx + 1,
                processed,
            })
        })
        .collect()
}

/// Only the occurrences still waiting to be processed
pub fn find_unprocessed_markers<S: AsRef<str>>(
    lines: &[S],
    syntax: &MarkerSyntax,
) -> Vec<MarkerOccurrence> {
    find_markers(lines, syntax)
        .into_iter()
        .filter(|m| !m.processed)
        .collect()
}

/// Bounded lookahead window and the lines it may step over
#[derive(Debug, Clone, Copy)]
pub struct Lookahead {
    /// Lines examined after the marker line
    pub window: usize,
    /// Step over macro invocation lines and `template<...>` heads
    pub skip_macro_lines: bool,
}

impl Lookahead {
    /// Window used when looking for the class a marker annotates
    pub fn for_class(window: usize) -> Self {
        Self {
            window,
            skip_macro_lines: true,
        }
    }

    /// Window used when looking for the field a marker annotates
    pub fn for_field(window: usize) -> Self {
        Self {
            window,
            skip_macro_lines: false,
        }
    }
}

/// Associates the marker at 1-indexed `marker_line` with the declaration that follows
///
/// The marker line itself is examined first, so `/* @Id */ int id;` associates
/// with its own line. Blank and comment-only lines are skipped. Any other line
/// that is not a target ends the search and the marker is dropped.
pub fn associate<F>(
    code: &[CodeLine],
    marker_line: usize,
    lookahead: Lookahead,
    is_target: F,
) -> Option<usize>
where
    F: Fn(&str) -> bool,
{
    let first = marker_line.checked_sub(1)?;
    let last = (first + lookahead.window).min(code.len().saturating_sub(1));

    for idx in first..=last {
        let line = code.get(idx)?;
        let text = line.trimmed();
        if text.is_empty() {
            continue;
        }
        if is_target(text) {
            return Some(idx + 1);
        }
        if is_access_specifier(text) {
            return None;
        }
        if lookahead.skip_macro_lines && (is_macro_call(text) || is_template_head(text)) {
            continue;
        }
        return None;
    }

    None
}

pub fn is_access_specifier(code: &str) -> bool {
    ACCESS_SPECIFIER
        .as_ref()
        .is_some_and(|re| re.is_match(code))
}

pub fn is_macro_call(code: &str) -> bool {
    MACRO_CALL
        .as_ref()
        .is_some_and(|re| re.is_match(code.trim()))
}

pub fn is_template_head(code: &str) -> bool {
    TEMPLATE_HEAD
        .as_ref()
        .is_some_and(|re| re.is_match(code.trim()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::code_lines;
    use pretty_assertions::assert_eq;

    fn is_class(code: &str) -> bool {
        code.starts_with("class ")
    }

    #[test]
    fn test_block_marker_forms() {
        let entity = MarkerSyntax::block("Entity").expect("valid marker");
        assert!(entity.is_unprocessed("/* @Entity */"));
        assert!(entity.is_unprocessed("  /*@Entity*/"));
        assert!(!entity.is_unprocessed("/*--@Entity--*/"));
        assert!(entity.is_processed("/*--@Entity--*/"));
        assert!(entity.is_processed("  /*-- @Entity --*/"));
        assert!(!entity.is_unprocessed("// /* @Entity */"));
        assert!(!entity.is_unprocessed("/* @EntityX */"));
        assert_eq!(entity.processed_text().as_deref(), Some("/*--@Entity--*/"));
    }

    #[test]
    fn test_doc_line_marker_forms() {
        let repo = MarkerSyntax::doc_line("Repository").expect("valid marker");
        assert!(repo.is_unprocessed("/// @Repository"));
        assert!(!repo.is_unprocessed("/// @RepositoryBase"));
        assert!(repo.is_processed("/* @Repository */"));
        assert!(!repo.is_processed("/// @Repository"));
        assert_eq!(repo.processed_text().as_deref(), Some("/* @Repository */"));
    }

    #[test]
    fn test_unmutated_marker_has_no_processed_form() {
        let marker = MarkerSyntax::new("NotBlank", MarkerStyle::DocLineUnmutated)
            .expect("valid marker");
        assert!(marker.is_unprocessed("    /// @NotBlank"));
        assert!(!marker.is_processed("/* @NotBlank */"));
        assert_eq!(marker.processed_text(), None);
    }

    #[test]
    fn test_invalid_marker_name() {
        assert!(MarkerSyntax::block("@Entity").is_err());
        assert!(MarkerSyntax::block("").is_err());
    }

    #[test]
    fn test_find_markers_reports_processed_state() {
        let lines = ["/*--@Entity--*/", "class A {};", "/* @Entity */", "class B {};"];
        let syntax = MarkerSyntax::block("Entity").expect("valid marker");
        let found = find_markers(&lines, &syntax);
        assert_eq!(
            found,
            vec![
                MarkerOccurrence {
                    logical_name: "Entity".to_string(),
                    line: 1,
                    processed: true,
                },
                MarkerOccurrence {
                    logical_name: "Entity".to_string(),
                    line: 3,
                    processed: false,
                },
            ]
        );
        assert_eq!(find_unprocessed_markers(&lines, &syntax).len(), 1);
    }

    #[test]
    fn test_associate_skips_blank_comment_and_macro_lines() {
        let lines = [
            "/* @Entity */",
            "",
            "// docs",
            "COMPONENT",
            "template<typename T>",
            "class User {",
        ];
        let code = code_lines(&lines);
        assert_eq!(associate(&code, 1, Lookahead::for_class(10), is_class), Some(6));
    }

    #[test]
    fn test_associate_respects_window() {
        let mut lines = vec!["/* @Entity */"];
        lines.extend(std::iter::repeat_n("", 10));
        lines.push("class User {");
        let code = code_lines(&lines);
        assert_eq!(associate(&code, 1, Lookahead::for_class(10), is_class), None);
        assert_eq!(associate(&code, 1, Lookahead::for_class(11), is_class), Some(12));
    }

    #[test]
    fn test_associate_stops_at_unrelated_code() {
        let lines = ["/* @Entity */", "int stray;", "class User {"];
        let code = code_lines(&lines);
        assert_eq!(associate(&code, 1, Lookahead::for_class(10), is_class), None);
    }

    #[test]
    fn test_associate_stops_at_access_specifier() {
        let lines = ["/* @Id */", "public:", "int id;"];
        let code = code_lines(&lines);
        assert_eq!(
            associate(&code, 1, Lookahead::for_field(15), |c| c.ends_with(';')),
            None
        );
    }

    #[test]
    fn test_associate_same_line_target() {
        let lines = ["    /* @Id */ int id;"];
        let code = code_lines(&lines);
        assert_eq!(
            associate(&code, 1, Lookahead::for_field(15), |c| c.ends_with(';')),
            Some(1)
        );
    }

    #[test]
    fn test_field_lookahead_does_not_skip_macros() {
        let lines = ["/* @Id */", "SCOPE", "int id;"];
        let code = code_lines(&lines);
        assert_eq!(
            associate(&code, 1, Lookahead::for_field(15), |c| c.ends_with(';')),
            None
        );
    }

    #[test]
    fn test_macro_call_recognition() {
        assert!(is_macro_call("COMPONENT"));
        assert!(is_macro_call("DefineStandardPointers(UserRepository)"));
        assert!(is_macro_call("Dto;"));
        assert!(!is_macro_call("class User {"));
        assert!(!is_macro_call("Public: int x;"));
        assert!(!is_macro_call("int x;"));
    }
}
