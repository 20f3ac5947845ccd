//! Splices generated members into a class body
//!
//! Members go after the last line of real code before the closing brace,
//! indented like that line. Nothing else in the file changes.

use crate::writer::indent_lines;
use headergen_core::entities::TypeSpan;
use headergen_core::source::SourceBuffer;
use headergen_scanner::{code_lines, is_comment_line, member_lines};
use tracing::debug;

/// Text whose joint presence means the members were injected before
const GENERATED_SIGNATURES: &[&str] = &["Serialize()", "Deserialize(", "GetPrimaryKey()"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InjectOutcome {
    /// Inserted after the given 1-indexed line
    Injected { after_line: usize, line_count: usize },
    /// The class already carries the generated members
    AlreadyPresent,
    /// The class opens and closes on a single line
    NotInjectable,
}

impl InjectOutcome {
    pub fn is_injected(&self) -> bool {
        matches!(self, InjectOutcome::Injected { .. })
    }
}

/// Whether the class's own members already include every generated signature
///
/// Only lines at class-body depth count, so members generated into a
/// nested class do not hide the enclosing one.
pub fn already_generated(buffer: &SourceBuffer, span: &TypeSpan) -> bool {
    let lines = buffer.lines();
    let code = code_lines(&lines);
    let members: Vec<&str> = member_lines(&code, span)
        .into_iter()
        .filter_map(|idx| code.get(idx).map(|c| c.code.as_str()))
        .collect();
    GENERATED_SIGNATURES
        .iter()
        .all(|sig| members.iter().any(|line| line.contains(sig)))
}

/// 1-indexed line to insert after, plus the indentation to use
///
/// Comment-only and blank lines right before the closing brace are skipped,
/// so a trailing comment block stays attached to the end of the class.
pub fn insertion_point(
    buffer: &SourceBuffer,
    span: &TypeSpan,
    default_indent: &str,
) -> Option<(usize, String)> {
    if span.start_line >= span.end_line {
        return None;
    }
    let after = (span.start_line..span.end_line)
        .rev()
        .find(|&n| {
            buffer
                .line(n)
                .is_some_and(|text| !text.trim().is_empty() && !is_comment_line(text))
        })
        .unwrap_or(span.end_line - 1);

    let anchor = buffer.line(after).unwrap_or_default();
    let leading = &anchor[..anchor.len() - anchor.trim_start().len()];
    let indent = if leading.is_empty() {
        default_indent.to_string()
    } else {
        leading.to_string()
    };
    Some((after, indent))
}

/// Injects `members` into the class, preceded by one blank line
pub fn inject_members(
    buffer: &mut SourceBuffer,
    span: &TypeSpan,
    members: &[String],
    default_indent: &str,
) -> InjectOutcome {
    if already_generated(buffer, span) {
        debug!("{} already has generated members", span.name);
        return InjectOutcome::AlreadyPresent;
    }
    let Some((after, indent)) = insertion_point(buffer, span, default_indent) else {
        debug!("{} is declared on a single line", span.name);
        return InjectOutcome::NotInjectable;
    };

    let mut lines = Vec::with_capacity(members.len() + 1);
    lines.push(String::new());
    lines.extend(indent_lines(members, &indent));
    let line_count = lines.len();
    buffer.insert_after(after, lines);
    debug!(
        "Injected {line_count} line(s) into {} after line {after}",
        span.name
    );
    InjectOutcome::Injected {
        after_line: after,
        line_count,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use headergen_core::entities::TypeKind;
    use pretty_assertions::assert_eq;

    fn span(start: usize, end: usize) -> TypeSpan {
        TypeSpan {
            name: "Customer".to_string(),
            kind: TypeKind::Class,
            start_line: start,
            end_line: end,
        }
    }

    #[test]
    fn test_inject_after_last_code_line() {
        let mut buffer = SourceBuffer::from_text(concat!(
            "class Customer {\n",
            "  Public:\n",
            "    optional<int> id;\n",
            "\n",
            "    // trailing note\n",
            "};\n",
        ));
        let outcome = inject_members(
            &mut buffer,
            &span(1, 6),
            &["void A() {".to_string(), "".to_string(), "    x();".to_string(), "}".to_string()],
            "    ",
        );
        assert_eq!(
            outcome,
            InjectOutcome::Injected {
                after_line: 3,
                line_count: 5
            }
        );
        assert_eq!(
            buffer.text(),
            concat!(
                "class Customer {\n",
                "  Public:\n",
                "    optional<int> id;\n",
                "\n",
                "    void A() {\n",
                "\n",
                "        x();\n",
                "    }\n",
                "\n",
                "    // trailing note\n",
                "};\n",
            )
        );
    }

    #[test]
    fn test_trailing_block_comment_stays_at_end() {
        let buffer = SourceBuffer::from_text(concat!(
            "class Customer {\n",
            "  Public:\n",
            "      optional<int> id;\n",
            "    /*\n",
            "     * reserved for audit columns\n",
            "     */\n",
            "};\n",
        ));
        assert_eq!(
            insertion_point(&buffer, &span(1, 7), "    "),
            Some((3, "      ".to_string()))
        );
    }

    #[test]
    fn test_empty_body_uses_default_indent() {
        let mut buffer = SourceBuffer::from_text("class Customer {\n};\n");
        let outcome = inject_members(&mut buffer, &span(1, 2), &["int x;".to_string()], "\t");
        assert!(outcome.is_injected());
        assert_eq!(buffer.text(), "class Customer {\n\n\tint x;\n};\n");
    }

    #[test]
    fn test_single_line_class_is_refused() {
        let mut buffer = SourceBuffer::from_text("class Customer { int x; };\n");
        let outcome = inject_members(&mut buffer, &span(1, 1), &["int y;".to_string()], "    ");
        assert_eq!(outcome, InjectOutcome::NotInjectable);
        assert!(!buffer.is_modified());
    }

    #[test]
    fn test_existing_members_are_detected() {
        let mut buffer = SourceBuffer::from_text(concat!(
            "class Customer {\n",
            "    StdString Serialize() const;\n",
            "    static Customer Deserialize(const StdString& s);\n",
            "    int GetPrimaryKey();\n",
            "};\n",
        ));
        let outcome = inject_members(&mut buffer, &span(1, 5), &["int y;".to_string()], "    ");
        assert_eq!(outcome, InjectOutcome::AlreadyPresent);
        assert!(!buffer.is_modified());
    }

    #[test]
    fn test_nested_members_do_not_count() {
        let buffer = SourceBuffer::from_text(concat!(
            "class Customer {\n",
            "    class Inner {\n",
            "        StdString Serialize() const;\n",
            "        static Inner Deserialize(const StdString& s);\n",
            "        int GetPrimaryKey();\n",
            "    };\n",
            "    // StdString Serialize() const;\n",
            "};\n",
        ));
        assert!(!already_generated(&buffer, &span(1, 8)));
    }
}
