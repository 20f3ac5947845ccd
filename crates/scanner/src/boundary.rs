//! Class, struct and enum boundary location
//!
//! A type's extent is found by locating its declaration line and then
//! following the brace balance of the comment-free code until it returns to
//! zero. Malformed input (unbalanced braces, forward declarations only)
//! yields `None` rather than an error.

use crate::lexer::{code_lines, CodeLine};
use headergen_core::entities::{TypeKind, TypeSpan};
use regex::Regex;
use std::sync::LazyLock;
use tracing::debug;

/// Any class/struct/enum declaration; used to enumerate every span in a file
static ANY_DECLARATION: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(
        r"\b(enum\s+class|enum\s+struct|enum|class|struct)\s+([A-Za-z_][A-Za-z0-9_]*)\s*(?:final\b\s*)?(?::|\{|$)",
    )
    .ok()
});

/// Matches the declaration line of one named type
#[derive(Debug, Clone)]
pub struct DeclarationMatcher {
    kind: TypeKind,
    pattern: Regex,
}

impl DeclarationMatcher {
    /// Builds a matcher for `name`; `None` when the name is not an identifier
    pub fn new(name: &str, kind: TypeKind) -> Option<Self> {
        if !is_identifier(name) {
            return None;
        }
        let name = regex::escape(name);
        let pattern = match kind {
            TypeKind::Class | TypeKind::Struct => {
                format!(r"\b(?:class|struct)\s+{name}\b\s*(?:final\b\s*)?(?::|\{{|$)")
            }
            TypeKind::Enum => {
                format!(r"\benum(?:\s+(?:class|struct))?\s+{name}\b\s*(?::[^;{{]*)?(?:\{{|$)")
            }
        };
        Regex::new(&pattern).ok().map(|pattern| Self { kind, pattern })
    }

    /// Whether a comment-free code line declares the type
    pub fn matches(&self, code: &str) -> bool {
        self.find(code).is_some()
    }

    /// Byte offset of the declaration keyword within a comment-free code line
    pub fn find(&self, code: &str) -> Option<usize> {
        let code = code.trim_end();
        self.pattern
            .find_iter(code)
            .find(|m| {
                // `enum class Color` is an enum, not a class named Color
                self.kind == TypeKind::Enum || !code[..m.start()].trim_end().ends_with("enum")
            })
            .map(|m| m.start())
    }
}

/// Locates the span of type `name`, searching from the top of the file
pub fn find_type_span<S: AsRef<str>>(lines: &[S], name: &str, kind: TypeKind) -> Option<TypeSpan> {
    find_type_span_from(lines, name, kind, 1)
}

/// Locates the span of type `name`, starting the search at the 1-indexed `from_line`
pub fn find_type_span_from<S: AsRef<str>>(
    lines: &[S],
    name: &str,
    kind: TypeKind,
    from_line: usize,
) -> Option<TypeSpan> {
    let matcher = DeclarationMatcher::new(name, kind)?;
    let code = code_lines(lines);
    find_span_in_code(&code, &matcher, name, from_line)
}

/// Same as [`find_type_span_from`] over lines that were already lexed
pub fn find_span_in_code(
    code: &[CodeLine],
    matcher: &DeclarationMatcher,
    name: &str,
    from_line: usize,
) -> Option<TypeSpan> {
    let start_idx = from_line.saturating_sub(1);
    let mut idx = start_idx;

    while idx < code.len() {
        let line = &code[idx];
        let Some(offset) = matcher.find(&line.code).filter(|_| !line.is_blank()) else {
            idx += 1;
            continue;
        };

        match follow_braces(code, idx, offset) {
            BraceWalk::Closed(end_idx) => {
                return Some(TypeSpan {
                    name: name.to_string(),
                    kind: matcher.kind,
                    start_line: idx + 1,
                    end_line: end_idx + 1,
                });
            }
            BraceWalk::ForwardDeclaration(end_idx) => {
                debug!("Skipping forward declaration of {name} at line {}", idx + 1);
                idx = end_idx + 1;
            }
            BraceWalk::Unbalanced => {
                debug!("Unbalanced braces after declaration of {name} at line {}", idx + 1);
                return None;
            }
        }
    }

    None
}

enum BraceWalk {
    Closed(usize),
    ForwardDeclaration(usize),
    Unbalanced,
}

/// Walks braces from the declaration keyword at `offset` on line `start_idx`
fn follow_braces(code: &[CodeLine], start_idx: usize, offset: usize) -> BraceWalk {
    let mut balance: i64 = 0;
    let mut seen_open = false;

    for (idx, line) in code.iter().enumerate().skip(start_idx) {
        let from = if idx == start_idx { offset } else { 0 };
        let braces: Vec<char> = line
            .braces
            .iter()
            .filter(|(pos, _)| *pos >= from)
            .map(|(_, c)| *c)
            .collect();
        if !seen_open && braces.is_empty() && line.code.get(from..).is_some_and(|c| c.contains(';')) {
            return BraceWalk::ForwardDeclaration(idx);
        }
        for brace in braces {
            if brace == '{' {
                balance += 1;
                seen_open = true;
                continue;
            }
            balance -= 1;
            if balance < 0 {
                return BraceWalk::Unbalanced;
            }
            if balance == 0 {
                return BraceWalk::Closed(idx);
            }
        }
    }

    BraceWalk::Unbalanced
}

/// Every class, struct and enum span in the file, in declaration order
pub fn find_all_type_spans<S: AsRef<str>>(lines: &[S]) -> Vec<TypeSpan> {
    let Some(any) = ANY_DECLARATION.as_ref() else {
        return Vec::new();
    };
    let code = code_lines(lines);
    let mut spans = Vec::new();

    for (idx, line) in code.iter().enumerate() {
        let text = line.code.trim_end();
        for caps in any.captures_iter(text) {
            let keyword = &caps[1];
            let name = &caps[2];
            let kind = if keyword.starts_with("enum") {
                TypeKind::Enum
            } else if keyword == "struct" {
                TypeKind::Struct
            } else {
                TypeKind::Class
            };
            if kind != TypeKind::Enum && text[..caps.get(0).map_or(0, |m| m.start())]
                .trim_end()
                .ends_with("enum")
            {
                continue;
            }
            let Some(matcher) = DeclarationMatcher::new(name, kind) else {
                continue;
            };
            if let Some(mut span) = find_span_in_code(&code, &matcher, name, idx + 1) {
                if span.start_line == idx + 1 {
                    span.kind = kind;
                    spans.push(span);
                }
            }
        }
    }

    spans
}

/// 0-indexed lines strictly inside the span that start at class-body depth 1
///
/// Lines inside nested types and method bodies start deeper and are left out.
pub fn member_lines(code: &[CodeLine], span: &TypeSpan) -> Vec<usize> {
    let start_idx = span.start_line.saturating_sub(1);
    let end_idx = span.end_line.saturating_sub(1);
    let Some(first) = code.get(start_idx) else {
        return Vec::new();
    };
    let offset = DeclarationMatcher::new(&span.name, span.kind)
        .and_then(|m| m.find(&first.code))
        .unwrap_or(0);
    let mut depth: i64 = first
        .braces
        .iter()
        .filter(|(pos, _)| *pos >= offset)
        .map(|(_, c)| if *c == '{' { 1 } else { -1 })
        .sum();

    let mut members = Vec::new();
    for idx in start_idx + 1..end_idx.min(code.len()) {
        if depth == 1 {
            members.push(idx);
        }
        depth += code[idx].delta();
    }
    members
}

pub(crate) fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}
