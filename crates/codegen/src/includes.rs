//! `#include` directive insertion

use headergen_core::source::SourceBuffer;
use headergen_scanner::{strip_comments, strip_comments_preserving_lines};
use regex::Regex;
use std::sync::LazyLock;
use tracing::debug;

static LAST_ENDIF: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^\s*#endif\s*(//.*|/\*.*\*/)?\s*$").ok());

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IncludeOutcome {
    /// Added at the given 1-indexed line
    Added(usize),
    AlreadyPresent,
}

impl IncludeOutcome {
    pub fn is_added(self) -> bool {
        matches!(self, IncludeOutcome::Added(_))
    }
}

fn undelimited(target: &str) -> String {
    target
        .chars()
        .filter(|c| !matches!(c, '<' | '>' | '"'))
        .collect::<String>()
        .trim()
        .to_string()
}

/// Target of a comment-free `#include` line with its delimiters removed
fn included_target(line: &str) -> Option<String> {
    let rest = line.trim_start().strip_prefix('#')?.trim_start();
    Some(undelimited(rest.strip_prefix("include")?))
}

fn joined<S: AsRef<str>>(lines: &[S]) -> String {
    lines
        .iter()
        .map(|line| line.as_ref())
        .collect::<Vec<&str>>()
        .join("\n")
}

/// Whether some `#include` already names `target`, ignoring `<>` and `""`
///
/// Includes that are commented out do not count.
pub fn has_include<S: AsRef<str>>(lines: &[S], target: &str) -> bool {
    let wanted = undelimited(target);
    strip_comments(&joined(lines))
        .lines()
        .filter_map(included_target)
        .any(|found| found == wanted)
}

/// Line an include is placed after: the last `#include`, else the header
/// guard `#define`, else `#pragma once`, else the top of the file
///
/// Directives inside comments are not anchors.
fn include_anchor<S: AsRef<str>>(lines: &[S]) -> usize {
    let code = strip_comments_preserving_lines(&joined(lines));
    let lines: Vec<&str> = code.lines().collect();
    let guard = || {
        lines.iter().position(|l| {
            let l = l.trim();
            l.starts_with("#define") && l.contains("_H")
        })
    };
    let pragma = || lines.iter().position(|l| l.trim().starts_with("#pragma once"));

    lines
        .iter()
        .rposition(|l| l.trim().starts_with("#include"))
        .or_else(guard)
        .or_else(pragma)
        .map_or(0, |idx| idx + 1)
}

/// Adds `#include <target>` unless an equivalent include exists
///
/// `target` carries its own delimiters, e.g. `<optional>`.
pub fn ensure_include(buffer: &mut SourceBuffer, target: &str) -> IncludeOutcome {
    let lines = buffer.lines();
    if has_include(&lines, target) {
        return IncludeOutcome::AlreadyPresent;
    }
    let after = include_anchor(&lines);
    buffer.insert_after(after, vec![format!("#include {target}")]);
    debug!("Added #include {target} to {}", buffer.display_name());
    IncludeOutcome::Added(after + 1)
}

/// Adds `#include "<path>"` before the last `#endif`, or at the end
pub fn ensure_back_include(buffer: &mut SourceBuffer, path: &str) -> IncludeOutcome {
    let lines = buffer.lines();
    if has_include(&lines, path) {
        return IncludeOutcome::AlreadyPresent;
    }
    let endif = LAST_ENDIF.as_ref().and_then(|re| {
        lines
            .iter()
            .rposition(|line| re.is_match(line))
    });
    let after = endif.unwrap_or(lines.len());
    buffer.insert_after(after, vec![format!("#include \"{path}\"")]);
    debug!("Added back-include of {path} to {}", buffer.display_name());
    IncludeOutcome::Added(after + 1)
}
