//! Member function declaration extraction
//!
//! Declarations are recognized by a small registry of matchers tried in
//! order. The strict matcher requires the framework's explicit access macro;
//! the fallback matcher accepts plain declarations when they look like part
//! of an interface.

use crate::boundary::member_lines;
use crate::fields::split_access_label;
use crate::lexer::{code_lines, CodeLine};
use headergen_core::entities::{MethodDecl, TypeSpan};
use regex::{Captures, Regex};
use std::collections::HashSet;
use std::sync::LazyLock;
use tracing::debug;

const DECLARATION_TAIL: &str = concat!(
    r"(?:(const)\s+)?",
    r"([A-Za-z_][A-Za-z0-9_<>:&*,\s]*?)\s*\b([A-Za-z_][A-Za-z0-9_]*)\s*",
    r"\(([^()]*)\)\s*(const)?\s*(override)?\s*(=\s*0)?\s*;$",
);

static STRICT: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(&format!(
        r"^(Public|Private|Protected)\s+((?:(?:Virtual|Static|virtual|static|inline)\s+)*){DECLARATION_TAIL}"
    ))
    .ok()
});

static FALLBACK: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(&format!(
        r"^((?:(?:Virtual|Static|virtual|static|inline|explicit)\s+)*){DECLARATION_TAIL}"
    ))
    .ok()
});

/// Words that can never be a method name or the start of a return type
const KEYWORDS: &[&str] = &[
    "Public", "Private", "Protected", "Virtual", "Static", "const", "override", "if", "for",
    "while", "switch", "return", "delete", "new", "throw", "else", "case", "goto", "using",
    "typedef", "friend", "sizeof", "operator",
];

/// Which matcher recognized a declaration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchStrategy {
    Strict,
    Fallback,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodMatch {
    pub decl: MethodDecl,
    pub strategy: MatchStrategy,
}

/// One way of recognizing a method declaration statement
pub trait MethodMatcher: Send + Sync {
    /// Name of this matcher for logging
    fn name(&self) -> &'static str;

    fn strategy(&self) -> MatchStrategy;

    /// Parses a single comment-free statement ending in `;`
    fn try_match(&self, statement: &str) -> Option<MethodDecl>;
}

/// Requires `Public`, `Private` or `Protected` in front of the declaration
pub struct StrictMatcher;

impl MethodMatcher for StrictMatcher {
    fn name(&self) -> &'static str {
        "strict"
    }

    fn strategy(&self) -> MatchStrategy {
        MatchStrategy::Strict
    }

    fn try_match(&self, statement: &str) -> Option<MethodDecl> {
        let caps = STRICT.as_ref()?.captures(statement)?;
        let mut modifiers = vec![caps.get(1)?.as_str().to_string()];
        modifiers.extend(words(caps.get(2).map_or("", |m| m.as_str())));
        declaration_from(&caps, 3, modifiers)
    }
}

/// Same grammar without the access macro
///
/// Only accepted for `override`, pure virtual or capitalized names, which
/// keeps stray statements out of the result.
pub struct FallbackMatcher;

impl MethodMatcher for FallbackMatcher {
    fn name(&self) -> &'static str {
        "fallback"
    }

    fn strategy(&self) -> MatchStrategy {
        MatchStrategy::Fallback
    }

    fn try_match(&self, statement: &str) -> Option<MethodDecl> {
        let caps = FALLBACK.as_ref()?.captures(statement)?;
        let modifiers = words(caps.get(1).map_or("", |m| m.as_str()));
        let decl = declaration_from(&caps, 2, modifiers)?;
        let capitalized = decl.name.chars().next().is_some_and(|c| c.is_ascii_uppercase());
        (decl.is_override || decl.is_pure || capitalized).then_some(decl)
    }
}

fn words(text: &str) -> Vec<String> {
    text.split_whitespace().map(str::to_string).collect()
}

/// Builds the declaration from the shared tail groups starting at `first`
fn declaration_from(caps: &Captures, first: usize, modifiers: Vec<String>) -> Option<MethodDecl> {
    let group = |offset: usize| caps.get(first + offset).map(|m| m.as_str());
    let leading_const = group(0).is_some();
    let return_type = group(1)?.trim();
    let name = group(2)?;

    let first_word = return_type.split_whitespace().next().unwrap_or_default();
    if return_type.is_empty() || KEYWORDS.contains(&name) || KEYWORDS.contains(&first_word) {
        return None;
    }

    let return_type = if leading_const {
        format!("const {return_type}")
    } else {
        return_type.to_string()
    };

    Some(MethodDecl {
        access_modifiers: modifiers,
        return_type,
        name: name.to_string(),
        parameter_list: group(3).unwrap_or_default().trim().to_string(),
        is_const: group(4).is_some(),
        is_override: group(5).is_some(),
        is_pure: group(6).is_some(),
        line: 0,
    })
}

static STRICT_MATCHER: StrictMatcher = StrictMatcher;
static FALLBACK_MATCHER: FallbackMatcher = FallbackMatcher;
static STANDARD_MATCHERS: &[&dyn MethodMatcher] = &[&STRICT_MATCHER, &FALLBACK_MATCHER];

/// Registry of method matchers, tried in order until one matches
pub struct MethodExtractor {
    matchers: Vec<&'static dyn MethodMatcher>,
}

impl Default for MethodExtractor {
    fn default() -> Self {
        Self::from_matchers(STANDARD_MATCHERS)
    }
}

impl MethodExtractor {
    pub fn from_matchers(matchers: &'static [&'static dyn MethodMatcher]) -> Self {
        Self {
            matchers: matchers.to_vec(),
        }
    }

    /// Tries every matcher on one statement
    pub fn match_statement(&self, statement: &str) -> Option<MethodMatch> {
        self.matchers.iter().find_map(|matcher| {
            matcher.try_match(statement).map(|decl| MethodMatch {
                decl,
                strategy: matcher.strategy(),
            })
        })
    }

    /// Every method declared at class-body depth 1, deduplicated by name
    pub fn extract<S: AsRef<str>>(&self, lines: &[S], span: &TypeSpan) -> Vec<MethodMatch> {
        let code = code_lines(lines);
        let mut seen = HashSet::new();
        let mut found = Vec::new();

        for (line, statement) in statements(&code, &member_lines(&code, span)) {
            let Some(mut matched) = self.match_statement(&statement) else {
                continue;
            };
            if !seen.insert(matched.decl.name.clone()) {
                continue;
            }
            debug!(
                "Found method {}::{} ({:?})",
                span.name, matched.decl.name, matched.strategy
            );
            matched.decl.line = line;
            found.push(matched);
        }

        found
    }

    pub fn len(&self) -> usize {
        self.matchers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.matchers.is_empty()
    }
}

/// Extracts methods with the standard matchers
pub fn extract_methods<S: AsRef<str>>(lines: &[S], span: &TypeSpan) -> Vec<MethodMatch> {
    MethodExtractor::default().extract(lines, span)
}

/// Joins declarations that wrap over several lines into single statements
///
/// Returns the 1-indexed first line of each statement with its text.
fn statements(code: &[CodeLine], members: &[usize]) -> Vec<(usize, String)> {
    let mut out = Vec::new();
    let mut pending: Option<(usize, String)> = None;

    for &idx in members {
        let text = code[idx].trimmed();
        if text.is_empty() {
            continue;
        }
        let text = split_access_label(text).map_or(text, |(_, rest)| rest.trim());

        let (start, joined) = match pending.take() {
            Some((start, mut joined)) => {
                joined.push(' ');
                joined.push_str(text);
                (start, joined)
            }
            None => (idx + 1, text.to_string()),
        };

        let opens = joined.matches('(').count();
        let closes = joined.matches(')').count();
        if opens > closes && !joined.contains('{') && !joined.ends_with(';') {
            pending = Some((start, joined));
            continue;
        }
        out.push((start, joined));
    }

    out
}
