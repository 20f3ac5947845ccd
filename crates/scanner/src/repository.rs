//! Repository interface detection
//!
//! A repository header names its class through the pointer macro, carries a
//! `/// @Repository` marker in front of the class and derives from the
//! repository base:
//!
//! ```text
//! DefineStandardPointers(UserRepository)
//! /// @Repository
//! class UserRepository : public CpaRepository<User, int> {
//! ```

use crate::boundary::{find_span_in_code, DeclarationMatcher};
use crate::lexer::{code_lines, CodeLine};
use crate::markers::{associate, find_markers, Lookahead, MarkerSyntax};
use headergen_core::config::{MarkersConfig, RepositoryConfig, ScannerConfig};
use headergen_core::entities::{MarkerOccurrence, RepositoryDescriptor, TypeKind, TypeSpan};
use regex::Regex;
use tracing::debug;

/// Lines joined when reading a class head that wraps before its `{`
const MAX_HEAD_LINES: usize = 5;

/// A detected repository with the marker and class span it came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryDetection {
    pub descriptor: RepositoryDescriptor,
    pub marker: MarkerOccurrence,
    pub span: TypeSpan,
}

impl RepositoryDetection {
    /// Whether the marker was already flipped by an earlier run
    pub fn is_processed(&self) -> bool {
        self.marker.processed
    }
}

/// Detects the repository declared in a header, processed or not
///
/// When any processed marker is present the file counts as processed and the
/// detection carries that marker, so callers can regenerate a missing
/// implementation without touching the header again.
pub fn detect_repository<S: AsRef<str>>(
    lines: &[S],
    markers: &MarkersConfig,
    scanner: &ScannerConfig,
    repository: &RepositoryConfig,
) -> Option<RepositoryDetection> {
    let syntax = MarkerSyntax::doc_line(&markers.repository_marker).ok()?;
    let occurrences = find_markers(lines, &syntax);
    let marker = occurrences
        .iter()
        .find(|m| m.processed)
        .or_else(|| occurrences.first())?
        .clone();

    let code = code_lines(lines);
    let class_name = pointer_macro_name(
        code.iter().map(|c| c.code.as_str()),
        &repository.pointer_macro,
    )?;
    let matcher = DeclarationMatcher::new(&class_name, TypeKind::Class)?;

    let Some(target) = associate(
        &code,
        marker.line,
        Lookahead::for_class(scanner.class_lookahead),
        |text| matcher.matches(text),
    ) else {
        debug!(
            "@{} at line {} does not precede class {class_name}",
            markers.repository_marker, marker.line
        );
        return None;
    };

    let span = find_span_in_code(&code, &matcher, &class_name, target)?;
    if span.start_line != target {
        return None;
    }

    let head = class_head(&code, span.start_line);
    let Some((entity_type, id_type)) =
        base_arguments(&head, &class_name, &repository.base_interface)
    else {
        debug!(
            "{class_name} does not derive from {}<Entity, ID>",
            repository.base_interface
        );
        return None;
    };

    let previous = code[..span.start_line - 1]
        .iter()
        .rev()
        .find(|c| !c.is_blank())
        .map_or("", |c| c.trimmed());
    let is_templated = is_templated(&format!("{previous} {head}"), &class_name);

    Some(RepositoryDetection {
        descriptor: RepositoryDescriptor {
            class_name,
            entity_type,
            id_type,
            is_templated,
        },
        marker,
        span,
    })
}

/// Class name passed to the first `<pointer_macro>(Name)` invocation
pub fn pointer_macro_name<'a, I>(code: I, pointer_macro: &str) -> Option<String>
where
    I: IntoIterator<Item = &'a str>,
{
    let re = Regex::new(&format!(r"\b{}\s*\(\s*(\w+)\s*\)", regex::escape(pointer_macro))).ok()?;
    code.into_iter()
        .find_map(|line| re.captures(line).map(|caps| caps[1].to_string()))
}

/// Declaration text from the class keyword up to the opening brace
fn class_head(code: &[CodeLine], start_line: usize) -> String {
    let mut head = String::new();
    for line in code.iter().skip(start_line - 1).take(MAX_HEAD_LINES) {
        head.push_str(line.trimmed());
        head.push(' ');
        if line.opens > 0 {
            break;
        }
    }
    head
}

/// Entity and ID arguments of `public [virtual] <base><E, ID>`
pub fn base_arguments(head: &str, class_name: &str, base: &str) -> Option<(String, String)> {
    let re = Regex::new(&format!(
        r"(?:class|struct)\s+{}\s*(?:final\s*)?:\s*public\s+(?:virtual\s+)?{}\s*<\s*([^,<>]+?)\s*,\s*([^,<>]+?)\s*>",
        regex::escape(class_name),
        regex::escape(base)
    ))
    .ok()?;
    let caps = re.captures(head)?;
    Some((caps[1].to_string(), caps[2].to_string()))
}

fn is_templated(text: &str, class_name: &str) -> bool {
    Regex::new(&format!(
        r"template\s*<[^{{}};]*>\s*(?:class|struct)\s+{}\b",
        regex::escape(class_name)
    ))
    .is_ok_and(|re| re.is_match(text))
}
