//! Entity class detection
//!
//! An entity is a class or struct preceded by one of the configured block
//! markers, e.g.
//!
//! ```text
//! /* @Entity */
//! class Customer {
//! ```

use crate::boundary::find_all_type_spans;
use crate::lexer::code_lines;
use crate::markers::{associate, find_unprocessed_markers, Lookahead, MarkerSyntax};
use headergen_core::config::{MarkersConfig, ScannerConfig};
use headergen_core::entities::{MarkerOccurrence, TypeKind, TypeSpan};
use regex::Regex;
use std::sync::LazyLock;
use tracing::debug;

static CLASS_HEAD: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(r"^(?:template\s*<[^{};]*>\s*)?(?:class|struct)\s+[A-Za-z_]\w*").ok()
});

/// An unprocessed entity marker and the class it annotates
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityDetection {
    pub marker: MarkerOccurrence,
    pub span: TypeSpan,
}

impl EntityDetection {
    pub fn class_name(&self) -> &str {
        &self.span.name
    }
}

fn is_class_head(code: &str) -> bool {
    CLASS_HEAD.as_ref().is_some_and(|re| re.is_match(code))
}

/// Every unprocessed entity marker that annotates a class, in line order
///
/// Markers that are followed by something other than a class definition
/// within the lookahead window are ignored.
pub fn detect_entities<S: AsRef<str>>(
    lines: &[S],
    markers: &MarkersConfig,
    scanner: &ScannerConfig,
) -> Vec<EntityDetection> {
    let mut occurrences: Vec<MarkerOccurrence> = markers
        .entity_markers
        .iter()
        .filter_map(|name| MarkerSyntax::block(name).ok())
        .flat_map(|syntax| find_unprocessed_markers(lines, &syntax))
        .collect();
    if occurrences.is_empty() {
        return Vec::new();
    }
    occurrences.sort_by_key(|m| m.line);

    let code = code_lines(lines);
    let spans = find_all_type_spans(lines);
    let lookahead = Lookahead::for_class(scanner.class_lookahead);

    occurrences
        .into_iter()
        .filter_map(|marker| {
            let Some(target) = associate(&code, marker.line, lookahead, is_class_head) else {
                debug!(
                    "@{} at line {} does not precede a class",
                    marker.logical_name, marker.line
                );
                return None;
            };
            let span = spans
                .iter()
                .find(|s| s.start_line == target && s.kind != TypeKind::Enum)?
                .clone();
            Some(EntityDetection { marker, span })
        })
        .collect()
}
