//! Rewrites markers into their processed form
//!
//! Processing a file flips its marker, e.g. `/* @Entity */` to
//! `/*--@Entity--*/` or `/// @Repository` to `/* @Repository */`, which is
//! what makes a second run find nothing to do.

use headergen_core::source::SourceBuffer;
use headergen_scanner::markers::{MarkerStyle, MarkerSyntax};
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkOutcome {
    /// Rewritten on the given 1-indexed line
    Marked(usize),
    AlreadyProcessed,
    NotFound,
}

/// Replacement text for one line, or `None` when it holds no unprocessed marker
fn rewrite(line: &str, syntax: &MarkerSyntax) -> Option<String> {
    let range = syntax.find_unprocessed(line)?;
    let processed = syntax.processed_text()?;
    let rest = match syntax.style() {
        // Anything after a line comment marker was comment text
        MarkerStyle::DocLine => "",
        _ => &line[range.end..],
    };
    Some(format!("{}{processed}{rest}", &line[..range.start]))
}

/// Flips the marker on `line`, or on the first line holding it when `None`
///
/// At most one occurrence changes per call. Leading whitespace and any code
/// sharing the line with a block marker are kept.
pub fn mark_processed(
    buffer: &mut SourceBuffer,
    syntax: &MarkerSyntax,
    line: Option<usize>,
) -> MarkOutcome {
    let candidates: Vec<usize> = match line {
        Some(n) => vec![n],
        None => (1..=buffer.len()).collect(),
    };

    let mut saw_processed = false;
    for n in candidates {
        let Some(text) = buffer.line(n) else {
            continue;
        };
        if syntax.is_processed(text) {
            saw_processed = true;
            continue;
        }
        if let Some(new_text) = rewrite(text, syntax) {
            buffer.replace_line(n, new_text);
            debug!("Marked @{} processed at line {n}", syntax.name());
            return MarkOutcome::Marked(n);
        }
    }

    if saw_processed {
        MarkOutcome::AlreadyProcessed
    } else {
        MarkOutcome::NotFound
    }
}
