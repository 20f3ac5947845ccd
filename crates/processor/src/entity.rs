//! Entity processing: member injection, marker flipping and includes

use crate::context::RunContext;
use crate::summary::RunSummary;
use headergen_codegen::{
    ensure_include, inject_members, mark_processed, needs_serializer_helpers, optional_fields,
    InjectOutcome, MarkOutcome, SerializationGenerator, OPTIONAL_HEADER,
};
use headergen_core::error::Result;
use headergen_core::source::SourceBuffer;
use headergen_scanner::markers::MarkerSyntax;
use headergen_scanner::{detect_entities, extract_fields, EntityDetection};
use std::path::Path;
use tracing::{debug, info, warn};

fn detection_at(buffer: &SourceBuffer, ctx: &RunContext, marker_line: usize) -> Option<EntityDetection> {
    let config = &ctx.config;
    detect_entities(&buffer.lines(), &config.markers, &config.scanner)
        .into_iter()
        .find(|d| d.marker.line == marker_line)
}

/// Processes every unprocessed entity in `buffer`
///
/// Classes are handled from the bottom of the file up and each one is
/// re-detected before injection, so earlier insertions never invalidate a
/// span. Includes are added last since they shift every line below them.
pub fn process_entity_buffer(buffer: &mut SourceBuffer, ctx: &RunContext) -> Result<RunSummary> {
    let config = &ctx.config;
    let mut summary = RunSummary::default();

    let mut marker_lines: Vec<usize> =
        detect_entities(&buffer.lines(), &config.markers, &config.scanner)
            .iter()
            .map(|d| d.marker.line)
            .collect();
    marker_lines.sort_unstable_by(|a, b| b.cmp(a));

    let generator = SerializationGenerator::new(&config.codegen, &ctx.validation);
    let mut wants_optional = false;
    let mut wants_serializer = false;

    for marker_line in marker_lines {
        let Some(detection) = detection_at(buffer, ctx, marker_line) else {
            continue;
        };
        let class_name = detection.class_name().to_string();
        let fields = extract_fields(
            &buffer.lines(),
            &detection.span,
            &ctx.validation,
            &config.markers,
            &config.scanner,
        );
        let members = generator.entity_members(&class_name, &fields);
        match inject_members(buffer, &detection.span, &members, &config.codegen.indent) {
            InjectOutcome::Injected { line_count, .. } => {
                debug!("Injected {line_count} lines into {class_name}");
                summary.entities_injected += 1;
            }
            InjectOutcome::AlreadyPresent => {
                summary.entities_skipped += 1;
            }
            InjectOutcome::NotInjectable => {
                warn!(
                    "Cannot inject into {class_name} in {}: class body is on one line",
                    buffer.display_name()
                );
                continue;
            }
        }
        wants_optional |= !optional_fields(&fields).is_empty();
        wants_serializer |= needs_serializer_helpers(&fields);

        let syntax = MarkerSyntax::block(&detection.marker.logical_name)?;
        if let MarkOutcome::NotFound = mark_processed(buffer, &syntax, Some(marker_line)) {
            warn!(
                "@{} marker for {class_name} vanished from line {marker_line}",
                detection.marker.logical_name
            );
        }
    }

    if wants_optional && ensure_include(buffer, OPTIONAL_HEADER).is_added() {
        summary.includes_added += 1;
    }
    if wants_serializer && ensure_include(buffer, &config.codegen.serializer_header).is_added() {
        summary.includes_added += 1;
    }
    Ok(summary)
}

/// Reads, processes and (outside dry runs) rewrites one header
pub fn process_entity_file(path: &Path, ctx: &RunContext) -> Result<RunSummary> {
    let mut buffer = SourceBuffer::read(path)?;
    let mut summary = process_entity_buffer(&mut buffer, ctx)?;
    summary.files_scanned = 1;

    if buffer.is_modified() {
        summary.files_modified = 1;
        if ctx.dry_run {
            info!("Would update {}", path.display());
        } else if buffer.write_if_modified()? {
            info!("Updated {}", path.display());
        }
    }
    Ok(summary)
}
