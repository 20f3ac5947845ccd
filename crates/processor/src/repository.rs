//! Repository processing: implementation header plus back-include

use crate::context::RunContext;
use crate::summary::RunSummary;
use headergen_codegen::{ensure_back_include, generate_impl_header, mark_processed, MarkOutcome};
use headergen_core::error::{Result, ResultExt};
use headergen_core::source::SourceBuffer;
use headergen_scanner::markers::MarkerSyntax;
use headergen_scanner::{detect_repository, extract_methods, RepositoryDetection};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Absolute form of `path`, falling back to joining it onto the working directory
fn absolute(path: &Path) -> PathBuf {
    fs::canonicalize(path)
        .or_else(|_| std::path::absolute(path))
        .unwrap_or_else(|_| path.to_path_buf())
}

fn write_impl(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .context(format!("Failed to create {}", parent.display()))?;
    }
    fs::write(path, contents).context(format!("Failed to write {}", path.display()))
}

/// Generates the implementation for the repository declared in `buffer`
///
/// An implementation file already on disk is never regenerated or
/// overwritten, but the header is still finished: its marker is flipped and
/// the back-include added when missing. A header left half-done by an
/// interrupted run therefore converges on the next one.
pub fn process_repository_buffer(
    buffer: &mut SourceBuffer,
    ctx: &RunContext,
) -> Result<RunSummary> {
    let config = &ctx.config;
    let mut summary = RunSummary::default();

    let lines = buffer.lines();
    let Some(RepositoryDetection {
        descriptor,
        marker,
        span,
    }) = detect_repository(&lines, &config.markers, &config.scanner, &config.repository)
    else {
        return Ok(summary);
    };

    let impl_path = ctx.impl_path(&descriptor.impl_file_name());
    if impl_path.exists() {
        debug!(
            "{} already exists, not regenerating it for {}",
            impl_path.display(),
            descriptor.class_name
        );
    } else {
        let methods: Vec<_> = extract_methods(&lines, &span)
            .into_iter()
            .map(|m| m.decl)
            .collect();

        let header =
            generate_impl_header(&descriptor, &methods, &config.repository, &config.codegen);
        if ctx.dry_run {
            info!("Would generate {}", impl_path.display());
        } else {
            write_impl(&impl_path, &header)?;
            info!("Generated {}", impl_path.display());
        }
        summary.repositories_generated += 1;
    }

    // The marker sits above the class and the include goes before the
    // trailing #endif, so flipping first keeps the marker line valid
    if !marker.processed {
        let syntax = MarkerSyntax::doc_line(&config.markers.repository_marker)?;
        if let MarkOutcome::NotFound = mark_processed(buffer, &syntax, Some(marker.line)) {
            debug!("No @{} marker left to flip", config.markers.repository_marker);
        }
    }

    let include_path = absolute(&impl_path);
    if ensure_back_include(buffer, &include_path.to_string_lossy()).is_added() {
        summary.includes_added += 1;
    }
    Ok(summary)
}

/// Reads, processes and (outside dry runs) rewrites one repository header
pub fn process_repository_file(path: &Path, ctx: &RunContext) -> Result<RunSummary> {
    let mut buffer = SourceBuffer::read(path)?;
    let mut summary = process_repository_buffer(&mut buffer, ctx)?;
    summary.files_scanned = 1;

    if buffer.is_modified() {
        summary.files_modified = 1;
        if !ctx.dry_run && buffer.write_if_modified()? {
            info!("Updated {}", path.display());
        }
    }
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use headergen_core::config::Config;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    const REPO: &str = "#ifndef USER_REPOSITORY_H
#define USER_REPOSITORY_H

#include \"CpaRepository.h\"

DefineStandardPointers(UserRepository)
/// @Repository
class UserRepository : public CpaRepository<User, int> {
    Public:
        Entity FindByUsername(CStdString& username) = 0;
};

#endif
";

    #[test]
    fn test_generates_impl_and_rewrites_header() {
        let dir = TempDir::new().expect("tempdir");
        let ctx = RunContext::new(Config::default(), dir.path());
        let mut buffer = SourceBuffer::from_text(REPO);

        let summary = process_repository_buffer(&mut buffer, &ctx).expect("process");
        assert_eq!(summary.repositories_generated, 1);
        assert_eq!(summary.includes_added, 1);

        let impl_path = dir.path().join("src/repository/UserRepositoryImpl.h");
        let generated = fs::read_to_string(&impl_path).expect("impl written");
        assert!(generated.starts_with("#ifndef _USERREPOSITORYIMPL_H_\n"));

        assert_eq!(buffer.line(7), Some("/* @Repository */"));
        let include = format!("#include \"{}\"", absolute(&impl_path).display());
        assert_eq!(buffer.line(13), Some(include.as_str()));
        assert_eq!(buffer.line(14), Some("#endif"));
    }

    #[test]
    fn test_existing_impl_still_finishes_header() {
        let dir = TempDir::new().expect("tempdir");
        let ctx = RunContext::new(Config::default(), dir.path());
        let impl_path = ctx.impl_path("UserRepositoryImpl.h");
        write_impl(&impl_path, "// hand written\n").expect("write");

        let mut buffer = SourceBuffer::from_text(REPO);
        let summary = process_repository_buffer(&mut buffer, &ctx).expect("process");
        assert_eq!(summary.repositories_generated, 0);
        assert_eq!(summary.includes_added, 1);
        assert_eq!(buffer.line(7), Some("/* @Repository */"));
        let include = format!("#include \"{}\"", absolute(&impl_path).display());
        assert_eq!(buffer.line(13), Some(include.as_str()));
        assert_eq!(
            fs::read_to_string(&impl_path).expect("read"),
            "// hand written\n"
        );

        let finished = buffer.text();
        let mut again = SourceBuffer::from_text(&finished);
        let summary = process_repository_buffer(&mut again, &ctx).expect("process");
        assert_eq!(summary, RunSummary::default());
        assert!(!again.is_modified());
    }

    #[test]
    fn test_interrupted_run_converges() {
        let dir = TempDir::new().expect("tempdir");
        let ctx = RunContext::new(Config::default(), dir.path());

        // First run writes the impl but its header edits are lost
        let mut lost = SourceBuffer::from_text(REPO);
        process_repository_buffer(&mut lost, &ctx).expect("process");
        let generated = fs::read_to_string(ctx.impl_path("UserRepositoryImpl.h")).expect("impl");

        let mut buffer = SourceBuffer::from_text(REPO);
        let summary = process_repository_buffer(&mut buffer, &ctx).expect("process");
        assert!(buffer.is_modified());
        assert_eq!(summary.includes_added, 1);
        assert_eq!(buffer.text(), lost.text());
        assert_eq!(
            fs::read_to_string(ctx.impl_path("UserRepositoryImpl.h")).expect("impl"),
            generated
        );
    }

    #[test]
    fn test_dry_run_writes_nothing() {
        let dir = TempDir::new().expect("tempdir");
        let ctx = RunContext::new(Config::default(), dir.path()).with_dry_run(true);
        let mut buffer = SourceBuffer::from_text(REPO);

        let summary = process_repository_buffer(&mut buffer, &ctx).expect("process");
        assert_eq!(summary.repositories_generated, 1);
        assert!(!ctx.impl_dir().exists());
    }

    #[test]
    fn test_file_without_marker_is_ignored() {
        let dir = TempDir::new().expect("tempdir");
        let ctx = RunContext::new(Config::default(), dir.path());
        let mut buffer = SourceBuffer::from_text("#pragma once\nclass Plain {};\n");
        let summary = process_repository_buffer(&mut buffer, &ctx).expect("process");
        assert_eq!(summary, RunSummary::default());
    }
}
