//! Batch processing of annotated headers
//!
//! The processor resolves which files a run touches, discovers the
//! validation macro table once, and then drives the scanner and generators
//! over every header: repositories first, then entities. A header that fails
//! is logged and recorded in the [`RunSummary`]; the rest of the batch still
//! runs.

#![deny(warnings)]
#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]

pub mod context;
pub mod discovery;
pub mod entity;
pub mod repository;
pub mod summary;

pub use context::RunContext;
pub use discovery::{
    discover_headers, discover_library_dirs, discover_validation_macros, find_project_root,
    LibraryHeaders, ProjectLayout,
};
pub use entity::{process_entity_buffer, process_entity_file};
pub use repository::{process_repository_buffer, process_repository_file};
pub use summary::{FailedFile, RunSummary};

use headergen_core::config::Config;
use headergen_core::error::Result;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Runs the full pipeline over a set of headers
pub struct Processor {
    ctx: RunContext,
}

impl Processor {
    pub fn new(ctx: RunContext) -> Self {
        Self { ctx }
    }

    /// Builds a processor for a project directory
    ///
    /// The validation table is gathered from the project and library headers
    /// before anything is edited.
    pub fn for_project(
        config: Config,
        layout: &ProjectLayout,
        library_dir: impl Into<PathBuf>,
    ) -> Self {
        let validation = discover_validation_macros(&layout.all_headers());
        info!("Discovered {} validation macros", validation.len());
        Self::new(RunContext::new(config, library_dir).with_validation(validation))
    }

    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.ctx.dry_run = dry_run;
        self
    }

    pub fn context(&self) -> &RunContext {
        &self.ctx
    }

    /// Runs one pass over `path`, merging its counters
    ///
    /// Returns whether the pass changed the file, or `None` when it failed.
    fn attempt(
        &self,
        path: &Path,
        summary: &mut RunSummary,
        pass: fn(&Path, &RunContext) -> Result<RunSummary>,
    ) -> Option<bool> {
        match pass(path, &self.ctx) {
            Ok(result) => {
                let modified = result.files_modified > 0;
                summary.merge(result);
                Some(modified)
            }
            Err(e) => {
                warn!("Failed to process {}: {e}", path.display());
                summary.record_failure(path, e.to_string());
                None
            }
        }
    }

    /// Processes one header: its repository, then its entities
    pub fn process_file(&self, path: &Path) -> RunSummary {
        self.run(&[path.to_path_buf()])
    }

    /// Processes every header, all repositories before any entity
    pub fn run(&self, files: &[PathBuf]) -> RunSummary {
        info!("Found {} files to process", files.len());
        let mut summary = RunSummary::default();
        let mut modified = BTreeSet::new();
        let mut failed = BTreeSet::new();

        for path in files {
            match self.attempt(path, &mut summary, process_repository_file) {
                Some(true) => {
                    modified.insert(path);
                }
                Some(false) => {}
                None => {
                    failed.insert(path);
                }
            }
        }
        for path in files.iter().filter(|p| !failed.contains(p)) {
            if let Some(true) = self.attempt(path, &mut summary, process_entity_file) {
                modified.insert(path);
            }
        }

        // Both passes read every file; count each once
        summary.files_scanned = files.len();
        summary.files_modified = modified.len();
        info!(
            "Processed {} files: {} entities injected, {} repositories generated, {} failed",
            summary.files_scanned,
            summary.entities_injected,
            summary.repositories_generated,
            summary.failed.len()
        );
        summary
    }

    /// Discovers and processes a whole project
    pub fn run_project(&self, layout: &ProjectLayout) -> RunSummary {
        self.run(&layout.all_headers())
    }
}

/// Discovers `project_dir` and processes it with generated files under `library_dir`
pub fn process_project(
    config: Config,
    project_dir: &Path,
    library_dir: &Path,
    dry_run: bool,
) -> Result<RunSummary> {
    let layout = ProjectLayout::discover(project_dir, &config.discovery)?;
    let processor = Processor::for_project(config, &layout, library_dir).with_dry_run(dry_run);
    Ok(processor.run_project(&layout))
}
