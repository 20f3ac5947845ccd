//! Counters reported at the end of a run

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// A header that could not be processed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailedFile {
    pub path: PathBuf,
    pub message: String,
}

/// Totals for one run, or for one file before merging
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    /// Headers read and scanned
    pub files_scanned: usize,
    /// Headers whose text changed (or would change, in a dry run)
    pub files_modified: usize,
    /// Entity classes that received generated members
    pub entities_injected: usize,
    /// Entity classes that already carried the generated members
    pub entities_skipped: usize,
    /// Implementation headers written
    pub repositories_generated: usize,
    /// `#include` lines added to existing headers
    pub includes_added: usize,
    pub failed: Vec<FailedFile>,
}

impl RunSummary {
    /// Merge another summary into this one
    pub fn merge(&mut self, other: RunSummary) {
        self.files_scanned += other.files_scanned;
        self.files_modified += other.files_modified;
        self.entities_injected += other.entities_injected;
        self.entities_skipped += other.entities_skipped;
        self.repositories_generated += other.repositories_generated;
        self.includes_added += other.includes_added;
        self.failed.extend(other.failed);
    }

    pub fn record_failure(&mut self, path: impl Into<PathBuf>, message: impl Into<String>) {
        self.failed.push(FailedFile {
            path: path.into(),
            message: message.into(),
        });
    }

    pub fn has_failures(&self) -> bool {
        !self.failed.is_empty()
    }

    /// Whether the run generated or rewrote anything
    pub fn did_work(&self) -> bool {
        self.entities_injected > 0 || self.repositories_generated > 0 || self.files_modified > 0
    }
}
