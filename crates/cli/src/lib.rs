//! Library interface for the headergen CLI
//!
//! Path resolution and report formatting live here so they can be tested
//! without spawning the binary; `main.rs` only parses arguments and wires
//! these together.

use anyhow::{Context, Result};
use headergen_core::config::{Config, DiscoveryConfig};
use headergen_core::entities::ValidationMacroTable;
use headergen_processor::{find_project_root, RunSummary};
use std::env;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use tracing::debug;

pub use headergen_processor::{discover_validation_macros, process_project, ProjectLayout, Processor};

/// Project directory for a run
///
/// An explicit directory wins. Otherwise the nearest ancestor of `start`
/// holding the project marker is used, falling back to `start` itself.
pub fn resolve_project_dir(explicit: Option<&Path>, start: &Path, marker: &str) -> PathBuf {
    if let Some(dir) = explicit {
        return dir.to_path_buf();
    }
    find_project_root(start, marker).unwrap_or_else(|| {
        debug!(
            "No {marker} above {}, using it as the project directory",
            start.display()
        );
        start.to_path_buf()
    })
}

pub fn current_dir() -> Result<PathBuf> {
    env::current_dir().context("Failed to get current directory")
}

/// Loads configuration with the project's `headergen.toml` taking precedence
/// over the global file
pub fn load_config(config_path: Option<&Path>, project_dir: &Path) -> Result<Config> {
    Config::load_for_project(config_path, project_dir)
        .with_context(|| format!("Failed to load configuration for {}", project_dir.display()))
}

/// Configuration and project directory for a command starting at `start`
///
/// The project marker is itself configurable, so the directory found with
/// the default marker only locates the config file; the final directory is
/// resolved again with the loaded marker.
pub fn resolve_project(
    config_path: Option<&Path>,
    explicit: Option<&Path>,
    start: &Path,
) -> Result<(Config, PathBuf)> {
    let default_marker = DiscoveryConfig::default().project_marker;
    let config = load_config(
        config_path,
        &resolve_project_dir(explicit, start, &default_marker),
    )?;
    let project_dir = resolve_project_dir(explicit, start, &config.discovery.project_marker);
    Ok((config, project_dir))
}

/// Human-readable run report
pub fn format_summary(summary: &RunSummary, dry_run: bool) -> String {
    let mut out = String::new();
    if dry_run {
        out.push_str("Dry run, no files were written\n");
    }
    let _ = writeln!(
        out,
        "Scanned {} files: {} entities injected, {} already processed, {} repositories generated, {} includes added",
        summary.files_scanned,
        summary.entities_injected,
        summary.entities_skipped,
        summary.repositories_generated,
        summary.includes_added
    );
    if summary.files_modified > 0 {
        let verb = if dry_run { "would be updated" } else { "updated" };
        let _ = writeln!(out, "{} files {verb}", summary.files_modified);
    }
    for failure in &summary.failed {
        let _ = writeln!(out, "  failed: {}: {}", failure.path.display(), failure.message);
    }
    out
}

/// One `Name -> Function` line per validation macro
pub fn format_macros(table: &ValidationMacroTable) -> String {
    if table.is_empty() {
        return "No validation macros found\n".to_string();
    }
    table
        .iter()
        .map(|(name, function)| format!("{name} -> {function}\n"))
        .collect()
}

pub fn to_json<T: serde::Serialize>(value: &T) -> Result<String> {
    serde_json::to_string_pretty(value).context("Failed to serialize output")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_resolve_project_dir() {
        let dir = TempDir::new().expect("tempdir");
        let root = dir.path();
        fs::create_dir_all(root.join("src/model")).expect("mkdir");
        fs::write(root.join("platformio.ini"), "").expect("write");

        let nested = root.join("src/model");
        assert_eq!(resolve_project_dir(None, &nested, "platformio.ini"), root);
        assert_eq!(resolve_project_dir(None, &nested, "missing.ini"), nested);
        assert_eq!(
            resolve_project_dir(Some(Path::new("/elsewhere")), &nested, "platformio.ini"),
            PathBuf::from("/elsewhere")
        );
    }

    #[test]
    fn test_format_summary() {
        let mut summary = RunSummary {
            files_scanned: 3,
            files_modified: 2,
            entities_injected: 1,
            repositories_generated: 1,
            includes_added: 2,
            ..Default::default()
        };
        summary.record_failure("src/Broken.h", "stream did not contain valid UTF-8");

        assert_eq!(
            format_summary(&summary, true),
            concat!(
                "Dry run, no files were written\n",
                "Scanned 3 files: 1 entities injected, 0 already processed, 1 repositories generated, 2 includes added\n",
                "2 files would be updated\n",
                "  failed: src/Broken.h: stream did not contain valid UTF-8\n",
            )
        );
    }

    #[test]
    fn test_format_macros() {
        let table: ValidationMacroTable = [
            ("NotBlank".to_string(), "NotBlank".to_string()),
            ("Email".to_string(), "nayan::validation::Email".to_string()),
        ]
        .into_iter()
        .collect();
        assert_eq!(
            format_macros(&table),
            "Email -> nayan::validation::Email\nNotBlank -> NotBlank\n"
        );
        assert_eq!(
            format_macros(&ValidationMacroTable::new()),
            "No validation macros found\n"
        );
    }
}
