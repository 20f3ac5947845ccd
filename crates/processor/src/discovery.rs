//! Locating headers, dependency libraries and the project root

use headergen_core::config::DiscoveryConfig;
use headergen_core::entities::ValidationMacroTable;
use headergen_core::error::{Error, Result};
use headergen_scanner::parse_validation_macros;
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use walkdir::{DirEntry, WalkDir};

/// Headers under `root` with a configured extension, sorted
///
/// Directories named in `exclude_dirs` are pruned below `root` unless
/// `skip_exclusions` is set. Dependency libraries live under pruned
/// directories such as `build`, so their own headers are collected with
/// `skip_exclusions` on.
pub fn discover_headers(
    root: &Path,
    config: &DiscoveryConfig,
    skip_exclusions: bool,
) -> Result<Vec<PathBuf>> {
    if !root.is_dir() {
        return Err(Error::invalid_input(format!(
            "{} is not a directory",
            root.display()
        )));
    }

    let pruned = |entry: &DirEntry| {
        !skip_exclusions
            && entry.depth() > 0
            && entry.file_type().is_dir()
            && config.is_excluded_dir(&entry.file_name().to_string_lossy())
    };

    let mut headers = BTreeSet::new();
    for entry in WalkDir::new(root).into_iter().filter_entry(|e| !pruned(e)) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                debug!("Skipping unreadable entry under {}: {e}", root.display());
                continue;
            }
        };
        if entry.file_type().is_file() && config.is_header(entry.path()) {
            headers.insert(entry.into_path());
        }
    }

    Ok(headers.into_iter().collect())
}

fn glob_dirs(pattern: &str) -> Vec<PathBuf> {
    match glob::glob(pattern) {
        Ok(paths) => paths.flatten().filter(|p| p.is_dir()).collect(),
        Err(e) => {
            debug!("Invalid glob pattern '{pattern}': {e}");
            Vec::new()
        }
    }
}

fn dir_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Dependency library roots fetched into the project
///
/// CMake FetchContent checkouts under `build/_deps` count when the directory
/// name ends in `-src` or the directory has a `src/` folder. PlatformIO
/// libraries under `.pio/libdeps/<env>/` count when they have `src/`.
pub fn discover_library_dirs(project_dir: &Path, config: &DiscoveryConfig) -> Vec<PathBuf> {
    let base = glob::Pattern::escape(&project_dir.to_string_lossy());

    let cmake = glob_dirs(&format!("{base}/build/_deps/*")).into_iter().filter(|dir| {
        let name = dir_name(dir);
        !name.starts_with('.') && (name.ends_with("-src") || dir.join("src").is_dir())
    });
    let platformio = glob_dirs(&format!("{base}/.pio/libdeps/*/*"))
        .into_iter()
        .filter(|dir| !dir_name(dir).starts_with('.') && dir.join("src").is_dir());

    let mut seen = BTreeSet::new();
    let mut libraries = Vec::new();
    for dir in cmake.chain(platformio) {
        let name = dir_name(&dir);
        if config.is_skipped_library(&name) {
            debug!("Skipping library {name}");
            continue;
        }
        let canonical = fs::canonicalize(&dir).unwrap_or_else(|_| dir.clone());
        if seen.insert(canonical) {
            libraries.push(dir);
        }
    }
    libraries.sort();
    libraries
}

/// Nearest ancestor of `start` (itself included) holding `marker`
pub fn find_project_root(start: &Path, marker: &str) -> Option<PathBuf> {
    start
        .ancestors()
        .find(|dir| dir.join(marker).is_file())
        .map(Path::to_path_buf)
}

/// Validation macros declared across `files`
///
/// The first definition of a macro name wins. Unreadable files are skipped.
pub fn discover_validation_macros<P: AsRef<Path>>(files: &[P]) -> ValidationMacroTable {
    let mut table = ValidationMacroTable::new();
    for path in files {
        let path = path.as_ref();
        match fs::read_to_string(path) {
            Ok(text) => table.extend(parse_validation_macros(&text)),
            Err(e) => debug!("Skipping {} for macro discovery: {e}", path.display()),
        }
    }
    table
}

/// Headers of one dependency library
#[derive(Debug, Clone)]
pub struct LibraryHeaders {
    pub root: PathBuf,
    pub headers: Vec<PathBuf>,
}

/// Every header a project run touches
#[derive(Debug, Clone)]
pub struct ProjectLayout {
    pub project_dir: PathBuf,
    pub project_headers: Vec<PathBuf>,
    pub libraries: Vec<LibraryHeaders>,
}

impl ProjectLayout {
    pub fn discover(project_dir: &Path, config: &DiscoveryConfig) -> Result<Self> {
        let project_headers = discover_headers(project_dir, config, false)?;

        let mut libraries = Vec::new();
        for root in discover_library_dirs(project_dir, config) {
            let headers = discover_headers(&root, config, true)?;
            debug!("Library {} has {} headers", root.display(), headers.len());
            libraries.push(LibraryHeaders { root, headers });
        }

        info!(
            "Found {} project headers and {} libraries",
            project_headers.len(),
            libraries.len()
        );
        Ok(Self {
            project_dir: project_dir.to_path_buf(),
            project_headers,
            libraries,
        })
    }

    /// Project headers followed by library headers, without duplicates
    pub fn all_headers(&self) -> Vec<PathBuf> {
        let mut seen = BTreeSet::new();
        self.project_headers
            .iter()
            .chain(self.libraries.iter().flat_map(|lib| lib.headers.iter()))
            .filter(|p| seen.insert((*p).clone()))
            .cloned()
            .collect()
    }
}
