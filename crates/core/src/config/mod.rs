//! Configuration module for headergen
//!
//! This module provides configuration structures and loading mechanisms for the
//! annotation processor. Configuration can be loaded from TOML files and/or
//! environment variables, and is passed explicitly to every scanning and
//! generation step.

mod defaults;
mod loading;

#[cfg(test)]
mod tests;

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use defaults::*;

/// Name of the per-project configuration file
pub const PROJECT_CONFIG_FILE: &str = "headergen.toml";

/// Returns the path to the global configuration file
///
/// The global config is stored at `~/.headergen/config.toml` and contains
/// user preferences that apply across all projects.
pub fn global_config_path() -> Result<PathBuf> {
    let home_dir = dirs::home_dir()
        .ok_or_else(|| Error::config("Unable to determine home directory".to_string()))?;
    Ok(home_dir.join(".headergen").join("config.toml"))
}

/// Picks the configuration file to load
///
/// An explicit path always wins. Otherwise `headergen.toml` in the project
/// directory is used when present, falling back to the global config path.
pub fn resolve_config_path(explicit: Option<&Path>, project_dir: Option<&Path>) -> Result<PathBuf> {
    if let Some(path) = explicit {
        return Ok(path.to_path_buf());
    }
    if let Some(dir) = project_dir {
        let candidate = dir.join(PROJECT_CONFIG_FILE);
        if candidate.is_file() {
            return Ok(candidate);
        }
    }
    global_config_path()
}

/// Names of the marker comments the scanner looks for
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarkersConfig {
    /// Class-level markers that request serialization code, e.g. `/* @Entity */`
    #[serde(default = "default_entity_markers")]
    pub entity_markers: Vec<String>,

    /// Field-level marker naming the primary key, e.g. `/* @Id */`
    #[serde(default = "default_key_marker")]
    pub key_marker: String,

    /// Marker requesting a repository implementation, e.g. `/// @Repository`
    #[serde(default = "default_repository_marker")]
    pub repository_marker: String,
}

/// Lookahead windows used when associating markers with declarations
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScannerConfig {
    /// Lines scanned after a class marker for the class declaration
    #[serde(default = "default_class_lookahead")]
    pub class_lookahead: usize,

    /// Lines scanned after a validation marker for the field it applies to
    #[serde(default = "default_validation_lookahead")]
    pub validation_lookahead: usize,

    /// Lines scanned after a key marker for the field it applies to
    #[serde(default = "default_key_lookahead")]
    pub key_lookahead: usize,
}

/// Settings that shape generated C++ text
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CodegenConfig {
    /// Indentation unit for generated member bodies
    #[serde(default = "default_indent")]
    pub indent: String,

    /// Namespace that validation functions are called through
    #[serde(default = "default_validation_namespace")]
    pub validation_namespace: String,

    /// Namespace providing `SerializeValue`/`DeserializeValue`
    #[serde(default = "default_serializer_namespace")]
    pub serializer_namespace: String,

    /// Function names starting with this prefix are already qualified
    #[serde(default = "default_root_namespace")]
    pub root_namespace: String,

    /// Header pulled in when nested values need the serializer helpers
    #[serde(default = "default_serializer_header")]
    pub serializer_header: String,
}

/// Repository interface and implementation conventions
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepositoryConfig {
    /// Abstract repository template every annotated repository derives from
    #[serde(default = "default_base_interface")]
    pub base_interface: String,

    /// Storage-backed implementation the generated class delegates to
    #[serde(default = "default_base_impl")]
    pub base_impl: String,

    /// Macro declaring the smart-pointer aliases, e.g. `DefineStandardPointers(UserRepository)`
    #[serde(default = "default_pointer_macro")]
    pub pointer_macro: String,

    /// Directory under the library root that receives generated `*Impl.h` files
    #[serde(default = "default_output_subdir")]
    pub output_subdir: String,
}

/// File and library discovery settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscoveryConfig {
    /// Header extensions to scan, including the leading dot
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,

    /// Directory names pruned while walking the project
    #[serde(default = "default_exclude_dirs")]
    pub exclude_dirs: Vec<String>,

    /// Dependency libraries that are never scanned
    #[serde(default = "default_skip_libraries")]
    pub skip_libraries: Vec<String>,

    /// File whose presence marks the project root
    #[serde(default = "default_project_marker")]
    pub project_marker: String,
}

/// Main configuration structure for headergen
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Marker names
    #[serde(default)]
    pub markers: MarkersConfig,

    /// Scanner lookahead windows
    #[serde(default)]
    pub scanner: ScannerConfig,

    /// Generated code settings
    #[serde(default)]
    pub codegen: CodegenConfig,

    /// Repository conventions
    #[serde(default)]
    pub repository: RepositoryConfig,

    /// Discovery settings
    #[serde(default)]
    pub discovery: DiscoveryConfig,
}

impl Default for MarkersConfig {
    fn default() -> Self {
        Self {
            entity_markers: default_entity_markers(),
            key_marker: default_key_marker(),
            repository_marker: default_repository_marker(),
        }
    }
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            class_lookahead: default_class_lookahead(),
            validation_lookahead: default_validation_lookahead(),
            key_lookahead: default_key_lookahead(),
        }
    }
}

impl Default for CodegenConfig {
    fn default() -> Self {
        Self {
            indent: default_indent(),
            validation_namespace: default_validation_namespace(),
            serializer_namespace: default_serializer_namespace(),
            root_namespace: default_root_namespace(),
            serializer_header: default_serializer_header(),
        }
    }
}

impl Default for RepositoryConfig {
    fn default() -> Self {
        Self {
            base_interface: default_base_interface(),
            base_impl: default_base_impl(),
            pointer_macro: default_pointer_macro(),
            output_subdir: default_output_subdir(),
        }
    }
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            extensions: default_extensions(),
            exclude_dirs: default_exclude_dirs(),
            skip_libraries: default_skip_libraries(),
            project_marker: default_project_marker(),
        }
    }
}

impl DiscoveryConfig {
    /// Whether `path` has one of the configured header extensions
    pub fn is_header(&self, path: &Path) -> bool {
        let Some(ext) = path.extension() else {
            return false;
        };
        let ext = format!(".{}", ext.to_string_lossy().to_ascii_lowercase());
        self.extensions
            .iter()
            .any(|e| e.to_ascii_lowercase() == ext)
    }

    /// Whether a directory name is pruned during discovery
    pub fn is_excluded_dir(&self, name: &str) -> bool {
        self.exclude_dirs.iter().any(|d| d == name)
    }

    /// Whether a dependency library should be skipped
    pub fn is_skipped_library(&self, name: &str) -> bool {
        let name = name.to_ascii_lowercase();
        self.skip_libraries
            .iter()
            .any(|lib| name.contains(&lib.to_ascii_lowercase()))
    }
}

impl Config {
    /// Validates the configuration
    pub fn validate(&self) -> Result<()> {
        if self.markers.entity_markers.is_empty() {
            return Err(Error::config(
                "markers.entity_markers must name at least one marker",
            ));
        }
        if let Some(bad) = self
            .markers
            .entity_markers
            .iter()
            .chain([&self.markers.key_marker, &self.markers.repository_marker])
            .find(|m| !is_marker_name(m))
        {
            return Err(Error::config(format!(
                "Invalid marker name '{bad}'. Marker names are identifiers without the leading '@'"
            )));
        }

        let windows = [
            ("scanner.class_lookahead", self.scanner.class_lookahead),
            ("scanner.validation_lookahead", self.scanner.validation_lookahead),
            ("scanner.key_lookahead", self.scanner.key_lookahead),
        ];
        for (key, value) in windows {
            if value == 0 {
                return Err(Error::config(format!("{key} must be greater than zero")));
            }
        }

        if self.codegen.validation_namespace.trim().is_empty()
            || self.codegen.serializer_namespace.trim().is_empty()
        {
            return Err(Error::config("codegen namespaces must not be empty"));
        }

        if self.repository.base_interface.trim().is_empty()
            || self.repository.base_impl.trim().is_empty()
        {
            return Err(Error::config(
                "repository.base_interface and repository.base_impl must not be empty",
            ));
        }

        if self.discovery.extensions.is_empty() {
            return Err(Error::config(
                "discovery.extensions must list at least one extension",
            ));
        }
        if let Some(ext) = self
            .discovery
            .extensions
            .iter()
            .find(|e| !e.starts_with('.'))
        {
            return Err(Error::config(format!(
                "Invalid extension '{ext}'. Extensions must start with '.'"
            )));
        }

        Ok(())
    }
}

fn is_marker_name(name: &str) -> bool {
    let mut chars = name.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}
