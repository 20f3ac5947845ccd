//! Configuration loading from files and environment variables

use crate::error::{Error, Result};
use config::{Config as ConfigLib, ConfigBuilder as LibConfigBuilder, Environment, File};
use std::path::Path;
use tracing::debug;

use super::defaults::*;
use super::{global_config_path, resolve_config_path, Config};

/// Helper to set a config default with consistent error mapping
fn set_config_default<T: Into<config::Value>>(
    builder: LibConfigBuilder<config::builder::DefaultState>,
    key: &str,
    value: T,
) -> Result<LibConfigBuilder<config::builder::DefaultState>> {
    builder
        .set_default(key, value)
        .map_err(|e| Error::config(format!("Failed to set {key} default: {e}")))
}

impl Config {
    /// Loads configuration from a TOML file with environment variable overrides
    ///
    /// Environment variables are prefixed with `HEADERGEN_` and use double underscores
    /// for nested values. For example:
    /// - `HEADERGEN_SCANNER__KEY_LOOKAHEAD=20`
    /// - `HEADERGEN_REPOSITORY__OUTPUT_SUBDIR=include/repository`
    pub fn from_file(path: &Path) -> Result<Self> {
        let builder = ConfigLib::builder();

        // Scalar defaults are set explicitly so env overrides of a single key
        // still deserialize into a complete section
        let builder = set_config_default(
            builder,
            "scanner.class_lookahead",
            default_class_lookahead() as i64,
        )?;
        let builder = set_config_default(
            builder,
            "scanner.validation_lookahead",
            default_validation_lookahead() as i64,
        )?;
        let builder = set_config_default(
            builder,
            "scanner.key_lookahead",
            default_key_lookahead() as i64,
        )?;
        let builder = set_config_default(builder, "markers.key_marker", default_key_marker())?;
        let builder = set_config_default(
            builder,
            "markers.repository_marker",
            default_repository_marker(),
        )?;
        let builder = set_config_default(
            builder,
            "repository.output_subdir",
            default_output_subdir(),
        )?;
        let mut builder = set_config_default(
            builder,
            "discovery.project_marker",
            default_project_marker(),
        )?;

        // Add the config file if it exists
        if path.exists() {
            debug!("Loading configuration from {}", path.display());
            builder = builder.add_source(File::from(path));
        } else {
            debug!(
                "No configuration file at {}, using defaults",
                path.display()
            );
        }

        // Add environment variables with HEADERGEN_ prefix
        builder = builder.add_source(
            Environment::with_prefix("HEADERGEN")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder
            .build()
            .map_err(|e| Error::config(format!("Failed to build config: {e}")))?;

        let config: Self = config
            .try_deserialize()
            .map_err(|e| Error::config(format!("Failed to deserialize config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Creates a config from a TOML string (useful for testing)
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::config(format!("Failed to parse TOML: {e}")))
    }

    /// Load configuration from a single file
    ///
    /// Precedence (lowest to highest):
    /// 1. Hardcoded defaults
    /// 2. Config file (~/.headergen/config.toml or custom --config path)
    /// 3. Environment variables (HEADERGEN_*)
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        let path = match config_path {
            Some(p) => p.to_path_buf(),
            None => global_config_path()?,
        };
        Self::from_file(&path)
    }

    /// Load configuration for a project, preferring its `headergen.toml`
    pub fn load_for_project(config_path: Option<&Path>, project_dir: &Path) -> Result<Self> {
        let path = resolve_config_path(config_path, Some(project_dir))?;
        Self::from_file(&path)
    }
}
