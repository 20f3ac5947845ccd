//! Per-run state threaded through every processing step

use headergen_core::config::Config;
use headergen_core::entities::ValidationMacroTable;
use std::path::{Path, PathBuf};

/// Everything a run needs besides the files themselves
///
/// Built once per invocation and passed by reference; nothing in the
/// pipeline reads configuration from anywhere else.
#[derive(Debug, Clone)]
pub struct RunContext {
    pub config: Config,
    /// Library root that receives generated repository implementations
    pub library_dir: PathBuf,
    pub validation: ValidationMacroTable,
    /// Compute every edit but write nothing
    pub dry_run: bool,
}

impl RunContext {
    pub fn new(config: Config, library_dir: impl Into<PathBuf>) -> Self {
        Self {
            config,
            library_dir: library_dir.into(),
            validation: ValidationMacroTable::new(),
            dry_run: false,
        }
    }

    pub fn with_validation(mut self, validation: ValidationMacroTable) -> Self {
        self.validation = validation;
        self
    }

    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Directory generated `*Impl.h` files are written to
    pub fn impl_dir(&self) -> PathBuf {
        self.library_dir.join(&self.config.repository.output_subdir)
    }

    /// Location of the implementation header for `file_name`
    pub fn impl_path(&self, file_name: &str) -> PathBuf {
        self.impl_dir().join(file_name)
    }

    pub fn library_dir(&self) -> &Path {
        &self.library_dir
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_impl_path_uses_output_subdir() {
        let mut config = Config::default();
        config.repository.output_subdir = "include/generated".to_string();
        let ctx = RunContext::new(config, "/lib");
        assert_eq!(
            ctx.impl_path("UserRepositoryImpl.h"),
            PathBuf::from("/lib/include/generated/UserRepositoryImpl.h")
        );
        assert!(!ctx.dry_run);
        assert!(ctx.validation.is_empty());
    }
}
