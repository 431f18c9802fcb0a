//! Generator configuration.
//!
//! Built once per run and handed to [`crate::ir::BuildFile::new`]; the writer
//! reads it back from the build file, so builder and writer always agree on
//! the platform and path variables.

use crate::path::PathVars;
use crate::platform::Platform;

/// Platform and path-variable settings for one generated file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratorConfig {
    /// Platform the generated commands run on.
    pub platform: Platform,
    /// Variables standing in for symbolic path roots.
    pub path_vars: PathVars,
}

impl GeneratorConfig {
    /// Conventional configuration for `platform`.
    #[must_use]
    pub fn for_platform(platform: Platform) -> Self {
        Self {
            platform,
            path_vars: PathVars::for_platform(platform),
        }
    }

    /// Configuration for the platform this binary runs on.
    #[must_use]
    pub fn host() -> Self {
        Self::for_platform(Platform::host())
    }

    /// Replace the path-variable table.
    #[must_use]
    pub fn with_path_vars(self, path_vars: PathVars) -> Self {
        Self { path_vars, ..self }
    }
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self::host()
    }
}
