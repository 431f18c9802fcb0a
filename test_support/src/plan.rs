//! Build plan fixtures.

use anyhow::{Context, Result, anyhow};
use camino::{Utf8Path, Utf8PathBuf};
use ninja_synth::config::GeneratorConfig;
use ninja_synth::ir::BuildFile;
use ninja_synth::platform::Platform;
use std::fs;
use tempfile::TempDir;

/// An empty build file named `build.bfg` targeting `platform`.
#[must_use]
pub fn build_file_for(platform: Platform) -> BuildFile {
    BuildFile::new("build.bfg", GeneratorConfig::for_platform(platform))
}

/// A temporary directory holding a plan file.
#[derive(Debug)]
pub struct PlanWorkspace {
    dir: TempDir,
    root: Utf8PathBuf,
}

impl PlanWorkspace {
    /// Create an empty workspace.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created or its path is
    /// not UTF-8.
    pub fn new() -> Result<Self> {
        let dir = TempDir::new().context("create plan workspace")?;
        let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf())
            .map_err(|path| anyhow!("non UTF-8 workspace {}", path.display()))?;
        Ok(Self { dir, root })
    }

    /// Write `contents` to `name` inside the workspace and return its path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn write(&self, name: &str, contents: &str) -> Result<Utf8PathBuf> {
        let path = self.root.join(name);
        fs::write(&path, contents).with_context(|| format!("write {path}"))?;
        Ok(path)
    }

    /// Workspace directory.
    #[must_use]
    pub fn root(&self) -> &Utf8Path {
        &self.root
    }

    /// Underlying temporary directory.
    #[must_use]
    pub const fn dir(&self) -> &TempDir {
        &self.dir
    }
}
