//! Rule declarations.

use super::{IrError, Value};
use crate::safe_str::Fragment;
use semver::Version;
use std::fmt;

/// Name of the backend's built-in phony rule.
pub const PHONY: &str = "phony";

/// Built-in job pools a rule may run in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Pool {
    /// Serialised pool with direct access to the terminal.
    Console,
}

impl Pool {
    /// Parse a pool token. An empty token means no pool.
    ///
    /// # Errors
    ///
    /// Returns [`IrError::InvalidPool`] for anything but `console`.
    pub fn parse(token: &str) -> Result<Option<Self>, IrError> {
        match token {
            "" => Ok(None),
            "console" => Ok(Some(Self::Console)),
            other => Err(IrError::InvalidPool {
                pool: other.to_owned(),
            }),
        }
    }

    /// Token written to the build file.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Console => "console",
        }
    }

    /// First backend version that provides this pool.
    #[must_use]
    pub const fn min_version(self) -> Version {
        match self {
            Self::Console => Version::new(1, 5, 0),
        }
    }
}

impl fmt::Display for Pool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A declared rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rule {
    /// Command template; a bare argument vector when no shell is needed.
    pub command: Value,
    /// Dependency file written by the command.
    pub depfile: Option<Fragment>,
    /// Dependency file format, e.g. `gcc` or `msvc`.
    pub deps: Option<String>,
    /// Whether the rule regenerates the build file itself.
    pub generator: bool,
    /// Pool the rule runs in.
    pub pool: Option<Pool>,
    /// Whether outputs are re-stat'ed after the command runs.
    pub restat: bool,
}

/// Optional settings for [`crate::ir::BuildFile::rule`].
///
/// ```
/// use ninja_synth::ir::RuleOptions;
/// use ninja_synth::safe_str::Fragment;
///
/// let options = RuleOptions::default()
///     .depfile(Fragment::literal("${out}.d"))
///     .deps("gcc");
/// assert_eq!(options.deps.as_deref(), Some("gcc"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuleOptions {
    /// Dependency file written by the command.
    pub depfile: Option<Fragment>,
    /// Dependency file format.
    pub deps: Option<String>,
    /// Mark the rule as a generator.
    pub generator: bool,
    /// Pool token; empty or `console`.
    pub pool: Option<String>,
    /// Re-stat outputs after the command runs.
    pub restat: bool,
}

impl RuleOptions {
    /// Set the dependency file.
    #[must_use]
    pub fn depfile(self, depfile: impl Into<Fragment>) -> Self {
        Self {
            depfile: Some(depfile.into()),
            ..self
        }
    }

    /// Set the dependency file format.
    #[must_use]
    pub fn deps(self, deps: impl Into<String>) -> Self {
        Self {
            deps: Some(deps.into()),
            ..self
        }
    }

    /// Mark the rule as a generator.
    #[must_use]
    pub fn generator(self, generator: bool) -> Self {
        Self { generator, ..self }
    }

    /// Set the pool token.
    #[must_use]
    pub fn pool(self, pool: impl Into<String>) -> Self {
        Self {
            pool: Some(pool.into()),
            ..self
        }
    }

    /// Re-stat outputs after the command runs.
    #[must_use]
    pub fn restat(self, restat: bool) -> Self {
        Self { restat, ..self }
    }
}
