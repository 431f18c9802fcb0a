//! Build graph intermediate representation.
//!
//! A [`BuildFile`] owns the variables, rules, edges and default targets of
//! one generated file. Mutations validate their arguments immediately and
//! enforce the graph's uniqueness rules: variable and rule names are unique,
//! every output is produced by at most one edge, and edges only reference
//! declared rules or the built-in `phony`.
//!
//! # Examples
//!
//! ```
//! use ninja_synth::config::GeneratorConfig;
//! use ninja_synth::ir::{BuildEdge, BuildFile, IrError, Section};
//! use ninja_synth::platform::Platform;
//!
//! let mut file = BuildFile::new("build.bfg", GeneratorConfig::for_platform(Platform::Linux));
//! file.variable("cflags", "-O2", Section::Flags, false)?;
//! file.build(BuildEdge::phony(["all"]))?;
//! let err = file.build(BuildEdge::phony(["all"])).unwrap_err();
//! assert!(matches!(err, IrError::DuplicateOutput { .. }));
//! # Ok::<(), IrError>(())
//! ```

mod build_file;
mod command_build;
mod edge;
mod error;
mod rule;
mod value;
mod variable;

pub use build_file::BuildFile;
pub use command_build::{ALWAYS_RERUN, COMMAND_RULE, CONSOLE_COMMAND_RULE, CommandBuild};
pub use edge::BuildEdge;
pub use error::{EntryKind, IrError};
pub use rule::{PHONY, Pool, Rule, RuleOptions};
pub use value::Value;
pub use variable::{Section, Variable};
