//! Errors raised while building the IR.

use crate::safe_str::FormatError;
use miette::Diagnostic;
use std::fmt;
use thiserror::Error;

/// Kind of named entry that can collide.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    /// A variable assignment.
    Variable,
    /// A rule declaration.
    Rule,
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Variable => "variable",
            Self::Rule => "rule",
        })
    }
}

/// Errors raised by [`crate::ir::BuildFile`] mutations.
///
/// Every variant reports a mistake in the calls made by the front-end. A
/// build file that returned one of these should be discarded.
#[derive(Debug, Error, Diagnostic)]
pub enum IrError {
    /// A rule name contains characters outside `[A-Za-z0-9_]`.
    #[error("rule name {name:?} contains invalid characters")]
    #[diagnostic(
        code(ninja_synth::ir::invalid_name),
        help("rule names may only use ASCII letters, digits and underscores")
    )]
    InvalidName {
        /// The rejected name.
        name: String,
    },

    /// A variable or rule was declared twice.
    #[error("{kind} {name:?} already exists")]
    #[diagnostic(code(ninja_synth::ir::already_exists))]
    AlreadyExists {
        /// What was redeclared.
        kind: EntryKind,
        /// Name of the existing entry.
        name: String,
    },

    /// An edge declares outputs already produced by another edge.
    #[error("build for {} already exists", .outputs.join(", "))]
    #[diagnostic(code(ninja_synth::ir::duplicate_output))]
    DuplicateOutput {
        /// The colliding outputs.
        outputs: Vec<String>,
    },

    /// An edge references a rule that was never declared.
    #[error("unknown rule {rule:?}")]
    #[diagnostic(code(ninja_synth::ir::unknown_rule))]
    UnknownRule {
        /// The missing rule name.
        rule: String,
    },

    /// A rule names a pool other than `console`.
    #[error("unknown pool {pool:?}")]
    #[diagnostic(
        code(ninja_synth::ir::invalid_pool),
        help("only the built-in \"console\" pool is supported")
    )]
    InvalidPool {
        /// The rejected pool.
        pool: String,
    },

    /// An edge declares no outputs.
    #[error("build edge for rule {rule:?} has no outputs")]
    #[diagnostic(code(ninja_synth::ir::missing_outputs))]
    MissingOutputs {
        /// Rule of the rejected edge.
        rule: String,
    },

    /// A command sequence has no lines.
    #[error("expected at least one command")]
    #[diagnostic(code(ninja_synth::ir::empty_command))]
    EmptyCommand,

    /// A value cannot be represented in the output syntax.
    #[error(transparent)]
    #[diagnostic(transparent)]
    Format(#[from] FormatError),
}
