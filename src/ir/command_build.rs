//! Edges that run an arbitrary command sequence.
//!
//! Targets such as `install` carry their whole command in a per-edge `cmd`
//! override and share one generic rule whose command is just `${cmd}`. Every
//! such edge depends on the phony `PHONY` target, so it reruns on each
//! invocation.

use super::{BuildEdge, BuildFile, IrError, RuleOptions, Value, Variable};
use crate::command::Commands;
use crate::safe_str::{Fragment, Renderable};

/// Rule shared by command edges that run in the console pool.
pub const CONSOLE_COMMAND_RULE: &str = "console_command";
/// Rule shared by command edges without a pool.
pub const COMMAND_RULE: &str = "command";
/// Phony target that is never up to date.
pub const ALWAYS_RERUN: &str = "PHONY";

/// An edge whose command is supplied inline.
///
/// ```
/// use ninja_synth::command::{CommandLine, Commands};
/// use ninja_synth::ir::CommandBuild;
///
/// let build = CommandBuild::new(
///     ["install"],
///     Commands::new(CommandLine::args(["cp", "app", "/usr/bin/app"])),
/// )
/// .with_implicit(["app"]);
/// assert!(build.console);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandBuild {
    /// Outputs of the edge, usually a single phony-like target name.
    pub outputs: Vec<Fragment>,
    /// Explicit inputs.
    pub inputs: Vec<Fragment>,
    /// Implicit inputs. `PHONY` is appended when the edge is declared.
    pub implicit: Vec<Fragment>,
    /// Order-only inputs.
    pub order_only: Vec<Fragment>,
    /// Commands to run.
    pub commands: Commands,
    /// Run with direct terminal access in the console pool.
    pub console: bool,
}

impl CommandBuild {
    /// A console command edge producing `outputs`.
    #[must_use]
    pub fn new<I>(outputs: I, commands: impl Into<Commands>) -> Self
    where
        I: IntoIterator,
        I::Item: Renderable,
    {
        Self {
            outputs: outputs.into_iter().map(|out| out.to_fragment()).collect(),
            inputs: Vec::new(),
            implicit: Vec::new(),
            order_only: Vec::new(),
            commands: commands.into(),
            console: true,
        }
    }

    /// Append explicit inputs.
    #[must_use]
    pub fn with_inputs<I>(mut self, inputs: I) -> Self
    where
        I: IntoIterator,
        I::Item: Renderable,
    {
        self.inputs
            .extend(inputs.into_iter().map(|item| item.to_fragment()));
        self
    }

    /// Append implicit inputs.
    #[must_use]
    pub fn with_implicit<I>(mut self, implicit: I) -> Self
    where
        I: IntoIterator,
        I::Item: Renderable,
    {
        self.implicit
            .extend(implicit.into_iter().map(|item| item.to_fragment()));
        self
    }

    /// Append order-only inputs.
    #[must_use]
    pub fn with_order_only<I>(mut self, order_only: I) -> Self
    where
        I: IntoIterator,
        I::Item: Renderable,
    {
        self.order_only
            .extend(order_only.into_iter().map(|item| item.to_fragment()));
        self
    }

    /// Choose between the console pool and no pool.
    #[must_use]
    pub fn console(self, console: bool) -> Self {
        Self { console, ..self }
    }
}

impl BuildFile {
    /// Declare an edge running `build.commands`.
    ///
    /// The shared rule and the `PHONY` edge are declared on first use.
    ///
    /// # Errors
    ///
    /// Returns the same errors as [`BuildFile::build`].
    pub fn command_build(&mut self, build: CommandBuild) -> Result<(), IrError> {
        let (rule, pool) = if build.console {
            (CONSOLE_COMMAND_RULE, "console")
        } else {
            (COMMAND_RULE, "")
        };
        if !self.has_rule(rule) {
            self.rule(
                rule,
                Commands::from(Variable::new("cmd")),
                RuleOptions::default().pool(pool),
            )?;
        }
        if !self.has_build(ALWAYS_RERUN) {
            self.build(BuildEdge::phony([ALWAYS_RERUN]))?;
        }

        let CommandBuild {
            outputs,
            inputs,
            mut implicit,
            order_only,
            commands,
            ..
        } = build;
        implicit.push(Fragment::plain(ALWAYS_RERUN));
        self.build(BuildEdge {
            outputs,
            rule: rule.to_owned(),
            inputs,
            implicit,
            order_only,
            variables: [(Variable::new("cmd"), Value::Commands(commands))]
                .into_iter()
                .collect(),
        })
    }
}
