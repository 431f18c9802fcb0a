//! Command model.
//!
//! [`Commands`] holds one or more command lines plus environment bindings.
//! A lone argument vector with no environment runs directly; anything else
//! (several lines, environment bindings, shell operators, a raw script) needs
//! a shell, which on Windows means wrapping the whole sequence in
//! `cmd /s /c "..."`.

use crate::ir::{IrError, Value, Variable};
use crate::ninja_gen::{Quoting, Syntax, WriteError, Writer};
use crate::path::BuildPath;
use crate::platform::PlatformFamily;
use crate::safe_str::{Fragment, FormatError, Renderable, check_newline};
use indexmap::IndexMap;
use std::fmt;

/// An external tool referenced from a command line.
///
/// Rules replace tool references with a `${command_var}` reference and
/// declare `command_var = command` in the command section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tool {
    command_var: String,
    command: Value,
}

impl Tool {
    /// A tool invoked as `command` and stored in the variable `command_var`.
    #[must_use]
    pub fn new(command_var: impl Into<String>, command: impl Into<Value>) -> Self {
        Self {
            command_var: command_var.into(),
            command: command.into(),
        }
    }

    /// Name of the variable holding the invocation.
    #[must_use]
    pub fn command_var(&self) -> &str {
        &self.command_var
    }

    /// The invocation itself.
    #[must_use]
    pub const fn command(&self) -> &Value {
        &self.command
    }
}

/// One argument of a command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Arg {
    /// Text rendered in shell position.
    Text(Fragment),
    /// A tool reference awaiting conversion to a variable.
    Tool(Tool),
}

impl Arg {
    pub(crate) fn validate(&self) -> Result<(), FormatError> {
        match self {
            Self::Text(fragment) => fragment.validate(),
            Self::Tool(tool) => {
                check_newline(&tool.command_var)?;
                tool.command.validate()
            }
        }
    }
}

impl From<Fragment> for Arg {
    fn from(fragment: Fragment) -> Self {
        Self::Text(fragment)
    }
}

impl From<&str> for Arg {
    fn from(text: &str) -> Self {
        Self::Text(Fragment::plain(text))
    }
}

impl From<String> for Arg {
    fn from(text: String) -> Self {
        Self::Text(Fragment::Plain(text))
    }
}

impl From<Variable> for Arg {
    fn from(var: Variable) -> Self {
        Self::Text(var.use_var())
    }
}

impl From<&Variable> for Arg {
    fn from(var: &Variable) -> Self {
        Self::Text(var.use_var())
    }
}

impl From<BuildPath> for Arg {
    fn from(path: BuildPath) -> Self {
        Self::Text(Fragment::Path(path))
    }
}

impl From<Tool> for Arg {
    fn from(tool: Tool) -> Self {
        Self::Tool(tool)
    }
}

/// Replace each tool reference in `args` with a reference to the variable
/// `conv` interns for it.
pub(crate) fn convert_tools<F>(args: &mut [Arg], conv: &mut F) -> Result<(), IrError>
where
    F: FnMut(&Tool) -> Result<Variable, IrError>,
{
    for arg in args.iter_mut() {
        if let Arg::Tool(tool) = arg {
            *arg = Arg::Text(conv(tool)?.use_var());
        }
    }
    Ok(())
}

/// A single command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandLine {
    /// A plain argument vector.
    Args(Vec<Arg>),
    /// An argument vector containing shell operators; always needs a shell.
    ShellList(Vec<Arg>),
    /// A raw script emitted without shell quoting.
    Script(Fragment),
    /// Another command sequence, rendered in place.
    Nested(Box<Commands>),
}

impl CommandLine {
    /// A plain argument vector.
    #[must_use]
    pub fn args<I>(args: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Arg>,
    {
        Self::Args(args.into_iter().map(Into::into).collect())
    }

    /// An argument vector with shell operators such as `>` or `|`.
    ///
    /// Operators should be [`Fragment::ShellLiteral`] so they stay unquoted.
    #[must_use]
    pub fn shell_list<I>(args: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Arg>,
    {
        Self::ShellList(args.into_iter().map(Into::into).collect())
    }

    /// A raw script.
    #[must_use]
    pub fn script(script: impl Renderable) -> Self {
        Self::Script(script.to_fragment())
    }

    fn convert_args<F>(&mut self, conv: &mut F) -> Result<(), IrError>
    where
        F: FnMut(&Tool) -> Result<Variable, IrError>,
    {
        match self {
            Self::Args(args) | Self::ShellList(args) => convert_tools(args, conv),
            Self::Script(_) => Ok(()),
            Self::Nested(commands) => commands.convert_args(conv),
        }
    }

    fn validate(&self) -> Result<(), FormatError> {
        match self {
            Self::Args(args) | Self::ShellList(args) => args.iter().try_for_each(Arg::validate),
            Self::Script(fragment) => fragment.validate(),
            Self::Nested(commands) => commands.validate(),
        }
    }

    fn render<W: fmt::Write>(&self, out: &mut Writer<'_, W>) -> Result<(), WriteError> {
        match self {
            Self::Args(args) | Self::ShellList(args) => out.write_args(args, Syntax::Shell, None),
            Self::Script(fragment) => out
                .write(fragment, Syntax::Shell, Quoting::Never)
                .map(drop),
            Self::Nested(commands) => commands.render(out),
        }
    }
}

impl From<Vec<Arg>> for CommandLine {
    fn from(args: Vec<Arg>) -> Self {
        Self::Args(args)
    }
}

impl From<Commands> for CommandLine {
    fn from(commands: Commands) -> Self {
        Self::Nested(Box::new(commands))
    }
}

/// One or more command lines with environment bindings.
///
/// ```
/// use ninja_synth::command::{CommandLine, Commands};
///
/// let single = Commands::new(CommandLine::args(["cc", "-c", "main.c"]));
/// assert!(!single.needs_shell());
///
/// let chained = single.clone().then(CommandLine::args(["touch", "stamp"]));
/// assert!(chained.needs_shell());
/// assert!(single.env("CCACHE_DIR", "/tmp/cc").needs_shell());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Commands {
    lines: Vec<CommandLine>,
    environ: IndexMap<String, Fragment>,
}

impl Commands {
    /// A sequence starting with `first`.
    #[must_use]
    pub fn new(first: impl Into<CommandLine>) -> Self {
        Self {
            lines: vec![first.into()],
            environ: IndexMap::new(),
        }
    }

    /// A sequence from `lines`.
    ///
    /// # Errors
    ///
    /// Returns [`IrError::EmptyCommand`] if `lines` is empty.
    pub fn from_lines<I>(lines: I) -> Result<Self, IrError>
    where
        I: IntoIterator,
        I::Item: Into<CommandLine>,
    {
        let lines: Vec<CommandLine> = lines.into_iter().map(Into::into).collect();
        if lines.is_empty() {
            return Err(IrError::EmptyCommand);
        }
        Ok(Self {
            lines,
            environ: IndexMap::new(),
        })
    }

    /// Append a line, run after the previous ones succeed.
    #[must_use]
    pub fn then(mut self, line: impl Into<CommandLine>) -> Self {
        self.lines.push(line.into());
        self
    }

    /// Bind an environment variable for the whole sequence.
    #[must_use]
    pub fn env(mut self, name: impl Into<String>, value: impl Renderable) -> Self {
        self.environ.insert(name.into(), value.to_fragment());
        self
    }

    /// Command lines, in execution order.
    #[must_use]
    pub fn lines(&self) -> &[CommandLine] {
        &self.lines
    }

    /// Environment bindings, in insertion order.
    #[must_use]
    pub const fn environ(&self) -> &IndexMap<String, Fragment> {
        &self.environ
    }

    /// Whether the sequence must run through a shell.
    #[must_use]
    pub fn needs_shell(&self) -> bool {
        !self.environ.is_empty()
            || self.lines.len() > 1
            || !matches!(self.lines.first(), Some(CommandLine::Args(_)))
    }

    /// Replace every tool reference with the variable `conv` returns for it.
    ///
    /// Argument vectors and nested sequences are converted; raw scripts are
    /// left untouched.
    ///
    /// # Errors
    ///
    /// Propagates the first error returned by `conv`.
    pub fn convert_args<F>(&mut self, conv: &mut F) -> Result<(), IrError>
    where
        F: FnMut(&Tool) -> Result<Variable, IrError>,
    {
        self.lines
            .iter_mut()
            .try_for_each(|line| line.convert_args(conv))
    }

    /// Reject sequences the backend cannot represent.
    ///
    /// # Errors
    ///
    /// Returns [`FormatError`] if any name, value or line contains a newline.
    pub fn validate(&self) -> Result<(), FormatError> {
        for (name, value) in &self.environ {
            check_newline(name)?;
            value.validate()?;
        }
        self.lines.iter().try_for_each(CommandLine::validate)
    }

    /// Collapse to the bare argument vector when no shell is needed.
    #[must_use]
    pub fn into_value(self) -> Value {
        if self.needs_shell() {
            return Value::Commands(self);
        }
        let Self { mut lines, environ } = self;
        match (lines.pop(), lines.is_empty()) {
            (Some(CommandLine::Args(args)), true) => Value::Words(args),
            (popped, _) => {
                lines.extend(popped);
                Value::Commands(Self { lines, environ })
            }
        }
    }

    /// Write the sequence in shell position.
    ///
    /// Environment bindings become `export NAME=VALUE` lines, and all lines
    /// are joined with `&&`. On Windows a sequence that needs a shell is
    /// wrapped in `cmd /s /c "..."`.
    ///
    /// # Errors
    ///
    /// Returns [`WriteError`] if a fragment cannot be rendered or the sink
    /// fails.
    pub fn render<W: fmt::Write>(&self, out: &mut Writer<'_, W>) -> Result<(), WriteError> {
        let wrap = self.needs_shell() && out.platform().family() == PlatformFamily::Windows;
        if wrap {
            out.write_literal("cmd /s /c \"")?;
        }

        let mut first = true;
        for (name, value) in &self.environ {
            if !std::mem::take(&mut first) {
                out.write_literal(" && ")?;
            }
            let binding = Fragment::Concat(vec![
                Fragment::plain(name.as_str()),
                Fragment::shell_literal("="),
                value.clone(),
            ]);
            out.write_literal("export ")?;
            out.write(&binding, Syntax::Shell, Quoting::Quote)?;
        }
        for line in &self.lines {
            if !std::mem::take(&mut first) {
                out.write_literal(" && ")?;
            }
            line.render(out)?;
        }

        if wrap {
            out.write_literal("\"")?;
        }
        Ok(())
    }
}

impl From<CommandLine> for Commands {
    fn from(line: CommandLine) -> Self {
        Self::new(line)
    }
}

impl From<Vec<Arg>> for Commands {
    fn from(args: Vec<Arg>) -> Self {
        Self::new(CommandLine::Args(args))
    }
}

impl From<Variable> for Commands {
    fn from(var: Variable) -> Self {
        Self::new(CommandLine::Args(vec![Arg::from(var)]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn cc() -> Tool {
        Tool::new("cc", "gcc")
    }

    #[rstest]
    #[case(Commands::new(CommandLine::args(["true"])), false)]
    #[case(Commands::new(CommandLine::args(["a"])).then(CommandLine::args(["b"])), true)]
    #[case(Commands::new(CommandLine::args(["a"])).env("X", "1"), true)]
    #[case(Commands::new(CommandLine::shell_list(["a", ">", "b"])), true)]
    #[case(Commands::new(CommandLine::script("echo hi")), true)]
    #[case(Commands::new(Commands::new(CommandLine::args(["a"]))), true)]
    fn needs_shell(#[case] commands: Commands, #[case] expected: bool) {
        assert_eq!(commands.needs_shell(), expected);
    }

    #[rstest]
    fn from_lines_rejects_empty_sequence() {
        let err = Commands::from_lines(Vec::<CommandLine>::new()).expect_err("empty");
        assert!(matches!(err, IrError::EmptyCommand));
    }

    #[rstest]
    fn convert_args_rewrites_tools_recursively() {
        let nested = Commands::new(CommandLine::args([Arg::from(cc()), Arg::from("-v")]));
        let mut commands = Commands::new(CommandLine::args([Arg::from(cc()), Arg::from("-c")]))
            .then(CommandLine::script("cc is untouched"))
            .then(nested);
        let mut seen = Vec::new();
        commands
            .convert_args(&mut |tool| {
                seen.push(tool.command_var().to_owned());
                Ok(Variable::new(tool.command_var()))
            })
            .expect("conversion succeeds");

        assert_eq!(seen, ["cc", "cc"]);
        let Some(CommandLine::Args(args)) = commands.lines().first() else {
            panic!("first line should be an argument vector");
        };
        assert_eq!(args.first(), Some(&Arg::Text(Fragment::literal("${cc}"))));
        assert_eq!(
            commands.lines().get(1),
            Some(&CommandLine::Script(Fragment::plain("cc is untouched")))
        );
    }

    #[rstest]
    fn single_direct_line_collapses_to_words() {
        let value = Commands::new(CommandLine::args(["cc", "-c"])).into_value();
        assert_eq!(value, Value::words(["cc", "-c"]));
    }

    #[rstest]
    fn shell_sequences_stay_commands() {
        let commands = Commands::new(CommandLine::args(["a"])).env("X", "1");
        assert_eq!(commands.clone().into_value(), Value::Commands(commands));
    }

    #[rstest]
    fn validate_checks_environment() {
        let commands = Commands::new(CommandLine::args(["a"])).env("X", "multi\nline");
        assert!(commands.validate().is_err());
    }
}
