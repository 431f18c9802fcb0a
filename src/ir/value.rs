//! Right-hand sides of variable assignments.

use super::{IrError, Variable};
use crate::command::{Arg, Commands, Tool, convert_tools};
use crate::path::BuildPath;
use crate::safe_str::{Fragment, FormatError, Renderable};

/// A value assigned to a variable, a rule key, or an edge override.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    /// A single value, backend-escaped but never shell-quoted.
    Text(Fragment),
    /// Space-separated words, each shell-quoted when needed.
    Words(Vec<Arg>),
    /// A command sequence, rendered with its own quoting and wrapping.
    Commands(Commands),
}

impl Value {
    /// Space-separated words from `items`.
    #[must_use]
    pub fn words<I>(items: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Arg>,
    {
        Self::Words(items.into_iter().map(Into::into).collect())
    }

    /// Replace tool references with the variables `conv` interns for them.
    pub(crate) fn convert_args<F>(&mut self, conv: &mut F) -> Result<(), IrError>
    where
        F: FnMut(&Tool) -> Result<Variable, IrError>,
    {
        match self {
            Self::Text(_) => Ok(()),
            Self::Words(args) => convert_tools(args, conv),
            Self::Commands(commands) => commands.convert_args(conv),
        }
    }

    /// Reject values the backend cannot represent.
    ///
    /// # Errors
    ///
    /// Returns [`FormatError`] if any part contains a newline.
    pub fn validate(&self) -> Result<(), FormatError> {
        match self {
            Self::Text(fragment) => fragment.validate(),
            Self::Words(args) => args.iter().try_for_each(Arg::validate),
            Self::Commands(commands) => commands.validate(),
        }
    }
}

impl From<Fragment> for Value {
    fn from(fragment: Fragment) -> Self {
        Self::Text(fragment)
    }
}

impl From<&str> for Value {
    fn from(text: &str) -> Self {
        Self::Text(Fragment::plain(text))
    }
}

impl From<String> for Value {
    fn from(text: String) -> Self {
        Self::Text(Fragment::Plain(text))
    }
}

impl From<Variable> for Value {
    fn from(var: Variable) -> Self {
        Self::Text(var.use_var())
    }
}

impl From<BuildPath> for Value {
    fn from(path: BuildPath) -> Self {
        Self::Text(path.to_fragment())
    }
}

impl From<Commands> for Value {
    fn from(commands: Commands) -> Self {
        Self::Commands(commands)
    }
}

impl From<Vec<Arg>> for Value {
    fn from(args: Vec<Arg>) -> Self {
        Self::Words(args)
    }
}
