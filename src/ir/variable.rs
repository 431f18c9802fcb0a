//! Backend variables and the sections they are emitted in.

use crate::safe_str::{Fragment, Renderable};
use serde::Deserialize;
use std::fmt;

/// A backend variable, identified by its normalised name.
///
/// Every character outside `[A-Za-z0-9_]` is replaced with `_`, so
/// `"c++"` and `"c__"` name the same variable.
///
/// ```
/// use ninja_synth::ir::Variable;
///
/// let var = Variable::new("c++flags");
/// assert_eq!(var.name(), "c__flags");
/// assert_eq!(var, Variable::new("c__flags"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Variable {
    name: String,
}

impl Variable {
    /// Create a variable from `name`, normalising invalid characters.
    #[must_use]
    pub fn new(name: &str) -> Self {
        let name = name
            .chars()
            .map(|ch| if is_name_char(ch) { ch } else { '_' })
            .collect();
        Self { name }
    }

    /// Normalised name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// A reference to this variable, `${name}`, emitted verbatim.
    #[must_use]
    pub fn use_var(&self) -> Fragment {
        Fragment::literal(format!("${{{}}}", self.name))
    }
}

/// Whether `ch` may appear in a variable or rule name.
pub(crate) const fn is_name_char(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || ch == '_'
}

impl fmt::Display for Variable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

impl Renderable for Variable {
    fn to_fragment(&self) -> Fragment {
        self.use_var()
    }
}

impl From<&str> for Variable {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for Variable {
    fn from(name: String) -> Self {
        Self::new(&name)
    }
}

impl From<&Variable> for Variable {
    fn from(var: &Variable) -> Self {
        var.clone()
    }
}

impl From<Variable> for Fragment {
    fn from(var: Variable) -> Self {
        var.use_var()
    }
}

/// Group a variable is emitted in. Sections only affect output order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Section {
    /// Path roots such as `srcdir` and `prefix`.
    Path,
    /// Tool invocations such as `cc`.
    Command,
    /// Tool flags such as `cflags`.
    Flags,
    /// Everything else.
    #[default]
    Other,
}

impl Section {
    /// Every section, in emission order.
    pub const ALL: [Self; 4] = [Self::Path, Self::Command, Self::Flags, Self::Other];
}
