//! Serde schema of a build plan.
//!
//! Most nodes accept a short form (a bare string or list) and a tagged map
//! form, so they deserialise as untagged enums. Variants are tried in
//! declaration order.
//!
//! Map forms are wrapped in [`Keyed`]: a derived struct deserialiser also
//! accepts a positional list, so `[[echo, hi]]` would otherwise be read as
//! a struct and match some variant by accident.

use crate::ir::Section;
use crate::path::{InstallRoot, Root};
use crate::platform::Platform;
use indexmap::IndexMap;
use serde::de::value::MapAccessDeserializer;
use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Deserializer};
use std::fmt;
use std::marker::PhantomData;
use std::ops::Deref;

/// A node accepted only in map form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Keyed<T>(pub T);

impl<T> Keyed<T> {
    /// Unwrap the node.
    #[must_use]
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T> Deref for Keyed<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.0
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for Keyed<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(KeyedVisitor(PhantomData))
    }
}

struct KeyedVisitor<T>(PhantomData<T>);

impl<'de, T: Deserialize<'de>> Visitor<'de> for KeyedVisitor<T> {
    type Value = Keyed<T>;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a map")
    }

    fn visit_map<A: MapAccess<'de>>(self, map: A) -> Result<Self::Value, A::Error> {
        T::deserialize(MapAccessDeserializer::new(map)).map(Keyed)
    }
}

/// Top-level plan document.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Plan {
    /// Description file named in the generated header.
    pub source: String,
    /// Target platform; the host platform when omitted.
    #[serde(default)]
    pub platform: Option<Platform>,
    /// Minimum backend version, as full semver.
    #[serde(default)]
    pub min_version: Option<semver::Version>,
    /// Tools that arguments may reference with `{tool: name}`.
    #[serde(default)]
    pub tools: IndexMap<String, PlanValue>,
    /// Variable declarations, in order.
    #[serde(default)]
    pub variables: Vec<Keyed<PlanVariable>>,
    /// Rule declarations, in order.
    #[serde(default)]
    pub rules: Vec<Keyed<PlanRule>>,
    /// Edge declarations, in order.
    #[serde(default)]
    pub builds: Vec<Keyed<PlanBuild>>,
    /// Command edges, declared after `builds`.
    #[serde(default)]
    pub command_builds: Vec<Keyed<PlanCommandBuild>>,
    /// Default targets.
    #[serde(default)]
    pub defaults: Vec<PlanFragment>,
}

/// A string value with its escaping.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum PlanFragment {
    /// Ordinary text.
    Text(String),
    /// One of the map forms.
    Tagged(Keyed<TaggedFragment>),
}

/// Map forms of a [`PlanFragment`].
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum TaggedFragment {
    /// Verbatim text.
    Literal {
        /// The text.
        literal: String,
    },
    /// Shell operator or pre-quoted text.
    Shell {
        /// The text.
        shell: String,
    },
    /// Reference to a variable.
    Var {
        /// Variable name.
        var: String,
    },
    /// A symbolic path.
    Path {
        /// Path below the root, `/`-separated.
        path: String,
        /// Root the path is relative to.
        #[serde(default)]
        root: PlanRoot,
        /// Whether the path names a directory.
        #[serde(default)]
        directory: bool,
    },
    /// Parts rendered in sequence.
    Concat {
        /// The parts.
        concat: Vec<PlanFragment>,
    },
}

/// Root of a plan path.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlanRoot {
    /// The build tree.
    #[default]
    Builddir,
    /// The source tree.
    Srcdir,
    /// An absolute path.
    Absolute,
    /// Installation prefix.
    Prefix,
    /// Architecture-dependent installation prefix.
    ExecPrefix,
    /// Installed executables.
    Bindir,
    /// Installed libraries.
    Libdir,
    /// Installed headers.
    Includedir,
}

impl PlanRoot {
    /// The symbolic root, and whether paths under it are staged installs.
    #[must_use]
    pub const fn resolve(self) -> (Root, bool) {
        match self {
            Self::Builddir => (Root::BuildDir, false),
            Self::Srcdir => (Root::SrcDir, false),
            Self::Absolute => (Root::Absolute, false),
            Self::Prefix => (Root::Install(InstallRoot::Prefix), true),
            Self::ExecPrefix => (Root::Install(InstallRoot::ExecPrefix), true),
            Self::Bindir => (Root::Install(InstallRoot::BinDir), true),
            Self::Libdir => (Root::Install(InstallRoot::LibDir), true),
            Self::Includedir => (Root::Install(InstallRoot::IncludeDir), true),
        }
    }
}

/// One command argument.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum PlanArg {
    /// Reference to an entry of the plan's `tools`.
    Tool(Keyed<ToolRef>),
    /// Any fragment.
    Fragment(PlanFragment),
}

/// `{tool: name}`.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ToolRef {
    /// Tool name.
    pub tool: String,
}

/// One command line.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum PlanLine {
    /// A plain argument vector.
    Args(Vec<PlanArg>),
    /// An argument vector containing shell operators.
    ShellList(Keyed<ShellList>),
    /// A nested command sequence.
    Nested(Keyed<PlanCommands>),
    /// A raw script.
    Script(PlanFragment),
}

/// `{shell_list: [...]}`.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ShellList {
    /// The arguments.
    pub shell_list: Vec<PlanArg>,
}

/// A command sequence with environment bindings.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PlanCommands {
    /// Command lines, in order.
    pub commands: Vec<PlanLine>,
    /// Environment bindings.
    #[serde(default)]
    pub env: IndexMap<String, PlanFragment>,
}

/// A rule command: a full sequence or a single line.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum PlanCommand {
    /// A sequence with optional environment.
    Sequence(Keyed<PlanCommands>),
    /// A single line.
    Line(PlanLine),
}

/// Right-hand side of an assignment.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum PlanValue {
    /// A command sequence.
    Commands(Keyed<PlanCommands>),
    /// Space-separated words.
    Words(Vec<PlanArg>),
    /// A single value.
    Text(PlanFragment),
}

/// A variable declaration.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PlanVariable {
    /// Variable name; normalised on declaration.
    pub name: String,
    /// Assigned value.
    pub value: PlanValue,
    /// Emission section.
    #[serde(default)]
    pub section: Section,
    /// Accept an existing declaration instead of failing.
    #[serde(default)]
    pub exist_ok: bool,
}

/// A rule declaration.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PlanRule {
    /// Rule name.
    pub name: String,
    /// Command template.
    pub command: PlanCommand,
    /// Dependency file.
    #[serde(default)]
    pub depfile: Option<PlanFragment>,
    /// Dependency file format.
    #[serde(default)]
    pub deps: Option<String>,
    /// Generator flag.
    #[serde(default)]
    pub generator: bool,
    /// Pool token.
    #[serde(default)]
    pub pool: Option<String>,
    /// Re-stat flag.
    #[serde(default)]
    pub restat: bool,
}

/// One item or a list of items.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany<T> {
    /// A list.
    Many(Vec<T>),
    /// A single item.
    One(T),
}

impl<T> Default for OneOrMany<T> {
    fn default() -> Self {
        Self::Many(Vec::new())
    }
}

/// An edge declaration.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PlanBuild {
    /// Outputs.
    pub outputs: OneOrMany<PlanFragment>,
    /// Rule name or `phony`.
    pub rule: String,
    /// Explicit inputs.
    #[serde(default)]
    pub inputs: OneOrMany<PlanFragment>,
    /// Implicit inputs.
    #[serde(default)]
    pub implicit: OneOrMany<PlanFragment>,
    /// Order-only inputs.
    #[serde(default)]
    pub order_only: OneOrMany<PlanFragment>,
    /// Per-edge overrides.
    #[serde(default)]
    pub variables: IndexMap<String, PlanValue>,
}

/// A command edge declaration.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PlanCommandBuild {
    /// Outputs.
    pub outputs: OneOrMany<PlanFragment>,
    /// Commands to run.
    pub commands: PlanCommand,
    /// Explicit inputs.
    #[serde(default)]
    pub inputs: OneOrMany<PlanFragment>,
    /// Implicit inputs.
    #[serde(default)]
    pub implicit: OneOrMany<PlanFragment>,
    /// Order-only inputs.
    #[serde(default)]
    pub order_only: OneOrMany<PlanFragment>,
    /// Run in the console pool.
    #[serde(default = "default_console")]
    pub console: bool,
}

const fn default_console() -> bool {
    true
}
