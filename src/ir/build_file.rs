//! The build file aggregate and its mutation API.

use super::variable::is_name_char;
use super::{
    BuildEdge, EntryKind, IrError, PHONY, Pool, Rule, RuleOptions, Section, Value, Variable,
};
use crate::command::{Commands, Tool};
use crate::config::GeneratorConfig;
use crate::safe_str::{Fragment, Renderable, check_newline};
use camino::{Utf8Path, Utf8PathBuf};
use indexmap::IndexMap;
use semver::Version;
use std::collections::{HashMap, HashSet};

/// One generated build file.
///
/// The front-end declares variables, rules, edges and defaults; the writer
/// then renders them once in a fixed order. Entries are never removed or
/// replaced. A mutation that returns an error leaves the file in an
/// unspecified state and the file should be discarded.
///
/// ```
/// use ninja_synth::command::CommandLine;
/// use ninja_synth::config::GeneratorConfig;
/// use ninja_synth::ir::{BuildEdge, BuildFile, RuleOptions};
/// use ninja_synth::platform::Platform;
///
/// let mut file = BuildFile::new("build.bfg", GeneratorConfig::for_platform(Platform::Linux));
/// file.rule("cc", CommandLine::args(["cc", "-c", "main.c"]), RuleOptions::default())?;
/// file.build(BuildEdge::new(["main.o"], "cc").with_inputs(["main.c"]))?;
/// assert!(file.has_build("main.o"));
/// # Ok::<(), ninja_synth::ir::IrError>(())
/// ```
#[derive(Debug, Clone)]
pub struct BuildFile {
    source: Utf8PathBuf,
    config: GeneratorConfig,
    min_version: Option<Version>,
    var_table: HashSet<Variable>,
    variables: HashMap<Section, Vec<(Variable, Value)>>,
    rules: IndexMap<String, Rule>,
    edges: Vec<BuildEdge>,
    outputs: HashSet<Fragment>,
    defaults: Vec<Fragment>,
}

impl BuildFile {
    /// An empty build file generated from `source`.
    #[must_use]
    pub fn new(source: impl Into<Utf8PathBuf>, config: GeneratorConfig) -> Self {
        Self {
            source: source.into(),
            config,
            min_version: None,
            var_table: HashSet::new(),
            variables: HashMap::new(),
            rules: IndexMap::new(),
            edges: Vec::new(),
            outputs: HashSet::new(),
            defaults: Vec::new(),
        }
    }

    /// Description file named in the header comment.
    #[must_use]
    pub fn source(&self) -> &Utf8Path {
        &self.source
    }

    /// Platform and path variables the file is generated for.
    #[must_use]
    pub const fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Raise the minimum backend version. Lower versions are ignored.
    pub fn min_version(&mut self, version: Version) {
        if self
            .min_version
            .as_ref()
            .is_some_and(|current| *current >= version)
        {
            return;
        }
        tracing::debug!(%version, "raised minimum backend version");
        self.min_version = Some(version);
    }

    /// Current minimum backend version, if any feature requires one.
    #[must_use]
    pub const fn required_version(&self) -> Option<&Version> {
        self.min_version.as_ref()
    }

    /// Declare a variable in `section`.
    ///
    /// When the normalised name is already declared, the existing variable is
    /// returned unchanged if `exist_ok` holds.
    ///
    /// # Errors
    ///
    /// Returns [`IrError::AlreadyExists`] on redeclaration without
    /// `exist_ok`, or [`IrError::Format`] if the value contains a newline.
    pub fn variable(
        &mut self,
        name: impl Into<Variable>,
        value: impl Into<Value>,
        section: Section,
        exist_ok: bool,
    ) -> Result<Variable, IrError> {
        let name = name.into();
        if self.var_table.contains(&name) {
            if !exist_ok {
                return Err(IrError::AlreadyExists {
                    kind: EntryKind::Variable,
                    name: name.name().to_owned(),
                });
            }
            tracing::trace!(variable = %name, "variable already declared");
            return Ok(name);
        }

        let value = value.into();
        value.validate()?;
        tracing::debug!(variable = %name, ?section, "declared variable");
        self.var_table.insert(name.clone());
        self.variables
            .entry(section)
            .or_default()
            .push((name.clone(), value));
        Ok(name)
    }

    /// Intern the variable holding `tool`'s invocation.
    ///
    /// # Errors
    ///
    /// Returns [`IrError::Format`] if the invocation contains a newline.
    pub fn cmd_var(&mut self, tool: &Tool) -> Result<Variable, IrError> {
        self.variable(
            tool.command_var(),
            tool.command().clone(),
            Section::Command,
            true,
        )
    }

    /// Whether `name` has been declared.
    #[must_use]
    pub fn has_variable(&self, name: impl Into<Variable>) -> bool {
        self.var_table.contains(&name.into())
    }

    /// Variables declared in `section`, in declaration order.
    #[must_use]
    pub fn variables(&self, section: Section) -> &[(Variable, Value)] {
        self.variables.get(&section).map_or(&[], Vec::as_slice)
    }

    /// Declare a rule.
    ///
    /// Tool references in `command` are replaced by command-section
    /// variables. A command that runs without a shell is stored as its bare
    /// argument vector.
    ///
    /// # Errors
    ///
    /// Returns [`IrError::InvalidName`] for names outside `[A-Za-z0-9_]`,
    /// [`IrError::AlreadyExists`] for a repeated name or `phony`,
    /// [`IrError::InvalidPool`] for a pool other than `console`, and
    /// [`IrError::Format`] if any value contains a newline.
    pub fn rule(
        &mut self,
        name: &str,
        command: impl Into<Commands>,
        options: RuleOptions,
    ) -> Result<(), IrError> {
        if name.is_empty() || !name.chars().all(is_name_char) {
            return Err(IrError::InvalidName {
                name: name.to_owned(),
            });
        }
        if name == PHONY || self.has_rule(name) {
            return Err(IrError::AlreadyExists {
                kind: EntryKind::Rule,
                name: name.to_owned(),
            });
        }
        let pool = Pool::parse(options.pool.as_deref().unwrap_or_default())?;

        let mut command: Commands = command.into();
        command.validate()?;
        if let Some(depfile) = &options.depfile {
            depfile.validate()?;
        }
        if let Some(deps) = &options.deps {
            check_newline(deps)?;
        }

        command.convert_args(&mut |tool| self.cmd_var(tool))?;
        if let Some(pool) = pool {
            self.min_version(pool.min_version());
        }

        tracing::debug!(rule = name, pool = ?pool, "declared rule");
        self.rules.insert(
            name.to_owned(),
            Rule {
                command: command.into_value(),
                depfile: options.depfile,
                deps: options.deps,
                generator: options.generator,
                pool,
                restat: options.restat,
            },
        );
        Ok(())
    }

    /// Whether a rule called `name` has been declared.
    #[must_use]
    pub fn has_rule(&self, name: &str) -> bool {
        self.rules.contains_key(name)
    }

    /// Declared rules, in declaration order.
    #[must_use]
    pub const fn rules(&self) -> &IndexMap<String, Rule> {
        &self.rules
    }

    /// Declare a build edge.
    ///
    /// Tool references in override values are replaced by command-section
    /// variables. Outputs are checked before any is registered, so a
    /// rejected edge leaves no outputs behind.
    ///
    /// # Errors
    ///
    /// Returns [`IrError::UnknownRule`] if the rule is neither declared nor
    /// `phony`, [`IrError::MissingOutputs`] for an edge without outputs,
    /// [`IrError::DuplicateOutput`] if an output is already built by another
    /// edge or repeated within this one, and [`IrError::Format`] if any value
    /// contains a newline.
    pub fn build(&mut self, mut edge: BuildEdge) -> Result<(), IrError> {
        if edge.rule != PHONY && !self.has_rule(&edge.rule) {
            return Err(IrError::UnknownRule { rule: edge.rule });
        }
        if edge.outputs.is_empty() {
            return Err(IrError::MissingOutputs { rule: edge.rule });
        }
        edge.validate()?;

        let mut seen = HashSet::new();
        let duplicates: Vec<String> = edge
            .outputs
            .iter()
            .filter(|output| self.outputs.contains(*output) || !seen.insert(*output))
            .map(ToString::to_string)
            .collect();
        if !duplicates.is_empty() {
            return Err(IrError::DuplicateOutput {
                outputs: duplicates,
            });
        }

        for value in edge.variables.values_mut() {
            value.convert_args(&mut |tool| self.cmd_var(tool))?;
        }

        tracing::debug!(
            rule = %edge.rule,
            outputs = edge.outputs.len(),
            inputs = edge.inputs.len(),
            "declared build edge"
        );
        self.outputs.extend(edge.outputs.iter().cloned());
        self.edges.push(edge);
        Ok(())
    }

    /// Whether some edge already produces `output`.
    #[must_use]
    pub fn has_build(&self, output: impl Renderable) -> bool {
        self.outputs.contains(&output.to_fragment())
    }

    /// Declared edges, in declaration order.
    #[must_use]
    pub fn edges(&self) -> &[BuildEdge] {
        &self.edges
    }

    /// Append default targets. Repeats are kept.
    ///
    /// # Errors
    ///
    /// Returns [`IrError::Format`] if a path contains a newline.
    pub fn default<I>(&mut self, paths: I) -> Result<(), IrError>
    where
        I: IntoIterator,
        I::Item: Renderable,
    {
        let paths: Vec<Fragment> = paths.into_iter().map(|path| path.to_fragment()).collect();
        paths.iter().try_for_each(Fragment::validate)?;
        tracing::debug!(count = paths.len(), "declared default targets");
        self.defaults.extend(paths);
        Ok(())
    }

    /// Default targets, in declaration order.
    #[must_use]
    pub fn defaults(&self) -> &[Fragment] {
        &self.defaults
    }
}
