//! Build plans: serialised sequences of IR declarations.
//!
//! A plan is a YAML or JSON document listing the variables, rules, edges and
//! defaults a front-end would declare. Applying it performs the same
//! [`BuildFile`] calls in document order, so every IR error surfaces
//! unchanged, wrapped with context naming the offending entry.
//!
//! ```
//! use ninja_synth::platform::Platform;
//! use ninja_synth::plan;
//!
//! let yaml = r#"
//! source: build.bfg
//! rules:
//!   - name: cc
//!     command: [cc, -c, {var: in}, -o, {var: out}]
//! builds:
//!   - outputs: main.o
//!     rule: cc
//!     inputs: main.c
//! "#;
//! let plan = plan::from_str(yaml, "plan.yml")?;
//! let file = plan.build_file(Some(Platform::Linux))?;
//! assert!(file.has_build("main.o"));
//! # Ok::<(), anyhow::Error>(())
//! ```

use crate::command::{Arg, CommandLine, Commands, Tool};
use crate::config::GeneratorConfig;
use crate::ir::{BuildEdge, BuildFile, CommandBuild, RuleOptions, Value, Variable};
use crate::path::BuildPath;
use crate::platform::Platform;
use crate::safe_str::Fragment;
use anyhow::{Context, Result, anyhow};
use camino::Utf8Path;
use indexmap::IndexMap;
use itertools::Itertools;
use std::fs;

mod diagnostics;
mod schema;

pub use diagnostics::{PlanError, map_data_error, map_yaml_error};
pub use schema::{
    Keyed, OneOrMany, Plan, PlanArg, PlanBuild, PlanCommand, PlanCommandBuild, PlanCommands,
    PlanFragment, PlanLine, PlanRoot, PlanRule, PlanValue, PlanVariable, ShellList,
    TaggedFragment, ToolRef,
};

/// Parse a YAML plan. `name` labels diagnostics.
///
/// # Errors
///
/// Returns [`PlanError::Parse`] if the text is not YAML or does not match
/// the plan schema.
pub fn from_str(yaml: &str, name: &str) -> Result<Plan, PlanError> {
    let doc: serde_json::Value =
        serde_saphyr::from_str(yaml).map_err(|err| map_yaml_error(err, yaml, name))?;
    serde_json::from_value(doc)
        .map(Keyed::into_inner)
        .map_err(|err| map_data_error(err, name))
}

/// Parse a JSON plan. `name` labels diagnostics.
///
/// # Errors
///
/// Returns [`PlanError::Parse`] if the text is not JSON or does not match
/// the plan schema.
pub fn from_json_str(json: &str, name: &str) -> Result<Plan, PlanError> {
    serde_json::from_str(json)
        .map(Keyed::into_inner)
        .map_err(|err| map_data_error(err, name))
}

/// Load a plan from `path`. Files ending in `.json` are read as JSON, all
/// others as YAML.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed.
pub fn from_path(path: &Utf8Path) -> Result<Plan> {
    let text =
        fs::read_to_string(path).with_context(|| format!("failed to read build plan {path}"))?;
    let plan = if path.extension() == Some("json") {
        from_json_str(&text, path.as_str())?
    } else {
        from_str(&text, path.as_str())?
    };
    tracing::debug!(%path, rules = plan.rules.len(), builds = plan.builds.len(), "loaded build plan");
    Ok(plan)
}

impl Plan {
    /// Apply the plan to a fresh [`BuildFile`].
    ///
    /// `platform` overrides the plan's own platform, which in turn overrides
    /// the host platform.
    ///
    /// # Errors
    ///
    /// Returns an error naming the first declaration the IR rejects, or a
    /// reference to an undeclared tool.
    pub fn build_file(&self, platform: Option<Platform>) -> Result<BuildFile> {
        let platform = platform.or(self.platform).unwrap_or_else(Platform::host);
        let mut file = BuildFile::new(self.source.as_str(), GeneratorConfig::for_platform(platform));
        let conv = Converter {
            tools: Some(&self.tools),
        };

        if let Some(version) = &self.min_version {
            file.min_version(version.clone());
        }

        for var in &self.variables {
            let value = conv
                .value(&var.value)
                .with_context(|| format!("in variable {}", var.name))?;
            file.variable(var.name.as_str(), value, var.section, var.exist_ok)
                .with_context(|| format!("failed to declare variable {}", var.name))?;
        }

        for rule in &self.rules {
            let command = conv
                .command(&rule.command)
                .with_context(|| format!("in rule {}", rule.name))?;
            let options = RuleOptions {
                depfile: rule.depfile.as_ref().map(|depfile| conv.fragment(depfile)),
                deps: rule.deps.clone(),
                generator: rule.generator,
                pool: rule.pool.clone(),
                restat: rule.restat,
            };
            file.rule(&rule.name, command, options)
                .with_context(|| format!("failed to declare rule {}", rule.name))?;
        }

        for build in &self.builds {
            let edge = conv
                .edge(build)
                .with_context(|| format!("in build for rule {}", build.rule))?;
            let label = describe(&edge.outputs);
            file.build(edge)
                .with_context(|| format!("failed to declare build {label}"))?;
        }

        for build in &self.command_builds {
            let commands = conv.command(&build.commands)?;
            let command_build = CommandBuild::new(conv.fragments(&build.outputs), commands)
                .with_inputs(conv.fragments(&build.inputs))
                .with_implicit(conv.fragments(&build.implicit))
                .with_order_only(conv.fragments(&build.order_only))
                .console(build.console);
            let label = describe(&command_build.outputs);
            file.command_build(command_build)
                .with_context(|| format!("failed to declare command build {label}"))?;
        }

        file.default(self.defaults.iter().map(|path| conv.fragment(path)))
            .context("failed to declare default targets")?;
        Ok(file)
    }
}

fn describe(outputs: &[Fragment]) -> String {
    outputs.iter().join(" ")
}

/// Turns schema nodes into IR values. Tool commands are converted without
/// access to the tool table, so tools cannot reference each other.
struct Converter<'a> {
    tools: Option<&'a IndexMap<String, PlanValue>>,
}

impl Converter<'_> {
    fn fragment(&self, fragment: &PlanFragment) -> Fragment {
        match fragment {
            PlanFragment::Text(text) => Fragment::plain(text.as_str()),
            PlanFragment::Tagged(Keyed(tagged)) => self.tagged(tagged),
        }
    }

    fn tagged(&self, fragment: &TaggedFragment) -> Fragment {
        match fragment {
            TaggedFragment::Literal { literal } => Fragment::literal(literal.as_str()),
            TaggedFragment::Shell { shell } => Fragment::shell_literal(shell.as_str()),
            TaggedFragment::Var { var } => Variable::new(var).use_var(),
            TaggedFragment::Path {
                path,
                root,
                directory,
            } => {
                let (root, staged) = root.resolve();
                let mut path = BuildPath::new(root, path.as_str());
                if staged {
                    path = path.with_destdir();
                }
                if *directory {
                    path = path.into_directory();
                }
                Fragment::Path(path)
            }
            TaggedFragment::Concat { concat } => {
                Fragment::concat(concat.iter().map(|part| self.fragment(part)))
            }
        }
    }

    fn fragments(&self, items: &OneOrMany<PlanFragment>) -> Vec<Fragment> {
        match items {
            OneOrMany::Many(items) => items.iter().map(|item| self.fragment(item)).collect(),
            OneOrMany::One(item) => vec![self.fragment(item)],
        }
    }

    fn arg(&self, arg: &PlanArg) -> Result<Arg> {
        match arg {
            PlanArg::Fragment(fragment) => Ok(Arg::Text(self.fragment(fragment))),
            PlanArg::Tool(Keyed(ToolRef { tool })) => {
                let command = self
                    .tools
                    .and_then(|tools| tools.get(tool))
                    .ok_or_else(|| anyhow!("unknown tool {tool:?}"))?;
                let command = Converter { tools: None }.value(command)?;
                Ok(Arg::Tool(Tool::new(tool.as_str(), command)))
            }
        }
    }

    fn args(&self, args: &[PlanArg]) -> Result<Vec<Arg>> {
        args.iter().map(|arg| self.arg(arg)).collect()
    }

    fn line(&self, line: &PlanLine) -> Result<CommandLine> {
        Ok(match line {
            PlanLine::Args(args) => CommandLine::Args(self.args(args)?),
            PlanLine::ShellList(Keyed(ShellList { shell_list })) => CommandLine::ShellList(self.args(shell_list)?),
            PlanLine::Nested(commands) => CommandLine::from(self.commands(commands)?),
            PlanLine::Script(script) => CommandLine::Script(self.fragment(script)),
        })
    }

    fn commands(&self, commands: &PlanCommands) -> Result<Commands> {
        let lines = commands
            .commands
            .iter()
            .map(|line| self.line(line))
            .collect::<Result<Vec<_>>>()?;
        let mut out = Commands::from_lines(lines)?;
        for (name, value) in &commands.env {
            out = out.env(name.as_str(), self.fragment(value));
        }
        Ok(out)
    }

    fn command(&self, command: &PlanCommand) -> Result<Commands> {
        match command {
            PlanCommand::Sequence(commands) => self.commands(commands),
            PlanCommand::Line(line) => Ok(Commands::new(self.line(line)?)),
        }
    }

    fn value(&self, value: &PlanValue) -> Result<Value> {
        Ok(match value {
            PlanValue::Commands(commands) => Value::Commands(self.commands(commands)?),
            PlanValue::Words(args) => Value::Words(self.args(args)?),
            PlanValue::Text(fragment) => Value::Text(self.fragment(fragment)),
        })
    }

    fn edge(&self, build: &PlanBuild) -> Result<BuildEdge> {
        let mut edge = BuildEdge::new(self.fragments(&build.outputs), build.rule.as_str())
            .with_inputs(self.fragments(&build.inputs))
            .with_implicit(self.fragments(&build.implicit))
            .with_order_only(self.fragments(&build.order_only));
        for (name, value) in &build.variables {
            edge = edge.with_variable(name.as_str(), self.value(value)?);
        }
        Ok(edge)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::{IrError, Section};
    use rstest::rstest;

    #[rstest]
    fn fragments_accept_short_and_tagged_forms() {
        let yaml = r"
source: x
defaults:
  - plain
  - {literal: '${x}'}
  - {shell: '&&'}
  - {var: 'c++'}
  - {path: include, root: srcdir, directory: true}
  - {path: app, root: bindir}
  - {concat: [-I, {var: srcdir}]}
";
        let plan = from_str(yaml, "plan.yml").expect("parse plan");
        let conv = Converter { tools: None };
        let fragments: Vec<Fragment> = plan.defaults.iter().map(|f| conv.fragment(f)).collect();
        assert_eq!(
            fragments,
            vec![
                Fragment::plain("plain"),
                Fragment::literal("${x}"),
                Fragment::shell_literal("&&"),
                Fragment::literal("${c__}"),
                Fragment::Path(BuildPath::srcdir("include").into_directory()),
                Fragment::Path(BuildPath::install(crate::path::InstallRoot::BinDir, "app")),
                Fragment::Concat(vec![Fragment::plain("-I"), Fragment::literal("${srcdir}")]),
            ]
        );
    }

    #[rstest]
    fn variables_default_to_other_section_and_strict_redeclaration() {
        let yaml = "
source: x
variables:
  - {name: a, value: '1'}
  - {name: a, value: '2'}
";
        let plan = from_str(yaml, "plan.yml").expect("parse plan");
        assert_eq!(plan.variables.first().map(|v| v.section), Some(Section::Other));
        let err = plan
            .build_file(Some(Platform::Linux))
            .expect_err("redeclaration fails");
        assert!(matches!(
            err.downcast_ref::<IrError>(),
            Some(IrError::AlreadyExists { .. })
        ));
        assert!(err.to_string().contains("variable a"));
    }

    #[rstest]
    fn unknown_tools_are_reported() {
        let yaml = "
source: x
rules:
  - name: cc
    command: [{tool: cc}, -c]
";
        let plan = from_str(yaml, "plan.yml").expect("parse plan");
        let err = plan
            .build_file(Some(Platform::Linux))
            .expect_err("tool is not declared");
        assert!(format!("{err:#}").contains("unknown tool \"cc\""));
    }

    #[rstest]
    fn json_plans_are_accepted() {
        let json = r#"{"source": "x", "builds": [{"outputs": ["all"], "rule": "phony"}]}"#;
        let plan = from_json_str(json, "plan.json").expect("parse plan");
        let file = plan.build_file(Some(Platform::Windows)).expect("apply plan");
        assert!(file.has_build("all"));
        assert_eq!(file.config().platform, Platform::Windows);
    }

    #[rstest]
    fn unknown_keys_are_rejected() {
        let err = from_str("source: x\nrule: []\n", "plan.yml").expect_err("typo in key");
        assert!(matches!(err, PlanError::Parse { .. }));
    }

    #[rstest]
    #[case::nested_argument_lists("rules: [{name: r, command: [[echo, hi]]}]")]
    #[case::positional_tool("rules: [{name: r, command: [[cc], -c]}]")]
    #[case::positional_shell_list("rules: [{name: r, command: [[[cat, '>', out]]]}]")]
    #[case::positional_variable("variables: [[a, '1']]")]
    #[case::positional_build("builds: [[out, phony]]")]
    fn map_forms_reject_lists(#[case] body: &str) {
        let yaml = format!("source: x\n{body}\n");
        let err = from_str(&yaml, "plan.yml").expect_err("lists are not map forms");
        assert!(matches!(err, PlanError::Parse { .. }));
    }

    #[rstest]
    fn list_documents_are_rejected() {
        assert!(from_str("[x]\n", "plan.yml").is_err());
        assert!(from_json_str(r#"["x"]"#, "plan.json").is_err());
    }
}
