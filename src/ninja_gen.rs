//! Ninja file generator.
//!
//! This module serialises a [`BuildFile`] into Ninja syntax in a single
//! append-only pass. Output order is fully determined by declaration order:
//! header, required version, variables by section, rules, edges and finally
//! the default targets.

mod writer;

pub use writer::{Quoting, Syntax, WriteError, Writer, escape_str};

use crate::ir::{BuildEdge, BuildFile, Rule, Section, Value};
use camino::Utf8Path;
use semver::Version;
use std::{fmt, io};

const INDENT: &str = "  ";

macro_rules! write_kv {
    ($out:expr, $key:expr, $opt:expr) => {
        if let Some(val) = $opt {
            write_variable($out, $key, &Value::from(val.clone()), Syntax::Shell, INDENT)?;
        }
    };
}

macro_rules! write_flag {
    ($out:expr, $key:expr, $cond:expr) => {
        if $cond {
            write_variable($out, $key, &Value::from("1"), Syntax::Shell, INDENT)?;
        }
    };
}

/// Generate a Ninja build file as a string.
///
/// # Errors
///
/// Returns [`WriteError`] if a value cannot be rendered.
///
/// # Examples
///
/// ```
/// use ninja_synth::config::GeneratorConfig;
/// use ninja_synth::ir::{BuildEdge, BuildFile};
/// use ninja_synth::ninja_gen::generate;
/// use ninja_synth::platform::Platform;
///
/// let mut file = BuildFile::new("build.bfg", GeneratorConfig::for_platform(Platform::Linux));
/// file.build(BuildEdge::phony(["all"]))?;
/// file.default(["all"])?;
/// let ninja = generate(&file)?;
/// assert!(ninja.ends_with("build all: phony\n\ndefault all\n"));
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub fn generate(file: &BuildFile) -> Result<String, WriteError> {
    let mut out = Writer::new(String::new(), file.config());
    emit(file, &mut out)?;
    Ok(out.into_inner())
}

/// Write a Ninja build file to `out`.
///
/// The stream is flushed even when rendering fails part way through; the
/// partial output should then be discarded by the caller.
///
/// # Errors
///
/// Returns [`WriteError::Io`] if the stream fails, or another
/// [`WriteError`] if a value cannot be rendered.
pub fn write_to<W: io::Write>(file: &BuildFile, out: W) -> Result<(), WriteError> {
    let mut writer = Writer::new(IoSink::new(out), file.config());
    let result = emit(file, &mut writer);
    let mut sink = writer.into_inner();
    let flushed = sink.inner.flush();
    match result {
        Err(WriteError::Sink) => {
            return Err(sink.error.take().map_or(WriteError::Sink, WriteError::Io));
        }
        other => other?,
    }
    flushed?;
    tracing::info!(
        source = %file.source(),
        rules = file.rules().len(),
        edges = file.edges().len(),
        "wrote Ninja build file"
    );
    Ok(())
}

impl BuildFile {
    /// Write this file in Ninja syntax to `out`.
    ///
    /// # Errors
    ///
    /// See [`write_to`].
    pub fn write<W: io::Write>(&self, out: W) -> Result<(), WriteError> {
        write_to(self, out)
    }

    /// Render this file in Ninja syntax.
    ///
    /// # Errors
    ///
    /// See [`generate`].
    pub fn to_ninja_string(&self) -> Result<String, WriteError> {
        generate(self)
    }
}

/// Adapts an [`io::Write`] stream to [`fmt::Write`], keeping the first I/O
/// error so it can be reported instead of [`fmt::Error`].
struct IoSink<W> {
    inner: W,
    error: Option<io::Error>,
}

impl<W> IoSink<W> {
    const fn new(inner: W) -> Self {
        Self { inner, error: None }
    }
}

impl<W: io::Write> fmt::Write for IoSink<W> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.inner.write_all(s.as_bytes()).map_err(|err| {
            self.error = Some(err);
            fmt::Error
        })
    }
}

fn emit<W: fmt::Write>(file: &BuildFile, out: &mut Writer<'_, W>) -> Result<(), WriteError> {
    out.write_literal(&header(file.source()))?;

    if let Some(version) = file.required_version() {
        let version = Value::from(version_token(version));
        write_variable(out, "ninja_required_version", &version, Syntax::Shell, "")?;
        out.write_literal("\n")?;
    }

    for section in Section::ALL {
        // Path roots are spliced into other paths, which do the quoting.
        let syntax = if section == Section::Path {
            Syntax::Clean
        } else {
            Syntax::Shell
        };
        let variables = file.variables(section);
        for (name, value) in variables {
            write_variable(out, name.name(), value, syntax, "")?;
        }
        if !variables.is_empty() {
            out.write_literal("\n")?;
        }
    }

    for (name, rule) in file.rules() {
        write_rule(out, name, rule)?;
        out.write_literal("\n")?;
    }

    for edge in file.edges() {
        write_edge(out, edge)?;
        out.write_literal("\n")?;
    }

    if !file.defaults().is_empty() {
        out.write_literal("default ")?;
        out.write_each(file.defaults(), Syntax::Input, None)?;
        out.write_literal("\n")?;
    }
    Ok(())
}

fn header(source: &Utf8Path) -> String {
    format!(
        "# Do not edit this file! It was automatically generated by ninja-synth.\n\
         # Instead, you should edit the source file that created this:\n\
         # {source}\n\n"
    )
}

/// `major.minor`, with `.patch` only when it is non-zero.
fn version_token(version: &Version) -> String {
    if version.patch == 0 {
        format!("{}.{}", version.major, version.minor)
    } else {
        format!("{}.{}.{}", version.major, version.minor, version.patch)
    }
}

fn write_variable<W: fmt::Write>(
    out: &mut Writer<'_, W>,
    name: &str,
    value: &Value,
    syntax: Syntax,
    indent: &str,
) -> Result<(), WriteError> {
    out.write_literal(indent)?;
    out.write_literal(name)?;
    out.write_literal(" = ")?;
    out.write_value(value, syntax)?;
    out.write_literal("\n")
}

fn write_rule<W: fmt::Write>(
    out: &mut Writer<'_, W>,
    name: &str,
    rule: &Rule,
) -> Result<(), WriteError> {
    out.write_literal("rule ")?;
    out.write_literal(name)?;
    out.write_literal("\n")?;

    write_variable(out, "command", &rule.command, Syntax::Shell, INDENT)?;
    write_kv!(out, "depfile", &rule.depfile);
    write_kv!(out, "deps", &rule.deps);
    write_flag!(out, "generator", rule.generator);
    write_kv!(out, "pool", &rule.pool.map(|pool| pool.as_str()));
    write_flag!(out, "restat", rule.restat);
    Ok(())
}

fn write_edge<W: fmt::Write>(out: &mut Writer<'_, W>, edge: &BuildEdge) -> Result<(), WriteError> {
    out.write_literal("build ")?;
    out.write_each(&edge.outputs, Syntax::Output, None)?;
    out.write_literal(": ")?;
    out.write_literal(&edge.rule)?;
    out.write_each(&edge.inputs, Syntax::Input, Some(" "))?;
    out.write_each(&edge.implicit, Syntax::Input, Some(" | "))?;
    out.write_each(&edge.order_only, Syntax::Input, Some(" || "))?;
    out.write_literal("\n")?;

    for (name, value) in &edge.variables {
        write_variable(out, name.name(), value, Syntax::Shell, INDENT)?;
    }
    Ok(())
}
