//! Ninja build file synthesis.
//!
//! This library turns typed build-graph declarations into a Ninja file with
//! correct escaping for every syntactic position. Front-ends build a
//! [`ir::BuildFile`] from [`safe_str::Fragment`]s, [`path::BuildPath`]s and
//! [`command::Commands`], and [`ninja_gen`] renders it in one pass.
//!
//! ```
//! use ninja_synth::command::CommandLine;
//! use ninja_synth::config::GeneratorConfig;
//! use ninja_synth::ir::{BuildEdge, BuildFile, RuleOptions, Variable};
//! use ninja_synth::platform::Platform;
//!
//! let mut file = BuildFile::new("build.bfg", GeneratorConfig::for_platform(Platform::Linux));
//! let (input, output) = (Variable::new("in"), Variable::new("out"));
//! file.rule("cc", CommandLine::args([input.use_var(), output.use_var()]), RuleOptions::default())?;
//! file.build(BuildEdge::new(["main.o"], "cc").with_inputs(["main.c"]))?;
//! let ninja = file.to_ninja_string()?;
//! assert!(ninja.contains("rule cc\n  command = ${in} ${out}\n\nbuild main.o: cc main.c\n"));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod cli;
pub mod command;
pub mod config;
pub mod ir;
pub mod ninja_gen;
pub mod path;
pub mod plan;
pub mod platform;
pub mod runner;
pub mod safe_str;
pub mod shell;
