//! Command line interface definition using clap.

use crate::platform::Platform;
use camino::Utf8PathBuf;
use clap::Parser;

/// Generate a Ninja build file from a build plan.
#[derive(Debug, Clone, Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to the build plan (YAML, or JSON when the name ends in `.json`).
    #[arg(short, long, value_name = "FILE", default_value = "build.plan.yml")]
    pub file: Utf8PathBuf,

    /// Where to write the Ninja file; `-` writes to standard output.
    #[arg(short, long, value_name = "FILE", default_value = "build.ninja")]
    pub output: Utf8PathBuf,

    /// Platform the generated commands will run on.
    #[arg(long, value_enum, value_name = "PLATFORM")]
    pub platform: Option<Platform>,

    /// Enable verbose logging output.
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    /// Whether output goes to standard output.
    #[must_use]
    pub fn writes_stdout(&self) -> bool {
        self.output.as_str() == "-"
    }
}
