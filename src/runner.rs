//! CLI execution logic.
//!
//! This module keeps `main` minimal: it loads the build plan, applies it to
//! a [`crate::ir::BuildFile`] and writes the rendered Ninja file.

use crate::cli::Cli;
use crate::plan;
use anyhow::{Context, Result};
use camino::Utf8Path;
use std::io::{self, BufWriter};
use tempfile::NamedTempFile;
use tracing::{debug, info};

/// Execute the parsed [`Cli`].
///
/// # Errors
///
/// Returns an error if the plan cannot be loaded or applied, or the output
/// cannot be written.
pub fn run(cli: &Cli) -> Result<()> {
    let plan = plan::from_path(&cli.file)?;
    let file = plan
        .build_file(cli.platform)
        .with_context(|| format!("applying build plan {}", cli.file))?;
    debug!(
        platform = %file.config().platform,
        rules = file.rules().len(),
        edges = file.edges().len(),
        "built IR"
    );

    if cli.writes_stdout() {
        let stdout = io::stdout();
        file.write(BufWriter::new(stdout.lock()))
            .context("writing Ninja file to standard output")?;
        return Ok(());
    }
    write_atomically(&cli.output, |out| {
        file.write(out).map_err(anyhow::Error::from)
    })
}

/// Write to a temporary file next to `path` and move it into place only when
/// `render` succeeds, so a failed run never leaves a partial file behind.
fn write_atomically<F>(path: &Utf8Path, render: F) -> Result<()>
where
    F: FnOnce(&mut BufWriter<&std::fs::File>) -> Result<()>,
{
    let dir = match path.parent() {
        Some(parent) if !parent.as_str().is_empty() => parent,
        _ => Utf8Path::new("."),
    };
    let tmp = NamedTempFile::new_in(dir)
        .with_context(|| format!("creating temporary file in {dir}"))?;
    {
        let mut out = BufWriter::new(tmp.as_file());
        render(&mut out).with_context(|| format!("rendering {path}"))?;
    }
    tmp.persist(path)
        .with_context(|| format!("writing Ninja file to {path}"))?;
    info!("Generated Ninja file at {path}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::{anyhow, ensure};
    use camino::Utf8PathBuf;
    use tempfile::TempDir;

    fn utf8_dir(dir: &TempDir) -> Result<Utf8PathBuf> {
        Utf8PathBuf::from_path_buf(dir.path().to_path_buf())
            .map_err(|path| anyhow!("non UTF-8 temp dir {}", path.display()))
    }

    #[test]
    fn failed_render_leaves_no_file() -> Result<()> {
        let dir = TempDir::new()?;
        let target = utf8_dir(&dir)?.join("build.ninja");
        let result = write_atomically(&target, |_| Err(anyhow!("boom")));
        ensure!(result.is_err(), "render failure must propagate");
        ensure!(!target.exists(), "no partial file may remain");
        ensure!(
            std::fs::read_dir(dir.path())?.next().is_none(),
            "temporary file must be cleaned up"
        );
        Ok(())
    }

    #[test]
    fn successful_render_is_persisted() -> Result<()> {
        let dir = TempDir::new()?;
        let target = utf8_dir(&dir)?.join("build.ninja");
        write_atomically(&target, |out| {
            io::Write::write_all(out, b"default all\n")?;
            Ok(())
        })?;
        ensure!(std::fs::read_to_string(&target)? == "default all\n");
        Ok(())
    }
}
