//! Diagnostics for plan files that fail to parse.
//!
//! YAML syntax errors from `serde_saphyr` carry a line and column, which are
//! turned into a [`miette`] source span with a hint for common mistakes.
//! Structural errors from `serde_json` carry no offsets and are reported with
//! the plan name only.

// The miette/thiserror derives trip `unused_assignments` on some toolchains
// but not others, so `#[expect]` cannot be used.
#![allow(
    clippy::allow_attributes,
    clippy::allow_attributes_without_reason,
    unused_assignments
)]

use miette::{Diagnostic, NamedSource, SourceSpan};
use serde_saphyr::{Error as YamlError, Location};
use thiserror::Error;

const YAML_HINTS: [(&str, &str); 3] = [
    (
        "did not find expected '-'",
        "Start list items with '-' and ensure proper indentation.",
    ),
    (
        "mapping values are not allowed",
        "Check for a stray ':' or add quotes around values where needed.",
    ),
    (
        "found character that cannot start any token",
        "Quote values that begin with characters such as '@' or '`'.",
    ),
];

/// Error raised when a plan cannot be parsed.
#[derive(Debug, Error, Diagnostic)]
pub enum PlanError {
    /// The plan is not valid YAML or JSON, or does not match the schema.
    #[error("failed to parse build plan {name}")]
    #[diagnostic(code(ninja_synth::plan::parse))]
    Parse {
        /// Display name of the plan.
        name: String,
        /// Underlying diagnostic reported by the parser.
        #[source]
        #[diagnostic_source]
        source: Box<dyn Diagnostic + Send + Sync + 'static>,
    },
}

#[derive(Debug, Error, Diagnostic)]
#[error("{message}")]
#[diagnostic(code(ninja_synth::plan::yaml))]
struct YamlDiagnostic {
    #[source_code]
    src: NamedSource<String>,
    #[label("parse error here")]
    span: Option<SourceSpan>,
    #[help]
    help: Option<String>,
    #[source]
    source: YamlError,
    message: String,
}

#[derive(Debug, Error, Diagnostic)]
#[error("{message}")]
#[diagnostic(code(ninja_synth::plan::structure))]
struct DataDiagnostic {
    #[source]
    source: serde_json::Error,
    message: String,
}

/// Byte offset of a one-based line and column, clamped to the line end.
fn byte_index(src: &str, line: u64, column: u64) -> usize {
    let target_line = usize::try_from(line.saturating_sub(1)).unwrap_or(usize::MAX);
    let target_column = usize::try_from(column.saturating_sub(1)).unwrap_or(usize::MAX);
    let mut offset = 0usize;
    for (idx, segment) in src.split_inclusive('\n').enumerate() {
        if idx == target_line {
            let line = segment.trim_end_matches(['\n', '\r']);
            let column_offset = line
                .char_indices()
                .nth(target_column)
                .map_or(line.len(), |(byte_idx, _)| byte_idx);
            return offset + column_offset;
        }
        offset += segment.len();
    }
    src.len()
}

fn to_span(src: &str, loc: Location) -> SourceSpan {
    let at = byte_index(src, loc.line(), loc.column());
    let len = src
        .get(at..)
        .and_then(|rest| rest.chars().next())
        .filter(|ch| !matches!(ch, '\n' | '\r'))
        .map_or(0, char::len_utf8);
    SourceSpan::new(at.into(), len)
}

fn hint_for(message: &str, src: &str, loc: Option<Location>) -> Option<String> {
    let tab_indented = loc.is_some_and(|loc| {
        let line_idx = usize::try_from(loc.line().saturating_sub(1)).unwrap_or(usize::MAX);
        src.lines()
            .nth(line_idx)
            .is_some_and(|line| line.chars().take_while(|c| c.is_whitespace()).any(|c| c == '\t'))
    });
    if tab_indented {
        return Some("Use spaces for indentation; tabs are invalid in YAML.".into());
    }
    let lower = message.to_lowercase();
    YAML_HINTS
        .iter()
        .find(|(needle, _)| lower.contains(needle))
        .map(|(_, hint)| (*hint).to_owned())
}

/// Wrap a YAML syntax error in a diagnostic pointing at the offending text.
#[must_use]
pub fn map_yaml_error(err: YamlError, src: &str, name: &str) -> PlanError {
    let loc = err.location();
    let (line, col, span) = loc.map_or((1, 1, None), |loc| {
        (loc.line(), loc.column(), Some(to_span(src, loc)))
    });
    let err_str = err.to_string();
    let help = hint_for(&err_str, src, loc);
    PlanError::Parse {
        name: name.to_owned(),
        source: Box::new(YamlDiagnostic {
            src: NamedSource::new(name, src.to_owned()),
            span,
            help,
            source: err,
            message: format!("YAML parse error at line {line}, column {col}: {err_str}"),
        }),
    }
}

/// Wrap a structural error from deserialising the plan.
#[must_use]
pub fn map_data_error(err: serde_json::Error, name: &str) -> PlanError {
    PlanError::Parse {
        name: name.to_owned(),
        source: Box::new(DataDiagnostic {
            message: format!("plan {name} does not match the expected structure: {err}"),
            source: err,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::{Context, Result, anyhow, ensure};

    #[test]
    fn yaml_errors_hint_at_tabs() -> Result<()> {
        let src = "\trules: \"unterminated";
        let Err(err) = serde_saphyr::from_str::<serde_json::Value>(src) else {
            return Err(anyhow!("expected YAML parse error"));
        };
        let PlanError::Parse { source, .. } = map_yaml_error(err, src, "plan.yml");
        let help = source.help().map(|help| help.to_string()).unwrap_or_default();
        ensure!(
            help.contains("Use spaces for indentation"),
            "missing tab hint: {help}"
        );
        Ok(())
    }

    #[test]
    fn structure_errors_name_the_plan() -> Result<()> {
        let err = serde_json::from_str::<serde_json::Value>("{\"rules\":}")
            .err()
            .context("expected JSON error")?;
        let PlanError::Parse { source, .. } = map_data_error(err, "plan.json");
        ensure!(source.to_string().contains("plan.json"), "name missing");
        let code = source
            .code()
            .map(|code| code.to_string())
            .context("structure diagnostic should expose a code")?;
        ensure!(code == "ninja_synth::plan::structure", "unexpected code {code}");
        Ok(())
    }

    #[test]
    fn byte_index_handles_multibyte_characters() {
        let src = "a: x\ncaf\u{e9}: [\n";
        assert_eq!(byte_index(src, 2, 5), "a: x\ncaf\u{e9}".len());
        assert_eq!(byte_index(src, 2, 99), "a: x\ncaf\u{e9}: [".len());
        assert_eq!(byte_index(src, 9, 1), src.len());
    }
}
