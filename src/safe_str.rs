//! Composable string values with deferred escaping.
//!
//! A [`Fragment`] records *how* a piece of text must be escaped rather than
//! the escaped text itself. The decision is made only when the fragment is
//! written into a concrete syntactic position by
//! [`crate::ninja_gen::Writer`], which is what allows a path or a shell word
//! to be reused verbatim across output, input and command positions.
//!
//! ```
//! use ninja_synth::safe_str::{Fragment, Renderable};
//!
//! let flag = Fragment::concat([Fragment::plain("-I"), Fragment::literal("${srcdir}")]);
//! assert!(flag.validate().is_ok());
//! assert_eq!("main.o".to_fragment(), Fragment::plain("main.o"));
//! ```

use crate::path::BuildPath;
use std::fmt;
use thiserror::Error;

/// Raised when a value cannot be represented in the line-oriented syntax.
#[derive(Debug, Clone, PartialEq, Eq, Error, miette::Diagnostic)]
#[error("illegal newline in {text:?}")]
#[diagnostic(code(ninja_synth::syntax::illegal_newline))]
pub struct FormatError {
    /// The offending text.
    pub text: String,
}

impl FormatError {
    fn newline(text: &str) -> Self {
        Self {
            text: text.to_owned(),
        }
    }
}

/// Fail with [`FormatError`] when `text` contains a raw newline.
///
/// # Errors
///
/// Returns [`FormatError`] if `text` contains `\n`.
pub fn check_newline(text: &str) -> Result<(), FormatError> {
    if text.contains('\n') {
        Err(FormatError::newline(text))
    } else {
        Ok(())
    }
}

/// A piece of text together with the escaping it requires.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Fragment {
    /// Emitted verbatim, never escaped.
    Literal(String),
    /// Escaped for the backend's variable sigil only; never shell-quoted.
    ShellLiteral(String),
    /// Ordinary text, backend-escaped and shell-quoted when required.
    Plain(String),
    /// Parts rendered in sequence.
    Concat(Vec<Fragment>),
    /// A symbolic path resolved against the path variables at render time.
    Path(BuildPath),
}

impl Fragment {
    /// Verbatim text.
    #[must_use]
    pub fn literal(text: impl Into<String>) -> Self {
        Self::Literal(text.into())
    }

    /// Text that is a shell operator or otherwise pre-quoted for the shell.
    #[must_use]
    pub fn shell_literal(text: impl Into<String>) -> Self {
        Self::ShellLiteral(text.into())
    }

    /// Ordinary text.
    #[must_use]
    pub fn plain(text: impl Into<String>) -> Self {
        Self::Plain(text.into())
    }

    /// Concatenate `parts`, flattening nested concatenations.
    #[must_use]
    pub fn concat<I>(parts: I) -> Self
    where
        I: IntoIterator,
        I::Item: Renderable,
    {
        let mut flat = Vec::new();
        for part in parts {
            match part.to_fragment() {
                Self::Concat(inner) => flat.extend(inner),
                other => flat.push(other),
            }
        }
        Self::Concat(flat)
    }

    /// Join `items` with `delim` between each pair.
    #[must_use]
    pub fn join<I>(items: I, delim: &str) -> Self
    where
        I: IntoIterator,
        I::Item: Renderable,
    {
        let mut parts = Vec::new();
        for (idx, item) in items.into_iter().enumerate() {
            if idx > 0 {
                parts.push(Self::plain(delim));
            }
            parts.push(item.to_fragment());
        }
        Self::Concat(parts)
    }

    /// Check that no part of this fragment contains a newline.
    ///
    /// # Errors
    ///
    /// Returns [`FormatError`] naming the first offending text.
    pub fn validate(&self) -> Result<(), FormatError> {
        match self {
            Self::Literal(text) | Self::ShellLiteral(text) | Self::Plain(text) => {
                check_newline(text)
            }
            Self::Concat(parts) => parts.iter().try_for_each(Self::validate),
            Self::Path(path) => path.validate(),
        }
    }
}

impl fmt::Display for Fragment {
    /// Unescaped text, with paths shown symbolically.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Literal(text) | Self::ShellLiteral(text) | Self::Plain(text) => {
                f.write_str(text)
            }
            Self::Concat(parts) => parts.iter().try_for_each(|part| part.fmt(f)),
            Self::Path(path) => path.fmt(f),
        }
    }
}

/// Anything that can be turned into a [`Fragment`].
///
/// Front-ends pass strings, variables and paths into the IR through this
/// trait; each implementor decides which escaping its text needs.
pub trait Renderable {
    /// Produce the fragment describing this value.
    fn to_fragment(&self) -> Fragment;
}

impl Renderable for Fragment {
    fn to_fragment(&self) -> Fragment {
        self.clone()
    }
}

impl Renderable for str {
    fn to_fragment(&self) -> Fragment {
        Fragment::plain(self)
    }
}

impl Renderable for String {
    fn to_fragment(&self) -> Fragment {
        Fragment::plain(self.as_str())
    }
}

impl<T: Renderable + ?Sized> Renderable for &T {
    fn to_fragment(&self) -> Fragment {
        (**self).to_fragment()
    }
}

impl From<&str> for Fragment {
    fn from(text: &str) -> Self {
        Self::plain(text)
    }
}

impl From<String> for Fragment {
    fn from(text: String) -> Self {
        Self::Plain(text)
    }
}

impl From<BuildPath> for Fragment {
    fn from(path: BuildPath) -> Self {
        Self::Path(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn concat_flattens_nested_parts() {
        let inner = Fragment::concat(["a", "b"]);
        let outer = Fragment::concat([inner, Fragment::literal("c")]);
        assert_eq!(
            outer,
            Fragment::Concat(vec![
                Fragment::plain("a"),
                Fragment::plain("b"),
                Fragment::literal("c"),
            ])
        );
    }

    #[rstest]
    fn join_places_delimiter_between_items() {
        let joined = Fragment::join(["x", "y", "z"], ":");
        let Fragment::Concat(parts) = joined else {
            panic!("join should produce a concatenation");
        };
        assert_eq!(parts.len(), 5);
        assert_eq!(parts.get(1), Some(&Fragment::plain(":")));
    }

    #[rstest]
    #[case(Fragment::plain("a\nb"))]
    #[case(Fragment::literal("\n"))]
    #[case(Fragment::concat([Fragment::plain("ok"), Fragment::shell_literal("x\ny")]))]
    fn validate_rejects_newlines(#[case] fragment: Fragment) {
        let err = fragment.validate().expect_err("newline must be rejected");
        assert!(err.text.contains('\n'));
    }

    #[rstest]
    fn display_shows_unescaped_text() {
        let fragment = Fragment::concat([
            Fragment::plain("a b"),
            Fragment::literal("${x}"),
            Fragment::Path(BuildPath::builddir("out.o")),
        ]);
        assert_eq!(fragment.to_string(), "a b${x}out.o");
    }

    #[rstest]
    fn validate_accepts_single_line_text() {
        assert!(Fragment::plain("a b:c$d").validate().is_ok());
    }
}
