//! Fragment rendering for the three syntactic positions of a Ninja file.

use crate::command::Arg;
use crate::config::GeneratorConfig;
use crate::ir::Value;
use crate::platform::Platform;
use crate::safe_str::{FormatError, Fragment, check_newline};
use crate::shell;
use miette::Diagnostic;
use std::borrow::Cow;
use std::{fmt, io};
use thiserror::Error;

/// Position a fragment is written into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Syntax {
    /// Build outputs: `$`, `:` and space are escaped.
    Output,
    /// Build inputs and defaults: `$` and space are escaped.
    Input,
    /// Variable values and commands: `$` is doubled and plain text is
    /// shell-quoted according to the [`Quoting`] mode.
    Shell,
    /// Path-section values: `$` is doubled, nothing is shell-quoted.
    Clean,
}

/// How plain text is shell-quoted in [`Syntax::Shell`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Quoting {
    /// Quote each word that needs it.
    Quote,
    /// Escape embedded quotes but leave wrapping to the caller.
    Escape,
    /// Emit text as-is.
    Never,
}

/// Errors raised while rendering a build file.
#[derive(Debug, Error, Diagnostic)]
pub enum WriteError {
    /// A fragment contains a newline.
    #[error(transparent)]
    #[diagnostic(transparent)]
    Format(#[from] FormatError),

    /// A value that has no textual form reached the writer.
    #[error("cannot render {what}")]
    #[diagnostic(
        code(ninja_synth::write::type_mismatch),
        help("declare the value through BuildFile so tool references are converted")
    )]
    TypeMismatch {
        /// Description of the value.
        what: String,
    },

    /// The output stream failed.
    #[error("failed to write build file")]
    #[diagnostic(code(ninja_synth::write::io))]
    Io(#[from] io::Error),

    /// The formatting sink refused a write.
    #[error("formatting sink refused a write")]
    #[diagnostic(code(ninja_synth::write::sink))]
    Sink,
}

/// Escape `text` for `syntax`.
///
/// # Errors
///
/// Returns [`FormatError`] if `text` contains a newline.
///
/// # Examples
///
/// ```
/// use ninja_synth::ninja_gen::{Syntax, escape_str};
///
/// assert_eq!(escape_str("c:/a b", Syntax::Output)?, "c$:/a$ b");
/// assert_eq!(escape_str("c:/a b", Syntax::Input)?, "c:/a$ b");
/// assert_eq!(escape_str("$x y", Syntax::Shell)?, "$$x y");
/// # Ok::<(), ninja_synth::safe_str::FormatError>(())
/// ```
pub fn escape_str(text: &str, syntax: Syntax) -> Result<Cow<'_, str>, FormatError> {
    check_newline(text)?;
    let special = |ch: char| match syntax {
        Syntax::Output => matches!(ch, '$' | ':' | ' '),
        Syntax::Input => matches!(ch, '$' | ' '),
        Syntax::Shell | Syntax::Clean => ch == '$',
    };
    if !text.contains(special) {
        return Ok(Cow::Borrowed(text));
    }
    let mut escaped = String::with_capacity(text.len() + 4);
    for ch in text.chars() {
        if special(ch) {
            escaped.push('$');
        }
        escaped.push(ch);
    }
    Ok(Cow::Owned(escaped))
}

/// Streams fragments into a [`fmt::Write`] sink.
///
/// Every `write*` method reports whether the text it produced required
/// shell quoting; paths use that flag to decide whether to wrap the whole
/// resolved path in quotes.
#[derive(Debug)]
pub struct Writer<'a, W> {
    out: W,
    config: &'a GeneratorConfig,
}

impl<'a, W: fmt::Write> Writer<'a, W> {
    /// A writer rendering for `config`.
    #[must_use]
    pub const fn new(out: W, config: &'a GeneratorConfig) -> Self {
        Self { out, config }
    }

    /// Recover the sink.
    #[must_use]
    pub fn into_inner(self) -> W {
        self.out
    }

    /// Platform commands are rendered for.
    #[must_use]
    pub const fn platform(&self) -> Platform {
        self.config.platform
    }

    /// Emit `text` verbatim.
    ///
    /// # Errors
    ///
    /// Returns [`WriteError::Sink`] if the sink refuses the write.
    pub fn write_literal(&mut self, text: &str) -> Result<(), WriteError> {
        self.out.write_str(text).map_err(|_| WriteError::Sink)
    }

    /// Render `fragment` into `syntax`, returning whether shell quoting was
    /// needed.
    ///
    /// # Errors
    ///
    /// Returns [`WriteError`] if any text contains a newline or the sink
    /// fails.
    pub fn write(
        &mut self,
        fragment: &Fragment,
        syntax: Syntax,
        quoting: Quoting,
    ) -> Result<bool, WriteError> {
        let shelly = syntax == Syntax::Shell;
        match fragment {
            Fragment::Literal(text) => {
                check_newline(text)?;
                self.write_literal(text)?;
                Ok(true)
            }
            Fragment::ShellLiteral(text) => {
                self.write_literal(&escape_str(text, syntax)?)?;
                Ok(true)
            }
            Fragment::Plain(text) => {
                let (text, escaped) = match (shelly, quoting) {
                    (true, Quoting::Quote) => {
                        let (quoted, escaped) = shell::quote_info(text);
                        (Cow::Owned(quoted), escaped)
                    }
                    (true, Quoting::Escape) => shell::escape(text),
                    _ => (Cow::Borrowed(text.as_str()), false),
                };
                self.write_literal(&escape_str(&text, syntax)?)?;
                Ok(escaped)
            }
            Fragment::Concat(parts) => parts.iter().try_fold(false, |escaped, part| {
                Ok(self.write(part, syntax, quoting)? || escaped)
            }),
            Fragment::Path(path) => {
                let realized = path.realize(&self.config.path_vars);
                let mut inner = Writer::new(String::new(), self.config);
                let escaped = inner.write(&realized, syntax, Quoting::Escape)?;
                let text = inner.into_inner();
                self.write_literal(&shell::quote_escaped(&text, shelly && escaped))?;
                Ok(escaped)
            }
        }
    }

    /// Render `fragments` separated by single spaces. `prefix` is written
    /// first unless `fragments` is empty.
    ///
    /// # Errors
    ///
    /// Returns [`WriteError`] if a fragment cannot be rendered.
    pub fn write_each(
        &mut self,
        fragments: &[Fragment],
        syntax: Syntax,
        prefix: Option<&str>,
    ) -> Result<(), WriteError> {
        for (idx, fragment) in fragments.iter().enumerate() {
            match (idx, prefix) {
                (0, Some(prefix)) => self.write_literal(prefix)?,
                (0, None) => {}
                _ => self.write_literal(" ")?,
            }
            self.write(fragment, syntax, Quoting::Quote)?;
        }
        Ok(())
    }

    /// Render command arguments separated by single spaces, quoting each
    /// word that needs it.
    ///
    /// # Errors
    ///
    /// Returns [`WriteError::TypeMismatch`] for a tool reference that was
    /// never converted to a variable.
    pub fn write_args(
        &mut self,
        args: &[Arg],
        syntax: Syntax,
        prefix: Option<&str>,
    ) -> Result<(), WriteError> {
        for (idx, arg) in args.iter().enumerate() {
            match (idx, prefix) {
                (0, Some(prefix)) => self.write_literal(prefix)?,
                (0, None) => {}
                _ => self.write_literal(" ")?,
            }
            match arg {
                Arg::Text(fragment) => {
                    self.write(fragment, syntax, Quoting::Quote)?;
                }
                Arg::Tool(tool) => {
                    return Err(WriteError::TypeMismatch {
                        what: format!("unconverted tool reference `{}`", tool.command_var()),
                    });
                }
            }
        }
        Ok(())
    }

    /// Render the right-hand side of an assignment.
    ///
    /// Single values are never shell-quoted, word lists are quoted word by
    /// word, and command sequences render themselves.
    ///
    /// # Errors
    ///
    /// Returns [`WriteError`] if any part cannot be rendered.
    pub fn write_value(&mut self, value: &Value, syntax: Syntax) -> Result<(), WriteError> {
        match value {
            Value::Text(fragment) => self.write(fragment, syntax, Quoting::Never).map(drop),
            Value::Words(args) => self.write_args(args, syntax, None),
            Value::Commands(commands) => commands.render(self),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::Tool;
    use crate::ir::Variable;
    use crate::path::{BuildPath, InstallRoot, Root};
    use rstest::{fixture, rstest};

    #[fixture]
    fn config() -> GeneratorConfig {
        GeneratorConfig::for_platform(Platform::Linux)
    }

    fn render(config: &GeneratorConfig, fragment: &Fragment, syntax: Syntax) -> (String, bool) {
        let mut out = Writer::new(String::new(), config);
        let escaped = out
            .write(fragment, syntax, Quoting::Quote)
            .expect("render fragment");
        (out.into_inner(), escaped)
    }

    #[rstest]
    #[case(Syntax::Output, "a:b $c", "a$:b$ $$c")]
    #[case(Syntax::Input, "a:b $c", "a:b$ $$c")]
    #[case(Syntax::Shell, "a:b $c", "a:b $$c")]
    #[case(Syntax::Clean, "a:b $c", "a:b $$c")]
    fn escape_str_per_syntax(#[case] syntax: Syntax, #[case] text: &str, #[case] expected: &str) {
        assert_eq!(escape_str(text, syntax).expect("escape"), expected);
    }

    #[rstest]
    fn escape_str_rejects_newline() {
        assert!(escape_str("a\nb", Syntax::Input).is_err());
    }

    #[rstest]
    #[case(Fragment::plain("main.c"), "main.c", false)]
    #[case(Fragment::plain("my file.c"), "'my file.c'", true)]
    #[case(Fragment::plain("it's"), "'it'\"'\"'s'", true)]
    #[case(Fragment::plain("$x"), "'$$x'", true)]
    #[case(Fragment::literal("$out"), "$out", true)]
    #[case(Fragment::shell_literal("&&"), "&&", true)]
    #[case(Fragment::shell_literal("$$"), "$$$$", true)]
    fn shell_position(
        config: GeneratorConfig,
        #[case] fragment: Fragment,
        #[case] expected: &str,
        #[case] escaped: bool,
    ) {
        assert_eq!(
            render(&config, &fragment, Syntax::Shell),
            (expected.to_owned(), escaped)
        );
    }

    #[rstest]
    fn plain_text_is_never_quoted_outside_shell(config: GeneratorConfig) {
        let fragment = Fragment::plain("my file.c");
        assert_eq!(
            render(&config, &fragment, Syntax::Output),
            ("my$ file.c".to_owned(), false)
        );
    }

    #[rstest]
    fn concat_ors_quoting_flags(config: GeneratorConfig) {
        let fragment = Fragment::concat([Fragment::plain("-I"), Fragment::plain("a b")]);
        assert_eq!(
            render(&config, &fragment, Syntax::Shell),
            ("-I'a b'".to_owned(), true)
        );
    }

    #[rstest]
    fn builddir_path_stays_bare(config: GeneratorConfig) {
        let path = Fragment::Path(BuildPath::from_components(Root::BuildDir, ["a", "b.o"]));
        assert_eq!(render(&config, &path, Syntax::Shell), ("a/b.o".to_owned(), false));
        assert_eq!(render(&config, &path, Syntax::Output), ("a/b.o".to_owned(), false));
    }

    #[rstest]
    fn builddir_variable_is_never_escaped(config: GeneratorConfig) {
        let mut vars = config.path_vars.clone();
        vars.set(Root::BuildDir, Some(Variable::new("builddir")));
        let with_builddir = config.with_path_vars(vars);
        let path = Fragment::Path(BuildPath::from_components(Root::BuildDir, ["a b", "c:d.o"]));
        assert_eq!(
            render(&with_builddir, &path, Syntax::Output),
            ("${builddir}/a$ b/c$:d.o".to_owned(), true)
        );
    }

    #[rstest]
    fn srcdir_path_is_quoted_as_a_whole(config: GeneratorConfig) {
        let path = Fragment::Path(BuildPath::srcdir("my dir/it's.c"));
        assert_eq!(
            render(&config, &path, Syntax::Shell),
            ("'${srcdir}/my dir/it'\"'\"'s.c'".to_owned(), true)
        );
        assert_eq!(
            render(&config, &path, Syntax::Input),
            ("${srcdir}/my$ dir/it's.c".to_owned(), true)
        );
    }

    #[rstest]
    fn install_path_carries_destdir(config: GeneratorConfig) {
        let path = Fragment::Path(BuildPath::install(InstallRoot::BinDir, "app"));
        assert_eq!(
            render(&config, &path, Syntax::Output),
            ("${DESTDIR}${bindir}/app".to_owned(), true)
        );
    }

    #[rstest]
    fn write_each_applies_prefix_only_when_non_empty(config: GeneratorConfig) {
        let mut out = Writer::new(String::new(), &config);
        out.write_each(&[], Syntax::Input, Some(" | "))
            .expect("empty list");
        out.write_each(
            &[Fragment::plain("a"), Fragment::plain("b c")],
            Syntax::Input,
            Some(" | "),
        )
        .expect("two inputs");
        assert_eq!(out.into_inner(), " | a b$ c");
    }

    #[rstest]
    fn unconverted_tools_are_a_type_mismatch(config: GeneratorConfig) {
        let mut out = Writer::new(String::new(), &config);
        let err = out
            .write_value(&Value::words([Arg::from(Tool::new("cc", "gcc"))]), Syntax::Shell)
            .expect_err("tool must be converted first");
        assert!(matches!(err, WriteError::TypeMismatch { .. }));
    }

    #[rstest]
    fn text_values_are_not_shell_quoted(config: GeneratorConfig) {
        let mut out = Writer::new(String::new(), &config);
        out.write_value(&Value::from("-O2 -g"), Syntax::Shell)
            .expect("render value");
        assert_eq!(out.into_inner(), "-O2 -g");
    }
}
