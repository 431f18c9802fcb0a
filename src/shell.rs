//! POSIX shell quoting helpers.
//!
//! Quoting is split into two steps so callers can escape several pieces
//! independently and wrap the combined text once: [`escape`] reports whether
//! a word needs quoting and prepares embedded single quotes, while
//! [`quote_escaped`] adds the surrounding quotes.

use std::borrow::Cow;

/// Characters that never require quoting.
fn is_safe(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || matches!(ch, '_' | '@' | '%' | '+' | ':' | ',' | '.' | '/' | '-')
}

/// Prepare `word` for single-quoting.
///
/// Returns the text with each `'` replaced by `'"'"'` and whether the word
/// needs surrounding quotes. Safe words and the empty string are returned
/// unchanged.
///
/// # Examples
///
/// ```
/// use ninja_synth::shell::escape;
///
/// assert_eq!(escape("main.c"), ("main.c".into(), false));
/// assert_eq!(escape("it's"), ("it'\"'\"'s".into(), true));
/// ```
#[must_use]
pub fn escape(word: &str) -> (Cow<'_, str>, bool) {
    if word.chars().all(is_safe) {
        return (Cow::Borrowed(word), false);
    }
    (Cow::Owned(word.replace('\'', "'\"'\"'")), true)
}

/// Wrap already-escaped text in single quotes when `escaped` is set.
#[must_use]
pub fn quote_escaped(text: &str, escaped: bool) -> Cow<'_, str> {
    if escaped {
        Cow::Owned(format!("'{text}'"))
    } else {
        Cow::Borrowed(text)
    }
}

/// Quote `word` for a POSIX shell, reporting whether quoting was applied.
#[must_use]
pub fn quote_info(word: &str) -> (String, bool) {
    let (text, escaped) = escape(word);
    (quote_escaped(&text, escaped).into_owned(), escaped)
}

/// Quote `word` for a POSIX shell.
///
/// # Examples
///
/// ```
/// use ninja_synth::shell::quote;
///
/// assert_eq!(quote("out file"), "'out file'");
/// assert_eq!(quote("-O2"), "-O2");
/// ```
#[must_use]
pub fn quote(word: &str) -> String {
    quote_info(word).0
}

/// Quote each word and join them with single spaces.
#[must_use]
pub fn join<I>(words: I) -> String
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    words
        .into_iter()
        .map(|word| quote(word.as_ref()))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Split a command string into words using POSIX shell rules.
///
/// Returns `None` when the string has unbalanced quotes.
#[must_use]
pub fn split(command: &str) -> Option<Vec<String>> {
    shlex::split(command)
}
