//! In-memory rewriting of a single file's content.
//!
//! [`TextBuffer`] holds the file's raw bytes and applies one rule at a time.
//! It never fails: a rule that matched nothing is recorded in the buffer's
//! error list (when validation is requested) so that callers can report every
//! miss at once. Content is never decoded, so files in any encoding survive a
//! rewrite byte for byte outside the replaced spans.

use crate::matcher::Matcher;
use regex::bytes::{Captures, Regex};
use std::borrow::Cow;
use tracing::trace;

/// Mutable file content plus the validation failures recorded against it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextBuffer {
    content: Vec<u8>,
    errors: Vec<String>,
}

impl TextBuffer {
    pub fn new(content: impl Into<Vec<u8>>) -> Self {
        Self {
            content: content.into(),
            errors: Vec::new(),
        }
    }

    /// Replace every non-overlapping occurrence of `matcher`, left to right.
    ///
    /// Returns the number of replacements made. With `validate` set, a
    /// matcher that occurs nowhere appends an error instead of failing.
    pub fn replace_all(&mut self, matcher: &Matcher, replacement: &str, validate: bool) -> usize {
        self.substitute(matcher, replacement, validate, 0)
    }

    /// Replace only the first occurrence of `matcher`.
    pub fn replace_first(&mut self, matcher: &Matcher, replacement: &str, validate: bool) -> usize {
        self.substitute(matcher, replacement, validate, 1)
    }

    pub fn content(&self) -> &[u8] {
        &self.content
    }

    /// Content decoded for display; invalid sequences become U+FFFD.
    pub fn text_lossy(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.content)
    }

    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    /// Record a failure from custom transformation logic.
    pub fn push_error(&mut self, message: impl Into<String>) {
        self.errors.push(message.into());
    }

    pub fn into_parts(self) -> (Vec<u8>, Vec<String>) {
        (self.content, self.errors)
    }

    /// Point every assignment of the Makefile variable `flag` at `new_value`.
    ///
    /// Handles `=`, `?=`, `+=`, `:=` and `!=` assignments, including values
    /// continued over several lines with a trailing backslash.
    pub fn change_make_var(&mut self, flag: &str, new_value: &str) {
        let matcher = Matcher::Pattern(make_var_assignment(flag));
        let template = format!("{flag}={}", new_value.replace('$', "$$"));
        if self.replace_all(&matcher, &template, false) == 0 {
            self.push_error(format!("expected to change {flag:?} to {new_value:?}"));
        }
    }

    /// Delete the assignment lines of each Makefile variable in `flags`.
    pub fn remove_make_var<S: AsRef<str>>(&mut self, flags: &[S]) {
        for flag in flags {
            let flag = flag.as_ref();
            let pattern = format!(
                r"(?m-u)^{}[ \t]*[\\?+:!]?=(?:.*\\\n)*.*$\n?",
                regex::escape(flag)
            );
            let matcher = Matcher::Pattern(
                Regex::new(&pattern).expect("escaped make variable pattern is valid"),
            );
            if self.replace_all(&matcher, "", false) == 0 {
                self.push_error(format!("expected to remove {flag:?}"));
            }
        }
    }

    /// Value of the first assignment of the Makefile variable `flag`.
    pub fn get_make_var(&self, flag: &str) -> Option<String> {
        make_var_assignment(flag)
            .captures(&self.content)
            .and_then(|caps| caps.get(1))
            .map(|value| String::from_utf8_lossy(value.as_bytes()).into_owned())
    }

    fn substitute(
        &mut self,
        matcher: &Matcher,
        replacement: &str,
        validate: bool,
        limit: usize,
    ) -> usize {
        let (rewritten, count) = match matcher {
            Matcher::Literal(needle) => {
                let regex = literal_regex(needle);
                replace_bytes(&self.content, &regex, limit, |_, dst| {
                    dst.extend_from_slice(replacement.as_bytes())
                })
            }
            Matcher::Pattern(regex) => replace_bytes(&self.content, regex, limit, |caps, dst| {
                caps.expand(replacement.as_bytes(), dst)
            }),
        };

        if let Some(rewritten) = rewritten {
            self.content = rewritten;
        }

        trace!(%matcher, count, "applied replacement");

        if count == 0 && validate {
            self.errors.push(format!(
                "expected replacement of {matcher} with {replacement:?}"
            ));
        }

        count
    }
}

/// Run `regex` over `content`, letting `expand` write each match's
/// replacement. `limit == 0` means unbounded.
fn replace_bytes<F>(
    content: &[u8],
    regex: &Regex,
    limit: usize,
    mut expand: F,
) -> (Option<Vec<u8>>, usize)
where
    F: FnMut(&Captures<'_>, &mut Vec<u8>),
{
    let mut count = 0;
    let rewritten = regex.replacen(content, limit, |caps: &Captures<'_>| {
        count += 1;
        let mut expanded = Vec::new();
        expand(caps, &mut expanded);
        expanded
    });

    match rewritten {
        Cow::Borrowed(_) => (None, count),
        Cow::Owned(bytes) => (Some(bytes), count),
    }
}

/// Literal needles are searched as escaped patterns so matching stays on
/// raw bytes.
fn literal_regex(needle: &str) -> Regex {
    Regex::new(&regex::escape(needle)).expect("escaped literal is a valid pattern")
}

fn make_var_assignment(flag: &str) -> Regex {
    let pattern = format!(
        r"(?m-u)^{}[ \t]*[\\?+:!]?=[ \t]*((?:.*\\\n)*.*)$",
        regex::escape(flag)
    );
    Regex::new(&pattern).expect("escaped make variable pattern is valid")
}
