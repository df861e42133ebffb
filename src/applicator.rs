//! Replacement orchestrator - drives text buffers over files on disk
//!
//! This module provides the two public entry points:
//! - [`Inreplace`] (and the [`inreplace`] / [`inreplace_with`] shorthands)
//!   applies one rule or one custom transform to a batch of files
//! - [`inreplace_pairs`] applies an ordered list of rules to one file, with
//!   an optional read-only run
//!
//! Parameter and validation failures are collected into a single
//! [`ReplacementError`]; I/O failures abort immediately.

use crate::atomic::{atomic_write, read_content};
use crate::buffer::TextBuffer;
use crate::error::{ErrorReport, InreplaceError, ReplacementError, ReportKey};
use crate::matcher::{Matcher, Rule};
use crate::transform::{Substitution, Transform};
use std::borrow::Cow;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Outcome for one file of a successful run.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use = "Rewrite reports whether the file was actually written"]
pub struct Rewrite {
    pub path: PathBuf,
    /// Bytes as read from disk
    pub original: Vec<u8>,
    /// Bytes after every replacement
    pub content: Vec<u8>,
    /// False for read-only runs and for files whose content did not change
    pub written: bool,
}

impl Rewrite {
    pub fn changed(&self) -> bool {
        self.original != self.content
    }

    /// Rewritten content decoded for display.
    pub fn text_lossy(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.content)
    }
}

impl fmt::Display for Rewrite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.changed(), self.written) {
            (true, true) => write!(f, "Rewrote {}", self.path.display()),
            (true, false) => write!(f, "Would rewrite {}", self.path.display()),
            (false, _) => write!(f, "Unchanged {}", self.path.display()),
        }
    }
}

/// A batch replacement over one or more files.
///
/// Exactly one of [`Inreplace::rule`] or [`Inreplace::transform`] must be
/// supplied before [`Inreplace::run`].
///
/// # Example
///
/// ```no_run
/// use inreplace::{Inreplace, Matcher};
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// Inreplace::new(["Makefile", "config.mk"])
///     .rule("/usr/local", "/opt/homebrew")
///     .run()?;
///
/// Inreplace::new(["configure"])
///     .rule(Matcher::pattern(r"-march=\S+")?, "")
///     .global(false)
///     .run()?;
/// # Ok(())
/// # }
/// ```
#[must_use = "Inreplace does nothing until run() is called"]
pub struct Inreplace<'a> {
    paths: Vec<PathBuf>,
    rule: Option<Rule>,
    transform: Option<Box<dyn Transform + 'a>>,
    global: bool,
    validate: bool,
    read_only: bool,
}

impl<'a> Inreplace<'a> {
    pub fn new<I, P>(paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        Self {
            paths: paths.into_iter().map(Into::into).collect(),
            rule: None,
            transform: None,
            global: true,
            validate: true,
            read_only: false,
        }
    }

    /// Replace `before` with `after` in every file.
    pub fn rule(mut self, before: impl Into<Matcher>, after: impl Into<String>) -> Self {
        self.rule = Some(Rule::new(before, after));
        self
    }

    /// Hand each file's buffer to custom logic instead of a single rule.
    pub fn transform(mut self, transform: impl Transform + 'a) -> Self {
        self.transform = Some(Box::new(transform));
        self
    }

    /// Replace every occurrence (default) or only the first.
    pub fn global(mut self, global: bool) -> Self {
        self.global = global;
        self
    }

    /// Report rules that matched nothing (default on).
    pub fn validate(mut self, validate: bool) -> Self {
        self.validate = validate;
        self
    }

    /// Compute every rewrite without touching the files.
    pub fn read_only(mut self, read_only: bool) -> Self {
        self.read_only = read_only;
        self
    }

    /// Apply the rule or transform to each file in order.
    ///
    /// Parameter problems fail the run before any file is read. Otherwise
    /// every file is processed; a file is written only when its own buffer
    /// recorded no errors, even if a sibling failed. All validation failures
    /// are returned together once the batch is done, along with the rewrites
    /// of the files that succeeded.
    pub fn run(self) -> Result<Vec<Rewrite>, InreplaceError> {
        let Inreplace {
            paths,
            rule,
            transform,
            global,
            validate,
            read_only,
        } = self;

        let mut report = ErrorReport::new();

        if paths.iter().all(|path| is_blank_path(path)) {
            report.push(ReportKey::parameter("paths"), "`paths` was empty");
        }

        let transform: Option<Box<dyn Transform + 'a>> = match (rule, transform) {
            (Some(rule), None) => {
                if rule.matcher.is_blank() {
                    report.push(
                        ReportKey::parameter("rule"),
                        format!(
                            "no matcher given for replacement {:?}; were the arguments swapped?",
                            rule.replacement
                        ),
                    );
                    None
                } else {
                    Some(Box::new(Substitution {
                        rule,
                        global,
                        validate,
                    }))
                }
            }
            (None, Some(transform)) => Some(transform),
            (None, None) => {
                report.push(
                    ReportKey::parameter("rule"),
                    "must supply a rule or a transform",
                );
                None
            }
            (Some(_), Some(_)) => {
                report.push(
                    ReportKey::parameter("rule"),
                    "cannot supply both a rule and a transform",
                );
                None
            }
        };

        let Some(mut transform) = transform.filter(|_| report.is_empty()) else {
            return Err(ReplacementError::new(report).into());
        };

        let mut rewrites = Vec::with_capacity(paths.len());

        for path in paths {
            debug!(path = %path.display(), "applying replacement");

            let original = read_content(&path)?;
            let mut buffer = TextBuffer::new(original.clone());
            transform.apply(&mut buffer);
            let (content, errors) = buffer.into_parts();

            if !errors.is_empty() {
                warn!(
                    path = %path.display(),
                    failures = errors.len(),
                    "replacement did not match"
                );
                report.extend(ReportKey::File(path), errors);
                continue;
            }

            let written = persist(&path, &original, &content, read_only)?;
            if written {
                info!(path = %path.display(), "rewrote file");
            }
            rewrites.push(Rewrite {
                path,
                original,
                content,
                written,
            });
        }

        if report.is_empty() {
            Ok(rewrites)
        } else {
            Err(ReplacementError::new(report).with_rewrites(rewrites).into())
        }
    }
}

/// Replace `before` with `after` everywhere in each of `paths`.
pub fn inreplace<I, P>(
    paths: I,
    before: impl Into<Matcher>,
    after: impl Into<String>,
) -> Result<(), InreplaceError>
where
    I: IntoIterator<Item = P>,
    P: Into<PathBuf>,
{
    Inreplace::new(paths).rule(before, after).run().map(drop)
}

/// Run custom buffer logic over each of `paths`.
///
/// ```no_run
/// use inreplace::{inreplace_with, TextBuffer};
///
/// # fn main() -> Result<(), inreplace::InreplaceError> {
/// inreplace_with(["Makefile"], |s: &mut TextBuffer| {
///     s.change_make_var("PREFIX", "/opt/homebrew");
///     s.remove_make_var(&["MANDIR"]);
/// })?;
/// # Ok(())
/// # }
/// ```
pub fn inreplace_with<I, P, T>(paths: I, transform: T) -> Result<(), InreplaceError>
where
    I: IntoIterator<Item = P>,
    P: Into<PathBuf>,
    T: Transform,
{
    Inreplace::new(paths).transform(transform).run().map(drop)
}

/// Options for [`inreplace_pairs`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PairsOptions {
    /// Compute the result without writing it back.
    pub read_only: bool,
    /// Suppress the informational log line for the rewrite.
    pub silent: bool,
}

/// Apply `pairs` to `path` in order and return the resulting content.
///
/// Each pair sees the text as left by the pairs before it. A pair with a
/// blank matcher is skipped and reported. Any failure aborts the write and
/// is returned as a single-file [`ReplacementError`].
pub fn inreplace_pairs(
    path: impl AsRef<Path>,
    pairs: &[Rule],
    options: PairsOptions,
) -> Result<Vec<u8>, InreplaceError> {
    rewrite_pairs(path.as_ref(), pairs, options).map(|rewrite| rewrite.content)
}

pub(crate) fn rewrite_pairs(
    path: &Path,
    pairs: &[Rule],
    options: PairsOptions,
) -> Result<Rewrite, InreplaceError> {
    let original = read_content(path)?;
    let mut buffer = TextBuffer::new(original.clone());

    for Rule {
        matcher,
        replacement,
    } in pairs
    {
        if matcher.is_blank() {
            buffer.push_error(format!(
                "no matcher given for replacement {replacement:?}; were the arguments swapped?"
            ));
            continue;
        }
        buffer.replace_all(matcher, replacement, true);
    }

    let (content, errors) = buffer.into_parts();
    if !errors.is_empty() {
        let mut report = ErrorReport::new();
        report.extend(ReportKey::file(path), errors);
        return Err(ReplacementError::new(report).into());
    }

    let written = persist(path, &original, &content, options.read_only)?;
    if !options.silent {
        info!(path = %path.display(), pairs = pairs.len(), written, "applied replacement pairs");
    }

    Ok(Rewrite {
        path: path.to_path_buf(),
        original,
        content,
        written,
    })
}

/// Write `content` unless this is a read-only run or nothing changed.
fn persist(
    path: &Path,
    original: &[u8],
    content: &[u8],
    read_only: bool,
) -> Result<bool, InreplaceError> {
    if read_only || original == content {
        return Ok(false);
    }
    atomic_write(path, content)?;
    debug!(path = %path.display(), bytes = content.len(), "wrote file");
    Ok(true)
}

fn is_blank_path(path: &Path) -> bool {
    path.to_string_lossy().trim().is_empty()
}
