use crate::applicator::Rewrite;
use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Where a reported problem belongs: a target file or a caller parameter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "name", rename_all = "snake_case")]
pub enum ReportKey {
    Parameter(String),
    File(PathBuf),
}

impl ReportKey {
    pub fn parameter(name: impl Into<String>) -> Self {
        ReportKey::Parameter(name.into())
    }

    pub fn file(path: impl Into<PathBuf>) -> Self {
        ReportKey::File(path.into())
    }
}

impl fmt::Display for ReportKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReportKey::Parameter(name) => write!(f, "`{name}` parameter"),
            ReportKey::File(path) => write!(f, "{}", path.display()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportEntry {
    pub key: ReportKey,
    pub messages: Vec<String>,
}

/// Every problem found during one invocation, in the order it was found.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ErrorReport {
    entries: Vec<ReportEntry>,
}

impl ErrorReport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one message under `key`.
    pub fn push(&mut self, key: ReportKey, message: impl Into<String>) {
        self.extend(key, std::iter::once(message.into()));
    }

    /// Append messages under `key`, merging with an existing entry for it.
    /// An empty `messages` leaves the report untouched.
    pub fn extend(&mut self, key: ReportKey, messages: impl IntoIterator<Item = String>) {
        let mut messages = messages.into_iter().peekable();
        if messages.peek().is_none() {
            return;
        }
        match self.entries.iter_mut().find(|entry| entry.key == key) {
            Some(entry) => entry.messages.extend(messages),
            None => self.entries.push(ReportEntry {
                key,
                messages: messages.collect(),
            }),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn entries(&self) -> &[ReportEntry] {
        &self.entries
    }

    pub fn get(&self, key: &ReportKey) -> Option<&[String]> {
        self.entries
            .iter()
            .find(|entry| &entry.key == key)
            .map(|entry| entry.messages.as_slice())
    }

    /// Messages recorded for a file path.
    pub fn for_file(&self, path: impl AsRef<Path>) -> Option<&[String]> {
        self.get(&ReportKey::file(path.as_ref()))
    }

    /// Files with at least one failure, in report order.
    pub fn files(&self) -> impl Iterator<Item = &Path> {
        self.entries.iter().filter_map(|entry| match &entry.key {
            ReportKey::File(path) => Some(path.as_path()),
            ReportKey::Parameter(_) => None,
        })
    }
}

impl fmt::Display for ErrorReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for entry in &self.entries {
            writeln!(f, "{}:", entry.key)?;
            for message in &entry.messages {
                writeln!(f, "  {message}")?;
            }
        }
        Ok(())
    }
}

/// Aggregate of every parameter and validation failure of one invocation.
///
/// Files that succeeded alongside the failures are kept with the report; in
/// a writing run they are already on disk.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("inreplace failed\n{report}")]
pub struct ReplacementError {
    pub report: ErrorReport,
    pub rewrites: Vec<Rewrite>,
}

impl ReplacementError {
    pub fn new(report: ErrorReport) -> Self {
        Self {
            report,
            rewrites: Vec::new(),
        }
    }

    pub fn with_rewrites(mut self, rewrites: Vec<Rewrite>) -> Self {
        self.rewrites = rewrites;
        self
    }

    pub fn report(&self) -> &ErrorReport {
        &self.report
    }

    pub fn rewrites(&self) -> &[Rewrite] {
        &self.rewrites
    }
}

#[derive(Error, Debug)]
pub enum InreplaceError {
    #[error(transparent)]
    Replacement(#[from] ReplacementError),

    #[error("failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl InreplaceError {
    /// The aggregate report, when this is a replacement failure.
    pub fn report(&self) -> Option<&ErrorReport> {
        match self {
            InreplaceError::Replacement(err) => Some(&err.report),
            _ => None,
        }
    }
}
