use regex::bytes::Regex;
use std::fmt;
use std::path::{Path, PathBuf};

/// What a rule looks for: an exact string or a regular expression.
#[derive(Debug, Clone)]
pub enum Matcher {
    /// Exact text; the replacement is inserted verbatim.
    Literal(String),
    /// Regular expression over raw bytes; the replacement is an expansion
    /// template (`$1`, `${name}`, `$$` for a literal dollar sign).
    Pattern(Regex),
}

impl Matcher {
    pub fn literal(text: impl Into<String>) -> Self {
        Matcher::Literal(text.into())
    }

    /// Compile `pattern` into a regex matcher.
    pub fn pattern(pattern: &str) -> Result<Self, regex::Error> {
        Regex::new(pattern).map(Matcher::Pattern)
    }

    /// A blank matcher can never describe a meaningful replacement.
    ///
    /// Literals that are empty or whitespace-only are blank, as is the empty
    /// regex (it matches between every character).
    pub fn is_blank(&self) -> bool {
        match self {
            Matcher::Literal(text) => text.trim().is_empty(),
            Matcher::Pattern(regex) => regex.as_str().is_empty(),
        }
    }
}

impl fmt::Display for Matcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Matcher::Literal(text) => write!(f, "{text:?}"),
            Matcher::Pattern(regex) => write!(f, "/{}/", regex.as_str()),
        }
    }
}

impl From<&str> for Matcher {
    fn from(text: &str) -> Self {
        Matcher::Literal(text.to_string())
    }
}

impl From<String> for Matcher {
    fn from(text: String) -> Self {
        Matcher::Literal(text)
    }
}

impl From<&String> for Matcher {
    fn from(text: &String) -> Self {
        Matcher::Literal(text.clone())
    }
}

impl From<Regex> for Matcher {
    fn from(regex: Regex) -> Self {
        Matcher::Pattern(regex)
    }
}

impl From<&Regex> for Matcher {
    fn from(regex: &Regex) -> Self {
        Matcher::Pattern(regex.clone())
    }
}

// Paths are matched by their displayed form, e.g. an install prefix baked
// into a build script.
impl From<&Path> for Matcher {
    fn from(path: &Path) -> Self {
        Matcher::Literal(path.display().to_string())
    }
}

impl From<&PathBuf> for Matcher {
    fn from(path: &PathBuf) -> Self {
        Matcher::from(path.as_path())
    }
}

impl From<PathBuf> for Matcher {
    fn from(path: PathBuf) -> Self {
        Matcher::from(path.as_path())
    }
}

/// A single find/replace pair.
#[derive(Debug, Clone)]
pub struct Rule {
    pub matcher: Matcher,
    pub replacement: String,
}

impl Rule {
    pub fn new(matcher: impl Into<Matcher>, replacement: impl Into<String>) -> Self {
        Self {
            matcher: matcher.into(),
            replacement: replacement.into(),
        }
    }
}

impl<M, R> From<(M, R)> for Rule
where
    M: Into<Matcher>,
    R: Into<String>,
{
    fn from((matcher, replacement): (M, R)) -> Self {
        Rule::new(matcher, replacement)
    }
}
