use crate::matcher::{Matcher, Rule};
use serde::Deserialize;
use std::fmt;

#[derive(Debug, Deserialize, Default, Clone)]
pub struct ReplaceConfig {
    #[serde(default)]
    pub meta: Metadata,
    #[serde(default, rename = "replace")]
    pub replacements: Vec<ReplacementDefinition>,
}

impl ReplaceConfig {
    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut issues = Vec::new();

        if self.replacements.is_empty() {
            issues.push(ValidationIssue::EmptyPlan);
        }

        for entry in &self.replacements {
            let entry_id = if entry.id.trim().is_empty() {
                issues.push(ValidationIssue::MissingField {
                    entry_id: None,
                    field: "id",
                });
                None
            } else {
                Some(entry.id.clone())
            };

            if entry.files.iter().all(|file| file.trim().is_empty()) {
                issues.push(ValidationIssue::MissingField {
                    entry_id: entry_id.clone(),
                    field: "files",
                });
            }

            match (&entry.before, &entry.after) {
                (Some(_), None) => issues.push(ValidationIssue::MissingField {
                    entry_id: entry_id.clone(),
                    field: "after",
                }),
                (None, Some(_)) => issues.push(ValidationIssue::MissingField {
                    entry_id: entry_id.clone(),
                    field: "before",
                }),
                _ => {}
            }

            let has_rule = entry.before.is_some() || entry.after.is_some();
            let has_pairs = !entry.pairs.is_empty();
            if has_rule && has_pairs {
                issues.push(ValidationIssue::InvalidCombo {
                    entry_id: entry_id.clone(),
                    message: "before/after and pairs cannot both be given".to_string(),
                });
            }
            if !has_rule && !has_pairs {
                issues.push(ValidationIssue::InvalidCombo {
                    entry_id: entry_id.clone(),
                    message: "either before/after or pairs is required".to_string(),
                });
            }
            if has_pairs && entry.files.len() != 1 {
                issues.push(ValidationIssue::InvalidCombo {
                    entry_id: entry_id.clone(),
                    message: format!(
                        "pairs apply to exactly one file, found {}",
                        entry.files.len()
                    ),
                });
            }
            if has_pairs && !entry.global {
                issues.push(ValidationIssue::InvalidCombo {
                    entry_id: entry_id.clone(),
                    message: "pairs always replace every occurrence".to_string(),
                });
            }

            if entry.regex {
                let patterns = entry
                    .before
                    .iter()
                    .chain(entry.pairs.iter().map(|pair| &pair.before));
                for pattern in patterns {
                    if let Err(err) = regex::bytes::Regex::new(pattern) {
                        issues.push(ValidationIssue::InvalidPattern {
                            entry_id: entry_id.clone(),
                            pattern: pattern.clone(),
                            message: err.to_string(),
                        });
                    }
                }
            }
        }

        if issues.is_empty() {
            Ok(())
        } else {
            Err(ValidationError { issues })
        }
    }
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct Metadata {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    /// Resolve `files` against the base directory passed to the runner.
    #[serde(default)]
    pub base_relative: bool,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ReplacementDefinition {
    pub id: String,
    #[serde(default)]
    pub files: Vec<String>,
    #[serde(default)]
    pub before: Option<String>,
    #[serde(default)]
    pub after: Option<String>,
    #[serde(default)]
    pub pairs: Vec<PairDefinition>,
    /// Treat every `before` as a regular expression.
    #[serde(default)]
    pub regex: bool,
    #[serde(default = "default_true")]
    pub global: bool,
    #[serde(default = "default_true")]
    pub validate: bool,
}

#[derive(Debug, Deserialize, Clone)]
pub struct PairDefinition {
    #[serde(default)]
    pub before: String,
    pub after: String,
}

fn default_true() -> bool {
    true
}

impl ReplacementDefinition {
    /// The single before/after rule, if this entry has one.
    pub fn rule(&self) -> Result<Option<Rule>, regex::Error> {
        match (&self.before, &self.after) {
            (Some(before), Some(after)) => Ok(Some(Rule::new(self.matcher(before)?, after))),
            _ => Ok(None),
        }
    }

    /// The ordered pair list as rules.
    pub fn pair_rules(&self) -> Result<Vec<Rule>, regex::Error> {
        self.pairs
            .iter()
            .map(|pair| Ok(Rule::new(self.matcher(&pair.before)?, &pair.after)))
            .collect()
    }

    fn matcher(&self, before: &str) -> Result<Matcher, regex::Error> {
        if self.regex {
            Matcher::pattern(before)
        } else {
            Ok(Matcher::literal(before))
        }
    }
}

#[derive(Debug, Clone)]
pub struct ValidationError {
    pub issues: Vec<ValidationIssue>,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, issue) in self.issues.iter().enumerate() {
            if idx > 0 {
                writeln!(f)?;
            }
            write!(f, "{issue}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationError {}

#[derive(Debug, Clone)]
pub enum ValidationIssue {
    EmptyPlan,
    MissingField {
        entry_id: Option<String>,
        field: &'static str,
    },
    InvalidCombo {
        entry_id: Option<String>,
        message: String,
    },
    InvalidPattern {
        entry_id: Option<String>,
        pattern: String,
        message: String,
    },
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationIssue::EmptyPlan => write!(f, "replacement plan contains no entries"),
            ValidationIssue::MissingField { entry_id, field } => match entry_id {
                Some(id) => write!(f, "entry '{id}' missing required field '{field}'"),
                None => write!(f, "entry missing required field '{field}'"),
            },
            ValidationIssue::InvalidCombo { entry_id, message } => match entry_id {
                Some(id) => write!(f, "entry '{id}' has invalid configuration: {message}"),
                None => write!(f, "invalid entry configuration: {message}"),
            },
            ValidationIssue::InvalidPattern {
                entry_id,
                pattern,
                message,
            } => match entry_id {
                Some(id) => write!(f, "entry '{id}' has invalid pattern /{pattern}/: {message}"),
                None => write!(f, "invalid pattern /{pattern}/: {message}"),
            },
        }
    }
}
