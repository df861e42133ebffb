//! Plan runner - executes every entry of a replacement plan
//!
//! Single before/after entries go through the batch orchestrator, pair lists
//! through the single-file pair path. Each entry gets its own result so one
//! failing entry never hides the others.

use crate::applicator::{rewrite_pairs, Inreplace, PairsOptions, Rewrite};
use crate::config::schema::{ReplaceConfig, ReplacementDefinition};
use crate::error::{ErrorReport, InreplaceError, ReplacementError, ReportKey};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Run `config` against the files it names.
///
/// With `dry_run` set, every entry is evaluated but nothing is written.
pub fn run_plan(
    config: &ReplaceConfig,
    base_dir: &Path,
    dry_run: bool,
) -> Vec<(String, Result<Vec<Rewrite>, InreplaceError>)> {
    config
        .replacements
        .iter()
        .map(|entry| {
            debug!(id = %entry.id, dry_run, "running replacement entry");
            let files = resolve_files(entry, base_dir, config.meta.base_relative);
            (entry.id.clone(), run_entry(entry, files, dry_run))
        })
        .collect()
}

fn resolve_files(entry: &ReplacementDefinition, base_dir: &Path, base_relative: bool) -> Vec<PathBuf> {
    entry
        .files
        .iter()
        .map(|file| {
            if base_relative {
                base_dir.join(file)
            } else {
                PathBuf::from(file)
            }
        })
        .collect()
}

fn run_entry(
    entry: &ReplacementDefinition,
    files: Vec<PathBuf>,
    dry_run: bool,
) -> Result<Vec<Rewrite>, InreplaceError> {
    // Plans are validated on load; a pattern error here means the plan was
    // built in code and skipped validation.
    let invalid_pattern = |err: regex::Error| {
        let mut report = ErrorReport::new();
        report.push(ReportKey::parameter("rule"), err.to_string());
        InreplaceError::from(ReplacementError::new(report))
    };

    if let Some(rule) = entry.rule().map_err(invalid_pattern)? {
        return Inreplace::new(files)
            .rule(rule.matcher, rule.replacement)
            .global(entry.global)
            .validate(entry.validate)
            .read_only(dry_run)
            .run();
    }

    let pairs = entry.pair_rules().map_err(invalid_pattern)?;
    let options = PairsOptions {
        read_only: dry_run,
        silent: false,
    };
    files
        .iter()
        .map(|file| rewrite_pairs(file, &pairs, options))
        .collect()
}
