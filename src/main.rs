use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use inreplace::config::{load_from_path, plan_base_dir, run_plan};
use inreplace::{Inreplace, InreplaceError, Matcher, Rewrite};
use serde_json::json;
use similar::{ChangeTag, TextDiff};
use std::path::{Path, PathBuf};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(name = "inreplace")]
#[command(about = "Validated in-place text substitution across files", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Replace text in one or more files
    Replace {
        /// Text (or regex with --regex) to look for
        before: String,

        /// Replacement text; with --regex, `$1` and `${name}` expand captures
        after: String,

        /// Files to rewrite in place
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Treat BEFORE as a regular expression
        #[arg(short, long)]
        regex: bool,

        /// Replace only the first occurrence in each file
        #[arg(long)]
        first: bool,

        /// Do not fail when BEFORE matches nothing
        #[arg(long)]
        no_validate: bool,

        /// Dry run - show what would be changed without modifying files
        #[arg(short = 'n', long)]
        dry_run: bool,

        /// Show unified diff of changes
        #[arg(short, long)]
        diff: bool,
    },

    /// Run every entry of a TOML replacement plan
    Apply {
        /// Path to the plan file
        #[arg(short, long)]
        plan: PathBuf,

        /// Directory that base-relative plan files resolve against
        /// (defaults to the plan's directory)
        #[arg(short, long)]
        base: Option<PathBuf>,

        /// Dry run - show what would be changed without modifying files
        #[arg(short = 'n', long)]
        dry_run: bool,

        /// Show unified diff of changes
        #[arg(short, long)]
        diff: bool,

        /// Print results as JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Commands::Replace {
            before,
            after,
            files,
            regex,
            first,
            no_validate,
            dry_run,
            diff,
        } => cmd_replace(
            before,
            after,
            files,
            ReplaceFlags {
                regex,
                first,
                no_validate,
                dry_run,
                diff,
            },
        ),

        Commands::Apply {
            plan,
            base,
            dry_run,
            diff,
            json,
        } => cmd_apply(plan, base, dry_run, diff, json),
    }
}

/// Diagnostics go to stderr, filtered by `RUST_LOG` (default `warn`).
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).compact())
        .init();
}

struct ReplaceFlags {
    regex: bool,
    first: bool,
    no_validate: bool,
    dry_run: bool,
    diff: bool,
}

fn cmd_replace(before: String, after: String, files: Vec<PathBuf>, flags: ReplaceFlags) -> Result<()> {
    let matcher = if flags.regex {
        Matcher::pattern(&before).with_context(|| format!("invalid pattern /{before}/"))?
    } else {
        Matcher::literal(before)
    };

    if flags.dry_run {
        println!("{}", "[DRY RUN - showing what would be changed]".cyan());
    }

    let result = Inreplace::new(files)
        .rule(matcher, after)
        .global(!flags.first)
        .validate(!flags.no_validate)
        .read_only(flags.dry_run)
        .run();

    match result {
        Ok(rewrites) => {
            for rewrite in &rewrites {
                report_rewrite(None, rewrite, flags.diff);
            }
            Ok(())
        }
        // Files that succeeded next to the failures may already be on disk.
        Err(InreplaceError::Replacement(err)) => {
            for rewrite in err.rewrites() {
                report_rewrite(None, rewrite, flags.diff);
            }
            Err(err.into())
        }
        Err(err) => Err(err.into()),
    }
}

fn cmd_apply(
    plan: PathBuf,
    base: Option<PathBuf>,
    dry_run: bool,
    show_diff: bool,
    json: bool,
) -> Result<()> {
    let config = load_from_path(&plan)?;
    let base = base.unwrap_or_else(|| plan_base_dir(&plan));

    if !json {
        println!("Plan: {}", plan.display());
        if !config.meta.name.is_empty() {
            println!("Name: {}", config.meta.name);
        }
        println!("Base: {}", base.display());
        if dry_run {
            println!("{}", "[DRY RUN - showing what would be changed]".cyan());
        }
        println!();
    }

    let results = run_plan(&config, &base, dry_run);
    let failed = results.iter().filter(|(_, result)| result.is_err()).count();

    if json {
        let entries: Vec<_> = results.iter().map(|(id, result)| entry_json(id, result)).collect();
        println!(
            "{}",
            serde_json::to_string_pretty(&json!({ "dry_run": dry_run, "entries": entries }))?
        );
    } else {
        for (id, result) in &results {
            match result {
                Ok(rewrites) => {
                    for rewrite in rewrites {
                        report_rewrite(Some(id.as_str()), rewrite, show_diff);
                    }
                }
                Err(InreplaceError::Replacement(err)) => {
                    for rewrite in err.rewrites() {
                        report_rewrite(Some(id.as_str()), rewrite, show_diff);
                    }
                    eprintln!("{} {}: inreplace failed", "✗".red(), id);
                    for entry in err.report().entries() {
                        eprintln!("  {}:", entry.key);
                        for message in &entry.messages {
                            eprintln!("    {}", message.red());
                        }
                    }
                }
                Err(err) => {
                    eprintln!("{} {}: Error - {}", "✗".red(), id, err);
                }
            }
        }

        println!();
        println!("{}", "Summary:".bold());
        println!(
            "  {} succeeded",
            format!("{}", results.len() - failed).green()
        );
        println!("  {} failed", format!("{}", failed).red());
    }

    if failed > 0 {
        std::process::exit(1);
    }

    Ok(())
}

fn entry_json(id: &str, result: &Result<Vec<Rewrite>, InreplaceError>) -> serde_json::Value {
    match result {
        Ok(rewrites) => json!({
            "id": id,
            "status": "ok",
            "files": files_json(rewrites),
        }),
        Err(InreplaceError::Replacement(err)) => json!({
            "id": id,
            "status": "failed",
            "files": files_json(err.rewrites()),
            "errors": err.report(),
        }),
        Err(err) => json!({
            "id": id,
            "status": "error",
            "message": err.to_string(),
        }),
    }
}

fn files_json(rewrites: &[Rewrite]) -> Vec<serde_json::Value> {
    rewrites
        .iter()
        .map(|rewrite| {
            json!({
                "path": rewrite.path.display().to_string(),
                "changed": rewrite.changed(),
                "written": rewrite.written,
            })
        })
        .collect()
}

fn report_rewrite(id: Option<&str>, rewrite: &Rewrite, show_diff: bool) {
    let marker = if rewrite.changed() {
        "✓".green()
    } else {
        "⊙".yellow()
    };
    match id {
        Some(id) => println!("{} {}: {}", marker, id, rewrite),
        None => println!("{} {}", marker, rewrite),
    }

    if show_diff && rewrite.changed() {
        display_diff(&rewrite.path, &rewrite.original, &rewrite.content);
    }
}

/// Helper: Show unified diff between original and rewritten content
///
/// Bytes that are not UTF-8 are shown as U+FFFD; the files keep them.
fn display_diff(file: &Path, original: &[u8], rewritten: &[u8]) {
    let original = String::from_utf8_lossy(original);
    let rewritten = String::from_utf8_lossy(rewritten);

    println!(
        "\n{}",
        format!("--- {} (original)", file.display()).dimmed()
    );
    println!("{}", format!("+++ {} (rewritten)", file.display()).dimmed());

    let diff = TextDiff::from_lines(&*original, &*rewritten);

    for change in diff.iter_all_changes() {
        let sign = match change.tag() {
            ChangeTag::Delete => format!("-{}", change).red(),
            ChangeTag::Insert => format!("+{}", change).green(),
            ChangeTag::Equal => format!(" {}", change).normal(),
        };
        print!("{}", sign);
    }
}
