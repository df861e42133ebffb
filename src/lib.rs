//! Inreplace: validated in-place text substitution across files
//!
//! Rewrites files with literal or regex find/replace rules, checks that
//! every rule actually matched, and reports every miss across every file in
//! one aggregate error. Content is handled as raw bytes, so files in any
//! encoding can be rewritten.
//!
//! # Architecture
//!
//! All rewriting goes through a [`TextBuffer`], which applies one rule at a
//! time and records rules that matched nothing instead of failing. The
//! orchestrator ([`Inreplace`], [`inreplace_pairs`]) loads files, drives
//! buffers through a [`Transform`], collects the recorded failures into an
//! [`ErrorReport`], and persists results.
//!
//! # Safety
//!
//! - Atomic file writes (tempfile + fsync + rename), permissions preserved
//! - A file with its own validation failures is never written
//! - Parameter problems are caught before any file is read
//! - I/O failures abort immediately instead of being aggregated
//!
//! # Example
//!
//! ```no_run
//! use inreplace::{inreplace, inreplace_pairs, Matcher, PairsOptions, Rule};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! inreplace(["Makefile"], "/usr/local", "/opt/homebrew")?;
//!
//! let preview = inreplace_pairs(
//!     "configure",
//!     &[
//!         Rule::new(Matcher::pattern(r"-O\d")?, "-O2"),
//!         Rule::new("gcc", "cc"),
//!     ],
//!     PairsOptions { read_only: true, silent: false },
//! )?;
//! println!("{}", String::from_utf8_lossy(&preview));
//! # Ok(())
//! # }
//! ```

pub mod applicator;
pub mod atomic;
pub mod buffer;
pub mod config;
pub mod error;
pub mod matcher;
pub mod transform;

// Re-exports
pub use applicator::{inreplace, inreplace_pairs, inreplace_with, Inreplace, PairsOptions, Rewrite};
pub use atomic::atomic_write;
pub use buffer::TextBuffer;
pub use config::{load_from_path, load_from_str, run_plan, ConfigError, ReplaceConfig};
pub use error::{ErrorReport, InreplaceError, ReplacementError, ReportEntry, ReportKey};
pub use matcher::{Matcher, Rule};
pub use transform::{Substitution, Transform};
