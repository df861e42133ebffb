pub mod loader;
pub mod runner;
pub mod schema;

pub use loader::{load_from_path, load_from_str, plan_base_dir, ConfigError};
pub use runner::run_plan;
pub use schema::{
    Metadata, PairDefinition, ReplaceConfig, ReplacementDefinition, ValidationError,
    ValidationIssue,
};
