//! # shapecheck-cli: Command-Line Interface
//!
//! Thin clap-based surface over `shapecheck-schema`.
//!
//! ## Subcommands
//!
//! - `validate`: validate JSON/YAML documents against a registered schema
//! - `list`: list the schema ids found in a schema directory
//!
//! ## Exit codes
//!
//! - `0`: every document is valid
//! - `1`: at least one document has violations
//! - `2`: operational error (unreadable input, malformed schema, unknown id)
//!
//! ## Crate Policy
//!
//! - Argument parsing is separated from handler logic.
//! - Handlers delegate validation to `shapecheck-schema`; no rules live here.

use std::path::Path;

use anyhow::{Context, Result};
use shapecheck_schema::{ShapeChecker, ValidatorConfig};

pub mod list;
pub mod validate;

/// Exit code for a clean run.
pub const EXIT_OK: u8 = 0;
/// Exit code when a document has violations.
pub const EXIT_VIOLATIONS: u8 = 1;
/// Exit code for operational errors.
pub const EXIT_ERROR: u8 = 2;

/// Build a checker from every schema file in `dir`.
pub fn load_checker(dir: &Path, config: ValidatorConfig) -> Result<ShapeChecker> {
    let mut checker = ShapeChecker::with_config(config);
    let added = checker
        .load_dir(dir)
        .with_context(|| format!("failed to load schemas from {}", dir.display()))?;
    tracing::info!(schema_count = added, dir = %dir.display(), "loaded schema registry");
    Ok(checker)
}
