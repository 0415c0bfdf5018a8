//! # Validate Subcommand
//!
//! Loads a schema directory, then validates each document against one
//! registered schema id. Documents are processed independently: a document
//! that cannot be read is reported and the remaining documents still run.

use std::io::Write;
use std::path::PathBuf;

use anyhow::{bail, Result};
use clap::{Args, ValueEnum};
use serde_json::{json, Value};
use shapecheck_schema::{load_document, ValidatorConfig, DEFAULT_MAX_DEPTH};

use crate::{EXIT_ERROR, EXIT_OK, EXIT_VIOLATIONS};

/// Report format.
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// One PASS/FAIL line per document, then one line per violation.
    #[default]
    Text,
    /// A JSON array with one report object per document.
    Json,
}

/// Arguments for `shapecheck validate`.
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Directory holding `<id>.schema.{json,yaml,yml}` files.
    #[arg(long, value_name = "DIR")]
    pub schemas: PathBuf,

    /// Id of the schema to validate against.
    #[arg(long, value_name = "ID")]
    pub schema: String,

    /// Deepest data nesting level that is still validated.
    #[arg(long, default_value_t = DEFAULT_MAX_DEPTH)]
    pub max_depth: usize,

    /// Report format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// JSON or YAML documents to validate.
    #[arg(value_name = "DOCUMENT", required = true)]
    pub documents: Vec<PathBuf>,
}

/// Execute the validate subcommand, writing the report to `out`.
///
/// Returns the process exit code.
pub fn run_validate(args: &ValidateArgs, out: &mut impl Write) -> Result<u8> {
    let config = ValidatorConfig {
        max_depth: args.max_depth,
    };
    let checker = crate::load_checker(&args.schemas, config)?;

    // The library treats an unknown id as a silent pass; on the command
    // line that would hide a typo.
    if !checker.has(&args.schema) {
        bail!(
            "schema \"{}\" is not registered in {}",
            args.schema,
            args.schemas.display()
        );
    }

    let mut had_violations = false;
    let mut had_errors = false;
    let mut reports: Vec<Value> = Vec::new();

    for document in &args.documents {
        let data = match load_document(document) {
            Ok(data) => data,
            Err(e) => {
                tracing::warn!(document = %document.display(), error = %e, "document not loaded");
                had_errors = true;
                match args.format {
                    OutputFormat::Text => writeln!(out, "ERROR {}: {e}", document.display())?,
                    OutputFormat::Json => reports.push(json!({
                        "document": document.display().to_string(),
                        "error": e.to_string(),
                    })),
                }
                continue;
            }
        };

        let result = checker.validate(&args.schema, &data);
        had_violations |= result.is_err();

        match (args.format, result) {
            (OutputFormat::Text, Ok(())) => writeln!(out, "PASS {}", document.display())?,
            (OutputFormat::Text, Err(err)) => {
                writeln!(out, "FAIL {}", document.display())?;
                for violation in err.violations() {
                    writeln!(out, "  {violation}")?;
                }
            }
            (OutputFormat::Json, Ok(())) => reports.push(json!({
                "document": document.display().to_string(),
                "valid": true,
                "violations": [],
            })),
            (OutputFormat::Json, Err(err)) => reports.push(json!({
                "document": document.display().to_string(),
                "valid": false,
                "violations": err.to_json(),
            })),
        }
    }

    if args.format == OutputFormat::Json {
        writeln!(out, "{}", serde_json::to_string_pretty(&reports)?)?;
    }

    Ok(if had_errors {
        EXIT_ERROR
    } else if had_violations {
        EXIT_VIOLATIONS
    } else {
        EXIT_OK
    })
}
