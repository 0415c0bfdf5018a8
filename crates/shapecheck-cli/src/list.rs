//! # List Subcommand
//!
//! Prints the ids registered from a schema directory, one per line.

use std::io::Write;
use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use shapecheck_schema::ValidatorConfig;

use crate::EXIT_OK;

/// Arguments for `shapecheck list`.
#[derive(Args, Debug)]
pub struct ListArgs {
    /// Directory holding `<id>.schema.{json,yaml,yml}` files.
    #[arg(long, value_name = "DIR")]
    pub schemas: PathBuf,
}

/// Execute the list subcommand, writing to `out`.
pub fn run_list(args: &ListArgs, out: &mut impl Write) -> Result<u8> {
    let checker = crate::load_checker(&args.schemas, ValidatorConfig::default())?;
    for id in checker.registry().ids() {
        writeln!(out, "{id}")?;
    }
    Ok(EXIT_OK)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_prints_sorted_ids() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("b.schema.json"), r#"{"type": "number"}"#).unwrap();
        std::fs::write(dir.path().join("a.schema.yml"), "type: string\n").unwrap();

        let mut out = Vec::new();
        let code = run_list(
            &ListArgs {
                schemas: dir.path().to_path_buf(),
            },
            &mut out,
        )
        .unwrap();

        assert_eq!(code, EXIT_OK);
        assert_eq!(String::from_utf8(out).unwrap(), "a\nb\n");
    }

    #[test]
    fn test_list_missing_directory_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = run_list(
            &ListArgs {
                schemas: dir.path().join("absent"),
            },
            &mut Vec::new(),
        );
        assert!(result.is_err());
    }
}
