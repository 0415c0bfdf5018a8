//! # Error Types
//!
//! All errors use `thiserror` for derive-based `Display` and `Error`
//! implementations.
//!
//! - [`ValidationError`] is the only error a validation run produces. It is
//!   returned exactly once per [`ShapeChecker::validate`] call and carries
//!   every violation found, in emission order.
//! - [`SchemaDefinitionError`] is raised while turning a key/value
//!   definition into a typed [`Schema`].
//! - [`SchemaLoadError`] covers file and directory loading.
//!
//! Registry misuse (re-adding an id, validating against an unknown id) is
//! not an error. Those cases are logged and ignored.
//!
//! [`ShapeChecker::validate`]: crate::ShapeChecker::validate
//! [`Schema`]: crate::Schema

use std::path::PathBuf;

use thiserror::Error;

use crate::violation::Violation;

/// The document did not satisfy its schema.
///
/// `Display` renders the serialized violation list, e.g.
/// `[{"path":"$","value":"12","type":"number","message":"Invalid value type"}]`.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{}", render_violations(.violations))]
pub struct ValidationError {
    violations: Vec<Violation>,
}

impl ValidationError {
    /// Wrap a non-empty violation list.
    pub fn new(violations: Vec<Violation>) -> Self {
        Self { violations }
    }

    /// Error class name reported to callers that dispatch on it.
    pub fn name(&self) -> &'static str {
        "ValidationError"
    }

    /// Violations in depth-first emission order.
    pub fn violations(&self) -> &[Violation] {
        &self.violations
    }

    /// Number of violations carried.
    pub fn len(&self) -> usize {
        self.violations.len()
    }

    /// True if no violation is carried.
    pub fn is_empty(&self) -> bool {
        self.violations.is_empty()
    }

    /// Consumes self and returns the inner list.
    pub fn into_violations(self) -> Vec<Violation> {
        self.violations
    }

    /// The serialized violation list as a JSON value.
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::Value::Array(self.violations.iter().map(Violation::to_json).collect())
    }
}

fn render_violations(violations: &[Violation]) -> String {
    match serde_json::to_string(violations) {
        Ok(json) => json,
        Err(_) => violations
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("\n"),
    }
}

/// A schema definition could not be turned into a typed [`Schema`](crate::Schema).
///
/// `pointer` is a JSON Pointer into the definition, rooted at `#`.
#[derive(Error, Debug)]
pub enum SchemaDefinitionError {
    /// A schema node must be a key/value object.
    #[error("schema node at '{pointer}' must be an object, found {found}")]
    NotAnObject {
        /// Location of the node.
        pointer: String,
        /// JSON type name of what was found instead.
        found: &'static str,
    },

    /// A constraint keyword has a value of the wrong shape.
    #[error("invalid \"{keyword}\" at '{pointer}': {reason}")]
    InvalidKeyword {
        /// Location of the node owning the keyword.
        pointer: String,
        /// The offending keyword.
        keyword: &'static str,
        /// What was expected.
        reason: String,
    },

    /// A `pattern` keyword does not compile.
    #[error("invalid \"pattern\" at '{pointer}': {source}")]
    InvalidPattern {
        /// Location of the node owning the pattern.
        pointer: String,
        /// Regex compilation error.
        #[source]
        source: regex::Error,
    },
}

/// A schema file, schema directory, or document could not be loaded.
#[derive(Error, Debug)]
pub enum SchemaLoadError {
    /// The file or directory could not be read.
    #[error("cannot read '{}': {source}", .path.display())]
    Io {
        /// Path that failed.
        path: PathBuf,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// The file is not valid JSON or YAML.
    #[error("cannot parse '{}': {reason}", .path.display())]
    Parse {
        /// Path that failed.
        path: PathBuf,
        /// Parser message.
        reason: String,
    },

    /// The file parsed but is not a valid schema definition.
    #[error("invalid schema definition in '{}': {source}", .path.display())]
    Definition {
        /// Path of the schema file.
        path: PathBuf,
        /// Definition error.
        #[source]
        source: SchemaDefinitionError,
    },
}

/// Umbrella error for operations that both load and validate.
#[derive(Error, Debug)]
pub enum ShapeError {
    /// Validation produced violations.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// A file could not be loaded.
    #[error("load error: {0}")]
    Load(#[from] SchemaLoadError),
}
