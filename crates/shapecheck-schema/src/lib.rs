//! # shapecheck-schema: Declarative Schema Validation
//!
//! Validates nested data (numbers, strings, booleans, objects, arrays)
//! against schemas registered under string ids, and reports every
//! constraint failure as a structured [`Violation`] instead of a single
//! pass/fail flag.
//!
//! ```
//! use serde_json::json;
//! use shapecheck_schema::ShapeChecker;
//!
//! let mut checker = ShapeChecker::new();
//! checker
//!     .add_definition("notify", &json!({
//!         "type": "object",
//!         "properties": {
//!             "type": { "type": "string", "values": ["info", "warning"] },
//!             "array": { "type": "array", "items": { "type": "number" } }
//!         },
//!         "required": ["type"]
//!     }))
//!     .unwrap();
//!
//! let err = checker
//!     .validate("notify", &json!({ "type": "info", "array": [1, 2, "3"] }))
//!     .unwrap_err();
//! assert_eq!(
//!     err.to_string(),
//!     r#"[{"path":"$.array[2]","value":"3","type":"number","message":"Invalid value type"}]"#
//! );
//! ```
//!
//! ## Modules
//!
//! - [`definition`]: the typed [`Schema`] model and its key/value grammar.
//! - [`registry`]: [`SchemaRegistry`], insert-if-absent id → schema store.
//! - [`validate`]: the recursive validator and [`ValidatorConfig`].
//! - [`violation`]: [`Violation`], [`ViolationKind`] and [`JsonPath`].
//! - [`checker`]: [`ShapeChecker`], the public `add`/`has`/`clear`/`validate` API.
//! - [`loader`]: JSON/YAML document and schema-directory loading.
//! - [`error`]: error types.
//!
//! ## Crate Policy
//!
//! - No process-global state: every registry is an owned value.
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.
//! - Diagnostic events go through `tracing`; the crate never installs a
//!   subscriber.

pub mod checker;
pub mod definition;
pub mod error;
pub mod loader;
pub mod registry;
pub mod validate;
pub mod violation;

pub use checker::ShapeChecker;
pub use definition::{ArraySchema, NumberSchema, ObjectSchema, Pattern, Schema, StringSchema};
pub use error::{SchemaDefinitionError, SchemaLoadError, ShapeError, ValidationError};
pub use loader::{load_document, load_schema_dir, load_schema_file};
pub use registry::SchemaRegistry;
pub use validate::{validate_node, NodeValidator, ValidatorConfig, DEFAULT_MAX_DEPTH};
pub use violation::{JsonPath, Violation, ViolationKind};
