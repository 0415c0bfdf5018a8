//! # Public API
//!
//! [`ShapeChecker`] owns a [`SchemaRegistry`] and a [`ValidatorConfig`] and
//! exposes the four core operations: `add`, `has`, `clear` and `validate`.
//!
//! `validate` against an id that is not registered is a logged no-op, not
//! an error, so a typo in an id never crashes the caller. A registered id
//! whose run finds violations returns exactly one [`ValidationError`]
//! carrying all of them.

use std::path::Path;

use serde_json::Value;

use crate::definition::Schema;
use crate::error::{SchemaDefinitionError, SchemaLoadError, ShapeError, ValidationError};
use crate::loader;
use crate::registry::SchemaRegistry;
use crate::validate::{NodeValidator, ValidatorConfig};
use crate::violation::JsonPath;

/// Registry plus validator.
#[derive(Debug, Clone, Default)]
pub struct ShapeChecker {
    registry: SchemaRegistry,
    config: ValidatorConfig,
}

impl ShapeChecker {
    /// Empty checker with the default config.
    pub fn new() -> Self {
        Self::default()
    }

    /// Empty checker with `config`.
    pub fn with_config(config: ValidatorConfig) -> Self {
        Self {
            registry: SchemaRegistry::new(),
            config,
        }
    }

    /// Checker over an existing registry.
    pub fn from_registry(registry: SchemaRegistry, config: ValidatorConfig) -> Self {
        Self { registry, config }
    }

    /// Register `schema` under `id`; a no-op if the id is taken.
    pub fn add(&mut self, id: impl Into<String>, schema: Schema) {
        self.registry.add(id, schema);
    }

    /// Parse a key/value definition and register it under `id`.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaDefinitionError`] if the definition cannot be parsed;
    /// nothing is registered in that case.
    pub fn add_definition(
        &mut self,
        id: impl Into<String>,
        definition: &Value,
    ) -> Result<(), SchemaDefinitionError> {
        let schema = Schema::from_value(definition)?;
        self.add(id, schema);
        Ok(())
    }

    /// True if `id` is registered.
    pub fn has(&self, id: &str) -> bool {
        self.registry.has(id)
    }

    /// Remove every registered schema.
    pub fn clear(&mut self) {
        self.registry.clear();
    }

    /// Validate `data` against the schema registered as `id`.
    ///
    /// Returns `Ok(())` when the data satisfies the schema and also when
    /// `id` is not registered.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError`] carrying every violation, in depth-first
    /// emission order, when at least one constraint fails.
    pub fn validate(&self, id: &str, data: &Value) -> Result<(), ValidationError> {
        let Some(schema) = self.registry.get(id) else {
            tracing::debug!(schema_id = %id, "schema with \"{id}\" not exist");
            return Ok(());
        };

        tracing::debug!(schema_id = %id, "schema \"{id}\" validating");
        let violations =
            NodeValidator::new(&self.registry, self.config).validate(schema, data, &JsonPath::root());
        tracing::debug!(
            schema_id = %id,
            violations = violations.len(),
            "schema \"{id}\" validated"
        );

        if violations.is_empty() {
            Ok(())
        } else {
            Err(ValidationError::new(violations))
        }
    }

    /// Load a JSON or YAML document and validate it against `id`.
    ///
    /// # Errors
    ///
    /// Returns [`ShapeError::Load`] if the document cannot be read and
    /// [`ShapeError::Validation`] if it has violations.
    pub fn validate_file(&self, id: &str, path: &Path) -> Result<(), ShapeError> {
        let data = loader::load_document(path)?;
        self.validate(id, &data)?;
        Ok(())
    }

    /// Register every `<id>.schema.{json,yaml,yml}` file in `dir`.
    ///
    /// Returns the number of schemas added.
    ///
    /// # Errors
    ///
    /// See [`loader::load_schema_dir`].
    pub fn load_dir(&mut self, dir: &Path) -> Result<usize, SchemaLoadError> {
        loader::load_schema_dir(&mut self.registry, dir)
    }

    /// The underlying registry.
    pub fn registry(&self) -> &SchemaRegistry {
        &self.registry
    }

    /// Mutable access to the underlying registry.
    pub fn registry_mut(&mut self) -> &mut SchemaRegistry {
        &mut self.registry
    }

    /// The validator config.
    pub fn config(&self) -> ValidatorConfig {
        self.config
    }
}
