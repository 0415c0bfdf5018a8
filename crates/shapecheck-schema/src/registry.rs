//! # Schema Registry
//!
//! Maps schema ids to [`Schema`] definitions. The registry is used for
//! top-level lookups by [`ShapeChecker`](crate::ShapeChecker) and for `$ref`
//! resolution inside the validator.
//!
//! Registration is insert-if-absent: adding an id that already exists is a
//! logged no-op, never an overwrite. No shape checking happens at `add`;
//! authoring problems surface during validation.
//!
//! ## Thread Safety
//!
//! Mutation takes `&mut self`, so a registry has a single writer at any
//! time. Callers that share one across threads wrap it in a lock; the
//! registry itself holds no interior mutability.

use std::collections::HashMap;

use crate::definition::Schema;

/// Schema store keyed by id.
#[derive(Debug, Clone, Default)]
pub struct SchemaRegistry {
    schemas: HashMap<String, Schema>,
}

impl SchemaRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `schema` under `id` unless the id is taken.
    ///
    /// Returns `true` if the schema was stored.
    pub fn add(&mut self, id: impl Into<String>, schema: Schema) -> bool {
        let id = id.into();
        if self.schemas.contains_key(&id) {
            tracing::debug!(schema_id = %id, "schema with \"{id}\" already exist");
            return false;
        }
        tracing::debug!(schema_id = %id, "schema \"{id}\" added");
        self.schemas.insert(id, schema);
        true
    }

    /// True if `id` is registered.
    pub fn has(&self, id: &str) -> bool {
        self.schemas.contains_key(id)
    }

    /// The schema registered under `id`.
    pub fn get(&self, id: &str) -> Option<&Schema> {
        self.schemas.get(id)
    }

    /// Remove every schema.
    pub fn clear(&mut self) {
        self.schemas.clear();
        tracing::debug!("all schemas cleared");
    }

    /// Number of registered schemas.
    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    /// True if nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }

    /// Registered ids, sorted.
    pub fn ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.schemas.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::definition::NumberSchema;

    fn number() -> Schema {
        Schema::Number(NumberSchema::default())
    }

    #[test]
    fn test_add_then_has() {
        let mut registry = SchemaRegistry::new();
        assert!(registry.is_empty());
        assert!(registry.add("num", number()));
        assert!(registry.has("num"));
        assert!(!registry.has("other"));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_add_is_insert_if_absent() {
        let mut registry = SchemaRegistry::new();
        assert!(registry.add("num", number()));
        assert!(!registry.add("num", Schema::Boolean));
        assert_eq!(registry.get("num"), Some(&number()));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_clear_allows_reregistration() {
        let mut registry = SchemaRegistry::new();
        registry.add("num", number());
        registry.clear();
        assert!(!registry.has("num"));
        assert!(registry.is_empty());
        assert!(registry.add("num", Schema::Boolean));
        assert_eq!(registry.get("num"), Some(&Schema::Boolean));
    }

    #[test]
    fn test_ids_sorted() {
        let mut registry = SchemaRegistry::new();
        registry.add("notify", Schema::Boolean);
        registry.add("address", Schema::Boolean);
        registry.add("money", Schema::Boolean);
        assert_eq!(registry.ids(), ["address", "money", "notify"]);
    }
}
