//! # File Loading
//!
//! Reads schema definitions and documents from disk. JSON and YAML are both
//! accepted; YAML is converted to the JSON value model before use, so a
//! schema written in either format validates identically.
//!
//! A schema directory holds one definition per file, named
//! `<id>.schema.json`, `<id>.schema.yaml` or `<id>.schema.yml`. Other files
//! are skipped.

use std::path::{Path, PathBuf};

use serde_json::{Number, Value};

use crate::definition::Schema;
use crate::error::SchemaLoadError;
use crate::registry::SchemaRegistry;

const SCHEMA_SUFFIXES: [&str; 3] = [".schema.json", ".schema.yaml", ".schema.yml"];

/// Read a JSON or YAML document, choosing the parser by extension.
///
/// `.yaml` / `.yml` files are parsed as YAML; anything else as JSON.
///
/// # Errors
///
/// Returns [`SchemaLoadError::Io`] if the file cannot be read and
/// [`SchemaLoadError::Parse`] if it does not parse.
pub fn load_document(path: &Path) -> Result<Value, SchemaLoadError> {
    let content = std::fs::read_to_string(path).map_err(|source| SchemaLoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
    match ext {
        "yaml" | "yml" => parse_yaml(&content).map_err(|reason| SchemaLoadError::Parse {
            path: path.to_path_buf(),
            reason,
        }),
        _ => serde_json::from_str(&content).map_err(|e| SchemaLoadError::Parse {
            path: path.to_path_buf(),
            reason: e.to_string(),
        }),
    }
}

/// Read and parse one schema definition file.
///
/// # Errors
///
/// Returns [`SchemaLoadError::Definition`] if the file parses but is not a
/// valid definition, otherwise as [`load_document`].
pub fn load_schema_file(path: &Path) -> Result<Schema, SchemaLoadError> {
    let value = load_document(path)?;
    Schema::from_value(&value).map_err(|source| SchemaLoadError::Definition {
        path: path.to_path_buf(),
        source,
    })
}

/// The schema id encoded in a file name, if the name carries a schema suffix.
///
/// `user.schema.json` yields `user`.
pub fn schema_id_from_file_name(file_name: &str) -> Option<&str> {
    SCHEMA_SUFFIXES
        .iter()
        .find_map(|suffix| file_name.strip_suffix(suffix))
        .filter(|id| !id.is_empty())
}

/// Register every schema file in `dir`, in sorted file-name order.
///
/// Ids already present in `registry` are left untouched. Returns the
/// number of schemas added.
///
/// # Errors
///
/// Fails on the first unreadable directory, unreadable file, or invalid
/// definition.
pub fn load_schema_dir(registry: &mut SchemaRegistry, dir: &Path) -> Result<usize, SchemaLoadError> {
    let entries = std::fs::read_dir(dir).map_err(|source| SchemaLoadError::Io {
        path: dir.to_path_buf(),
        source,
    })?;

    let mut files: Vec<(String, PathBuf)> = Vec::new();
    for entry in entries {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                tracing::warn!(dir = %dir.display(), error = %e, "failed to read directory entry");
                continue;
            }
        };
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        match schema_id_from_file_name(name) {
            Some(id) => files.push((id.to_string(), path.clone())),
            None => tracing::debug!(path = %path.display(), "skipping non-schema file"),
        }
    }
    files.sort_by(|a, b| a.1.cmp(&b.1));

    let mut added = 0usize;
    for (id, path) in files {
        let schema = load_schema_file(&path)?;
        if registry.add(id, schema) {
            added += 1;
        }
    }

    tracing::info!(dir = %dir.display(), added, "loaded schema directory");
    Ok(added)
}

fn parse_yaml(content: &str) -> Result<Value, String> {
    let yaml: serde_yaml::Value = serde_yaml::from_str(content).map_err(|e| e.to_string())?;
    yaml_to_json(&yaml)
}

/// Convert YAML into the JSON value model.
///
/// Tags are dropped and scalar map keys become their text. Mapping order
/// is kept.
fn yaml_to_json(yaml: &serde_yaml::Value) -> Result<Value, String> {
    use serde_yaml::Value as Yaml;

    match yaml {
        Yaml::Null => Ok(Value::Null),
        Yaml::Bool(b) => Ok(Value::Bool(*b)),
        Yaml::Number(n) => yaml_number(n).map(Value::Number),
        Yaml::String(s) => Ok(Value::String(s.clone())),
        Yaml::Sequence(items) => items.iter().map(yaml_to_json).collect(),
        Yaml::Mapping(map) => map
            .iter()
            .map(|(key, value)| Ok::<_, String>((yaml_key(key)?, yaml_to_json(value)?)))
            .collect(),
        Yaml::Tagged(tagged) => yaml_to_json(&tagged.value),
    }
}

/// Integers stay exact; NaN and the infinities have no JSON form.
fn yaml_number(n: &serde_yaml::Number) -> Result<Number, String> {
    if let Some(i) = n.as_i64() {
        return Ok(i.into());
    }
    if let Some(u) = n.as_u64() {
        return Ok(u.into());
    }
    n.as_f64()
        .and_then(Number::from_f64)
        .ok_or_else(|| format!("number {n} is not representable in JSON"))
}

fn yaml_key(key: &serde_yaml::Value) -> Result<String, String> {
    match key {
        serde_yaml::Value::String(s) => Ok(s.clone()),
        serde_yaml::Value::Number(n) => Ok(n.to_string()),
        serde_yaml::Value::Bool(b) => Ok(b.to_string()),
        other => Err(format!("map key {other:?} is not a scalar")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_schema_id_from_file_name() {
        assert_eq!(schema_id_from_file_name("user.schema.json"), Some("user"));
        assert_eq!(schema_id_from_file_name("a.b.schema.yml"), Some("a.b"));
        assert_eq!(schema_id_from_file_name("user.json"), None);
        assert_eq!(schema_id_from_file_name(".schema.json"), None);
    }

    #[test]
    fn test_yaml_conversion_keeps_order_and_types() {
        let value = parse_yaml(
            r#"
zeta: 1
alpha: true
list: [one, 2.5]
1: numeric-key
"#,
        )
        .unwrap();
        let keys: Vec<&str> = value.as_object().unwrap().keys().map(String::as_str).collect();
        assert_eq!(keys, ["zeta", "alpha", "list", "1"]);
        assert_eq!(value["list"], json!(["one", 2.5]));
    }

    #[test]
    fn test_yaml_rejects_nan() {
        assert!(parse_yaml("value: .nan").is_err());
    }

    #[test]
    fn test_load_document_by_extension() {
        let dir = tempfile::tempdir().unwrap();
        let json_path = dir.path().join("doc.json");
        let yaml_path = dir.path().join("doc.yaml");
        std::fs::write(&json_path, r#"{"a": [1, 2]}"#).unwrap();
        std::fs::write(&yaml_path, "a:\n  - 1\n  - 2\n").unwrap();
        assert_eq!(load_document(&json_path).unwrap(), load_document(&yaml_path).unwrap());
    }

    #[test]
    fn test_load_document_errors() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.json");
        assert!(matches!(
            load_document(&missing),
            Err(SchemaLoadError::Io { .. })
        ));
        let broken = dir.path().join("broken.json");
        std::fs::write(&broken, "{").unwrap();
        assert!(matches!(
            load_document(&broken),
            Err(SchemaLoadError::Parse { .. })
        ));
    }

    #[test]
    fn test_load_schema_dir() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("user.schema.json"),
            r#"{"type": "object", "properties": {"name": {"type": "string"}}}"#,
        )
        .unwrap();
        std::fs::write(dir.path().join("tag.schema.yaml"), "type: string\nminLength: 1\n").unwrap();
        std::fs::write(dir.path().join("README.md"), "not a schema").unwrap();

        let mut registry = SchemaRegistry::new();
        registry.add("tag", Schema::Boolean);
        let added = load_schema_dir(&mut registry, dir.path()).unwrap();

        assert_eq!(added, 1);
        assert_eq!(registry.ids(), ["tag", "user"]);
        assert_eq!(registry.get("tag"), Some(&Schema::Boolean));
    }

    #[test]
    fn test_load_schema_dir_reports_bad_definition() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("bad.schema.json"),
            r#"{"type": "string", "pattern": "("}"#,
        )
        .unwrap();
        let mut registry = SchemaRegistry::new();
        let err = load_schema_dir(&mut registry, dir.path()).unwrap_err();
        assert!(matches!(err, SchemaLoadError::Definition { .. }));
        assert!(err.to_string().contains("bad.schema.json"));
    }
}
