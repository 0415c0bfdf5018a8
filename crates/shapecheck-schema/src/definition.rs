//! # Schema Definitions
//!
//! A [`Schema`] is a closed tagged union over the supported node kinds.
//! Definitions are written as nested key/value structures (JSON or YAML):
//!
//! ```json
//! {
//!   "type": "object",
//!   "properties": {
//!     "title": { "type": "string", "maxLength": 80 },
//!     "delay": { "type": "integer", "minimum": 0, "maximum": 10000 },
//!     "tags":  { "type": "array", "items": { "$ref": "tag" } }
//!   },
//!   "required": ["title"]
//! }
//! ```
//!
//! A node holding `$ref` becomes a [`Schema::Reference`] and every sibling
//! key is ignored. A `type` outside the known set is kept as
//! [`Schema::Unknown`] so the validator can report it where it is used.
//! Missing `properties` and `items` keys are also kept, not rejected: they
//! are schema-authoring violations reported lazily during validation.
//!
//! Keywords with the wrong JSON shape and patterns that do not compile are
//! rejected here, because they cannot be represented in the typed model.

use regex::Regex;
use serde::{Deserialize, Deserializer};
use serde_json::{Map, Number, Value};

use crate::error::SchemaDefinitionError;

/// Constraints shared by `number` and `integer` nodes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NumberSchema {
    /// Allow-list of accepted values.
    pub values: Option<Vec<Value>>,
    /// Inclusive lower bound.
    pub minimum: Option<Number>,
    /// Inclusive upper bound.
    pub maximum: Option<Number>,
}

/// Constraints of a `string` node.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StringSchema {
    /// Allow-list of accepted values.
    pub values: Option<Vec<Value>>,
    /// Inclusive lower length bound, in Unicode scalar values.
    pub min_length: Option<u64>,
    /// Inclusive upper length bound, in Unicode scalar values.
    pub max_length: Option<u64>,
    /// Pattern the string must contain a match for.
    pub pattern: Option<Pattern>,
}

/// An `object` node.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ObjectSchema {
    /// Declared properties in declaration order; `None` when the definition
    /// has no `properties` key.
    pub properties: Option<Vec<(String, Schema)>>,
    /// Names of properties that must be present.
    pub required: Vec<String>,
}

impl ObjectSchema {
    /// Looks up a declared property.
    pub fn property(&self, name: &str) -> Option<&Schema> {
        self.properties
            .as_ref()?
            .iter()
            .find(|(declared, _)| declared == name)
            .map(|(_, schema)| schema)
    }

    /// True if `name` is listed in `required`.
    pub fn is_required(&self, name: &str) -> bool {
        self.required.iter().any(|r| r == name)
    }
}

/// An `array` node.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ArraySchema {
    /// Schema every element must satisfy; `None` when the definition has no
    /// `items` key.
    pub items: Option<Box<Schema>>,
}

/// A schema node.
#[derive(Debug, Clone, PartialEq)]
pub enum Schema {
    /// Any finite number.
    Number(NumberSchema),
    /// A finite number with an integral value.
    Integer(NumberSchema),
    /// A string.
    String(StringSchema),
    /// A boolean.
    Boolean,
    /// A non-array object.
    Object(ObjectSchema),
    /// An array.
    Array(ArraySchema),
    /// Defers to the registered schema with this id.
    Reference {
        /// Registry id of the target schema.
        id: String,
    },
    /// A node whose `type` tag is not recognised.
    Unknown {
        /// The tag as written, or `undefined` when absent.
        type_name: String,
    },
}

impl Schema {
    /// Parse a key/value definition into a typed schema.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaDefinitionError`] when a node is not an object, a
    /// keyword has the wrong JSON shape, or a pattern does not compile.
    pub fn from_value(value: &Value) -> Result<Self, SchemaDefinitionError> {
        parse_node(value, "#")
    }

    /// A `$ref` node pointing at `id`.
    pub fn reference(id: impl Into<String>) -> Self {
        Self::Reference { id: id.into() }
    }

    /// The `type` tag this node was defined with (`$ref` for references).
    pub fn type_name(&self) -> &str {
        match self {
            Self::Number(_) => "number",
            Self::Integer(_) => "integer",
            Self::String(_) => "string",
            Self::Boolean => "boolean",
            Self::Object(_) => "object",
            Self::Array(_) => "array",
            Self::Reference { .. } => "$ref",
            Self::Unknown { type_name } => type_name,
        }
    }
}

impl TryFrom<Value> for Schema {
    type Error = SchemaDefinitionError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        Self::from_value(&value)
    }
}

impl TryFrom<&Value> for Schema {
    type Error = SchemaDefinitionError;

    fn try_from(value: &Value) -> Result<Self, Self::Error> {
        Self::from_value(value)
    }
}

impl<'de> Deserialize<'de> for Schema {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Self::from_value(&value).map_err(serde::de::Error::custom)
    }
}

/// A compiled `pattern` constraint.
///
/// Matching is an unanchored search: the string satisfies the pattern if
/// any substring matches. Use `^...$` in the pattern to require a full match.
#[derive(Debug, Clone)]
pub struct Pattern {
    source: String,
    regex: Regex,
}

impl Pattern {
    /// Compile `source`.
    ///
    /// # Errors
    ///
    /// Returns the regex compilation error.
    pub fn new(source: impl Into<String>) -> Result<Self, regex::Error> {
        let source = source.into();
        let regex = Regex::new(&source)?;
        Ok(Self { source, regex })
    }

    /// The pattern as written in the definition.
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// True if `text` contains a match.
    pub fn is_match(&self, text: &str) -> bool {
        self.regex.is_match(text)
    }
}

impl PartialEq for Pattern {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source
    }
}

fn parse_node(value: &Value, pointer: &str) -> Result<Schema, SchemaDefinitionError> {
    let node = value
        .as_object()
        .ok_or_else(|| SchemaDefinitionError::NotAnObject {
            pointer: pointer.to_string(),
            found: json_type_name(value),
        })?;

    // `$ref` replaces the whole node.
    if let Some(target) = node.get("$ref") {
        let id = target
            .as_str()
            .ok_or_else(|| invalid(pointer, "$ref", "expected a schema id string"))?;
        return Ok(Schema::reference(id));
    }

    let type_name = match node.get("type") {
        None => "undefined".to_string(),
        Some(Value::String(tag)) => tag.clone(),
        Some(other) => other.to_string(),
    };

    let schema = match type_name.as_str() {
        "number" => Schema::Number(parse_number(node, pointer)?),
        "integer" => Schema::Integer(parse_number(node, pointer)?),
        "string" => Schema::String(parse_string(node, pointer)?),
        "boolean" => Schema::Boolean,
        "object" => Schema::Object(parse_object(node, pointer)?),
        "array" => Schema::Array(ArraySchema {
            items: node
                .get("items")
                .map(|items| parse_node(items, &format!("{pointer}/items")).map(Box::new))
                .transpose()?,
        }),
        _ => Schema::Unknown { type_name },
    };
    Ok(schema)
}

fn parse_number(
    node: &Map<String, Value>,
    pointer: &str,
) -> Result<NumberSchema, SchemaDefinitionError> {
    Ok(NumberSchema {
        values: parse_values(node, pointer)?,
        minimum: parse_bound(node, pointer, "minimum")?,
        maximum: parse_bound(node, pointer, "maximum")?,
    })
}

fn parse_string(
    node: &Map<String, Value>,
    pointer: &str,
) -> Result<StringSchema, SchemaDefinitionError> {
    let pattern = match node.get("pattern") {
        None => None,
        Some(Value::String(source)) => Some(Pattern::new(source.as_str()).map_err(|source| {
            SchemaDefinitionError::InvalidPattern {
                pointer: pointer.to_string(),
                source,
            }
        })?),
        Some(_) => return Err(invalid(pointer, "pattern", "expected a regular expression string")),
    };

    Ok(StringSchema {
        values: parse_values(node, pointer)?,
        min_length: parse_length(node, pointer, "minLength")?,
        max_length: parse_length(node, pointer, "maxLength")?,
        pattern,
    })
}

fn parse_object(
    node: &Map<String, Value>,
    pointer: &str,
) -> Result<ObjectSchema, SchemaDefinitionError> {
    let properties = match node.get("properties") {
        None => None,
        Some(Value::Object(declared)) => {
            let mut parsed = Vec::with_capacity(declared.len());
            for (name, sub) in declared {
                let sub_pointer = format!("{pointer}/properties/{}", escape_pointer(name));
                parsed.push((name.clone(), parse_node(sub, &sub_pointer)?));
            }
            Some(parsed)
        }
        Some(_) => return Err(invalid(pointer, "properties", "expected an object")),
    };

    let required = match node.get("required") {
        None => Vec::new(),
        Some(Value::Array(names)) => names
            .iter()
            .map(|name| {
                name.as_str()
                    .map(str::to_string)
                    .ok_or_else(|| invalid(pointer, "required", "expected an array of strings"))
            })
            .collect::<Result<_, _>>()?,
        Some(_) => return Err(invalid(pointer, "required", "expected an array of strings")),
    };

    Ok(ObjectSchema {
        properties,
        required,
    })
}

fn parse_values(
    node: &Map<String, Value>,
    pointer: &str,
) -> Result<Option<Vec<Value>>, SchemaDefinitionError> {
    match node.get("values") {
        None => Ok(None),
        Some(Value::Array(values)) => Ok(Some(values.clone())),
        Some(_) => Err(invalid(pointer, "values", "expected an array")),
    }
}

fn parse_bound(
    node: &Map<String, Value>,
    pointer: &str,
    keyword: &'static str,
) -> Result<Option<Number>, SchemaDefinitionError> {
    match node.get(keyword) {
        None => Ok(None),
        Some(Value::Number(n)) => Ok(Some(n.clone())),
        Some(_) => Err(invalid(pointer, keyword, "expected a number")),
    }
}

fn parse_length(
    node: &Map<String, Value>,
    pointer: &str,
    keyword: &'static str,
) -> Result<Option<u64>, SchemaDefinitionError> {
    let Some(raw) = node.get(keyword) else {
        return Ok(None);
    };
    raw.as_u64()
        .or_else(|| {
            raw.as_f64()
                .filter(|f| *f >= 0.0 && f.fract() == 0.0)
                .map(|f| f as u64)
        })
        .map(Some)
        .ok_or_else(|| invalid(pointer, keyword, "expected a non-negative integer"))
}

fn invalid(pointer: &str, keyword: &'static str, reason: &str) -> SchemaDefinitionError {
    SchemaDefinitionError::InvalidKeyword {
        pointer: pointer.to_string(),
        keyword,
        reason: reason.to_string(),
    }
}

/// RFC 6901 escaping of a single pointer segment.
fn escape_pointer(segment: &str) -> String {
    segment.replace('~', "~0").replace('/', "~1")
}

pub(crate) fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_scalar_constraints() {
        let schema = Schema::from_value(&json!({
            "type": "integer",
            "values": [1, 2, 3],
            "minimum": 0,
            "maximum": 1e4
        }))
        .unwrap();
        match schema {
            Schema::Integer(n) => {
                assert_eq!(n.values, Some(vec![json!(1), json!(2), json!(3)]));
                assert_eq!(n.minimum.unwrap().as_i64(), Some(0));
                assert_eq!(n.maximum.unwrap().as_f64(), Some(10000.0));
            }
            other => panic!("expected integer schema, got {other:?}"),
        }
    }

    #[test]
    fn test_ref_replaces_siblings() {
        let schema = Schema::from_value(&json!({
            "$ref": "address",
            "type": "string",
            "minLength": 3
        }))
        .unwrap();
        assert_eq!(schema, Schema::reference("address"));
    }

    #[test]
    fn test_properties_keep_declaration_order() {
        let schema = Schema::from_value(&json!({
            "type": "object",
            "properties": {
                "zeta": { "type": "string" },
                "alpha": { "type": "number" },
                "mid": { "type": "boolean" }
            },
            "required": ["alpha"]
        }))
        .unwrap();
        let Schema::Object(object) = schema else {
            panic!("expected object schema");
        };
        let names: Vec<&str> = object
            .properties
            .as_ref()
            .unwrap()
            .iter()
            .map(|(name, _)| name.as_str())
            .collect();
        assert_eq!(names, ["zeta", "alpha", "mid"]);
        assert!(object.is_required("alpha"));
        assert!(!object.is_required("zeta"));
        assert_eq!(object.property("mid"), Some(&Schema::Boolean));
    }

    #[test]
    fn test_missing_structure_keys_are_kept_lazy() {
        let object = Schema::from_value(&json!({"type": "object"})).unwrap();
        assert_eq!(object, Schema::Object(ObjectSchema::default()));
        let array = Schema::from_value(&json!({"type": "array"})).unwrap();
        assert_eq!(array, Schema::Array(ArraySchema { items: None }));
    }

    #[test]
    fn test_unknown_and_missing_type_tags() {
        let unknown = Schema::from_value(&json!({"type": "obj"})).unwrap();
        assert_eq!(unknown.type_name(), "obj");
        let missing = Schema::from_value(&json!({"minimum": 1})).unwrap();
        assert_eq!(
            missing,
            Schema::Unknown {
                type_name: "undefined".to_string()
            }
        );
    }

    #[test]
    fn test_rejects_wrongly_shaped_keywords() {
        let err = Schema::from_value(&json!({
            "type": "object",
            "properties": { "age": { "type": "number", "minimum": "0" } }
        }))
        .unwrap_err();
        match err {
            SchemaDefinitionError::InvalidKeyword {
                pointer, keyword, ..
            } => {
                assert_eq!(pointer, "#/properties/age");
                assert_eq!(keyword, "minimum");
            }
            other => panic!("expected InvalidKeyword, got {other}"),
        }

        assert!(Schema::from_value(&json!({"type": "string", "minLength": -1})).is_err());
        assert!(Schema::from_value(&json!({"type": "object", "required": "a"})).is_err());
        assert!(Schema::from_value(&json!("number")).is_err());
    }

    #[test]
    fn test_rejects_invalid_pattern() {
        let err = Schema::from_value(&json!({"type": "string", "pattern": "(unclosed"}))
            .unwrap_err();
        assert!(matches!(err, SchemaDefinitionError::InvalidPattern { .. }));
    }

    #[test]
    fn test_pattern_is_unanchored_search() {
        let pattern = Pattern::new("[0-9]+").unwrap();
        assert!(pattern.is_match("abc123def"));
        assert!(!pattern.is_match("abc"));
        let anchored = Pattern::new("^[0-9]+$").unwrap();
        assert!(!anchored.is_match("abc123def"));
    }

    #[test]
    fn test_deserialize_from_yaml() {
        let yaml = r#"
type: array
items:
  type: string
  pattern: "^[a-z]+$"
"#;
        let schema: Schema = serde_yaml::from_str(yaml).unwrap();
        let Schema::Array(array) = schema else {
            panic!("expected array schema");
        };
        let Some(items) = array.items else {
            panic!("expected items");
        };
        let Schema::String(string) = *items else {
            panic!("expected string items");
        };
        assert_eq!(string.pattern.unwrap().as_str(), "^[a-z]+$");
    }

    #[test]
    fn test_pointer_escaping() {
        let err = Schema::from_value(&json!({
            "type": "object",
            "properties": { "a/b": { "type": "array", "items": 3 } }
        }))
        .unwrap_err();
        assert!(err.to_string().contains("#/properties/a~1b/items"));
    }
}
