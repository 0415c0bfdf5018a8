//! # Violations and Paths
//!
//! A [`Violation`] describes one constraint failure. Violations from a run
//! form a single flat list in depth-first, pre-order emission order.
//!
//! ## Path syntax
//!
//! The root of the validated document is `$`. Descending into an object
//! property appends `.<name>`, descending into an array element appends
//! `[<index>]`, so the third element of the `array` property is
//! `$.array[2]`.
//!
//! ## Wire shape
//!
//! A violation serializes to a flat object: `path` (omitted for
//! schema-level violations), the constraint-specific fields, then `message`.

use std::fmt;

use serde::{Serialize, Serializer};
use serde_json::{Map, Number, Value};

/// Location of a value inside the validated document.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct JsonPath(String);

impl JsonPath {
    /// The document root, `$`.
    pub fn root() -> Self {
        Self("$".to_string())
    }

    /// Path of the named property below this one.
    pub fn property(&self, name: &str) -> Self {
        Self(format!("{}.{}", self.0, name))
    }

    /// Path of the element at `index` below this one.
    pub fn index(&self, index: usize) -> Self {
        Self(format!("{}[{}]", self.0, index))
    }

    /// The path as text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for JsonPath {
    fn default() -> Self {
        Self::root()
    }
}

impl fmt::Display for JsonPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The rule that failed, with its constraint-specific fields.
#[derive(Debug, Clone, PartialEq)]
pub enum ViolationKind {
    /// The value is not of the schema's type.
    InvalidType {
        /// Offending value.
        value: Value,
        /// Schema type tag (`number`, `integer`, `string`, ...).
        expected: String,
    },
    /// The value is not in the `values` allow-list.
    NotAllowed {
        /// Offending value.
        value: Value,
        /// The allow-list.
        values: Vec<Value>,
    },
    /// The value is below the inclusive `minimum`.
    BelowMinimum {
        /// Offending value.
        value: Value,
        /// Lower bound.
        minimum: Number,
    },
    /// The value is above the inclusive `maximum`.
    AboveMaximum {
        /// Offending value.
        value: Value,
        /// Upper bound.
        maximum: Number,
    },
    /// The string is shorter than `minLength`.
    TooShort {
        /// Offending value.
        value: Value,
        /// Lower length bound.
        min_length: u64,
    },
    /// The string is longer than `maxLength`.
    TooLong {
        /// Offending value.
        value: Value,
        /// Upper length bound.
        max_length: u64,
    },
    /// The string contains no match for `pattern`.
    PatternMismatch {
        /// Offending value.
        value: Value,
        /// Pattern source text.
        pattern: String,
    },
    /// The object has a key the schema does not declare.
    ExtraProperty {
        /// The undeclared key.
        property: String,
    },
    /// A required property is absent.
    MissingProperty {
        /// The absent key.
        property: String,
    },
    /// An object schema has no `properties` definition.
    MissingPropertiesKey,
    /// An array schema has no `items` definition.
    MissingItemsKey,
    /// The schema's `type` tag is not recognised.
    UnknownType {
        /// The tag as written (`undefined` when absent).
        type_name: String,
    },
    /// A `$ref` names an id that is not registered.
    MissingReference {
        /// The dangling id.
        id: String,
    },
    /// A chain of `$ref`s returns to an id it already passed through.
    ReferenceCycle {
        /// The id that closed the cycle.
        id: String,
    },
    /// The document nests deeper than the configured ceiling.
    DepthExceeded {
        /// The configured ceiling.
        max_depth: usize,
    },
}

impl ViolationKind {
    /// Human-readable message for this rule.
    pub fn message(&self) -> String {
        match self {
            Self::InvalidType { .. } => "Invalid value type".to_string(),
            Self::NotAllowed { .. } => {
                "Value does not satisfy allowed values constraint".to_string()
            }
            Self::BelowMinimum { .. } => "Value does not satisfy minimum constraint".to_string(),
            Self::AboveMaximum { .. } => "Value does not satisfy maximum constraint".to_string(),
            Self::TooShort { .. } => "Value does not satisfy minLength constraint".to_string(),
            Self::TooLong { .. } => "Value does not satisfy maxLength constraint".to_string(),
            Self::PatternMismatch { .. } => "Value does not satisfy pattern constraint".to_string(),
            Self::ExtraProperty { .. } => "Extra property found".to_string(),
            Self::MissingProperty { .. } => "Not exist".to_string(),
            Self::MissingPropertiesKey => r#"invalid schema, missing "properties" key"#.to_string(),
            Self::MissingItemsKey => r#"invalid schema, missing "items" key"#.to_string(),
            Self::UnknownType { type_name } => format!(r#"unknown schema type given "{type_name}""#),
            Self::MissingReference { id } => format!(r#""{id}" schema does not exist"#),
            Self::ReferenceCycle { id } => format!(r#""{id}" schema reference cycle detected"#),
            Self::DepthExceeded { .. } => "Maximum validation depth exceeded".to_string(),
        }
    }

    /// True for schema-authoring problems, false for data problems.
    pub fn is_schema_error(&self) -> bool {
        matches!(
            self,
            Self::MissingPropertiesKey
                | Self::MissingItemsKey
                | Self::UnknownType { .. }
                | Self::MissingReference { .. }
                | Self::ReferenceCycle { .. }
        )
    }

    fn write_fields(&self, out: &mut Map<String, Value>) {
        match self {
            Self::InvalidType { value, expected } => {
                out.insert("value".into(), value.clone());
                out.insert("type".into(), Value::String(expected.clone()));
            }
            Self::NotAllowed { value, values } => {
                out.insert("value".into(), value.clone());
                out.insert("values".into(), Value::Array(values.clone()));
            }
            Self::BelowMinimum { value, minimum } => {
                out.insert("value".into(), value.clone());
                out.insert("minimum".into(), Value::Number(plain_number(minimum)));
            }
            Self::AboveMaximum { value, maximum } => {
                out.insert("value".into(), value.clone());
                out.insert("maximum".into(), Value::Number(plain_number(maximum)));
            }
            Self::TooShort { value, min_length } => {
                out.insert("value".into(), value.clone());
                out.insert("minLength".into(), Value::from(*min_length));
            }
            Self::TooLong { value, max_length } => {
                out.insert("value".into(), value.clone());
                out.insert("maxLength".into(), Value::from(*max_length));
            }
            Self::PatternMismatch { value, pattern } => {
                out.insert("value".into(), value.clone());
                out.insert("pattern".into(), Value::String(pattern.clone()));
            }
            Self::ExtraProperty { property } | Self::MissingProperty { property } => {
                out.insert("property".into(), Value::String(property.clone()));
            }
            Self::DepthExceeded { max_depth } => {
                out.insert("maxDepth".into(), Value::from(*max_depth));
            }
            Self::MissingPropertiesKey
            | Self::MissingItemsKey
            | Self::UnknownType { .. }
            | Self::MissingReference { .. }
            | Self::ReferenceCycle { .. } => {}
        }
    }
}

/// Whole floats within the exactly representable range are written as
/// integers, so a bound declared as `1e4` reports as `10000`.
fn plain_number(n: &Number) -> Number {
    const EXACT_LIMIT: f64 = 9_007_199_254_740_992.0;
    match n.as_f64() {
        Some(f) if n.is_f64() && f.fract() == 0.0 && f.abs() <= EXACT_LIMIT => {
            Number::from(f as i64)
        }
        _ => n.clone(),
    }
}

/// One constraint failure.
#[derive(Debug, Clone, PartialEq)]
pub struct Violation {
    /// Where the failure occurred; `None` for schema-level problems.
    pub path: Option<JsonPath>,
    /// What failed.
    pub kind: ViolationKind,
}

impl Violation {
    /// A data violation located at `path`.
    pub fn at(path: JsonPath, kind: ViolationKind) -> Self {
        Self {
            path: Some(path),
            kind,
        }
    }

    /// A schema-level violation, which carries no path.
    pub fn schema_level(kind: ViolationKind) -> Self {
        Self { path: None, kind }
    }

    /// Human-readable message.
    pub fn message(&self) -> String {
        self.kind.message()
    }

    /// Flat JSON object: `path`, constraint fields, `message`.
    pub fn to_json(&self) -> Value {
        let mut out = Map::new();
        if let Some(path) = &self.path {
            out.insert("path".into(), Value::String(path.to_string()));
        }
        self.kind.write_fields(&mut out);
        out.insert("message".into(), Value::String(self.kind.message()));
        Value::Object(out)
    }
}

impl Serialize for Violation {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.path {
            Some(path) => write!(f, "{path}: {}", self.kind.message()),
            None => write!(f, "(schema): {}", self.kind.message()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_path_composition() {
        let path = JsonPath::root().property("array").index(2);
        assert_eq!(path.as_str(), "$.array[2]");
        let nested = JsonPath::root().index(0).property("a").property("b");
        assert_eq!(nested.to_string(), "$[0].a.b");
    }

    #[test]
    fn test_serialized_field_order() {
        let v = Violation::at(
            JsonPath::root().property("string2"),
            ViolationKind::TooShort {
                value: json!(""),
                min_length: 1,
            },
        );
        assert_eq!(
            serde_json::to_string(&v).unwrap(),
            r#"{"path":"$.string2","value":"","minLength":1,"message":"Value does not satisfy minLength constraint"}"#
        );
    }

    #[test]
    fn test_property_violation_shape() {
        let v = Violation::at(
            JsonPath::root(),
            ViolationKind::ExtraProperty {
                property: "array3".to_string(),
            },
        );
        assert_eq!(
            v.to_json(),
            json!({"path": "$", "property": "array3", "message": "Extra property found"})
        );
    }

    #[test]
    fn test_schema_level_violation_has_no_path() {
        let v = Violation::schema_level(ViolationKind::UnknownType {
            type_name: "obj".to_string(),
        });
        assert_eq!(
            v.to_json(),
            json!({"message": "unknown schema type given \"obj\""})
        );
        assert!(v.kind.is_schema_error());
        assert_eq!(v.to_string(), "(schema): unknown schema type given \"obj\"");
    }

    #[test]
    fn test_display_with_path() {
        let v = Violation::at(
            JsonPath::root().property("delay"),
            ViolationKind::AboveMaximum {
                value: json!(20000),
                maximum: Number::from(10000),
            },
        );
        assert_eq!(
            v.to_string(),
            "$.delay: Value does not satisfy maximum constraint"
        );
        assert!(!v.kind.is_schema_error());
    }

    #[test]
    fn test_whole_float_bounds_serialize_as_integers() {
        let v = Violation::at(
            JsonPath::root().property("delay"),
            ViolationKind::AboveMaximum {
                value: json!(20000),
                maximum: Number::from_f64(1e4).unwrap(),
            },
        );
        assert_eq!(v.to_json()["maximum"], json!(10000));
        assert_eq!(v.to_json()["maximum"].to_string(), "10000");

        let v = Violation::at(
            JsonPath::root(),
            ViolationKind::BelowMinimum {
                value: json!(0),
                minimum: Number::from_f64(0.5).unwrap(),
            },
        );
        assert_eq!(v.to_json()["minimum"].to_string(), "0.5");
    }
}
