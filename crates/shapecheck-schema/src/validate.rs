//! # Recursive Validation
//!
//! Walks a [`Schema`] and a data value together and returns every
//! [`Violation`] found, in depth-first pre-order.
//!
//! ## Rules
//!
//! - Checks on one node are cumulative. A type mismatch does not stop the
//!   allow-list, bound, length or pattern checks on the same value. Bounds
//!   read numeric strings and booleans as numbers. Length bounds also
//!   measure arrays. A pattern is matched against a non-string's JSON text.
//! - An object reports undeclared keys first (in the data's key order), then
//!   walks declared properties in declaration order, reporting missing
//!   required ones and recursing into present ones.
//! - An array recurses into elements by ascending index.
//! - Schema-authoring problems (missing `properties`/`items`, unknown type,
//!   dangling or cyclic `$ref`) stop descent into that subtree only.
//!
//! Each recursive call returns its own vector; the caller appends it in
//! place, so no accumulator is shared between calls.
//!
//! ## `$ref` resolution
//!
//! A reference is looked up in the [`SchemaRegistry`] and validation
//! continues with the target. A chain of references that reaches an id it
//! already passed through, without consuming any data in between, is
//! reported as a cycle. Recursive schemas that descend into the data at
//! each level terminate with the data and are accepted; the configured
//! `max_depth` bounds how deep such a walk may go.

use std::borrow::Cow;
use std::cmp::Ordering;

use serde_json::{Number, Value};

use crate::definition::{ArraySchema, NumberSchema, ObjectSchema, Schema, StringSchema};
use crate::registry::SchemaRegistry;
use crate::violation::{JsonPath, Violation, ViolationKind};

/// Default ceiling on data nesting depth.
pub const DEFAULT_MAX_DEPTH: usize = 256;

/// Validator settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidatorConfig {
    /// Deepest data nesting level that is still validated. The root is
    /// level 0; each object property or array element adds one.
    pub max_depth: usize,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

/// Validate `data` against `schema` from `path` with the default config.
pub fn validate_node(
    registry: &SchemaRegistry,
    schema: &Schema,
    data: &Value,
    path: &JsonPath,
) -> Vec<Violation> {
    NodeValidator::new(registry, ValidatorConfig::default()).validate(schema, data, path)
}

/// Validator bound to a registry for `$ref` resolution.
#[derive(Debug, Clone, Copy)]
pub struct NodeValidator<'a> {
    registry: &'a SchemaRegistry,
    config: ValidatorConfig,
}

impl<'a> NodeValidator<'a> {
    /// Bind a validator to `registry`.
    pub fn new(registry: &'a SchemaRegistry, config: ValidatorConfig) -> Self {
        Self { registry, config }
    }

    /// All violations of `data` against `schema`, with `path` as the
    /// location of `data`.
    pub fn validate(&self, schema: &Schema, data: &Value, path: &JsonPath) -> Vec<Violation> {
        self.walk(schema, data, path, 0, &[])
    }

    fn walk<'s>(
        &self,
        schema: &'s Schema,
        data: &Value,
        path: &JsonPath,
        depth: usize,
        ref_chain: &[&'s str],
    ) -> Vec<Violation>
    where
        'a: 's,
    {
        if depth > self.config.max_depth {
            return vec![Violation::at(
                path.clone(),
                ViolationKind::DepthExceeded {
                    max_depth: self.config.max_depth,
                },
            )];
        }

        match schema {
            Schema::Reference { id } => {
                if ref_chain.contains(&id.as_str()) {
                    tracing::debug!(schema_id = %id, "\"{id}\" schema reference cycle detected");
                    return vec![Violation::schema_level(ViolationKind::ReferenceCycle {
                        id: id.clone(),
                    })];
                }
                let Some(target) = self.registry.get(id) else {
                    return vec![Violation::schema_level(ViolationKind::MissingReference {
                        id: id.clone(),
                    })];
                };
                let mut chain = ref_chain.to_vec();
                chain.push(id.as_str());
                self.walk(target, data, path, depth, &chain)
            }
            Schema::Number(constraints) => check_number(constraints, "number", false, data, path),
            Schema::Integer(constraints) => check_number(constraints, "integer", true, data, path),
            Schema::String(constraints) => check_string(constraints, data, path),
            Schema::Boolean => {
                if data.is_boolean() {
                    Vec::new()
                } else {
                    vec![invalid_type("boolean", data, path)]
                }
            }
            Schema::Object(object) => self.walk_object(object, data, path, depth),
            Schema::Array(array) => self.walk_array(array, data, path, depth),
            Schema::Unknown { type_name } => {
                vec![Violation::schema_level(ViolationKind::UnknownType {
                    type_name: type_name.clone(),
                })]
            }
        }
    }

    fn walk_object<'s>(
        &self,
        schema: &'s ObjectSchema,
        data: &Value,
        path: &JsonPath,
        depth: usize,
    ) -> Vec<Violation>
    where
        'a: 's,
    {
        let mut violations = Vec::new();
        let object = data.as_object();
        if object.is_none() {
            violations.push(invalid_type("object", data, path));
        }

        let Some(properties) = &schema.properties else {
            violations.push(Violation::schema_level(ViolationKind::MissingPropertiesKey));
            return violations;
        };

        if let Some(object) = object {
            for key in object.keys() {
                if !properties.iter().any(|(declared, _)| declared == key) {
                    violations.push(Violation::at(
                        path.clone(),
                        ViolationKind::ExtraProperty {
                            property: key.clone(),
                        },
                    ));
                }
            }
        }

        for (name, property_schema) in properties {
            match object.and_then(|o| o.get(name)) {
                Some(value) => violations.extend(self.walk(
                    property_schema,
                    value,
                    &path.property(name),
                    depth + 1,
                    &[],
                )),
                None if schema.is_required(name) => violations.push(Violation::at(
                    path.clone(),
                    ViolationKind::MissingProperty {
                        property: name.clone(),
                    },
                )),
                None => {}
            }
        }

        violations
    }

    fn walk_array<'s>(
        &self,
        schema: &'s ArraySchema,
        data: &Value,
        path: &JsonPath,
        depth: usize,
    ) -> Vec<Violation>
    where
        'a: 's,
    {
        let mut violations = Vec::new();
        let elements = data.as_array();
        if elements.is_none() {
            violations.push(invalid_type("array", data, path));
        }

        let Some(items) = &schema.items else {
            violations.push(Violation::schema_level(ViolationKind::MissingItemsKey));
            return violations;
        };

        for (index, element) in elements.into_iter().flatten().enumerate() {
            violations.extend(self.walk(items, element, &path.index(index), depth + 1, &[]));
        }

        violations
    }
}

fn check_number(
    constraints: &NumberSchema,
    type_name: &str,
    integral: bool,
    data: &Value,
    path: &JsonPath,
) -> Vec<Violation> {
    let mut violations = Vec::new();

    let type_ok = match data {
        Value::Number(n) => !integral || is_integral(n),
        _ => false,
    };
    if !type_ok {
        violations.push(invalid_type(type_name, data, path));
    }

    check_allowed(constraints.values.as_deref(), data, path, &mut violations);

    if let Some(n) = numeric_operand(data) {
        if let Some(minimum) = &constraints.minimum {
            if compare_numbers(&n, minimum) == Some(Ordering::Less) {
                violations.push(Violation::at(
                    path.clone(),
                    ViolationKind::BelowMinimum {
                        value: data.clone(),
                        minimum: minimum.clone(),
                    },
                ));
            }
        }
        if let Some(maximum) = &constraints.maximum {
            if compare_numbers(&n, maximum) == Some(Ordering::Greater) {
                violations.push(Violation::at(
                    path.clone(),
                    ViolationKind::AboveMaximum {
                        value: data.clone(),
                        maximum: maximum.clone(),
                    },
                ));
            }
        }
    }

    violations
}

fn check_string(constraints: &StringSchema, data: &Value, path: &JsonPath) -> Vec<Violation> {
    let mut violations = Vec::new();

    if !data.is_string() {
        violations.push(invalid_type("string", data, path));
    }

    check_allowed(constraints.values.as_deref(), data, path, &mut violations);

    let length = length_of(data);
    if let (Some(min_length), Some(length)) = (constraints.min_length, length) {
        if length < min_length {
            violations.push(Violation::at(
                path.clone(),
                ViolationKind::TooShort {
                    value: data.clone(),
                    min_length,
                },
            ));
        }
    }
    if let (Some(max_length), Some(length)) = (constraints.max_length, length) {
        if length > max_length {
            violations.push(Violation::at(
                path.clone(),
                ViolationKind::TooLong {
                    value: data.clone(),
                    max_length,
                },
            ));
        }
    }
    if let Some(pattern) = &constraints.pattern {
        if !pattern.is_match(&pattern_subject(data)) {
            violations.push(Violation::at(
                path.clone(),
                ViolationKind::PatternMismatch {
                    value: data.clone(),
                    pattern: pattern.as_str().to_string(),
                },
            ));
        }
    }

    violations
}

fn check_allowed(
    values: Option<&[Value]>,
    data: &Value,
    path: &JsonPath,
    violations: &mut Vec<Violation>,
) {
    let Some(values) = values else {
        return;
    };
    if !values.iter().any(|allowed| same_value(allowed, data)) {
        violations.push(Violation::at(
            path.clone(),
            ViolationKind::NotAllowed {
                value: data.clone(),
                values: values.to_vec(),
            },
        ));
    }
}

/// The number a bound is compared against: numbers as-is, numeric strings
/// parsed, booleans as 0 and 1. Anything else has no numeric reading and
/// skips the bound.
fn numeric_operand(data: &Value) -> Option<Number> {
    match data {
        Value::Number(n) => Some(n.clone()),
        Value::Bool(b) => Some(Number::from(u8::from(*b))),
        Value::String(s) => {
            let s = s.trim();
            if let Ok(i) = s.parse::<i64>() {
                Some(Number::from(i))
            } else if let Ok(u) = s.parse::<u64>() {
                Some(Number::from(u))
            } else {
                s.parse::<f64>().ok().and_then(Number::from_f64)
            }
        }
        _ => None,
    }
}

/// Strings measure in Unicode scalar values, arrays in elements. Other
/// values have no length and skip the length bounds.
fn length_of(data: &Value) -> Option<u64> {
    match data {
        Value::String(s) => Some(s.chars().count() as u64),
        Value::Array(items) => Some(items.len() as u64),
        _ => None,
    }
}

/// Text a pattern is matched against. Non-strings use their compact JSON form.
fn pattern_subject(data: &Value) -> Cow<'_, str> {
    match data {
        Value::String(s) => Cow::Borrowed(s.as_str()),
        other => Cow::Owned(other.to_string()),
    }
}

fn invalid_type(type_name: &str, data: &Value, path: &JsonPath) -> Violation {
    Violation::at(
        path.clone(),
        ViolationKind::InvalidType {
            value: data.clone(),
            expected: type_name.to_string(),
        },
    )
}

fn is_integral(n: &Number) -> bool {
    n.is_i64() || n.is_u64() || n.as_f64().is_some_and(|f| f.is_finite() && f.fract() == 0.0)
}

/// Numeric comparison that stays exact for integers of the same sign class.
fn compare_numbers(a: &Number, b: &Number) -> Option<Ordering> {
    if let (Some(x), Some(y)) = (a.as_i64(), b.as_i64()) {
        return Some(x.cmp(&y));
    }
    if let (Some(x), Some(y)) = (a.as_u64(), b.as_u64()) {
        return Some(x.cmp(&y));
    }
    a.as_f64()?.partial_cmp(&b.as_f64()?)
}

/// Allow-list equality: numbers compare by value (`1` equals `1.0`),
/// everything else by JSON equality.
fn same_value(allowed: &Value, data: &Value) -> bool {
    match (allowed, data) {
        (Value::Number(a), Value::Number(b)) => compare_numbers(a, b) == Some(Ordering::Equal),
        _ => allowed == data,
    }
}
