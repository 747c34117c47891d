//! Validating Resolver
//!
//! Composes the sanitizer with a field schema to produce the single
//! validate-and-normalize step used on every write path. Raw form data is
//! sanitized first, then validated, so a field the user never touched is
//! reported as missing rather than as a format error on an empty string.

use std::collections::BTreeMap;
use std::fmt;

use chrono::DateTime;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::error::{Result, StoreError};
use crate::sanitize::strip;

// == Field Type ==
/// The expected data type of a form field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    /// Free text
    Text,
    /// JSON number
    Number,
    /// JSON boolean
    Bool,
    /// RFC 3339 timestamp string
    DateTime,
    /// Identifier of another entity
    Relation,
    /// Array of strings
    Tags,
}

impl FieldType {
    /// Checks a sanitized value against this type.
    fn accepts(self, value: &Value) -> bool {
        match self {
            Self::Text => value.is_string(),
            Self::Number => value.is_number(),
            Self::Bool => value.is_boolean(),
            Self::DateTime => value
                .as_str()
                .is_some_and(|s| DateTime::parse_from_rfc3339(s).is_ok()),
            Self::Relation => value.as_str().is_some(),
            Self::Tags => value
                .as_array()
                .is_some_and(|items| items.iter().all(Value::is_string)),
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Text => "text",
            Self::Number => "number",
            Self::Bool => "bool",
            Self::DateTime => "datetime",
            Self::Relation => "relation",
            Self::Tags => "tags",
        };
        f.write_str(name)
    }
}

// == Field Spec ==
/// A single field in a form schema.
#[derive(Debug, Clone)]
pub struct FieldSpec {
    pub name: String,
    pub field_type: FieldType,
    pub required: bool,
}

impl FieldSpec {
    fn new(name: &str, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            field_type,
            required: false,
        }
    }

    /// Shorthand for a text field.
    pub fn text(name: &str) -> Self {
        Self::new(name, FieldType::Text)
    }

    /// Shorthand for a numeric field.
    pub fn number(name: &str) -> Self {
        Self::new(name, FieldType::Number)
    }

    /// Shorthand for a boolean field.
    pub fn bool(name: &str) -> Self {
        Self::new(name, FieldType::Bool)
    }

    /// Shorthand for an RFC 3339 timestamp field.
    pub fn datetime(name: &str) -> Self {
        Self::new(name, FieldType::DateTime)
    }

    /// Shorthand for an entity-reference field.
    pub fn relation(name: &str) -> Self {
        Self::new(name, FieldType::Relation)
    }

    /// Shorthand for a string-array field.
    pub fn tags(name: &str) -> Self {
        Self::new(name, FieldType::Tags)
    }

    /// Marks the field as required.
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }
}

// == Schema ==
/// Describes the expected shape of a form payload.
#[derive(Debug, Clone, Default)]
pub struct Schema {
    fields: Vec<FieldSpec>,
}

impl Schema {
    pub fn new(fields: Vec<FieldSpec>) -> Self {
        Self { fields }
    }

    /// Validates a sanitized payload.
    ///
    /// Required fields must be present (the sanitizer has already removed
    /// anything not meaningfully provided); present known fields must match
    /// their declared type. Unknown keys are left for serde to ignore.
    pub fn check(&self, payload: &Map<String, Value>) -> ValidationErrors {
        let mut errors = ValidationErrors::default();

        for field in &self.fields {
            match payload.get(&field.name) {
                None if field.required => {
                    errors.insert(&field.name, ValidationIssue::Missing);
                }
                Some(value) if !field.field_type.accepts(value) => {
                    errors.insert(
                        &field.name,
                        ValidationIssue::Invalid {
                            expected: field.field_type,
                        },
                    );
                }
                _ => {}
            }
        }

        errors
    }
}

// == Validation Errors ==
/// Per-field validation issues, ordered by field name for stable reporting.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValidationErrors {
    issues: BTreeMap<String, ValidationIssue>,
}

/// A single field-level validation failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationIssue {
    /// Required field absent from the sanitized payload
    Missing,
    /// Field present but of the wrong type
    Invalid { expected: FieldType },
}

impl ValidationErrors {
    pub fn insert(&mut self, field: &str, issue: ValidationIssue) {
        self.issues.insert(field.to_string(), issue);
    }

    pub fn get(&self, field: &str) -> Option<&ValidationIssue> {
        self.issues.get(field)
    }

    pub fn is_empty(&self) -> bool {
        self.issues.is_empty()
    }

    pub fn len(&self) -> usize {
        self.issues.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &ValidationIssue)> {
        self.issues.iter()
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, issue) in &self.issues {
            if !first {
                f.write_str(", ")?;
            }
            first = false;
            match issue {
                ValidationIssue::Missing => write!(f, "{field}: missing")?,
                ValidationIssue::Invalid { expected } => {
                    write!(f, "{field}: expected {expected}")?;
                }
            }
        }
        Ok(())
    }
}

// == Resolver ==
/// Sanitize-then-validate step consumed by form submission.
///
/// This is the only path by which raw form data becomes a typed create or
/// update payload; cache operations assume their input went through it.
#[derive(Debug, Clone)]
pub struct Resolver {
    schema: Schema,
}

impl Resolver {
    pub fn new(schema: Schema) -> Self {
        Self { schema }
    }

    /// Sanitizes `raw`, validates it, and deserializes it into `T`.
    ///
    /// Validation runs against the sanitized shape, so an untouched required
    /// field fails with `Missing` rather than a format error. On success the
    /// returned payload contains exactly the meaningfully-provided fields.
    pub fn resolve<T: DeserializeOwned>(&self, raw: Value) -> Result<T> {
        let map = match raw {
            Value::Object(map) => map,
            other => {
                return Err(StoreError::Payload(format!(
                    "expected a form object, got {other}"
                )))
            }
        };

        let cleaned = strip(&map);
        let errors = self.schema.check(&cleaned);
        if !errors.is_empty() {
            return Err(StoreError::Validation(errors));
        }

        serde_json::from_value(Value::Object(cleaned)).map_err(Into::into)
    }
}
