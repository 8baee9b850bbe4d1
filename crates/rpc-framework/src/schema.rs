//! # Schema Validation
//!
//! Declarative shapes for procedure inputs and outputs, checked against
//! `serde_json::Value`s.
//!
//! A schema either accepts a value and returns its normalized form (unknown object
//! keys stripped, absent optional fields omitted) or rejects it with every violated
//! constraint, each tagged with the path of the offending field. Validation has no
//! side effects, so the same schema can guard both directions of a call.
//!
//! ```rust
//! use rpc_framework::schema::Schema;
//! use serde_json::json;
//!
//! let user = Schema::object()
//!     .required("name", Schema::string().min_len(2))
//!     .required("email", Schema::string().email());
//!
//! assert!(user.validate(&json!({ "name": "Al", "email": "a@b.com" })).is_ok());
//!
//! let err = user.validate(&json!({ "name": "A", "email": "nope" })).unwrap_err();
//! assert_eq!(err.violations().len(), 2);
//! ```

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9_'+\-]+(\.[A-Za-z0-9_'+\-]+)*@([A-Za-z0-9][A-Za-z0-9\-]*\.)+[A-Za-z]{2,}$")
        .expect("valid email regex")
});

/// A declared shape.
#[derive(Debug, Clone, PartialEq)]
pub enum Schema {
    String(StringSchema),
    Boolean,
    Integer,
    Number,
    Array(Box<Schema>),
    Object(ObjectSchema),
}

/// Formats a string value may be required to match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StringFormat {
    Email,
}

/// String constraints. Lengths are counted in characters.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StringSchema {
    min_len: Option<usize>,
    max_len: Option<usize>,
    format: Option<StringFormat>,
}

/// A single field of an [`ObjectSchema`].
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub name: String,
    pub schema: Schema,
    pub required: bool,
}

/// Object shape with required and optional fields, in declaration order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ObjectSchema {
    fields: Vec<Field>,
}

/// One violated constraint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Violation {
    /// Dotted path to the offending value; empty for the value itself.
    pub path: String,
    /// The constraint that was not met.
    pub expected: String,
    /// The value that was found, or `None` when a required field was missing.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actual: Option<Value>,
}

/// Every violation found while validating one value.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationErrors(Vec<Violation>);

impl Schema {
    pub fn string() -> StringSchema {
        StringSchema::default()
    }

    pub fn boolean() -> Self {
        Self::Boolean
    }

    pub fn integer() -> Self {
        Self::Integer
    }

    pub fn number() -> Self {
        Self::Number
    }

    pub fn array(item: impl Into<Schema>) -> Self {
        Self::Array(Box::new(item.into()))
    }

    pub fn object() -> ObjectSchema {
        ObjectSchema::default()
    }

    /// Validates `value`, returning its normalized form or every violation found.
    pub fn validate(&self, value: &Value) -> Result<Value, ValidationErrors> {
        let mut violations = Vec::new();
        match self.check(value, "", &mut violations) {
            Some(normalized) if violations.is_empty() => Ok(normalized),
            _ => Err(ValidationErrors(violations)),
        }
    }

    fn check(&self, value: &Value, path: &str, out: &mut Vec<Violation>) -> Option<Value> {
        match self {
            Self::String(rules) => rules.check(value, path, out),
            Self::Boolean => accept_if(value.is_boolean(), "boolean", value, path, out),
            Self::Integer => accept_if(value.is_i64() || value.is_u64(), "integer", value, path, out),
            Self::Number => accept_if(value.is_number(), "number", value, path, out),
            Self::Array(item) => {
                let Some(values) = value.as_array() else {
                    out.push(Violation::mismatch(path, "array", value));
                    return None;
                };
                let mut normalized = Vec::with_capacity(values.len());
                let mut valid = true;
                for (index, element) in values.iter().enumerate() {
                    match item.check(element, &format!("{path}[{index}]"), out) {
                        Some(element) => normalized.push(element),
                        None => valid = false,
                    }
                }
                valid.then_some(Value::Array(normalized))
            }
            Self::Object(shape) => shape.check(value, path, out),
        }
    }
}

fn accept_if(
    ok: bool,
    expected: &str,
    value: &Value,
    path: &str,
    out: &mut Vec<Violation>,
) -> Option<Value> {
    if ok {
        Some(value.clone())
    } else {
        out.push(Violation::mismatch(path, expected, value));
        None
    }
}

impl StringSchema {
    pub fn min_len(mut self, min: usize) -> Self {
        self.min_len = Some(min);
        self
    }

    pub fn max_len(mut self, max: usize) -> Self {
        self.max_len = Some(max);
        self
    }

    pub fn email(mut self) -> Self {
        self.format = Some(StringFormat::Email);
        self
    }

    fn check(&self, value: &Value, path: &str, out: &mut Vec<Violation>) -> Option<Value> {
        let Some(text) = value.as_str() else {
            out.push(Violation::mismatch(path, "string", value));
            return None;
        };

        let before = out.len();
        let len = text.chars().count();
        if let Some(min) = self.min_len.filter(|min| len < *min) {
            out.push(Violation::mismatch(
                path,
                &format!("string with at least {min} character(s)"),
                value,
            ));
        }
        if let Some(max) = self.max_len.filter(|max| len > *max) {
            out.push(Violation::mismatch(
                path,
                &format!("string with at most {max} character(s)"),
                value,
            ));
        }
        if self.format == Some(StringFormat::Email) && !EMAIL_RE.is_match(text) {
            out.push(Violation::mismatch(path, "valid email address", value));
        }

        (out.len() == before).then(|| value.clone())
    }
}

impl From<StringSchema> for Schema {
    fn from(rules: StringSchema) -> Self {
        Self::String(rules)
    }
}

impl ObjectSchema {
    pub fn required(mut self, name: &str, schema: impl Into<Schema>) -> Self {
        self.fields.push(Field {
            name: name.to_string(),
            schema: schema.into(),
            required: true,
        });
        self
    }

    pub fn optional(mut self, name: &str, schema: impl Into<Schema>) -> Self {
        self.fields.push(Field {
            name: name.to_string(),
            schema: schema.into(),
            required: false,
        });
        self
    }

    /// Derives the same shape with every field optional.
    pub fn partial(&self) -> Self {
        Self {
            fields: self
                .fields
                .iter()
                .map(|field| Field {
                    required: false,
                    ..field.clone()
                })
                .collect(),
        }
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    /// Validates `value` against this shape; see [`Schema::validate`].
    pub fn validate(&self, value: &Value) -> Result<Value, ValidationErrors> {
        let mut violations = Vec::new();
        match self.check(value, "", &mut violations) {
            Some(normalized) if violations.is_empty() => Ok(normalized),
            _ => Err(ValidationErrors(violations)),
        }
    }

    fn check(&self, value: &Value, path: &str, out: &mut Vec<Violation>) -> Option<Value> {
        let Some(object) = value.as_object() else {
            out.push(Violation::mismatch(path, "object", value));
            return None;
        };

        let mut normalized = Map::new();
        let mut valid = true;
        for field in &self.fields {
            let field_path = if path.is_empty() {
                field.name.clone()
            } else {
                format!("{path}.{}", field.name)
            };
            // An explicit null counts as "not supplied" for optional fields.
            match object.get(&field.name).filter(|v| !v.is_null()) {
                Some(field_value) => match field.schema.check(field_value, &field_path, out) {
                    Some(checked) => {
                        normalized.insert(field.name.clone(), checked);
                    }
                    None => valid = false,
                },
                None if field.required => {
                    out.push(Violation {
                        path: field_path,
                        expected: "required field".to_string(),
                        actual: object.get(&field.name).cloned(),
                    });
                    valid = false;
                }
                None => {}
            }
        }

        valid.then_some(Value::Object(normalized))
    }
}

impl From<ObjectSchema> for Schema {
    fn from(shape: ObjectSchema) -> Self {
        Self::Object(shape)
    }
}

impl Violation {
    fn mismatch(path: &str, expected: &str, actual: &Value) -> Self {
        Self {
            path: path.to_string(),
            expected: expected.to_string(),
            actual: Some(actual.clone()),
        }
    }
}

impl ValidationErrors {
    pub fn violations(&self) -> &[Violation] {
        &self.0
    }

    pub fn into_violations(self) -> Vec<Violation> {
        self.0
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} validation issue(s)", self.0.len())?;
        for violation in &self.0 {
            let path = if violation.path.is_empty() {
                "<value>"
            } else {
                violation.path.as_str()
            };
            write!(f, "; {path}: expected {}", violation.expected)?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}
