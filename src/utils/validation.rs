//! Declarative payload validation.
//!
//! A schema is a slice of [`FieldRule`]s. [`validate`] walks it once and
//! reports every violated rule, so create and update checks are two modes of
//! the same routine rather than two hand-written validators.

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use thiserror::Error;

/// Which operation a payload is validated for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Every field is required.
    Create,
    /// Immutable fields are neither required nor checked.
    Update,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Non-empty string.
    Text,
    /// Whole number, optionally bounded below.
    Integer { minimum: Option<i64> },
}

impl FieldKind {
    fn type_name(self) -> &'static str {
        match self {
            FieldKind::Text => "string",
            FieldKind::Integer { .. } => "integer",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldRule {
    pub name: &'static str,
    pub kind: FieldKind,
    /// Set once on create, ignored on update.
    pub immutable: bool,
}

impl FieldRule {
    pub const fn text(name: &'static str) -> Self {
        Self {
            name,
            kind: FieldKind::Text,
            immutable: false,
        }
    }

    pub const fn integer(name: &'static str, minimum: Option<i64>) -> Self {
        Self {
            name,
            kind: FieldKind::Integer { minimum },
            immutable: false,
        }
    }

    pub const fn immutable(self) -> Self {
        Self {
            immutable: true,
            ..self
        }
    }

    fn applies_to(&self, mode: Mode) -> bool {
        match mode {
            Mode::Create => true,
            Mode::Update => !self.immutable,
        }
    }
}

/// One human-readable message per violated constraint.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("payload failed validation: {}", .errors.join("; "))]
pub struct ValidationError {
    pub errors: Vec<String>,
}

/// Check `payload` against `schema` for the given mode.
pub fn validate(payload: &Value, schema: &[FieldRule], mode: Mode) -> Result<(), ValidationError> {
    let Some(object) = payload.as_object() else {
        return Err(ValidationError {
            errors: vec!["instance is not of a type(s) object".to_string()],
        });
    };

    let errors: Vec<String> = schema
        .iter()
        .filter(|rule| rule.applies_to(mode))
        .filter_map(|rule| check_field(object, rule))
        .collect();

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ValidationError { errors })
    }
}

/// Validate, then deserialize into the typed record.
///
/// Whole-valued floats such as `264.0` are rewritten to integers first.
pub fn parse<T: DeserializeOwned>(
    mut payload: Value,
    schema: &[FieldRule],
    mode: Mode,
) -> Result<T, ValidationError> {
    validate(&payload, schema, mode)?;

    if let Some(object) = payload.as_object_mut() {
        let integer_fields = schema.iter().filter(|rule| {
            rule.applies_to(mode) && matches!(rule.kind, FieldKind::Integer { .. })
        });
        for rule in integer_fields {
            if let Some(value) = object.get_mut(rule.name) {
                if let Some(n) = as_integer(value) {
                    *value = Value::from(n);
                }
            }
        }
    }

    serde_json::from_value(payload).map_err(|e| ValidationError {
        errors: vec![e.to_string()],
    })
}

fn as_integer(value: &Value) -> Option<i64> {
    value.as_i64().or_else(|| {
        value
            .as_f64()
            .filter(|f| f.fract() == 0.0 && *f >= i64::MIN as f64 && *f < i64::MAX as f64)
            .map(|f| f as i64)
    })
}

fn check_field(object: &Map<String, Value>, rule: &FieldRule) -> Option<String> {
    let name = rule.name;
    let Some(value) = object.get(name) else {
        return Some(format!("instance requires property \"{name}\""));
    };

    let wrong_type = || {
        Some(format!(
            "instance.{name} is not of a type(s) {}",
            rule.kind.type_name()
        ))
    };

    match rule.kind {
        FieldKind::Text => match value.as_str() {
            None => wrong_type(),
            Some("") => Some(format!("instance.{name} does not meet minimum length of 1")),
            Some(_) => None,
        },
        FieldKind::Integer { minimum } => match as_integer(value) {
            None => wrong_type(),
            Some(n) => match minimum {
                Some(min) if n < min => Some(format!(
                    "instance.{name} must be greater than or equal to {min}"
                )),
                _ => None,
            },
        },
    }
}
