//! Validation of the visible fields' values.
//!
//! Only fields present in the value map are validated; hidden fields never
//! produce errors. Each field reports at most one message, from the first
//! failing check in this order:
//!
//! 1. required: the value is unset, `""` or an empty list
//! 2. checkbox state: `validation.value` on a `checkbox` field
//! 3. `validation.min`
//! 4. `validation.max`
//! 5. `validation.pattern`, for text values only
//!
//! Checks 3–5 only run on required fields unless the validator is told to
//! enforce them on optional fields too.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;
use tracing::debug;

use crate::model::{FieldDefinition, FieldType, FormConfig};
use crate::value::{format_number, FieldValue, ValueMap};

/// Field id → validation message.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    errors: BTreeMap<String, String>,
}

impl ValidationReport {
    /// Whether no field failed.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// All failures, keyed by field id.
    #[must_use]
    pub fn errors(&self) -> &BTreeMap<String, String> {
        &self.errors
    }

    /// The message for one field, if it failed.
    #[must_use]
    pub fn error(&self, id: &str) -> Option<&str> {
        self.errors.get(id).map(String::as_str)
    }

    /// Number of failing fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// Whether the report holds no failures.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Consumes the report, returning the error map.
    #[must_use]
    pub fn into_errors(self) -> BTreeMap<String, String> {
        self.errors
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (id, message)) in self.errors.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{id}: {message}")?;
        }
        Ok(())
    }
}

/// Validates values against their field definitions.
#[derive(Debug, Clone, Copy, Default)]
pub struct Validator {
    enforce_optional_constraints: bool,
}

impl Validator {
    /// Creates a validator.
    ///
    /// With `enforce_optional_constraints` set, `min`, `max` and `pattern`
    /// also apply to fields that are not required.
    #[must_use]
    pub fn new(enforce_optional_constraints: bool) -> Self {
        Self {
            enforce_optional_constraints,
        }
    }

    /// Validates every field present in `values`.
    ///
    /// Ids without a definition in `config` are skipped.
    #[must_use]
    pub fn validate(&self, config: &FormConfig, values: &ValueMap) -> ValidationReport {
        let errors: BTreeMap<String, String> = values
            .iter()
            .filter_map(|(id, value)| {
                let field = config.field(id)?;
                self.check_field(field, value)
                    .map(|message| (id.clone(), message))
            })
            .collect();

        debug!(checked = values.len(), failed = errors.len(), "validated form");
        ValidationReport { errors }
    }

    /// Returns the first failure message for one field, if any.
    #[must_use]
    pub fn check_field(&self, field: &FieldDefinition, value: &FieldValue) -> Option<String> {
        if field.required && value.is_blank() {
            return Some(format!("{} is required", field.label));
        }

        let spec = field.validation.as_ref()?;

        if field.field_type == FieldType::Checkbox {
            if let Some(expected) = spec.value {
                if *value != FieldValue::Bool(expected) {
                    let state = if expected { "checked" } else { "unchecked" };
                    return Some(
                        spec.message
                            .clone()
                            .unwrap_or_else(|| format!("{} must be {state}", field.label)),
                    );
                }
            }
        }

        if !field.required && (!self.enforce_optional_constraints || value.is_blank()) {
            return None;
        }

        if let Some(min) = spec.min {
            if value.to_number() < min {
                return Some(format!("{} must be at least {}", field.label, format_number(min)));
            }
        }

        if let Some(max) = spec.max {
            if value.to_number() > max {
                return Some(format!("{} must be at most {}", field.label, format_number(max)));
            }
        }

        if let (Some(pattern), FieldValue::Text(text)) = (&spec.pattern, value) {
            if !pattern.is_match(text) {
                return Some(
                    spec.message
                        .clone()
                        .unwrap_or_else(|| format!("{} format is invalid", field.label)),
                );
            }
        }

        None
    }
}
