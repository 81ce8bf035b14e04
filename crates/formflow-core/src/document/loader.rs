//! DTO → Domain model conversion with validation.

use std::collections::HashSet;

use serde_json::Value;

use crate::model::{
    Action, ConditionalRule, FieldDefinition, FieldOption, FieldType, FormConfig, ModelError,
    Operator, Pattern, SubmitButton, ValidationSpec,
};
use crate::value::{FieldValue, Scalar, ValueError};

use super::config_dto::{ConditionalDto, FieldDto, FormConfigDto, OptionDto, ValidationDto};

/// Errors during DTO → Domain conversion.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    /// A field-level validation error.
    #[error("{context}: {source}")]
    Validation {
        /// Where the error occurred (e.g., "fields[2].validation.pattern").
        context: String,
        /// The underlying model error.
        source: ModelError,
    },

    /// A value has no field value representation.
    #[error("{context}: {source}")]
    Value {
        /// Where the error occurred.
        context: String,
        /// The underlying conversion error.
        source: ValueError,
    },

    /// Unknown field type string.
    #[error("{context}: unknown field type `{value}`")]
    UnknownFieldType {
        /// Where the error occurred.
        context: String,
        /// The invalid value.
        value: String,
    },

    /// Unknown action string.
    #[error("{context}: unknown action `{value}`, expected: show, hide")]
    UnknownAction {
        /// Where the error occurred.
        context: String,
        /// The invalid value.
        value: String,
    },

    /// An option value is neither a string nor a number.
    #[error("{context}: option values must be strings or numbers")]
    InvalidOption {
        /// Where the error occurred.
        context: String,
    },
}

/// Converts a `FormConfigDto` to a validated `FormConfig`.
///
/// Unknown operators and rules reading undefined ids are accepted; the
/// engine decides what they mean.
///
/// # Errors
///
/// Returns the first error encountered during conversion.
pub fn load(dto: FormConfigDto) -> Result<FormConfig, LoadError> {
    let mut seen: HashSet<String> = HashSet::with_capacity(dto.fields.len());

    let fields = dto
        .fields
        .into_iter()
        .enumerate()
        .map(|(i, field)| {
            let ctx = format!("fields[{i}]");
            if !seen.insert(field.id.clone()) {
                return Err(LoadError::Validation {
                    context: format!("{ctx}.id"),
                    source: ModelError::DuplicateFieldId { id: field.id },
                });
            }
            convert_field(field, &ctx)
        })
        .collect::<Result<Vec<_>, _>>()?;

    let submit_button = dto
        .submit_button
        .map(|b| SubmitButton {
            text: b.text,
            variant: b.variant,
        })
        .unwrap_or_default();

    Ok(FormConfig {
        form_title: dto.form_title,
        fields,
        submit_button,
    })
}

fn convert_field(dto: FieldDto, ctx: &str) -> Result<FieldDefinition, LoadError> {
    if dto.id.trim().is_empty() {
        return Err(LoadError::Validation {
            context: format!("{ctx}.id"),
            source: ModelError::EmptyFieldId,
        });
    }

    let field_type =
        FieldType::parse(&dto.field_type).ok_or_else(|| LoadError::UnknownFieldType {
            context: format!("{ctx}.type"),
            value: dto.field_type.clone(),
        })?;

    let options = dto
        .options
        .iter()
        .enumerate()
        .map(|(j, o)| convert_option(o, &format!("{ctx}.options[{j}]")))
        .collect::<Result<Vec<_>, _>>()?;

    let validation = dto
        .validation
        .map(|v| convert_validation(v, &format!("{ctx}.validation")))
        .transpose()?;

    let conditional = dto
        .conditional
        .map(|c| convert_conditional(c, &format!("{ctx}.conditional")))
        .transpose()?;

    let default_value = dto
        .default_value
        .as_ref()
        .map(|v| convert_value(v, &format!("{ctx}.defaultValue")))
        .transpose()?;

    Ok(FieldDefinition {
        id: dto.id,
        field_type,
        label: dto.label,
        required: dto.required,
        options,
        validation,
        conditional,
        default_value,
        placeholder: dto.placeholder,
        disabled: dto.disabled,
        rows: dto.rows,
    })
}

fn convert_option(dto: &OptionDto, ctx: &str) -> Result<FieldOption, LoadError> {
    let value = match &dto.value {
        Value::String(s) => Scalar::Text(s.clone()),
        Value::Number(n) => n.as_f64().map(Scalar::Number).ok_or_else(|| {
            LoadError::InvalidOption {
                context: format!("{ctx}.value"),
            }
        })?,
        _ => {
            return Err(LoadError::InvalidOption {
                context: format!("{ctx}.value"),
            })
        }
    };
    Ok(FieldOption::new(value, dto.label.clone()))
}

fn convert_validation(dto: ValidationDto, ctx: &str) -> Result<ValidationSpec, LoadError> {
    let pattern = dto
        .pattern
        .as_deref()
        .map(|p| {
            Pattern::new(p).map_err(|e| LoadError::Validation {
                context: format!("{ctx}.pattern"),
                source: e,
            })
        })
        .transpose()?;

    Ok(ValidationSpec {
        min: dto.min,
        max: dto.max,
        pattern,
        message: dto.message,
        value: dto.value,
    })
}

fn convert_conditional(dto: ConditionalDto, ctx: &str) -> Result<ConditionalRule, LoadError> {
    let action = match dto.action.as_str() {
        "show" => Action::Show,
        "hide" => Action::Hide,
        other => {
            return Err(LoadError::UnknownAction {
                context: format!("{ctx}.action"),
                value: other.to_string(),
            })
        }
    };

    let value = dto
        .value
        .as_ref()
        .map(|v| convert_value(v, &format!("{ctx}.value")))
        .transpose()?;

    Ok(ConditionalRule {
        field: dto.field,
        operator: Operator::parse(&dto.operator),
        value,
        action,
    })
}

fn convert_value(value: &Value, ctx: &str) -> Result<FieldValue, LoadError> {
    FieldValue::from_json(value).map_err(|e| LoadError::Value {
        context: ctx.to_string(),
        source: e,
    })
}
