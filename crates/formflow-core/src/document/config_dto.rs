//! JSON deserialization types (DTO layer).
//!
//! These types exist solely for serde deserialization.
//! They are converted to domain model types via the loader.
//!
//! Values whose type depends on the field (`defaultValue`,
//! `conditional.value`, option values) are kept as raw JSON here.

use serde::Deserialize;
use serde_json::Value;

/// Raw JSON representation of a form document.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormConfigDto {
    /// Form heading.
    pub form_title: String,
    /// Field definitions in display order.
    #[serde(default)]
    pub fields: Vec<FieldDto>,
    /// Submit button display settings.
    #[serde(default)]
    pub submit_button: Option<SubmitButtonDto>,
}

/// JSON representation of one field.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldDto {
    /// Unique key.
    pub id: String,
    /// Field type name (e.g., "select").
    #[serde(rename = "type")]
    pub field_type: String,
    /// Display label.
    #[serde(default)]
    pub label: String,
    /// Whether a value must be entered.
    #[serde(default)]
    pub required: bool,
    /// Input hint.
    #[serde(default)]
    pub placeholder: Option<String>,
    /// Read-only flag.
    #[serde(default)]
    pub disabled: bool,
    /// Textarea line count.
    #[serde(default)]
    pub rows: Option<u32>,
    /// Choice options.
    #[serde(default)]
    pub options: Vec<OptionDto>,
    /// Validation settings.
    #[serde(default)]
    pub validation: Option<ValidationDto>,
    /// Visibility rule.
    #[serde(default)]
    pub conditional: Option<ConditionalDto>,
    /// Initial value.
    #[serde(default)]
    pub default_value: Option<Value>,
}

/// JSON representation of a choice option.
#[derive(Debug, Clone, Deserialize)]
pub struct OptionDto {
    /// Stored value (string or number).
    pub value: Value,
    /// Display label.
    pub label: String,
}

/// JSON representation of validation settings.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ValidationDto {
    /// Lower bound.
    #[serde(default)]
    pub min: Option<f64>,
    /// Upper bound.
    #[serde(default)]
    pub max: Option<f64>,
    /// Regular expression source.
    #[serde(default)]
    pub pattern: Option<String>,
    /// Custom failure message.
    #[serde(default)]
    pub message: Option<String>,
    /// Required checkbox state.
    #[serde(default)]
    pub value: Option<bool>,
}

/// JSON representation of a conditional rule.
#[derive(Debug, Clone, Deserialize)]
pub struct ConditionalDto {
    /// Id of the field being read.
    pub field: String,
    /// Operator name (e.g., "equals").
    pub operator: String,
    /// Comparison operand.
    #[serde(default)]
    pub value: Option<Value>,
    /// "show" or "hide".
    pub action: String,
}

/// JSON representation of the submit button.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitButtonDto {
    /// Caption.
    #[serde(default)]
    pub text: Option<String>,
    /// Visual variant.
    #[serde(default)]
    pub variant: Option<String>,
}
