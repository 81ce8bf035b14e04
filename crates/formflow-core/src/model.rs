//! Domain model for form configurations.
//!
//! These types describe a loaded form and are immutable for the engine's
//! purposes. They carry no knowledge of the JSON document format; see
//! [`crate::document`] for parsing.

use crate::value::{FieldValue, Scalar};
use serde::Serialize;
use std::fmt;

// ────────────────────────────────────────────
// Field kinds
// ────────────────────────────────────────────

/// The input kind of a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldType {
    /// Single-line text.
    Text,
    /// Email address.
    Email,
    /// Telephone number.
    Tel,
    /// Masked text.
    Password,
    /// Numeric input.
    Number,
    /// Date picker.
    Date,
    /// Drop-down with one selection.
    Select,
    /// Radio buttons with one selection.
    Radio,
    /// Several checkboxes with any number of selections.
    CheckboxGroup,
    /// A single boolean checkbox.
    Checkbox,
    /// Multi-line text.
    Textarea,
}

impl FieldType {
    /// All field types, in documentation order.
    pub const ALL: [Self; 11] = [
        Self::Text,
        Self::Email,
        Self::Tel,
        Self::Password,
        Self::Number,
        Self::Date,
        Self::Select,
        Self::Radio,
        Self::CheckboxGroup,
        Self::Checkbox,
        Self::Textarea,
    ];

    /// Parses the document name of a field type.
    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.as_str() == name)
    }

    /// Returns the document name of this field type.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Email => "email",
            Self::Tel => "tel",
            Self::Password => "password",
            Self::Number => "number",
            Self::Date => "date",
            Self::Select => "select",
            Self::Radio => "radio",
            Self::CheckboxGroup => "checkbox_group",
            Self::Checkbox => "checkbox",
            Self::Textarea => "textarea",
        }
    }

    /// Whether this field type offers a list of options.
    #[must_use]
    pub fn has_options(self) -> bool {
        matches!(self, Self::Select | Self::Radio | Self::CheckboxGroup)
    }

    /// The value a field of this type holds when nothing was entered.
    #[must_use]
    pub fn zero_value(self) -> FieldValue {
        match self {
            Self::Checkbox => FieldValue::Bool(false),
            Self::CheckboxGroup => FieldValue::List(Vec::new()),
            Self::Number => FieldValue::Unset,
            Self::Text
            | Self::Email
            | Self::Tel
            | Self::Password
            | Self::Date
            | Self::Select
            | Self::Radio
            | Self::Textarea => FieldValue::empty_text(),
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A selectable option of a choice field.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldOption {
    /// Stored value when selected.
    pub value: Scalar,
    /// Display label.
    pub label: String,
}

impl FieldOption {
    /// Creates a new option.
    #[must_use]
    pub fn new(value: impl Into<Scalar>, label: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            label: label.into(),
        }
    }
}

// ────────────────────────────────────────────
// Validation settings
// ────────────────────────────────────────────

/// A compiled regular expression for `validation.pattern`.
///
/// The expression is compiled once at construction and matched as a search
/// (it is not implicitly anchored).
#[derive(Debug, Clone)]
pub struct Pattern {
    raw: String,
    compiled: regex::Regex,
}

impl Pattern {
    /// Compiles a pattern.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::InvalidPattern`] if the expression does not compile.
    pub fn new(pattern: &str) -> Result<Self, ModelError> {
        let compiled = regex::Regex::new(pattern).map_err(|e| ModelError::InvalidPattern {
            pattern: pattern.to_string(),
            reason: e.to_string(),
        })?;
        Ok(Self {
            raw: pattern.to_string(),
            compiled,
        })
    }

    /// Tests whether the text contains a match.
    #[must_use]
    pub fn is_match(&self, text: &str) -> bool {
        self.compiled.is_match(text)
    }

    /// Returns the pattern source.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.raw
    }
}

impl PartialEq for Pattern {
    fn eq(&self, other: &Self) -> bool {
        self.raw == other.raw
    }
}

impl Serialize for Pattern {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.raw)
    }
}

/// Per-field validation settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ValidationSpec {
    /// Lower numeric bound.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    /// Upper numeric bound.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    /// Pattern text values must contain.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pattern: Option<Pattern>,
    /// Custom failure message.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Required state of a checkbox.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<bool>,
}

impl ValidationSpec {
    /// Whether any range or pattern constraint is set.
    #[must_use]
    pub fn has_constraints(&self) -> bool {
        self.min.is_some() || self.max.is_some() || self.pattern.is_some()
    }
}

// ────────────────────────────────────────────
// Conditional rules
// ────────────────────────────────────────────

/// Comparison operator of a conditional rule.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(into = "String")]
pub enum Operator {
    /// Strict equality.
    Equals,
    /// Strict inequality.
    NotEquals,
    /// List membership, or substring match for non-lists.
    Contains,
    /// Numeric `>`.
    GreaterThan,
    /// Numeric `<`.
    LessThan,
    /// Falsy, empty list, or blank text.
    IsEmpty,
    /// Truthy, non-empty list, and non-blank text.
    IsNotEmpty,
    /// An operator name the engine does not know.
    ///
    /// Kept so that the unknown-operator policy can be applied at evaluation
    /// time instead of rejecting the document.
    Other(String),
}

impl Operator {
    /// All recognised operators.
    pub const KNOWN: [Self; 7] = [
        Self::Equals,
        Self::NotEquals,
        Self::Contains,
        Self::GreaterThan,
        Self::LessThan,
        Self::IsEmpty,
        Self::IsNotEmpty,
    ];

    /// Parses an operator name. Unknown names become [`Operator::Other`].
    #[must_use]
    pub fn parse(name: &str) -> Self {
        match name {
            "equals" => Self::Equals,
            "not_equals" => Self::NotEquals,
            "contains" => Self::Contains,
            "greater_than" => Self::GreaterThan,
            "less_than" => Self::LessThan,
            "is_empty" => Self::IsEmpty,
            "is_not_empty" => Self::IsNotEmpty,
            other => Self::Other(other.to_string()),
        }
    }

    /// Returns the document name of this operator.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Equals => "equals",
            Self::NotEquals => "not_equals",
            Self::Contains => "contains",
            Self::GreaterThan => "greater_than",
            Self::LessThan => "less_than",
            Self::IsEmpty => "is_empty",
            Self::IsNotEmpty => "is_not_empty",
            Self::Other(name) => name,
        }
    }

    /// Whether the operator compares against `rule.value`.
    #[must_use]
    pub fn takes_operand(&self) -> bool {
        !matches!(self, Self::IsEmpty | Self::IsNotEmpty)
    }
}

impl From<Operator> for String {
    fn from(op: Operator) -> Self {
        op.as_str().to_string()
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a matching rule does to its field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    /// The field is visible while the rule matches.
    Show,
    /// The field is hidden while the rule matches.
    Hide,
}

/// Makes a field's visibility depend on another field's value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConditionalRule {
    /// Id of the field whose value is read.
    pub field: String,
    /// Comparison to apply.
    pub operator: Operator,
    /// Comparison operand; absent for `is_empty` / `is_not_empty`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<FieldValue>,
    /// Effect of a match.
    pub action: Action,
}

impl ConditionalRule {
    /// Creates a rule that shows its field when `field` matches.
    #[must_use]
    pub fn show(field: impl Into<String>, operator: Operator, value: Option<FieldValue>) -> Self {
        Self {
            field: field.into(),
            operator,
            value,
            action: Action::Show,
        }
    }

    /// Creates a rule that hides its field when `field` matches.
    #[must_use]
    pub fn hide(field: impl Into<String>, operator: Operator, value: Option<FieldValue>) -> Self {
        Self {
            field: field.into(),
            operator,
            value,
            action: Action::Hide,
        }
    }
}

// ────────────────────────────────────────────
// Fields and forms
// ────────────────────────────────────────────

/// Definition of a single form field.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldDefinition {
    /// Unique key of the field.
    pub id: String,
    /// Input kind.
    #[serde(rename = "type")]
    pub field_type: FieldType,
    /// Display label, also used in validation messages.
    pub label: String,
    /// Whether a value must be entered.
    pub required: bool,
    /// Options of a choice field, in display order.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<FieldOption>,
    /// Validation settings.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub validation: Option<ValidationSpec>,
    /// Visibility rule.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conditional: Option<ConditionalRule>,
    /// Value to prefill when the field becomes visible.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_value: Option<FieldValue>,
    /// Hint shown in an empty input.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    /// Whether the input is read-only.
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub disabled: bool,
    /// Visible line count of a `textarea`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rows: Option<u32>,
}

impl FieldDefinition {
    /// Creates an optional, unconditional field without default.
    #[must_use]
    pub fn new(id: impl Into<String>, field_type: FieldType, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            field_type,
            label: label.into(),
            required: false,
            options: Vec::new(),
            validation: None,
            conditional: None,
            default_value: None,
            placeholder: None,
            disabled: false,
            rows: None,
        }
    }

    /// Marks the field as required.
    #[must_use]
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Sets the options.
    #[must_use]
    pub fn with_options(mut self, options: Vec<FieldOption>) -> Self {
        self.options = options;
        self
    }

    /// Sets the validation settings.
    #[must_use]
    pub fn with_validation(mut self, validation: ValidationSpec) -> Self {
        self.validation = Some(validation);
        self
    }

    /// Sets the visibility rule.
    #[must_use]
    pub fn with_conditional(mut self, rule: ConditionalRule) -> Self {
        self.conditional = Some(rule);
        self
    }

    /// Sets the default value.
    #[must_use]
    pub fn with_default(mut self, value: impl Into<FieldValue>) -> Self {
        self.default_value = Some(value.into());
        self
    }

    /// Id of the field this field's visibility depends on, if any.
    #[must_use]
    pub fn depends_on(&self) -> Option<&str> {
        self.conditional.as_ref().map(|rule| rule.field.as_str())
    }

    /// The value stored when this field becomes visible or is reset.
    ///
    /// Uses the configured default coerced to the field type, or the type's
    /// zero value:
    ///
    /// - `checkbox_group`: list defaults are kept, a single value is wrapped.
    /// - `checkbox`: the default's truthiness.
    /// - `number`: a non-blank default is coerced to a number, otherwise unset.
    /// - everything else: the default as given.
    #[must_use]
    pub fn initial_value(&self) -> FieldValue {
        let Some(default) = &self.default_value else {
            return self.field_type.zero_value();
        };

        match self.field_type {
            FieldType::CheckboxGroup => match default {
                FieldValue::List(_) => default.clone(),
                FieldValue::Number(n) => FieldValue::List(vec![Scalar::Number(*n)]),
                FieldValue::Text(s) => FieldValue::List(vec![Scalar::Text(s.clone())]),
                FieldValue::Bool(_) => FieldValue::List(vec![Scalar::Text(default.to_display())]),
                FieldValue::Unset => FieldValue::List(Vec::new()),
            },
            FieldType::Checkbox => FieldValue::Bool(default.is_truthy()),
            FieldType::Number => {
                if default.is_blank() && !matches!(default, FieldValue::List(_)) {
                    FieldValue::Unset
                } else {
                    FieldValue::Number(default.to_number())
                }
            }
            FieldType::Text
            | FieldType::Email
            | FieldType::Tel
            | FieldType::Password
            | FieldType::Date
            | FieldType::Select
            | FieldType::Radio
            | FieldType::Textarea => default.clone(),
        }
    }
}

/// Submit button display settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SubmitButton {
    /// Button caption.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    /// Visual variant name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub variant: Option<String>,
}

impl SubmitButton {
    /// The caption to display.
    #[must_use]
    pub fn caption(&self) -> &str {
        self.text.as_deref().unwrap_or("Submit")
    }
}

/// A complete form configuration.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FormConfig {
    /// Form heading.
    pub form_title: String,
    /// Fields in declaration order.
    pub fields: Vec<FieldDefinition>,
    /// Submit button settings.
    pub submit_button: SubmitButton,
}

impl FormConfig {
    /// Creates a form with a default submit button.
    #[must_use]
    pub fn new(form_title: impl Into<String>, fields: Vec<FieldDefinition>) -> Self {
        Self {
            form_title: form_title.into(),
            fields,
            submit_button: SubmitButton::default(),
        }
    }

    /// Looks up a field by id. The first definition wins on duplicates.
    #[must_use]
    pub fn field(&self, id: &str) -> Option<&FieldDefinition> {
        self.fields.iter().find(|f| f.id == id)
    }

    /// Whether a field with this id is defined.
    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.field(id).is_some()
    }

    /// Fields whose visibility rule reads `id`, in declaration order.
    pub fn dependents_of<'a>(&'a self, id: &'a str) -> impl Iterator<Item = &'a FieldDefinition> {
        self.fields
            .iter()
            .filter(move |f| f.depends_on() == Some(id))
    }
}

/// Errors building model values.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ModelError {
    /// A field id is empty.
    #[error("field id must not be empty")]
    EmptyFieldId,

    /// A field id is defined more than once.
    #[error("duplicate field id `{id}`")]
    DuplicateFieldId {
        /// The repeated id.
        id: String,
    },

    /// A validation pattern does not compile.
    #[error("invalid pattern `{pattern}`: {reason}")]
    InvalidPattern {
        /// The pattern source.
        pattern: String,
        /// Compiler message.
        reason: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    mod field_type {
        use super::*;

        #[test]
        fn parse_round_trips_all_names() {
            for t in FieldType::ALL {
                assert_eq!(FieldType::parse(t.as_str()), Some(t));
            }
            assert_eq!(FieldType::parse("slider"), None);
        }

        #[test]
        fn zero_values() {
            assert_eq!(FieldType::Checkbox.zero_value(), FieldValue::Bool(false));
            assert_eq!(
                FieldType::CheckboxGroup.zero_value(),
                FieldValue::List(vec![])
            );
            assert_eq!(FieldType::Number.zero_value(), FieldValue::Unset);
            assert_eq!(FieldType::Date.zero_value(), FieldValue::empty_text());
        }
    }

    mod operator {
        use super::*;

        #[test]
        fn parse_known_and_unknown() {
            for op in Operator::KNOWN {
                assert_eq!(Operator::parse(op.as_str()), op);
            }
            assert_eq!(
                Operator::parse("starts_with"),
                Operator::Other("starts_with".to_string())
            );
        }

        #[test]
        fn operand_requirement() {
            assert!(Operator::Equals.takes_operand());
            assert!(!Operator::IsEmpty.takes_operand());
            assert!(!Operator::IsNotEmpty.takes_operand());
        }
    }

    mod initial_value {
        use super::*;

        #[test]
        fn without_default_uses_zero_value() {
            let field = FieldDefinition::new("n", FieldType::Number, "N");
            assert_eq!(field.initial_value(), FieldValue::Unset);
        }

        #[test]
        fn checkbox_group_wraps_scalar_default() {
            let field = FieldDefinition::new("g", FieldType::CheckboxGroup, "G").with_default("a");
            assert_eq!(field.initial_value(), FieldValue::List(vec!["a".into()]));
        }

        #[test]
        fn checkbox_coerces_truthiness() {
            let field = FieldDefinition::new("c", FieldType::Checkbox, "C").with_default("yes");
            assert_eq!(field.initial_value(), FieldValue::Bool(true));
            let field = FieldDefinition::new("c", FieldType::Checkbox, "C").with_default(0.0);
            assert_eq!(field.initial_value(), FieldValue::Bool(false));
        }

        #[test]
        fn number_coerces_text_and_keeps_blank_unset() {
            let field = FieldDefinition::new("n", FieldType::Number, "N").with_default("25");
            assert_eq!(field.initial_value(), FieldValue::Number(25.0));
            let field = FieldDefinition::new("n", FieldType::Number, "N").with_default("");
            assert_eq!(field.initial_value(), FieldValue::Unset);
        }

        #[test]
        fn text_keeps_default_as_given() {
            let field = FieldDefinition::new("t", FieldType::Text, "T").with_default("hello");
            assert_eq!(field.initial_value(), FieldValue::text("hello"));
        }
    }

    #[test]
    fn pattern_rejects_invalid_regex() {
        assert!(matches!(
            Pattern::new("(unclosed"),
            Err(ModelError::InvalidPattern { .. })
        ));
        let pattern = Pattern::new(r"^\d{3}$").unwrap();
        assert!(pattern.is_match("123"));
        assert!(!pattern.is_match("12a"));
    }

    #[test]
    fn dependents_of_keeps_declaration_order() {
        let config = FormConfig::new(
            "T",
            vec![
                FieldDefinition::new("a", FieldType::Text, "A"),
                FieldDefinition::new("c", FieldType::Text, "C").with_conditional(
                    ConditionalRule::show("a", Operator::IsNotEmpty, None),
                ),
                FieldDefinition::new("b", FieldType::Text, "B").with_conditional(
                    ConditionalRule::show("a", Operator::IsEmpty, None),
                ),
            ],
        );
        let ids: Vec<&str> = config.dependents_of("a").map(|f| f.id.as_str()).collect();
        assert_eq!(ids, vec!["c", "b"]);
    }

    #[test]
    fn submit_caption_defaults() {
        assert_eq!(SubmitButton::default().caption(), "Submit");
    }
}
