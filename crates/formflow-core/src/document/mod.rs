//! Form documents: JSON text to [`FormConfig`].
//!
//! The engine itself never parses documents. This module is the
//! collaborator that does, and it guarantees what the engine relies on: a
//! top-level object with a non-empty `formTitle` and a `fields` array.
//!
//! # Architecture
//!
//! ```text
//! JSON text
//!   ↓ shape checks (serde_json::Value)
//! config_dto types
//!   ↓ validate + convert
//! FormConfig (pure domain model)
//! ```

use miette::{Diagnostic, SourceSpan};
use serde_json::Value;

use crate::model::FormConfig;

pub mod config_dto;
pub mod loader;

pub use loader::LoadError;

/// Errors from parsing and loading a form document.
#[derive(Debug, thiserror::Error, Diagnostic)]
pub enum LoadConfigError {
    /// The text is not valid JSON, or a value has the wrong JSON type.
    #[error("invalid JSON: {source}")]
    #[diagnostic(
        code(formflow::document::json),
        help("fix the syntax or value type at the marked position")
    )]
    Json {
        /// Parser error.
        source: serde_json::Error,
        /// The document text.
        #[source_code]
        input: String,
        /// Where the parser stopped.
        #[label("here")]
        span: SourceSpan,
    },

    /// The document does not have the top-level form shape.
    #[error("{0}")]
    #[diagnostic(
        code(formflow::document::shape),
        help("a form document is an object with a 'formTitle' string and a 'fields' array")
    )]
    Shape(String),

    /// A field definition is invalid.
    #[error("{0}")]
    #[diagnostic(code(formflow::document::field))]
    Load(#[from] LoadError),
}

impl LoadConfigError {
    fn json(source: serde_json::Error, input: &str) -> Self {
        let offset = offset_of(input, source.line(), source.column());
        Self::Json {
            source,
            input: input.to_string(),
            span: SourceSpan::from((offset, 0)),
        }
    }
}

/// Parses a JSON form document and converts it into a [`FormConfig`].
///
/// # Errors
///
/// Returns [`LoadConfigError::Shape`] for empty input, a missing `fields`
/// array or a missing or empty `formTitle`; [`LoadConfigError::Json`] for
/// syntax and type errors; [`LoadConfigError::Load`] for invalid fields.
pub fn load_config_from_json(input: &str) -> Result<FormConfig, LoadConfigError> {
    if input.trim().is_empty() {
        return Err(LoadConfigError::Shape("Input cannot be empty".to_string()));
    }

    let value: Value =
        serde_json::from_str(input).map_err(|e| LoadConfigError::json(e, input))?;
    check_shape(&value)?;

    let dto: config_dto::FormConfigDto =
        serde_json::from_str(input).map_err(|e| LoadConfigError::json(e, input))?;
    Ok(loader::load(dto)?)
}

fn check_shape(value: &Value) -> Result<(), LoadConfigError> {
    if !value.get("fields").is_some_and(Value::is_array) {
        return Err(LoadConfigError::Shape(
            "Define the input fields as an array in the property 'fields'".to_string(),
        ));
    }

    let has_title = match value.get("formTitle") {
        None | Some(Value::Null) => false,
        Some(Value::String(s)) => !s.is_empty(),
        Some(_) => true,
    };
    if !has_title {
        return Err(LoadConfigError::Shape(
            "'formTitle' field is mandatory".to_string(),
        ));
    }

    Ok(())
}

/// Byte offset of a 1-based line/column position, clamped to the input.
fn offset_of(input: &str, line: usize, column: usize) -> usize {
    let line_start: usize = input
        .split_inclusive('\n')
        .take(line.saturating_sub(1))
        .map(str::len)
        .sum();
    (line_start + column.saturating_sub(1)).min(input.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shape_error(input: &str) -> String {
        match load_config_from_json(input) {
            Err(LoadConfigError::Shape(message)) => message,
            other => panic!("expected a shape error, got {other:?}"),
        }
    }

    #[test]
    fn loads_minimal_document() {
        let config = load_config_from_json(r#"{"formTitle": "T", "fields": []}"#).unwrap();
        assert_eq!(config.form_title, "T");
        assert!(config.fields.is_empty());
    }

    #[test]
    fn rejects_empty_input() {
        assert_eq!(shape_error("  \n"), "Input cannot be empty");
    }

    #[test]
    fn rejects_missing_fields_array() {
        assert_eq!(
            shape_error(r#"{"formTitle": "T", "fields": {}}"#),
            "Define the input fields as an array in the property 'fields'"
        );
        assert_eq!(
            shape_error("[1, 2]"),
            "Define the input fields as an array in the property 'fields'"
        );
    }

    #[test]
    fn rejects_missing_or_empty_title() {
        assert_eq!(
            shape_error(r#"{"fields": []}"#),
            "'formTitle' field is mandatory"
        );
        assert_eq!(
            shape_error(r#"{"formTitle": "", "fields": []}"#),
            "'formTitle' field is mandatory"
        );
    }

    #[test]
    fn syntax_error_points_at_position() {
        let input = "{\n  \"formTitle\": \"T\",\n  \"fields\": [,]\n}";
        let Err(LoadConfigError::Json { span, .. }) = load_config_from_json(input) else {
            panic!("expected a JSON error");
        };
        assert_eq!(&input[span.offset()..=span.offset()], ",");
    }

    #[test]
    fn wrong_title_type_is_a_json_error() {
        let err = load_config_from_json(r#"{"formTitle": 5, "fields": []}"#).unwrap_err();
        assert!(matches!(err, LoadConfigError::Json { .. }));
    }

    #[test]
    fn field_errors_are_wrapped() {
        let err = load_config_from_json(
            r#"{"formTitle": "T", "fields": [{"id": "a", "type": "slider"}]}"#,
        )
        .unwrap_err();
        assert!(matches!(err, LoadConfigError::Load(LoadError::UnknownFieldType { .. })));
        assert_eq!(err.to_string(), "fields[0].type: unknown field type `slider`");
    }

    #[test]
    fn diagnostics_have_codes() {
        let err = load_config_from_json("").unwrap_err();
        assert_eq!(
            err.code().map(|c| c.to_string()),
            Some("formflow::document::shape".to_string())
        );
    }
}
