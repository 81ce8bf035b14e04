//! Run command implementation.

use anyhow::{bail, Context, Result};
use formflow_core::document::load_config_from_json;
use formflow_core::{FieldValue, FormError, FormStore, Submission};
use std::path::Path;

use super::output::{self, RunReport};
use crate::config_resolver::ConfigSource;
use crate::{Finish, OutputFormat};

/// Runs the run command.
pub fn run(
    file: &Path,
    assignments: &[String],
    finish: Finish,
    format: OutputFormat,
    source: &ConfigSource,
) -> Result<()> {
    let engine_config = source.load()?;

    let content = std::fs::read_to_string(file)
        .with_context(|| format!("Failed to read {}", file.display()))?;
    let config = match load_config_from_json(&content) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("{:?}", miette::Report::new(err));
            std::process::exit(1);
        }
    };

    let edits = assignments
        .iter()
        .map(|raw| parse_assignment(raw))
        .collect::<Result<Vec<_>>>()?;

    let mut store = FormStore::with_config(&engine_config);
    store.initialize(config);

    let prefill = store.prefill(edits)?;
    for (id, err) in &prefill.rejected {
        tracing::warn!("Skipped --set {id}: {err}");
    }

    let submission = match finish {
        Finish::None => None,
        Finish::Validate => {
            store.validate()?;
            None
        }
        Finish::Submit => submit(&mut store)?,
    };

    let report = RunReport::new(&store, &prefill.rejected, submission);
    output::print(&report, format)?;

    if finish != Finish::None && !report.is_form_valid {
        std::process::exit(1);
    }

    Ok(())
}

fn submit(store: &mut FormStore) -> Result<Option<Submission>> {
    match store.submit() {
        Ok(submission) => Ok(Some(submission)),
        Err(FormError::Invalid { .. }) => Ok(None),
        Err(err) => Err(err.into()),
    }
}

/// Splits `id=value`. The value is read as JSON when it parses as a field
/// value, and as plain text otherwise.
fn parse_assignment(raw: &str) -> Result<(String, FieldValue)> {
    let Some((id, value)) = raw.split_once('=') else {
        bail!("Invalid --set `{raw}`: expected ID=VALUE");
    };
    let id = id.trim();
    if id.is_empty() {
        bail!("Invalid --set `{raw}`: field id is empty");
    }

    let value = serde_json::from_str::<serde_json::Value>(value)
        .ok()
        .and_then(|json| FieldValue::from_json(&json).ok())
        .unwrap_or_else(|| FieldValue::text(value));

    Ok((id.to_string(), value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use formflow_core::Scalar;

    #[test]
    fn json_values_are_typed() {
        assert_eq!(
            parse_assignment("age=42").unwrap(),
            ("age".to_string(), FieldValue::Number(42.0))
        );
        assert_eq!(
            parse_assignment("terms=true").unwrap().1,
            FieldValue::Bool(true)
        );
        assert_eq!(
            parse_assignment(r#"tags=["a",1]"#).unwrap().1,
            FieldValue::List(vec![Scalar::from("a"), Scalar::from(1.0)])
        );
        assert_eq!(
            parse_assignment(r#"name="quoted""#).unwrap().1,
            FieldValue::text("quoted")
        );
    }

    #[test]
    fn other_values_are_text() {
        assert_eq!(
            parse_assignment("userType=business").unwrap().1,
            FieldValue::text("business")
        );
        assert_eq!(
            parse_assignment("note=a=b").unwrap().1,
            FieldValue::text("a=b")
        );
        assert_eq!(parse_assignment("empty=").unwrap().1, FieldValue::text(""));
        assert_eq!(
            parse_assignment(r#"obj={"x":1}"#).unwrap().1,
            FieldValue::text(r#"{"x":1}"#)
        );
    }

    #[test]
    fn rejects_malformed_assignments() {
        assert!(parse_assignment("no-equals").is_err());
        assert!(parse_assignment("=value").is_err());
    }
}
