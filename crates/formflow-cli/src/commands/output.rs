//! Shared output formatting for form state.

use anyhow::Result;
use formflow_core::{FieldValue, FormError, FormStore, StorePhase, Submission};
use serde::Serialize;
use std::collections::BTreeMap;

use crate::OutputFormat;

/// One visible field.
#[derive(Debug, Serialize)]
pub struct FieldLine {
    /// Field id.
    pub id: String,
    /// Field label.
    pub label: String,
    /// Current value.
    pub value: FieldValue,
    /// Recorded error.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// What `run` prints.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunReport {
    /// Form heading.
    pub form_title: String,
    /// Store phase after the run.
    pub phase: StorePhase,
    /// Visible fields in config order.
    pub fields: Vec<FieldLine>,
    /// Whether no errors are recorded.
    pub is_form_valid: bool,
    /// `--set` ids that were skipped, with the reason.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub rejected: BTreeMap<String, String>,
    /// Submitted values, when the form was submitted.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub submission: Option<Submission>,
}

impl RunReport {
    /// Captures the store's current state.
    pub fn new(
        store: &FormStore,
        rejected: &[(String, FormError)],
        submission: Option<Submission>,
    ) -> Self {
        let state = store.state();
        let fields = store
            .visible_fields()
            .map(|field| FieldLine {
                id: field.id.clone(),
                label: field.label.clone(),
                value: state.value(&field.id).cloned().unwrap_or_default(),
                error: state.error(&field.id).map(str::to_string),
            })
            .collect();

        Self {
            form_title: store
                .config()
                .map(|c| c.form_title.clone())
                .unwrap_or_default(),
            phase: store.phase(),
            fields,
            is_form_valid: state.is_form_valid(),
            rejected: rejected
                .iter()
                .map(|(id, err)| (id.clone(), err.to_string()))
                .collect(),
            submission,
        }
    }
}

/// Print a run report in the specified format.
pub fn print(report: &RunReport, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Text => print_text(report),
        OutputFormat::Json => return print_json(report),
        OutputFormat::Compact => print_compact(report),
    }
    Ok(())
}

fn print_text(report: &RunReport) {
    println!("{} [{}]", report.form_title, report.phase);
    println!();

    let width = report.fields.iter().map(|f| f.id.len()).max().unwrap_or(0);
    for field in &report.fields {
        println!("  {:<width$} = {}", field.id, json_value(&field.value));
        if let Some(error) = &field.error {
            println!("  {:<width$}   \x1b[31merror\x1b[0m: {error}", "");
        }
    }

    for (id, reason) in &report.rejected {
        println!("\n  \x1b[33mskipped\x1b[0m {id}: {reason}");
    }

    if let Some(submission) = &report.submission {
        println!("\n\x1b[32mSubmitted {} field(s)\x1b[0m", submission.len());
        for (id, value) in submission.values() {
            println!("  {id} = {}", json_value(value));
        }
        return;
    }

    let errors = report.fields.iter().filter(|f| f.error.is_some()).count();
    if report.phase == StorePhase::Validated {
        if errors == 0 {
            println!("\n\x1b[32mForm is valid\x1b[0m");
        } else {
            println!("\n\x1b[31mFound {errors} invalid field(s)\x1b[0m");
        }
    }
}

fn print_json(report: &RunReport) -> Result<()> {
    let json = serde_json::to_string_pretty(report)?;
    println!("{json}");
    Ok(())
}

fn print_compact(report: &RunReport) {
    for field in &report.fields {
        match &field.error {
            Some(error) => println!("{}={} [{error}]", field.id, json_value(&field.value)),
            None => println!("{}={}", field.id, json_value(&field.value)),
        }
    }
}

fn json_value(value: &FieldValue) -> String {
    serde_json::to_string(value).unwrap_or_else(|_| value.to_display())
}
