//! Check command implementation.

use anyhow::{Context, Result};
use formflow_core::document::load_config_from_json;
use std::path::Path;

/// Runs the check command.
pub fn run(file: &Path) -> Result<()> {
    let content = std::fs::read_to_string(file)
        .with_context(|| format!("Failed to read {}", file.display()))?;

    match load_config_from_json(&content) {
        Ok(config) => {
            println!("ok: {} ({} fields)", config.form_title, config.fields.len());
            Ok(())
        }
        Err(err) => {
            eprintln!("{:?}", miette::Report::new(err));
            std::process::exit(1);
        }
    }
}
