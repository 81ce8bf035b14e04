//! Init command implementation.

use anyhow::{bail, Result};
use std::path::Path;

const DEFAULT_CONFIG: &str = r#"# formflow engine configuration

[rules]
# What an unrecognised conditional operator evaluates to.
#   "fail-open"   (default) the rule matches
#   "fail-closed" the rule does not match
unknown_operator = "fail-open"

[validation]
# min, max and pattern are only checked on required fields unless this is set.
enforce_optional_constraints = false
"#;

/// Runs the init command.
pub fn run(force: bool) -> Result<()> {
    let config_path = Path::new("formflow.toml");

    if config_path.exists() && !force {
        bail!(
            "Configuration file already exists at {}. Use --force to overwrite.",
            config_path.display()
        );
    }

    std::fs::write(config_path, DEFAULT_CONFIG)?;

    println!("Created formflow.toml");
    println!("\nNext steps:");
    println!("  1. Edit formflow.toml to configure the engine");
    println!("  2. Run: formflow run form.json --set field=value");

    Ok(())
}
