//! Check a persona file without loading it into a filter

use colored::*;
use eyre::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

use crate::config::Config;
use crate::persona::validate::validate;

pub fn run(path: Option<PathBuf>, config: &Config) -> Result<()> {
    let path = path.unwrap_or_else(|| config.filter.persona_source_path());
    let errors = check_file(&path)?;

    if errors.is_empty() {
        println!("{} {} is valid", "✓".green(), path.display());
        return Ok(());
    }

    println!("{} {}", "✗".red(), path.display());
    for error in &errors {
        println!("  {} {}", "-".red(), error);
    }

    eyre::bail!("{} problem(s) found in {}", errors.len(), path.display())
}

/// Every problem found in the persona file at `path`
pub fn check_file(path: &Path) -> Result<Vec<String>> {
    let content = fs::read_to_string(path).context(format!("Failed to read {}", path.display()))?;
    let value: serde_json::Value = match serde_json::from_str(&content) {
        Ok(value) => value,
        Err(e) => return Ok(vec![format!("Invalid JSON: {}", e)]),
    };

    Ok(validate(&value))
}
