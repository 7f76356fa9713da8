//! Initialize hotswap configuration

use colored::*;
use eyre::{Context, Result};
use std::fs;
use std::path::Path;

use crate::config::Config;
use crate::persona::defaults::default_personas;
use crate::persona::source::{FileSource, PersonaSource, to_stable_json};

pub fn run(force: bool, config: &Config) -> Result<()> {
    let hotswap_dir = Config::hotswap_dir();
    println!("{} Initializing hotswap in {}", "→".blue(), hotswap_dir.display());

    write_config(&hotswap_dir.join("hotswap.yaml"), force)?;
    write_personas(&FileSource::new(config.filter.persona_source_path()), force)?;

    println!();
    println!("{} hotswap initialized!", "✓".green().bold());
    println!();
    println!("Next steps:");
    println!("  1. Edit the persona file to add your own personas");
    println!("  2. Run {} to check it", "hotswap validate".cyan());
    println!("  3. Run {} to see what is available", "hotswap list".cyan());

    Ok(())
}

fn write_config(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        println!("  {} Config already exists at {}", "✓".green(), path.display());
        println!("  Use {} to overwrite", "--force".cyan());
        return Ok(());
    }

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).context(format!("Failed to create {}", parent.display()))?;
    }

    let yaml_str = serde_yaml::to_string(&Config::default()).context("Failed to serialize config")?;
    fs::write(path, yaml_str).context("Failed to write hotswap.yaml")?;
    println!("  {} Created {}", "✓".green(), path.display());

    Ok(())
}

/// Write the built-in personas unless a persona file already exists
fn write_personas(source: &FileSource, force: bool) -> Result<bool> {
    if source.path().exists() && !force {
        println!("  {} Persona file already exists at {}", "✓".green(), source.path().display());
        return Ok(false);
    }

    let personas = default_personas();
    source.write(&to_stable_json(&personas)?)?;
    println!("  {} Wrote {} default personas to {}", "✓".green(), personas.len(), source.path().display());

    Ok(true)
}
