use colored::*;
use eyre::Result;

use crate::cli::OutputFormat;
use crate::config::Config;
use crate::filter::{Filter, prompts};

pub fn run(format: OutputFormat, config: &Config) -> Result<()> {
    let mut filter = Filter::new(config.filter.clone());
    let personas = filter.personas();

    for error in personas.errors() {
        log::warn!("Persona config: {}", error);
    }

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&personas)?);
        }
        OutputFormat::Yaml => {
            print!("{}", serde_yaml::to_string(&personas)?);
        }
        OutputFormat::Text => {
            if !personas.is_valid() {
                eprintln!(
                    "{} Persona file has {} problem(s), run {} for details",
                    "⚠".yellow(),
                    personas.errors().len(),
                    "hotswap validate".cyan()
                );
            } else if !filter.is_config_valid() {
                eprintln!("{} No persona file found, showing built-in personas", "⚠".yellow());
            }

            println!("{}", prompts::persona_list(&config.filter, &personas));
            println!();
            println!("Source: {}", config.filter.persona_source_path().display());
        }
    }

    Ok(())
}
