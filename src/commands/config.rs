use colored::*;
use eyre::{Context, Result};
use std::fs;

use crate::cli::{ConfigAction, OutputFormat};
use crate::config::{Config, LogLevel};

pub fn run(action: ConfigAction, config: &Config) -> Result<()> {
    match action {
        ConfigAction::Show { format } => show(OutputFormat::resolve(format), config),
        ConfigAction::Get { key } => get(&key, config),
        ConfigAction::Set { key, value } => set(&key, &value, config),
    }
}

fn show(format: OutputFormat, config: &Config) -> Result<()> {
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(config)?);
        }
        OutputFormat::Yaml => {
            println!("{}", serde_yaml::to_string(config)?);
        }
        OutputFormat::Text => {
            println!("{}", "hotswap Configuration".bold());
            println!();

            println!("log_level: {}", config.log_level.as_filter());
            println!();

            let filter = &config.filter;
            println!("{}:", "filter".cyan());
            println!("  persona file: {}", filter.persona_source_path().display());
            println!("  keyword_prefix: {}", filter.keyword_prefix);
            println!("  reset_keywords: {}", filter.reset_keywords);
            println!("  list_command_keyword: {}", filter.list_command_keyword);
            println!("  case_sensitive: {}", filter.case_sensitive);
            println!("  show_persona_info: {}", filter.show_persona_info);
            println!("  persistent_persona: {}", filter.persistent_persona);
            println!(
                "  status_message_auto_close_delay_ms: {}",
                filter.status_message_auto_close_delay_ms
            );
            println!("  create_default_config: {}", filter.create_default_config);
            println!("  debug_performance: {}", filter.debug_performance);
        }
    }

    Ok(())
}

fn lookup(key: &str, config: &Config) -> Option<String> {
    let filter = &config.filter;
    let value = match key {
        "log_level" | "log-level" => config.log_level.as_filter().to_string(),
        "filter.cache_directory" => filter.cache_directory.display().to_string(),
        "filter.cache_directory_name" => filter.cache_directory_name.clone(),
        "filter.config_filename" => filter.config_filename.clone(),
        "filter.keyword_prefix" => filter.keyword_prefix.clone(),
        "filter.reset_keywords" => filter.reset_keywords.clone(),
        "filter.list_command_keyword" => filter.list_command_keyword.clone(),
        "filter.case_sensitive" => filter.case_sensitive.to_string(),
        "filter.show_persona_info" => filter.show_persona_info.to_string(),
        "filter.persistent_persona" => filter.persistent_persona.to_string(),
        "filter.status_message_auto_close_delay_ms" => filter.status_message_auto_close_delay_ms.to_string(),
        "filter.create_default_config" => filter.create_default_config.to_string(),
        "filter.debug_performance" => filter.debug_performance.to_string(),
        _ => return None,
    };
    Some(value)
}

fn get(key: &str, config: &Config) -> Result<()> {
    match lookup(key, config) {
        Some(v) => println!("{}", v),
        None => {
            eprintln!("{} Unknown config key: {}", "✗".red(), key);
            std::process::exit(1);
        }
    }

    Ok(())
}

fn parse_bool(value: &str) -> Result<bool> {
    value.parse().context("Invalid boolean value (use 'true' or 'false')")
}

/// Copy of `config` with `key` set to `value`
fn apply(key: &str, value: &str, config: &Config) -> Result<Config> {
    let mut new_config = config.clone();
    let filter = &mut new_config.filter;

    match key {
        "log_level" | "log-level" => {
            new_config.log_level = serde_yaml::from_str::<LogLevel>(value)
                .context("Invalid log level (use trace, debug, info, warn, error or off)")?;
        }
        "filter.cache_directory" => filter.cache_directory = value.into(),
        "filter.cache_directory_name" => filter.cache_directory_name = value.to_string(),
        "filter.config_filename" => filter.config_filename = value.to_string(),
        "filter.keyword_prefix" => filter.keyword_prefix = value.to_string(),
        "filter.reset_keywords" => filter.reset_keywords = value.to_string(),
        "filter.list_command_keyword" => filter.list_command_keyword = value.to_string(),
        "filter.case_sensitive" => filter.case_sensitive = parse_bool(value)?,
        "filter.show_persona_info" => filter.show_persona_info = parse_bool(value)?,
        "filter.persistent_persona" => filter.persistent_persona = parse_bool(value)?,
        "filter.status_message_auto_close_delay_ms" => {
            filter.status_message_auto_close_delay_ms =
                value.parse().context("Invalid delay (use a whole number of milliseconds)")?;
        }
        "filter.create_default_config" => filter.create_default_config = parse_bool(value)?,
        "filter.debug_performance" => filter.debug_performance = parse_bool(value)?,
        _ => {
            eyre::bail!("Unknown config key: {}", key);
        }
    }

    Ok(new_config)
}

fn set(key: &str, value: &str, config: &Config) -> Result<()> {
    println!("{} Setting {} = {}", "→".blue(), key.cyan(), value.green());

    let new_config = apply(key, value, config)?;

    let config_path = Config::hotswap_dir().join("hotswap.yaml");
    if let Some(parent) = config_path.parent() {
        fs::create_dir_all(parent)?;
    }

    let yaml_str = serde_yaml::to_string(&new_config).context("Failed to serialize config")?;
    fs::write(&config_path, yaml_str).context("Failed to write config file")?;

    println!("  {} Saved to {}", "✓".green(), config_path.display());

    Ok(())
}
