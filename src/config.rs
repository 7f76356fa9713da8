use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::pattern::PatternConfig;

/// Main hotswap configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub log_level: LogLevel,
    pub filter: FilterConfig,
}

/// Log verbosity written to the log file
#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
    Off,
}

impl LogLevel {
    pub fn as_filter(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
            LogLevel::Off => "off",
        }
    }

    pub fn to_level_filter(self) -> log::LevelFilter {
        match self {
            LogLevel::Trace => log::LevelFilter::Trace,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Off => log::LevelFilter::Off,
        }
    }
}

/// Filter settings supplied by the host. Every field is hot-reloadable.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct FilterConfig {
    /// Base directory holding per-filter cache directories
    pub cache_directory: PathBuf,
    /// Name of the directory (under `cache_directory`) storing the persona file
    pub cache_directory_name: String,
    /// Persona source filename
    pub config_filename: String,
    /// Characters that must precede a command keyword (e.g. `!coder`)
    pub keyword_prefix: String,
    /// Comma-separated keywords resetting to default behavior
    pub reset_keywords: String,
    /// Keyword (without prefix) listing available personas
    pub list_command_keyword: String,
    pub case_sensitive: bool,
    /// Show persona info in system messages and UI status events
    pub show_persona_info: bool,
    /// Keep the persona active across messages until changed
    pub persistent_persona: bool,
    pub status_message_auto_close_delay_ms: u64,
    /// Write the default personas when the source is missing or empty
    pub create_default_config: bool,
    /// Log timing information for loads and detection
    pub debug_performance: bool,
}

impl Default for FilterConfig {
    fn default() -> Self {
        let cache_directory = dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("hotswap")
            .join("cache");

        Self {
            cache_directory,
            cache_directory_name: "agent_hotswap".to_string(),
            config_filename: "personas.json".to_string(),
            keyword_prefix: "!".to_string(),
            reset_keywords: "reset,default,normal".to_string(),
            list_command_keyword: "list".to_string(),
            case_sensitive: false,
            show_persona_info: true,
            persistent_persona: true,
            status_message_auto_close_delay_ms: 5000,
            create_default_config: true,
            debug_performance: false,
        }
    }
}

impl FilterConfig {
    /// Location of the persona source:
    /// `<cache_directory>/<cache_directory_name>/<config_filename>`
    pub fn persona_source_path(&self) -> PathBuf {
        Config::expand_path(&self.cache_directory)
            .join(&self.cache_directory_name)
            .join(&self.config_filename)
    }

    /// The subset of settings that affects pattern compilation
    pub fn pattern_config(&self) -> PatternConfig {
        PatternConfig {
            prefix: self.keyword_prefix.clone(),
            reset_keywords: self.reset_keywords.clone(),
            list_keyword: self.list_command_keyword.clone(),
            case_sensitive: self.case_sensitive,
        }
    }

    /// Reset keywords split on commas, trimmed, blanks dropped
    pub fn reset_keyword_list(&self) -> Vec<String> {
        split_keywords(&self.reset_keywords)
    }
}

pub fn split_keywords(keywords: &str) -> Vec<String> {
    keywords
        .split(',')
        .map(|word| word.trim().to_string())
        .filter(|word| !word.is_empty())
        .collect()
}

impl Config {
    /// Load configuration with fallback chain
    pub fn load(config_path: Option<&PathBuf>) -> Result<Self> {
        if let Some(path) = config_path {
            return Self::load_from_file(path).context(format!("Failed to load config from {}", path.display()));
        }

        if let Ok(env_path) = std::env::var("HOTSWAP_CONFIG") {
            let path = PathBuf::from(env_path);
            if path.exists() {
                match Self::load_from_file(&path) {
                    Ok(config) => return Ok(config),
                    Err(e) => {
                        log::warn!("Failed to load config from HOTSWAP_CONFIG: {}", e);
                    }
                }
            }
        }

        if let Ok(hotswap_dir) = std::env::var("HOTSWAP_DIR") {
            let path = PathBuf::from(hotswap_dir).join("hotswap.yaml");
            if path.exists() {
                match Self::load_from_file(&path) {
                    Ok(config) => return Ok(config),
                    Err(e) => {
                        log::warn!("Failed to load config from HOTSWAP_DIR: {}", e);
                    }
                }
            }
        }

        if let Some(config_dir) = dirs::config_dir() {
            let path = config_dir.join("hotswap").join("hotswap.yaml");
            if path.exists() {
                match Self::load_from_file(&path) {
                    Ok(config) => return Ok(config),
                    Err(e) => {
                        log::warn!("Failed to load config from {}: {}", path.display(), e);
                    }
                }
            }
        }

        // For development
        let local_config = PathBuf::from("hotswap.yaml");
        if local_config.exists() {
            match Self::load_from_file(&local_config) {
                Ok(config) => return Ok(config),
                Err(e) => {
                    log::warn!("Failed to load local config: {}", e);
                }
            }
        }

        log::info!("No config file found, using defaults");
        Ok(Self::default())
    }

    fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path).context("Failed to read config file")?;

        let config: Self = serde_yaml::from_str(&content).context("Failed to parse config file")?;

        log::info!("Loaded config from: {}", path.as_ref().display());
        Ok(config)
    }

    /// Directory holding hotswap.yaml
    pub fn hotswap_dir() -> PathBuf {
        std::env::var("HOTSWAP_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| dirs::config_dir().unwrap_or_else(|| PathBuf::from(".")).join("hotswap"))
    }

    /// Expand a path that may contain ~ or env vars
    pub fn expand_path(path: &Path) -> PathBuf {
        let path_str = path.to_string_lossy();
        let expanded = shellexpand::full(&path_str).unwrap_or_else(|_| path_str.clone());
        PathBuf::from(expanded.as_ref())
    }
}
