use clap::{Parser, Subcommand, ValueEnum};
use std::io::IsTerminal;
use std::path::PathBuf;

/// Output format for commands
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text
    Text,
    /// JSON format
    Json,
    /// YAML format
    Yaml,
}

impl OutputFormat {
    /// Resolve the effective output format.
    /// If user specified a format, use it.
    /// Otherwise: TTY → Text, non-TTY (pipe) → Json
    pub fn resolve(user_choice: Option<OutputFormat>) -> OutputFormat {
        match user_choice {
            Some(fmt) => fmt,
            None => {
                if std::io::stdout().is_terminal() {
                    OutputFormat::Text
                } else {
                    OutputFormat::Json
                }
            }
        }
    }
}

#[derive(Parser)]
#[command(
    name = "hotswap",
    about = "Persona hot-swapping filter for chat message pipelines",
    version = env!("GIT_DESCRIBE"),
    after_help = "Logs are written to: ~/.local/share/hotswap/logs/hotswap.log"
)]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true, help = "Path to hotswap.yaml config file")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Filter inbound request bodies (JSON lines on stdin)
    Inlet {
        /// Start with the filter switched off
        #[arg(long)]
        off: bool,

        /// Exit without waiting for pending status closes
        #[arg(long)]
        no_wait: bool,
    },

    /// Pass outbound response bodies through (JSON lines on stdin)
    Outlet,

    /// List available personas
    List {
        /// Output format (default: text for TTY, json for pipes)
        #[arg(long, short = 'o', value_enum)]
        format: Option<OutputFormat>,
    },

    /// Validate a persona file
    Validate {
        /// Persona file (defaults to the configured one)
        path: Option<PathBuf>,
    },

    /// Write the default persona file
    Init {
        /// Overwrite an existing persona file
        #[arg(long)]
        force: bool,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        shell: clap_complete::Shell,
    },
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Show current configuration
    Show {
        /// Output format (default: text for TTY, json for pipes)
        #[arg(long, short = 'o', value_enum)]
        format: Option<OutputFormat>,
    },

    /// Get a configuration value
    Get {
        /// Config key (e.g., filter.keyword_prefix)
        key: String,
    },

    /// Set a configuration value
    Set {
        /// Config key
        key: String,

        /// Value to set
        value: String,
    },
}
