//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum, ValueHint};

use crate::domain::{DomainError, YearRange};

/// Reshape humanitarian-aid records into an appeal/continent/country/year tree
#[derive(Parser, Debug)]
#[command(name = "aidtree")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Debug level: -d info, -dd debug, -ddd trace
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub debug: u8,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Config file (default: ./.aidtree.toml if present)
    #[arg(long, global = true, value_hint = ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    /// Dataset location: CSV path, http(s) URL, or - for stdin
    #[arg(long, global = true)]
    pub dataset: Option<String>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Year bounds; unset bounds come from the config.
#[derive(Args, Debug, Clone, Default)]
pub struct RangeArgs {
    /// First start year to include
    #[arg(long, value_parser = clap::value_parser!(i32).range(1900..=2023))]
    pub from: Option<i32>,

    /// Last start year to include
    #[arg(long, value_parser = clap::value_parser!(i32).range(1900..=2023))]
    pub to: Option<i32>,
}

impl RangeArgs {
    /// Combine with the configured default range.
    pub fn resolve(&self, default: YearRange) -> Result<YearRange, DomainError> {
        YearRange::new(
            self.from.unwrap_or(default.min()),
            self.to.unwrap_or(default.max()),
        )
    }
}

#[derive(ValueEnum, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Indented text tree
    #[default]
    Text,
    /// JSON tree for a rendering widget
    Json,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Build and show the appeal tree
    Tree {
        #[command(flatten)]
        range: RangeArgs,
        /// Output format
        #[arg(short, long, value_enum, default_value_t)]
        format: OutputFormat,
        /// Emit JSON wrapped with widget layout options (implies json)
        #[arg(long)]
        layout: bool,
    },

    /// List country aggregates per branch
    Countries {
        #[command(flatten)]
        range: RangeArgs,
    },

    /// Check the dataset and report dropped rows
    Validate,

    /// Print the navigation route for a range
    Route {
        #[command(flatten)]
        range: RangeArgs,
        /// Route base (default: from config)
        #[arg(long)]
        base: Option<String>,
    },

    /// Manage settings
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Generate shell completions
    Completion {
        /// Shell type
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show merged config
    Show,

    /// Create config template
    Init {
        /// Create global config instead of ./.aidtree.toml
        #[arg(short, long)]
        global: bool,
    },

    /// Show config paths
    Path,
}
