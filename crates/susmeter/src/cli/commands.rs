//! CLI command definitions.
//!
//! This module defines the structure of all CLI subcommands.

use std::collections::BTreeMap;
use std::path::PathBuf;

use clap::{Args, Subcommand, ValueEnum};

use crate::export::ExportFormat;

/// Submit command arguments.
#[derive(Debug, Args)]
pub struct SubmitCommand {
    /// Answers as KEY=VALUE pairs, e.g. q1=4 q2=2 ... q10=3
    #[arg(value_name = "QN=ANSWER", value_parser = parse_answer)]
    pub answers: Vec<(String, String)>,

    /// Zero-fill missing answers and accept out-of-range values
    #[arg(short, long)]
    pub lenient: bool,

    /// Output as JSON
    #[arg(short, long)]
    pub json: bool,
}

impl SubmitCommand {
    /// The answers as a submitted form. A repeated key keeps its last value.
    #[must_use]
    pub fn form(&self) -> BTreeMap<String, String> {
        self.answers.iter().cloned().collect()
    }
}

/// Survey command arguments.
#[derive(Debug, Args)]
pub struct SurveyCommand {
    /// Output the result as JSON
    #[arg(short, long)]
    pub json: bool,
}

/// Results command arguments.
#[derive(Debug, Args)]
pub struct ResultsCommand {
    /// Output as JSON
    #[arg(short, long)]
    pub json: bool,
}

/// Export command arguments.
#[derive(Debug, Args)]
pub struct ExportCommand {
    /// Export format
    #[arg(short, long, value_enum, default_value = "json")]
    pub format: ExportFormatArg,

    /// Write to this file, or into this directory under the dated file name
    /// (defaults to stdout)
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,
}

/// Configuration commands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration
    Show {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Show the configuration file path
    Path,

    /// Validate configuration
    Validate {
        /// Path to configuration file to validate
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
}

/// Export format argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum ExportFormatArg {
    /// Pretty-printed JSON array
    #[default]
    Json,
    /// Comma-separated values with a header row
    Csv,
    /// Alias for csv
    Excel,
}

impl From<ExportFormatArg> for ExportFormat {
    fn from(arg: ExportFormatArg) -> Self {
        match arg {
            ExportFormatArg::Json => Self::Json,
            ExportFormatArg::Csv | ExportFormatArg::Excel => Self::Csv,
        }
    }
}

fn parse_answer(raw: &str) -> Result<(String, String), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected QN=ANSWER, got '{raw}'"))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("missing question key in '{raw}'"));
    }
    Ok((key.to_string(), value.to_string()))
}
