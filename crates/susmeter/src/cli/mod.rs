//! Command-line interface for susmeter.
//!
//! This module provides the CLI structure for the `susctl` binary.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub use commands::{
    ConfigCommand, ExportCommand, ExportFormatArg, ResultsCommand, SubmitCommand, SurveyCommand,
};

/// susctl - Score System Usability Scale questionnaires
///
/// Records SUS evaluations, reports aggregate results against the industry
/// average of 68, and exports the result history as JSON or CSV.
#[derive(Debug, Parser)]
#[command(name = "susctl")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to custom configuration file
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Increase verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// The command to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Score and record one evaluation given as q1=.. q10= answers
    Submit(SubmitCommand),

    /// Answer the ten statements interactively, then record the evaluation
    Survey(SurveyCommand),

    /// Show statistics and every recorded evaluation
    Results(ResultsCommand),

    /// Export the result history
    Export(ExportCommand),

    /// View or validate configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

impl Cli {
    /// Get the verbosity level based on flags.
    #[must_use]
    pub fn verbosity(&self) -> crate::logging::Verbosity {
        if self.quiet {
            crate::logging::Verbosity::Quiet
        } else {
            match self.verbose {
                0 => crate::logging::Verbosity::Normal,
                1 => crate::logging::Verbosity::Verbose,
                _ => crate::logging::Verbosity::Trace,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    fn cli_with(verbose: u8, quiet: bool) -> Cli {
        Cli {
            config: None,
            verbose,
            quiet,
            command: Command::Results(ResultsCommand { json: false }),
        }
    }

    #[test]
    fn test_cli_name() {
        let cli = Cli::command();
        assert_eq!(cli.get_name(), "susctl");
    }

    #[test]
    fn test_verbosity_levels() {
        use crate::logging::Verbosity;

        assert_eq!(cli_with(0, true).verbosity(), Verbosity::Quiet);
        assert_eq!(cli_with(3, true).verbosity(), Verbosity::Quiet);
        assert_eq!(cli_with(0, false).verbosity(), Verbosity::Normal);
        assert_eq!(cli_with(1, false).verbosity(), Verbosity::Verbose);
        assert_eq!(cli_with(2, false).verbosity(), Verbosity::Trace);
    }

    #[test]
    fn test_cli_verify() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_submit() {
        let args = vec!["susctl", "submit", "q1=4", "q2=2", "--lenient"];
        let cli = Cli::try_parse_from(args).unwrap();
        match cli.command {
            Command::Submit(cmd) => {
                assert!(cmd.lenient);
                assert!(!cmd.json);
                assert_eq!(cmd.form()["q2"], "2");
            }
            other => panic!("expected submit, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_submit_rejects_bare_value() {
        let args = vec!["susctl", "submit", "4"];
        assert!(Cli::try_parse_from(args).is_err());
    }

    #[test]
    fn test_parse_export() {
        let args = vec!["susctl", "export", "--format", "excel", "-o", "/tmp/out"];
        let cli = Cli::try_parse_from(args).unwrap();
        match cli.command {
            Command::Export(cmd) => {
                assert_eq!(cmd.format, ExportFormatArg::Excel);
                assert_eq!(cmd.output, Some(PathBuf::from("/tmp/out")));
            }
            other => panic!("expected export, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_export_defaults_to_json() {
        let cli = Cli::try_parse_from(vec!["susctl", "export"]).unwrap();
        assert!(matches!(
            cli.command,
            Command::Export(ExportCommand {
                format: ExportFormatArg::Json,
                output: None
            })
        ));
    }

    #[test]
    fn test_parse_export_rejects_unknown_format() {
        let args = vec!["susctl", "export", "--format", "xml"];
        assert!(Cli::try_parse_from(args).is_err());
    }

    #[test]
    fn test_parse_results_and_survey() {
        let cli = Cli::try_parse_from(vec!["susctl", "results", "--json"]).unwrap();
        assert!(matches!(
            cli.command,
            Command::Results(ResultsCommand { json: true })
        ));

        let cli = Cli::try_parse_from(vec!["susctl", "survey"]).unwrap();
        assert!(matches!(cli.command, Command::Survey(_)));
    }

    #[test]
    fn test_parse_config_validate() {
        let args = vec!["susctl", "config", "validate", "--file", "x.toml"];
        let cli = Cli::try_parse_from(args).unwrap();
        assert!(matches!(
            cli.command,
            Command::Config(ConfigCommand::Validate { file: Some(_) })
        ));
    }

    #[test]
    fn test_parse_with_config() {
        let args = vec!["susctl", "-c", "/custom/config.toml", "results"];
        let cli = Cli::try_parse_from(args).unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("/custom/config.toml")));
    }

    #[test]
    fn test_parse_with_verbose() {
        let args = vec!["susctl", "-vv", "results"];
        let cli = Cli::try_parse_from(args).unwrap();
        assert_eq!(cli.verbose, 2);
    }
}
