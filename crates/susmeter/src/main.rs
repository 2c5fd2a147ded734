//! `susctl` - CLI for susmeter
//!
//! This binary records SUS evaluations, prints the aggregated results and
//! exports the result history.

#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use chrono::Utc;
use clap::Parser;
use tracing::info;

use susmeter::cli::{
    Cli, Command, ConfigCommand, ExportCommand, ResultsCommand, SubmitCommand, SurveyCommand,
};
use susmeter::report::{ResultsReport, SubmissionReport};
use susmeter::survey::{MAX_ANSWER, MIN_ANSWER, QUESTIONS, QUESTION_COUNT};
use susmeter::{
    export, init_logging, storage, Config, ExportFormat, Statistics, Submission, SurveyResponse,
    SusEngine, ValidationMode,
};

/// Answer scale shown under every statement.
const SCALE_HINT: &str = "1 = Strongly disagree, 5 = Strongly agree";

fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbosity());

    let Cli {
        config: config_path,
        command,
        ..
    } = cli;

    let load_config =
        || Config::load_from(config_path.clone()).context("failed to load configuration");

    match command {
        Command::Submit(submit_cmd) => handle_submit(&load_config()?, &submit_cmd),
        Command::Survey(survey_cmd) => handle_survey(&load_config()?, &survey_cmd),
        Command::Results(results_cmd) => handle_results(&load_config()?, &results_cmd),
        Command::Export(export_cmd) => handle_export(&load_config()?, &export_cmd),
        Command::Config(config_cmd) => handle_config(config_path.clone(), config_cmd),
    }
}

fn handle_submit(config: &Config, cmd: &SubmitCommand) -> Result<()> {
    let mut engine = SusEngine::from_config(config)?;
    if cmd.lenient {
        engine = engine.with_validation_mode(ValidationMode::Lenient);
    }

    let submission = engine.submit(&cmd.form())?;
    print_submission(&submission, cmd.json)
}

fn handle_survey(config: &Config, cmd: &SurveyCommand) -> Result<()> {
    let engine = SusEngine::from_config(config)?;

    let responses = prompt_survey(io::stdin().lock(), io::stderr())?;
    let submission = engine.record(responses)?;
    print_submission(&submission, cmd.json)
}

fn print_submission(submission: &Submission, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(submission)?);
    } else {
        print!("{}", SubmissionReport(submission));
    }
    Ok(())
}

/// Ask each statement in turn until an answer in range is entered.
fn prompt_survey<R: BufRead, W: Write>(mut input: R, mut output: W) -> Result<SurveyResponse> {
    let mut answers = [0; QUESTION_COUNT];
    let mut line = String::new();

    for (index, statement) in QUESTIONS.iter().enumerate() {
        writeln!(output, "Q{}. {statement}", index + 1)?;
        writeln!(output, "    ({SCALE_HINT})")?;
        loop {
            write!(output, "> ")?;
            output.flush()?;

            line.clear();
            if input.read_line(&mut line)? == 0 {
                bail!("survey aborted before question {} was answered", index + 1);
            }
            match line.trim().parse::<i32>() {
                Ok(answer) if (MIN_ANSWER..=MAX_ANSWER).contains(&answer) => {
                    answers[index] = answer;
                    break;
                }
                _ => writeln!(output, "Please enter a whole number from 1 to 5.")?,
            }
        }
    }

    Ok(SurveyResponse::new(answers)?)
}

fn handle_results(config: &Config, cmd: &ResultsCommand) -> Result<()> {
    let engine = SusEngine::from_config(config)?;
    let history = engine.history()?;

    if cmd.json {
        let view = serde_json::json!({
            "statistics": Statistics::aggregate(&history),
            "results": history,
        });
        println!("{}", serde_json::to_string_pretty(&view)?);
    } else {
        print!("{}", ResultsReport::new(&history));
    }
    Ok(())
}

fn handle_export(config: &Config, cmd: &ExportCommand) -> Result<()> {
    let format = ExportFormat::from(cmd.format);
    let engine = SusEngine::from_config(config)?;
    let history = engine.history()?;
    let bytes = export::export(&history, format)?;

    let Some(output) = &cmd.output else {
        io::stdout().write_all(&bytes)?;
        return Ok(());
    };

    let path = if output.is_dir() {
        output.join(format.attachment_name(Utc::now().date_naive()))
    } else {
        output.clone()
    };
    storage::write_atomic(&path, &bytes)
        .with_context(|| format!("failed to write export to {}", path.display()))?;

    info!("Exported {} evaluations as {}", history.len(), format.content_type());
    println!(
        "Exported {} evaluations to {}",
        history.len(),
        path.display()
    );
    Ok(())
}

fn handle_config(config_path: Option<PathBuf>, cmd: ConfigCommand) -> Result<()> {
    match cmd {
        ConfigCommand::Show { json } => {
            let config = Config::load_from(config_path)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&config)?);
            } else {
                print_config(&config);
            }
        }
        ConfigCommand::Path => {
            let path = config_path.unwrap_or_else(Config::default_config_path);
            println!("{}", path.display());
        }
        ConfigCommand::Validate { file } => {
            let path = file
                .or(config_path)
                .unwrap_or_else(Config::default_config_path);
            println!("Validating configuration: {}", path.display());
            Config::load_from(Some(path)).context("configuration is invalid")?;
            println!("Configuration is valid.");
        }
    }
    Ok(())
}

fn print_config(config: &Config) {
    println!("Current Configuration");
    println!("=====================");
    println!();
    println!("[Storage]");
    println!("  Backend:            {}", config.storage.backend);
    println!("  Data directory:     {}", config.data_dir().display());
    println!("  History:            {}", config.store_path().display());
    if config.storage.csv_mirror {
        println!("  CSV mirror:         {}", config.export_path().display());
    } else {
        println!("  CSV mirror:         disabled");
    }
    println!("  Lock timeout (ms):  {}", config.storage.lock_timeout_ms);
    println!();
    println!("[Survey]");
    println!("  Strict validation:  {}", config.survey.strict_validation);
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;

    #[test]
    fn test_prompt_survey_reads_ten_answers() {
        let input = Cursor::new("4\n2\n4\n2\n4\n2\n4\n3\n3\n2\n");
        let mut output = Vec::new();

        let responses = prompt_survey(input, &mut output).unwrap();

        assert_eq!(responses.answers(), &[4, 2, 4, 2, 4, 2, 4, 3, 3, 2]);
        let shown = String::from_utf8(output).unwrap();
        assert!(shown.contains("Q1. I think that I would like to use this system frequently."));
        assert!(shown.contains("Q10."));
    }

    #[test]
    fn test_prompt_survey_retries_invalid_input() {
        let input = Cursor::new("six\n0\n\n5\n3\n3\n3\n3\n3\n3\n3\n3\n3\n");
        let mut output = Vec::new();

        let responses = prompt_survey(input, &mut output).unwrap();

        assert_eq!(responses.get(1), Some(5));
        let shown = String::from_utf8(output).unwrap();
        assert_eq!(
            shown
                .matches("Please enter a whole number from 1 to 5.")
                .count(),
            3
        );
    }

    #[test]
    fn test_prompt_survey_fails_on_eof() {
        let input = Cursor::new("3\n3\n");
        let err = prompt_survey(input, io::sink()).unwrap_err();
        assert!(err.to_string().contains("question 3"));
    }
}
