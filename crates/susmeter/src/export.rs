//! Export of the result history as JSON or CSV.
//!
//! Both encodings are regenerated from the full history on every call. The
//! CSV grade and interpretation columns are recomputed from the score at
//! export time, never read from storage.

use std::fmt;
use std::io::Write;
use std::str::FromStr;

use chrono::NaiveDate;

use crate::error::{Error, Result};
use crate::evaluation::EvaluationResult;
use crate::survey::QUESTION_COUNT;

/// Header row of the tabular export.
pub const CSV_HEADER: [&str; QUESTION_COUNT + 4] = [
    "Timestamp",
    "Q1",
    "Q2",
    "Q3",
    "Q4",
    "Q5",
    "Q6",
    "Q7",
    "Q8",
    "Q9",
    "Q10",
    "SUS Score",
    "Grade",
    "Interpretation",
];

/// Output encoding for an export.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ExportFormat {
    /// Pretty-printed JSON array, same layout as the history file.
    #[default]
    Json,
    /// Comma-separated values with a header row (opens in spreadsheet tools).
    Csv,
}

impl ExportFormat {
    /// File extension without the leading dot.
    #[must_use]
    pub fn extension(self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Csv => "csv",
        }
    }

    /// MIME type of the encoded output.
    #[must_use]
    pub fn content_type(self) -> &'static str {
        match self {
            Self::Json => "application/json",
            Self::Csv => "text/csv",
        }
    }

    /// Download file name for an export taken on `date`.
    #[must_use]
    pub fn attachment_name(self, date: NaiveDate) -> String {
        format!("sus_results_{}.{}", date.format("%Y-%m-%d"), self.extension())
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for ExportFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "csv" | "excel" => Ok(Self::Csv),
            other => Err(Error::UnsupportedFormat(other.to_string())),
        }
    }
}

/// Export a snapshot of `history`.
///
/// # Errors
///
/// Returns [`Error::NoData`] when the history is empty, or a serialization
/// error if encoding fails.
pub fn export(history: &[EvaluationResult], format: ExportFormat) -> Result<Vec<u8>> {
    if history.is_empty() {
        return Err(Error::NoData);
    }
    match format {
        ExportFormat::Json => to_json(history),
        ExportFormat::Csv => to_csv(history),
    }
}

/// Encode the history as a pretty-printed JSON array.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn to_json(history: &[EvaluationResult]) -> Result<Vec<u8>> {
    Ok(serde_json::to_vec_pretty(history)?)
}

/// Encode the history as CSV, header row included.
///
/// # Errors
///
/// Returns an error if writing to the buffer fails.
pub fn to_csv(history: &[EvaluationResult]) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    write_csv(&mut out, history)?;
    Ok(out)
}

/// Stream the history as CSV into `writer`.
///
/// # Errors
///
/// Returns an error if the writer fails.
pub fn write_csv<W: Write>(writer: &mut W, history: &[EvaluationResult]) -> Result<()> {
    write_row(writer, CSV_HEADER.iter().map(|h| (*h).to_string()))?;

    for result in history {
        let grade = result.grade();
        let fields = std::iter::once(result.formatted_timestamp())
            .chain(result.responses.answers().iter().map(ToString::to_string))
            .chain([
                result.score.to_string(),
                grade.letter().to_string(),
                grade.label().to_string(),
            ]);
        write_row(writer, fields)?;
    }

    Ok(())
}

fn write_row<W: Write>(writer: &mut W, fields: impl Iterator<Item = String>) -> Result<()> {
    let line = fields
        .map(|field| csv_field(&field))
        .collect::<Vec<_>>()
        .join(",");
    writeln!(writer, "{line}")?;
    Ok(())
}

/// Quote a field when it contains a delimiter, quote, backslash or whitespace.
fn csv_field(field: &str) -> String {
    let needs_quotes = field
        .chars()
        .any(|c| matches!(c, ',' | '"' | '\\' | ' ' | '\t' | '\r' | '\n'));
    if needs_quotes {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}
