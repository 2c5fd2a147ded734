//! `susmeter` - System Usability Scale scoring, history and export
//!
//! This library scores ten-item SUS questionnaires, classifies the score into
//! a letter grade, keeps an append-only history of results and exports that
//! history as JSON or CSV.

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

pub mod cli;
pub mod config;
pub mod engine;
pub mod error;
pub mod evaluation;
pub mod export;
pub mod logging;
pub mod report;
pub mod scoring;
pub mod stats;
pub mod storage;
pub mod survey;

pub use config::Config;
pub use engine::{Submission, SusEngine};
pub use error::{Error, Result};
pub use evaluation::EvaluationResult;
pub use export::ExportFormat;
pub use logging::init_logging;
pub use scoring::{classify, score, Grade};
pub use stats::{BenchmarkPosition, Statistics};
pub use storage::{HistoryStore, JsonFileStore, MemoryStore, SqliteStore};
pub use survey::{SurveyResponse, ValidationMode};
