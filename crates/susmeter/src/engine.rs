//! Submission pipeline tying scoring, storage and export together.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, error, info};

use crate::config::Config;
use crate::error::{Error, Result};
use crate::evaluation::EvaluationResult;
use crate::export::{self, ExportFormat};
use crate::scoring::Grade;
use crate::stats::Statistics;
use crate::storage::{self, write_atomic, HistoryStore};
use crate::survey::{SurveyResponse, ValidationMode};

/// Outcome of one accepted submission.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Submission {
    /// The stored result.
    pub result: EvaluationResult,
    /// Grade band of the result's score.
    pub grade: Grade,
    /// Statistics over the history, this result included.
    pub statistics: Statistics,
}

/// Scores submissions and records them in a [`HistoryStore`].
///
/// Every call reloads the history from the store; nothing is cached between
/// calls. When a CSV mirror path is set, the mirror is rewritten after each
/// accepted submission.
#[derive(Debug)]
pub struct SusEngine<S> {
    store: S,
    csv_mirror: Option<PathBuf>,
    mode: ValidationMode,
}

impl<S: HistoryStore> SusEngine<S> {
    /// Create an engine over `store` with strict validation and no CSV mirror.
    #[must_use]
    pub fn new(store: S) -> Self {
        Self {
            store,
            csv_mirror: None,
            mode: ValidationMode::default(),
        }
    }

    /// Rewrite the CSV export at `path` after every submission.
    #[must_use]
    pub fn with_csv_mirror(mut self, path: impl Into<PathBuf>) -> Self {
        self.csv_mirror = Some(path.into());
        self
    }

    /// Use `mode` when parsing submitted forms.
    #[must_use]
    pub fn with_validation_mode(mut self, mode: ValidationMode) -> Self {
        self.mode = mode;
        self
    }

    /// The underlying store.
    #[must_use]
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Path of the CSV mirror, if one is configured.
    #[must_use]
    pub fn csv_mirror(&self) -> Option<&Path> {
        self.csv_mirror.as_deref()
    }

    /// Validation mode used by [`SusEngine::submit`].
    #[must_use]
    pub fn validation_mode(&self) -> ValidationMode {
        self.mode
    }

    /// Parse, score and record a submitted form.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidResponse`] when the form fails strict
    /// validation, or a storage error if the result cannot be recorded.
    pub fn submit(&self, form: &BTreeMap<String, String>) -> Result<Submission> {
        let responses = SurveyResponse::from_form(form, self.mode)?;
        self.store_result(EvaluationResult::record(responses))
    }

    /// Score and record already-parsed responses.
    ///
    /// # Errors
    ///
    /// In strict mode, returns [`Error::InvalidResponse`] for an answer
    /// outside 1..=5. Otherwise fails only if the store does.
    pub fn record(&self, responses: SurveyResponse) -> Result<Submission> {
        if self.mode == ValidationMode::Strict {
            SurveyResponse::new(*responses.answers())?;
        }
        self.store_result(EvaluationResult::record(responses))
    }

    /// The full history in submission order.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    pub fn history(&self) -> Result<Vec<EvaluationResult>> {
        self.store.load_all()
    }

    /// Statistics over the history, or `None` when it is empty.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    pub fn statistics(&self) -> Result<Option<Statistics>> {
        Ok(Statistics::aggregate(&self.history()?))
    }

    /// Snapshot of the history in `format`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NoData`] when nothing has been recorded yet.
    pub fn export(&self, format: ExportFormat) -> Result<Vec<u8>> {
        export::export(&self.history()?, format)
    }

    fn store_result(&self, result: EvaluationResult) -> Result<Submission> {
        self.store.append(&result)?;

        let history = self.history()?;
        let statistics = Statistics::aggregate(&history).ok_or_else(|| {
            Error::internal(format!(
                "{} store is empty right after an append",
                self.store.name()
            ))
        })?;

        if let Some(path) = &self.csv_mirror {
            export::to_csv(&history)
                .and_then(|csv| write_atomic(path, &csv))
                .map_err(|source| {
                    error!("Failed to refresh CSV mirror {}: {}", path.display(), source);
                    Error::MirrorRefresh {
                        path: path.clone(),
                        source: Box::new(source),
                    }
                })?;
            debug!("Refreshed CSV mirror {}", path.display());
        }

        let grade = result.grade();
        info!(
            "Scored submission at {}: {} ({})",
            result.formatted_timestamp(),
            result.score,
            grade
        );

        Ok(Submission {
            result,
            grade,
            statistics,
        })
    }
}

impl SusEngine<Box<dyn HistoryStore>> {
    /// Build an engine from configuration: the configured backend, the CSV
    /// mirror when enabled, and the configured validation mode.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be opened.
    pub fn from_config(config: &Config) -> Result<Self> {
        let engine =
            Self::new(storage::open(config)?).with_validation_mode(config.validation_mode());
        if config.storage.csv_mirror {
            Ok(engine.with_csv_mirror(config.export_path()))
        } else {
            Ok(engine)
        }
    }
}
