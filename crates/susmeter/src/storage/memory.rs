//! In-process history store.

use std::sync::Mutex;

use super::HistoryStore;
use crate::error::{Error, Result};
use crate::evaluation::EvaluationResult;

/// History held in memory; nothing survives the process.
#[derive(Debug, Default)]
pub struct MemoryStore {
    results: Mutex<Vec<EvaluationResult>>,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-filled with `history`.
    #[must_use]
    pub fn with_history(history: Vec<EvaluationResult>) -> Self {
        Self {
            results: Mutex::new(history),
        }
    }

    fn results(&self) -> Result<std::sync::MutexGuard<'_, Vec<EvaluationResult>>> {
        self.results
            .lock()
            .map_err(|_| Error::internal("memory store lock poisoned"))
    }
}

impl HistoryStore for MemoryStore {
    fn name(&self) -> &'static str {
        "memory"
    }

    fn append(&self, result: &EvaluationResult) -> Result<()> {
        self.results()?.push(result.clone());
        Ok(())
    }

    fn load_all(&self) -> Result<Vec<EvaluationResult>> {
        Ok(self.results()?.clone())
    }

    fn count(&self) -> Result<usize> {
        Ok(self.results()?.len())
    }
}
