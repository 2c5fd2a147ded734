//! `SQLite` result store.

use std::path::{Path, PathBuf};
use std::time::Duration;

use rusqlite::types::Type;
use rusqlite::{params, Connection, Transaction, TransactionBehavior};
use tracing::{debug, info};

use super::{ensure_parent_dir, schema, HistoryStore};
use crate::error::{Error, Result};
use crate::evaluation::{parse_timestamp, EvaluationResult};
use crate::survey::{SurveyResponse, QUESTION_COUNT};

/// History kept in a `SQLite` database, one row per result.
///
/// Each append runs in an immediate transaction, so concurrent writers are
/// serialized by `SQLite` itself; a writer waits up to the busy timeout for
/// the write lock.
#[derive(Debug)]
pub struct SqliteStore {
    /// Path to the database file.
    path: PathBuf,
    /// Database connection.
    conn: Connection,
}

impl SqliteStore {
    /// Open or create a result database at the given path.
    ///
    /// Creates the parent directories and database file if they don't exist,
    /// and initializes the schema if this is a new database.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or schema initialization fails.
    pub fn open(path: impl AsRef<Path>, busy_timeout: Duration) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        ensure_parent_dir(&path)?;

        debug!("Opening database at {}", path.display());
        let conn = Connection::open(&path).map_err(|source| Error::DatabaseOpen {
            path: path.clone(),
            source,
        })?;

        conn.busy_timeout(busy_timeout)?;
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA synchronous=NORMAL;")?;

        schema::initialize(&conn)?;

        info!("Database opened successfully at {}", path.display());
        Ok(Self { path, conn })
    }

    /// Create an in-memory store for testing.
    ///
    /// # Errors
    ///
    /// Returns an error if the in-memory database cannot be created.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(|source| Error::DatabaseOpen {
            path: PathBuf::from(":memory:"),
            source,
        })?;

        schema::initialize(&conn)?;

        Ok(Self {
            path: PathBuf::from(":memory:"),
            conn,
        })
    }

    /// Get the path to the database file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn row_to_result(row: &rusqlite::Row) -> rusqlite::Result<EvaluationResult> {
        let timestamp_str: String = row.get(0)?;
        let timestamp = parse_timestamp(&timestamp_str).map_err(|err| {
            rusqlite::Error::FromSqlConversionFailure(0, Type::Text, Box::new(err))
        })?;

        let mut answers = [0; QUESTION_COUNT];
        for (index, answer) in answers.iter_mut().enumerate() {
            *answer = row.get(index + 1)?;
        }

        Ok(EvaluationResult {
            timestamp,
            responses: SurveyResponse::unchecked(answers),
            score: row.get(QUESTION_COUNT + 1)?,
        })
    }
}

impl HistoryStore for SqliteStore {
    fn name(&self) -> &'static str {
        "sqlite"
    }

    fn append(&self, result: &EvaluationResult) -> Result<()> {
        let [q1, q2, q3, q4, q5, q6, q7, q8, q9, q10] = *result.responses.answers();

        let tx = Transaction::new_unchecked(&self.conn, TransactionBehavior::Immediate)?;
        tx.execute(
            r"
            INSERT INTO evaluations (timestamp, q1, q2, q3, q4, q5, q6, q7, q8, q9, q10, score)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
            ",
            params![
                result.formatted_timestamp(),
                q1,
                q2,
                q3,
                q4,
                q5,
                q6,
                q7,
                q8,
                q9,
                q10,
                result.score,
            ],
        )?;

        let id = tx.last_insert_rowid();
        tx.commit()?;
        info!("Recorded evaluation #{} in {}", id, self.path.display());
        Ok(())
    }

    fn load_all(&self) -> Result<Vec<EvaluationResult>> {
        let mut stmt = self.conn.prepare(
            r"
            SELECT timestamp, q1, q2, q3, q4, q5, q6, q7, q8, q9, q10, score
            FROM evaluations ORDER BY id
            ",
        )?;

        let results = stmt
            .query_map([], Self::row_to_result)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(results)
    }

    fn count(&self) -> Result<usize> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM evaluations", [], |row| row.get(0))?;
        Ok(usize::try_from(count).unwrap_or(0))
    }
}
