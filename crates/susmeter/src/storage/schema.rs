//! `SQLite` schema for the evaluation history.
//!
//! There is a single schema version. Opening a database creates any missing
//! tables, stamps the version into `metadata` and refuses files stamped by a
//! newer release.

use rusqlite::{Connection, OptionalExtension};
use tracing::info;

use crate::error::{Error, Result};

/// Version stamped into `metadata` under [`VERSION_KEY`].
pub const SCHEMA_VERSION: i32 = 1;

const VERSION_KEY: &str = "schema_version";

/// SQL statement to create the evaluations table.
///
/// Rows are never updated or deleted; `id` gives insertion order.
pub const CREATE_EVALUATIONS_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS evaluations (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    timestamp TEXT NOT NULL,
    q1 INTEGER NOT NULL,
    q2 INTEGER NOT NULL,
    q3 INTEGER NOT NULL,
    q4 INTEGER NOT NULL,
    q5 INTEGER NOT NULL,
    q6 INTEGER NOT NULL,
    q7 INTEGER NOT NULL,
    q8 INTEGER NOT NULL,
    q9 INTEGER NOT NULL,
    q10 INTEGER NOT NULL,
    score REAL NOT NULL,
    created_at TEXT NOT NULL DEFAULT (datetime('now'))
)
";

/// Index for ordering and range scans by timestamp.
pub const CREATE_TIMESTAMP_INDEX: &str = r"
CREATE INDEX IF NOT EXISTS idx_evaluations_timestamp ON evaluations(timestamp)
";

/// Key-value table holding the schema version.
pub const CREATE_METADATA_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS metadata (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL
)
";

/// All schema creation statements in order.
pub const SCHEMA_STATEMENTS: &[&str] = &[
    CREATE_EVALUATIONS_TABLE,
    CREATE_TIMESTAMP_INDEX,
    CREATE_METADATA_TABLE,
];

/// Create missing tables and check the stored schema version.
///
/// # Errors
///
/// Returns [`Error::SchemaVersion`] if the stored version is unreadable
/// or newer than [`SCHEMA_VERSION`], or a query error if a statement fails.
pub fn initialize(conn: &Connection) -> Result<()> {
    for statement in SCHEMA_STATEMENTS {
        conn.execute(statement, [])?;
    }

    match stored_version(conn)? {
        Some(SCHEMA_VERSION) => Ok(()),
        Some(version) if version > SCHEMA_VERSION => Err(Error::SchemaVersion {
            message: format!(
                "database schema version {version} is newer than supported version {SCHEMA_VERSION}"
            ),
        }),
        _ => {
            conn.execute(
                "INSERT OR REPLACE INTO metadata (key, value) VALUES (?1, ?2)",
                (VERSION_KEY, SCHEMA_VERSION.to_string()),
            )?;
            info!("Initialized evaluation database at schema version {SCHEMA_VERSION}");
            Ok(())
        }
    }
}

fn stored_version(conn: &Connection) -> Result<Option<i32>> {
    let value: Option<String> = conn
        .query_row(
            "SELECT value FROM metadata WHERE key = ?1",
            [VERSION_KEY],
            |row| row.get(0),
        )
        .optional()?;

    value
        .map(|value| {
            value.parse().map_err(|_| Error::SchemaVersion {
                message: format!("invalid schema version: {value}"),
            })
        })
        .transpose()
}
