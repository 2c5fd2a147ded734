//! Recorded evaluation results.

use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};

use crate::scoring::{self, Grade};
use crate::survey::SurveyResponse;

/// Timestamp layout used in the history file and the CSV export.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// One scored submission.
///
/// The serialized layout (`timestamp`, `responses.q1..q10`, `score`) is the
/// on-disk format of the JSON history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationResult {
    /// When the submission was scored (UTC, whole seconds).
    #[serde(with = "timestamp_format")]
    pub timestamp: DateTime<Utc>,

    /// The ten raw answers.
    pub responses: SurveyResponse,

    /// The SUS score.
    pub score: f64,
}

impl EvaluationResult {
    /// Score `responses` and stamp the result with the current time.
    #[must_use]
    pub fn record(responses: SurveyResponse) -> Self {
        Self::record_at(responses, Utc::now())
    }

    /// Score `responses` with an explicit timestamp, truncated to seconds.
    #[must_use]
    pub fn record_at(responses: SurveyResponse, timestamp: DateTime<Utc>) -> Self {
        Self {
            timestamp: timestamp.trunc_subsecs(0),
            score: scoring::score(&responses),
            responses,
        }
    }

    /// Grade band of the stored score, computed on demand.
    #[must_use]
    pub fn grade(&self) -> Grade {
        scoring::classify(self.score)
    }

    /// The timestamp in history-file layout.
    #[must_use]
    pub fn formatted_timestamp(&self) -> String {
        self.timestamp.format(TIMESTAMP_FORMAT).to_string()
    }
}

/// Parse a timestamp written in [`TIMESTAMP_FORMAT`].
///
/// # Errors
///
/// Returns the chrono parse error when `value` does not match the layout.
pub fn parse_timestamp(value: &str) -> std::result::Result<DateTime<Utc>, chrono::ParseError> {
    chrono::NaiveDateTime::parse_from_str(value, TIMESTAMP_FORMAT).map(|naive| naive.and_utc())
}

mod timestamp_format {
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    use super::{parse_timestamp, TIMESTAMP_FORMAT};

    pub fn serialize<S: Serializer>(
        timestamp: &DateTime<Utc>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&timestamp.format(TIMESTAMP_FORMAT))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse_timestamp(&raw).map_err(serde::de::Error::custom)
    }
}
