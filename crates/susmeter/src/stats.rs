//! Aggregate statistics over the result history.

use std::fmt;

use serde::Serialize;

use crate::evaluation::EvaluationResult;

/// Published industry-average SUS score.
pub const INDUSTRY_AVERAGE: f64 = 68.0;

/// Count, mean and extrema of the recorded scores.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Statistics {
    /// Number of recorded results.
    pub count: usize,
    /// Arithmetic mean of all scores.
    pub average: f64,
    /// Lowest score.
    pub min: f64,
    /// Highest score.
    pub max: f64,
}

impl Statistics {
    /// Aggregate a history. Returns `None` when there is nothing to aggregate.
    #[must_use]
    pub fn aggregate(history: &[EvaluationResult]) -> Option<Self> {
        let (first, rest) = history.split_first()?;

        let mut total = first.score;
        let mut min = first.score;
        let mut max = first.score;
        for result in rest {
            total += result.score;
            min = min.min(result.score);
            max = max.max(result.score);
        }

        #[allow(clippy::cast_precision_loss)]
        let average = total / history.len() as f64;

        Some(Self {
            count: history.len(),
            average,
            min,
            max,
        })
    }

    /// Where the average sits relative to [`INDUSTRY_AVERAGE`].
    #[must_use]
    pub fn benchmark(&self) -> BenchmarkPosition {
        BenchmarkPosition::of(self.average)
    }
}

/// Position of a score relative to the industry average.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BenchmarkPosition {
    /// Strictly above 68.
    Above,
    /// Exactly 68.
    At,
    /// Below 68.
    Below,
}

impl BenchmarkPosition {
    /// Compare `score` against [`INDUSTRY_AVERAGE`].
    #[must_use]
    pub fn of(score: f64) -> Self {
        if score > INDUSTRY_AVERAGE {
            Self::Above
        } else if (score - INDUSTRY_AVERAGE).abs() < f64::EPSILON {
            Self::At
        } else {
            Self::Below
        }
    }

    /// Phrase used in reports, e.g. "above average".
    #[must_use]
    pub fn phrase(self) -> &'static str {
        match self {
            Self::Above => "above average",
            Self::At => "at the average",
            Self::Below => "below average",
        }
    }
}

impl fmt::Display for BenchmarkPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.phrase())
    }
}
