//! SUS scoring and grade classification.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::survey::{Polarity, SurveyResponse};

/// Multiplier that stretches the 0..=40 contribution sum onto 0..=100.
const SCALE: f64 = 2.5;

/// Compute the SUS score for a set of answers.
///
/// Positively phrased items contribute `answer - 1`, negatively phrased items
/// contribute `5 - answer`; the sum is multiplied by 2.5. Answers inside 1..=5
/// always give a score in 0..=100. Out-of-range answers are not clamped.
#[must_use]
pub fn score(responses: &SurveyResponse) -> f64 {
    let sum: i64 = responses
        .answers()
        .iter()
        .enumerate()
        .map(|(index, &answer)| {
            let answer = i64::from(answer);
            match Polarity::of(index) {
                Polarity::Positive => answer - 1,
                Polarity::Negative => 5 - answer,
            }
        })
        .sum();

    #[allow(clippy::cast_precision_loss)]
    let sum = sum as f64;
    sum * SCALE
}

/// Letter grade band for a SUS score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Grade {
    /// 80.3 and above.
    A,
    /// 68 up to 80.3.
    B,
    /// 51 up to 68.
    C,
    /// 39 up to 51.
    D,
    /// Below 39.
    F,
}

impl Grade {
    /// All grades, best first.
    pub const ALL: [Grade; 5] = [Grade::A, Grade::B, Grade::C, Grade::D, Grade::F];

    /// Classify a score. Evaluated top-down, first match wins; NaN is an F.
    #[must_use]
    pub fn classify(score: f64) -> Self {
        match score {
            s if s >= 80.3 => Self::A,
            s if s >= 68.0 => Self::B,
            s if s >= 51.0 => Self::C,
            s if s >= 39.0 => Self::D,
            _ => Self::F,
        }
    }

    /// The grade letter.
    #[must_use]
    pub fn letter(self) -> char {
        match self {
            Self::A => 'A',
            Self::B => 'B',
            Self::C => 'C',
            Self::D => 'D',
            Self::F => 'F',
        }
    }

    /// Human-readable interpretation of the band.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::A => "Excellent",
            Self::B => "Good",
            Self::C => "OK",
            Self::D => "Poor",
            Self::F => "Awful",
        }
    }

    /// Score range covered by the band, as printed in the grade guide.
    #[must_use]
    pub fn range_label(self) -> &'static str {
        match self {
            Self::A => "80.3+",
            Self::B => "68-80.2",
            Self::C => "51-67.9",
            Self::D => "39-50.9",
            Self::F => "0-38.9",
        }
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.letter())
    }
}

/// Classify a score into its grade band.
#[must_use]
pub fn classify(score: f64) -> Grade {
    Grade::classify(score)
}
