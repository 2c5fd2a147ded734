//! The SUS questionnaire and parsing of submitted answers.
//!
//! A submission arrives as a mapping of question keys (`q1`..`q10`) to raw
//! strings. [`SurveyResponse::from_form`] turns it into ten integers, either
//! rejecting bad input ([`ValidationMode::Strict`]) or zero-filling it the way
//! a loose web form handler would ([`ValidationMode::Lenient`]).

use std::collections::BTreeMap;
use std::fmt;

use serde::de::{self, MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{Error, Result};

/// Number of items in the questionnaire.
pub const QUESTION_COUNT: usize = 10;

/// Lowest valid Likert answer ("strongly disagree").
pub const MIN_ANSWER: i32 = 1;

/// Highest valid Likert answer ("strongly agree").
pub const MAX_ANSWER: i32 = 5;

/// The ten standard SUS statements, in order.
pub const QUESTIONS: [&str; QUESTION_COUNT] = [
    "I think that I would like to use this system frequently.",
    "I found the system unnecessarily complex.",
    "I thought the system was easy to use.",
    "I think that I would need the support of a technical person to be able to use this system.",
    "I found the various functions in this system were well integrated.",
    "I thought there was too much inconsistency in this system.",
    "I would imagine that most people would learn to use this system very quickly.",
    "I found the system very cumbersome to use.",
    "I felt very confident using the system.",
    "I needed to learn a lot of things before I could get going with this system.",
];

/// Whether agreeing with a statement is good or bad for usability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Polarity {
    /// Odd-numbered items: agreement raises the score.
    Positive,
    /// Even-numbered items: agreement lowers the score.
    Negative,
}

impl Polarity {
    /// Polarity of the item at zero-based `index`.
    #[must_use]
    pub fn of(index: usize) -> Self {
        if index % 2 == 0 {
            Self::Positive
        } else {
            Self::Negative
        }
    }
}

/// How strictly submitted answers are checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ValidationMode {
    /// Every answer must be present and within 1..=5.
    #[default]
    Strict,
    /// Missing or unparseable answers become 0 and nothing is range checked.
    Lenient,
}

/// Key used for the question at zero-based `index` (`q1`..`q10`).
#[must_use]
pub fn question_key(index: usize) -> String {
    format!("q{}", index + 1)
}

/// Ten answers, one per questionnaire slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SurveyResponse {
    answers: [i32; QUESTION_COUNT],
}

impl SurveyResponse {
    /// Build a response from ten answers, checking that each is within 1..=5.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidResponse`] naming the first out-of-range answer.
    pub fn new(answers: [i32; QUESTION_COUNT]) -> Result<Self> {
        for (index, answer) in answers.iter().enumerate() {
            check_range(index, *answer)?;
        }
        Ok(Self { answers })
    }

    /// Build a response without any range checks.
    ///
    /// Scores computed from out-of-range answers fall outside 0..=100.
    #[must_use]
    pub fn unchecked(answers: [i32; QUESTION_COUNT]) -> Self {
        Self { answers }
    }

    /// Parse a submitted form.
    ///
    /// Keys are matched case-insensitively against `q1`..`q10`; any other key
    /// is ignored.
    ///
    /// # Errors
    ///
    /// In [`ValidationMode::Strict`], returns [`Error::InvalidResponse`] for the
    /// first missing, non-numeric or out-of-range answer. Lenient parsing never
    /// fails.
    pub fn from_form(form: &BTreeMap<String, String>, mode: ValidationMode) -> Result<Self> {
        let mut raw: [Option<&str>; QUESTION_COUNT] = [None; QUESTION_COUNT];
        for (key, value) in form {
            if let Some(index) = parse_question_key(key) {
                raw[index] = Some(value.as_str());
            }
        }

        let mut answers = [0; QUESTION_COUNT];
        for (index, value) in raw.iter().enumerate() {
            answers[index] = match (mode, value) {
                (ValidationMode::Strict, None) => {
                    return Err(Error::invalid_response(question_key(index), "answer is missing"));
                }
                (ValidationMode::Strict, Some(value)) => {
                    let answer = value.trim().parse::<i32>().map_err(|_| {
                        Error::invalid_response(
                            question_key(index),
                            format!("'{value}' is not a whole number"),
                        )
                    })?;
                    check_range(index, answer)?;
                    answer
                }
                (ValidationMode::Lenient, None) => 0,
                (ValidationMode::Lenient, Some(value)) => loose_int(value),
            };
        }

        Ok(Self { answers })
    }

    /// The ten answers in question order.
    #[must_use]
    pub fn answers(&self) -> &[i32; QUESTION_COUNT] {
        &self.answers
    }

    /// Answer to question `number` (one-based, 1..=10).
    #[must_use]
    pub fn get(&self, number: usize) -> Option<i32> {
        number
            .checked_sub(1)
            .and_then(|index| self.answers.get(index).copied())
    }

    /// Check if every answer lies within 1..=5.
    #[must_use]
    pub fn is_in_range(&self) -> bool {
        self.answers
            .iter()
            .all(|answer| (MIN_ANSWER..=MAX_ANSWER).contains(answer))
    }
}

fn check_range(index: usize, answer: i32) -> Result<()> {
    if (MIN_ANSWER..=MAX_ANSWER).contains(&answer) {
        Ok(())
    } else {
        Err(Error::invalid_response(
            question_key(index),
            format!("expected a value between {MIN_ANSWER} and {MAX_ANSWER}, got {answer}"),
        ))
    }
}

/// Map `q1`..`q10` (any case) to a zero-based index.
fn parse_question_key(key: &str) -> Option<usize> {
    let digits = key
        .strip_prefix('q')
        .or_else(|| key.strip_prefix('Q'))?;
    if digits.is_empty()
        || digits.starts_with('0')
        || !digits.bytes().all(|b| b.is_ascii_digit())
    {
        return None;
    }
    let number: usize = digits.parse().ok()?;
    (1..=QUESTION_COUNT).contains(&number).then_some(number - 1)
}

/// Integer cast that never fails: leading whitespace, an optional sign and the
/// leading digits are used; anything else yields 0.
fn loose_int(value: &str) -> i32 {
    let trimmed = value.trim_start();
    let (negative, rest) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };
    let digits: String = rest.chars().take_while(char::is_ascii_digit).collect();
    let magnitude = if digits.is_empty() {
        0
    } else {
        digits.parse::<i64>().unwrap_or(i64::MAX)
    };
    let signed = if negative { -magnitude } else { magnitude };
    i32::try_from(signed).unwrap_or(if negative { i32::MIN } else { i32::MAX })
}

impl Serialize for SurveyResponse {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(QUESTION_COUNT))?;
        for (index, answer) in self.answers.iter().enumerate() {
            map.serialize_entry(&question_key(index), answer)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for SurveyResponse {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        struct ResponseVisitor;

        impl<'de> Visitor<'de> for ResponseVisitor {
            type Value = SurveyResponse;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map with keys q1 through q10")
            }

            fn visit_map<A: MapAccess<'de>>(
                self,
                mut map: A,
            ) -> std::result::Result<Self::Value, A::Error> {
                let mut answers: [Option<i32>; QUESTION_COUNT] = [None; QUESTION_COUNT];
                while let Some(key) = map.next_key::<String>()? {
                    match parse_question_key(&key) {
                        Some(index) => answers[index] = Some(map.next_value()?),
                        None => {
                            map.next_value::<de::IgnoredAny>()?;
                        }
                    }
                }

                let mut out = [0; QUESTION_COUNT];
                for (index, answer) in answers.iter().enumerate() {
                    out[index] = answer
                        .ok_or_else(|| de::Error::missing_field(QUESTION_FIELDS[index]))?;
                }
                Ok(SurveyResponse { answers: out })
            }
        }

        deserializer.deserialize_map(ResponseVisitor)
    }
}

const QUESTION_FIELDS: [&str; QUESTION_COUNT] =
    ["q1", "q2", "q3", "q4", "q5", "q6", "q7", "q8", "q9", "q10"];
