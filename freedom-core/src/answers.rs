//! Diagnostic answers: 12 integer responses (1-10) grouped into 6 modules.
//!
//! Wire shape is a flat JSON object with exactly the keys `M1_Q1` .. `M6_Q2`.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;
use thiserror::Error;

pub const MIN_ANSWER: u8 = 1;
pub const MAX_ANSWER: u8 = 10;

/// Number of diagnostic modules (two questions each).
pub const MODULE_COUNT: usize = 6;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AnswerError {
    #[error("{key} must be between 1 and 10, got {value}")]
    OutOfRange { key: &'static str, value: i64 },

    #[error("unknown answer key '{0}' (expected M1_Q1 .. M6_Q2)")]
    UnknownKey(String),

    #[error("invalid answer assignment '{0}' (expected e.g. M3_Q2=7)")]
    BadAssignment(String),
}

/// Validated answers. Deserializing goes through [`AnswerSheet`], so a JSON
/// value outside 1..=10 fails with [`AnswerError::OutOfRange`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE", try_from = "AnswerSheet")]
pub struct DiagnosticAnswers {
    pub m1_q1: u8,
    pub m1_q2: u8,
    pub m2_q1: u8,
    pub m2_q2: u8,
    pub m3_q1: u8,
    pub m3_q2: u8,
    pub m4_q1: u8,
    pub m4_q2: u8,
    pub m5_q1: u8,
    pub m5_q2: u8,
    pub m6_q1: u8,
    pub m6_q2: u8,
}

/// Answers exactly as submitted: all 12 keys, nothing else, any integer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE", deny_unknown_fields)]
pub struct AnswerSheet {
    pub m1_q1: i64,
    pub m1_q2: i64,
    pub m2_q1: i64,
    pub m2_q2: i64,
    pub m3_q1: i64,
    pub m3_q2: i64,
    pub m4_q1: i64,
    pub m4_q2: i64,
    pub m5_q1: i64,
    pub m5_q2: i64,
    pub m6_q1: i64,
    pub m6_q2: i64,
}

impl AnswerSheet {
    fn values(&self) -> [i64; 12] {
        [
            self.m1_q1, self.m1_q2, self.m2_q1, self.m2_q2, self.m3_q1, self.m3_q2,
            self.m4_q1, self.m4_q2, self.m5_q1, self.m5_q2, self.m6_q1, self.m6_q2,
        ]
    }

    /// Pull every value into 1..=10.
    pub fn clamped(&self) -> DiagnosticAnswers {
        let v = self
            .values()
            .map(|v| v.clamp(MIN_ANSWER as i64, MAX_ANSWER as i64) as u8);
        DiagnosticAnswers::from_array(v)
    }
}

impl TryFrom<AnswerSheet> for DiagnosticAnswers {
    type Error = AnswerError;

    fn try_from(sheet: AnswerSheet) -> Result<Self, Self::Error> {
        let mut v = [0u8; 12];
        for ((slot, key), value) in v.iter_mut().zip(KEYS).zip(sheet.values()) {
            *slot = u8::try_from(value)
                .ok()
                .filter(|x| (MIN_ANSWER..=MAX_ANSWER).contains(x))
                .ok_or(AnswerError::OutOfRange { key, value })?;
        }
        Ok(Self::from_array(v))
    }
}

/// Wire keys in answer order.
pub const KEYS: [&str; 12] = [
    "M1_Q1", "M1_Q2", "M2_Q1", "M2_Q2", "M3_Q1", "M3_Q2",
    "M4_Q1", "M4_Q2", "M5_Q1", "M5_Q2", "M6_Q1", "M6_Q2",
];

impl DiagnosticAnswers {
    /// Every answer set to the same value.
    pub fn uniform(value: u8) -> Self {
        Self::from_array([value; 12])
    }

    /// Build from values in key order (`M1_Q1, M1_Q2, M2_Q1, ...`).
    pub fn from_array(v: [u8; 12]) -> Self {
        Self {
            m1_q1: v[0],
            m1_q2: v[1],
            m2_q1: v[2],
            m2_q2: v[3],
            m3_q1: v[4],
            m3_q2: v[5],
            m4_q1: v[6],
            m4_q2: v[7],
            m5_q1: v[8],
            m5_q2: v[9],
            m6_q1: v[10],
            m6_q2: v[11],
        }
    }

    pub fn to_array(&self) -> [u8; 12] {
        [
            self.m1_q1, self.m1_q2, self.m2_q1, self.m2_q2, self.m3_q1, self.m3_q2,
            self.m4_q1, self.m4_q2, self.m5_q1, self.m5_q2, self.m6_q1, self.m6_q2,
        ]
    }

    /// The (q1, q2) pair of each module, M1 first.
    pub fn module_pairs(&self) -> [(u8, u8); MODULE_COUNT] {
        let v = self.to_array();
        [
            (v[0], v[1]),
            (v[2], v[3]),
            (v[4], v[5]),
            (v[6], v[7]),
            (v[8], v[9]),
            (v[10], v[11]),
        ]
    }

    /// Reject any value outside 1..=10, naming the first offending key.
    pub fn validate(&self) -> Result<(), AnswerError> {
        for (key, value) in KEYS.into_iter().zip(self.to_array()) {
            if !(MIN_ANSWER..=MAX_ANSWER).contains(&value) {
                return Err(AnswerError::OutOfRange {
                    key,
                    value: value as i64,
                });
            }
        }
        Ok(())
    }

    pub fn clamped(&self) -> Self {
        let mut v = self.to_array();
        for x in v.iter_mut() {
            *x = (*x).clamp(MIN_ANSWER, MAX_ANSWER);
        }
        Self::from_array(v)
    }

    /// Set a single answer by its wire key. The value is range-checked.
    pub fn set(&mut self, key: &str, value: i64) -> Result<(), AnswerError> {
        let idx = KEYS
            .iter()
            .position(|k| k.eq_ignore_ascii_case(key))
            .ok_or_else(|| AnswerError::UnknownKey(key.to_string()))?;
        if !(MIN_ANSWER as i64..=MAX_ANSWER as i64).contains(&value) {
            return Err(AnswerError::OutOfRange {
                key: KEYS[idx],
                value,
            });
        }
        let mut v = self.to_array();
        v[idx] = value as u8;
        *self = Self::from_array(v);
        Ok(())
    }

    /// Apply an assignment of the form `M3_Q2=7`.
    pub fn apply_assignment(&mut self, assignment: &str) -> Result<(), AnswerError> {
        let caps = assignment_re()
            .captures(assignment.trim())
            .ok_or_else(|| AnswerError::BadAssignment(assignment.to_string()))?;
        let key = format!("M{}_Q{}", &caps["module"], &caps["question"]);
        let value: i64 = caps["value"]
            .parse()
            .map_err(|_| AnswerError::BadAssignment(assignment.to_string()))?;
        self.set(&key, value)
    }
}

fn assignment_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)^m(?P<module>[1-6])_q(?P<question>[12])\s*=\s*(?P<value>-?\d+)$")
            .expect("static regex")
    })
}
