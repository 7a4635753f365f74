//! Freedom Score: deterministic diagnostic scoring and sprint recommendation.
//!
//! Pipeline:
//! - average each module's two answers (one decimal, half-up)
//! - derive five sprint scores; Delivery (S4) is the weaker of M3 and M5
//! - order sprints weakest first, resolving near-ties (within 0.2) with
//!   fixed business rules, then the static tie rank
//! - recommend 3 sprints when the weakest score is 6.0 or below, else 2
//!
//! No I/O, no randomness: identical answers always produce identical output.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

use crate::answers::{AnswerError, DiagnosticAnswers, MODULE_COUNT};
use crate::sprint::SprintKey;

/// Scores within this distance are treated as a statistical tie.
pub const TIE_THRESHOLD: f64 = 0.2;
/// At or below this worst score, three sprints are recommended instead of two.
pub const EXTENDED_PLAN_CUTOFF: f64 = 6.0;
/// At or below this score the top recommendation is flagged as critical.
pub const CRITICAL_CUTOFF: f64 = 4.0;

const MAX_TOTAL: f64 = 60.0;
// Absorbs binary representation error on the 0.2 boundary.
const EPSILON: f64 = 1e-9;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ModuleAverages {
    #[serde(rename = "M1")]
    pub m1: f64,
    #[serde(rename = "M2")]
    pub m2: f64,
    #[serde(rename = "M3")]
    pub m3: f64,
    #[serde(rename = "M4")]
    pub m4: f64,
    #[serde(rename = "M5")]
    pub m5: f64,
    #[serde(rename = "M6")]
    pub m6: f64,
}

impl ModuleAverages {
    pub fn as_array(&self) -> [f64; MODULE_COUNT] {
        [self.m1, self.m2, self.m3, self.m4, self.m5, self.m6]
    }

    pub fn total(&self) -> f64 {
        round1(self.as_array().iter().sum())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SprintScores {
    #[serde(rename = "S1")]
    pub s1: f64,
    #[serde(rename = "S2")]
    pub s2: f64,
    #[serde(rename = "S3")]
    pub s3: f64,
    #[serde(rename = "S4")]
    pub s4: f64,
    #[serde(rename = "S5")]
    pub s5: f64,
}

impl SprintScores {
    pub fn from_modules(m: &ModuleAverages) -> Self {
        Self {
            s1: m.m1,
            s2: m.m2,
            s3: m.m4,
            s4: m.m3.min(m.m5),
            s5: m.m6,
        }
    }

    pub fn get(&self, key: SprintKey) -> f64 {
        match key {
            SprintKey::S1 => self.s1,
            SprintKey::S2 => self.s2,
            SprintKey::S3 => self.s3,
            SprintKey::S4 => self.s4,
            SprintKey::S5 => self.s5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recommendation {
    pub sprint_key: SprintKey,
    pub title: String,
    pub why: String,
    /// 1-based.
    pub priority: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FreedomScoreResult {
    pub module_averages: ModuleAverages,
    pub total_score: f64,
    pub percent: u8,
    pub sprint_scores: SprintScores,
    pub recommended_order: Vec<Recommendation>,
}

/// Round to one decimal place, halves rounding up.
pub fn round1(x: f64) -> f64 {
    (x * 10.0 + 0.5).floor() / 10.0
}

/// Score a diagnostic and recommend sprints.
///
/// Inputs are expected to be validated already; out-of-range values are
/// clamped into 1..=10 rather than rejected here.
pub fn score_and_recommend(answers: &DiagnosticAnswers) -> FreedomScoreResult {
    let answers = answers.clamped();
    let averages = module_averages(&answers);
    let sprint_scores = SprintScores::from_modules(&averages);

    let order = rank_sprints(&sprint_scores, &averages);
    let worst = sprint_scores.get(order[0]);
    let take = if worst <= EXTENDED_PLAN_CUTOFF { 3 } else { 2 };

    let recommended_order = order
        .iter()
        .take(take)
        .enumerate()
        .map(|(i, key)| Recommendation {
            sprint_key: *key,
            title: key.title().to_string(),
            why: explain(*key, i == 0, sprint_scores.get(*key)),
            priority: (i + 1) as u8,
        })
        .collect();

    let total_score = averages.total();
    let percent = (total_score / MAX_TOTAL * 100.0).round() as u8;

    FreedomScoreResult {
        module_averages: averages,
        total_score,
        percent,
        sprint_scores,
        recommended_order,
    }
}

/// Validate, then score. Rejects any answer outside 1..=10.
pub fn score_checked(answers: &DiagnosticAnswers) -> Result<FreedomScoreResult, AnswerError> {
    answers.validate()?;
    Ok(score_and_recommend(answers))
}

pub fn module_averages(answers: &DiagnosticAnswers) -> ModuleAverages {
    let avg: Vec<f64> = answers
        .module_pairs()
        .iter()
        .map(|(q1, q2)| round1((*q1 as f64 + *q2 as f64) / 2.0))
        .collect();
    ModuleAverages {
        m1: avg[0],
        m2: avg[1],
        m3: avg[2],
        m4: avg[3],
        m5: avg[4],
        m6: avg[5],
    }
}

/// All five sprints, weakest first.
///
/// The tie comparator is not transitive across chains of near-ties, so this
/// uses a stable insertion sort: every input yields one fixed order.
pub fn rank_sprints(scores: &SprintScores, averages: &ModuleAverages) -> [SprintKey; 5] {
    let mut order = SprintKey::ALL;
    let delivery_worse = averages.m5 < averages.m3;

    for i in 1..order.len() {
        let mut j = i;
        while j > 0
            && compare(order[j - 1], order[j], scores, delivery_worse) == Ordering::Greater
        {
            order.swap(j - 1, j);
            j -= 1;
        }
    }
    order
}

fn compare(a: SprintKey, b: SprintKey, scores: &SprintScores, delivery_worse: bool) -> Ordering {
    let (sa, sb) = (scores.get(a), scores.get(b));
    if (sa - sb).abs() > TIE_THRESHOLD + EPSILON {
        return sa.partial_cmp(&sb).unwrap_or(Ordering::Equal);
    }
    break_tie(a, b, delivery_worse)
}

fn break_tie(a: SprintKey, b: SprintKey, delivery_worse: bool) -> Ordering {
    use SprintKey::*;

    // Pricing is treated as the root cause.
    if a == S1 {
        return Ordering::Less;
    }
    if b == S1 {
        return Ordering::Greater;
    }
    // Conversion before the sales process that depends on it.
    match (a, b) {
        (S2, S3) => return Ordering::Less,
        (S3, S2) => return Ordering::Greater,
        _ => {}
    }
    // Client-facing delivery risk first when execution trails systems.
    if delivery_worse {
        if a == S4 {
            return Ordering::Less;
        }
        if b == S4 {
            return Ordering::Greater;
        }
    }
    a.tie_rank().cmp(&b.tie_rank())
}

fn explain(key: SprintKey, first: bool, score: f64) -> String {
    let sprint = key.sprint();
    if !first {
        return sprint.why.to_string();
    }
    let prefix = if score <= CRITICAL_CUTOFF {
        "Critical bottleneck: "
    } else if score <= EXTENDED_PLAN_CUTOFF {
        "Major gap: "
    } else {
        ""
    };
    format!("{prefix}{}", sprint.why_urgent)
}
