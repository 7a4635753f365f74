//! Momentum score: a composite of recent task completion, streak, energy,
//! business trend, and unlocked achievements. Derived on every call.

use freedom_core::activity::mean;
use freedom_core::BusinessTrend;
use serde::{Deserialize, Serialize};

use crate::engine::AchievementEngine;

const TASK_POINTS: f64 = 20.0;
const BASE_CAP: f64 = 200.0;
const STREAK_POINTS: f64 = 5.0;
const STREAK_CAP: f64 = 100.0;
const CONSISTENCY_BONUS: f64 = 50.0;
const BUSINESS_BONUS: f64 = 75.0;
const ACHIEVEMENT_POINTS: f64 = 5.0;

const CONSISTENT_ENERGY: f64 = 7.0;
const HIGH_ENERGY: f64 = 8.0;
const STREAK_MULTIPLIER: f64 = 0.02;
const ENERGY_MULTIPLIER: f64 = 0.1;
const RECENT_DAYS: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum MomentumTrend {
    Up,
    Down,
    #[default]
    Stable,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct MomentumFactors {
    pub base_score: f64,
    pub streak_bonus: f64,
    pub consistency_bonus: f64,
    pub business_impact_bonus: f64,
    pub achievement_bonus: f64,
}

impl MomentumFactors {
    pub fn total(&self) -> f64 {
        self.base_score
            + self.streak_bonus
            + self.consistency_bonus
            + self.business_impact_bonus
            + self.achievement_bonus
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MomentumScore {
    pub current: u32,
    pub trend: MomentumTrend,
    pub multiplier: f64,
    pub factors: MomentumFactors,
}

impl Default for MomentumScore {
    fn default() -> Self {
        Self {
            current: 0,
            trend: MomentumTrend::Stable,
            multiplier: 1.0,
            factors: MomentumFactors::default(),
        }
    }
}

/// Everything the momentum formula reads.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MomentumInputs {
    pub completion_trend: Vec<u32>,
    pub average_energy_level: f64,
    pub streak_days: u32,
    pub business_trend: BusinessTrend,
    pub unlocked_achievements: u32,
}

/// Points for average daily completed tasks, capped at 200.
pub fn base_score(average_daily_tasks: f64) -> f64 {
    (average_daily_tasks.max(0.0) * TASK_POINTS).min(BASE_CAP)
}

/// Points for streak length, capped at 100.
pub fn streak_bonus(streak_days: u32) -> f64 {
    (streak_days as f64 * STREAK_POINTS).min(STREAK_CAP)
}

pub fn compute_momentum(inputs: &MomentumInputs) -> MomentumScore {
    let factors = MomentumFactors {
        base_score: base_score(mean(&inputs.completion_trend)),
        streak_bonus: streak_bonus(inputs.streak_days),
        consistency_bonus: if inputs.average_energy_level >= CONSISTENT_ENERGY {
            CONSISTENCY_BONUS
        } else {
            0.0
        },
        business_impact_bonus: if inputs.business_trend == BusinessTrend::Up {
            BUSINESS_BONUS
        } else {
            0.0
        },
        achievement_bonus: inputs.unlocked_achievements as f64 * ACHIEVEMENT_POINTS,
    };

    let multiplier = 1.0
        + inputs.streak_days as f64 * STREAK_MULTIPLIER
        + if inputs.average_energy_level >= HIGH_ENERGY {
            ENERGY_MULTIPLIER
        } else {
            0.0
        };

    MomentumScore {
        current: (factors.total() * multiplier).round() as u32,
        trend: trend_direction(&inputs.completion_trend),
        multiplier,
        factors,
    }
}

/// Compare the last three days against the days before them. A history with
/// no day before the last three has nothing to compare against and reads as
/// stable.
pub fn trend_direction(trend: &[u32]) -> MomentumTrend {
    if trend.len() <= RECENT_DAYS {
        return MomentumTrend::Stable;
    }
    let (earlier, recent) = trend.split_at(trend.len() - RECENT_DAYS);
    let recent = mean(recent);
    let earlier = mean(earlier);
    if recent > earlier * 1.1 {
        MomentumTrend::Up
    } else if recent < earlier * 0.9 {
        MomentumTrend::Down
    } else {
        MomentumTrend::Stable
    }
}

impl AchievementEngine {
    /// Momentum for a user. Never fails: missing analytics or streak data
    /// yields the neutral score, and a failed business or unlock lookup only
    /// zeroes its own bonus.
    pub async fn calculate_momentum_score(&self, user_id: &str) -> MomentumScore {
        let (analytics, streak, business, unlocked) = tokio::join!(
            self.cached_analytics(user_id),
            self.cached_streak(user_id),
            self.business.business_analytics(user_id),
            self.store.unlocked(user_id),
        );

        let (analytics, streak_days) = match (analytics, streak) {
            (Ok(a), Ok(s)) => (a, s),
            (a, s) => {
                if let Err(e) = a {
                    tracing::warn!(user_id, error = %e, "momentum: analytics unavailable");
                }
                if let Err(e) = s {
                    tracing::warn!(user_id, error = %e, "momentum: streak unavailable");
                }
                return MomentumScore::default();
            }
        };

        let business_trend = business.map(|b| b.recent_trend).unwrap_or_else(|e| {
            tracing::warn!(user_id, error = %e, "momentum: business analytics unavailable");
            BusinessTrend::Neutral
        });

        let unlocked_achievements = unlocked.map(|rows| rows.len() as u32).unwrap_or_else(|e| {
            tracing::warn!(user_id, error = %e, "momentum: unlock history unavailable");
            0
        });

        let score = compute_momentum(&MomentumInputs {
            completion_trend: analytics.completion_trend,
            average_energy_level: analytics.average_energy_level,
            streak_days,
            business_trend,
            unlocked_achievements,
        });
        tracing::debug!(
            user_id,
            current = score.current,
            trend = ?score.trend,
            "momentum computed"
        );
        score
    }
}
