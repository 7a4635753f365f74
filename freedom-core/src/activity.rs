//! Activity records (check-ins, business snapshots) and the aggregates derived
//! from them: streak days, implementation analytics, business trend.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Days covered by the completion trend.
pub const TREND_DAYS: usize = 7;
/// Window used for check-in totals and average energy.
pub const ANALYTICS_WINDOW_DAYS: i64 = 30;

/// One daily check-in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckinRecord {
    pub user_id: String,
    /// Local calendar day the check-in belongs to.
    pub date: NaiveDate,
    /// 1-10 self-reported energy.
    pub energy_level: u8,
    pub tasks_completed: u32,
    pub created_at: DateTime<Utc>,
}

/// A month of tracked revenue/expense data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BusinessSnapshot {
    pub user_id: String,
    /// First day of the tracked month.
    pub month: NaiveDate,
    pub revenue: f64,
    pub expenses: f64,
}

impl BusinessSnapshot {
    pub fn profit(&self) -> f64 {
        self.revenue - self.expenses
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum BusinessTrend {
    Up,
    Down,
    #[default]
    Neutral,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ImplementationAnalytics {
    pub total_checkins: u32,
    pub average_energy_level: f64,
    /// Completed tasks per day, oldest first, ending today.
    pub completion_trend: Vec<u32>,
}

impl ImplementationAnalytics {
    pub fn average_daily_tasks(&self) -> f64 {
        mean(&self.completion_trend)
    }

    /// Saturates at `u32::MAX`.
    pub fn tasks_in_trend(&self) -> u32 {
        saturating_total(self.completion_trend.iter().copied())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct BusinessAnalytics {
    pub total_snapshots: u32,
    pub recent_trend: BusinessTrend,
}

fn saturating_total(values: impl IntoIterator<Item = u32>) -> u32 {
    values.into_iter().fold(0, u32::saturating_add)
}

/// Mean of a slice; 0 when empty.
pub fn mean(values: &[u32]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().map(|v| *v as f64).sum::<f64>() / values.len() as f64
}

/// Consecutive calendar days with a check-in, walking backward from `today`.
///
/// A day without a check-in ends the streak, so no check-in today means 0.
pub fn streak_days<I>(checkin_dates: I, today: NaiveDate) -> u32
where
    I: IntoIterator<Item = NaiveDate>,
{
    let days: HashSet<NaiveDate> = checkin_dates.into_iter().collect();
    let mut streak = 0;
    let mut day = today;
    while days.contains(&day) {
        streak += 1;
        match day.pred_opt() {
            Some(prev) => day = prev,
            None => break,
        }
    }
    streak
}

/// Check-ins dated within the last `days` days, including today.
pub fn recent_checkins(
    checkins: &[CheckinRecord],
    today: NaiveDate,
    days: i64,
) -> Vec<CheckinRecord> {
    let earliest = today - Duration::days(days.max(1) - 1);
    checkins
        .iter()
        .filter(|c| c.date >= earliest && c.date <= today)
        .cloned()
        .collect()
}

/// 30-day totals, average energy, and the 7-day completed-task trend.
pub fn implementation_analytics(
    checkins: &[CheckinRecord],
    today: NaiveDate,
) -> ImplementationAnalytics {
    let window = recent_checkins(checkins, today, ANALYTICS_WINDOW_DAYS);

    let average_energy_level = if window.is_empty() {
        0.0
    } else {
        window.iter().map(|c| c.energy_level as f64).sum::<f64>() / window.len() as f64
    };

    let completion_trend = (0..TREND_DAYS as i64)
        .rev()
        .map(|back| {
            let day = today - Duration::days(back);
            saturating_total(
                window
                    .iter()
                    .filter(|c| c.date == day)
                    .map(|c| c.tasks_completed),
            )
        })
        .collect();

    ImplementationAnalytics {
        total_checkins: window.len() as u32,
        average_energy_level,
        completion_trend,
    }
}

/// Snapshot count and whether profit moved up or down between the two most
/// recent months.
pub fn business_analytics(snapshots: &[BusinessSnapshot]) -> BusinessAnalytics {
    let mut ordered: Vec<&BusinessSnapshot> = snapshots.iter().collect();
    ordered.sort_by_key(|s| s.month);

    let recent_trend = match ordered.as_slice() {
        [.., prev, last] => {
            if last.profit() > prev.profit() {
                BusinessTrend::Up
            } else if last.profit() < prev.profit() {
                BusinessTrend::Down
            } else {
                BusinessTrend::Neutral
            }
        }
        _ => BusinessTrend::Neutral,
    };

    BusinessAnalytics {
        total_snapshots: snapshots.len() as u32,
        recent_trend,
    }
}
