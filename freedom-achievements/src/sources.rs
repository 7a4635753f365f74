//! Collaborator seams: everything the engine reads or writes goes through
//! one of these traits. Implementations own storage, HTTP, and email.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use freedom_core::{BusinessAnalytics, CheckinRecord, ImplementationAnalytics};
use serde::{Deserialize, Serialize};

use crate::catalog::Rarity;
use crate::error::SourceResult;

#[async_trait]
pub trait ActivitySource: Send + Sync {
    /// Check-ins from the last `days` days, today included.
    async fn recent_checkins(&self, user_id: &str, days: u32) -> SourceResult<Vec<CheckinRecord>>;

    /// Consecutive calendar days with a check-in, ending today.
    async fn streak_days(&self, user_id: &str) -> SourceResult<u32>;

    /// 30-day totals, average energy, and the 7-day completion trend.
    async fn implementation_analytics(
        &self,
        user_id: &str,
    ) -> SourceResult<ImplementationAnalytics>;
}

#[async_trait]
pub trait BusinessSource: Send + Sync {
    async fn business_analytics(&self, user_id: &str) -> SourceResult<BusinessAnalytics>;
}

/// A persisted unlock. Written once, never updated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserAchievement {
    pub user_id: String,
    pub achievement_id: String,
    pub unlocked_at: DateTime<Utc>,
    pub progress: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnlockOutcome {
    Inserted,
    /// A row for (user_id, achievement_id) was already present.
    AlreadyExists,
}

#[async_trait]
pub trait AchievementStore: Send + Sync {
    async fn unlocked(&self, user_id: &str) -> SourceResult<Vec<UserAchievement>>;

    /// Must be duplicate-safe on (user_id, achievement_id).
    async fn insert_unlock(&self, row: UserAchievement) -> SourceResult<UnlockOutcome>;
}

/// What a celebration message needs to know about the unlock.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CelebrationSummary {
    pub achievement_id: String,
    pub name: String,
    pub description: String,
    pub icon: String,
    pub points: u32,
    pub rarity: Rarity,
    pub unlocked_at: DateTime<Utc>,
}

#[async_trait]
pub trait CelebrationNotifier: Send + Sync {
    async fn schedule_milestone_celebration(
        &self,
        user_id: &str,
        summary: &CelebrationSummary,
    ) -> SourceResult<()>;
}
