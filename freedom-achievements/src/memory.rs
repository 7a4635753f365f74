//! In-process collaborators backed by a single [`MemoryState`].
//!
//! The CLI loads this state from a JSON file, runs the engine, and writes it
//! back; tests build it directly.

use async_trait::async_trait;
use chrono::NaiveDate;
use chrono_tz::Tz;
use freedom_core::{
    business_analytics, implementation_analytics, local_today, recent_checkins, streak_days,
    BusinessAnalytics, BusinessSnapshot, CheckinRecord, ImplementationAnalytics,
};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex, MutexGuard};

use crate::clock::Clock;
use crate::error::SourceResult;
use crate::sources::{
    AchievementStore, ActivitySource, BusinessSource, CelebrationNotifier, CelebrationSummary,
    UnlockOutcome, UserAchievement,
};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MemoryState {
    #[serde(default)]
    pub checkins: Vec<CheckinRecord>,
    #[serde(default)]
    pub snapshots: Vec<BusinessSnapshot>,
    #[serde(default)]
    pub unlocks: Vec<UserAchievement>,
}

impl MemoryState {
    /// Add check-ins, replacing any existing one for the same user and day.
    /// Returns how many were new days.
    pub fn merge_checkins(&mut self, incoming: Vec<CheckinRecord>) -> usize {
        let mut added = 0;
        for checkin in incoming {
            let before = self.checkins.len();
            self.checkins
                .retain(|c| !(c.user_id == checkin.user_id && c.date == checkin.date));
            if self.checkins.len() == before {
                added += 1;
            }
            self.checkins.push(checkin);
        }
        added
    }

    /// Add monthly snapshots, replacing any existing one for the same user
    /// and month.
    pub fn merge_snapshots(&mut self, incoming: Vec<BusinessSnapshot>) {
        for snapshot in incoming {
            self.snapshots
                .retain(|s| !(s.user_id == snapshot.user_id && s.month == snapshot.month));
            self.snapshots.push(snapshot);
        }
    }
}

pub struct MemoryActivity {
    clock: Arc<dyn Clock>,
    tz: Tz,
    inner: Mutex<MemoryState>,
}

impl MemoryActivity {
    pub fn new(clock: Arc<dyn Clock>, tz: Tz) -> Self {
        Self::from_state(MemoryState::default(), clock, tz)
    }

    pub fn from_state(state: MemoryState, clock: Arc<dyn Clock>, tz: Tz) -> Self {
        Self {
            clock,
            tz,
            inner: Mutex::new(state),
        }
    }

    /// Snapshot of everything held, for persisting.
    pub fn state(&self) -> MemoryState {
        self.lock().clone()
    }

    pub fn add_checkin(&self, checkin: CheckinRecord) {
        self.lock().checkins.push(checkin);
    }

    /// Record a month's numbers, replacing any earlier snapshot for the same
    /// user and month.
    pub fn add_snapshot(&self, snapshot: BusinessSnapshot) {
        self.lock().merge_snapshots(vec![snapshot]);
    }

    fn lock(&self) -> MutexGuard<'_, MemoryState> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn today(&self) -> NaiveDate {
        local_today(self.clock.now(), self.tz)
    }

    fn checkins_for(&self, user_id: &str) -> Vec<CheckinRecord> {
        self.lock()
            .checkins
            .iter()
            .filter(|c| c.user_id == user_id)
            .cloned()
            .collect()
    }
}

#[async_trait]
impl ActivitySource for MemoryActivity {
    async fn recent_checkins(&self, user_id: &str, days: u32) -> SourceResult<Vec<CheckinRecord>> {
        Ok(recent_checkins(&self.checkins_for(user_id), self.today(), days as i64))
    }

    async fn streak_days(&self, user_id: &str) -> SourceResult<u32> {
        let dates = self.checkins_for(user_id).into_iter().map(|c| c.date);
        Ok(streak_days(dates, self.today()))
    }

    async fn implementation_analytics(
        &self,
        user_id: &str,
    ) -> SourceResult<ImplementationAnalytics> {
        Ok(implementation_analytics(&self.checkins_for(user_id), self.today()))
    }
}

#[async_trait]
impl BusinessSource for MemoryActivity {
    async fn business_analytics(&self, user_id: &str) -> SourceResult<BusinessAnalytics> {
        let snapshots: Vec<BusinessSnapshot> = self
            .lock()
            .snapshots
            .iter()
            .filter(|s| s.user_id == user_id)
            .cloned()
            .collect();
        Ok(business_analytics(&snapshots))
    }
}

#[async_trait]
impl AchievementStore for MemoryActivity {
    async fn unlocked(&self, user_id: &str) -> SourceResult<Vec<UserAchievement>> {
        Ok(self
            .lock()
            .unlocks
            .iter()
            .filter(|u| u.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn insert_unlock(&self, row: UserAchievement) -> SourceResult<UnlockOutcome> {
        let mut state = self.lock();
        let exists = state
            .unlocks
            .iter()
            .any(|u| u.user_id == row.user_id && u.achievement_id == row.achievement_id);
        if exists {
            return Ok(UnlockOutcome::AlreadyExists);
        }
        state.unlocks.push(row);
        Ok(UnlockOutcome::Inserted)
    }
}

/// Notifier that only logs. Used when no email provider is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

#[async_trait]
impl CelebrationNotifier for LogNotifier {
    async fn schedule_milestone_celebration(
        &self,
        user_id: &str,
        summary: &CelebrationSummary,
    ) -> SourceResult<()> {
        tracing::info!(
            user_id,
            achievement = %summary.achievement_id,
            points = summary.points,
            "{} {} unlocked",
            summary.icon,
            summary.name
        );
        Ok(())
    }
}

/// Notifier that keeps every celebration it is asked to send.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    sent: Mutex<Vec<(String, CelebrationSummary)>>,
}

impl RecordingNotifier {
    pub fn sent(&self) -> Vec<(String, CelebrationSummary)> {
        self.sent.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

#[async_trait]
impl CelebrationNotifier for RecordingNotifier {
    async fn schedule_milestone_celebration(
        &self,
        user_id: &str,
        summary: &CelebrationSummary,
    ) -> SourceResult<()> {
        self.sent
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push((user_id.to_string(), summary.clone()));
        Ok(())
    }
}
