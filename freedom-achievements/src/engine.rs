//! Achievement engine: live progress against the catalog, unlock persistence,
//! and fire-and-forget celebrations.
//!
//! Contract:
//! - public methods never fail; collaborator errors degrade the affected
//!   metric to 0 and are logged
//! - progress is clamped to [0, requirement]
//! - a persisted unlock always wins over live progress, so `unlocked` never
//!   flips back even if activity data later shrinks

use chrono::{DateTime, Duration, Utc};
use freedom_core::ImplementationAnalytics;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

use crate::cache::{TtlCache, UserCache};
use crate::catalog::{Achievement, Metric, CATALOG};
use crate::clock::Clock;
use crate::error::SourceResult;
use crate::momentum::{base_score, streak_bonus};
use crate::sources::{
    AchievementStore, ActivitySource, BusinessSource, CelebrationNotifier, CelebrationSummary,
    UnlockOutcome, UserAchievement,
};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// How long per-user streak and analytics aggregates are reused.
    pub cache_ttl_secs: i64,
    /// Minimum energy for a check-in to count toward Energy Champion.
    pub high_energy_threshold: u8,
    /// Look-back window for Energy Champion.
    pub high_energy_window_days: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            cache_ttl_secs: 30,
            high_energy_threshold: 8,
            high_energy_window_days: 14,
        }
    }
}

/// A catalog entry annotated for one user.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AchievementStatus {
    #[serde(flatten)]
    pub achievement: Achievement,
    pub unlocked: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unlocked_at: Option<DateTime<Utc>>,
    pub progress: u32,
}

impl AchievementStatus {
    pub fn progress_ratio(&self) -> f64 {
        self.progress as f64 / self.achievement.requirement.max(1) as f64
    }

    fn celebration(&self, unlocked_at: DateTime<Utc>) -> CelebrationSummary {
        CelebrationSummary {
            achievement_id: self.achievement.id.to_string(),
            name: self.achievement.name.to_string(),
            description: self.achievement.description.to_string(),
            icon: self.achievement.icon.to_string(),
            points: self.achievement.points,
            rarity: self.achievement.rarity,
            unlocked_at,
        }
    }
}

/// The data collaborators an engine reads from and writes to.
#[derive(Clone)]
pub struct Collaborators {
    pub activity: Arc<dyn ActivitySource>,
    pub business: Arc<dyn BusinessSource>,
    pub store: Arc<dyn AchievementStore>,
    pub notifier: Arc<dyn CelebrationNotifier>,
}

/// Raw metric values for one progress pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct ProgressInputs {
    streak_days: u32,
    total_checkins: u32,
    tasks_completed: u32,
    snapshots: u32,
    high_energy_checkins: u32,
    momentum_base: u32,
}

pub struct AchievementEngine {
    catalog: &'static [Achievement],
    activity: Arc<dyn ActivitySource>,
    pub(crate) business: Arc<dyn BusinessSource>,
    pub(crate) store: Arc<dyn AchievementStore>,
    notifier: Arc<dyn CelebrationNotifier>,
    clock: Arc<dyn Clock>,
    config: EngineConfig,
    streak_cache: Box<dyn UserCache<u32>>,
    analytics_cache: Box<dyn UserCache<ImplementationAnalytics>>,
}

impl AchievementEngine {
    /// Engine over the standard catalog with TTL caches driven by `clock`.
    pub fn new(collaborators: Collaborators, clock: Arc<dyn Clock>, config: EngineConfig) -> Self {
        let ttl = Duration::seconds(config.cache_ttl_secs.max(0));
        Self {
            catalog: &CATALOG,
            activity: collaborators.activity,
            business: collaborators.business,
            store: collaborators.store,
            notifier: collaborators.notifier,
            streak_cache: Box::new(TtlCache::new(ttl, Arc::clone(&clock))),
            analytics_cache: Box::new(TtlCache::new(ttl, Arc::clone(&clock))),
            clock,
            config,
        }
    }

    pub fn with_catalog(mut self, catalog: &'static [Achievement]) -> Self {
        self.catalog = catalog;
        self
    }

    pub fn with_caches(
        mut self,
        streak: Box<dyn UserCache<u32>>,
        analytics: Box<dyn UserCache<ImplementationAnalytics>>,
    ) -> Self {
        self.streak_cache = streak;
        self.analytics_cache = analytics;
        self
    }

    pub fn catalog(&self) -> &'static [Achievement] {
        self.catalog
    }

    /// Forget cached aggregates for a user, e.g. right after a new check-in.
    pub fn invalidate(&self, user_id: &str) {
        self.streak_cache.expire(user_id);
        self.analytics_cache.expire(user_id);
    }

    /// Every catalog entry with the user's unlock state and progress.
    pub async fn user_achievements(&self, user_id: &str) -> Vec<AchievementStatus> {
        let unlocked: HashMap<String, UserAchievement> = match self.store.unlocked(user_id).await {
            Ok(rows) => rows
                .into_iter()
                .map(|r| (r.achievement_id.clone(), r))
                .collect(),
            Err(e) => {
                tracing::warn!(
                    user_id,
                    error = %e,
                    "unlock history unavailable; using live progress only"
                );
                HashMap::new()
            }
        };

        let locked: Vec<&Achievement> = self
            .catalog
            .iter()
            .filter(|a| !unlocked.contains_key(a.id))
            .collect();
        let inputs = self.gather(user_id, &locked).await;

        self.catalog
            .iter()
            .map(|a| match unlocked.get(a.id) {
                Some(row) => AchievementStatus {
                    achievement: *a,
                    unlocked: true,
                    unlocked_at: Some(row.unlocked_at),
                    progress: a.requirement,
                },
                None => AchievementStatus {
                    achievement: *a,
                    unlocked: false,
                    unlocked_at: None,
                    progress: measure(a.metric, &inputs).min(a.requirement),
                },
            })
            .collect()
    }

    /// Persist every achievement whose progress reached its requirement and
    /// return the ones this call unlocked.
    ///
    /// A row another request inserted first is not reported again. Insert
    /// failures drop the entry; it is re-evaluated on the next call.
    pub async fn check_and_unlock(&self, user_id: &str) -> Vec<AchievementStatus> {
        let ready: Vec<AchievementStatus> = self
            .user_achievements(user_id)
            .await
            .into_iter()
            .filter(|s| !s.unlocked && s.progress >= s.achievement.requirement)
            .collect();

        let now = self.clock.now();
        let mut newly = Vec::new();

        for mut status in ready {
            let row = UserAchievement {
                user_id: user_id.to_string(),
                achievement_id: status.achievement.id.to_string(),
                unlocked_at: now,
                progress: status.progress,
            };
            match self.store.insert_unlock(row).await {
                Ok(UnlockOutcome::Inserted) => {
                    tracing::info!(
                        user_id,
                        achievement = status.achievement.id,
                        "achievement unlocked"
                    );
                    status.unlocked = true;
                    status.unlocked_at = Some(now);
                    self.celebrate(user_id, status.celebration(now));
                    newly.push(status);
                }
                Ok(UnlockOutcome::AlreadyExists) => {
                    tracing::debug!(
                        user_id,
                        achievement = status.achievement.id,
                        "unlock already recorded"
                    );
                }
                Err(e) => {
                    tracing::warn!(
                        user_id,
                        achievement = status.achievement.id,
                        error = %e,
                        "failed to record unlock"
                    );
                }
            }
        }

        newly
    }

    fn celebrate(&self, user_id: &str, summary: CelebrationSummary) {
        let notifier = Arc::clone(&self.notifier);
        let user_id = user_id.to_string();
        tokio::spawn(async move {
            if let Err(e) = notifier.schedule_milestone_celebration(&user_id, &summary).await {
                tracing::warn!(
                    user_id = %user_id,
                    achievement = %summary.achievement_id,
                    error = %e,
                    "celebration notification failed"
                );
            }
        });
    }

    /// Fetch what the still-locked achievements need, concurrently.
    async fn gather(&self, user_id: &str, locked: &[&Achievement]) -> ProgressInputs {
        let needs = |m: Metric| locked.iter().any(|a| a.metric == m);
        let needs_business = needs(Metric::BusinessSnapshots);
        let needs_energy = needs(Metric::HighEnergyCheckins);

        let (streak, analytics, snapshots, high_energy) = tokio::join!(
            self.cached_streak(user_id),
            self.cached_analytics(user_id),
            async {
                if needs_business {
                    self.snapshot_count(user_id).await
                } else {
                    0
                }
            },
            async {
                if needs_energy {
                    self.high_energy_checkins(user_id).await
                } else {
                    0
                }
            },
        );

        let streak_days = streak.unwrap_or_else(|e| {
            tracing::warn!(user_id, error = %e, "streak unavailable; streak progress is 0");
            0
        });
        let analytics = analytics.unwrap_or_else(|e| {
            tracing::warn!(
                user_id,
                error = %e,
                "analytics unavailable; completion progress is 0"
            );
            ImplementationAnalytics::default()
        });

        let base = base_score(analytics.average_daily_tasks()) + streak_bonus(streak_days);
        let momentum_base = base.round() as u32;

        ProgressInputs {
            streak_days,
            total_checkins: analytics.total_checkins,
            tasks_completed: analytics.tasks_in_trend(),
            snapshots,
            high_energy_checkins: high_energy,
            momentum_base,
        }
    }

    pub(crate) async fn cached_streak(&self, user_id: &str) -> SourceResult<u32> {
        if let Some(days) = self.streak_cache.get(user_id) {
            tracing::debug!(user_id, days, "streak cache hit");
            return Ok(days);
        }
        let days = self.activity.streak_days(user_id).await?;
        self.streak_cache.set(user_id, days);
        Ok(days)
    }

    pub(crate) async fn cached_analytics(
        &self,
        user_id: &str,
    ) -> SourceResult<ImplementationAnalytics> {
        if let Some(a) = self.analytics_cache.get(user_id) {
            tracing::debug!(user_id, "analytics cache hit");
            return Ok(a);
        }
        let a = self.activity.implementation_analytics(user_id).await?;
        self.analytics_cache.set(user_id, a.clone());
        Ok(a)
    }

    async fn snapshot_count(&self, user_id: &str) -> u32 {
        match self.business.business_analytics(user_id).await {
            Ok(b) => b.total_snapshots,
            Err(e) => {
                tracing::warn!(
                    user_id,
                    error = %e,
                    "business analytics unavailable; business progress is 0"
                );
                0
            }
        }
    }

    async fn high_energy_checkins(&self, user_id: &str) -> u32 {
        let threshold = self.config.high_energy_threshold;
        match self
            .activity
            .recent_checkins(user_id, self.config.high_energy_window_days)
            .await
        {
            Ok(checkins) => checkins
                .iter()
                .filter(|c| c.energy_level >= threshold)
                .count() as u32,
            Err(e) => {
                tracing::warn!(
                    user_id,
                    error = %e,
                    "recent check-ins unavailable; energy progress is 0"
                );
                0
            }
        }
    }
}

fn measure(metric: Metric, inputs: &ProgressInputs) -> u32 {
    match metric {
        Metric::StreakDays => inputs.streak_days,
        Metric::TotalCheckins => inputs.total_checkins,
        Metric::TasksCompleted => inputs.tasks_completed,
        Metric::BusinessSnapshots => inputs.snapshots,
        Metric::HighEnergyCheckins => inputs.high_energy_checkins,
        Metric::MomentumBase => inputs.momentum_base,
        // Time-of-day and sprint tracking do not exist yet.
        Metric::EarlyCheckins | Metric::SprintsCompleted => 0,
    }
}
