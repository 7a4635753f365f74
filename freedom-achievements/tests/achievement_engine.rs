use async_trait::async_trait;
use chrono::{Duration, NaiveDate, TimeZone, Utc};
use freedom_achievements::{
    Achievement, AchievementEngine, AchievementStore, ActivitySource, BusinessSource,
    CelebrationNotifier, CelebrationSummary, Clock, Collaborators, EngineConfig, ManualClock,
    MemoryActivity, MomentumScore, NoCache, RecordingNotifier, SourceError, SourceResult,
    UnlockOutcome, UserAchievement, CATALOG,
};
use freedom_core::{BusinessAnalytics, BusinessSnapshot, CheckinRecord, ImplementationAnalytics};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc;

const USER: &str = "user-1";

// 13:00 in Chicago (CDT) on Mar 10.
fn clock() -> Arc<ManualClock> {
    Arc::new(ManualClock::new(Utc.with_ymd_and_hms(2026, 3, 10, 18, 0, 0).unwrap()))
}

fn day(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 3, d).unwrap()
}

fn checkin(date: NaiveDate, energy: u8, tasks: u32) -> CheckinRecord {
    CheckinRecord {
        user_id: USER.to_string(),
        date,
        energy_level: energy,
        tasks_completed: tasks,
        created_at: Utc.with_ymd_and_hms(2026, 3, 1, 15, 0, 0).unwrap(),
    }
}

fn memory(clock: &Arc<ManualClock>) -> Arc<MemoryActivity> {
    Arc::new(MemoryActivity::new(clock.clone(), chrono_tz::America::Chicago))
}

fn engine(
    activity: Arc<dyn ActivitySource>,
    business: Arc<dyn BusinessSource>,
    store: Arc<dyn AchievementStore>,
    notifier: Arc<dyn CelebrationNotifier>,
    clock: Arc<ManualClock>,
) -> AchievementEngine {
    AchievementEngine::new(
        Collaborators {
            activity,
            business,
            store,
            notifier,
        },
        clock,
        EngineConfig::default(),
    )
}

fn memory_engine(
    mem: &Arc<MemoryActivity>,
    notifier: Arc<dyn CelebrationNotifier>,
    clock: &Arc<ManualClock>,
) -> AchievementEngine {
    engine(mem.clone(), mem.clone(), mem.clone(), notifier, clock.clone())
}

struct ChannelNotifier(mpsc::UnboundedSender<(String, CelebrationSummary)>);

#[async_trait]
impl CelebrationNotifier for ChannelNotifier {
    async fn schedule_milestone_celebration(
        &self,
        user_id: &str,
        summary: &CelebrationSummary,
    ) -> SourceResult<()> {
        let _ = self.0.send((user_id.to_string(), summary.clone()));
        Ok(())
    }
}

fn channel() -> (Arc<ChannelNotifier>, mpsc::UnboundedReceiver<(String, CelebrationSummary)>) {
    let (tx, rx) = mpsc::unbounded_channel();
    (Arc::new(ChannelNotifier(tx)), rx)
}

/// Every call fails.
struct Down;

fn down() -> SourceError {
    SourceError::Unavailable("connection refused".into())
}

#[async_trait]
impl ActivitySource for Down {
    async fn recent_checkins(&self, _: &str, _: u32) -> SourceResult<Vec<CheckinRecord>> {
        Err(down())
    }
    async fn streak_days(&self, _: &str) -> SourceResult<u32> {
        Err(down())
    }
    async fn implementation_analytics(&self, _: &str) -> SourceResult<ImplementationAnalytics> {
        Err(down())
    }
}

#[async_trait]
impl BusinessSource for Down {
    async fn business_analytics(&self, _: &str) -> SourceResult<BusinessAnalytics> {
        Err(down())
    }
}

#[async_trait]
impl AchievementStore for Down {
    async fn unlocked(&self, _: &str) -> SourceResult<Vec<UserAchievement>> {
        Err(down())
    }
    async fn insert_unlock(&self, _: UserAchievement) -> SourceResult<UnlockOutcome> {
        Err(down())
    }
}

#[async_trait]
impl CelebrationNotifier for Down {
    async fn schedule_milestone_celebration(
        &self,
        _: &str,
        _: &CelebrationSummary,
    ) -> SourceResult<()> {
        Err(down())
    }
}

/// Store that reads fine but rejects writes.
struct ReadOnlyStore;

#[async_trait]
impl AchievementStore for ReadOnlyStore {
    async fn unlocked(&self, _: &str) -> SourceResult<Vec<UserAchievement>> {
        Ok(Vec::new())
    }
    async fn insert_unlock(&self, _: UserAchievement) -> SourceResult<UnlockOutcome> {
        Err(SourceError::Invalid("read-only replica".into()))
    }
}

/// Counts how often the underlying aggregates are fetched.
struct Counting {
    inner: Arc<MemoryActivity>,
    streak_calls: AtomicUsize,
    analytics_calls: AtomicUsize,
}

#[async_trait]
impl ActivitySource for Counting {
    async fn recent_checkins(&self, user_id: &str, days: u32) -> SourceResult<Vec<CheckinRecord>> {
        self.inner.recent_checkins(user_id, days).await
    }
    async fn streak_days(&self, user_id: &str) -> SourceResult<u32> {
        self.streak_calls.fetch_add(1, Ordering::SeqCst);
        self.inner.streak_days(user_id).await
    }
    async fn implementation_analytics(
        &self,
        user_id: &str,
    ) -> SourceResult<ImplementationAnalytics> {
        self.analytics_calls.fetch_add(1, Ordering::SeqCst);
        self.inner.implementation_analytics(user_id).await
    }
}

#[tokio::test]
async fn new_user_sees_full_catalog_locked() {
    let clock = clock();
    let mem = memory(&clock);
    let (notifier, _rx) = channel();
    let engine = memory_engine(&mem, notifier, &clock);

    let list = engine.user_achievements(USER).await;
    assert_eq!(list.len(), 17);
    for (status, def) in list.iter().zip(CATALOG.iter()) {
        assert_eq!(status.achievement.id, def.id);
        assert!(!status.unlocked);
        assert_eq!(status.progress, 0);
        assert!(status.unlocked_at.is_none());
    }
}

#[tokio::test]
async fn first_checkin_unlocks_first_steps_once() {
    let clock = clock();
    let mem = memory(&clock);
    mem.add_checkin(checkin(day(10), 6, 3));
    let (notifier, mut rx) = channel();
    let engine = memory_engine(&mem, notifier, &clock);

    let newly = engine.check_and_unlock(USER).await;
    let ids: Vec<&str> = newly.iter().map(|s| s.achievement.id).collect();
    assert_eq!(ids, vec!["first_steps"]);
    assert!(newly[0].unlocked);
    assert_eq!(newly[0].unlocked_at, Some(clock.now()));

    let (user, summary) = tokio::time::timeout(std::time::Duration::from_secs(2), rx.recv())
        .await
        .expect("celebration delivered")
        .expect("channel open");
    assert_eq!(user, USER);
    assert_eq!(summary.achievement_id, "first_steps");
    assert_eq!(summary.points, 10);

    assert!(engine.check_and_unlock(USER).await.is_empty());
    assert_eq!(mem.state().unlocks.len(), 1);

    let list = engine.user_achievements(USER).await;
    let first = list.iter().find(|s| s.achievement.id == "first_steps").unwrap();
    assert!(first.unlocked);
    assert_eq!(first.progress, 1);
}

#[tokio::test]
async fn unlocks_survive_when_activity_drops() {
    let clock = clock();
    let mem = memory(&clock);
    for d in 8..=10 {
        mem.add_checkin(checkin(day(d), 5, 1));
    }
    let (notifier, _rx) = channel();
    let engine = memory_engine(&mem, notifier, &clock);

    let ids: Vec<&str> = engine
        .check_and_unlock(USER)
        .await
        .iter()
        .map(|s| s.achievement.id)
        .collect();
    assert!(ids.contains(&"streak_3"));

    // Five days of silence: the live streak is 0.
    clock.advance(Duration::days(5));
    let list = engine.user_achievements(USER).await;
    let streak_3 = list.iter().find(|s| s.achievement.id == "streak_3").unwrap();
    assert!(streak_3.unlocked);
    assert_eq!(streak_3.progress, 3);
    assert!(streak_3.unlocked_at.is_some());
    let streak_7 = list.iter().find(|s| s.achievement.id == "streak_7").unwrap();
    assert_eq!(streak_7.progress, 0);
}

#[tokio::test]
async fn progress_is_clamped_and_metrics_line_up() {
    let clock = clock();
    let mem = memory(&clock);
    for d in 1..=10 {
        mem.add_checkin(checkin(day(d), 9, 5));
    }
    mem.add_snapshot(BusinessSnapshot {
        user_id: USER.into(),
        month: NaiveDate::from_ymd_opt(2026, 1, 1).unwrap(),
        revenue: 9000.0,
        expenses: 4000.0,
    });
    mem.add_snapshot(BusinessSnapshot {
        user_id: USER.into(),
        month: NaiveDate::from_ymd_opt(2026, 2, 1).unwrap(),
        revenue: 12000.0,
        expenses: 4500.0,
    });
    let (notifier, _rx) = channel();
    let engine = memory_engine(&mem, notifier, &clock);

    let list = engine.user_achievements(USER).await;
    let progress = |id: &str| list.iter().find(|s| s.achievement.id == id).unwrap().progress;

    assert_eq!(progress("first_steps"), 1);
    assert_eq!(progress("streak_3"), 3);
    assert_eq!(progress("streak_7"), 7);
    assert_eq!(progress("streak_14"), 10);
    // 7-day trend of 5 tasks a day.
    assert_eq!(progress("task_crusher"), 10);
    assert_eq!(progress("productivity_pro"), 25);
    assert_eq!(progress("execution_machine"), 35);
    assert_eq!(progress("numbers_person"), 1);
    assert_eq!(progress("quarterly_review"), 2);
    assert_eq!(progress("energy_champion"), 10);
    // 5 tasks/day * 20 + 10-day streak * 5
    assert_eq!(progress("momentum_master"), 150);
    assert_eq!(progress("early_bird"), 0);
    assert_eq!(progress("sprint_finisher"), 0);

    for s in &list {
        assert!(s.progress <= s.achievement.requirement, "{}", s.achievement.id);
    }
}

#[tokio::test]
async fn failing_sources_degrade_to_zero() {
    let clock = clock();
    let down = Arc::new(Down);
    let engine = engine(down.clone(), down.clone(), down.clone(), down, clock);

    let list = engine.user_achievements(USER).await;
    assert_eq!(list.len(), 17);
    assert!(list.iter().all(|s| !s.unlocked && s.progress == 0));
    assert!(engine.check_and_unlock(USER).await.is_empty());
    assert_eq!(engine.calculate_momentum_score(USER).await, MomentumScore::default());
}

#[tokio::test]
async fn failing_notifier_does_not_block_unlock() {
    let clock = clock();
    let mem = memory(&clock);
    mem.add_checkin(checkin(day(10), 6, 1));
    let engine = memory_engine(&mem, Arc::new(Down), &clock);

    let newly = engine.check_and_unlock(USER).await;
    assert_eq!(newly.len(), 1);
    assert_eq!(mem.state().unlocks[0].achievement_id, "first_steps");
}

#[tokio::test]
async fn failed_insert_is_not_reported() {
    let clock = clock();
    let mem = memory(&clock);
    mem.add_checkin(checkin(day(10), 6, 1));
    let (notifier, mut rx) = channel();
    let engine = engine(mem.clone(), mem.clone(), Arc::new(ReadOnlyStore), notifier, clock);

    assert!(engine.check_and_unlock(USER).await.is_empty());
    drop(engine);
    assert!(rx.recv().await.is_none());
}

#[tokio::test]
async fn concurrent_unlocks_report_once() {
    let clock = clock();
    let mem = memory(&clock);
    mem.add_checkin(checkin(day(10), 6, 1));
    let (notifier, _rx) = channel();
    let a = memory_engine(&mem, notifier.clone(), &clock);
    let b = memory_engine(&mem, notifier, &clock);

    let (ra, rb) = tokio::join!(a.check_and_unlock(USER), b.check_and_unlock(USER));
    assert_eq!(ra.len() + rb.len(), 1);
    assert_eq!(mem.state().unlocks.len(), 1);
}

#[tokio::test]
async fn aggregates_are_cached_per_user_until_ttl() {
    let clock = clock();
    let mem = memory(&clock);
    mem.add_checkin(checkin(day(10), 6, 1));
    let counting = Arc::new(Counting {
        inner: mem.clone(),
        streak_calls: AtomicUsize::new(0),
        analytics_calls: AtomicUsize::new(0),
    });
    let (notifier, _rx) = channel();
    let engine = engine(counting.clone(), mem.clone(), mem.clone(), notifier, clock.clone());

    engine.user_achievements(USER).await;
    engine.user_achievements(USER).await;
    engine.calculate_momentum_score(USER).await;
    assert_eq!(counting.streak_calls.load(Ordering::SeqCst), 1);
    assert_eq!(counting.analytics_calls.load(Ordering::SeqCst), 1);

    engine.user_achievements("user-2").await;
    assert_eq!(counting.streak_calls.load(Ordering::SeqCst), 2);

    clock.advance(Duration::seconds(31));
    engine.user_achievements(USER).await;
    assert_eq!(counting.streak_calls.load(Ordering::SeqCst), 3);

    engine.invalidate(USER);
    engine.user_achievements(USER).await;
    assert_eq!(counting.streak_calls.load(Ordering::SeqCst), 4);
    assert_eq!(counting.analytics_calls.load(Ordering::SeqCst), 4);
}

#[tokio::test]
async fn momentum_blends_activity_business_and_unlocks() {
    let clock = clock();
    let mem = memory(&clock);
    for d in 4..=10 {
        mem.add_checkin(checkin(day(d), 9, 5));
    }
    mem.add_snapshot(BusinessSnapshot {
        user_id: USER.into(),
        month: NaiveDate::from_ymd_opt(2026, 1, 1).unwrap(),
        revenue: 9000.0,
        expenses: 4000.0,
    });
    mem.add_snapshot(BusinessSnapshot {
        user_id: USER.into(),
        month: NaiveDate::from_ymd_opt(2026, 2, 1).unwrap(),
        revenue: 12000.0,
        expenses: 4500.0,
    });
    let (notifier, _rx) = channel();
    let engine = memory_engine(&mem, notifier, &clock);

    let score = engine.calculate_momentum_score(USER).await;
    assert_eq!(score.factors.base_score, 100.0);
    assert_eq!(score.factors.streak_bonus, 35.0);
    assert_eq!(score.factors.consistency_bonus, 50.0);
    assert_eq!(score.factors.business_impact_bonus, 75.0);
    assert_eq!(score.factors.achievement_bonus, 0.0);
    assert!((score.multiplier - 1.24).abs() < 1e-9);
    assert_eq!(score.current, 322);

    // Unlocks feed the achievement bonus.
    let unlocked = engine.check_and_unlock(USER).await.len() as f64;
    assert!(unlocked > 0.0);
    let score = engine.calculate_momentum_score(USER).await;
    assert_eq!(score.factors.achievement_bonus, unlocked * 5.0);
    assert!(score.multiplier >= 1.0);
}

#[tokio::test]
async fn failing_business_source_only_drops_its_bonus() {
    let clock = clock();
    let mem = memory(&clock);
    for d in 8..=10 {
        mem.add_checkin(checkin(day(d), 7, 2));
    }
    let (notifier, _rx) = channel();
    let engine = engine(mem.clone(), Arc::new(Down), mem.clone(), notifier, clock);

    let score = engine.calculate_momentum_score(USER).await;
    assert_eq!(score.factors.business_impact_bonus, 0.0);
    assert_eq!(score.factors.streak_bonus, 15.0);
    assert_eq!(score.factors.consistency_bonus, 50.0);
    assert!(score.current > 0);

    let list = engine.user_achievements(USER).await;
    let numbers = list.iter().find(|s| s.achievement.id == "numbers_person").unwrap();
    assert_eq!(numbers.progress, 0);
    let streak_3 = list.iter().find(|s| s.achievement.id == "streak_3").unwrap();
    assert_eq!(streak_3.progress, 3);
}

#[tokio::test]
async fn every_new_unlock_is_celebrated() {
    let clock = clock();
    let mem = memory(&clock);
    for d in 8..=10 {
        mem.add_checkin(checkin(day(d), 5, 1));
    }
    let recorder = Arc::new(RecordingNotifier::default());
    let engine = memory_engine(&mem, recorder.clone(), &clock);

    let newly = engine.check_and_unlock(USER).await;
    assert_eq!(newly.len(), 2);

    for _ in 0..20 {
        if recorder.sent().len() == newly.len() {
            break;
        }
        tokio::task::yield_now().await;
    }
    let mut sent: Vec<String> = recorder
        .sent()
        .into_iter()
        .map(|(_, s)| s.achievement_id)
        .collect();
    sent.sort();
    assert_eq!(sent, vec!["first_steps", "streak_3"]);
}

#[tokio::test]
async fn no_cache_refetches_every_call() {
    let clock = clock();
    let mem = memory(&clock);
    let counting = Arc::new(Counting {
        inner: mem.clone(),
        streak_calls: AtomicUsize::new(0),
        analytics_calls: AtomicUsize::new(0),
    });
    let (notifier, _rx) = channel();
    let engine = engine(counting.clone(), mem.clone(), mem.clone(), notifier, clock)
        .with_caches(Box::new(NoCache), Box::new(NoCache));

    engine.user_achievements(USER).await;
    engine.user_achievements(USER).await;
    assert_eq!(counting.streak_calls.load(Ordering::SeqCst), 2);
}

static STREAKS_ONLY: [Achievement; 2] = [CATALOG[1], CATALOG[2]];

#[tokio::test]
async fn custom_catalog_replaces_the_standard_one() {
    let clock = clock();
    let mem = memory(&clock);
    for d in 8..=10 {
        mem.add_checkin(checkin(day(d), 5, 1));
    }
    let (notifier, _rx) = channel();
    let engine = memory_engine(&mem, notifier, &clock).with_catalog(&STREAKS_ONLY);
    assert_eq!(engine.catalog().len(), 2);

    let newly = engine.check_and_unlock(USER).await;
    let ids: Vec<&str> = newly.iter().map(|s| s.achievement.id).collect();
    assert_eq!(ids, vec!["streak_3"]);
    assert_eq!(engine.user_achievements(USER).await.len(), 2);
}
