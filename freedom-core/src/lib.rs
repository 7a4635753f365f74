//! freedom-core: diagnostic scoring, sprint catalog, and activity aggregates

pub mod activity;
pub mod answers;
pub mod scoring;
pub mod sprint;
pub mod time;

pub use activity::{
    business_analytics, implementation_analytics, recent_checkins, streak_days, BusinessAnalytics,
    BusinessSnapshot, BusinessTrend, CheckinRecord, ImplementationAnalytics,
};
pub use answers::{AnswerError, AnswerSheet, DiagnosticAnswers};
pub use scoring::{
    score_and_recommend, score_checked, FreedomScoreResult, ModuleAverages, Recommendation,
    SprintScores,
};
pub use sprint::{Sprint, SprintKey, MODULE_NAMES, SPRINTS};
pub use time::{local_today, parse_local_to_utc, parse_timezone};
