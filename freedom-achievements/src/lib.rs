//! freedom-achievements: achievement catalog, live progress, unlocks, and momentum

pub mod cache;
pub mod catalog;
pub mod clock;
pub mod engine;
pub mod error;
pub mod memory;
pub mod momentum;
pub mod sources;
pub mod summary;

pub use cache::{NoCache, TtlCache, UserCache};
pub use catalog::{Achievement, AchievementCategory, Metric, Rarity, CATALOG};
pub use clock::{Clock, ManualClock, SystemClock};
pub use engine::{AchievementEngine, AchievementStatus, Collaborators, EngineConfig};
pub use error::{SourceError, SourceResult};
pub use memory::{LogNotifier, MemoryActivity, MemoryState, RecordingNotifier};
pub use momentum::{compute_momentum, MomentumFactors, MomentumInputs, MomentumScore, MomentumTrend};
pub use sources::{
    AchievementStore, ActivitySource, BusinessSource, CelebrationNotifier, CelebrationSummary,
    UnlockOutcome, UserAchievement,
};
pub use summary::{summarize, AchievementSummary, RarityCount};
