//! Achievement catalog: 17 immutable definitions.
//!
//! Each entry names the metric its live progress is measured by, so progress
//! dispatch is an exhaustive `match` on [`Metric`] rather than on ids.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AchievementCategory {
    Streak,
    Completion,
    Business,
    Consistency,
    Milestone,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Rarity {
    Common,
    Rare,
    Epic,
    Legendary,
}

impl Rarity {
    pub const ALL: [Rarity; 4] = [Rarity::Common, Rarity::Rare, Rarity::Epic, Rarity::Legendary];
}

/// What an achievement's progress counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Metric {
    /// Consecutive days with a check-in, ending today.
    StreakDays,
    /// Check-ins in the analytics window.
    TotalCheckins,
    /// Sum of the 7-day completed-task trend.
    TasksCompleted,
    /// Months of tracked business data.
    BusinessSnapshots,
    /// Recent check-ins at or above the high-energy threshold.
    HighEnergyCheckins,
    /// Completion and streak terms of the momentum score, without multiplier
    /// or achievement bonus.
    MomentumBase,
    /// Not tracked yet: always 0.
    EarlyCheckins,
    /// Not tracked yet: always 0.
    SprintsCompleted,
}

impl Metric {
    pub fn category(&self) -> AchievementCategory {
        match self {
            Metric::StreakDays => AchievementCategory::Streak,
            Metric::TotalCheckins | Metric::TasksCompleted => AchievementCategory::Completion,
            Metric::BusinessSnapshots => AchievementCategory::Business,
            Metric::HighEnergyCheckins | Metric::MomentumBase | Metric::EarlyCheckins => {
                AchievementCategory::Consistency
            }
            Metric::SprintsCompleted => AchievementCategory::Milestone,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Achievement {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub icon: &'static str,
    pub category: AchievementCategory,
    pub requirement: u32,
    pub points: u32,
    pub rarity: Rarity,
    #[serde(skip)]
    pub metric: Metric,
}

pub const FIRST_STEPS: &str = "first_steps";
pub const ENERGY_CHAMPION: &str = "energy_champion";
pub const MOMENTUM_MASTER: &str = "momentum_master";
pub const EARLY_BIRD: &str = "early_bird";

pub const CATALOG: [Achievement; 17] = [
    Achievement {
        id: FIRST_STEPS,
        name: "First Steps",
        description: "Complete your first daily check-in",
        icon: "👣",
        category: AchievementCategory::Completion,
        requirement: 1,
        points: 10,
        rarity: Rarity::Common,
        metric: Metric::TotalCheckins,
    },
    Achievement {
        id: "streak_3",
        name: "On a Roll",
        description: "Check in 3 days in a row",
        icon: "🔥",
        category: AchievementCategory::Streak,
        requirement: 3,
        points: 25,
        rarity: Rarity::Common,
        metric: Metric::StreakDays,
    },
    Achievement {
        id: "streak_7",
        name: "Week Warrior",
        description: "Check in 7 days in a row",
        icon: "⚡",
        category: AchievementCategory::Streak,
        requirement: 7,
        points: 50,
        rarity: Rarity::Common,
        metric: Metric::StreakDays,
    },
    Achievement {
        id: "streak_14",
        name: "Fortnight Focus",
        description: "Check in 14 days in a row",
        icon: "🎯",
        category: AchievementCategory::Streak,
        requirement: 14,
        points: 100,
        rarity: Rarity::Rare,
        metric: Metric::StreakDays,
    },
    Achievement {
        id: "streak_30",
        name: "Monthly Master",
        description: "Check in 30 days in a row",
        icon: "🏆",
        category: AchievementCategory::Streak,
        requirement: 30,
        points: 250,
        rarity: Rarity::Epic,
        metric: Metric::StreakDays,
    },
    Achievement {
        id: "streak_100",
        name: "Centurion",
        description: "Check in 100 days in a row",
        icon: "👑",
        category: AchievementCategory::Streak,
        requirement: 100,
        points: 1000,
        rarity: Rarity::Legendary,
        metric: Metric::StreakDays,
    },
    Achievement {
        id: "task_crusher",
        name: "Task Crusher",
        description: "Complete 10 tasks in a week",
        icon: "✅",
        category: AchievementCategory::Completion,
        requirement: 10,
        points: 50,
        rarity: Rarity::Common,
        metric: Metric::TasksCompleted,
    },
    Achievement {
        id: "productivity_pro",
        name: "Productivity Pro",
        description: "Complete 25 tasks in a week",
        icon: "🚀",
        category: AchievementCategory::Completion,
        requirement: 25,
        points: 100,
        rarity: Rarity::Rare,
        metric: Metric::TasksCompleted,
    },
    Achievement {
        id: "execution_machine",
        name: "Execution Machine",
        description: "Complete 50 tasks in a week",
        icon: "⚙️",
        category: AchievementCategory::Completion,
        requirement: 50,
        points: 250,
        rarity: Rarity::Epic,
        metric: Metric::TasksCompleted,
    },
    Achievement {
        id: "numbers_person",
        name: "Numbers Person",
        description: "Save your first business snapshot",
        icon: "📊",
        category: AchievementCategory::Business,
        requirement: 1,
        points: 25,
        rarity: Rarity::Common,
        metric: Metric::BusinessSnapshots,
    },
    Achievement {
        id: "quarterly_review",
        name: "Quarterly Review",
        description: "Track 3 months of business data",
        icon: "📈",
        category: AchievementCategory::Business,
        requirement: 3,
        points: 100,
        rarity: Rarity::Rare,
        metric: Metric::BusinessSnapshots,
    },
    Achievement {
        id: "half_year_habit",
        name: "Half-Year Habit",
        description: "Track 6 months of business data",
        icon: "💼",
        category: AchievementCategory::Business,
        requirement: 6,
        points: 250,
        rarity: Rarity::Epic,
        metric: Metric::BusinessSnapshots,
    },
    Achievement {
        id: "full_year_books",
        name: "Full Year on the Books",
        description: "Track 12 months of business data",
        icon: "🏦",
        category: AchievementCategory::Business,
        requirement: 12,
        points: 500,
        rarity: Rarity::Legendary,
        metric: Metric::BusinessSnapshots,
    },
    Achievement {
        id: ENERGY_CHAMPION,
        name: "Energy Champion",
        description: "Log 10 high-energy check-ins in two weeks",
        icon: "💪",
        category: AchievementCategory::Consistency,
        requirement: 10,
        points: 100,
        rarity: Rarity::Rare,
        metric: Metric::HighEnergyCheckins,
    },
    Achievement {
        id: MOMENTUM_MASTER,
        name: "Momentum Master",
        description: "Reach a base momentum of 250",
        icon: "🌊",
        category: AchievementCategory::Consistency,
        requirement: 250,
        points: 500,
        rarity: Rarity::Legendary,
        metric: Metric::MomentumBase,
    },
    Achievement {
        id: EARLY_BIRD,
        name: "Early Bird",
        description: "Check in before 7am five times",
        icon: "🌅",
        category: AchievementCategory::Consistency,
        requirement: 5,
        points: 50,
        rarity: Rarity::Rare,
        metric: Metric::EarlyCheckins,
    },
    Achievement {
        id: "sprint_finisher",
        name: "Sprint Finisher",
        description: "Complete your first sprint",
        icon: "🏁",
        category: AchievementCategory::Milestone,
        requirement: 1,
        points: 250,
        rarity: Rarity::Epic,
        metric: Metric::SprintsCompleted,
    },
];
