//! Roll-up of a user's achievement list for dashboards and the CLI.

use serde::Serialize;

use crate::catalog::Rarity;
use crate::engine::AchievementStatus;

const NEXT_UP: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RarityCount {
    pub rarity: Rarity,
    pub unlocked: u32,
    pub total: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AchievementSummary {
    pub total: u32,
    pub unlocked: u32,
    pub points_earned: u32,
    pub points_available: u32,
    pub completion_percent: u8,
    pub by_rarity: Vec<RarityCount>,
    /// Closest locked achievements, most progressed first.
    pub next_up: Vec<AchievementStatus>,
}

pub fn summarize(statuses: &[AchievementStatus]) -> AchievementSummary {
    let total = statuses.len() as u32;
    let unlocked = statuses.iter().filter(|s| s.unlocked).count() as u32;
    let points_earned = statuses
        .iter()
        .filter(|s| s.unlocked)
        .map(|s| s.achievement.points)
        .sum();
    let points_available = statuses.iter().map(|s| s.achievement.points).sum();
    let completion_percent = if total == 0 {
        0
    } else {
        (unlocked as f64 / total as f64 * 100.0).round() as u8
    };

    let by_rarity = Rarity::ALL
        .into_iter()
        .map(|rarity| {
            let of_rarity = statuses.iter().filter(|s| s.achievement.rarity == rarity);
            RarityCount {
                rarity,
                unlocked: of_rarity.clone().filter(|s| s.unlocked).count() as u32,
                total: of_rarity.count() as u32,
            }
        })
        .collect();

    let mut next_up: Vec<AchievementStatus> = statuses
        .iter()
        .filter(|s| !s.unlocked && s.progress > 0)
        .cloned()
        .collect();
    // Stable sort keeps catalog order among equal ratios.
    next_up.sort_by(|a, b| b.progress_ratio().total_cmp(&a.progress_ratio()));
    next_up.truncate(NEXT_UP);

    AchievementSummary {
        total,
        unlocked,
        points_earned,
        points_available,
        completion_percent,
        by_rarity,
        next_up,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::CATALOG;

    fn statuses(progress: &[(&str, u32)], unlocked: &[&str]) -> Vec<AchievementStatus> {
        CATALOG
            .iter()
            .map(|a| {
                let done = unlocked.contains(&a.id);
                let p = progress
                    .iter()
                    .find(|(id, _)| *id == a.id)
                    .map(|(_, p)| *p)
                    .unwrap_or(0);
                AchievementStatus {
                    achievement: *a,
                    unlocked: done,
                    unlocked_at: None,
                    progress: if done { a.requirement } else { p },
                }
            })
            .collect()
    }

    #[test]
    fn empty_user_has_nothing_earned() {
        let s = summarize(&statuses(&[], &[]));
        assert_eq!(s.total, 17);
        assert_eq!(s.unlocked, 0);
        assert_eq!(s.points_earned, 0);
        assert_eq!(s.completion_percent, 0);
        assert!(s.next_up.is_empty());
        let total: u32 = s.by_rarity.iter().map(|r| r.total).sum();
        assert_eq!(total, 17);
    }

    #[test]
    fn counts_points_and_rarity() {
        let s = summarize(&statuses(&[], &["first_steps", "streak_3", "streak_14"]));
        assert_eq!(s.unlocked, 3);
        assert_eq!(s.points_earned, 10 + 25 + 100);
        assert_eq!(s.completion_percent, 18);
        let common = s.by_rarity.iter().find(|r| r.rarity == Rarity::Common).unwrap();
        assert_eq!(common.unlocked, 2);
        let rare = s.by_rarity.iter().find(|r| r.rarity == Rarity::Rare).unwrap();
        assert_eq!(rare.unlocked, 1);
    }

    #[test]
    fn next_up_orders_by_progress_ratio() {
        let s = summarize(&statuses(
            &[("streak_7", 6), ("task_crusher", 5), ("streak_14", 6), ("quarterly_review", 2)],
            &[],
        ));
        let ids: Vec<&str> = s.next_up.iter().map(|n| n.achievement.id).collect();
        // 6/7, 2/3, 5/10; streak_14 at 6/14 is dropped
        assert_eq!(ids, vec!["streak_7", "quarterly_review", "task_crusher"]);
    }
}
