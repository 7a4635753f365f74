//! Plain-text reports for the terminal. `--json` bypasses all of this.

use freedom_achievements::{AchievementStatus, AchievementSummary, MomentumScore};
use freedom_core::{FreedomScoreResult, SprintKey, MODULE_NAMES};
use std::fmt::Write;

pub fn score_report(result: &FreedomScoreResult) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "# Freedom Score: {:.1} / 60 ({}%)\n",
        result.total_score, result.percent
    );

    let _ = writeln!(out, "## Modules\n");
    for (name, avg) in MODULE_NAMES.iter().zip(result.module_averages.as_array()) {
        let _ = writeln!(out, "- {name:<22} {avg:>4.1}  {}", bar(avg));
    }

    let _ = writeln!(out, "\n## Sprint scores\n");
    for key in SprintKey::ALL {
        let _ = writeln!(
            out,
            "- {} {:<34} {:>4.1}",
            key,
            key.title(),
            result.sprint_scores.get(key)
        );
    }

    let _ = writeln!(out, "\n## Recommended order\n");
    for rec in &result.recommended_order {
        let _ = writeln!(out, "{}. {} ({})", rec.priority, rec.title, rec.sprint_key);
        let _ = writeln!(out, "   {}", rec.why);
    }
    out
}

pub fn achievements_report(list: &[AchievementStatus], newly: &[AchievementStatus]) -> String {
    let mut out = String::new();
    if !newly.is_empty() {
        let _ = writeln!(out, "## Just unlocked\n");
        for s in newly {
            let _ = writeln!(
                out,
                "{} {} (+{} pts, {:?})",
                s.achievement.icon, s.achievement.name, s.achievement.points, s.achievement.rarity
            );
        }
        out.push('\n');
    }

    let _ = writeln!(out, "## Achievements\n");
    for s in list {
        let mark = if s.unlocked { "x" } else { " " };
        let _ = writeln!(
            out,
            "[{mark}] {} {:<24} {:>4}/{:<4} {:>5} pts  {}",
            s.achievement.icon,
            s.achievement.name,
            s.progress,
            s.achievement.requirement,
            s.achievement.points,
            s.achievement.description
        );
    }
    out
}

pub fn momentum_report(score: &MomentumScore) -> String {
    let f = &score.factors;
    let mut out = String::new();
    let _ = writeln!(out, "# Momentum: {} ({:?})\n", score.current, score.trend);
    let _ = writeln!(out, "- base (tasks)      {:>6.1}", f.base_score);
    let _ = writeln!(out, "- streak            {:>6.1}", f.streak_bonus);
    let _ = writeln!(out, "- consistency       {:>6.1}", f.consistency_bonus);
    let _ = writeln!(out, "- business impact   {:>6.1}", f.business_impact_bonus);
    let _ = writeln!(out, "- achievements      {:>6.1}", f.achievement_bonus);
    let _ = writeln!(out, "- multiplier        {:>6.2}x", score.multiplier);
    out
}

pub fn summary_report(summary: &AchievementSummary) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "# {}/{} achievements ({}%), {}/{} points\n",
        summary.unlocked,
        summary.total,
        summary.completion_percent,
        summary.points_earned,
        summary.points_available
    );
    for r in &summary.by_rarity {
        let _ = writeln!(out, "- {:<10} {}/{}", format!("{:?}", r.rarity), r.unlocked, r.total);
    }
    if !summary.next_up.is_empty() {
        let _ = writeln!(out, "\n## Next up\n");
        for s in &summary.next_up {
            let _ = writeln!(
                out,
                "- {} {} {}/{}",
                s.achievement.icon, s.achievement.name, s.progress, s.achievement.requirement
            );
        }
    }
    out
}

fn bar(avg: f64) -> String {
    let filled = avg.round().clamp(0.0, 10.0) as usize;
    format!("{}{}", "#".repeat(filled), ".".repeat(10 - filled))
}
