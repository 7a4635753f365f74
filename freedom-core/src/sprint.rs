//! Sprint catalog: the five remediation programs a diagnostic can recommend.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SprintKey {
    S1,
    S2,
    S3,
    S4,
    S5,
}

/// Static description of a sprint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sprint {
    pub key: SprintKey,
    pub title: &'static str,
    /// 1..=5, only used to order statistically tied scores.
    pub tie_rank: u8,
    /// Explanation when the sprint is recommended after the first slot.
    pub why: &'static str,
    /// Explanation when the sprint is the top recommendation.
    pub why_urgent: &'static str,
}

pub const SPRINTS: [Sprint; 5] = [
    Sprint {
        key: SprintKey::S1,
        title: "Pricing & Positioning Sprint",
        tie_rank: 1,
        why: "Sharpen who you serve and what you charge so every other system has margin to work with.",
        why_urgent: "Your pricing and positioning are holding everything else back; fix the offer before adding more effort.",
    },
    Sprint {
        key: SprintKey::S2,
        title: "Lead Conversion Sprint",
        tie_rank: 2,
        why: "Tighten the path from first contact to booked call so demand stops leaking out of the funnel.",
        why_urgent: "Leads are slipping through your funnel; fixing conversion is the fastest way to more revenue.",
    },
    Sprint {
        key: SprintKey::S3,
        title: "Sales Process Sprint",
        tie_rank: 3,
        why: "Turn sales conversations into a repeatable process that closes without you improvising.",
        why_urgent: "Your sales process depends on you; a repeatable close is the next unlock for growth.",
    },
    Sprint {
        key: SprintKey::S4,
        title: "Delivery Systems Sprint",
        tie_rank: 4,
        why: "Document and systemize delivery so clients get consistent results without your constant involvement.",
        why_urgent: "Delivery is your bottleneck; clients and capacity are at risk until systems carry the load.",
    },
    Sprint {
        key: SprintKey::S5,
        title: "Team & Leadership Sprint",
        tie_rank: 5,
        why: "Build the team rhythms and ownership that let the business run while you step back.",
        why_urgent: "The business still runs through you; leadership and delegation are the most urgent gap.",
    },
];

impl SprintKey {
    pub const ALL: [SprintKey; 5] = [
        SprintKey::S1,
        SprintKey::S2,
        SprintKey::S3,
        SprintKey::S4,
        SprintKey::S5,
    ];

    pub fn sprint(&self) -> &'static Sprint {
        match self {
            SprintKey::S1 => &SPRINTS[0],
            SprintKey::S2 => &SPRINTS[1],
            SprintKey::S3 => &SPRINTS[2],
            SprintKey::S4 => &SPRINTS[3],
            SprintKey::S5 => &SPRINTS[4],
        }
    }

    pub fn title(&self) -> &'static str {
        self.sprint().title
    }

    pub fn tie_rank(&self) -> u8 {
        self.sprint().tie_rank
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SprintKey::S1 => "S1",
            SprintKey::S2 => "S2",
            SprintKey::S3 => "S3",
            SprintKey::S4 => "S4",
            SprintKey::S5 => "S5",
        }
    }
}

impl std::fmt::Display for SprintKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Diagnostic module names, M1 first.
pub const MODULE_NAMES: [&str; 6] = [
    "Positioning & Pricing",
    "Lead Flow & Conversion",
    "Internal Systems",
    "Sales Process",
    "Client Delivery",
    "Team & Leadership",
];
