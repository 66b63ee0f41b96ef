//! Advancement rules and the standings tie-break chain.

use serde::{Deserialize, Serialize};

/// Policy deciding which teams move from a completed round to the next.
/// One constructor per rule kind so the advancement engine can match
/// exhaustively instead of probing optional fields.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(tag = "rule", rename_all = "snake_case")]
pub enum AdvancementRule {
    /// Top `count` of each group's standings advance.
    TopN { count: u32 },
    /// Shorthand for the top finisher of each group.
    WinnersOnly,
    /// Top 2 of every group, plus the best `extra` third-place finishers
    /// ranked across all groups.
    BestThirdPlace { extra: u32 },
    /// Every team with at least `min_points` advances; no fixed count.
    Custom { min_points: u32 },
    /// No automatic advancement: teams move only via explicit selection.
    Manual,
}

impl Default for AdvancementRule {
    fn default() -> Self {
        AdvancementRule::TopN { count: 2 }
    }
}

/// One element of the standings sort chain, applied in order, descending.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TieBreak {
    Points,
    GoalDifference,
    GoalsFor,
    /// Points taken in the direct meetings of the two tied teams. Not part
    /// of the default chain; applied only when configured explicitly.
    HeadToHead,
}

/// Default chain: points, then goal difference, then goals scored. Equal on
/// all keys preserves slot insertion order (the sort is stable).
pub fn default_tie_breaks() -> Vec<TieBreak> {
    vec![TieBreak::Points, TieBreak::GoalDifference, TieBreak::GoalsFor]
}
