//! Standings rows: the computed ranking of one team, derived from completed
//! matches and never stored as source of truth.

use crate::models::team::TeamId;
use serde::{Deserialize, Serialize};

/// One team's line in a group (or knockout round) table. Points are
/// 3 per win and 1 per draw; goal difference is recomputed from the
/// accumulated totals rather than tracked incrementally.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Standing {
    pub team_id: TeamId,
    pub team_name: String,
    pub matches_played: u32,
    pub wins: u32,
    pub draws: u32,
    pub losses: u32,
    pub goals_for: u32,
    pub goals_against: u32,
    pub goal_difference: i32,
    pub points: u32,
    /// 1-based rank after sorting.
    pub position: u32,
    /// Set by the advancement engine once the team moves on.
    pub advanced: bool,
}

impl Standing {
    /// Fresh zero row for a team, ranked last until sorted.
    pub fn new(team_id: TeamId, team_name: impl Into<String>) -> Self {
        Self {
            team_id,
            team_name: team_name.into(),
            matches_played: 0,
            wins: 0,
            draws: 0,
            losses: 0,
            goals_for: 0,
            goals_against: 0,
            goal_difference: 0,
            points: 0,
            position: 0,
            advanced: false,
        }
    }
}
