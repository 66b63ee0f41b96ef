//! Groups: a pool of team slots under a group-based round, with its matches
//! and a cached standings snapshot.

use crate::models::game::{GameMatch, MatchId};
use crate::models::round::RoundId;
use crate::models::rules::AdvancementRule;
use crate::models::slot::{SlotId, TeamSlot};
use crate::models::standing::Standing;
use crate::models::team::TeamId;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a group.
pub type GroupId = Uuid;

/// How the group's schedule is meant to be built. Advisory except that the
/// generator is asked for the matching pairing algorithm.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupFormat {
    /// Matches entered by hand, no generation.
    Manual,
    #[default]
    RoundRobinSingle,
    RoundRobinDouble,
    CustomMultiple,
}

/// A group of team slots inside a group-based round.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Group {
    pub id: GroupId,
    pub round_id: RoundId,
    pub name: String,
    pub format: GroupFormat,
    /// Slot capacity, at least 2.
    pub max_teams: u32,
    /// Overrides the round's rule for this group when set.
    pub advancement_rule: Option<AdvancementRule>,
    pub slots: Vec<TeamSlot>,
    pub matches: Vec<GameMatch>,
    /// Snapshot refreshed on demand; `matches` stays the source of truth.
    pub standings: Vec<Standing>,
}

impl Group {
    pub fn new(round_id: RoundId, name: impl Into<String>, format: GroupFormat, max_teams: u32) -> Self {
        Self {
            id: Uuid::new_v4(),
            round_id,
            name: name.into(),
            format,
            max_teams,
            advancement_rule: None,
            slots: Vec::new(),
            matches: Vec::new(),
            standings: Vec::new(),
        }
    }

    /// Next free slot position (append order).
    pub fn next_position(&self) -> u32 {
        self.slots.iter().map(|s| s.position + 1).max().unwrap_or(0)
    }

    pub fn slot(&self, slot_id: SlotId) -> Option<&TeamSlot> {
        self.slots.iter().find(|s| s.id == slot_id)
    }

    pub fn has_team(&self, team_id: TeamId) -> bool {
        self.slots.iter().any(|s| s.team_id == Some(team_id))
    }

    pub fn game_match(&self, match_id: MatchId) -> Option<&GameMatch> {
        self.matches.iter().find(|m| m.id == match_id)
    }

    /// True once every generated match is completed (and at least one exists).
    pub fn all_matches_completed(&self) -> bool {
        !self.matches.is_empty() && self.matches.iter().all(|m| m.is_completed())
    }
}
