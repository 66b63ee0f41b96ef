//! Team slots: a position inside a group or knockout round, either bound to
//! a concrete team or a placeholder waiting on a source rule.

use crate::models::game::MatchId;
use crate::models::group::GroupId;
use crate::models::team::TeamId;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a slot.
pub type SlotId = Uuid;

/// Which side of a finished match a placeholder is waiting for.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchOutcome {
    Winner,
    Loser,
}

/// Where a placeholder slot gets its team from once the referenced
/// match or group finishes.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SlotSource {
    /// Winner or loser of a specific match.
    MatchOutcome { match_id: MatchId, outcome: MatchOutcome },
    /// Nth place (1-based) of a group's final standings.
    GroupPlacement { group_id: GroupId, place: u32 },
}

/// A slot in a group or knockout round. Concrete slots have `team_id` set;
/// placeholders have a display name and a source rule instead. Resolution
/// fills in `team_id`, clears the name, and keeps `source` as provenance.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct TeamSlot {
    pub id: SlotId,
    /// Seed / slot order within the parent (0-based, append order).
    pub position: u32,
    pub team_id: Option<TeamId>,
    pub placeholder_name: Option<String>,
    pub source: Option<SlotSource>,
}

impl TeamSlot {
    /// A slot already bound to a team.
    pub fn concrete(position: u32, team_id: TeamId) -> Self {
        Self {
            id: Uuid::new_v4(),
            position,
            team_id: Some(team_id),
            placeholder_name: None,
            source: None,
        }
    }

    /// A pending slot that resolves from `source` later.
    pub fn placeholder(position: u32, name: impl Into<String>, source: SlotSource) -> Self {
        Self {
            id: Uuid::new_v4(),
            position,
            team_id: None,
            placeholder_name: Some(name.into()),
            source: Some(source),
        }
    }

    /// True while no concrete team backs this slot.
    pub fn is_placeholder(&self) -> bool {
        self.team_id.is_none()
    }

    /// Bind a concrete team. The source rule stays behind as provenance.
    pub fn resolve(&mut self, team_id: TeamId) {
        self.team_id = Some(team_id);
        self.placeholder_name = None;
    }
}
