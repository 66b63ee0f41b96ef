//! Rounds: one stage of the tournament, group-based or direct knockout,
//! with a strict sequence order and a one-way status machine.

use crate::models::game::GameMatch;
use crate::models::group::{Group, GroupId};
use crate::models::rules::AdvancementRule;
use crate::models::slot::{SlotId, TeamSlot};
use crate::models::standing::Standing;
use crate::models::team::TeamId;
use crate::models::tournament::TournamentId;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a round.
pub type RoundId = Uuid;

/// Structural kind of a round: groups of slots, or a flat knockout slot list.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoundType {
    GroupBased,
    DirectKnockout,
}

/// Advisory competition format label. Does not constrain generation; the
/// generator is driven by the explicit format on each request.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoundFormat {
    RoundRobin,
    SingleElimination,
    DoubleElimination,
    Swiss,
    Custom,
}

/// Round lifecycle. Completed is terminal; there is no back-transition.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoundStatus {
    #[default]
    NotStarted,
    Ongoing,
    Completed,
}

/// A stage of the tournament. Group-based rounds hold their slots inside
/// groups; direct-knockout rounds hold slots and matches directly.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Round {
    pub id: RoundId,
    pub tournament_id: TournamentId,
    pub name: String,
    pub round_type: RoundType,
    pub format: RoundFormat,
    /// Unique, contiguous, ascending from 1 within the tournament.
    pub sequence_order: u32,
    pub status: RoundStatus,
    pub advancement_rule: AdvancementRule,
    /// GroupBased only.
    pub groups: Vec<Group>,
    /// DirectKnockout only.
    pub slots: Vec<TeamSlot>,
    pub matches: Vec<GameMatch>,
    /// Standings snapshot for DirectKnockout rounds.
    pub standings: Vec<Standing>,
}

impl Round {
    pub fn new(
        tournament_id: TournamentId,
        name: impl Into<String>,
        round_type: RoundType,
        format: RoundFormat,
        sequence_order: u32,
        advancement_rule: AdvancementRule,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            tournament_id,
            name: name.into(),
            round_type,
            format,
            sequence_order,
            status: RoundStatus::NotStarted,
            advancement_rule,
            groups: Vec::new(),
            slots: Vec::new(),
            matches: Vec::new(),
            standings: Vec::new(),
        }
    }

    pub fn group(&self, group_id: GroupId) -> Option<&Group> {
        self.groups.iter().find(|g| g.id == group_id)
    }

    pub fn group_mut(&mut self, group_id: GroupId) -> Option<&mut Group> {
        self.groups.iter_mut().find(|g| g.id == group_id)
    }

    /// Next free position in the round's own (knockout) slot list.
    pub fn next_position(&self) -> u32 {
        self.slots.iter().map(|s| s.position + 1).max().unwrap_or(0)
    }

    /// All concrete team ids seated anywhere in this round, across its own
    /// slots and every group. Backs the same-round uniqueness invariant.
    pub fn assigned_team_ids(&self) -> Vec<TeamId> {
        self.slots
            .iter()
            .chain(self.groups.iter().flat_map(|g| g.slots.iter()))
            .filter_map(|s| s.team_id)
            .collect()
    }

    /// Every slot in the round, own and grouped.
    pub fn all_slots(&self) -> impl Iterator<Item = &TeamSlot> {
        self.slots
            .iter()
            .chain(self.groups.iter().flat_map(|g| g.slots.iter()))
    }

    pub fn slot(&self, slot_id: SlotId) -> Option<&TeamSlot> {
        self.all_slots().find(|s| s.id == slot_id)
    }
}
