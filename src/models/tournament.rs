//! Tournament aggregate and the engine error taxonomy.

use crate::models::game::{GameMatch, MatchId, MatchStatus};
use crate::models::group::{Group, GroupId};
use crate::models::round::{Round, RoundId, RoundStatus};
use crate::models::rules::{default_tie_breaks, TieBreak};
use crate::models::slot::{SlotId, TeamSlot};
use crate::models::team::{TeamEntry, TeamId};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a tournament.
pub type TournamentId = Uuid;

/// Classification of an engine error, used by the API layer to pick a
/// response status. Every `EngineError` variant maps to exactly one kind.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorKind {
    /// Malformed input (empty name, capacity below 2, too few teams).
    Validation,
    /// The request collides with existing state (duplicate assignment,
    /// group under a knockout round, full group).
    Conflict,
    /// Unknown round/group/team/match/slot reference.
    NotFound,
    /// Illegal transition or a mutation the current lifecycle forbids.
    State,
    /// A required precondition is not yet met (unresolved placeholders).
    Precondition,
}

/// Errors that can occur during structure or progression operations. Each
/// variant carries the context identifying the violated invariant.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum EngineError {
    /// Name was empty after trimming.
    EmptyName,
    /// Group capacity below the minimum of 2.
    MaxTeamsTooSmall { given: u32 },
    /// Group capacity cannot shrink below the teams already seated.
    MaxTeamsBelowAssigned { given: u32, assigned: usize },
    /// Schedule generation needs at least 2 teams.
    InsufficientTeams { have: usize },
    /// Placeholder placements are 1-based.
    InvalidPlacement { place: u32 },
    /// A team with this name already exists (names are unique, case-insensitive).
    DuplicateTeamName { name: String },
    /// The team already occupies a slot in this group/round.
    TeamAlreadyInTarget { team_id: TeamId },
    /// The team already occupies a slot in a sibling group of the same round.
    TeamAlreadyInRound { team_id: TeamId },
    /// Groups exist only under group-based rounds.
    GroupUnderKnockoutRound { round_id: RoundId },
    /// Slots can be assigned directly only on direct-knockout rounds.
    RoundNotSlotTarget { round_id: RoundId },
    /// The group's slot table is at max_teams.
    GroupFull { group_id: GroupId, max_teams: u32 },
    RoundNotFound(RoundId),
    GroupNotFound(GroupId),
    MatchNotFound(MatchId),
    TeamNotFound(TeamId),
    /// Neither a group nor a knockout round carries this id.
    TargetNotFound(Uuid),
    /// The team (or slot) is not seated in this group/round.
    TeamNotInTarget { team_id: TeamId },
    /// startRound on a round that already ran.
    RoundNotPending { status: RoundStatus },
    /// startRound while the previous round is not completed.
    PredecessorNotCompleted { sequence: u32, status: RoundStatus },
    /// completeRound on a round that is not ongoing.
    RoundNotOngoing { status: RoundStatus },
    /// Mutation refused because the round is completed (terminal).
    RoundCompleted { round_id: RoundId },
    /// Advancement asked for a successor round that does not exist.
    NoNextRound { round_id: RoundId },
    /// Generation refused while a schedule exists; clear first.
    MatchesAlreadyGenerated { existing: usize },
    /// Team removal refused once matches exist for the target.
    RemovalBlockedByMatches { existing: usize },
    /// Unresolved placeholders cannot be removed directly.
    SlotIsPlaceholder { slot_id: SlotId },
    /// Roster entries stay while the team occupies a slot somewhere.
    TeamOccupiesSlot { team_id: TeamId },
    /// Results are final; a completed match cannot be re-reported.
    MatchAlreadyCompleted { match_id: MatchId },
    /// Disallowed match status transition.
    InvalidMatchTransition { from: MatchStatus, to: MatchStatus },
    /// Generation refused while the target still has unresolved placeholders.
    UnresolvedPlaceholders { count: usize },
}

impl EngineError {
    /// Taxonomy bucket for this error.
    pub fn kind(&self) -> ErrorKind {
        use EngineError::*;
        match self {
            EmptyName
            | MaxTeamsTooSmall { .. }
            | MaxTeamsBelowAssigned { .. }
            | InsufficientTeams { .. }
            | InvalidPlacement { .. } => ErrorKind::Validation,
            DuplicateTeamName { .. }
            | TeamAlreadyInTarget { .. }
            | TeamAlreadyInRound { .. }
            | GroupUnderKnockoutRound { .. }
            | RoundNotSlotTarget { .. }
            | GroupFull { .. } => ErrorKind::Conflict,
            RoundNotFound(_)
            | GroupNotFound(_)
            | MatchNotFound(_)
            | TeamNotFound(_)
            | TargetNotFound(_)
            | TeamNotInTarget { .. } => ErrorKind::NotFound,
            RoundNotPending { .. }
            | PredecessorNotCompleted { .. }
            | RoundNotOngoing { .. }
            | RoundCompleted { .. }
            | NoNextRound { .. }
            | MatchesAlreadyGenerated { .. }
            | RemovalBlockedByMatches { .. }
            | SlotIsPlaceholder { .. }
            | TeamOccupiesSlot { .. }
            | MatchAlreadyCompleted { .. }
            | InvalidMatchTransition { .. } => ErrorKind::State,
            UnresolvedPlaceholders { .. } => ErrorKind::Precondition,
        }
    }
}

impl std::fmt::Display for EngineError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        use EngineError::*;
        match self {
            EmptyName => write!(f, "Name must not be empty"),
            MaxTeamsTooSmall { given } => {
                write!(f, "A group needs room for at least 2 teams (got {})", given)
            }
            MaxTeamsBelowAssigned { given, assigned } => write!(
                f,
                "Cannot set max teams to {}: {} teams already assigned",
                given, assigned
            ),
            InsufficientTeams { have } => {
                write!(f, "Need at least 2 teams to generate matches (have {})", have)
            }
            InvalidPlacement { place } => {
                write!(f, "Group placement must be 1 or higher (got {})", place)
            }
            DuplicateTeamName { name } => {
                write!(f, "A team named '{}' is already registered", name)
            }
            TeamAlreadyInTarget { team_id } => {
                write!(f, "Team {} already has a slot in this group/round", team_id)
            }
            TeamAlreadyInRound { team_id } => write!(
                f,
                "Team {} already occupies a slot in a sibling group of this round",
                team_id
            ),
            GroupUnderKnockoutRound { round_id } => write!(
                f,
                "Round {} is direct-knockout; groups need a group-based round",
                round_id
            ),
            RoundNotSlotTarget { round_id } => write!(
                f,
                "Round {} is group-based; assign teams to its groups instead",
                round_id
            ),
            GroupFull { group_id, max_teams } => {
                write!(f, "Group {} is full ({} teams max)", group_id, max_teams)
            }
            RoundNotFound(id) => write!(f, "Round {} not found", id),
            GroupNotFound(id) => write!(f, "Group {} not found", id),
            MatchNotFound(id) => write!(f, "Match {} not found", id),
            TeamNotFound(id) => write!(f, "Team {} not found", id),
            TargetNotFound(id) => write!(f, "No group or knockout round with id {}", id),
            TeamNotInTarget { team_id } => {
                write!(f, "Team {} has no slot in this group/round", team_id)
            }
            RoundNotPending { status } => {
                write!(f, "Round already started (status {:?})", status)
            }
            PredecessorNotCompleted { sequence, status } => write!(
                f,
                "Previous round (sequence {}) must be completed first (status {:?})",
                sequence, status
            ),
            RoundNotOngoing { status } => {
                write!(f, "Round must be ongoing to complete (status {:?})", status)
            }
            RoundCompleted { round_id } => {
                write!(f, "Round {} is completed and can no longer change", round_id)
            }
            NoNextRound { round_id } => {
                write!(f, "Round {} has no next round to advance into", round_id)
            }
            MatchesAlreadyGenerated { existing } => write!(
                f,
                "{} matches already exist; clear them before regenerating",
                existing
            ),
            RemovalBlockedByMatches { existing } => write!(
                f,
                "Cannot remove a team once matches exist ({} generated)",
                existing
            ),
            SlotIsPlaceholder { slot_id } => write!(
                f,
                "Slot {} is an unresolved placeholder and cannot be removed directly",
                slot_id
            ),
            TeamOccupiesSlot { team_id } => write!(
                f,
                "Team {} still occupies a slot and cannot leave the roster",
                team_id
            ),
            MatchAlreadyCompleted { match_id } => {
                write!(f, "Match {} already has a final result", match_id)
            }
            InvalidMatchTransition { from, to } => {
                write!(f, "Match cannot go from {:?} to {:?}", from, to)
            }
            UnresolvedPlaceholders { count } => write!(
                f,
                "{} placeholder slot(s) are still unresolved; matches need concrete teams",
                count
            ),
        }
    }
}

impl std::error::Error for EngineError {}

/// Full tournament structure: team roster, ordered rounds, tie-break
/// configuration. Standings are always derivable from the matches inside.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Tournament {
    pub id: TournamentId,
    pub name: String,
    /// Registered teams, in registration order (the final tie-break).
    pub teams: Vec<TeamEntry>,
    /// Rounds ordered by sequence_order (contiguous from 1).
    pub rounds: Vec<Round>,
    /// Standings sort chain, applied in order.
    pub tie_breaks: Vec<TieBreak>,
}

impl Tournament {
    /// Create an empty tournament with the default tie-break chain.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            teams: Vec::new(),
            rounds: Vec::new(),
            tie_breaks: default_tie_breaks(),
        }
    }

    /// Register a team. Names must be non-empty and unique (case-insensitive).
    pub fn register_team(&mut self, name: impl Into<String>) -> Result<TeamId, EngineError> {
        let name = name.into();
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return Err(EngineError::EmptyName);
        }
        if self
            .teams
            .iter()
            .any(|t| t.name.eq_ignore_ascii_case(trimmed))
        {
            return Err(EngineError::DuplicateTeamName {
                name: trimmed.to_string(),
            });
        }
        let entry = TeamEntry::new(trimmed);
        let id = entry.id;
        self.teams.push(entry);
        Ok(id)
    }

    /// Register a batch of teams, all-or-nothing: the whole list is
    /// validated (non-empty, no duplicates against the roster or within the
    /// batch) before the first entry is written.
    pub fn register_teams(&mut self, names: &[String]) -> Result<Vec<TeamId>, EngineError> {
        let mut staged: Vec<String> = Vec::new();
        for name in names {
            let trimmed = name.trim();
            if trimmed.is_empty() {
                return Err(EngineError::EmptyName);
            }
            let duplicate = self
                .teams
                .iter()
                .any(|t| t.name.eq_ignore_ascii_case(trimmed))
                || staged.iter().any(|s| s.eq_ignore_ascii_case(trimmed));
            if duplicate {
                return Err(EngineError::DuplicateTeamName {
                    name: trimmed.to_string(),
                });
            }
            staged.push(trimmed.to_string());
        }
        Ok(staged
            .into_iter()
            .map(|name| {
                let entry = TeamEntry::new(name);
                let id = entry.id;
                self.teams.push(entry);
                id
            })
            .collect())
    }

    /// Remove a roster entry. Refused while the team occupies any slot.
    pub fn remove_team_entry(&mut self, team_id: TeamId) -> Result<(), EngineError> {
        let idx = self
            .teams
            .iter()
            .position(|t| t.id == team_id)
            .ok_or(EngineError::TeamNotFound(team_id))?;
        if self.team_occupies_slot(team_id) {
            return Err(EngineError::TeamOccupiesSlot { team_id });
        }
        self.teams.remove(idx);
        Ok(())
    }

    pub fn team_name(&self, team_id: TeamId) -> Option<&str> {
        self.teams
            .iter()
            .find(|t| t.id == team_id)
            .map(|t| t.name.as_str())
    }

    pub fn has_team(&self, team_id: TeamId) -> bool {
        self.teams.iter().any(|t| t.id == team_id)
    }

    /// True if any slot in any round is bound to this team.
    pub fn team_occupies_slot(&self, team_id: TeamId) -> bool {
        self.rounds
            .iter()
            .any(|r| r.all_slots().any(|s| s.team_id == Some(team_id)))
    }

    /// Sequence order for a newly created round: max(existing) + 1.
    pub fn next_sequence_order(&self) -> u32 {
        self.rounds
            .iter()
            .map(|r| r.sequence_order)
            .max()
            .unwrap_or(0)
            + 1
    }

    pub fn round(&self, round_id: RoundId) -> Option<&Round> {
        self.rounds.iter().find(|r| r.id == round_id)
    }

    pub fn round_mut(&mut self, round_id: RoundId) -> Option<&mut Round> {
        self.rounds.iter_mut().find(|r| r.id == round_id)
    }

    /// Resolve "the round at this position" via the sequence table rather
    /// than object links, so next/previous lookups never chase pointers.
    pub fn round_by_sequence(&self, sequence_order: u32) -> Option<&Round> {
        self.rounds.iter().find(|r| r.sequence_order == sequence_order)
    }

    pub fn group(&self, group_id: GroupId) -> Option<&Group> {
        self.rounds.iter().find_map(|r| r.group(group_id))
    }

    pub fn group_mut(&mut self, group_id: GroupId) -> Option<&mut Group> {
        self.rounds.iter_mut().find_map(|r| r.group_mut(group_id))
    }

    pub fn round_id_of_group(&self, group_id: GroupId) -> Option<RoundId> {
        self.rounds
            .iter()
            .find(|r| r.group(group_id).is_some())
            .map(|r| r.id)
    }

    /// Find a match anywhere in the structure.
    pub fn game_match(&self, match_id: MatchId) -> Option<&GameMatch> {
        self.rounds.iter().find_map(|r| {
            r.matches
                .iter()
                .chain(r.groups.iter().flat_map(|g| g.matches.iter()))
                .find(|m| m.id == match_id)
        })
    }

    pub fn match_mut(&mut self, match_id: MatchId) -> Option<&mut GameMatch> {
        self.rounds.iter_mut().find_map(|r| {
            r.matches
                .iter_mut()
                .chain(r.groups.iter_mut().flat_map(|g| g.matches.iter_mut()))
                .find(|m| m.id == match_id)
        })
    }

    /// A match together with the slot table it draws teams from.
    pub fn match_with_slots(&self, match_id: MatchId) -> Option<(&GameMatch, &[TeamSlot])> {
        for round in &self.rounds {
            if let Some(m) = round.matches.iter().find(|m| m.id == match_id) {
                return Some((m, &round.slots));
            }
            for group in &round.groups {
                if let Some(m) = group.matches.iter().find(|m| m.id == match_id) {
                    return Some((m, &group.slots));
                }
            }
        }
        None
    }

    pub fn slot_mut(&mut self, slot_id: SlotId) -> Option<&mut TeamSlot> {
        self.rounds.iter_mut().find_map(|r| {
            r.slots
                .iter_mut()
                .chain(r.groups.iter_mut().flat_map(|g| g.slots.iter_mut()))
                .find(|s| s.id == slot_id)
        })
    }
}
