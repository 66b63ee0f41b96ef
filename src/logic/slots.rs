//! Team slot resolution: assignment, removal, placeholders, and the lazy
//! resolution pass that binds placeholders once their source is decided.

use crate::models::{
    EngineError, MatchOutcome, RoundStatus, RoundType, SlotId, SlotSource, TeamId, TeamSlot,
    Tournament,
};
use std::collections::HashSet;
use uuid::Uuid;

/// A slot-carrying target: a group, or a direct-knockout round.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SlotTarget {
    Group(Uuid),
    Knockout(Uuid),
}

/// Resolve an opaque target id to a group or knockout round. Group-based
/// rounds are not valid slot targets (their groups are).
pub fn resolve_target(tournament: &Tournament, target_id: Uuid) -> Result<SlotTarget, EngineError> {
    if tournament.group(target_id).is_some() {
        return Ok(SlotTarget::Group(target_id));
    }
    if let Some(round) = tournament.round(target_id) {
        return match round.round_type {
            RoundType::DirectKnockout => Ok(SlotTarget::Knockout(target_id)),
            RoundType::GroupBased => Err(EngineError::RoundNotSlotTarget { round_id: target_id }),
        };
    }
    Err(EngineError::TargetNotFound(target_id))
}

fn round_id_of_target(
    tournament: &Tournament,
    target: SlotTarget,
) -> Result<Uuid, EngineError> {
    match target {
        SlotTarget::Group(group_id) => tournament
            .round_id_of_group(group_id)
            .ok_or(EngineError::GroupNotFound(group_id)),
        SlotTarget::Knockout(round_id) => Ok(round_id),
    }
}

/// Assign concrete teams to a group or knockout round, appending slots at
/// the next free positions. Fully validated before anything is written:
/// unknown teams, duplicates within the target, duplicates anywhere in the
/// same round, and group capacity all reject the whole request. Teams
/// advanced from an earlier round are explicitly fine.
pub fn assign_teams(
    tournament: &mut Tournament,
    target_id: Uuid,
    team_ids: &[TeamId],
) -> Result<(), EngineError> {
    let target = resolve_target(tournament, target_id)?;
    for &team_id in team_ids {
        if !tournament.has_team(team_id) {
            return Err(EngineError::TeamNotFound(team_id));
        }
    }
    let round_id = round_id_of_target(tournament, target)?;
    let round = tournament
        .round(round_id)
        .ok_or(EngineError::RoundNotFound(round_id))?;
    if round.status == RoundStatus::Completed {
        return Err(EngineError::RoundCompleted { round_id });
    }

    let in_target: HashSet<TeamId> = match target {
        SlotTarget::Group(group_id) => round
            .group(group_id)
            .ok_or(EngineError::GroupNotFound(group_id))?
            .slots
            .iter()
            .filter_map(|s| s.team_id)
            .collect(),
        SlotTarget::Knockout(_) => round.slots.iter().filter_map(|s| s.team_id).collect(),
    };
    let in_round: HashSet<TeamId> = round.assigned_team_ids().into_iter().collect();

    let mut staged: HashSet<TeamId> = HashSet::new();
    for &team_id in team_ids {
        if in_target.contains(&team_id) || staged.contains(&team_id) {
            return Err(EngineError::TeamAlreadyInTarget { team_id });
        }
        if in_round.contains(&team_id) {
            return Err(EngineError::TeamAlreadyInRound { team_id });
        }
        staged.insert(team_id);
    }

    if let SlotTarget::Group(group_id) = target {
        let group = round
            .group(group_id)
            .ok_or(EngineError::GroupNotFound(group_id))?;
        if group.slots.len() + team_ids.len() > group.max_teams as usize {
            return Err(EngineError::GroupFull {
                group_id,
                max_teams: group.max_teams,
            });
        }
    }

    match target {
        SlotTarget::Group(group_id) => {
            let group = tournament
                .group_mut(group_id)
                .ok_or(EngineError::GroupNotFound(group_id))?;
            for &team_id in team_ids {
                let position = group.next_position();
                group.slots.push(TeamSlot::concrete(position, team_id));
            }
        }
        SlotTarget::Knockout(round_id) => {
            let round = tournament
                .round_mut(round_id)
                .ok_or(EngineError::RoundNotFound(round_id))?;
            for &team_id in team_ids {
                let position = round.next_position();
                round.slots.push(TeamSlot::concrete(position, team_id));
            }
        }
    }
    Ok(())
}

/// Remove a seated team from a group or knockout round. `member_id` is a
/// team id (concrete slots) or a slot id. Refused once matches exist, once
/// the round is completed, or when the addressed slot is an unresolved
/// placeholder.
pub fn remove_team(
    tournament: &mut Tournament,
    target_id: Uuid,
    member_id: Uuid,
) -> Result<(), EngineError> {
    let target = resolve_target(tournament, target_id)?;
    let round_id = round_id_of_target(tournament, target)?;
    let round = tournament
        .round(round_id)
        .ok_or(EngineError::RoundNotFound(round_id))?;
    if round.status == RoundStatus::Completed {
        return Err(EngineError::RoundCompleted { round_id });
    }

    let (match_count, slots): (usize, &[TeamSlot]) = match target {
        SlotTarget::Group(group_id) => {
            let group = round
                .group(group_id)
                .ok_or(EngineError::GroupNotFound(group_id))?;
            (group.matches.len(), &group.slots)
        }
        SlotTarget::Knockout(_) => (round.matches.len(), &round.slots),
    };
    if match_count > 0 {
        return Err(EngineError::RemovalBlockedByMatches {
            existing: match_count,
        });
    }

    let found = slots
        .iter()
        .position(|s| s.team_id == Some(member_id))
        .or_else(|| slots.iter().position(|s| s.id == member_id));
    let Some(idx) = found else {
        return Err(EngineError::TeamNotInTarget { team_id: member_id });
    };
    if slots[idx].team_id.is_none() {
        return Err(EngineError::SlotIsPlaceholder {
            slot_id: slots[idx].id,
        });
    }

    match target {
        SlotTarget::Group(group_id) => {
            let group = tournament
                .group_mut(group_id)
                .ok_or(EngineError::GroupNotFound(group_id))?;
            group.slots.remove(idx);
        }
        SlotTarget::Knockout(round_id) => {
            let round = tournament
                .round_mut(round_id)
                .ok_or(EngineError::RoundNotFound(round_id))?;
            round.slots.remove(idx);
        }
    }
    Ok(())
}

/// Create a placeholder slot whose team is decided later by `source`. The
/// referenced match or group must exist now; resolution happens lazily.
pub fn create_placeholder(
    tournament: &mut Tournament,
    target_id: Uuid,
    placeholder_name: &str,
    source: SlotSource,
) -> Result<SlotId, EngineError> {
    let target = resolve_target(tournament, target_id)?;
    if placeholder_name.trim().is_empty() {
        return Err(EngineError::EmptyName);
    }
    match &source {
        SlotSource::MatchOutcome { match_id, .. } => {
            tournament
                .game_match(*match_id)
                .ok_or(EngineError::MatchNotFound(*match_id))?;
        }
        SlotSource::GroupPlacement { group_id, place } => {
            tournament
                .group(*group_id)
                .ok_or(EngineError::GroupNotFound(*group_id))?;
            if *place == 0 {
                return Err(EngineError::InvalidPlacement { place: *place });
            }
        }
    }
    let round_id = round_id_of_target(tournament, target)?;
    let round = tournament
        .round(round_id)
        .ok_or(EngineError::RoundNotFound(round_id))?;
    if round.status == RoundStatus::Completed {
        return Err(EngineError::RoundCompleted { round_id });
    }

    match target {
        SlotTarget::Group(group_id) => {
            let group = tournament
                .group_mut(group_id)
                .ok_or(EngineError::GroupNotFound(group_id))?;
            let position = group.next_position();
            let slot = TeamSlot::placeholder(position, placeholder_name.trim(), source);
            let id = slot.id;
            group.slots.push(slot);
            Ok(id)
        }
        SlotTarget::Knockout(round_id) => {
            let round = tournament
                .round_mut(round_id)
                .ok_or(EngineError::RoundNotFound(round_id))?;
            let position = round.next_position();
            let slot = TeamSlot::placeholder(position, placeholder_name.trim(), source);
            let id = slot.id;
            round.slots.push(slot);
            Ok(id)
        }
    }
}

/// Resolution pass: bind every placeholder whose source has an outcome.
/// Run after a result is reported and after a round completes; an explicit
/// sweep, not an observer graph. Returns the number of slots resolved.
///
/// A source that would seat a team already concrete in the same round is
/// skipped, keeping the same-round uniqueness invariant intact.
pub fn resolve_placeholders(tournament: &mut Tournament) -> usize {
    let planned = plan_resolutions(tournament);
    let mut resolved = 0;
    for (slot_id, team_id) in planned {
        if let Some(slot) = tournament.slot_mut(slot_id) {
            slot.resolve(team_id);
            resolved += 1;
        }
    }
    resolved
}

fn plan_resolutions(tournament: &Tournament) -> Vec<(SlotId, TeamId)> {
    let mut planned = Vec::new();
    for round in &tournament.rounds {
        // Completed rounds are frozen; nothing to bind there.
        if round.status == RoundStatus::Completed {
            continue;
        }
        let mut taken: HashSet<TeamId> = round.assigned_team_ids().into_iter().collect();
        for slot in round.all_slots() {
            if slot.team_id.is_some() {
                continue;
            }
            let Some(source) = &slot.source else { continue };
            let Some(team_id) = source_team(tournament, source) else {
                continue;
            };
            if taken.contains(&team_id) {
                continue;
            }
            taken.insert(team_id);
            planned.push((slot.id, team_id));
        }
    }
    planned
}

/// Outcome of a source rule, if already decided. Draws decide nothing for a
/// match-outcome source; a group placement needs the group's schedule to be
/// fully played (or its round completed).
fn source_team(tournament: &Tournament, source: &SlotSource) -> Option<TeamId> {
    match source {
        SlotSource::MatchOutcome { match_id, outcome } => {
            let (game, slots) = tournament.match_with_slots(*match_id)?;
            let slot_id = match outcome {
                MatchOutcome::Winner => game.winner_slot()?,
                MatchOutcome::Loser => game.loser_slot()?,
            };
            slots.iter().find(|s| s.id == slot_id)?.team_id
        }
        SlotSource::GroupPlacement { group_id, place } => {
            let group = tournament.group(*group_id)?;
            let owning_round = tournament
                .round_id_of_group(*group_id)
                .and_then(|id| tournament.round(id))?;
            let decided = owning_round.status == RoundStatus::Completed
                || group.all_matches_completed();
            if !decided {
                return None;
            }
            let table = crate::logic::standings::calculate_standings(
                &tournament.teams,
                &group.slots,
                &group.matches,
                &tournament.tie_breaks,
            );
            let idx = (*place as usize).checked_sub(1)?;
            table.get(idx).map(|row| row.team_id)
        }
    }
}
