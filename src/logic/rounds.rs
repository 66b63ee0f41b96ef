//! Round lifecycle: creation with sequence numbering, the start/complete
//! state machine, and cascading deletion.

use crate::logic::advancement::{advance_round, AdvancementReport};
use crate::logic::slots::resolve_placeholders;
use crate::logic::standings::refresh_round_standings;
use crate::models::{
    AdvancementRule, EngineError, Round, RoundFormat, RoundId, RoundStatus, RoundType, TeamId,
    Tournament,
};

/// Create a round at the end of the sequence (max existing order + 1).
/// The advisory format defaults per round type when not given.
pub fn create_round(
    tournament: &mut Tournament,
    name: &str,
    round_type: RoundType,
    format: Option<RoundFormat>,
    advancement_rule: Option<AdvancementRule>,
) -> Result<RoundId, EngineError> {
    if name.trim().is_empty() {
        return Err(EngineError::EmptyName);
    }
    let format = format.unwrap_or(match round_type {
        RoundType::GroupBased => RoundFormat::RoundRobin,
        RoundType::DirectKnockout => RoundFormat::SingleElimination,
    });
    let round = Round::new(
        tournament.id,
        name.trim(),
        round_type,
        format,
        tournament.next_sequence_order(),
        advancement_rule.unwrap_or_default(),
    );
    let round_id = round.id;
    tournament.rounds.push(round);
    Ok(round_id)
}

/// Rename a round or change its advisory format / advancement rule.
/// Completed rounds are immutable.
pub fn update_round(
    tournament: &mut Tournament,
    round_id: RoundId,
    name: Option<&str>,
    format: Option<RoundFormat>,
    advancement_rule: Option<AdvancementRule>,
) -> Result<(), EngineError> {
    if let Some(name) = name {
        if name.trim().is_empty() {
            return Err(EngineError::EmptyName);
        }
    }
    let round = tournament
        .round_mut(round_id)
        .ok_or(EngineError::RoundNotFound(round_id))?;
    if round.status == RoundStatus::Completed {
        return Err(EngineError::RoundCompleted { round_id });
    }
    if let Some(name) = name {
        round.name = name.trim().to_string();
    }
    if let Some(format) = format {
        round.format = format;
    }
    if let Some(rule) = advancement_rule {
        round.advancement_rule = rule;
    }
    Ok(())
}

/// Delete a round with everything under it (groups, slots, matches,
/// standings are owned, so the cascade is structural). Remaining rounds are
/// re-numbered to keep sequence orders contiguous from 1.
pub fn delete_round(tournament: &mut Tournament, round_id: RoundId) -> Result<(), EngineError> {
    if tournament.round(round_id).is_none() {
        return Err(EngineError::RoundNotFound(round_id));
    }
    tournament.rounds.retain(|r| r.id != round_id);
    tournament.rounds.sort_by_key(|r| r.sequence_order);
    for (i, round) in tournament.rounds.iter_mut().enumerate() {
        round.sequence_order = (i + 1) as u32;
    }
    Ok(())
}

/// Start a round: only from NotStarted, and only when it is the first round
/// or its predecessor is completed. The error says which precondition
/// failed.
pub fn start_round(tournament: &mut Tournament, round_id: RoundId) -> Result<(), EngineError> {
    let round = tournament
        .round(round_id)
        .ok_or(EngineError::RoundNotFound(round_id))?;
    if round.status != RoundStatus::NotStarted {
        return Err(EngineError::RoundNotPending {
            status: round.status,
        });
    }
    let sequence = round.sequence_order;
    if sequence > 1 {
        if let Some(previous) = tournament.round_by_sequence(sequence - 1) {
            if previous.status != RoundStatus::Completed {
                return Err(EngineError::PredecessorNotCompleted {
                    sequence: previous.sequence_order,
                    status: previous.status,
                });
            }
        }
    }
    let round = tournament
        .round_mut(round_id)
        .ok_or(EngineError::RoundNotFound(round_id))?;
    round.status = RoundStatus::Ongoing;
    Ok(())
}

/// Complete an ongoing round. Optionally refreshes standings snapshots
/// first, then freezes the round, runs the placeholder resolution pass,
/// and, when requested and a next round exists, advances teams into it.
/// `selected` replaces rule evaluation entirely when given.
pub fn complete_round(
    tournament: &mut Tournament,
    round_id: RoundId,
    recalculate_standings: bool,
    auto_advance_teams: bool,
    selected: Option<&[TeamId]>,
) -> Result<Option<AdvancementReport>, EngineError> {
    let round = tournament
        .round(round_id)
        .ok_or(EngineError::RoundNotFound(round_id))?;
    if round.status != RoundStatus::Ongoing {
        return Err(EngineError::RoundNotOngoing {
            status: round.status,
        });
    }
    let sequence = round.sequence_order;
    // Validate the manual selection up front: nothing below may fail once
    // the round has been marked completed.
    if let Some(selected) = selected {
        for &team_id in selected {
            if !tournament.has_team(team_id) {
                return Err(EngineError::TeamNotFound(team_id));
            }
        }
    }

    if recalculate_standings {
        refresh_round_standings(tournament, round_id)?;
    }

    let round = tournament
        .round_mut(round_id)
        .ok_or(EngineError::RoundNotFound(round_id))?;
    round.status = RoundStatus::Completed;

    // Later rounds may be waiting on this round's outcomes.
    resolve_placeholders(tournament);

    let has_next = tournament.round_by_sequence(sequence + 1).is_some();
    if auto_advance_teams && has_next {
        let report = advance_round(tournament, round_id, selected)?;
        return Ok(Some(report));
    }
    Ok(None)
}
