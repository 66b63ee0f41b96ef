//! Match generation: pairing algorithms and kick-off scheduling.
//!
//! Round-robin uses the circle method (first seat fixed, the rest rotate),
//! so every unordered pair meets exactly once per leg. Single-elimination
//! pairs by seed: slot 1 vs slot n, 2 vs n-1, and so on; with an odd count
//! the middle seed gets a bye. Generation is all-or-nothing: the whole batch
//! is staged before anything is written to the target.

use crate::logic::slots::{resolve_target, SlotTarget};
use crate::models::{
    EngineError, GameMatch, GenerationFormat, GroupId, RoundStatus, ScheduleParams, SlotId,
    TeamSlot, Tournament,
};
use chrono::Duration;
use uuid::Uuid;

/// How many matches a generation request will produce. Zero for fewer than
/// two teams (generation itself refuses that case instead of silently
/// producing nothing).
pub fn expected_match_count(
    team_count: usize,
    format: GenerationFormat,
    double_round_robin: bool,
) -> usize {
    if team_count < 2 {
        return 0;
    }
    match format {
        GenerationFormat::RoundRobin => {
            let single = team_count * (team_count - 1) / 2;
            if double_round_robin {
                single * 2
            } else {
                single
            }
        }
        GenerationFormat::SingleElimination => team_count / 2,
    }
}

/// Stage a full batch of matches for the given slots. Refuses unresolved
/// placeholders (the whole batch, no partial output) and fewer than 2 teams.
pub fn build_schedule(
    slots: &[TeamSlot],
    format: GenerationFormat,
    double_round_robin: bool,
    params: &ScheduleParams,
) -> Result<Vec<GameMatch>, EngineError> {
    let unresolved = slots.iter().filter(|s| s.is_placeholder()).count();
    if unresolved > 0 {
        return Err(EngineError::UnresolvedPlaceholders { count: unresolved });
    }
    if slots.len() < 2 {
        return Err(EngineError::InsufficientTeams { have: slots.len() });
    }

    let mut ordered: Vec<&TeamSlot> = slots.iter().collect();
    ordered.sort_by_key(|s| s.position);
    let ids: Vec<SlotId> = ordered.iter().map(|s| s.id).collect();

    let mut pairs = match format {
        GenerationFormat::RoundRobin => round_robin_pairs(&ids),
        GenerationFormat::SingleElimination => knockout_pairs(&ids),
    };
    // The double flag is round-robin specific; a knockout request ignores it.
    if double_round_robin && format == GenerationFormat::RoundRobin {
        let second_leg: Vec<(SlotId, SlotId)> =
            pairs.iter().map(|&(home, away)| (away, home)).collect();
        pairs.extend(second_leg);
    }

    let step = Duration::minutes(
        params.match_duration_minutes as i64 + params.match_gap_minutes as i64,
    );
    Ok(pairs
        .into_iter()
        .enumerate()
        .map(|(i, (home, away))| {
            GameMatch::new(
                home,
                away,
                params.start_at + step * i as i32,
                params.venue.clone(),
                i as u32,
            )
        })
        .collect())
}

/// Circle method: pad odd fields with a bye seat, fix the first seat, rotate
/// the rest one step per matchday. Bye pairings produce no match.
fn round_robin_pairs(ids: &[SlotId]) -> Vec<(SlotId, SlotId)> {
    let mut ring: Vec<Option<SlotId>> = ids.iter().copied().map(Some).collect();
    if ring.len() % 2 == 1 {
        ring.push(None);
    }
    let seats = ring.len();
    let mut pairs = Vec::with_capacity(ids.len() * (ids.len() - 1) / 2);
    for matchday in 0..seats - 1 {
        for i in 0..seats / 2 {
            if let (Some(a), Some(b)) = (ring[i], ring[seats - 1 - i]) {
                // Alternate sides per matchday so the fixed seat is not
                // always at home.
                if matchday % 2 == 0 {
                    pairs.push((a, b));
                } else {
                    pairs.push((b, a));
                }
            }
        }
        ring[1..].rotate_right(1);
    }
    pairs
}

/// Seeded first-round pairing: 1 vs n, 2 vs n-1, and so on. The middle seed of an
/// odd field has no opponent and sits the round out.
fn knockout_pairs(ids: &[SlotId]) -> Vec<(SlotId, SlotId)> {
    let n = ids.len();
    (0..n / 2).map(|i| (ids[i], ids[n - 1 - i])).collect()
}

/// Generate and commit the schedule for a group or knockout round.
/// Existing matches must be cleared first; the target's round must not be
/// completed.
pub fn generate_matches(
    tournament: &mut Tournament,
    target_id: Uuid,
    format: GenerationFormat,
    double_round_robin: bool,
    params: &ScheduleParams,
) -> Result<usize, EngineError> {
    match resolve_target(tournament, target_id)? {
        SlotTarget::Group(group_id) => {
            let round_id = tournament
                .round_id_of_group(group_id)
                .ok_or(EngineError::GroupNotFound(group_id))?;
            let round = tournament
                .round(round_id)
                .ok_or(EngineError::RoundNotFound(round_id))?;
            if round.status == RoundStatus::Completed {
                return Err(EngineError::RoundCompleted { round_id });
            }
            let group = tournament
                .group(group_id)
                .ok_or(EngineError::GroupNotFound(group_id))?;
            if !group.matches.is_empty() {
                return Err(EngineError::MatchesAlreadyGenerated {
                    existing: group.matches.len(),
                });
            }
            let batch = build_schedule(&group.slots, format, double_round_robin, params)?;
            let count = batch.len();
            let group = tournament
                .group_mut(group_id)
                .ok_or(EngineError::GroupNotFound(group_id))?;
            group.matches = batch;
            Ok(count)
        }
        SlotTarget::Knockout(round_id) => {
            let round = tournament
                .round(round_id)
                .ok_or(EngineError::RoundNotFound(round_id))?;
            if round.status == RoundStatus::Completed {
                return Err(EngineError::RoundCompleted { round_id });
            }
            if !round.matches.is_empty() {
                return Err(EngineError::MatchesAlreadyGenerated {
                    existing: round.matches.len(),
                });
            }
            let batch = build_schedule(&round.slots, format, double_round_robin, params)?;
            let count = batch.len();
            let round = tournament
                .round_mut(round_id)
                .ok_or(EngineError::RoundNotFound(round_id))?;
            round.matches = batch;
            Ok(count)
        }
    }
}

/// Remove every match of a group (and its stale standings snapshot). No
/// partial clearing. Refused once the parent round is completed.
pub fn clear_matches(tournament: &mut Tournament, group_id: GroupId) -> Result<usize, EngineError> {
    let round_id = tournament
        .round_id_of_group(group_id)
        .ok_or(EngineError::GroupNotFound(group_id))?;
    let round = tournament
        .round(round_id)
        .ok_or(EngineError::RoundNotFound(round_id))?;
    if round.status == RoundStatus::Completed {
        return Err(EngineError::RoundCompleted { round_id });
    }
    let group = tournament
        .group_mut(group_id)
        .ok_or(EngineError::GroupNotFound(group_id))?;
    let removed = group.matches.len();
    group.matches.clear();
    group.standings.clear();
    Ok(removed)
}
