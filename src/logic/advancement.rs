//! Advancement: moving teams from a completed round into the next one.
//!
//! Rankings come straight from the standings calculator; the round's rule
//! (or a group's override) picks the advancing set, an explicit selection
//! bypasses rule evaluation entirely, and the winners are written into the
//! next round's slots, binding matching placeholders on the way. Filling
//! fewer slots than the target has room for is fine; the rest stay pending.

use crate::logic::standings::{calculate_standings, compare_across_groups};
use crate::models::{
    AdvancementRule, EngineError, GroupId, Round, RoundId, RoundType, SlotSource, Standing, TeamId,
    TeamSlot, TieBreak, Tournament,
};
use serde::Serialize;
use std::collections::{HashMap, HashSet};

/// Outcome summary returned to the caller of round completion.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct AdvancementReport {
    /// Teams now seated in the target round thanks to this advancement.
    pub advanced: usize,
    pub target_round: String,
}

/// One source group's final table plus the rule that applies to it.
struct GroupRanking {
    group_id: Option<GroupId>,
    rule: AdvancementRule,
    table: Vec<Standing>,
}

/// Advance teams out of `round_id` into the round that follows it. With
/// `selected`, that exact set advances (manual override); otherwise the
/// advancement rule decides. Returns how many teams ended up seated.
pub fn advance_round(
    tournament: &mut Tournament,
    round_id: RoundId,
    selected: Option<&[TeamId]>,
) -> Result<AdvancementReport, EngineError> {
    // Read phase: everything needed is collected before any mutation.
    let source = tournament
        .round(round_id)
        .ok_or(EngineError::RoundNotFound(round_id))?;
    let next = tournament
        .round_by_sequence(source.sequence_order + 1)
        .ok_or(EngineError::NoNextRound { round_id })?;
    let next_id = next.id;
    let next_name = next.name.clone();

    let capacity = match next.round_type {
        RoundType::GroupBased => next.groups.iter().map(|g| g.max_teams as usize).sum(),
        RoundType::DirectKnockout => next.slots.len(),
    }
    .max(2);

    let rankings = source_rankings(tournament, source);

    // Provenance of every ranked team: which group, which final place.
    // Used to bind `{group_id, place}` placeholders in the next round.
    let mut placements: HashMap<TeamId, (GroupId, u32)> = HashMap::new();
    for ranking in &rankings {
        if let Some(group_id) = ranking.group_id {
            for row in &ranking.table {
                placements.insert(row.team_id, (group_id, row.position));
            }
        }
    }

    let advancing: Vec<TeamId> = match selected {
        Some(sel) => {
            let mut seen = HashSet::new();
            let mut out = Vec::new();
            for &team_id in sel {
                if !tournament.has_team(team_id) {
                    return Err(EngineError::TeamNotFound(team_id));
                }
                if seen.insert(team_id) {
                    out.push(team_id);
                }
            }
            out
        }
        None => evaluate_rule(&source.advancement_rule, &rankings, &tournament.tie_breaks),
    };
    let advancing: Vec<TeamId> = advancing.into_iter().take(capacity).collect();

    // Write phase: seat the advancing teams in the next round.
    let mut seated: Vec<TeamId> = Vec::new();
    {
        let next = tournament
            .round_mut(next_id)
            .ok_or(EngineError::RoundNotFound(next_id))?;
        let mut taken: HashSet<TeamId> = next.assigned_team_ids().into_iter().collect();
        for &team_id in &advancing {
            if taken.contains(&team_id) {
                // Already bound, e.g. by the resolution pass. Still advanced.
                seated.push(team_id);
                continue;
            }
            let provenance = placements.get(&team_id).copied();
            let done = bind_matching_placeholder(next, team_id, provenance)
                || seat_in_free_slot(next, team_id, capacity);
            if done {
                taken.insert(team_id);
                seated.push(team_id);
            }
        }
    }

    // Flag the advancing teams on the source round's cached standings.
    let seated_set: HashSet<TeamId> = seated.iter().copied().collect();
    if let Some(source) = tournament.round_mut(round_id) {
        for row in &mut source.standings {
            if seated_set.contains(&row.team_id) {
                row.advanced = true;
            }
        }
        for group in &mut source.groups {
            for row in &mut group.standings {
                if seated_set.contains(&row.team_id) {
                    row.advanced = true;
                }
            }
        }
    }

    Ok(AdvancementReport {
        advanced: seated.len(),
        target_round: next_name,
    })
}

/// Final tables of the completed round: one per group, or a single table
/// for a direct-knockout round. Each carries its effective rule (group
/// override first, round rule otherwise).
fn source_rankings(tournament: &Tournament, source: &Round) -> Vec<GroupRanking> {
    match source.round_type {
        RoundType::GroupBased => source
            .groups
            .iter()
            .map(|g| GroupRanking {
                group_id: Some(g.id),
                rule: g
                    .advancement_rule
                    .clone()
                    .unwrap_or_else(|| source.advancement_rule.clone()),
                table: calculate_standings(
                    &tournament.teams,
                    &g.slots,
                    &g.matches,
                    &tournament.tie_breaks,
                ),
            })
            .collect(),
        RoundType::DirectKnockout => vec![GroupRanking {
            group_id: None,
            rule: source.advancement_rule.clone(),
            table: calculate_standings(
                &tournament.teams,
                &source.slots,
                &source.matches,
                &tournament.tie_breaks,
            ),
        }],
    }
}

/// Rule evaluation over the per-group tables.
///
/// `BestThirdPlace` is a round-level, cross-group rule: guaranteed top 2
/// per group, plus the best `extra` thirds ranked across groups by the same
/// chain as standings (head-to-head skipped; they never met). Third-place
/// rows from groups of different sizes are compared raw; whether a
/// shorter group's third should be normalized is a product decision, not
/// one this engine takes silently.
fn evaluate_rule(
    round_rule: &AdvancementRule,
    rankings: &[GroupRanking],
    tie_breaks: &[TieBreak],
) -> Vec<TeamId> {
    if let AdvancementRule::BestThirdPlace { extra } = round_rule {
        let mut out: Vec<TeamId> = Vec::new();
        let mut thirds: Vec<&Standing> = Vec::new();
        for ranking in rankings {
            out.extend(ranking.table.iter().take(2).map(|row| row.team_id));
            if let Some(third) = ranking.table.get(2) {
                thirds.push(third);
            }
        }
        thirds.sort_by(|a, b| compare_across_groups(a, b, tie_breaks));
        out.extend(thirds.iter().take(*extra as usize).map(|row| row.team_id));
        return out;
    }

    let mut out = Vec::new();
    for ranking in rankings {
        let take: Vec<TeamId> = match &ranking.rule {
            AdvancementRule::TopN { count } => ranking
                .table
                .iter()
                .take(*count as usize)
                .map(|row| row.team_id)
                .collect(),
            AdvancementRule::WinnersOnly => {
                ranking.table.iter().take(1).map(|row| row.team_id).collect()
            }
            // As a per-group override the cross-group extras are undefined;
            // only the guaranteed top-2 component applies.
            AdvancementRule::BestThirdPlace { .. } => {
                ranking.table.iter().take(2).map(|row| row.team_id).collect()
            }
            AdvancementRule::Custom { min_points } => ranking
                .table
                .iter()
                .filter(|row| row.points >= *min_points)
                .map(|row| row.team_id)
                .collect(),
            AdvancementRule::Manual => Vec::new(),
        };
        out.extend(take);
    }
    out
}

/// Bind a placeholder in the next round whose `{group_id, place}` source
/// matches where this team just finished.
fn bind_matching_placeholder(
    next: &mut Round,
    team_id: TeamId,
    provenance: Option<(GroupId, u32)>,
) -> bool {
    let Some((source_group, place)) = provenance else {
        return false;
    };
    let matches_source = |slot: &TeamSlot| {
        slot.team_id.is_none()
            && matches!(
                &slot.source,
                Some(SlotSource::GroupPlacement { group_id, place: p })
                    if *group_id == source_group && *p == place
            )
    };
    if let Some(slot) = next.slots.iter_mut().find(|s| matches_source(s)) {
        slot.resolve(team_id);
        return true;
    }
    for group in &mut next.groups {
        if let Some(slot) = group.slots.iter_mut().find(|s| matches_source(s)) {
            slot.resolve(team_id);
            return true;
        }
    }
    false
}

/// Seat a team in the first free spot of the next round: an unresolved
/// source-less slot first, else a fresh slot while capacity remains. Slots
/// bound to some other source rule are never taken over.
fn seat_in_free_slot(next: &mut Round, team_id: TeamId, capacity: usize) -> bool {
    match next.round_type {
        RoundType::DirectKnockout => {
            let free = next
                .slots
                .iter_mut()
                .filter(|s| s.team_id.is_none() && s.source.is_none())
                .min_by_key(|s| s.position);
            if let Some(slot) = free {
                slot.resolve(team_id);
                return true;
            }
            if next.slots.len() < capacity {
                let position = next.next_position();
                next.slots.push(TeamSlot::concrete(position, team_id));
                return true;
            }
            false
        }
        RoundType::GroupBased => {
            for group in &mut next.groups {
                let free = group
                    .slots
                    .iter_mut()
                    .filter(|s| s.team_id.is_none() && s.source.is_none())
                    .min_by_key(|s| s.position);
                if let Some(slot) = free {
                    slot.resolve(team_id);
                    return true;
                }
                if group.slots.len() < group.max_teams as usize {
                    let position = group.next_position();
                    group.slots.push(TeamSlot::concrete(position, team_id));
                    return true;
                }
            }
            false
        }
    }
}
