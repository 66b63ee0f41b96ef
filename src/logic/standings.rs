//! Standings calculation: completed matches + slot table in, ranked standings out.
//! Pure over its inputs; the cached snapshots on groups/rounds are refreshed
//! from here and never treated as source of truth.

use crate::models::{
    EngineError, GameMatch, GroupId, RoundId, Standing, TeamEntry, TeamId, TeamSlot, TieBreak,
    Tournament,
};
use std::cmp::Ordering;
use std::collections::HashMap;

/// Build the ranked table for one group (or one knockout round).
///
/// Entrants are the concrete teams in slot-position order; that order is the
/// final tie-break because the sort is stable. Teams that have not completed
/// a single match are left out of the ranked list entirely.
pub fn calculate_standings(
    teams: &[TeamEntry],
    slots: &[TeamSlot],
    matches: &[GameMatch],
    tie_breaks: &[TieBreak],
) -> Vec<Standing> {
    let mut rows: Vec<Standing> = Vec::new();
    let mut index: HashMap<TeamId, usize> = HashMap::new();

    let mut ordered: Vec<&TeamSlot> = slots.iter().collect();
    ordered.sort_by_key(|s| s.position);
    for slot in ordered {
        let Some(team_id) = slot.team_id else { continue };
        if index.contains_key(&team_id) {
            continue;
        }
        let name = teams
            .iter()
            .find(|t| t.id == team_id)
            .map(|t| t.name.clone())
            .unwrap_or_else(|| team_id.to_string());
        index.insert(team_id, rows.len());
        rows.push(Standing::new(team_id, name));
    }

    let team_of = |slot_id| {
        slots
            .iter()
            .find(|s| s.id == slot_id)
            .and_then(|s| s.team_id)
    };

    for m in matches {
        if !m.is_completed() {
            continue;
        }
        let (Some(home_score), Some(away_score)) = (m.home_score, m.away_score) else {
            continue;
        };
        let (Some(home), Some(away)) = (team_of(m.home_slot), team_of(m.away_slot)) else {
            continue;
        };
        if let Some(&i) = index.get(&home) {
            let row = &mut rows[i];
            row.matches_played += 1;
            row.goals_for += home_score;
            row.goals_against += away_score;
            match home_score.cmp(&away_score) {
                Ordering::Greater => row.wins += 1,
                Ordering::Equal => row.draws += 1,
                Ordering::Less => row.losses += 1,
            }
        }
        if let Some(&i) = index.get(&away) {
            let row = &mut rows[i];
            row.matches_played += 1;
            row.goals_for += away_score;
            row.goals_against += home_score;
            match away_score.cmp(&home_score) {
                Ordering::Greater => row.wins += 1,
                Ordering::Equal => row.draws += 1,
                Ordering::Less => row.losses += 1,
            }
        }
    }

    // Derived columns are recomputed from the totals, never accumulated.
    for row in &mut rows {
        row.goal_difference = row.goals_for as i32 - row.goals_against as i32;
        row.points = 3 * row.wins + row.draws;
    }

    rows.retain(|row| row.matches_played > 0);

    rows.sort_by(|a, b| compare_rows(a, b, tie_breaks, slots, matches));
    for (i, row) in rows.iter_mut().enumerate() {
        row.position = (i + 1) as u32;
    }
    rows
}

fn compare_rows(
    a: &Standing,
    b: &Standing,
    tie_breaks: &[TieBreak],
    slots: &[TeamSlot],
    matches: &[GameMatch],
) -> Ordering {
    for key in tie_breaks {
        let ord = match key {
            TieBreak::Points => b.points.cmp(&a.points),
            TieBreak::GoalDifference => b.goal_difference.cmp(&a.goal_difference),
            TieBreak::GoalsFor => b.goals_for.cmp(&a.goals_for),
            TieBreak::HeadToHead => {
                let (pa, pb) = head_to_head_points(a.team_id, b.team_id, slots, matches);
                pb.cmp(&pa)
            }
        };
        if ord != Ordering::Equal {
            return ord;
        }
    }
    Ordering::Equal
}

/// Points each of the two teams took in their completed direct meetings.
pub fn head_to_head_points(
    a: TeamId,
    b: TeamId,
    slots: &[TeamSlot],
    matches: &[GameMatch],
) -> (u32, u32) {
    let team_of = |slot_id| {
        slots
            .iter()
            .find(|s: &&TeamSlot| s.id == slot_id)
            .and_then(|s| s.team_id)
    };
    let mut points = (0u32, 0u32);
    for m in matches {
        if !m.is_completed() {
            continue;
        }
        let (Some(hs), Some(aw)) = (m.home_score, m.away_score) else {
            continue;
        };
        let (Some(home), Some(away)) = (team_of(m.home_slot), team_of(m.away_slot)) else {
            continue;
        };
        let pair = if home == a && away == b {
            Some((hs, aw))
        } else if home == b && away == a {
            Some((aw, hs))
        } else {
            None
        };
        if let Some((for_a, for_b)) = pair {
            match for_a.cmp(&for_b) {
                Ordering::Greater => points.0 += 3,
                Ordering::Equal => {
                    points.0 += 1;
                    points.1 += 1;
                }
                Ordering::Less => points.1 += 3,
            }
        }
    }
    points
}

/// Chain comparison for rows from *different* groups (best-third ranking).
/// Head-to-head is skipped: the teams never met.
pub fn compare_across_groups(a: &Standing, b: &Standing, tie_breaks: &[TieBreak]) -> Ordering {
    for key in tie_breaks {
        let ord = match key {
            TieBreak::Points => b.points.cmp(&a.points),
            TieBreak::GoalDifference => b.goal_difference.cmp(&a.goal_difference),
            TieBreak::GoalsFor => b.goals_for.cmp(&a.goals_for),
            TieBreak::HeadToHead => Ordering::Equal,
        };
        if ord != Ordering::Equal {
            return ord;
        }
    }
    Ordering::Equal
}

/// Refresh one group's standings snapshot (the RecalculateStandings command).
pub fn recalculate_group_standings(
    tournament: &mut Tournament,
    group_id: GroupId,
) -> Result<(), EngineError> {
    let table = {
        let group = tournament
            .group(group_id)
            .ok_or(EngineError::GroupNotFound(group_id))?;
        calculate_standings(
            &tournament.teams,
            &group.slots,
            &group.matches,
            &tournament.tie_breaks,
        )
    };
    let group = tournament
        .group_mut(group_id)
        .ok_or(EngineError::GroupNotFound(group_id))?;
    group.standings = table;
    Ok(())
}

/// Refresh every standings snapshot under a round: each group's table, and
/// the round's own table for direct-knockout rounds.
pub fn refresh_round_standings(
    tournament: &mut Tournament,
    round_id: RoundId,
) -> Result<(), EngineError> {
    let (group_tables, round_table) = {
        let round = tournament
            .round(round_id)
            .ok_or(EngineError::RoundNotFound(round_id))?;
        let group_tables: Vec<(GroupId, Vec<Standing>)> = round
            .groups
            .iter()
            .map(|g| {
                (
                    g.id,
                    calculate_standings(
                        &tournament.teams,
                        &g.slots,
                        &g.matches,
                        &tournament.tie_breaks,
                    ),
                )
            })
            .collect();
        let round_table = calculate_standings(
            &tournament.teams,
            &round.slots,
            &round.matches,
            &tournament.tie_breaks,
        );
        (group_tables, round_table)
    };
    let round = tournament
        .round_mut(round_id)
        .ok_or(EngineError::RoundNotFound(round_id))?;
    for (group_id, table) in group_tables {
        if let Some(group) = round.group_mut(group_id) {
            group.standings = table;
        }
    }
    round.standings = round_table;
    Ok(())
}
