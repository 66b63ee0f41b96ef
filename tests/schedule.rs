//! Integration tests for the match generator: counts, pairing coverage,
//! kick-off spacing, placeholder refusal, clear-then-regenerate.

use chrono::{Duration, TimeZone, Utc};
use std::collections::{HashMap, HashSet};
use tournament_stage_web::{
    assign_teams, clear_matches, create_group, create_placeholder, create_round,
    expected_match_count, generate_matches, EngineError, GenerationFormat, GroupFormat, GroupId,
    MatchOutcome, RoundType, ScheduleParams, SlotSource, TeamId, Tournament,
};

fn schedule_params() -> ScheduleParams {
    ScheduleParams {
        start_at: Utc.with_ymd_and_hms(2024, 6, 1, 10, 0, 0).unwrap(),
        match_duration_minutes: 90,
        match_gap_minutes: 30,
        venue: Some("Court 1".to_string()),
    }
}

fn group_with_teams(n: usize) -> (Tournament, GroupId, Vec<TeamId>) {
    let mut t = Tournament::new("Test Cup");
    let teams: Vec<TeamId> = (0..n)
        .map(|i| t.register_team(format!("Team {i}")).unwrap())
        .collect();
    let round = create_round(&mut t, "Groups", RoundType::GroupBased, None, None).unwrap();
    let group = create_group(
        &mut t,
        round,
        "Group A",
        GroupFormat::RoundRobinSingle,
        n.max(2) as u32,
        None,
    )
    .unwrap();
    assign_teams(&mut t, group, &teams).unwrap();
    (t, group, teams)
}

#[test]
fn expected_counts_for_eight_teams() {
    assert_eq!(expected_match_count(8, GenerationFormat::RoundRobin, false), 28);
    assert_eq!(expected_match_count(8, GenerationFormat::RoundRobin, true), 56);
    assert_eq!(expected_match_count(8, GenerationFormat::SingleElimination, false), 4);
}

#[test]
fn generated_round_robin_matches_the_formula() {
    let (mut t, group, _) = group_with_teams(8);
    let count =
        generate_matches(&mut t, group, GenerationFormat::RoundRobin, false, &schedule_params())
            .unwrap();
    assert_eq!(count, 28);
    assert_eq!(t.group(group).unwrap().matches.len(), 28);
}

#[test]
fn one_team_is_refused_not_silently_emptied() {
    let (mut t, group, _) = group_with_teams(1);
    assert!(matches!(
        generate_matches(&mut t, group, GenerationFormat::RoundRobin, false, &schedule_params()),
        Err(EngineError::InsufficientTeams { have: 1 })
    ));
    assert!(t.group(group).unwrap().matches.is_empty());
    assert_eq!(expected_match_count(1, GenerationFormat::RoundRobin, false), 0);
}

#[test]
fn odd_field_round_robin_meets_every_pair_exactly_once() {
    let (mut t, group, _) = group_with_teams(5);
    generate_matches(&mut t, group, GenerationFormat::RoundRobin, false, &schedule_params())
        .unwrap();
    let g = t.group(group).unwrap();
    assert_eq!(g.matches.len(), 10);

    let mut seen: HashSet<(TeamId, TeamId)> = HashSet::new();
    let mut appearances: HashMap<TeamId, usize> = HashMap::new();
    for m in &g.matches {
        let home = g.slot(m.home_slot).unwrap().team_id.unwrap();
        let away = g.slot(m.away_slot).unwrap().team_id.unwrap();
        assert_ne!(home, away);
        let key = if home < away { (home, away) } else { (away, home) };
        assert!(seen.insert(key), "pair met twice");
        *appearances.entry(home).or_default() += 1;
        *appearances.entry(away).or_default() += 1;
    }
    assert!(appearances.values().all(|&n| n == 4));
}

#[test]
fn double_round_robin_adds_a_mirrored_second_leg() {
    let (mut t, group, _) = group_with_teams(3);
    let count =
        generate_matches(&mut t, group, GenerationFormat::RoundRobin, true, &schedule_params())
            .unwrap();
    assert_eq!(count, 6);
    let g = t.group(group).unwrap();
    let (first, second) = g.matches.split_at(3);
    for (a, b) in first.iter().zip(second.iter()) {
        assert_eq!(a.home_slot, b.away_slot);
        assert_eq!(a.away_slot, b.home_slot);
    }
}

#[test]
fn knockout_pairs_first_seed_against_last() {
    let (mut t, group, teams) = group_with_teams(4);
    generate_matches(
        &mut t,
        group,
        GenerationFormat::SingleElimination,
        false,
        &schedule_params(),
    )
    .unwrap();
    let g = t.group(group).unwrap();
    assert_eq!(g.matches.len(), 2);
    let home0 = g.slot(g.matches[0].home_slot).unwrap().team_id.unwrap();
    let away0 = g.slot(g.matches[0].away_slot).unwrap().team_id.unwrap();
    assert_eq!((home0, away0), (teams[0], teams[3]));
    let home1 = g.slot(g.matches[1].home_slot).unwrap().team_id.unwrap();
    let away1 = g.slot(g.matches[1].away_slot).unwrap().team_id.unwrap();
    assert_eq!((home1, away1), (teams[1], teams[2]));
}

#[test]
fn kickoffs_step_by_duration_plus_gap_and_share_the_venue() {
    let (mut t, group, _) = group_with_teams(4);
    let params = schedule_params();
    generate_matches(&mut t, group, GenerationFormat::RoundRobin, false, &params).unwrap();
    let g = t.group(group).unwrap();
    for (i, m) in g.matches.iter().enumerate() {
        assert_eq!(m.order, i as u32);
        assert_eq!(
            m.scheduled_at,
            params.start_at + Duration::minutes(120) * i as i32
        );
        assert_eq!(m.venue.as_deref(), Some("Court 1"));
    }
}

#[test]
fn unresolved_placeholders_refuse_the_whole_batch() {
    let (mut t, group, _) = group_with_teams(2);
    generate_matches(&mut t, group, GenerationFormat::RoundRobin, false, &schedule_params())
        .unwrap();
    let match_id = t.group(group).unwrap().matches[0].id;

    let knockout = create_round(&mut t, "KO", RoundType::DirectKnockout, None, None).unwrap();
    create_placeholder(
        &mut t,
        knockout,
        "Winner match 1",
        SlotSource::MatchOutcome {
            match_id,
            outcome: MatchOutcome::Winner,
        },
    )
    .unwrap();
    create_placeholder(
        &mut t,
        knockout,
        "Loser match 1",
        SlotSource::MatchOutcome {
            match_id,
            outcome: MatchOutcome::Loser,
        },
    )
    .unwrap();

    assert!(matches!(
        generate_matches(
            &mut t,
            knockout,
            GenerationFormat::SingleElimination,
            false,
            &schedule_params()
        ),
        Err(EngineError::UnresolvedPlaceholders { count: 2 })
    ));
    assert!(t.round(knockout).unwrap().matches.is_empty());
}

#[test]
fn regeneration_needs_an_explicit_clear() {
    let (mut t, group, _) = group_with_teams(4);
    generate_matches(&mut t, group, GenerationFormat::RoundRobin, false, &schedule_params())
        .unwrap();
    assert!(matches!(
        generate_matches(&mut t, group, GenerationFormat::RoundRobin, false, &schedule_params()),
        Err(EngineError::MatchesAlreadyGenerated { existing: 6 })
    ));

    assert_eq!(clear_matches(&mut t, group).unwrap(), 6);
    assert!(t.group(group).unwrap().matches.is_empty());
    generate_matches(&mut t, group, GenerationFormat::RoundRobin, true, &schedule_params())
        .unwrap();
    assert_eq!(t.group(group).unwrap().matches.len(), 12);
}
