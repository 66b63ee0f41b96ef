//! Integration tests for the advancement engine: rule evaluation, manual
//! selection, partial advancement and placeholder binding.

use chrono::{TimeZone, Utc};
use std::collections::HashSet;
use tournament_stage_web::{
    assign_teams, complete_round, create_group, create_placeholder, create_round,
    generate_matches, report_match_result, start_round, AdvancementRule, GenerationFormat,
    GroupFormat, GroupId, RoundId, RoundType, ScheduleParams, SlotSource, TeamId, Tournament,
};

fn schedule_params() -> ScheduleParams {
    ScheduleParams {
        start_at: Utc.with_ymd_and_hms(2024, 6, 1, 10, 0, 0).unwrap(),
        match_duration_minutes: 90,
        match_gap_minutes: 30,
        venue: None,
    }
}

fn tournament_with_teams(n: usize) -> (Tournament, Vec<TeamId>) {
    let mut t = Tournament::new("Test Cup");
    let ids = (0..n)
        .map(|i| t.register_team(format!("Team {i}")).unwrap())
        .collect();
    (t, ids)
}

/// Deterministic results: the team registered earlier always wins 2-0.
/// Rankings inside every group end up in assignment order.
fn play_all_matches(t: &mut Tournament, group_id: GroupId) {
    let group = t.group(group_id).unwrap().clone();
    for m in &group.matches {
        let home = group.slot(m.home_slot).unwrap().team_id.unwrap();
        let away = group.slot(m.away_slot).unwrap().team_id.unwrap();
        let home_idx = t.teams.iter().position(|e| e.id == home).unwrap();
        let away_idx = t.teams.iter().position(|e| e.id == away).unwrap();
        let (hs, aws) = if home_idx < away_idx { (2, 0) } else { (0, 2) };
        report_match_result(t, m.id, hs, aws).unwrap();
    }
}

/// A group-based round splitting `teams` evenly into `group_count` groups,
/// each with a generated and fully played round-robin.
fn played_group_stage(
    t: &mut Tournament,
    teams: &[TeamId],
    group_count: usize,
    rule: Option<AdvancementRule>,
) -> (RoundId, Vec<GroupId>) {
    let round = create_round(t, "Group Stage", RoundType::GroupBased, None, rule).unwrap();
    let per_group = teams.len() / group_count;
    let mut groups = Vec::new();
    for gi in 0..group_count {
        let group = create_group(
            t,
            round,
            &format!("Group {gi}"),
            GroupFormat::RoundRobinSingle,
            per_group as u32,
            None,
        )
        .unwrap();
        assign_teams(t, group, &teams[gi * per_group..(gi + 1) * per_group]).unwrap();
        generate_matches(t, group, GenerationFormat::RoundRobin, false, &schedule_params())
            .unwrap();
        groups.push(group);
    }
    start_round(t, round).unwrap();
    for group in &groups {
        play_all_matches(t, *group);
    }
    (round, groups)
}

#[test]
fn top_two_of_four_groups_advances_eight() {
    let (mut t, teams) = tournament_with_teams(16);
    let (r1, groups) = played_group_stage(&mut t, &teams, 4, None); // default top-2
    let r2 = create_round(&mut t, "Round 2", RoundType::GroupBased, None, None).unwrap();
    create_group(&mut t, r2, "Group X", GroupFormat::RoundRobinSingle, 4, None).unwrap();
    create_group(&mut t, r2, "Group Y", GroupFormat::RoundRobinSingle, 4, None).unwrap();

    let report = complete_round(&mut t, r1, true, true, None).unwrap().unwrap();
    assert_eq!(report.advanced, 8);
    assert_eq!(report.target_round, "Round 2");

    let seated: HashSet<TeamId> = t.round(r2).unwrap().assigned_team_ids().into_iter().collect();
    let expected: HashSet<TeamId> = [0, 1, 4, 5, 8, 9, 12, 13]
        .iter()
        .map(|&i| teams[i])
        .collect();
    assert_eq!(seated, expected);

    // The source round's snapshot carries the advanced flags.
    let g0 = t.group(groups[0]).unwrap();
    assert!(g0.standings[0].advanced);
    assert!(g0.standings[1].advanced);
    assert!(!g0.standings[2].advanced);
}

#[test]
fn winners_only_sends_one_per_group() {
    let (mut t, teams) = tournament_with_teams(8);
    let (r1, _) = played_group_stage(&mut t, &teams, 2, Some(AdvancementRule::WinnersOnly));
    let r2 = create_round(&mut t, "Final", RoundType::DirectKnockout, None, None).unwrap();

    let report = complete_round(&mut t, r1, true, true, None).unwrap().unwrap();
    assert_eq!(report.advanced, 2);

    let next = t.round(r2).unwrap();
    let seated: Vec<TeamId> = next.assigned_team_ids();
    assert_eq!(seated.len(), 2);
    assert!(seated.contains(&teams[0]));
    assert!(seated.contains(&teams[4]));
}

#[test]
fn best_third_place_over_eight_groups_advances_twenty() {
    let (mut t, teams) = tournament_with_teams(24);
    let (r1, _) = played_group_stage(
        &mut t,
        &teams,
        8,
        Some(AdvancementRule::BestThirdPlace { extra: 4 }),
    );
    let r2 = create_round(&mut t, "Knockout Stage", RoundType::GroupBased, None, None).unwrap();
    for name in ["P1", "P2", "P3", "P4", "P5"] {
        create_group(&mut t, r2, name, GroupFormat::RoundRobinSingle, 4, None).unwrap();
    }

    let report = complete_round(&mut t, r1, true, true, None).unwrap().unwrap();
    assert_eq!(report.advanced, 20); // 8 * 2 + 4 best thirds

    let seated: HashSet<TeamId> = t.round(r2).unwrap().assigned_team_ids().into_iter().collect();
    assert_eq!(seated.len(), 20);
    // Thirds all tie on points; the stable cross-group ranking keeps group
    // order, so the first four groups' thirds make the cut.
    assert!(seated.contains(&teams[2]));
    assert!(seated.contains(&teams[11]));
    assert!(!seated.contains(&teams[14]));
    assert!(!seated.contains(&teams[23]));
}

#[test]
fn custom_threshold_ignores_position() {
    let (mut t, teams) = tournament_with_teams(4);
    let (r1, _) = played_group_stage(
        &mut t,
        &teams,
        1,
        Some(AdvancementRule::Custom { min_points: 6 }),
    );
    let r2 = create_round(&mut t, "Round 2", RoundType::GroupBased, None, None).unwrap();
    create_group(&mut t, r2, "Group X", GroupFormat::RoundRobinSingle, 4, None).unwrap();

    // Full round-robin of 4 by roster order: 9, 6, 3, 0 points.
    let report = complete_round(&mut t, r1, true, true, None).unwrap().unwrap();
    assert_eq!(report.advanced, 2);
    let seated: HashSet<TeamId> = t.round(r2).unwrap().assigned_team_ids().into_iter().collect();
    assert_eq!(seated, [teams[0], teams[1]].into_iter().collect());
}

#[test]
fn explicit_selection_bypasses_the_rule() {
    let (mut t, teams) = tournament_with_teams(4);
    let (r1, _) = played_group_stage(&mut t, &teams, 1, None);
    let r2 = create_round(&mut t, "Round 2", RoundType::GroupBased, None, None).unwrap();
    create_group(&mut t, r2, "Group X", GroupFormat::RoundRobinSingle, 4, None).unwrap();

    // The bottom two advance because an operator says so.
    let picked = vec![teams[2], teams[3]];
    let report = complete_round(&mut t, r1, true, true, Some(&picked))
        .unwrap()
        .unwrap();
    assert_eq!(report.advanced, 2);
    let seated: HashSet<TeamId> = t.round(r2).unwrap().assigned_team_ids().into_iter().collect();
    assert_eq!(seated, picked.into_iter().collect());
}

#[test]
fn manual_rule_advances_nothing_without_selection() {
    let (mut t, teams) = tournament_with_teams(4);
    let (r1, _) = played_group_stage(&mut t, &teams, 1, Some(AdvancementRule::Manual));
    let r2 = create_round(&mut t, "Round 2", RoundType::GroupBased, None, None).unwrap();
    create_group(&mut t, r2, "Group X", GroupFormat::RoundRobinSingle, 4, None).unwrap();

    let report = complete_round(&mut t, r1, true, true, None).unwrap().unwrap();
    assert_eq!(report.advanced, 0);
    assert!(t.round(r2).unwrap().assigned_team_ids().is_empty());
}

#[test]
fn completing_the_last_round_advances_nowhere() {
    let (mut t, teams) = tournament_with_teams(4);
    let (r1, _) = played_group_stage(&mut t, &teams, 1, None);
    let report = complete_round(&mut t, r1, true, true, None).unwrap();
    assert!(report.is_none());
}

#[test]
fn partial_advancement_leaves_the_rest_open() {
    let (mut t, teams) = tournament_with_teams(4);
    let (r1, _) = played_group_stage(&mut t, &teams, 1, None); // top-2 of one group
    let r2 = create_round(&mut t, "Round 2", RoundType::GroupBased, None, None).unwrap();
    let next_group =
        create_group(&mut t, r2, "Group X", GroupFormat::RoundRobinSingle, 4, None).unwrap();

    let report = complete_round(&mut t, r1, true, true, None).unwrap().unwrap();
    // Two teams into a four-slot group: no error, the rest stays open.
    assert_eq!(report.advanced, 2);
    assert_eq!(t.group(next_group).unwrap().slots.len(), 2);
}

#[test]
fn group_placement_placeholders_bind_during_advancement() {
    let (mut t, teams) = tournament_with_teams(4);
    let round = create_round(&mut t, "Group Stage", RoundType::GroupBased, None, None).unwrap();
    let group = create_group(
        &mut t,
        round,
        "Group A",
        GroupFormat::RoundRobinSingle,
        4,
        None,
    )
    .unwrap();
    assign_teams(&mut t, group, &teams).unwrap();
    generate_matches(&mut t, group, GenerationFormat::RoundRobin, false, &schedule_params())
        .unwrap();

    let r2 = create_round(&mut t, "Final", RoundType::DirectKnockout, None, None).unwrap();
    let winner_slot = create_placeholder(
        &mut t,
        r2,
        "Group A winner",
        SlotSource::GroupPlacement { group_id: group, place: 1 },
    )
    .unwrap();
    let runner_up_slot = create_placeholder(
        &mut t,
        r2,
        "Group A runner-up",
        SlotSource::GroupPlacement { group_id: group, place: 2 },
    )
    .unwrap();

    start_round(&mut t, round).unwrap();
    play_all_matches(&mut t, group);
    let report = complete_round(&mut t, round, true, true, None).unwrap().unwrap();
    assert_eq!(report.advanced, 2);

    let next = t.round(r2).unwrap();
    let winner = next.slot(winner_slot).unwrap();
    let runner_up = next.slot(runner_up_slot).unwrap();
    assert_eq!(winner.team_id, Some(teams[0]));
    assert_eq!(runner_up.team_id, Some(teams[1]));
    // Provenance survives resolution.
    assert!(winner.source.is_some());
    assert_eq!(winner.placeholder_name, None);
}

#[test]
fn knockout_rounds_advance_from_their_own_table() {
    let (mut t, teams) = tournament_with_teams(4);
    let r1 = create_round(
        &mut t,
        "Semi Finals",
        RoundType::DirectKnockout,
        None,
        Some(AdvancementRule::TopN { count: 2 }),
    )
    .unwrap();
    assign_teams(&mut t, r1, &teams).unwrap();
    generate_matches(
        &mut t,
        r1,
        GenerationFormat::SingleElimination,
        false,
        &schedule_params(),
    )
    .unwrap();
    let r2 = create_round(&mut t, "Final", RoundType::DirectKnockout, None, None).unwrap();

    start_round(&mut t, r1).unwrap();
    // Seeds 1 and 2 win their semis.
    let round = t.round(r1).unwrap().clone();
    for m in &round.matches {
        let home = round.slot(m.home_slot).unwrap().team_id.unwrap();
        let home_idx = t.teams.iter().position(|e| e.id == home).unwrap();
        let (hs, aws) = if home_idx < 2 { (1, 0) } else { (0, 1) };
        report_match_result(&mut t, m.id, hs, aws).unwrap();
    }

    let report = complete_round(&mut t, r1, true, true, None).unwrap().unwrap();
    assert_eq!(report.advanced, 2);
    let seated: HashSet<TeamId> = t.round(r2).unwrap().assigned_team_ids().into_iter().collect();
    assert_eq!(seated, [teams[0], teams[1]].into_iter().collect());
}
