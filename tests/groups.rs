//! Integration tests for the group manager: creation rules, updates,
//! cascading deletion.

use chrono::{TimeZone, Utc};
use tournament_stage_web::{
    assign_teams, create_group, create_round, delete_group, generate_matches, update_group,
    EngineError, GenerationFormat, GroupFormat, RoundType, ScheduleParams, TeamId, Tournament,
};

fn tournament_with_teams(n: usize) -> (Tournament, Vec<TeamId>) {
    let mut t = Tournament::new("Test Cup");
    let ids = (0..n)
        .map(|i| t.register_team(format!("Team {i}")).unwrap())
        .collect();
    (t, ids)
}

fn schedule_params() -> ScheduleParams {
    ScheduleParams {
        start_at: Utc.with_ymd_and_hms(2024, 6, 1, 10, 0, 0).unwrap(),
        match_duration_minutes: 90,
        match_gap_minutes: 30,
        venue: None,
    }
}

#[test]
fn groups_require_a_group_based_round() {
    let (mut t, _) = tournament_with_teams(0);
    let knockout = create_round(&mut t, "KO", RoundType::DirectKnockout, None, None).unwrap();
    assert!(matches!(
        create_group(&mut t, knockout, "Group A", GroupFormat::RoundRobinSingle, 4, None),
        Err(EngineError::GroupUnderKnockoutRound { .. })
    ));
}

#[test]
fn group_capacity_must_seat_two() {
    let (mut t, _) = tournament_with_teams(0);
    let round = create_round(&mut t, "Groups", RoundType::GroupBased, None, None).unwrap();
    assert!(matches!(
        create_group(&mut t, round, "Group A", GroupFormat::RoundRobinSingle, 1, None),
        Err(EngineError::MaxTeamsTooSmall { given: 1 })
    ));
    assert!(matches!(
        create_group(&mut t, round, "  ", GroupFormat::RoundRobinSingle, 4, None),
        Err(EngineError::EmptyName)
    ));
}

#[test]
fn capacity_cannot_shrink_below_seated_teams() {
    let (mut t, teams) = tournament_with_teams(3);
    let round = create_round(&mut t, "Groups", RoundType::GroupBased, None, None).unwrap();
    let group = create_group(&mut t, round, "Group A", GroupFormat::RoundRobinSingle, 4, None).unwrap();
    assign_teams(&mut t, group, &teams).unwrap();

    assert!(matches!(
        update_group(&mut t, group, None, None, Some(2), None),
        Err(EngineError::MaxTeamsBelowAssigned { given: 2, assigned: 3 })
    ));
    update_group(&mut t, group, Some("Pool A"), None, Some(3), None).unwrap();
    let g = t.group(group).unwrap();
    assert_eq!(g.name, "Pool A");
    assert_eq!(g.max_teams, 3);
}

#[test]
fn delete_group_takes_its_matches_along() {
    let (mut t, teams) = tournament_with_teams(4);
    let round = create_round(&mut t, "Groups", RoundType::GroupBased, None, None).unwrap();
    let group = create_group(&mut t, round, "Group A", GroupFormat::RoundRobinSingle, 4, None).unwrap();
    assign_teams(&mut t, group, &teams).unwrap();
    generate_matches(
        &mut t,
        group,
        GenerationFormat::RoundRobin,
        false,
        &schedule_params(),
    )
    .unwrap();
    let match_id = t.group(group).unwrap().matches[0].id;

    delete_group(&mut t, group).unwrap();

    assert!(t.group(group).is_none());
    assert!(t.game_match(match_id).is_none());
    assert!(t.round(round).unwrap().groups.is_empty());
}
