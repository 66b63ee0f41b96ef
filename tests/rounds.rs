//! Integration tests for the round registry: sequencing, lifecycle, deletion.

use tournament_stage_web::{
    complete_round, create_round, delete_round, start_round, update_round, EngineError,
    RoundStatus, RoundType, Tournament,
};

fn tournament() -> Tournament {
    Tournament::new("Test Cup")
}

#[test]
fn rounds_get_contiguous_sequence_orders() {
    let mut t = tournament();
    let r1 = create_round(&mut t, "Group Stage", RoundType::GroupBased, None, None).unwrap();
    let r2 = create_round(&mut t, "Quarter Finals", RoundType::DirectKnockout, None, None).unwrap();
    let r3 = create_round(&mut t, "Semi Finals", RoundType::DirectKnockout, None, None).unwrap();
    assert_eq!(t.round(r1).unwrap().sequence_order, 1);
    assert_eq!(t.round(r2).unwrap().sequence_order, 2);
    assert_eq!(t.round(r3).unwrap().sequence_order, 3);
}

#[test]
fn create_rejects_empty_name() {
    let mut t = tournament();
    assert!(matches!(
        create_round(&mut t, "   ", RoundType::GroupBased, None, None),
        Err(EngineError::EmptyName)
    ));
}

#[test]
fn start_requires_completed_predecessor() {
    let mut t = tournament();
    let r1 = create_round(&mut t, "Round 1", RoundType::GroupBased, None, None).unwrap();
    let r2 = create_round(&mut t, "Round 2", RoundType::DirectKnockout, None, None).unwrap();

    // Round 2 cannot start while round 1 has not even started.
    assert!(matches!(
        start_round(&mut t, r2),
        Err(EngineError::PredecessorNotCompleted { sequence: 1, .. })
    ));

    start_round(&mut t, r1).unwrap();
    // Still blocked: round 1 is ongoing, not completed.
    assert!(matches!(
        start_round(&mut t, r2),
        Err(EngineError::PredecessorNotCompleted { sequence: 1, .. })
    ));

    complete_round(&mut t, r1, false, false, None).unwrap();
    start_round(&mut t, r2).unwrap();
    assert_eq!(t.round(r2).unwrap().status, RoundStatus::Ongoing);
}

#[test]
fn first_round_starts_without_predecessor() {
    let mut t = tournament();
    let r1 = create_round(&mut t, "Opening", RoundType::GroupBased, None, None).unwrap();
    start_round(&mut t, r1).unwrap();
    assert_eq!(t.round(r1).unwrap().status, RoundStatus::Ongoing);
}

#[test]
fn start_is_only_valid_from_not_started() {
    let mut t = tournament();
    let r1 = create_round(&mut t, "Round 1", RoundType::GroupBased, None, None).unwrap();
    start_round(&mut t, r1).unwrap();
    assert!(matches!(
        start_round(&mut t, r1),
        Err(EngineError::RoundNotPending {
            status: RoundStatus::Ongoing
        })
    ));
}

#[test]
fn complete_requires_ongoing() {
    let mut t = tournament();
    let r1 = create_round(&mut t, "Round 1", RoundType::GroupBased, None, None).unwrap();
    assert!(matches!(
        complete_round(&mut t, r1, false, false, None),
        Err(EngineError::RoundNotOngoing {
            status: RoundStatus::NotStarted
        })
    ));
}

#[test]
fn completed_is_terminal() {
    let mut t = tournament();
    let r1 = create_round(&mut t, "Round 1", RoundType::GroupBased, None, None).unwrap();
    start_round(&mut t, r1).unwrap();
    complete_round(&mut t, r1, false, false, None).unwrap();

    assert_eq!(t.round(r1).unwrap().status, RoundStatus::Completed);
    assert!(matches!(
        start_round(&mut t, r1),
        Err(EngineError::RoundNotPending { .. })
    ));
    assert!(matches!(
        complete_round(&mut t, r1, false, false, None),
        Err(EngineError::RoundNotOngoing { .. })
    ));
    assert!(matches!(
        update_round(&mut t, r1, Some("Renamed"), None, None),
        Err(EngineError::RoundCompleted { .. })
    ));
}

#[test]
fn update_changes_name_and_rule() {
    let mut t = tournament();
    let r1 = create_round(&mut t, "Round 1", RoundType::GroupBased, None, None).unwrap();
    update_round(&mut t, r1, Some("  Group Phase  "), None, None).unwrap();
    assert_eq!(t.round(r1).unwrap().name, "Group Phase");
}

#[test]
fn delete_round_compacts_sequence_orders() {
    let mut t = tournament();
    let r1 = create_round(&mut t, "Round 1", RoundType::GroupBased, None, None).unwrap();
    let r2 = create_round(&mut t, "Round 2", RoundType::GroupBased, None, None).unwrap();
    let r3 = create_round(&mut t, "Round 3", RoundType::DirectKnockout, None, None).unwrap();

    delete_round(&mut t, r2).unwrap();

    assert!(t.round(r2).is_none());
    assert_eq!(t.round(r1).unwrap().sequence_order, 1);
    assert_eq!(t.round(r3).unwrap().sequence_order, 2);
    // A fresh round lands at the end of the compacted sequence.
    let r4 = create_round(&mut t, "Round 4", RoundType::DirectKnockout, None, None).unwrap();
    assert_eq!(t.round(r4).unwrap().sequence_order, 3);
}

#[test]
fn delete_unknown_round_is_not_found() {
    let mut t = tournament();
    let ghost = uuid::Uuid::new_v4();
    assert!(matches!(
        delete_round(&mut t, ghost),
        Err(EngineError::RoundNotFound(id)) if id == ghost
    ));
}
