//! Tournament structure & progression engine: library with models and
//! business logic.

pub mod logic;
pub mod models;

pub use logic::{
    advance_round, assign_teams, build_schedule, calculate_standings, clear_matches,
    complete_round, create_group, create_placeholder, create_round, delete_group, delete_round,
    expected_match_count, generate_matches, recalculate_group_standings, refresh_round_standings,
    remove_team, report_match_result, resolve_placeholders, start_round, update_group,
    update_match_status, update_round, AdvancementReport,
};
pub use models::{
    AdvancementRule, EngineError, ErrorKind, GameMatch, GenerationFormat, Group, GroupFormat,
    GroupId, MatchId, MatchOutcome, MatchStatus, Round, RoundFormat, RoundId, RoundStatus,
    RoundType, ScheduleParams, SlotId, SlotSource, Standing, TeamEntry, TeamId, TeamSlot,
    TieBreak, Tournament, TournamentId,
};
