//! Engine logic: round registry, group manager, slot resolver, standings,
//! schedule generation, advancement.

mod advancement;
mod groups;
mod results;
mod rounds;
mod schedule;
mod slots;
mod standings;

pub use advancement::{advance_round, AdvancementReport};
pub use groups::{create_group, delete_group, update_group};
pub use results::{report_match_result, update_match_status};
pub use rounds::{complete_round, create_round, delete_round, start_round, update_round};
pub use schedule::{build_schedule, clear_matches, expected_match_count, generate_matches};
pub use slots::{
    assign_teams, create_placeholder, remove_team, resolve_placeholders, resolve_target,
    SlotTarget,
};
pub use standings::{
    calculate_standings, compare_across_groups, head_to_head_points, recalculate_group_standings,
    refresh_round_standings,
};
