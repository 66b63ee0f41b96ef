//! Data structures for the tournament structure engine: rounds, groups,
//! slots, matches, standings, rules.

mod game;
mod group;
mod round;
mod rules;
mod slot;
mod standing;
mod team;
mod tournament;

pub use game::{GameMatch, GenerationFormat, MatchId, MatchStatus, ScheduleParams};
pub use group::{Group, GroupFormat, GroupId};
pub use round::{Round, RoundFormat, RoundId, RoundStatus, RoundType};
pub use rules::{default_tie_breaks, AdvancementRule, TieBreak};
pub use slot::{MatchOutcome, SlotId, SlotSource, TeamSlot};
pub use standing::Standing;
pub use team::{TeamEntry, TeamId};
pub use tournament::{EngineError, ErrorKind, Tournament, TournamentId};
