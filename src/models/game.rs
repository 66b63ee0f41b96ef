//! Matches: two slot references, a status, scores once completed, and a
//! computed kick-off time.

use crate::models::slot::SlotId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a match.
pub type MatchId = Uuid;

/// Lifecycle of a single match. Results arrive from outside the engine;
/// `Completed` is only reachable through result reporting.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchStatus {
    #[default]
    Scheduled,
    Ongoing,
    Paused,
    Completed,
}

/// Pairing algorithm for a generation request.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GenerationFormat {
    RoundRobin,
    SingleElimination,
}

/// Timing and venue inputs for one generation batch. Match `i` (0-based)
/// kicks off at `start_at + i * (match_duration_minutes + match_gap_minutes)`.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct ScheduleParams {
    pub start_at: DateTime<Utc>,
    pub match_duration_minutes: u32,
    pub match_gap_minutes: u32,
    pub venue: Option<String>,
}

/// A single scheduled match between two slots of the same group or round.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct GameMatch {
    pub id: MatchId,
    pub home_slot: SlotId,
    pub away_slot: SlotId,
    pub status: MatchStatus,
    /// Set only when status is Completed.
    pub home_score: Option<u32>,
    pub away_score: Option<u32>,
    pub scheduled_at: DateTime<Utc>,
    pub venue: Option<String>,
    /// Order within the generated batch.
    pub order: u32,
}

impl GameMatch {
    pub fn new(
        home_slot: SlotId,
        away_slot: SlotId,
        scheduled_at: DateTime<Utc>,
        venue: Option<String>,
        order: u32,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            home_slot,
            away_slot,
            status: MatchStatus::Scheduled,
            home_score: None,
            away_score: None,
            scheduled_at,
            venue,
            order,
        }
    }

    pub fn is_completed(&self) -> bool {
        self.status == MatchStatus::Completed
    }

    /// Slot of the winning side. None unless completed with distinct scores
    /// (a drawn match has no winner).
    pub fn winner_slot(&self) -> Option<SlotId> {
        let (home, away) = (self.home_score?, self.away_score?);
        if !self.is_completed() || home == away {
            return None;
        }
        Some(if home > away { self.home_slot } else { self.away_slot })
    }

    /// Slot of the losing side. None unless completed with distinct scores.
    pub fn loser_slot(&self) -> Option<SlotId> {
        let winner = self.winner_slot()?;
        Some(if winner == self.home_slot {
            self.away_slot
        } else {
            self.home_slot
        })
    }
}
