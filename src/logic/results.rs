//! Match result intake: the write path for the external result source.
//! Reporting finalizes a match and immediately runs the placeholder
//! resolution pass so dependent slots bind as soon as an outcome exists.

use crate::logic::slots::resolve_placeholders;
use crate::models::{EngineError, MatchId, MatchStatus, Tournament};

/// Record a final score and mark the match completed. A completed match is
/// immutable; re-reporting is refused.
pub fn report_match_result(
    tournament: &mut Tournament,
    match_id: MatchId,
    home_score: u32,
    away_score: u32,
) -> Result<(), EngineError> {
    let game = tournament
        .match_mut(match_id)
        .ok_or(EngineError::MatchNotFound(match_id))?;
    if game.status == MatchStatus::Completed {
        return Err(EngineError::MatchAlreadyCompleted { match_id });
    }
    game.status = MatchStatus::Completed;
    game.home_score = Some(home_score);
    game.away_score = Some(away_score);

    resolve_placeholders(tournament);
    Ok(())
}

/// Move a match between its non-final states. Completed is only reachable
/// through `report_match_result`, and only these transitions are legal:
/// Scheduled -> Ongoing, Ongoing -> Paused, Paused -> Ongoing.
pub fn update_match_status(
    tournament: &mut Tournament,
    match_id: MatchId,
    status: MatchStatus,
) -> Result<(), EngineError> {
    let game = tournament
        .match_mut(match_id)
        .ok_or(EngineError::MatchNotFound(match_id))?;
    let allowed = matches!(
        (game.status, status),
        (MatchStatus::Scheduled, MatchStatus::Ongoing)
            | (MatchStatus::Ongoing, MatchStatus::Paused)
            | (MatchStatus::Paused, MatchStatus::Ongoing)
    );
    if !allowed {
        return Err(EngineError::InvalidMatchTransition {
            from: game.status,
            to: status,
        });
    }
    game.status = status;
    Ok(())
}
