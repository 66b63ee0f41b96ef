//! Group lifecycle under a group-based round. Team assignment is the slot
//! resolver's job and schedules are the generator's; deleting a group takes
//! its matches and standings snapshot with it.

use crate::models::{
    AdvancementRule, EngineError, Group, GroupFormat, GroupId, RoundId, RoundStatus, RoundType,
    Tournament,
};

/// Create a group under a group-based round. Capacity must seat at least 2.
pub fn create_group(
    tournament: &mut Tournament,
    round_id: RoundId,
    name: &str,
    format: GroupFormat,
    max_teams: u32,
    advancement_rule: Option<AdvancementRule>,
) -> Result<GroupId, EngineError> {
    if name.trim().is_empty() {
        return Err(EngineError::EmptyName);
    }
    if max_teams < 2 {
        return Err(EngineError::MaxTeamsTooSmall { given: max_teams });
    }
    let round = tournament
        .round(round_id)
        .ok_or(EngineError::RoundNotFound(round_id))?;
    if round.round_type != RoundType::GroupBased {
        return Err(EngineError::GroupUnderKnockoutRound { round_id });
    }
    if round.status == RoundStatus::Completed {
        return Err(EngineError::RoundCompleted { round_id });
    }

    let mut group = Group::new(round_id, name.trim(), format, max_teams);
    group.advancement_rule = advancement_rule;
    let group_id = group.id;
    let round = tournament
        .round_mut(round_id)
        .ok_or(EngineError::RoundNotFound(round_id))?;
    round.groups.push(group);
    Ok(group_id)
}

/// Update a group's name, format, capacity, or rule override. Capacity can
/// never drop below 2 or below the teams already seated.
pub fn update_group(
    tournament: &mut Tournament,
    group_id: GroupId,
    name: Option<&str>,
    format: Option<GroupFormat>,
    max_teams: Option<u32>,
    advancement_rule: Option<AdvancementRule>,
) -> Result<(), EngineError> {
    let round_id = tournament
        .round_id_of_group(group_id)
        .ok_or(EngineError::GroupNotFound(group_id))?;
    let round = tournament
        .round(round_id)
        .ok_or(EngineError::RoundNotFound(round_id))?;
    if round.status == RoundStatus::Completed {
        return Err(EngineError::RoundCompleted { round_id });
    }

    if let Some(name) = name {
        if name.trim().is_empty() {
            return Err(EngineError::EmptyName);
        }
    }
    if let Some(given) = max_teams {
        if given < 2 {
            return Err(EngineError::MaxTeamsTooSmall { given });
        }
        let assigned = tournament
            .group(group_id)
            .ok_or(EngineError::GroupNotFound(group_id))?
            .slots
            .len();
        if (given as usize) < assigned {
            return Err(EngineError::MaxTeamsBelowAssigned { given, assigned });
        }
    }

    let group = tournament
        .group_mut(group_id)
        .ok_or(EngineError::GroupNotFound(group_id))?;
    if let Some(name) = name {
        group.name = name.trim().to_string();
    }
    if let Some(format) = format {
        group.format = format;
    }
    if let Some(max_teams) = max_teams {
        group.max_teams = max_teams;
    }
    if let Some(rule) = advancement_rule {
        group.advancement_rule = Some(rule);
    }
    Ok(())
}

/// Delete a group and everything under it (slots, matches, standings).
pub fn delete_group(tournament: &mut Tournament, group_id: GroupId) -> Result<(), EngineError> {
    let round_id = tournament
        .round_id_of_group(group_id)
        .ok_or(EngineError::GroupNotFound(group_id))?;
    let round = tournament
        .round_mut(round_id)
        .ok_or(EngineError::RoundNotFound(round_id))?;
    round.groups.retain(|g| g.id != group_id);
    Ok(())
}
