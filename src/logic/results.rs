//! Result ledger: record and reverse match outcomes on player records.
//!
//! `undo_result` is the exact inverse of `record_result` for both players involved.

use crate::models::{GameMatch, MatchId, Outcome, Phase, Player, PlayerId, Tournament, TournamentError};

/// Record the outcome of a pending match. Only wins and double losses can be recorded.
pub fn record_result(
    tournament: &mut Tournament,
    match_id: MatchId,
    outcome: Outcome,
) -> Result<(), TournamentError> {
    if tournament.phase != Phase::InProgress {
        return Err(TournamentError::InvalidPhase(tournament.phase));
    }
    let (p1, p2) = editable_pairing(tournament, match_id)?;
    if tournament.find_match(match_id).map(|m| m.outcome) != Some(Outcome::Pending) {
        return Err(TournamentError::AlreadyDecided(match_id));
    }
    ensure_players(tournament, p1, p2)?;

    let threshold = tournament.config.elimination_threshold;
    match outcome {
        Outcome::Player1Win => {
            player_mut(tournament, p1)?.add_win(p2);
            player_mut(tournament, p2)?.add_loss(p1, threshold);
        }
        Outcome::Player2Win => {
            player_mut(tournament, p2)?.add_win(p1);
            player_mut(tournament, p1)?.add_loss(p2, threshold);
        }
        Outcome::DoubleLoss => {
            player_mut(tournament, p1)?.add_loss(p2, threshold);
            player_mut(tournament, p2)?.add_loss(p1, threshold);
        }
        Outcome::Pending | Outcome::Bye => return Err(TournamentError::InvalidOutcome(outcome)),
    }
    match_mut(tournament, match_id)?.outcome = outcome;
    log::debug!("Recorded {:?} for match {}", outcome, match_id);
    Ok(())
}

/// Reverse a recorded outcome and set the match back to pending. Byes are rejected.
pub fn undo_result(tournament: &mut Tournament, match_id: MatchId) -> Result<(), TournamentError> {
    if tournament.phase != Phase::InProgress {
        return Err(TournamentError::InvalidPhase(tournament.phase));
    }
    let (p1, p2) = editable_pairing(tournament, match_id)?;
    let outcome = tournament
        .find_match(match_id)
        .map(|m| m.outcome)
        .ok_or(TournamentError::UnknownMatch(match_id))?;
    ensure_players(tournament, p1, p2)?;

    let threshold = tournament.config.elimination_threshold;
    match outcome {
        Outcome::Pending => return Err(TournamentError::NotDecided(match_id)),
        Outcome::Player1Win => {
            player_mut(tournament, p1)?.revoke_win();
            player_mut(tournament, p2)?.revoke_loss(threshold);
        }
        Outcome::Player2Win => {
            player_mut(tournament, p2)?.revoke_win();
            player_mut(tournament, p1)?.revoke_loss(threshold);
        }
        Outcome::DoubleLoss => {
            player_mut(tournament, p1)?.revoke_loss(threshold);
            player_mut(tournament, p2)?.revoke_loss(threshold);
        }
        Outcome::Bye => return Err(TournamentError::ImmutableBye(match_id)),
    }
    match_mut(tournament, match_id)?.outcome = Outcome::Pending;
    log::debug!("Reverted {:?} for match {}", outcome, match_id);
    Ok(())
}

/// Both player ids of a non-bye match in the current round.
fn editable_pairing(
    tournament: &Tournament,
    match_id: MatchId,
) -> Result<(PlayerId, PlayerId), TournamentError> {
    let m = tournament
        .find_match(match_id)
        .ok_or(TournamentError::UnknownMatch(match_id))?;
    match m.player_2 {
        Some(p2) if m.outcome != Outcome::Bye => Ok((m.player_1, p2)),
        _ => Err(TournamentError::ImmutableBye(match_id)),
    }
}

/// Check both sides exist before touching either, so a result is applied to both or neither.
fn ensure_players(tournament: &Tournament, p1: PlayerId, p2: PlayerId) -> Result<(), TournamentError> {
    for id in [p1, p2] {
        tournament.player(id).ok_or(TournamentError::PlayerNotFound(id))?;
    }
    Ok(())
}

fn player_mut(tournament: &mut Tournament, id: PlayerId) -> Result<&mut Player, TournamentError> {
    tournament
        .get_player_mut(id)
        .ok_or(TournamentError::PlayerNotFound(id))
}

fn match_mut(tournament: &mut Tournament, id: MatchId) -> Result<&mut GameMatch, TournamentError> {
    tournament
        .matches
        .iter_mut()
        .find(|m| m.id == id)
        .ok_or(TournamentError::UnknownMatch(id))
}
