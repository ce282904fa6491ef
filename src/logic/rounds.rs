//! Round lifecycle: pair the next round or finish the tournament.

use crate::logic::pairing::{pair_round, ByeAward, PairingOutcome};
use crate::models::{Phase, PlayerId, Tournament, TournamentError};
use rand::Rng;

/// What happened when a round was requested.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum RoundStart {
    Paired(RoundReport),
    /// Last round played, or not enough active players left to pair.
    Finished,
}

/// Summary of a freshly paired round, including any degraded pairing.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RoundReport {
    pub round: u32,
    pub bye: Option<ByeAward>,
    pub rematches: Vec<(PlayerId, PlayerId)>,
}

/// Pair round `current_round + 1` from the active players and award its bye.
///
/// Finishes the tournament instead when one or no players are active.
pub fn generate_next_round<R: Rng + ?Sized>(
    tournament: &mut Tournament,
    rng: &mut R,
) -> Result<RoundStart, TournamentError> {
    if tournament.phase != Phase::InProgress {
        return Err(TournamentError::InvalidPhase(tournament.phase));
    }
    let next = tournament.current_round + 1;
    let outcome = {
        let candidates = tournament.active_players();
        pair_round(&candidates, next, rng)
    };
    let pairing = match outcome {
        PairingOutcome::Complete => {
            finish(tournament);
            return Ok(RoundStart::Finished);
        }
        PairingOutcome::Round(pairing) => pairing,
    };

    if let Some(award) = pairing.bye {
        tournament
            .get_player_mut(award.player)
            .ok_or(TournamentError::PlayerNotFound(award.player))?
            .award_bye();
    }
    tournament.matches = pairing.matches;
    tournament.current_round = next;
    log::info!(
        "Round {}/{} paired: {} matches",
        next,
        tournament.total_rounds(),
        tournament.matches.len()
    );

    Ok(RoundStart::Paired(RoundReport {
        round: next,
        bye: pairing.bye,
        rematches: pairing.rematches,
    }))
}

/// Close the current round: finish after the last round, otherwise pair the next one.
pub fn advance_round<R: Rng + ?Sized>(
    tournament: &mut Tournament,
    rng: &mut R,
) -> Result<RoundStart, TournamentError> {
    if tournament.phase != Phase::InProgress {
        return Err(TournamentError::InvalidPhase(tournament.phase));
    }
    if !tournament.is_round_complete() {
        return Err(TournamentError::RoundIncomplete);
    }
    if tournament.current_round >= tournament.total_rounds() {
        finish(tournament);
        return Ok(RoundStart::Finished);
    }
    generate_next_round(tournament, rng)
}

fn finish(tournament: &mut Tournament) {
    tournament.phase = Phase::Finished;
    match tournament.champion() {
        Some(champion) => log::info!(
            "Tournament finished after round {}: champion {} ({} pts)",
            tournament.current_round,
            champion.name,
            champion.points()
        ),
        None => log::info!("Tournament finished after round {}", tournament.current_round),
    }
}
