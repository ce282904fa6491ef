//! Setup phase: start tournament (Setup -> InProgress) and reset (Finished -> Setup).

use crate::logic::rounds::{generate_next_round, RoundStart};
use crate::models::{Phase, Tournament, TournamentError};
use rand::Rng;

/// Start the tournament: require 2 players, fix the round count and pair round 1.
pub fn start_tournament<R: Rng + ?Sized>(
    tournament: &mut Tournament,
    rng: &mut R,
) -> Result<RoundStart, TournamentError> {
    if tournament.phase != Phase::Setup {
        return Err(TournamentError::InvalidPhase(tournament.phase));
    }
    if tournament.players.len() < 2 {
        return Err(TournamentError::NotEnoughPlayers);
    }
    tournament.starting_entrants = tournament.players.len();
    tournament.current_round = 0;
    tournament.phase = Phase::InProgress;
    log::info!(
        "Starting tournament {} with {} players, {} rounds",
        tournament.id,
        tournament.starting_entrants,
        tournament.total_rounds()
    );
    generate_next_round(tournament, rng)
}

/// Back to an empty Setup (only valid once Finished). Keeps the id and rules.
pub fn reset_tournament(tournament: &mut Tournament) -> Result<(), TournamentError> {
    if tournament.phase != Phase::Finished {
        return Err(TournamentError::InvalidPhase(tournament.phase));
    }
    *tournament = Tournament {
        id: tournament.id,
        ..Tournament::new(tournament.config)
    };
    Ok(())
}
