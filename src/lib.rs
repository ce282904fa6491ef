//! Swiss tournament organizer with a losses cutoff: library with models, pairing engine,
//! undo history and persistence.

pub mod logic;
pub mod models;
pub mod organizer;
pub mod persistence;

pub use logic::{
    advance_round, generate_next_round, pair_round, record_result, reset_tournament,
    start_tournament, undo_result, ByeAward, History, PairingOutcome, RoundPairing, RoundReport,
    RoundStart,
};
pub use models::{
    rounds_for, GameMatch, MatchId, Outcome, Phase, Player, PlayerId, Standing, Tournament,
    TournamentConfig, TournamentError, TournamentId, DEFAULT_ELIMINATION_THRESHOLD,
    POINTS_PER_WIN,
};
pub use organizer::{Notifier, Organizer};
