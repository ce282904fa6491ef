//! Data structures for the Swiss tournament: players, matches, rules, tournament state.

mod config;
mod game;
mod player;
mod tournament;

pub use config::{TournamentConfig, DEFAULT_ELIMINATION_THRESHOLD};
pub use game::{GameMatch, MatchId, Outcome};
pub use player::{Player, PlayerId, Standing, POINTS_PER_WIN};
pub use tournament::{rounds_for, Phase, Tournament, TournamentError, TournamentId};
