//! Tournament business logic: setup, pairing, results, round lifecycle, undo history.

mod history;
mod pairing;
mod results;
mod rounds;
mod setup;

pub use history::History;
pub use pairing::{pair_round, ByeAward, PairingOutcome, RoundPairing};
pub use results::{record_result, undo_result};
pub use rounds::{advance_round, generate_next_round, RoundReport, RoundStart};
pub use setup::{reset_tournament, start_tournament};
