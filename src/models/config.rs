//! Per-tournament rules, fixed once the tournament starts.

use serde::{Deserialize, Serialize};

/// Losses at which a player is eliminated unless configured otherwise.
pub const DEFAULT_ELIMINATION_THRESHOLD: u32 = 2;

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TournamentConfig {
    /// Losses before elimination. `None` plays points-only Swiss where nobody is eliminated.
    #[serde(default = "default_elimination_threshold")]
    pub elimination_threshold: Option<u32>,
    /// Take a history snapshot before every recorded result, not just before each round.
    #[serde(default)]
    pub snapshot_each_result: bool,
}

fn default_elimination_threshold() -> Option<u32> {
    Some(DEFAULT_ELIMINATION_THRESHOLD)
}

impl Default for TournamentConfig {
    fn default() -> Self {
        Self {
            elimination_threshold: default_elimination_threshold(),
            snapshot_each_result: false,
        }
    }
}

impl TournamentConfig {
    /// Points-only Swiss: nobody is ever eliminated.
    pub fn points_only() -> Self {
        Self {
            elimination_threshold: None,
            ..Self::default()
        }
    }
}
