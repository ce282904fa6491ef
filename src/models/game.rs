//! Match (game) and Outcome for 1v1 Swiss rounds.

use crate::models::player::PlayerId;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a match.
pub type MatchId = Uuid;

/// Result state of a single match.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Outcome {
    /// Not yet played.
    #[default]
    Pending,
    Player1Win,
    Player2Win,
    /// Neither player scores; both take a loss.
    DoubleLoss,
    /// Automatic win for an unpaired player. Fixed at creation.
    Bye,
}

impl Outcome {
    pub fn is_decided(self) -> bool {
        self != Outcome::Pending
    }
}

/// A single match in a round. `player_2` is `None` for a bye.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameMatch {
    pub id: MatchId,
    pub round: u32,
    pub player_1: PlayerId,
    pub player_2: Option<PlayerId>,
    pub outcome: Outcome,
}

impl GameMatch {
    pub fn new(round: u32, player_1: PlayerId, player_2: PlayerId) -> Self {
        Self {
            id: Uuid::new_v4(),
            round,
            player_1,
            player_2: Some(player_2),
            outcome: Outcome::Pending,
        }
    }

    pub fn bye(round: u32, player: PlayerId) -> Self {
        Self {
            id: Uuid::new_v4(),
            round,
            player_1: player,
            player_2: None,
            outcome: Outcome::Bye,
        }
    }

    pub fn is_bye(&self) -> bool {
        self.player_2.is_none()
    }

    pub fn involves(&self, player: PlayerId) -> bool {
        self.player_1 == player || self.player_2 == Some(player)
    }
}
