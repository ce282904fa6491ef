//! Player and Standing data structures.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a player (used in matches and lookups).
pub type PlayerId = Uuid;

/// Points awarded for a win or a bye.
pub const POINTS_PER_WIN: u32 = 3;

/// One row of the standings table (for API / display).
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Standing {
    /// 1-based position in the standings.
    pub rank: usize,
    pub player_id: PlayerId,
    pub name: String,
    pub points: u32,
    pub wins: u32,
    pub losses: u32,
    pub eliminated: bool,
    pub dropped: bool,
}

impl Standing {
    pub fn from_player(rank: usize, p: &Player) -> Self {
        Self {
            rank,
            player_id: p.id,
            name: p.name.clone(),
            points: p.points(),
            wins: p.wins,
            losses: p.losses,
            eliminated: p.eliminated,
            dropped: p.dropped,
        }
    }
}

/// A player in the tournament.
///
/// Points are never stored: they are always `POINTS_PER_WIN * wins`.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    pub wins: u32,
    pub losses: u32,
    /// One entry per recorded non-bye result, oldest first.
    #[serde(default)]
    pub opponents: Vec<PlayerId>,
    #[serde(default)]
    pub had_bye: bool,
    #[serde(default)]
    pub eliminated: bool,
    #[serde(default)]
    pub dropped: bool,
}

impl Player {
    /// Create a new player with the given name. Other fields start at zero/false.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            wins: 0,
            losses: 0,
            opponents: Vec::new(),
            had_bye: false,
            eliminated: false,
            dropped: false,
        }
    }

    pub fn points(&self) -> u32 {
        POINTS_PER_WIN * self.wins
    }

    pub fn has_played(&self, opponent: PlayerId) -> bool {
        self.opponents.contains(&opponent)
    }

    /// Whether this player may be paired in the next round. The `eliminated` flag only
    /// counts while an elimination threshold is in force.
    pub fn is_active(&self, threshold: Option<u32>) -> bool {
        !self.dropped && !(threshold.is_some() && self.eliminated)
    }

    /// Record a win against `opponent`.
    pub fn add_win(&mut self, opponent: PlayerId) {
        self.wins += 1;
        self.opponents.push(opponent);
    }

    /// Record a loss against `opponent`; eliminates once `threshold` losses are reached.
    pub fn add_loss(&mut self, opponent: PlayerId, threshold: Option<u32>) {
        self.losses += 1;
        self.opponents.push(opponent);
        self.refresh_elimination(threshold);
    }

    /// Record a bye: counts as a win with no opponent.
    pub fn award_bye(&mut self) {
        self.wins += 1;
        self.had_bye = true;
    }

    pub fn revoke_win(&mut self) {
        self.wins = self.wins.saturating_sub(1);
        self.opponents.pop();
    }

    pub fn revoke_loss(&mut self, threshold: Option<u32>) {
        self.losses = self.losses.saturating_sub(1);
        self.opponents.pop();
        self.refresh_elimination(threshold);
    }

    fn refresh_elimination(&mut self, threshold: Option<u32>) {
        self.eliminated = threshold.is_some_and(|t| self.losses >= t);
    }

    /// Current standing row at the given rank.
    pub fn standing(&self, rank: usize) -> Standing {
        Standing::from_player(rank, self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn points_follow_wins() {
        let mut p = Player::new("A");
        let opp = Uuid::new_v4();
        p.add_win(opp);
        p.award_bye();
        assert_eq!(p.points(), 6);
        p.revoke_win();
        assert_eq!(p.points(), 3);
        assert!(p.opponents.is_empty());
    }

    #[test]
    fn loss_threshold_eliminates_and_revoke_restores() {
        let mut p = Player::new("A");
        p.add_loss(Uuid::new_v4(), Some(2));
        assert!(!p.eliminated);
        p.add_loss(Uuid::new_v4(), Some(2));
        assert!(p.eliminated);
        p.revoke_loss(Some(2));
        assert!(!p.eliminated);
        assert_eq!(p.losses, 1);
        assert_eq!(p.opponents.len(), 1);
    }

    #[test]
    fn no_threshold_never_eliminates() {
        let mut p = Player::new("A");
        for _ in 0..5 {
            p.add_loss(Uuid::new_v4(), None);
        }
        assert!(!p.eliminated);
        assert!(p.is_active(None));
    }

    #[test]
    fn eliminated_flag_ignored_without_threshold() {
        let mut p = Player::new("A");
        p.eliminated = true;
        assert!(!p.is_active(Some(2)));
        assert!(p.is_active(None));
        p.dropped = true;
        assert!(!p.is_active(None));
    }

    #[test]
    fn standing_serializes_camel_case() {
        let p = Player::new("A");
        let json = serde_json::to_value(p.standing(1)).unwrap();
        assert_eq!(json["playerId"], serde_json::Value::from(p.id.to_string()));
        assert!(json.get("player_id").is_none());
    }
}
