//! Tournament, Phase and TournamentError.

use crate::models::config::TournamentConfig;
use crate::models::game::{GameMatch, MatchId, Outcome};
use crate::models::player::{Player, PlayerId, Standing};
use serde::{Deserialize, Serialize};
use std::cmp::Reverse;
use thiserror::Error;
use uuid::Uuid;

/// Errors that can occur during tournament operations. A failed operation leaves state untouched.
#[derive(Clone, Debug, Eq, PartialEq, Error)]
pub enum TournamentError {
    /// Player name is empty after trimming.
    #[error("Player name must not be empty")]
    InvalidName,
    /// A player with this name already exists (names are unique, case-sensitive).
    #[error("A player named {0:?} already exists")]
    DuplicateName(String),
    /// Saved document could not be read back.
    #[error("Malformed tournament document: {0}")]
    MalformedDocument(String),
    #[error("Match not found")]
    UnknownMatch(MatchId),
    #[error("Match already has a result")]
    AlreadyDecided(MatchId),
    #[error("Match has no result to undo")]
    NotDecided(MatchId),
    /// Byes can only be reversed by undoing the whole round.
    #[error("A bye cannot be edited")]
    ImmutableBye(MatchId),
    /// Tournament is not in a phase that allows this action.
    #[error("Action not allowed while tournament is {0:?}")]
    InvalidPhase(Phase),
    #[error("Nothing to undo")]
    EmptyHistory,
    #[error("Player not found")]
    PlayerNotFound(PlayerId),
    /// Need at least 2 players to start.
    #[error("Need at least 2 players to start")]
    NotEnoughPlayers,
    /// Not all matches in the current round have a result.
    #[error("Not all matches have a result")]
    RoundIncomplete,
    /// Only wins and double losses can be recorded.
    #[error("Cannot record {0:?} as a result")]
    InvalidOutcome(Outcome),
    #[error("Export failed: {0}")]
    Export(String),
}

/// Unique identifier for a tournament.
pub type TournamentId = Uuid;

/// Current phase of the tournament.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Phase {
    /// Registering players; not started.
    #[default]
    Setup,
    /// Rounds are being paired and played.
    #[serde(alias = "tournament")]
    InProgress,
    /// Final standings are fixed. Only `reset` leaves this phase.
    Finished,
}

/// Number of Swiss rounds for `entrants` players: `ceil(log2(entrants))`.
pub fn rounds_for(entrants: usize) -> u32 {
    entrants.max(1).next_power_of_two().trailing_zeros()
}

/// Full tournament state: players, current round's matches, and phase.
///
/// History snapshots are plain clones of this value.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tournament {
    #[serde(default = "Uuid::new_v4")]
    pub id: TournamentId,
    #[serde(default)]
    pub config: TournamentConfig,
    /// All entrants in registration order, including dropped and eliminated ones.
    pub players: Vec<Player>,
    /// Current round's matches.
    #[serde(default)]
    pub matches: Vec<GameMatch>,
    /// 0 in setup, then the number of the round being played.
    pub current_round: u32,
    /// Player count when the tournament started; fixes the round count.
    #[serde(default)]
    pub starting_entrants: usize,
    #[serde(default, alias = "screen")]
    pub phase: Phase,
}

impl Tournament {
    /// Create a new tournament in Setup with no players.
    pub fn new(config: TournamentConfig) -> Self {
        Self {
            id: Uuid::new_v4(),
            config,
            players: Vec::new(),
            matches: Vec::new(),
            current_round: 0,
            starting_entrants: 0,
            phase: Phase::Setup,
        }
    }

    /// Create a tournament with initial players. Still in Setup until started.
    pub fn with_players(players: Vec<Player>, config: TournamentConfig) -> Self {
        Self {
            players,
            ..Self::new(config)
        }
    }

    pub fn player(&self, id: PlayerId) -> Option<&Player> {
        self.players.iter().find(|p| p.id == id)
    }

    pub fn get_player_mut(&mut self, id: PlayerId) -> Option<&mut Player> {
        self.players.iter_mut().find(|p| p.id == id)
    }

    pub fn find_match(&self, id: MatchId) -> Option<&GameMatch> {
        self.matches.iter().find(|m| m.id == id)
    }

    pub fn player_by_name(&self, name: &str) -> Option<&Player> {
        self.players.iter().find(|p| p.name == name)
    }

    fn require_phase(&self, phase: Phase) -> Result<(), TournamentError> {
        if self.phase != phase {
            return Err(TournamentError::InvalidPhase(self.phase));
        }
        Ok(())
    }

    /// Add a player (Setup, or InProgress as a late entry). Names must be unique.
    pub fn add_player(&mut self, name: impl Into<String>) -> Result<PlayerId, TournamentError> {
        if self.phase == Phase::Finished {
            return Err(TournamentError::InvalidPhase(self.phase));
        }
        let name = name.into();
        let name_trimmed = name.trim();
        if name_trimmed.is_empty() {
            return Err(TournamentError::InvalidName);
        }
        if self.player_by_name(name_trimmed).is_some() {
            return Err(TournamentError::DuplicateName(name_trimmed.to_string()));
        }
        let player = Player::new(name_trimmed);
        let id = player.id;
        self.players.push(player);
        Ok(id)
    }

    /// Remove a player by id (only valid in Setup).
    pub fn remove_player(&mut self, player_id: PlayerId) -> Result<(), TournamentError> {
        self.require_phase(Phase::Setup)?;
        let idx = self
            .players
            .iter()
            .position(|p| p.id == player_id)
            .ok_or(TournamentError::PlayerNotFound(player_id))?;
        self.players.remove(idx);
        Ok(())
    }

    /// Withdraw a player (only valid InProgress). They keep their record but are no longer paired.
    pub fn drop_player(&mut self, player_id: PlayerId) -> Result<(), TournamentError> {
        self.require_phase(Phase::InProgress)?;
        self.get_player_mut(player_id)
            .ok_or(TournamentError::PlayerNotFound(player_id))?
            .dropped = true;
        Ok(())
    }

    /// Set losses before elimination, `None` to disable (only valid in Setup).
    pub fn set_elimination_threshold(&mut self, threshold: Option<u32>) -> Result<(), TournamentError> {
        self.require_phase(Phase::Setup)?;
        self.config.elimination_threshold = threshold;
        Ok(())
    }

    pub fn set_snapshot_each_result(&mut self, enabled: bool) -> Result<(), TournamentError> {
        self.require_phase(Phase::Setup)?;
        self.config.snapshot_each_result = enabled;
        Ok(())
    }

    /// Players eligible for the next pairing, in registration order.
    pub fn active_players(&self) -> Vec<&Player> {
        let threshold = self.config.elimination_threshold;
        self.players.iter().filter(|p| p.is_active(threshold)).collect()
    }

    /// Number of rounds to play, derived from the entrant count at start.
    pub fn total_rounds(&self) -> u32 {
        match self.phase {
            Phase::Setup => rounds_for(self.players.len()),
            Phase::InProgress | Phase::Finished => rounds_for(self.starting_entrants),
        }
    }

    /// True when every match of the current round has an outcome.
    pub fn is_round_complete(&self) -> bool {
        self.matches.iter().all(|m| m.outcome.is_decided())
    }

    /// Ranked by points desc, wins desc, losses asc; ties keep registration order.
    pub fn standings(&self) -> Vec<Standing> {
        let mut ranked: Vec<&Player> = self.players.iter().collect();
        ranked.sort_by_key(|p| (Reverse(p.points()), Reverse(p.wins), p.losses));
        ranked
            .into_iter()
            .enumerate()
            .map(|(i, p)| p.standing(i + 1))
            .collect()
    }

    /// Top of the standings, once the tournament is finished.
    pub fn champion(&self) -> Option<&Player> {
        if self.phase != Phase::Finished {
            return None;
        }
        let top = self.standings().into_iter().next()?;
        self.player(top.player_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rounds_are_ceil_log2() {
        assert_eq!(rounds_for(0), 0);
        assert_eq!(rounds_for(1), 0);
        assert_eq!(rounds_for(2), 1);
        assert_eq!(rounds_for(3), 2);
        assert_eq!(rounds_for(4), 2);
        assert_eq!(rounds_for(5), 3);
        assert_eq!(rounds_for(8), 3);
        assert_eq!(rounds_for(9), 4);
    }

    #[test]
    fn add_player_trims_and_rejects_duplicates() {
        let mut t = Tournament::new(TournamentConfig::default());
        t.add_player("  Yugi ").unwrap();
        assert_eq!(t.players[0].name, "Yugi");
        assert_eq!(
            t.add_player("Yugi"),
            Err(TournamentError::DuplicateName("Yugi".into()))
        );
        // Case-sensitive.
        assert!(t.add_player("yugi").is_ok());
        assert_eq!(t.add_player("   "), Err(TournamentError::InvalidName));
        assert_eq!(t.players.len(), 2);
    }

    #[test]
    fn duplicate_check_includes_dropped_players() {
        let mut t = Tournament::new(TournamentConfig::default());
        let id = t.add_player("Kaiba").unwrap();
        t.phase = Phase::InProgress;
        t.drop_player(id).unwrap();
        assert!(matches!(t.add_player("Kaiba"), Err(TournamentError::DuplicateName(_))));
    }

    #[test]
    fn remove_and_config_only_in_setup() {
        let mut t = Tournament::new(TournamentConfig::default());
        let id = t.add_player("A").unwrap();
        t.phase = Phase::InProgress;
        assert_eq!(t.remove_player(id), Err(TournamentError::InvalidPhase(Phase::InProgress)));
        assert_eq!(
            t.set_elimination_threshold(None),
            Err(TournamentError::InvalidPhase(Phase::InProgress))
        );
        t.phase = Phase::Setup;
        t.remove_player(id).unwrap();
        assert!(t.players.is_empty());
        assert_eq!(t.remove_player(id), Err(TournamentError::PlayerNotFound(id)));
    }

    #[test]
    fn standings_order_is_stable_on_ties() {
        let mut t = Tournament::new(TournamentConfig::default());
        for name in ["A", "B", "C", "D"] {
            t.add_player(name).unwrap();
        }
        t.players[1].wins = 1; // B
        t.players[2].wins = 1; // C
        t.players[2].losses = 1;
        let names: Vec<_> = t.standings().into_iter().map(|s| s.name).collect();
        assert_eq!(names, ["B", "C", "A", "D"]);
    }

    #[test]
    fn points_only_pairs_players_flagged_eliminated() {
        let mut t = Tournament::new(TournamentConfig::points_only());
        for name in ["A", "B", "C"] {
            t.add_player(name).unwrap();
        }
        t.players[0].eliminated = true;
        t.players[1].dropped = true;
        let names: Vec<_> = t.active_players().iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, ["A", "C"]);

        t.config.elimination_threshold = Some(1);
        let names: Vec<_> = t.active_players().iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, ["C"]);
    }

    #[test]
    fn phase_accepts_legacy_screen_value() {
        let phase: Phase = serde_json::from_str(r#""tournament""#).unwrap();
        assert_eq!(phase, Phase::InProgress);
    }
}
