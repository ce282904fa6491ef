//! History stack: whole-state snapshots for undo.

use crate::models::{Tournament, TournamentError};
use serde::{Deserialize, Serialize};

/// Snapshots of the tournament, oldest first. Each entry is an independent clone.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct History {
    snapshots: Vec<Tournament>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_snapshots(snapshots: Vec<Tournament>) -> Self {
        Self { snapshots }
    }

    /// Push a copy of `state`. Later changes to `state` never reach the stored copy.
    pub fn snapshot(&mut self, state: &Tournament) {
        self.push(state.clone());
    }

    pub fn push(&mut self, snapshot: Tournament) {
        self.snapshots.push(snapshot);
    }

    /// Pop the newest snapshot and put it in place of `state`, discarding the live value.
    pub fn undo(&mut self, state: &mut Tournament) -> Result<(), TournamentError> {
        let previous = self.snapshots.pop().ok_or(TournamentError::EmptyHistory)?;
        *state = previous;
        Ok(())
    }

    pub fn clear(&mut self) {
        self.snapshots.clear();
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    pub fn snapshots(&self) -> &[Tournament] {
        &self.snapshots
    }

    pub fn into_snapshots(self) -> Vec<Tournament> {
        self.snapshots
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TournamentConfig;

    #[test]
    fn undo_on_empty_history_fails_and_keeps_state() {
        let mut history = History::new();
        let mut state = Tournament::new(TournamentConfig::default());
        state.add_player("A").unwrap();
        let before = state.clone();
        assert_eq!(history.undo(&mut state), Err(TournamentError::EmptyHistory));
        assert_eq!(state, before);
    }

    #[test]
    fn snapshot_is_independent_of_live_state() {
        let mut history = History::new();
        let mut state = Tournament::new(TournamentConfig::default());
        state.add_player("A").unwrap();
        history.snapshot(&state);

        state.players[0].wins = 5;
        state.players[0].opponents.push(uuid::Uuid::new_v4());
        state.add_player("B").unwrap();

        assert_eq!(history.snapshots()[0].players.len(), 1);
        assert_eq!(history.snapshots()[0].players[0].wins, 0);
        history.undo(&mut state).unwrap();
        assert_eq!(state.players.len(), 1);
        assert!(state.players[0].opponents.is_empty());
        assert!(history.is_empty());
    }
}
