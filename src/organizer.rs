//! Organizer: the single owned handle around a tournament, its undo history, rng and notices.

use crate::logic::{self, History, RoundStart};
use crate::models::{
    GameMatch, MatchId, Outcome, Phase, Player, PlayerId, Standing, Tournament, TournamentConfig,
    TournamentError,
};
use crate::persistence;
use rand::rngs::StdRng;
use rand::SeedableRng;

/// Callback for notable but non-fatal events (rejected names, repeat byes, forced rematches,
/// load failures).
pub type Notifier = Box<dyn Fn(&str) + Send + Sync>;

pub struct Organizer {
    state: Tournament,
    history: History,
    rng: StdRng,
    notifier: Option<Notifier>,
}

impl Organizer {
    /// New tournament in Setup, shuffling with an entropy-seeded rng.
    pub fn new(config: TournamentConfig) -> Self {
        Self::with_rng(config, StdRng::from_entropy())
    }

    /// Reproducible pairings for a given seed.
    pub fn with_seed(config: TournamentConfig, seed: u64) -> Self {
        Self::with_rng(config, StdRng::seed_from_u64(seed))
    }

    pub fn with_rng(config: TournamentConfig, rng: StdRng) -> Self {
        Self {
            state: Tournament::new(config),
            history: History::new(),
            rng,
            notifier: None,
        }
    }

    /// Install the notification callback.
    pub fn on_notice(mut self, notifier: impl Fn(&str) + Send + Sync + 'static) -> Self {
        self.notifier = Some(Box::new(notifier));
        self
    }

    pub fn tournament(&self) -> &Tournament {
        &self.state
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn phase(&self) -> Phase {
        self.state.phase
    }

    pub fn players(&self) -> &[Player] {
        &self.state.players
    }

    pub fn player(&self, id: PlayerId) -> Option<&Player> {
        self.state.player(id)
    }

    pub fn matches(&self) -> &[GameMatch] {
        &self.state.matches
    }

    pub fn current_round(&self) -> u32 {
        self.state.current_round
    }

    pub fn total_rounds(&self) -> u32 {
        self.state.total_rounds()
    }

    pub fn is_round_complete(&self) -> bool {
        self.state.is_round_complete()
    }

    pub fn standings(&self) -> Vec<Standing> {
        self.state.standings()
    }

    pub fn champion(&self) -> Option<&Player> {
        self.state.champion()
    }

    pub fn can_undo(&self) -> bool {
        !self.history.is_empty()
    }

    fn notify(&self, message: &str) {
        log::warn!("{}", message);
        if let Some(notifier) = &self.notifier {
            notifier(message);
        }
    }

    fn player_name(&self, id: PlayerId) -> String {
        self.state
            .player(id)
            .map(|p| p.name.clone())
            .unwrap_or_else(|| id.to_string())
    }

    /// Run `op` on the live state and push the prior state onto the history.
    /// On error the live state is put back and nothing is pushed.
    fn transition<T>(
        &mut self,
        op: impl FnOnce(&mut Tournament, &mut StdRng) -> Result<T, TournamentError>,
    ) -> Result<T, TournamentError> {
        let before = self.state.clone();
        match op(&mut self.state, &mut self.rng) {
            Ok(value) => {
                self.history.push(before);
                Ok(value)
            }
            Err(e) => {
                self.state = before;
                Err(e)
            }
        }
    }

    /// Register a player. During play this is a late entry and can be undone.
    pub fn add_player(&mut self, name: &str) -> Result<PlayerId, TournamentError> {
        let result = if self.state.phase == Phase::InProgress {
            self.transition(|t, _| t.add_player(name))
        } else {
            self.state.add_player(name)
        };
        if let Err(TournamentError::DuplicateName(name)) = &result {
            self.notify(&format!("Player {name:?} is already registered"));
        }
        result
    }

    pub fn remove_player(&mut self, id: PlayerId) -> Result<(), TournamentError> {
        self.state.remove_player(id)
    }

    /// Withdraw a player from future rounds. Dropping twice is a no-op.
    pub fn drop_player(&mut self, id: PlayerId) -> Result<(), TournamentError> {
        if self.state.phase == Phase::InProgress && self.state.player(id).is_some_and(|p| p.dropped) {
            return Ok(());
        }
        self.transition(|t, _| t.drop_player(id))
    }

    pub fn set_elimination_threshold(&mut self, threshold: Option<u32>) -> Result<(), TournamentError> {
        self.state.set_elimination_threshold(threshold)
    }

    pub fn set_snapshot_each_result(&mut self, enabled: bool) -> Result<(), TournamentError> {
        self.state.set_snapshot_each_result(enabled)
    }

    /// Setup -> InProgress, pairing round 1.
    pub fn start(&mut self) -> Result<RoundStart, TournamentError> {
        let start = self.transition(|t, rng| logic::start_tournament(t, rng))?;
        self.report(&start);
        Ok(start)
    }

    /// Once every match has a result: pair the next round or finish.
    pub fn advance_round(&mut self) -> Result<RoundStart, TournamentError> {
        let start = self.transition(|t, rng| logic::advance_round(t, rng))?;
        self.report(&start);
        Ok(start)
    }

    pub fn record_result(&mut self, match_id: MatchId, outcome: Outcome) -> Result<(), TournamentError> {
        if self.state.config.snapshot_each_result {
            self.transition(|t, _| logic::record_result(t, match_id, outcome))
        } else {
            logic::record_result(&mut self.state, match_id, outcome)
        }
    }

    /// Clear a recorded result. Snapshotted like `record_result` when `snapshot_each_result` is set.
    pub fn undo_result(&mut self, match_id: MatchId) -> Result<(), TournamentError> {
        if self.state.config.snapshot_each_result {
            self.transition(|t, _| logic::undo_result(t, match_id))
        } else {
            logic::undo_result(&mut self.state, match_id)
        }
    }

    /// Restore the state from before the most recent snapshotted transition.
    pub fn undo(&mut self) -> Result<(), TournamentError> {
        self.history.undo(&mut self.state)?;
        log::debug!(
            "Undo: back to round {} ({:?}), {} snapshots left",
            self.state.current_round,
            self.state.phase,
            self.history.len()
        );
        Ok(())
    }

    /// Finished -> empty Setup; history is discarded.
    pub fn reset(&mut self) -> Result<(), TournamentError> {
        logic::reset_tournament(&mut self.state)?;
        self.history.clear();
        Ok(())
    }

    /// Serialize state and history into a portable JSON document.
    pub fn save(&self) -> Result<String, TournamentError> {
        persistence::serialize(&self.state, &self.history)
    }

    /// Replace state and history with a saved document. On failure nothing changes.
    pub fn load(&mut self, document: &str) -> Result<(), TournamentError> {
        match persistence::deserialize(document) {
            Ok((state, history)) => {
                self.state = state;
                self.history = history;
                log::info!(
                    "Loaded tournament {} at round {} ({:?})",
                    self.state.id,
                    self.state.current_round,
                    self.state.phase
                );
                Ok(())
            }
            Err(e) => {
                self.notify(&format!("Could not load tournament: {e}"));
                Err(e)
            }
        }
    }

    pub fn standings_csv(&self) -> Result<String, TournamentError> {
        persistence::standings_csv(&self.state)
    }

    fn report(&self, start: &RoundStart) {
        let RoundStart::Paired(report) = start else {
            return;
        };
        if let Some(bye) = report.bye.filter(|b| b.repeat) {
            self.notify(&format!(
                "Round {}: {} gets a second bye, every active player already had one",
                report.round,
                self.player_name(bye.player)
            ));
        }
        for (a, b) in &report.rematches {
            self.notify(&format!(
                "Round {}: forced rematch {} vs {}, no other pairing was possible",
                report.round,
                self.player_name(*a),
                self.player_name(*b)
            ));
        }
    }
}
