//! Portable JSON document for a whole tournament (state plus undo history), and CSV standings.

use crate::logic::History;
use crate::models::{Phase, Tournament, TournamentError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Format version written into every document.
pub const DOCUMENT_VERSION: u32 = 1;

fn default_version() -> u32 {
    DOCUMENT_VERSION
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct DocumentOut<'a> {
    version: u32,
    #[serde(flatten)]
    state: &'a Tournament,
    history: &'a History,
    date: DateTime<Utc>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct DocumentIn {
    #[serde(default = "default_version")]
    version: u32,
    #[serde(flatten)]
    state: Tournament,
    #[serde(default)]
    history: History,
}

/// Serialize state and history. `date` is informational and ignored on load.
pub fn serialize(state: &Tournament, history: &History) -> Result<String, TournamentError> {
    let doc = DocumentOut {
        version: DOCUMENT_VERSION,
        state,
        history,
        date: Utc::now(),
    };
    serde_json::to_string_pretty(&doc).map_err(|e| TournamentError::Export(e.to_string()))
}

/// Rebuild state and history. `players` and `currentRound` are required; the rest default.
pub fn deserialize(document: &str) -> Result<(Tournament, History), TournamentError> {
    let mut doc: DocumentIn = serde_json::from_str(document)
        .map_err(|e| TournamentError::MalformedDocument(e.to_string()))?;
    if doc.version > DOCUMENT_VERSION {
        return Err(TournamentError::MalformedDocument(format!(
            "unsupported document version {} (newest supported is {})",
            doc.version, DOCUMENT_VERSION
        )));
    }
    check_references(&doc.state)?;
    for snapshot in doc.history.snapshots() {
        check_references(snapshot)?;
    }
    backfill_entrants(&mut doc.state);
    let mut snapshots = doc.history.into_snapshots();
    snapshots.iter_mut().for_each(backfill_entrants);
    Ok((doc.state, History::from_snapshots(snapshots)))
}

/// Documents without `startingEntrants` fix the round count from the registered players.
fn backfill_entrants(state: &mut Tournament) {
    if state.phase != Phase::Setup && state.starting_entrants == 0 {
        state.starting_entrants = state.players.len();
    }
}

/// Every match must point at known players.
fn check_references(state: &Tournament) -> Result<(), TournamentError> {
    for m in &state.matches {
        for id in std::iter::once(m.player_1).chain(m.player_2) {
            if state.player(id).is_none() {
                return Err(TournamentError::MalformedDocument(format!(
                    "match {} references unknown player {}",
                    m.id, id
                )));
            }
        }
    }
    Ok(())
}

#[derive(Serialize)]
struct StandingRow<'a> {
    rank: usize,
    name: &'a str,
    points: u32,
    wins: u32,
    losses: u32,
    eliminated: bool,
    dropped: bool,
}

/// Standings as CSV: `rank,name,points,wins,losses,eliminated,dropped`.
pub fn standings_csv(state: &Tournament) -> Result<String, TournamentError> {
    let export_err = |e: csv::Error| TournamentError::Export(e.to_string());
    let mut wtr = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(Vec::new());
    wtr.write_record(["rank", "name", "points", "wins", "losses", "eliminated", "dropped"])
        .map_err(export_err)?;
    for s in state.standings() {
        wtr.serialize(StandingRow {
            rank: s.rank,
            name: &s.name,
            points: s.points,
            wins: s.wins,
            losses: s.losses,
            eliminated: s.eliminated,
            dropped: s.dropped,
        })
        .map_err(export_err)?;
    }
    let bytes = wtr
        .into_inner()
        .map_err(|e| TournamentError::Export(e.to_string()))?;
    String::from_utf8(bytes).map_err(|e| TournamentError::Export(e.to_string()))
}
