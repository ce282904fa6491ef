//! Integration tests for saving, loading and exporting tournaments.

use pretty_assertions::assert_eq;
use serde_json::Value;
use std::sync::{Arc, Mutex};
use swiss_cutoff::persistence::{deserialize, DOCUMENT_VERSION};
use swiss_cutoff::{Organizer, Outcome, Phase, TournamentConfig, TournamentError};

fn mid_tournament() -> Organizer {
    let mut o = Organizer::with_seed(TournamentConfig::default(), 21);
    for name in ["Ann", "Bob", "Cid", "Dee", "Eve"] {
        o.add_player(name).unwrap();
    }
    o.start().unwrap();
    let ids: Vec<_> = o.matches().iter().filter(|m| !m.is_bye()).map(|m| m.id).collect();
    for id in &ids {
        o.record_result(*id, Outcome::Player1Win).unwrap();
    }
    o.advance_round().unwrap();
    let open = o.matches().iter().find(|m| !m.is_bye()).map(|m| m.id).unwrap();
    o.record_result(open, Outcome::DoubleLoss).unwrap();
    o
}

fn is_malformed(result: Result<(), TournamentError>) -> bool {
    matches!(result, Err(TournamentError::MalformedDocument(_)))
}

#[test]
fn round_trip_restores_state_and_history() {
    let o = mid_tournament();
    let doc = o.save().unwrap();

    let mut restored = Organizer::with_seed(TournamentConfig::points_only(), 0);
    restored.load(&doc).unwrap();
    assert_eq!(restored.tournament(), o.tournament());
    assert_eq!(restored.history(), o.history());
    assert_eq!(restored.standings(), o.standings());

    // Undo keeps working across the round trip.
    restored.undo().unwrap();
    assert_eq!(restored.current_round(), 1);
}

#[test]
fn round_trip_in_setup_and_after_finish() {
    let mut o = Organizer::with_seed(TournamentConfig::points_only(), 3);
    o.add_player("Ann").unwrap();
    o.add_player("Bob").unwrap();

    let mut restored = Organizer::with_seed(TournamentConfig::default(), 0);
    restored.load(&o.save().unwrap()).unwrap();
    assert_eq!(restored.tournament(), o.tournament());
    assert!(restored.history().is_empty());
    assert_eq!(restored.total_rounds(), 1);

    o.start().unwrap();
    let m = o.matches()[0].clone();
    o.record_result(m.id, Outcome::Player1Win).unwrap();
    o.advance_round().unwrap();
    assert_eq!(o.phase(), Phase::Finished);

    let mut restored = Organizer::with_seed(TournamentConfig::default(), 0);
    restored.load(&o.save().unwrap()).unwrap();
    assert_eq!(restored.tournament(), o.tournament());
    assert_eq!(restored.history(), o.history());
    assert_eq!(restored.champion().map(|p| p.id), Some(m.player_1));
    restored.undo().unwrap();
    assert_eq!(restored.phase(), Phase::InProgress);
}

#[test]
fn missing_starting_entrants_uses_registered_players() {
    let mut o = Organizer::with_seed(TournamentConfig::default(), 8);
    for i in 0..8 {
        o.add_player(&format!("P{i}")).unwrap();
    }
    o.start().unwrap();
    let mut doc: Value = serde_json::from_str(&o.save().unwrap()).unwrap();
    doc.as_object_mut().unwrap().remove("startingEntrants");
    for snapshot in doc["history"].as_array_mut().unwrap() {
        snapshot.as_object_mut().unwrap().remove("startingEntrants");
    }

    let mut restored = Organizer::with_seed(TournamentConfig::default(), 0);
    restored.load(&doc.to_string()).unwrap();
    assert_eq!(restored.total_rounds(), 3);
    assert_eq!(restored.tournament(), o.tournament());
    // The snapshot from before the start is still in Setup and keeps its zero.
    assert_eq!(restored.history(), o.history());

    let ids: Vec<_> = restored.matches().iter().map(|m| m.id).collect();
    for id in ids {
        restored.record_result(id, Outcome::Player1Win).unwrap();
    }
    restored.advance_round().unwrap();
    assert_eq!(restored.phase(), Phase::InProgress);
    assert_eq!(restored.current_round(), 2);
}

#[test]
fn document_has_expected_fields() {
    let doc: Value = serde_json::from_str(&mid_tournament().save().unwrap()).unwrap();
    for key in ["version", "id", "config", "players", "matches", "currentRound", "phase", "history", "date"] {
        assert!(doc.get(key).is_some(), "missing {key}");
    }
    assert_eq!(doc["version"], Value::from(DOCUMENT_VERSION));
    assert_eq!(doc["phase"], Value::from("inProgress"));
    assert_eq!(doc["history"].as_array().unwrap().len(), 2);
    assert_eq!(doc["players"][0]["name"], Value::from("Ann"));
}

#[test]
fn malformed_documents_are_rejected() {
    let mut o = Organizer::with_seed(TournamentConfig::default(), 0);
    assert!(is_malformed(o.load("not json")));
    assert!(is_malformed(o.load(r#"{"currentRound":0}"#)));
    assert!(is_malformed(o.load(r#"{"players":[]}"#)));
    assert!(is_malformed(o.load(r#"{"version":99,"players":[],"currentRound":0}"#)));
}

#[test]
fn minimal_document_fills_defaults() {
    let (state, history) = deserialize(r#"{"players":[],"currentRound":0}"#).unwrap();
    assert_eq!(state.phase, Phase::Setup);
    assert!(state.matches.is_empty());
    assert_eq!(state.config, TournamentConfig::default());
    assert!(history.is_empty());
}

#[test]
fn legacy_screen_field_is_understood() {
    let (state, _) = deserialize(r#"{"players":[],"currentRound":1,"screen":"tournament"}"#).unwrap();
    assert_eq!(state.phase, Phase::InProgress);
    assert_eq!(state.current_round, 1);
}

#[test]
fn match_with_unknown_player_is_rejected() {
    let mut doc: Value = serde_json::from_str(&mid_tournament().save().unwrap()).unwrap();
    doc["matches"][0]["player1"] = Value::from(uuid::Uuid::new_v4().to_string());
    assert!(matches!(
        deserialize(&doc.to_string()),
        Err(TournamentError::MalformedDocument(_))
    ));

    // Snapshots are checked too.
    let mut doc: Value = serde_json::from_str(&mid_tournament().save().unwrap()).unwrap();
    doc["history"][1]["matches"][0]["player1"] = Value::from(uuid::Uuid::new_v4().to_string());
    assert!(deserialize(&doc.to_string()).is_err());
}

#[test]
fn failed_load_notifies_and_keeps_state() {
    let notices = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&notices);
    let mut o = mid_tournament().on_notice(move |msg| sink.lock().unwrap().push(msg.to_string()));
    let before = o.tournament().clone();
    let history = o.history().clone();

    assert!(o.load("{").is_err());
    assert_eq!(o.tournament(), &before);
    assert_eq!(o.history(), &history);
    let notices = notices.lock().unwrap();
    assert_eq!(notices.len(), 1);
    assert!(notices[0].starts_with("Could not load tournament"));
}

#[test]
fn standings_export_as_csv() {
    let mut o = Organizer::with_seed(TournamentConfig::default(), 4);
    o.add_player("Ann").unwrap();
    o.add_player("Bob").unwrap();
    o.start().unwrap();
    let m = o.matches()[0].clone();
    o.record_result(m.id, Outcome::Player2Win).unwrap();
    let winner = o.player(m.player_2.unwrap()).unwrap().name.clone();
    let loser = o.player(m.player_1).unwrap().name.clone();

    let csv = o.standings_csv().unwrap();
    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(
        lines,
        vec![
            "rank,name,points,wins,losses,eliminated,dropped".to_string(),
            format!("1,{winner},3,1,0,false,false"),
            format!("2,{loser},0,0,1,false,false"),
        ]
    );
}
