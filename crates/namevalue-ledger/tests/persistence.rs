//! Ledger persistence through the file-backed store.
//!
//! Each test opens a ledger over a temporary directory, drops it, and opens
//! a second ledger over the same directory to simulate a restart.

#![allow(
    clippy::expect_used,
    clippy::unwrap_used,
    clippy::indexing_slicing,
    clippy::missing_panics_doc
)]

use namevalue_db::{FileStore, KvStore, PARTICIPANTS_KEY};
use namevalue_ledger::{LeaderboardView, LedgerError, MatchPolicy, PointLedger};
use namevalue_types::Window;
use tempfile::TempDir;

async fn open(dir: &TempDir) -> PointLedger {
    let store = FileStore::open(dir.path())
        .await
        .expect("failed to open file store");
    PointLedger::new(KvStore::File(store), MatchPolicy::PermissiveName)
}

#[tokio::test]
async fn scores_survive_restart() {
    let dir = TempDir::new().unwrap();
    {
        let ledger = open(&dir).await;
        ledger.apply_gift("u1", "Jean", 10).await;
        ledger.apply_gift("u2", "Marie", 40).await;
        ledger.assign_country("u1", None, "MA").await;
    }

    let ledger = open(&dir).await;
    let participants = ledger.load().await;
    assert_eq!(participants.len(), 2);
    assert_eq!(participants[0].country_code.as_deref(), Some("MA"));
    assert_eq!(participants[1].points_year, 40);

    let view = LeaderboardView::project(&participants, 15, 8);
    let live: Vec<&str> = view
        .window(Window::Live)
        .iter()
        .map(|p| p.display_name.as_str())
        .collect();
    assert_eq!(live, ["Marie", "Jean"]);
    assert_eq!(view.countries[0].country_code, "MA");
}

#[tokio::test]
async fn export_import_round_trip_across_stores() {
    let source_dir = TempDir::new().unwrap();
    let source = open(&source_dir).await;
    source.apply_gift("u1", "Jean", 15).await;
    source.assign_country("u1", Some("Jean"), "FR").await;
    let doc = source.export().await.unwrap();

    let target_dir = TempDir::new().unwrap();
    let target = open(&target_dir).await;
    target.apply_gift("stale", "Old", 99).await;
    let imported = target.import(&doc.body).await.unwrap();

    assert_eq!(imported, source.load().await);
    assert_eq!(target.load().await, imported);
    assert!(doc.file_name.starts_with("que_vaut_ton_nom_backup_"));
}

#[tokio::test]
async fn rejected_import_leaves_ledger_untouched() {
    let dir = TempDir::new().unwrap();
    let ledger = open(&dir).await;
    ledger.apply_gift("u1", "Jean", 15).await;
    let before = ledger.load().await;

    let err = ledger.import(r#"{"participants": []}"#).await.unwrap_err();
    assert!(matches!(err, LedgerError::ImportFormatInvalid(_)));
    assert_eq!(ledger.load().await, before);
}

#[tokio::test]
async fn corrupt_file_loads_empty_and_is_overwritten() {
    let dir = TempDir::new().unwrap();
    let store = FileStore::open(dir.path()).await.unwrap();
    std::fs::write(store.path_for(PARTICIPANTS_KEY), b"\x00\x01 not json").unwrap();

    let ledger = open(&dir).await;
    assert!(ledger.load().await.is_empty());

    let participants = ledger.apply_gift("u1", "Jean", 1).await;
    let reopened = open(&dir).await;
    assert_eq!(reopened.load().await, participants);
}

#[tokio::test]
async fn session_record_tracks_writes() {
    let dir = TempDir::new().unwrap();
    let ledger = open(&dir).await;

    let mut session = ledger.session().await;
    assert!(session.simulator_mode);
    session.last_user = "Yasmine".into();
    session.last_country = "Tunisie".into();
    ledger.save_session(&session).await;
    ledger.apply_gift("u1", "Jean", 1).await;

    let reopened = open(&dir).await.session().await;
    assert_eq!(reopened.last_user, "Yasmine");
    assert_eq!(reopened.last_country, "Tunisie");
    assert!(reopened.last_active >= session.last_active);
}
