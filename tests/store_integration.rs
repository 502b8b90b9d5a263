//! Integration tests for the on-disk quote store.

use quote_radar_core::{Database, QuoteStore};
use tempfile::TempDir;

#[tokio::test]
async fn test_store_round_trip_on_disk() {
    let temp_dir = TempDir::new().expect("failed to create temp dir");
    let db_path = temp_dir.path().join("quotes.db");

    let db = Database::new(&db_path).await.expect("database should open");
    let store = QuoteStore::new(db.clone());
    store
        .save("example.com", "A quote of sufficient length.")
        .await
        .expect("save should succeed");

    let records = store.recent(1).await.expect("recent should succeed");
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].website, "example.com");
    assert_eq!(records[0].quote, "A quote of sufficient length.");
    assert!(records[0].is_new);
    db.close().await;
}

#[tokio::test]
async fn test_reopening_database_keeps_rows() {
    let temp_dir = TempDir::new().expect("failed to create temp dir");
    let db_path = temp_dir.path().join("quotes.db");

    {
        let db = Database::new(&db_path).await.expect("first open");
        let store = QuoteStore::new(db.clone());
        store.save("first.com", "first quote text").await.unwrap();
        store.save("second.com", "second quote text").await.unwrap();
        db.close().await;
    }

    // Schema initialization runs again on every open.
    for _ in 0..2 {
        let db = Database::new(&db_path).await.expect("reopen");
        let store = QuoteStore::new(db.clone());
        assert_eq!(store.count().await.unwrap(), 2);
        db.close().await;
    }

    let db = Database::new(&db_path).await.expect("final open");
    let store = QuoteStore::new(db.clone());
    let websites: Vec<_> = store
        .recent(10)
        .await
        .unwrap()
        .into_iter()
        .map(|r| r.website)
        .collect();
    assert_eq!(websites, vec!["second.com", "first.com"]);
    db.close().await;
}

#[tokio::test]
async fn test_concurrent_saves_all_persist() {
    let temp_dir = TempDir::new().expect("failed to create temp dir");
    let db = Database::new(&temp_dir.path().join("quotes.db"))
        .await
        .expect("database should open");
    let store = QuoteStore::new(db.clone());

    let mut handles = Vec::new();
    for i in 0..10 {
        let store = store.clone();
        handles.push(tokio::spawn(async move {
            store
                .save(&format!("site{i}.com"), "a quote from a concurrent task")
                .await
        }));
    }
    for handle in handles {
        handle.await.expect("task panicked").expect("save failed");
    }

    assert_eq!(store.count().await.unwrap(), 10);
    db.close().await;
}
