//! Integration test: FileBalanceStore persistence across reopen

use std::path::PathBuf;
use std::sync::Arc;

use chrono::{Duration, TimeZone, Utc};
use rust_decimal_macros::dec;
use tally_clock::ManualClock;
use tally_core::{StoredBalanceRow, Timestamp};
use tally_ports::{BalanceStore, StoreError};
use tally_storage::FileBalanceStore;

fn temp_path(name: &str) -> PathBuf {
    let path = std::env::temp_dir().join(format!(
        "tally-storage-{}-{}.jsonl",
        std::process::id(),
        name
    ));
    let _ = std::fs::remove_file(&path);
    path
}

fn noon() -> Timestamp {
    Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
}

fn row(currency: &str, time: Timestamp) -> StoredBalanceRow {
    StoredBalanceRow {
        exchange: "bittrex".to_string(),
        currency: currency.to_string(),
        amount: dec!(2000),
        base_unit_amount: dec!(20000),
        base_unit_rate: dec!(10),
        stable_unit_amount: dec!(153.846),
        time,
    }
}

fn clock() -> Arc<ManualClock> {
    Arc::new(ManualClock::at(noon()))
}

#[tokio::test]
async fn test_rows_survive_reopen() {
    let _ = env_logger::try_init();
    let path = temp_path("reopen");

    {
        let store = FileBalanceStore::open(&path, clock()).await.unwrap();
        store
            .save(&[
                row("total", noon() - Duration::minutes(5)),
                row("CUR1", noon() - Duration::minutes(5)),
            ])
            .await
            .unwrap();
        store
            .save(&[row("total", noon()), row("CUR1", noon())])
            .await
            .unwrap();
    }

    let reopened = FileBalanceStore::open(&path, clock()).await.unwrap();
    let all = reopened.fetch_all("CUR1").await.unwrap();
    assert_eq!(all.len(), 2);
    assert_eq!(all[0].time, noon());
    assert_eq!(all[0].amount, dec!(2000));

    let active = reopened.active_currencies().await.unwrap();
    assert_eq!(active.len(), 2);
    assert!(active[0].is_total());

    // Appends after reopen land after the replayed rows
    reopened
        .save(&[row("CUR1", noon() + Duration::minutes(5))])
        .await
        .unwrap();
    drop(reopened);

    let again = FileBalanceStore::open(&path, clock()).await.unwrap();
    assert_eq!(again.fetch_all("CUR1").await.unwrap().len(), 3);

    let _ = std::fs::remove_file(&path);
}

#[tokio::test]
async fn test_missing_file_is_created_empty() {
    let path = temp_path("fresh");

    let store = FileBalanceStore::open(&path, clock()).await.unwrap();
    assert!(path.exists());
    assert!(store.fetch_all("BTC").await.unwrap().is_empty());
    assert!(matches!(
        store.active_currencies().await,
        Err(StoreError::NoDataFound)
    ));

    let _ = std::fs::remove_file(&path);
}

#[tokio::test]
async fn test_corrupt_file_fails_open() {
    let path = temp_path("corrupt");
    let good = serde_json::to_string(&row("BTC", noon())).unwrap();
    std::fs::write(&path, format!("{}\nnot json\n", good)).unwrap();

    match FileBalanceStore::open(&path, clock()).await {
        Err(StoreError::Corrupt { line, .. }) => assert_eq!(line, 2),
        Err(other) => panic!("expected corrupt line, got {}", other),
        Ok(_) => panic!("expected corrupt line, got a store"),
    }

    let _ = std::fs::remove_file(&path);
}

#[tokio::test]
async fn test_unterminated_last_row_survives_next_save() {
    let path = temp_path("unterminated");
    let last = serde_json::to_string(&row("BTC", noon())).unwrap();
    std::fs::write(&path, &last).unwrap();

    let store = FileBalanceStore::open(&path, clock()).await.unwrap();
    assert_eq!(store.fetch_all("BTC").await.unwrap().len(), 1);
    store.save(&[row("CUR1", noon())]).await.unwrap();
    drop(store);

    let reopened = FileBalanceStore::open(&path, clock()).await.unwrap();
    assert_eq!(reopened.fetch_all("BTC").await.unwrap().len(), 1);
    assert_eq!(reopened.fetch_all("CUR1").await.unwrap().len(), 1);
    assert_eq!(std::fs::read_to_string(&path).unwrap().lines().count(), 2);

    let _ = std::fs::remove_file(&path);
}

#[tokio::test]
async fn test_torn_final_line_is_discarded() {
    let path = temp_path("torn");
    let good = serde_json::to_string(&row("BTC", noon())).unwrap();
    let torn = &good[..good.len() / 2];
    std::fs::write(&path, format!("{}\n{}", good, torn)).unwrap();

    let store = FileBalanceStore::open(&path, clock()).await.unwrap();
    assert_eq!(store.fetch_all("BTC").await.unwrap().len(), 1);
    store.save(&[row("CUR1", noon())]).await.unwrap();
    drop(store);

    let reopened = FileBalanceStore::open(&path, clock()).await.unwrap();
    assert_eq!(reopened.fetch_all("BTC").await.unwrap().len(), 1);
    assert_eq!(reopened.fetch_all("CUR1").await.unwrap().len(), 1);

    let _ = std::fs::remove_file(&path);
}
