use super::BatchLogRepository;
use crate::domain::batch_log::BatchLogEntry;
use crate::repository::error::RepositoryError;
use chrono::{Duration, NaiveDate, NaiveDateTime};
use rusqlite::Connection;
use std::sync::{Arc, Mutex};

fn setup_test_db() -> Arc<Mutex<Connection>> {
    let conn = Connection::open_in_memory().unwrap();
    crate::db::configure_sqlite_connection(&conn).unwrap();
    Arc::new(Mutex::new(conn))
}

fn base_ts() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2025, 3, 1)
        .unwrap()
        .and_hms_milli_opt(8, 0, 0, 250)
        .unwrap()
}

fn make_entry(batch_id: &str, filename: &str, offset_secs: i64) -> BatchLogEntry {
    let started = base_ts() + Duration::seconds(offset_secs);
    BatchLogEntry {
        batch_id: batch_id.to_string(),
        filename: filename.to_string(),
        outcome: "PROCESSED".to_string(),
        division_factor: Some(4),
        skip_pattern: None,
        total_lines: 10,
        qualifying_lines: 8,
        runs_before: 2,
        runs_after: 3,
        split_count: 1,
        cache_status: Some("done".to_string()),
        archive_status: Some("done".to_string()),
        source_status: Some("done".to_string()),
        error_message: None,
        started_at: started,
        finished_at: started + Duration::milliseconds(40),
    }
}

#[test]
fn test_insert_and_find_by_id() {
    let repo = BatchLogRepository::new(setup_test_db());
    let entry = make_entry("b1", "a.imp", 0);

    assert_eq!(repo.insert(&entry).unwrap(), "b1");

    let found = repo.find_by_id("b1").unwrap().unwrap();
    assert_eq!(found, entry);
    assert!(repo.find_by_id("missing").unwrap().is_none());
}

#[test]
fn test_duplicate_batch_id_rejected() {
    let repo = BatchLogRepository::new(setup_test_db());
    let entry = make_entry("b1", "a.imp", 0);
    repo.insert(&entry).unwrap();

    let err = repo.insert(&entry).unwrap_err();
    assert!(matches!(err, RepositoryError::UniqueConstraintViolation(_)));
}

#[test]
fn test_list_recent_newest_first() {
    let repo = BatchLogRepository::new(setup_test_db());
    repo.insert(&make_entry("b1", "a.imp", 0)).unwrap();
    repo.insert(&make_entry("b2", "b.imp", 5)).unwrap();
    repo.insert(&make_entry("b3", "a.imp", 10)).unwrap();

    let recent = repo.list_recent(2).unwrap();
    let ids: Vec<&str> = recent.iter().map(|e| e.batch_id.as_str()).collect();
    assert_eq!(ids, vec!["b3", "b2"]);
}

#[test]
fn test_list_by_filename() {
    let repo = BatchLogRepository::new(setup_test_db());
    repo.insert(&make_entry("b1", "a.imp", 0)).unwrap();
    repo.insert(&make_entry("b2", "b.imp", 5)).unwrap();
    repo.insert(&make_entry("b3", "a.imp", 10)).unwrap();

    let entries = repo.list_by_filename("a.imp", 10).unwrap();
    let ids: Vec<&str> = entries.iter().map(|e| e.batch_id.as_str()).collect();
    assert_eq!(ids, vec!["b3", "b1"]);
}

#[test]
fn test_failed_entry_round_trip() {
    let repo = BatchLogRepository::new(setup_test_db());
    let entry = BatchLogEntry::failed(
        "b9",
        "bad.imp",
        "编码错误".to_string(),
        base_ts(),
        base_ts(),
    );
    repo.insert(&entry).unwrap();

    let found = repo.find_by_id("b9").unwrap().unwrap();
    assert_eq!(found.outcome, "FAILED");
    assert_eq!(found.error_message.as_deref(), Some("编码错误"));
    assert_eq!(found.division_factor, None);
    assert_eq!(repo.count_by_outcome("FAILED").unwrap(), 1);
    assert_eq!(repo.count_by_outcome("PROCESSED").unwrap(), 0);
}
