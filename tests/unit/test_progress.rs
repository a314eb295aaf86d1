//! Unit tests for progress persistence

use codeflux::errors::StorageError;
use codeflux::progress::{
    FileStore, KeyValueStore, NoteDebouncer, ProgressStatus, ProgressTracker,
};
use codeflux::quiz::QuizScore;
use std::sync::Arc;
use std::time::{Duration, Instant};

#[test]
fn test_tracker_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("store.json");

    {
        let tracker = ProgressTracker::new(Arc::new(FileStore::open(&path).unwrap()));
        tracker
            .set_progress("slidingWindow", ProgressStatus::Completed)
            .unwrap();
        tracker.set_note("slidingWindow", "add right, drop left").unwrap();
        tracker
            .set_quiz_score("slidingWindow", &QuizScore::new(2, 3))
            .unwrap();
    }

    let tracker = ProgressTracker::new(Arc::new(FileStore::open(&path).unwrap()));
    assert_eq!(
        tracker.progress("slidingWindow").unwrap(),
        ProgressStatus::Completed
    );
    assert_eq!(tracker.note("slidingWindow").unwrap(), "add right, drop left");
    assert_eq!(
        tracker.quiz_score("slidingWindow").unwrap(),
        Some(QuizScore::new(2, 3))
    );
}

#[test]
fn test_store_uses_the_documented_keys() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("store.json");
    let store = Arc::new(FileStore::open(&path).unwrap());
    let tracker = ProgressTracker::new(store.clone());

    tracker
        .set_progress("twoPointers", ProgressStatus::InProgress)
        .unwrap();
    tracker
        .set_quiz_score("twoPointers", &QuizScore::new(3, 3))
        .unwrap();

    assert_eq!(
        store.get("pattern_progress_twoPointers").unwrap().as_deref(),
        Some("in-progress")
    );
    assert_eq!(
        store.get("pattern_quiz_score_twoPointers").unwrap().as_deref(),
        Some("3/3")
    );
    let raw = std::fs::read_to_string(&path).unwrap();
    assert!(raw.contains("pattern_progress_twoPointers"));
}

#[test]
fn test_unknown_values_read_as_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(FileStore::open(dir.path().join("store.json")).unwrap());
    store.set("pattern_progress_x", "half-done").unwrap();
    store.set("pattern_quiz_score_x", "lots").unwrap();

    let tracker = ProgressTracker::new(store);
    assert_eq!(tracker.progress("x").unwrap(), ProgressStatus::YetToStart);
    assert_eq!(tracker.quiz_score("x").unwrap(), None);
    assert_eq!(tracker.note("x").unwrap(), "");
}

#[test]
fn test_corrupted_store_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("store.json");
    std::fs::write(&path, "{ nope").unwrap();
    assert!(matches!(
        FileStore::open(&path),
        Err(StorageError::Corrupted { .. })
    ));
}

#[test]
fn test_snapshot_lists_every_pattern() {
    let dir = tempfile::tempdir().unwrap();
    let tracker = ProgressTracker::new(Arc::new(
        FileStore::open(dir.path().join("store.json")).unwrap(),
    ));
    tracker.set_note("b", "  ").unwrap();
    tracker.set_note("c", "remember the tortoise").unwrap();
    tracker.set_progress("c", ProgressStatus::Completed).unwrap();

    let rows = tracker.snapshot(&["a", "b", "c"]).unwrap();
    assert_eq!(rows.len(), 3);
    assert_eq!(rows[0].status, ProgressStatus::YetToStart);
    assert!(!rows[1].has_note);
    assert!(rows[2].has_note);
    assert_eq!(rows[2].status, ProgressStatus::Completed);
}

#[test]
fn test_debouncer_keeps_latest_text() {
    let mut debouncer = NoteDebouncer::new(Duration::from_millis(500));
    let start = Instant::now();

    assert!(debouncer.edit("a", "h", start).is_none());
    assert!(debouncer
        .edit("a", "hi", start + Duration::from_millis(300))
        .is_none());
    assert!(debouncer
        .take_due(start + Duration::from_millis(600))
        .is_none());

    let due = debouncer
        .take_due(start + Duration::from_millis(800))
        .unwrap();
    assert_eq!(due.pattern_id, "a");
    assert_eq!(due.text, "hi");
    assert!(!debouncer.is_pending());
}

#[test]
fn test_debouncer_flushes_on_pattern_switch() {
    let mut debouncer = NoteDebouncer::new(Duration::from_secs(10));
    let now = Instant::now();
    debouncer.edit("a", "first", now);
    let flushed = debouncer.edit("b", "second", now).unwrap();
    assert_eq!(flushed.pattern_id, "a");
    assert_eq!(debouncer.flush().unwrap().text, "second");
    assert!(debouncer.flush().is_none());
}
