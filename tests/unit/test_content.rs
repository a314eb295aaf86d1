//! Unit tests for pattern content loading

use codeflux::content::{ContentSource, Difficulty, PatternStore, VisualKind};
use codeflux::errors::ContentError;
use std::fs;

#[test]
fn test_bundled_patterns_load_cleanly() {
    let report = PatternStore::load_with_dir(None);
    assert!(report.is_complete(), "failures: {:?}", report.failures);
    assert_eq!(
        report.store.ids(),
        vec!["fastSlowPointers", "slidingWindow", "twoPointers"]
    );

    let window = report.store.get("slidingWindow").unwrap();
    assert_eq!(window.name, "Sliding Window");
    assert_eq!(window.difficulty, Difficulty::Easy);
    assert_eq!(window.visual, VisualKind::Window);
    assert!(window.step_count() > 0);
    assert!(!window.quiz.is_empty());
    assert!(window.code.len() >= 2);
}

#[test]
fn test_every_bundled_step_points_inside_its_code() {
    let report = PatternStore::load_with_dir(None);
    for pattern in report.store.patterns() {
        let shortest = pattern.code.iter().map(|c| c.lines.len()).min().unwrap_or(0);
        for step in &pattern.steps {
            if let Some(line) = step.line {
                assert!(line < shortest, "{} step line {} out of range", pattern.id, line);
            }
        }
        for question in &pattern.quiz {
            assert!(question.correct < question.options.len(), "{}", pattern.id);
        }
    }
}

#[test]
fn test_content_dir_overrides_and_extends() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join("slidingWindow.json"),
        r#"{ "name": "Sliding Window (custom)", "steps": [{ "popup": "Only step" }] }"#,
    )
    .unwrap();
    fs::write(
        dir.path().join("prefixSum.json"),
        r#"{ "name": "Prefix Sum", "difficulty": "medium" }"#,
    )
    .unwrap();
    fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

    let report = PatternStore::load_with_dir(Some(dir.path()));
    assert!(report.is_complete());
    assert_eq!(report.store.len(), 4);
    assert_eq!(
        report.store.get("slidingWindow").unwrap().name,
        "Sliding Window (custom)"
    );
    assert_eq!(
        report.store.get("prefixSum").unwrap().difficulty,
        Difficulty::Medium
    );
}

#[test]
fn test_bad_record_is_reported_and_skipped() {
    let report = PatternStore::load_all(vec![
        ContentSource::new("good.json", r#"{ "name": "Good" }"#),
        ContentSource::new("bad.json", "{ not json"),
    ]);
    assert_eq!(report.store.ids(), vec!["good"]);
    assert_eq!(report.failures.len(), 1);
    assert!(matches!(report.failures[0], ContentError::Parse { .. }));
}

#[test]
fn test_missing_content_dir_keeps_bundled() {
    let report = PatternStore::load_with_dir(Some(std::path::Path::new(
        "/definitely/not/a/content/dir",
    )));
    assert_eq!(report.store.len(), 3);
    assert!(matches!(report.failures[0], ContentError::Read { .. }));
}

#[test]
fn test_video_asset_needs_file_on_disk() {
    let report = PatternStore::load_with_dir(None);
    let pattern = report.store.get("twoPointers").unwrap();
    let dir = tempfile::tempdir().unwrap();
    assert!(pattern.video_asset(Some(dir.path())).is_none());
    assert!(pattern.video_asset(None).is_none());

    let videos = dir.path().join("assets").join("videos");
    fs::create_dir_all(&videos).unwrap();
    fs::write(videos.join("twoPointers.mp4"), b"").unwrap();
    assert_eq!(
        pattern.video_asset(Some(dir.path())),
        Some(videos.join("twoPointers.mp4"))
    );
}
