//! Unit tests for the lesson flow
//!
//! Tests cover:
//! - The full journey from landing to a scored quiz
//! - Guarded operations on the wrong screen
//! - Teardown when leaving screens
//! - Progress writes along the way

use codeflux::content::PatternStore;
use codeflux::errors::{CodefluxError, FlowError};
use codeflux::lesson::{Action, FlowSettings, LessonFlow, Screen, Tick};
use codeflux::progress::{KeyValueStore, MemoryStore, ProgressStatus, ProgressTracker};
use codeflux::quiz::{FeedbackTier, QuizOutcome, SequenceChooser};
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver};

fn bundled_flow(store: Arc<MemoryStore>) -> (LessonFlow, UnboundedReceiver<Tick>) {
    let report = PatternStore::load_with_dir(None);
    let (tx, rx) = unbounded_channel();
    let flow = LessonFlow::new(
        Arc::new(report.store),
        ProgressTracker::new(store),
        FlowSettings::default(),
        tx,
        Box::new(SequenceChooser::new(vec![3, 0, 1])),
    );
    (flow, rx)
}

fn open_input(flow: &mut LessonFlow, id: &str) {
    flow.advance().unwrap();
    flow.select_pattern(id).unwrap();
    flow.advance().unwrap();
    flow.advance().unwrap();
    assert_eq!(flow.screen(), Screen::Input);
}

#[test]
fn test_transition_table_is_complete() {
    for screen in Screen::ALL {
        for action in [Action::Advance, Action::Back, Action::Retake] {
            let _ = screen.transition(action);
        }
        if screen != Screen::Patterns {
            assert!(
                screen.transition(Action::Advance).is_some() || screen == Screen::Quiz,
                "{} has no way forward",
                screen
            );
        }
        assert!(screen.transition(Action::Back).is_some(), "{} has no way back", screen);
    }
    assert_eq!(Screen::Quiz.transition(Action::Retake), Some(Screen::Post));
    assert_eq!(Screen::Post.transition(Action::Retake), None);
}

#[test]
fn test_full_journey_records_progress_and_score() {
    let store = Arc::new(MemoryStore::new());
    let (mut flow, _rx) = bundled_flow(store.clone());
    let tracker = ProgressTracker::new(store.clone());

    open_input(&mut flow, "slidingWindow");
    assert!(flow.inputs().iter().any(|f| f.name == "k"));
    flow.set_input("k", "2").unwrap();
    assert_eq!(flow.advance().unwrap(), Screen::Visualization);
    assert_eq!(flow.lesson_input().unwrap().window, 2);
    assert_eq!(tracker.progress("slidingWindow").unwrap(), ProgressStatus::InProgress);

    let steps = flow.pattern().unwrap().step_count();
    for _ in 1..steps {
        assert!(flow.manual_next().unwrap().is_none());
    }
    assert!(flow.manual_next().unwrap().is_some());
    assert_eq!(tracker.progress("slidingWindow").unwrap(), ProgressStatus::Completed);
    assert_eq!(flow.screen(), Screen::Visualization);

    assert_eq!(flow.advance().unwrap(), Screen::Post);
    assert_eq!(flow.advance().unwrap(), Screen::Quiz);

    let questions = flow.quiz().unwrap().questions().to_vec();
    assert_eq!(questions.len(), 3);
    let prompts: HashSet<_> = questions.iter().map(|q| q.prompt.clone()).collect();
    assert_eq!(prompts.len(), 3);

    for (i, question) in questions.iter().enumerate() {
        flow.select_answer(i, question.correct).unwrap();
    }
    match flow.submit_quiz().unwrap() {
        QuizOutcome::Scored(score) => {
            assert_eq!(score.to_string(), "3/3");
            assert_eq!(score.tier, FeedbackTier::Perfect);
        }
        other => panic!("unexpected outcome {:?}", other),
    }
    assert_eq!(
        store.get("pattern_quiz_score_slidingWindow").unwrap().as_deref(),
        Some("3/3")
    );
}

#[test]
fn test_incomplete_quiz_writes_nothing() {
    let store = Arc::new(MemoryStore::new());
    let (mut flow, _rx) = bundled_flow(store.clone());
    open_input(&mut flow, "twoPointers");
    flow.advance().unwrap();
    flow.advance().unwrap();
    flow.advance().unwrap();
    assert_eq!(flow.screen(), Screen::Quiz);

    flow.select_answer(0, 0).unwrap();
    let outcome = flow.submit_quiz().unwrap();
    assert!(matches!(outcome, QuizOutcome::NeedsAllAnswers { .. }));
    assert_eq!(store.get("pattern_quiz_score_twoPointers").unwrap(), None);
    assert_eq!(
        store.get("pattern_progress_twoPointers").unwrap().as_deref(),
        Some("in-progress")
    );
}

#[test]
fn test_operations_on_wrong_screen_are_rejected() {
    let (mut flow, _rx) = bundled_flow(Arc::new(MemoryStore::new()));

    assert!(matches!(
        flow.select_pattern("slidingWindow"),
        Err(CodefluxError::Flow(FlowError::InvalidTransition { .. }))
    ));
    assert!(flow.set_input("k", "3").is_err());
    assert!(flow.manual_next().is_err());
    assert!(flow.submit_quiz().is_err());
    assert!(flow.retake().is_err());

    flow.advance().unwrap();
    assert!(flow.advance().is_err());
    assert!(matches!(
        flow.select_pattern("nope"),
        Err(CodefluxError::Flow(FlowError::UnknownPattern(_)))
    ));
    assert_eq!(flow.screen(), Screen::Patterns);
}

#[test]
fn test_unknown_input_field() {
    let (mut flow, _rx) = bundled_flow(Arc::new(MemoryStore::new()));
    open_input(&mut flow, "slidingWindow");
    assert_eq!(
        flow.set_input("colour", "red"),
        Err(FlowError::UnknownField("colour".into()))
    );
}

#[test]
fn test_leaving_visualization_drops_animator() {
    let (mut flow, _rx) = bundled_flow(Arc::new(MemoryStore::new()));
    open_input(&mut flow, "slidingWindow");
    flow.advance().unwrap();
    flow.manual_next().unwrap();
    assert_eq!(flow.animator().unwrap().step_index(), 1);

    assert_eq!(flow.back().unwrap(), Screen::Input);
    assert!(flow.animator().is_none());

    flow.advance().unwrap();
    assert_eq!(flow.animator().unwrap().step_index(), 0);
}

#[test]
fn test_reentering_input_marks_in_progress_again() {
    let store = Arc::new(MemoryStore::new());
    let tracker = ProgressTracker::new(store.clone());
    tracker
        .set_progress("fastSlowPointers", ProgressStatus::Completed)
        .unwrap();

    let (mut flow, _rx) = bundled_flow(store);
    open_input(&mut flow, "fastSlowPointers");
    flow.advance().unwrap();
    assert_eq!(
        tracker.progress("fastSlowPointers").unwrap(),
        ProgressStatus::InProgress
    );
}

#[test]
fn test_malformed_input_is_corrected_not_fatal() {
    let (mut flow, _rx) = bundled_flow(Arc::new(MemoryStore::new()));
    open_input(&mut flow, "slidingWindow");
    flow.set_input("array", "1, two, 3").unwrap();
    flow.set_input("k", "-4").unwrap();
    flow.advance().unwrap();

    let input = flow.lesson_input().unwrap();
    assert!(input.array.is_empty());
    assert_eq!(input.window, 1);
    assert_eq!(input.issues.len(), 2);
}

#[test]
fn test_back_from_overview_clears_pattern() {
    let (mut flow, _rx) = bundled_flow(Arc::new(MemoryStore::new()));
    flow.advance().unwrap();
    flow.select_pattern("twoPointers").unwrap();
    assert!(flow.pattern().is_some());
    assert_eq!(flow.back().unwrap(), Screen::Patterns);
    assert!(flow.pattern().is_none());
    assert!(flow.inputs().is_empty());
}

#[test]
fn test_retake_draws_a_fresh_quiz() {
    let (mut flow, _rx) = bundled_flow(Arc::new(MemoryStore::new()));
    open_input(&mut flow, "slidingWindow");
    flow.advance().unwrap();
    flow.advance().unwrap();
    flow.advance().unwrap();
    flow.select_answer(0, 0).unwrap();

    assert_eq!(flow.retake().unwrap(), Screen::Post);
    assert!(flow.quiz().is_none());
    flow.advance().unwrap();
    let quiz = flow.quiz().unwrap();
    assert!(quiz.selections().iter().all(Option::is_none));
    assert!(!quiz.is_submitted());
}
