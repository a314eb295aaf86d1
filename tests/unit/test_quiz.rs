//! Unit tests for quiz drawing and scoring

use codeflux::quiz::{
    draw_questions, evaluate, fallback_questions, FeedbackTier, Question, QuizOutcome, QuizScore,
    QuizSession, RandomChooser, SequenceChooser,
};
use std::collections::HashSet;

fn pool() -> Vec<Question> {
    vec![
        Question::new("Q1", &["a", "b", "c"], 1),
        Question::new("Q2", &["a", "b"], 0),
        Question::new("Q3", &["a", "b", "c", "d"], 2),
        Question::new("Q4", &["a", "b"], 1),
    ]
}

#[test]
fn test_feedback_tiers() {
    assert_eq!(FeedbackTier::for_score(3, 3), FeedbackTier::Perfect);
    assert_eq!(FeedbackTier::for_score(7, 10), FeedbackTier::Good);
    assert_eq!(FeedbackTier::for_score(2, 3), FeedbackTier::KeepPracticing);
    assert_eq!(FeedbackTier::for_score(0, 3), FeedbackTier::KeepPracticing);
}

#[test]
fn test_evaluate_scores_only_full_answers() {
    let questions = pool();
    let outcome = evaluate(&questions, &[Some(1), None, Some(2), None]);
    assert_eq!(
        outcome,
        QuizOutcome::NeedsAllAnswers {
            missing: vec![1, 3]
        }
    );

    let outcome = evaluate(&questions, &[Some(1), Some(0), Some(0), Some(1)]);
    assert_eq!(outcome, QuizOutcome::Scored(QuizScore::new(3, 4)));
    assert!(outcome.feedback().contains("3/4"));
}

#[test]
fn test_draw_is_distinct_and_bounded() {
    let questions = pool();
    for seed in 0..20 {
        let drawn = draw_questions(&questions, 3, &mut RandomChooser::seeded(seed));
        assert_eq!(drawn.len(), 3);
        let prompts: HashSet<_> = drawn.iter().map(|q| q.prompt.as_str()).collect();
        assert_eq!(prompts.len(), 3);
    }

    let drawn = draw_questions(&questions, 10, &mut RandomChooser::seeded(1));
    assert_eq!(drawn.len(), 4);
    assert!(draw_questions(&[], 3, &mut RandomChooser::seeded(1)).is_empty());
}

#[test]
fn test_sequence_chooser_is_deterministic() {
    let drawn = draw_questions(&pool(), 2, &mut SequenceChooser::new(vec![3, 0]));
    let prompts: Vec<_> = drawn.iter().map(|q| q.prompt.as_str()).collect();
    assert_eq!(prompts, vec!["Q4", "Q1"]);
}

#[test]
fn test_session_rejects_bad_option() {
    let mut session = QuizSession::new(pool());
    assert!(session.select(0, 3).is_err());
    assert!(session.select(9, 0).is_err());
    assert!(session.select(0, 2).is_ok());
    assert_eq!(session.selections()[0], Some(2));
}

#[test]
fn test_session_submit_and_feedback() {
    let mut session = QuizSession::new(pool()[..2].to_vec());
    assert!(session.feedback().is_none());
    session.select(0, 1).unwrap();
    session.select(1, 1).unwrap();
    let outcome = session.submit();
    assert_eq!(outcome, QuizOutcome::Scored(QuizScore::new(1, 2)));
    assert!(session.is_submitted());
    assert!(session.feedback().unwrap().contains("1/2"));
}

#[test]
fn test_fallback_questions_mention_pattern() {
    let questions = fallback_questions("Prefix Sum");
    assert!(!questions.is_empty());
    assert!(questions[0].prompt.contains("Prefix Sum"));
    assert!(questions.iter().all(|q| q.correct < q.options.len()));
}

#[test]
fn test_question_accepts_legacy_field_names() {
    let question: Question = serde_json::from_str(
        r#"{ "question": "Which?", "options": ["x", "y"], "answer": 1 }"#,
    )
    .unwrap();
    assert_eq!(question.prompt, "Which?");
    assert_eq!(question.correct, 1);
}
