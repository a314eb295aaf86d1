//! Quiz Evaluation
//!
//! Scores multiple-choice answers and hands out canned feedback. Scoring is
//! a pure function of the questions and the learner's selections; drawing
//! questions goes through a [`QuestionChooser`] so tests can pin the order.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::errors::FlowError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    #[serde(alias = "question")]
    pub prompt: String,
    pub options: Vec<String>,
    /// Index into `options`
    #[serde(alias = "answer")]
    pub correct: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
}

impl Question {
    pub fn new(prompt: &str, options: &[&str], correct: usize) -> Self {
        Self {
            prompt: prompt.to_string(),
            options: options.iter().map(|o| o.to_string()).collect(),
            correct,
            explanation: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FeedbackTier {
    Perfect,
    Good,
    KeepPracticing,
}

impl FeedbackTier {
    /// 100% is perfect, 70% and up is good.
    pub fn for_score(score: usize, total: usize) -> Self {
        if score >= total {
            return FeedbackTier::Perfect;
        }
        if score * 10 >= total * 7 {
            FeedbackTier::Good
        } else {
            FeedbackTier::KeepPracticing
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            FeedbackTier::Perfect => "Perfect! You have mastered this pattern.",
            FeedbackTier::Good => "Good job! Review the steps you missed.",
            FeedbackTier::KeepPracticing => "Keep practicing. Replay the visualization and try again.",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizScore {
    pub score: usize,
    pub total: usize,
    pub tier: FeedbackTier,
}

impl QuizScore {
    pub fn new(score: usize, total: usize) -> Self {
        Self {
            score,
            total,
            tier: FeedbackTier::for_score(score, total),
        }
    }

    /// Parse the stored `"<score>/<total>"` form.
    pub fn parse(text: &str) -> Option<Self> {
        let (score, total) = text.trim().split_once('/')?;
        let score = score.trim().parse().ok()?;
        let total = total.trim().parse().ok()?;
        (score <= total).then(|| Self::new(score, total))
    }
}

impl fmt::Display for QuizScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.score, self.total)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuizOutcome {
    /// Positions (0-based) of unanswered questions. No score was computed.
    NeedsAllAnswers { missing: Vec<usize> },
    Scored(QuizScore),
}

impl QuizOutcome {
    pub fn feedback(&self) -> String {
        match self {
            QuizOutcome::NeedsAllAnswers { missing } => format!(
                "Please answer all questions before submitting ({} left).",
                missing.len()
            ),
            QuizOutcome::Scored(score) => {
                format!("You scored {}. {}", score, score.tier.message())
            }
        }
    }
}

/// Score a set of selections against their questions.
pub fn evaluate(questions: &[Question], selections: &[Option<usize>]) -> QuizOutcome {
    let missing: Vec<usize> = (0..questions.len())
        .filter(|&i| selections.get(i).copied().flatten().is_none())
        .collect();
    if !missing.is_empty() {
        return QuizOutcome::NeedsAllAnswers { missing };
    }

    let score = questions
        .iter()
        .zip(selections)
        .filter(|(q, s)| **s == Some(q.correct))
        .count();
    QuizOutcome::Scored(QuizScore::new(score, questions.len()))
}

/// Picks an index in `0..len`. `len` is never zero.
pub trait QuestionChooser: Send {
    fn choose(&mut self, len: usize) -> usize;
}

pub struct RandomChooser {
    rng: StdRng,
}

impl RandomChooser {
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_os_rng(),
        }
    }

    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Default for RandomChooser {
    fn default() -> Self {
        Self::new()
    }
}

impl QuestionChooser for RandomChooser {
    fn choose(&mut self, len: usize) -> usize {
        self.rng.random_range(0..len)
    }
}

/// Replays a fixed list of picks, wrapping each into range.
pub struct SequenceChooser {
    picks: Vec<usize>,
    next: usize,
}

impl SequenceChooser {
    pub fn new(picks: Vec<usize>) -> Self {
        Self { picks, next: 0 }
    }
}

impl QuestionChooser for SequenceChooser {
    fn choose(&mut self, len: usize) -> usize {
        let pick = self.picks.get(self.next).copied().unwrap_or(0);
        self.next += 1;
        pick % len
    }
}

/// Draw up to `count` distinct questions from `pool`, one at a time.
pub fn draw_questions(
    pool: &[Question],
    count: usize,
    chooser: &mut dyn QuestionChooser,
) -> Vec<Question> {
    let mut remaining: Vec<&Question> = pool.iter().collect();
    let mut drawn = Vec::with_capacity(count.min(pool.len()));
    while drawn.len() < count && !remaining.is_empty() {
        let pick = chooser.choose(remaining.len()).min(remaining.len() - 1);
        drawn.push(remaining.remove(pick).clone());
    }
    drawn
}

/// Questions for a pattern whose record ships no quiz.
pub fn fallback_questions(pattern_name: &str) -> Vec<Question> {
    vec![
        Question::new(
            &format!("What does {} avoid compared to a brute-force approach?", pattern_name),
            &[
                "Repeating work on data it has already processed",
                "Reading the input",
                "Using any variables",
            ],
            0,
        ),
        Question::new(
            "After stepping through the visualization, what should you do next?",
            &[
                "Solve a practice problem using the same idea",
                "Memorize the code line by line",
                "Skip to another pattern",
            ],
            0,
        ),
    ]
}

/// Start a quiz from a pattern's pool, using the fallback set when it is empty.
pub fn open_session(
    pattern_name: &str,
    pool: &[Question],
    count: usize,
    chooser: &mut dyn QuestionChooser,
) -> QuizSession {
    let questions = if pool.is_empty() {
        draw_questions(&fallback_questions(pattern_name), count, chooser)
    } else {
        draw_questions(pool, count, chooser)
    };
    QuizSession::new(questions)
}

/// Quiz screen state: drawn questions and what the learner picked.
#[derive(Debug, Clone, Default)]
pub struct QuizSession {
    questions: Vec<Question>,
    selections: Vec<Option<usize>>,
    outcome: Option<QuizOutcome>,
}

impl QuizSession {
    pub fn new(questions: Vec<Question>) -> Self {
        let selections = vec![None; questions.len()];
        Self {
            questions,
            selections,
            outcome: None,
        }
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn selections(&self) -> &[Option<usize>] {
        &self.selections
    }

    pub fn outcome(&self) -> Option<&QuizOutcome> {
        self.outcome.as_ref()
    }

    /// True once a scored submission has happened.
    pub fn is_submitted(&self) -> bool {
        matches!(self.outcome, Some(QuizOutcome::Scored(_)))
    }

    pub fn select(&mut self, question: usize, option: usize) -> Result<(), FlowError> {
        let valid = self
            .questions
            .get(question)
            .map(|q| option < q.options.len())
            .unwrap_or(false);
        if !valid {
            return Err(FlowError::InvalidOption { question, option });
        }
        self.selections[question] = Some(option);
        Ok(())
    }

    pub fn submit(&mut self) -> QuizOutcome {
        let outcome = evaluate(&self.questions, &self.selections);
        self.outcome = Some(outcome.clone());
        outcome
    }

    pub fn feedback(&self) -> Option<String> {
        self.outcome.as_ref().map(QuizOutcome::feedback)
    }
}
