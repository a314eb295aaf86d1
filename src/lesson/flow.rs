//! Lesson Flow
//!
//! The screen-to-screen state machine. [`Screen::transition`] is the whole
//! navigation table; [`LessonFlow`] follows it and runs the side effects
//! attached to particular edges (building the animator when the learner
//! leaves the input screen, drawing a quiz when they leave the summary).

use std::fmt;
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedSender;
use tracing::debug;

use super::animator::{PlaybackDelays, PlaybackMode, SequenceFinished, StepAnimator, Tick};
use super::input::{parse_inputs, LessonInput};
use crate::content::{InputField, Pattern, PatternStore};
use crate::errors::{CodefluxError, FlowError};
use crate::progress::{ProgressStatus, ProgressTracker};
use crate::quiz::{open_session, QuestionChooser, QuizOutcome, QuizSession};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Screen {
    Landing,
    Patterns,
    Overview,
    Theory,
    Input,
    Visualization,
    Post,
    Quiz,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Advance,
    Back,
    Retake,
}

impl Screen {
    pub const ALL: [Screen; 8] = [
        Screen::Landing,
        Screen::Patterns,
        Screen::Overview,
        Screen::Theory,
        Screen::Input,
        Screen::Visualization,
        Screen::Post,
        Screen::Quiz,
    ];

    /// Where `action` leads from this screen, or `None` if it is not allowed.
    pub fn transition(self, action: Action) -> Option<Screen> {
        use Action::*;
        use Screen::*;
        match (self, action) {
            (Landing, Advance) => Some(Patterns),
            (Landing, Back) => Some(Landing),
            (Patterns, Back) => Some(Landing),
            (Overview, Advance) => Some(Theory),
            (Overview, Back) => Some(Patterns),
            (Theory, Advance) => Some(Input),
            (Theory, Back) => Some(Overview),
            (Input, Advance) => Some(Visualization),
            (Input, Back) => Some(Theory),
            (Visualization, Advance) => Some(Post),
            (Visualization, Back) => Some(Input),
            (Post, Advance) => Some(Quiz),
            (Post, Back) => Some(Visualization),
            (Quiz, Back) | (Quiz, Retake) => Some(Post),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Screen::Landing => "landing",
            Screen::Patterns => "patterns",
            Screen::Overview => "overview",
            Screen::Theory => "theory",
            Screen::Input => "input",
            Screen::Visualization => "visualization",
            Screen::Post => "post",
            Screen::Quiz => "quiz",
        }
    }
}

impl fmt::Display for Screen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Action::Advance => "advance",
            Action::Back => "go back",
            Action::Retake => "retake",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct FlowSettings {
    pub delays: PlaybackDelays,
    pub quiz_questions: usize,
}

impl Default for FlowSettings {
    fn default() -> Self {
        Self {
            delays: PlaybackDelays::default(),
            quiz_questions: 3,
        }
    }
}

/// Session state for one learner. Discarded on exit.
pub struct LessonFlow {
    patterns: Arc<PatternStore>,
    tracker: ProgressTracker,
    settings: FlowSettings,
    ticks: UnboundedSender<Tick>,
    chooser: Box<dyn QuestionChooser>,

    screen: Screen,
    pattern: Option<Arc<Pattern>>,
    inputs: Vec<InputField>,
    lesson: Option<LessonInput>,
    animator: Option<StepAnimator>,
    quiz: Option<QuizSession>,
}

impl LessonFlow {
    pub fn new(
        patterns: Arc<PatternStore>,
        tracker: ProgressTracker,
        settings: FlowSettings,
        ticks: UnboundedSender<Tick>,
        chooser: Box<dyn QuestionChooser>,
    ) -> Self {
        Self {
            patterns,
            tracker,
            settings,
            ticks,
            chooser,
            screen: Screen::Landing,
            pattern: None,
            inputs: Vec::new(),
            lesson: None,
            animator: None,
            quiz: None,
        }
    }

    pub fn screen(&self) -> Screen {
        self.screen
    }

    pub fn patterns(&self) -> &PatternStore {
        &self.patterns
    }

    pub fn tracker(&self) -> &ProgressTracker {
        &self.tracker
    }

    pub fn pattern(&self) -> Option<&Arc<Pattern>> {
        self.pattern.as_ref()
    }

    /// Input values being edited (or frozen, once past the input screen).
    pub fn inputs(&self) -> &[InputField] {
        &self.inputs
    }

    pub fn lesson_input(&self) -> Option<&LessonInput> {
        self.lesson.as_ref()
    }

    pub fn animator(&self) -> Option<&StepAnimator> {
        self.animator.as_ref()
    }

    pub fn quiz(&self) -> Option<&QuizSession> {
        self.quiz.as_ref()
    }

    fn current_pattern(&self) -> Result<Arc<Pattern>, FlowError> {
        self.pattern.clone().ok_or(FlowError::NoPatternSelected)
    }

    fn invalid(&self, action: impl fmt::Display) -> FlowError {
        FlowError::InvalidTransition {
            from: self.screen.to_string(),
            action: action.to_string(),
        }
    }

    fn move_to(&mut self, to: Screen, action: &str) {
        debug!(from = %self.screen, to = %to, action, "Screen transition");
        self.screen = to;
    }

    pub fn select_pattern(&mut self, id: &str) -> Result<(), CodefluxError> {
        if self.screen != Screen::Patterns {
            return Err(self.invalid("select a pattern").into());
        }
        let pattern = self
            .patterns
            .get(id)
            .ok_or_else(|| FlowError::UnknownPattern(id.to_string()))?;

        self.inputs = pattern.default_inputs.clone();
        self.lesson = None;
        self.animator = None;
        self.quiz = None;
        self.pattern = Some(pattern);
        self.move_to(Screen::Overview, "select");
        Ok(())
    }

    pub fn set_input(&mut self, field: &str, value: &str) -> Result<(), FlowError> {
        if self.screen != Screen::Input {
            return Err(self.invalid("edit inputs"));
        }
        let slot = self
            .inputs
            .iter_mut()
            .find(|f| f.name == field)
            .ok_or_else(|| FlowError::UnknownField(field.to_string()))?;
        slot.value = value.to_string();
        Ok(())
    }

    pub fn advance(&mut self) -> Result<Screen, CodefluxError> {
        let to = self
            .screen
            .transition(Action::Advance)
            .ok_or_else(|| self.invalid(Action::Advance))?;

        match self.screen {
            Screen::Input => {
                let pattern = self.current_pattern()?;
                let lesson = parse_inputs(&self.inputs);
                for issue in &lesson.issues {
                    debug!(pattern = %pattern.id, "Input corrected: {}", issue);
                }
                self.lesson = Some(lesson);
                self.animator = Some(StepAnimator::new(
                    pattern.step_count(),
                    self.settings.delays,
                    self.ticks.clone(),
                ));
                self.move_to(to, "advance");
                self.tracker
                    .set_progress(&pattern.id, ProgressStatus::InProgress)?;
            }
            Screen::Visualization => {
                if let Some(animator) = self.animator.as_mut() {
                    animator.pause();
                }
                self.move_to(to, "advance");
            }
            Screen::Post => {
                let pattern = self.current_pattern()?;
                self.quiz = Some(self.draw_quiz(&pattern));
                self.move_to(to, "advance");
            }
            _ => self.move_to(to, "advance"),
        }
        Ok(to)
    }

    pub fn back(&mut self) -> Result<Screen, FlowError> {
        let to = self
            .screen
            .transition(Action::Back)
            .ok_or_else(|| self.invalid(Action::Back))?;

        match self.screen {
            Screen::Visualization => self.animator = None,
            Screen::Quiz => self.quiz = None,
            Screen::Overview => {
                self.pattern = None;
                self.inputs.clear();
                self.lesson = None;
            }
            _ => {}
        }
        if to != self.screen {
            self.move_to(to, "back");
        }
        Ok(to)
    }

    pub fn retake(&mut self) -> Result<Screen, FlowError> {
        let to = self
            .screen
            .transition(Action::Retake)
            .ok_or_else(|| self.invalid(Action::Retake))?;
        self.quiz = None;
        self.move_to(to, "retake");
        Ok(to)
    }

    fn draw_quiz(&mut self, pattern: &Pattern) -> QuizSession {
        let session = open_session(
            &pattern.name,
            &pattern.quiz,
            self.settings.quiz_questions,
            self.chooser.as_mut(),
        );
        debug!(pattern = %pattern.id, count = session.questions().len(), "Drew quiz");
        session
    }

    pub fn on_sequence_finished(&mut self) -> Result<(), CodefluxError> {
        let pattern = self.current_pattern()?;
        self.tracker
            .set_progress(&pattern.id, ProgressStatus::Completed)?;
        Ok(())
    }

    fn with_animator<F>(&mut self, op: F) -> Result<Option<SequenceFinished>, CodefluxError>
    where
        F: FnOnce(&mut StepAnimator) -> Option<SequenceFinished>,
    {
        if self.screen != Screen::Visualization {
            return Err(self.invalid("control playback").into());
        }
        let animator = self.animator.as_mut().ok_or(FlowError::NoPatternSelected)?;
        let finished = op(animator);
        if finished.is_some() {
            self.on_sequence_finished()?;
        }
        Ok(finished)
    }

    pub fn reveal(&mut self) -> Result<(), CodefluxError> {
        self.with_animator(|a| {
            a.reveal();
            None
        })
        .map(|_| ())
    }

    pub fn manual_next(&mut self) -> Result<Option<SequenceFinished>, CodefluxError> {
        self.with_animator(StepAnimator::manual_next)
    }

    pub fn play(&mut self, mode: PlaybackMode) -> Result<Option<SequenceFinished>, CodefluxError> {
        self.with_animator(|a| a.play(mode))
    }

    pub fn pause(&mut self) -> Result<(), CodefluxError> {
        self.with_animator(|a| {
            a.pause();
            None
        })
        .map(|_| ())
    }

    /// Rewind the animator to the first step and drop any quiz in progress.
    pub fn restart(&mut self) -> Result<(), CodefluxError> {
        self.quiz = None;
        self.with_animator(|a| {
            a.restart();
            None
        })
        .map(|_| ())
    }

    /// Feed a timer tick back in. Ticks arriving off the visualization
    /// screen belong to a torn-down animator and are dropped.
    pub fn on_tick(&mut self, tick: Tick) -> Result<Option<SequenceFinished>, CodefluxError> {
        if self.screen != Screen::Visualization || self.animator.is_none() {
            return Ok(None);
        }
        self.with_animator(|a| a.on_tick(tick))
    }

    pub fn select_answer(&mut self, question: usize, option: usize) -> Result<(), FlowError> {
        if self.screen != Screen::Quiz {
            return Err(self.invalid("answer"));
        }
        let quiz = self.quiz.as_mut().ok_or(FlowError::NoPatternSelected)?;
        quiz.select(question, option)
    }

    pub fn submit_quiz(&mut self) -> Result<QuizOutcome, CodefluxError> {
        if self.screen != Screen::Quiz {
            return Err(self.invalid("submit").into());
        }
        let pattern = self.current_pattern()?;
        let quiz = self.quiz.as_mut().ok_or(FlowError::NoPatternSelected)?;
        let outcome = quiz.submit();
        self.tracker.record_quiz(&pattern.id, &outcome)?;
        Ok(outcome)
    }
}
