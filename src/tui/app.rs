//! CodeFlux TUI Application
//!
//! Key handling and widget state on top of [`LessonFlow`]. The app never
//! blocks: anything slow (tutor requests) is handed back to the event loop
//! as an [`AppCommand`].

use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind};
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

use crate::errors::{CodefluxError, TutorError};
use crate::lesson::{view, LessonFlow, PlaybackMode, Screen, Tick};
use crate::progress::{NoteDebouncer, PendingNote};
use crate::telemetry::preview_for_log;
use crate::tutor::build_prompt;

pub const TAGLINES: [&str; 3] = [
    "Learn DSA by visualizing code",
    "Don't memorize, visualize",
    "Master algorithms step by step",
];

/// Which widget receives typed characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Lesson,
    Tutor,
    Notes,
}

#[derive(Debug, Default)]
pub struct TutorWidget {
    pub question: String,
    pub reply: Option<String>,
    /// Input is disabled while true
    pub in_flight: bool,
    request: u64,
}

impl TutorWidget {
    /// Blank the widget for a fresh visit. The request counter keeps
    /// counting so replies to earlier questions never match a new one.
    fn clear(&mut self) {
        self.question.clear();
        self.reply = None;
        self.in_flight = false;
    }
}

/// A finished tutor request, tagged with the request it answers.
#[derive(Debug)]
pub struct TutorReply {
    pub request: u64,
    pub result: Result<String, TutorError>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppCommand {
    None,
    Quit,
    AskTutor { request: u64, prompt: String },
}

pub struct App {
    pub(crate) flow: LessonFlow,
    pub(crate) content_dir: Option<PathBuf>,
    pub(crate) tagline: usize,
    pub(crate) pattern_cursor: usize,
    pub(crate) field_cursor: usize,
    pub(crate) listing: usize,
    pub(crate) quiz_cursor: usize,
    pub(crate) focus: Focus,
    pub(crate) tutor: TutorWidget,
    pub(crate) notes: String,
    pub(crate) status: String,
    pub(crate) confirm_quit: bool,
    debouncer: NoteDebouncer,
}

impl App {
    pub fn new(flow: LessonFlow, content_dir: Option<PathBuf>, note_debounce: Duration) -> Self {
        Self {
            flow,
            content_dir,
            tagline: 0,
            pattern_cursor: 0,
            field_cursor: 0,
            listing: 0,
            quiz_cursor: 0,
            focus: Focus::Lesson,
            tutor: TutorWidget::default(),
            notes: String::new(),
            status: "Press Enter to get started".into(),
            confirm_quit: false,
            debouncer: NoteDebouncer::new(note_debounce),
        }
    }

    pub fn flow(&self) -> &LessonFlow {
        &self.flow
    }

    pub fn focus(&self) -> Focus {
        self.focus
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    pub fn tutor(&self) -> &TutorWidget {
        &self.tutor
    }

    pub fn notes(&self) -> &str {
        &self.notes
    }

    pub fn tagline(&self) -> &'static str {
        TAGLINES[self.tagline % TAGLINES.len()]
    }

    pub fn rotate_tagline(&mut self) {
        self.tagline = (self.tagline + 1) % TAGLINES.len();
    }

    /// Skip the landing and list screens and open a pattern's overview.
    pub fn jump_to(&mut self, id: &str) -> Result<(), CodefluxError> {
        self.flow.advance()?;
        self.flow.select_pattern(id)?;
        self.status = String::new();
        Ok(())
    }

    fn report<T>(&mut self, result: Result<T, impl Into<CodefluxError>>) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(e) => {
                let e: CodefluxError = e.into();
                warn!("{}", e);
                self.status = e.to_string();
                None
            }
        }
    }

    pub fn on_event(&mut self, event: &Event) -> AppCommand {
        match event {
            Event::Key(key) if key.kind == KeyEventKind::Press => self.on_key(*key),
            _ => AppCommand::None,
        }
    }

    pub fn on_key(&mut self, key: KeyEvent) -> AppCommand {
        if self.confirm_quit {
            self.confirm_quit = false;
            if matches!(key.code, KeyCode::Char('y') | KeyCode::Char('Y')) {
                return AppCommand::Quit;
            }
            return AppCommand::None;
        }

        match self.focus {
            Focus::Tutor => self.on_tutor_key(key),
            Focus::Notes => {
                self.on_notes_key(key);
                AppCommand::None
            }
            Focus::Lesson => self.on_screen_key(key),
        }
    }

    fn on_screen_key(&mut self, key: KeyEvent) -> AppCommand {
        let screen = self.flow.screen();
        if key.code == KeyCode::Char('q') && screen != Screen::Input {
            self.confirm_quit = true;
            return AppCommand::None;
        }

        match screen {
            Screen::Landing => {
                if matches!(key.code, KeyCode::Enter | KeyCode::Right | KeyCode::Char(' ')) {
                    self.advance();
                }
            }
            Screen::Patterns => self.on_patterns_key(key),
            Screen::Overview | Screen::Theory => match key.code {
                KeyCode::Enter | KeyCode::Right => self.advance(),
                KeyCode::Esc | KeyCode::Left => self.back(),
                _ => {}
            },
            Screen::Input => self.on_input_key(key),
            Screen::Visualization => self.on_visualization_key(key),
            Screen::Post => match key.code {
                KeyCode::Tab | KeyCode::Char('e') => self.focus = Focus::Notes,
                KeyCode::Enter | KeyCode::Right => {
                    self.save_pending_notes();
                    self.advance();
                }
                KeyCode::Esc | KeyCode::Left => {
                    self.save_pending_notes();
                    self.back();
                }
                _ => {}
            },
            Screen::Quiz => self.on_quiz_key(key),
        }
        AppCommand::None
    }

    fn on_patterns_key(&mut self, key: KeyEvent) {
        let count = self.flow.patterns().len();
        match key.code {
            KeyCode::Up | KeyCode::Char('k') => {
                self.pattern_cursor = self.pattern_cursor.saturating_sub(1);
            }
            KeyCode::Down | KeyCode::Char('j') => {
                if self.pattern_cursor + 1 < count {
                    self.pattern_cursor += 1;
                }
            }
            KeyCode::Enter | KeyCode::Right => {
                let id = self
                    .flow
                    .patterns()
                    .patterns()
                    .get(self.pattern_cursor)
                    .map(|p| p.id.clone());
                if let Some(id) = id {
                    let result = self.flow.select_pattern(&id);
                    if self.report(result).is_some() {
                        self.field_cursor = 0;
                        self.status = String::new();
                    }
                }
            }
            KeyCode::Esc | KeyCode::Left => self.back(),
            _ => {}
        }
    }

    fn on_input_key(&mut self, key: KeyEvent) {
        let count = self.flow.inputs().len();
        match key.code {
            KeyCode::Up => self.field_cursor = self.field_cursor.saturating_sub(1),
            KeyCode::Down | KeyCode::Tab => {
                if count > 0 {
                    self.field_cursor = (self.field_cursor + 1) % count;
                }
            }
            KeyCode::Char(c) => self.edit_field(|value| value.push(c)),
            KeyCode::Backspace => self.edit_field(|value| {
                value.pop();
            }),
            KeyCode::Enter => self.advance(),
            KeyCode::Esc => self.back(),
            _ => {}
        }
    }

    fn edit_field<F: FnOnce(&mut String)>(&mut self, edit: F) {
        let Some(field) = self.flow.inputs().get(self.field_cursor) else {
            return;
        };
        let name = field.name.clone();
        let mut value = field.value.clone();
        edit(&mut value);
        let result = self.flow.set_input(&name, &value);
        self.report(result);
    }

    fn on_visualization_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Right | KeyCode::Char('n') => {
                let result = self.flow.manual_next();
                self.after_step(result);
            }
            KeyCode::Char(' ') => {
                let result = self.flow.reveal();
                self.report(result);
            }
            KeyCode::Char('g') => {
                let result = self.flow.play(PlaybackMode::Guided);
                self.after_step(result);
            }
            KeyCode::Char('f') => {
                let result = self.flow.play(PlaybackMode::Fast);
                self.after_step(result);
            }
            KeyCode::Char('p') => {
                let result = self.flow.pause();
                self.report(result);
            }
            KeyCode::Char('r') => {
                let result = self.flow.restart();
                if self.report(result).is_some() {
                    self.status = "Restarted from the first step".into();
                }
            }
            KeyCode::Char('l') => {
                let listings = self.flow.pattern().map(|p| p.code.len()).unwrap_or(0);
                if listings > 0 {
                    self.listing = (self.listing + 1) % listings;
                }
            }
            KeyCode::Tab | KeyCode::Char('t') => self.focus = Focus::Tutor,
            KeyCode::Enter => self.advance(),
            KeyCode::Esc | KeyCode::Left => self.back(),
            _ => {}
        }
    }

    fn on_quiz_key(&mut self, key: KeyEvent) {
        let Some(quiz) = self.flow.quiz() else {
            return;
        };
        let count = quiz.questions().len();
        let submitted = quiz.is_submitted();
        let option_count = quiz
            .questions()
            .get(self.quiz_cursor)
            .map(|q| q.options.len())
            .unwrap_or(0);
        let selected = quiz.selections().get(self.quiz_cursor).copied().flatten();

        match key.code {
            KeyCode::Up | KeyCode::Char('k') => {
                self.quiz_cursor = self.quiz_cursor.saturating_sub(1);
            }
            KeyCode::Down | KeyCode::Char('j') => {
                if self.quiz_cursor + 1 < count {
                    self.quiz_cursor += 1;
                }
            }
            KeyCode::Char(c @ '1'..='9') if !submitted => {
                let option = (c as usize) - ('1' as usize);
                self.select_answer(option);
            }
            KeyCode::Right if !submitted && option_count > 0 => {
                let option = selected.map(|s| (s + 1) % option_count).unwrap_or(0);
                self.select_answer(option);
            }
            KeyCode::Left if !submitted && option_count > 0 => {
                let option = selected
                    .map(|s| (s + option_count - 1) % option_count)
                    .unwrap_or(option_count - 1);
                self.select_answer(option);
            }
            KeyCode::Enter if !submitted => {
                let result = self.flow.submit_quiz();
                if let Some(outcome) = self.report(result) {
                    self.status = outcome.feedback();
                }
            }
            KeyCode::Char('r') => {
                let result = self.flow.retake();
                if self.report(result).is_some() {
                    self.quiz_cursor = 0;
                    self.load_notes();
                }
            }
            KeyCode::Esc => {
                let result = self.flow.back();
                if self.report(result).is_some() {
                    self.quiz_cursor = 0;
                    self.load_notes();
                }
            }
            _ => {}
        }
    }

    fn select_answer(&mut self, option: usize) {
        let result = self.flow.select_answer(self.quiz_cursor, option);
        self.report(result);
    }

    fn after_step<T>(&mut self, result: Result<Option<T>, CodefluxError>) {
        if let Some(Some(_)) = self.report(result) {
            self.status = "Sequence complete. Press Enter for the summary.".into();
        }
    }

    fn advance(&mut self) {
        let result = self.flow.advance();
        let Some(screen) = self.report(result) else {
            return;
        };
        self.status = String::new();
        match screen {
            Screen::Visualization => {
                self.listing = 0;
                self.tutor.clear();
                let issues = self
                    .flow
                    .lesson_input()
                    .map(|l| l.issues.len())
                    .unwrap_or(0);
                if issues > 0 {
                    self.status = format!("{} input value(s) were corrected", issues);
                }
            }
            Screen::Post => self.load_notes(),
            Screen::Quiz => self.quiz_cursor = 0,
            _ => {}
        }
    }

    fn back(&mut self) {
        let result = self.flow.back();
        if let Some(screen) = self.report(result) {
            self.status = String::new();
            match screen {
                Screen::Patterns => self.pattern_cursor = self.pattern_cursor.min(
                    self.flow.patterns().len().saturating_sub(1),
                ),
                Screen::Visualization => self.tutor.clear(),
                _ => {}
            }
        }
    }

    fn load_notes(&mut self) {
        let Some(id) = self.flow.pattern().map(|p| p.id.clone()) else {
            return;
        };
        let result = self.flow.tracker().note(&id);
        self.notes = self.report(result).unwrap_or_default();
    }

    fn on_notes_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc | KeyCode::Tab => {
                self.focus = Focus::Lesson;
                return;
            }
            KeyCode::Char(c) => self.notes.push(c),
            KeyCode::Enter => self.notes.push('\n'),
            KeyCode::Backspace => {
                self.notes.pop();
            }
            _ => return,
        }

        let Some(id) = self.flow.pattern().map(|p| p.id.clone()) else {
            return;
        };
        if let Some(flushed) = self.debouncer.edit(&id, &self.notes, Instant::now()) {
            self.write_note(flushed);
        }
    }

    fn write_note(&mut self, note: PendingNote) {
        debug!(
            pattern = %note.pattern_id,
            "Saving note: {}",
            preview_for_log(&note.text, 40)
        );
        let result = self.flow.tracker().set_note(&note.pattern_id, &note.text);
        self.report(result);
    }

    /// Write a note whose quiet period has passed.
    pub fn save_due_notes(&mut self, now: Instant) {
        if let Some(note) = self.debouncer.take_due(now) {
            self.write_note(note);
        }
    }

    /// Write any pending note immediately.
    pub fn save_pending_notes(&mut self) {
        if let Some(note) = self.debouncer.flush() {
            self.write_note(note);
        }
    }

    fn on_tutor_key(&mut self, key: KeyEvent) -> AppCommand {
        match key.code {
            KeyCode::Esc | KeyCode::Tab => self.focus = Focus::Lesson,
            _ if self.tutor.in_flight => {}
            KeyCode::Char(c) => self.tutor.question.push(c),
            KeyCode::Backspace => {
                self.tutor.question.pop();
            }
            KeyCode::Enter => return self.ask_tutor(),
            _ => {}
        }
        AppCommand::None
    }

    /// The code line currently highlighted in the visualization.
    pub(crate) fn current_code(&self) -> String {
        let (Some(pattern), Some(animator)) = (self.flow.pattern(), self.flow.animator()) else {
            return String::new();
        };
        let step = animator.step_index();
        let Some(listing) = pattern.code.get(self.listing) else {
            return String::new();
        };
        view::code_line(pattern.steps.get(step), step, listing.lines.len())
            .and_then(|line| listing.lines.get(line))
            .map(|line| line.trim().to_string())
            .unwrap_or_default()
    }

    fn ask_tutor(&mut self) -> AppCommand {
        let (Some(pattern), Some(animator)) = (self.flow.pattern(), self.flow.animator()) else {
            return AppCommand::None;
        };
        let Some(prompt) = build_prompt(
            &pattern.name,
            animator.step_index(),
            &self.current_code(),
            &self.tutor.question,
        ) else {
            return AppCommand::None;
        };

        self.tutor.request += 1;
        self.tutor.in_flight = true;
        self.tutor.reply = None;
        AppCommand::AskTutor {
            request: self.tutor.request,
            prompt,
        }
    }

    pub fn on_tutor_reply(&mut self, reply: TutorReply) {
        if reply.request != self.tutor.request || !self.tutor.in_flight {
            debug!(request = reply.request, "Dropping stale tutor reply");
            return;
        }
        self.tutor.in_flight = false;
        match reply.result {
            Ok(text) => {
                self.tutor.question.clear();
                self.tutor.reply = Some(text);
            }
            Err(e) => {
                warn!("Tutor request failed: {}", e);
                self.tutor.reply = Some(e.user_message());
            }
        }
    }

    pub fn on_tick(&mut self, tick: Tick) {
        let result = self.flow.on_tick(tick);
        self.after_step(result);
    }
}
