//! Learner Progress
//!
//! Per-pattern status, free-text notes and the last quiz score, kept in an
//! injected [`KeyValueStore`] under stable string keys.

pub mod store;

pub use store::{FileStore, KeyValueStore, MemoryStore};

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::debug;

use crate::errors::StorageError;
use crate::quiz::{QuizOutcome, QuizScore};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProgressStatus {
    #[default]
    YetToStart,
    InProgress,
    Completed,
}

impl ProgressStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProgressStatus::YetToStart => "yet-to-start",
            ProgressStatus::InProgress => "in-progress",
            ProgressStatus::Completed => "completed",
        }
    }

    /// Unknown values read as not started.
    pub fn parse(value: &str) -> Self {
        match value.trim() {
            "in-progress" => ProgressStatus::InProgress,
            "completed" => ProgressStatus::Completed,
            _ => ProgressStatus::YetToStart,
        }
    }
}

impl fmt::Display for ProgressStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub fn progress_key(id: &str) -> String {
    format!("pattern_progress_{}", id)
}

pub fn notes_key(id: &str) -> String {
    format!("pattern_notes_{}", id)
}

pub fn quiz_score_key(id: &str) -> String {
    format!("pattern_quiz_score_{}", id)
}

/// One row of a progress listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PatternProgress {
    pub id: String,
    pub status: ProgressStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quiz_score: Option<String>,
    pub has_note: bool,
}

#[derive(Clone)]
pub struct ProgressTracker {
    store: Arc<dyn KeyValueStore>,
}

impl ProgressTracker {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    pub fn progress(&self, id: &str) -> Result<ProgressStatus, StorageError> {
        Ok(self
            .store
            .get(&progress_key(id))?
            .map(|v| ProgressStatus::parse(&v))
            .unwrap_or_default())
    }

    pub fn set_progress(&self, id: &str, status: ProgressStatus) -> Result<(), StorageError> {
        debug!(pattern = id, status = status.as_str(), "Recording progress");
        self.store.set(&progress_key(id), status.as_str())
    }

    pub fn note(&self, id: &str) -> Result<String, StorageError> {
        Ok(self.store.get(&notes_key(id))?.unwrap_or_default())
    }

    pub fn set_note(&self, id: &str, text: &str) -> Result<(), StorageError> {
        self.store.set(&notes_key(id), text)
    }

    pub fn quiz_score(&self, id: &str) -> Result<Option<QuizScore>, StorageError> {
        Ok(self
            .store
            .get(&quiz_score_key(id))?
            .and_then(|v| QuizScore::parse(&v)))
    }

    pub fn set_quiz_score(&self, id: &str, score: &QuizScore) -> Result<(), StorageError> {
        self.store.set(&quiz_score_key(id), &score.to_string())
    }

    /// Record a submitted quiz. A score marks the pattern completed and is
    /// kept; an incomplete submission writes nothing. Returns whether
    /// anything was written.
    pub fn record_quiz(&self, id: &str, outcome: &QuizOutcome) -> Result<bool, StorageError> {
        let QuizOutcome::Scored(score) = outcome else {
            return Ok(false);
        };
        debug!(pattern = id, score = %score, "Quiz submitted");
        self.set_progress(id, ProgressStatus::Completed)?;
        self.set_quiz_score(id, score)?;
        Ok(true)
    }

    pub fn snapshot<S: AsRef<str>>(&self, ids: &[S]) -> Result<Vec<PatternProgress>, StorageError> {
        ids.iter()
            .map(|id| {
                let id = id.as_ref();
                Ok(PatternProgress {
                    id: id.to_string(),
                    status: self.progress(id)?,
                    quiz_score: self.quiz_score(id)?.map(|s| s.to_string()),
                    has_note: !self.note(id)?.trim().is_empty(),
                })
            })
            .collect()
    }
}

/// Holds back note edits until typing pauses.
///
/// The caller reports every edit and polls [`NoteDebouncer::take_due`] from
/// its event loop; only the latest text per pattern is ever written.
#[derive(Debug)]
pub struct NoteDebouncer {
    delay: Duration,
    pending: Option<PendingNote>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingNote {
    pub pattern_id: String,
    pub text: String,
    deadline: Instant,
}

impl NoteDebouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
        }
    }

    /// Record an edit. An edit for a different pattern flushes the old one
    /// first and returns it.
    pub fn edit(&mut self, pattern_id: &str, text: &str, now: Instant) -> Option<PendingNote> {
        let flushed = match &self.pending {
            Some(p) if p.pattern_id != pattern_id => self.pending.take(),
            _ => None,
        };
        self.pending = Some(PendingNote {
            pattern_id: pattern_id.to_string(),
            text: text.to_string(),
            deadline: now + self.delay,
        });
        flushed
    }

    pub fn take_due(&mut self, now: Instant) -> Option<PendingNote> {
        match &self.pending {
            Some(p) if now >= p.deadline => self.pending.take(),
            _ => None,
        }
    }

    /// Drain regardless of the deadline (leaving the screen, exiting).
    pub fn flush(&mut self) -> Option<PendingNote> {
        self.pending.take()
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }
}
