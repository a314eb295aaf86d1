//! CodeFlux - learn algorithm patterns by watching them run
//!
//! A terminal lesson that walks a learner through one pattern at a time:
//! overview, theory, their own inputs, a step-by-step visualization, notes
//! and a short quiz. Progress lives in a small JSON store; an optional
//! Gemini-backed tutor answers questions about the current step.
//!
//! # Quick Start
//!
//! ```ignore
//! use codeflux::content::PatternStore;
//!
//! let report = PatternStore::load_with_dir(None);
//! for pattern in report.store.patterns() {
//!     println!("{} ({} steps)", pattern.name, pattern.step_count());
//! }
//! ```

use std::sync::atomic::{AtomicBool, Ordering};

pub mod cli;
pub mod config;
pub mod content;
pub mod errors;
pub mod lesson;
pub mod progress;
pub mod quiz;
pub mod telemetry;
pub mod tutor;

// ─── UI ────────────────────────────────────────────────────────────
pub mod tui;
pub mod ui;

static SHUTDOWN: AtomicBool = AtomicBool::new(false);

/// Ask long-running loops (the lesson UI, headless playback) to wind down.
pub fn request_shutdown() {
    SHUTDOWN.store(true, Ordering::SeqCst);
}

pub fn is_shutdown_requested() -> bool {
    SHUTDOWN.load(Ordering::SeqCst)
}
