//! Step Animator
//!
//! Walks a pattern's narrative steps one at a time. Each step is first
//! explained (caption only) and then applied (highlights and pointers drawn).
//! Playback is driven by a background timer task that sends [`Tick`]s to
//! the owning event loop, which hands them back through
//! [`StepAnimator::on_tick`]. Every cancel bumps a generation counter so a
//! tick that was already queued when the timer stopped changes nothing.

use std::time::Duration;
use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;
use tracing::{debug, trace};

use crate::config::AnimationConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Explain,
    Apply,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackMode {
    /// Explain, then apply, then move on; one half-step per tick
    Guided,
    /// Straight to apply; one whole step per tick
    Fast,
}

/// Timer message. Only ticks from the current generation are honoured.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tick {
    pub generation: u64,
}

/// Returned by an operation that just reached the end of the sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SequenceFinished;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlaybackDelays {
    pub guided: Duration,
    pub fast: Duration,
}

impl Default for PlaybackDelays {
    fn default() -> Self {
        Self::from(&AnimationConfig::default())
    }
}

impl From<&AnimationConfig> for PlaybackDelays {
    fn from(config: &AnimationConfig) -> Self {
        Self {
            guided: config.guided_delay(),
            fast: config.fast_delay(),
        }
    }
}

/// Read-only view of where the animator is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnimatorState {
    pub step_index: usize,
    pub step_count: usize,
    pub phase: Phase,
    pub playback: Option<PlaybackMode>,
    pub finished: bool,
}

pub struct StepAnimator {
    step_count: usize,
    step_index: usize,
    phase: Phase,
    playback: Option<PlaybackMode>,
    finished: bool,
    generation: u64,
    timer: Option<JoinHandle<()>>,
    ticks: UnboundedSender<Tick>,
    delays: PlaybackDelays,
}

impl StepAnimator {
    pub fn new(step_count: usize, delays: PlaybackDelays, ticks: UnboundedSender<Tick>) -> Self {
        Self {
            step_count,
            step_index: 0,
            phase: Phase::Explain,
            playback: None,
            finished: false,
            generation: 0,
            timer: None,
            ticks,
            delays,
        }
    }

    pub fn state(&self) -> AnimatorState {
        AnimatorState {
            step_index: self.step_index,
            step_count: self.step_count,
            phase: self.phase,
            playback: self.playback,
            finished: self.finished,
        }
    }

    pub fn step_index(&self) -> usize {
        self.step_index
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn playback(&self) -> Option<PlaybackMode> {
        self.playback
    }

    pub fn is_playing(&self) -> bool {
        self.playback.is_some()
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    fn is_last(&self) -> bool {
        self.step_index + 1 >= self.step_count
    }

    /// Show the current step's effect without moving.
    pub fn reveal(&mut self) {
        self.phase = Phase::Apply;
    }

    pub fn manual_next(&mut self) -> Option<SequenceFinished> {
        if self.is_last() {
            return self.finish();
        }
        self.step_index += 1;
        self.phase = Phase::Explain;
        None
    }

    /// Start timed playback. Must run inside a tokio runtime.
    ///
    /// A no-op while already playing or once the sequence has finished.
    pub fn play(&mut self, mode: PlaybackMode) -> Option<SequenceFinished> {
        if self.playback.is_some() || self.finished {
            return None;
        }
        if self.step_count == 0 {
            return self.finish();
        }

        let delay = match mode {
            PlaybackMode::Guided => self.delays.guided,
            PlaybackMode::Fast => {
                self.phase = Phase::Apply;
                self.delays.fast
            }
        };
        self.playback = Some(mode);
        self.spawn_timer(delay);
        debug!(?mode, step = self.step_index, "Playback started");
        None
    }

    pub fn pause(&mut self) {
        self.cancel_timer();
        self.playback = None;
    }

    pub fn restart(&mut self) {
        self.cancel_timer();
        self.playback = None;
        self.step_index = 0;
        self.phase = Phase::Explain;
        self.finished = false;
    }

    pub fn on_tick(&mut self, tick: Tick) -> Option<SequenceFinished> {
        if tick.generation != self.generation {
            trace!(
                stale = tick.generation,
                current = self.generation,
                "Ignoring stale tick"
            );
            return None;
        }
        let mode = self.playback?;

        match mode {
            PlaybackMode::Guided if self.phase == Phase::Explain => {
                self.phase = Phase::Apply;
                None
            }
            PlaybackMode::Guided => {
                if self.is_last() {
                    return self.finish();
                }
                self.step_index += 1;
                self.phase = Phase::Explain;
                None
            }
            PlaybackMode::Fast => {
                if self.is_last() {
                    return self.finish();
                }
                self.step_index += 1;
                self.phase = Phase::Apply;
                None
            }
        }
    }

    fn finish(&mut self) -> Option<SequenceFinished> {
        self.cancel_timer();
        self.playback = None;
        self.phase = Phase::Apply;
        if self.finished {
            return None;
        }
        self.finished = true;
        debug!(steps = self.step_count, "Sequence finished");
        Some(SequenceFinished)
    }

    fn spawn_timer(&mut self, delay: Duration) {
        let ticks = self.ticks.clone();
        let generation = self.generation;
        let start = tokio::time::Instant::now() + delay;
        self.timer = Some(tokio::spawn(async move {
            let mut interval = tokio::time::interval_at(start, delay);
            loop {
                interval.tick().await;
                if ticks.send(Tick { generation }).is_err() {
                    break;
                }
            }
        }));
    }

    fn cancel_timer(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.abort();
        }
        self.generation += 1;
    }
}

impl Drop for StepAnimator {
    fn drop(&mut self) {
        self.cancel_timer();
    }
}
