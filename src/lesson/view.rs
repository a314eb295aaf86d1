//! Pure render derivations for the visualization screen.

use std::ops::RangeInclusive;

use super::animator::{AnimatorState, Phase};
use super::input::LessonInput;
use crate::content::{NarrativeStep, Pattern, VisualKind};

/// Indices covered by a window of `k` elements ending at `step`.
///
/// `None` for an empty array. `k == 0` is treated as 1.
pub fn window_range(step: usize, k: usize, len: usize) -> Option<RangeInclusive<usize>> {
    if len == 0 {
        return None;
    }
    let end = step.min(len - 1);
    let start = (step + 1).saturating_sub(k.max(1));
    (start <= end).then_some(start..=end)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PointerPair {
    pub left: usize,
    pub right: usize,
}

/// Left/right pointers: the step's hints if present, else closing in by one
/// from each end per step. `right` never crosses `left`.
pub fn two_pointers(hint: Option<&NarrativeStep>, step: usize, len: usize) -> Option<PointerPair> {
    let last = len.checked_sub(1)?;
    let left = hint.and_then(|h| h.left).unwrap_or(step).min(last);
    let right = hint
        .and_then(|h| h.right)
        .unwrap_or_else(|| last.saturating_sub(step))
        .min(last)
        .max(left);
    Some(PointerPair { left, right })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Runners {
    pub slow: usize,
    pub fast: usize,
}

/// Slow/fast runners: hints, else slow at half the step and fast at the step.
pub fn runners(hint: Option<&NarrativeStep>, step: usize, len: usize) -> Option<Runners> {
    let last = len.checked_sub(1)?;
    Some(Runners {
        slow: hint.and_then(|h| h.slow).unwrap_or(step / 2).min(last),
        fast: hint.and_then(|h| h.fast).unwrap_or(step).min(last),
    })
}

/// Code line to highlight: the step's `line` hint, else the step index.
pub fn code_line(hint: Option<&NarrativeStep>, step: usize, line_count: usize) -> Option<usize> {
    let last = line_count.checked_sub(1)?;
    Some(hint.and_then(|h| h.line).unwrap_or(step).min(last))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Overlay {
    None,
    Window(RangeInclusive<usize>),
    Pointers(PointerPair),
    Runners(Runners),
}

/// Everything the visualization draws for the current step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepView<'a> {
    pub step_index: usize,
    pub step_count: usize,
    pub caption: &'a str,
    /// Only revealed once the step is applied
    pub reason: Option<&'a str>,
    pub code_line: Option<usize>,
    pub overlay: Overlay,
}

pub fn step_view<'a>(
    pattern: &'a Pattern,
    input: &LessonInput,
    state: &AnimatorState,
    listing: usize,
) -> StepView<'a> {
    let step = state.step_index;
    let narrative = pattern.steps.get(step);
    let applied = state.phase == Phase::Apply;
    let len = input.array.len();

    let line_count = pattern
        .code
        .get(listing)
        .map(|c| c.lines.len())
        .unwrap_or(0);

    let overlay = if !applied {
        Overlay::None
    } else {
        let overlay = match pattern.visual {
            VisualKind::Window => window_range(step, input.window, len).map(Overlay::Window),
            VisualKind::TwoPointers => two_pointers(narrative, step, len).map(Overlay::Pointers),
            VisualKind::FastSlow => runners(narrative, step, len).map(Overlay::Runners),
        };
        overlay.unwrap_or(Overlay::None)
    };

    StepView {
        step_index: step,
        step_count: state.step_count,
        caption: narrative.map(|n| n.popup.as_str()).unwrap_or(""),
        reason: narrative
            .filter(|_| applied)
            .map(|n| n.reason.as_str())
            .filter(|r| !r.is_empty()),
        code_line: code_line(narrative, step, line_count),
        overlay,
    }
}
