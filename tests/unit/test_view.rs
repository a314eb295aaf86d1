//! Unit tests for visualization derivations

use codeflux::content::PatternStore;
use codeflux::lesson::view::{code_line, runners, two_pointers, window_range};
use codeflux::lesson::{parse_inputs, step_view, AnimatorState, Overlay, Phase};
use proptest::prelude::*;

proptest! {
    #[test]
    fn window_never_leaves_the_array(step in 0usize..64, k in 0usize..16, len in 0usize..32) {
        if let Some(range) = window_range(step, k, len) {
            prop_assert!(*range.end() < len);
            prop_assert!(range.end() - range.start() < k.max(1));
        }
    }

    #[test]
    fn window_ends_at_the_step_inside_the_array(step in 0usize..32, k in 1usize..16, extra in 1usize..16) {
        let len = step + extra;
        let range = window_range(step, k, len).unwrap();
        prop_assert_eq!(*range.end(), step);
        prop_assert_eq!(range.clone().count(), k.min(step + 1));
    }

    #[test]
    fn pointers_stay_ordered(step in 0usize..64, len in 1usize..32) {
        let pair = two_pointers(None, step, len).unwrap();
        prop_assert!(pair.left <= pair.right);
        prop_assert!(pair.right < len);
    }

    #[test]
    fn fast_runner_is_never_behind(step in 0usize..64, len in 1usize..32) {
        let r = runners(None, step, len).unwrap();
        prop_assert!(r.slow <= r.fast);
        prop_assert!(r.fast < len);
    }
}

#[test]
fn test_window_examples() {
    assert_eq!(window_range(5, 3, 9), Some(3..=5));
    assert_eq!(window_range(0, 3, 9), Some(0..=0));
    assert_eq!(window_range(1, 0, 9), Some(1..=1));
    assert_eq!(window_range(4, 3, 0), None);
}

#[test]
fn test_code_line_falls_back_to_step() {
    assert_eq!(code_line(None, 2, 10), Some(2));
    assert_eq!(code_line(None, 20, 10), Some(9));
    assert_eq!(code_line(None, 0, 0), None);
}

#[test]
fn test_sliding_window_step_view() {
    let report = PatternStore::load_with_dir(None);
    let pattern = report.store.get("slidingWindow").unwrap();
    let input = parse_inputs(&pattern.default_inputs);
    assert_eq!(input.window, 3);

    let explain = AnimatorState {
        step_index: 5,
        step_count: pattern.step_count(),
        phase: Phase::Explain,
        playback: None,
        finished: false,
    };
    let view = step_view(&pattern, &input, &explain, 0);
    assert_eq!(view.overlay, Overlay::None);
    assert!(view.reason.is_none());
    assert!(!view.caption.is_empty());

    let apply = AnimatorState {
        phase: Phase::Apply,
        ..explain
    };
    let view = step_view(&pattern, &input, &apply, 0);
    assert_eq!(view.overlay, Overlay::Window(3..=5));
    assert_eq!(view.code_line, pattern.steps[5].line);
}
