//! Lesson state: screen navigation, input parsing and step playback.

pub mod animator;
pub mod flow;
pub mod input;
pub mod view;

pub use animator::{
    AnimatorState, Phase, PlaybackDelays, PlaybackMode, SequenceFinished, StepAnimator, Tick,
};
pub use flow::{Action, FlowSettings, LessonFlow, Screen};
pub use input::{parse_inputs, InputIssue, LessonInput};
pub use view::{step_view, Overlay, StepView};
