//! Timed playback through the lesson flow, on paused tokio time.

use codeflux::content::{ContentSource, PatternStore};
use codeflux::lesson::{
    FlowSettings, LessonFlow, Phase, PlaybackDelays, PlaybackMode, Screen, Tick,
};
use codeflux::progress::{MemoryStore, ProgressStatus, ProgressTracker};
use codeflux::quiz::SequenceChooser;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver};
use tokio::time::Instant;

const RECORD: &str = r#"{
    "id": "three",
    "name": "Three Steps",
    "defaultInputs": { "array": "[4, 5, 6]", "k": "2" },
    "steps": [{ "popup": "one" }, { "popup": "two" }, { "popup": "three" }]
}"#;

const GUIDED: Duration = Duration::from_millis(100);
const FAST: Duration = Duration::from_millis(200);

fn visualization() -> (LessonFlow, UnboundedReceiver<Tick>, ProgressTracker) {
    let report = PatternStore::load_all(vec![ContentSource::new("three.json", RECORD)]);
    let store = Arc::new(MemoryStore::new());
    let (tx, rx) = unbounded_channel();
    let settings = FlowSettings {
        delays: PlaybackDelays {
            guided: GUIDED,
            fast: FAST,
        },
        quiz_questions: 3,
    };
    let mut flow = LessonFlow::new(
        Arc::new(report.store),
        ProgressTracker::new(store.clone()),
        settings,
        tx,
        Box::new(SequenceChooser::new(vec![0])),
    );
    flow.advance().unwrap();
    flow.select_pattern("three").unwrap();
    while flow.screen() != Screen::Visualization {
        flow.advance().unwrap();
    }
    (flow, rx, ProgressTracker::new(store))
}

async fn run_to_end(flow: &mut LessonFlow, rx: &mut UnboundedReceiver<Tick>) -> usize {
    let mut ticks = 0;
    loop {
        let tick = rx.recv().await.unwrap();
        ticks += 1;
        if flow.on_tick(tick).unwrap().is_some() {
            return ticks;
        }
    }
}

#[tokio::test(start_paused = true)]
async fn test_guided_playback_explains_then_applies_each_step() {
    let (mut flow, mut rx, tracker) = visualization();
    let start = Instant::now();

    assert!(flow.play(PlaybackMode::Guided).unwrap().is_none());
    assert_eq!(flow.animator().unwrap().phase(), Phase::Explain);

    let ticks = run_to_end(&mut flow, &mut rx).await;
    assert_eq!(ticks, 6);
    assert!(start.elapsed() >= GUIDED * 6);
    assert!(start.elapsed() < GUIDED * 7);

    let animator = flow.animator().unwrap();
    assert!(animator.is_finished());
    assert!(!animator.is_playing());
    assert_eq!(animator.step_index(), 2);
    assert_eq!(tracker.progress("three").unwrap(), ProgressStatus::Completed);
}

#[tokio::test(start_paused = true)]
async fn test_fast_playback_applies_immediately() {
    let (mut flow, mut rx, _) = visualization();
    let start = Instant::now();

    flow.play(PlaybackMode::Fast).unwrap();
    assert_eq!(flow.animator().unwrap().phase(), Phase::Apply);

    let ticks = run_to_end(&mut flow, &mut rx).await;
    assert_eq!(ticks, 3);
    assert!(start.elapsed() >= FAST * 3);
    assert!(start.elapsed() < FAST * 4);
}

#[tokio::test(start_paused = true)]
async fn test_pause_stops_ticks() {
    let (mut flow, mut rx, _) = visualization();
    flow.play(PlaybackMode::Guided).unwrap();

    let tick = rx.recv().await.unwrap();
    flow.on_tick(tick).unwrap();
    flow.pause().unwrap();
    assert!(!flow.animator().unwrap().is_playing());

    tokio::time::sleep(Duration::from_secs(5)).await;
    assert!(rx.try_recv().is_err());
    assert_eq!(flow.animator().unwrap().phase(), Phase::Apply);
    assert_eq!(flow.animator().unwrap().step_index(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_leaving_the_screen_cancels_the_timer() {
    let (mut flow, mut rx, _) = visualization();
    flow.play(PlaybackMode::Fast).unwrap();
    let stale = rx.recv().await.unwrap();

    flow.back().unwrap();
    tokio::time::sleep(Duration::from_secs(5)).await;
    assert!(rx.try_recv().is_err());
    assert_eq!(flow.on_tick(stale).unwrap(), None);
    assert_eq!(flow.screen(), Screen::Input);
}

#[tokio::test(start_paused = true)]
async fn test_moving_on_to_the_summary_cancels_the_timer() {
    let (mut flow, mut rx, _) = visualization();
    flow.play(PlaybackMode::Fast).unwrap();
    let queued = rx.recv().await.unwrap();

    assert_eq!(flow.advance().unwrap(), Screen::Post);
    assert!(!flow.animator().unwrap().is_playing());
    tokio::time::sleep(FAST * 5).await;
    assert!(rx.try_recv().is_err());

    assert_eq!(flow.back().unwrap(), Screen::Visualization);
    assert_eq!(flow.on_tick(queued).unwrap(), None);
    tokio::time::sleep(FAST * 5).await;
    assert!(rx.try_recv().is_err());
    assert_eq!(flow.animator().unwrap().step_index(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_restart_ignores_ticks_from_before() {
    let (mut flow, mut rx, _) = visualization();
    flow.play(PlaybackMode::Fast).unwrap();
    let old = rx.recv().await.unwrap();
    flow.on_tick(old).unwrap();
    assert_eq!(flow.animator().unwrap().step_index(), 1);

    flow.restart().unwrap();
    assert_eq!(flow.on_tick(old).unwrap(), None);
    let animator = flow.animator().unwrap();
    assert_eq!(animator.step_index(), 0);
    assert_eq!(animator.phase(), Phase::Explain);
    assert!(!animator.is_playing());
}

#[tokio::test(start_paused = true)]
async fn test_play_twice_keeps_one_timer() {
    let (mut flow, mut rx, _) = visualization();
    let start = Instant::now();
    flow.play(PlaybackMode::Fast).unwrap();
    flow.play(PlaybackMode::Guided).unwrap();
    assert_eq!(flow.animator().unwrap().playback(), Some(PlaybackMode::Fast));

    let ticks = run_to_end(&mut flow, &mut rx).await;
    assert_eq!(ticks, 3);
    assert!(start.elapsed() >= FAST * 3);
}
