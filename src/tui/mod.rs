//! CodeFlux Terminal UI
//!
//! Full-screen lesson built on ratatui. One render function per screen,
//! a polling event loop, and two background sources feeding it over
//! channels: playback ticks and tutor replies.

mod app;
mod render;

pub use app::{App, AppCommand, Focus, TutorReply};

use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    Terminal,
};
use std::io::{self, Stdout};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver};
use tracing::{debug, info};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::lesson::Tick;
use crate::telemetry::preview_for_log;
use crate::tutor::TutorClient;

/// The CodeFlux color palette for the TUI
pub struct TuiPalette;

impl TuiPalette {
    pub const INDIGO: Color = Color::Rgb(99, 102, 241);
    pub const VIOLET: Color = Color::Rgb(139, 92, 246);
    pub const SLATE: Color = Color::Rgb(100, 116, 139);
    pub const CLOUD: Color = Color::Rgb(241, 245, 249);
    pub const NIGHT: Color = Color::Rgb(15, 23, 42);

    pub const EMERALD: Color = Color::Rgb(16, 185, 129);
    pub const AMBER: Color = Color::Rgb(245, 158, 11);
    pub const ROSE: Color = Color::Rgb(244, 63, 94);

    /// Style for titles
    pub fn title_style() -> Style {
        Style::default()
            .fg(Self::INDIGO)
            .add_modifier(Modifier::BOLD)
    }

    /// Style for selected items
    pub fn selected_style() -> Style {
        Style::default()
            .bg(Self::INDIGO)
            .fg(Self::CLOUD)
            .add_modifier(Modifier::BOLD)
    }

    /// Array cells inside the current window
    pub fn window_style() -> Style {
        Style::default().bg(Self::VIOLET).fg(Self::CLOUD)
    }

    /// The highlighted code line
    pub fn code_line_style() -> Style {
        Style::default()
            .bg(Self::NIGHT)
            .fg(Self::AMBER)
            .add_modifier(Modifier::BOLD)
    }

    pub fn success_style() -> Style {
        Style::default().fg(Self::EMERALD)
    }

    pub fn warning_style() -> Style {
        Style::default().fg(Self::AMBER)
    }

    pub fn error_style() -> Style {
        Style::default().fg(Self::ROSE)
    }

    pub fn muted_style() -> Style {
        Style::default().fg(Self::SLATE)
    }

    pub fn border_style() -> Style {
        Style::default().fg(Self::SLATE)
    }

    /// Border of the widget that currently takes typing
    pub fn focused_border_style() -> Style {
        Style::default().fg(Self::INDIGO)
    }
}

/// Terminal wrapper for TUI operations
pub struct TuiTerminal {
    terminal: Terminal<CrosstermBackend<Stdout>>,
}

impl TuiTerminal {
    /// Create and initialize the terminal
    pub fn new() -> Result<Self> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let terminal = Terminal::new(backend)?;

        Ok(Self { terminal })
    }

    pub fn terminal(&mut self) -> &mut Terminal<CrosstermBackend<Stdout>> {
        &mut self.terminal
    }

    /// Restore terminal to normal state
    pub fn restore(&mut self) -> Result<()> {
        disable_raw_mode()?;
        execute!(self.terminal.backend_mut(), LeaveAlternateScreen)?;
        self.terminal.show_cursor()?;
        Ok(())
    }
}

impl Drop for TuiTerminal {
    fn drop(&mut self) {
        let _ = self.restore();
    }
}

/// Header, main content and status bar
pub fn standard_layout(area: Rect) -> Vec<Rect> {
    Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(8),    // Main content
            Constraint::Length(1), // Status bar
        ])
        .split(area)
        .to_vec()
}

pub fn split_layout(area: Rect, left_percent: u16) -> (Rect, Rect) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(left_percent),
            Constraint::Percentage(100 - left_percent.min(100)),
        ])
        .split(area);

    (chunks[0], chunks[1])
}

/// Clip `s` to `max` display columns, marking the cut with an ellipsis.
pub fn truncate_to_width(s: &str, max: usize) -> String {
    if UnicodeWidthStr::width(s) <= max {
        return s.to_string();
    }
    let budget = max.saturating_sub(1);
    let mut out = String::new();
    let mut used = 0;
    for c in s.chars() {
        let w = UnicodeWidthChar::width(c).unwrap_or(0);
        if used + w > budget {
            break;
        }
        used += w;
        out.push(c);
    }
    if max > 0 {
        out.push('…');
    }
    out
}

/// Read next terminal event with timeout
pub fn read_event(timeout_ms: u64) -> Result<Option<Event>> {
    if event::poll(Duration::from_millis(timeout_ms))? {
        Ok(Some(event::read()?))
    } else {
        Ok(None)
    }
}

/// Check for specific key press
pub fn is_key(event: &Event, key: KeyCode, modifiers: KeyModifiers) -> bool {
    matches!(
        event,
        Event::Key(k) if k.kind == KeyEventKind::Press && k.code == key && k.modifiers == modifiers
    )
}

/// Ctrl+C or Ctrl+D quit from anywhere, even while typing.
pub fn is_force_quit(event: &Event) -> bool {
    is_key(event, KeyCode::Char('c'), KeyModifiers::CONTROL)
        || is_key(event, KeyCode::Char('d'), KeyModifiers::CONTROL)
}

/// Run the lesson until the learner quits.
///
/// Blocks the calling thread; call it from `block_in_place` when inside the
/// async runtime. Timer ticks for the animator arrive on `ticks`.
pub fn run(
    mut app: App,
    mut ticks: UnboundedReceiver<Tick>,
    tutor: Arc<dyn TutorClient>,
    runtime: tokio::runtime::Handle,
    tagline_every: Duration,
) -> Result<()> {
    let mut terminal = TuiTerminal::new()?;
    let (reply_tx, mut replies) = unbounded_channel::<TutorReply>();
    let mut last_tagline = Instant::now();
    info!("Lesson UI started");

    loop {
        terminal.terminal().draw(|frame| app.render(frame))?;

        if crate::is_shutdown_requested() {
            break;
        }

        if let Some(event) = read_event(50)? {
            let command = if is_force_quit(&event) {
                AppCommand::Quit
            } else {
                app.on_event(&event)
            };
            match command {
                AppCommand::Quit => break,
                AppCommand::AskTutor { request, prompt } => {
                    debug!(request, "Asking tutor: {}", preview_for_log(&prompt, 80));
                    let tutor = Arc::clone(&tutor);
                    let reply_tx = reply_tx.clone();
                    runtime.spawn(async move {
                        let result = tutor.ask(&prompt).await;
                        let _ = reply_tx.send(TutorReply { request, result });
                    });
                }
                AppCommand::None => {}
            }
        }

        while let Ok(tick) = ticks.try_recv() {
            app.on_tick(tick);
        }
        while let Ok(reply) = replies.try_recv() {
            app.on_tutor_reply(reply);
        }
        if last_tagline.elapsed() >= tagline_every {
            app.rotate_tagline();
            last_tagline = Instant::now();
        }
        app.save_due_notes(Instant::now());
    }

    app.save_pending_notes();
    info!("Lesson UI closed");
    terminal.restore()
}
