//! CodeFlux command line
//!
//! The default command opens the terminal lesson. The other subcommands
//! cover the same content headlessly, for scripting and quick checks.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::unbounded_channel;
use tracing::{info, warn};

use crate::config::Config;
use crate::content::{Pattern, PatternStore};
use crate::errors::{CodefluxError, ContentError, TutorError};
use crate::lesson::input::{ARRAY_FIELDS, WINDOW_FIELDS};
use crate::lesson::{
    step_view, view, FlowSettings, LessonFlow, LessonInput, Overlay, Phase, PlaybackDelays,
    PlaybackMode, Screen, StepView,
};
use crate::progress::{FileStore, ProgressStatus, ProgressTracker};
use crate::quiz::{open_session, QuizOutcome, RandomChooser};
use crate::telemetry::{init_file_tracing, init_tracing};
use crate::tui::{self, App};
use crate::tutor::{build_prompt, GeminiClient, TutorClient};
use crate::ui::style::{self, difficulty_label, status_label, FluxStyle, Glyphs};

#[derive(Parser)]
#[command(name = "codeflux")]
#[command(about = "Learn algorithm patterns by watching them run, one step at a time")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Config file path
    #[arg(short, long, value_name = "FILE")]
    config: Option<String>,

    /// Quiet mode (minimal output)
    #[arg(short, long)]
    quiet: bool,

    /// Disable colored output
    #[arg(long)]
    no_color: bool,
}

/// Output format for listing commands
#[derive(Debug, Clone, Copy, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text (default)
    #[default]
    Text,
    /// JSON output for scripting
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Open the interactive lesson (default)
    #[command(alias = "l")]
    Learn {
        /// Jump straight to this pattern's overview
        #[arg(short, long, value_name = "ID")]
        pattern: Option<String>,
    },

    /// List patterns with difficulty and progress
    #[command(alias = "ls")]
    Patterns {
        #[arg(long, value_enum, default_value = "text")]
        output_format: OutputFormat,
    },

    /// Play a pattern's walkthrough in the terminal
    Play {
        /// Pattern id
        id: String,

        /// Number sequence, e.g. "[2, 1, 5]" or "2,1,5"
        #[arg(long)]
        array: Option<String>,

        /// Window size
        #[arg(long)]
        window: Option<String>,

        /// Apply every step at once instead of explaining first
        #[arg(long)]
        fast: bool,
    },

    /// Take a pattern's quiz
    Quiz {
        /// Pattern id
        id: String,

        /// Questions to draw
        #[arg(short = 'n', long)]
        count: Option<usize>,

        /// Answers as 0-based option indexes, e.g. "1,0,2"; prompts when absent
        #[arg(long, value_delimiter = ',')]
        answers: Option<Vec<usize>>,

        /// Seed for a repeatable question draw
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Print a pattern's note, or replace it with TEXT
    Note {
        /// Pattern id
        id: String,

        text: Option<String>,
    },

    /// Ask the tutor one question about a step
    Ask {
        /// Pattern id
        id: String,

        question: String,

        /// 0-based step the question refers to
        #[arg(long, default_value = "0")]
        step: usize,
    },

    /// List tutor models available to the configured key
    Models {
        /// Also send a short greeting to the configured model
        #[arg(long)]
        check: bool,
    },

    /// Show configuration and progress summary
    Status {
        #[arg(long, value_enum, default_value = "text")]
        output_format: OutputFormat,
    },
}

fn resolve_config_path(path: String) -> String {
    let expanded = match path.strip_prefix("~/") {
        Some(rest) => dirs::home_dir()
            .map(|h| h.join(rest).to_string_lossy().to_string())
            .unwrap_or(path.clone()),
        None => path.clone(),
    };
    if Path::new(&expanded).is_absolute() {
        expanded
    } else {
        std::env::current_dir()
            .map(|cwd| cwd.join(&expanded).to_string_lossy().to_string())
            .unwrap_or(expanded)
    }
}

pub async fn run() -> Result<()> {
    let cli = Cli::parse();

    if cli.no_color || std::env::var("NO_COLOR").is_ok() {
        colored::control::set_override(false);
    }

    let command = cli.command.unwrap_or(Commands::Learn { pattern: None });
    if !matches!(command, Commands::Learn { .. }) {
        init_tracing(cli.quiet);
    }

    let config_path = cli.config.map(resolve_config_path);
    let config = Config::load(config_path.as_deref())
        .map_err(|e| CodefluxError::Config(format!("{:#}", e)))?;
    style::set_ascii_mode(config.ui.ascii);

    match command {
        Commands::Learn { pattern } => learn(&config, pattern).await,
        Commands::Patterns { output_format } => list_patterns(&config, output_format),
        Commands::Play {
            id,
            array,
            window,
            fast,
        } => play(&config, &id, array, window, fast, cli.quiet).await,
        Commands::Quiz {
            id,
            count,
            answers,
            seed,
        } => take_quiz(&config, &id, count, answers, seed),
        Commands::Note { id, text } => note(&config, &id, text),
        Commands::Ask { id, question, step } => ask(&config, &id, &question, step).await,
        Commands::Models { check } => models(&config, check).await,
        Commands::Status { output_format } => status(&config, output_format),
    }
}

/// Load bundled records plus the content directory. Bad records are
/// reported and skipped; only an empty result is fatal.
fn load_patterns(config: &Config) -> Result<Arc<PatternStore>> {
    let report = PatternStore::load_with_dir(config.content.dir.as_deref());
    for failure in &report.failures {
        warn!("Skipping pattern record: {}", failure);
    }
    if report.store.is_empty() {
        return Err(CodefluxError::Content(ContentError::Empty).into());
    }
    info!("Loaded {} patterns", report.store.len());
    Ok(Arc::new(report.store))
}

fn open_tracker(config: &Config) -> Result<ProgressTracker> {
    let path = config.storage.resolved_path();
    let store = FileStore::open(&path).map_err(CodefluxError::from)?;
    Ok(ProgressTracker::new(Arc::new(store)))
}

fn find_pattern(patterns: &PatternStore, id: &str) -> Result<Arc<Pattern>> {
    patterns
        .get(id)
        .ok_or_else(|| CodefluxError::Content(ContentError::UnknownPattern(id.to_string())).into())
}

fn flow_settings(config: &Config) -> FlowSettings {
    FlowSettings {
        delays: PlaybackDelays::from(&config.animation),
        quiz_questions: config.content.quiz_questions,
    }
}

fn log_dir(config: &Config) -> PathBuf {
    config.ui.log_dir.clone().unwrap_or_else(|| {
        config
            .storage
            .resolved_path()
            .parent()
            .map(|p| p.join("logs"))
            .unwrap_or_else(|| PathBuf::from("logs"))
    })
}

async fn learn(config: &Config, pattern: Option<String>) -> Result<()> {
    let _log_guard = init_file_tracing(&log_dir(config));

    let patterns = load_patterns(config)?;
    let tracker = open_tracker(config)?;
    let tutor: Arc<dyn TutorClient> = Arc::new(GeminiClient::new(&config.tutor)?);

    let (ticks_tx, ticks_rx) = unbounded_channel();
    let flow = LessonFlow::new(
        patterns,
        tracker,
        flow_settings(config),
        ticks_tx,
        Box::new(RandomChooser::new()),
    );
    let mut app = App::new(
        flow,
        config.content.dir.clone(),
        Duration::from_millis(config.storage.note_debounce_ms),
    );
    if let Some(id) = pattern {
        app.jump_to(&id)?;
    }

    let runtime = tokio::runtime::Handle::current();
    let tagline_every = Duration::from_millis(config.animation.tagline_ms.max(1));
    tokio::task::block_in_place(|| tui::run(app, ticks_rx, tutor, runtime, tagline_every))
}

fn list_patterns(config: &Config, format: OutputFormat) -> Result<()> {
    let patterns = load_patterns(config)?;
    let tracker = open_tracker(config)?;
    let rows = tracker.snapshot(&patterns.ids())?;

    match format {
        OutputFormat::Json => {
            let items: Vec<serde_json::Value> = patterns
                .patterns()
                .iter()
                .zip(&rows)
                .map(|(pattern, row)| {
                    serde_json::json!({
                        "id": pattern.id,
                        "name": pattern.name,
                        "difficulty": pattern.difficulty.label(),
                        "steps": pattern.step_count(),
                        "status": row.status,
                        "quiz_score": row.quiz_score,
                        "has_note": row.has_note,
                    })
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&items)?);
        }
        OutputFormat::Text => {
            println!("\n{}\n", "Patterns".title());
            for (pattern, row) in patterns.patterns().iter().zip(&rows) {
                let score = row
                    .quiz_score
                    .as_deref()
                    .map(|s| format!("  quiz {}", s))
                    .unwrap_or_default();
                println!(
                    "   {} {} {}  {}  {}{}",
                    Glyphs::status(row.status),
                    pattern.name.as_str().pattern_name(),
                    format!("({})", pattern.id).muted(),
                    difficulty_label(pattern.difficulty),
                    status_label(row.status),
                    score.muted()
                );
            }
            println!();
        }
    }
    Ok(())
}

fn array_line(input: &LessonInput, view: &StepView) -> String {
    input
        .array
        .iter()
        .enumerate()
        .map(|(i, v)| {
            let marked = match &view.overlay {
                Overlay::Window(range) => range.contains(&i),
                Overlay::Pointers(p) => i == p.left || i == p.right,
                Overlay::Runners(r) => i == r.slow || i == r.fast,
                Overlay::None => false,
            };
            if marked {
                format!("[{}]", v)
            } else {
                format!(" {} ", v)
            }
        })
        .collect::<Vec<_>>()
        .join("")
}

fn print_step(pattern: &Pattern, input: &LessonInput, view: &StepView) {
    println!(
        "{} {}",
        format!("Step {}/{}", view.step_index + 1, view.step_count).title(),
        view.caption
    );
    if let Some(line) = view
        .code_line
        .and_then(|l| pattern.code.first().and_then(|c| c.lines.get(l)))
    {
        println!("   {} {}", Glyphs::arrow(), line.trim().code());
    }
    if let Some(reason) = view.reason {
        println!("   {} {}", Glyphs::bulb(), reason.warning());
    }
    if view.overlay != Overlay::None && !input.array.is_empty() {
        println!("   {}", array_line(input, view));
    }
}

/// Walk a pattern's steps on the real playback timer, printing each change.
async fn play(
    config: &Config,
    id: &str,
    array: Option<String>,
    window: Option<String>,
    fast: bool,
    quiet: bool,
) -> Result<()> {
    let patterns = load_patterns(config)?;
    let tracker = open_tracker(config)?;
    let (ticks_tx, mut ticks_rx) = unbounded_channel();
    let mut flow = LessonFlow::new(
        patterns,
        tracker,
        flow_settings(config),
        ticks_tx,
        Box::new(RandomChooser::new()),
    );

    flow.advance()?;
    flow.select_pattern(id)?;
    while flow.screen() != Screen::Input {
        flow.advance()?;
    }
    for (value, names) in [(array, ARRAY_FIELDS), (window, WINDOW_FIELDS)] {
        let Some(value) = value else { continue };
        let field = flow
            .inputs()
            .iter()
            .find(|f| names.contains(&f.name.as_str()))
            .map(|f| f.name.clone())
            .unwrap_or_else(|| names[0].to_string());
        flow.set_input(&field, &value)
            .with_context(|| format!("Pattern '{}' has no '{}' input", id, field))?;
    }
    flow.advance()?;

    let pattern = flow
        .pattern()
        .cloned()
        .ok_or(crate::errors::FlowError::NoPatternSelected)?;
    if let Some(input) = flow.lesson_input() {
        for issue in &input.issues {
            println!("{} {}", Glyphs::warning(), issue.to_string().warning());
        }
    }
    if !quiet {
        println!("\n{}\n", pattern.name.as_str().pattern_name());
    }

    let mode = if fast {
        PlaybackMode::Fast
    } else {
        PlaybackMode::Guided
    };
    let mut last_shown = None;
    let mut finished = flow.play(mode)?.is_some();

    loop {
        if let (Some(animator), Some(input)) = (flow.animator(), flow.lesson_input()) {
            let state = animator.state();
            let key = (state.step_index, state.phase);
            if last_shown != Some(key) && state.step_count > 0 {
                let view = step_view(&pattern, input, &state, 0);
                if state.phase == Phase::Apply || mode == PlaybackMode::Guided {
                    print_step(&pattern, input, &view);
                }
                last_shown = Some(key);
            }
        }
        if finished || crate::is_shutdown_requested() {
            break;
        }
        let Some(tick) = ticks_rx.recv().await else {
            break;
        };
        finished = flow.on_tick(tick)?.is_some();
    }

    if finished {
        println!(
            "\n{} {}",
            Glyphs::completed(),
            "Walkthrough complete".success()
        );
    }
    Ok(())
}

fn read_answer(question_number: usize, option_count: usize) -> Result<usize> {
    let stdin = io::stdin();
    loop {
        print!("   Answer {} (1-{}): ", question_number, option_count);
        io::stdout().flush()?;
        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            bail!("Input closed before the quiz was finished");
        }
        match line.trim().parse::<usize>() {
            Ok(n) if (1..=option_count).contains(&n) => return Ok(n - 1),
            _ => println!("   {}", "Please enter one of the option numbers.".warning()),
        }
    }
}

fn take_quiz(
    config: &Config,
    id: &str,
    count: Option<usize>,
    answers: Option<Vec<usize>>,
    seed: Option<u64>,
) -> Result<()> {
    let patterns = load_patterns(config)?;
    let tracker = open_tracker(config)?;
    let pattern = find_pattern(&patterns, id)?;

    let mut chooser = match seed {
        Some(seed) => RandomChooser::seeded(seed),
        None => RandomChooser::new(),
    };
    let count = count.unwrap_or(config.content.quiz_questions);
    let mut session = open_session(&pattern.name, &pattern.quiz, count, &mut chooser);

    println!("\n{} {}\n", pattern.name.as_str().pattern_name(), "quiz".title());
    let questions = session.questions().to_vec();
    for (q, question) in questions.iter().enumerate() {
        println!("{}. {}", q + 1, question.prompt);
        for (o, option) in question.options.iter().enumerate() {
            println!("   {} {}", format!("{})", o + 1).muted(), option);
        }
        let choice = match &answers {
            Some(answers) => answers.get(q).copied(),
            None => Some(read_answer(q + 1, question.options.len())?),
        };
        if let Some(choice) = choice {
            session.select(q, choice).map_err(CodefluxError::from)?;
        }
        println!();
    }

    let outcome = session.submit();
    tracker.record_quiz(&pattern.id, &outcome)?;
    match &outcome {
        QuizOutcome::Scored(_) => {
            for (q, question) in questions.iter().enumerate() {
                let picked = session.selections().get(q).copied().flatten();
                let mark = if picked == Some(question.correct) {
                    Glyphs::completed().to_string()
                } else {
                    format!(
                        "{} correct: {}",
                        Glyphs::warning(),
                        question
                            .options
                            .get(question.correct)
                            .map(String::as_str)
                            .unwrap_or("?")
                    )
                };
                println!("   {}. {}", q + 1, mark);
                if let Some(explanation) = &question.explanation {
                    println!("      {}", explanation.as_str().muted());
                }
            }
            println!("\n{}", outcome.feedback().success());
        }
        QuizOutcome::NeedsAllAnswers { .. } => bail!("{}", outcome.feedback()),
    }
    Ok(())
}

fn note(config: &Config, id: &str, text: Option<String>) -> Result<()> {
    let patterns = load_patterns(config)?;
    let tracker = open_tracker(config)?;
    let pattern = find_pattern(&patterns, id)?;

    match text {
        Some(text) => {
            tracker.set_note(&pattern.id, &text)?;
            println!("{} Note saved for {}", Glyphs::completed(), pattern.name);
        }
        None => {
            let note = tracker.note(&pattern.id)?;
            if note.is_empty() {
                println!("{}", "No note yet.".muted());
            } else {
                println!("{}", note);
            }
        }
    }
    Ok(())
}

async fn ask(config: &Config, id: &str, question: &str, step: usize) -> Result<()> {
    let patterns = load_patterns(config)?;
    let pattern = find_pattern(&patterns, id)?;
    let client = GeminiClient::new(&config.tutor)?;
    if !client.has_credential() {
        return Err(CodefluxError::Tutor(TutorError::MissingCredential).into());
    }

    let step = step.min(pattern.step_count().saturating_sub(1));
    let code = pattern
        .code
        .first()
        .and_then(|listing| {
            view::code_line(pattern.steps.get(step), step, listing.lines.len())
                .and_then(|l| listing.lines.get(l))
        })
        .map(|line| line.trim().to_string())
        .unwrap_or_default();
    let Some(prompt) = build_prompt(&pattern.name, step, &code, question) else {
        bail!("Question is empty");
    };

    let reply = client.ask(&prompt).await.map_err(CodefluxError::from)?;
    println!("{} {}", Glyphs::tutor(), reply);
    Ok(())
}

async fn models(config: &Config, check: bool) -> Result<()> {
    let client = GeminiClient::new(&config.tutor)?;
    let models = client.list_models().await.map_err(CodefluxError::from)?;

    println!("\n{}\n", "Tutor models".title());
    for model in models.iter().filter(|m| m.can_generate()) {
        let marker = if model.short_name() == client.model() {
            Glyphs::arrow()
        } else {
            " "
        };
        println!(
            " {} {} {}",
            marker,
            model.short_name().emphasis(),
            model.display_name.as_deref().unwrap_or("").muted()
        );
    }
    println!();

    if check {
        let greeting = client.check().await.map_err(CodefluxError::from)?;
        println!(" {} {}\n", Glyphs::tutor(), greeting.trim());
    }
    Ok(())
}

fn status(config: &Config, format: OutputFormat) -> Result<()> {
    let patterns = load_patterns(config)?;
    let tracker = open_tracker(config)?;
    let rows = tracker.snapshot(&patterns.ids())?;
    let completed = rows
        .iter()
        .filter(|r| r.status == ProgressStatus::Completed)
        .count();
    let in_progress = rows
        .iter()
        .filter(|r| r.status == ProgressStatus::InProgress)
        .count();
    let store_path = config.storage.resolved_path();

    match format {
        OutputFormat::Json => {
            let status = serde_json::json!({
                "model": config.tutor.model,
                "endpoint": config.tutor.endpoint,
                "tutor_configured": config.tutor.credential().is_some(),
                "store": store_path,
                "content_dir": config.content.dir,
                "patterns": {
                    "total": rows.len(),
                    "completed": completed,
                    "in_progress": in_progress
                }
            });
            println!("{}", serde_json::to_string_pretty(&status)?);
        }
        OutputFormat::Text => {
            println!("\n{}\n", "CodeFlux Status".title());
            let tutor = if config.tutor.credential().is_some() {
                "configured".success()
            } else {
                "no API key".warning()
            };
            println!(
                "   {} Tutor: {} ({})",
                Glyphs::tutor(),
                config.tutor.model.as_str().emphasis(),
                tutor
            );
            println!(
                "   {} Store: {}",
                Glyphs::bullet(),
                store_path.display().to_string().muted()
            );
            if let Some(dir) = &config.content.dir {
                println!(
                    "   {} Content: {}",
                    Glyphs::bullet(),
                    dir.display().to_string().muted()
                );
            }
            println!(
                "\n   {} Patterns: {} ({} completed, {} in progress)\n",
                Glyphs::bulb(),
                rows.len().to_string().emphasis(),
                completed.to_string().success(),
                in_progress.to_string().muted()
            );
        }
    }
    Ok(())
}
