//! Configuration Management
//!
//! Loads CodeFlux settings from TOML files.
//! Configuration includes:
//! - Tutor settings (endpoint, model, credential, timeout, retries)
//! - Playback timing for the step animator
//! - Where progress is stored and how often notes are saved
//! - Where extra pattern content lives

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub tutor: TutorConfig,

    #[serde(default)]
    pub animation: AnimationConfig,

    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub content: ContentConfig,

    #[serde(default)]
    pub ui: UiConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TutorConfig {
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_model")]
    pub model: String,
    /// Never written back out; comes from the file or the environment.
    #[serde(default, skip_serializing)]
    pub api_key: Option<String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    #[serde(default = "default_initial_delay_ms")]
    pub initial_delay_ms: u64,
}

impl Default for TutorConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            model: default_model(),
            api_key: None,
            timeout_secs: default_timeout_secs(),
            max_retries: default_max_retries(),
            initial_delay_ms: default_initial_delay_ms(),
        }
    }
}

impl TutorConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.max(1))
    }

    /// The credential, ignoring blank values.
    pub fn credential(&self) -> Option<&str> {
        self.api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
    }
}

/// Playback timing for the step animator
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnimationConfig {
    /// Delay between half-steps in guided playback (explain, then apply)
    #[serde(default = "default_guided_delay_ms")]
    pub guided_delay_ms: u64,
    /// Delay between steps in fast playback
    #[serde(default = "default_fast_delay_ms")]
    pub fast_delay_ms: u64,
    /// How often the landing tagline rotates
    #[serde(default = "default_tagline_ms")]
    pub tagline_ms: u64,
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            guided_delay_ms: default_guided_delay_ms(),
            fast_delay_ms: default_fast_delay_ms(),
            tagline_ms: default_tagline_ms(),
        }
    }
}

impl AnimationConfig {
    pub fn guided_delay(&self) -> Duration {
        Duration::from_millis(self.guided_delay_ms.max(1))
    }

    pub fn fast_delay(&self) -> Duration {
        Duration::from_millis(self.fast_delay_ms.max(1))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Store file; defaults to `<data dir>/codeflux/store.json`
    #[serde(default)]
    pub path: Option<PathBuf>,
    /// Quiet period before an edited note is written
    #[serde(default = "default_note_debounce_ms")]
    pub note_debounce_ms: u64,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            path: None,
            note_debounce_ms: default_note_debounce_ms(),
        }
    }
}

impl StorageConfig {
    pub fn resolved_path(&self) -> PathBuf {
        self.path.clone().unwrap_or_else(|| {
            dirs::data_local_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("codeflux")
                .join("store.json")
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentConfig {
    /// Directory of extra `*.json` pattern records (and `assets/videos/`)
    #[serde(default)]
    pub dir: Option<PathBuf>,
    /// Questions drawn per quiz
    #[serde(default = "default_quiz_questions")]
    pub quiz_questions: usize,
}

impl Default for ContentConfig {
    fn default() -> Self {
        Self {
            dir: None,
            quiz_questions: default_quiz_questions(),
        }
    }
}

/// UI configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UiConfig {
    /// Plain ASCII glyphs instead of emoji
    #[serde(default)]
    pub ascii: bool,
    /// Where the TUI writes its log; defaults next to the store
    #[serde(default)]
    pub log_dir: Option<PathBuf>,
}

fn default_endpoint() -> String {
    "https://generativelanguage.googleapis.com/v1beta".to_string()
}
fn default_model() -> String {
    "gemini-1.5-flash".to_string()
}
fn default_timeout_secs() -> u64 {
    30
}
fn default_max_retries() -> u32 {
    2
}
fn default_initial_delay_ms() -> u64 {
    500
}
fn default_guided_delay_ms() -> u64 {
    1200
}
fn default_fast_delay_ms() -> u64 {
    2000
}
fn default_tagline_ms() -> u64 {
    3000
}
fn default_note_debounce_ms() -> u64 {
    500
}
fn default_quiz_questions() -> usize {
    3
}

impl Config {
    pub fn load(path: Option<&str>) -> Result<Self> {
        let mut config: Config = match path {
            Some(p) => {
                let content = std::fs::read_to_string(p)
                    .with_context(|| format!("Failed to read config from {}", p))?;
                toml::from_str(&content).context("Failed to parse config")?
            }
            None => {
                let home_config = dirs::home_dir()
                    .map(|h| h.join(".config/codeflux/config.toml"))
                    .and_then(|p| p.to_str().map(String::from));

                let mut default_paths: Vec<String> = vec!["codeflux.toml".to_string()];
                if let Some(hc) = home_config {
                    default_paths.push(hc);
                }

                let mut loaded = None;
                for p in &default_paths {
                    if let Ok(content) = std::fs::read_to_string(p) {
                        loaded = Some(toml::from_str(&content).context("Failed to parse config")?);
                        tracing::debug!("Loaded config from {}", p);
                        break;
                    }
                }
                loaded.unwrap_or_default()
            }
        };

        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Override settings from the environment.
    ///
    /// Takes a lookup function so tests can supply variables without touching
    /// the process environment.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(endpoint) = lookup("CODEFLUX_ENDPOINT") {
            self.tutor.endpoint = endpoint;
        }
        if let Some(model) = lookup("CODEFLUX_MODEL") {
            self.tutor.model = model;
        }
        let api_key = lookup("CODEFLUX_API_KEY")
            .or_else(|| lookup("GEMINI_API_KEY"))
            .or_else(|| lookup("VITE_GEMINI_API_KEY"));
        if let Some(api_key) = api_key {
            self.tutor.api_key = Some(api_key);
        }
        if let Some(timeout) = lookup("CODEFLUX_TIMEOUT") {
            if let Ok(t) = timeout.parse::<u64>() {
                self.tutor.timeout_secs = t;
            }
        }
        if let Some(dir) = lookup("CODEFLUX_CONTENT_DIR") {
            self.content.dir = Some(PathBuf::from(dir));
        }
        if let Some(store) = lookup("CODEFLUX_STORE") {
            self.storage.path = Some(PathBuf::from(store));
        }
    }
}
