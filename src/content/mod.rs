//! Pattern Content
//!
//! Static teaching records, one per algorithmic pattern. Records are JSON,
//! compiled into the binary and optionally extended from a directory.
//! Loading is all-or-nothing per record but never per batch: a record that
//! fails to parse is reported and the rest are kept.

mod bundled;

pub use bundled::bundled_sources;

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::errors::ContentError;
use crate::quiz::Question;

/// How hard a pattern is, as labelled by its record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
    #[default]
    Unspecified,
}

impl Difficulty {
    pub fn parse(label: &str) -> Self {
        match label.trim().to_lowercase().as_str() {
            "easy" => Difficulty::Easy,
            "medium" => Difficulty::Medium,
            "hard" => Difficulty::Hard,
            _ => Difficulty::Unspecified,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
            Difficulty::Unspecified => "standard",
        }
    }
}

impl<'de> Deserialize<'de> for Difficulty {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let label = Option::<String>::deserialize(deserializer)?;
        Ok(label.map(|l| Difficulty::parse(&l)).unwrap_or_default())
    }
}

/// Which overlay the visualization draws on top of the input array.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum VisualKind {
    /// Trailing window of `k` elements ending at the current step
    #[default]
    Window,
    /// Left and right pointers closing in on each other
    TwoPointers,
    /// Slow and fast runners
    FastSlow,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Overview {
    #[serde(default)]
    pub what: String,
    #[serde(default)]
    pub when: String,
    #[serde(default)]
    pub complexity: String,
}

/// Source listing for one display language.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CodeListing {
    pub language: String,
    pub lines: Vec<String>,
}

/// One narrative step: the caption shown first, then the reason once the
/// step is applied. Pointer hints override the default overlay formulas.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NarrativeStep {
    pub popup: String,
    #[serde(default)]
    pub reason: String,
    #[serde(default)]
    pub line: Option<usize>,
    #[serde(default)]
    pub left: Option<usize>,
    #[serde(default)]
    pub right: Option<usize>,
    #[serde(default)]
    pub slow: Option<usize>,
    #[serde(default)]
    pub fast: Option<usize>,
}

/// A named input field with its default value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputField {
    pub name: String,
    pub value: String,
}

/// A loaded pattern record. Immutable once loaded.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Pattern {
    pub id: String,
    pub name: String,
    pub description: String,
    pub difficulty: Difficulty,
    pub overview: Overview,
    pub detect: Vec<String>,
    pub tips: Vec<String>,
    pub mistakes: Vec<String>,
    pub problems: Vec<String>,
    pub video: Option<String>,
    pub default_inputs: Vec<InputField>,
    pub code: Vec<CodeListing>,
    pub steps: Vec<NarrativeStep>,
    pub visual: VisualKind,
    pub quiz: Vec<Question>,
}

impl Pattern {
    pub fn step_count(&self) -> usize {
        self.steps.len()
    }

    /// Preview video for this pattern, if the asset exists on disk.
    pub fn video_asset(&self, content_dir: Option<&Path>) -> Option<PathBuf> {
        let path = content_dir?
            .join("assets")
            .join("videos")
            .join(format!("{}.mp4", self.id));
        path.is_file().then_some(path)
    }
}

/// Wire shape of a record. Accepts the older `codeSteps` layout as well.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawPattern {
    #[serde(default)]
    id: Option<String>,
    name: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    difficulty: Difficulty,
    #[serde(default)]
    overview: Overview,
    #[serde(default)]
    detect: Vec<String>,
    #[serde(default)]
    tips: Vec<String>,
    #[serde(default)]
    mistakes: Vec<String>,
    #[serde(default)]
    problems: Vec<String>,
    #[serde(default)]
    video: Option<String>,
    #[serde(default)]
    default_inputs: serde_json::Map<String, serde_json::Value>,
    #[serde(default)]
    code: Vec<CodeListing>,
    #[serde(default)]
    code_steps: Vec<LegacyCodeStep>,
    #[serde(default)]
    steps: Vec<NarrativeStep>,
    #[serde(default)]
    visual: VisualKind,
    #[serde(default)]
    quiz: Vec<Question>,
}

#[derive(Debug, Deserialize)]
struct LegacyCodeStep {
    code: String,
}

impl RawPattern {
    fn into_pattern(self, source_name: &str) -> Result<Pattern, ContentError> {
        let id = match self.id.filter(|id| !id.trim().is_empty()) {
            Some(id) => id,
            None => id_from_source(source_name).ok_or_else(|| ContentError::MissingId {
                source_name: source_name.to_string(),
            })?,
        };

        for (i, question) in self.quiz.iter().enumerate() {
            if question.correct >= question.options.len() {
                return Err(ContentError::Parse {
                    source_name: source_name.to_string(),
                    message: format!(
                        "quiz question {} marks option {} correct but has {} options",
                        i + 1,
                        question.correct,
                        question.options.len()
                    ),
                });
            }
        }

        let mut code = self.code;
        if code.is_empty() && !self.code_steps.is_empty() {
            code.push(CodeListing {
                language: "code".to_string(),
                lines: self.code_steps.into_iter().map(|s| s.code).collect(),
            });
        }

        let default_inputs = self
            .default_inputs
            .into_iter()
            .map(|(name, value)| InputField {
                name,
                value: match value {
                    serde_json::Value::String(s) => s,
                    other => other.to_string(),
                },
            })
            .collect();

        Ok(Pattern {
            id,
            name: self.name,
            description: self.description,
            difficulty: self.difficulty,
            overview: self.overview,
            detect: self.detect,
            tips: self.tips,
            mistakes: self.mistakes,
            problems: self.problems,
            video: self.video,
            default_inputs,
            code,
            steps: self.steps,
            visual: self.visual,
            quiz: self.quiz,
        })
    }
}

fn id_from_source(source_name: &str) -> Option<String> {
    Path::new(source_name)
        .file_stem()
        .and_then(|s| s.to_str())
        .filter(|s| !s.is_empty())
        .map(String::from)
}

/// Parse one record. The source name supplies the id when the record has none.
pub fn parse_pattern(source_name: &str, text: &str) -> Result<Pattern, ContentError> {
    let raw: RawPattern = serde_json::from_str(text).map_err(|e| ContentError::Parse {
        source_name: source_name.to_string(),
        message: e.to_string(),
    })?;
    raw.into_pattern(source_name)
}

/// Raw text of one record plus the name it came from (usually a file name).
#[derive(Debug, Clone)]
pub struct ContentSource {
    pub name: String,
    pub text: String,
}

impl ContentSource {
    pub fn new(name: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            text: text.into(),
        }
    }
}

/// Files read from a content directory plus the ones that could not be read.
#[derive(Debug, Default)]
pub struct DirSources {
    pub sources: Vec<ContentSource>,
    pub failures: Vec<ContentError>,
}

/// Read every `*.json` file in a directory, sorted by file name.
///
/// Only an unreadable directory is an error; a file that cannot be read is
/// recorded in `failures` and the rest are still returned.
pub fn sources_from_dir(dir: &Path) -> Result<DirSources, ContentError> {
    let mut paths: Vec<PathBuf> = std::fs::read_dir(dir)
        .map_err(|e| ContentError::Read {
            path: dir.to_path_buf(),
            message: e.to_string(),
        })?
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| p.is_file() && p.extension().and_then(|e| e.to_str()) == Some("json"))
        .collect();
    paths.sort();

    let mut found = DirSources::default();
    for path in paths {
        match std::fs::read_to_string(&path) {
            Ok(text) => {
                let name = path
                    .file_name()
                    .map(|n| n.to_string_lossy().to_string())
                    .unwrap_or_default();
                found.sources.push(ContentSource { name, text });
            }
            Err(e) => {
                warn!("Skipping unreadable pattern file {}: {}", path.display(), e);
                found.failures.push(ContentError::Read {
                    path,
                    message: e.to_string(),
                });
            }
        }
    }
    Ok(found)
}

/// Outcome of a load: the patterns that parsed and the records that did not.
#[derive(Debug)]
pub struct LoadReport {
    pub store: PatternStore,
    pub failures: Vec<ContentError>,
}

impl LoadReport {
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

/// The loaded patterns, sorted by display name.
#[derive(Debug, Clone, Default)]
pub struct PatternStore {
    patterns: Vec<Arc<Pattern>>,
}

impl PatternStore {
    /// Parse every source. A later source with the same id replaces an
    /// earlier one, so a content directory can override bundled records.
    pub fn load_all<I>(sources: I) -> LoadReport
    where
        I: IntoIterator<Item = ContentSource>,
    {
        let mut by_id: HashMap<String, Pattern> = HashMap::new();
        let mut failures = Vec::new();

        for source in sources {
            match parse_pattern(&source.name, &source.text) {
                Ok(pattern) => {
                    debug!("Loaded pattern '{}' from {}", pattern.id, source.name);
                    if let Some(previous) = by_id.insert(pattern.id.clone(), pattern) {
                        info!(
                            "Pattern '{}' from {} replaces an earlier record",
                            previous.id, source.name
                        );
                    }
                }
                Err(e) => {
                    warn!("Skipping pattern record: {}", e);
                    failures.push(e);
                }
            }
        }

        let mut patterns: Vec<Arc<Pattern>> = by_id.into_values().map(Arc::new).collect();
        patterns.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id)));

        LoadReport {
            store: PatternStore { patterns },
            failures,
        }
    }

    /// Bundled records, extended or overridden by `content_dir` when given.
    pub fn load_with_dir(content_dir: Option<&Path>) -> LoadReport {
        let mut sources = bundled_sources();
        let mut read_failures = Vec::new();
        if let Some(dir) = content_dir {
            match sources_from_dir(dir) {
                Ok(found) => {
                    sources.extend(found.sources);
                    read_failures = found.failures;
                }
                Err(e) => {
                    warn!("Ignoring content directory: {}", e);
                    read_failures.push(e);
                }
            }
        }

        let mut report = Self::load_all(sources);
        report.failures.splice(0..0, read_failures);
        report
    }

    pub fn get(&self, id: &str) -> Option<Arc<Pattern>> {
        self.patterns.iter().find(|p| p.id == id).cloned()
    }

    pub fn patterns(&self) -> &[Arc<Pattern>] {
        &self.patterns
    }

    pub fn ids(&self) -> Vec<String> {
        self.patterns.iter().map(|p| p.id.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}
