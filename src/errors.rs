use std::path::PathBuf;
use thiserror::Error;

/// The central error type for CodeFlux.
///
/// Groups the content, tutor, storage and navigation failures so the binary
/// can map any of them to a stable exit code.
#[derive(Error, Debug)]
pub enum CodefluxError {
    #[error("Content error: {0}")]
    Content(#[from] ContentError),

    #[error("Tutor error: {0}")]
    Tutor(#[from] TutorError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Navigation error: {0}")]
    Flow(#[from] FlowError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// A bundled or user-supplied pattern record could not be used.
#[derive(Error, Debug)]
pub enum ContentError {
    #[error("Failed to parse pattern record '{source_name}': {message}")]
    Parse {
        source_name: String,
        message: String,
    },

    #[error("Pattern record '{source_name}' has no id and no file name to derive one from")]
    MissingId { source_name: String },

    #[error("Failed to read content directory {path}: {message}")]
    Read { path: PathBuf, message: String },

    #[error("No pattern records could be loaded")]
    Empty,

    #[error("Unknown pattern '{0}'")]
    UnknownPattern(String),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TutorError {
    #[error("No tutor API key configured. Set CODEFLUX_API_KEY or GEMINI_API_KEY.")]
    MissingCredential,

    #[error("Tutor request timed out after {seconds} seconds")]
    Timeout { seconds: u64 },

    #[error("Tutor service returned status {status}: {message}")]
    HttpStatus { status: u16, message: String },

    #[error("Failed to parse tutor response: {0}")]
    Parse(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Tutor returned no text")]
    EmptyResponse,
}

impl TutorError {
    /// Message shown inline in the tutor widget.
    ///
    /// Configuration problems are spelled out so the learner can fix them;
    /// every remote failure collapses to one generic line.
    pub fn user_message(&self) -> String {
        match self {
            TutorError::MissingCredential => self.to_string(),
            _ => "AI connection failed.".to_string(),
        }
    }
}

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Failed to read store at {path}: {message}")]
    Read { path: PathBuf, message: String },

    #[error("Failed to write store at {path}: {message}")]
    Write { path: PathBuf, message: String },

    #[error("Store at {path} is corrupted: {message}")]
    Corrupted { path: PathBuf, message: String },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FlowError {
    #[error("Cannot {action} from the {from} screen")]
    InvalidTransition { from: String, action: String },

    #[error("No pattern selected")]
    NoPatternSelected,

    #[error("Unknown pattern '{0}'")]
    UnknownPattern(String),

    #[error("Unknown input field '{0}'")]
    UnknownField(String),

    #[error("Question {question} has no option {option}")]
    InvalidOption { question: usize, option: usize },
}

pub type Result<T> = std::result::Result<T, CodefluxError>;

pub const EXIT_SUCCESS: u8 = 0;
pub const EXIT_ERROR: u8 = 1;
pub const EXIT_CONFIG_ERROR: u8 = 2;
pub const EXIT_CONTENT_ERROR: u8 = 3;
pub const EXIT_TUTOR_ERROR: u8 = 4;
pub const EXIT_STORAGE_ERROR: u8 = 5;

/// Determine the appropriate process exit code for an error.
pub fn get_exit_code(e: &anyhow::Error) -> u8 {
    if let Some(err) = e.downcast_ref::<CodefluxError>() {
        return match err {
            CodefluxError::Config(_) => EXIT_CONFIG_ERROR,
            CodefluxError::Content(_) => EXIT_CONTENT_ERROR,
            CodefluxError::Tutor(TutorError::MissingCredential) => EXIT_CONFIG_ERROR,
            CodefluxError::Tutor(_) => EXIT_TUTOR_ERROR,
            CodefluxError::Storage(_) => EXIT_STORAGE_ERROR,
            _ => EXIT_ERROR,
        };
    }

    if let Some(err) = e.downcast_ref::<TutorError>() {
        return match err {
            TutorError::MissingCredential => EXIT_CONFIG_ERROR,
            _ => EXIT_TUTOR_ERROR,
        };
    }
    if e.downcast_ref::<ContentError>().is_some() {
        return EXIT_CONTENT_ERROR;
    }
    if e.downcast_ref::<StorageError>().is_some() {
        return EXIT_STORAGE_ERROR;
    }

    // Errors wrapped in plain anyhow context carry no type to inspect.
    let msg = e.to_string().to_lowercase();
    if msg.contains("config") {
        return EXIT_CONFIG_ERROR;
    }

    EXIT_ERROR
}
