use thiserror::Error;

pub type Result<T> = std::result::Result<T, OcmError>;

#[derive(Error, Debug)]
pub enum OcmError {
    #[error("Git error: {0}")]
    Git(#[from] git2::Error),

    #[error("Git command failed: {0}")]
    GitCommand(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("Configuration parsing error: {0}")]
    ConfigParse(#[from] config::ConfigError),

    #[error("Prompt error: {0}")]
    Prompt(#[from] inquire::InquireError),

    #[error("No staged changes found")]
    NoStagedChanges,

    #[error("Generation service unavailable at {endpoint}: {detail}")]
    ServiceUnavailable { endpoint: String, detail: String },

    #[error("Generation service returned HTTP {status}: {message}")]
    ServiceStatus { status: u16, message: String },

    #[error("No models installed on the generation service")]
    NoModelsInstalled,

    #[error("Generation failed: {0}")]
    GenerationError(String),

    #[error("Timed out after {timeout_secs}s before any output was produced")]
    TimedOutNoOutput { timeout_secs: u64 },

    #[error("Timed out after {timeout_secs}s while the model was still thinking")]
    TimedOutThinkingOnly { timeout_secs: u64 },

    #[error("The model finished without producing a commit message")]
    EmptyResponse,

    /// No parser stage could extract text from a non-empty, non-error response.
    #[error("Failed to parse generation response (tried: {}). Raw response: {preview}", .stages.join(", "))]
    ParseFailure {
        stages: Vec<&'static str>,
        preview: String,
    },
}

impl OcmError {
    /// Actionable remedy for the error, if one exists
    pub fn suggestion(&self) -> Option<&str> {
        match self {
            OcmError::NoStagedChanges => Some("Run 'git add <files>' to stage your changes first"),
            OcmError::ServiceUnavailable { .. } => Some(
                "Start the Ollama server with 'ollama serve', or point OLLAMA_HOST / --endpoint at a running instance",
            ),
            OcmError::NoModelsInstalled => {
                Some("Install a model first, e.g. 'ollama pull llama3.2', or set OCM_MODEL")
            }
            OcmError::GenerationError(msg) if msg.contains("not found") => Some(
                "Check the model name with 'ollama list' and pull it with 'ollama pull <model>'",
            ),
            OcmError::TimedOutNoOutput { .. } => Some(
                "Raise the timeout with --timeout <secs> or OCM_TIMEOUT, or pick a smaller model",
            ),
            OcmError::TimedOutThinkingOnly { .. } => Some(
                "The model spent the whole budget reasoning. Raise the timeout with --timeout <secs> or OCM_TIMEOUT",
            ),
            OcmError::EmptyResponse => Some("Try again, or choose a different model with --model"),
            OcmError::ParseFailure { .. } => Some(
                "Enable every parser stage: set [parser] stages = [\"structured\", \"permissive\", \"pattern\"] in the config, and rerun with --verbose",
            ),
            OcmError::ServiceStatus { status, .. } if *status >= 500 => {
                Some("The generation service failed internally. Check the Ollama server logs")
            }
            OcmError::Network(_) => {
                Some("Check the endpoint URL, proxy settings and that the server is reachable")
            }
            _ => None,
        }
    }
}
