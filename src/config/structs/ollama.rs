//! Generation service configuration.

use serde::{Deserialize, Serialize};

use crate::error::{OcmError, Result};

/// Default base URL of a local Ollama server
pub const DEFAULT_OLLAMA_ENDPOINT: &str = "http://localhost:11434";

/// Ollama server configuration.
///
/// When `model` is unset the first model reported by `/api/tags` is used.
///
/// ```toml
/// [ollama]
/// endpoint = "http://localhost:11434"
/// model = "qwen2.5-coder"
/// ```
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OllamaConfig {
    /// Base URL of the server (API paths are appended).
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Model name; sent verbatim, never validated against the server.
    #[serde(default)]
    pub model: Option<String>,
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            model: None,
        }
    }
}

impl OllamaConfig {
    pub fn validate(&self) -> Result<()> {
        if self.endpoint.trim().is_empty() {
            return Err(OcmError::Config("ollama.endpoint cannot be empty".into()));
        }
        if !self.endpoint.starts_with("http://") && !self.endpoint.starts_with("https://") {
            return Err(OcmError::Config(format!(
                "ollama.endpoint '{}' must start with http:// or https://",
                self.endpoint
            )));
        }
        Ok(())
    }

    /// Configured model name exactly as given, with blank values treated as unset
    pub fn configured_model(&self) -> Option<&str> {
        self.model.as_deref().filter(|m| !m.trim().is_empty())
    }
}

fn default_endpoint() -> String {
    DEFAULT_OLLAMA_ENDPOINT.to_string()
}
