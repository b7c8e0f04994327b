//! Generation service abstractions and shared types.
//!
//! The commit flow talks to the model server only through [`ModelService`],
//! so model resolution and message assembly can be exercised without a
//! running server.

/// Message assembly from a streamed generation response.
pub mod generation;
/// Model name resolution.
pub mod model;
/// HTTP client for the Ollama API.
pub mod ollama;
/// Line parsers and the fallback chain.
pub mod parser;
/// Prompt construction.
pub mod prompt;

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::constants::PREVIEW_LENGTH;
use crate::error::Result;

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Body of a `POST /api/generate` request.
///
/// Built once per invocation and never modified afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GenerationRequest {
    model: String,
    prompt: String,
    stream: bool,
}

impl GenerationRequest {
    /// Streamed request for `model` with `prompt`.
    pub fn new(model: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            prompt: prompt.into(),
            stream: true,
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    pub fn stream(&self) -> bool {
        self.stream
    }
}

/// What one streamed response line contributed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResponseFragment {
    /// Generated text (`response`), possibly empty.
    pub text: String,
    /// Reasoning text (`thinking`); never part of the commit message.
    pub thinking: Option<String>,
    /// The server marked this as the last line (`done: true`).
    pub is_final: bool,
    /// Server-reported error (`error`).
    pub error: Option<String>,
}

impl ResponseFragment {
    pub fn has_error(&self) -> bool {
        self.error.is_some()
    }

    pub fn has_thinking(&self) -> bool {
        self.thinking.as_deref().is_some_and(|t| !t.is_empty())
    }

    /// Carries text, thinking or an error; a bare `done` flag does not count
    pub fn has_content(&self) -> bool {
        !self.text.is_empty() || self.has_thinking() || self.has_error()
    }
}

/// Lines read from a generation response before it ended or timed out.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawResponse {
    /// Complete lines in arrival order, without their line terminators.
    pub lines: Vec<String>,
    /// The deadline elapsed before the stream finished.
    pub timed_out: bool,
}

impl RawResponse {
    pub fn new(lines: Vec<String>, timed_out: bool) -> Self {
        Self { lines, timed_out }
    }

    /// True when every line is blank
    pub fn is_blank(&self) -> bool {
        self.lines.iter().all(|l| l.trim().is_empty())
    }

    /// Bounded preview of the raw body for diagnostics
    pub fn preview(&self) -> String {
        truncate_for_preview(&self.lines.join("\n"))
    }
}

/// Final commit message text produced by the generation step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitMessage {
    /// Whitespace-normalized message.
    pub text: String,
    /// The timeout cut the stream short; the text may be incomplete.
    pub partial: bool,
    /// Parser stage that produced the text.
    pub stage: parser::ParserStage,
}

/// A model reported by `GET /api/tags`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ModelInfo {
    pub name: String,
}

/// Operations of a local generation service.
///
/// Implemented by [`OllamaClient`](ollama::OllamaClient); mocked in tests.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait ModelService: Send + Sync {
    /// Installed models, in the order the server reports them.
    async fn list_models(&self) -> Result<Vec<ModelInfo>>;

    /// Send a generation request and collect response lines until the
    /// stream ends or `timeout` elapses.
    async fn generate_raw(
        &self,
        request: &GenerationRequest,
        timeout: Duration,
    ) -> Result<RawResponse>;
}

/// Truncate for error previews without splitting a multibyte character
pub fn truncate_for_preview(s: &str) -> String {
    if s.len() <= PREVIEW_LENGTH {
        return s.to_string();
    }
    let boundary = s
        .char_indices()
        .map(|(i, _)| i)
        .take_while(|&i| i <= PREVIEW_LENGTH)
        .last()
        .unwrap_or(0);
    format!("{}...", &s[..boundary])
}
