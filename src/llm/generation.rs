//! Commit message generation
//!
//! Sends one streamed request and turns whatever came back into a
//! [`CommitMessage`], applying the timeout policy:
//!
//! | stream outcome                       | result                   |
//! |--------------------------------------|--------------------------|
//! | any `error` field                    | `GenerationError`        |
//! | response text                        | message (`partial` if timed out) |
//! | timed out, thinking only             | `TimedOutThinkingOnly`   |
//! | timed out, nothing usable            | `TimedOutNoOutput`       |
//! | finished, no stage extracts anything | `ParseFailure`           |
//! | finished, empty body or thinking only | `EmptyResponse`         |

use std::time::{Duration, Instant};

use crate::error::{OcmError, Result};
use crate::llm::parser::ParserChain;
use crate::llm::prompt::build_commit_prompt;
use crate::llm::{CommitMessage, GenerationRequest, ModelService, RawResponse};

/// Generate a commit message for `diff` with `model`
pub async fn generate(
    service: &dyn ModelService,
    parsers: &ParserChain,
    model: &str,
    diff: &str,
    timeout: Duration,
) -> Result<CommitMessage> {
    let request = GenerationRequest::new(model, build_commit_prompt(diff));

    let started = Instant::now();
    let raw = service.generate_raw(&request, timeout).await?;
    tracing::debug!(
        "Received {} line(s) in {:.1}s (timed out: {})",
        raw.lines.len(),
        started.elapsed().as_secs_f32(),
        raw.timed_out
    );

    assemble_message(parsers, &raw, timeout)
}

/// Turn collected response lines into a commit message
pub fn assemble_message(
    parsers: &ParserChain,
    raw: &RawResponse,
    timeout: Duration,
) -> Result<CommitMessage> {
    let timeout_secs = timeout.as_secs();

    if raw.is_blank() {
        return Err(if raw.timed_out {
            OcmError::TimedOutNoOutput { timeout_secs }
        } else {
            OcmError::EmptyResponse
        });
    }

    let parsed = match parsers.parse(raw) {
        Err(err @ OcmError::ParseFailure { .. }) if raw.timed_out => {
            tracing::debug!("Nothing usable before the deadline: {}", err);
            return Err(OcmError::TimedOutNoOutput { timeout_secs });
        }
        other => other?,
    };

    if let Some(error) = parsed.fragments.iter().find_map(|f| f.error.as_deref()) {
        tracing::debug!("Server reported error in stream: {}", error);
        return Err(OcmError::GenerationError(error.to_string()));
    }

    let joined: String = parsed.fragments.iter().map(|f| f.text.as_str()).collect();
    let text = normalize_whitespace(&clean_commit_response(&joined));

    if !text.is_empty() {
        if raw.timed_out {
            tracing::warn!("Generation timed out after {}s; message may be incomplete", timeout_secs);
        }
        return Ok(CommitMessage {
            text,
            partial: raw.timed_out,
            stage: parsed.stage,
        });
    }

    if !raw.timed_out {
        return Err(OcmError::EmptyResponse);
    }
    if parsed.fragments.iter().any(|f| f.has_thinking()) {
        Err(OcmError::TimedOutThinkingOnly { timeout_secs })
    } else {
        Err(OcmError::TimedOutNoOutput { timeout_secs })
    }
}

/// Collapse every whitespace run to one space and trim the ends
pub fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Remove a markdown code fence wrapped around the message
///
/// An opening fence may carry a short language tag. A missing closing fence
/// (output cut short) still strips the opening one.
pub fn clean_commit_response(response: &str) -> String {
    let trimmed = response.trim();

    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed.to_string();
    };

    let body = match rest.split_once('\n') {
        Some((tag, body)) if tag.trim().len() <= 20 && !tag.trim().contains(' ') => body,
        _ => rest,
    };

    body.trim_end()
        .strip_suffix("```")
        .unwrap_or(body)
        .trim()
        .to_string()
}
