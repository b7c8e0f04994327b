use serde::Deserialize;

use super::{FragmentParser, ParserStage};
use crate::llm::ResponseFragment;

/// One line of an `/api/generate` stream
///
/// Other fields the server sends (`model`, `created_at`, `context`, timing
/// counters) are ignored.
#[derive(Debug, Deserialize)]
struct GenerateLine {
    #[serde(default)]
    response: Option<String>,
    #[serde(default)]
    thinking: Option<String>,
    #[serde(default)]
    done: bool,
    #[serde(default)]
    error: Option<String>,
}

/// Strict typed parser: every line must be a well-formed JSON object
pub struct StructuredParser;

impl FragmentParser for StructuredParser {
    fn stage(&self) -> ParserStage {
        ParserStage::Structured
    }

    fn parse_line(&self, line: &str) -> Option<ResponseFragment> {
        let trimmed = line.trim();
        if !trimmed.starts_with('{') {
            return None;
        }
        match serde_json::from_str::<GenerateLine>(trimmed) {
            Ok(parsed) => Some(ResponseFragment {
                text: parsed.response.unwrap_or_default(),
                thinking: parsed.thinking,
                is_final: parsed.done,
                error: parsed.error,
            }),
            Err(e) => {
                tracing::debug!("Structured parse failed: {}", e);
                None
            }
        }
    }
}
