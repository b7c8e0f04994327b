//! Response line parsers
//!
//! Ollama streams one JSON object per line, but proxies and older servers
//! occasionally emit lines that are not quite valid JSON. Three stages with
//! decreasing strictness are available:
//!
//! - [`StructuredParser`] - typed `serde_json` deserialization
//! - [`PermissiveParser`] - recovers objects from prefixed, truncated or
//!   slightly malformed lines
//! - [`PatternParser`] - regex extraction of the known fields
//!
//! A [`ParserChain`] runs its stages in order over the *whole* line set and
//! keeps the output of the first stage that can interpret it. Outputs of
//! different stages are never combined.

mod pattern;
mod permissive;
mod structured;

pub use pattern::PatternParser;
pub use permissive::PermissiveParser;
pub use structured::StructuredParser;

use serde::{Deserialize, Serialize};

use crate::error::{OcmError, Result};
use crate::llm::{RawResponse, ResponseFragment};

/// Identifies a parser stage in configuration and diagnostics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParserStage {
    Structured,
    Permissive,
    Pattern,
}

impl ParserStage {
    pub fn name(&self) -> &'static str {
        match self {
            ParserStage::Structured => "structured",
            ParserStage::Permissive => "permissive",
            ParserStage::Pattern => "pattern",
        }
    }

    fn build(self) -> Box<dyn FragmentParser> {
        match self {
            ParserStage::Structured => Box::new(StructuredParser),
            ParserStage::Permissive => Box::new(PermissiveParser),
            ParserStage::Pattern => Box::new(PatternParser),
        }
    }
}

/// One parsing strategy for streamed response lines
pub trait FragmentParser: Send + Sync {
    fn stage(&self) -> ParserStage;

    /// Interpret a single non-blank line, `None` if this stage cannot.
    fn parse_line(&self, line: &str) -> Option<ResponseFragment>;

    /// Interpret a whole line set, `None` if this stage fails on it.
    ///
    /// Blank lines yield no fragment. The default is all-or-nothing: a
    /// single line the stage cannot interpret fails the stage.
    fn parse_lines(&self, lines: &[String]) -> Option<Vec<ResponseFragment>> {
        lines
            .iter()
            .filter(|line| !line.trim().is_empty())
            .map(|line| self.parse_line(line))
            .collect()
    }
}

/// Fragments produced by the stage that succeeded
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedResponse {
    pub stage: ParserStage,
    pub fragments: Vec<ResponseFragment>,
}

/// Ordered fallback chain of parser stages
///
/// Built once at startup from configuration and reused for every response.
pub struct ParserChain {
    parsers: Vec<Box<dyn FragmentParser>>,
}

impl ParserChain {
    pub fn new(stages: &[ParserStage]) -> Self {
        let parsers = stages.iter().map(|s| s.build()).collect();
        Self { parsers }
    }

    /// Names of the configured stages, in order
    pub fn stage_names(&self) -> Vec<&'static str> {
        self.parsers.iter().map(|p| p.stage().name()).collect()
    }

    /// Parse `raw` with the first stage able to interpret every line
    ///
    /// A stage that reads the lines but extracts no text, thinking or error
    /// from them counts as failed. Fails with [`OcmError::ParseFailure`]
    /// listing the stages tried and a preview of the raw body.
    pub fn parse(&self, raw: &RawResponse) -> Result<ParsedResponse> {
        for parser in &self.parsers {
            let stage = parser.stage();
            match parser.parse_lines(&raw.lines) {
                Some(fragments) if !fragments.iter().any(ResponseFragment::has_content) => {
                    tracing::debug!(
                        "Parser stage '{}' extracted nothing from {} fragment(s), falling through",
                        stage.name(),
                        fragments.len()
                    );
                }
                Some(fragments) => {
                    tracing::debug!(
                        "Parser stage '{}' produced {} fragment(s)",
                        stage.name(),
                        fragments.len()
                    );
                    return Ok(ParsedResponse { stage, fragments });
                }
                None => {
                    tracing::debug!(
                        "Parser stage '{}' failed, falling through",
                        stage.name()
                    );
                }
            }
        }

        Err(OcmError::ParseFailure {
            stages: self.stage_names(),
            preview: raw.preview(),
        })
    }
}

impl Default for ParserChain {
    fn default() -> Self {
        Self::new(&[
            ParserStage::Structured,
            ParserStage::Permissive,
            ParserStage::Pattern,
        ])
    }
}

/// Decode the body of a JSON string literal (without the quotes)
///
/// Falls back to a lenient decoder when the escapes are not strictly valid.
pub(crate) fn unescape_json_string(body: &str) -> String {
    if let Ok(decoded) = serde_json::from_str::<String>(&format!("\"{}\"", body)) {
        return decoded;
    }

    let mut out = String::with_capacity(body.len());
    let mut chars = body.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some('b') => out.push('\u{8}'),
            Some('f') => out.push('\u{c}'),
            Some('u') => {
                let hex: String = chars.by_ref().take(4).collect();
                match u32::from_str_radix(&hex, 16).ok().and_then(char::from_u32) {
                    Some(decoded) => out.push(decoded),
                    None => {
                        out.push_str("\\u");
                        out.push_str(&hex);
                    }
                }
            }
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}
