use std::sync::LazyLock;

use regex_lite::Regex;

use super::{FragmentParser, ParserStage, unescape_json_string};
use crate::llm::ResponseFragment;

static RESPONSE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#""response"\s*:\s*"((?:[^"\\]|\\.)*)""#).expect("valid regex"));
static THINKING_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#""thinking"\s*:\s*"((?:[^"\\]|\\.)*)""#).expect("valid regex"));
static ERROR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#""error"\s*:\s*"((?:[^"\\]|\\.)*)""#).expect("valid regex"));
static DONE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#""done"\s*:\s*(true|false)"#).expect("valid regex"));

/// Last-resort parser: pulls the known fields out of arbitrary text
///
/// Lines in which no field matches are skipped instead of failing the
/// stage; the stage fails only when no line matched at all.
pub struct PatternParser;

fn captured(re: &Regex, line: &str) -> Option<String> {
    let values: Vec<String> = re
        .captures_iter(line)
        .filter_map(|caps| caps.get(1))
        .map(|m| unescape_json_string(m.as_str()))
        .collect();
    (!values.is_empty()).then(|| values.concat())
}

impl FragmentParser for PatternParser {
    fn stage(&self) -> ParserStage {
        ParserStage::Pattern
    }

    fn parse_line(&self, line: &str) -> Option<ResponseFragment> {
        let text = captured(&RESPONSE_RE, line);
        let thinking = captured(&THINKING_RE, line);
        let error = captured(&ERROR_RE, line);
        let done = DONE_RE
            .captures(line)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str() == "true");

        if text.is_none() && thinking.is_none() && error.is_none() && done.is_none() {
            return None;
        }

        Some(ResponseFragment {
            text: text.unwrap_or_default(),
            thinking,
            is_final: done.unwrap_or(false),
            error,
        })
    }

    fn parse_lines(&self, lines: &[String]) -> Option<Vec<ResponseFragment>> {
        let candidates: Vec<&String> = lines.iter().filter(|l| !l.trim().is_empty()).collect();
        if candidates.is_empty() {
            return Some(Vec::new());
        }

        let fragments: Vec<ResponseFragment> = candidates
            .iter()
            .filter_map(|line| {
                let fragment = self.parse_line(line);
                if fragment.is_none() {
                    tracing::debug!("Pattern stage skipped unmatched line");
                }
                fragment
            })
            .collect();

        (!fragments.is_empty()).then_some(fragments)
    }
}
