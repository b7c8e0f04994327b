use serde_json::{Map, Value};

use super::{FragmentParser, ParserStage};
use crate::llm::ResponseFragment;

/// Tolerant JSON parser for lines that are almost, but not quite, JSON
///
/// Recovers from:
/// - SSE style `data:` prefixes, byte-order marks and surrounding text
/// - several objects concatenated on one line
/// - trailing commas and raw control characters inside strings
/// - a line cut off before its closing quote or brace
/// - non-string `error` values
pub struct PermissiveParser;

impl FragmentParser for PermissiveParser {
    fn stage(&self) -> ParserStage {
        ParserStage::Permissive
    }

    fn parse_line(&self, line: &str) -> Option<ResponseFragment> {
        let cleaned = clean_line(line);
        let objects = recover_objects(cleaned);
        if objects.is_empty() {
            tracing::debug!("Permissive parse found no object in line");
            return None;
        }
        Some(merge_objects(&objects))
    }
}

fn clean_line(line: &str) -> &str {
    let trimmed = line.trim().trim_start_matches('\u{feff}');
    trimmed
        .strip_prefix("data:")
        .map(str::trim_start)
        .unwrap_or(trimmed)
}

/// Collect every JSON object recoverable from `text`
fn recover_objects(text: &str) -> Vec<Map<String, Value>> {
    let Some(start) = text.find('{') else {
        return Vec::new();
    };

    // fast path: one or more well-formed objects back to back
    let mut objects = Vec::new();
    let stream = serde_json::Deserializer::from_str(&text[start..]).into_iter::<Value>();
    for value in stream {
        match value {
            Ok(Value::Object(map)) => objects.push(map),
            _ => break,
        }
    }
    if !objects.is_empty() {
        return objects;
    }

    // slow path: balanced-brace extraction + repair, trying each '{' in turn
    for (idx, _) in text.match_indices('{') {
        let candidate = balanced_object(&text[idx..]);
        let repaired = repair_json(&candidate);
        if let Ok(Value::Object(map)) = serde_json::from_str::<Value>(&repaired) {
            return vec![map];
        }
    }

    Vec::new()
}

/// Slice out the object starting at `text[0] == '{'`, closing it if truncated
///
/// Tracks brace depth while respecting string literals and escapes, so
/// `{"msg": "use { and } carefully"}` is handled.
fn balanced_object(text: &str) -> String {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escape_next = false;

    for (idx, ch) in text.char_indices() {
        if escape_next {
            escape_next = false;
            continue;
        }
        match ch {
            '\\' if in_string => escape_next = true,
            '"' => in_string = !in_string,
            '{' if !in_string => depth += 1,
            '}' if !in_string => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return text[..=idx].to_string();
                }
            }
            _ => {}
        }
    }

    // truncated: close the open string and every open brace
    let mut closed = text.trim_end().to_string();
    if escape_next {
        closed.pop();
    }
    if in_string {
        closed.push('"');
    }
    closed.push_str(&"}".repeat(depth));
    closed
}

/// Drop trailing commas and escape raw control characters inside strings
fn repair_json(candidate: &str) -> String {
    let mut out = String::with_capacity(candidate.len());
    let mut in_string = false;
    let mut escape_next = false;

    for (idx, ch) in candidate.char_indices() {
        if in_string {
            if escape_next {
                escape_next = false;
                out.push(ch);
                continue;
            }
            match ch {
                '\\' => {
                    escape_next = true;
                    out.push(ch);
                }
                '"' => {
                    in_string = false;
                    out.push(ch);
                }
                '\n' => out.push_str("\\n"),
                '\r' => out.push_str("\\r"),
                '\t' => out.push_str("\\t"),
                c if c.is_control() => out.push_str(&format!("\\u{:04x}", c as u32)),
                c => out.push(c),
            }
            continue;
        }

        match ch {
            '"' => {
                in_string = true;
                out.push(ch);
            }
            ',' if candidate[idx + 1..]
                .trim_start()
                .starts_with(['}', ']']) => {}
            c => out.push(c),
        }
    }

    out
}

/// Fold the fields of one or more objects into a single fragment
fn merge_objects(objects: &[Map<String, Value>]) -> ResponseFragment {
    let mut fragment = ResponseFragment::default();

    for object in objects {
        if let Some(text) = object.get("response").and_then(value_as_text) {
            fragment.text.push_str(&text);
        }
        if let Some(thinking) = object.get("thinking").and_then(value_as_text) {
            fragment
                .thinking
                .get_or_insert_with(String::new)
                .push_str(&thinking);
        }
        if object.get("done").is_some_and(value_as_flag) {
            fragment.is_final = true;
        }
        if fragment.error.is_none() {
            fragment.error = object.get("error").and_then(value_as_error);
        }
    }

    fragment
}

fn value_as_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn value_as_flag(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::String(s) => s.eq_ignore_ascii_case("true"),
        _ => false,
    }
}

fn value_as_error(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Object(map) => map
            .get("message")
            .and_then(Value::as_str)
            .map(str::to_string)
            .or_else(|| Some(value.to_string())),
        other => Some(other.to_string()),
    }
}
