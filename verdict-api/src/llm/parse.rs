//! Parsing of model answers
//!
//! Models wrap JSON in Markdown fences, add prose around it, or return
//! something else entirely. Parsing never fails: the caller gets either the
//! typed value or the raw text back.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};

/// Outcome of parsing a model answer
#[derive(Debug, Clone, PartialEq)]
pub enum LlmOutput<T> {
    Parsed(T),
    Unparseable(String),
}

impl<T> LlmOutput<T> {
    pub fn parsed(self) -> Option<T> {
        match self {
            LlmOutput::Parsed(value) => Some(value),
            LlmOutput::Unparseable(_) => None,
        }
    }
}

/// Remove a surrounding ```` ```json ```` / ```` ``` ```` fence
pub fn strip_code_fences(text: &str) -> &str {
    let trimmed = text.trim();
    let body = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .unwrap_or(trimmed);
    let body = body.strip_suffix("```").unwrap_or(body);
    body.trim()
}

/// Parse the whole answer (fences stripped) as `T`
pub fn parse_json<T: DeserializeOwned>(raw: &str) -> LlmOutput<T> {
    match serde_json::from_str(strip_code_fences(raw)) {
        Ok(value) => LlmOutput::Parsed(value),
        Err(_) => LlmOutput::Unparseable(raw.to_string()),
    }
}

/// Parse the span from the first `{` to the last `}` as `T`
pub fn parse_embedded_object<T: DeserializeOwned>(raw: &str) -> LlmOutput<T> {
    let span = match (raw.find('{'), raw.rfind('}')) {
        (Some(start), Some(end)) if start < end => &raw[start..=end],
        _ => return LlmOutput::Unparseable(raw.to_string()),
    };

    match serde_json::from_str(span) {
        Ok(value) => LlmOutput::Parsed(value),
        Err(_) => LlmOutput::Unparseable(raw.to_string()),
    }
}

/// Field deserializer that turns a mistyped value into `None`
///
/// Use with `#[serde(default, deserialize_with = "lenient")]` so one bad
/// field does not discard the rest of the answer.
pub fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).ok())
}
