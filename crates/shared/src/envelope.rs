//! Response envelope returned by `/api/process_message`.
//!
//! The backend is not consistent about how it serializes result sections: a
//! section may arrive as a JSON object, as a JSON string, or as the `repr` of a
//! Python dict (single quotes, `None`/`True`/`False`). Every section goes
//! through [`decode_section`], which never fails: anything that cannot be
//! decoded is kept as [`SectionPayload::Unparsed`] and logged.

use serde_json::Value;
use std::iter::Peekable;
use std::str::Chars;

/// Envelope keys
pub const ERROR_KEY: &str = "error";
pub const COMMUNICATION_ANALYSIS_KEY: &str = "communication_analysis";
pub const KNOWLEDGE_UPDATE_KEY: &str = "knowledge_update_status";
pub const FRICTION_DETECTION_KEY: &str = "friction_detection";
pub const INTERVENTION_SUGGESTION_KEY: &str = "intervention_suggestion";

const EXCERPT_CHARS: usize = 120;

#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("invalid JSON ({strict}); invalid after literal rewrite ({tolerant})")]
    Unparseable {
        strict: serde_json::Error,
        tolerant: serde_json::Error,
    },
}

/// One result section after decoding.
#[derive(Debug, Clone, PartialEq)]
pub enum SectionPayload {
    Structured(Value),
    /// Text that failed both decoding stages, kept verbatim
    Unparsed(String),
}

impl SectionPayload {
    /// The decoded value, or `None` when the section could not be decoded.
    pub fn structured(&self) -> Option<&Value> {
        match self {
            SectionPayload::Structured(value) => Some(value),
            SectionPayload::Unparsed(_) => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResponseEnvelope {
    pub error: Option<String>,
    pub communication_analysis: Option<SectionPayload>,
    pub knowledge_update_status: Option<Value>,
    pub friction_detection: Option<SectionPayload>,
    pub intervention_suggestion: Option<SectionPayload>,
}

impl ResponseEnvelope {
    /// Split a response body into its sections. Keys whose value is falsy
    /// (null, false, 0, "") count as absent.
    pub fn from_value(value: Value) -> Self {
        let mut map = match value {
            Value::Object(map) => map,
            other => {
                tracing::warn!(kind = value_kind(&other), "response body is not an object");
                return Self::default();
            }
        };

        let mut take = |key: &str| map.remove(key).filter(is_truthy);

        let error = take(ERROR_KEY).map(|value| match value {
            Value::String(text) => text,
            other => other.to_string(),
        });
        let communication_analysis = take(COMMUNICATION_ANALYSIS_KEY)
            .map(|value| decode_section(COMMUNICATION_ANALYSIS_KEY, value));
        let knowledge_update_status = take(KNOWLEDGE_UPDATE_KEY);
        let friction_detection =
            take(FRICTION_DETECTION_KEY).map(|value| decode_section(FRICTION_DETECTION_KEY, value));
        let intervention_suggestion = take(INTERVENTION_SUGGESTION_KEY)
            .map(|value| decode_section(INTERVENTION_SUGGESTION_KEY, value));

        Self {
            error,
            communication_analysis,
            knowledge_update_status,
            friction_detection,
            intervention_suggestion,
        }
    }
}

/// JavaScript truthiness, which is what decides whether a section is shown.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(n) => n.as_f64().map_or(true, |v| v != 0.0 && !v.is_nan()),
        Value::String(text) => !text.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Decode a section value. Strings go through the two-stage decoder, every
/// other value is already structured.
pub fn decode_section(section: &str, value: Value) -> SectionPayload {
    match value {
        Value::String(text) => match decode_text(&text) {
            Ok(decoded) => SectionPayload::Structured(decoded),
            Err(err) => {
                tracing::warn!(
                    section,
                    error = %err,
                    excerpt = %excerpt(&text),
                    "could not decode section payload"
                );
                SectionPayload::Unparsed(text)
            }
        },
        other => SectionPayload::Structured(other),
    }
}

/// Strict JSON first, then JSON after [`rewrite_python_literal`].
pub fn decode_text(text: &str) -> Result<Value, DecodeError> {
    let strict = match serde_json::from_str::<Value>(text) {
        Ok(value) => return Ok(value),
        Err(err) => err,
    };
    let rewritten = rewrite_python_literal(text);
    serde_json::from_str::<Value>(&rewritten).map_err(|tolerant| {
        tracing::debug!(rewritten = %excerpt(&rewritten), "literal rewrite did not produce JSON");
        DecodeError::Unparseable { strict, tolerant }
    })
}

/// Rewrite a Python literal into JSON text.
///
/// Single-quoted strings become double-quoted (inner `"` escaped, `\'`
/// unescaped) and the bare words `None`, `True`, `False` become `null`,
/// `true`, `false`. Words inside strings are left alone.
pub fn rewrite_python_literal(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '\'' | '"' => {
                out.push('"');
                copy_string_body(&mut chars, &mut out, c);
            }
            c if c.is_ascii_alphabetic() || c == '_' => {
                let mut word = String::from(c);
                while let Some(&next) = chars.peek() {
                    if next.is_ascii_alphanumeric() || next == '_' {
                        word.push(next);
                        chars.next();
                    } else {
                        break;
                    }
                }
                out.push_str(match word.as_str() {
                    "None" => "null",
                    "True" => "true",
                    "False" => "false",
                    other => other,
                });
            }
            other => out.push(other),
        }
    }

    out
}

fn copy_string_body(chars: &mut Peekable<Chars<'_>>, out: &mut String, delimiter: char) {
    while let Some(c) = chars.next() {
        match c {
            '\\' => match chars.next() {
                Some('\'') => out.push('\''),
                Some(escaped) => {
                    out.push('\\');
                    out.push(escaped);
                }
                None => out.push('\\'),
            },
            '"' if delimiter == '\'' => out.push_str("\\\""),
            c if c == delimiter => {
                out.push('"');
                return;
            }
            other => out.push(other),
        }
    }
}

fn excerpt(text: &str) -> String {
    match text.char_indices().nth(EXCERPT_CHARS) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
