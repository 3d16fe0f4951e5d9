//! Canonical results extracted from decoded sections.

use serde_json::Value;

use crate::envelope::SectionPayload;
use crate::format::{entity_type_label, parse_float_like, value_text};
use crate::lookup::{
    first_match, first_match_where, ANALYSIS_NOTE_PATHS, ENTITY_PATHS, ENTITY_TYPE_PATHS, FRICTION_FLAG_PATHS,
    FRICTION_REASON_PATHS, FRICTION_SEVERITY_PATHS, INTERVENTION_FLAG_PATHS,
    INTERVENTION_KIND_PATHS, INTERVENTION_TEXT_PATHS, MODEL_RESPONSE_PATHS, SENTIMENT_PATHS,
};

pub const UNKNOWN: &str = "Unknown";

/// Boolean flags arrive as `true` or as "True"/"true" strings. Anything else is false.
pub fn coerce_bool(value: &Value) -> bool {
    match value {
        Value::Bool(flag) => *flag,
        Value::String(text) => text.eq_ignore_ascii_case("true"),
        _ => false,
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SentimentResult {
    pub score: Option<f64>,
    pub magnitude: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EntityRecord {
    pub name: String,
    pub kind: String,
    pub salience: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct CommunicationResult {
    pub sentiment: Option<SentimentResult>,
    pub entities: Vec<EntityRecord>,
    pub model_response: Option<String>,
    /// Set when the backend analysed the message with its fallback heuristic
    pub note: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct FrictionResult {
    pub detected: bool,
    pub reason: Option<String>,
    pub severity: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct InterventionResult {
    pub suggested: bool,
    pub suggestion: Option<String>,
    pub kind: Option<String>,
}

/// Sentiment as either `{score, magnitude}` or a bare score. A bare score
/// implies `magnitude = |score|`.
pub fn extract_sentiment(analysis: &Value) -> Option<SentimentResult> {
    let sentiment = first_match_where(analysis, SENTIMENT_PATHS, |value| {
        value.is_object() || parse_float_like(value).is_some()
    })?;
    match sentiment {
        Value::Object(fields) => Some(SentimentResult {
            score: fields.get("score").and_then(parse_float_like),
            magnitude: fields.get("magnitude").and_then(parse_float_like),
        }),
        bare => parse_float_like(bare).map(|score| SentimentResult {
            score: Some(score),
            magnitude: Some(score.abs()),
        }),
    }
}

/// Entities in emission order. A missing or non-list value yields no entities.
pub fn extract_entities(analysis: &Value) -> Vec<EntityRecord> {
    let entities = first_match_where(analysis, ENTITY_PATHS, Value::is_array);
    let Some(Value::Array(items)) = entities else {
        return Vec::new();
    };
    items.iter().map(entity_record).collect()
}

fn entity_record(item: &Value) -> EntityRecord {
    match item {
        Value::Object(_) => EntityRecord {
            name: item
                .get("name")
                .and_then(value_text)
                .unwrap_or_else(|| UNKNOWN.to_string()),
            kind: first_match(item, ENTITY_TYPE_PATHS)
                .and_then(entity_type_label)
                .unwrap_or_else(|| UNKNOWN.to_string()),
            salience: item.get("salience").and_then(parse_float_like),
        },
        other => EntityRecord {
            name: value_text(other).unwrap_or_else(|| UNKNOWN.to_string()),
            kind: UNKNOWN.to_string(),
            salience: None,
        },
    }
}

pub fn extract_communication(section: &SectionPayload) -> CommunicationResult {
    let Some(analysis) = section.structured() else {
        return CommunicationResult::default();
    };
    CommunicationResult {
        sentiment: extract_sentiment(analysis),
        entities: extract_entities(analysis),
        model_response: first_match(analysis, MODEL_RESPONSE_PATHS).and_then(value_text),
        note: first_match(analysis, ANALYSIS_NOTE_PATHS).and_then(value_text),
    }
}

pub fn extract_friction(section: &SectionPayload) -> FrictionResult {
    let Some(friction) = section.structured() else {
        return FrictionResult::default();
    };
    FrictionResult {
        detected: first_match(friction, FRICTION_FLAG_PATHS).map_or(false, coerce_bool),
        reason: first_match(friction, FRICTION_REASON_PATHS).and_then(value_text),
        severity: first_match(friction, FRICTION_SEVERITY_PATHS).and_then(parse_float_like),
    }
}

pub fn extract_intervention(section: &SectionPayload) -> InterventionResult {
    let Some(intervention) = section.structured() else {
        return InterventionResult::default();
    };
    InterventionResult {
        suggested: first_match(intervention, INTERVENTION_FLAG_PATHS).map_or(false, coerce_bool),
        suggestion: first_match(intervention, INTERVENTION_TEXT_PATHS).and_then(value_text),
        kind: first_match(intervention, INTERVENTION_KIND_PATHS).and_then(value_text),
    }
}
