//! Text formatting for card fields.

use serde_json::Value;

pub const NOT_AVAILABLE: &str = "not available";
pub const TRUNCATION_MARKER: &str = " ... (truncated)";
pub const NO_ENTITIES: &str = "No entities detected.";
pub const NO_MODEL_RESPONSE: &str = "No Gemini response (fallback used)";

/// Two-decimal rendering used for every numeric field.
pub fn two_decimals(value: f64) -> String {
    format!("{:.2}", value)
}

pub fn optional_two_decimals(value: Option<f64>) -> String {
    value
        .map(two_decimals)
        .unwrap_or_else(|| NOT_AVAILABLE.to_string())
}

/// Shortest exact rendering, e.g. `0.0042` stays `0.0042` and `1.0` becomes `1`.
pub fn optional_number(value: Option<f64>) -> String {
    value
        .map(|v| v.to_string())
        .unwrap_or_else(|| NOT_AVAILABLE.to_string())
}

/// Cut `text` after `limit` characters and append [`TRUNCATION_MARKER`].
/// Text of exactly `limit` characters is returned unchanged.
pub fn truncate_with_marker(text: &str, limit: usize) -> String {
    match text.char_indices().nth(limit) {
        Some((idx, _)) => format!("{}{}", &text[..idx], TRUNCATION_MARKER),
        None => text.to_string(),
    }
}

/// `parseFloat` semantics: numbers as-is, strings by their leading numeric
/// prefix ("0.8 (high)" -> 0.8), everything else is not a number.
pub fn parse_float_like(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(text) => parse_float_prefix(text),
        _ => None,
    }
}

fn parse_float_prefix(text: &str) -> Option<f64> {
    let s = text.trim_start();
    let bytes = s.as_bytes();
    let digit_run = |start: usize| {
        bytes
            .get(start..)
            .map_or(0, |rest| rest.iter().take_while(|b| b.is_ascii_digit()).count())
    };

    let mut end = usize::from(matches!(bytes.first(), Some(b'+' | b'-')));
    let int_digits = digit_run(end);
    end += int_digits;

    if bytes.get(end) == Some(&b'.') {
        let frac_digits = digit_run(end + 1);
        if int_digits == 0 && frac_digits == 0 {
            return None;
        }
        end += 1 + frac_digits;
    } else if int_digits == 0 {
        return None;
    }

    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let mut exp_end = end + 1;
        if matches!(bytes.get(exp_end), Some(b'+' | b'-')) {
            exp_end += 1;
        }
        let exp_digits = digit_run(exp_end);
        if exp_digits > 0 {
            end = exp_end + exp_digits;
        }
    }

    s[..end].parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Human-readable text for a scalar JSON value; empty strings count as missing.
pub fn value_text(value: &Value) -> Option<String> {
    match value {
        Value::String(text) if !text.trim().is_empty() => Some(text.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        _ => None,
    }
}

pub fn yes_no(flag: bool) -> &'static str {
    if flag {
        "Yes"
    } else {
        "No"
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SentimentTone {
    Positive,
    Negative,
    #[default]
    Neutral,
}

impl SentimentTone {
    pub fn from_score(score: f64) -> Self {
        if score < -0.2 {
            SentimentTone::Negative
        } else if score > 0.2 {
            SentimentTone::Positive
        } else {
            SentimentTone::Neutral
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeverityTier {
    High,
    Medium,
    Low,
}

impl SeverityTier {
    pub fn from_severity(severity: f64) -> Self {
        if severity > 0.7 {
            SeverityTier::High
        } else if severity > 0.4 {
            SeverityTier::Medium
        } else {
            SeverityTier::Low
        }
    }
}

/// "0.70/1.0" style severity, or [`NOT_AVAILABLE`].
pub fn format_severity(severity: Option<f64>) -> (String, Option<SeverityTier>) {
    match severity {
        Some(value) => (
            format!("{}/1.0", two_decimals(value)),
            Some(SeverityTier::from_severity(value)),
        ),
        None => (NOT_AVAILABLE.to_string(), None),
    }
}

/// Names for the numeric entity type codes of the natural language API.
fn entity_type_name(code: u64) -> Option<&'static str> {
    Some(match code {
        0 => "UNKNOWN",
        1 => "PERSON",
        2 => "LOCATION",
        3 => "ORGANIZATION",
        4 => "EVENT",
        5 => "WORK_OF_ART",
        6 => "CONSUMER_GOOD",
        7 => "OTHER",
        9 => "PHONE_NUMBER",
        10 => "ADDRESS",
        11 => "DATE",
        12 => "NUMBER",
        13 => "PRICE",
        _ => return None,
    })
}

/// Entity type label. Accepts names, numeric codes and Python enum reprs
/// such as `Type.EVENT` or `<Type.EVENT: 4>`.
pub fn entity_type_label(value: &Value) -> Option<String> {
    match value {
        Value::Number(n) => n
            .as_u64()
            .and_then(entity_type_name)
            .map(str::to_string)
            .or_else(|| Some(n.to_string())),
        Value::String(text) => {
            let trimmed = text.trim().trim_start_matches('<').trim_end_matches('>');
            if trimmed.is_empty() {
                return None;
            }
            let name = trimmed.split(':').next().unwrap_or(trimmed);
            let name = name.rsplit('.').next().unwrap_or(name).trim();
            Some(name.to_string())
        }
        _ => None,
    }
}

pub fn intervention_kind_label(kind: &str) -> String {
    match kind {
        "clarification" => "Clarification".to_string(),
        "action_item" => "Action item".to_string(),
        "mediation" => "Mediation".to_string(),
        "generic" => "General".to_string(),
        other => other.replace('_', " "),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_severity_formatting() {
        for (value, expected) in [(0.0, "0.00/1.0"), (0.456, "0.46/1.0"), (0.7, "0.70/1.0"), (1.0, "1.00/1.0")] {
            assert_eq!(format_severity(Some(value)).0, expected);
        }
        assert_eq!(format_severity(None), (NOT_AVAILABLE.to_string(), None));
    }

    #[test]
    fn test_severity_tiers() {
        assert_eq!(SeverityTier::from_severity(0.71), SeverityTier::High);
        assert_eq!(SeverityTier::from_severity(0.7), SeverityTier::Medium);
        assert_eq!(SeverityTier::from_severity(0.41), SeverityTier::Medium);
        assert_eq!(SeverityTier::from_severity(0.4), SeverityTier::Low);
    }

    #[test]
    fn test_sentiment_tone_thresholds() {
        assert_eq!(SentimentTone::from_score(-0.6), SentimentTone::Negative);
        assert_eq!(SentimentTone::from_score(-0.2), SentimentTone::Neutral);
        assert_eq!(SentimentTone::from_score(0.2), SentimentTone::Neutral);
        assert_eq!(SentimentTone::from_score(0.7), SentimentTone::Positive);
    }

    #[test]
    fn test_parse_float_like() {
        assert_eq!(parse_float_like(&json!(0.8)), Some(0.8));
        assert_eq!(parse_float_like(&json!("0.65")), Some(0.65));
        assert_eq!(parse_float_like(&json!("  0.8 (high)")), Some(0.8));
        assert_eq!(parse_float_like(&json!(".5")), Some(0.5));
        assert_eq!(parse_float_like(&json!("-3e-1x")), Some(-0.3));
        assert_eq!(parse_float_like(&json!("1e")), Some(1.0));
        assert_eq!(parse_float_like(&json!("high")), None);
        assert_eq!(parse_float_like(&json!(".")), None);
        assert_eq!(parse_float_like(&json!("")), None);
        assert_eq!(parse_float_like(&json!(true)), None);
        assert_eq!(parse_float_like(&json!(null)), None);
    }

    #[test]
    fn test_truncation_boundary() {
        let exact = "a".repeat(500);
        assert_eq!(truncate_with_marker(&exact, 500), exact);

        let long = format!("{}b", "a".repeat(500));
        let truncated = truncate_with_marker(&long, 500);
        assert_eq!(truncated, format!("{}{}", "a".repeat(500), TRUNCATION_MARKER));
    }

    #[test]
    fn test_truncation_counts_characters() {
        let text = "é".repeat(3);
        assert_eq!(truncate_with_marker(&text, 2), format!("éé{}", TRUNCATION_MARKER));
    }

    #[test]
    fn test_entity_type_labels() {
        assert_eq!(entity_type_label(&json!(4)).as_deref(), Some("EVENT"));
        assert_eq!(entity_type_label(&json!(42)).as_deref(), Some("42"));
        assert_eq!(entity_type_label(&json!("ORGANIZATION")).as_deref(), Some("ORGANIZATION"));
        assert_eq!(entity_type_label(&json!("Type.EVENT")).as_deref(), Some("EVENT"));
        assert_eq!(entity_type_label(&json!("<Type.OTHER: 7>")).as_deref(), Some("OTHER"));
        assert_eq!(entity_type_label(&json!("")), None);
        assert_eq!(entity_type_label(&json!(null)), None);
    }
}
