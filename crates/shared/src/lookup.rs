//! Ordered field lookups over loosely shaped section values.
//!
//! Each logical field has a list of candidate paths, tried in order; the first
//! path that resolves to a usable value wins. Callers supply the default.

use serde_json::Value;

/// A key path into nested objects, e.g. `["analysis", "nlp_analysis", "sentiment"]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LookupPath(pub &'static [&'static str]);

impl LookupPath {
    pub fn resolve<'a>(&self, root: &'a Value) -> Option<&'a Value> {
        self.0.iter().try_fold(root, |node, key| node.get(*key))
    }
}

/// First non-null value found along `paths`.
pub fn first_match<'a>(root: &'a Value, paths: &[LookupPath]) -> Option<&'a Value> {
    first_match_where(root, paths, |value| !value.is_null())
}

/// First value along `paths` accepted by `usable`. A value of the wrong shape
/// at an earlier path does not hide a good one further down.
pub fn first_match_where<'a>(
    root: &'a Value,
    paths: &[LookupPath],
    usable: impl Fn(&Value) -> bool,
) -> Option<&'a Value> {
    paths
        .iter()
        .filter_map(|path| path.resolve(root))
        .find(|value| usable(value))
}

/// Sentiment: nested NLP analysis first, then the analysis object itself.
pub const SENTIMENT_PATHS: &[LookupPath] = &[
    LookupPath(&["analysis", "nlp_analysis", "sentiment"]),
    LookupPath(&["analysis", "sentiment"]),
    LookupPath(&["nlp_analysis", "sentiment"]),
    LookupPath(&["sentiment"]),
];

pub const ENTITY_PATHS: &[LookupPath] = &[
    LookupPath(&["analysis", "nlp_analysis", "entities"]),
    LookupPath(&["analysis", "entities"]),
    LookupPath(&["nlp_analysis", "entities"]),
    LookupPath(&["entities"]),
];

pub const MODEL_RESPONSE_PATHS: &[LookupPath] = &[
    LookupPath(&["analysis", "gemini_response_text"]),
    LookupPath(&["gemini_response_text"]),
];

/// Warning attached by the backend when it fell back to its keyword heuristic.
pub const ANALYSIS_NOTE_PATHS: &[LookupPath] = &[
    LookupPath(&["analysis", "error"]),
    LookupPath(&["error"]),
];

pub const ENTITY_TYPE_PATHS: &[LookupPath] = &[LookupPath(&["type_"]), LookupPath(&["type"])];

pub const FRICTION_FLAG_PATHS: &[LookupPath] = &[
    LookupPath(&["friction_detected"]),
    LookupPath(&["misalignment_detected"]),
    LookupPath(&["detected"]),
];

pub const FRICTION_REASON_PATHS: &[LookupPath] = &[LookupPath(&["reason"])];

pub const FRICTION_SEVERITY_PATHS: &[LookupPath] = &[LookupPath(&["severity"])];

pub const INTERVENTION_FLAG_PATHS: &[LookupPath] = &[
    LookupPath(&["intervention_suggested"]),
    LookupPath(&["suggested"]),
];

pub const INTERVENTION_TEXT_PATHS: &[LookupPath] = &[LookupPath(&["suggestion"])];

pub const INTERVENTION_KIND_PATHS: &[LookupPath] = &[LookupPath(&["type"])];
