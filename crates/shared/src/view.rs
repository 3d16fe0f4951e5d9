//! View model for the results area.
//!
//! `ResultsView` is the rendering surface: the UI only draws what is stored
//! here. [`render`] rebuilds every result card from an envelope, so nothing
//! from a previous cycle survives behind a hidden card.

use serde_json::Value;

use crate::envelope::ResponseEnvelope;
use crate::format::{
    format_severity, intervention_kind_label, optional_number, optional_two_decimals,
    truncate_with_marker, yes_no, SentimentTone, SeverityTier, NOT_AVAILABLE, NO_ENTITIES,
    NO_MODEL_RESPONSE,
};
use crate::sections::{
    extract_communication, extract_friction, extract_intervention, EntityRecord,
};
use crate::settings::ClientSettings;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CardId {
    OriginalMessage,
    CommunicationAnalysis,
    KnowledgeUpdate,
    FrictionDetection,
    InterventionSuggestion,
}

impl CardId {
    pub const ALL: [CardId; 5] = [
        CardId::OriginalMessage,
        CardId::CommunicationAnalysis,
        CardId::KnowledgeUpdate,
        CardId::FrictionDetection,
        CardId::InterventionSuggestion,
    ];

    /// Stable identifier of the card on the rendering surface
    pub fn element_id(self) -> &'static str {
        match self {
            CardId::OriginalMessage => "original_message_card",
            CardId::CommunicationAnalysis => "communication_analysis_card",
            CardId::KnowledgeUpdate => "knowledge_update_card",
            CardId::FrictionDetection => "friction_detection_card",
            CardId::InterventionSuggestion => "intervention_suggestion_card",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            CardId::OriginalMessage => "Original Message",
            CardId::CommunicationAnalysis => "Communication Analysis",
            CardId::KnowledgeUpdate => "Knowledge Base Update",
            CardId::FrictionDetection => "Friction Detection",
            CardId::InterventionSuggestion => "Intervention Suggestion",
        }
    }
}

/// Truncation limits for free-form text fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderLimits {
    pub friction_reason: usize,
    pub suggestion: usize,
}

impl Default for RenderLimits {
    fn default() -> Self {
        Self {
            friction_reason: 500,
            suggestion: 1000,
        }
    }
}

impl From<&ClientSettings> for RenderLimits {
    fn from(settings: &ClientSettings) -> Self {
        Self {
            friction_reason: settings.friction_reason_limit,
            suggestion: settings.suggestion_limit,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct OriginalMessageCard {
    pub visible: bool,
    pub text: String,
    /// An image was attached; its preview may still be loading
    pub image_container_visible: bool,
    /// `data:` URI of the attached image once the local read has finished
    pub image_data_uri: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CommunicationCard {
    pub visible: bool,
    pub sentiment_score: String,
    pub sentiment_magnitude: String,
    pub sentiment_tone: SentimentTone,
    pub entities: Vec<String>,
    pub model_response: String,
    pub note: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct KnowledgeCard {
    pub visible: bool,
    pub status: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrictionCard {
    pub visible: bool,
    pub detected: bool,
    pub detected_text: String,
    pub reason: String,
    pub severity: String,
    pub severity_tier: Option<SeverityTier>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct InterventionCard {
    pub visible: bool,
    pub suggested: bool,
    pub suggested_text: String,
    pub kind: Option<String>,
    pub suggestion: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResultsView {
    pub loading: bool,
    pub error_message: Option<String>,
    pub original: OriginalMessageCard,
    pub communication: CommunicationCard,
    pub knowledge: KnowledgeCard,
    pub friction: FrictionCard,
    pub intervention: InterventionCard,
    scroll_to_results: bool,
}

impl ResultsView {
    /// Hide and clear every card except the original message.
    pub fn hide_result_cards(&mut self) {
        self.communication = CommunicationCard::default();
        self.knowledge = KnowledgeCard::default();
        self.friction = FrictionCard::default();
        self.intervention = InterventionCard::default();
    }

    pub fn is_visible(&self, card: CardId) -> bool {
        match card {
            CardId::OriginalMessage => self.original.visible,
            CardId::CommunicationAnalysis => self.communication.visible,
            CardId::KnowledgeUpdate => self.knowledge.visible,
            CardId::FrictionDetection => self.friction.visible,
            CardId::InterventionSuggestion => self.intervention.visible,
        }
    }

    pub fn visible_cards(&self) -> Vec<CardId> {
        CardId::ALL
            .into_iter()
            .filter(|card| self.is_visible(*card))
            .collect()
    }

    pub fn show_error(&mut self, message: impl Into<String>) {
        self.error_message = Some(message.into());
    }

    pub fn request_scroll_to_results(&mut self) {
        self.scroll_to_results = true;
    }

    /// Returns true once per scroll request.
    pub fn take_scroll_request(&mut self) -> bool {
        std::mem::take(&mut self.scroll_to_results)
    }
}

/// Write every section of `envelope` into `view`. Absent sections leave their
/// card hidden and empty.
pub fn render(envelope: &ResponseEnvelope, view: &mut ResultsView, limits: &RenderLimits) {
    view.hide_result_cards();

    if let Some(section) = &envelope.communication_analysis {
        let result = extract_communication(section);
        let (score, magnitude) = match result.sentiment {
            Some(sentiment) => (sentiment.score, sentiment.magnitude),
            None => (None, None),
        };
        view.communication = CommunicationCard {
            visible: true,
            sentiment_score: optional_two_decimals(score),
            sentiment_magnitude: optional_two_decimals(magnitude),
            sentiment_tone: score.map(SentimentTone::from_score).unwrap_or_default(),
            entities: entity_lines(&result.entities),
            model_response: result
                .model_response
                .unwrap_or_else(|| NO_MODEL_RESPONSE.to_string()),
            note: result.note,
        };
    }

    if let Some(status) = &envelope.knowledge_update_status {
        view.knowledge = KnowledgeCard {
            visible: true,
            status: match status {
                Value::String(text) => text.clone(),
                other => other.to_string(),
            },
        };
    }

    if let Some(section) = &envelope.friction_detection {
        let result = extract_friction(section);
        let (severity, severity_tier) = format_severity(result.severity);
        view.friction = FrictionCard {
            visible: true,
            detected: result.detected,
            detected_text: yes_no(result.detected).to_string(),
            reason: result
                .reason
                .map(|reason| truncate_with_marker(&reason, limits.friction_reason))
                .unwrap_or_else(|| NOT_AVAILABLE.to_string()),
            severity,
            severity_tier,
        };
    }

    if let Some(section) = &envelope.intervention_suggestion {
        let result = extract_intervention(section);
        view.intervention = InterventionCard {
            visible: true,
            suggested: result.suggested,
            suggested_text: yes_no(result.suggested).to_string(),
            kind: result.kind.as_deref().map(intervention_kind_label),
            suggestion: result
                .suggestion
                .map(|text| truncate_with_marker(&text, limits.suggestion))
                .unwrap_or_else(|| NOT_AVAILABLE.to_string()),
        };
    }
}

/// One line per entity, or a single placeholder line.
pub fn entity_lines(entities: &[EntityRecord]) -> Vec<String> {
    if entities.is_empty() {
        return vec![NO_ENTITIES.to_string()];
    }
    entities
        .iter()
        .map(|entity| {
            format!(
                "Name: {}, Type: {}, Salience: {}",
                entity.name,
                entity.kind,
                optional_number(entity.salience)
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::TRUNCATION_MARKER;
    use serde_json::json;

    fn rendered(body: Value) -> ResultsView {
        let mut view = ResultsView::default();
        render(
            &ResponseEnvelope::from_value(body),
            &mut view,
            &RenderLimits::default(),
        );
        view
    }

    #[test]
    fn test_friction_only_response() {
        let view = rendered(json!({
            "friction_detection": {"friction_detected": "True", "reason": "Deadline pressure", "severity": 0.8}
        }));
        assert_eq!(view.visible_cards(), vec![CardId::FrictionDetection]);
        assert_eq!(view.friction.detected_text, "Yes");
        assert_eq!(view.friction.severity, "0.80/1.0");
        assert_eq!(view.friction.severity_tier, Some(SeverityTier::High));
    }

    #[test]
    fn test_full_response() {
        let view = rendered(json!({
            "communication_analysis": {
                "analysis": {
                    "gemini_response_text": "The author is frustrated by repeated delays.",
                    "nlp_analysis": {
                        "sentiment": {"score": -0.6, "magnitude": 0.6},
                        "entities": [{"name": "delays", "type_": "EVENT", "salience": 0.8}]
                    }
                },
                "friction": {"friction_detected": true}
            },
            "knowledge_update_status": "Context stored for message_42",
            "friction_detection": "{'friction_detected': True, 'reason': 'Negative sentiment detected', 'severity': 0.6}",
            "intervention_suggestion": {
                "intervention_suggested": true,
                "type": "action_item",
                "suggestion": "Schedule a 15-minute call to clarify the timeline."
            }
        }));

        assert_eq!(
            view.visible_cards(),
            vec![
                CardId::CommunicationAnalysis,
                CardId::KnowledgeUpdate,
                CardId::FrictionDetection,
                CardId::InterventionSuggestion,
            ]
        );
        assert_eq!(view.communication.sentiment_score, "-0.60");
        assert_eq!(view.communication.sentiment_magnitude, "0.60");
        assert_eq!(view.communication.sentiment_tone, SentimentTone::Negative);
        assert_eq!(
            view.communication.entities,
            vec!["Name: delays, Type: EVENT, Salience: 0.8".to_string()]
        );
        assert_eq!(view.knowledge.status, "Context stored for message_42");
        assert_eq!(view.friction.reason, "Negative sentiment detected");
        assert_eq!(view.friction.severity_tier, Some(SeverityTier::Medium));
        assert_eq!(view.intervention.kind.as_deref(), Some("Action item"));
        assert_eq!(view.intervention.suggested_text, "Yes");
    }

    #[test]
    fn test_entity_lines() {
        assert_eq!(entity_lines(&[]), vec![NO_ENTITIES.to_string()]);

        let lines = entity_lines(&[
            EntityRecord {
                name: "Alice".into(),
                kind: "PERSON".into(),
                salience: Some(0.5),
            },
            EntityRecord {
                name: "Unknown".into(),
                kind: "Unknown".into(),
                salience: None,
            },
        ]);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], "Name: Alice, Type: PERSON, Salience: 0.5");
        assert_eq!(lines[1], "Name: Unknown, Type: Unknown, Salience: not available");

        let faint = entity_lines(&[EntityRecord {
            name: "roadmap".into(),
            kind: "OTHER".into(),
            salience: Some(0.0042),
        }]);
        assert_eq!(faint[0], "Name: roadmap, Type: OTHER, Salience: 0.0042");
    }

    #[test]
    fn test_unparsed_communication_shows_placeholders() {
        let view = rendered(json!({"communication_analysis": "<AnalyzeSentimentResponse>"}));
        assert!(view.communication.visible);
        assert_eq!(view.communication.sentiment_score, NOT_AVAILABLE);
        assert_eq!(view.communication.sentiment_magnitude, NOT_AVAILABLE);
        assert_eq!(view.communication.sentiment_tone, SentimentTone::Neutral);
        assert_eq!(view.communication.entities, vec![NO_ENTITIES.to_string()]);
        assert_eq!(view.communication.model_response, NO_MODEL_RESPONSE);
    }

    #[test]
    fn test_text_limits() {
        let view = rendered(json!({
            "friction_detection": {"friction_detected": true, "reason": "r".repeat(501)},
            "intervention_suggestion": {"intervention_suggested": true, "suggestion": "s".repeat(1000)}
        }));
        assert_eq!(
            view.friction.reason,
            format!("{}{}", "r".repeat(500), TRUNCATION_MARKER)
        );
        assert_eq!(view.intervention.suggestion, "s".repeat(1000));
        assert_eq!(view.friction.severity, NOT_AVAILABLE);
        assert_eq!(view.friction.severity_tier, None);
    }

    #[test]
    fn test_render_clears_previous_cycle() {
        let mut view = rendered(json!({
            "knowledge_update_status": "stored",
            "intervention_suggestion": {"intervention_suggested": true, "suggestion": "Sync"}
        }));
        render(
            &ResponseEnvelope::from_value(json!({"friction_detection": {"friction_detected": false}})),
            &mut view,
            &RenderLimits::default(),
        );
        assert_eq!(view.visible_cards(), vec![CardId::FrictionDetection]);
        assert_eq!(view.knowledge, KnowledgeCard::default());
        assert_eq!(view.intervention, InterventionCard::default());
        assert_eq!(view.friction.detected_text, "No");
    }

    #[test]
    fn test_structured_knowledge_status() {
        let view = rendered(json!({"knowledge_update_status": {"stored": true}}));
        assert_eq!(view.knowledge.status, r#"{"stored":true}"#);
    }

    #[test]
    fn test_scroll_request_is_taken_once() {
        let mut view = ResultsView::default();
        view.request_scroll_to_results();
        assert!(view.take_scroll_request());
        assert!(!view.take_scroll_request());
    }
}
