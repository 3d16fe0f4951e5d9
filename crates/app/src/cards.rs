//! Result cards drawn from the `ResultsView` model.

use eframe::egui;
use shared::format::{SentimentTone, SeverityTier};
use shared::view::{CardId, ResultsView};

const CARD_WIDTH_IMAGE: f32 = 360.0;

pub fn tone_color(tone: SentimentTone, dark: bool) -> egui::Color32 {
    match tone {
        SentimentTone::Positive => egui::Color32::from_rgb(46, 160, 67),
        SentimentTone::Negative => egui::Color32::from_rgb(207, 34, 46),
        SentimentTone::Neutral if dark => egui::Color32::from_rgb(190, 190, 200),
        SentimentTone::Neutral => egui::Color32::from_rgb(90, 90, 100),
    }
}

pub fn severity_color(tier: SeverityTier) -> egui::Color32 {
    match tier {
        SeverityTier::High => egui::Color32::from_rgb(207, 34, 46),
        SeverityTier::Medium => egui::Color32::from_rgb(219, 132, 0),
        SeverityTier::Low => egui::Color32::from_rgb(46, 160, 67),
    }
}

fn card(ui: &mut egui::Ui, id: CardId, add_contents: impl FnOnce(&mut egui::Ui)) {
    egui::Frame::group(ui.style())
        .inner_margin(egui::Margin::same(12.0))
        .rounding(8.0)
        .show(ui, |ui| {
            ui.set_width(ui.available_width());
            ui.push_id(id.element_id(), |ui| {
                ui.label(egui::RichText::new(id.title()).size(18.0).strong());
                ui.add_space(6.0);
                add_contents(ui);
            });
        });
    ui.add_space(10.0);
}

fn field(ui: &mut egui::Ui, label: &str, value: impl Into<egui::RichText>) {
    let value: egui::RichText = value.into();
    ui.horizontal_wrapped(|ui| {
        ui.label(egui::RichText::new(format!("{}:", label)).strong());
        ui.label(value);
    });
}

/// Draw the loading indicator, the error line and every visible card.
pub fn results_ui(
    ui: &mut egui::Ui,
    view: &mut ResultsView,
    preview: Option<&egui::TextureHandle>,
    preview_failed: bool,
    dark: bool,
) {
    if view.loading {
        ui.horizontal(|ui| {
            ui.spinner();
            ui.label("Analyzing message...");
        });
        ui.add_space(8.0);
    }

    if let Some(error) = &view.error_message {
        ui.colored_label(egui::Color32::from_rgb(207, 34, 46), error);
        ui.add_space(8.0);
    }

    if view.take_scroll_request() {
        ui.scroll_to_cursor(Some(egui::Align::TOP));
    }

    if view.original.visible {
        card(ui, CardId::OriginalMessage, |ui| {
            ui.label(&view.original.text);
            if view.original.image_container_visible {
                ui.add_space(6.0);
                match preview {
                    Some(texture) => {
                        ui.add(
                            egui::Image::from_texture(egui::load::SizedTexture::from_handle(texture))
                                .max_width(CARD_WIDTH_IMAGE),
                        );
                    }
                    None if preview_failed => {
                        ui.weak("Image preview unavailable");
                    }
                    None => {
                        ui.horizontal(|ui| {
                            ui.spinner();
                            ui.weak("Loading image preview...");
                        });
                    }
                }
            }
        });
    }

    let communication = &view.communication;
    if communication.visible {
        card(ui, CardId::CommunicationAnalysis, |ui| {
            let color = tone_color(communication.sentiment_tone, dark);
            field(
                ui,
                "Sentiment score",
                egui::RichText::new(&communication.sentiment_score).color(color).strong(),
            );
            field(ui, "Sentiment magnitude", communication.sentiment_magnitude.as_str());
            ui.add_space(4.0);
            ui.label(egui::RichText::new("Entities").strong());
            for line in &communication.entities {
                ui.label(format!("• {}", line));
            }
            ui.add_space(4.0);
            ui.label(egui::RichText::new("Model response").strong());
            ui.label(&communication.model_response);
            if let Some(note) = &communication.note {
                ui.add_space(4.0);
                ui.weak(note);
            }
        });
    }

    if view.knowledge.visible {
        card(ui, CardId::KnowledgeUpdate, |ui| {
            field(ui, "Status", view.knowledge.status.as_str());
        });
    }

    let friction = &view.friction;
    if friction.visible {
        card(ui, CardId::FrictionDetection, |ui| {
            let detected = egui::RichText::new(&friction.detected_text).strong();
            field(
                ui,
                "Friction detected",
                if friction.detected {
                    detected.color(egui::Color32::from_rgb(207, 34, 46))
                } else {
                    detected
                },
            );
            field(ui, "Reason", friction.reason.as_str());
            let severity = egui::RichText::new(&friction.severity);
            field(
                ui,
                "Severity",
                match friction.severity_tier {
                    Some(tier) => severity.color(severity_color(tier)).strong(),
                    None => severity,
                },
            );
        });
    }

    let intervention = &view.intervention;
    if intervention.visible {
        card(ui, CardId::InterventionSuggestion, |ui| {
            field(
                ui,
                "Intervention suggested",
                intervention.suggested_text.as_str(),
            );
            if let Some(kind) = &intervention.kind {
                field(ui, "Type", kind.as_str());
            }
            ui.add_space(4.0);
            ui.label(&intervention.suggestion);
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_colors_follow_tiers() {
        assert_ne!(severity_color(SeverityTier::High), severity_color(SeverityTier::Low));
        assert_eq!(
            tone_color(SentimentTone::Negative, true),
            severity_color(SeverityTier::High)
        );
        assert_ne!(
            tone_color(SentimentTone::Neutral, true),
            tone_color(SentimentTone::Neutral, false)
        );
    }
}
