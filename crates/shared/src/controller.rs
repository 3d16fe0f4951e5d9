//! Submission controller: optimistic render, one request, route the outcome.

use async_trait::async_trait;
use serde_json::Value;

use crate::envelope::ResponseEnvelope;
use crate::submission::SubmissionPayload;
use crate::view::{render, OriginalMessageCard, RenderLimits, ResultsView};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SubmitError {
    #[error("{0}")]
    Transport(String),
    #[error("server returned {status}: {detail}")]
    Status { status: u16, detail: String },
    #[error("response was not valid JSON: {0}")]
    InvalidBody(String),
    #[error("could not build request: {0}")]
    InvalidPayload(String),
}

impl SubmitError {
    pub fn user_message(&self) -> String {
        format!("An unexpected error occurred: {}", self)
    }
}

/// Anything that can answer a submission with a response body.
#[async_trait]
pub trait MessageBackend: Send + Sync {
    async fn process_message(&self, payload: &SubmissionPayload) -> Result<Value, SubmitError>;
}

/// Identifies one submission. Results carrying an older ticket are dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket(u64);

impl Ticket {
    pub fn generation(self) -> u64 {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    Rendered,
    ApplicationError,
    TransportError,
    /// A newer submission started before this one finished
    Stale,
}

#[derive(Debug, Default)]
pub struct SubmissionController {
    generation: u64,
    limits: RenderLimits,
}

impl SubmissionController {
    pub fn new(limits: RenderLimits) -> Self {
        Self {
            generation: 0,
            limits,
        }
    }

    pub fn is_current(&self, ticket: Ticket) -> bool {
        ticket.0 == self.generation
    }

    /// Put the view into its in-flight state and show the submitted text.
    pub fn begin(&mut self, view: &mut ResultsView, payload: &SubmissionPayload) -> Ticket {
        self.start(view, payload, payload.has_image())
    }

    /// Same as [`begin`](Self::begin) for a submission whose image is still
    /// being read from disk by a worker.
    pub fn begin_with_pending_image(
        &mut self,
        view: &mut ResultsView,
        payload: &SubmissionPayload,
    ) -> Ticket {
        self.start(view, payload, true)
    }

    fn start(&mut self, view: &mut ResultsView, payload: &SubmissionPayload, has_image: bool) -> Ticket {
        self.generation += 1;
        view.hide_result_cards();
        view.error_message = None;
        view.loading = true;
        view.original = OriginalMessageCard {
            visible: true,
            text: payload.text.clone(),
            image_container_visible: has_image,
            image_data_uri: None,
        };
        tracing::info!(
            generation = self.generation,
            message_id = %payload.message_id,
            has_image,
            "submitting message"
        );
        Ticket(self.generation)
    }

    /// Store a finished image preview. Previews of superseded submissions are ignored.
    pub fn attach_preview(&self, view: &mut ResultsView, ticket: Ticket, data_uri: String) -> bool {
        if !self.is_current(ticket) {
            tracing::debug!(generation = ticket.0, "dropping preview of superseded submission");
            return false;
        }
        view.original.image_data_uri = Some(data_uri);
        true
    }

    /// Route the outcome of the request into the view.
    pub fn complete(
        &mut self,
        view: &mut ResultsView,
        ticket: Ticket,
        outcome: Result<Value, SubmitError>,
    ) -> Completion {
        if !self.is_current(ticket) {
            tracing::debug!(
                generation = ticket.0,
                current = self.generation,
                "dropping response of superseded submission"
            );
            return Completion::Stale;
        }

        view.loading = false;
        let body = match outcome {
            Ok(body) => body,
            Err(err) => {
                tracing::warn!(generation = ticket.0, error = %err, "submission failed");
                view.show_error(err.user_message());
                return Completion::TransportError;
            }
        };

        let envelope = ResponseEnvelope::from_value(body);
        if let Some(error) = &envelope.error {
            tracing::warn!(generation = ticket.0, %error, "backend reported an error");
            view.show_error(format!("Error: {}", error));
            return Completion::ApplicationError;
        }

        render(&envelope, view, &self.limits);
        view.request_scroll_to_results();
        tracing::info!(
            generation = ticket.0,
            cards = ?view.visible_cards(),
            "rendered response"
        );
        Completion::Rendered
    }

    /// Begin, await the backend and complete in one go.
    pub async fn submit(
        &mut self,
        view: &mut ResultsView,
        backend: &dyn MessageBackend,
        payload: &SubmissionPayload,
    ) -> Completion {
        let ticket = self.begin(view, payload);
        let outcome = backend.process_message(payload).await;
        self.complete(view, ticket, outcome)
    }
}
