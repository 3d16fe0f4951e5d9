//! State management for the analyzer app
//!
//! Owns the form, the results view model and the two background workers of a
//! submission: the request itself and the local image preview. Both workers
//! read the attached image on their own thread and report over channels that
//! the UI polls every frame; they are independent and may finish in either
//! order.

use backend::ProcessMessageClient;
use shared::controller::{MessageBackend, SubmissionController, SubmitError};
use shared::settings::ClientSettings;
use shared::submission::{ImageAttachment, SubmissionPayload};
use shared::view::{RenderLimits, ResultsView};
use std::path::PathBuf;
use std::sync::mpsc::{self, Sender, TryRecvError};

use crate::preview;
use crate::types::*;
use crate::utils::file_label;

/// Read the attached image and run the request in a background thread
/// (non-blocking for the UI)
pub fn run_submission(
    settings: ClientSettings,
    payload: SubmissionPayload,
    image_path: Option<PathBuf>,
    tx: Sender<SubmitOutcome>,
) {
    let payload = match image_path {
        Some(path) => match ImageAttachment::from_path(&path) {
            Ok(image) => payload.with_image(Some(image)),
            Err(e) => {
                let _ = tx.send(Err(SubmitError::InvalidPayload(format!(
                    "could not read image {}: {}",
                    path.display(),
                    e
                ))));
                return;
            }
        },
        None => payload,
    };

    let rt = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            let _ = tx.send(Err(SubmitError::Transport(format!(
                "Failed to start async runtime: {}",
                e
            ))));
            return;
        }
    };

    let outcome = match ProcessMessageClient::new(&settings) {
        Ok(client) => rt.block_on(client.process_message(&payload)),
        Err(e) => Err(SubmitError::InvalidPayload(e.to_string())),
    };
    let _ = tx.send(outcome);
}

/// Read and decode the attached image for the preview in a background thread
pub fn run_preview(path: PathBuf, tx: Sender<PreviewOutcome>) {
    let _ = tx.send(preview::load_preview(&path).map_err(|e| format!("{:#}", e)));
}

pub struct AppState {
    pub settings: ClientSettings,
    pub form: FormState,
    pub view: ResultsView,
    pub form_hint: Option<String>,
    pub preview_texture: Option<egui::TextureHandle>,
    controller: SubmissionController,
    submission: Option<Pending<SubmitOutcome>>,
    preview: Option<Pending<PreviewOutcome>>,
    /// Decoded preview waiting for its texture upload
    ready_preview: Option<egui::ColorImage>,
    preview_failed: bool,
}

impl AppState {
    pub fn new(settings: ClientSettings) -> Self {
        let form = FormState {
            sender: settings.sender.clone().unwrap_or_default(),
            ..Default::default()
        };
        Self {
            controller: SubmissionController::new(RenderLimits::from(&settings)),
            settings,
            form,
            view: ResultsView::default(),
            form_hint: None,
            preview_texture: None,
            submission: None,
            preview: None,
            ready_preview: None,
            preview_failed: false,
        }
    }

    /// Waiting on either worker
    pub fn is_busy(&self) -> bool {
        self.submission.is_some() || self.preview.is_some()
    }

    pub fn preview_failed(&self) -> bool {
        self.preview_failed
    }

    pub fn attached_image_label(&self) -> Option<String> {
        self.form.image_path.as_deref().map(file_label)
    }

    /// Start a submission. Nothing touches the disk here; the image is read
    /// by the workers.
    pub fn submit(&mut self) {
        let image_path = self.form.image_path.clone();
        if self.form.text.trim().is_empty() && image_path.is_none() {
            self.form_hint = Some("Type a message or attach an image first.".to_string());
            return;
        }
        self.form_hint = None;

        let sender = Some(self.form.sender.trim().to_string());
        let payload = SubmissionPayload::new(self.form.text.clone(), None).with_sender(sender);
        let ticket = match image_path {
            Some(_) => self.controller.begin_with_pending_image(&mut self.view, &payload),
            None => self.controller.begin(&mut self.view, &payload),
        };
        self.preview_texture = None;
        self.ready_preview = None;
        self.preview_failed = false;

        self.preview = image_path.clone().map(|path| {
            let (tx, rx) = mpsc::channel();
            std::thread::spawn(move || run_preview(path, tx));
            Pending { ticket, rx }
        });

        let (tx, rx) = mpsc::channel();
        let settings = self.settings.clone();
        std::thread::spawn(move || run_submission(settings, payload, image_path, tx));
        self.submission = Some(Pending { ticket, rx });
    }

    /// Non-blocking check for the request result
    pub fn poll_submission(&mut self) {
        let Some(pending) = &self.submission else {
            return;
        };
        let ticket = pending.ticket;
        let outcome = match pending.rx.try_recv() {
            Ok(outcome) => outcome,
            Err(TryRecvError::Empty) => return,
            Err(TryRecvError::Disconnected) => Err(SubmitError::Transport(
                "request worker stopped before answering".to_string(),
            )),
        };
        self.submission = None;
        tracing::debug!(generation = ticket.generation(), ok = outcome.is_ok(), "request finished");
        self.controller.complete(&mut self.view, ticket, outcome);
    }

    /// Non-blocking check for the local image preview
    pub fn poll_preview(&mut self) {
        let Some(pending) = &self.preview else {
            return;
        };
        let ticket = pending.ticket;
        let received = pending.rx.try_recv();
        match received {
            Ok(Ok(preview)) => {
                self.preview = None;
                if self.controller.attach_preview(&mut self.view, ticket, preview.data_uri) {
                    self.ready_preview = Some(preview.image);
                }
            }
            Ok(Err(message)) => {
                self.preview = None;
                tracing::warn!(%message, "could not load image preview");
                self.preview_failed = true;
            }
            Err(TryRecvError::Empty) => {}
            Err(TryRecvError::Disconnected) => {
                self.preview = None;
                self.preview_failed = true;
            }
        }
    }

    /// Upload a decoded preview as a texture
    pub fn refresh_preview_texture(&mut self, ctx: &egui::Context) {
        if let Some(image) = self.ready_preview.take() {
            self.preview_texture = Some(preview::load_preview_texture(ctx, image));
        }
    }
}
