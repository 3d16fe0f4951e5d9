//! Core types shared between the UI thread and its workers.

use serde_json::Value;
use shared::controller::{SubmitError, Ticket};
use std::path::PathBuf;
use std::sync::mpsc::Receiver;

use crate::preview::PreviewImage;

/// Result from the background request worker
pub type SubmitOutcome = Result<Value, SubmitError>;

/// Result from the background preview worker
pub type PreviewOutcome = Result<PreviewImage, String>;

/// A worker whose answer belongs to a specific submission
pub struct Pending<T> {
    pub ticket: Ticket,
    pub rx: Receiver<T>,
}

/// Contents of the message form
#[derive(Debug, Default)]
pub struct FormState {
    pub text: String,
    pub sender: String,
    pub image_path: Option<PathBuf>,
}
