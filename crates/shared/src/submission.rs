//! What the form submits.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use chrono::{DateTime, Utc};
use std::path::Path;
use uuid::Uuid;

pub const TEXT_FIELD: &str = "text_content";
pub const IMAGE_FIELD: &str = "image_file";

#[derive(Debug, Clone, PartialEq)]
pub struct ImageAttachment {
    pub file_name: String,
    pub mime: String,
    pub bytes: Vec<u8>,
}

impl ImageAttachment {
    pub fn new(file_name: impl Into<String>, mime: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            mime: mime.into(),
            bytes,
        }
    }

    /// Read an image from disk, taking the mime type from its extension.
    pub fn from_path(path: &Path) -> std::io::Result<Self> {
        let bytes = std::fs::read(path)?;
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_else(|| "image".to_string());
        let mime = mime_for_path(path).unwrap_or("application/octet-stream");
        Ok(Self::new(file_name, mime, bytes))
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// `data:<mime>;base64,...` URI used for the local preview.
    pub fn to_data_uri(&self) -> String {
        format!("data:{};base64,{}", self.mime, BASE64.encode(&self.bytes))
    }
}

pub fn mime_for_path(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    match ext.as_str() {
        "png" => Some("image/png"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        "gif" => Some("image/gif"),
        "webp" => Some("image/webp"),
        "bmp" => Some("image/bmp"),
        _ => None,
    }
}

/// One form submission. Built fresh per submit.
#[derive(Debug, Clone, PartialEq)]
pub struct SubmissionPayload {
    pub text: String,
    pub image: Option<ImageAttachment>,
    pub sender: Option<String>,
    pub timestamp: DateTime<Utc>,
    pub message_id: Uuid,
}

impl SubmissionPayload {
    /// Empty attachments are dropped, matching a file input with nothing selected.
    pub fn new(text: impl Into<String>, image: Option<ImageAttachment>) -> Self {
        Self {
            text: text.into(),
            image: image.filter(|img| !img.is_empty()),
            sender: None,
            timestamp: Utc::now(),
            message_id: Uuid::new_v4(),
        }
    }

    /// Attach an image read after the payload was built. Empty files are dropped.
    pub fn with_image(mut self, image: Option<ImageAttachment>) -> Self {
        self.image = image.filter(|img| !img.is_empty());
        self
    }

    pub fn with_sender(mut self, sender: Option<String>) -> Self {
        self.sender = sender.filter(|s| !s.trim().is_empty());
        self
    }

    pub fn has_image(&self) -> bool {
        self.image.is_some()
    }
}
