//! HTTP client for the CIFR message-processing backend.

pub mod process_message;

pub use process_message::{ProcessMessageClient, PROCESS_MESSAGE_PATH};
