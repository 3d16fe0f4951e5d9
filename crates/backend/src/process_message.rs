use anyhow::{anyhow, Result};
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde_json::Value;
use shared::controller::{MessageBackend, SubmitError};
use shared::settings::ClientSettings;
use shared::submission::{SubmissionPayload, IMAGE_FIELD, TEXT_FIELD};
use std::time::Duration;
use url::Url;

pub const PROCESS_MESSAGE_PATH: &str = "api/process_message";

const MAX_ERROR_DETAIL_CHARS: usize = 800;

pub struct ProcessMessageClient {
    http: Client,
    endpoint: Url,
}

impl ProcessMessageClient {
    pub fn new(settings: &ClientSettings) -> Result<Self> {
        let mut base = Url::parse(settings.base_url.trim())
            .map_err(|e| anyhow!("invalid backend url '{}': {}", settings.base_url, e))?;
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        let endpoint = base.join(PROCESS_MESSAGE_PATH)?;

        let mut builder = Client::builder();
        if let Some(secs) = settings.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }

        Ok(Self {
            http: builder.build()?,
            endpoint,
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    fn build_form(payload: &SubmissionPayload) -> Result<Form, SubmitError> {
        let mut form = Form::new()
            .text(TEXT_FIELD, payload.text.clone())
            .text("timestamp", payload.timestamp.to_rfc3339())
            .text("message_id", payload.message_id.to_string());

        if let Some(sender) = &payload.sender {
            form = form.text("sender", sender.clone());
        }

        if let Some(image) = &payload.image {
            let part = Part::bytes(image.bytes.clone())
                .file_name(image.file_name.clone())
                .mime_str(&image.mime)
                .map_err(|e| SubmitError::InvalidPayload(e.to_string()))?;
            form = form.part(IMAGE_FIELD, part);
        }

        Ok(form)
    }
}

#[async_trait::async_trait]
impl MessageBackend for ProcessMessageClient {
    async fn process_message(&self, payload: &SubmissionPayload) -> Result<Value, SubmitError> {
        let form = Self::build_form(payload)?;
        tracing::debug!(endpoint = %self.endpoint, message_id = %payload.message_id, "posting message");

        let resp = self
            .http
            .post(self.endpoint.clone())
            .multipart(form)
            .send()
            .await
            .map_err(|e| SubmitError::Transport(e.to_string()))?;

        let status = resp.status();
        let body = resp
            .text()
            .await
            .map_err(|e| SubmitError::Transport(e.to_string()))?;

        if !status.is_success() {
            return Err(SubmitError::Status {
                status: status.as_u16(),
                detail: error_detail(&body, status.canonical_reason()),
            });
        }

        serde_json::from_str(&body).map_err(|e| SubmitError::InvalidBody(e.to_string()))
    }
}

/// Prefer the `error` field of a JSON error body, otherwise the clipped raw body.
fn error_detail(body: &str, reason: Option<&str>) -> String {
    if let Ok(Value::Object(map)) = serde_json::from_str::<Value>(body) {
        if let Some(Value::String(error)) = map.get("error") {
            return error.clone();
        }
    }
    let body = body.trim();
    if body.is_empty() {
        return reason.unwrap_or("no response body").to_string();
    }
    match body.char_indices().nth(MAX_ERROR_DETAIL_CHARS) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::submission::ImageAttachment;
    use std::io::Read;
    use std::thread::JoinHandle;

    struct CapturedRequest {
        method: String,
        url: String,
        content_type: String,
        body: String,
    }

    fn serve_once(status: u16, response_body: &'static str) -> (String, JoinHandle<CapturedRequest>) {
        let server = tiny_http::Server::http("127.0.0.1:0").unwrap();
        let port = server.server_addr().to_ip().unwrap().port();
        let handle = std::thread::spawn(move || {
            let mut request = server.recv().unwrap();
            let mut body = Vec::new();
            request.as_reader().read_to_end(&mut body).unwrap();
            let captured = CapturedRequest {
                method: request.method().to_string(),
                url: request.url().to_string(),
                content_type: request
                    .headers()
                    .iter()
                    .find(|h| h.field.equiv("Content-Type"))
                    .map(|h| h.value.to_string())
                    .unwrap_or_default(),
                body: String::from_utf8_lossy(&body).to_string(),
            };
            let header =
                tiny_http::Header::from_bytes(&b"Content-Type"[..], &b"application/json"[..])
                    .unwrap();
            let response = tiny_http::Response::from_string(response_body)
                .with_status_code(tiny_http::StatusCode(status))
                .with_header(header);
            request.respond(response).unwrap();
            captured
        });
        (format!("http://127.0.0.1:{}", port), handle)
    }

    fn client_for(base_url: String) -> ProcessMessageClient {
        ProcessMessageClient::new(&ClientSettings {
            base_url,
            timeout_secs: Some(10),
            ..Default::default()
        })
        .unwrap()
    }

    #[test]
    fn test_endpoint_keeps_base_path() {
        let client = client_for("http://analysis.internal:8080/cifr".into());
        assert_eq!(
            client.endpoint().as_str(),
            "http://analysis.internal:8080/cifr/api/process_message"
        );

        let client = client_for("http://127.0.0.1:5000".into());
        assert_eq!(client.endpoint().as_str(), "http://127.0.0.1:5000/api/process_message");
    }

    #[test]
    fn test_invalid_base_url() {
        let result = ProcessMessageClient::new(&ClientSettings {
            base_url: "not a url".into(),
            ..Default::default()
        });
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_posts_multipart_and_decodes_json() {
        let (base, server) = serve_once(200, r#"{"knowledge_update_status": "stored"}"#);
        let client = client_for(base);
        let payload = SubmissionPayload::new(
            "The launch keeps slipping.",
            Some(ImageAttachment::new("chart.png", "image/png", b"PNGDATA".to_vec())),
        )
        .with_sender(Some("Alice from Company A".into()));

        let body = client.process_message(&payload).await.unwrap();
        assert_eq!(body["knowledge_update_status"], "stored");

        let request = server.join().unwrap();
        assert_eq!(request.method, "POST");
        assert_eq!(request.url, "/api/process_message");
        assert!(request.content_type.starts_with("multipart/form-data"));
        assert!(request.body.contains("name=\"text_content\""));
        assert!(request.body.contains("The launch keeps slipping."));
        assert!(request.body.contains("name=\"image_file\"; filename=\"chart.png\""));
        assert!(request.body.contains("PNGDATA"));
        assert!(request.body.contains("Alice from Company A"));
        assert!(request.body.contains(&payload.message_id.to_string()));
    }

    #[tokio::test]
    async fn test_text_only_has_no_image_part() {
        let (base, server) = serve_once(200, "{}");
        let client = client_for(base);
        client
            .process_message(&SubmissionPayload::new("hello", None))
            .await
            .unwrap();

        let request = server.join().unwrap();
        assert!(!request.body.contains("image_file"));
        assert!(!request.body.contains("name=\"sender\""));
    }

    #[tokio::test]
    async fn test_non_success_status() {
        let (base, server) = serve_once(500, r#"{"error": "Agent pipeline crashed"}"#);
        let client = client_for(base);
        let err = client
            .process_message(&SubmissionPayload::new("hello", None))
            .await
            .unwrap_err();
        server.join().unwrap();

        assert_eq!(
            err,
            SubmitError::Status {
                status: 500,
                detail: "Agent pipeline crashed".into()
            }
        );
    }

    #[tokio::test]
    async fn test_invalid_json_body() {
        let (base, server) = serve_once(200, "<html>Internal proxy page</html>");
        let client = client_for(base);
        let err = client
            .process_message(&SubmissionPayload::new("hello", None))
            .await
            .unwrap_err();
        server.join().unwrap();

        assert!(matches!(err, SubmitError::InvalidBody(_)));
    }

    #[tokio::test]
    async fn test_connection_refused_is_transport_error() {
        let port = {
            let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap().port()
        };
        let client = client_for(format!("http://127.0.0.1:{}", port));
        let err = client
            .process_message(&SubmissionPayload::new("hello", None))
            .await
            .unwrap_err();

        assert!(matches!(err, SubmitError::Transport(_)));
    }

    #[test]
    fn test_error_detail() {
        assert_eq!(error_detail("", Some("Bad Gateway")), "Bad Gateway");
        assert_eq!(error_detail("  upstream timeout ", None), "upstream timeout");
        let long = "x".repeat(900);
        assert_eq!(error_detail(&long, None), format!("{}...", "x".repeat(800)));
    }
}
