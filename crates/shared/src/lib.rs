pub mod controller;
pub mod envelope;
pub mod format;
pub mod lookup;
pub mod sections;
pub mod submission;
pub mod view;

pub mod settings {
    use serde::{Deserialize, Serialize};

    pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:5000";

    fn default_base_url() -> String {
        DEFAULT_BASE_URL.to_string()
    }

    fn default_friction_reason_limit() -> usize {
        500
    }

    fn default_suggestion_limit() -> usize {
        1000
    }

    /// Client configuration, persisted as `settings.json` in the config dir.
    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    pub struct ClientSettings {
        /// Where the CIFR backend is served, e.g. "http://127.0.0.1:5000"
        #[serde(default = "default_base_url")]
        pub base_url: String,
        /// Request timeout. `None` leaves the HTTP client default in place.
        #[serde(default)]
        pub timeout_secs: Option<u64>,
        /// Sent along with every message when set
        #[serde(default)]
        pub sender: Option<String>,
        #[serde(default = "default_friction_reason_limit")]
        pub friction_reason_limit: usize,
        #[serde(default = "default_suggestion_limit")]
        pub suggestion_limit: usize,
        #[serde(default)]
        pub dark_mode: bool,
    }

    impl Default for ClientSettings {
        fn default() -> Self {
            Self {
                base_url: default_base_url(),
                timeout_secs: None,
                sender: None,
                friction_reason_limit: default_friction_reason_limit(),
                suggestion_limit: default_suggestion_limit(),
                dark_mode: false,
            }
        }
    }

    impl ClientSettings {
        /// Apply `CIFR_API_URL`, `CIFR_TIMEOUT_SECS` and `CIFR_SENDER` from the process environment.
        pub fn apply_env_overrides(&mut self) {
            self.apply_overrides(|key| std::env::var(key).ok());
        }

        pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
            if let Some(url) = lookup("CIFR_API_URL").filter(|v| !v.trim().is_empty()) {
                self.base_url = url.trim().to_string();
            }
            if let Some(raw) = lookup("CIFR_TIMEOUT_SECS") {
                match raw.trim().parse::<u64>() {
                    Ok(0) => self.timeout_secs = None,
                    Ok(secs) => self.timeout_secs = Some(secs),
                    Err(_) => tracing::warn!(value = %raw, "ignoring invalid CIFR_TIMEOUT_SECS"),
                }
            }
            if let Some(sender) = lookup("CIFR_SENDER").filter(|v| !v.trim().is_empty()) {
                self.sender = Some(sender.trim().to_string());
            }
        }
    }

}
