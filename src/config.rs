use std::time::Duration;

/// Default database file, relative to the working directory.
pub const DEFAULT_DATABASE: &str = "domus.db";

/// Default generative model for budgeting tips.
pub const DEFAULT_ADVICE_MODEL: &str = "gemini-3-flash-preview";

/// Default Generative Language API base URL.
pub const DEFAULT_ADVICE_ENDPOINT: &str = "https://generativelanguage.googleapis.com";

pub const DEFAULT_ADVICE_TIMEOUT_SECS: u64 = 60;

/// Resolved settings for the advice client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdviceConfig {
    /// Missing keys are reported as an advice failure, not at startup.
    pub api_key: Option<String>,
    pub model: String,
    pub endpoint: String,
    pub timeout: Duration,
}

impl Default for AdviceConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: DEFAULT_ADVICE_MODEL.to_string(),
            endpoint: DEFAULT_ADVICE_ENDPOINT.to_string(),
            timeout: Duration::from_secs(DEFAULT_ADVICE_TIMEOUT_SECS),
        }
    }
}

impl AdviceConfig {
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        let key = api_key.into();
        // Blank env vars count as unset
        self.api_key = if key.trim().is_empty() { None } else { Some(key) };
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AdviceConfig::default();
        assert_eq!(config.api_key, None);
        assert_eq!(config.model, "gemini-3-flash-preview");
        assert_eq!(config.timeout, Duration::from_secs(60));
    }

    #[test]
    fn test_blank_key_is_unset() {
        assert_eq!(AdviceConfig::default().with_api_key("  ").api_key, None);
        assert_eq!(
            AdviceConfig::default().with_api_key("abc").api_key.as_deref(),
            Some("abc")
        );
    }

    #[test]
    fn test_endpoint_trailing_slash() {
        let config = AdviceConfig::default().with_endpoint("http://localhost:8080/");
        assert_eq!(config.endpoint, "http://localhost:8080");
    }
}
