//! Client configuration.

use std::time::Duration;

/// Default base URL for the management API.
pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8080";

/// Default request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Default environment identifier within a space.
pub const DEFAULT_ENVIRONMENT: &str = "master";

/// Configuration for [`HttpDocumentClient`](crate::HttpDocumentClient).
///
/// Every request is scoped by the configured space and environment and
/// authenticated with the bearer token.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the management API.
    pub base_url: String,

    /// Space identifier.
    pub space_id: String,

    /// Environment identifier within the space.
    pub environment_id: String,

    /// Bearer token sent with every request.
    pub access_token: String,

    /// Request timeout.
    pub timeout: Duration,
}

impl ClientConfig {
    /// Create a configuration for the default base URL.
    pub fn new(
        space_id: impl Into<String>,
        environment_id: impl Into<String>,
        access_token: impl Into<String>,
    ) -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            space_id: space_id.into(),
            environment_id: environment_id.into(),
            access_token: access_token.into(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Set the API base URL.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Set the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// URL prefix shared by every scoped endpoint.
    pub fn scope_url(&self) -> String {
        format!(
            "{}/spaces/{}/environments/{}",
            self.base_url.trim_end_matches('/'),
            self.space_id,
            self.environment_id
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_config() {
        let config = ClientConfig::new("space1", "master", "tok");
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.space_id, "space1");
        assert_eq!(config.environment_id, "master");
        assert_eq!(config.timeout, DEFAULT_TIMEOUT);
    }

    #[test]
    fn test_config_builder() {
        let config = ClientConfig::new("space1", "staging", "tok")
            .with_base_url("https://api.example.com/")
            .with_timeout(Duration::from_secs(5));

        assert_eq!(config.base_url, "https://api.example.com/");
        assert_eq!(config.timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_scope_url_trims_trailing_slash() {
        let config =
            ClientConfig::new("s1", "master", "tok").with_base_url("https://api.example.com/");
        assert_eq!(
            config.scope_url(),
            "https://api.example.com/spaces/s1/environments/master"
        );
    }
}
