//! Service configuration.

use std::time::Duration;
use url::Url;

const DEFAULT_COLLABORATOR_TIMEOUT: Duration = Duration::from_secs(10);
const FALLBACK_BASE_URL: &str = "http://localhost:8080";

/// Settings for [`crate::service::AccountService`].
#[derive(Clone, Debug)]
pub struct ServiceConfig {
    frontend_base_url: String,
    collaborator_timeout: Duration,
}

impl ServiceConfig {
    /// Build a config around the frontend base URL used in outbound email
    /// links. Malformed URLs fall back to a localhost default.
    #[must_use]
    pub fn new(frontend_base_url: String) -> Self {
        let frontend_base_url = Url::parse(&frontend_base_url)
            .map(|url| url.to_string())
            .unwrap_or_else(|_| FALLBACK_BASE_URL.to_string());
        Self {
            frontend_base_url,
            collaborator_timeout: DEFAULT_COLLABORATOR_TIMEOUT,
        }
    }

    /// Bound on every store and mailer call.
    #[must_use]
    pub fn with_collaborator_timeout_seconds(mut self, seconds: u64) -> Self {
        self.collaborator_timeout = Duration::from_secs(seconds);
        self
    }

    #[must_use]
    pub fn collaborator_timeout(&self) -> Duration {
        self.collaborator_timeout
    }

    #[must_use]
    pub fn frontend_base_url(&self) -> &str {
        &self.frontend_base_url
    }

    /// Verification link included in outbound emails. The token rides in the
    /// fragment so it stays out of server access logs.
    pub(crate) fn verify_url(&self, token: &str) -> String {
        let base = self.frontend_base_url.trim_end_matches('/');
        format!("{base}/verify-email#token={token}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_and_overrides() {
        let config = ServiceConfig::new("https://komerco.dev".to_string());
        assert_eq!(config.collaborator_timeout(), Duration::from_secs(10));

        let config = config.with_collaborator_timeout_seconds(3);
        assert_eq!(config.collaborator_timeout(), Duration::from_secs(3));
    }

    #[test]
    fn verify_url_trims_trailing_slash() {
        let config = ServiceConfig::new("https://komerco.dev/".to_string());
        assert_eq!(
            config.verify_url("token"),
            "https://komerco.dev/verify-email#token=token"
        );
    }

    #[test]
    fn malformed_base_url_falls_back() {
        let config = ServiceConfig::new("not a url".to_string());
        assert_eq!(config.frontend_base_url(), FALLBACK_BASE_URL);
        assert_eq!(
            config.verify_url("token"),
            "http://localhost:8080/verify-email#token=token"
        );
    }
}
