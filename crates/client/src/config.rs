//! Client configuration.

use std::fmt;
use std::time::Duration;

/// Used when neither the caller nor the environment names a service.
pub const DEFAULT_BASE_URL: &str = "https://api.reasonflow.ai";

pub const BASE_URL_ENV: &str = "REASONFLOW_BASE_URL";
pub const API_KEY_ENV: &str = "REASONFLOW_API_KEY";

/// Connection settings for [`crate::HttpWorkflowClient`].
#[derive(Clone)]
pub struct ClientConfig {
    /// Service root, without a trailing slash.
    pub base_url: String,
    /// Bearer credential sent on every request.
    pub api_key: Option<String>,
    /// Per-request timeout.
    pub timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: None,
            timeout: Duration::from_secs(30),
        }
    }
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    /// Defaults overridden by `REASONFLOW_BASE_URL` and `REASONFLOW_API_KEY`.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Same as [`ClientConfig::from_env`] with variables read through
    /// `lookup`. Empty values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();
        if let Some(url) = lookup(BASE_URL_ENV).filter(|url| !url.is_empty()) {
            config.base_url = url;
        }
        config.api_key = lookup(API_KEY_ENV).filter(|key| !key.is_empty());
        config
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

// The credential must never reach a log line.
impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("timeout", &self.timeout)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_output_hides_the_key() {
        let config = ClientConfig::new("http://localhost:8000").with_api_key("sk-secret");
        let printed = format!("{config:?}");
        assert!(printed.contains("<redacted>"));
        assert!(!printed.contains("sk-secret"));
    }

    fn lookup<'a>(vars: &'a [(&'a str, &'a str)]) -> impl Fn(&str) -> Option<String> + 'a {
        move |name| vars.iter().find(|(k, _)| *k == name).map(|(_, v)| v.to_string())
    }

    #[test]
    fn environment_overrides_defaults() {
        let config = ClientConfig::from_lookup(lookup(&[
            (BASE_URL_ENV, "http://localhost:8000"),
            (API_KEY_ENV, "sk-env"),
        ]));
        assert_eq!(config.base_url, "http://localhost:8000");
        assert_eq!(config.api_key.as_deref(), Some("sk-env"));
        assert_eq!(config.timeout, Duration::from_secs(30));
    }

    #[test]
    fn empty_or_missing_variables_keep_defaults() {
        let config = ClientConfig::from_lookup(lookup(&[(BASE_URL_ENV, ""), (API_KEY_ENV, "")]));
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.api_key, None);

        let config = ClientConfig::from_lookup(lookup(&[]));
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.api_key, None);
    }

    #[test]
    fn from_env_reads_the_process_environment() {
        std::env::set_var(API_KEY_ENV, "");
        assert_eq!(ClientConfig::from_env().api_key, None);

        std::env::set_var(API_KEY_ENV, "sk-process");
        assert_eq!(ClientConfig::from_env().api_key.as_deref(), Some("sk-process"));
        std::env::remove_var(API_KEY_ENV);
    }
}
