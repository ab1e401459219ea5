//! Client configuration

use std::time::Duration;

use url::Url;

use crate::errors::ApiError;

pub const DEFAULT_BASE_URL: &str = "http://localhost:8000/api";
pub const DEFAULT_USER_AGENT: &str = concat!("earnings-client/", env!("CARGO_PKG_VERSION"));

pub const BASE_URL_ENV: &str = "EARNINGS_API_URL";
pub const REQUEST_TIMEOUT_ENV: &str = "EARNINGS_REQUEST_TIMEOUT_SECS";
pub const STREAM_IDLE_TIMEOUT_ENV: &str = "EARNINGS_STREAM_IDLE_TIMEOUT_SECS";

/// Settings for an [`EarningsClient`][crate::api::EarningsClient]
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Root every endpoint path is appended to, e.g. `https://host/api`
    pub base_url: Url,
    /// Applied per request to the plain JSON calls only, an analysis stream may run for minutes
    pub request_timeout: Option<Duration>,
    /// Give up on an analysis stream after this long without a chunk. Off by default.
    pub stream_idle_timeout: Option<Duration>,
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: Url::parse(DEFAULT_BASE_URL).expect("default base url is valid"),
            request_timeout: Some(Duration::from_secs(30)),
            stream_idle_timeout: None,
            user_agent: DEFAULT_USER_AGENT.to_owned(),
        }
    }
}

impl ClientConfig {
    pub fn new(base_url: &str) -> Result<Self, ApiError> {
        Ok(Self {
            base_url: parse_base_url(base_url)?,
            ..Self::default()
        })
    }

    /// Defaults overridden by `EARNINGS_API_URL`, `EARNINGS_REQUEST_TIMEOUT_SECS` and
    /// `EARNINGS_STREAM_IDLE_TIMEOUT_SECS` where set
    pub fn from_env() -> Result<Self, ApiError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ApiError> {
        let mut config = Self::default();
        if let Some(base_url) = lookup(BASE_URL_ENV) {
            config.base_url = parse_base_url(&base_url)?;
        }
        if let Some(secs) = lookup(REQUEST_TIMEOUT_ENV) {
            config.request_timeout = parse_secs(REQUEST_TIMEOUT_ENV, &secs)?;
        }
        if let Some(secs) = lookup(STREAM_IDLE_TIMEOUT_ENV) {
            config.stream_idle_timeout = parse_secs(STREAM_IDLE_TIMEOUT_ENV, &secs)?;
        }
        Ok(config)
    }

    pub fn with_request_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn with_stream_idle_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.stream_idle_timeout = timeout;
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }
}

fn parse_base_url(raw: &str) -> Result<Url, ApiError> {
    let url = Url::parse(raw).map_err(|e| ApiError::InvalidBaseUrl(format!("{raw}: {e}")))?;
    if url.cannot_be_a_base() {
        return Err(ApiError::InvalidBaseUrl(raw.to_owned()));
    }
    Ok(url)
}

// 0 switches the timeout off
fn parse_secs(key: &str, raw: &str) -> Result<Option<Duration>, ApiError> {
    let secs: u64 = raw
        .trim()
        .parse()
        .map_err(|_| ApiError::Config(format!("{key} must be a whole number of seconds, got {raw:?}")))?;
    Ok((secs > 0).then(|| Duration::from_secs(secs)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn defaults() {
        let config = ClientConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.base_url.as_str(), DEFAULT_BASE_URL);
        assert_eq!(config.request_timeout, Some(Duration::from_secs(30)));
        assert_eq!(config.stream_idle_timeout, None);
    }

    #[test]
    fn environment_overrides() {
        let config = ClientConfig::from_lookup(lookup(&[
            (BASE_URL_ENV, "https://earnings.example.com/api"),
            (REQUEST_TIMEOUT_ENV, "0"),
            (STREAM_IDLE_TIMEOUT_ENV, " 90 "),
        ]))
        .unwrap();
        assert_eq!(config.base_url.host_str(), Some("earnings.example.com"));
        assert_eq!(config.request_timeout, None);
        assert_eq!(config.stream_idle_timeout, Some(Duration::from_secs(90)));
    }

    #[test]
    fn rejects_bad_values() {
        assert!(matches!(
            ClientConfig::from_lookup(lookup(&[(REQUEST_TIMEOUT_ENV, "soon")])),
            Err(ApiError::Config(_))
        ));
        assert!(matches!(
            ClientConfig::new("mailto:someone@example.com"),
            Err(ApiError::InvalidBaseUrl(_))
        ));
        assert!(matches!(ClientConfig::new("not a url"), Err(ApiError::InvalidBaseUrl(_))));
    }
}
