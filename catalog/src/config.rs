//! Client configuration
//!
//! Connection settings for the marketplace API plus the cache settings handed
//! to every orchestrator the services build.

use catalog_cache::{CacheConfig, FetchError, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

/// Header carrying the access token on every request
pub const DEFAULT_TOKEN_HEADER: &str = "X-Practicum-Mobile-Token";

pub const ENV_BASE_URL: &str = "CATALOG_BASE_URL";
pub const ENV_TOKEN: &str = "CATALOG_TOKEN";
pub const ENV_TIMEOUT_SECS: &str = "CATALOG_TIMEOUT_SECS";
pub const ENV_MAX_CONCURRENCY: &str = "CATALOG_MAX_CONCURRENCY";
pub const ENV_IMAGE_CAPACITY: &str = "CATALOG_IMAGE_CAPACITY";

/// Configuration for the marketplace client
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Scheme and host of the API, without the `/api/v1` prefix
    pub base_url: String,
    /// Access token sent in `token_header`
    pub token: String,
    pub token_header: String,
    /// Per-request timeout
    #[serde(with = "duration_secs")]
    pub request_timeout: Duration,
    pub cache: CacheConfig,
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            token: token.into(),
            token_header: DEFAULT_TOKEN_HEADER.to_string(),
            request_timeout: Duration::from_secs(30),
            cache: CacheConfig::default(),
        }
    }

    pub fn builder(base_url: impl Into<String>, token: impl Into<String>) -> ClientConfigBuilder {
        ClientConfigBuilder {
            config: Self::new(base_url, token),
        }
    }

    /// Load configuration from the process environment
    ///
    /// A `.env` file in the working directory is read first if present.
    /// `CATALOG_BASE_URL` and `CATALOG_TOKEN` are required; the timeout,
    /// concurrency ceiling and image capacity fall back to their defaults.
    pub fn from_env() -> Result<Self> {
        if let Ok(path) = dotenv::dotenv() {
            debug!("Loaded environment from {}", path.display());
        }
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build configuration from an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let base_url = lookup(ENV_BASE_URL)
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| FetchError::Config(format!("{} is not set", ENV_BASE_URL)))?;
        let token = lookup(ENV_TOKEN)
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| FetchError::Config(format!("{} is not set", ENV_TOKEN)))?;

        let mut config = Self::new(base_url.trim_end_matches('/'), token);

        if let Some(secs) = parse_var::<u64>(&lookup, ENV_TIMEOUT_SECS)? {
            config.request_timeout = Duration::from_secs(secs);
        }
        if let Some(max) = parse_var::<usize>(&lookup, ENV_MAX_CONCURRENCY)? {
            config.cache.max_concurrency = Some(max);
        }
        if let Some(capacity) = parse_var::<usize>(&lookup, ENV_IMAGE_CAPACITY)? {
            config.cache.image_capacity = capacity;
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err(FetchError::Config(format!(
                "base_url must be an http(s) URL, got {:?}",
                self.base_url
            )));
        }
        if self.token.is_empty() {
            return Err(FetchError::Config("token must not be empty".to_string()));
        }
        if self.token_header.is_empty() {
            return Err(FetchError::Config("token_header must not be empty".to_string()));
        }
        if self.request_timeout.is_zero() {
            return Err(FetchError::Config(
                "request_timeout must be greater than zero".to_string(),
            ));
        }
        self.cache.validate()
    }
}

fn parse_var<T>(lookup: &impl Fn(&str) -> Option<String>, name: &str) -> Result<Option<T>>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(name) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|e| FetchError::Config(format!("{}={:?}: {}", name, raw, e))),
    }
}

/// Builder for [`ClientConfig`]
pub struct ClientConfigBuilder {
    config: ClientConfig,
}

impl ClientConfigBuilder {
    pub fn token_header(mut self, header: impl Into<String>) -> Self {
        self.config.token_header = header.into();
        self
    }

    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.config.request_timeout = timeout;
        self
    }

    pub fn cache(mut self, cache: CacheConfig) -> Self {
        self.config.cache = cache;
        self
    }

    pub fn build(self) -> ClientConfig {
        self.config
    }
}

mod duration_secs {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_secs())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_secs)
    }
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
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = ClientConfig::new("https://api.example.com", "secret");
        assert_eq!(config.token_header, DEFAULT_TOKEN_HEADER);
        assert_eq!(config.request_timeout, Duration::from_secs(30));
        assert_eq!(config.cache.max_concurrency, None);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_from_lookup_reads_every_variable() {
        let config = ClientConfig::from_lookup(lookup(&[
            (ENV_BASE_URL, "https://api.example.com/"),
            (ENV_TOKEN, "secret"),
            (ENV_TIMEOUT_SECS, "5"),
            (ENV_MAX_CONCURRENCY, "8"),
            (ENV_IMAGE_CAPACITY, "64"),
        ]))
        .unwrap();

        assert_eq!(config.base_url, "https://api.example.com");
        assert_eq!(config.token, "secret");
        assert_eq!(config.request_timeout, Duration::from_secs(5));
        assert_eq!(config.cache.max_concurrency, Some(8));
        assert_eq!(config.cache.image_capacity, 64);
    }

    #[test]
    fn test_missing_token_is_config_error() {
        let result = ClientConfig::from_lookup(lookup(&[(ENV_BASE_URL, "https://api.example.com")]));
        assert!(matches!(result, Err(FetchError::Config(msg)) if msg.contains(ENV_TOKEN)));
    }

    #[test]
    fn test_unparsable_number_is_config_error() {
        let result = ClientConfig::from_lookup(lookup(&[
            (ENV_BASE_URL, "https://api.example.com"),
            (ENV_TOKEN, "secret"),
            (ENV_MAX_CONCURRENCY, "many"),
        ]));
        assert!(matches!(result, Err(FetchError::Config(_))));
    }

    #[test]
    fn test_zero_concurrency_rejected() {
        let result = ClientConfig::from_lookup(lookup(&[
            (ENV_BASE_URL, "https://api.example.com"),
            (ENV_TOKEN, "secret"),
            (ENV_MAX_CONCURRENCY, "0"),
        ]));
        assert!(matches!(result, Err(FetchError::Config(_))));
    }

    #[test]
    fn test_validate_rejects_non_http_url() {
        let config = ClientConfig::new("ftp://api.example.com", "secret");
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_builder() {
        let config = ClientConfig::builder("http://localhost:8080", "secret")
            .token_header("X-Token")
            .request_timeout(Duration::from_secs(2))
            .cache(CacheConfig::bounded(4))
            .build();

        assert_eq!(config.token_header, "X-Token");
        assert_eq!(config.request_timeout, Duration::from_secs(2));
        assert_eq!(config.cache.max_concurrency, Some(4));
    }
}
