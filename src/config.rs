//! Client configuration.
//!
//! Every flow reads the service address from one [`ClientConfig`], built once
//! at startup. The base URL is normalized here so endpoint paths can always be
//! joined relative to it.

use std::time::Duration;

use url::Url;

use crate::error::ClientError;

pub const DEFAULT_BASE_URL: &str = "http://localhost:8000/";
pub const DEFAULT_TASK_NAME: &str = "fetch_data";
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);
pub const DEFAULT_NOTICE_TTL: Duration = Duration::from_millis(6000);

pub const ENV_BASE_URL: &str = "DATAMAPPER_BASE_URL";
pub const ENV_TASK_NAME: &str = "DATAMAPPER_TASK_NAME";
pub const ENV_TIMEOUT_SECS: &str = "DATAMAPPER_TIMEOUT_SECS";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Absolute http(s) address of the service, always ending in `/`.
    pub base_url: Url,
    /// Name of the scheduler flag this client controls.
    pub task_name: String,
    /// Upper bound for a single request on native targets.
    pub request_timeout: Duration,
    /// How long a transient notice stays visible.
    pub notice_ttl: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            // constant is a valid absolute URL
            base_url: Url::parse(DEFAULT_BASE_URL).expect("default base URL parses"),
            task_name: DEFAULT_TASK_NAME.to_string(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            notice_ttl: DEFAULT_NOTICE_TTL,
        }
    }
}

impl ClientConfig {
    /// Build a config for the given service address, other values default.
    pub fn new(base_url: &str) -> Result<Self, ClientError> {
        Ok(Self {
            base_url: normalize_base_url(base_url)?,
            ..Self::default()
        })
    }

    /// Read configuration from `DATAMAPPER_*` environment variables.
    ///
    /// Unset variables keep their defaults.
    pub fn from_env() -> Result<Self, ClientError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`ClientConfig::from_env`] with an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ClientError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = match lookup(ENV_BASE_URL) {
            Some(base) => Self::new(&base)?,
            None => Self::default(),
        };

        if let Some(task) = lookup(ENV_TASK_NAME) {
            config = config.with_task_name(task)?;
        }

        if let Some(secs) = lookup(ENV_TIMEOUT_SECS) {
            let secs: u64 = secs.trim().parse().map_err(|_| {
                ClientError::InvalidConfig(format!(
                    "{} must be a whole number of seconds, got '{}'",
                    ENV_TIMEOUT_SECS, secs
                ))
            })?;
            config = config.with_request_timeout(Duration::from_secs(secs));
        }

        Ok(config)
    }

    pub fn with_task_name(mut self, task_name: impl Into<String>) -> Result<Self, ClientError> {
        let task_name = task_name.into();
        if task_name.trim().is_empty() {
            return Err(ClientError::InvalidConfig(
                "task name must not be empty".to_string(),
            ));
        }
        self.task_name = task_name;
        Ok(self)
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn with_notice_ttl(mut self, ttl: Duration) -> Self {
        self.notice_ttl = ttl;
        self
    }
}

/// Parse and normalize a service address.
///
/// The address must be absolute http or https. A trailing `/` is added so
/// that relative endpoint paths keep any path prefix (`https://host/api/`).
pub fn normalize_base_url(raw: &str) -> Result<Url, ClientError> {
    let invalid = |reason: String| ClientError::InvalidBaseUrl {
        url: raw.to_string(),
        reason,
    };

    let mut url = Url::parse(raw.trim()).map_err(|e| invalid(e.to_string()))?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(invalid(format!("unsupported scheme '{}'", url.scheme())));
    }
    if url.cannot_be_a_base() {
        return Err(invalid("address cannot be used as a base".to_string()));
    }

    url.set_query(None);
    url.set_fragment(None);
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }

    Ok(url)
}
