//! Error types for the client flows.

use thiserror::Error;

/// Errors raised while talking to the mapping service.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("invalid base URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("request failed: {0}")]
    Transport(String),

    #[error("server returned {status}{}", detail_suffix(.detail))]
    Status { status: u16, detail: Option<String> },

    #[error("unexpected response body: {0}")]
    Decode(String),

    #[error("invalid JSON payload: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

fn detail_suffix(detail: &Option<String>) -> String {
    detail.as_deref().map(|d| format!(": {}", d)).unwrap_or_default()
}

/// Per-field validation messages for the mapping form.
///
/// A field is valid when its entry is `None`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FieldErrors {
    pub api_field: Option<&'static str>,
    pub db_field: Option<&'static str>,
}

impl FieldErrors {
    pub fn is_empty(&self) -> bool {
        self.api_field.is_none() && self.db_field.is_none()
    }
}

impl std::fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let messages: Vec<&str> = [self.api_field, self.db_field]
            .into_iter()
            .flatten()
            .collect();
        f.write_str(&messages.join("; "))
    }
}

impl std::error::Error for FieldErrors {}

/// Outcome of a failed webhook forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ForwardError {
    /// The buffer did not parse; nothing was sent.
    #[error("Invalid JSON format.")]
    InvalidJson,
    /// The payload parsed but the request failed.
    #[error("Failed to send webhook.")]
    SendFailed,
}
