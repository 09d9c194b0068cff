//! Webhook payload forwarding.
//!
//! The user edits raw text. It is parsed locally when sending; text that is
//! not JSON never reaches the network.

use std::path::Path;

use serde_json::Value;

use crate::api::MapperApi;
use crate::error::{ClientError, ForwardError};
use crate::report::{Flow, Reporter};

pub const DEFAULT_PAYLOAD: &str = r#"{"event": "test"}"#;
pub const WEBHOOK_SENT: &str = "Webhook sent successfully!";

/// Inline result shown under the payload editor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Banner {
    Sent,
    Failed(ForwardError),
}

impl Banner {
    pub fn message(&self) -> &'static str {
        match self {
            Banner::Sent => WEBHOOK_SENT,
            Banner::Failed(ForwardError::InvalidJson) => "Invalid JSON format.",
            Banner::Failed(ForwardError::SendFailed) => "Failed to send webhook.",
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Banner::Failed(_))
    }
}

/// Parse a raw buffer into a JSON value. No schema is applied.
pub fn parse_payload(raw: &str) -> Result<Value, ClientError> {
    Ok(serde_json::from_str(raw)?)
}

/// Read a payload file as raw text; it is parsed at send time like typed input.
pub fn read_payload_file(path: &Path) -> Result<String, ClientError> {
    Ok(std::fs::read_to_string(path)?)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PayloadForwarder {
    text: String,
    banner: Option<Banner>,
}

impl Default for PayloadForwarder {
    fn default() -> Self {
        Self::new(DEFAULT_PAYLOAD)
    }
}

impl PayloadForwarder {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            banner: None,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }

    pub fn banner(&self) -> Option<Banner> {
        self.banner
    }

    /// Start a send: clear the previous banner and parse the buffer.
    ///
    /// `Ok` carries the value to send. On `Err` the parse error has been
    /// reported, the invalid-JSON banner is set and nothing must be sent.
    pub fn begin_send(&mut self, reporter: &dyn Reporter) -> Result<Value, ForwardError> {
        self.banner = None;
        match parse_payload(&self.text) {
            Ok(value) => Ok(value),
            Err(e) => {
                reporter.failure(Flow::ForwardWebhook, &e);
                self.banner = Some(Banner::Failed(ForwardError::InvalidJson));
                Err(ForwardError::InvalidJson)
            }
        }
    }

    /// Apply the settled forward request. The buffer is kept either way.
    pub fn finish_send(
        &mut self,
        result: Result<(), ClientError>,
        reporter: &dyn Reporter,
    ) -> Result<(), ForwardError> {
        match result {
            Ok(()) => {
                self.banner = Some(Banner::Sent);
                Ok(())
            }
            Err(e) => {
                reporter.failure(Flow::ForwardWebhook, &e);
                self.banner = Some(Banner::Failed(ForwardError::SendFailed));
                Err(ForwardError::SendFailed)
            }
        }
    }

    /// Parse and forward the current buffer.
    pub async fn send<A>(&mut self, api: &A, reporter: &dyn Reporter) -> Result<(), ForwardError>
    where
        A: MapperApi + ?Sized,
    {
        let payload = self.begin_send(reporter)?;
        let result = api.forward_webhook(&payload).await;
        self.finish_send(result, reporter)
    }
}
