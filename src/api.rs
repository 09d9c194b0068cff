//! REST surface of the mapping service.
//!
//! [`Endpoint`] is the one place where methods and paths are spelled out;
//! every [`MapperApi`] implementation builds its URLs through it.

use async_trait::async_trait;
use serde_json::Value;
use url::Url;

use crate::error::ClientError;
use crate::model::{FieldMapping, NewFieldMapping, SchedulerFlag};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Put,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
        }
    }
}

/// One backend operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint<'a> {
    /// `POST /field-mappings/`
    CreateMapping,
    /// `GET /mappings`
    ListMappings,
    /// `GET /field-mappings/{api_field}/`
    GetMapping { api_field: &'a str },
    /// `GET /scheduler/{task_name}/`
    GetScheduler { task_name: &'a str },
    /// `PUT /scheduler/{task_name}/?enabled=<bool>`
    SetScheduler { task_name: &'a str, enabled: bool },
    /// `POST /scheduler/`
    CreateScheduler,
    /// `POST /webhook/`
    ForwardWebhook,
}

impl Endpoint<'_> {
    pub fn method(&self) -> Method {
        match self {
            Endpoint::ListMappings | Endpoint::GetMapping { .. } | Endpoint::GetScheduler { .. } => {
                Method::Get
            }
            Endpoint::SetScheduler { .. } => Method::Put,
            Endpoint::CreateMapping | Endpoint::CreateScheduler | Endpoint::ForwardWebhook => {
                Method::Post
            }
        }
    }

    /// Resolve against a normalized base URL (see [`crate::config`]).
    ///
    /// Segments coming from user input are percent-encoded.
    pub fn url(&self, base: &Url) -> Result<Url, ClientError> {
        let segments: Vec<&str> = match *self {
            Endpoint::CreateMapping => vec!["field-mappings", ""],
            Endpoint::ListMappings => vec!["mappings"],
            Endpoint::GetMapping { api_field } => vec!["field-mappings", api_field, ""],
            Endpoint::GetScheduler { task_name } | Endpoint::SetScheduler { task_name, .. } => {
                vec!["scheduler", task_name, ""]
            }
            Endpoint::CreateScheduler => vec!["scheduler", ""],
            Endpoint::ForwardWebhook => vec!["webhook", ""],
        };

        let mut url = base.clone();
        url.path_segments_mut()
            .map_err(|_| ClientError::InvalidBaseUrl {
                url: base.to_string(),
                reason: "address cannot be used as a base".to_string(),
            })?
            .pop_if_empty()
            .extend(segments);

        if let Endpoint::SetScheduler { enabled, .. } = self {
            url.query_pairs_mut()
                .append_pair("enabled", if *enabled { "true" } else { "false" });
        }

        Ok(url)
    }
}

/// Pull a human-readable reason out of an error response body.
///
/// The service answers failures with `{"detail": ...}`; anything else is
/// passed through trimmed, or dropped when empty.
pub fn error_detail(body: &str) -> Option<String> {
    let body = body.trim();
    if body.is_empty() {
        return None;
    }
    match serde_json::from_str::<Value>(body) {
        Ok(Value::Object(map)) => match map.get("detail") {
            Some(Value::String(s)) => Some(s.clone()),
            Some(other) => Some(other.to_string()),
            None => Some(body.to_string()),
        },
        _ => Some(body.to_string()),
    }
}

/// Client contract for the mapping service.
///
/// Futures are not required to be `Send` so the browser client can implement
/// it on top of `fetch`.
#[async_trait(?Send)]
pub trait MapperApi {
    async fn create_mapping(&self, mapping: &NewFieldMapping) -> Result<FieldMapping, ClientError>;

    async fn list_mappings(&self) -> Result<Vec<FieldMapping>, ClientError>;

    async fn get_mapping(&self, api_field: &str) -> Result<FieldMapping, ClientError>;

    async fn get_scheduler(&self, task_name: &str) -> Result<SchedulerFlag, ClientError>;

    /// Ask the server to set the flag; the returned flag is what the server
    /// actually stored.
    async fn set_scheduler(
        &self,
        task_name: &str,
        enabled: bool,
    ) -> Result<SchedulerFlag, ClientError>;

    async fn create_scheduler(&self, flag: &SchedulerFlag) -> Result<SchedulerFlag, ClientError>;

    /// Forward a payload. The response body is not inspected.
    async fn forward_webhook(&self, payload: &Value) -> Result<(), ClientError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::normalize_base_url;

    fn base() -> Url {
        normalize_base_url("http://localhost:8000").unwrap()
    }

    #[test]
    fn test_endpoint_paths() {
        let b = base();
        assert_eq!(
            Endpoint::CreateMapping.url(&b).unwrap().as_str(),
            "http://localhost:8000/field-mappings/"
        );
        assert_eq!(
            Endpoint::ListMappings.url(&b).unwrap().as_str(),
            "http://localhost:8000/mappings"
        );
        assert_eq!(
            Endpoint::GetScheduler {
                task_name: "fetch_data"
            }
            .url(&b)
            .unwrap()
            .as_str(),
            "http://localhost:8000/scheduler/fetch_data/"
        );
        assert_eq!(
            Endpoint::CreateScheduler.url(&b).unwrap().as_str(),
            "http://localhost:8000/scheduler/"
        );
        assert_eq!(
            Endpoint::ForwardWebhook.url(&b).unwrap().as_str(),
            "http://localhost:8000/webhook/"
        );
    }

    #[test]
    fn test_set_scheduler_carries_query() {
        let url = Endpoint::SetScheduler {
            task_name: "fetch_data",
            enabled: true,
        }
        .url(&base())
        .unwrap();
        assert_eq!(
            url.as_str(),
            "http://localhost:8000/scheduler/fetch_data/?enabled=true"
        );
    }

    #[test]
    fn test_path_prefix_is_kept() {
        let b = normalize_base_url("https://example.com/api").unwrap();
        assert_eq!(
            Endpoint::ListMappings.url(&b).unwrap().as_str(),
            "https://example.com/api/mappings"
        );
    }

    #[test]
    fn test_user_segments_are_encoded() {
        let url = Endpoint::GetMapping {
            api_field: "a/b c",
        }
        .url(&base())
        .unwrap();
        assert_eq!(url.as_str(), "http://localhost:8000/field-mappings/a%2Fb%20c/");
    }

    #[test]
    fn test_methods() {
        assert_eq!(Endpoint::ListMappings.method(), Method::Get);
        assert_eq!(Endpoint::CreateMapping.method(), Method::Post);
        assert_eq!(
            Endpoint::SetScheduler {
                task_name: "t",
                enabled: false
            }
            .method()
            .as_str(),
            "PUT"
        );
    }

    #[test]
    fn test_error_detail() {
        assert_eq!(
            error_detail(r#"{"detail": "Scheduler config not found"}"#),
            Some("Scheduler config not found".to_string())
        );
        assert_eq!(error_detail("  "), None);
        assert_eq!(
            error_detail("Bad Gateway"),
            Some("Bad Gateway".to_string())
        );
    }
}
