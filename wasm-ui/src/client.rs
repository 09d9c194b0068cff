//! Browser side of the service contract.
//!
//! [`GlooApi`] implements [`MapperApi`] with `fetch` through `gloo::net`.
//! Each component holds its own copy carrying an abort signal, so unmounting
//! the component cancels whatever it still has in flight.

use async_trait::async_trait;
use datamapper::api::{Method, error_detail};
use datamapper::{
    ClientConfig, ClientError, Endpoint, FieldMapping, Flow, MapperApi, NewFieldMapping,
    Reporter, SchedulerFlag,
};
use gloo::net::http::{Request, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde_json::Value;
use url::Url;
use web_sys::AbortSignal;

/// Resolve the service address once at startup.
///
/// A compile-time `DATAMAPPER_API_BASE` wins; otherwise the page's own
/// origin is used, so the app can be served by the service itself.
pub fn resolve_config(
    compiled: Option<&str>,
    origin: Option<String>,
) -> Result<ClientConfig, ClientError> {
    match (compiled, origin) {
        (Some(base), _) if !base.trim().is_empty() => ClientConfig::new(base),
        (_, Some(origin)) => ClientConfig::new(&origin),
        _ => Err(ClientError::InvalidConfig(
            "no service address: set DATAMAPPER_API_BASE or serve from http(s)".to_string(),
        )),
    }
}

/// Config for this page: build-time address or `window.location.origin`.
pub fn page_config() -> Result<ClientConfig, ClientError> {
    let origin = web_sys::window().and_then(|w| w.location().origin().ok());
    resolve_config(option_env!("DATAMAPPER_API_BASE"), origin)
}

#[derive(Clone)]
pub struct GlooApi {
    base_url: Url,
    signal: Option<AbortSignal>,
}

impl PartialEq for GlooApi {
    fn eq(&self, other: &Self) -> bool {
        self.base_url == other.base_url
    }
}

impl GlooApi {
    pub fn new(config: &ClientConfig) -> Self {
        Self {
            base_url: config.base_url.clone(),
            signal: None,
        }
    }

    /// Copy of this client whose requests are aborted with `signal`.
    pub fn with_signal(&self, signal: Option<AbortSignal>) -> Self {
        Self {
            base_url: self.base_url.clone(),
            signal,
        }
    }

    /// Whether the owning component has gone away.
    pub fn is_aborted(&self) -> bool {
        self.signal.as_ref().is_some_and(|s| s.aborted())
    }

    fn request(&self, endpoint: Endpoint<'_>) -> Result<RequestBuilder, ClientError> {
        let url = endpoint.url(&self.base_url)?;
        let builder = match endpoint.method() {
            Method::Get => Request::get(url.as_str()),
            Method::Post => Request::post(url.as_str()),
            Method::Put => Request::put(url.as_str()),
        };
        Ok(builder.abort_signal(self.signal.as_ref()))
    }
}

fn transport(e: gloo::net::Error) -> ClientError {
    ClientError::Transport(e.to_string())
}

async fn send(request: Result<Request, gloo::net::Error>) -> Result<Response, ClientError> {
    let response = request.map_err(transport)?.send().await.map_err(transport)?;
    if response.ok() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(ClientError::Status {
        status: response.status(),
        detail: error_detail(&body),
    })
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ClientError> {
    response
        .json::<T>()
        .await
        .map_err(|e| ClientError::Decode(e.to_string()))
}

#[async_trait(?Send)]
impl MapperApi for GlooApi {
    async fn create_mapping(&self, mapping: &NewFieldMapping) -> Result<FieldMapping, ClientError> {
        let response = send(self.request(Endpoint::CreateMapping)?.json(mapping)).await?;
        decode(response).await
    }

    async fn list_mappings(&self) -> Result<Vec<FieldMapping>, ClientError> {
        let response = send(self.request(Endpoint::ListMappings)?.build()).await?;
        decode(response).await
    }

    async fn get_mapping(&self, api_field: &str) -> Result<FieldMapping, ClientError> {
        let response = send(self.request(Endpoint::GetMapping { api_field })?.build()).await?;
        decode(response).await
    }

    async fn get_scheduler(&self, task_name: &str) -> Result<SchedulerFlag, ClientError> {
        let response = send(self.request(Endpoint::GetScheduler { task_name })?.build()).await?;
        decode(response).await
    }

    async fn set_scheduler(
        &self,
        task_name: &str,
        enabled: bool,
    ) -> Result<SchedulerFlag, ClientError> {
        let endpoint = Endpoint::SetScheduler { task_name, enabled };
        let response = send(self.request(endpoint)?.build()).await?;
        decode(response).await
    }

    async fn create_scheduler(&self, flag: &SchedulerFlag) -> Result<SchedulerFlag, ClientError> {
        let response = send(self.request(Endpoint::CreateScheduler)?.json(flag)).await?;
        decode(response).await
    }

    async fn forward_webhook(&self, payload: &Value) -> Result<(), ClientError> {
        send(self.request(Endpoint::ForwardWebhook)?.json(payload)).await?;
        Ok(())
    }
}

/// Sends failures to the devtools console.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleReporter;

impl Reporter for ConsoleReporter {
    fn failure(&self, flow: Flow, e: &ClientError) {
        gloo::console::error!(format!("[{}] Request failed: {}", flow, e));
    }
}
