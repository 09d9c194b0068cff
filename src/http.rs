//! [`MapperApi`] over `reqwest`, for native targets.

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;
use url::Url;

use crate::api::{Endpoint, MapperApi, Method, error_detail};
use crate::config::ClientConfig;
use crate::error::ClientError;
use crate::model::{FieldMapping, NewFieldMapping, SchedulerFlag};

#[derive(Debug, Clone)]
pub struct HttpApi {
    client: Client,
    base_url: Url,
}

impl HttpApi {
    pub fn new(config: &ClientConfig) -> Result<Self, ClientError> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| ClientError::Transport(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.base_url.clone(),
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn request(&self, endpoint: Endpoint<'_>) -> Result<RequestBuilder, ClientError> {
        let url = endpoint.url(&self.base_url)?;
        debug!(method = endpoint.method().as_str(), url = %url, "Sending request.");
        Ok(match endpoint.method() {
            Method::Get => self.client.get(url),
            Method::Post => self.client.post(url),
            Method::Put => self.client.put(url),
        })
    }
}

async fn send(request: RequestBuilder) -> Result<Response, ClientError> {
    let response = request
        .send()
        .await
        .map_err(|e| ClientError::Transport(e.to_string()))?;

    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    Err(ClientError::Status {
        status: status.as_u16(),
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
impl MapperApi for HttpApi {
    async fn create_mapping(&self, mapping: &NewFieldMapping) -> Result<FieldMapping, ClientError> {
        let response = send(self.request(Endpoint::CreateMapping)?.json(mapping)).await?;
        decode(response).await
    }

    async fn list_mappings(&self) -> Result<Vec<FieldMapping>, ClientError> {
        let response = send(self.request(Endpoint::ListMappings)?).await?;
        decode(response).await
    }

    async fn get_mapping(&self, api_field: &str) -> Result<FieldMapping, ClientError> {
        let response = send(self.request(Endpoint::GetMapping { api_field })?).await?;
        decode(response).await
    }

    async fn get_scheduler(&self, task_name: &str) -> Result<SchedulerFlag, ClientError> {
        let response = send(self.request(Endpoint::GetScheduler { task_name })?).await?;
        decode(response).await
    }

    async fn set_scheduler(
        &self,
        task_name: &str,
        enabled: bool,
    ) -> Result<SchedulerFlag, ClientError> {
        let response = send(self.request(Endpoint::SetScheduler { task_name, enabled })?).await?;
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
