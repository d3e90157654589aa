use reqwest::header::AUTHORIZATION;
use serde::{de::DeserializeOwned, Serialize};
use std::sync::Arc;

use super::common::{ApiQueryParams, CloudErrorResponse, PollConfig, API_VERSION};
use super::error::ApiError;

/// Default ARM endpoint.
pub const DEFAULT_ENDPOINT: &str = "https://management.azure.com";

/// Azure Resource Manager API client scoped to one subscription.
#[derive(Clone)]
pub struct Client {
    inner: Arc<ClientInner>,
}

struct ClientInner {
    http_client: reqwest::Client,
    endpoint: String,
    subscription_id: String,
    auth_header: String,
    retry_config: RetryConfig,
    poll_config: PollConfig,
}

#[derive(Clone)]
pub struct RetryConfig {
    pub max_retries: u32,
    pub initial_backoff_ms: u64,
    pub max_backoff_ms: u64,
    pub timeout_seconds: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_backoff_ms: 100,
            max_backoff_ms: 10000,
            timeout_seconds: 30,
        }
    }
}

impl Client {
    /// Create a new API client with default configuration.
    pub fn new(endpoint: &str, subscription_id: &str, access_token: &str) -> Result<Self, ApiError> {
        Self::with_config(
            endpoint,
            subscription_id,
            access_token,
            RetryConfig::default(),
            PollConfig::default(),
        )
    }

    /// Create a new API client with custom retry and polling configuration.
    pub fn with_config(
        endpoint: &str,
        subscription_id: &str,
        access_token: &str,
        retry_config: RetryConfig,
        poll_config: PollConfig,
    ) -> Result<Self, ApiError> {
        let parsed = url::Url::parse(endpoint)
            .map_err(|e| ApiError::InvalidEndpoint(format!("{}: {}", endpoint, e)))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ApiError::InvalidEndpoint(format!(
                "{}: unsupported scheme '{}'",
                endpoint,
                parsed.scheme()
            )));
        }

        let http_client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(retry_config.timeout_seconds))
            .build()?;

        let endpoint = endpoint.trim_end_matches('/').to_string();
        let auth_header = format!("Bearer {}", access_token);

        Ok(Self {
            inner: Arc::new(ClientInner {
                http_client,
                endpoint,
                subscription_id: subscription_id.to_string(),
                auth_header,
                retry_config,
                poll_config,
            }),
        })
    }

    pub fn subscription_id(&self) -> &str {
        &self.inner.subscription_id
    }

    pub fn poll_config(&self) -> &PollConfig {
        &self.inner.poll_config
    }

    /// Path prefix for the DevTest Labs provider in a resource group.
    pub fn provider_path(&self, resource_group: &str) -> String {
        format!(
            "/subscriptions/{}/resourceGroups/{}/providers/Microsoft.DevTestLab",
            self.inner.subscription_id, resource_group
        )
    }

    /// Lab API operations.
    pub fn labs(&self) -> super::labs::LabsApi<'_> {
        super::labs::LabsApi::new(self)
    }

    /// Lab virtual network API operations.
    pub fn virtual_networks(&self) -> super::virtual_networks::VirtualNetworksApi<'_> {
        super::virtual_networks::VirtualNetworksApi::new(self)
    }

    /// Artifact source API operations.
    pub fn artifact_sources(&self) -> super::artifact_sources::ArtifactSourcesApi<'_> {
        super::artifact_sources::ArtifactSourcesApi::new(self)
    }

    /// Lab virtual machine API operations.
    pub fn virtual_machines(&self) -> super::virtual_machines::VirtualMachinesApi<'_> {
        super::virtual_machines::VirtualMachinesApi::new(self)
    }

    /// Execute a GET request with retry logic.
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        self.get_with_params(path, &ApiQueryParams::new()).await
    }

    /// Execute a GET request with extra query parameters.
    pub async fn get_with_params<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &ApiQueryParams,
    ) -> Result<T, ApiError> {
        let url = self.request_url(path, params);
        let response = self
            .execute_with_retry(
                || async {
                    tracing::debug!("GET request to: {}", url);
                    self.inner
                        .http_client
                        .get(&url)
                        .header(AUTHORIZATION, &self.inner.auth_header)
                        .send()
                        .await
                },
                path,
            )
            .await?;
        self.parse_success_response(response).await
    }

    /// GET that maps 404 to `None`, for existence checks.
    pub async fn get_optional<T: DeserializeOwned>(
        &self,
        path: &str,
    ) -> Result<Option<T>, ApiError> {
        self.get_optional_with_params(path, &ApiQueryParams::new())
            .await
    }

    /// GET with extra query parameters, mapping 404 to `None`.
    pub async fn get_optional_with_params<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &ApiQueryParams,
    ) -> Result<Option<T>, ApiError> {
        match self.get_with_params(path, params).await {
            Ok(value) => Ok(Some(value)),
            Err(err) if err.status() == Some(404) => Ok(None),
            Err(err) => Err(err),
        }
    }

    /// Execute a PUT request with retry logic.
    pub async fn put<T: DeserializeOwned, B: Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let url = self.request_url(path, &ApiQueryParams::new());
        let response = self
            .execute_with_retry(
                || async {
                    tracing::debug!("PUT request to: {}", url);
                    self.inner
                        .http_client
                        .put(&url)
                        .header(AUTHORIZATION, &self.inner.auth_header)
                        .json(body)
                        .send()
                        .await
                },
                path,
            )
            .await?;
        self.parse_success_response(response).await
    }

    /// Execute a DELETE request with retry logic, discarding any body.
    pub async fn delete(&self, path: &str) -> Result<(), ApiError> {
        let url = self.request_url(path, &ApiQueryParams::new());
        self.execute_with_retry(
            || async {
                tracing::debug!("DELETE request to: {}", url);
                self.inner
                    .http_client
                    .delete(&url)
                    .header(AUTHORIZATION, &self.inner.auth_header)
                    .send()
                    .await
            },
            path,
        )
        .await?;
        Ok(())
    }

    fn request_url(&self, path: &str, params: &ApiQueryParams) -> String {
        let mut all = ApiQueryParams::new().add("api-version", API_VERSION);
        for (key, value) in params.entries() {
            all = all.add(key.clone(), value.clone());
        }
        format!("{}{}{}", self.inner.endpoint, path, all.to_query_string())
    }

    /// Execute request with retry logic, returning the successful response.
    async fn execute_with_retry<F, Fut>(
        &self,
        request_fn: F,
        path: &str,
    ) -> Result<reqwest::Response, ApiError>
    where
        F: Fn() -> Fut,
        Fut: std::future::Future<Output = Result<reqwest::Response, reqwest::Error>>,
    {
        let mut attempt = 0;
        let mut last_error = None;

        while attempt <= self.inner.retry_config.max_retries {
            if attempt > 0 {
                let backoff = std::cmp::min(
                    self.inner.retry_config.initial_backoff_ms * (2_u64.pow(attempt - 1)),
                    self.inner.retry_config.max_backoff_ms,
                );
                tracing::debug!(
                    "Retrying request to {} after {}ms (attempt {})",
                    path,
                    backoff,
                    attempt
                );
                tokio::time::sleep(tokio::time::Duration::from_millis(backoff)).await;
            }

            match request_fn().await {
                Ok(response) => {
                    let status = response.status();

                    if status.is_success() {
                        return Ok(response);
                    }

                    if status == reqwest::StatusCode::UNAUTHORIZED {
                        return Err(ApiError::Auth);
                    }

                    if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
                        last_error = Some(ApiError::RateLimited);
                    } else if status.is_server_error() {
                        last_error = Some(ApiError::ServiceUnavailable);
                    } else {
                        return Err(self.cloud_error(response).await);
                    }
                }
                Err(e) => {
                    if e.is_timeout() {
                        last_error =
                            Some(ApiError::Timeout(self.inner.retry_config.timeout_seconds));
                    } else if e.is_connect() || e.is_request() {
                        last_error = Some(ApiError::ServiceUnavailable);
                    } else {
                        return Err(ApiError::Request(e));
                    }
                }
            }

            attempt += 1;
        }

        Err(last_error.unwrap_or(ApiError::ServiceUnavailable))
    }

    /// Parse a successful response body.
    async fn parse_success_response<T: DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> Result<T, ApiError> {
        let text = response.text().await?;
        tracing::debug!("API response body: {}", text);

        let body = if text.is_empty() { "null" } else { text.as_str() };
        serde_json::from_str::<T>(body).map_err(|e| {
            tracing::error!("Failed to deserialize response: {}, body: {}", e, text);
            ApiError::Parse(format!("Failed to parse response: {}", e))
        })
    }

    /// Turn a non-retryable error response into the ARM error envelope.
    async fn cloud_error(&self, response: reqwest::Response) -> ApiError {
        let status = response.status().as_u16();
        let text = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());

        match serde_json::from_str::<CloudErrorResponse>(&text) {
            Ok(CloudErrorResponse { error: Some(body) }) => ApiError::Cloud {
                status,
                code: body.code.unwrap_or_else(|| "Unknown".to_string()),
                message: body.message.unwrap_or_default(),
            },
            _ => ApiError::Cloud {
                status,
                code: "Unknown".to_string(),
                message: text,
            },
        }
    }
}
