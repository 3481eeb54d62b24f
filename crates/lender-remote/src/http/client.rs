//! Backend struct, URL building, and response decoding.

use reqwest::{StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use lender_common::new_correlation_id;

use crate::ServiceError;

use super::config::BackendConfig;

/// Longest error body carried into a [`ServiceError::Status`].
const MAX_ERROR_BODY: usize = 200;

/// One reqwest client shared by all endpoints.
pub struct HttpBackend {
    pub(crate) config: BackendConfig,
    pub(crate) base: Url,
    pub(crate) http: reqwest::Client,
}

impl HttpBackend {
    pub fn new(config: BackendConfig) -> Result<Self, ServiceError> {
        let base = Url::parse(config.base_url.trim()).map_err(|e| {
            ServiceError::Transport(format!("invalid base URL '{}': {e}", config.base_url))
        })?;
        if base.cannot_be_a_base() {
            return Err(ServiceError::Transport(format!(
                "base URL '{}' cannot carry a path",
                config.base_url
            )));
        }

        let http = reqwest::Client::builder()
            .connect_timeout(config.connect_timeout)
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| ServiceError::Transport(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { config, base, http })
    }

    pub fn config(&self) -> &BackendConfig {
        &self.config
    }

    /// Append percent-encoded path segments to the base URL.
    pub(crate) fn endpoint(&self, segments: &[&str]) -> Result<Url, ServiceError> {
        let mut url = self.base.clone();
        {
            let mut path = url.path_segments_mut().map_err(|_| {
                ServiceError::Transport(format!("base URL '{}' cannot carry a path", self.base))
            })?;
            path.pop_if_empty();
            path.extend(segments);
        }
        Ok(url)
    }

    pub(crate) async fn get_json<T: DeserializeOwned>(
        &self,
        segments: &[&str],
    ) -> Result<T, ServiceError> {
        let url = self.endpoint(segments)?;
        let call = new_correlation_id();
        debug!(%call, %url, "GET");

        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| ServiceError::Transport(e.to_string()))?;

        decode(&call, response).await
    }

    pub(crate) async fn post_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        segments: &[&str],
        body: &B,
    ) -> Result<T, ServiceError> {
        let url = self.endpoint(segments)?;
        let call = new_correlation_id();
        debug!(%call, %url, "POST");

        let response = self
            .http
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(|e| ServiceError::Transport(e.to_string()))?;

        decode(&call, response).await
    }
}

/// Map status codes onto the error taxonomy and decode the JSON body.
async fn decode<T: DeserializeOwned>(
    call: &str,
    response: reqwest::Response,
) -> Result<T, ServiceError> {
    let status = response.status();
    debug!(%call, status = status.as_u16(), "response");

    if status == StatusCode::NOT_FOUND {
        return Err(ServiceError::NotFound);
    }
    if !status.is_success() {
        let text = response.text().await.unwrap_or_default();
        return Err(ServiceError::Status {
            status: status.as_u16(),
            body: text.chars().take(MAX_ERROR_BODY).collect(),
        });
    }

    let bytes = response
        .bytes()
        .await
        .map_err(|e| ServiceError::Transport(e.to_string()))?;
    serde_json::from_slice(&bytes).map_err(|e| ServiceError::Malformed(e.to_string()))
}
