use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use serde_json::Value;

use crate::api::models::RequestBody;
use crate::api::streaming::process_streaming_response;
use crate::error::{Result, ScoutError};

/// Narrow seam to the hosted model, so the decision loop can run against an
/// in-memory double in tests. `complete` is one non-streaming round (used
/// while tool calls may come back); `stream_final` renders the answer to the
/// terminal as it arrives and returns the accumulated text.
#[async_trait]
pub trait ChatTransport: Send + Sync {
    async fn complete(&self, request: &RequestBody) -> Result<Value>;
    async fn stream_final(&self, request: &RequestBody) -> Result<String>;
}

pub struct HttpChatTransport {
    client: reqwest::Client,
    endpoint: String,
    stream_timeout: u64,
    verbose: bool,
}

impl HttpChatTransport {
    pub fn new(
        api_key: &str,
        endpoint: impl Into<String>,
        stream_timeout: u64,
        verbose: bool,
    ) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", api_key)).map_err(|e| {
                ScoutError::ConfigError(format!("Invalid authorization header: {}", e))
            })?,
        );
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder().default_headers(headers).build()?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
            stream_timeout,
            verbose,
        })
    }

    async fn post(&self, request: &RequestBody) -> Result<reqwest::Response> {
        let response = self.client.post(&self.endpoint).json(request).send().await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(ScoutError::ApiError { status, message });
        }

        Ok(response)
    }
}

#[async_trait]
impl ChatTransport for HttpChatTransport {
    async fn complete(&self, request: &RequestBody) -> Result<Value> {
        let response = self.post(request).await?;
        let text = response.text().await?;
        let parsed: Value = serde_json::from_str(&text)?;
        Ok(parsed)
    }

    async fn stream_final(&self, request: &RequestBody) -> Result<String> {
        let response = self.post(request).await?;
        process_streaming_response(response, self.stream_timeout, self.verbose).await
    }
}
