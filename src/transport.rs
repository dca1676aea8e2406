use crate::error::TransportError;
use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;

/// Issues a single `GET` and returns the decoded JSON body.
///
/// Implementations do not retry or cache; [`crate::PokeApiClient`] layers both
/// on top.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn get_json(&self, url: &str) -> Result<Value, TransportError>;
}

/// [`Transport`] backed by a shared `reqwest` client.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new(timeout: Duration) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| TransportError::Network(e.to_string()))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get_json(&self, url: &str) -> Result<Value, TransportError> {
        tracing::debug!("GET {}", url);

        let response = self.client.get(url).send().await.map_err(|e| {
            tracing::debug!("HTTP request to {} failed: {}", url, e);
            TransportError::from(e)
        })?;

        let status = response.status();
        if !status.is_success() {
            tracing::debug!("GET {} returned status {}", url, status);
            return Err(TransportError::Status(status.as_u16()));
        }

        response.json::<Value>().await.map_err(|e| {
            tracing::debug!("Failed to decode JSON from {}: {}", url, e);
            TransportError::Decode(e.to_string())
        })
    }
}
