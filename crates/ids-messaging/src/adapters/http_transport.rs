//! Outbound HTTP transport backed by `reqwest`.

use crate::config::OutboundConfig;
use crate::ports::{OutboundRequest, Transport, TransportError, TransportResponse};
use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use tracing::debug;

/// POSTs encoded envelopes to peer connectors.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    request_timeout_ms: u64,
}

impl HttpTransport {
    /// Create a transport with the configured timeouts.
    pub fn new(config: &OutboundConfig) -> Result<Self, TransportError> {
        let client = Client::builder()
            .timeout(config.request_timeout())
            .connect_timeout(config.connect_timeout())
            .build()
            .map_err(client_build_error)?;
        Ok(Self::with_client(client, config.request_timeout_ms))
    }

    /// Wrap an existing client, e.g. one configured with client certificates.
    pub fn with_client(client: Client, request_timeout_ms: u64) -> Self {
        Self {
            client,
            request_timeout_ms,
        }
    }

    fn classify(&self, target: &str, error: reqwest::Error) -> TransportError {
        if error.is_timeout() {
            TransportError::Timeout {
                target: target.to_string(),
                after_ms: self.request_timeout_ms,
            }
        } else if error.is_builder() {
            TransportError::InvalidTarget(format!("{}: {}", target, error))
        } else {
            TransportError::Connection {
                target: target.to_string(),
                reason: error.to_string(),
            }
        }
    }
}

fn client_build_error(error: reqwest::Error) -> TransportError {
    TransportError::Configuration(format!("cannot build HTTP client: {}", error))
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: OutboundRequest) -> Result<TransportResponse, TransportError> {
        let target = request.target;
        let response = self
            .client
            .post(target.as_str())
            .header(CONTENT_TYPE, request.content_type)
            .body(request.body)
            .send()
            .await
            .map_err(|e| self.classify(&target, e))?;

        let status = response.status().as_u16();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let body = response
            .bytes()
            .await
            .map_err(|e| self.classify(&target, e))?;

        debug!(peer = %target, status, bytes = body.len(), "Received response");
        Ok(TransportResponse {
            status,
            content_type,
            body,
        })
    }
}
