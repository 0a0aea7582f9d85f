//! # Outbound Ports
//!
//! Collaborators the messaging core depends on but does not implement:
//! the HTTP transport, the trust-service token provider, the header schema
//! codec, token signature verification and the clock.

use crate::domain::{Claims, ClaimsError, SchemaError};
use async_trait::async_trait;
use bytes::Bytes;
use ids_types::{DynamicAttributeToken, MessageHeader};
use parking_lot::Mutex;
use std::collections::VecDeque;
use thiserror::Error;

// =============================================================================
// TRANSPORT
// =============================================================================

/// An encoded request ready for the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundRequest {
    /// Address of the receiving connector.
    pub target: String,
    /// `multipart/form-data; boundary=...`
    pub content_type: String,
    /// Encoded multipart body.
    pub body: Bytes,
}

/// Raw response as returned by the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    /// HTTP status code.
    pub status: u16,
    /// Response `Content-Type`, if any.
    pub content_type: Option<String>,
    /// Response body.
    pub body: Bytes,
}

impl TransportResponse {
    /// A `200 OK` response with the given body.
    pub fn ok(body: impl Into<Bytes>) -> Self {
        Self {
            status: 200,
            content_type: None,
            body: body.into(),
        }
    }

    /// Whether the status is in the 2xx range.
    #[must_use]
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// I/O failures reported by a transport.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// The target could not be reached or the exchange broke off.
    #[error("Connection to {target} failed: {reason}")]
    Connection {
        /// Target address
        target: String,
        /// Underlying failure
        reason: String,
    },

    /// No response arrived in time.
    #[error("Request to {target} timed out after {after_ms}ms")]
    Timeout {
        /// Target address
        target: String,
        /// Configured timeout
        after_ms: u64,
    },

    /// The exchange was cancelled before completion.
    ///
    /// Raised by transports with their own cancellation source, such as a
    /// shutdown signal. `HttpTransport` has none; dropping the `send` future
    /// cancels it without producing an error.
    #[error("Request to {target} was cancelled")]
    Cancelled {
        /// Target address
        target: String,
    },

    /// The target address is unusable.
    #[error("Invalid target address: {0}")]
    InvalidTarget(String),

    /// The transport itself could not be set up.
    #[error("Transport configuration error: {0}")]
    Configuration(String),
}

/// Sends an encoded request and returns the raw response.
///
/// Timeouts and cancellation are the transport's responsibility; the core
/// never retries.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send one request.
    async fn send(&self, request: OutboundRequest) -> Result<TransportResponse, TransportError>;
}

// =============================================================================
// TOKEN PROVIDER
// =============================================================================

/// Failure to obtain this node's current token from the trust service.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenProviderError {
    /// The trust service could not be reached or refused to issue a token.
    #[error("DAPS token manager error: {0}")]
    Unavailable(String),

    /// Only an expired token is available.
    #[error("DAPS token manager error: cached token expired")]
    Expired,
}

/// Supplies the security token attached to outgoing messages.
#[async_trait]
pub trait TokenProvider: Send + Sync {
    /// Current token for this node.
    async fn current_token(&self) -> Result<DynamicAttributeToken, TokenProviderError>;
}

// =============================================================================
// SCHEMA CODEC
// =============================================================================

/// Converts between header bytes and the structured header object.
pub trait SchemaCodec: Send + Sync {
    /// Parse header bytes.
    fn parse_header(&self, bytes: &[u8]) -> Result<MessageHeader, SchemaError>;

    /// Serialize a header.
    fn serialize_header(&self, header: &MessageHeader) -> Result<Bytes, SchemaError>;
}

// =============================================================================
// TOKEN VERIFIER
// =============================================================================

/// Failures while verifying a token and extracting its claims.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenVerificationError {
    /// The token format is not supported.
    #[error("Unsupported token format: {0}")]
    UnsupportedFormat(String),

    /// The signature does not verify against the trust anchor.
    #[error("Invalid token signature")]
    InvalidSignature,

    /// The claims are unreadable.
    #[error("Malformed claims: {0}")]
    MalformedClaims(#[from] ClaimsError),

    /// Verification material (keys) could not be obtained.
    #[error("Verification unavailable: {0}")]
    Unavailable(String),
}

/// Verifies a token's signature and returns its claims.
#[async_trait]
pub trait TokenVerifier: Send + Sync {
    /// Verify the token and decode its claims.
    async fn verify(&self, token: &DynamicAttributeToken) -> Result<Claims, TokenVerificationError>;
}

// =============================================================================
// TIME SOURCE
// =============================================================================

/// Time source for claim checks.
pub trait TimeSource: Send + Sync {
    /// Seconds since the Unix epoch.
    fn now(&self) -> i64;
}

/// Wall clock.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemTimeSource;

impl TimeSource for SystemTimeSource {
    fn now(&self) -> i64 {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_secs() as i64)
            // Clock before Unix epoch - report 0 rather than panic
            .unwrap_or(0)
    }
}

// =============================================================================
// Mock Implementations for Testing
// =============================================================================

/// Fixed clock for testing.
#[derive(Debug, Clone, Copy)]
pub struct FixedTimeSource(pub i64);

impl TimeSource for FixedTimeSource {
    fn now(&self) -> i64 {
        self.0
    }
}

/// Transport that replays queued responses and records every request.
#[derive(Default)]
pub struct MockTransport {
    responses: Mutex<VecDeque<Result<TransportResponse, TransportError>>>,
    sent: Mutex<Vec<OutboundRequest>>,
}

impl MockTransport {
    /// Empty mock; any send fails with a connection error.
    pub fn new() -> Self {
        Self::default()
    }

    /// Mock that answers the next request with `response`.
    pub fn replying(response: TransportResponse) -> Self {
        let mock = Self::new();
        mock.push_response(Ok(response));
        mock
    }

    /// Mock that fails the next request with `error`.
    pub fn failing(error: TransportError) -> Self {
        let mock = Self::new();
        mock.push_response(Err(error));
        mock
    }

    /// Queue another outcome.
    pub fn push_response(&self, outcome: Result<TransportResponse, TransportError>) {
        self.responses.lock().push_back(outcome);
    }

    /// Requests sent so far.
    pub fn sent_requests(&self) -> Vec<OutboundRequest> {
        self.sent.lock().clone()
    }

    /// Number of requests sent so far.
    pub fn send_count(&self) -> usize {
        self.sent.lock().len()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn send(&self, request: OutboundRequest) -> Result<TransportResponse, TransportError> {
        let target = request.target.clone();
        self.sent.lock().push(request);
        self.responses
            .lock()
            .pop_front()
            .unwrap_or_else(|| {
                Err(TransportError::Connection {
                    target,
                    reason: "no mock response queued".to_string(),
                })
            })
    }
}
