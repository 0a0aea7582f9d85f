//! Outbound request errors.

use crate::domain::{MessageContainer, MultipartError, SchemaError};
use crate::ports::{TokenProviderError, TransportError};
use ids_types::{HeaderError, MessageHeader, RejectionReason};
use thiserror::Error;

/// Why a request execution failed.
///
/// Each stage of execution has its own variant so callers can tell network
/// trouble, protocol rejections and payload mismatches apart.
#[derive(Debug, Error)]
pub enum RequestError {
    /// `execute` was called before a template was set.
    #[error("No request template provided")]
    NoTemplateProvided,

    /// The template could not produce a valid header.
    #[error("Request template failed: {0}")]
    Template(#[from] HeaderError),

    /// This node's token could not be obtained.
    #[error(transparent)]
    TokenProvider(#[from] TokenProviderError),

    /// The transport failed. Never retried.
    #[error("I/O error: {0}")]
    Io(#[from] TransportError),

    /// The outbound envelope could not be encoded.
    #[error("Failed to encode request: {0}")]
    Encoding(#[source] MultipartError),

    /// The response body is not a valid multipart envelope.
    #[error("Failed to parse multipart response: {0}")]
    MultipartParse(#[source] MultipartError),

    /// The response envelope lacks the mandatory header part.
    #[error("Response has no header part")]
    MissingHeaderPart,

    /// A header could not be (de)serialized.
    #[error("Schema error: {0}")]
    Schema(#[from] SchemaError),

    /// The recipient answered with a rejection and `throw_on_rejection` was set.
    #[error(
        "Request rejected by recipient: {}",
        .reason.map(|r| r.code()).unwrap_or("no reason given")
    )]
    Rejection {
        /// Reason code of the rejection, if the recipient sent one.
        reason: Option<RejectionReason>,
        /// Explanation from the rejection payload, if UTF-8.
        message: Option<String>,
        /// The full rejection header.
        header: Box<MessageHeader>,
    },

    /// The response payload does not match the expected type.
    #[error("Unexpected payload, expected {expected}: {reason}")]
    UnexpectedPayload {
        /// Name of the expected payload type.
        expected: &'static str,
        /// Why the payload did not match.
        reason: String,
        /// The response as received.
        container: Box<MessageContainer>,
    },
}

impl RequestError {
    /// Rejection reason, for `Rejection` errors.
    #[must_use]
    pub fn rejection_reason(&self) -> Option<RejectionReason> {
        match self {
            RequestError::Rejection { reason, .. } => *reason,
            _ => None,
        }
    }

    /// The raw response, for `UnexpectedPayload` errors.
    #[must_use]
    pub fn container(&self) -> Option<&MessageContainer> {
        match self {
            RequestError::UnexpectedPayload { container, .. } => Some(container),
            _ => None,
        }
    }

    /// Whether the failure happened before anything was sent.
    #[must_use]
    pub fn is_local(&self) -> bool {
        matches!(
            self,
            RequestError::NoTemplateProvided
                | RequestError::Template(_)
                | RequestError::TokenProvider(_)
                | RequestError::Encoding(_)
        )
    }
}
