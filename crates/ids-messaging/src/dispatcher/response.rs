//! # Dispatch Responses
//!
//! Turns a handler's [`MessageResponse`] into a full response header and
//! the HTTP-level answer returned to the transport.

use crate::dispatcher::handler::MessageResponse;
use crate::domain::IdentityContext;
use bytes::Bytes;
use ids_types::{HeaderError, MessageHeader, MessageType};

/// Status of every well-formed answer, rejections included.
pub const STATUS_OK: u16 = 200;

/// Status used only when no response envelope could be produced.
pub const STATUS_INTERNAL_ERROR: u16 = 500;

/// HTTP-level answer to one inbound request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchResponse {
    /// Status code.
    pub status: u16,
    /// `Content-Type` of `body`.
    pub content_type: String,
    /// Encoded response.
    pub body: Bytes,
    /// Type of the response message; `None` for the plain-text fallback.
    pub message_type: Option<MessageType>,
}

impl DispatchResponse {
    pub(crate) fn fallback(message: impl Into<String>) -> Self {
        Self {
            status: STATUS_INTERNAL_ERROR,
            content_type: "text/plain; charset=utf-8".to_string(),
            body: Bytes::from(message.into()),
            message_type: None,
        }
    }

    #[must_use]
    pub fn is_rejection(&self) -> bool {
        self.message_type.as_ref().is_some_and(MessageType::is_rejection)
    }
}

/// Build the header answering `request`.
///
/// Issuer and sender come from `identity`. When the request header is known
/// its issuer becomes the recipient and its `@id` the correlation message.
pub(crate) fn response_header(
    identity: &IdentityContext,
    request: Option<&MessageHeader>,
    response: &MessageResponse,
) -> Result<MessageHeader, HeaderError> {
    let mut builder = MessageHeader::builder(response.message_type.clone())
        .model_version(identity.model_version.as_str())
        .issuer_connector(identity.connector_id.as_str())
        .sender_agent(identity.sender_agent.as_str());

    if let Some(request) = request {
        builder = builder
            .recipient_connector(request.issuer_connector.clone())
            .correlation_message(request.id.as_str());
        if let Some(contract) = &request.transfer_contract {
            builder = builder.transfer_contract(contract.clone());
        }
    }
    if let Some(contract) = &response.transfer_contract {
        builder = builder.transfer_contract(contract.clone());
    }
    if let Some(reason) = response.rejection_reason {
        builder = builder.rejection_reason(reason);
    }

    builder.build()
}
