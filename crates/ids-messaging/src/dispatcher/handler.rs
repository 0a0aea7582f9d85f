//! # Message Handlers
//!
//! The single capability a handler exposes, the request view it receives and
//! the response description it returns. Handlers never build response
//! headers themselves; the dispatcher does that from [`MessageResponse`].

use crate::domain::Claims;
use async_trait::async_trait;
use bytes::Bytes;
use ids_types::{IdRef, MessageHeader, MessageType, RejectionReason};
use thiserror::Error;

/// A decoded, authenticated inbound message.
#[derive(Debug, Clone)]
pub struct InboundRequest {
    header: MessageHeader,
    payload: Option<Bytes>,
    claims: Option<Claims>,
}

impl InboundRequest {
    pub(crate) fn new(header: MessageHeader, payload: Option<Bytes>, claims: Option<Claims>) -> Self {
        Self {
            header,
            payload,
            claims,
        }
    }

    #[must_use]
    pub fn header(&self) -> &MessageHeader {
        &self.header
    }

    #[must_use]
    pub fn message_type(&self) -> &MessageType {
        &self.header.message_type
    }

    #[must_use]
    pub fn payload(&self) -> Option<&Bytes> {
        self.payload.as_ref()
    }

    /// Payload as UTF-8, if present and valid.
    #[must_use]
    pub fn payload_text(&self) -> Option<&str> {
        self.payload
            .as_ref()
            .and_then(|p| std::str::from_utf8(p).ok())
    }

    /// Claims of the sender's token. `None` when no authenticator is configured.
    #[must_use]
    pub fn claims(&self) -> Option<&Claims> {
        self.claims.as_ref()
    }
}

/// What the handler wants sent back.
#[derive(Debug, Clone, PartialEq)]
pub struct MessageResponse {
    pub message_type: MessageType,
    pub payload: Option<Bytes>,
    pub rejection_reason: Option<RejectionReason>,
    pub transfer_contract: Option<IdRef>,
}

impl MessageResponse {
    /// Response of the given type without payload.
    pub fn new(message_type: MessageType) -> Self {
        Self {
            message_type,
            payload: None,
            rejection_reason: None,
            transfer_contract: None,
        }
    }

    #[must_use]
    pub fn with_payload(mut self, payload: impl Into<Bytes>) -> Self {
        self.payload = Some(payload.into());
        self
    }

    #[must_use]
    pub fn with_transfer_contract(mut self, contract: impl Into<IdRef>) -> Self {
        self.transfer_contract = Some(contract.into());
        self
    }

    /// A `RejectionMessage` with the given reason.
    pub fn rejection(reason: RejectionReason) -> Self {
        Self {
            rejection_reason: Some(reason),
            ..Self::new(MessageType::Rejection)
        }
    }

    /// A `RejectionMessage` whose payload explains the reason.
    pub fn rejection_with_message(reason: RejectionReason, message: impl Into<String>) -> Self {
        Self::rejection(reason).with_payload(message.into())
    }

    /// A bare `MessageProcessedNotificationMessage`.
    pub fn processed() -> Self {
        Self::new(MessageType::MessageProcessedNotification)
    }

    #[must_use]
    pub fn is_rejection(&self) -> bool {
        self.message_type.is_rejection()
    }
}

/// A handler declined or failed to process a message.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{reason}: {message}")]
pub struct HandlerError {
    /// Reason reported to the sender.
    pub reason: RejectionReason,
    /// Explanation sent as rejection payload.
    pub message: String,
}

impl HandlerError {
    pub fn new(reason: RejectionReason, message: impl Into<String>) -> Self {
        Self {
            reason,
            message: message.into(),
        }
    }

    pub fn bad_parameters(message: impl Into<String>) -> Self {
        Self::new(RejectionReason::BadParameters, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(RejectionReason::NotFound, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(RejectionReason::InternalRecipientError, message)
    }
}

/// Processes messages of the types it is registered for.
///
/// Handlers run concurrently for independent requests and must not rely on
/// any ordering between them.
#[async_trait]
pub trait MessageHandler: Send + Sync {
    /// Handle one message.
    async fn handle(&self, request: &InboundRequest) -> Result<MessageResponse, HandlerError>;
}
