//! # Message Containers
//!
//! [`OutboundMessage`] is what a request template produces;
//! [`MessageContainer`] is what a successful request execution returns.

use bytes::Bytes;
use ids_types::{MessageHeader, RejectionReason};

/// Header plus optional payload, ready to be sent.
#[derive(Debug, Clone, PartialEq)]
pub struct OutboundMessage {
    /// Header without security token; the pipeline attaches it.
    pub header: MessageHeader,
    /// Optional payload bytes.
    pub payload: Option<Bytes>,
}

impl OutboundMessage {
    pub fn new(header: MessageHeader) -> Self {
        Self {
            header,
            payload: None,
        }
    }

    #[must_use]
    pub fn with_payload(mut self, payload: impl Into<Bytes>) -> Self {
        self.payload = Some(payload.into());
        self
    }
}

/// Decoded response: header plus raw or typed payload.
///
/// Created once per successful execution and never modified afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct MessageContainer<P = Bytes> {
    header: MessageHeader,
    payload: Option<P>,
}

impl<P> MessageContainer<P> {
    pub(crate) fn new(header: MessageHeader, payload: Option<P>) -> Self {
        Self { header, payload }
    }

    /// Response header.
    #[must_use]
    pub fn header(&self) -> &MessageHeader {
        &self.header
    }

    /// Response payload.
    #[must_use]
    pub fn payload(&self) -> Option<&P> {
        self.payload.as_ref()
    }

    /// Whether the response is a rejection.
    #[must_use]
    pub fn is_rejection(&self) -> bool {
        self.header.is_rejection()
    }

    /// Rejection reason, if the response is a rejection carrying one.
    #[must_use]
    pub fn rejection_reason(&self) -> Option<RejectionReason> {
        self.header.rejection_reason
    }

    /// Split into header and payload.
    #[must_use]
    pub fn into_parts(self) -> (MessageHeader, Option<P>) {
        (self.header, self.payload)
    }
}

impl MessageContainer<Bytes> {
    /// Payload interpreted as UTF-8 text, if present and valid.
    #[must_use]
    pub fn payload_text(&self) -> Option<&str> {
        self.payload
            .as_ref()
            .and_then(|p| std::str::from_utf8(p).ok())
    }
}
