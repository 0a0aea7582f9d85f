//! # Rejection Reasons
//!
//! Machine-readable reason codes carried by rejection messages. On the wire a
//! reason is a reference into the IDS code vocabulary, e.g.
//! `{"@id": "https://w3id.org/idsa/code/MALFORMED_MESSAGE"}`.

use crate::errors::HeaderError;
use crate::reference::IdRef;
use crate::CODE_NAMESPACE;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Reason attached to a rejection message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "IdRef", try_from = "IdRef")]
pub enum RejectionReason {
    /// Request parameters were invalid.
    BadParameters,
    /// The recipient failed while processing the message.
    InternalRecipientError,
    /// The message could not be parsed.
    MalformedMessage,
    /// No handler accepts this message type.
    MessageTypeNotSupported,
    /// The requested method is not supported.
    MethodNotSupported,
    /// The sender could not be authenticated.
    NotAuthenticated,
    /// The sender is not allowed to perform this request.
    NotAuthorized,
    /// The requested element does not exist.
    NotFound,
    /// The recipient is temporarily unable to answer.
    TemporarilyNotAvailable,
    /// The result set exceeds the allowed size.
    TooManyResults,
    /// The message model version is not supported.
    VersionNotSupported,
}

impl RejectionReason {
    /// All reasons in declaration order.
    pub const ALL: [RejectionReason; 11] = [
        RejectionReason::BadParameters,
        RejectionReason::InternalRecipientError,
        RejectionReason::MalformedMessage,
        RejectionReason::MessageTypeNotSupported,
        RejectionReason::MethodNotSupported,
        RejectionReason::NotAuthenticated,
        RejectionReason::NotAuthorized,
        RejectionReason::NotFound,
        RejectionReason::TemporarilyNotAvailable,
        RejectionReason::TooManyResults,
        RejectionReason::VersionNotSupported,
    ];

    /// The bare code, e.g. `MALFORMED_MESSAGE`.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            RejectionReason::BadParameters => "BAD_PARAMETERS",
            RejectionReason::InternalRecipientError => "INTERNAL_RECIPIENT_ERROR",
            RejectionReason::MalformedMessage => "MALFORMED_MESSAGE",
            RejectionReason::MessageTypeNotSupported => "MESSAGE_TYPE_NOT_SUPPORTED",
            RejectionReason::MethodNotSupported => "METHOD_NOT_SUPPORTED",
            RejectionReason::NotAuthenticated => "NOT_AUTHENTICATED",
            RejectionReason::NotAuthorized => "NOT_AUTHORIZED",
            RejectionReason::NotFound => "NOT_FOUND",
            RejectionReason::TemporarilyNotAvailable => "TEMPORARILY_NOT_AVAILABLE",
            RejectionReason::TooManyResults => "TOO_MANY_RESULTS",
            RejectionReason::VersionNotSupported => "VERSION_NOT_SUPPORTED",
        }
    }

    /// The full vocabulary URI of this reason.
    #[must_use]
    pub fn uri(&self) -> String {
        format!("{}{}", CODE_NAMESPACE, self.code())
    }

    /// Parse a reason from its full URI, its `idsc:` compact form or its bare code.
    pub fn from_uri(uri: &str) -> Result<Self, HeaderError> {
        let code = uri
            .strip_prefix(CODE_NAMESPACE)
            .or_else(|| uri.strip_prefix("idsc:"))
            .unwrap_or(uri);

        Self::ALL
            .into_iter()
            .find(|reason| reason.code() == code)
            .ok_or_else(|| HeaderError::UnknownRejectionReason(uri.to_string()))
    }
}

impl From<RejectionReason> for IdRef {
    fn from(reason: RejectionReason) -> Self {
        IdRef::new(reason.uri())
    }
}

impl TryFrom<IdRef> for RejectionReason {
    type Error = HeaderError;

    fn try_from(reference: IdRef) -> Result<Self, Self::Error> {
        RejectionReason::from_uri(reference.as_str())
    }
}

impl fmt::Display for RejectionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}
