//! # Message Type Discriminator
//!
//! The `@type` of a message header. Dispatch is keyed on this value.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Message kinds built and routed by this stack, plus a catch-all for the
/// rest of the information model.
///
/// A header with an `@type` outside the known set still parses; it lands in
/// [`MessageType::Other`] so the dispatcher can answer it as unsupported
/// instead of malformed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum MessageType {
    /// Request for a self-description or a catalog element.
    DescriptionRequest,
    /// Response carrying a self-description.
    DescriptionResponse,
    /// Request for an artifact under a transfer contract.
    ArtifactRequest,
    /// Response carrying artifact data.
    ArtifactResponse,
    /// Contract offer or request.
    ContractRequest,
    /// Counter-offer to a contract request.
    ContractResponse,
    /// Final agreement on a contract.
    ContractAgreement,
    /// Refusal of a contract request.
    ContractRejection,
    /// Query against a broker or knowledge graph.
    Query,
    /// Result of a query.
    Result,
    /// A connector announces a changed self-description.
    ConnectorUpdate,
    /// A connector announces that it is going offline.
    ConnectorUnavailable,
    /// Acknowledgement without content.
    MessageProcessedNotification,
    /// Protocol-level negative response.
    Rejection,
    /// Any other `@type`, kept verbatim (e.g. `ids:ResourceUpdateMessage`).
    Other(String),
}

impl MessageType {
    /// All known message types in declaration order.
    pub const ALL: [MessageType; 14] = [
        MessageType::DescriptionRequest,
        MessageType::DescriptionResponse,
        MessageType::ArtifactRequest,
        MessageType::ArtifactResponse,
        MessageType::ContractRequest,
        MessageType::ContractResponse,
        MessageType::ContractAgreement,
        MessageType::ContractRejection,
        MessageType::Query,
        MessageType::Result,
        MessageType::ConnectorUpdate,
        MessageType::ConnectorUnavailable,
        MessageType::MessageProcessedNotification,
        MessageType::Rejection,
    ];

    /// The compact JSON-LD type name, e.g. `ids:QueryMessage`.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            MessageType::DescriptionRequest => "ids:DescriptionRequestMessage",
            MessageType::DescriptionResponse => "ids:DescriptionResponseMessage",
            MessageType::ArtifactRequest => "ids:ArtifactRequestMessage",
            MessageType::ArtifactResponse => "ids:ArtifactResponseMessage",
            MessageType::ContractRequest => "ids:ContractRequestMessage",
            MessageType::ContractResponse => "ids:ContractResponseMessage",
            MessageType::ContractAgreement => "ids:ContractAgreementMessage",
            MessageType::ContractRejection => "ids:ContractRejectionMessage",
            MessageType::Query => "ids:QueryMessage",
            MessageType::Result => "ids:ResultMessage",
            MessageType::ConnectorUpdate => "ids:ConnectorUpdateMessage",
            MessageType::ConnectorUnavailable => "ids:ConnectorUnavailableMessage",
            MessageType::MessageProcessedNotification => {
                "ids:MessageProcessedNotificationMessage"
            }
            MessageType::Rejection => "ids:RejectionMessage",
            MessageType::Other(name) => name,
        }
    }

    /// Look up a known message type by its compact type name.
    #[must_use]
    pub fn from_type_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|ty| ty.as_str() == name)
    }

    /// Known type for `name`, or [`MessageType::Other`].
    #[must_use]
    pub fn from_type_name_or_other(name: impl Into<String>) -> Self {
        let name = name.into();
        Self::from_type_name(&name).unwrap_or(MessageType::Other(name))
    }

    /// Whether this type is outside the known set.
    #[must_use]
    pub fn is_other(&self) -> bool {
        matches!(self, MessageType::Other(_))
    }

    /// Lower-case path segment used in generated `@id` values.
    #[must_use]
    pub fn id_segment(&self) -> String {
        let name = self.as_str().trim_start_matches("ids:");
        let mut segment = String::with_capacity(name.len());
        for (i, ch) in name.chars().enumerate() {
            if ch.is_ascii_uppercase() && i > 0 {
                segment.push('-');
            }
            segment.push(ch.to_ascii_lowercase());
        }
        segment
    }

    /// Whether this is a protocol-level rejection.
    ///
    /// Contract rejections are rejections too: both carry a rejection reason.
    #[must_use]
    pub fn is_rejection(&self) -> bool {
        matches!(self, MessageType::Rejection | MessageType::ContractRejection)
    }

    /// Whether this is a notification that expects only an acknowledgement.
    #[must_use]
    pub fn is_notification(&self) -> bool {
        matches!(
            self,
            MessageType::ConnectorUpdate
                | MessageType::ConnectorUnavailable
                | MessageType::MessageProcessedNotification
        )
    }
}

impl fmt::Display for MessageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for MessageType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for MessageType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        if name.is_empty() {
            return Err(serde::de::Error::custom("empty message type"));
        }
        Ok(Self::from_type_name_or_other(name))
    }
}
