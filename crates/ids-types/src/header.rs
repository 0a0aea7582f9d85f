//! # Message Header
//!
//! The JSON-LD metadata object carried in the `header` part of every message.
//!
//! ## Lifecycle
//!
//! Headers are assembled once with [`HeaderBuilder`] (outbound) or decoded
//! once from the wire (inbound) and are not modified afterwards, with the
//! single exception of attaching the security token right before sending.

use crate::errors::HeaderError;
use crate::message_type::MessageType;
use crate::reference::IdRef;
use crate::rejection::RejectionReason;
use crate::token::DynamicAttributeToken;
use crate::AUTOGEN_PREFIX;
use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Information model version stamped on generated headers.
pub const DEFAULT_MODEL_VERSION: &str = "4.2.7";

fn default_context() -> serde_json::Value {
    serde_json::json!({
        "ids": "https://w3id.org/idsa/core/",
        "idsc": "https://w3id.org/idsa/code/"
    })
}

/// Structured message metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageHeader {
    /// JSON-LD context.
    #[serde(rename = "@context", default = "default_context")]
    pub context: serde_json::Value,

    /// Type discriminator used for dispatch.
    #[serde(rename = "@type")]
    pub message_type: MessageType,

    /// Unique identifier of this message.
    #[serde(rename = "@id")]
    pub id: String,

    /// Information model version the sender speaks.
    #[serde(rename = "ids:modelVersion")]
    pub model_version: String,

    /// Creation time.
    #[serde(rename = "ids:issued")]
    pub issued: DateTime<Utc>,

    /// Connector that issued the message.
    #[serde(rename = "ids:issuerConnector")]
    pub issuer_connector: IdRef,

    /// Agent on whose behalf the message was sent.
    #[serde(rename = "ids:senderAgent")]
    pub sender_agent: IdRef,

    /// Intended recipient connectors.
    #[serde(
        rename = "ids:recipientConnector",
        default,
        skip_serializing_if = "Vec::is_empty"
    )]
    pub recipient_connector: Vec<IdRef>,

    /// Message this one answers.
    #[serde(
        rename = "ids:correlationMessage",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub correlation_message: Option<IdRef>,

    /// Contract governing the exchange.
    #[serde(
        rename = "ids:transferContract",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub transfer_contract: Option<IdRef>,

    /// Token issued by the trust service.
    #[serde(
        rename = "ids:securityToken",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub security_token: Option<DynamicAttributeToken>,

    /// Reason code, present on rejections.
    #[serde(
        rename = "ids:rejectionReason",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub rejection_reason: Option<RejectionReason>,

    /// Element requested by a description request.
    #[serde(
        rename = "ids:requestedElement",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub requested_element: Option<IdRef>,

    /// Artifact requested by an artifact request.
    #[serde(
        rename = "ids:requestedArtifact",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub requested_artifact: Option<IdRef>,
}

impl MessageHeader {
    /// Start building a header of the given type.
    pub fn builder(message_type: MessageType) -> HeaderBuilder {
        HeaderBuilder::new(message_type)
    }

    /// Return this header with the security token replaced.
    #[must_use]
    pub fn with_security_token(mut self, token: DynamicAttributeToken) -> Self {
        self.security_token = Some(token);
        self
    }

    /// Whether the header is a rejection of any kind.
    #[must_use]
    pub fn is_rejection(&self) -> bool {
        self.message_type.is_rejection()
    }

    /// Whether this header answers the message with the given `@id`.
    #[must_use]
    pub fn correlates_with(&self, request_id: &str) -> bool {
        self.correlation_message
            .as_ref()
            .is_some_and(|c| c.as_str() == request_id)
    }
}

/// Incremental constructor for [`MessageHeader`].
#[derive(Debug, Clone)]
pub struct HeaderBuilder {
    message_type: MessageType,
    id: Option<String>,
    model_version: String,
    issued: Option<DateTime<Utc>>,
    issuer_connector: Option<IdRef>,
    sender_agent: Option<IdRef>,
    recipient_connector: Vec<IdRef>,
    correlation_message: Option<IdRef>,
    transfer_contract: Option<IdRef>,
    security_token: Option<DynamicAttributeToken>,
    rejection_reason: Option<RejectionReason>,
    requested_element: Option<IdRef>,
    requested_artifact: Option<IdRef>,
}

impl HeaderBuilder {
    /// Create a builder for the given message type.
    pub fn new(message_type: MessageType) -> Self {
        Self {
            message_type,
            id: None,
            model_version: DEFAULT_MODEL_VERSION.to_string(),
            issued: None,
            issuer_connector: None,
            sender_agent: None,
            recipient_connector: Vec::new(),
            correlation_message: None,
            transfer_contract: None,
            security_token: None,
            rejection_reason: None,
            requested_element: None,
            requested_artifact: None,
        }
    }

    /// Use a fixed `@id` instead of a generated one.
    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn model_version(mut self, version: impl Into<String>) -> Self {
        self.model_version = version.into();
        self
    }

    pub fn issued(mut self, issued: DateTime<Utc>) -> Self {
        self.issued = Some(issued);
        self
    }

    pub fn issuer_connector(mut self, issuer: impl Into<IdRef>) -> Self {
        self.issuer_connector = Some(issuer.into());
        self
    }

    pub fn sender_agent(mut self, agent: impl Into<IdRef>) -> Self {
        self.sender_agent = Some(agent.into());
        self
    }

    /// Add a recipient connector. May be called repeatedly.
    pub fn recipient_connector(mut self, recipient: impl Into<IdRef>) -> Self {
        self.recipient_connector.push(recipient.into());
        self
    }

    pub fn correlation_message(mut self, message_id: impl Into<IdRef>) -> Self {
        self.correlation_message = Some(message_id.into());
        self
    }

    pub fn transfer_contract(mut self, contract: impl Into<IdRef>) -> Self {
        self.transfer_contract = Some(contract.into());
        self
    }

    pub fn security_token(mut self, token: DynamicAttributeToken) -> Self {
        self.security_token = Some(token);
        self
    }

    pub fn rejection_reason(mut self, reason: RejectionReason) -> Self {
        self.rejection_reason = Some(reason);
        self
    }

    pub fn requested_element(mut self, element: impl Into<IdRef>) -> Self {
        self.requested_element = Some(element.into());
        self
    }

    pub fn requested_artifact(mut self, artifact: impl Into<IdRef>) -> Self {
        self.requested_artifact = Some(artifact.into());
        self
    }

    /// Assemble the header.
    ///
    /// # Errors
    ///
    /// * `HeaderError::MissingIssuer` - no issuer connector was set
    /// * `HeaderError::MissingSenderAgent` - no sender agent was set
    pub fn build(self) -> Result<MessageHeader, HeaderError> {
        let issuer_connector = self.issuer_connector.ok_or(HeaderError::MissingIssuer)?;
        let sender_agent = self.sender_agent.ok_or(HeaderError::MissingSenderAgent)?;
        let id = self.id.unwrap_or_else(|| {
            format!(
                "{}/{}/{}",
                AUTOGEN_PREFIX,
                self.message_type.id_segment(),
                Uuid::new_v4()
            )
        });

        Ok(MessageHeader {
            context: default_context(),
            message_type: self.message_type,
            id,
            model_version: self.model_version,
            // Millisecond precision keeps the timestamp stable across a JSON round trip.
            issued: self.issued.unwrap_or_else(|| Utc::now().trunc_subsecs(3)),
            issuer_connector,
            sender_agent,
            recipient_connector: self.recipient_connector,
            correlation_message: self.correlation_message,
            transfer_contract: self.transfer_contract,
            security_token: self.security_token,
            rejection_reason: self.rejection_reason,
            requested_element: self.requested_element,
            requested_artifact: self.requested_artifact,
        })
    }
}
