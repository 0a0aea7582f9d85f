//! # Request Templates
//!
//! A template produces the outbound header and optional payload from this
//! node's identity. Any `Fn(&IdentityContext) -> Result<OutboundMessage, _>`
//! closure is a template; the functions below cover the common requests.

use crate::domain::{IdentityContext, OutboundMessage};
use bytes::Bytes;
use ids_types::{HeaderBuilder, HeaderError, IdRef, MessageHeader, MessageType};

/// Producer of an outbound message.
pub trait RequestTemplate: Send + Sync {
    /// Build header and payload. The security token is attached later.
    fn build(&self, identity: &IdentityContext) -> Result<OutboundMessage, HeaderError>;
}

impl<F> RequestTemplate for F
where
    F: Fn(&IdentityContext) -> Result<OutboundMessage, HeaderError> + Send + Sync,
{
    fn build(&self, identity: &IdentityContext) -> Result<OutboundMessage, HeaderError> {
        self(identity)
    }
}

/// Header builder pre-filled with this node's identity and one recipient.
pub fn header_for(
    identity: &IdentityContext,
    message_type: MessageType,
    recipient: &IdRef,
) -> HeaderBuilder {
    MessageHeader::builder(message_type)
        .model_version(identity.model_version.as_str())
        .issuer_connector(identity.connector_id.as_str())
        .sender_agent(identity.sender_agent.as_str())
        .recipient_connector(recipient.clone())
}

/// Ask for the self-description of `recipient`, or one of its elements.
pub fn description_request(
    recipient: impl Into<IdRef>,
    requested_element: Option<IdRef>,
) -> impl RequestTemplate {
    let recipient = recipient.into();
    move |identity: &IdentityContext| -> Result<OutboundMessage, HeaderError> {
        let mut header = header_for(identity, MessageType::DescriptionRequest, &recipient);
        if let Some(element) = &requested_element {
            header = header.requested_element(element.clone());
        }
        Ok(OutboundMessage::new(header.build()?))
    }
}

/// Ask for an artifact under an agreed contract.
pub fn artifact_request(
    recipient: impl Into<IdRef>,
    artifact: impl Into<IdRef>,
    transfer_contract: Option<IdRef>,
) -> impl RequestTemplate {
    let recipient = recipient.into();
    let artifact = artifact.into();
    move |identity: &IdentityContext| -> Result<OutboundMessage, HeaderError> {
        let mut header = header_for(identity, MessageType::ArtifactRequest, &recipient)
            .requested_artifact(artifact.clone());
        if let Some(contract) = &transfer_contract {
            header = header.transfer_contract(contract.clone());
        }
        Ok(OutboundMessage::new(header.build()?))
    }
}

/// Offer a contract; `offer` is the serialized contract request.
pub fn contract_request(recipient: impl Into<IdRef>, offer: impl Into<Bytes>) -> impl RequestTemplate {
    let recipient = recipient.into();
    let offer = offer.into();
    move |identity: &IdentityContext| -> Result<OutboundMessage, HeaderError> {
        let header = header_for(identity, MessageType::ContractRequest, &recipient).build()?;
        Ok(OutboundMessage::new(header).with_payload(offer.clone()))
    }
}

/// Send a query string to a broker.
pub fn query(recipient: impl Into<IdRef>, query: impl Into<String>) -> impl RequestTemplate {
    let recipient = recipient.into();
    let query = Bytes::from(query.into());
    move |identity: &IdentityContext| -> Result<OutboundMessage, HeaderError> {
        let header = header_for(identity, MessageType::Query, &recipient).build()?;
        Ok(OutboundMessage::new(header).with_payload(query.clone()))
    }
}

/// Announce an updated self-description.
pub fn connector_update(
    recipient: impl Into<IdRef>,
    self_description: impl Into<Bytes>,
) -> impl RequestTemplate {
    let recipient = recipient.into();
    let self_description = self_description.into();
    move |identity: &IdentityContext| -> Result<OutboundMessage, HeaderError> {
        let header = header_for(identity, MessageType::ConnectorUpdate, &recipient).build()?;
        Ok(OutboundMessage::new(header).with_payload(self_description.clone()))
    }
}

/// Announce that this connector goes offline.
pub fn connector_unavailable(recipient: impl Into<IdRef>) -> impl RequestTemplate {
    let recipient = recipient.into();
    move |identity: &IdentityContext| -> Result<OutboundMessage, HeaderError> {
        let header = header_for(identity, MessageType::ConnectorUnavailable, &recipient).build()?;
        Ok(OutboundMessage::new(header))
    }
}
