//! # Message Dispatcher
//!
//! Processes one inbound body strictly in sequence:
//!
//! ```text
//! decode -> parse header -> authenticate -> route -> invoke -> encode
//! ```
//!
//! Every failure before or inside the handler becomes a rejection message,
//! so the caller always receives a well-formed envelope. The dispatcher is
//! immutable once built and may be shared across any number of tasks.

use crate::codec::MultipartCodec;
use crate::dispatcher::auth::TokenAuthenticator;
use crate::dispatcher::handler::{InboundRequest, MessageHandler, MessageResponse};
use crate::dispatcher::registry::{HandlerRegistry, RegistrationError};
use crate::dispatcher::response::{response_header, DispatchResponse, STATUS_OK};
use crate::domain::{IdentityContext, MultipartEnvelope};
use crate::ports::{SchemaCodec, TokenProvider};
use futures::FutureExt;
use ids_types::{MessageHeader, MessageType, RejectionReason};
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Routes inbound messages to their handlers.
pub struct MessageDispatcher {
    identity: IdentityContext,
    codec: MultipartCodec,
    schema: Arc<dyn SchemaCodec>,
    registry: HandlerRegistry,
    authenticator: Option<TokenAuthenticator>,
    token_provider: Option<Arc<dyn TokenProvider>>,
}

impl MessageDispatcher {
    /// Start assembling a dispatcher.
    pub fn builder(identity: IdentityContext, schema: Arc<dyn SchemaCodec>) -> DispatcherBuilder {
        DispatcherBuilder {
            identity,
            codec: MultipartCodec::new(),
            schema,
            registry: HandlerRegistry::new(),
            authenticator: None,
            token_provider: None,
        }
    }

    #[must_use]
    pub fn identity(&self) -> &IdentityContext {
        &self.identity
    }

    #[must_use]
    pub fn registry(&self) -> &HandlerRegistry {
        &self.registry
    }

    /// Handle one inbound multipart body.
    pub async fn dispatch(&self, body: &[u8]) -> DispatchResponse {
        let envelope = match self.codec.decode(body) {
            Ok(envelope) => envelope,
            Err(e) => {
                return self
                    .reject(None, RejectionReason::MalformedMessage, e.to_string())
                    .await;
            }
        };

        let (header_part, payload) = envelope.into_parts();
        let Some(header_part) = header_part else {
            return self
                .reject(None, RejectionReason::MalformedMessage, "missing header part")
                .await;
        };

        let header = match self.schema.parse_header(&header_part) {
            Ok(header) => header,
            Err(e) => {
                return self
                    .reject(None, RejectionReason::MalformedMessage, e.to_string())
                    .await;
            }
        };

        debug!(
            correlation_id = %header.id,
            message_type = %header.message_type,
            issuer = %header.issuer_connector,
            has_token = header.security_token.is_some(),
            "Inbound message decoded"
        );

        let claims = match &self.authenticator {
            Some(authenticator) => match authenticator.authenticate(&header).await {
                Ok(claims) => Some(claims),
                Err(e) => {
                    let reason = e.rejection_reason();
                    return self.reject(Some(&header), reason, e.to_string()).await;
                }
            },
            None => None,
        };

        let Some(handler) = self.registry.get(&header.message_type) else {
            let message = format!("no handler for {}", header.message_type);
            return self
                .reject(Some(&header), RejectionReason::MessageTypeNotSupported, message)
                .await;
        };

        let request = InboundRequest::new(header, payload, claims);
        let response = invoke(handler.as_ref(), &request).await;
        self.respond(Some(request.header()), response).await
    }

    async fn reject(
        &self,
        request: Option<&MessageHeader>,
        reason: RejectionReason,
        message: impl Into<String>,
    ) -> DispatchResponse {
        let message = message.into();
        warn!(
            correlation_id = request.map(|h| h.id.as_str()),
            reason = %reason,
            %message,
            "Rejecting inbound message"
        );
        self.respond(request, MessageResponse::rejection_with_message(reason, message))
            .await
    }

    async fn respond(
        &self,
        request: Option<&MessageHeader>,
        response: MessageResponse,
    ) -> DispatchResponse {
        let mut header = match response_header(&self.identity, request, &response) {
            Ok(header) => header,
            Err(e) => {
                error!(error = %e, "Cannot build response header");
                return DispatchResponse::fallback(e.to_string());
            }
        };

        if let Some(provider) = &self.token_provider {
            match provider.current_token().await {
                Ok(token) => header.security_token = Some(token),
                // The answer is still sent; the peer decides whether an unsigned response is acceptable.
                Err(e) => warn!(error = %e, "Sending response without security token"),
            }
        }

        let header_bytes = match self.schema.serialize_header(&header) {
            Ok(bytes) => bytes,
            Err(e) => {
                error!(error = %e, "Cannot serialize response header");
                return DispatchResponse::fallback(e.to_string());
            }
        };

        let envelope = MultipartEnvelope::new(header_bytes).with_optional_payload(response.payload);
        match self.codec.encode(&envelope) {
            Ok(encoded) => DispatchResponse {
                status: STATUS_OK,
                content_type: encoded.content_type(),
                body: encoded.body,
                message_type: Some(header.message_type.clone()),
            },
            Err(e) => {
                error!(error = %e, "Cannot encode response envelope");
                DispatchResponse::fallback(e.to_string())
            }
        }
    }
}

/// Run the handler, converting typed errors and panics into rejections.
async fn invoke(handler: &dyn MessageHandler, request: &InboundRequest) -> MessageResponse {
    let correlation_id = request.header().id.as_str();
    match AssertUnwindSafe(handler.handle(request)).catch_unwind().await {
        Ok(Ok(response)) => {
            debug!(
                correlation_id,
                response_type = %response.message_type,
                "Handler completed"
            );
            response
        }
        Ok(Err(e)) => {
            warn!(correlation_id, reason = %e.reason, message = %e.message, "Handler rejected message");
            MessageResponse::rejection_with_message(e.reason, e.message)
        }
        Err(_) => {
            error!(correlation_id, message_type = %request.message_type(), "Handler panicked");
            MessageResponse::rejection_with_message(
                RejectionReason::InternalRecipientError,
                "message handler failed",
            )
        }
    }
}

impl std::fmt::Debug for MessageDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MessageDispatcher")
            .field("identity", &self.identity)
            .field("registry", &self.registry)
            .field("authenticated", &self.authenticator.is_some())
            .finish_non_exhaustive()
    }
}

/// Assembles a [`MessageDispatcher`]. Registration happens here only.
pub struct DispatcherBuilder {
    identity: IdentityContext,
    codec: MultipartCodec,
    schema: Arc<dyn SchemaCodec>,
    registry: HandlerRegistry,
    authenticator: Option<TokenAuthenticator>,
    token_provider: Option<Arc<dyn TokenProvider>>,
}

impl DispatcherBuilder {
    /// Register a handler for one message type.
    ///
    /// # Errors
    ///
    /// * `RegistrationError::DuplicateHandler` - the type already has a handler
    pub fn handler(
        mut self,
        message_type: MessageType,
        handler: impl MessageHandler + 'static,
    ) -> Result<Self, RegistrationError> {
        self.registry.register(message_type, Arc::new(handler))?;
        Ok(self)
    }

    /// Register one shared handler for several message types.
    pub fn shared_handler(
        mut self,
        message_types: &[MessageType],
        handler: Arc<dyn MessageHandler>,
    ) -> Result<Self, RegistrationError> {
        for message_type in message_types {
            self.registry.register(message_type.clone(), Arc::clone(&handler))?;
        }
        Ok(self)
    }

    /// Gate every message behind token authentication.
    #[must_use]
    pub fn authenticator(mut self, authenticator: TokenAuthenticator) -> Self {
        self.authenticator = Some(authenticator);
        self
    }

    /// Attach this node's token to every response.
    #[must_use]
    pub fn response_token_provider(mut self, provider: Arc<dyn TokenProvider>) -> Self {
        self.token_provider = Some(provider);
        self
    }

    #[must_use]
    pub fn codec(mut self, codec: MultipartCodec) -> Self {
        self.codec = codec;
        self
    }

    pub fn build(self) -> MessageDispatcher {
        if let Some(authenticator) = &self.authenticator {
            let audience = authenticator.validator().expected_audience();
            if audience != self.identity.expected_audience {
                warn!(
                    validator_audience = audience,
                    identity_audience = %self.identity.expected_audience,
                    "Token validator expects a different audience than this connector's identity"
                );
            }
        }
        info!(
            connector_id = %self.identity.connector_id,
            handlers = self.registry.len(),
            authenticated = self.authenticator.is_some(),
            "Message dispatcher ready"
        );
        MessageDispatcher {
            identity: self.identity,
            codec: self.codec,
            schema: self.schema,
            registry: self.registry,
            authenticator: self.authenticator,
            token_provider: self.token_provider,
        }
    }
}
