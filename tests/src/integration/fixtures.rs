//! Shared fixtures: two connectors, their tokens, a provider's handlers and
//! a transport that hands request bodies straight to a dispatcher.

use async_trait::async_trait;
use ids_messaging::adapters::jwt::unsigned_jwt;
use ids_messaging::adapters::{JsonLdSchemaCodec, StaticTokenProvider, UnverifiedJwtDecoder};
use ids_messaging::dispatcher::{DispatcherBuilder, TokenAuthenticator};
use ids_messaging::ports::{OutboundRequest, TransportResponse};
use ids_messaging::validation::IssuerRule;
use ids_messaging::{
    HandlerError, IdentityContext, InboundRequest, MessageDispatcher, MessageHandler,
    MessagePipeline, MessageResponse, TokenClaimsValidator, Transport, TransportError,
};
use ids_types::MessageType;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

pub const PROVIDER_ID: &str = "https://provider.example/";
pub const CONSUMER_ID: &str = "https://consumer.example/";
pub const TRUST_SERVICE: &str = "https://daps.example/";
pub const KNOWN_ARTIFACT: &str = "https://provider.example/artifact/weather";

/// Payload of the provider's self-description.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelfDescription {
    pub title: String,
    pub artifacts: Vec<String>,
}

pub fn provider_identity() -> IdentityContext {
    IdentityContext::new(PROVIDER_ID, format!("{}agent", PROVIDER_ID))
}

pub fn consumer_identity() -> IdentityContext {
    IdentityContext::new(CONSUMER_ID, format!("{}agent", CONSUMER_ID))
}

/// Install a test-writer subscriber once. Honors `RUST_LOG`.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}

fn now() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}

/// Unsigned token for `subject`, expiring `ttl_secs` from now.
pub fn token(subject: &str, ttl_secs: i64) -> String {
    unsigned_jwt(&serde_json::json!({
        "iss": TRUST_SERVICE,
        "sub": subject,
        "aud": "idsc:IDS_CONNECTORS_ALL",
        "exp": now() + ttl_secs,
        "iat": now(),
    }))
}

// =============================================================================
// PROVIDER HANDLERS
// =============================================================================

/// Answers description requests with a JSON self-description.
pub struct DescriptionHandler;

#[async_trait]
impl MessageHandler for DescriptionHandler {
    async fn handle(&self, _: &InboundRequest) -> Result<MessageResponse, HandlerError> {
        let description = SelfDescription {
            title: "Weather data provider".to_string(),
            artifacts: vec![KNOWN_ARTIFACT.to_string()],
        };
        let payload =
            serde_json::to_vec(&description).map_err(|e| HandlerError::internal(e.to_string()))?;
        Ok(MessageResponse::new(MessageType::DescriptionResponse).with_payload(payload))
    }
}

/// Serves one known artifact, counting requests.
#[derive(Default)]
pub struct ArtifactHandler {
    pub served: AtomicUsize,
}

#[async_trait]
impl MessageHandler for ArtifactHandler {
    async fn handle(&self, request: &InboundRequest) -> Result<MessageResponse, HandlerError> {
        let requested = request
            .header()
            .requested_artifact
            .as_ref()
            .ok_or_else(|| HandlerError::bad_parameters("missing requestedArtifact"))?;
        if requested.as_str() != KNOWN_ARTIFACT {
            return Err(HandlerError::not_found(format!("unknown artifact {}", requested)));
        }
        self.served.fetch_add(1, Ordering::SeqCst);
        Ok(MessageResponse::new(MessageType::ArtifactResponse).with_payload("temperature=21.5"))
    }
}

/// Provider dispatcher with description, artifact and notification handlers.
pub fn provider_builder(artifacts: Arc<ArtifactHandler>) -> DispatcherBuilder {
    MessageDispatcher::builder(provider_identity(), Arc::new(JsonLdSchemaCodec::new()))
        .handler(MessageType::DescriptionRequest, DescriptionHandler)
        .and_then(|b| b.shared_handler(&[MessageType::ArtifactRequest], artifacts))
        .and_then(|b| b.handler(MessageType::ConnectorUnavailable, Acknowledge))
        .expect("fixture handlers are distinct")
}

/// Same as [`provider_builder`], gated by token authentication.
pub fn authenticated_provider(artifacts: Arc<ArtifactHandler>) -> MessageDispatcher {
    let validator = TokenClaimsValidator::for_identity(&provider_identity())
        .rule(IssuerRule::new(TRUST_SERVICE))
        .build();
    provider_builder(artifacts)
        .authenticator(TokenAuthenticator::new(
            Arc::new(UnverifiedJwtDecoder::new()),
            validator,
        ))
        .response_token_provider(Arc::new(StaticTokenProvider::jwt(token(PROVIDER_ID, 3600))))
        .build()
}

/// Acknowledges notifications.
pub struct Acknowledge;

#[async_trait]
impl MessageHandler for Acknowledge {
    async fn handle(&self, _: &InboundRequest) -> Result<MessageResponse, HandlerError> {
        Ok(MessageResponse::processed())
    }
}

// =============================================================================
// LOOPBACK TRANSPORT
// =============================================================================

/// Delivers request bodies to an in-process dispatcher.
pub struct LoopbackTransport {
    dispatcher: Arc<MessageDispatcher>,
    sent: AtomicUsize,
}

impl LoopbackTransport {
    pub fn new(dispatcher: Arc<MessageDispatcher>) -> Self {
        Self {
            dispatcher,
            sent: AtomicUsize::new(0),
        }
    }

    pub fn sent(&self) -> usize {
        self.sent.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Transport for LoopbackTransport {
    async fn send(&self, request: OutboundRequest) -> Result<TransportResponse, TransportError> {
        self.sent.fetch_add(1, Ordering::SeqCst);
        let response = self.dispatcher.dispatch(&request.body).await;
        Ok(TransportResponse {
            status: response.status,
            content_type: Some(response.content_type),
            body: response.body,
        })
    }
}

/// Consumer pipeline sending through `transport` with a token of `ttl_secs`.
pub fn consumer_pipeline(transport: Arc<dyn Transport>, ttl_secs: i64) -> MessagePipeline {
    MessagePipeline::new(
        consumer_identity(),
        Arc::new(JsonLdSchemaCodec::new()),
        transport,
        Arc::new(StaticTokenProvider::jwt(token(CONSUMER_ID, ttl_secs))),
    )
}
