//! # Inbound HTTP Endpoint
//!
//! Mounts a [`MessageDispatcher`] on an axum router. The router only moves
//! bytes; every protocol decision is the dispatcher's.

use crate::config::InboundConfig;
use crate::dispatcher::MessageDispatcher;
use axum::body::Bytes;
use axum::extract::{DefaultBodyLimit, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::Router;
use std::sync::Arc;
use tracing::warn;

/// Build the router serving `POST <path>`.
pub fn router(dispatcher: Arc<MessageDispatcher>, config: &InboundConfig) -> Router {
    Router::new()
        .route(&config.path, post(handle_message))
        .layer(DefaultBodyLimit::max(config.max_message_size))
        .with_state(dispatcher)
}

async fn handle_message(
    State(dispatcher): State<Arc<MessageDispatcher>>,
    body: Bytes,
) -> Response {
    let response = dispatcher.dispatch(&body).await;
    let status = StatusCode::from_u16(response.status).unwrap_or_else(|_| {
        warn!(status = response.status, "Dispatcher produced invalid status");
        StatusCode::INTERNAL_SERVER_ERROR
    });
    (
        status,
        [(header::CONTENT_TYPE, response.content_type)],
        response.body,
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::json_ld::JsonLdSchemaCodec;
    use crate::codec::MultipartCodec;
    use crate::dispatcher::{HandlerError, InboundRequest, MessageHandler, MessageResponse};
    use crate::domain::{IdentityContext, MultipartEnvelope};
    use async_trait::async_trait;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use ids_types::{MessageHeader, MessageType};
    use tower::ServiceExt;

    struct Describe;

    #[async_trait]
    impl MessageHandler for Describe {
        async fn handle(&self, _: &InboundRequest) -> Result<MessageResponse, HandlerError> {
            Ok(MessageResponse::new(MessageType::DescriptionResponse).with_payload("{}"))
        }
    }

    fn app(config: &InboundConfig) -> Router {
        let dispatcher = MessageDispatcher::builder(
            IdentityContext::new("https://me.example/", "https://me.example/agent"),
            Arc::new(JsonLdSchemaCodec::new()),
        )
        .handler(MessageType::DescriptionRequest, Describe)
        .unwrap()
        .build();
        router(Arc::new(dispatcher), config)
    }

    fn body() -> Vec<u8> {
        let header = MessageHeader::builder(MessageType::DescriptionRequest)
            .issuer_connector("https://peer.example/")
            .sender_agent("https://peer.example/agent")
            .build()
            .unwrap();
        let envelope = MultipartEnvelope::new(serde_json::to_vec(&header).unwrap());
        MultipartCodec::new().encode(&envelope).unwrap().body.to_vec()
    }

    #[tokio::test]
    async fn test_post_returns_multipart_response() {
        let response = app(&InboundConfig::default())
            .oneshot(
                Request::post("/")
                    .header("content-type", "multipart/form-data")
                    .body(Body::from(body()))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let content_type = response.headers()[header::CONTENT_TYPE]
            .to_str()
            .unwrap()
            .to_string();
        assert!(content_type.starts_with("multipart/form-data; boundary="));

        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let envelope = MultipartCodec::new().decode(&bytes).unwrap();
        assert_eq!(envelope.payload().map(|p| p.as_ref()), Some(&b"{}"[..]));
    }

    #[tokio::test]
    async fn test_garbage_body_gets_rejection_not_http_error() {
        let response = app(&InboundConfig::default())
            .oneshot(Request::post("/").body(Body::from("garbage")).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_body_limit_enforced() {
        let config = InboundConfig {
            max_message_size: 16,
            path: "/data".to_string(),
        };
        let response = app(&config)
            .oneshot(Request::post("/data").body(Body::from(body())).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    }

    #[tokio::test]
    async fn test_get_not_allowed() {
        let response = app(&InboundConfig::default())
            .oneshot(Request::get("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    }
}
