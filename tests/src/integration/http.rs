//! # HTTP Flows
//!
//! The provider's dispatcher served by the axum endpoint on an ephemeral
//! port, the consumer sending through the reqwest transport.

#[cfg(test)]
mod tests {
    use crate::integration::fixtures::*;
    use ids_messaging::adapters::http_server::router;
    use ids_messaging::adapters::HttpTransport;
    use ids_messaging::config::{InboundConfig, OutboundConfig};
    use ids_messaging::pipeline::template::description_request;
    use ids_messaging::{RequestError, TransportError};
    use ids_types::{MessageType, RejectionReason};
    use std::sync::Arc;
    use tokio::net::TcpListener;

    /// Serve the authenticated provider; returns its base URL.
    async fn spawn_provider(config: InboundConfig) -> String {
        let dispatcher = Arc::new(authenticated_provider(Arc::default()));
        let app = router(dispatcher, &config);
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}{}", addr, config.path)
    }

    fn transport() -> Arc<HttpTransport> {
        Arc::new(HttpTransport::new(&OutboundConfig::default()).unwrap())
    }

    #[tokio::test]
    async fn test_description_over_http() {
        init_tracing();
        let url = spawn_provider(InboundConfig::default()).await;

        let container = consumer_pipeline(transport(), 3600)
            .new_request()
            .use_template(description_request(PROVIDER_ID, None))
            .throw_on_rejection()
            .expect_payload::<SelfDescription>()
            .execute(&url)
            .await
            .unwrap();

        assert_eq!(
            container.header().message_type,
            MessageType::DescriptionResponse
        );
        assert_eq!(container.payload().unwrap().title, "Weather data provider");
    }

    #[tokio::test]
    async fn test_expired_token_over_http() {
        let url = spawn_provider(InboundConfig::default()).await;

        let err = consumer_pipeline(transport(), -1)
            .new_request()
            .use_template(description_request(PROVIDER_ID, None))
            .throw_on_rejection()
            .execute(&url)
            .await
            .unwrap_err();

        assert_eq!(err.rejection_reason(), Some(RejectionReason::NotAuthenticated));
    }

    #[tokio::test]
    async fn test_oversized_body_is_not_multipart() {
        let url = spawn_provider(InboundConfig {
            max_message_size: 64,
            path: "/data".to_string(),
        })
        .await;

        let err = consumer_pipeline(transport(), 3600)
            .new_request()
            .use_template(description_request(PROVIDER_ID, None))
            .execute(&url)
            .await
            .unwrap_err();

        // 413 with a plain-text body, or a reset if the server closes first
        assert!(matches!(
            err,
            RequestError::MultipartParse(_) | RequestError::Io(_)
        ));
    }

    #[tokio::test]
    async fn test_unreachable_provider_is_io_error() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let err = consumer_pipeline(transport(), 3600)
            .new_request()
            .use_template(description_request(PROVIDER_ID, None))
            .execute(&format!("http://{}/", addr))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            RequestError::Io(TransportError::Connection { .. })
        ));
    }
}
