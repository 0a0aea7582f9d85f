//! # Pipeline to Dispatcher Flows
//!
//! A consumer's [`MessagePipeline`] talks to a provider's
//! [`MessageDispatcher`] through the in-process loopback transport.
//!
//! ## Flows Tested
//!
//! 1. Description request answered with a typed self-description
//! 2. Artifact request served, unknown artifact rejected with `NOT_FOUND`
//! 3. Expired consumer token rejected with `NOT_AUTHENTICATED`
//! 4. Unregistered message type rejected with `MESSAGE_TYPE_NOT_SUPPORTED`

#[cfg(test)]
mod tests {
    use crate::integration::fixtures::*;
    use ids_messaging::pipeline::template::{
        artifact_request, connector_unavailable, description_request, query,
    };
    use ids_messaging::{MessageDispatcher, RequestError, Transport};
    use ids_types::{IdRef, MessageType, RejectionReason};
    use std::sync::Arc;

    fn loopback(dispatcher: MessageDispatcher) -> Arc<LoopbackTransport> {
        Arc::new(LoopbackTransport::new(Arc::new(dispatcher)))
    }

    // =========================================================================
    // UNAUTHENTICATED PROVIDER
    // =========================================================================

    #[tokio::test]
    async fn test_description_request_typed_payload() {
        init_tracing();
        let transport = loopback(provider_builder(Arc::default()).build());
        let pipeline = consumer_pipeline(transport.clone() as Arc<dyn Transport>, 3600);

        let container = pipeline
            .new_request()
            .use_template(description_request(PROVIDER_ID, None))
            .throw_on_rejection()
            .expect_payload::<SelfDescription>()
            .execute(PROVIDER_ID)
            .await
            .unwrap();

        let header = container.header();
        assert_eq!(header.message_type, MessageType::DescriptionResponse);
        assert_eq!(header.issuer_connector.as_str(), PROVIDER_ID);
        assert_eq!(header.recipient_connector, vec![IdRef::new(CONSUMER_ID)]);
        assert!(header.correlation_message.is_some());
        assert_eq!(
            container.payload().unwrap().artifacts,
            vec![KNOWN_ARTIFACT.to_string()]
        );
        assert_eq!(transport.sent(), 1);
    }

    #[tokio::test]
    async fn test_artifact_served_as_text() {
        let artifacts = Arc::new(ArtifactHandler::default());
        let transport = loopback(provider_builder(Arc::clone(&artifacts)).build());
        let pipeline = consumer_pipeline(transport, 3600);

        let container = pipeline
            .new_request()
            .use_template(artifact_request(PROVIDER_ID, KNOWN_ARTIFACT, None))
            .expect_text()
            .execute(PROVIDER_ID)
            .await
            .unwrap();

        assert_eq!(container.payload().map(String::as_str), Some("temperature=21.5"));
        assert_eq!(artifacts.served.load(std::sync::atomic::Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_unknown_artifact_rejection_becomes_error() {
        let transport = loopback(provider_builder(Arc::default()).build());
        let pipeline = consumer_pipeline(transport, 3600);

        let err = pipeline
            .new_request()
            .use_template(artifact_request(
                PROVIDER_ID,
                "https://provider.example/artifact/missing",
                None,
            ))
            .throw_on_rejection()
            .execute(PROVIDER_ID)
            .await
            .unwrap_err();

        match err {
            RequestError::Rejection {
                reason, message, header,
            } => {
                assert_eq!(reason, Some(RejectionReason::NotFound));
                assert!(message.unwrap().contains("unknown artifact"));
                assert_eq!(header.issuer_connector.as_str(), PROVIDER_ID);
            }
            other => panic!("expected rejection, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_rejection_returned_as_container_without_flag() {
        let transport = loopback(provider_builder(Arc::default()).build());
        let pipeline = consumer_pipeline(transport, 3600);

        let container = pipeline
            .new_request()
            .use_template(query(PROVIDER_ID, "SELECT * WHERE { ?s ?p ?o }"))
            .execute(PROVIDER_ID)
            .await
            .unwrap();

        assert!(container.is_rejection());
        assert_eq!(
            container.rejection_reason(),
            Some(RejectionReason::MessageTypeNotSupported)
        );
    }

    #[tokio::test]
    async fn test_notification_acknowledged() {
        let transport = loopback(provider_builder(Arc::default()).build());
        let container = consumer_pipeline(transport, 3600)
            .new_request()
            .use_template(connector_unavailable(PROVIDER_ID))
            .throw_on_rejection()
            .execute(PROVIDER_ID)
            .await
            .unwrap();
        assert_eq!(
            container.header().message_type,
            MessageType::MessageProcessedNotification
        );
        assert!(container.payload().is_none());
    }

    // =========================================================================
    // AUTHENTICATED PROVIDER
    // =========================================================================

    #[tokio::test]
    async fn test_valid_token_accepted_and_response_signed() {
        let transport = loopback(authenticated_provider(Arc::default()));
        let container = consumer_pipeline(transport, 3600)
            .new_request()
            .use_template(description_request(PROVIDER_ID, None))
            .throw_on_rejection()
            .execute(PROVIDER_ID)
            .await
            .unwrap();
        assert!(container.header().security_token.is_some());
    }

    #[tokio::test]
    async fn test_expired_token_not_authenticated() {
        let artifacts = Arc::new(ArtifactHandler::default());
        let transport = loopback(authenticated_provider(Arc::clone(&artifacts)));

        let err = consumer_pipeline(transport, -60)
            .new_request()
            .use_template(artifact_request(PROVIDER_ID, KNOWN_ARTIFACT, None))
            .throw_on_rejection()
            .execute(PROVIDER_ID)
            .await
            .unwrap_err();

        assert_eq!(err.rejection_reason(), Some(RejectionReason::NotAuthenticated));
        assert_eq!(artifacts.served.load(std::sync::atomic::Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_concurrent_consumers() {
        let artifacts = Arc::new(ArtifactHandler::default());
        let transport = loopback(authenticated_provider(Arc::clone(&artifacts)));
        let pipeline = consumer_pipeline(transport, 3600);

        let mut tasks = Vec::new();
        for _ in 0..8 {
            let pipeline = pipeline.clone();
            tasks.push(tokio::spawn(async move {
                pipeline
                    .new_request()
                    .use_template(artifact_request(PROVIDER_ID, KNOWN_ARTIFACT, None))
                    .throw_on_rejection()
                    .expect_text()
                    .execute(PROVIDER_ID)
                    .await
            }));
        }
        for task in tasks {
            let container = task.await.unwrap().unwrap();
            assert_eq!(container.payload().map(String::as_str), Some("temperature=21.5"));
        }
        assert_eq!(artifacts.served.load(std::sync::atomic::Ordering::SeqCst), 8);
    }
}
