//! # Request Execution
//!
//! [`MessagePipeline`] holds the long-lived collaborators; each call to
//! [`MessagePipeline::new_request`] yields a fresh [`RequestBuilder`] that is
//! consumed by `execute`, so a template or token can never be reused by
//! accident.
//!
//! ## Execution Order
//!
//! 1. Obtain this node's token
//! 2. Build the message from the template and attach the token
//! 3. Encode and send (no retries)
//! 4. Decode the response envelope and its header
//! 5. Apply the rejection and payload expectations

use crate::codec::MultipartCodec;
use crate::domain::{IdentityContext, MessageContainer, MultipartEnvelope};
use crate::pipeline::errors::RequestError;
use crate::pipeline::expectation::{Json, PayloadExpectation, Raw, Text};
use crate::pipeline::template::RequestTemplate;
use crate::ports::{OutboundRequest, SchemaCodec, TokenProvider, Transport};
use serde::de::DeserializeOwned;
use std::marker::PhantomData;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Shared outbound machinery. Cheap to clone.
#[derive(Clone)]
pub struct MessagePipeline {
    identity: Arc<IdentityContext>,
    codec: MultipartCodec,
    schema: Arc<dyn SchemaCodec>,
    transport: Arc<dyn Transport>,
    tokens: Arc<dyn TokenProvider>,
}

impl MessagePipeline {
    pub fn new(
        identity: IdentityContext,
        schema: Arc<dyn SchemaCodec>,
        transport: Arc<dyn Transport>,
        tokens: Arc<dyn TokenProvider>,
    ) -> Self {
        Self {
            identity: Arc::new(identity),
            codec: MultipartCodec::new(),
            schema,
            transport,
            tokens,
        }
    }

    /// Replace the multipart codec.
    #[must_use]
    pub fn with_codec(mut self, codec: MultipartCodec) -> Self {
        self.codec = codec;
        self
    }

    #[must_use]
    pub fn identity(&self) -> &IdentityContext {
        &self.identity
    }

    /// Start a request with no template and default options.
    pub fn new_request(&self) -> RequestBuilder<Raw> {
        RequestBuilder {
            pipeline: self.clone(),
            template: None,
            throw_on_rejection: false,
            expectation: PhantomData,
        }
    }
}

impl std::fmt::Debug for MessagePipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MessagePipeline")
            .field("identity", &self.identity)
            .finish_non_exhaustive()
    }
}

/// One outbound request under construction.
///
/// `E` fixes the payload type of the returned container.
#[must_use = "a request does nothing until executed"]
pub struct RequestBuilder<E = Raw> {
    pipeline: MessagePipeline,
    template: Option<Box<dyn RequestTemplate>>,
    throw_on_rejection: bool,
    expectation: PhantomData<fn() -> E>,
}

impl<E: PayloadExpectation> RequestBuilder<E> {
    /// Set the template, replacing any earlier one.
    pub fn use_template(mut self, template: impl RequestTemplate + 'static) -> Self {
        self.template = Some(Box::new(template));
        self
    }

    /// Fail with [`RequestError::Rejection`] if the recipient rejects.
    pub fn throw_on_rejection(mut self) -> Self {
        self.throw_on_rejection = true;
        self
    }

    /// Deserialize the response payload as JSON into `T`.
    pub fn expect_payload<T>(self) -> RequestBuilder<Json<T>>
    where
        T: DeserializeOwned + Send + 'static,
    {
        self.expecting()
    }

    /// Require a UTF-8 response payload.
    pub fn expect_text(self) -> RequestBuilder<Text> {
        self.expecting()
    }

    /// Return the payload as raw bytes. The default.
    pub fn expect_raw(self) -> RequestBuilder<Raw> {
        self.expecting()
    }

    fn expecting<N: PayloadExpectation>(self) -> RequestBuilder<N> {
        RequestBuilder {
            pipeline: self.pipeline,
            template: self.template,
            throw_on_rejection: self.throw_on_rejection,
            expectation: PhantomData,
        }
    }

    /// Send the request to `target` and post-process the response.
    ///
    /// # Errors
    ///
    /// * `NoTemplateProvided` - no template was set; nothing is sent
    /// * `TokenProvider` - no token could be obtained; nothing is sent
    /// * `Io` - the transport failed
    /// * `MultipartParse` / `MissingHeaderPart` / `Schema` - unreadable response
    /// * `Rejection` - the recipient rejected and `throw_on_rejection` was set
    /// * `UnexpectedPayload` - the payload does not match the expectation
    pub async fn execute(
        self,
        target: &str,
    ) -> Result<MessageContainer<E::Output>, RequestError> {
        let template = self.template.ok_or(RequestError::NoTemplateProvided)?;
        let pipeline = self.pipeline;

        let token = pipeline.tokens.current_token().await?;
        let message = template.build(&pipeline.identity)?;
        let header = message.header.with_security_token(token);
        let request_id = header.id.clone();

        let header_bytes = pipeline.schema.serialize_header(&header)?;
        let envelope = MultipartEnvelope::new(header_bytes).with_optional_payload(message.payload);
        let encoded = pipeline
            .codec
            .encode(&envelope)
            .map_err(RequestError::Encoding)?;

        info!(
            peer = %target,
            correlation_id = %request_id,
            message_type = %header.message_type,
            "Sending message"
        );
        let response = pipeline
            .transport
            .send(OutboundRequest {
                target: target.to_string(),
                content_type: encoded.content_type(),
                body: encoded.body,
            })
            .await?;

        if !response.is_success() {
            warn!(
                peer = %target,
                status = response.status,
                "Recipient answered with non-success status"
            );
        }

        let (header_part, payload) = pipeline
            .codec
            .decode(&response.body)
            .map_err(RequestError::MultipartParse)?
            .into_parts();
        let header_part = header_part.ok_or(RequestError::MissingHeaderPart)?;
        let response_header = pipeline.schema.parse_header(&header_part)?;

        debug!(
            correlation_id = %request_id,
            response_type = %response_header.message_type,
            correlated = response_header.correlates_with(&request_id),
            "Response decoded"
        );

        if response_header.is_rejection() {
            if self.throw_on_rejection {
                let message = payload
                    .as_ref()
                    .and_then(|p| std::str::from_utf8(p).ok())
                    .map(str::to_string);
                return Err(RequestError::Rejection {
                    reason: response_header.rejection_reason,
                    message,
                    header: Box::new(response_header),
                });
            }
            if E::TYPED {
                return Err(RequestError::UnexpectedPayload {
                    expected: E::NAME,
                    reason: "response is a rejection".to_string(),
                    container: Box::new(MessageContainer::new(response_header, payload)),
                });
            }
        }

        match E::extract(payload.as_ref()) {
            Ok(typed) => Ok(MessageContainer::new(response_header, typed)),
            Err(reason) => Err(RequestError::UnexpectedPayload {
                expected: E::NAME,
                reason,
                container: Box::new(MessageContainer::new(response_header, payload)),
            }),
        }
    }
}
