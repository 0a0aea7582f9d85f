//! # IDS Messaging
//!
//! Connector-side message exchange: the multipart wire format, the inbound
//! dispatcher, token claims validation and the outbound request pipeline.
//!
//! **Architecture:** Hexagonal (DDD + Ports/Adapters)
//!
//! ## Data Flow
//!
//! ```text
//! outbound: template -> header -> encode -> Transport::send -> decode -> container | RequestError
//! inbound:  body -> decode -> parse header -> authenticate -> route -> handler -> encode
//! ```
//!
//! ## Failure Handling
//!
//! | Side | Policy |
//! |------|--------|
//! | Inbound | Every failure becomes a rejection message (HTTP 200) |
//! | Outbound | Every failure is a distinct [`RequestError`] variant |
//! | Both | No automatic retries |
//!
//! ## Module Structure
//!
//! ```text
//! ids-messaging/
//! ├── domain/       # Envelope, claims, containers, identity, errors
//! ├── codec/        # Multipart encoder/decoder
//! ├── validation/   # Claims validator and rules
//! ├── dispatcher/   # Handler registry, authentication gate, dispatch
//! ├── pipeline/     # Templates, expectations, request execution
//! ├── ports/        # Transport, TokenProvider, SchemaCodec, TokenVerifier, TimeSource
//! └── adapters/     # JSON-LD codec, JWT decoder, axum endpoint, reqwest transport
//! ```

#![warn(clippy::all)]

pub mod adapters;
pub mod codec;
pub mod config;
pub mod dispatcher;
pub mod domain;
pub mod pipeline;
pub mod ports;
pub mod validation;

// Re-exports
pub use codec::MultipartCodec;
pub use config::{ConfigError, MessagingConfig};
pub use dispatcher::{
    DispatchResponse, HandlerError, InboundRequest, MessageDispatcher, MessageHandler,
    MessageResponse, RegistrationError, TokenAuthenticator,
};
pub use domain::{
    Claims, ClaimsError, IdentityContext, MessageContainer, MultipartEnvelope, MultipartError,
    OutboundMessage, SchemaError,
};
pub use pipeline::{MessagePipeline, RequestBuilder, RequestError, RequestTemplate};
pub use ports::{
    SchemaCodec, TimeSource, TokenProvider, TokenProviderError, TokenVerifier, Transport,
    TransportError,
};
pub use validation::{
    FailureReason, TokenClaimsValidator, ValidationError, ValidationOutcome, ValidationRule,
    ValidationRuleResult,
};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    #[test]
    #[allow(clippy::const_is_empty)]
    fn test_version() {
        assert!(!super::VERSION.is_empty());
    }
}
