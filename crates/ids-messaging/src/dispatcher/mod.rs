//! # Dispatcher Module
//!
//! Inbound side: route decoded messages to the handler registered for their
//! type and answer every request with a well-formed envelope.

pub mod auth;
pub mod handler;
pub mod registry;
pub mod response;
pub mod service;

pub use auth::{AuthError, TokenAuthenticator};
pub use handler::{HandlerError, InboundRequest, MessageHandler, MessageResponse};
pub use registry::{HandlerRegistry, RegistrationError};
pub use response::DispatchResponse;
pub use service::{DispatcherBuilder, MessageDispatcher};
