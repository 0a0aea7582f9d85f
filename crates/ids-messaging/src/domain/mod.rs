//! # Domain Module
//!
//! Core value types: the multipart envelope, token claims, the response
//! container and the identity context threaded into every component.

pub mod claims;
pub mod container;
pub mod envelope;
pub mod errors;
pub mod identity;

pub use claims::Claims;
pub use container::{MessageContainer, OutboundMessage};
pub use envelope::{EncodedEnvelope, MultipartEnvelope, PartName};
pub use errors::*;
pub use identity::IdentityContext;
