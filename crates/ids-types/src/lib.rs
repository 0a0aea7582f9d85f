//! # IDS Types Crate
//!
//! The message schema exchanged between connectors. Every inbound and outbound
//! message carries a [`MessageHeader`] serialized as JSON-LD in the `header`
//! part of the multipart envelope.
//!
//! ## Design Principles
//!
//! - **Discriminator First**: `@type` maps onto the closed [`MessageType`]
//!   enumeration. Unknown message kinds fail to deserialize instead of being
//!   coerced into a catch-all variant.
//! - **References, not Objects**: connectors, agents and contracts are carried
//!   as JSON-LD `{"@id": ...}` references ([`IdRef`]).
//! - **Tokens Stay Opaque**: the [`DynamicAttributeToken`] value is never
//!   printed by `Debug`.

pub mod errors;
pub mod header;
pub mod message_type;
pub mod reference;
pub mod rejection;
pub mod token;

pub use errors::HeaderError;
pub use header::{HeaderBuilder, MessageHeader, DEFAULT_MODEL_VERSION};
pub use message_type::MessageType;
pub use reference::IdRef;
pub use rejection::RejectionReason;
pub use token::DynamicAttributeToken;

/// Prefix used for generated message identifiers.
pub const AUTOGEN_PREFIX: &str = "https://w3id.org/idsa/autogen";

/// Namespace of the IDS code vocabulary (rejection reasons, token formats).
pub const CODE_NAMESPACE: &str = "https://w3id.org/idsa/code/";
