//! # Adapters Module
//!
//! Concrete implementations of the outbound ports plus the HTTP edges.
//!
//! | Adapter | Port / role |
//! |---------|-------------|
//! | [`JsonLdSchemaCodec`] | `SchemaCodec` |
//! | [`UnverifiedJwtDecoder`] | `TokenVerifier` (no signature check) |
//! | [`StaticTokenProvider`] | `TokenProvider` |
//! | `http_server::router` | inbound endpoint (feature `server`) |
//! | `HttpTransport` | `Transport` (feature `client`) |

pub mod json_ld;
pub mod jwt;
pub mod token;

#[cfg(feature = "server")]
pub mod http_server;
#[cfg(feature = "client")]
pub mod http_transport;

pub use json_ld::JsonLdSchemaCodec;
pub use jwt::UnverifiedJwtDecoder;
pub use token::StaticTokenProvider;

#[cfg(feature = "client")]
pub use http_transport::HttpTransport;
