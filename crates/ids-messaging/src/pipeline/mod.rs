//! # Pipeline Module
//!
//! Outbound side: build a request from a template, send it, and turn the
//! response into a typed container or a specific error.

pub mod builder;
pub mod errors;
pub mod expectation;
pub mod template;

pub use builder::{MessagePipeline, RequestBuilder};
pub use errors::RequestError;
pub use expectation::{Json, PayloadExpectation, Raw, Text};
pub use template::RequestTemplate;
