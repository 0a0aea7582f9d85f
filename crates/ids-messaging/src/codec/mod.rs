//! # Codec Module
//!
//! The multipart wire format shared by requests and responses.

pub mod multipart;

pub use multipart::{MultipartCodec, DEFAULT_BOUNDARY_LENGTH};
