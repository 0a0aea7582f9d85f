//! # Domain Errors
//!
//! Wire-format, schema and claims errors.

use thiserror::Error;

/// Errors raised by the multipart codec.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MultipartError {
    /// No `--<boundary>` line was found in the body.
    #[error("No multipart boundary found")]
    NoBoundary,

    /// A boundary was found but no part could be read after it.
    #[error("Multipart body contains no parts")]
    NoParts,

    /// A part's header block is unreadable or lacks a name.
    #[error("Malformed part header: {0}")]
    MalformedPartHeader(String),

    /// The same part name occurred twice.
    #[error("Duplicate part: {0}")]
    DuplicatePart(&'static str),

    /// The body ended before the closing `--<boundary>--` delimiter.
    #[error("Missing closing boundary")]
    MissingClosingBoundary,

    /// Attempted to encode an envelope without any part.
    #[error("Cannot encode an envelope without parts")]
    EmptyEnvelope,
}

/// Errors raised while (de)serializing message headers.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    /// Header bytes do not describe a valid message header.
    #[error("Invalid message header: {0}")]
    InvalidHeader(String),

    /// A header could not be serialized.
    #[error("Header serialization failed: {0}")]
    Serialization(String),
}

/// Errors raised when token claims are unreadable.
///
/// An ordinary failed check is not an error; see `ValidationOutcome`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClaimsError {
    /// The token is not a three-segment JWT.
    #[error("Token is not a JWT")]
    NotAJwt,

    /// The claims segment is not valid base64url.
    #[error("Invalid claims encoding: {0}")]
    Encoding(String),

    /// The claims segment is not a JSON object.
    #[error("Invalid claims JSON: {0}")]
    Json(String),

    /// A required claim is absent.
    #[error("Missing claim: {0}")]
    MissingClaim(&'static str),

    /// A claim has the wrong shape.
    #[error("Invalid claim {claim}: {reason}")]
    InvalidClaim {
        /// Claim name
        claim: String,
        /// What is wrong with it
        reason: String,
    },
}
