//! # Error Types
//!
//! Errors raised while constructing or interpreting schema objects.

use thiserror::Error;

/// Errors produced when a header cannot be assembled or interpreted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HeaderError {
    /// The issuing connector was never set.
    #[error("Missing issuer connector")]
    MissingIssuer,

    /// The sending agent was never set.
    #[error("Missing sender agent")]
    MissingSenderAgent,

    /// A rejection reference did not name a known rejection code.
    #[error("Unknown rejection reason: {0}")]
    UnknownRejectionReason(String),
}
