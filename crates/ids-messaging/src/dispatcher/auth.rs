//! # Inbound Authentication
//!
//! Gate run before routing: verify the sender's token, then validate its
//! claims. Each failure maps onto the rejection reason sent back.

use crate::domain::Claims;
use crate::ports::{TokenVerificationError, TokenVerifier};
use crate::validation::{FailureReason, TokenClaimsValidator, ValidationError, ValidationOutcome};
use ids_types::{MessageHeader, RejectionReason};
use std::sync::Arc;
use thiserror::Error;

/// The sender could not be authenticated.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AuthError {
    /// The header carries no security token.
    #[error("Message carries no security token")]
    MissingToken,

    /// The token failed verification.
    #[error("Token verification failed: {0}")]
    Verification(#[from] TokenVerificationError),

    /// The claims did not pass validation.
    #[error("Token rejected: {0}")]
    Rejected(FailureReason),

    /// Validation could not be carried out.
    #[error(transparent)]
    Validation(#[from] ValidationError),
}

impl AuthError {
    /// Reason reported to the sender.
    #[must_use]
    pub fn rejection_reason(&self) -> RejectionReason {
        match self {
            AuthError::Validation(ValidationError::RuleEvaluation { .. }) => {
                RejectionReason::InternalRecipientError
            }
            AuthError::Verification(TokenVerificationError::Unavailable(_)) => {
                RejectionReason::TemporarilyNotAvailable
            }
            _ => RejectionReason::NotAuthenticated,
        }
    }
}

/// Verifies and validates the token embedded in inbound headers.
#[derive(Clone)]
pub struct TokenAuthenticator {
    verifier: Arc<dyn TokenVerifier>,
    validator: TokenClaimsValidator,
}

impl TokenAuthenticator {
    pub fn new(verifier: Arc<dyn TokenVerifier>, validator: TokenClaimsValidator) -> Self {
        Self {
            verifier,
            validator,
        }
    }

    #[must_use]
    pub fn validator(&self) -> &TokenClaimsValidator {
        &self.validator
    }

    /// Authenticate the sender of `header`, returning its claims.
    pub async fn authenticate(&self, header: &MessageHeader) -> Result<Claims, AuthError> {
        let token = header.security_token.as_ref().ok_or(AuthError::MissingToken)?;
        let claims = self.verifier.verify(token).await?;
        match self.validator.validate(&claims)? {
            ValidationOutcome::Success => Ok(claims),
            ValidationOutcome::Failure { reason } => Err(AuthError::Rejected(reason)),
        }
    }
}

impl std::fmt::Debug for TokenAuthenticator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenAuthenticator")
            .field("validator", &self.validator)
            .finish_non_exhaustive()
    }
}
