//! # Validation Rules
//!
//! Custom checks evaluated after the built-in expiry and audience checks.
//! Each rule sees the same immutable [`Claims`] snapshot.

use crate::domain::Claims;
use crate::ports::TimeSource;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// Result of evaluating one rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationRuleResult {
    /// The claims satisfy the rule.
    Success,
    /// The claims violate the rule.
    Failure {
        /// Human-readable explanation.
        message: String,
    },
}

impl ValidationRuleResult {
    pub fn success() -> Self {
        ValidationRuleResult::Success
    }

    pub fn failure(message: impl Into<String>) -> Self {
        ValidationRuleResult::Failure {
            message: message.into(),
        }
    }

    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, ValidationRuleResult::Success)
    }
}

/// A rule could not be evaluated at all. Never treated as success.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct RuleEvaluationError {
    /// What went wrong while evaluating.
    pub message: String,
}

impl RuleEvaluationError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl From<crate::domain::ClaimsError> for RuleEvaluationError {
    fn from(err: crate::domain::ClaimsError) -> Self {
        Self::new(err.to_string())
    }
}

/// A named predicate over token claims.
pub trait ValidationRule: Send + Sync {
    /// Name reported when the rule fails.
    fn name(&self) -> &str;

    /// Evaluate the rule.
    fn evaluate(&self, claims: &Claims) -> Result<ValidationRuleResult, RuleEvaluationError>;
}

/// Rule backed by a closure.
pub struct FnRule<F> {
    name: String,
    check: F,
}

impl<F> FnRule<F>
where
    F: Fn(&Claims) -> Result<ValidationRuleResult, RuleEvaluationError> + Send + Sync,
{
    pub fn new(name: impl Into<String>, check: F) -> Self {
        Self {
            name: name.into(),
            check,
        }
    }
}

impl<F> ValidationRule for FnRule<F>
where
    F: Fn(&Claims) -> Result<ValidationRuleResult, RuleEvaluationError> + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn evaluate(&self, claims: &Claims) -> Result<ValidationRuleResult, RuleEvaluationError> {
        (self.check)(claims)
    }
}

impl<F> fmt::Debug for FnRule<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnRule").field("name", &self.name).finish()
    }
}

// =============================================================================
// SHIPPED RULES
// =============================================================================

/// The token must be issued by the expected trust service.
#[derive(Debug, Clone)]
pub struct IssuerRule {
    expected: String,
}

impl IssuerRule {
    pub fn new(expected: impl Into<String>) -> Self {
        Self {
            expected: expected.into(),
        }
    }
}

impl ValidationRule for IssuerRule {
    fn name(&self) -> &str {
        "issuer"
    }

    fn evaluate(&self, claims: &Claims) -> Result<ValidationRuleResult, RuleEvaluationError> {
        Ok(match claims.issuer()? {
            Some(issuer) if issuer == self.expected => ValidationRuleResult::success(),
            Some(issuer) => ValidationRuleResult::failure(format!(
                "token issued by {}, expected {}",
                issuer, self.expected
            )),
            None => ValidationRuleResult::failure("token has no issuer"),
        })
    }
}

/// The token must grant a scope.
#[derive(Debug, Clone)]
pub struct ScopeRule {
    required: String,
}

impl ScopeRule {
    pub fn new(required: impl Into<String>) -> Self {
        Self {
            required: required.into(),
        }
    }
}

impl ValidationRule for ScopeRule {
    fn name(&self) -> &str {
        "scope"
    }

    fn evaluate(&self, claims: &Claims) -> Result<ValidationRuleResult, RuleEvaluationError> {
        if claims.scopes()?.contains(&self.required.as_str()) {
            Ok(ValidationRuleResult::success())
        } else {
            Ok(ValidationRuleResult::failure(format!(
                "token lacks scope {}",
                self.required
            )))
        }
    }
}

/// The token must already be valid (`nbf` not in the future).
pub struct NotBeforeRule {
    time: Arc<dyn TimeSource>,
    leeway_secs: i64,
}

impl NotBeforeRule {
    pub fn new(time: Arc<dyn TimeSource>, leeway_secs: i64) -> Self {
        Self { time, leeway_secs }
    }
}

impl ValidationRule for NotBeforeRule {
    fn name(&self) -> &str {
        "not-before"
    }

    fn evaluate(&self, claims: &Claims) -> Result<ValidationRuleResult, RuleEvaluationError> {
        let now = self.time.now();
        Ok(match claims.not_before()? {
            Some(nbf) if nbf > now + self.leeway_secs => {
                ValidationRuleResult::failure(format!("token not valid before {}", nbf))
            }
            _ => ValidationRuleResult::success(),
        })
    }
}

/// Claim carrying the connector's security profile.
pub const SECURITY_PROFILE_CLAIM: &str = "securityProfile";

/// The connector must run the expected security profile.
#[derive(Debug, Clone)]
pub struct SecurityProfileRule {
    accepted: Vec<String>,
}

impl SecurityProfileRule {
    /// Accept any of the given profile identifiers.
    pub fn accepting<I, S>(profiles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            accepted: profiles.into_iter().map(Into::into).collect(),
        }
    }
}

impl ValidationRule for SecurityProfileRule {
    fn name(&self) -> &str {
        "security-profile"
    }

    fn evaluate(&self, claims: &Claims) -> Result<ValidationRuleResult, RuleEvaluationError> {
        Ok(match claims.string(SECURITY_PROFILE_CLAIM)? {
            Some(profile) if self.accepted.iter().any(|p| p == profile) => {
                ValidationRuleResult::success()
            }
            Some(profile) => {
                ValidationRuleResult::failure(format!("security profile {} not accepted", profile))
            }
            None => ValidationRuleResult::failure(format!(
                "token has no {} claim",
                SECURITY_PROFILE_CLAIM
            )),
        })
    }
}

/// Subject the token must be bound to, e.g. a connector fingerprint.
#[derive(Debug, Clone)]
pub struct SubjectRule {
    expected: String,
}

impl SubjectRule {
    pub fn new(expected: impl Into<String>) -> Self {
        Self {
            expected: expected.into(),
        }
    }
}

impl ValidationRule for SubjectRule {
    fn name(&self) -> &str {
        "subject"
    }

    fn evaluate(&self, claims: &Claims) -> Result<ValidationRuleResult, RuleEvaluationError> {
        Ok(match claims.subject()? {
            Some(sub) if sub == self.expected => ValidationRuleResult::success(),
            Some(_) => ValidationRuleResult::failure("token subject does not match"),
            None => ValidationRuleResult::failure("token has no subject"),
        })
    }
}
