//! # Token Claims Validator
//!
//! Validates decoded claims in a fixed order:
//!
//! 1. Expiry: `exp` must lie strictly after the current time.
//! 2. Audience: `aud` must contain this node's expected audience.
//! 3. Custom rules, in registration order, stopping at the first failure.
//!
//! A failed check is an ordinary [`ValidationOutcome::Failure`]. Only
//! unreadable claims and rules that cannot be evaluated produce a
//! [`ValidationError`].

use crate::domain::{Claims, ClaimsError, IdentityContext};
use crate::ports::{SystemTimeSource, TimeSource};
use crate::validation::rules::{RuleEvaluationError, ValidationRule, ValidationRuleResult};
use std::fmt;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, error};

/// Why validation failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureReason {
    /// The token is past its expiry.
    TokenExpired {
        /// `exp` claim
        expired_at: i64,
        /// Evaluation time
        now: i64,
    },
    /// The token is not addressed to this node.
    AudienceMismatch {
        /// Audience this node expects
        expected: String,
        /// Audiences in the token
        actual: Vec<String>,
    },
    /// A custom rule rejected the claims.
    RuleFailed {
        /// Rule name
        rule: String,
        /// Rule message
        message: String,
    },
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureReason::TokenExpired { expired_at, now } => {
                write!(f, "Token expired at {} (now {})", expired_at, now)
            }
            FailureReason::AudienceMismatch { expected, actual } => write!(
                f,
                "Audience mismatch: expected {}, token names [{}]",
                expected,
                actual.join(", ")
            ),
            FailureReason::RuleFailed { rule, message } => {
                write!(f, "Rule {} failed: {}", rule, message)
            }
        }
    }
}

/// Result of validating one set of claims.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationOutcome {
    /// All checks passed.
    Success,
    /// A check failed.
    Failure {
        /// The first failing check
        reason: FailureReason,
    },
}

impl ValidationOutcome {
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, ValidationOutcome::Success)
    }

    fn failure(reason: FailureReason) -> Self {
        ValidationOutcome::Failure { reason }
    }
}

/// Validation could not be carried out.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// The claims themselves are unreadable.
    #[error("Malformed claims: {0}")]
    MalformedClaims(#[from] ClaimsError),

    /// A custom rule faulted while evaluating.
    #[error("Rule {rule} could not be evaluated: {source}")]
    RuleEvaluation {
        /// Rule name
        rule: String,
        /// Underlying fault
        #[source]
        source: RuleEvaluationError,
    },
}

/// Validates claims against the built-in checks and a fixed rule list.
///
/// The rule list is assembled once through [`ValidatorBuilder`] and is
/// read-only afterwards, so a validator can be shared across tasks freely.
#[derive(Clone)]
pub struct TokenClaimsValidator {
    expected_audience: String,
    rules: Arc<[Arc<dyn ValidationRule>]>,
    time: Arc<dyn TimeSource>,
}

impl TokenClaimsValidator {
    /// Start building a validator expecting the given audience.
    pub fn builder(expected_audience: impl Into<String>) -> ValidatorBuilder {
        ValidatorBuilder {
            expected_audience: expected_audience.into(),
            rules: Vec::new(),
            time: Arc::new(SystemTimeSource),
        }
    }

    /// Start building a validator for this node, expecting
    /// `identity.expected_audience`.
    pub fn for_identity(identity: &IdentityContext) -> ValidatorBuilder {
        Self::builder(identity.expected_audience.as_str())
    }

    /// Audience this validator requires.
    #[must_use]
    pub fn expected_audience(&self) -> &str {
        &self.expected_audience
    }

    /// Names of the registered custom rules, in evaluation order.
    pub fn rule_names(&self) -> Vec<&str> {
        self.rules.iter().map(|r| r.name()).collect()
    }

    /// Validate against the configured time source.
    pub fn validate(&self, claims: &Claims) -> Result<ValidationOutcome, ValidationError> {
        self.validate_at(claims, self.time.now())
    }

    /// Validate as of `now` (seconds since epoch).
    pub fn validate_at(
        &self,
        claims: &Claims,
        now: i64,
    ) -> Result<ValidationOutcome, ValidationError> {
        let expires = claims.expiry()?;
        if expires <= now {
            debug!(expired_at = expires, now, "Token expired");
            return Ok(ValidationOutcome::failure(FailureReason::TokenExpired {
                expired_at: expires,
                now,
            }));
        }

        let audience = claims.audience()?;
        if !audience.contains(&self.expected_audience.as_str()) {
            debug!(expected = %self.expected_audience, ?audience, "Token audience mismatch");
            return Ok(ValidationOutcome::failure(FailureReason::AudienceMismatch {
                expected: self.expected_audience.clone(),
                actual: audience.into_iter().map(str::to_string).collect(),
            }));
        }

        for rule in self.rules.iter() {
            match rule.evaluate(claims) {
                Ok(ValidationRuleResult::Success) => {}
                Ok(ValidationRuleResult::Failure { message }) => {
                    debug!(rule = rule.name(), %message, "Validation rule failed");
                    return Ok(ValidationOutcome::failure(FailureReason::RuleFailed {
                        rule: rule.name().to_string(),
                        message,
                    }));
                }
                Err(source) => {
                    error!(rule = rule.name(), error = %source, "Validation rule faulted");
                    return Err(ValidationError::RuleEvaluation {
                        rule: rule.name().to_string(),
                        source,
                    });
                }
            }
        }

        Ok(ValidationOutcome::Success)
    }
}

impl fmt::Debug for TokenClaimsValidator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenClaimsValidator")
            .field("expected_audience", &self.expected_audience)
            .field("rules", &self.rule_names())
            .finish()
    }
}

/// Append-only assembly of a [`TokenClaimsValidator`].
pub struct ValidatorBuilder {
    expected_audience: String,
    rules: Vec<Arc<dyn ValidationRule>>,
    time: Arc<dyn TimeSource>,
}

impl ValidatorBuilder {
    /// Append a custom rule. Rules run in the order they are added.
    #[must_use]
    pub fn rule(mut self, rule: impl ValidationRule + 'static) -> Self {
        self.rules.push(Arc::new(rule));
        self
    }

    /// Append a shared custom rule.
    #[must_use]
    pub fn shared_rule(mut self, rule: Arc<dyn ValidationRule>) -> Self {
        self.rules.push(rule);
        self
    }

    /// Replace the clock used by [`TokenClaimsValidator::validate`].
    #[must_use]
    pub fn time_source(mut self, time: Arc<dyn TimeSource>) -> Self {
        self.time = time;
        self
    }

    /// Freeze the rule list.
    pub fn build(self) -> TokenClaimsValidator {
        TokenClaimsValidator {
            expected_audience: self.expected_audience,
            rules: self.rules.into(),
            time: self.time,
        }
    }
}
