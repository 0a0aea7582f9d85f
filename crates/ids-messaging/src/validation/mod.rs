//! # Validation Module
//!
//! Token claims validation: fixed expiry/audience checks plus an extensible,
//! ordered rule chain.

pub mod rules;
pub mod validator;

pub use rules::{
    FnRule, IssuerRule, NotBeforeRule, RuleEvaluationError, ScopeRule, SecurityProfileRule,
    SubjectRule, ValidationRule, ValidationRuleResult, SECURITY_PROFILE_CLAIM,
};
pub use validator::{
    FailureReason, TokenClaimsValidator, ValidationError, ValidationOutcome, ValidatorBuilder,
};
