//! # Token Claims
//!
//! Decoded content of a security token. Claims are read independently of
//! signature verification; typed accessors report shape errors as
//! [`ClaimsError`] so that a malformed token is never mistaken for a
//! legitimately failed check.

use crate::domain::errors::ClaimsError;
use serde_json::{Map, Value};

/// Expiry timestamp claim (seconds since epoch).
pub const EXPIRY: &str = "exp";
/// Not-before timestamp claim.
pub const NOT_BEFORE: &str = "nbf";
/// Issued-at timestamp claim.
pub const ISSUED_AT: &str = "iat";
/// Audience claim (string or list of strings).
pub const AUDIENCE: &str = "aud";
/// Issuer claim.
pub const ISSUER: &str = "iss";
/// Subject claim.
pub const SUBJECT: &str = "sub";
/// Scope claim (list or space-separated string).
pub const SCOPE: &str = "scope";

/// Immutable snapshot of a token's claims.
#[derive(Debug, Clone, PartialEq)]
pub struct Claims {
    raw: Map<String, Value>,
}

impl Claims {
    /// Wrap a JSON object.
    pub fn from_map(raw: Map<String, Value>) -> Self {
        Self { raw }
    }

    /// Wrap a JSON value, which must be an object.
    pub fn from_json(value: Value) -> Result<Self, ClaimsError> {
        match value {
            Value::Object(raw) => Ok(Self { raw }),
            other => Err(ClaimsError::Json(format!(
                "expected object, found {}",
                json_kind(&other)
            ))),
        }
    }

    /// Parse claims from raw JSON bytes.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, ClaimsError> {
        let value: Value =
            serde_json::from_slice(bytes).map_err(|e| ClaimsError::Json(e.to_string()))?;
        Self::from_json(value)
    }

    /// Raw claim value.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.raw.get(name)
    }

    /// Whether a claim is present.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.raw.contains_key(name)
    }

    /// All claims.
    #[must_use]
    pub fn as_map(&self) -> &Map<String, Value> {
        &self.raw
    }

    /// A string claim. `Ok(None)` if absent.
    pub fn string(&self, name: &str) -> Result<Option<&str>, ClaimsError> {
        match self.raw.get(name) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::String(s)) => Ok(Some(s.as_str())),
            Some(other) => Err(invalid(name, format!("expected string, found {}", json_kind(other)))),
        }
    }

    /// A numeric timestamp claim in seconds. `Ok(None)` if absent.
    pub fn timestamp(&self, name: &str) -> Result<Option<i64>, ClaimsError> {
        match self.raw.get(name) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::Number(n)) => n
                .as_i64()
                .or_else(|| n.as_f64().and_then(float_seconds))
                .map(Some)
                .ok_or_else(|| invalid(name, "timestamp out of range")),
            Some(other) => Err(invalid(name, format!("expected number, found {}", json_kind(other)))),
        }
    }

    /// The mandatory expiry timestamp.
    pub fn expiry(&self) -> Result<i64, ClaimsError> {
        self.timestamp(EXPIRY)?.ok_or(ClaimsError::MissingClaim(EXPIRY))
    }

    /// The optional not-before timestamp.
    pub fn not_before(&self) -> Result<Option<i64>, ClaimsError> {
        self.timestamp(NOT_BEFORE)
    }

    /// The issuer, if any.
    pub fn issuer(&self) -> Result<Option<&str>, ClaimsError> {
        self.string(ISSUER)
    }

    /// The subject, if any.
    pub fn subject(&self) -> Result<Option<&str>, ClaimsError> {
        self.string(SUBJECT)
    }

    /// The audience list. A single string is treated as a one-element list.
    pub fn audience(&self) -> Result<Vec<&str>, ClaimsError> {
        self.string_list(AUDIENCE, false)
    }

    /// Granted scopes. A string value is split on whitespace.
    pub fn scopes(&self) -> Result<Vec<&str>, ClaimsError> {
        self.string_list(SCOPE, true)
    }

    fn string_list(&self, name: &str, split_whitespace: bool) -> Result<Vec<&str>, ClaimsError> {
        match self.raw.get(name) {
            None | Some(Value::Null) => Ok(Vec::new()),
            Some(Value::String(s)) if split_whitespace => Ok(s.split_whitespace().collect()),
            Some(Value::String(s)) => Ok(vec![s.as_str()]),
            Some(Value::Array(items)) => items
                .iter()
                .map(|item| {
                    item.as_str()
                        .ok_or_else(|| invalid(name, "list entries must be strings"))
                })
                .collect(),
            Some(other) => Err(invalid(
                name,
                format!("expected string or list, found {}", json_kind(other)),
            )),
        }
    }
}

fn invalid(claim: &str, reason: impl Into<String>) -> ClaimsError {
    ClaimsError::InvalidClaim {
        claim: claim.to_string(),
        reason: reason.into(),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Whole seconds of `f`, or `None` outside the `i64` range.
fn float_seconds(f: f64) -> Option<i64> {
    // i64::MAX as f64 rounds up to 2^63, which no longer fits.
    const LIMIT: f64 = 9_223_372_036_854_775_808.0;
    let whole = f.trunc();
    (whole.is_finite() && (-LIMIT..LIMIT).contains(&whole)).then_some(whole as i64)
}
