//! # Dynamic Attribute Token
//!
//! The security token embedded in every message header. The token value is a
//! JWT issued by the trust service; this crate treats it as an opaque string.

use crate::reference::IdRef;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Token format reference for JSON Web Tokens.
pub const JWT_FORMAT: &str = "https://w3id.org/idsa/code/JWT";

fn token_type_name() -> String {
    "ids:DynamicAttributeToken".to_string()
}

/// A token carried in `ids:securityToken`.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DynamicAttributeToken {
    /// JSON-LD type, always `ids:DynamicAttributeToken`.
    #[serde(rename = "@type", default = "token_type_name")]
    pub type_name: String,

    /// Identifier of this token instance.
    #[serde(rename = "@id")]
    pub id: String,

    /// Encoding of `token_value`.
    #[serde(rename = "ids:tokenFormat")]
    pub token_format: IdRef,

    /// The encoded token.
    #[serde(rename = "ids:tokenValue")]
    pub token_value: String,
}

impl DynamicAttributeToken {
    /// Wrap an encoded JWT.
    pub fn jwt(token_value: impl Into<String>) -> Self {
        Self {
            type_name: token_type_name(),
            id: format!("{}/dat/{}", crate::AUTOGEN_PREFIX, Uuid::new_v4()),
            token_format: IdRef::new(JWT_FORMAT),
            token_value: token_value.into(),
        }
    }

    /// Whether the token is declared as a JWT (full or compact form).
    #[must_use]
    pub fn is_jwt(&self) -> bool {
        matches!(self.token_format.as_str(), JWT_FORMAT | "idsc:JWT")
    }

    /// The encoded token value.
    #[must_use]
    pub fn value(&self) -> &str {
        &self.token_value
    }
}

impl fmt::Debug for DynamicAttributeToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DynamicAttributeToken")
            .field("id", &self.id)
            .field("token_format", &self.token_format)
            .field("token_value", &"[REDACTED]")
            .finish()
    }
}
