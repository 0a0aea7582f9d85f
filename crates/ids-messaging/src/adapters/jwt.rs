//! # Unverified JWT Decoder
//!
//! Reads the claims segment of a compact JWT without checking its signature.
//! Use only behind a transport that already authenticates the peer, or in
//! tests; production deployments plug a verifying [`TokenVerifier`].

use crate::domain::{Claims, ClaimsError};
use crate::ports::{TokenVerificationError, TokenVerifier};
use async_trait::async_trait;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use ids_types::DynamicAttributeToken;

/// Decodes JWT claims, trusting the signature blindly.
#[derive(Debug, Default, Clone, Copy)]
pub struct UnverifiedJwtDecoder;

impl UnverifiedJwtDecoder {
    pub fn new() -> Self {
        Self
    }

    /// Decode the claims of a compact `header.claims.signature` JWT.
    pub fn decode_claims(token: &str) -> Result<Claims, ClaimsError> {
        let mut segments = token.split('.');
        let (Some(_), Some(claims), Some(_), None) = (
            segments.next(),
            segments.next(),
            segments.next(),
            segments.next(),
        ) else {
            return Err(ClaimsError::NotAJwt);
        };

        // Some issuers pad their segments despite RFC 7515.
        let raw = URL_SAFE_NO_PAD
            .decode(claims.trim_end_matches('='))
            .map_err(|e| ClaimsError::Encoding(e.to_string()))?;
        Claims::from_slice(&raw)
    }
}

#[async_trait]
impl TokenVerifier for UnverifiedJwtDecoder {
    async fn verify(&self, token: &DynamicAttributeToken) -> Result<Claims, TokenVerificationError> {
        if !token.is_jwt() {
            return Err(TokenVerificationError::UnsupportedFormat(
                token.token_format.to_string(),
            ));
        }
        Ok(Self::decode_claims(token.value())?)
    }
}

/// Assemble an unsigned JWT carrying `claims`. Test helper.
pub fn unsigned_jwt(claims: &serde_json::Value) -> String {
    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"none","typ":"JWT"}"#);
    let body = URL_SAFE_NO_PAD.encode(claims.to_string());
    format!("{}.{}.", header, body)
}
