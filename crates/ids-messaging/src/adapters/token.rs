//! Token providers that do not talk to a trust service.

use crate::ports::{TokenProvider, TokenProviderError};
use async_trait::async_trait;
use ids_types::DynamicAttributeToken;

/// Hands out a fixed token, or a fixed error.
#[derive(Debug, Clone)]
pub struct StaticTokenProvider {
    token: Result<DynamicAttributeToken, TokenProviderError>,
}

impl StaticTokenProvider {
    /// Always return `token`.
    pub fn new(token: DynamicAttributeToken) -> Self {
        Self { token: Ok(token) }
    }

    /// Wrap a compact JWT.
    pub fn jwt(value: impl Into<String>) -> Self {
        Self::new(DynamicAttributeToken::jwt(value))
    }

    /// Always fail with `error`.
    pub fn failing(error: TokenProviderError) -> Self {
        Self { token: Err(error) }
    }
}

#[async_trait]
impl TokenProvider for StaticTokenProvider {
    async fn current_token(&self) -> Result<DynamicAttributeToken, TokenProviderError> {
        self.token.clone()
    }
}
