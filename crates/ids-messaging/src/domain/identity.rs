//! # Identity Context
//!
//! This node's identity as seen by the messaging core. Loading certificates
//! and deriving identifiers happens elsewhere; the result is passed in
//! explicitly and shared read-only.

use serde::{Deserialize, Serialize};

/// Audience every connector-issued token is expected to carry.
pub const DEFAULT_AUDIENCE: &str = "idsc:IDS_CONNECTORS_ALL";

/// Identity values threaded into header construction and token checks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityContext {
    /// URI of this connector (`ids:issuerConnector`).
    pub connector_id: String,
    /// URI of the agent this connector acts for (`ids:senderAgent`).
    pub sender_agent: String,
    /// Audience inbound tokens must name.
    pub expected_audience: String,
    /// Model version stamped on outgoing headers.
    pub model_version: String,
}

impl IdentityContext {
    /// Identity with the default audience and model version.
    pub fn new(connector_id: impl Into<String>, sender_agent: impl Into<String>) -> Self {
        Self {
            connector_id: connector_id.into(),
            sender_agent: sender_agent.into(),
            expected_audience: DEFAULT_AUDIENCE.to_string(),
            model_version: ids_types::DEFAULT_MODEL_VERSION.to_string(),
        }
    }

    /// Replace the expected audience.
    #[must_use]
    pub fn with_expected_audience(mut self, audience: impl Into<String>) -> Self {
        self.expected_audience = audience.into();
        self
    }
}
