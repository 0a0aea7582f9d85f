//! Messaging configuration with validation.
//!
//! Loading from files or the environment is the embedding application's job;
//! this module only defines the shape, defaults and consistency checks.

use crate::domain::identity::{IdentityContext, DEFAULT_AUDIENCE};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Default maximum inbound body size (10 MiB).
pub const DEFAULT_MAX_MESSAGE_SIZE: usize = 10 * 1024 * 1024;

/// Main messaging configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MessagingConfig {
    /// This node's identity
    pub identity: IdentityConfig,
    /// Inbound endpoint settings
    pub inbound: InboundConfig,
    /// Outbound transport settings
    pub outbound: OutboundConfig,
}

impl MessagingConfig {
    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.identity.connector_id.trim().is_empty() {
            return Err(ConfigError::MissingIdentity("connector_id"));
        }
        if self.identity.sender_agent.trim().is_empty() {
            return Err(ConfigError::MissingIdentity("sender_agent"));
        }
        if self.identity.expected_audience.trim().is_empty() {
            return Err(ConfigError::MissingIdentity("expected_audience"));
        }
        if self.identity.model_version.trim().is_empty() {
            return Err(ConfigError::MissingIdentity("model_version"));
        }

        if self.inbound.max_message_size == 0 {
            return Err(ConfigError::InvalidLimit(
                "max_message_size cannot be 0".into(),
            ));
        }
        if !self.inbound.path.starts_with('/') {
            return Err(ConfigError::InvalidPath(self.inbound.path.clone()));
        }

        if self.outbound.request_timeout_ms == 0 {
            return Err(ConfigError::InvalidTimeout(
                "request_timeout_ms cannot be 0".into(),
            ));
        }
        if self.outbound.connect_timeout_ms == 0 {
            return Err(ConfigError::InvalidTimeout(
                "connect_timeout_ms cannot be 0".into(),
            ));
        }

        Ok(())
    }

    /// Identity threaded into the dispatcher, pipeline and validator.
    pub fn identity_context(&self) -> IdentityContext {
        IdentityContext {
            connector_id: self.identity.connector_id.clone(),
            sender_agent: self.identity.sender_agent.clone(),
            expected_audience: self.identity.expected_audience.clone(),
            model_version: self.identity.model_version.clone(),
        }
    }
}

/// Identity section
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IdentityConfig {
    /// URI of this connector
    pub connector_id: String,
    /// URI of the agent this connector acts for
    pub sender_agent: String,
    /// Audience inbound tokens must name
    pub expected_audience: String,
    /// Information model version stamped on outgoing headers
    pub model_version: String,
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            connector_id: String::new(),
            sender_agent: String::new(),
            expected_audience: DEFAULT_AUDIENCE.to_string(),
            model_version: ids_types::DEFAULT_MODEL_VERSION.to_string(),
        }
    }
}

/// Inbound endpoint section
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InboundConfig {
    /// Largest accepted request body in bytes
    pub max_message_size: usize,
    /// Route the endpoint is mounted on
    pub path: String,
}

impl Default for InboundConfig {
    fn default() -> Self {
        Self {
            max_message_size: DEFAULT_MAX_MESSAGE_SIZE,
            path: "/".to_string(),
        }
    }
}

/// Outbound transport section
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutboundConfig {
    /// Whole-request timeout in milliseconds
    pub request_timeout_ms: u64,
    /// Connection establishment timeout in milliseconds
    pub connect_timeout_ms: u64,
}

impl OutboundConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }
}

impl Default for OutboundConfig {
    fn default() -> Self {
        Self {
            request_timeout_ms: 30_000,
            connect_timeout_ms: 5_000,
        }
    }
}

/// Configuration errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// A required identity value is empty
    #[error("missing identity value: {0}")]
    MissingIdentity(&'static str),
    /// Invalid size limit
    #[error("invalid limit: {0}")]
    InvalidLimit(String),
    /// Inbound path must be absolute
    #[error("invalid inbound path: {0:?}")]
    InvalidPath(String),
    /// Invalid timeout value
    #[error("invalid timeout: {0}")]
    InvalidTimeout(String),
}
