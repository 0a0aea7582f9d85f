//! # JSON-LD References
//!
//! Connectors, agents, contracts and artifacts are referenced by URI.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A JSON-LD node reference serialized as `{"@id": "<uri>"}`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IdRef {
    /// The referenced URI.
    #[serde(rename = "@id")]
    pub id: String,
}

impl IdRef {
    /// Create a reference to the given URI.
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }

    /// The referenced URI.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.id
    }
}

impl From<&str> for IdRef {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for IdRef {
    fn from(id: String) -> Self {
        Self { id }
    }
}

impl fmt::Display for IdRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.id)
    }
}
