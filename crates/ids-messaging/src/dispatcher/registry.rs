//! # Handler Registry
//!
//! Maps each message type to exactly one handler. The table is filled once
//! during startup and frozen inside the dispatcher; lookups need no locking.

use crate::dispatcher::handler::MessageHandler;
use ids_types::MessageType;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use tracing::info;

/// Handler registration failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistrationError {
    /// A handler is already registered for this type.
    #[error("A handler for {0} is already registered")]
    DuplicateHandler(MessageType),
}

/// Message type to handler table.
#[derive(Default, Clone)]
pub struct HandlerRegistry {
    handlers: HashMap<MessageType, Arc<dyn MessageHandler>>,
}

impl HandlerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handler` for `message_type`.
    ///
    /// # Errors
    ///
    /// * `RegistrationError::DuplicateHandler` - the type already has a handler
    pub fn register(
        &mut self,
        message_type: MessageType,
        handler: Arc<dyn MessageHandler>,
    ) -> Result<(), RegistrationError> {
        if self.handlers.contains_key(&message_type) {
            return Err(RegistrationError::DuplicateHandler(message_type));
        }
        info!(message_type = %message_type, "Registered message handler");
        self.handlers.insert(message_type, handler);
        Ok(())
    }

    /// Handler for `message_type`, if any.
    pub fn get(&self, message_type: &MessageType) -> Option<&Arc<dyn MessageHandler>> {
        self.handlers.get(message_type)
    }

    #[must_use]
    pub fn contains(&self, message_type: &MessageType) -> bool {
        self.handlers.contains_key(message_type)
    }

    /// Registered types, sorted.
    pub fn message_types(&self) -> Vec<MessageType> {
        let mut types: Vec<_> = self.handlers.keys().cloned().collect();
        types.sort();
        types
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

impl std::fmt::Debug for HandlerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HandlerRegistry")
            .field("message_types", &self.message_types())
            .finish()
    }
}
