//! Configurable schema registry.
//!
//! Services resolve message versions and routing keys through the registry
//! rather than compile-time constants, so contracts can evolve through
//! configuration without rebuilding every consumer.

use std::collections::HashMap;

use crate::envelope::{MessageEnvelope, headers};
use crate::error::{ContractError, Result};
use crate::events::{IntegrationEvent, InventoryError, InventoryUpdated, OrderCreated};

/// Registry entry describing one message schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaEntry {
    /// The message type tag.
    pub message_type: String,

    /// The version this registry publishes and accepts.
    pub version: String,

    /// The routing key messages of this type are addressed with.
    pub routing_key: String,
}

impl SchemaEntry {
    /// Creates a new schema entry.
    pub fn new(
        message_type: impl Into<String>,
        version: impl Into<String>,
        routing_key: impl Into<String>,
    ) -> Self {
        Self {
            message_type: message_type.into(),
            version: version.into(),
            routing_key: routing_key.into(),
        }
    }
}

/// Maps message type tags to the schema versions and routing keys in use.
///
/// Both publishers and consumers hold a registry: publishers use it to stamp
/// envelopes, consumers use it to reject messages they cannot interpret.
#[derive(Debug, Clone, Default)]
pub struct SchemaRegistry {
    entries: HashMap<String, SchemaEntry>,
}

impl SchemaRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry with version-1 entries for the three saga
    /// contracts, each routed under its own type tag.
    pub fn with_default_contracts() -> Self {
        let mut registry = Self::new();
        for message_type in [
            OrderCreated::message_type(),
            InventoryUpdated::message_type(),
            InventoryError::message_type(),
        ] {
            registry.register(SchemaEntry::new(message_type, "1", message_type));
        }
        registry
    }

    /// Registers a schema entry, replacing any existing entry for the type.
    pub fn register(&mut self, entry: SchemaEntry) {
        self.entries.insert(entry.message_type.clone(), entry);
    }

    /// Returns the entry for a message type.
    pub fn entry(&self, message_type: &str) -> Option<&SchemaEntry> {
        self.entries.get(message_type)
    }

    /// Returns the routing key for a message type.
    pub fn routing_key(&self, message_type: &str) -> Result<&str> {
        self.entry(message_type)
            .map(|e| e.routing_key.as_str())
            .ok_or_else(|| ContractError::UnknownMessageType(message_type.to_string()))
    }

    /// Returns the number of registered schemas.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if no schemas are registered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Builds a complete envelope for an event, stamped with the registered
    /// version and routing key and correlated on the event's order id.
    pub fn envelope<E: IntegrationEvent>(
        &self,
        event: &E,
        service_name: &str,
    ) -> Result<MessageEnvelope> {
        let entry = self
            .entry(E::message_type())
            .ok_or_else(|| ContractError::UnknownMessageType(E::message_type().to_string()))?;

        Ok(MessageEnvelope::builder()
            .service_name(service_name)
            .message_type(entry.message_type.clone())
            .message_version(entry.version.clone())
            .routing_key(entry.routing_key.clone())
            .header(headers::CORRELATION_ID, event.order_id().to_string())
            .body(event)?
            .build())
    }

    /// Checks that an inbound envelope carries a schema this registry can
    /// interpret: a known type tag at a supported version.
    pub fn check_compatibility(&self, envelope: &MessageEnvelope) -> Result<()> {
        envelope.validate()?;

        let entry = self
            .entry(&envelope.message_type)
            .ok_or_else(|| ContractError::UnknownMessageType(envelope.message_type.clone()))?;

        if envelope.message_version != entry.version {
            return Err(ContractError::UnsupportedVersion {
                message_type: envelope.message_type.clone(),
                version: envelope.message_version.clone(),
                supported: entry.version.clone(),
            });
        }

        Ok(())
    }
}
