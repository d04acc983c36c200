//! The self-describing message envelope every event travels in.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use common::MessageId;
use serde::{Deserialize, Serialize};

use crate::error::{ContractError, Result};
use crate::events::IntegrationEvent;

/// Standard header keys attached to every published message.
pub mod headers {
    /// The message type tag, e.g. `"OrderCreated"`.
    pub const MESSAGE_TYPE: &str = "message-type";
    /// The schema version of the body.
    pub const MESSAGE_VERSION: &str = "message-version";
    /// The routing key the message was published with.
    pub const ROUTING_KEY: &str = "routing-key";
    /// The service that emitted the message.
    pub const SERVICE_NAME: &str = "service-name";
    /// Body content type; always `application/json` in this system.
    pub const CONTENT_TYPE: &str = "content-type";
    /// Saga correlation key (the order id).
    pub const CORRELATION_ID: &str = "correlation-id";
    /// Optional delivery priority.
    pub const PRIORITY: &str = "priority";
    /// Optional time-to-live in milliseconds.
    pub const TTL: &str = "ttl";
}

/// JSON content type value.
pub const CONTENT_TYPE_JSON: &str = "application/json";

/// A message envelope wrapping an integration event with its metadata.
///
/// The envelope is self-describing: a consumer can identify the schema and
/// check version compatibility from the envelope alone, without knowledge
/// of the publisher's internal types.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageEnvelope {
    /// Unique identifier for this message.
    pub message_id: MessageId,

    /// When the message was created.
    pub timestamp: DateTime<Utc>,

    /// The service that emitted the message.
    pub service_name: String,

    /// The message type tag (e.g., "OrderCreated").
    pub message_type: String,

    /// The schema version of the body.
    pub message_version: String,

    /// The routing key the message is addressed with.
    pub routing_key: String,

    /// Standard and custom headers.
    pub headers: HashMap<String, String>,

    /// The event payload as JSON.
    pub body: serde_json::Value,
}

impl MessageEnvelope {
    /// Creates a new message envelope builder.
    pub fn builder() -> MessageEnvelopeBuilder {
        MessageEnvelopeBuilder::default()
    }

    /// Returns a header value by key.
    pub fn header(&self, key: &str) -> Option<&str> {
        self.headers.get(key).map(String::as_str)
    }

    /// Returns the correlation id header, if present.
    pub fn correlation_id(&self) -> Option<&str> {
        self.header(headers::CORRELATION_ID)
    }

    /// Checks that every field a consumer relies on is populated.
    pub fn validate(&self) -> Result<()> {
        if self.service_name.is_empty() {
            return Err(ContractError::MissingField("service_name"));
        }
        if self.message_type.is_empty() {
            return Err(ContractError::MissingField("message_type"));
        }
        if self.message_version.is_empty() {
            return Err(ContractError::MissingField("message_version"));
        }
        if self.routing_key.is_empty() {
            return Err(ContractError::MissingField("routing_key"));
        }
        Ok(())
    }

    /// Deserializes the body as the given event schema.
    ///
    /// Fails if the envelope's declared type does not match the schema's tag.
    pub fn decode<E: IntegrationEvent>(&self) -> Result<E> {
        if self.message_type != E::message_type() {
            return Err(ContractError::TypeMismatch {
                expected: E::message_type().to_string(),
                actual: self.message_type.clone(),
            });
        }
        Ok(serde_json::from_value(self.body.clone())?)
    }
}

/// Builder for constructing message envelopes.
#[derive(Debug, Default)]
pub struct MessageEnvelopeBuilder {
    message_id: Option<MessageId>,
    timestamp: Option<DateTime<Utc>>,
    service_name: Option<String>,
    message_type: Option<String>,
    message_version: Option<String>,
    routing_key: Option<String>,
    headers: HashMap<String, String>,
    body: Option<serde_json::Value>,
}

impl MessageEnvelopeBuilder {
    /// Sets the message ID. If not set, a new ID will be generated.
    pub fn message_id(mut self, id: MessageId) -> Self {
        self.message_id = Some(id);
        self
    }

    /// Sets the timestamp. If not set, the current time will be used.
    pub fn timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    /// Sets the emitting service name.
    pub fn service_name(mut self, name: impl Into<String>) -> Self {
        self.service_name = Some(name.into());
        self
    }

    /// Sets the message type tag.
    pub fn message_type(mut self, message_type: impl Into<String>) -> Self {
        self.message_type = Some(message_type.into());
        self
    }

    /// Sets the schema version.
    pub fn message_version(mut self, version: impl Into<String>) -> Self {
        self.message_version = Some(version.into());
        self
    }

    /// Sets the routing key.
    pub fn routing_key(mut self, key: impl Into<String>) -> Self {
        self.routing_key = Some(key.into());
        self
    }

    /// Adds a header entry.
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    /// Sets the body from a serializable value.
    pub fn body<T: Serialize>(mut self, body: &T) -> Result<Self> {
        self.body = Some(serde_json::to_value(body)?);
        Ok(self)
    }

    /// Sets the body from a raw JSON value.
    pub fn body_raw(mut self, body: serde_json::Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Builds the envelope, filling the standard headers from the envelope
    /// fields themselves.
    ///
    /// # Panics
    ///
    /// Panics if required fields (service_name, message_type,
    /// message_version, routing_key, body) are not set.
    pub fn build(self) -> MessageEnvelope {
        self.try_build().expect("envelope is missing required fields")
    }

    /// Tries to build the envelope, returning None if required fields are missing.
    pub fn try_build(self) -> Option<MessageEnvelope> {
        let service_name = self.service_name?;
        let message_type = self.message_type?;
        let message_version = self.message_version?;
        let routing_key = self.routing_key?;

        let mut headers = self.headers;
        headers.insert(headers::MESSAGE_TYPE.to_string(), message_type.clone());
        headers.insert(
            headers::MESSAGE_VERSION.to_string(),
            message_version.clone(),
        );
        headers.insert(headers::ROUTING_KEY.to_string(), routing_key.clone());
        headers.insert(headers::SERVICE_NAME.to_string(), service_name.clone());
        headers
            .entry(headers::CONTENT_TYPE.to_string())
            .or_insert_with(|| CONTENT_TYPE_JSON.to_string());

        Some(MessageEnvelope {
            message_id: self.message_id.unwrap_or_default(),
            timestamp: self.timestamp.unwrap_or_else(Utc::now),
            service_name,
            message_type,
            message_version,
            routing_key,
            headers,
            body: self.body?,
        })
    }
}
