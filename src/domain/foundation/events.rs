//! Domain event infrastructure.
//!
//! - `EnvelopeId` - Unique identifier for a published domain event (deduplication)
//! - `EventMetadata` - Correlation context
//! - `EventEnvelope` - Transport wrapper for domain events
//! - `DomainEvent` - Trait that all domain events implement
//! - `domain_event!` - Macro to simplify DomainEvent implementations
//!
//! "Event" on its own means the live conference elsewhere in the crate; the
//! types here deal with domain events only.

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::fmt;
use uuid::Uuid;

use super::Timestamp;

// ============================================
// DomainEvent Trait
// ============================================

/// Trait that all domain events must implement.
///
/// Use the `domain_event!` macro to implement it.
pub trait DomainEvent: Send + Sync {
    /// Returns the event type string (e.g., "networking.request_created.v1").
    fn event_type(&self) -> &'static str;

    /// Returns the schema version number. MUST match the suffix of `event_type`.
    fn schema_version(&self) -> u32;

    /// Returns the ID of the aggregate that emitted this event.
    fn aggregate_id(&self) -> String;

    /// Returns the type of aggregate (e.g., "NetworkingRequest").
    fn aggregate_type(&self) -> &'static str;

    fn occurred_at(&self) -> Timestamp;

    fn envelope_id(&self) -> EnvelopeId;
}

/// Provides `to_envelope()` for every serializable domain event.
pub trait SerializableDomainEvent: DomainEvent + Serialize {
    fn to_envelope(&self) -> EventEnvelope {
        EventEnvelope::from_event(self)
    }
}

impl<T: DomainEvent + Serialize> SerializableDomainEvent for T {}

/// Implements `DomainEvent` from field names.
///
/// ```ignore
/// domain_event!(
///     RequestCreated,
///     event_type = "networking.request_created.v1",
///     schema_version = 1,
///     aggregate_id = request_id,
///     aggregate_type = "NetworkingRequest",
///     occurred_at = created_at,
///     envelope_id = envelope_id
/// );
/// ```
#[macro_export]
macro_rules! domain_event {
    (
        $event_name:ident,
        event_type = $event_type:expr,
        schema_version = $schema_version:expr,
        aggregate_id = $agg_id_field:ident,
        aggregate_type = $agg_type:expr,
        occurred_at = $occurred_field:ident,
        envelope_id = $envelope_id_field:ident
    ) => {
        impl $crate::domain::foundation::DomainEvent for $event_name {
            fn event_type(&self) -> &'static str {
                $event_type
            }

            fn schema_version(&self) -> u32 {
                $schema_version
            }

            fn aggregate_id(&self) -> String {
                self.$agg_id_field.to_string()
            }

            fn aggregate_type(&self) -> &'static str {
                $agg_type
            }

            fn occurred_at(&self) -> $crate::domain::foundation::Timestamp {
                self.$occurred_field
            }

            fn envelope_id(&self) -> $crate::domain::foundation::EnvelopeId {
                self.$envelope_id_field.clone()
            }
        }
    };
}

/// Unique identifier for a domain event instance.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EnvelopeId(String);

impl EnvelopeId {
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn from_string(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for EnvelopeId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for EnvelopeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Correlation context attached to every envelope.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventMetadata {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub correlation_id: Option<String>,

    /// Attendee whose command produced this event.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actor_id: Option<String>,
}

/// Transport envelope for domain events.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventEnvelope {
    pub envelope_id: EnvelopeId,
    pub event_type: String,
    pub schema_version: u32,
    pub aggregate_id: String,
    pub aggregate_type: String,
    pub occurred_at: Timestamp,
    pub payload: JsonValue,
    pub metadata: EventMetadata,
}

impl EventEnvelope {
    /// Wraps a domain event, serializing it as the payload.
    pub fn from_event<T>(event: &T) -> Self
    where
        T: DomainEvent + Serialize + ?Sized,
    {
        let event_type = event.event_type().to_string();
        let schema_version = Self::extract_version(&event_type);

        Self {
            envelope_id: event.envelope_id(),
            event_type,
            schema_version,
            aggregate_id: event.aggregate_id(),
            aggregate_type: event.aggregate_type().to_string(),
            occurred_at: event.occurred_at(),
            // Payloads are plain structs of ids, strings and timestamps.
            payload: serde_json::to_value(event).unwrap_or(JsonValue::Null),
            metadata: EventMetadata::default(),
        }
    }

    /// Extracts the version number from an event type suffix, defaulting to 1.
    pub(crate) fn extract_version(event_type: &str) -> u32 {
        event_type
            .rsplit_once(".v")
            .and_then(|(_, version_str)| version_str.parse::<u32>().ok())
            .unwrap_or(1)
    }

    pub fn with_correlation_id(mut self, id: impl Into<String>) -> Self {
        self.metadata.correlation_id = Some(id.into());
        self
    }

    pub fn with_actor_id(mut self, id: impl Into<String>) -> Self {
        self.metadata.actor_id = Some(id.into());
        self
    }

    /// Deserialize payload to a specific event type.
    pub fn payload_as<T: for<'de> Deserialize<'de>>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_value(self.payload.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Serialize, Deserialize)]
    struct Pinged {
        envelope_id: EnvelopeId,
        target: String,
        at: Timestamp,
    }

    domain_event!(
        Pinged,
        event_type = "test.pinged.v2",
        schema_version = 2,
        aggregate_id = target,
        aggregate_type = "Target",
        occurred_at = at,
        envelope_id = envelope_id
    );

    fn pinged() -> Pinged {
        Pinged {
            envelope_id: EnvelopeId::from_string("env-1"),
            target: "t-1".to_string(),
            at: Timestamp::now(),
        }
    }

    #[test]
    fn extract_version_reads_suffix() {
        assert_eq!(EventEnvelope::extract_version("a.b.v10"), 10);
        assert_eq!(EventEnvelope::extract_version("legacy.event"), 1);
    }

    #[test]
    fn to_envelope_copies_routing_fields() {
        let envelope = pinged().to_envelope();

        assert_eq!(envelope.envelope_id.as_str(), "env-1");
        assert_eq!(envelope.event_type, "test.pinged.v2");
        assert_eq!(envelope.schema_version, 2);
        assert_eq!(envelope.aggregate_id, "t-1");
        assert_eq!(envelope.aggregate_type, "Target");
    }

    #[test]
    fn payload_round_trips_through_envelope() {
        let envelope = pinged().to_envelope().with_correlation_id("corr");
        let restored: Pinged = envelope.payload_as().unwrap();

        assert_eq!(restored.target, "t-1");
        assert_eq!(envelope.metadata.correlation_id.as_deref(), Some("corr"));
    }
}
