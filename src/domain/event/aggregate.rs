//! Event aggregate.
//!
//! An event owns the ordered catalogue of networking slot tokens. Attendee
//! availability and every networking request are validated against it.

use std::collections::HashSet;

use crate::domain::foundation::{DomainError, ErrorCode, EventId, Timestamp};
use serde::{Deserialize, Serialize};

use super::{EventCode, NetworkingWindow, TimeSlot};

/// Maximum length for an event name.
pub const MAX_NAME_LENGTH: usize = 200;

/// Live event with its networking slot catalogue.
///
/// # Invariants
///
/// - `name` is non-empty and at most 200 characters
/// - `networking_slots` contains no duplicates and keeps declaration order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    id: EventId,
    code: EventCode,
    name: String,
    networking_slots: Vec<TimeSlot>,
    is_active: bool,
    created_at: Timestamp,
}

impl Event {
    /// Create a new active event. Duplicate slot tokens are collapsed.
    ///
    /// # Errors
    ///
    /// - `ValidationFailed` if the name is empty or too long
    pub fn new(
        id: EventId,
        code: EventCode,
        name: impl Into<String>,
        networking_slots: Vec<TimeSlot>,
    ) -> Result<Self, DomainError> {
        let name = name.into().trim().to_string();
        if name.is_empty() {
            return Err(DomainError::validation("name", "Event name cannot be empty"));
        }
        if name.chars().count() > MAX_NAME_LENGTH {
            return Err(DomainError::validation(
                "name",
                format!("Event name cannot exceed {} characters", MAX_NAME_LENGTH),
            ));
        }

        let mut seen = HashSet::new();
        let networking_slots = networking_slots
            .into_iter()
            .filter(|slot| seen.insert(slot.clone()))
            .collect();

        Ok(Self {
            id,
            code,
            name,
            networking_slots,
            is_active: true,
            created_at: Timestamp::now(),
        })
    }

    /// Create an event whose slots are generated from its networking window.
    pub fn with_window(
        id: EventId,
        code: EventCode,
        name: impl Into<String>,
        window: NetworkingWindow,
    ) -> Result<Self, DomainError> {
        Self::new(id, code, name, window.slots())
    }

    /// Reconstitute an event from persistence (no validation).
    pub fn reconstitute(
        id: EventId,
        code: EventCode,
        name: String,
        networking_slots: Vec<TimeSlot>,
        is_active: bool,
        created_at: Timestamp,
    ) -> Self {
        Self {
            id,
            code,
            name,
            networking_slots,
            is_active,
            created_at,
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Accessors
    // ─────────────────────────────────────────────────────────────────────────

    pub fn id(&self) -> &EventId {
        &self.id
    }

    pub fn code(&self) -> &EventCode {
        &self.code
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Valid slot tokens in declaration order.
    pub fn networking_slots(&self) -> &[TimeSlot] {
        &self.networking_slots
    }

    pub fn is_active(&self) -> bool {
        self.is_active
    }

    pub fn created_at(&self) -> &Timestamp {
        &self.created_at
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Slot catalogue
    // ─────────────────────────────────────────────────────────────────────────

    pub fn is_valid_slot(&self, slot: &TimeSlot) -> bool {
        self.networking_slots.contains(slot)
    }

    /// Fails with `InvalidSlot` unless `slot` belongs to this event.
    pub fn ensure_valid_slot(&self, slot: &TimeSlot) -> Result<(), DomainError> {
        if self.is_valid_slot(slot) {
            Ok(())
        } else {
            Err(invalid_slot(slot))
        }
    }

    /// Validates a requested availability set and returns it deduplicated in
    /// event order.
    ///
    /// # Errors
    ///
    /// - `InvalidSlot` naming the first token that is not part of this event
    pub fn normalize_availability(&self, slots: &[TimeSlot]) -> Result<Vec<TimeSlot>, DomainError> {
        for slot in slots {
            self.ensure_valid_slot(slot)?;
        }
        Ok(self.in_event_order(slots))
    }

    /// Sorts `slots` into event order, dropping tokens this event does not know.
    pub fn in_event_order<'a, I>(&self, slots: I) -> Vec<TimeSlot>
    where
        I: IntoIterator<Item = &'a TimeSlot>,
    {
        let wanted: HashSet<&TimeSlot> = slots.into_iter().collect();
        self.networking_slots
            .iter()
            .filter(|slot| wanted.contains(slot))
            .cloned()
            .collect()
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Lifecycle
    // ─────────────────────────────────────────────────────────────────────────

    pub fn deactivate(&mut self) {
        self.is_active = false;
    }

    pub fn ensure_active(&self) -> Result<(), DomainError> {
        if self.is_active {
            Ok(())
        } else {
            Err(DomainError::new(
                ErrorCode::EventInactive,
                format!("Event {} is not active", self.code),
            ))
        }
    }
}

fn invalid_slot(slot: &TimeSlot) -> DomainError {
    DomainError::new(
        ErrorCode::InvalidSlot,
        format!("'{}' is not a networking slot of this event", slot),
    )
    .with_detail("field", "time_slot")
    .with_detail("slot", slot.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveTime;

    fn slot(s: &str) -> TimeSlot {
        TimeSlot::new(s).unwrap()
    }

    fn expo() -> Event {
        Event::new(
            EventId::new(),
            EventCode::parse("A1B2C3D4").unwrap(),
            "Expo 2026",
            vec![slot("10:00-10:30"), slot("10:30-11:00"), slot("11:00-11:30")],
        )
        .unwrap()
    }

    #[test]
    fn new_rejects_blank_name() {
        let result = Event::new(EventId::new(), EventCode::generate(), "  ", vec![]);
        assert_eq!(result.unwrap_err().code, ErrorCode::ValidationFailed);
    }

    #[test]
    fn new_collapses_duplicate_slots() {
        let event = Event::new(
            EventId::new(),
            EventCode::generate(),
            "Expo",
            vec![slot("a"), slot("b"), slot("a")],
        )
        .unwrap();
        assert_eq!(event.networking_slots(), &[slot("a"), slot("b")]);
    }

    #[test]
    fn with_window_generates_slots() {
        let window =
            NetworkingWindow::new(NaiveTime::from_hms_opt(17, 0, 0).unwrap(), 0.5).unwrap();
        let event = Event::with_window(EventId::new(), EventCode::generate(), "Expo", window)
            .unwrap();
        assert_eq!(event.networking_slots(), &[slot("17:15"), slot("17:30")]);
    }

    #[test]
    fn normalize_availability_orders_and_dedupes() {
        let event = expo();
        let normalized = event
            .normalize_availability(&[slot("11:00-11:30"), slot("10:00-10:30"), slot("11:00-11:30")])
            .unwrap();
        assert_eq!(normalized, vec![slot("10:00-10:30"), slot("11:00-11:30")]);
    }

    #[test]
    fn normalize_availability_rejects_unknown_slot() {
        let err = expo()
            .normalize_availability(&[slot("10:00-10:30"), slot("23:00")])
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidSlot);
        assert_eq!(err.details.get("slot"), Some(&"23:00".to_string()));
    }

    #[test]
    fn empty_availability_is_valid() {
        assert!(expo().normalize_availability(&[]).unwrap().is_empty());
    }

    #[test]
    fn inactive_event_fails_ensure_active() {
        let mut event = expo();
        event.deactivate();
        assert_eq!(event.ensure_active().unwrap_err().code, ErrorCode::EventInactive);
    }
}
