//! The immutable event value shared between producers and listeners

use std::sync::Arc;

use serde::Serialize;

use crate::payload::EventPayload;
use crate::types::{EventType, PlayerState};

/// Shared handle to an event
///
/// The producer, the manager queue and every listener of one dispatch hold
/// the same allocation.
pub type EventPtr = Arc<Event>;

/// One player occurrence: its type, the session it belongs to and its data
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Event {
    event_type: EventType,
    session_id: String,
    payload: EventPayload,
}

impl Event {
    /// An event that carries no payload (tuned, end of stream, ...)
    pub fn new(event_type: EventType, session_id: impl Into<String>) -> Self {
        Self {
            event_type,
            session_id: session_id.into(),
            payload: EventPayload::None,
        }
    }

    /// An event whose type follows from its payload
    ///
    /// An empty payload falls back to `Tuned` and is logged at debug; use
    /// [`Event::new`] for payload-less events instead.
    pub fn from_payload(payload: EventPayload, session_id: impl Into<String>) -> Self {
        let event_type = payload.event_type().unwrap_or_else(|| {
            tracing::debug!("Empty payload, sending as {}", EventType::Tuned);
            EventType::Tuned
        });
        Self {
            event_type,
            session_id: session_id.into(),
            payload,
        }
    }

    /// Shorthand for a state change notification
    pub fn state_changed(state: PlayerState, session_id: impl Into<String>) -> Self {
        Self::from_payload(EventPayload::StateChanged { state }, session_id)
    }

    /// Wrap into the shared handle used for dispatch
    pub fn into_ptr(self) -> EventPtr {
        Arc::new(self)
    }

    pub fn event_type(&self) -> EventType {
        self.event_type
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn payload(&self) -> &EventPayload {
        &self.payload
    }

    /// New state when this is a state change event
    pub fn state(&self) -> Option<PlayerState> {
        match self.payload {
            EventPayload::StateChanged { state } => Some(state),
            _ => None,
        }
    }
}
