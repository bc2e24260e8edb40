//! # AAMP Core Events
//!
//! The event model shared by the player core and its listeners.
//!
//! ## Overview
//!
//! - [`Event`]: an immutable occurrence (type, session id, payload), shared
//!   as [`EventPtr`] between the producer and every listener of a dispatch
//! - [`EventType`]: dense type index with the `AllEvents` wildcard at slot 0
//! - [`EventListener`]: the single capability listeners implement
//! - [`legacy`]: projection onto the fixed-layout record read by older
//!   integrations
//!
//! ## Usage
//!
//! ```rust
//! use aamp_event::{listener_fn, Event, EventListener, EventType, PlayerState};
//!
//! let listener = listener_fn(|event| {
//!     if let Some(state) = event.state() {
//!         println!("state is now {:?}", state);
//!     }
//! });
//!
//! let event = Event::state_changed(PlayerState::Playing, "session-1").into_ptr();
//! assert_eq!(event.event_type(), EventType::StateChanged);
//! listener.send_event(&event);
//! ```

pub mod error;
pub mod event;
pub mod legacy;
pub mod listener;
pub mod payload;
pub mod types;

pub use error::{EventError, Result};
pub use event::{Event, EventPtr};
pub use legacy::{to_legacy_event, LegacyEvent, LegacyEventData};
pub use listener::{
    listener_fn, same_listener, EventListener, LegacyEventHandler, LegacyListener, ListenerHandle,
    ObjectListener,
};
pub use payload::EventPayload;
pub use types::{EventMode, EventType, PlayerState, MAX_EVENT_TYPES};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::{
        listener_fn, Event, EventListener, EventMode, EventPayload, EventPtr, EventType,
        ListenerHandle, PlayerState,
    };
}
