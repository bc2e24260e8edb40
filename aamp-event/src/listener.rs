//! Listener capability
//!
//! Anything that wants events implements [`EventListener`]. The two
//! historical listener flavours are plain implementations of it:
//! [`ObjectListener`] receives the event object, [`LegacyListener`] receives
//! the flattened [`LegacyEvent`] record.

use std::sync::Arc;

use crate::event::EventPtr;
use crate::legacy::{to_legacy_event, LegacyEvent};

/// Receiver of player events
///
/// Called on the thread that performs the dispatch, with no manager lock
/// held, so implementations may register or remove listeners and send
/// further events.
pub trait EventListener: Send + Sync {
    fn send_event(&self, event: &EventPtr);
}

/// Shared listener handle; identity is the allocation it points to
pub type ListenerHandle = Arc<dyn EventListener>;

/// Whether two handles refer to the same listener object
pub fn same_listener(a: &ListenerHandle, b: &ListenerHandle) -> bool {
    // Compare data pointers only, vtable pointers may differ across codegen units
    std::ptr::eq(
        Arc::as_ptr(a) as *const (),
        Arc::as_ptr(b) as *const (),
    )
}

/// Listener backed by a closure over the event object
pub struct ObjectListener<F>
where
    F: Fn(&EventPtr) + Send + Sync,
{
    handler: F,
}

impl<F> ObjectListener<F>
where
    F: Fn(&EventPtr) + Send + Sync,
{
    pub fn new(handler: F) -> Self {
        Self { handler }
    }
}

impl<F> EventListener for ObjectListener<F>
where
    F: Fn(&EventPtr) + Send + Sync,
{
    fn send_event(&self, event: &EventPtr) {
        (self.handler)(event);
    }
}

/// Build a shared listener handle from a closure
pub fn listener_fn<F>(handler: F) -> ListenerHandle
where
    F: Fn(&EventPtr) + Send + Sync + 'static,
{
    Arc::new(ObjectListener::new(handler))
}

/// Consumer of the legacy event record
pub trait LegacyEventHandler: Send + Sync {
    fn event(&self, event: &LegacyEvent<'_>);
}

impl<F> LegacyEventHandler for F
where
    F: Fn(&LegacyEvent<'_>) + Send + Sync,
{
    fn event(&self, event: &LegacyEvent<'_>) {
        self(event)
    }
}

/// Listener that converts each event to its legacy record first
pub struct LegacyListener<H: LegacyEventHandler> {
    handler: H,
}

impl<H: LegacyEventHandler> LegacyListener<H> {
    pub fn new(handler: H) -> Self {
        Self { handler }
    }

    pub fn handler(&self) -> &H {
        &self.handler
    }
}

impl<H: LegacyEventHandler> EventListener for LegacyListener<H> {
    fn send_event(&self, event: &EventPtr) {
        let legacy = to_legacy_event(event);
        self.handler.event(&legacy);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::Event;
    use crate::legacy::LegacyEventData;
    use crate::types::{EventType, PlayerState};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    #[test]
    fn test_object_listener_receives_event() {
        let calls = Arc::new(AtomicUsize::new(0));
        let seen = Arc::clone(&calls);
        let listener = listener_fn(move |event| {
            assert_eq!(event.event_type(), EventType::Tuned);
            seen.fetch_add(1, Ordering::SeqCst);
        });

        listener.send_event(&Event::new(EventType::Tuned, "s").into_ptr());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_legacy_listener_converts() {
        let states = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&states);
        let listener = LegacyListener::new(move |event: &LegacyEvent<'_>| {
            if let LegacyEventData::StateChanged { state } = event.data {
                sink.lock().unwrap().push(state);
            }
        });

        listener.send_event(&Event::state_changed(PlayerState::Playing, "s").into_ptr());
        assert_eq!(*states.lock().unwrap(), vec![PlayerState::Playing]);
    }

    #[test]
    fn test_listener_identity() {
        let a = listener_fn(|_| {});
        let b = listener_fn(|_| {});
        let a2 = Arc::clone(&a);

        assert!(same_listener(&a, &a2));
        assert!(!same_listener(&a, &b));
    }
}
