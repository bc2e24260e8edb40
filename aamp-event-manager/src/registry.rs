//! Per-event-type listener registrations
//!
//! One bucket per [`EventType`] slot, the `AllEvents` slot holding wildcard
//! registrations. The registry is plain data; the manager guards it with its
//! own lock and only ever hands out snapshots to dispatch.

use aamp_event::{same_listener, EventType, ListenerHandle, MAX_EVENT_TYPES};

/// Listener registrations indexed by event type
pub struct ListenerRegistry {
    buckets: Vec<Vec<ListenerHandle>>,
}

impl ListenerRegistry {
    pub fn new() -> Self {
        Self {
            buckets: (0..MAX_EVENT_TYPES).map(|_| Vec::new()).collect(),
        }
    }

    /// Add a registration; the same listener may be registered repeatedly
    pub fn add(&mut self, event_type: EventType, listener: ListenerHandle) {
        self.buckets[event_type.index()].push(listener);
    }

    /// Remove one registration of `listener` for `event_type`
    ///
    /// Returns whether a registration was found.
    pub fn remove(&mut self, event_type: EventType, listener: &ListenerHandle) -> bool {
        let bucket = &mut self.buckets[event_type.index()];
        match bucket.iter().position(|l| same_listener(l, listener)) {
            Some(pos) => {
                bucket.remove(pos);
                true
            }
            None => false,
        }
    }

    /// Whether the exact slot for `event_type` has registrations
    pub fn has_registrations(&self, event_type: EventType) -> bool {
        !self.buckets[event_type.index()].is_empty()
    }

    /// Whether an event of this type would reach anyone (own slot or wildcard)
    pub fn has_any(&self, event_type: EventType) -> bool {
        self.has_registrations(event_type) || self.has_registrations(EventType::AllEvents)
    }

    /// Number of registrations in the exact slot for `event_type`
    pub fn count(&self, event_type: EventType) -> usize {
        self.buckets[event_type.index()].len()
    }

    /// Copy of every handle an event of `event_type` should reach
    ///
    /// Type-specific registrations come first, then wildcard ones. Duplicate
    /// registrations yield duplicate entries.
    pub fn snapshot(&self, event_type: EventType) -> Vec<ListenerHandle> {
        let specific = &self.buckets[event_type.index()];
        let wildcard = &self.buckets[EventType::AllEvents.index()];
        specific.iter().chain(wildcard.iter()).cloned().collect()
    }

    /// Drop every registration, returning how many there were
    pub fn clear(&mut self) -> usize {
        self.buckets
            .iter_mut()
            .map(|bucket| {
                let n = bucket.len();
                bucket.clear();
                n
            })
            .sum()
    }
}

impl Default for ListenerRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ListenerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let total: usize = self.buckets.iter().map(Vec::len).sum();
        f.debug_struct("ListenerRegistry")
            .field("registrations", &total)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aamp_event::listener_fn;
    use std::sync::Arc;

    #[test]
    fn test_add_and_remove() {
        let mut registry = ListenerRegistry::new();
        let listener = listener_fn(|_| {});

        assert!(!registry.has_registrations(EventType::Tuned));
        registry.add(EventType::Tuned, Arc::clone(&listener));
        assert!(registry.has_registrations(EventType::Tuned));

        assert!(registry.remove(EventType::Tuned, &listener));
        assert!(!registry.has_registrations(EventType::Tuned));
        assert!(!registry.remove(EventType::Tuned, &listener));
    }

    #[test]
    fn test_duplicate_registration_removed_once() {
        let mut registry = ListenerRegistry::new();
        let listener = listener_fn(|_| {});

        registry.add(EventType::Progress, Arc::clone(&listener));
        registry.add(EventType::Progress, Arc::clone(&listener));
        registry.remove(EventType::Progress, &listener);

        assert_eq!(registry.count(EventType::Progress), 1);
    }

    #[test]
    fn test_remove_only_matching_identity() {
        let mut registry = ListenerRegistry::new();
        let kept = listener_fn(|_| {});
        let other = listener_fn(|_| {});

        registry.add(EventType::Seeked, Arc::clone(&kept));
        assert!(!registry.remove(EventType::Seeked, &other));
        assert_eq!(registry.count(EventType::Seeked), 1);
    }

    #[test]
    fn test_wildcard_counts_for_any() {
        let mut registry = ListenerRegistry::new();
        registry.add(EventType::AllEvents, listener_fn(|_| {}));

        assert!(registry.has_any(EventType::Eos));
        assert!(!registry.has_registrations(EventType::Eos));
    }

    #[test]
    fn test_snapshot_includes_both_groups() {
        let mut registry = ListenerRegistry::new();
        let specific = listener_fn(|_| {});
        let wildcard = listener_fn(|_| {});
        registry.add(EventType::StateChanged, Arc::clone(&specific));
        registry.add(EventType::AllEvents, Arc::clone(&wildcard));

        let snapshot = registry.snapshot(EventType::StateChanged);
        assert_eq!(snapshot.len(), 2);
        assert!(snapshot.iter().any(|l| same_listener(l, &specific)));
        assert!(snapshot.iter().any(|l| same_listener(l, &wildcard)));

        assert_eq!(registry.snapshot(EventType::Eos).len(), 1);
    }

    #[test]
    fn test_clear() {
        let mut registry = ListenerRegistry::new();
        registry.add(EventType::Tuned, listener_fn(|_| {}));
        registry.add(EventType::AllEvents, listener_fn(|_| {}));

        assert_eq!(registry.clear(), 2);
        assert!(!registry.has_any(EventType::Tuned));
    }
}
