//! Player event manager
//!
//! Fans events out to registered listeners, either right away on the
//! calling thread or later through a task on the main loop.
//!
//! Registry, async queue and pending-callback table sit behind one mutex.
//! The mutex is never held while a listener runs: dispatch copies the
//! handles it needs, unlocks, then calls them. A listener may therefore add
//! or remove listeners, or send events, from inside its callback; such
//! changes only affect later dispatches.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Weak};

use aamp_event::{EventMode, EventPtr, EventType, ListenerHandle, PlayerState, MAX_EVENT_TYPES};
use parking_lot::Mutex;

use crate::config::EventManagerConfig;
use crate::error::Result;
use crate::registry::ListenerRegistry;
use crate::scheduler::{SourceId, Task, TaskScheduler};

/// Where an async dispatch task stands in the schedule/fire rendezvous
///
/// Scheduling returns the task id to the sender only after the task is
/// queued, so on a busy main loop the task may fire before the sender
/// records it. Whichever side arrives second removes the entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CallbackState {
    /// Recorded by the sender, not fired yet
    Pending,
    /// Fired before the sender recorded it
    Dispatched,
}

struct ManagerState {
    registry: ListenerRegistry,
    async_queue: VecDeque<EventPtr>,
    pending_callbacks: HashMap<SourceId, CallbackState>,
    event_stats: [u64; MAX_EVENT_TYPES],
    fake_tune: bool,
    async_tune: bool,
    event_priority: i32,
    player_state: PlayerState,
}

struct Inner {
    config: EventManagerConfig,
    scheduler: Arc<dyn TaskScheduler>,
    state: Mutex<ManagerState>,
}

/// Event bus between the player internals and external listeners
///
/// # Example
///
/// ```rust
/// use std::sync::Arc;
/// use aamp_event::{listener_fn, Event, EventMode, EventType, PlayerState};
/// use aamp_event_manager::{EventManager, MainLoop};
///
/// let main_loop = MainLoop::new();
/// let manager = EventManager::new(Arc::new(main_loop.clone()));
///
/// manager.add_event_listener(
///     EventType::StateChanged,
///     listener_fn(|event| println!("state: {:?}", event.state())),
/// );
///
/// // Off the main loop, so the event is queued ...
/// manager.send_event(&Event::state_changed(PlayerState::Playing, "s1").into_ptr(), EventMode::Default);
/// assert_eq!(manager.pending_event_count(), 1);
///
/// // ... and delivered when the loop runs
/// main_loop.run_until_idle();
/// assert_eq!(manager.pending_event_count(), 0);
/// ```
pub struct EventManager {
    inner: Arc<Inner>,
}

impl EventManager {
    /// Create an event manager with the default configuration
    pub fn new(scheduler: Arc<dyn TaskScheduler>) -> Self {
        Self::build(EventManagerConfig::default(), scheduler)
    }

    /// Create an event manager with a custom configuration
    pub fn with_config(config: EventManagerConfig, scheduler: Arc<dyn TaskScheduler>) -> Result<Self> {
        config.validate()?;
        Ok(Self::build(config, scheduler))
    }

    fn build(config: EventManagerConfig, scheduler: Arc<dyn TaskScheduler>) -> Self {
        let state = ManagerState {
            registry: ListenerRegistry::new(),
            async_queue: VecDeque::new(),
            pending_callbacks: HashMap::new(),
            event_stats: [0; MAX_EVENT_TYPES],
            fake_tune: false,
            async_tune: false,
            event_priority: config.idle_priority,
            player_state: PlayerState::Idle,
        };

        Self {
            inner: Arc::new(Inner {
                config,
                scheduler,
                state: Mutex::new(state),
            }),
        }
    }

    pub fn player_id(&self) -> i32 {
        self.inner.config.player_id
    }

    /// Register a listener for every event type
    pub fn add_listener_for_all_events(&self, listener: ListenerHandle) {
        self.add_event_listener(EventType::AllEvents, listener);
    }

    /// Remove one wildcard registration of `listener`
    pub fn remove_listener_for_all_events(&self, listener: &ListenerHandle) {
        self.remove_event_listener(EventType::AllEvents, listener);
    }

    /// Register a listener for one event type
    ///
    /// Registering the same listener twice makes it receive each event twice.
    pub fn add_event_listener(&self, event_type: EventType, listener: ListenerHandle) {
        tracing::info!(
            "[player {}] Adding listener for event type {}",
            self.player_id(),
            event_type
        );
        self.inner.state.lock().registry.add(event_type, listener);
    }

    /// Remove one registration of `listener` for `event_type`
    pub fn remove_event_listener(&self, event_type: EventType, listener: &ListenerHandle) {
        let removed = self.inner.state.lock().registry.remove(event_type, listener);
        if removed {
            tracing::info!(
                "[player {}] Removed listener for event type {}",
                self.player_id(),
                event_type
            );
        } else {
            tracing::debug!(
                "[player {}] No listener registration to remove for event type {}",
                self.player_id(),
                event_type
            );
        }
    }

    /// Whether a listener is registered for exactly this type
    ///
    /// Wildcard registrations are not considered.
    pub fn is_specific_event_listener_available(&self, event_type: EventType) -> bool {
        event_type.is_dispatchable() && self.inner.state.lock().registry.has_registrations(event_type)
    }

    /// Whether an event of this type would reach any listener
    pub fn is_event_listener_available(&self, event_type: EventType) -> bool {
        self.inner.is_event_listener_available(event_type)
    }

    /// Suppress everything except completion and end of stream
    pub fn set_fake_tune_flag(&self, fake_tune: bool) {
        self.inner.state.lock().fake_tune = fake_tune;
    }

    pub fn is_fake_tune(&self) -> bool {
        self.inner.state.lock().fake_tune
    }

    /// Route default-mode events through the main loop at raised priority
    pub fn set_async_tune_state(&self, enabled: bool) {
        let mut state = self.inner.state.lock();
        state.async_tune = enabled;
        state.event_priority = if enabled {
            self.inner.config.async_priority
        } else {
            self.inner.config.idle_priority
        };
    }

    pub fn is_async_tune_enabled(&self) -> bool {
        self.inner.state.lock().async_tune
    }

    /// Priority used for async dispatch tasks scheduled from now on
    pub fn event_priority(&self) -> i32 {
        self.inner.state.lock().event_priority
    }

    pub fn set_player_state(&self, player_state: PlayerState) {
        self.inner.state.lock().player_state = player_state;
    }

    pub fn player_state(&self) -> PlayerState {
        self.inner.state.lock().player_state
    }

    /// Deliver an event to its listeners
    ///
    /// `Sync` delivers before returning when called from inside the main
    /// loop, `Async` always queues, and `Default` queues when async tune is
    /// enabled or the caller is not on the main loop.
    pub fn send_event(&self, event: &EventPtr, mode: EventMode) {
        let event_type = event.event_type();
        if !event_type.is_dispatchable() {
            tracing::error!(
                "[player {}] Rejecting event with non-dispatchable type {}",
                self.player_id(),
                event_type
            );
            return;
        }

        let (fake_tune, async_tune, deliverable) = {
            let state = self.inner.state.lock();
            (
                state.fake_tune,
                state.async_tune,
                !state.player_state.is_terminal() && state.registry.has_any(event_type),
            )
        };

        if fake_tune && !passes_fake_tune(event) {
            tracing::trace!("Events are disabled for fake tune, dropping {}", event_type);
            return;
        }

        if !deliverable {
            return;
        }

        let in_main_loop = self.inner.scheduler.current_source_id().is_some();
        match mode {
            EventMode::Sync if in_main_loop => self.inner.dispatch_sync(event),
            EventMode::Async => self.inner.enqueue_async(event),
            _ if async_tune || !in_main_loop => self.inner.enqueue_async(event),
            _ => self.inner.dispatch_sync(event),
        }
    }

    /// Drop queued events and cancel their outstanding tasks
    ///
    /// Listener registrations are kept. A task already running at this
    /// point may still deliver the event it popped.
    pub fn flush_pending_events(&self) {
        self.inner.flush_pending_events();
    }

    /// Flush and release every listener registration
    ///
    /// Called on drop.
    pub fn teardown(&self) {
        self.inner.flush_pending_events();
        let released = self.inner.state.lock().registry.clear();
        tracing::debug!(
            "[player {}] Event manager torn down, released {} listener registrations",
            self.player_id(),
            released
        );
    }

    /// Events waiting for an async dispatch task
    pub fn pending_event_count(&self) -> usize {
        self.inner.state.lock().async_queue.len()
    }

    /// Entries in the schedule/fire rendezvous table
    pub fn pending_callback_count(&self) -> usize {
        self.inner.state.lock().pending_callbacks.len()
    }

    /// Synchronous dispatches of `event_type` since the last flush
    pub fn event_stats(&self, event_type: EventType) -> u64 {
        self.inner.state.lock().event_stats[event_type.index()]
    }

    #[cfg(test)]
    fn set_callback_as_pending(&self, id: SourceId) {
        self.inner.set_callback_as_pending(id);
    }

    #[cfg(test)]
    fn set_callback_as_dispatched(&self, id: SourceId) {
        self.inner.set_callback_as_dispatched(id);
    }

    #[cfg(test)]
    fn callback_state(&self, id: SourceId) -> Option<CallbackState> {
        self.inner.state.lock().pending_callbacks.get(&id).copied()
    }
}

impl Drop for EventManager {
    fn drop(&mut self) {
        self.teardown();
    }
}

impl std::fmt::Debug for EventManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.inner.state.lock();
        f.debug_struct("EventManager")
            .field("player_id", &self.inner.config.player_id)
            .field("player_state", &state.player_state)
            .field("registry", &state.registry)
            .field("pending_events", &state.async_queue.len())
            .finish()
    }
}

/// During a fake tune only completion and end of stream get through
fn passes_fake_tune(event: &EventPtr) -> bool {
    match event.event_type() {
        EventType::Eos => true,
        EventType::StateChanged => event.state() == Some(PlayerState::Complete),
        _ => false,
    }
}

impl Inner {
    fn is_event_listener_available(&self, event_type: EventType) -> bool {
        event_type.is_dispatchable() && self.state.lock().registry.has_any(event_type)
    }

    /// Invoke every listener for the event on the calling thread
    fn dispatch_sync(&self, event: &EventPtr) {
        let event_type = event.event_type();
        let listeners = {
            let mut state = self.state.lock();
            // Queued events can reach this point after release
            if state.player_state.is_terminal() {
                return;
            }

            state.event_stats[event_type.index()] += 1;
            match event_type {
                EventType::Progress => {}
                EventType::StateChanged => tracing::warn!(
                    "[player {}] (type={})(state={:?})(session_id={})",
                    self.config.player_id,
                    event_type.index(),
                    event.state(),
                    event.session_id()
                ),
                _ => tracing::info!(
                    "[player {}] (type={})(session_id={})",
                    self.config.player_id,
                    event_type.index(),
                    event.session_id()
                ),
            }

            state.registry.snapshot(event_type)
        };

        for listener in &listeners {
            listener.send_event(event);
        }
    }

    /// Queue the event and schedule one main loop task for it
    fn enqueue_async(self: &Arc<Self>, event: &EventPtr) {
        let priority = {
            let mut state = self.state.lock();
            if state.player_state.is_terminal() {
                return;
            }
            tracing::info!(
                "[player {}] Sending event {} to async queue",
                self.config.player_id,
                event.event_type()
            );
            state.async_queue.push_back(Arc::clone(event));
            state.event_priority
        };

        let weak: Weak<Inner> = Arc::downgrade(self);
        let task: Task = Box::new(move || {
            if let Some(inner) = weak.upgrade() {
                inner.run_async_task();
            }
        });

        match self.scheduler.schedule_once(priority, task) {
            Some(id) => self.set_callback_as_pending(id),
            None => tracing::warn!(
                "[player {}] Failed to schedule async dispatch, event stays queued",
                self.config.player_id
            ),
        }
    }

    /// Body of an async dispatch task
    fn run_async_task(&self) {
        if let Some(id) = self.scheduler.current_source_id() {
            self.set_callback_as_dispatched(id);
        }
        self.async_event();
    }

    /// Pop one queued event and dispatch it if anyone still listens
    fn async_event(&self) {
        let event = self.state.lock().async_queue.pop_front();
        let Some(event) = event else {
            return;
        };

        if self.is_event_listener_available(event.event_type())
            && !self.state.lock().player_state.is_terminal()
        {
            self.dispatch_sync(&event);
        }
    }

    fn set_callback_as_pending(&self, id: SourceId) {
        let mut state = self.state.lock();
        match state.pending_callbacks.remove(&id) {
            Some(CallbackState::Dispatched) => {
                tracing::trace!("Callback {} already dispatched, erasing it", id);
            }
            Some(CallbackState::Pending) => {
                tracing::error!("Callback {} recorded as pending twice", id);
            }
            None => {
                tracing::trace!("Callback {} added as pending", id);
                state.pending_callbacks.insert(id, CallbackState::Pending);
            }
        }
    }

    fn set_callback_as_dispatched(&self, id: SourceId) {
        let mut state = self.state.lock();
        match state.pending_callbacks.remove(&id) {
            Some(CallbackState::Pending) => {
                tracing::trace!("Callback {} was pending, erasing it", id);
            }
            Some(CallbackState::Dispatched) => {
                tracing::error!("Callback {} dispatched twice", id);
            }
            None => {
                tracing::trace!("Callback {} not recorded yet, marking as dispatched", id);
                state.pending_callbacks.insert(id, CallbackState::Dispatched);
            }
        }
    }

    fn flush_pending_events(&self) {
        let mut state = self.state.lock();
        state.async_queue.clear();

        if !state.pending_callbacks.is_empty() {
            tracing::warn!(
                "[player {}] Flushing with {} pending async callbacks",
                self.config.player_id,
                state.pending_callbacks.len()
            );
            // TaskScheduler::cancel never calls back into the manager
            for (id, callback) in state.pending_callbacks.drain() {
                if callback == CallbackState::Pending {
                    tracing::warn!("Removing callback {}", id);
                    self.scheduler.cancel(id);
                }
            }
        }

        state.event_stats = [0; MAX_EVENT_TYPES];
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scheduler::MainLoop;
    use aamp_event::{listener_fn, Event};
    use std::sync::atomic::{AtomicUsize, Ordering};

    const SESSION: &str = "6e3c49cb-6254-4324-9f5e-bddef465bdff";

    fn counting_listener() -> (ListenerHandle, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let listener = listener_fn(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        (listener, calls)
    }

    fn manager() -> (EventManager, MainLoop) {
        let main_loop = MainLoop::new();
        (EventManager::new(Arc::new(main_loop.clone())), main_loop)
    }

    #[test]
    fn test_no_listener_available_initially() {
        let (manager, _main_loop) = manager();
        for ty in EventType::ALL {
            assert!(!manager.is_event_listener_available(*ty));
            assert!(!manager.is_specific_event_listener_available(*ty));
        }
    }

    #[test]
    fn test_sentinel_excluded_from_availability() {
        let (manager, _main_loop) = manager();
        let (listener, _) = counting_listener();
        manager.add_listener_for_all_events(listener);

        assert!(!manager.is_event_listener_available(EventType::AllEvents));
        assert!(!manager.is_specific_event_listener_available(EventType::AllEvents));
        assert!(manager.is_event_listener_available(EventType::Tuned));
    }

    #[test]
    fn test_async_tune_raises_priority() {
        let (manager, _main_loop) = manager();
        assert_eq!(manager.event_priority(), crate::scheduler::PRIORITY_DEFAULT_IDLE);

        manager.set_async_tune_state(true);
        assert!(manager.is_async_tune_enabled());
        assert_eq!(manager.event_priority(), crate::scheduler::MAX_EVENT_PRIORITY);

        manager.set_async_tune_state(false);
        assert_eq!(manager.event_priority(), crate::scheduler::PRIORITY_DEFAULT_IDLE);
    }

    #[test]
    fn test_with_config_validates() {
        let main_loop = MainLoop::new();
        let bad = EventManagerConfig::new().with_priorities(-100, 100);
        assert!(EventManager::with_config(bad, Arc::new(main_loop)).is_err());
    }

    #[test]
    fn test_callback_pending_then_dispatched() {
        let (manager, _main_loop) = manager();
        let id = SourceId::new(10).unwrap();

        manager.set_callback_as_pending(id);
        assert_eq!(manager.callback_state(id), Some(CallbackState::Pending));

        manager.set_callback_as_dispatched(id);
        assert_eq!(manager.callback_state(id), None);
        assert_eq!(manager.pending_callback_count(), 0);
    }

    #[test]
    fn test_callback_dispatched_then_pending() {
        let (manager, _main_loop) = manager();
        let id = SourceId::new(11).unwrap();

        manager.set_callback_as_dispatched(id);
        assert_eq!(manager.callback_state(id), Some(CallbackState::Dispatched));

        manager.set_callback_as_pending(id);
        assert_eq!(manager.callback_state(id), None);
        assert_eq!(manager.pending_callback_count(), 0);
    }

    #[test]
    fn test_async_task_completes_rendezvous() {
        let (manager, main_loop) = manager();
        let (listener, calls) = counting_listener();
        manager.add_event_listener(EventType::Tuned, listener);

        manager.send_event(&Event::new(EventType::Tuned, SESSION).into_ptr(), EventMode::Async);
        assert_eq!(manager.pending_callback_count(), 1);

        main_loop.run_until_idle();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(manager.pending_callback_count(), 0);
    }

    #[test]
    fn test_stats_count_sync_dispatches_and_reset_on_flush() {
        let (manager, main_loop) = manager();
        let (listener, _) = counting_listener();
        manager.add_event_listener(EventType::Seeked, listener);

        for _ in 0..3 {
            manager.send_event(&Event::new(EventType::Seeked, SESSION).into_ptr(), EventMode::Async);
        }
        main_loop.run_until_idle();
        assert_eq!(manager.event_stats(EventType::Seeked), 3);

        manager.flush_pending_events();
        assert_eq!(manager.event_stats(EventType::Seeked), 0);
    }

    #[test]
    fn test_flush_keeps_listeners_teardown_releases() {
        let (manager, _main_loop) = manager();
        let (listener, _) = counting_listener();
        manager.add_event_listener(EventType::Eos, listener);

        manager.flush_pending_events();
        assert!(manager.is_specific_event_listener_available(EventType::Eos));

        manager.teardown();
        assert!(!manager.is_specific_event_listener_available(EventType::Eos));
    }

    #[test]
    fn test_task_after_drop_is_noop() {
        let main_loop = MainLoop::new();
        let manager = EventManager::new(Arc::new(main_loop.clone()));
        let (listener, calls) = counting_listener();
        manager.add_event_listener(EventType::Tuned, listener);

        manager.send_event(&Event::new(EventType::Tuned, SESSION).into_ptr(), EventMode::Async);
        // Teardown cancels the queued task
        drop(manager);
        assert_eq!(main_loop.pending_count(), 0);
        assert_eq!(main_loop.run_until_idle(), 0);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }
}
