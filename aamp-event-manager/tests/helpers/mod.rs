//! Shared listeners and schedulers for the event manager integration tests

#![allow(dead_code)]

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use aamp_event::{EventListener, EventPtr, EventType, ListenerHandle};
use aamp_event_manager::{SourceId, Task, TaskScheduler};
use parking_lot::Mutex;

/// Records every event it receives, with the receiving thread name
#[derive(Default)]
pub struct SpyListener {
    received: Mutex<Vec<(EventPtr, Option<String>)>>,
}

impl SpyListener {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn count(&self) -> usize {
        self.received.lock().len()
    }

    pub fn types(&self) -> Vec<EventType> {
        self.received.lock().iter().map(|(e, _)| e.event_type()).collect()
    }

    pub fn session_ids(&self) -> Vec<String> {
        self.received
            .lock()
            .iter()
            .map(|(e, _)| e.session_id().to_string())
            .collect()
    }

    pub fn thread_names(&self) -> Vec<Option<String>> {
        self.received.lock().iter().map(|(_, t)| t.clone()).collect()
    }

    pub fn last(&self) -> Option<EventPtr> {
        self.received.lock().last().map(|(e, _)| Arc::clone(e))
    }
}

impl EventListener for SpyListener {
    fn send_event(&self, event: &EventPtr) {
        let thread = std::thread::current().name().map(str::to_string);
        self.received.lock().push((Arc::clone(event), thread));
    }
}

pub fn handle(spy: &Arc<SpyListener>) -> ListenerHandle {
    Arc::clone(spy) as ListenerHandle
}

/// Runs each task inside `schedule_once`, before its id is returned
///
/// Exercises the path where a dispatch task fires before the sender has
/// recorded it as pending.
pub struct InlineScheduler {
    next_id: AtomicU32,
    current: Mutex<Option<SourceId>>,
}

impl InlineScheduler {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            next_id: AtomicU32::new(1),
            current: Mutex::new(None),
        })
    }
}

impl TaskScheduler for InlineScheduler {
    fn current_source_id(&self) -> Option<SourceId> {
        *self.current.lock()
    }

    fn schedule_once(&self, _priority: i32, task: Task) -> Option<SourceId> {
        let id = SourceId::new(self.next_id.fetch_add(1, Ordering::SeqCst))?;
        let previous = self.current.lock().replace(id);
        task();
        *self.current.lock() = previous;
        Some(id)
    }

    fn cancel(&self, _id: SourceId) -> bool {
        false
    }
}

/// Refuses every task
pub struct RefusingScheduler;

impl TaskScheduler for RefusingScheduler {
    fn current_source_id(&self) -> Option<SourceId> {
        None
    }

    fn schedule_once(&self, _priority: i32, _task: Task) -> Option<SourceId> {
        None
    }

    fn cancel(&self, _id: SourceId) -> bool {
        false
    }
}

/// A MainLoop whose tasks cannot be cancelled once queued
pub struct UncancellableLoop(pub aamp_event_manager::MainLoop);

impl TaskScheduler for UncancellableLoop {
    fn current_source_id(&self) -> Option<SourceId> {
        self.0.current_source_id()
    }

    fn schedule_once(&self, priority: i32, task: Task) -> Option<SourceId> {
        self.0.schedule_once(priority, task)
    }

    fn cancel(&self, _id: SourceId) -> bool {
        false
    }
}
