//! Cooperative main loop scheduling
//!
//! Listener callbacks run on a single cooperative loop (the player's main
//! loop). The event manager only needs three things from it, captured by
//! [`TaskScheduler`]: queue a one-shot task, tell whether the calling thread
//! is currently running one of its tasks, and cancel a queued task.
//!
//! [`MainLoop`] is the in-process implementation: a priority-ordered queue
//! drained on one thread, either driven by hand (`iteration`,
//! `run_until_idle`) or on its own thread (`spawn`).

use std::cell::Cell;
use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap};
use std::num::NonZeroU32;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use parking_lot::{Condvar, Mutex};

use crate::error::SchedulerError;

/// Priority of ordinary idle work
pub const PRIORITY_DEFAULT_IDLE: i32 = 200;

/// Most urgent priority used for event delivery
pub const MAX_EVENT_PRIORITY: i32 = -70;

/// A one-shot unit of main loop work
pub type Task = Box<dyn FnOnce() + Send + 'static>;

/// Identifier of a scheduled task, never zero
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SourceId(NonZeroU32);

impl SourceId {
    /// Create a SourceId from a raw value, `None` for zero
    pub fn new(id: u32) -> Option<Self> {
        NonZeroU32::new(id).map(Self)
    }

    /// Get the raw ID value
    pub fn as_u32(&self) -> u32 {
        self.0.get()
    }
}

impl std::fmt::Display for SourceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "src-{}", self.0)
    }
}

/// Host scheduler the event manager delivers through
pub trait TaskScheduler: Send + Sync {
    /// Id of the task the calling thread is executing, if it is inside this
    /// scheduler at all
    fn current_source_id(&self) -> Option<SourceId>;

    /// Queue `task` to run once, returning its id, or `None` when refused
    fn schedule_once(&self, priority: i32, task: Task) -> Option<SourceId>;

    /// Cancel a queued task, returning whether it was still queued
    fn cancel(&self, id: SourceId) -> bool;
}

static NEXT_LOOP_ID: AtomicUsize = AtomicUsize::new(1);

thread_local! {
    // (loop id, source id) of the task running on this thread
    static CURRENT_SOURCE: Cell<Option<(usize, SourceId)>> = const { Cell::new(None) };
}

/// Restores the previous current source, also when a task unwinds
struct SourceGuard {
    previous: Option<(usize, SourceId)>,
}

impl SourceGuard {
    fn enter(loop_id: usize, id: SourceId) -> Self {
        let previous = CURRENT_SOURCE.with(|c| c.replace(Some((loop_id, id))));
        Self { previous }
    }
}

impl Drop for SourceGuard {
    fn drop(&mut self) {
        CURRENT_SOURCE.with(|c| c.set(self.previous));
    }
}

struct LoopState {
    next_id: u32,
    next_seq: u64,
    /// Ordered by (priority, submission sequence)
    ready: BinaryHeap<Reverse<(i32, u64, SourceId)>>,
    /// Tasks not yet run or cancelled; a heap entry without one is stale
    tasks: HashMap<SourceId, Task>,
    quit: bool,
}

impl LoopState {
    fn allocate_id(&mut self) -> SourceId {
        loop {
            let raw = self.next_id;
            self.next_id = self.next_id.wrapping_add(1).max(1);
            if let Some(id) = SourceId::new(raw) {
                if !self.tasks.contains_key(&id) {
                    return id;
                }
            }
        }
    }

    fn pop_ready(&mut self) -> Option<(SourceId, Task)> {
        while let Some(Reverse((_, _, id))) = self.ready.pop() {
            if let Some(task) = self.tasks.remove(&id) {
                return Some((id, task));
            }
        }
        None
    }
}

struct Shared {
    loop_id: usize,
    state: Mutex<LoopState>,
    wakeup: Condvar,
}

/// Single-threaded, priority-ordered task loop
///
/// Cloning yields another handle to the same loop.
#[derive(Clone)]
pub struct MainLoop {
    shared: Arc<Shared>,
}

impl MainLoop {
    pub fn new() -> Self {
        Self {
            shared: Arc::new(Shared {
                loop_id: NEXT_LOOP_ID.fetch_add(1, Ordering::Relaxed),
                state: Mutex::new(LoopState {
                    next_id: 1,
                    next_seq: 0,
                    ready: BinaryHeap::new(),
                    tasks: HashMap::new(),
                    quit: false,
                }),
                wakeup: Condvar::new(),
            }),
        }
    }

    /// Run the most urgent queued task on the calling thread
    ///
    /// Returns `false` when nothing was queued.
    pub fn iteration(&self) -> bool {
        let next = self.shared.state.lock().pop_ready();
        match next {
            Some((id, task)) => {
                self.run_task(id, task);
                true
            }
            None => false,
        }
    }

    /// Run queued tasks until none are left, including tasks queued by the
    /// tasks themselves. Returns how many ran.
    pub fn run_until_idle(&self) -> usize {
        let mut ran = 0;
        while self.iteration() {
            ran += 1;
        }
        ran
    }

    /// Run tasks on the calling thread until [`MainLoop::quit`] is called
    pub fn run(&self) {
        tracing::debug!("Main loop {} running", self.shared.loop_id);
        loop {
            let next = {
                let mut state = self.shared.state.lock();
                loop {
                    if state.quit {
                        break None;
                    }
                    if let Some(next) = state.pop_ready() {
                        break Some(next);
                    }
                    self.shared.wakeup.wait(&mut state);
                }
            };

            match next {
                Some((id, task)) => self.run_task(id, task),
                None => break,
            }
        }
        tracing::debug!("Main loop {} stopped", self.shared.loop_id);
    }

    /// Stop `run` and refuse further tasks; queued tasks are dropped
    pub fn quit(&self) {
        let dropped = {
            let mut state = self.shared.state.lock();
            state.quit = true;
            state.ready.clear();
            std::mem::take(&mut state.tasks)
        };
        if !dropped.is_empty() {
            tracing::debug!("Main loop quit with {} queued tasks", dropped.len());
        }
        self.shared.wakeup.notify_all();
    }

    pub fn is_quit(&self) -> bool {
        self.shared.state.lock().quit
    }

    /// Number of tasks queued and not yet run
    pub fn pending_count(&self) -> usize {
        self.shared.state.lock().tasks.len()
    }

    /// Run the loop on a dedicated, named thread
    pub fn spawn(&self, name: impl Into<String>) -> Result<MainLoopThread, SchedulerError> {
        if self.is_quit() {
            return Err(SchedulerError::Quit);
        }

        let name = name.into();
        let main_loop = self.clone();
        let handle = thread::Builder::new()
            .name(name.clone())
            .spawn(move || main_loop.run())
            .map_err(|source| SchedulerError::Spawn { name, source })?;

        Ok(MainLoopThread {
            main_loop: self.clone(),
            handle: Some(handle),
        })
    }

    fn run_task(&self, id: SourceId, task: Task) {
        let _guard = SourceGuard::enter(self.shared.loop_id, id);
        tracing::trace!("Running main loop task {}", id);
        task();
    }
}

impl Default for MainLoop {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for MainLoop {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MainLoop")
            .field("loop_id", &self.shared.loop_id)
            .field("pending", &self.pending_count())
            .finish()
    }
}

impl TaskScheduler for MainLoop {
    fn current_source_id(&self) -> Option<SourceId> {
        CURRENT_SOURCE
            .with(|c| c.get())
            .filter(|(loop_id, _)| *loop_id == self.shared.loop_id)
            .map(|(_, id)| id)
    }

    fn schedule_once(&self, priority: i32, task: Task) -> Option<SourceId> {
        let id = {
            let mut state = self.shared.state.lock();
            if state.quit {
                return None;
            }
            let id = state.allocate_id();
            let seq = state.next_seq;
            state.next_seq += 1;
            state.ready.push(Reverse((priority, seq, id)));
            state.tasks.insert(id, task);
            id
        };
        self.shared.wakeup.notify_one();
        Some(id)
    }

    fn cancel(&self, id: SourceId) -> bool {
        // The stale heap entry is skipped when popped
        self.shared.state.lock().tasks.remove(&id).is_some()
    }
}

/// A main loop running on its own thread; quits and joins on drop
pub struct MainLoopThread {
    main_loop: MainLoop,
    handle: Option<JoinHandle<()>>,
}

impl MainLoopThread {
    /// Handle to the loop, usable as the scheduler of an event manager
    pub fn main_loop(&self) -> &MainLoop {
        &self.main_loop
    }

    /// Quit the loop and wait for its thread to finish
    pub fn join(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        self.main_loop.quit();
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                tracing::error!("Main loop thread panicked");
            }
        }
    }
}

impl Drop for MainLoopThread {
    fn drop(&mut self) {
        self.shutdown();
    }
}
