//! # AAMP Core Event Manager
//!
//! Routes player events from the core to registered listeners.
//!
//! ## Overview
//!
//! Producers call [`EventManager::send_event`] from any thread. Each event
//! either reaches its listeners before the call returns, or goes into a FIFO
//! queue drained by one-shot tasks on the player's main loop:
//!
//! | mode      | caller on main loop | caller elsewhere |
//! |-----------|---------------------|------------------|
//! | `Sync`    | immediate           | queued           |
//! | `Async`   | queued              | queued           |
//! | `Default` | immediate, queued with async tune | queued |
//!
//! Nothing is delivered once the player state is `Released`, and during a
//! fake tune only `Eos` and a `StateChanged` to `Complete` pass.
//!
//! ## Usage
//!
//! ```rust
//! use std::sync::Arc;
//! use aamp_event::{listener_fn, Event, EventMode, EventType};
//! use aamp_event_manager::{EventManager, EventManagerConfig, MainLoop};
//!
//! # fn main() -> aamp_event_manager::Result<()> {
//! let main_loop = MainLoop::new();
//! let loop_thread = main_loop.spawn("aamp-main-loop")?;
//!
//! let config = EventManagerConfig::new().with_player_id(0);
//! let manager = EventManager::with_config(config, Arc::new(main_loop.clone()))?;
//! manager.add_listener_for_all_events(listener_fn(|event| {
//!     println!("{} for session {}", event.event_type(), event.session_id());
//! }));
//!
//! manager.send_event(&Event::new(EventType::Tuned, "session-1").into_ptr(), EventMode::Default);
//!
//! drop(manager);
//! loop_thread.join();
//! # Ok(())
//! # }
//! ```
//!
//! ## Threading
//!
//! Listener callbacks run without any manager lock held, on the producer's
//! thread for immediate delivery or on the main loop thread otherwise. A
//! listener may add or remove listeners and send further events from its
//! callback.

pub mod config;
pub mod error;
pub mod logging;
pub mod manager;
pub mod registry;
pub mod scheduler;

pub use config::EventManagerConfig;
pub use error::{EventManagerError, Result, SchedulerError};
pub use manager::EventManager;
pub use registry::ListenerRegistry;
pub use scheduler::{
    MainLoop, MainLoopThread, SourceId, Task, TaskScheduler, MAX_EVENT_PRIORITY,
    PRIORITY_DEFAULT_IDLE,
};

// Re-export the event model so most users need a single dependency
pub use aamp_event;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::{EventManager, EventManagerConfig, MainLoop, TaskScheduler};
    pub use aamp_event::prelude::*;
}
