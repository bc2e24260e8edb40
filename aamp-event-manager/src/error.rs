use thiserror::Error;

/// Errors that can occur while setting up the event manager
///
/// Dispatch itself never fails: rejected arguments, missing listeners and
/// post-release sends are logged and dropped.
#[derive(Error, Debug)]
pub enum EventManagerError {
    /// Invalid configuration provided
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Error from the main loop scheduler
    #[error("Scheduler error: {0}")]
    Scheduler(#[from] SchedulerError),

    /// Raw value rejected by the event model
    #[error("Event error: {0}")]
    Event(#[from] aamp_event::EventError),
}

/// Errors from the main loop scheduler
#[derive(Error, Debug)]
pub enum SchedulerError {
    /// The loop thread could not be created
    #[error("Failed to spawn main loop thread '{name}': {source}")]
    Spawn {
        name: String,
        #[source]
        source: std::io::Error,
    },

    /// The loop has been asked to quit and accepts no more work
    #[error("Main loop has quit")]
    Quit,
}

/// Result type for Event Manager operations
pub type Result<T> = std::result::Result<T, EventManagerError>;
