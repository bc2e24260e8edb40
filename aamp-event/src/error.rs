use thiserror::Error;

/// Errors from validating raw event model values
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EventError {
    /// Raw value outside `[0, MAX_EVENT_TYPES)`
    #[error("Event type {0} is out of range")]
    InvalidEventType(u32),

    /// Raw value that is not a player state
    #[error("Player state {0} is out of range")]
    InvalidPlayerState(u32),
}

/// Result type for event model conversions
pub type Result<T> = std::result::Result<T, EventError>;
