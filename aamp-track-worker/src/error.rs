use thiserror::Error;

/// Errors that can occur while starting a track worker
///
/// Once running, a worker never reports errors: panicking jobs are logged
/// and the worker moves on.
#[derive(Error, Debug)]
pub enum TrackWorkerError {
    /// Invalid configuration provided
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The worker thread could not be created
    #[error("Failed to spawn worker thread '{name}': {source}")]
    Spawn {
        name: String,
        #[source]
        source: std::io::Error,
    },
}

/// Result type for track worker operations
pub type Result<T> = std::result::Result<T, TrackWorkerError>;
