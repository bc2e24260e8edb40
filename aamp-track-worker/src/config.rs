//! Configuration for track workers

use crate::error::TrackWorkerError;

/// Smallest stack a worker thread may be given
pub const MIN_STACK_SIZE: usize = 16 * 1024;

/// Configuration for a TrackWorker
#[derive(Debug, Clone)]
pub struct TrackWorkerConfig {
    /// Worker threads are named `{prefix}-{MEDIA_TYPE}`
    /// Default: "aamp-track"
    pub thread_name_prefix: String,

    /// Stack size of the worker thread, platform default when `None`
    /// Default: None
    pub stack_size: Option<usize>,
}

impl Default for TrackWorkerConfig {
    fn default() -> Self {
        Self {
            thread_name_prefix: "aamp-track".to_string(),
            stack_size: None,
        }
    }
}

impl TrackWorkerConfig {
    /// Create a new TrackWorkerConfig with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate the configuration and return any issues
    pub fn validate(&self) -> Result<(), TrackWorkerError> {
        if self.thread_name_prefix.contains('\0') {
            return Err(TrackWorkerError::Configuration(
                "thread_name_prefix must not contain NUL bytes".to_string(),
            ));
        }

        if let Some(size) = self.stack_size {
            if size < MIN_STACK_SIZE {
                return Err(TrackWorkerError::Configuration(format!(
                    "stack_size {} is below the minimum of {} bytes",
                    size, MIN_STACK_SIZE
                )));
            }
        }

        Ok(())
    }

    pub fn with_thread_name_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.thread_name_prefix = prefix.into();
        self
    }

    pub fn with_stack_size(mut self, size: usize) -> Self {
        self.stack_size = Some(size);
        self
    }

    pub(crate) fn thread_name(&self, media: &str) -> String {
        if self.thread_name_prefix.is_empty() {
            media.to_string()
        } else {
            format!("{}-{}", self.thread_name_prefix, media)
        }
    }
}
