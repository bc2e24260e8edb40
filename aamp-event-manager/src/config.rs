//! Configuration for the EventManager

use crate::error::EventManagerError;
use crate::scheduler::{MAX_EVENT_PRIORITY, PRIORITY_DEFAULT_IDLE};

/// Configuration for the EventManager
///
/// Priorities follow main loop conventions: a lower value runs earlier.
#[derive(Debug, Clone)]
pub struct EventManagerConfig {
    /// Player instance this manager belongs to, attached to log records
    /// Default: -1 (unassigned)
    pub player_id: i32,

    /// Priority of async dispatch tasks in normal operation
    /// Default: PRIORITY_DEFAULT_IDLE (200)
    pub idle_priority: i32,

    /// Priority of async dispatch tasks while async tune is enabled
    /// Default: MAX_EVENT_PRIORITY (-70)
    pub async_priority: i32,
}

impl Default for EventManagerConfig {
    fn default() -> Self {
        Self {
            player_id: -1,
            idle_priority: PRIORITY_DEFAULT_IDLE,
            async_priority: MAX_EVENT_PRIORITY,
        }
    }
}

impl EventManagerConfig {
    /// Create a new EventManagerConfig with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate the configuration and return any issues
    pub fn validate(&self) -> Result<(), EventManagerError> {
        if self.async_priority > self.idle_priority {
            return Err(EventManagerError::Configuration(format!(
                "Async priority {} must not run later than idle priority {}",
                self.async_priority, self.idle_priority
            )));
        }

        Ok(())
    }

    pub fn with_player_id(mut self, player_id: i32) -> Self {
        self.player_id = player_id;
        self
    }

    pub fn with_priorities(mut self, idle: i32, async_tune: i32) -> Self {
        self.idle_priority = idle;
        self.async_priority = async_tune;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = EventManagerConfig::default();
        assert_eq!(config.player_id, -1);
        assert_eq!(config.idle_priority, 200);
        assert_eq!(config.async_priority, -70);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation() {
        let invalid = EventManagerConfig::new().with_priorities(0, 100);
        assert!(invalid.validate().is_err());

        let equal = EventManagerConfig::new().with_priorities(50, 50);
        assert!(equal.validate().is_ok());
    }

    #[test]
    fn test_builder() {
        let config = EventManagerConfig::new().with_player_id(3);
        assert_eq!(config.player_id, 3);
    }
}
