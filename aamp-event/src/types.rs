//! Event type identifiers, player lifecycle states and delivery modes
//!
//! `EventType` is a dense index: every value in `[0, MAX_EVENT_TYPES)` is a
//! valid slot in per-type tables. Index 0 is the `AllEvents` wildcard, which
//! is only meaningful for listener registration.

use serde::Serialize;

use crate::error::EventError;

macro_rules! event_types {
    ($($variant:ident = $name:literal),+ $(,)?) => {
        /// Kind of a player event
        ///
        /// The numbering is stable and dense, so it can index fixed-size
        /// per-type tables.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
        #[repr(u32)]
        pub enum EventType {
            $($variant),+
        }

        impl EventType {
            /// Every event type in index order, including the wildcard
            pub const ALL: &'static [EventType] = &[$(EventType::$variant),+];

            /// Name used in logs and diagnostics
            pub fn name(&self) -> &'static str {
                match self {
                    $(EventType::$variant => $name),+
                }
            }
        }
    };
}

event_types! {
    AllEvents = "allEvents",
    Tuned = "tuned",
    TuneFailed = "tuneFailed",
    SpeedChanged = "speedChanged",
    Eos = "eos",
    PlaylistIndexed = "playlistIndexed",
    Progress = "progress",
    CcHandleReceived = "ccHandleReceived",
    JsEvent = "jsEvent",
    MediaMetadata = "mediaMetadata",
    EnteringLive = "enteringLive",
    BitrateChanged = "bitrateChanged",
    TimedMetadata = "timedMetadata",
    BulkTimedMetadata = "bulkTimedMetadata",
    StateChanged = "stateChanged",
    SpeedsChanged = "speedsChanged",
    Seeked = "seeked",
    TuneProfiling = "tuneProfiling",
    BufferingChanged = "bufferingChanged",
    DurationChanged = "durationChanged",
    AudioTracksChanged = "audioTracksChanged",
    TextTracksChanged = "textTracksChanged",
    AdBreaksChanged = "adBreaksChanged",
    AdStarted = "adStarted",
    AdCompleted = "adCompleted",
    DrmMetadata = "drmMetadata",
    ReportAnomaly = "anomalyReport",
    WebVttCueData = "vttCueDataListener",
    AdResolved = "adResolved",
    AdReservationStart = "reservationStart",
    AdReservationEnd = "reservationEnd",
    AdPlacementStart = "placementStart",
    AdPlacementEnd = "placementEnd",
    AdPlacementError = "placementError",
    AdPlacementProgress = "placementProgress",
    ReportMetricsData = "metricsData",
    Id3Metadata = "id3Metadata",
    DrmMessage = "drmMessage",
    Blocked = "blocked",
    ContentGap = "contentGap",
    WatermarkSessionUpdate = "watermarkSessionUpdate",
    HttpResponseHeader = "httpResponseHeader",
    ContentProtectionDataUpdate = "contentProtectionDataUpdate",
    ManifestRefreshNotify = "manifestRefreshNotify",
    TuneTimeMetrics = "tuneTimeMetrics",
    NeedManifestData = "needManifestData",
    MonitorAvStatus = "monitorAVStatus",
}

/// Number of slots in a per-event-type table (wildcard included)
pub const MAX_EVENT_TYPES: usize = EventType::ALL.len();

impl EventType {
    /// Slot of this type in a per-type table
    pub fn index(self) -> usize {
        self as usize
    }

    /// Whether this type describes a real occurrence
    ///
    /// The wildcard is a registration target only and is never sent.
    pub fn is_dispatchable(self) -> bool {
        self != EventType::AllEvents
    }
}

impl TryFrom<u32> for EventType {
    type Error = EventError;

    fn try_from(raw: u32) -> Result<Self, EventError> {
        EventType::ALL.get(raw as usize).copied().ok_or_else(|| {
            tracing::debug!("Rejecting raw event type {}", raw);
            EventError::InvalidEventType(raw)
        })
    }
}

impl std::fmt::Display for EventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}({})", self.name(), self.index())
    }
}

/// Player lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[repr(u32)]
pub enum PlayerState {
    #[default]
    Idle,
    Initializing,
    Initialized,
    Preparing,
    Prepared,
    Buffering,
    Paused,
    Seeking,
    Playing,
    Stopping,
    Stopped,
    Complete,
    Error,
    Released,
    Blocked,
}

impl PlayerState {
    const ORDERED: [PlayerState; 15] = [
        PlayerState::Idle,
        PlayerState::Initializing,
        PlayerState::Initialized,
        PlayerState::Preparing,
        PlayerState::Prepared,
        PlayerState::Buffering,
        PlayerState::Paused,
        PlayerState::Seeking,
        PlayerState::Playing,
        PlayerState::Stopping,
        PlayerState::Stopped,
        PlayerState::Complete,
        PlayerState::Error,
        PlayerState::Released,
        PlayerState::Blocked,
    ];

    /// Once released, nothing is delivered any more
    pub fn is_terminal(self) -> bool {
        self == PlayerState::Released
    }
}

impl TryFrom<u32> for PlayerState {
    type Error = EventError;

    fn try_from(raw: u32) -> Result<Self, EventError> {
        PlayerState::ORDERED.get(raw as usize).copied().ok_or_else(|| {
            tracing::debug!("Rejecting raw player state {}", raw);
            EventError::InvalidPlayerState(raw)
        })
    }
}

/// How `send_event` should deliver an event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EventMode {
    /// Async when async tune is on or the caller is off the main loop
    #[default]
    Default,
    /// Deliver on the calling thread, if it is running inside the main loop
    Sync,
    /// Always queue for the main loop
    Async,
}

impl EventMode {
    /// Map a raw mode value, falling back to `Default` when out of range
    pub fn from_raw(raw: i32) -> Self {
        match raw {
            1 => EventMode::Sync,
            2 => EventMode::Async,
            _ => EventMode::Default,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_type_dense_indices() {
        for (i, ty) in EventType::ALL.iter().enumerate() {
            assert_eq!(ty.index(), i);
            assert_eq!(EventType::try_from(i as u32).unwrap(), *ty);
        }
        assert_eq!(EventType::AllEvents.index(), 0);
        assert_eq!(MAX_EVENT_TYPES, EventType::ALL.len());
    }

    #[test]
    fn test_event_type_out_of_range() {
        let err = EventType::try_from(MAX_EVENT_TYPES as u32).unwrap_err();
        assert!(matches!(err, EventError::InvalidEventType(n) if n == MAX_EVENT_TYPES as u32));
        assert!(EventType::try_from(u32::MAX).is_err());
    }

    #[test]
    fn test_wildcard_not_dispatchable() {
        assert!(!EventType::AllEvents.is_dispatchable());
        assert!(EventType::Tuned.is_dispatchable());
        assert!(EventType::MonitorAvStatus.is_dispatchable());
    }

    #[test]
    fn test_player_state_conversion() {
        assert_eq!(PlayerState::try_from(0).unwrap(), PlayerState::Idle);
        assert_eq!(PlayerState::try_from(13).unwrap(), PlayerState::Released);
        assert_eq!(PlayerState::try_from(12), Ok(PlayerState::Error));
        assert_eq!(PlayerState::try_from(15), Err(EventError::InvalidPlayerState(15)));
        assert!(PlayerState::Released.is_terminal());
        assert!(!PlayerState::Playing.is_terminal());
    }

    #[test]
    fn test_event_mode_normalization() {
        assert_eq!(EventMode::from_raw(0), EventMode::Default);
        assert_eq!(EventMode::from_raw(1), EventMode::Sync);
        assert_eq!(EventMode::from_raw(2), EventMode::Async);
        assert_eq!(EventMode::from_raw(4), EventMode::Default);
        assert_eq!(EventMode::from_raw(-1), EventMode::Default);
    }

    #[test]
    fn test_display() {
        assert_eq!(EventType::StateChanged.to_string(), "stateChanged(14)");
    }
}
