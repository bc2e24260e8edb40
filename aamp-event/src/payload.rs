//! Type-specific event payloads
//!
//! Each struct carries the data of one event shape. Several event types can
//! share a shape (ad reservations and ad placements carry their phase).

use serde::Serialize;

use crate::types::{EventType, PlayerState};

/// Classification of a tune or playback failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum TuneFailure {
    #[default]
    InitFailed,
    ManifestReqFailed,
    AuthorisationFailure,
    FragmentDownloadFailure,
    InitFragmentDownloadFailure,
    UntrackedDrmError,
    DrmInitFailed,
    DrmDataBindFailed,
    DrmSessionIdEmpty,
    DrmChallengeFailed,
    LicenceTimeout,
    LicenceRequestFailed,
    InvalidDrmKey,
    UnsupportedStreamType,
    FailedToGetKeyId,
    FailedToGetAccessToken,
    Corrupt,
    DrmDecryptFailed,
    GstPipelineError,
    PlaybackStalled,
    ContentNotFound,
    DrmKeyUpdateFailed,
    DeviceNotProvisioned,
    HdcpComplianceError,
    MpdParseError,
    FailureUnknown,
}

/// Payload of a tune failure
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MediaError {
    pub failure: TuneFailure,
    pub code: i32,
    pub description: String,
    pub should_retry: bool,
    /// Security client class code, -1 when not a security client failure
    pub class_code: i32,
    pub reason_code: i32,
    pub business_status: i32,
    pub response_data: String,
}

impl MediaError {
    /// A failure that did not come from the security client
    pub fn new(failure: TuneFailure, code: i32, description: impl Into<String>, should_retry: bool) -> Self {
        Self {
            failure,
            code,
            description: description.into(),
            should_retry,
            class_code: -1,
            reason_code: -1,
            business_status: -1,
            response_data: String::new(),
        }
    }

    /// Attach security client diagnostics
    pub fn with_security_status(mut self, class_code: i32, reason_code: i32, business_status: i32) -> Self {
        self.class_code = class_code;
        self.reason_code = reason_code;
        self.business_status = business_status;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Progress {
    pub duration_ms: f64,
    pub position_ms: f64,
    pub start_ms: f64,
    pub end_ms: f64,
    pub speed: f32,
    pub video_pts: i64,
    pub video_buffered_ms: f64,
    pub audio_buffered_ms: f64,
    pub sei_timecode: String,
    pub live_latency: f64,
    pub profile_bandwidth: i64,
    pub network_bandwidth: i64,
    pub current_play_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct MediaMetadata {
    pub duration_ms: i64,
    pub languages: Vec<String>,
    pub bitrates: Vec<i64>,
    pub supported_speeds: Vec<f32>,
    pub width: i32,
    pub height: i32,
    pub has_drm: bool,
    pub is_live: bool,
    pub drm_type: String,
    pub program_start_time: f64,
    pub tsb_depth_ms: i32,
    pub url: String,
}

/// Interlacing of the selected video profile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum VideoScanType {
    #[default]
    Unknown,
    Progressive,
    Interlaced,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct BitrateChange {
    pub time: i32,
    pub bitrate: i64,
    pub description: String,
    pub width: i32,
    pub height: i32,
    pub frame_rate: f64,
    pub position: f64,
    pub capped_profile: bool,
    pub display_width: i32,
    pub display_height: i32,
    pub scan_type: VideoScanType,
    pub aspect_ratio_width: i32,
    pub aspect_ratio_height: i32,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct TimedMetadata {
    pub name: String,
    pub id: String,
    pub time_ms: f64,
    pub duration_ms: f64,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct DrmMetadata {
    pub failure: TuneFailure,
    pub access_status: String,
    pub access_status_value: i32,
    pub response_code: i32,
    pub sec_client_error: bool,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct AnomalyReport {
    pub severity: i32,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct WebVttCue {
    pub start_ms: f64,
    pub duration_ms: f64,
    pub text: String,
    pub settings: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct AdResolved {
    pub resolved: bool,
    pub ad_id: String,
    pub start_ms: u64,
    pub duration_ms: u64,
    pub error_code: String,
    pub error_description: String,
}

/// Phase of an ad reservation (ad break)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ReservationPhase {
    Start,
    End,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AdReservation {
    pub phase: ReservationPhase,
    pub ad_break_id: String,
    pub position: u64,
    pub absolute_position_ms: u64,
}

/// Phase of a single ad placement inside a break
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PlacementPhase {
    Start,
    End,
    Error,
    Progress,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AdPlacement {
    pub phase: PlacementPhase,
    pub ad_id: String,
    pub position: u32,
    pub absolute_position_ms: u64,
    pub offset: u32,
    pub duration: u32,
    pub error_code: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum MetricsDataType {
    #[default]
    Unknown,
    Error,
    ProfileChange,
    TuneTime,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct MetricsData {
    pub data_type: MetricsDataType,
    pub uuid: String,
    pub data: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Id3Metadata {
    pub data: Vec<u8>,
    pub scheme_id_uri: String,
    pub value: String,
    pub timescale: u32,
    pub presentation_time: u64,
    pub event_duration: u32,
    pub id: u32,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct ContentGap {
    pub time_ms: f64,
    pub duration_ms: f64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct HttpResponseHeader {
    pub header: String,
    pub response: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct ContentProtectionData {
    pub key_id: Vec<u8>,
    pub stream_type: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct ManifestRefresh {
    pub manifest_duration: u32,
    pub period_count: i32,
    pub manifest_published_time: u32,
    pub manifest_type: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct MonitorAvStatus {
    pub status: String,
    pub video_position_ms: i64,
    pub audio_position_ms: i64,
    pub time_in_state_ms: u64,
    pub dropped_frames: u64,
}

/// Type-specific data of an event
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub enum EventPayload {
    /// Events that carry nothing beyond their type
    #[default]
    None,
    TuneFailed(MediaError),
    SpeedChanged { rate: f32 },
    Progress(Progress),
    CcHandle { handle: u64 },
    MediaMetadata(MediaMetadata),
    BitrateChanged(BitrateChange),
    TimedMetadata(TimedMetadata),
    BulkTimedMetadata { content: String },
    StateChanged { state: PlayerState },
    SupportedSpeedsChanged { speeds: Vec<f32> },
    Seeked { position_ms: f64 },
    TuneProfiling { profiling_data: String },
    BufferingChanged { buffering: bool },
    DrmMetadata(DrmMetadata),
    AnomalyReport(AnomalyReport),
    WebVttCue(WebVttCue),
    AdResolved(AdResolved),
    AdReservation(AdReservation),
    AdPlacement(AdPlacement),
    MetricsData(MetricsData),
    Id3Metadata(Id3Metadata),
    DrmMessage { message: String },
    ContentGap(ContentGap),
    HttpResponseHeader(HttpResponseHeader),
    ContentProtectionData(ContentProtectionData),
    ManifestRefresh(ManifestRefresh),
    TuneTimeMetrics { metrics: String },
    MonitorAvStatus(MonitorAvStatus),
}

impl EventPayload {
    /// Event type this payload is sent as
    ///
    /// Returns `None` for the empty payload, whose type must be given
    /// explicitly.
    pub fn event_type(&self) -> Option<EventType> {
        let ty = match self {
            EventPayload::None => return None,
            EventPayload::TuneFailed(_) => EventType::TuneFailed,
            EventPayload::SpeedChanged { .. } => EventType::SpeedChanged,
            EventPayload::Progress(_) => EventType::Progress,
            EventPayload::CcHandle { .. } => EventType::CcHandleReceived,
            EventPayload::MediaMetadata(_) => EventType::MediaMetadata,
            EventPayload::BitrateChanged(_) => EventType::BitrateChanged,
            EventPayload::TimedMetadata(_) => EventType::TimedMetadata,
            EventPayload::BulkTimedMetadata { .. } => EventType::BulkTimedMetadata,
            EventPayload::StateChanged { .. } => EventType::StateChanged,
            EventPayload::SupportedSpeedsChanged { .. } => EventType::SpeedsChanged,
            EventPayload::Seeked { .. } => EventType::Seeked,
            EventPayload::TuneProfiling { .. } => EventType::TuneProfiling,
            EventPayload::BufferingChanged { .. } => EventType::BufferingChanged,
            EventPayload::DrmMetadata(_) => EventType::DrmMetadata,
            EventPayload::AnomalyReport(_) => EventType::ReportAnomaly,
            EventPayload::WebVttCue(_) => EventType::WebVttCueData,
            EventPayload::AdResolved(_) => EventType::AdResolved,
            EventPayload::AdReservation(r) => match r.phase {
                ReservationPhase::Start => EventType::AdReservationStart,
                ReservationPhase::End => EventType::AdReservationEnd,
            },
            EventPayload::AdPlacement(p) => match p.phase {
                PlacementPhase::Start => EventType::AdPlacementStart,
                PlacementPhase::End => EventType::AdPlacementEnd,
                PlacementPhase::Error => EventType::AdPlacementError,
                PlacementPhase::Progress => EventType::AdPlacementProgress,
            },
            EventPayload::MetricsData(_) => EventType::ReportMetricsData,
            EventPayload::Id3Metadata(_) => EventType::Id3Metadata,
            EventPayload::DrmMessage { .. } => EventType::DrmMessage,
            EventPayload::ContentGap(_) => EventType::ContentGap,
            EventPayload::HttpResponseHeader(_) => EventType::HttpResponseHeader,
            EventPayload::ContentProtectionData(_) => EventType::ContentProtectionDataUpdate,
            EventPayload::ManifestRefresh(_) => EventType::ManifestRefreshNotify,
            EventPayload::TuneTimeMetrics { .. } => EventType::TuneTimeMetrics,
            EventPayload::MonitorAvStatus(_) => EventType::MonitorAvStatus,
        };
        Some(ty)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ad_phases_map_to_distinct_types() {
        let reservation = |phase| {
            EventPayload::AdReservation(AdReservation {
                phase,
                ad_break_id: "break-1".to_string(),
                position: 0,
                absolute_position_ms: 0,
            })
        };
        assert_eq!(reservation(ReservationPhase::Start).event_type(), Some(EventType::AdReservationStart));
        assert_eq!(reservation(ReservationPhase::End).event_type(), Some(EventType::AdReservationEnd));

        let placement = |phase| {
            EventPayload::AdPlacement(AdPlacement {
                phase,
                ad_id: "ad-1".to_string(),
                position: 0,
                absolute_position_ms: 0,
                offset: 0,
                duration: 30_000,
                error_code: 0,
            })
        };
        assert_eq!(placement(PlacementPhase::Error).event_type(), Some(EventType::AdPlacementError));
        assert_eq!(placement(PlacementPhase::Progress).event_type(), Some(EventType::AdPlacementProgress));
    }

    #[test]
    fn test_empty_payload_has_no_type() {
        assert_eq!(EventPayload::None.event_type(), None);
    }

    #[test]
    fn test_media_error_defaults_to_no_security_status() {
        let err = MediaError::new(TuneFailure::ManifestReqFailed, 404, "manifest download failed", true);
        assert_eq!(err.class_code, -1);

        let err = err.with_security_status(100, 7, 0);
        assert_eq!(err.class_code, 100);
        assert_eq!(err.reason_code, 7);
    }
}
