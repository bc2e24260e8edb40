//! Conversion of events into the fixed-layout legacy event record
//!
//! Older listener integrations consume a flat record with one member per
//! event shape instead of the typed event object. The projection here is
//! stateless: strings and byte buffers are borrowed from the source event,
//! list fields are copied into fixed-capacity arrays and silently truncated.
//!
//! A few members keep a second, misspelled copy of a field (`*_miliseconds`)
//! because existing consumers read those names.

use crate::event::Event;
use crate::payload::{
    EventPayload, MetricsDataType, TuneFailure, VideoScanType, WebVttCue,
};
use crate::types::{EventType, PlayerState};

/// Capacity of the language list in [`LegacyMediaMetadata`]
pub const MAX_LANGUAGE_COUNT: usize = 16;
/// Size of one NUL-padded language tag, terminator included
pub const MAX_LANGUAGE_TAG_LENGTH: usize = 72;
/// Capacity of the bitrate list in [`LegacyMediaMetadata`]
pub const MAX_BITRATE_COUNT: usize = 10;
/// Capacity of supported playback speed lists
pub const MAX_SUPPORTED_SPEED_COUNT: usize = 20;

/// A language tag as stored in the legacy record
pub type LanguageTag = [u8; MAX_LANGUAGE_TAG_LENGTH];

/// Legacy event record
#[derive(Debug, Clone, PartialEq)]
pub struct LegacyEvent<'a> {
    pub event_type: EventType,
    pub data: LegacyEventData<'a>,
}

/// The per-shape member of a legacy event
#[derive(Debug, Clone, PartialEq)]
pub enum LegacyEventData<'a> {
    /// Types without a mapped member
    None,
    MediaError(LegacyMediaError<'a>),
    SpeedChanged { rate: f32 },
    Progress(LegacyProgress<'a>),
    CcHandle { handle: u64 },
    Metadata(Box<LegacyMediaMetadata>),
    BitrateChanged(LegacyBitrateChanged<'a>),
    TimedMetadata(LegacyTimedMetadata<'a>),
    BulkTimedMetadata { meta_content: &'a str },
    StateChanged { state: PlayerState },
    SpeedsChanged(LegacySupportedSpeeds),
    Seeked { position_milliseconds: f64 },
    TuneProfile { micro_data: &'a str },
    BufferingChanged { buffering: bool },
    DashDrmMetadata(LegacyDrmMetadata<'a>),
    AnomalyReport { severity: i32, msg: &'a str },
    Cue { cue_data: &'a WebVttCue },
    AdResolved(LegacyAdResolved<'a>),
    AdReservation { ad_break_id: &'a str, position: u64 },
    AdPlacement(LegacyAdPlacement<'a>),
    MetricsData { data_type: MetricsDataType, metric_uuid: &'a str, data: &'a str },
    Id3Metadata { data: &'a [u8], length: usize },
    DrmMessage { data: &'a str },
    HttpResponseHeader { header: &'a str, response: &'a str },
    ContentProtectionData { key_id: &'a [u8], stream_type: &'a str },
    ManifestRefresh(LegacyManifestRefresh<'a>),
    TuneMetrics { tune_metric_data: &'a str },
    MonitorAvStatus(LegacyMonitorAvStatus<'a>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct LegacyMediaError<'a> {
    pub failure: TuneFailure,
    pub code: i32,
    pub description: &'a str,
    pub should_retry: bool,
    pub class_code: i32,
    pub reason_code: i32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LegacyProgress<'a> {
    pub duration_milliseconds: f64,
    pub position_milliseconds: f64,
    pub playback_speed: f32,
    pub start_milliseconds: f64,
    pub end_milliseconds: f64,
    pub video_pts: i64,
    pub video_buffered_milliseconds: f64,
    pub audio_buffered_milliseconds: f64,
    pub timecode: &'a str,
    pub live_latency: f64,
    pub profile_bandwidth: i64,
    pub network_bandwidth: i64,
    pub current_play_rate: f64,
    pub duration_miliseconds: f64,
    pub position_miliseconds: f64,
    pub start_miliseconds: f64,
    pub end_miliseconds: f64,
    pub video_buffered_miliseconds: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LegacyMediaMetadata {
    pub duration_milliseconds: i64,
    /// Source count, even when `languages` was truncated
    pub language_count: i32,
    pub languages: [LanguageTag; MAX_LANGUAGE_COUNT],
    pub bitrate_count: i32,
    pub bitrates: [i64; MAX_BITRATE_COUNT],
    pub supported_speed_count: i32,
    pub supported_speeds: [f32; MAX_SUPPORTED_SPEED_COUNT],
    pub width: i32,
    pub height: i32,
    pub has_drm: bool,
    pub program_start_time: f64,
    pub tsb_depth_ms: i32,
    pub duration_miliseconds: i64,
}

impl LegacyMediaMetadata {
    /// Language at `index` as text, if that slot was filled
    pub fn language(&self, index: usize) -> Option<&str> {
        let tag = self.languages.get(index)?;
        let len = tag.iter().position(|&b| b == 0).unwrap_or(tag.len());
        if len == 0 {
            return None;
        }
        std::str::from_utf8(&tag[..len]).ok()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LegacyBitrateChanged<'a> {
    pub time: i32,
    pub bitrate: i64,
    pub description: &'a str,
    pub width: i32,
    pub height: i32,
    pub framerate: f64,
    pub position: f64,
    pub capped_profile: bool,
    pub display_width: i32,
    pub display_height: i32,
    pub video_scan_type: VideoScanType,
    pub aspect_ratio_width: i32,
    pub aspect_ratio_height: i32,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct LegacyTimedMetadata<'a> {
    pub name: &'a str,
    pub id: &'a str,
    pub time_milliseconds: f64,
    pub duration_milliseconds: f64,
    pub content: &'a str,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LegacySupportedSpeeds {
    pub supported_speed_count: i32,
    pub supported_speeds: [f32; MAX_SUPPORTED_SPEED_COUNT],
}

#[derive(Debug, Clone, PartialEq)]
pub struct LegacyDrmMetadata<'a> {
    pub failure: TuneFailure,
    pub access_status: &'a str,
    pub access_status_value: i32,
    pub response_code: i32,
    pub is_sec_client_error: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LegacyAdResolved<'a> {
    pub resolve_status: bool,
    pub ad_id: &'a str,
    pub start_ms: u64,
    pub duration_ms: u64,
    pub error_code: &'a str,
    pub error_description: &'a str,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LegacyAdPlacement<'a> {
    pub ad_id: &'a str,
    pub position: u32,
    pub offset: u32,
    pub duration: u32,
    pub error_code: i32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LegacyManifestRefresh<'a> {
    pub manifest_duration: u32,
    pub no_of_periods: i32,
    pub manifest_published_time: u32,
    pub manifest_type: &'a str,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LegacyMonitorAvStatus<'a> {
    pub status: &'a str,
    pub video_position_ms: i64,
    pub audio_position_ms: i64,
    pub time_in_state_ms: u64,
    pub dropped_frames: u64,
}

/// Project an event onto the legacy record
pub fn to_legacy_event(event: &Event) -> LegacyEvent<'_> {
    let data = match event.payload() {
        EventPayload::None => LegacyEventData::None,
        EventPayload::TuneFailed(err) => {
            let mut legacy = LegacyMediaError {
                failure: err.failure,
                code: err.code,
                description: &err.description,
                should_retry: err.should_retry,
                class_code: 0,
                reason_code: 0,
            };
            // Security client failures carry their own retry verdict
            if err.class_code != -1 {
                legacy.class_code = err.class_code;
                legacy.reason_code = err.reason_code;
                legacy.should_retry = err.business_status != 0;
            }
            LegacyEventData::MediaError(legacy)
        }
        EventPayload::SpeedChanged { rate } => LegacyEventData::SpeedChanged { rate: *rate },
        EventPayload::Progress(p) => LegacyEventData::Progress(LegacyProgress {
            duration_milliseconds: p.duration_ms,
            position_milliseconds: p.position_ms,
            playback_speed: p.speed,
            start_milliseconds: p.start_ms,
            end_milliseconds: p.end_ms,
            video_pts: p.video_pts,
            video_buffered_milliseconds: p.video_buffered_ms,
            audio_buffered_milliseconds: p.audio_buffered_ms,
            timecode: &p.sei_timecode,
            live_latency: p.live_latency,
            profile_bandwidth: p.profile_bandwidth,
            network_bandwidth: p.network_bandwidth,
            current_play_rate: p.current_play_rate,
            duration_miliseconds: p.duration_ms,
            position_miliseconds: p.position_ms,
            start_miliseconds: p.start_ms,
            end_miliseconds: p.end_ms,
            video_buffered_miliseconds: p.video_buffered_ms,
        }),
        EventPayload::CcHandle { handle } => LegacyEventData::CcHandle { handle: *handle },
        EventPayload::MediaMetadata(m) => {
            let mut languages = [[0u8; MAX_LANGUAGE_TAG_LENGTH]; MAX_LANGUAGE_COUNT];
            for (slot, lang) in languages.iter_mut().zip(&m.languages) {
                *slot = language_tag(lang);
            }
            let mut bitrates = [0i64; MAX_BITRATE_COUNT];
            copy_bounded(&mut bitrates, &m.bitrates);
            let mut supported_speeds = [0f32; MAX_SUPPORTED_SPEED_COUNT];
            copy_bounded(&mut supported_speeds, &m.supported_speeds);

            LegacyEventData::Metadata(Box::new(LegacyMediaMetadata {
                duration_milliseconds: m.duration_ms,
                language_count: m.languages.len() as i32,
                languages,
                bitrate_count: m.bitrates.len() as i32,
                bitrates,
                supported_speed_count: m.supported_speeds.len() as i32,
                supported_speeds,
                width: m.width,
                height: m.height,
                has_drm: m.has_drm,
                program_start_time: m.program_start_time,
                tsb_depth_ms: m.tsb_depth_ms,
                duration_miliseconds: m.duration_ms,
            }))
        }
        EventPayload::BitrateChanged(b) => LegacyEventData::BitrateChanged(LegacyBitrateChanged {
            time: b.time,
            bitrate: b.bitrate,
            description: &b.description,
            width: b.width,
            height: b.height,
            framerate: b.frame_rate,
            position: b.position,
            capped_profile: b.capped_profile,
            display_width: b.display_width,
            display_height: b.display_height,
            video_scan_type: b.scan_type,
            aspect_ratio_width: b.aspect_ratio_width,
            aspect_ratio_height: b.aspect_ratio_height,
        }),
        EventPayload::TimedMetadata(t) => LegacyEventData::TimedMetadata(LegacyTimedMetadata {
            name: &t.name,
            id: &t.id,
            time_milliseconds: t.time_ms,
            duration_milliseconds: t.duration_ms,
            content: &t.content,
        }),
        EventPayload::BulkTimedMetadata { content } => {
            LegacyEventData::BulkTimedMetadata { meta_content: content }
        }
        EventPayload::StateChanged { state } => LegacyEventData::StateChanged { state: *state },
        EventPayload::SupportedSpeedsChanged { speeds } => {
            let mut supported_speeds = [0f32; MAX_SUPPORTED_SPEED_COUNT];
            copy_bounded(&mut supported_speeds, speeds);
            LegacyEventData::SpeedsChanged(LegacySupportedSpeeds {
                supported_speed_count: speeds.len() as i32,
                supported_speeds,
            })
        }
        EventPayload::Seeked { position_ms } => LegacyEventData::Seeked {
            position_milliseconds: *position_ms,
        },
        EventPayload::TuneProfiling { profiling_data } => LegacyEventData::TuneProfile {
            micro_data: profiling_data,
        },
        EventPayload::BufferingChanged { buffering } => LegacyEventData::BufferingChanged {
            buffering: *buffering,
        },
        EventPayload::DrmMetadata(d) => LegacyEventData::DashDrmMetadata(LegacyDrmMetadata {
            failure: d.failure,
            access_status: &d.access_status,
            access_status_value: d.access_status_value,
            response_code: d.response_code,
            is_sec_client_error: d.sec_client_error,
        }),
        EventPayload::AnomalyReport(a) => LegacyEventData::AnomalyReport {
            severity: a.severity,
            msg: &a.message,
        },
        EventPayload::WebVttCue(cue) => LegacyEventData::Cue { cue_data: cue },
        EventPayload::AdResolved(a) => LegacyEventData::AdResolved(LegacyAdResolved {
            resolve_status: a.resolved,
            ad_id: &a.ad_id,
            start_ms: a.start_ms,
            duration_ms: a.duration_ms,
            error_code: &a.error_code,
            error_description: &a.error_description,
        }),
        EventPayload::AdReservation(r) => LegacyEventData::AdReservation {
            ad_break_id: &r.ad_break_id,
            position: r.position,
        },
        EventPayload::AdPlacement(p) => LegacyEventData::AdPlacement(LegacyAdPlacement {
            ad_id: &p.ad_id,
            position: p.position,
            offset: p.offset,
            duration: p.duration,
            error_code: p.error_code,
        }),
        EventPayload::MetricsData(m) => LegacyEventData::MetricsData {
            data_type: m.data_type,
            metric_uuid: &m.uuid,
            data: &m.data,
        },
        EventPayload::Id3Metadata(id3) => LegacyEventData::Id3Metadata {
            data: &id3.data,
            length: id3.data.len(),
        },
        EventPayload::DrmMessage { message } => LegacyEventData::DrmMessage { data: message },
        // Content gaps reuse the timed metadata member
        EventPayload::ContentGap(gap) => LegacyEventData::TimedMetadata(LegacyTimedMetadata {
            time_milliseconds: gap.time_ms,
            duration_milliseconds: gap.duration_ms,
            ..Default::default()
        }),
        EventPayload::HttpResponseHeader(h) => LegacyEventData::HttpResponseHeader {
            header: &h.header,
            response: &h.response,
        },
        EventPayload::ContentProtectionData(c) => LegacyEventData::ContentProtectionData {
            key_id: &c.key_id,
            stream_type: &c.stream_type,
        },
        EventPayload::ManifestRefresh(m) => LegacyEventData::ManifestRefresh(LegacyManifestRefresh {
            manifest_duration: m.manifest_duration,
            no_of_periods: m.period_count,
            manifest_published_time: m.manifest_published_time,
            manifest_type: &m.manifest_type,
        }),
        EventPayload::TuneTimeMetrics { metrics } => LegacyEventData::TuneMetrics {
            tune_metric_data: metrics,
        },
        EventPayload::MonitorAvStatus(m) => LegacyEventData::MonitorAvStatus(LegacyMonitorAvStatus {
            status: &m.status,
            video_position_ms: m.video_position_ms,
            audio_position_ms: m.audio_position_ms,
            time_in_state_ms: m.time_in_state_ms,
            dropped_frames: m.dropped_frames,
        }),
    };

    LegacyEvent {
        event_type: event.event_type(),
        data,
    }
}

fn copy_bounded<T: Copy, const N: usize>(dst: &mut [T; N], src: &[T]) {
    for (slot, value) in dst.iter_mut().zip(src) {
        *slot = *value;
    }
}

fn language_tag(lang: &str) -> LanguageTag {
    let mut tag = [0u8; MAX_LANGUAGE_TAG_LENGTH];
    let mut len = lang.len().min(MAX_LANGUAGE_TAG_LENGTH - 1);
    // Never split a multibyte character
    while !lang.is_char_boundary(len) {
        len -= 1;
    }
    tag[..len].copy_from_slice(&lang.as_bytes()[..len]);
    tag
}
