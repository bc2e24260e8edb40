//! Media track kinds a worker can be attached to

use std::fmt;

/// Kind of media a track carries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MediaType {
    Video,
    Audio,
    Subtitle,
    AuxAudio,
    Manifest,
    Licence,
    Iframe,
    InitVideo,
    InitAudio,
    InitSubtitle,
    InitAuxAudio,
    PlaylistVideo,
    PlaylistAudio,
    PlaylistSubtitle,
    PlaylistAuxAudio,
    PlaylistIframe,
    InitIframe,
    DsmCc,
    Image,
}

impl MediaType {
    /// Every media type, in track index order
    pub const ALL: [MediaType; 19] = [
        MediaType::Video,
        MediaType::Audio,
        MediaType::Subtitle,
        MediaType::AuxAudio,
        MediaType::Manifest,
        MediaType::Licence,
        MediaType::Iframe,
        MediaType::InitVideo,
        MediaType::InitAudio,
        MediaType::InitSubtitle,
        MediaType::InitAuxAudio,
        MediaType::PlaylistVideo,
        MediaType::PlaylistAudio,
        MediaType::PlaylistSubtitle,
        MediaType::PlaylistAuxAudio,
        MediaType::PlaylistIframe,
        MediaType::InitIframe,
        MediaType::DsmCc,
        MediaType::Image,
    ];

    /// Upper-case name used in log lines and thread names
    pub fn name(self) -> &'static str {
        match self {
            MediaType::Video => "VIDEO",
            MediaType::Audio => "AUDIO",
            MediaType::Subtitle => "SUBTITLE",
            MediaType::AuxAudio => "AUX_AUDIO",
            MediaType::Manifest => "MANIFEST",
            MediaType::Licence => "LICENCE",
            MediaType::Iframe => "IFRAME",
            MediaType::InitVideo => "INIT_VIDEO",
            MediaType::InitAudio => "INIT_AUDIO",
            MediaType::InitSubtitle => "INIT_SUBTITLE",
            MediaType::InitAuxAudio => "INIT_AUX_AUDIO",
            MediaType::PlaylistVideo => "PLAYLIST_VIDEO",
            MediaType::PlaylistAudio => "PLAYLIST_AUDIO",
            MediaType::PlaylistSubtitle => "PLAYLIST_SUBTITLE",
            MediaType::PlaylistAuxAudio => "PLAYLIST_AUX_AUDIO",
            MediaType::PlaylistIframe => "PLAYLIST_IFRAME",
            MediaType::InitIframe => "INIT_IFRAME",
            MediaType::DsmCc => "DSM_CC",
            MediaType::Image => "IMAGE",
        }
    }

    /// Whether this is one of the four elementary stream tracks
    pub fn is_elementary(self) -> bool {
        matches!(
            self,
            MediaType::Video | MediaType::Audio | MediaType::Subtitle | MediaType::AuxAudio
        )
    }
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_names_are_unique_and_upper_case() {
        let names: HashSet<_> = MediaType::ALL.iter().map(|m| m.name()).collect();
        assert_eq!(names.len(), MediaType::ALL.len());
        for name in names {
            assert_eq!(name, name.to_ascii_uppercase());
        }
    }

    #[test]
    fn test_display() {
        assert_eq!(MediaType::AuxAudio.to_string(), "AUX_AUDIO");
        assert!(MediaType::Video.is_elementary());
        assert!(!MediaType::InitVideo.is_elementary());
    }
}
