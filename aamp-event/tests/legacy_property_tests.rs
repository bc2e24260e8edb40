//! Property-based tests for the bounded copies of the legacy adapter

use aamp_event::legacy::{
    LegacyEventData, MAX_BITRATE_COUNT, MAX_LANGUAGE_COUNT, MAX_LANGUAGE_TAG_LENGTH,
    MAX_SUPPORTED_SPEED_COUNT,
};
use aamp_event::payload::{EventPayload, MediaMetadata};
use aamp_event::{to_legacy_event, Event, EventType};
use proptest::prelude::*;

fn metadata_event(meta: MediaMetadata) -> Event {
    Event::from_payload(EventPayload::MediaMetadata(meta), "prop-session")
}

proptest! {
    #[test]
    fn prop_arrays_truncate_to_capacity(
        languages in prop::collection::vec("[a-z]{2,3}(-[A-Z]{2})?", 0..24),
        bitrates in prop::collection::vec(1i64..50_000_000, 0..16),
        speeds in prop::collection::vec(-64.0f32..64.0, 0..30),
    ) {
        let event = metadata_event(MediaMetadata {
            languages: languages.clone(),
            bitrates: bitrates.clone(),
            supported_speeds: speeds.clone(),
            ..MediaMetadata::default()
        });
        let legacy = to_legacy_event(&event);
        prop_assert_eq!(legacy.event_type, EventType::MediaMetadata);

        let LegacyEventData::Metadata(meta) = legacy.data else {
            return Err(TestCaseError::fail("expected metadata member"));
        };

        prop_assert_eq!(meta.language_count as usize, languages.len());
        for (i, lang) in languages.iter().take(MAX_LANGUAGE_COUNT).enumerate() {
            prop_assert_eq!(meta.language(i), Some(lang.as_str()));
        }
        for i in languages.len()..MAX_LANGUAGE_COUNT {
            prop_assert_eq!(meta.language(i), None);
        }

        let kept = bitrates.len().min(MAX_BITRATE_COUNT);
        prop_assert_eq!(&meta.bitrates[..kept], &bitrates[..kept]);
        prop_assert!(meta.bitrates[kept..].iter().all(|&b| b == 0));

        let kept = speeds.len().min(MAX_SUPPORTED_SPEED_COUNT);
        prop_assert_eq!(&meta.supported_speeds[..kept], &speeds[..kept]);
    }

    #[test]
    fn prop_language_tags_stay_nul_terminated(lang in "[a-zA-Z0-9-]{0,100}") {
        let event = metadata_event(MediaMetadata {
            languages: vec![lang.clone()],
            ..MediaMetadata::default()
        });
        let LegacyEventData::Metadata(meta) = to_legacy_event(&event).data else {
            return Err(TestCaseError::fail("expected metadata member"));
        };

        prop_assert_eq!(meta.languages[0][MAX_LANGUAGE_TAG_LENGTH - 1], 0);
        let kept = lang.len().min(MAX_LANGUAGE_TAG_LENGTH - 1);
        let expected = if kept == 0 { None } else { Some(&lang[..kept]) };
        prop_assert_eq!(meta.language(0), expected);
    }

    #[test]
    fn prop_multibyte_tags_keep_whole_characters(lang in "\\PC{1,60}") {
        let event = metadata_event(MediaMetadata {
            languages: vec![lang.clone()],
            ..MediaMetadata::default()
        });
        let LegacyEventData::Metadata(meta) = to_legacy_event(&event).data else {
            return Err(TestCaseError::fail("expected metadata member"));
        };

        let kept = meta.language(0);
        prop_assert!(kept.is_some());
        let kept = kept.unwrap_or_default();
        prop_assert!(lang.starts_with(kept));
        prop_assert!(kept.len() < MAX_LANGUAGE_TAG_LENGTH);
        // Only the character that would cross the limit is dropped
        if let Some(next) = lang[kept.len()..].chars().next() {
            prop_assert!(kept.len() + next.len_utf8() > MAX_LANGUAGE_TAG_LENGTH - 1);
        }
    }
}
