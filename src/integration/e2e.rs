//! End-to-end integration tests

use crate::config::{DanglingPolicy, ParserConfig, ReloadPolicy};
use crate::error::{LoadError, ParseError};
use crate::integration::fixtures::{
    TestPlaylist, BASE, LIVE_WINDOW_1, LIVE_WINDOW_2, LIVE_WINDOW_END, LIVE_WINDOW_GAP, MIXED,
};
use crate::loader::load;
use crate::playlist::{parse, parse_with, Playlist};
use crate::url::is_url;

/// Outcome of checking a parsed playlist
#[derive(Debug, Default)]
pub struct ValidationResult {
    pub is_valid: bool,
    pub errors: Vec<String>,
}

impl ValidationResult {
    fn from_errors(errors: Vec<String>) -> Self {
        Self {
            is_valid: errors.is_empty(),
            errors,
        }
    }
}

/// Check the structural invariants every parsed playlist must hold.
pub fn validate_playlist(fixture: &TestPlaylist, playlist: &Playlist) -> ValidationResult {
    let mut errors = Vec::new();

    if playlist.is_variant != fixture.is_variant {
        errors.push(format!("is_variant = {}", playlist.is_variant));
    }
    if playlist.segments.len() != fixture.expected_segments {
        errors.push(format!("{} segments", playlist.segments.len()));
    }
    if playlist.streams.len() != fixture.expected_streams {
        errors.push(format!("{} streams", playlist.streams.len()));
    }
    if !playlist.segments.is_empty() && !playlist.streams.is_empty() {
        errors.push("both segments and streams populated".to_string());
    }

    let uris = playlist
        .segments
        .iter()
        .map(|s| s.uri.as_str())
        .chain(playlist.streams.iter().map(|s| s.uri.as_str()))
        .chain(playlist.iframe_streams.iter().map(|s| s.uri.as_str()))
        .chain(playlist.media.iter().filter_map(|m| m.uri.as_deref()));
    for uri in uris {
        if !is_url(uri) {
            errors.push(format!("unresolved uri {}", uri));
        }
    }

    for segment in &playlist.segments {
        if segment.duration < 0.0 {
            errors.push(format!("negative duration on {}", segment.uri));
        }
    }

    ValidationResult::from_errors(errors)
}

/// Parse every fixture, then parse its serialization again and compare.
pub fn test_fixture_roundtrips() -> Vec<(&'static str, ValidationResult)> {
    TestPlaylist::all()
        .into_iter()
        .map(|fixture| {
            let playlist = match parse(fixture.text, Some(BASE), None) {
                Ok(p) => p,
                Err(e) => {
                    return (fixture.name, ValidationResult::from_errors(vec![e.to_string()]));
                }
            };
            let mut result = validate_playlist(&fixture, &playlist);

            match parse(&playlist.to_string(), Some(BASE), None) {
                Ok(mut reparsed) => {
                    // Skipped tags are not written back out
                    reparsed.unknown_tags = playlist.unknown_tags.clone();
                    if reparsed != playlist {
                        result.errors.push("re-parsed playlist differs".to_string());
                    }
                }
                Err(e) => result.errors.push(format!("re-parse failed: {}", e)),
            }
            result.is_valid = result.errors.is_empty();
            (fixture.name, result)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::playlist::{KeyMethod, MediaType};
    use chrono::{Duration, TimeZone, Utc};

    fn live(text: &str) -> Playlist {
        parse(text, Some("http://live.example.com/ch1/"), None).unwrap()
    }

    #[test]
    fn test_all_fixtures_roundtrip() {
        for (name, result) in test_fixture_roundtrips() {
            assert!(result.is_valid, "{} failed: {:?}", name, result.errors);
        }
    }

    #[test]
    fn test_segment_count_and_durations_match_extinf() {
        let playlist = parse(TestPlaylist::simple_vod().text, Some(BASE), None).unwrap();
        let durations: Vec<f64> = playlist.segments.iter().map(|s| s.duration).collect();
        assert_eq!(durations, vec![9.009, 9.009, 3.003]);
        assert_eq!(
            playlist.segments[2].uri,
            "http://media.example.com/content/seg2.ts"
        );
        assert!(playlist.is_endlist);
    }

    #[test]
    fn test_master_playlist() {
        let playlist = parse(TestPlaylist::master().text, Some(BASE), None).unwrap();

        let low = &playlist.streams[0];
        assert_eq!(low.bandwidth, 1280000);
        assert_eq!(low.average_bandwidth, Some(1000000));
        assert_eq!(low.codecs.as_deref(), Some("avc1.4d401e,mp4a.40.2"));
        assert_eq!(low.uri, "http://media.example.com/content/video/360p/index.m3u8");

        let high = &playlist.streams[1];
        assert_eq!(high.bandwidth, 5120000);
        assert_eq!(high.frame_rate, Some(29.97));
        assert_eq!(high.uri, "https://cdn.example.com/video/1080p/index.m3u8");

        let names: Vec<&str> = playlist
            .renditions_for(low)
            .iter()
            .map(|m| m.name.as_str())
            .collect();
        assert_eq!(names, vec!["English", "Deutsch", "English"]);
        assert_eq!(playlist.media_group("aud").count(), 2);
        assert_eq!(playlist.media[2].media_type, MediaType::Subtitles);
        assert!(playlist.media[0].is_default);
        assert!(!playlist.media[1].is_default);

        assert_eq!(
            playlist.iframe_streams[0].uri,
            "http://media.example.com/content/video/360p/iframes.m3u8"
        );
    }

    #[test]
    fn test_encrypted_playlist() {
        let playlist = parse(TestPlaylist::encrypted().text, Some(BASE), None).unwrap();
        let segs = &playlist.segments;

        let first_key = segs[0].key.as_ref().unwrap();
        assert_eq!(first_key.method, KeyMethod::Aes128);
        assert_eq!(
            first_key.uri.as_deref(),
            Some("http://media.example.com/content/keys/1.key")
        );
        assert_eq!(segs[1].key, segs[0].key);
        assert_eq!(
            segs[2].key.as_ref().unwrap().uri.as_deref(),
            Some("http://media.example.com/content/keys/2.key")
        );
        assert!(segs[3].key.is_none());
        assert_eq!(playlist.keys.len(), 2);

        assert_eq!(segs[1].byte_range.unwrap().offset, Some(1000));
        assert_eq!(
            segs[0].init_section.as_ref().unwrap().uri,
            "http://media.example.com/content/init.mp4"
        );

        assert!(!segs[1].discontinuity);
        assert!(segs[2].discontinuity);
        assert!(segs[2].cue_out);
        assert!(segs[3].cue_in);
        assert_eq!(segs[2].title.as_deref(), Some("ad"));

        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        assert_eq!(playlist.program_date_time.unwrap(), start);
        assert_eq!(segs[0].program_date_time.unwrap(), start);
        assert_eq!(segs[2].program_date_time.unwrap(), start + Duration::seconds(12));
        assert_eq!(
            segs[3].program_date_time.unwrap(),
            start + Duration::milliseconds(16500)
        );
    }

    #[test]
    fn test_unknown_tags_are_skipped() {
        let fixture = TestPlaylist::vendor_tags();
        let playlist = parse(fixture.text, Some(BASE), None).unwrap();
        assert!(validate_playlist(&fixture, &playlist).is_valid);
        assert_eq!(playlist.unknown_tags.len(), 3);
        assert_eq!(playlist.unknown_tags[0], "#EXT-X-FOO:bar");
        assert_eq!(playlist.target_duration, Some(4.0));
    }

    #[test]
    fn test_missing_header() {
        let err = parse("#EXTINF:10,\nseg.ts\n", None, None).unwrap_err();
        assert!(matches!(err, ParseError::MissingHeader { .. }));
    }

    #[test]
    fn test_mixed_content_is_structural_conflict() {
        let err = parse(MIXED, Some(BASE), None).unwrap_err();
        assert!(matches!(err, ParseError::StructuralConflict { line: 4, .. }));
    }

    #[test]
    fn test_malformed_numeric_field() {
        let err = parse("#EXTM3U\n#EXT-X-TARGETDURATION:ten\n", None, None).unwrap_err();
        match err {
            ParseError::MalformedAttribute { tag, value, line } => {
                assert_eq!(tag, "#EXT-X-TARGETDURATION");
                assert_eq!(value, "ten");
                assert_eq!(line, 2);
            }
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn test_dangling_extinf_policies() {
        let text = "#EXTM3U\n#EXTINF:4,\na.ts\n#EXTINF:4,\n";
        let playlist = parse(text, None, None).unwrap();
        assert_eq!(playlist.segments.len(), 1);

        let strict = ParserConfig {
            dangling_policy: DanglingPolicy::Error,
            ..Default::default()
        };
        let err = parse_with(text, None, None, &strict).unwrap_err();
        assert_eq!(
            err,
            ParseError::DanglingDirective {
                tag: "#EXTINF".to_string(),
                line: 4
            }
        );
    }

    #[test]
    fn test_reload_merges_live_windows() {
        let config = ParserConfig::default();
        let mut playlist = live(LIVE_WINDOW_1);

        let added = playlist.reload(LIVE_WINDOW_2, &config).unwrap();
        assert_eq!(added, 1);
        assert_eq!(playlist.segments.len(), 4);
        assert_eq!(playlist.media_sequence, Some(10));
        assert_eq!(
            playlist.segments[3].uri,
            "http://live.example.com/ch1/seg13.ts"
        );
        assert!(!playlist.is_endlist);

        // Same window again adds nothing
        assert_eq!(playlist.reload(LIVE_WINDOW_2, &config).unwrap(), 0);

        let added = playlist.reload(LIVE_WINDOW_END, &config).unwrap();
        assert_eq!(added, 1);
        assert_eq!(playlist.segments.len(), 5);
        assert_eq!(playlist.segments[4].duration, 5.0);
        assert!(playlist.is_endlist);
        assert_eq!(playlist.segment_sequence(4), 14);
    }

    #[test]
    fn test_reload_replaces_after_gap() {
        let mut playlist = live(LIVE_WINDOW_1);
        let added = playlist
            .reload(LIVE_WINDOW_GAP, &ParserConfig::default())
            .unwrap();
        assert_eq!(added, 2);
        assert_eq!(playlist.media_sequence, Some(40));
        assert_eq!(playlist.segments.len(), 2);
        assert_eq!(
            playlist.segments[0].uri,
            "http://live.example.com/ch1/seg40.ts"
        );
    }

    #[test]
    fn test_reload_replace_policy() {
        let config = ParserConfig {
            reload_policy: ReloadPolicy::Replace,
            ..Default::default()
        };
        let mut playlist = live(LIVE_WINDOW_1);
        playlist.reload(LIVE_WINDOW_2, &config).unwrap();
        assert_eq!(playlist.media_sequence, Some(11));
        assert_eq!(playlist.segments.len(), 3);
        assert_eq!(
            playlist.base_reference.as_deref(),
            Some("http://live.example.com/ch1/")
        );
    }

    #[test]
    fn test_reload_variant_replaces() {
        let mut playlist = live(LIVE_WINDOW_1);
        playlist
            .reload(TestPlaylist::master().text, &ParserConfig::default())
            .unwrap();
        assert!(playlist.is_variant);
        assert!(playlist.segments.is_empty());
        assert_eq!(playlist.streams.len(), 2);
    }

    #[test]
    fn test_reload_keeps_state_on_error() {
        let mut playlist = live(LIVE_WINDOW_1);
        let before = playlist.clone();
        assert!(playlist
            .reload("garbage", &ParserConfig::default())
            .is_err());
        assert_eq!(playlist, before);
    }

    #[tokio::test]
    async fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("vod").join("index.m3u8");
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, TestPlaylist::simple_vod().text).unwrap();

        let playlist = load(
            path.to_str().unwrap(),
            &Default::default(),
            &ParserConfig::default(),
        )
        .await
        .unwrap();
        assert_eq!(playlist.segments.len(), 3);
        assert_eq!(
            playlist.segments[0].uri,
            dir.path().join("vod").join("seg0.ts").to_string_lossy()
        );
    }

    #[tokio::test]
    async fn test_load_parse_error_is_terminal() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mixed.m3u8");
        std::fs::write(&path, MIXED).unwrap();

        let err = load(
            path.to_str().unwrap(),
            &Default::default(),
            &ParserConfig::default(),
        )
        .await
        .unwrap_err();
        assert!(matches!(
            err,
            LoadError::Parse(ParseError::StructuralConflict { .. })
        ));
    }
}
