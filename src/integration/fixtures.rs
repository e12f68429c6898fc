//! Test fixtures for integration tests
//!
//! Sample playlists covering the shapes seen in the wild.

/// Base reference used when parsing fixtures
pub const BASE: &str = "http://media.example.com/content/";

/// A sample playlist and what parsing it should produce
#[derive(Debug, Clone)]
pub struct TestPlaylist {
    pub name: &'static str,
    pub description: &'static str,
    pub text: &'static str,
    pub is_variant: bool,
    pub expected_segments: usize,
    pub expected_streams: usize,
}

impl TestPlaylist {
    /// Plain VOD media playlist
    pub fn simple_vod() -> Self {
        Self {
            name: "simple_vod",
            description: "Three segments, relative URIs, ENDLIST",
            text: "#EXTM3U
#EXT-X-VERSION:3
#EXT-X-TARGETDURATION:10
#EXT-X-MEDIA-SEQUENCE:0
#EXT-X-PLAYLIST-TYPE:VOD
#EXTINF:9.009,
seg0.ts
#EXTINF:9.009,
seg1.ts
#EXTINF:3.003,
seg2.ts
#EXT-X-ENDLIST",
            is_variant: false,
            expected_segments: 3,
            expected_streams: 0,
        }
    }

    /// Master playlist with renditions and an I-frame variant
    pub fn master() -> Self {
        Self {
            name: "master",
            description: "Audio and subtitle groups, two variants, one I-frame variant",
            text: r#"#EXTM3U
#EXT-X-INDEPENDENT-SEGMENTS
#EXT-X-MEDIA:TYPE=AUDIO,GROUP-ID="aud",NAME="English",LANGUAGE="en",DEFAULT=YES,AUTOSELECT=YES,URI="audio/en/index.m3u8"
#EXT-X-MEDIA:TYPE=AUDIO,GROUP-ID="aud",NAME="Deutsch",LANGUAGE="de",URI="audio/de/index.m3u8"
#EXT-X-MEDIA:TYPE=SUBTITLES,GROUP-ID="subs",NAME="English",LANGUAGE="en",URI="subs/en/index.m3u8"
#EXT-X-STREAM-INF:BANDWIDTH=1280000,AVERAGE-BANDWIDTH=1000000,RESOLUTION=640x360,CODECS="avc1.4d401e,mp4a.40.2",AUDIO="aud",SUBTITLES="subs"
video/360p/index.m3u8
#EXT-X-STREAM-INF:BANDWIDTH=5120000,RESOLUTION=1920x1080,FRAME-RATE=29.970,CODECS="avc1.640028,mp4a.40.2",AUDIO="aud",SUBTITLES="subs"
https://cdn.example.com/video/1080p/index.m3u8
#EXT-X-I-FRAME-STREAM-INF:BANDWIDTH=86000,RESOLUTION=640x360,CODECS="avc1.4d401e",URI="video/360p/iframes.m3u8"
"#,
            is_variant: true,
            expected_segments: 0,
            expected_streams: 2,
        }
    }

    /// Encrypted fMP4 playlist with byte ranges and program date time
    pub fn encrypted() -> Self {
        Self {
            name: "encrypted",
            description: "Key rotation, init section, byte ranges, discontinuity, PDT",
            text: r#"#EXTM3U
#EXT-X-VERSION:7
#EXT-X-TARGETDURATION:6
#EXT-X-MEDIA-SEQUENCE:100
#EXT-X-MAP:URI="init.mp4"
#EXT-X-KEY:METHOD=AES-128,URI="keys/1.key",IV=0x00000000000000000000000000000001
#EXT-X-PROGRAM-DATE-TIME:2024-01-01T00:00:00Z
#EXTINF:6.0,
#EXT-X-BYTERANGE:1000@0
media.mp4
#EXTINF:6.0,
#EXT-X-BYTERANGE:1200@1000
media.mp4
#EXT-X-KEY:METHOD=AES-128,URI="keys/2.key"
#EXT-X-DISCONTINUITY
#EXT-X-CUE-OUT:30
#EXTINF:4.5,ad
ad/0.mp4
#EXT-X-CUE-IN
#EXT-X-KEY:METHOD=NONE
#EXTINF:6.0,
media2.mp4
#EXT-X-ENDLIST
"#,
            is_variant: false,
            expected_segments: 4,
            expected_streams: 0,
        }
    }

    /// Vendor extensions sprinkled between standard tags
    pub fn vendor_tags() -> Self {
        Self {
            name: "vendor_tags",
            description: "Unknown directives and comments are skipped",
            text: "#EXTM3U
#EXT-X-TARGETDURATION:4
# generated by encoder v2
#EXT-X-FOO:bar
#EXT-X-SCTE35:CUE=\"/DAlAAAAAAAAAP/wFAUAAAABf+/+AAAAAAAAAAAAAAAAAA==\"
#EXTINF:4,
a.ts
#EXT-X-DATERANGE:ID=\"x\",START-DATE=\"2024-01-01T00:00:00Z\"
#EXTINF:4,
b.ts
",
            is_variant: false,
            expected_segments: 2,
            expected_streams: 0,
        }
    }

    /// All well-formed fixtures
    pub fn all() -> Vec<Self> {
        vec![
            Self::simple_vod(),
            Self::master(),
            Self::encrypted(),
            Self::vendor_tags(),
        ]
    }
}

/// Live window starting at sequence 10
pub const LIVE_WINDOW_1: &str = "#EXTM3U
#EXT-X-TARGETDURATION:6
#EXT-X-MEDIA-SEQUENCE:10
#EXTINF:6,
seg10.ts
#EXTINF:6,
seg11.ts
#EXTINF:6,
seg12.ts";

/// The same live stream one segment later
pub const LIVE_WINDOW_2: &str = "#EXTM3U
#EXT-X-TARGETDURATION:6
#EXT-X-MEDIA-SEQUENCE:11
#EXTINF:6,
seg11.ts
#EXTINF:6,
seg12.ts
#EXTINF:6,
seg13.ts";

/// Final refresh of the live stream
pub const LIVE_WINDOW_END: &str = "#EXTM3U
#EXT-X-TARGETDURATION:6
#EXT-X-MEDIA-SEQUENCE:12
#EXTINF:6,
seg12.ts
#EXTINF:6,
seg13.ts
#EXTINF:5,
seg14.ts
#EXT-X-ENDLIST";

/// A refresh that jumped well past the held window
pub const LIVE_WINDOW_GAP: &str = "#EXTM3U
#EXT-X-TARGETDURATION:6
#EXT-X-MEDIA-SEQUENCE:40
#EXTINF:6,
seg40.ts
#EXTINF:6,
seg41.ts";

/// Segment and variant entries in one document
pub const MIXED: &str = "#EXTM3U
#EXTINF:10,
seg.ts
#EXT-X-STREAM-INF:BANDWIDTH=1000
low.m3u8";
