//! Playlist data model
//!
//! A [`Playlist`] is either a master (variant) playlist holding
//! [`VariantStream`]s, [`IFrameStream`]s and [`Media`] renditions, or a media
//! playlist holding an ordered list of [`Segment`]s. Never both.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

use crate::config::{ParserConfig, ReloadPolicy};
use crate::error::ParseError;

/// Session cookies captured by the loader
pub type Cookies = BTreeMap<String, String>;

/// `#EXT-X-PLAYLIST-TYPE`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlaylistType {
    Vod,
    Event,
}

impl PlaylistType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PlaylistType::Vod => "VOD",
            PlaylistType::Event => "EVENT",
        }
    }
}

/// `<length>[@<offset>]`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ByteRange {
    pub length: u64,
    pub offset: Option<u64>,
}

impl fmt::Display for ByteRange {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.offset {
            Some(offset) => write!(f, "{}@{}", self.length, offset),
            None => write!(f, "{}", self.length),
        }
    }
}

/// `<width>x<height>`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resolution {
    pub width: u32,
    pub height: u32,
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Encryption method of an `#EXT-X-KEY`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum KeyMethod {
    None,
    Aes128,
    SampleAes,
    Other(String),
}

impl KeyMethod {
    pub fn as_str(&self) -> &str {
        match self {
            KeyMethod::None => "NONE",
            KeyMethod::Aes128 => "AES-128",
            KeyMethod::SampleAes => "SAMPLE-AES",
            KeyMethod::Other(s) => s,
        }
    }
}

/// Encryption key descriptor, owned by each segment it applies to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Key {
    pub method: KeyMethod,
    pub uri: Option<String>,
    pub iv: Option<String>,
    pub keyformat: Option<String>,
    pub keyformatversions: Option<String>,
}

/// `#EXT-X-MAP` media initialization section
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InitSection {
    pub uri: String,
    pub byte_range: Option<ByteRange>,
}

/// `#EXT-X-START`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StartPoint {
    pub time_offset: f64,
    pub precise: bool,
}

/// One media segment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    /// URI resolved against the playlist's base reference
    pub uri: String,
    /// Duration in seconds from `#EXTINF`
    pub duration: f64,
    pub title: Option<String>,
    pub byte_range: Option<ByteRange>,
    /// `#EXT-X-DISCONTINUITY` precedes this segment
    pub discontinuity: bool,
    pub key: Option<Key>,
    /// Explicit `#EXT-X-PROGRAM-DATE-TIME`, or extrapolated from the last one
    pub program_date_time: Option<DateTime<FixedOffset>>,
    pub cue_out: bool,
    pub cue_in: bool,
    pub init_section: Option<InitSection>,
}

impl Segment {
    /// Program date time at which this segment ends, if it has one and the
    /// result is representable
    pub fn end_date_time(&self) -> Option<DateTime<FixedOffset>> {
        let micros = (self.duration * 1_000_000.0).round() as i64;
        self.program_date_time?
            .checked_add_signed(chrono::Duration::microseconds(micros))
    }
}

/// A variant stream of a master playlist (`#EXT-X-STREAM-INF`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariantStream {
    pub uri: String,
    pub bandwidth: u64,
    pub average_bandwidth: Option<u64>,
    pub program_id: Option<u64>,
    pub resolution: Option<Resolution>,
    pub codecs: Option<String>,
    pub frame_rate: Option<f64>,
    /// Group ids referencing [`Media`] entries
    pub audio: Option<String>,
    pub video: Option<String>,
    pub subtitles: Option<String>,
    pub closed_captions: Option<String>,
    /// Attributes without a dedicated field, in source order
    pub extra: Vec<(String, String)>,
}

/// An I-frame only variant (`#EXT-X-I-FRAME-STREAM-INF`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IFrameStream {
    pub uri: String,
    pub bandwidth: u64,
    pub program_id: Option<u64>,
    pub resolution: Option<Resolution>,
    pub codecs: Option<String>,
    pub extra: Vec<(String, String)>,
}

/// Rendition type of an `#EXT-X-MEDIA`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MediaType {
    Audio,
    Video,
    Subtitles,
    ClosedCaptions,
}

impl MediaType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaType::Audio => "AUDIO",
            MediaType::Video => "VIDEO",
            MediaType::Subtitles => "SUBTITLES",
            MediaType::ClosedCaptions => "CLOSED-CAPTIONS",
        }
    }
}

/// An alternate rendition (`#EXT-X-MEDIA`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Media {
    pub media_type: MediaType,
    pub group_id: String,
    pub name: String,
    pub language: Option<String>,
    pub assoc_language: Option<String>,
    pub is_default: bool,
    pub is_autoselect: bool,
    pub is_forced: bool,
    pub instream_id: Option<String>,
    pub characteristics: Option<String>,
    pub channels: Option<String>,
    pub uri: Option<String>,
    pub extra: Vec<(String, String)>,
}

/// A parsed M3U8 playlist
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Playlist {
    pub is_variant: bool,
    pub version: Option<u32>,
    pub target_duration: Option<f64>,
    pub media_sequence: Option<u64>,
    pub discontinuity_sequence: Option<u64>,
    pub playlist_type: Option<PlaylistType>,
    pub allow_cache: Option<bool>,
    pub is_endlist: bool,
    pub is_i_frames_only: bool,
    pub is_independent_segments: bool,
    /// First `#EXT-X-PROGRAM-DATE-TIME` in the playlist
    pub program_date_time: Option<DateTime<FixedOffset>>,
    pub start: Option<StartPoint>,

    pub segments: Vec<Segment>,
    pub streams: Vec<VariantStream>,
    pub iframe_streams: Vec<IFrameStream>,
    pub media: Vec<Media>,
    /// Distinct keys in order of first appearance
    pub keys: Vec<Key>,

    /// Directory-style reference relative URIs were resolved against
    pub base_reference: Option<String>,
    pub cookies: Option<Cookies>,
    /// Raw text of directives that were recognised as unknown and skipped
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub unknown_tags: Vec<String>,
}

impl Playlist {
    /// Empty media playlist
    pub fn new() -> Self {
        Self::default()
    }

    /// Sum of all segment durations in seconds
    pub fn total_duration(&self) -> f64 {
        self.segments.iter().map(|s| s.duration).sum()
    }

    /// Target duration derived from the segments: the longest duration,
    /// rounded up to whole seconds.
    pub fn computed_target_duration(&self) -> u64 {
        self.segments
            .iter()
            .map(|s| s.duration)
            .fold(0.0f64, f64::max)
            .ceil() as u64
    }

    /// Absolute media sequence number of the segment at `index`
    pub fn segment_sequence(&self, index: usize) -> u64 {
        self.media_sequence.unwrap_or(0).saturating_add(index as u64)
    }

    /// All renditions in a media group
    pub fn media_group<'a>(&'a self, group_id: &'a str) -> impl Iterator<Item = &'a Media> + 'a {
        self.media.iter().filter(move |m| m.group_id == group_id)
    }

    /// Renditions referenced by a variant stream through its group ids
    pub fn renditions_for(&self, stream: &VariantStream) -> Vec<&Media> {
        let groups = [
            (MediaType::Audio, &stream.audio),
            (MediaType::Video, &stream.video),
            (MediaType::Subtitles, &stream.subtitles),
            (MediaType::ClosedCaptions, &stream.closed_captions),
        ];
        groups
            .iter()
            .filter_map(|(ty, group)| group.as_deref().map(|g| (*ty, g)))
            .flat_map(|(ty, group)| {
                self.media
                    .iter()
                    .filter(move |m| m.media_type == ty && m.group_id == group)
            })
            .collect()
    }

    /// Append a segment; fails on a variant playlist.
    pub fn push_segment(&mut self, segment: Segment) -> Result<(), ParseError> {
        if self.is_variant {
            return Err(ParseError::StructuralConflict {
                line: 0,
                content: format!("segment {}", segment.uri),
            });
        }
        if let Some(key) = &segment.key {
            self.remember_key(key);
        }
        self.segments.push(segment);
        Ok(())
    }

    /// Append a variant stream; fails on a media playlist with segments.
    pub fn push_stream(&mut self, stream: VariantStream) -> Result<(), ParseError> {
        self.mark_variant(&stream.uri)?;
        self.streams.push(stream);
        Ok(())
    }

    /// Append an I-frame stream; fails on a media playlist with segments.
    pub fn push_iframe_stream(&mut self, stream: IFrameStream) -> Result<(), ParseError> {
        self.mark_variant(&stream.uri)?;
        self.iframe_streams.push(stream);
        Ok(())
    }

    pub fn push_media(&mut self, media: Media) {
        self.media.push(media);
    }

    fn mark_variant(&mut self, uri: &str) -> Result<(), ParseError> {
        if !self.segments.is_empty() {
            return Err(ParseError::StructuralConflict {
                line: 0,
                content: format!("variant stream {}", uri),
            });
        }
        self.is_variant = true;
        Ok(())
    }

    pub(crate) fn remember_key(&mut self, key: &Key) {
        if !self.keys.contains(key) {
            self.keys.push(key.clone());
        }
    }

    /// Re-parse fresh text (e.g. a refreshed live playlist) into this
    /// playlist, keeping its base reference and cookies.
    ///
    /// With [`ReloadPolicy::Merge`], segments of a media playlist whose
    /// sequence number is past the last one held are appended. Variant
    /// playlists, playlists without `#EXT-X-MEDIA-SEQUENCE`, and refreshes
    /// that skipped past our window are replaced instead. Returns the number
    /// of segments added.
    pub fn reload(&mut self, text: &str, config: &ParserConfig) -> Result<usize, ParseError> {
        let fresh = super::builder::parse_with(
            text,
            self.base_reference.as_deref(),
            self.cookies.clone(),
            config,
        )?;

        match config.reload_policy {
            ReloadPolicy::Replace => Ok(self.replace(fresh)),
            ReloadPolicy::Merge => Ok(self.merge(fresh)),
        }
    }

    fn replace(&mut self, fresh: Playlist) -> usize {
        let added = fresh.segments.len();
        *self = fresh;
        added
    }

    fn merge(&mut self, fresh: Playlist) -> usize {
        let fresh_start = match fresh.media_sequence {
            Some(seq) if !self.is_variant && !fresh.is_variant && !self.segments.is_empty() => seq,
            _ => return self.replace(fresh),
        };

        let next = match self
            .media_sequence
            .unwrap_or(0)
            .checked_add(self.segments.len() as u64)
        {
            Some(next) => next,
            None => return self.replace(fresh),
        };
        if fresh_start > next {
            tracing::warn!(
                "Reload skipped from sequence {} to {}, replacing playlist",
                next,
                fresh_start
            );
            return self.replace(fresh);
        }

        let skip = (next - fresh_start) as usize;
        let new_segments: Vec<Segment> = fresh.segments.into_iter().skip(skip).collect();
        let added = new_segments.len();
        for segment in &new_segments {
            if let Some(key) = &segment.key {
                self.remember_key(key);
            }
        }
        self.segments.extend(new_segments);

        self.is_endlist = fresh.is_endlist;
        self.target_duration = fresh.target_duration.or(self.target_duration);
        self.version = fresh.version.or(self.version);
        self.playlist_type = fresh.playlist_type.or(self.playlist_type);

        tracing::debug!("Reload appended {} segments", added);
        added
    }
}
