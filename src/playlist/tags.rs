//! Directive parser
//!
//! Turns one `#EXT...` directive into a typed [`Tag`]. The set of known tags
//! is closed; anything else becomes [`Tag::Unknown`] and is skipped by the
//! builder rather than rejected.

use chrono::{DateTime, FixedOffset};

use super::attributes::{parse_number, AttributeList};
use super::model::{
    ByteRange, IFrameStream, InitSection, Key, KeyMethod, Media, MediaType, PlaylistType,
    Resolution, StartPoint, VariantStream,
};
use crate::error::ParseError;

pub const EXTINF: &str = "#EXTINF";
pub const STREAM_INF: &str = "#EXT-X-STREAM-INF";
pub const I_FRAME_STREAM_INF: &str = "#EXT-X-I-FRAME-STREAM-INF";

/// A recognised playlist directive. URIs inside tags are not yet resolved.
#[derive(Debug, Clone, PartialEq)]
pub enum Tag {
    Header,
    Version(u32),
    TargetDuration(f64),
    MediaSequence(u64),
    DiscontinuitySequence(u64),
    PlaylistType(PlaylistType),
    AllowCache(bool),
    IFramesOnly,
    IndependentSegments,
    Start(StartPoint),
    EndList,

    /// `#EXTINF:<duration>,[<title>]`; the next URI line completes it
    Inf {
        duration: f64,
        title: Option<String>,
    },
    ByteRange(ByteRange),
    Discontinuity,
    Key(Key),
    Map(InitSection),
    ProgramDateTime(DateTime<FixedOffset>),
    CueOut,
    CueOutCont,
    CueIn,

    /// `#EXT-X-STREAM-INF`; `uri` is empty until the next URI line
    StreamInf(VariantStream),
    IFrameStreamInf(IFrameStream),
    Media(Media),

    /// Not part of the supported vocabulary
    Unknown,
}

impl Tag {
    /// Parse the directive `tag` with its optional `:value` part.
    pub fn parse(tag: &str, value: Option<&str>, line: usize) -> Result<Tag, ParseError> {
        let v = value.unwrap_or("");
        let tag = match tag {
            "#EXTM3U" => Tag::Header,
            "#EXT-X-VERSION" => Tag::Version(parse_number(tag, v, line)?),
            "#EXT-X-TARGETDURATION" => Tag::TargetDuration(parse_duration(tag, v, line)?),
            "#EXT-X-MEDIA-SEQUENCE" => Tag::MediaSequence(parse_number(tag, v, line)?),
            "#EXT-X-DISCONTINUITY-SEQUENCE" => {
                Tag::DiscontinuitySequence(parse_number(tag, v, line)?)
            }
            "#EXT-X-PLAYLIST-TYPE" => Tag::PlaylistType(parse_playlist_type(tag, v, line)?),
            "#EXT-X-ALLOW-CACHE" => Tag::AllowCache(parse_yes_no(tag, v, line)?),
            "#EXT-X-I-FRAMES-ONLY" => Tag::IFramesOnly,
            "#EXT-X-INDEPENDENT-SEGMENTS" => Tag::IndependentSegments,
            "#EXT-X-START" => Tag::Start(parse_start(tag, v, line)?),
            "#EXT-X-ENDLIST" => Tag::EndList,

            EXTINF => parse_inf(v, line)?,
            "#EXT-X-BYTERANGE" => Tag::ByteRange(parse_byte_range(tag, v, line)?),
            "#EXT-X-DISCONTINUITY" => Tag::Discontinuity,
            "#EXT-X-KEY" => Tag::Key(parse_key(tag, v, line)?),
            "#EXT-X-MAP" => Tag::Map(parse_map(tag, v, line)?),
            "#EXT-X-PROGRAM-DATE-TIME" => Tag::ProgramDateTime(parse_date_time(tag, v, line)?),
            "#EXT-X-CUE-OUT" => Tag::CueOut,
            "#EXT-X-CUE-OUT-CONT" => Tag::CueOutCont,
            "#EXT-X-CUE-IN" => Tag::CueIn,

            STREAM_INF => Tag::StreamInf(parse_stream_inf(v, line)?),
            I_FRAME_STREAM_INF => Tag::IFrameStreamInf(parse_iframe_stream_inf(v, line)?),
            "#EXT-X-MEDIA" => Tag::Media(parse_media(tag, v, line)?),

            _ => Tag::Unknown,
        };
        Ok(tag)
    }
}

fn parse_duration(tag: &str, value: &str, line: usize) -> Result<f64, ParseError> {
    let duration: f64 = parse_number(tag, value, line)?;
    if !duration.is_finite() || duration < 0.0 {
        return Err(ParseError::malformed(tag, value, line));
    }
    Ok(duration)
}

fn parse_inf(value: &str, line: usize) -> Result<Tag, ParseError> {
    let (duration, title) = match value.split_once(',') {
        Some((d, t)) => (d, t.trim()),
        None => (value, ""),
    };
    Ok(Tag::Inf {
        duration: parse_duration(EXTINF, duration, line)?,
        title: (!title.is_empty()).then(|| title.to_string()),
    })
}

fn parse_playlist_type(tag: &str, value: &str, line: usize) -> Result<PlaylistType, ParseError> {
    match value.trim().to_ascii_uppercase().as_str() {
        "VOD" => Ok(PlaylistType::Vod),
        "EVENT" => Ok(PlaylistType::Event),
        _ => Err(ParseError::malformed(tag, value, line)),
    }
}

fn parse_yes_no(tag: &str, value: &str, line: usize) -> Result<bool, ParseError> {
    match value.trim().to_ascii_uppercase().as_str() {
        "YES" => Ok(true),
        "NO" => Ok(false),
        _ => Err(ParseError::malformed(tag, value, line)),
    }
}

fn parse_start(tag: &str, value: &str, line: usize) -> Result<StartPoint, ParseError> {
    let attrs = AttributeList::parse(value);
    let offset = attrs.require(tag, "TIME-OFFSET", line)?;
    Ok(StartPoint {
        time_offset: parse_number(tag, offset, line)?,
        precise: attrs.flag("PRECISE"),
    })
}

pub(crate) fn parse_byte_range(tag: &str, value: &str, line: usize) -> Result<ByteRange, ParseError> {
    let (length, offset) = match value.split_once('@') {
        Some((l, o)) => (l, Some(o)),
        None => (value, None),
    };
    Ok(ByteRange {
        length: parse_number(tag, length, line)?,
        offset: offset.map(|o| parse_number(tag, o, line)).transpose()?,
    })
}

fn parse_resolution(tag: &str, value: &str, line: usize) -> Result<Resolution, ParseError> {
    let (w, h) = value
        .split_once(['x', 'X'])
        .ok_or_else(|| ParseError::malformed(tag, value, line))?;
    Ok(Resolution {
        width: parse_number(tag, w, line)?,
        height: parse_number(tag, h, line)?,
    })
}

fn parse_key(tag: &str, value: &str, line: usize) -> Result<Key, ParseError> {
    let attrs = AttributeList::parse(value);
    let method = match attrs.require(tag, "METHOD", line)? {
        "NONE" => KeyMethod::None,
        "AES-128" => KeyMethod::Aes128,
        "SAMPLE-AES" => KeyMethod::SampleAes,
        other => KeyMethod::Other(other.to_string()),
    };
    Ok(Key {
        method,
        uri: attrs.get("URI").map(str::to_string),
        iv: attrs.get("IV").map(str::to_string),
        keyformat: attrs.get("KEYFORMAT").map(str::to_string),
        keyformatversions: attrs.get("KEYFORMATVERSIONS").map(str::to_string),
    })
}

fn parse_map(tag: &str, value: &str, line: usize) -> Result<InitSection, ParseError> {
    let attrs = AttributeList::parse(value);
    Ok(InitSection {
        uri: attrs.require(tag, "URI", line)?.to_string(),
        byte_range: attrs
            .get("BYTERANGE")
            .map(|r| parse_byte_range(tag, r, line))
            .transpose()?,
    })
}

fn parse_date_time(
    tag: &str,
    value: &str,
    line: usize,
) -> Result<DateTime<FixedOffset>, ParseError> {
    let value = value.trim();
    DateTime::parse_from_rfc3339(value)
        .or_else(|_| DateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f%z"))
        .map_err(|_| ParseError::malformed(tag, value, line))
}

fn parse_stream_inf(value: &str, line: usize) -> Result<VariantStream, ParseError> {
    const KNOWN: &[&str] = &[
        "BANDWIDTH",
        "AVERAGE-BANDWIDTH",
        "PROGRAM-ID",
        "RESOLUTION",
        "CODECS",
        "FRAME-RATE",
        "AUDIO",
        "VIDEO",
        "SUBTITLES",
        "CLOSED-CAPTIONS",
    ];
    let tag = STREAM_INF;
    let attrs = AttributeList::parse(value);
    let owned = |key: &str| attrs.get(key).map(str::to_string);

    Ok(VariantStream {
        uri: String::new(),
        bandwidth: parse_number(tag, attrs.require(tag, "BANDWIDTH", line)?, line)?,
        average_bandwidth: attrs.parse_opt(tag, "AVERAGE-BANDWIDTH", line)?,
        program_id: attrs.parse_opt(tag, "PROGRAM-ID", line)?,
        resolution: attrs
            .get("RESOLUTION")
            .map(|r| parse_resolution(tag, r, line))
            .transpose()?,
        codecs: owned("CODECS"),
        frame_rate: attrs.parse_opt(tag, "FRAME-RATE", line)?,
        audio: owned("AUDIO"),
        video: owned("VIDEO"),
        subtitles: owned("SUBTITLES"),
        closed_captions: owned("CLOSED-CAPTIONS"),
        extra: attrs.extra(KNOWN),
    })
}

fn parse_iframe_stream_inf(value: &str, line: usize) -> Result<IFrameStream, ParseError> {
    const KNOWN: &[&str] = &["URI", "BANDWIDTH", "PROGRAM-ID", "RESOLUTION", "CODECS"];
    let tag = I_FRAME_STREAM_INF;
    let attrs = AttributeList::parse(value);

    Ok(IFrameStream {
        uri: attrs.require(tag, "URI", line)?.to_string(),
        bandwidth: parse_number(tag, attrs.require(tag, "BANDWIDTH", line)?, line)?,
        program_id: attrs.parse_opt(tag, "PROGRAM-ID", line)?,
        resolution: attrs
            .get("RESOLUTION")
            .map(|r| parse_resolution(tag, r, line))
            .transpose()?,
        codecs: attrs.get("CODECS").map(str::to_string),
        extra: attrs.extra(KNOWN),
    })
}

fn parse_media(tag: &str, value: &str, line: usize) -> Result<Media, ParseError> {
    const KNOWN: &[&str] = &[
        "TYPE",
        "GROUP-ID",
        "NAME",
        "LANGUAGE",
        "ASSOC-LANGUAGE",
        "DEFAULT",
        "AUTOSELECT",
        "FORCED",
        "INSTREAM-ID",
        "CHARACTERISTICS",
        "CHANNELS",
        "URI",
    ];
    let attrs = AttributeList::parse(value);
    let owned = |key: &str| attrs.get(key).map(str::to_string);

    let media_type = match attrs.require(tag, "TYPE", line)? {
        "AUDIO" => MediaType::Audio,
        "VIDEO" => MediaType::Video,
        "SUBTITLES" => MediaType::Subtitles,
        "CLOSED-CAPTIONS" => MediaType::ClosedCaptions,
        other => return Err(ParseError::malformed(tag, other, line)),
    };

    Ok(Media {
        media_type,
        group_id: attrs.require(tag, "GROUP-ID", line)?.to_string(),
        name: attrs.require(tag, "NAME", line)?.to_string(),
        language: owned("LANGUAGE"),
        assoc_language: owned("ASSOC-LANGUAGE"),
        is_default: attrs.flag("DEFAULT"),
        is_autoselect: attrs.flag("AUTOSELECT"),
        is_forced: attrs.flag("FORCED"),
        instream_id: owned("INSTREAM-ID"),
        characteristics: owned("CHARACTERISTICS"),
        channels: owned("CHANNELS"),
        uri: owned("URI"),
        extra: attrs.extra(KNOWN),
    })
}
