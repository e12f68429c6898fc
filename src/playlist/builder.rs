//! Single-pass playlist builder
//!
//! Walks the tokenized lines once, feeding each parsed [`Tag`] into a small
//! state machine. Segment-scoped directives accumulate until a URI line
//! commits them as a [`Segment`] or [`VariantStream`].

use chrono::{DateTime, FixedOffset};

use super::model::{
    ByteRange, Cookies, InitSection, Key, KeyMethod, Playlist, Segment, VariantStream,
};
use super::tags::{Tag, EXTINF, STREAM_INF};
use super::tokenizer::{tokenize, Line};
use crate::config::{DanglingPolicy, ParserConfig};
use crate::error::ParseError;
use crate::url::resolve;

/// Parse playlist text with the default [`ParserConfig`].
///
/// `base_reference` is the directory relative URIs are resolved against;
/// `cookies` are attached to the returned playlist untouched.
pub fn parse(
    text: &str,
    base_reference: Option<&str>,
    cookies: Option<Cookies>,
) -> Result<Playlist, ParseError> {
    parse_with(text, base_reference, cookies, &ParserConfig::default())
}

/// Parse playlist text with an explicit configuration.
pub fn parse_with(
    text: &str,
    base_reference: Option<&str>,
    cookies: Option<Cookies>,
    config: &ParserConfig,
) -> Result<Playlist, ParseError> {
    let mut builder = Builder::new(base_reference, config);
    for line in tokenize(text)? {
        builder.feed(line)?;
    }
    let mut playlist = builder.finish()?;
    playlist.cookies = cookies;

    tracing::debug!(
        "Parsed {} playlist: {} segments, {} streams, {} media, {} unknown tags",
        if playlist.is_variant { "variant" } else { "media" },
        playlist.segments.len(),
        playlist.streams.len(),
        playlist.media.len(),
        playlist.unknown_tags.len()
    );
    Ok(playlist)
}

#[derive(Debug)]
enum State {
    AwaitingHeader,
    Streaming(Pending),
}

/// Entry announced by a directive and waiting for its URI line
#[derive(Debug)]
enum Pending {
    Idle,
    Segment {
        line: usize,
        duration: f64,
        title: Option<String>,
    },
    Stream {
        line: usize,
        stream: VariantStream,
    },
}

/// Segment-scoped directives seen since the last committed segment
#[derive(Debug, Default)]
struct SegmentAttributes {
    byte_range: Option<ByteRange>,
    discontinuity: bool,
    program_date_time: Option<DateTime<FixedOffset>>,
    cue_out: bool,
    cue_in: bool,
}

struct Builder<'a> {
    base: Option<&'a str>,
    config: &'a ParserConfig,
    state: State,
    playlist: Playlist,
    attributes: SegmentAttributes,
    current_key: Option<Key>,
    current_map: Option<InitSection>,
    /// Extrapolated program date time of the next segment
    next_program_date_time: Option<DateTime<FixedOffset>>,
}

impl<'a> Builder<'a> {
    fn new(base: Option<&'a str>, config: &'a ParserConfig) -> Self {
        let playlist = Playlist {
            base_reference: base.filter(|b| !b.is_empty()).map(str::to_string),
            ..Playlist::default()
        };
        Self {
            base,
            config,
            state: State::AwaitingHeader,
            playlist,
            attributes: SegmentAttributes::default(),
            current_key: None,
            current_map: None,
            next_program_date_time: None,
        }
    }

    fn feed(&mut self, line: Line<'_>) -> Result<(), ParseError> {
        match line {
            Line::Directive { number, tag, value } => {
                let parsed = Tag::parse(tag, value, number)?;
                if let State::AwaitingHeader = self.state {
                    return match parsed {
                        Tag::Header => {
                            self.state = State::Streaming(Pending::Idle);
                            Ok(())
                        }
                        _ => Err(ParseError::MissingHeader {
                            found: Some(tag.to_string()),
                        }),
                    };
                }
                self.apply(parsed, number, tag, value)
            }
            Line::Uri { number, text } => self.commit(number, text),
        }
    }

    fn apply(
        &mut self,
        tag: Tag,
        line: usize,
        raw_tag: &str,
        raw_value: Option<&str>,
    ) -> Result<(), ParseError> {
        let p = &mut self.playlist;
        match tag {
            // Duplicate header lines are harmless
            Tag::Header => {}
            Tag::Version(v) => p.version = Some(v),
            Tag::TargetDuration(d) => p.target_duration = Some(d),
            Tag::MediaSequence(s) => p.media_sequence = Some(s),
            Tag::DiscontinuitySequence(s) => p.discontinuity_sequence = Some(s),
            Tag::PlaylistType(t) => p.playlist_type = Some(t),
            Tag::AllowCache(c) => p.allow_cache = Some(c),
            Tag::IFramesOnly => p.is_i_frames_only = true,
            Tag::IndependentSegments => p.is_independent_segments = true,
            Tag::Start(s) => p.start = Some(s),
            Tag::EndList => p.is_endlist = true,

            Tag::Inf { duration, title } => {
                if p.is_variant {
                    return Err(conflict(line, raw_tag, raw_value));
                }
                self.announce(Pending::Segment {
                    line,
                    duration,
                    title,
                })?;
            }
            Tag::ByteRange(r) => self.attributes.byte_range = Some(r),
            Tag::Discontinuity => self.attributes.discontinuity = true,
            Tag::CueOut | Tag::CueOutCont => self.attributes.cue_out = true,
            Tag::CueIn => self.attributes.cue_in = true,
            Tag::ProgramDateTime(dt) => {
                if p.program_date_time.is_none() {
                    p.program_date_time = Some(dt);
                }
                self.attributes.program_date_time = Some(dt);
            }
            Tag::Key(mut key) => {
                self.current_key = match key.method {
                    KeyMethod::None => None,
                    _ => {
                        key.uri = key.uri.map(|u| resolve(self.base, &u));
                        Some(key)
                    }
                };
            }
            Tag::Map(mut map) => {
                map.uri = resolve(self.base, &map.uri);
                self.current_map = Some(map);
            }

            Tag::StreamInf(stream) => {
                self.check_no_segments(line, raw_tag, raw_value)?;
                self.playlist.is_variant = true;
                self.announce(Pending::Stream { line, stream })?;
            }
            Tag::IFrameStreamInf(mut stream) => {
                self.check_no_segments(line, raw_tag, raw_value)?;
                stream.uri = resolve(self.base, &stream.uri);
                self.playlist.push_iframe_stream(stream)?;
            }
            Tag::Media(mut media) => {
                media.uri = media.uri.map(|u| resolve(self.base, &u));
                p.push_media(media);
            }

            Tag::Unknown => {
                let raw = match raw_value {
                    Some(v) => format!("{}:{}", raw_tag, v),
                    None => raw_tag.to_string(),
                };
                tracing::debug!("Skipping unknown tag on line {}: {}", line, raw);
                p.unknown_tags.push(raw);
            }
        }
        Ok(())
    }

    fn check_no_segments(
        &self,
        line: usize,
        raw_tag: &str,
        raw_value: Option<&str>,
    ) -> Result<(), ParseError> {
        let segment_pending = matches!(self.state, State::Streaming(Pending::Segment { .. }));
        if !self.playlist.segments.is_empty() || segment_pending {
            return Err(conflict(line, raw_tag, raw_value));
        }
        Ok(())
    }

    /// Open a new pending entry, settling any entry that is still open.
    fn announce(&mut self, next: Pending) -> Result<(), ParseError> {
        let previous = std::mem::replace(&mut self.state, State::Streaming(next));
        if let State::Streaming(open) = previous {
            self.dangle(open)?;
        }
        Ok(())
    }

    fn dangle(&self, pending: Pending) -> Result<(), ParseError> {
        let (tag, line) = match pending {
            Pending::Idle => return Ok(()),
            Pending::Segment { line, .. } => (EXTINF, line),
            Pending::Stream { line, .. } => (STREAM_INF, line),
        };
        match self.config.dangling_policy {
            DanglingPolicy::Discard => {
                tracing::warn!("Discarding {} on line {}: no URI follows", tag, line);
                Ok(())
            }
            DanglingPolicy::Error => Err(ParseError::DanglingDirective {
                tag: tag.to_string(),
                line,
            }),
        }
    }

    /// A URI line finalizes the pending entry.
    fn commit(&mut self, line: usize, uri: &str) -> Result<(), ParseError> {
        let pending = match std::mem::replace(&mut self.state, State::Streaming(Pending::Idle)) {
            State::Streaming(pending) => pending,
            State::AwaitingHeader => {
                return Err(ParseError::MissingHeader {
                    found: Some(uri.to_string()),
                })
            }
        };

        match pending {
            Pending::Idle => Err(ParseError::OrphanUri {
                line,
                uri: uri.to_string(),
            }),
            Pending::Segment {
                duration, title, ..
            } => {
                if self.playlist.is_variant {
                    return Err(ParseError::StructuralConflict {
                        line,
                        content: uri.to_string(),
                    });
                }
                let attrs = std::mem::take(&mut self.attributes);
                let program_date_time = attrs.program_date_time.or(self.next_program_date_time);

                let segment = Segment {
                    uri: resolve(self.base, uri),
                    duration,
                    title,
                    byte_range: attrs.byte_range,
                    discontinuity: attrs.discontinuity,
                    key: self.current_key.clone(),
                    program_date_time,
                    cue_out: attrs.cue_out,
                    cue_in: attrs.cue_in,
                    init_section: self.current_map.clone(),
                };
                // Extrapolation stops once the timestamp leaves chrono's range
                self.next_program_date_time = segment.end_date_time();
                self.playlist.push_segment(segment)
            }
            Pending::Stream { mut stream, .. } => {
                stream.uri = resolve(self.base, uri);
                self.playlist.push_stream(stream).map_err(|_| {
                    ParseError::StructuralConflict {
                        line,
                        content: uri.to_string(),
                    }
                })
            }
        }
    }

    fn finish(mut self) -> Result<Playlist, ParseError> {
        match std::mem::replace(&mut self.state, State::Streaming(Pending::Idle)) {
            State::AwaitingHeader => return Err(ParseError::MissingHeader { found: None }),
            State::Streaming(open) => self.dangle(open)?,
        }
        Ok(self.playlist)
    }
}

fn conflict(line: usize, tag: &str, value: Option<&str>) -> ParseError {
    ParseError::StructuralConflict {
        line,
        content: match value {
            Some(v) => format!("{}:{}", tag, v),
            None => tag.to_string(),
        },
    }
}
