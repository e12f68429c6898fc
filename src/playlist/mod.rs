//! Playlist parsing and model
//!
//! This module handles M3U8 playlists end to end:
//! - Tokenizing text into directive and URI lines
//! - Quote-aware attribute lists
//! - Typed directive parsing with lenient handling of unknown tags
//! - The single-pass builder that produces a [`Playlist`]
//! - Serializing a [`Playlist`] back to M3U8 text

pub mod attributes;
pub mod builder;
pub mod model;
pub mod serialize;
pub mod tags;
pub mod tokenizer;

pub use builder::{parse, parse_with};
pub use model::{
    ByteRange, Cookies, IFrameStream, InitSection, Key, KeyMethod, Media, MediaType, Playlist,
    PlaylistType, Resolution, Segment, StartPoint, VariantStream,
};
pub use tags::Tag;
pub use tokenizer::{tokenize, Line, Lines};
