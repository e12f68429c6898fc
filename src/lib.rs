//! M3U8 playlist loading and parsing
//!
//! Parses master and media playlists into a typed model, resolving relative
//! URIs against a base reference, and writes them back out as M3U8 text.
//! Fetching is delegated to a pluggable [`ResourceLoader`].

pub mod config;
pub mod error;
pub mod loader;
pub mod playlist;
pub mod url;

#[cfg(test)]
pub(crate) mod integration;

pub use config::{Config, DanglingPolicy, LoaderConfig, LoggingConfig, ParserConfig, ReloadPolicy};
pub use error::{LoadError, ParseError, Result};
pub use loader::{load, load_with, loads, FileLoader, HttpLoader, Resource, ResourceLoader};
pub use playlist::{
    parse, parse_with, ByteRange, Cookies, IFrameStream, InitSection, Key, KeyMethod, Media,
    MediaType, Playlist, PlaylistType, Resolution, Segment, StartPoint, VariantStream,
};
pub use url::is_url;
