use thiserror::Error;

/// Errors raised while turning playlist text into a [`Playlist`](crate::Playlist).
///
/// Every variant is terminal for the parse call that produced it. Unknown
/// tags and unknown attribute keys never produce an error.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    /// The first non-blank line is not `#EXTM3U`
    #[error("Missing #EXTM3U header (first line: {found:?})")]
    MissingHeader { found: Option<String> },

    /// A numeric or enumerated attribute could not be parsed
    #[error("Malformed value for {tag} on line {line}: {value:?}")]
    MalformedAttribute {
        tag: String,
        value: String,
        line: usize,
    },

    /// A required attribute is absent from an attribute list
    #[error("{tag} on line {line} is missing required attribute {attribute}")]
    MissingAttribute {
        tag: String,
        attribute: String,
        line: usize,
    },

    /// Segment and variant stream entries were mixed in one playlist
    #[error("Playlist mixes media segments and variant streams (line {line}: {content})")]
    StructuralConflict { line: usize, content: String },

    /// A URI line appeared without a preceding #EXTINF or #EXT-X-STREAM-INF
    #[error("URI on line {line} has no preceding #EXTINF or #EXT-X-STREAM-INF: {uri}")]
    OrphanUri { line: usize, uri: String },

    /// A pending #EXTINF / #EXT-X-STREAM-INF was never followed by a URI line
    #[error("{tag} on line {line} is never followed by a URI")]
    DanglingDirective { tag: String, line: usize },
}

impl ParseError {
    /// Line number (1-based) the error points at, when there is one.
    pub fn line(&self) -> Option<usize> {
        match self {
            ParseError::MissingHeader { .. } => None,
            ParseError::MalformedAttribute { line, .. }
            | ParseError::MissingAttribute { line, .. }
            | ParseError::StructuralConflict { line, .. }
            | ParseError::OrphanUri { line, .. }
            | ParseError::DanglingDirective { line, .. } => Some(*line),
        }
    }

    pub(crate) fn malformed(tag: &str, value: &str, line: usize) -> Self {
        ParseError::MalformedAttribute {
            tag: tag.to_string(),
            value: value.to_string(),
            line,
        }
    }

    pub(crate) fn missing(tag: &str, attribute: &str, line: usize) -> Self {
        ParseError::MissingAttribute {
            tag: tag.to_string(),
            attribute: attribute.to_string(),
            line,
        }
    }
}

/// Errors raised while fetching and loading a playlist
#[derive(Error, Debug)]
pub enum LoadError {
    /// Reading a local playlist file failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The HTTP request or body download failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The fetch did not complete within the configured timeout
    #[error("Timed out after {secs}s fetching {uri}")]
    Timeout { uri: String, secs: u64 },

    /// The URI could not be parsed as a URL
    #[error("Invalid URL {uri}: {reason}")]
    InvalidUrl { uri: String, reason: String },

    /// The fetched text is not a valid playlist
    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),
}

/// Result type alias for loader operations
pub type Result<T> = std::result::Result<T, LoadError>;
