//! Parser, loader and logging configuration
//!
//! Loaded from TOML; every section and field falls back to its default.

use serde::{Deserialize, Serialize};
use std::path::Path;

/// What to do with an `#EXTINF` / `#EXT-X-STREAM-INF` that is never
/// followed by a URI line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DanglingPolicy {
    /// Drop the pending entry and log a warning
    #[default]
    Discard,
    /// Fail the parse with `ParseError::DanglingDirective`
    Error,
}

/// How `Playlist::reload` combines fresh text with existing state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ReloadPolicy {
    /// Append new segments of a live media playlist
    #[default]
    Merge,
    /// Swap in the freshly parsed playlist
    Replace,
}

/// Parser configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParserConfig {
    pub dangling_policy: DanglingPolicy,
    pub reload_policy: ReloadPolicy,
}

/// Resource loader configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoaderConfig {
    /// Overall fetch timeout in seconds
    pub timeout_secs: u64,

    /// User-Agent header sent with HTTP requests
    pub user_agent: String,

    /// Maximum number of redirects to follow
    pub max_redirects: usize,

    /// Honour HTTP(S)_PROXY / NO_PROXY from the environment
    pub use_system_proxy: bool,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            user_agent: format!("{}/{}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION")),
            max_redirects: 10,
            use_system_proxy: true,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
    /// Output format (json, pretty)
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

impl LoggingConfig {
    pub fn is_json(&self) -> bool {
        self.format.eq_ignore_ascii_case("json")
    }
}

/// Top-level configuration file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub parser: ParserConfig,
    pub loader: LoaderConfig,
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, Box<dyn std::error::Error>> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to a TOML file
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), Box<dyn std::error::Error>> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path.as_ref(), content)?;
        Ok(())
    }
}
