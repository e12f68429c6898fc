//! Resource loading
//!
//! Fetches playlist text from a URL or the filesystem and hands it to the
//! parser together with a base reference and any session cookies. The
//! transport is injected through [`ResourceLoader`]; the parser itself never
//! performs I/O.

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, SET_COOKIE};

use crate::config::{LoaderConfig, ParserConfig};
use crate::error::{LoadError, ParseError, Result};
use crate::playlist::{parse, parse_with, Cookies, Playlist};
use crate::url::{base_reference_for_path, base_reference_for_url, is_url};

/// Fetched playlist text plus the context needed to parse it
#[derive(Debug, Clone, PartialEq)]
pub struct Resource {
    /// Decoded, whitespace-trimmed playlist text
    pub text: String,
    /// Directory-style reference for resolving relative URIs
    pub base_reference: String,
    pub cookies: Option<Cookies>,
}

/// Turns a URI or path into a [`Resource`].
///
/// Implementations must return the complete body or an error; partial data
/// is never handed to the parser.
#[async_trait]
pub trait ResourceLoader: Send + Sync {
    async fn fetch(&self, uri: &str) -> Result<Resource>;
}

/// Reads playlists from the local filesystem
#[derive(Debug, Clone, Copy, Default)]
pub struct FileLoader;

#[async_trait]
impl ResourceLoader for FileLoader {
    async fn fetch(&self, uri: &str) -> Result<Resource> {
        let content = tokio::fs::read_to_string(uri).await?;
        Ok(Resource {
            text: content.trim().to_string(),
            base_reference: base_reference_for_path(Path::new(uri)),
            cookies: None,
        })
    }
}

/// Fetches playlists over HTTP(S)
#[derive(Debug, Clone)]
pub struct HttpLoader {
    client: reqwest::Client,
    timeout: Duration,
}

impl HttpLoader {
    pub fn new(config: &LoaderConfig) -> Result<Self> {
        let mut builder = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .redirect(reqwest::redirect::Policy::limited(config.max_redirects));
        if !config.use_system_proxy {
            builder = builder.no_proxy();
        }
        Ok(Self {
            client: builder.build()?,
            timeout: Duration::from_secs(config.timeout_secs),
        })
    }
}

#[async_trait]
impl ResourceLoader for HttpLoader {
    async fn fetch(&self, uri: &str) -> Result<Resource> {
        let request = async {
            let response = self.client.get(uri).send().await?.error_for_status()?;
            // Redirects are already followed; resolve against where we ended up
            let final_url = response.url().to_string();
            let cookies = extract_cookies(response.headers());
            let text = response.text().await?;
            Ok::<_, reqwest::Error>((final_url, cookies, text))
        };

        let (final_url, cookies, text) = tokio::time::timeout(self.timeout, request)
            .await
            .map_err(|_| LoadError::Timeout {
                uri: uri.to_string(),
                secs: self.timeout.as_secs(),
            })??;

        let base_reference =
            base_reference_for_url(&final_url).map_err(|e| LoadError::InvalidUrl {
                uri: final_url.clone(),
                reason: e.to_string(),
            })?;

        Ok(Resource {
            text: text.trim().to_string(),
            base_reference,
            cookies,
        })
    }
}

/// Collect `name=value` pairs from all `Set-Cookie` headers.
fn extract_cookies(headers: &HeaderMap) -> Option<Cookies> {
    let cookies: Cookies = headers
        .get_all(SET_COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .filter_map(|value| {
            let pair = value.split(';').next()?;
            let (name, value) = pair.split_once('=')?;
            let name = name.trim();
            (!name.is_empty()).then(|| (name.to_string(), value.trim().to_string()))
        })
        .collect();
    (!cookies.is_empty()).then_some(cookies)
}

/// Load a playlist from a URL or a local path, picking the loader by
/// [`is_url`].
pub async fn load(
    uri: &str,
    loader_config: &LoaderConfig,
    parser_config: &ParserConfig,
) -> Result<Playlist> {
    if is_url(uri) {
        let loader = HttpLoader::new(loader_config)?;
        load_with(uri, &loader, parser_config).await
    } else {
        load_with(uri, &FileLoader, parser_config).await
    }
}

/// Load a playlist through an injected loader.
pub async fn load_with(
    uri: &str,
    loader: &dyn ResourceLoader,
    config: &ParserConfig,
) -> Result<Playlist> {
    let resource = loader.fetch(uri).await?;
    tracing::info!(
        "Loaded {} ({} bytes, base {})",
        uri,
        resource.text.len(),
        resource.base_reference
    );

    let playlist = parse_with(
        &resource.text,
        Some(&resource.base_reference),
        resource.cookies,
        config,
    )?;
    Ok(playlist)
}

/// Parse playlist text that has no base reference.
pub fn loads(text: &str) -> std::result::Result<Playlist, ParseError> {
    parse(text.trim(), None, None)
}
