//! hls-playlist
//!
//! Loads an M3U8 playlist from a URL or a local file and prints a summary,
//! the re-serialized playlist, or its JSON model.
//!
//! Usage: hls-playlist <uri> [--config <path>] [--format summary|m3u8|json]

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use hls_playlist::{load, Config, LoggingConfig, Playlist};

/// Application version
const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name
const APP_NAME: &str = "hls-playlist";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OutputFormat {
    Summary,
    M3u8,
    Json,
}

#[derive(Debug)]
struct Args {
    uri: String,
    config_path: Option<String>,
    format: OutputFormat,
}

fn parse_args<I: Iterator<Item = String>>(mut args: I) -> Result<Args, String> {
    let mut uri = None;
    let mut config_path = None;
    let mut format = OutputFormat::Summary;

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--config" => {
                config_path = Some(args.next().ok_or("--config needs a path")?);
            }
            "--format" => {
                format = match args.next().as_deref() {
                    Some("summary") => OutputFormat::Summary,
                    Some("m3u8") => OutputFormat::M3u8,
                    Some("json") => OutputFormat::Json,
                    other => return Err(format!("unknown format {:?}", other)),
                };
            }
            _ if uri.is_none() => uri = Some(arg),
            _ => return Err(format!("unexpected argument {}", arg)),
        }
    }

    Ok(Args {
        uri: uri.ok_or("missing playlist URI or path")?,
        config_path,
        format,
    })
}

#[tokio::main]
async fn main() {
    let args = match parse_args(std::env::args().skip(1)) {
        Ok(args) => args,
        Err(e) => {
            eprintln!("{}: {}", APP_NAME, e);
            eprintln!("usage: {} <uri> [--config <path>] [--format summary|m3u8|json]", APP_NAME);
            std::process::exit(2);
        }
    };

    // Load configuration
    let (config, config_error) = match &args.config_path {
        Some(path) => match Config::from_file(path) {
            Ok(config) => (config, None),
            Err(e) => (Config::default(), Some(format!("{}: {}", path, e))),
        },
        None => (Config::default(), None),
    };

    // Initialize logging
    init_logging(&config.logging);
    tracing::debug!("{} v{} starting", APP_NAME, VERSION);
    if let Some(e) = config_error {
        tracing::warn!("Failed to load config file {}. Using defaults.", e);
    }

    let playlist = match load(&args.uri, &config.loader, &config.parser).await {
        Ok(playlist) => playlist,
        Err(e) => {
            tracing::error!("Failed to load {}: {}", args.uri, e);
            std::process::exit(1);
        }
    };

    match args.format {
        OutputFormat::Summary => print!("{}", summary(&playlist)),
        OutputFormat::M3u8 => print!("{}", playlist),
        OutputFormat::Json => match serde_json::to_string_pretty(&playlist) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                tracing::error!("Failed to encode playlist as JSON: {}", e);
                std::process::exit(1);
            }
        },
    }
}

/// Human-readable overview of a playlist
fn summary(playlist: &Playlist) -> String {
    let mut output = String::new();
    if playlist.is_variant {
        output.push_str(&format!(
            "Master playlist: {} variants, {} i-frame variants, {} renditions\n",
            playlist.streams.len(),
            playlist.iframe_streams.len(),
            playlist.media.len()
        ));
        for stream in &playlist.streams {
            let resolution = stream
                .resolution
                .map(|r| r.to_string())
                .unwrap_or_else(|| "-".to_string());
            output.push_str(&format!(
                "  {:>10} bps  {:>9}  {}\n",
                stream.bandwidth, resolution, stream.uri
            ));
        }
    } else {
        output.push_str(&format!(
            "Media playlist: {} segments, {:.3}s total, {}\n",
            playlist.segments.len(),
            playlist.total_duration(),
            if playlist.is_endlist { "complete" } else { "live" }
        ));
        if let Some(seq) = playlist.media_sequence {
            output.push_str(&format!("  media sequence: {}\n", seq));
        }
        if let Some(target) = playlist.target_duration {
            output.push_str(&format!("  target duration: {}s\n", target));
        }
        if !playlist.keys.is_empty() {
            output.push_str(&format!("  encryption keys: {}\n", playlist.keys.len()));
        }
    }
    if !playlist.unknown_tags.is_empty() {
        output.push_str(&format!("  skipped tags: {}\n", playlist.unknown_tags.len()));
    }
    output
}

/// Initialize logging with tracing
fn init_logging(config: &LoggingConfig) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| format!("hls_playlist={}", config.level).into());
    let registry = tracing_subscriber::registry().with(filter);
    if config.is_json() {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}
