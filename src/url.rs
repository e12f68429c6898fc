//! URI helpers
//!
//! Decides between network and filesystem references, derives base
//! references, and resolves relative playlist URIs against them.

use std::path::{Component, Path, PathBuf};

use url::Url;

// helper.
macro_rules! regex {
    ($re:literal $(,)?) => {{
        static RE: std::sync::OnceLock<regex::Regex> = std::sync::OnceLock::new();
        RE.get_or_init(|| regex::Regex::new($re).unwrap())
    }};
}

/// Returns true if `candidate` has a `scheme://` prefix.
///
/// Anything else, including Windows drive paths, is treated as a local path.
pub fn is_url(candidate: &str) -> bool {
    regex!(r"^[A-Za-z][A-Za-z0-9+.\-]*://").is_match(candidate)
}

/// Resolve `uri` against a directory-style base reference.
///
/// Absolute URIs are returned unchanged, as is everything when there is no
/// base. Network bases use URL join semantics; filesystem bases are joined
/// and lexically normalized.
pub fn resolve(base: Option<&str>, uri: &str) -> String {
    let base = match base {
        Some(b) if !b.is_empty() => b,
        _ => return uri.to_string(),
    };
    if is_url(uri) {
        return uri.to_string();
    }

    if is_url(base) {
        let mut dir = base.to_string();
        if !dir.ends_with('/') {
            dir.push('/');
        }
        match Url::parse(&dir).and_then(|b| b.join(uri)) {
            Ok(joined) => joined.to_string(),
            Err(e) => {
                tracing::debug!("Cannot join {} onto {}: {}", uri, dir, e);
                format!("{}{}", dir, uri)
            }
        }
    } else {
        let joined = Path::new(base).join(uri.trim_start_matches('/'));
        normalize(&joined).to_string_lossy().into_owned()
    }
}

/// Base reference for a (final, post-redirect) playlist URL: the URL with its
/// filename, query and fragment removed, ending in `/`.
pub fn base_reference_for_url(final_url: &str) -> Result<String, url::ParseError> {
    let mut url = Url::parse(final_url)?;
    url.set_query(None);
    url.set_fragment(None);
    Ok(url.join(".")?.to_string())
}

/// Base reference for a local playlist file: its parent directory.
pub fn base_reference_for_path(path: &Path) -> String {
    path.parent()
        .map(|p| p.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() {
                    out.push("..");
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}
