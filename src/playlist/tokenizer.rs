//! Line tokenizer
//!
//! Splits decoded playlist text into logical lines: directives (`#EXT...`)
//! and URI lines. Blank lines and plain `#` comments are dropped.

use crate::error::ParseError;

/// The mandatory first line of every playlist.
pub const HEADER: &str = "#EXTM3U";

/// One logical playlist line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Line<'a> {
    /// `#EXT...` directive, split at the first `:`
    Directive {
        number: usize,
        tag: &'a str,
        value: Option<&'a str>,
    },
    /// A non-comment line that does not start with `#`
    Uri { number: usize, text: &'a str },
}

/// Lazy iterator over the logical lines of a playlist.
///
/// A clone continues from the current position. Call [`tokenize`] again to
/// restart from the top.
#[derive(Debug, Clone)]
pub struct Lines<'a> {
    inner: std::iter::Enumerate<std::str::Lines<'a>>,
}

impl<'a> Iterator for Lines<'a> {
    type Item = Line<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        for (idx, raw) in self.inner.by_ref() {
            let number = idx + 1;
            let line = raw.trim_start_matches('\u{feff}').trim();
            if line.is_empty() {
                continue;
            }
            if line.starts_with("#EXT") {
                return Some(split_directive(line, number));
            }
            if line.starts_with('#') {
                continue;
            }
            return Some(Line::Uri { number, text: line });
        }
        None
    }
}

fn split_directive(line: &str, number: usize) -> Line<'_> {
    // The tag name ends at ':' or at whitespace (e.g. "#EXTM3U x-tvg-url=...")
    let end = line
        .find(|c: char| c == ':' || c.is_whitespace())
        .unwrap_or(line.len());
    let tag = &line[..end];
    let value = line[end..]
        .strip_prefix(':')
        .or_else(|| {
            let rest = line[end..].trim();
            (!rest.is_empty()).then_some(rest)
        })
        .map(str::trim);
    Line::Directive { number, tag, value }
}

/// Start tokenizing `text`, checking that it begins with `#EXTM3U`.
///
/// The returned iterator yields the header line itself as its first item.
pub fn tokenize(text: &str) -> Result<Lines<'_>, ParseError> {
    let lines = Lines {
        inner: text.lines().enumerate(),
    };

    let first = text
        .lines()
        .map(|l| l.trim_start_matches('\u{feff}').trim())
        .find(|l| !l.is_empty());
    match first {
        Some(l) if l.starts_with(HEADER) => Ok(lines),
        other => Err(ParseError::MissingHeader {
            found: other.map(str::to_string),
        }),
    }
}
