//! Attribute list parsing
//!
//! `KEY=VALUE,KEY="quoted, value"` lists as used by `#EXT-X-STREAM-INF`,
//! `#EXT-X-MEDIA`, `#EXT-X-KEY` and friends. Splitting is quote-aware.

use std::str::FromStr;

use crate::error::ParseError;

/// Ordered attribute list; keys keep their source order and unknown keys
/// are retained.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AttributeList {
    pairs: Vec<(String, String)>,
}

impl AttributeList {
    /// Parse an attribute list. Values are unquoted; a bare token without
    /// `=` is stored with an empty value.
    pub fn parse(input: &str) -> Self {
        let pairs = split_attributes(input)
            .into_iter()
            .filter_map(|item| {
                let item = item.trim();
                if item.is_empty() {
                    return None;
                }
                Some(match item.split_once('=') {
                    Some((k, v)) => (k.trim().to_string(), unquote(v.trim()).to_string()),
                    None => (item.to_string(), String::new()),
                })
            })
            .collect();
        Self { pairs }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Required string attribute
    pub fn require(&self, tag: &str, key: &str, line: usize) -> Result<&str, ParseError> {
        self.get(key).ok_or_else(|| ParseError::missing(tag, key, line))
    }

    /// Optional attribute parsed with `FromStr`
    pub fn parse_opt<T: FromStr>(
        &self,
        tag: &str,
        key: &str,
        line: usize,
    ) -> Result<Option<T>, ParseError> {
        self.get(key)
            .map(|v| parse_number(tag, v, line))
            .transpose()
    }

    /// `YES`/`NO` attribute, absent means false
    pub fn flag(&self, key: &str) -> bool {
        self.get(key)
            .map(|v| v.eq_ignore_ascii_case("YES"))
            .unwrap_or(false)
    }

    /// Attributes whose keys are not in `known`, in source order
    pub fn extra(&self, known: &[&str]) -> Vec<(String, String)> {
        self.pairs
            .iter()
            .filter(|(k, _)| !known.contains(&k.as_str()))
            .cloned()
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pairs.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

/// Parse a numeric value, naming `tag` in the error on failure.
pub fn parse_number<T: FromStr>(tag: &str, value: &str, line: usize) -> Result<T, ParseError> {
    value
        .trim()
        .parse::<T>()
        .map_err(|_| ParseError::malformed(tag, value, line))
}

/// Strip one pair of surrounding double quotes, if present.
pub fn unquote(value: &str) -> &str {
    value
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        .unwrap_or(value)
}

/// Split on commas that are not inside double quotes.
fn split_attributes(input: &str) -> Vec<&str> {
    let mut items = Vec::new();
    let mut in_quotes = false;
    let mut start = 0;
    for (i, c) in input.char_indices() {
        match c {
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => {
                items.push(&input[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    items.push(&input[start..]);
    items
}
