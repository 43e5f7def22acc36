//! Cross-provider identity: sync keys and content hashes.
//!
//! Neither provider's native ID can be trusted across services, so an event is
//! recognized by a key derived from what the user actually sees: its title and
//! its time span. Both values are normalized first so that escaping, spacing
//! and sub-minute drift between providers do not produce different keys.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

const FIELD_SEPARATOR: char = '\u{1f}';

/// Provider-neutral identity of one logical event.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SyncKey(String);

impl SyncKey {
    /// Derive the key from the normalized (title, start, end) tuple.
    pub fn derive(title: &str, start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        SyncKey(digest(&[
            &normalize_text(title),
            &minute_of(start).to_string(),
            &minute_of(end).to_string(),
        ]))
    }

    /// The next key in line for an event whose derived key is already owned
    /// by a mapped event. Depends only on the key itself, so the same new
    /// event lands on the same key on both providers.
    pub fn disambiguate(&self) -> Self {
        SyncKey(digest(&[&self.0, "unmapped"]))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Abbreviated form for terminal output.
    pub fn short(&self) -> &str {
        self.0.get(..12).unwrap_or(&self.0)
    }
}

impl From<String> for SyncKey {
    fn from(value: String) -> Self {
        SyncKey(value)
    }
}

impl fmt::Display for SyncKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Hash over the user-visible content of an event.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContentHash(String);

impl ContentHash {
    pub(crate) fn of_parts(parts: &[&str]) -> Self {
        ContentHash(digest(parts))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for ContentHash {
    fn from(value: String) -> Self {
        ContentHash(value)
    }
}

fn digest(parts: &[&str]) -> String {
    let mut hasher = Sha256::new();
    for (i, part) in parts.iter().enumerate() {
        if i > 0 {
            let mut buf = [0u8; 4];
            hasher.update(FIELD_SEPARATOR.encode_utf8(&mut buf).as_bytes());
        }
        hasher.update(part.as_bytes());
    }
    hex::encode(hasher.finalize())
}

/// Normalize free text for comparison: unescape iCalendar escapes, collapse
/// whitespace, lowercase.
pub fn normalize_text(text: &str) -> String {
    unescape(text.trim())
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Resolve iCalendar escapes (`\,` `\;` `\n` `\\`) in one left-to-right
/// pass. Unknown escapes are kept as written.
fn unescape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars();

    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n' | 'N') => out.push('\n'),
            Some(escaped @ (',' | ';' | '\\')) => out.push(escaped),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }

    out
}

/// Instants are compared at minute precision.
pub(crate) fn minute_of(instant: DateTime<Utc>) -> i64 {
    instant.timestamp().div_euclid(60)
}
