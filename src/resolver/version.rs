//! Version orderings used for ranking.
//!
//! Catalog identifiers are not semver: `1.2`, `1.2.13.4`, `cci.20201225` and
//! `3.0.0-beta` all occur. Two orderings cover them:
//!
//! - [`NumericVersion`] for strictly dotted-numeric identifiers. Components
//!   compare as unbounded integers; missing trailing components rank lowest.
//! - [`LooseVersion`] for anything else, comparing alternating numeric and
//!   alphabetic runs.

use std::cmp::Ordering;
use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use semver::Version;

static NUMERIC: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[0-9]+(\.[0-9]+)*$").unwrap());

static LOOSE_PART: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[0-9]+|[A-Za-z]+").unwrap());

/// Compare two digit strings as unbounded non-negative integers.
fn cmp_digits(a: &str, b: &str) -> Ordering {
    let a = a.trim_start_matches('0');
    let b = b.trim_start_matches('0');
    a.len().cmp(&b.len()).then_with(|| a.cmp(b))
}

/// A strictly dotted-numeric version such as `1.10.0`.
#[derive(Debug, Clone)]
pub struct NumericVersion {
    original: String,
    components: Vec<String>,
}

impl NumericVersion {
    /// Parse `s`, returning `None` unless every component is all digits.
    pub fn parse(s: &str) -> Option<Self> {
        if !Self::is_numeric(s) {
            return None;
        }
        Some(NumericVersion {
            original: s.to_string(),
            components: s.split('.').map(str::to_string).collect(),
        })
    }

    /// Check whether `s` is strictly dotted-numeric.
    pub fn is_numeric(s: &str) -> bool {
        NUMERIC.is_match(s)
    }

    /// The identifier exactly as written in the catalog.
    pub fn as_str(&self) -> &str {
        &self.original
    }
}

impl Ord for NumericVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        for (a, b) in self.components.iter().zip(&other.components) {
            match cmp_digits(a, b) {
                Ordering::Equal => continue,
                ord => return ord,
            }
        }
        self.components.len().cmp(&other.components.len())
    }
}

impl PartialOrd for NumericVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for NumericVersion {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for NumericVersion {}

impl fmt::Display for NumericVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.original)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum LoosePart {
    Alpha(String),
    Number(String),
}

impl Ord for LoosePart {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (LoosePart::Number(a), LoosePart::Number(b)) => cmp_digits(a, b),
            (LoosePart::Alpha(a), LoosePart::Alpha(b)) => a.cmp(b),
            (LoosePart::Number(_), LoosePart::Alpha(_)) => Ordering::Greater,
            (LoosePart::Alpha(_), LoosePart::Number(_)) => Ordering::Less,
        }
    }
}

impl PartialOrd for LoosePart {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// A lenient version key: `20201225`, `1.1.1w`, `3.0.0-beta`.
///
/// Separators are ignored; numeric runs outrank alphabetic runs.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct LooseVersion {
    parts: Vec<LoosePart>,
}

impl LooseVersion {
    pub fn new(s: &str) -> Self {
        let parts = LOOSE_PART
            .find_iter(s)
            .map(|m| {
                let text = m.as_str();
                if text.as_bytes()[0].is_ascii_digit() {
                    let trimmed = text.trim_start_matches('0');
                    LoosePart::Number(if trimmed.is_empty() { "0" } else { trimmed }.to_string())
                } else {
                    LoosePart::Alpha(text.to_ascii_lowercase())
                }
            })
            .collect();
        LooseVersion { parts }
    }

    /// Build a key after removing the first matching prefix, e.g. `cci.`.
    pub fn stripped(s: &str, prefixes: &[String]) -> Self {
        let s = prefixes
            .iter()
            .find_map(|p| s.strip_prefix(p.as_str()))
            .unwrap_or(s);
        Self::new(s)
    }
}

/// Parse a version string, allowing for incomplete or over-long versions.
///
/// Tries semver first, then falls back to the leading dotted-numeric
/// components (at most three), so `3.24` becomes `3.24.0` and `1.1.1w`
/// becomes `1.1.0`.
pub fn parse_version_lenient(s: &str) -> Option<Version> {
    if let Ok(v) = s.parse() {
        return Some(v);
    }

    let parts: Vec<u64> = s
        .split('.')
        .map_while(|p| p.parse::<u64>().ok())
        .take(3)
        .collect();

    match parts.as_slice() {
        [] => None,
        [major] => Some(Version::new(*major, 0, 0)),
        [major, minor] => Some(Version::new(*major, *minor, 0)),
        [major, minor, patch, ..] => Some(Version::new(*major, *minor, *patch)),
    }
}
