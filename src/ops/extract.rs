//! Scanning recipe text for pinned dependencies.
//!
//! A declaration is a quoted `name/version` token such as
//! `self.requires("zlib/1.3.1")`. The same shape also appears in file paths
//! (`"include/foo.h"`, `'docs/readme.txt'`), and text alone cannot always
//! tell the two apart, so an [`ExclusionPolicy`] filters the likely paths.
//! The filter is a heuristic, not a guarantee.

use std::collections::BTreeSet;
use std::sync::LazyLock;

use regex::{CaptureMatches, Regex};

use crate::core::DependencyDeclaration;
use crate::util::config::DEFAULT_EXCLUDED_NAMES;

static DECLARATION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#""([a-z0-9_.-]+)/([a-z0-9_.-]+)"|'([a-z0-9_.-]+)/([a-z0-9_.-]+)'"#).unwrap()
});

/// Which quoted `name/version` tokens are paths rather than dependencies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExclusionPolicy {
    /// Names that are path segments (`lib`, `include`, `..`)
    pub excluded_names: BTreeSet<String>,

    /// Treat versions shaped like file names (`readme.txt`) as paths
    pub skip_file_like_versions: bool,
}

impl Default for ExclusionPolicy {
    fn default() -> Self {
        ExclusionPolicy {
            excluded_names: DEFAULT_EXCLUDED_NAMES.iter().map(|s| s.to_string()).collect(),
            skip_file_like_versions: true,
        }
    }
}

impl ExclusionPolicy {
    /// Check whether a matched token is likely a path.
    pub fn excludes(&self, name: &str, version: &str) -> bool {
        if self.excluded_names.contains(name) {
            return true;
        }
        self.skip_file_like_versions && looks_like_file_name(version)
    }
}

/// `readme.txt` or `config.yml`: a long stem with a short alphabetic extension.
fn looks_like_file_name(version: &str) -> bool {
    let parts: Vec<&str> = version.split('.').collect();
    let (Some(first), Some(last)) = (parts.first(), parts.last()) else {
        return false;
    };

    parts.len() >= 2
        && first.len() >= 4
        && !last.is_empty()
        && last.len() <= 3
        && last.chars().all(|c| c.is_ascii_alphabetic())
}

/// Finds dependency declarations in recipe text.
#[derive(Debug, Clone, Default)]
pub struct DependencyExtractor {
    policy: ExclusionPolicy,
}

impl DependencyExtractor {
    pub fn new(policy: ExclusionPolicy) -> Self {
        DependencyExtractor { policy }
    }

    /// Lazily scan `text`. Calling `scan` again restarts from the beginning.
    pub fn scan<'e, 't>(&'e self, text: &'t str) -> Declarations<'e, 't> {
        Declarations {
            policy: &self.policy,
            matches: DECLARATION.captures_iter(text),
        }
    }
}

/// Iterator over the declarations in one recipe text, in text order.
pub struct Declarations<'e, 't> {
    policy: &'e ExclusionPolicy,
    matches: CaptureMatches<'static, 't>,
}

impl Iterator for Declarations<'_, '_> {
    type Item = DependencyDeclaration;

    fn next(&mut self) -> Option<Self::Item> {
        for caps in self.matches.by_ref() {
            let (name, version, quote) = match (caps.get(1), caps.get(2)) {
                (Some(name), Some(version)) => (name, version, '"'),
                _ => match (caps.get(3), caps.get(4)) {
                    (Some(name), Some(version)) => (name, version, '\''),
                    _ => continue,
                },
            };

            if self.policy.excludes(name.as_str(), version.as_str()) {
                tracing::trace!("skipping path-like token {}/{}", name.as_str(), version.as_str());
                continue;
            }

            let Some(whole) = caps.get(0) else {
                continue;
            };

            return Some(DependencyDeclaration::new(
                name.as_str(),
                version.as_str(),
                quote,
                (whole.start(), whole.len()),
            ));
        }
        None
    }
}
