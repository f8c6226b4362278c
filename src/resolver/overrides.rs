//! Override rules for dependencies that float within a compatibility band.
//!
//! Some dependencies should not be pinned to the newest catalog entry.
//! Build tools such as CMake only need a minimum version, and OpenSSL is
//! accepted across several major releases. Instead of an exact version,
//! these get a range expression in the recipe's `[...]` range syntax.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::resolver::errors::ResolveError;
use crate::resolver::version::parse_version_lenient;

/// Which components of the declared version form the floor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FloorPrecision {
    /// `3.24.0` becomes `[>=3]`
    Major,
    /// `3.24.0` becomes `[>=3.24]`
    MajorMinor,
}

/// How a dependency's version is rewritten instead of exact pinning.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OverrideRule {
    /// Open-ended range starting at the currently declared version
    Floor(FloorPrecision),
    /// Fixed range expression
    Range(String),
    /// No override; pin to the latest version
    Exact,
}

impl OverrideRule {
    /// Compute the replacement version for a declaration of `package`.
    pub fn apply(&self, package: &str, declared: &str) -> Result<String, ResolveError> {
        match self {
            OverrideRule::Floor(precision) => {
                let version =
                    parse_version_lenient(declared).ok_or_else(|| ResolveError::Unresolvable {
                        package: package.to_string(),
                        reason: format!("cannot derive a version floor from `{}`", declared),
                    })?;

                Ok(match precision {
                    FloorPrecision::Major => format!("[>={}]", version.major),
                    FloorPrecision::MajorMinor => {
                        format!("[>={}.{}]", version.major, version.minor)
                    }
                })
            }
            OverrideRule::Range(expr) => Ok(expr.clone()),
            OverrideRule::Exact => Err(ResolveError::Unresolvable {
                package: package.to_string(),
                reason: "exact pinning has no override expression".to_string(),
            }),
        }
    }
}

impl fmt::Display for OverrideRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OverrideRule::Floor(FloorPrecision::Major) => write!(f, "floor (major)"),
            OverrideRule::Floor(FloorPrecision::MajorMinor) => write!(f, "floor (major.minor)"),
            OverrideRule::Range(expr) => write!(f, "range {}", expr),
            OverrideRule::Exact => write!(f, "exact"),
        }
    }
}
