//! Classification of a dependency's version set.
//!
//! Each variant is consumed by exactly one ranking function, so the
//! "numeric or not" decision is made once, here.

use crate::core::Strategy;
use crate::resolver::version::NumericVersion;

/// What kind of version set a declaration resolves against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    /// The declared version opts out of resolution (`system`).
    Sentinel,
    /// The catalog lists no versions at all.
    Unresolvable,
    /// Every identifier is dotted-numeric.
    Numeric(Vec<NumericVersion>),
    /// At least one identifier is free-form; rank by history.
    Historical(Vec<String>),
}

impl Classification {
    /// Ranking strategy for this class, if it is ranked at all.
    pub fn strategy(&self) -> Option<Strategy> {
        match self {
            Classification::Numeric(_) => Some(Strategy::Numeric),
            Classification::Historical(_) => Some(Strategy::Historical),
            Classification::Sentinel | Classification::Unresolvable => None,
        }
    }
}

/// Classify `versions` for a declaration pinned at `declared`.
pub fn classify(declared: &str, versions: &[String], sentinels: &[String]) -> Classification {
    if sentinels.iter().any(|s| s == declared) {
        return Classification::Sentinel;
    }

    classify_versions(versions)
}

fn classify_versions(versions: &[String]) -> Classification {
    if versions.is_empty() {
        return Classification::Unresolvable;
    }

    let numeric: Option<Vec<NumericVersion>> =
        versions.iter().map(|v| NumericVersion::parse(v)).collect();

    match numeric {
        Some(numeric) => Classification::Numeric(numeric),
        None => Classification::Historical(versions.to_vec()),
    }
}

/// Strategy a catalog would be ranked with, ignoring the declaration.
///
/// An empty catalog counts as numeric.
pub fn catalog_strategy(versions: &[String]) -> Strategy {
    classify_versions(versions)
        .strategy()
        .unwrap_or(Strategy::Numeric)
}
