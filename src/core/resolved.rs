//! Resolution results - WHICH version a dependency should be pinned to.

use std::fmt;

/// How the latest version of a dependency was chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Strategy {
    /// Every known version is dotted-numeric; highest number wins.
    Numeric,
    /// Versions are free-form; the most recently added catalog entry wins.
    Historical,
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Strategy::Numeric => write!(f, "numeric"),
            Strategy::Historical => write!(f, "historical"),
        }
    }
}

/// The version a dependency resolves to for this run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedVersion {
    /// Dependency name
    pub dependency_name: String,

    /// Version (or range expression) to write into the recipe
    pub chosen_version: String,

    /// Strategy used to rank the catalog
    pub strategy: Strategy,

    /// True if an override rule replaced the ranked version
    pub override_applied: bool,
}

impl ResolvedVersion {
    /// Create a ranked (non-overridden) resolution.
    pub fn ranked(
        dependency_name: impl Into<String>,
        chosen_version: impl Into<String>,
        strategy: Strategy,
    ) -> Self {
        ResolvedVersion {
            dependency_name: dependency_name.into(),
            chosen_version: chosen_version.into(),
            strategy,
            override_applied: false,
        }
    }

    /// Create a resolution whose version came from an override rule.
    pub fn overridden(
        dependency_name: impl Into<String>,
        chosen_version: impl Into<String>,
        strategy: Strategy,
    ) -> Self {
        ResolvedVersion {
            override_applied: true,
            ..Self::ranked(dependency_name, chosen_version, strategy)
        }
    }
}

impl fmt::Display for ResolvedVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.dependency_name, self.chosen_version)
    }
}
