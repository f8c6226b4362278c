//! Version resolution.
//!
//! Each dependency is resolved on its own: its catalog is loaded, classified,
//! and ranked by the strategy matching its class. There is no cross-dependency
//! compatibility checking. Results are cached per name for the run, so a
//! dependency declared many times is looked up once.

pub mod classify;
pub mod errors;
pub mod historical;
pub mod numeric;
pub mod overrides;
pub mod version;

pub use classify::{catalog_strategy, classify, Classification};
pub use errors::ResolveError;
pub use historical::{rank_historical, HistoricalRanking, ParseError};
pub use numeric::rank_numeric;
pub use overrides::{FloorPrecision, OverrideRule};

use std::collections::HashMap;

use crate::core::{ResolvedVersion, Strategy};
use crate::sources::{HistorySource, VersionSource};

/// Ranking policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvePolicy {
    /// Declared versions that opt out of resolution
    pub sentinels: Vec<String>,

    /// Prefixes ignored by the lenient comparison
    pub strip_prefixes: Vec<String>,
}

impl ResolvePolicy {
    /// Check whether a declared version opts out of resolution.
    pub fn is_sentinel(&self, declared: &str) -> bool {
        self.sentinels.iter().any(|s| s == declared)
    }
}

/// A history entry excluded while ranking `package`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryDiagnostic {
    pub package: String,
    pub error: ParseError,
}

/// Resolves the latest version of dependencies against injected sources.
pub struct Resolver<'a> {
    versions: &'a dyn VersionSource,
    history: &'a dyn HistorySource,
    policy: ResolvePolicy,
    catalogs: HashMap<String, Result<Vec<String>, ResolveError>>,
    resolved: HashMap<String, Result<ResolvedVersion, ResolveError>>,
    diagnostics: Vec<HistoryDiagnostic>,
}

impl<'a> Resolver<'a> {
    pub fn new(
        versions: &'a dyn VersionSource,
        history: &'a dyn HistorySource,
        policy: ResolvePolicy,
    ) -> Self {
        Resolver {
            versions,
            history,
            policy,
            catalogs: HashMap::new(),
            resolved: HashMap::new(),
            diagnostics: Vec::new(),
        }
    }

    pub fn policy(&self) -> &ResolvePolicy {
        &self.policy
    }

    /// Known versions of `name`, loaded once per run.
    pub fn catalog(&mut self, name: &str) -> Result<Vec<String>, ResolveError> {
        if let Some(cached) = self.catalogs.get(name) {
            return cached.clone();
        }

        let loaded = self.versions.versions(name);
        self.catalogs.insert(name.to_string(), loaded.clone());
        loaded
    }

    /// Resolve the latest version of `name` for a declaration at `declared`.
    ///
    /// Returns `Ok(None)` for sentinel declarations, which are never looked
    /// up. Otherwise the ranked result is computed once per name.
    pub fn resolve(
        &mut self,
        name: &str,
        declared: &str,
    ) -> Result<Option<ResolvedVersion>, ResolveError> {
        if self.policy.is_sentinel(declared) {
            return Ok(None);
        }

        if let Some(cached) = self.resolved.get(name) {
            return cached.clone().map(Some);
        }

        let versions = self.catalog(name)?;

        let result = match classify(declared, &versions, &self.policy.sentinels) {
            Classification::Sentinel => return Ok(None),
            Classification::Unresolvable => Err(ResolveError::Unresolvable {
                package: name.to_string(),
                reason: "the catalog lists no versions".to_string(),
            }),
            Classification::Numeric(numeric) => {
                let latest = rank_numeric(&numeric).map(|v| v.as_str().to_string());
                tracing::debug!("{}: ranked {} numeric versions", name, numeric.len());
                latest
                    .map(|v| ResolvedVersion::ranked(name, v, Strategy::Numeric))
                    .ok_or_else(|| ResolveError::Unresolvable {
                        package: name.to_string(),
                        reason: "the catalog lists no versions".to_string(),
                    })
            }
            Classification::Historical(candidates) => self.rank_by_history(name, &candidates),
        };

        self.resolved.insert(name.to_string(), result.clone());
        result.map(Some)
    }

    fn rank_by_history(
        &mut self,
        name: &str,
        candidates: &[String],
    ) -> Result<ResolvedVersion, ResolveError> {
        let annotate = self.history.annotate(name)?;
        let ranking = rank_historical(candidates, &annotate, &self.policy.strip_prefixes);

        tracing::debug!(
            "{}: ranked {} versions by history, {} excluded",
            name,
            candidates.len(),
            ranking.diagnostics.len()
        );

        for error in ranking.diagnostics {
            tracing::warn!("{}: {}", name, error);
            self.diagnostics.push(HistoryDiagnostic {
                package: name.to_string(),
                error,
            });
        }

        ranking
            .chosen
            .map(|v| ResolvedVersion::ranked(name, v, Strategy::Historical))
            .ok_or_else(|| ResolveError::Unresolvable {
                package: name.to_string(),
                reason: "no catalog entry has usable history".to_string(),
            })
    }

    /// Drain the history entries excluded so far.
    pub fn take_diagnostics(&mut self) -> Vec<HistoryDiagnostic> {
        std::mem::take(&mut self.diagnostics)
    }
}
