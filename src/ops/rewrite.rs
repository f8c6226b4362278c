//! Rewriting pinned versions in recipe text.
//!
//! The rewrite is a single pass: scan declarations, resolve each name once,
//! apply override rules per declaration, then substitute. Substitution is
//! textual: every occurrence of the exact quoted token `"name/declared"` is
//! replaced. An identical literal elsewhere in the file would be replaced
//! too; recipes are heterogeneous enough that this beats parsing them.

use std::collections::{BTreeMap, HashSet};

use crate::core::{DependencyDeclaration, ResolvedVersion};
use crate::ops::extract::DependencyExtractor;
use crate::resolver::{catalog_strategy, HistoryDiagnostic, OverrideRule, ResolveError, Resolver};

/// What happened to one declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The pin changed.
    Updated { from: String, to: String },
    /// Already at the chosen version.
    UpToDate,
    /// Sentinel version; left alone without lookup.
    Sentinel,
    /// Could not resolve; original text preserved.
    Failed(ResolveError),
}

/// A declaration together with its resolution and outcome.
#[derive(Debug, Clone)]
pub struct DeclarationOutcome {
    pub declaration: DependencyDeclaration,
    /// 1-based line of the declaration in the scanned text
    pub line: usize,
    pub resolved: Option<ResolvedVersion>,
    pub outcome: Outcome,
}

/// Everything a rewrite did, for reporting.
#[derive(Debug, Clone, Default)]
pub struct RewriteReport {
    pub outcomes: Vec<DeclarationOutcome>,
    pub diagnostics: Vec<HistoryDiagnostic>,
}

impl RewriteReport {
    /// Declarations whose pin changed.
    pub fn updated(&self) -> impl Iterator<Item = &DeclarationOutcome> {
        self.outcomes
            .iter()
            .filter(|o| matches!(o.outcome, Outcome::Updated { .. }))
    }

    /// Resolution failures, one per dependency name.
    pub fn failures(&self) -> Vec<(&DeclarationOutcome, &ResolveError)> {
        let mut seen = HashSet::new();
        self.outcomes
            .iter()
            .filter_map(|o| match &o.outcome {
                Outcome::Failed(err) if seen.insert(o.declaration.name.as_str()) => Some((o, err)),
                _ => None,
            })
            .collect()
    }
}

/// The rewritten text and its report.
#[derive(Debug, Clone)]
pub struct Rewrite {
    pub text: String,
    pub report: RewriteReport,
}

impl Rewrite {
    /// Check whether any substitution changed the text.
    pub fn is_changed(&self, original: &str) -> bool {
        self.text != original
    }
}

/// Replace every occurrence of `decl`'s token with one pinned at `chosen`.
pub fn substitute(text: &str, decl: &DependencyDeclaration, chosen: &str) -> String {
    text.replace(&decl.token(), &decl.token_with(chosen))
}

/// Apply the `Updated` outcomes of `outcomes` to `text`.
pub fn apply(text: &str, outcomes: &[DeclarationOutcome]) -> String {
    let mut text = text.to_string();
    let mut done = HashSet::new();

    for outcome in outcomes {
        if let Outcome::Updated { to, .. } = &outcome.outcome {
            let decl = &outcome.declaration;
            if done.insert(decl.token()) {
                text = substitute(&text, decl, to);
            }
        }
    }

    text
}

/// Drives extraction, resolution, override policy and substitution.
pub struct RecipeRewriter<'a> {
    extractor: DependencyExtractor,
    resolver: Resolver<'a>,
    overrides: BTreeMap<String, OverrideRule>,
}

impl<'a> RecipeRewriter<'a> {
    pub fn new(
        extractor: DependencyExtractor,
        resolver: Resolver<'a>,
        overrides: BTreeMap<String, OverrideRule>,
    ) -> Self {
        RecipeRewriter {
            extractor,
            resolver,
            overrides,
        }
    }

    /// Resolve one declaration, applying its override rule if any.
    ///
    /// `Ok(None)` means the declaration is a sentinel.
    pub fn resolve_declaration(
        &mut self,
        decl: &DependencyDeclaration,
    ) -> Result<Option<ResolvedVersion>, ResolveError> {
        let name = decl.name.as_str();
        let declared = decl.declared_version.as_str();

        if self.resolver.policy().is_sentinel(declared) {
            return Ok(None);
        }

        match self.overrides.get(name) {
            Some(rule) => {
                // The rule decides the version, but the dependency must still exist.
                let versions = self.resolver.catalog(name)?;
                let chosen = rule.apply(name, declared)?;
                tracing::debug!("{}: override {} gives {}", name, rule, chosen);
                Ok(Some(ResolvedVersion::overridden(
                    name,
                    chosen,
                    catalog_strategy(&versions),
                )))
            }
            None => self.resolver.resolve(name, declared),
        }
    }

    /// Work out the outcome of every declaration in `text`, in text order.
    pub fn plan(&mut self, text: &str) -> Vec<DeclarationOutcome> {
        let declarations: Vec<_> = self.extractor.scan(text).collect();
        let mut outcomes = Vec::with_capacity(declarations.len());

        for declaration in declarations {
            tracing::info!("Processing {}", declaration.name);

            let (resolved, outcome) = match self.resolve_declaration(&declaration) {
                Ok(None) => (None, Outcome::Sentinel),
                Ok(Some(resolved)) => {
                    let outcome = if resolved.chosen_version == declaration.declared_version {
                        Outcome::UpToDate
                    } else {
                        Outcome::Updated {
                            from: declaration.declared_version.clone(),
                            to: resolved.chosen_version.clone(),
                        }
                    };
                    (Some(resolved), outcome)
                }
                Err(err) => (None, Outcome::Failed(err)),
            };

            outcomes.push(DeclarationOutcome {
                line: declaration.line_in(text),
                declaration,
                resolved,
                outcome,
            });
        }

        outcomes
    }

    /// Rewrite `text`, returning the new text and what changed.
    pub fn rewrite(&mut self, text: &str) -> Rewrite {
        let outcomes = self.plan(text);
        let text = apply(text, &outcomes);

        Rewrite {
            text,
            report: RewriteReport {
                outcomes,
                diagnostics: self.resolver.take_diagnostics(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Strategy;
    use crate::resolver::{FloorPrecision, ResolvePolicy};
    use crate::sources::MemorySource;

    const HISTORY: &str = r#"1111111 (<a@b.c> 2020-12-26 10:00:00 +0000 2)   "cci.20201225":
2222222 (<a@b.c> 2021-06-01 10:00:00 +0000 4)   "cci.20210530":
3333333 (<a@b.c> 2019-01-01 10:00:00 +0000 6)   "2.0":
"#;

    fn source() -> MemorySource {
        MemorySource::new()
            .with_versions("zlib", ["1.2.13", "1.3.1", "1.2.11"])
            .with_versions("fmt", ["9.1.0", "10.2.1", "10.1.1"])
            .with_versions("bar", ["cci.20201225", "cci.20210530", "2.0"])
            .with_history("bar", HISTORY)
            .with_versions("cmake", ["3.24.0", "3.28.1"])
            .with_versions("openssl", ["1.1.1w", "3.2.0"])
    }

    fn policy() -> ResolvePolicy {
        ResolvePolicy {
            sentinels: vec!["system".to_string(), "cci.latest".to_string()],
            strip_prefixes: vec!["cci.".to_string()],
        }
    }

    fn overrides() -> BTreeMap<String, OverrideRule> {
        BTreeMap::from([
            (
                "cmake".to_string(),
                OverrideRule::Floor(FloorPrecision::MajorMinor),
            ),
            (
                "openssl".to_string(),
                OverrideRule::Range("[>=1.1 <4]".to_string()),
            ),
        ])
    }

    fn rewrite(source: &MemorySource, text: &str) -> Rewrite {
        let resolver = Resolver::new(source, source, policy());
        let mut rewriter = RecipeRewriter::new(DependencyExtractor::default(), resolver, overrides());
        rewriter.rewrite(text)
    }

    #[test]
    fn test_numeric_update_at_every_occurrence() {
        let source = source();
        let text = r#"self.requires("zlib/1.2.13")
self.tool_requires("zlib/1.2.11")
self.test_requires("zlib/1.2.13")
"#;
        let result = rewrite(&source, text);

        assert_eq!(
            result.text,
            r#"self.requires("zlib/1.3.1")
self.tool_requires("zlib/1.3.1")
self.test_requires("zlib/1.3.1")
"#
        );
        assert_eq!(result.report.updated().count(), 3);
    }

    #[test]
    fn test_numeric_not_lexicographic() {
        let source = source();
        let result = rewrite(&source, r#"self.requires("fmt/9.1.0")"#);
        assert_eq!(result.text, r#"self.requires("fmt/10.2.1")"#);
    }

    #[test]
    fn test_historical_keeps_prefix() {
        let source = source();
        let result = rewrite(&source, r#"self.requires("bar/cci.20201225")"#);

        assert_eq!(result.text, r#"self.requires("bar/cci.20210530")"#);
        let resolved = result.report.outcomes[0].resolved.as_ref().unwrap();
        assert_eq!(resolved.strategy, Strategy::Historical);
    }

    #[test]
    fn test_cmake_floor_override() {
        let source = source();
        let result = rewrite(&source, r#"self.tool_requires("cmake/3.24.0")"#);

        assert_eq!(result.text, r#"self.tool_requires("cmake/[>=3.24]")"#);
        let resolved = result.report.outcomes[0].resolved.as_ref().unwrap();
        assert!(resolved.override_applied);
        assert_eq!(resolved.strategy, Strategy::Numeric);
    }

    #[test]
    fn test_openssl_range_override() {
        let source = source();
        let result = rewrite(&source, r#"self.requires("openssl/1.1.1w")"#);
        assert_eq!(result.text, r#"self.requires("openssl/[>=1.1 <4]")"#);
    }

    #[test]
    fn test_override_still_requires_descriptor() {
        let source = MemorySource::new();
        let text = r#"self.tool_requires("cmake/3.24.0")"#;
        let result = rewrite(&source, text);

        assert_eq!(result.text, text);
        assert!(matches!(
            result.report.outcomes[0].outcome,
            Outcome::Failed(ResolveError::NotFound { .. })
        ));
    }

    #[test]
    fn test_sentinels_are_never_substituted() {
        let source = source();
        let text = r#"self.requires("zlib/system")
self.requires("bar/cci.latest")
"#;
        let result = rewrite(&source, text);

        assert_eq!(result.text, text);
        assert!(result
            .report
            .outcomes
            .iter()
            .all(|o| o.outcome == Outcome::Sentinel));
    }

    #[test]
    fn test_failure_is_isolated() {
        let source = source();
        let text = r#"self.requires("ghost/1.0")
self.requires("zlib/1.2.13")
"#;
        let result = rewrite(&source, text);

        assert_eq!(
            result.text,
            r#"self.requires("ghost/1.0")
self.requires("zlib/1.3.1")
"#
        );
        let failures = result.report.failures();
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].0.declaration.name, "ghost");
        assert_eq!(failures[0].0.line, 1);
    }

    #[test]
    fn test_unresolvable_history_preserves_text() {
        let source = MemorySource::new()
            .with_versions("bar", ["cci.1", "cci.2"])
            .with_history("bar", "not blame:\n");
        let text = r#"self.requires("bar/cci.1")"#;
        let result = rewrite(&source, text);

        assert_eq!(result.text, text);
        assert!(!result.report.diagnostics.is_empty());
        assert!(matches!(
            result.report.outcomes[0].outcome,
            Outcome::Failed(ResolveError::Unresolvable { .. })
        ));
    }

    #[test]
    fn test_paths_are_untouched() {
        let source = source().with_versions("include", ["9.9"]);
        let text = r#"copy(self, "include/foo.h")
copy(self, "include/1.0")
"#;
        let result = rewrite(&source, text);
        assert_eq!(result.text, text);
        assert!(result.report.outcomes.is_empty());
    }

    #[test]
    fn test_rewrite_is_idempotent() {
        let source = source();
        let text = r#"
def requirements(self):
    self.requires("zlib/1.2.13")
    self.requires('fmt/9.1.0')
    self.requires("bar/cci.20201225")
    self.requires("openssl/3.2.0")
    self.requires("opengl/system")

def build_requirements(self):
    self.tool_requires("cmake/3.24.0")
    self.tool_requires("zlib/1.2.11")
"#;
        let first = rewrite(&source, text);
        assert!(first.is_changed(text));

        let second = rewrite(&source, &first.text);
        assert_eq!(second.text, first.text);
        assert_eq!(second.report.updated().count(), 0);
    }

    #[test]
    fn test_quote_style_is_preserved() {
        let source = source();
        let result = rewrite(&source, "self.requires('zlib/1.2.13')");
        assert_eq!(result.text, "self.requires('zlib/1.3.1')");
    }
}
