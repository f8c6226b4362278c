//! Implementation of `pinbump <RECIPE>`.

use std::path::{Path, PathBuf};

use anyhow::{bail, Result};

use crate::ops::extract::DependencyExtractor;
use crate::ops::rewrite::{RecipeRewriter, RewriteReport};
use crate::resolver::Resolver;
use crate::sources::{GitBlameHistory, HistorySource, RecipeCatalog, RecipeLayout, VersionSource};
use crate::util::config::Config;
use crate::util::diagnostic::suggestions;
use crate::util::fs;

/// Options for updating one recipe.
#[derive(Debug, Clone, Default)]
pub struct UpdateOptions {
    /// Catalog root; overrides config and discovery
    pub recipes_dir: Option<PathBuf>,

    /// Dry run - compute changes without writing the recipe
    pub dry_run: bool,
}

/// Result of updating one recipe.
#[derive(Debug, Clone)]
pub struct UpdateResult {
    pub report: RewriteReport,

    /// The new text differs from the old
    pub changed: bool,

    /// The recipe file was written
    pub written: bool,
}

/// Locate the catalog root for `recipe`.
///
/// In order: explicit option, config, nearest `recipes` ancestor of the
/// recipe, `./recipes`.
pub fn find_recipes_dir(
    recipe: &Path,
    config: &Config,
    explicit: Option<&Path>,
    cwd: &Path,
) -> Result<PathBuf> {
    let candidate = explicit
        .map(Path::to_path_buf)
        .or_else(|| config.catalog.recipes_dir.clone())
        .or_else(|| fs::find_ancestor_named(recipe, "recipes"))
        .unwrap_or_else(|| cwd.join("recipes"));

    if !candidate.is_dir() {
        bail!(
            "recipes directory not found: {}\n{}",
            candidate.display(),
            suggestions::NO_RECIPES_DIR
        );
    }

    Ok(candidate)
}

/// Rewrite `recipe` in place against explicit sources.
///
/// The file is read once and written at most once, after every
/// dependency has been processed. Only I/O on the recipe itself fails.
pub fn update_recipe_with(
    recipe: &Path,
    versions: &dyn VersionSource,
    history: &dyn HistorySource,
    config: &Config,
    dry_run: bool,
) -> Result<UpdateResult> {
    let original = fs::read_to_string(recipe)?;

    let extractor = DependencyExtractor::new(config.exclusion_policy());
    let resolver = Resolver::new(versions, history, config.resolve_policy());
    let mut rewriter = RecipeRewriter::new(extractor, resolver, config.override_rules());

    let rewrite = rewriter.rewrite(&original);
    let changed = rewrite.is_changed(&original);

    for outcome in rewrite.report.updated() {
        if let Some(resolved) = &outcome.resolved {
            tracing::info!(
                "Updating {} {} -> {} ({}{})",
                outcome.declaration.name,
                outcome.declaration.declared_version,
                resolved.chosen_version,
                resolved.strategy,
                if resolved.override_applied { ", override" } else { "" }
            );
        }
    }

    let written = changed && !dry_run;
    if written {
        fs::write_string(recipe, &rewrite.text)?;
    } else if changed {
        tracing::info!("Dry run - {} left unchanged", recipe.display());
    }

    Ok(UpdateResult {
        report: rewrite.report,
        changed,
        written,
    })
}

/// Rewrite `recipe` in place using the on-disk catalog and git history.
pub fn update_recipe(
    recipe: &Path,
    config: &Config,
    opts: &UpdateOptions,
    cwd: &Path,
) -> Result<UpdateResult> {
    let recipes_dir = find_recipes_dir(recipe, config, opts.recipes_dir.as_deref(), cwd)?;
    tracing::debug!("using recipes directory {}", recipes_dir.display());

    let layout = RecipeLayout::new(recipes_dir, config.descriptor());
    let catalog = RecipeCatalog::new(layout.clone());
    let history = GitBlameHistory::new(layout);

    update_recipe_with(recipe, &catalog, &history, config, opts.dry_run)
}
