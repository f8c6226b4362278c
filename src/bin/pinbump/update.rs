//! The update command: patch one recipe and report what happened.

use anyhow::Result;

use crate::cli::Cli;
use pinbump::ops::update_recipe::{update_recipe, UpdateOptions};
use pinbump::resolver::HistoryDiagnostic;
use pinbump::util::diagnostic::{self, suggestions, Diagnostic};
use pinbump::util::GlobalContext;

pub fn execute(cli: Cli, ctx: &GlobalContext) -> Result<()> {
    let config = ctx.load_config(cli.config.as_deref())?;

    let opts = UpdateOptions {
        recipes_dir: cli.recipes_dir,
        dry_run: cli.dry_run,
    };

    let result = update_recipe(&cli.recipe, &config, &opts, ctx.cwd())?;
    let report = &result.report;

    for (outcome, err) in report.failures() {
        let diag = err
            .to_diagnostic()
            .with_location(&cli.recipe, Some(outcome.line));
        diagnostic::emit(&diag, ctx.color());
    }

    if let Some(diag) = history_warning(&report.diagnostics, ctx.is_verbose()) {
        diagnostic::emit(&diag, ctx.color());
    }

    let updated = report.updated().count();
    if cli.dry_run {
        eprintln!("Would update {} pins in {}", updated, cli.recipe.display());
        for outcome in report.updated() {
            if let Some(resolved) = &outcome.resolved {
                eprintln!(
                    "    {} -> {}",
                    outcome.declaration.token(),
                    outcome.declaration.token_with(&resolved.chosen_version)
                );
            }
        }
    } else {
        eprintln!("    Updated {} pins in {}", updated, cli.recipe.display());
    }

    Ok(())
}

/// Summarise skipped history entries; the entries themselves are listed
/// only in verbose mode.
fn history_warning(diagnostics: &[HistoryDiagnostic], verbose: bool) -> Option<Diagnostic> {
    if diagnostics.is_empty() {
        return None;
    }

    let diag = Diagnostic::warning(format!(
        "skipped {} history entries while ranking",
        diagnostics.len()
    ));

    if verbose {
        Some(diagnostics.iter().fold(diag, |diag, d| {
            diag.with_context(format!("{}: {}", d.package, d.error))
        }))
    } else {
        Some(diag.with_suggestion(suggestions::HISTORY_SKIPPED))
    }
}
