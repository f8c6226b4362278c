//! Resolution error types and diagnostics.

use std::path::PathBuf;

use thiserror::Error;

use crate::util::diagnostic::Diagnostic;

/// Error while resolving the latest version of one dependency.
///
/// None of these stop the run: each is reported and the affected
/// declaration keeps its original text.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ResolveError {
    #[error("no version descriptor for `{package}`")]
    NotFound { package: String, path: PathBuf },

    #[error("malformed version descriptor for `{package}`: {message}")]
    Parse { package: String, message: String },

    #[error("could not resolve a version for `{package}`: {reason}")]
    Unresolvable { package: String, reason: String },

    #[error("history unavailable for `{package}`: {message}")]
    History { package: String, message: String },
}

impl ResolveError {
    /// Convert to a user-friendly diagnostic.
    pub fn to_diagnostic(&self) -> Diagnostic {
        match self {
            ResolveError::NotFound { package, path } => {
                Diagnostic::error(format!("`{}` is referenced but has no recipe", package))
                    .with_context(format!("expected descriptor at {}", path.display()))
                    .with_suggestion("Check the dependency name for typos")
                    .with_suggestion("Pass `--recipes-dir` if the catalog lives elsewhere")
            }

            ResolveError::Parse { package, message } => {
                Diagnostic::error(format!("could not read versions of `{}`", package))
                    .with_context(message.clone())
                    .with_suggestion("Ensure the descriptor has a top-level `versions` mapping")
            }

            ResolveError::Unresolvable { package, reason } => {
                Diagnostic::warning(format!("left `{}` unchanged", package))
                    .with_context(reason.clone())
            }

            ResolveError::History { package, message } => {
                Diagnostic::error(format!("could not read history for `{}`", package))
                    .with_context(message.clone())
                    .with_suggestion("Run from inside a git checkout of the recipes repository")
            }
        }
    }
}
