//! Git history source - `git blame` over version descriptors.

use std::path::PathBuf;

use crate::resolver::ResolveError;
use crate::sources::catalog::RecipeLayout;
use crate::sources::HistorySource;
use crate::util::process::{find_git, ProcessBuilder};

/// History source that shells out to `git blame -e`.
///
/// Blame runs from the descriptor's own directory so the recipes tree may
/// live anywhere inside a git checkout.
#[derive(Debug, Clone)]
pub struct GitBlameHistory {
    layout: RecipeLayout,
    git: Option<PathBuf>,
}

impl GitBlameHistory {
    /// Create a history source, locating `git` on PATH.
    pub fn new(layout: RecipeLayout) -> Self {
        GitBlameHistory {
            layout,
            git: find_git(),
        }
    }

    /// Use a specific git executable.
    pub fn with_git(mut self, git: impl Into<PathBuf>) -> Self {
        self.git = Some(git.into());
        self
    }
}

impl HistorySource for GitBlameHistory {
    fn annotate(&self, name: &str) -> Result<String, ResolveError> {
        let history_error = |message: String| ResolveError::History {
            package: name.to_string(),
            message,
        };

        let git = self
            .git
            .as_ref()
            .ok_or_else(|| history_error("`git` not found in PATH".to_string()))?;

        let path = self.layout.descriptor_path(name);
        let (Some(dir), Some(file)) = (path.parent(), path.file_name()) else {
            return Err(history_error(format!("invalid descriptor path {}", path.display())));
        };

        let output = ProcessBuilder::new(git)
            .args(["blame", "-e"])
            .arg(file)
            .cwd(dir)
            .exec_and_check()
            .map_err(|e| history_error(format!("{:#}", e)))?;

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}
