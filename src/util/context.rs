//! Global context for pinbump operations.
//!
//! Provides centralized access to the working directory, configuration
//! locations and output settings.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::util::config::{self, Config};

/// Process-wide settings for one invocation.
#[derive(Debug, Clone)]
pub struct GlobalContext {
    /// Current working directory
    cwd: PathBuf,

    /// Global config file (~/.pinbump/config.toml), if a home exists
    global_config: Option<PathBuf>,

    /// Verbose output
    verbose: bool,

    /// Colored diagnostics
    color: bool,
}

impl GlobalContext {
    /// Create a context for the current process.
    pub fn new() -> Result<Self> {
        let cwd = std::env::current_dir().context("failed to get current directory")?;

        Ok(GlobalContext {
            cwd,
            global_config: config::global_config_path(),
            verbose: false,
            color: true,
        })
    }

    /// Create a GlobalContext with a specific working directory.
    pub fn with_cwd(cwd: PathBuf) -> Result<Self> {
        let mut ctx = Self::new()?;
        ctx.cwd = cwd;
        Ok(ctx)
    }

    /// Ignore the user-wide config file.
    pub fn without_global_config(mut self) -> Self {
        self.global_config = None;
        self
    }

    /// Set verbose mode.
    pub fn set_verbose(&mut self, verbose: bool) {
        self.verbose = verbose;
    }

    /// Set color output.
    pub fn set_color(&mut self, color: bool) {
        self.color = color;
    }

    /// Get the current working directory.
    pub fn cwd(&self) -> &Path {
        &self.cwd
    }

    /// Get the project config path (.pinbump/config.toml under cwd).
    pub fn project_config_path(&self) -> PathBuf {
        config::project_config_path(&self.cwd)
    }

    /// Load the merged configuration, with `explicit` layered on top.
    pub fn load_config(&self, explicit: Option<&Path>) -> Result<Config> {
        config::load_config(
            self.global_config.as_deref(),
            &self.project_config_path(),
            explicit,
        )
    }

    /// Check if verbose mode is enabled.
    pub fn is_verbose(&self) -> bool {
        self.verbose
    }

    /// Check if color output is enabled.
    pub fn color(&self) -> bool {
        self.color
    }
}
