//! CLI definitions using clap.

use std::path::PathBuf;

use clap::Parser;

/// pinbump - refresh pinned dependency versions inside build recipes
#[derive(Parser)]
#[command(name = "pinbump")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Recipe file to update in place
    pub recipe: PathBuf,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,

    /// Directory holding one version descriptor per dependency
    #[arg(long, env = "PINBUMP_RECIPES_DIR")]
    pub recipes_dir: Option<PathBuf>,

    /// Additional config file (takes precedence over all others)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Show what would change without writing the recipe
    #[arg(short = 'n', long)]
    pub dry_run: bool,
}
