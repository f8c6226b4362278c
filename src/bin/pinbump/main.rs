//! pinbump CLI - refresh pinned dependency versions in a build recipe

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use pinbump::util::GlobalContext;

mod cli;
mod update;

use cli::Cli;

fn main() {
    if let Err(e) = run() {
        eprintln!("error: {:#}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("pinbump=debug")
    } else {
        EnvFilter::new("pinbump=info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .init();

    let mut ctx = GlobalContext::new()?;
    ctx.set_verbose(cli.verbose);
    ctx.set_color(!cli.no_color);

    update::execute(cli, &ctx)
}
