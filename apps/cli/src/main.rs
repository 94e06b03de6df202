//! specpub CLI: publish the spec directory into the documentation site.
//!
//! Enriches every spec with status badges and git history, rebuilds the
//! published specs tree, and regenerates the dashboard and navigation.

mod commands;

use clap::Parser;
use color_eyre::eyre::Result;

use commands::Cli;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    commands::init_tracing(&cli);
    commands::run(cli).await
}
