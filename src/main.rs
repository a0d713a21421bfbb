//! Entry point wiring CLI dispatch to the pipeline stages.

use anyhow::Result;
use pipes_sample::{cli::Cli, config::Settings, logging};
use tracing::info;

fn main() -> Result<()> {
    logging::init_tracing()?;
    let settings = Settings::load();
    let cli = Cli::parse();

    info!(?cli, "CLI options");
    cli.dispatch(&settings)
}
