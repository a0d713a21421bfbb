//! CLI entry-point for the POS tagging stage.

use anyhow::Result;
use tracing::{debug, instrument};

#[instrument]
pub fn run() -> Result<()> {
    debug!("POS tagging stage is a no-op");
    Ok(())
}
