//! CLI entry-point for the chunking stage.

use anyhow::Result;
use tracing::{debug, instrument};

#[instrument]
pub fn run() -> Result<()> {
    debug!("chunking stage is a no-op");
    Ok(())
}
