//! CLI entry-point for the document classification stage.

use anyhow::Result;
use tracing::{debug, instrument};

#[instrument]
pub fn run() -> Result<()> {
    debug!("document classification stage is a no-op");
    Ok(())
}
