//! CLI entry-point for the constituent parsing stage.

use anyhow::Result;
use tracing::{debug, instrument};

#[instrument]
pub fn run() -> Result<()> {
    debug!("constituent parsing stage is a no-op");
    Ok(())
}
