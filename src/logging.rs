//! Diagnostics for the pipeline stages.
//!
//! Every stage writes its document to stdout, so the subscriber is bound to
//! stderr. Filtering reads `PIPES_LOG` first, then `RUST_LOG`, then falls
//! back to `info`.

use anyhow::Result;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

pub const LOG_ENV: &str = "PIPES_LOG";
const DEFAULT_DIRECTIVE: &str = "info";

fn env_filter() -> Result<EnvFilter> {
    let filter = EnvFilter::try_from_env(LOG_ENV)
        .or_else(|_| EnvFilter::try_from_default_env())
        .or_else(|_| EnvFilter::try_new(DEFAULT_DIRECTIVE))?;
    Ok(filter)
}

/// Install the global subscriber. A second call is a no-op.
pub fn init_tracing() -> Result<()> {
    if tracing::dispatcher::has_been_set() {
        return Ok(());
    }

    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_timer(fmt::time::UtcTime::rfc_3339())
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .with_filter(env_filter()?);

    tracing_subscriber::registry().with(stderr_layer).init();
    tracing::debug!(filter_env = LOG_ENV, "tracing initialised");
    Ok(())
}
