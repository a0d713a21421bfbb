//! Runtime configuration utilities for pipes-sample.

use std::env;

/// Commit stamp baked in at build time, if the build exported one.
const BUILD_COMMIT: Option<&str> = option_env!("PIPES_COMMIT");

/// Application configuration resolved from `.env` and defaults.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Crate version recorded in provenance stamps.
    pub version: String,
    /// Source revision recorded in provenance stamps.
    pub commit: String,
}

impl Settings {
    /// Load configuration from environment with reasonable defaults.
    pub fn load() -> Self {
        dotenvy::dotenv().ok();
        let commit = env::var("PIPES_COMMIT")
            .ok()
            .filter(|c| !c.trim().is_empty())
            .or_else(|| BUILD_COMMIT.map(str::to_string))
            .unwrap_or_else(|| "unknown".to_string());
        Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
            commit,
        }
    }

    /// `<version>-<commit>`, as written to linguistic processor records.
    pub fn version_stamp(&self) -> String {
        format!("{}-{}", self.version, self.commit)
    }
}
