use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;

/// Runtime settings, read from the environment after `.env` is loaded.
#[derive(Debug, Clone)]
pub struct Config {
    pub api_url: String,
    pub cable_url: String,
    pub session_db: PathBuf,
    pub poll_interval: Duration,
    pub request_timeout: Duration,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        let api_url =
            std::env::var("AID_API_URL").unwrap_or_else(|_| "http://localhost:4000".into());
        let cable_url =
            std::env::var("AID_CABLE_URL").unwrap_or_else(|_| "ws://localhost:4000/cable".into());
        let session_db =
            std::env::var("AID_SESSION_DB").unwrap_or_else(|_| "aid-session.db".into());

        let poll_ms: u64 = std::env::var("AID_POLL_INTERVAL_MS")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .context("AID_POLL_INTERVAL_MS must be a whole number of milliseconds")?;
        let timeout_secs: u64 = std::env::var("AID_REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "15".into())
            .parse()
            .context("AID_REQUEST_TIMEOUT_SECS must be a whole number of seconds")?;

        anyhow::ensure!(poll_ms > 0, "AID_POLL_INTERVAL_MS must be positive");

        Ok(Self {
            api_url,
            cable_url,
            session_db: PathBuf::from(session_db),
            poll_interval: Duration::from_millis(poll_ms),
            request_timeout: Duration::from_secs(timeout_secs),
        })
    }
}
