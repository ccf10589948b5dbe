//! Controller configuration
//!
//! Polling cadence, request bounds and the unknown-job cutoff.

use std::time::Duration;

/// Job lifecycle controller configuration
#[derive(Debug, Clone)]
pub struct ControllerConfig {
    /// Pause between two status checks of the same job
    pub poll_interval: Duration,

    /// Upper bound for a single exchange with the service
    pub request_timeout: Duration,

    /// Upper bound for fetching a result file
    pub download_timeout: Duration,

    /// Consecutive "unknown job" answers after which polling gives up
    pub max_unknown_polls: u32,

    /// Buffered lifecycle events per subscriber
    pub event_capacity: usize,

    /// Ended polling loops whose final phase is still reported
    pub phase_history: usize,
}

impl ControllerConfig {
    /// Creates a configuration with the default bounds and the given interval
    pub fn new(poll_interval: Duration) -> Self {
        Self {
            poll_interval,
            request_timeout: Duration::from_secs(30),
            download_timeout: Duration::from_secs(600),
            max_unknown_polls: 5,
            event_capacity: 64,
            phase_history: 64,
        }
    }

    /// Creates configuration from environment variables
    ///
    /// Expected environment variables:
    /// - LOFI_POLL_INTERVAL_MS (optional, default: 3000)
    /// - LOFI_REQUEST_TIMEOUT_SECS (optional, default: 30)
    /// - LOFI_DOWNLOAD_TIMEOUT_SECS (optional, default: 600)
    /// - LOFI_MAX_UNKNOWN_POLLS (optional, default: 5)
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`ControllerConfig::from_env`] with a custom variable source
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let mut config = Self::default();

        if let Some(raw) = lookup("LOFI_POLL_INTERVAL_MS") {
            let ms = raw
                .parse::<u64>()
                .map_err(|_| anyhow::anyhow!("LOFI_POLL_INTERVAL_MS is not a number: {}", raw))?;
            config.poll_interval = Duration::from_millis(ms);
        }

        if let Some(raw) = lookup("LOFI_REQUEST_TIMEOUT_SECS") {
            let secs = raw.parse::<u64>().map_err(|_| {
                anyhow::anyhow!("LOFI_REQUEST_TIMEOUT_SECS is not a number: {}", raw)
            })?;
            config.request_timeout = Duration::from_secs(secs);
        }

        if let Some(raw) = lookup("LOFI_DOWNLOAD_TIMEOUT_SECS") {
            let secs = raw.parse::<u64>().map_err(|_| {
                anyhow::anyhow!("LOFI_DOWNLOAD_TIMEOUT_SECS is not a number: {}", raw)
            })?;
            config.download_timeout = Duration::from_secs(secs);
        }

        if let Some(raw) = lookup("LOFI_MAX_UNKNOWN_POLLS") {
            config.max_unknown_polls = raw
                .parse::<u32>()
                .map_err(|_| anyhow::anyhow!("LOFI_MAX_UNKNOWN_POLLS is not a number: {}", raw))?;
        }

        Ok(config)
    }

    /// Validates the configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.poll_interval.is_zero() {
            anyhow::bail!("poll_interval must be greater than 0");
        }

        if self.request_timeout.is_zero() {
            anyhow::bail!("request_timeout must be greater than 0");
        }

        if self.download_timeout.is_zero() {
            anyhow::bail!("download_timeout must be greater than 0");
        }

        if self.max_unknown_polls == 0 {
            anyhow::bail!("max_unknown_polls must be greater than 0");
        }

        if self.event_capacity == 0 {
            anyhow::bail!("event_capacity must be greater than 0");
        }

        Ok(())
    }
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self::new(Duration::from_secs(3))
    }
}
