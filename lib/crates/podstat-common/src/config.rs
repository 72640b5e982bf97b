use serde::Deserialize;
use std::net::SocketAddr;
use std::time::Duration;

/// Server-side lifetime of one instance watch request.
/// The API server rejects values of 295s and above.
pub const WATCH_TIMEOUT_SECS: u32 = 290;

/// Longest termination wait a single watch request can cover, leaving the
/// request deadline room to fire before the server closes the watch.
pub const MAX_TERMINATION_WAIT_SECS: u64 = 280;

/// Stats API server configuration
///
/// Loaded from `PODSTAT_*` environment variables by the server binary.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Listen address (default: 0.0.0.0:8080)
    #[serde(default = "default_listen_addr")]
    pub listen_addr: SocketAddr,

    /// Wait applied to termination requests that do not ask for one (default: 60)
    #[serde(default = "default_termination_timeout_secs")]
    pub termination_timeout_secs: u64,

    /// Upper bound on any requested termination wait (default: 280).
    /// Values above [`MAX_TERMINATION_WAIT_SECS`] are clamped to it.
    #[serde(default = "default_max_termination_timeout_secs")]
    pub max_termination_timeout_secs: u64,

    /// Largest desired instance count a stats query may ask for (default: 1000)
    #[serde(default = "default_max_desired_instances")]
    pub max_desired_instances: u32,
}

impl ServerConfig {
    /// Upper bound actually applied to termination waits.
    #[must_use]
    pub fn effective_max_termination_secs(&self) -> u64 {
        self.max_termination_timeout_secs.min(MAX_TERMINATION_WAIT_SECS)
    }

    /// Effective wait for a termination request, clamped to the configured maximum.
    #[must_use]
    pub fn termination_wait(&self, requested_secs: Option<u64>) -> Duration {
        let secs = requested_secs
            .unwrap_or(self.termination_timeout_secs)
            .min(self.effective_max_termination_secs());
        Duration::from_secs(secs)
    }
}

fn default_listen_addr() -> SocketAddr {
    SocketAddr::from(([0, 0, 0, 0], 8080))
}

fn default_termination_timeout_secs() -> u64 {
    60
}

fn default_max_termination_timeout_secs() -> u64 {
    MAX_TERMINATION_WAIT_SECS
}

fn default_max_desired_instances() -> u32 {
    1000
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: default_listen_addr(),
            termination_timeout_secs: default_termination_timeout_secs(),
            max_termination_timeout_secs: default_max_termination_timeout_secs(),
            max_desired_instances: default_max_desired_instances(),
        }
    }
}
