use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Settings for the gateway runner.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Base URL of the gateway under test.
    pub base_url: String,
    /// Budget for /health to start answering 200.
    pub ready_wait: Duration,
    pub ready_interval: Duration,
    /// Budget for expected agents to show up in the listing.
    pub agent_wait: Duration,
    pub agent_interval: Duration,
    /// Default timeout applied to plain requests (health, listing).
    pub request_timeout: Duration,
    /// Per-request budget for /api/send, covering the whole streamed body.
    pub send_timeout: Duration,
    /// Where the run report lands, if this path's parent directory exists.
    pub results_path: PathBuf,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080".to_string(),
            ready_wait: Duration::from_secs(60),
            ready_interval: Duration::from_secs(1),
            agent_wait: Duration::from_secs(60),
            agent_interval: Duration::from_secs(2),
            request_timeout: Duration::from_secs(10),
            send_timeout: Duration::from_secs(120),
            results_path: PathBuf::from("/results/e2e-results.json"),
        }
    }
}

impl GatewayConfig {
    /// Defaults, with the base URL taken from `GATEWAY_URL` when set.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(url) = env::var("GATEWAY_URL") {
            if !url.is_empty() {
                config.base_url = url;
            }
        }
        config
    }
}

/// Settings for the jail runner.
#[derive(Debug, Clone)]
pub struct JailConfig {
    /// WebSocket URL of the jail server.
    pub url: String,
    /// Directory referenced by query frames; created before the run.
    pub workspace: PathBuf,
    /// Budget for the first successful connect.
    pub ready_wait: Duration,
    pub ready_interval: Duration,
    /// How long a query may take to produce its first reply frame.
    pub reply_timeout: Duration,
    /// How long an invalid frame may take to draw a rejection.
    pub reject_timeout: Duration,
    /// Grace period after close_session before declaring it handled.
    pub close_grace: Duration,
}

impl Default for JailConfig {
    fn default() -> Self {
        Self {
            url: "ws://localhost:31337".to_string(),
            workspace: PathBuf::from("./workspace"),
            ready_wait: Duration::from_secs(10),
            ready_interval: Duration::from_millis(200),
            reply_timeout: Duration::from_secs(5),
            reject_timeout: Duration::from_secs(2),
            close_grace: Duration::from_millis(500),
        }
    }
}

impl JailConfig {
    /// Defaults, with the URL taken from `JAIL_URL` when set.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(url) = env::var("JAIL_URL") {
            if !url.is_empty() {
                config.url = url;
            }
        }
        config
    }
}
