//! Readiness polling that gates every run.
//!
//! Nothing here ever errors: a probe that cannot reach its target just
//! reports not-ready, and the caller decides whether a cold target is
//! fatal.

use async_trait::async_trait;
use std::time::{Duration, Instant};

use crate::runner::Reporter;

/// A target the prober can repeatedly ask "are you up yet?".
#[async_trait]
pub trait ReadyCheck {
    /// Human-readable target name for progress lines.
    fn target(&self) -> String;

    /// One best-effort probe. Transport failures mean "not yet ready".
    async fn is_ready(&self) -> bool;
}

/// Poll schedule for [`wait_for`].
#[derive(Debug, Clone)]
pub struct PollConfig {
    pub max_wait: Duration,
    pub interval: Duration,
}

/// Poll until the target reports ready or the deadline elapses.
pub async fn wait_for(check: &dyn ReadyCheck, poll: &PollConfig, reporter: &Reporter) -> bool {
    reporter.pending(&format!("Waiting for {} to be ready...", check.target()));

    let start = Instant::now();
    while start.elapsed() < poll.max_wait {
        if check.is_ready().await {
            reporter.success(&format!("{} is ready", check.target()));
            return true;
        }
        tokio::time::sleep(poll.interval).await;
    }

    reporter.error(&format!("{} did not become ready", check.target()));
    false
}
