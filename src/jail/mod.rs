//! Jail runner: probes the WebSocket server, then walks the protocol
//! scenarios in order over fresh connections.

pub mod client;
pub mod protocol;
pub mod scenarios;

use anyhow::{bail, Context, Result};
use std::fs;
use std::path::Path;

use crate::config::JailConfig;
use crate::probe::{self, PollConfig};
use crate::report::{console, json};
use crate::runner::{Reporter, RunReport, Suite};

pub use client::JailClient;

/// Execute the jail suite and return its report.
///
/// The report file is only written when a path was asked for; unlike
/// the gateway runner there is no default results mount.
pub async fn run(config: &JailConfig, results_path: Option<&Path>) -> Result<RunReport> {
    let reporter = Reporter::new();
    reporter.banner("JAIL INTEGRATION TESTS");
    reporter.note(&format!("Target: {}", config.url));

    // Query frames reference this directory; the server may resolve it.
    fs::create_dir_all(&config.workspace).with_context(|| {
        format!("could not create workspace {}", config.workspace.display())
    })?;

    let client = JailClient::new(config);
    let ready_poll = PollConfig {
        max_wait: config.ready_wait,
        interval: config.ready_interval,
    };
    if !probe::wait_for(&client, &ready_poll, &reporter).await {
        bail!("jail server at {} is not running", config.url);
    }

    let mut suite = Suite::new(&reporter);
    suite.run("jail-connect", || scenarios::connect(&client)).await;
    suite
        .run("query-round-trip", || {
            scenarios::query_round_trip(&client, config)
        })
        .await;
    suite
        .run("close-session", || scenarios::close_session(&client, config))
        .await;
    suite
        .run("invalid-type", || scenarios::invalid_type(&client, config))
        .await;

    let report = suite.finish();
    console::print_summary(&report);
    if let Some(path) = results_path {
        json::write_if_parent_exists(&report, path, &reporter)?;
    }

    Ok(report)
}
