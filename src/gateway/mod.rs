//! Gateway runner: probes the HTTP gateway, discovers agents, and
//! drives the scenario set against every agent it finds.

pub mod client;
pub mod scenarios;
pub mod sse;

use anyhow::{bail, Result};
use std::collections::HashSet;
use std::time::Instant;

use crate::config::GatewayConfig;
use crate::probe::{self, PollConfig};
use crate::report::{console, json};
use crate::runner::{Reporter, RunReport, Suite};

pub use client::GatewayClient;

/// Execute the full gateway suite and return its report.
///
/// A gateway that never becomes ready or expected agents that never
/// register abort the run with an error; everything after that point
/// is recorded per scenario instead.
pub async fn run(config: &GatewayConfig, expected_agents: &[String]) -> Result<RunReport> {
    let reporter = Reporter::new();
    reporter.banner("COVEN E2E TEST SUITE");
    reporter.note(&format!("Target: {}", config.base_url));

    let client = GatewayClient::new(config);

    let ready_poll = PollConfig {
        max_wait: config.ready_wait,
        interval: config.ready_interval,
    };
    if !probe::wait_for(&client, &ready_poll, &reporter).await {
        bail!("gateway at {} is not running", config.base_url);
    }

    if !expected_agents.is_empty() {
        wait_for_agents(&client, expected_agents, config, &reporter).await?;
    }

    let agents = match client.list_agents().await {
        Ok(list) => list.into_iter().map(|a| a.id).collect::<Vec<_>>(),
        Err(e) => {
            reporter.warn(&format!("Could not fetch agent list: {:#}", e));
            Vec::new()
        }
    };
    if agents.is_empty() {
        reporter.warn("No agents registered, running limited tests");
    } else {
        reporter.note(&format!("Available agents: {}", agents.join(", ")));
    }

    let mut suite = Suite::new(&reporter);

    reporter.phase("Running infrastructure tests...");
    suite
        .run("gateway-health", || scenarios::gateway_health(&client))
        .await;
    suite
        .run("agent-list", || scenarios::agent_list(&client))
        .await;

    for agent in &agents {
        reporter.phase(&format!("Testing agent: {}", agent));
        suite
            .run(&format!("simple-message-{}", agent), || {
                scenarios::simple_message(&client, agent)
            })
            .await;
        suite
            .run(&format!("pack-tool-log-entry-{}", agent), || {
                scenarios::pack_tool_log_entry(&client, agent)
            })
            .await;
        suite
            .run(&format!("pack-tool-log-search-{}", agent), || {
                scenarios::pack_tool_log_search(&client, agent)
            })
            .await;
    }

    if agents.len() >= 2 {
        reporter.phase("Running parallel tests...");
        let pair = &agents[..2];
        suite
            .run("parallel-messages", || {
                scenarios::parallel_messages(&client, pair)
            })
            .await;
    }

    let report = suite.finish();
    console::print_summary(&report);
    json::write_if_parent_exists(&report, &config.results_path, &reporter)?;

    Ok(report)
}

/// Block until every expected agent appears in the gateway listing.
async fn wait_for_agents(
    client: &GatewayClient,
    expected: &[String],
    config: &GatewayConfig,
    reporter: &Reporter,
) -> Result<()> {
    reporter.pending(&format!("Waiting for agents: {}...", expected.join(", ")));

    let mut seen: Vec<String> = Vec::new();
    let start = Instant::now();
    while start.elapsed() < config.agent_wait {
        if let Ok(agents) = client.list_agents().await {
            seen = agents.into_iter().map(|a| a.id).collect();
            let present: HashSet<&str> = seen.iter().map(|id| id.as_str()).collect();
            if expected.iter().all(|id| present.contains(id.as_str())) {
                reporter.success("All expected agents are registered");
                return Ok(());
            }
        }
        tokio::time::sleep(config.agent_interval).await;
    }

    let present: HashSet<&str> = seen.iter().map(|id| id.as_str()).collect();
    let missing: Vec<&str> = expected
        .iter()
        .map(|id| id.as_str())
        .filter(|id| !present.contains(id))
        .collect();
    bail!("agents never registered: {}", missing.join(", "));
}
