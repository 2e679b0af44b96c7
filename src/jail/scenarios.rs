//! The jail scenario set. Each scenario opens its own connection so a
//! session the server tears down cannot leak into the next check.

use anyhow::{Context, Result};
use serde_json::json;

use super::client::{JailClient, RecvError};
use super::protocol::{ClientFrame, ServerFrame};
use crate::config::JailConfig;
use crate::runner::Verdict;

/// Channel for the query round trip.
pub const QUERY_CHANNEL: &str = "test-channel-123";
/// Channel for the close_session probe; distinct so a late query reply
/// cannot masquerade as a close acknowledgement.
pub const CLOSE_CHANNEL: &str = "test-channel-456";

/// The handshake alone: connect, then hang up.
pub async fn connect(client: &JailClient) -> Result<Verdict> {
    let session = client.connect().await?;
    session.close().await;
    Ok(Verdict::Passed)
}

/// Send a query and wait for any reply frame on its channel.
///
/// A server without a working backend accepts the query but never
/// answers; that still validates the protocol, so silence is a pass
/// with a visible note rather than a failure.
pub async fn query_round_trip(client: &JailClient, config: &JailConfig) -> Result<Verdict> {
    let mut session = client.connect().await?;
    session
        .send(&ClientFrame::Query {
            channel_id: QUERY_CHANNEL.to_string(),
            workspace: config.workspace.display().to_string(),
            prompt: "Say hello".to_string(),
            session_id: None,
        })
        .await?;

    let verdict = match session.recv_reply(config.reply_timeout).await {
        Ok(ServerFrame::Unknown) => Verdict::Failed("unexpected reply kind: unknown".to_string()),
        Ok(frame) if frame.channel_id() != Some(QUERY_CHANNEL) => Verdict::Failed(format!(
            "reply on wrong channel: {:?}",
            frame.channel_id()
        )),
        Ok(_) => Verdict::Passed,
        Err(RecvError::Timeout(wait)) => Verdict::PassedWithNote(format!(
            "no reply within {:?} (protocol accepted)",
            wait
        )),
        Err(e) => return Err(e).context("waiting for the query reply"),
    };

    session.close().await;
    Ok(verdict)
}

/// close_session draws no acknowledgement; surviving the grace period
/// without the server erroring out is the whole assertion.
pub async fn close_session(client: &JailClient, config: &JailConfig) -> Result<Verdict> {
    let mut session = client.connect().await?;
    session
        .send(&ClientFrame::CloseSession {
            channel_id: CLOSE_CHANNEL.to_string(),
        })
        .await?;

    tokio::time::sleep(config.close_grace).await;
    session.close().await;
    Ok(Verdict::Passed)
}

/// A frame outside the protocol must not wedge the server. An error
/// reply, a closed connection, or plain silence all count as handled.
pub async fn invalid_type(client: &JailClient, config: &JailConfig) -> Result<Verdict> {
    let mut session = client.connect().await?;
    session
        .send_raw(&json!({ "type": "invalid_type", "data": "garbage" }))
        .await?;

    let verdict = match session.recv_reply(config.reject_timeout).await {
        Ok(ServerFrame::Error { .. }) => Verdict::Passed,
        Ok(frame) => Verdict::Failed(format!("expected an error reply, got {}", frame.kind())),
        Err(RecvError::Timeout(_)) => {
            Verdict::PassedWithNote("frame silently ignored".to_string())
        }
        Err(RecvError::Closed) | Err(RecvError::Transport(_)) => {
            Verdict::PassedWithNote("connection closed without reply".to_string())
        }
        Err(e) => return Err(e).context("waiting for the rejection"),
    };

    session.close().await;
    Ok(verdict)
}
