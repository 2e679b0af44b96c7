//! WebSocket plumbing for talking to the jail server.

use anyhow::{Context, Result};
use async_trait::async_trait;
use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

use super::protocol::{ClientFrame, ServerFrame};
use crate::config::JailConfig;
use crate::probe::ReadyCheck;

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Why a reply never arrived (or could not be read).
///
/// Scenarios branch on these: for some probes a closed connection or
/// plain silence is itself an acceptable answer.
#[derive(Debug, Error)]
pub enum RecvError {
    #[error("no reply within {0:?}")]
    Timeout(Duration),
    #[error("connection closed")]
    Closed,
    #[error("websocket transport failed: {0}")]
    Transport(#[from] tokio_tungstenite::tungstenite::Error),
    #[error("reply was not a valid frame: {0}")]
    BadFrame(#[from] serde_json::Error),
}

/// Connection factory; one instance per run, one session per scenario.
pub struct JailClient {
    url: String,
}

impl JailClient {
    pub fn new(config: &JailConfig) -> Self {
        Self {
            url: config.url.clone(),
        }
    }

    pub async fn connect(&self) -> Result<JailSession> {
        let (ws, _) = connect_async(self.url.as_str())
            .await
            .with_context(|| format!("could not connect to {}", self.url))?;
        let (sink, stream) = ws.split();
        Ok(JailSession { sink, stream })
    }
}

#[async_trait]
impl ReadyCheck for JailClient {
    fn target(&self) -> String {
        format!("jail server at {}", self.url)
    }

    async fn is_ready(&self) -> bool {
        // A completed handshake is the whole check.
        match connect_async(self.url.as_str()).await {
            Ok((mut ws, _)) => {
                let _ = ws.close(None).await;
                true
            }
            Err(_) => false,
        }
    }
}

/// One established WebSocket conversation.
pub struct JailSession {
    sink: SplitSink<WsStream, Message>,
    stream: SplitStream<WsStream>,
}

impl JailSession {
    pub async fn send(&mut self, frame: &ClientFrame) -> Result<()> {
        let text = serde_json::to_string(frame)?;
        self.sink
            .send(Message::Text(text))
            .await
            .context("frame was not accepted")?;
        Ok(())
    }

    /// Send a payload bypassing [`ClientFrame`], for frames the
    /// protocol does not admit.
    pub async fn send_raw(&mut self, value: &serde_json::Value) -> Result<()> {
        self.sink
            .send(Message::Text(value.to_string()))
            .await
            .context("frame was not accepted")?;
        Ok(())
    }

    /// Wait up to `wait` for the next text frame and parse it.
    ///
    /// Control frames do not consume the budget; the deadline spans the
    /// whole call, not each poll.
    pub async fn recv_reply(&mut self, wait: Duration) -> Result<ServerFrame, RecvError> {
        let deadline = Instant::now() + wait;
        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return Err(RecvError::Timeout(wait));
            }

            match tokio::time::timeout(remaining, self.stream.next()).await {
                Err(_) => return Err(RecvError::Timeout(wait)),
                Ok(None) => return Err(RecvError::Closed),
                Ok(Some(Err(e))) => return Err(RecvError::Transport(e)),
                Ok(Some(Ok(Message::Text(text)))) => {
                    log::debug!("jail frame: {}", text);
                    return Ok(serde_json::from_str(&text)?);
                }
                Ok(Some(Ok(Message::Close(_)))) => return Err(RecvError::Closed),
                // Ping/pong and binary keepalives are not replies.
                Ok(Some(Ok(_))) => continue,
            }
        }
    }

    /// Best-effort close; the scenario verdict never hinges on it.
    pub async fn close(mut self) {
        let _ = self.sink.close().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::extract::ws::{Message as WsMessage, WebSocket, WebSocketUpgrade};
    use axum::routing::get;
    use axum::Router;
    use serde_json::json;
    use std::net::SocketAddr;

    async fn echo_socket(mut socket: WebSocket) {
        while let Some(Ok(msg)) = socket.recv().await {
            if let WsMessage::Text(text) = msg {
                let frame: serde_json::Value = serde_json::from_str(&text).unwrap();
                let reply = json!({
                    "type": "text",
                    "channel_id": frame["channel_id"],
                    "content": "hello back",
                });
                let _ = socket.send(WsMessage::Text(reply.to_string())).await;
            }
        }
    }

    async fn serve_ws() -> SocketAddr {
        let app = Router::new().route(
            "/",
            get(|ws: WebSocketUpgrade| async move { ws.on_upgrade(echo_socket) }),
        );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        addr
    }

    fn client_for(addr: SocketAddr) -> JailClient {
        let config = JailConfig {
            url: format!("ws://{}", addr),
            ..JailConfig::default()
        };
        JailClient::new(&config)
    }

    #[tokio::test]
    async fn test_send_and_recv_round_trip() {
        let addr = serve_ws().await;
        let client = client_for(addr);
        let mut session = client.connect().await.unwrap();

        session
            .send(&ClientFrame::Query {
                channel_id: "ch-1".to_string(),
                workspace: "/tmp".to_string(),
                prompt: "Say hello".to_string(),
                session_id: None,
            })
            .await
            .unwrap();

        let frame = session.recv_reply(Duration::from_secs(2)).await.unwrap();
        assert_eq!(frame.kind(), "text");
        assert_eq!(frame.channel_id(), Some("ch-1"));

        session.close().await;
    }

    #[tokio::test]
    async fn test_recv_times_out_when_nothing_is_sent() {
        let addr = serve_ws().await;
        let client = client_for(addr);
        let mut session = client.connect().await.unwrap();

        let err = session.recv_reply(Duration::from_millis(50)).await.unwrap_err();
        assert!(matches!(err, RecvError::Timeout(_)));
    }

    #[tokio::test]
    async fn test_is_ready_against_live_server() {
        let addr = serve_ws().await;
        assert!(client_for(addr).is_ready().await);
    }

    #[tokio::test]
    async fn test_is_ready_against_dead_port() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        assert!(!client_for(addr).is_ready().await);
    }

    #[tokio::test]
    async fn test_connect_error_names_the_url() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        // Sessions carry no Debug impl, so drop the success value
        // before unwrapping the error.
        let err = client_for(addr)
            .connect()
            .await
            .map(|_| ())
            .unwrap_err();
        assert!(format!("{:#}", err).contains(&addr.to_string()));
    }
}
