use anyhow::{Context, Result};
use async_trait::async_trait;
use futures_util::StreamExt;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::sse::{final_response, SseParser, StreamEvent};
use crate::config::GatewayConfig;
use crate::probe::ReadyCheck;

/// One registered agent, as listed by /api/agents. The gateway sends
/// more fields; only the id matters here.
#[derive(Debug, Clone, Deserialize)]
pub struct AgentDescriptor {
    pub id: String,
}

#[derive(Serialize)]
struct SendRequest<'a> {
    agent_id: &'a str,
    content: &'a str,
    sender: &'a str,
}

/// Everything collected from one /api/send exchange.
#[derive(Debug)]
pub struct SendOutcome {
    pub status: u16,
    pub events: Vec<StreamEvent>,
    pub full_response: Option<String>,
}

/// HTTP client for the gateway under test.
///
/// One instance is shared across all scenarios in a run; reqwest pools
/// connections internally, so sharing is the only state involved.
pub struct GatewayClient {
    base_url: String,
    client: reqwest::Client,
    send_timeout: Duration,
}

impl GatewayClient {
    pub fn new(config: &GatewayConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .expect("Failed to create HTTP client");

        Self {
            base_url: config.base_url.clone(),
            client,
            send_timeout: config.send_timeout,
        }
    }

    /// GET /health; anything but a 200 is an error.
    pub async fn check_health(&self) -> Result<()> {
        let url = format!("{}/health", self.base_url);
        let resp = self
            .client
            .get(&url)
            .send()
            .await
            .context("health request failed")?;

        let status = resp.status().as_u16();
        if status != 200 {
            anyhow::bail!("Status code: {}", status);
        }
        Ok(())
    }

    /// GET /api/agents, decoded as a sequence of descriptors.
    pub async fn list_agents(&self) -> Result<Vec<AgentDescriptor>> {
        let url = format!("{}/api/agents", self.base_url);
        let resp = self
            .client
            .get(&url)
            .send()
            .await
            .context("agent listing request failed")?;

        let status = resp.status().as_u16();
        if status != 200 {
            anyhow::bail!("Status code: {}", status);
        }

        resp.json::<Vec<AgentDescriptor>>()
            .await
            .context("agent listing did not parse as a JSON array")
    }

    /// POST /api/send and drain the streamed reply.
    ///
    /// The timeout covers the whole exchange including the body, so a
    /// stalled stream abandons the call instead of hanging the run.
    pub async fn send_message(&self, agent_id: &str, content: &str) -> Result<SendOutcome> {
        let url = format!("{}/api/send", self.base_url);
        let body = SendRequest {
            agent_id,
            content,
            sender: "e2e-test",
        };

        let resp = self
            .client
            .post(&url)
            .timeout(self.send_timeout)
            .json(&body)
            .send()
            .await
            .with_context(|| format!("send to {} failed", agent_id))?;

        let status = resp.status().as_u16();

        let mut parser = SseParser::new();
        let mut events = Vec::new();
        let mut stream = resp.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.with_context(|| format!("reply stream from {} broke", agent_id))?;
            events.extend(parser.push(&chunk));
        }
        events.extend(parser.finish());

        log::debug!(
            "send to {}: status {}, {} events",
            agent_id,
            status,
            events.len()
        );

        let full_response = final_response(&events).map(str::to_owned);
        Ok(SendOutcome {
            status,
            events,
            full_response,
        })
    }
}

#[async_trait]
impl ReadyCheck for GatewayClient {
    fn target(&self) -> String {
        format!("gateway at {}", self.base_url)
    }

    async fn is_ready(&self) -> bool {
        self.check_health().await.is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{header, StatusCode};
    use axum::response::IntoResponse;
    use axum::routing::{get, post};
    use axum::{Json, Router};
    use serde_json::json;
    use std::net::SocketAddr;

    async fn serve(app: Router) -> SocketAddr {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        addr
    }

    fn client_for(addr: SocketAddr) -> GatewayClient {
        let config = GatewayConfig {
            base_url: format!("http://{}", addr),
            request_timeout: std::time::Duration::from_secs(5),
            send_timeout: std::time::Duration::from_secs(5),
            ..GatewayConfig::default()
        };
        GatewayClient::new(&config)
    }

    #[derive(serde::Deserialize)]
    struct SendBody {
        agent_id: String,
        #[allow(dead_code)]
        content: String,
        sender: String,
    }

    async fn send_handler(Json(req): Json<SendBody>) -> impl IntoResponse {
        assert_eq!(req.sender, "e2e-test");
        let body = format!(
            "data: {}\ngarbage line\ndata: {}\n",
            json!({"type": "text", "content": "hello"}),
            json!({"type": "done", "full_response": format!("hello from {}", req.agent_id)}),
        );
        ([(header::CONTENT_TYPE, "text/event-stream")], body)
    }

    fn mock_gateway() -> Router {
        Router::new()
            .route("/health", get(|| async { StatusCode::OK }))
            .route(
                "/api/agents",
                get(|| async {
                    Json(json!([
                        {"id": "alpha", "model": "small"},
                        {"id": "beta"},
                    ]))
                }),
            )
            .route("/api/send", post(send_handler))
    }

    #[tokio::test]
    async fn test_health_ok() {
        let addr = serve(mock_gateway()).await;
        let client = client_for(addr);

        assert!(client.check_health().await.is_ok());
        assert!(client.is_ready().await);
    }

    #[tokio::test]
    async fn test_health_error_carries_status() {
        let app = Router::new().route(
            "/health",
            get(|| async { StatusCode::INTERNAL_SERVER_ERROR }),
        );
        let addr = serve(app).await;
        let client = client_for(addr);

        let err = client.check_health().await.unwrap_err();
        assert!(err.to_string().contains("500"));
        assert!(!client.is_ready().await);
    }

    #[tokio::test]
    async fn test_list_agents_decodes_ids() {
        let addr = serve(mock_gateway()).await;
        let client = client_for(addr);

        let agents = client.list_agents().await.unwrap();
        let ids: Vec<&str> = agents.iter().map(|a| a.id.as_str()).collect();
        assert_eq!(ids, vec!["alpha", "beta"]);
    }

    #[tokio::test]
    async fn test_list_agents_rejects_non_array() {
        let app = Router::new().route(
            "/api/agents",
            get(|| async { Json(json!({"agents": []})) }),
        );
        let addr = serve(app).await;
        let client = client_for(addr);

        assert!(client.list_agents().await.is_err());
    }

    #[tokio::test]
    async fn test_send_message_collects_stream() {
        let addr = serve(mock_gateway()).await;
        let client = client_for(addr);

        let outcome = client.send_message("alpha", "Say hello briefly").await.unwrap();
        assert_eq!(outcome.status, 200);
        assert_eq!(outcome.events.len(), 2);
        assert_eq!(outcome.full_response.as_deref(), Some("hello from alpha"));
    }

    #[tokio::test]
    async fn test_send_gives_up_on_stalled_stream() {
        use futures_util::stream;

        let app = Router::new().route(
            "/api/send",
            post(|| async {
                // One event, then the body stalls forever.
                let chunks = stream::iter([Ok::<_, std::io::Error>(
                    "data: {\"type\":\"text\",\"content\":\"hi\"}\n",
                )])
                .chain(stream::pending());
                (
                    [(header::CONTENT_TYPE, "text/event-stream")],
                    axum::body::Body::from_stream(chunks),
                )
            }),
        );
        let addr = serve(app).await;

        let config = GatewayConfig {
            base_url: format!("http://{}", addr),
            request_timeout: std::time::Duration::from_secs(5),
            send_timeout: std::time::Duration::from_millis(300),
            ..GatewayConfig::default()
        };
        let client = GatewayClient::new(&config);

        let result = tokio::time::timeout(
            std::time::Duration::from_secs(5),
            client.send_message("alpha", "Say hello briefly"),
        )
        .await
        .expect("send did not give up on the stalled stream");

        let err = result.unwrap_err();
        assert!(format!("{:#}", err).contains("reply stream from alpha broke"));
    }

    #[tokio::test]
    async fn test_unreachable_gateway_not_ready() {
        // Bind then drop to get a port with nothing listening on it.
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = client_for(addr);
        assert!(!client.is_ready().await);
    }
}
