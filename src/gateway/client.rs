use async_trait::async_trait;
use futures::future::join_all;
use reqwest::Client;
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

use super::protocol::{JsonRpcRequest, JsonRpcResponse, ToolCallResult};
use super::{GatewayConfig, GatewayError, ToolGateway};
use crate::error::{AssessmentError, Result};

struct ServerHandle {
    client: Client,
    url: String,
    timeout: Duration,
    enabled: bool,
}

/// Gateway that talks JSON-RPC over HTTP POST to one endpoint per tool server.
pub struct McpHttpGateway {
    servers: BTreeMap<String, ServerHandle>,
    connected: BTreeSet<String>,
    next_id: AtomicU64,
}

impl McpHttpGateway {
    pub fn new(config: &GatewayConfig) -> Result<Self> {
        let mut servers = BTreeMap::new();

        for (name, server) in &config.servers {
            let timeout = Duration::from_secs(config.timeout_for(server));
            let client = Client::builder()
                .timeout(timeout)
                .danger_accept_invalid_certs(false)
                .build()
                .map_err(|e| {
                    AssessmentError::config(format!("cannot build client for '{}': {}", name, e))
                })?;

            servers.insert(
                name.clone(),
                ServerHandle {
                    client,
                    url: server.url.trim_end_matches('/').to_string(),
                    timeout,
                    enabled: server.enabled,
                },
            );
        }

        Ok(Self {
            servers,
            connected: BTreeSet::new(),
            next_id: AtomicU64::new(1),
        })
    }

    fn next_id(&self) -> u64 {
        self.next_id.fetch_add(1, Ordering::Relaxed)
    }

    async fn send(
        &self,
        name: &str,
        handle: &ServerHandle,
        request: &JsonRpcRequest,
    ) -> std::result::Result<Value, GatewayError> {
        let start = Instant::now();
        let response = handle
            .client
            .post(&handle.url)
            .header("Accept", "application/json")
            .json(request)
            .send()
            .await
            .map_err(|e| Self::transport_error(name, handle, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(GatewayError::Transport {
                server: name.to_string(),
                message: format!("HTTP {}", status.as_u16()),
            });
        }

        let body: JsonRpcResponse = response
            .json()
            .await
            .map_err(|e| Self::transport_error(name, handle, e))?;

        debug!(
            server = name,
            method = %request.method,
            duration_ms = start.elapsed().as_millis() as u64,
            "JSON-RPC response received"
        );

        if let Some(err) = body.error {
            return Err(GatewayError::Rpc {
                server: name.to_string(),
                code: err.code,
                message: err.message,
            });
        }

        body.result.ok_or_else(|| GatewayError::InvalidResponse {
            server: name.to_string(),
            message: "response carries neither result nor error".to_string(),
        })
    }

    fn transport_error(name: &str, handle: &ServerHandle, e: reqwest::Error) -> GatewayError {
        if e.is_timeout() {
            GatewayError::Timeout {
                server: name.to_string(),
                after: handle.timeout,
            }
        } else if e.is_decode() {
            GatewayError::InvalidResponse {
                server: name.to_string(),
                message: e.to_string(),
            }
        } else {
            GatewayError::Transport {
                server: name.to_string(),
                message: e.to_string(),
            }
        }
    }
}

#[async_trait]
impl ToolGateway for McpHttpGateway {
    async fn connect_all(&mut self) -> std::result::Result<(), GatewayError> {
        let this = &*self;
        let attempts: Vec<_> = this
            .servers
            .iter()
            .filter(|(name, handle)| {
                if !handle.enabled {
                    debug!(server = name.as_str(), "server disabled, not connecting");
                }
                handle.enabled
            })
            .map(|(name, handle)| async move {
                let request = JsonRpcRequest::initialize(this.next_id());
                (name.clone(), this.send(name, handle, &request).await)
            })
            .collect();

        let outcomes = join_all(attempts).await;

        for (name, outcome) in outcomes {
            match outcome {
                Ok(_) => {
                    info!(server = name.as_str(), "connected");
                    self.connected.insert(name);
                }
                Err(e) => warn!(server = name.as_str(), error = %e, "failed to connect"),
            }
        }

        Ok(())
    }

    async fn close_all(&mut self) {
        for name in std::mem::take(&mut self.connected) {
            debug!(server = name.as_str(), "disconnected");
        }
    }

    fn is_configured(&self, server: &str) -> bool {
        self.servers.contains_key(server)
    }

    fn is_connected(&self, server: &str) -> bool {
        self.connected.contains(server)
    }

    fn connected(&self) -> Vec<String> {
        self.connected.iter().cloned().collect()
    }

    async fn call_tool(
        &self,
        server: &str,
        action: &str,
        params: Value,
    ) -> std::result::Result<Value, GatewayError> {
        let handle = self
            .servers
            .get(server)
            .ok_or_else(|| GatewayError::NotConfigured(server.to_string()))?;

        if !self.connected.contains(server) {
            return Err(GatewayError::NotConnected(server.to_string()));
        }

        let request = JsonRpcRequest::tool_call(self.next_id(), action, params);
        let result = self.send(server, handle, &request).await?;

        let call: ToolCallResult =
            serde_json::from_value(result).map_err(|e| GatewayError::InvalidResponse {
                server: server.to_string(),
                message: e.to_string(),
            })?;

        if call.is_error {
            return Err(GatewayError::Tool {
                server: server.to_string(),
                action: action.to_string(),
                message: call.first_text().unwrap_or("tool reported an error").to_string(),
            });
        }

        Ok(call.into_payload())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server, ServerGuard};
    use serde_json::json;

    fn init_ok() -> String {
        json!({"jsonrpc": "2.0", "id": 1, "result": {"protocolVersion": "2024-11-05"}})
            .to_string()
    }

    async fn connected_gateway(server: &ServerGuard, name: &str) -> McpHttpGateway {
        let config = GatewayConfig::default().with_server(name, server.url());
        let mut gateway = McpHttpGateway::new(&config).unwrap();
        gateway.connect_all().await.unwrap();
        gateway
    }

    #[tokio::test]
    async fn test_connect_and_call_tool() {
        let mut server = Server::new_async().await;
        let _init = server
            .mock("POST", "/")
            .match_body(Matcher::PartialJson(json!({"method": "initialize"})))
            .with_status(200)
            .with_body(init_ok())
            .create_async()
            .await;
        let _call = server
            .mock("POST", "/")
            .match_body(Matcher::PartialJson(json!({
                "method": "tools/call",
                "params": {"name": "scan", "arguments": {"target": "example.com"}}
            })))
            .with_status(200)
            .with_body(
                json!({
                    "jsonrpc": "2.0",
                    "id": 2,
                    "result": {"content": [{"type": "text", "text": "{\"services\": [{\"name\": \"http\"}]}"}]}
                })
                .to_string(),
            )
            .create_async()
            .await;

        let gateway = connected_gateway(&server, "nmap-mcp").await;
        assert!(gateway.is_connected("nmap-mcp"));

        let result = gateway
            .call_tool("nmap-mcp", "scan", json!({"target": "example.com"}))
            .await
            .unwrap();
        assert_eq!(result["services"][0]["name"], "http");
    }

    #[tokio::test]
    async fn test_unreachable_server_left_out() {
        let mut server = Server::new_async().await;
        let _init = server
            .mock("POST", "/")
            .with_status(503)
            .create_async()
            .await;

        let gateway = connected_gateway(&server, "zap-mcp").await;
        assert!(gateway.is_configured("zap-mcp"));
        assert!(!gateway.is_connected("zap-mcp"));

        let err = gateway
            .call_tool("zap-mcp", "scan", json!({}))
            .await
            .unwrap_err();
        assert_eq!(err, GatewayError::NotConnected("zap-mcp".to_string()));
    }

    #[tokio::test]
    async fn test_tool_error_flag() {
        let mut server = Server::new_async().await;
        let _init = server
            .mock("POST", "/")
            .match_body(Matcher::PartialJson(json!({"method": "initialize"})))
            .with_body(init_ok())
            .create_async()
            .await;
        let _call = server
            .mock("POST", "/")
            .match_body(Matcher::PartialJson(json!({"method": "tools/call"})))
            .with_body(
                json!({
                    "jsonrpc": "2.0",
                    "id": 2,
                    "result": {"content": [{"type": "text", "text": "target unreachable"}], "isError": true}
                })
                .to_string(),
            )
            .create_async()
            .await;

        let gateway = connected_gateway(&server, "nikto-mcp").await;
        let err = gateway
            .call_tool("nikto-mcp", "scan", json!({}))
            .await
            .unwrap_err();
        assert!(matches!(err, GatewayError::Tool { ref message, .. } if message == "target unreachable"));
    }

    #[tokio::test]
    async fn test_rpc_error_object() {
        let mut server = Server::new_async().await;
        let _init = server
            .mock("POST", "/")
            .match_body(Matcher::PartialJson(json!({"method": "initialize"})))
            .with_body(init_ok())
            .create_async()
            .await;
        let _call = server
            .mock("POST", "/")
            .match_body(Matcher::PartialJson(json!({"method": "tools/call"})))
            .with_body(
                json!({"jsonrpc": "2.0", "id": 2, "error": {"code": -32601, "message": "Method not found"}})
                    .to_string(),
            )
            .create_async()
            .await;

        let gateway = connected_gateway(&server, "cve-mcp").await;
        let err = gateway
            .call_tool("cve-mcp", "search", json!({}))
            .await
            .unwrap_err();
        assert!(matches!(err, GatewayError::Rpc { code: -32601, .. }));
    }

    #[tokio::test]
    async fn test_close_all_clears_connections() {
        let mut server = Server::new_async().await;
        let _init = server
            .mock("POST", "/")
            .with_body(init_ok())
            .create_async()
            .await;

        let mut gateway = connected_gateway(&server, "exploitdb-mcp").await;
        assert_eq!(gateway.connected(), vec!["exploitdb-mcp".to_string()]);
        gateway.close_all().await;
        assert!(gateway.connected().is_empty());
    }

    #[tokio::test]
    async fn test_unknown_server_not_configured() {
        let gateway = McpHttpGateway::new(&GatewayConfig::default()).unwrap();
        let err = gateway
            .call_tool("metasploit-mcp", "exploit", json!({}))
            .await
            .unwrap_err();
        assert_eq!(
            err,
            GatewayError::NotConfigured("metasploit-mcp".to_string())
        );
    }
}
