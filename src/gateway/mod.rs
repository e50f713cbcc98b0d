//! Remote tool invocation.
//!
//! Every phase reaches its tools through [`ToolGateway`]. The shipped implementation,
//! [`McpHttpGateway`], speaks MCP-style JSON-RPC over HTTP to one server per tool.

mod client;
mod config;
mod protocol;

use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;

pub use client::McpHttpGateway;
pub use config::{GatewayConfig, ServerConfig};
pub use protocol::{JsonRpcError, JsonRpcRequest, JsonRpcResponse, ToolCallResult};

#[derive(Debug, Clone, Error, PartialEq)]
pub enum GatewayError {
    #[error("server '{0}' is not configured")]
    NotConfigured(String),

    #[error("server '{0}' is not connected")]
    NotConnected(String),

    #[error("transport error talking to '{server}': {message}")]
    Transport { server: String, message: String },

    #[error("'{server}' returned JSON-RPC error {code}: {message}")]
    Rpc {
        server: String,
        code: i64,
        message: String,
    },

    #[error("tool '{action}' on '{server}' failed: {message}")]
    Tool {
        server: String,
        action: String,
        message: String,
    },

    #[error("call to '{server}' timed out after {after:?}")]
    Timeout { server: String, after: Duration },

    #[error("invalid response from '{server}': {message}")]
    InvalidResponse { server: String, message: String },
}

#[async_trait]
pub trait ToolGateway: Send + Sync {
    /// Connects to every configured server. Servers that cannot be reached are left out of
    /// the connected set; only a failure of the gateway as a whole is an error.
    async fn connect_all(&mut self) -> Result<(), GatewayError>;

    async fn close_all(&mut self);

    fn is_configured(&self, server: &str) -> bool;

    fn is_connected(&self, server: &str) -> bool;

    fn connected(&self) -> Vec<String>;

    async fn call_tool(&self, server: &str, action: &str, params: Value)
    -> Result<Value, GatewayError>;
}
