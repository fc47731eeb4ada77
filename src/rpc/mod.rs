//! JSON-RPC front ends
//!
//! Two adapters share the JSON-RPC 2.0 envelope types defined here:
//!
//! - [`ProtocolAdapter`]: single-shot mode. Reads one request from the whole of
//!   stdin, answers with exactly one response line, then exits. This is the
//!   mode selected when the binary runs with no arguments and piped input.
//! - [`mcp::McpServer`]: line-delimited Model Context Protocol tool server.
//!
//! # Example
//!
//! ```no_run
//! use prompt_enhancer::rpc::ProtocolAdapter;
//! use prompt_enhancer::EnhancerConfig;
//!
//! # async fn example() -> std::io::Result<()> {
//! let config = EnhancerConfig::from_env().expect("valid configuration");
//! let adapter = ProtocolAdapter::from_config(&config);
//! adapter.serve(tokio::io::stdin(), tokio::io::stdout()).await
//! # }
//! ```

pub mod mcp;

use crate::cli::output::render_result_markdown;
use crate::config::EnhancerConfig;
use crate::enhance::{EnhancementContext, EnhancementResult, Enhancer};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{debug, error, info};

pub const JSONRPC_VERSION: &str = "2.0";

/// Standard JSON-RPC error codes
pub const PARSE_ERROR: i64 = -32700;
pub const INVALID_REQUEST: i64 = -32600;
pub const METHOD_NOT_FOUND: i64 = -32601;
pub const INVALID_PARAMS: i64 = -32602;
pub const INTERNAL_ERROR: i64 = -32603;

/// Method name accepted by the single-shot adapter
pub const ENHANCE_METHOD: &str = "enhance";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RpcError {
    pub code: i64,
    pub message: String,
}

/// JSON-RPC 2.0 response envelope
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RpcResponse {
    pub jsonrpc: String,
    pub id: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<RpcError>,
}

impl RpcResponse {
    pub fn success(id: Value, result: Value) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id,
            result: Some(result),
            error: None,
        }
    }

    pub fn failure(id: Value, code: i64, message: impl Into<String>) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id,
            result: None,
            error: Some(RpcError {
                code,
                message: message.into(),
            }),
        }
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}

#[derive(Debug, Deserialize)]
struct RpcRequest {
    method: String,
    #[serde(default)]
    params: Value,
}

#[derive(Debug, Deserialize)]
struct EnhanceParams {
    prompt: String,
    #[serde(default)]
    context: Option<EnhancementContext>,
}

/// Serializes a response as one newline-terminated line and flushes
pub(crate) async fn write_response<W>(
    writer: &mut W,
    response: &RpcResponse,
) -> std::io::Result<()>
where
    W: AsyncWrite + Unpin,
{
    let mut line = serde_json::to_string(response)?;
    line.push('\n');
    writer.write_all(line.as_bytes()).await?;
    writer.flush().await
}

/// Result payload plus the rendered Markdown under `markdown`
fn result_payload(result: &EnhancementResult) -> Result<Value, String> {
    let mut payload = serde_json::to_value(result)
        .map_err(|e| format!("Failed to serialize enhancement result: {}", e))?;
    if let Value::Object(map) = &mut payload {
        map.insert(
            "markdown".to_string(),
            Value::String(render_result_markdown(result)),
        );
    }
    Ok(payload)
}

/// Single-shot JSON-RPC adapter
pub struct ProtocolAdapter {
    /// Either a ready enhancer or the reason enhancement is unavailable
    enhancer: Result<Enhancer, String>,
}

impl ProtocolAdapter {
    pub fn new(enhancer: Enhancer) -> Self {
        Self {
            enhancer: Ok(enhancer),
        }
    }

    /// A missing credential is reported per request rather than at startup,
    /// so that callers still receive a well-formed error response.
    pub fn from_config(config: &EnhancerConfig) -> Self {
        Self {
            enhancer: Enhancer::from_config(config).map_err(|e| e.to_string()),
        }
    }

    /// An adapter that answers every enhancement with `reason`
    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self {
            enhancer: Err(reason.into()),
        }
    }

    /// Answers one raw request
    ///
    /// Input that is not JSON yields an error with a `null` id. Every failure,
    /// including an unknown method, uses the internal error code.
    pub async fn handle_request(&self, raw: &str) -> RpcResponse {
        let value: Value = match serde_json::from_str(raw.trim()) {
            Ok(value) => value,
            Err(e) => {
                error!("Failed to parse request: {}", e);
                return RpcResponse::failure(
                    Value::Null,
                    INTERNAL_ERROR,
                    format!("Parse error: {}", e),
                );
            }
        };
        let id = value.get("id").cloned().unwrap_or(Value::Null);

        match self.dispatch(value).await {
            Ok(result) => RpcResponse::success(id, result),
            Err(message) => {
                error!("Request failed: {}", message);
                RpcResponse::failure(id, INTERNAL_ERROR, message)
            }
        }
    }

    async fn dispatch(&self, value: Value) -> Result<Value, String> {
        let request: RpcRequest =
            serde_json::from_value(value).map_err(|e| format!("Invalid request: {}", e))?;
        debug!("Protocol request: {}", request.method);

        if request.method != ENHANCE_METHOD {
            return Err(format!("Unknown method: {}", request.method));
        }

        let params: EnhanceParams =
            serde_json::from_value(request.params).map_err(|e| format!("Invalid params: {}", e))?;
        let enhancer = self.enhancer.as_ref().map_err(|reason| reason.clone())?;
        let context = params.context.unwrap_or_default();

        let result = enhancer
            .enhance(&params.prompt, &context)
            .await
            .map_err(|e| e.to_string())?;
        info!("Protocol enhancement complete");
        result_payload(&result)
    }

    /// Reads the whole input, answers it and writes one response line
    pub async fn serve<R, W>(&self, mut reader: R, mut writer: W) -> std::io::Result<()>
    where
        R: AsyncRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut input = String::new();
        reader.read_to_string(&mut input).await?;
        let response = self.handle_request(&input).await;
        write_response(&mut writer, &response).await
    }
}
