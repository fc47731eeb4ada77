//! Model Context Protocol tool server
//!
//! Line-delimited JSON-RPC 2.0 over stdin/stdout exposing a single
//! `enhance_prompt` tool. Runs until end of input. Diagnostics go to stderr
//! through `tracing`, never to the protocol stream.

use super::{
    write_response, RpcResponse, INVALID_PARAMS, INVALID_REQUEST, METHOD_NOT_FOUND, PARSE_ERROR,
};
use crate::cli::output::render_result_markdown;
use crate::config::EnhancerConfig;
use crate::enhance::{EnhanceError, EnhancementContext, Enhancer};
use crate::templates;
use serde::Deserialize;
use serde_json::{json, Value};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite};
use tracing::{debug, info, warn};

pub const PROTOCOL_VERSION: &str = "2024-11-05";
pub const SERVER_NAME: &str = "prompt-enhancer";
pub const TOOL_NAME: &str = "enhance_prompt";

const TOOL_DESCRIPTION: &str = "Enhance a developer prompt using Claude API and prompt \
    engineering best practices. Transforms vague prompts into highly effective ones with role \
    assignment, context, structure, and clear specifications.";

#[derive(Debug, Deserialize)]
struct ToolCall {
    name: String,
    #[serde(default)]
    arguments: Value,
}

#[derive(Debug, Deserialize)]
struct EnhanceArguments {
    prompt: String,
    #[serde(default)]
    template: Option<String>,
}

pub struct McpServer {
    enhancer: Result<Enhancer, EnhanceError>,
}

impl McpServer {
    pub fn new(enhancer: Enhancer) -> Self {
        Self {
            enhancer: Ok(enhancer),
        }
    }

    /// The server starts without a credential and reports it on each tool call
    pub fn from_config(config: &EnhancerConfig) -> Self {
        let enhancer = Enhancer::from_config(config);
        match &enhancer {
            Ok(_) => info!("MCP server ready, API key configured"),
            Err(e) => warn!("MCP server started without a usable enhancer: {}", e),
        }
        Self { enhancer }
    }

    /// Processes requests line by line until the reader is exhausted
    pub async fn serve<R, W>(&self, reader: R, mut writer: W) -> std::io::Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        info!("{} MCP server v{} running", SERVER_NAME, crate::VERSION);
        let mut lines = reader.lines();
        while let Some(line) = lines.next_line().await? {
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }
            if let Some(response) = self.handle_line(trimmed).await {
                write_response(&mut writer, &response).await?;
            }
        }
        debug!("Input closed, MCP server stopping");
        Ok(())
    }

    /// Answers one message; notifications yield `None`
    pub async fn handle_line(&self, line: &str) -> Option<RpcResponse> {
        let message: Value = match serde_json::from_str(line) {
            Ok(value) => value,
            Err(e) => {
                warn!("Unparseable MCP message: {}", e);
                return Some(RpcResponse::failure(
                    Value::Null,
                    PARSE_ERROR,
                    format!("Parse error: {}", e),
                ));
            }
        };

        let method = message.get("method").and_then(Value::as_str);
        let Some(id) = message.get("id").cloned() else {
            debug!("Notification: {}", method.unwrap_or("<none>"));
            return None;
        };
        let Some(method) = method else {
            return Some(RpcResponse::failure(id, INVALID_REQUEST, "Missing method"));
        };
        debug!("MCP request: {}", method);

        let params = message.get("params").cloned().unwrap_or(Value::Null);
        let outcome = match method {
            "initialize" => Ok(initialize_result()),
            "ping" => Ok(json!({})),
            "tools/list" => Ok(tools_list_result()),
            "tools/call" => self.call_tool(params).await,
            other => Err((METHOD_NOT_FOUND, format!("Method not found: {}", other))),
        };

        Some(match outcome {
            Ok(result) => RpcResponse::success(id, result),
            Err((code, message)) => RpcResponse::failure(id, code, message),
        })
    }

    async fn call_tool(&self, params: Value) -> Result<Value, (i64, String)> {
        let call: ToolCall = serde_json::from_value(params)
            .map_err(|e| (INVALID_PARAMS, format!("Invalid params: {}", e)))?;
        if call.name != TOOL_NAME {
            return Err((INVALID_PARAMS, format!("Unknown tool: {}", call.name)));
        }
        let args: EnhanceArguments = serde_json::from_value(call.arguments)
            .map_err(|e| (INVALID_PARAMS, format!("Invalid arguments: {}", e)))?;

        let enhancer = match &self.enhancer {
            Ok(enhancer) => enhancer,
            Err(EnhanceError::MissingCredential) => {
                return Ok(tool_result(
                    "❌ Error: ANTHROPIC_API_KEY environment variable not set. Please add your \
                     API key to the .env file.",
                    true,
                ))
            }
            Err(e) => return Ok(tool_result(&format!("❌ Error: {}", e), true)),
        };

        let context = EnhancementContext {
            template: args.template,
            ..Default::default()
        };
        match enhancer.enhance(&args.prompt, &context).await {
            Ok(result) => Ok(tool_result(&render_result_markdown(&result), false)),
            Err(e) => {
                warn!("Tool call failed: {}", e);
                Ok(tool_result(&format!("❌ Error: {}", e), true))
            }
        }
    }
}

fn tool_result(text: &str, is_error: bool) -> Value {
    json!({
        "content": [{ "type": "text", "text": text }],
        "isError": is_error,
    })
}

fn initialize_result() -> Value {
    json!({
        "protocolVersion": PROTOCOL_VERSION,
        "capabilities": { "tools": {} },
        "serverInfo": { "name": SERVER_NAME, "version": crate::VERSION },
    })
}

fn tools_list_result() -> Value {
    let keys: Vec<&str> = templates::keys().collect();
    let template_description = format!("Optional template to apply ({})", keys.join(", "));
    json!({
        "tools": [{
            "name": TOOL_NAME,
            "description": TOOL_DESCRIPTION,
            "inputSchema": {
                "type": "object",
                "properties": {
                    "prompt": {
                        "type": "string",
                        "description": "The original prompt to enhance",
                    },
                    "template": {
                        "type": "string",
                        "enum": keys,
                        "description": template_description,
                    },
                },
                "required": ["prompt"],
            },
        }],
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::{BackendError, MockLLMClient, MockResponse};
    use crate::tracker::CostLog;
    use std::sync::Arc;
    use tempfile::TempDir;

    fn server_with(responses: Vec<MockResponse>, dir: &TempDir) -> McpServer {
        let client = MockLLMClient::new();
        client.add_responses(responses);
        let log = CostLog::new(dir.path().join("log.jsonl"));
        McpServer::new(Enhancer::new(Arc::new(client), log))
    }

    #[tokio::test]
    async fn test_initialize() {
        let dir = TempDir::new().unwrap();
        let server = server_with(vec![], &dir);
        let response = server
            .handle_line(r#"{"jsonrpc":"2.0","id":0,"method":"initialize","params":{}}"#)
            .await
            .unwrap();
        let result = response.result.unwrap();
        assert_eq!(result["protocolVersion"], PROTOCOL_VERSION);
        assert_eq!(result["serverInfo"]["name"], "prompt-enhancer");
        assert!(result["capabilities"]["tools"].is_object());
    }

    #[tokio::test]
    async fn test_notification_has_no_response() {
        let dir = TempDir::new().unwrap();
        let server = server_with(vec![], &dir);
        let response = server
            .handle_line(r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#)
            .await;
        assert!(response.is_none());
    }

    #[tokio::test]
    async fn test_tools_list_uses_registry_keys() {
        let dir = TempDir::new().unwrap();
        let server = server_with(vec![], &dir);
        let response = server
            .handle_line(r#"{"jsonrpc":"2.0","id":1,"method":"tools/list"}"#)
            .await
            .unwrap();
        let result = response.result.unwrap();
        let tool = &result["tools"][0];
        assert_eq!(tool["name"], TOOL_NAME);
        assert_eq!(tool["inputSchema"]["required"][0], "prompt");
        let keys = tool["inputSchema"]["properties"]["template"]["enum"]
            .as_array()
            .unwrap();
        assert_eq!(keys.len(), templates::list().len());
        assert!(keys.contains(&Value::from("debug")));
    }

    #[tokio::test]
    async fn test_unknown_method_and_parse_error() {
        let dir = TempDir::new().unwrap();
        let server = server_with(vec![], &dir);

        let response = server
            .handle_line(r#"{"jsonrpc":"2.0","id":2,"method":"resources/list"}"#)
            .await
            .unwrap();
        assert_eq!(response.error.unwrap().code, METHOD_NOT_FOUND);

        let response = server.handle_line("{oops").await.unwrap();
        assert_eq!(response.id, Value::Null);
        assert_eq!(response.error.unwrap().code, PARSE_ERROR);
    }

    #[tokio::test]
    async fn test_unknown_tool() {
        let dir = TempDir::new().unwrap();
        let server = server_with(vec![], &dir);
        let response = server
            .handle_line(
                r#"{"jsonrpc":"2.0","id":3,"method":"tools/call","params":{"name":"other","arguments":{}}}"#,
            )
            .await
            .unwrap();
        let error = response.error.unwrap();
        assert_eq!(error.code, INVALID_PARAMS);
        assert_eq!(error.message, "Unknown tool: other");
    }

    #[tokio::test]
    async fn test_tool_call_returns_markdown() {
        let dir = TempDir::new().unwrap();
        let answer = r#"{"enhanced": {"prompt": "Act as a QA engineer.", "techniques": ["role-assignment"], "improvements": ["scope"], "confidence": 7}}"#;
        let server = server_with(vec![MockResponse::text(answer).with_usage(10, 10)], &dir);
        let response = server
            .handle_line(
                r#"{"jsonrpc":"2.0","id":4,"method":"tools/call","params":{"name":"enhance_prompt","arguments":{"prompt":"test it","template":"test"}}}"#,
            )
            .await
            .unwrap();
        let result = response.result.unwrap();
        assert_eq!(result["isError"], false);
        let text = result["content"][0]["text"].as_str().unwrap();
        assert!(text.contains("Act as a QA engineer."));
    }

    #[tokio::test]
    async fn test_tool_call_failure_is_tool_error() {
        let dir = TempDir::new().unwrap();
        let server = server_with(
            vec![MockResponse::error(BackendError::NetworkError {
                message: "connection refused".to_string(),
            })],
            &dir,
        );
        let response = server
            .handle_line(
                r#"{"jsonrpc":"2.0","id":5,"method":"tools/call","params":{"name":"enhance_prompt","arguments":{"prompt":"fix it"}}}"#,
            )
            .await
            .unwrap();
        let result = response.result.unwrap();
        assert_eq!(result["isError"], true);
        assert!(result["content"][0]["text"]
            .as_str()
            .unwrap()
            .starts_with("❌ Error:"));
    }

    #[tokio::test]
    async fn test_missing_credential_is_tool_error() {
        let server = McpServer::from_config(&EnhancerConfig::default());
        let response = server
            .handle_line(
                r#"{"jsonrpc":"2.0","id":6,"method":"tools/call","params":{"name":"enhance_prompt","arguments":{"prompt":"fix it"}}}"#,
            )
            .await
            .unwrap();
        let result = response.result.unwrap();
        assert_eq!(result["isError"], true);
        assert!(result["content"][0]["text"]
            .as_str()
            .unwrap()
            .contains("ANTHROPIC_API_KEY"));
    }

    #[tokio::test]
    async fn test_serve_skips_notifications() {
        let dir = TempDir::new().unwrap();
        let server = server_with(vec![], &dir);
        let input = concat!(
            r#"{"jsonrpc":"2.0","id":1,"method":"initialize","params":{}}"#,
            "\n",
            r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#,
            "\n\n",
            r#"{"jsonrpc":"2.0","id":2,"method":"tools/list"}"#,
            "\n",
        );
        let mut output = Vec::new();
        server.serve(input.as_bytes(), &mut output).await.unwrap();

        let text = String::from_utf8(output).unwrap();
        let ids: Vec<Value> = text
            .lines()
            .map(|l| serde_json::from_str::<RpcResponse>(l).unwrap().id)
            .collect();
        assert_eq!(ids, vec![Value::from(1), Value::from(2)]);
    }
}
