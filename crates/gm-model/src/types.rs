//! Bedrock Anthropic-messages wire types

use gm_core::{
    ConversationTurn, Error, ModelConfig, ModelRequest, ModelResponse, Result, Role,
    ToolDescriptor, ToolInvocationRequest,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;

pub const ANTHROPIC_VERSION: &str = "bedrock-2023-05-31";

/// Connection settings for one Bedrock model
#[derive(Debug, Clone)]
pub struct BedrockSettings {
    pub endpoint: String,
    pub model_id: String,
    pub timeout: Duration,
}

impl BedrockSettings {
    pub fn from_config(config: &ModelConfig) -> Self {
        Self {
            endpoint: config.endpoint_url().trim_end_matches('/').to_string(),
            model_id: config.model_id.clone(),
            timeout: Duration::from_secs(config.timeout_secs),
        }
    }

    pub fn invoke_url(&self) -> String {
        format!("{}/model/{}/invoke", self.endpoint, self.model_id)
    }
}

/// Body of `POST /model/{model_id}/invoke`
#[derive(Debug, Clone, Serialize)]
pub struct InvokeRequest<'a> {
    pub anthropic_version: &'static str,
    pub max_tokens: u32,
    pub temperature: f32,
    pub top_p: f32,
    #[serde(skip_serializing_if = "is_blank")]
    pub system: &'a str,
    pub messages: Vec<&'a ConversationTurn>,
    #[serde(skip_serializing_if = "no_tools")]
    pub tools: &'a [ToolDescriptor],
}

fn is_blank(system: &&str) -> bool {
    system.is_empty()
}

fn no_tools(tools: &&[ToolDescriptor]) -> bool {
    tools.is_empty()
}

/// Builds the invoke payload; system turns travel in `system`, not `messages`
pub fn build_payload(request: &ModelRequest) -> InvokeRequest<'_> {
    InvokeRequest {
        anthropic_version: ANTHROPIC_VERSION,
        max_tokens: request.sampling.max_tokens,
        temperature: request.sampling.temperature,
        top_p: request.sampling.top_p,
        system: &request.system,
        messages: request
            .turns
            .iter()
            .filter(|turn| turn.role != Role::System)
            .collect(),
        tools: &request.tools,
    }
}

/// Both response shapes the runtime may return
#[derive(Debug, Clone, Default, Deserialize)]
pub struct InvokeResponse {
    /// Messages format: a list of typed content blocks
    #[serde(default)]
    pub content: Option<Vec<Value>>,
    /// Legacy text-completions format
    #[serde(default)]
    pub completion: Option<String>,
    #[serde(default)]
    pub stop_reason: Option<String>,
}

fn tool_call_from_block(block: &Value) -> Result<ToolInvocationRequest> {
    let name = block["name"]
        .as_str()
        .filter(|n| !n.is_empty())
        .ok_or_else(|| Error::ModelResponseFormat("tool_use block without a name".to_string()))?;

    Ok(ToolInvocationRequest {
        id: block["id"].as_str().map(String::from),
        name: name.to_string(),
        arguments: match &block["input"] {
            Value::Null => Value::Object(Default::default()),
            input => input.clone(),
        },
    })
}

/// Interprets a response body.
///
/// The content-array format is tried first: every `tool_use` block becomes
/// a tool call, in order, and tool calls win over any text. Without tool
/// calls the text blocks are concatenated. The legacy `completion` string
/// is tried next. Anything else is a format error.
pub fn parse_response(body: &[u8]) -> Result<ModelResponse> {
    let response: InvokeResponse = serde_json::from_slice(body)
        .map_err(|e| Error::ModelResponseFormat(format!("response is not valid JSON: {}", e)))?;

    if let Some(blocks) = &response.content {
        let mut calls = Vec::new();
        let mut text = Vec::new();
        for block in blocks {
            match block["type"].as_str() {
                Some("tool_use") => calls.push(tool_call_from_block(block)?),
                Some("text") => {
                    if let Some(t) = block["text"].as_str() {
                        text.push(t);
                    }
                }
                _ => {}
            }
        }

        if !calls.is_empty() {
            return Ok(ModelResponse::ToolCalls(calls));
        }
        if !text.is_empty() {
            return Ok(ModelResponse::Text(text.concat()));
        }
    }

    if let Some(completion) = response.completion {
        return Ok(ModelResponse::Text(completion));
    }

    Err(Error::ModelResponseFormat(format!(
        "no content or completion in response (stop_reason: {})",
        response.stop_reason.as_deref().unwrap_or("none")
    )))
}
