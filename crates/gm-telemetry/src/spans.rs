//! Span creation helpers for model calls and tool executions

use crate::attributes::*;
use tracing::Span;

/// Attributes for tracing a model call
#[derive(Debug, Clone)]
pub struct ModelSpanAttributes {
    pub model: String,
    pub invocation_id: String,
    /// "initial" or "follow_up"
    pub phase: &'static str,
    pub temperature: f64,
    pub top_p: f64,
    pub max_tokens: i64,
    pub tool_count: usize,
}

/// Attributes for tracing a tool call
#[derive(Debug, Clone)]
pub struct ToolSpanAttributes {
    pub tool_name: String,
    pub tool_call_id: String,
    pub invocation_id: String,
    pub args_json: String,
}

/// Creates the span a model call runs inside.
///
/// Callers attach it with `tracing::Instrument` so the HTTP request and any
/// logging done while waiting on the model land under it.
pub fn model_call_span(attrs: &ModelSpanAttributes) -> Span {
    tracing::info_span!(
        "call_model",
        { GEN_AI_OPERATION_NAME } = "chat",
        { GEN_AI_SYSTEM } = SYSTEM_NAME,
        { GEN_AI_REQUEST_MODEL } = %attrs.model,
        { GEN_AI_REQUEST_TEMPERATURE } = attrs.temperature,
        { GEN_AI_REQUEST_TOP_P } = attrs.top_p,
        { GEN_AI_REQUEST_MAX_TOKENS } = attrs.max_tokens,
        { GM_INVOCATION_ID } = %attrs.invocation_id,
        { GM_MODEL_CALL_PHASE } = attrs.phase,
        tool_count = attrs.tool_count,
    )
}

/// Creates the span a tool execution runs inside.
pub fn tool_call_span(attrs: &ToolSpanAttributes) -> Span {
    tracing::info_span!(
        "execute_tool",
        { GEN_AI_OPERATION_NAME } = "execute_tool",
        { GEN_AI_TOOL_NAME } = %attrs.tool_name,
        { GEN_AI_TOOL_CALL_ID } = %attrs.tool_call_id,
        { GM_INVOCATION_ID } = %attrs.invocation_id,
        { GM_TOOL_CALL_ARGS } = %attrs.args_json,
    )
}
