//! # Game Master Telemetry
//!
//! Structured logging and OpenTelemetry tracing for model calls and tool
//! executions. Span attributes follow the OpenTelemetry semantic
//! conventions for generative AI.

mod spans;
mod tracer;

pub use spans::{ModelSpanAttributes, ToolSpanAttributes, model_call_span, tool_call_span};
pub use tracer::{TelemetryError, TelemetryOptions, init_telemetry, shutdown_telemetry};

/// OpenTelemetry span attribute constants
pub mod attributes {
    pub const GEN_AI_OPERATION_NAME: &str = "gen_ai.operation.name";
    pub const GEN_AI_SYSTEM: &str = "gen_ai.system";
    pub const GEN_AI_REQUEST_MODEL: &str = "gen_ai.request.model";
    pub const GEN_AI_REQUEST_TEMPERATURE: &str = "gen_ai.request.temperature";
    pub const GEN_AI_REQUEST_TOP_P: &str = "gen_ai.request.top_p";
    pub const GEN_AI_REQUEST_MAX_TOKENS: &str = "gen_ai.request.max_tokens";

    // Tool-specific attributes
    pub const GEN_AI_TOOL_NAME: &str = "gen_ai.tool.name";
    pub const GEN_AI_TOOL_CALL_ID: &str = "gen_ai.tool.call.id";

    // Game Master attributes
    pub const GM_INVOCATION_ID: &str = "gm.invocation_id";
    pub const GM_MODEL_CALL_PHASE: &str = "gm.model_call.phase";
    pub const GM_TOOL_CALL_ARGS: &str = "gm.tool_call.args";

    pub const SYSTEM_NAME: &str = "aws.bedrock";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attributes_constants() {
        assert_eq!(attributes::GEN_AI_OPERATION_NAME, "gen_ai.operation.name");
        assert_eq!(attributes::GEN_AI_TOOL_NAME, "gen_ai.tool.name");
        assert_eq!(attributes::SYSTEM_NAME, "aws.bedrock");
    }
}
