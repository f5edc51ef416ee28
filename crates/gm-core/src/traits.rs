use super::{ModelRequest, ModelResponse, Result, ToolDescriptor};
use async_trait::async_trait;
use std::sync::Arc;

/// Tool trait - abstraction for callable tools
#[async_trait]
pub trait Tool: Send + Sync {
    /// Returns the name of the tool
    fn name(&self) -> &str;

    /// Returns a description of what the tool does
    fn description(&self) -> &str;

    /// Returns the JSON schema for the tool's parameters
    fn schema(&self) -> serde_json::Value;

    /// Descriptor advertised to the model
    fn descriptor(&self) -> ToolDescriptor {
        ToolDescriptor::new(self.name(), self.description(), self.schema())
    }

    /// Executes the tool with given parameters
    async fn execute(
        &self,
        ctx: Arc<dyn ToolContext>,
        params: serde_json::Value,
    ) -> Result<ToolResponse>;
}

/// Tool context provided during tool execution
pub trait ToolContext: Send + Sync {
    fn function_call_id(&self) -> &str;
    fn invocation_id(&self) -> &str;
}

/// Tool execution response
#[derive(Debug, Clone)]
pub struct ToolResponse {
    pub result: serde_json::Value,
}

/// Client for a language model endpoint.
///
/// Implementations are constructed explicitly and handed to whoever needs
/// them; there is no process-wide client.
#[async_trait]
pub trait ModelClient: Send + Sync {
    /// Returns the model identifier
    fn name(&self) -> &str;

    /// True when this client produces canned, clearly labelled replies
    /// instead of calling a real model.
    fn is_degraded(&self) -> bool {
        false
    }

    /// Sends one request and parses the reply
    async fn invoke(&self, request: ModelRequest) -> Result<ModelResponse>;
}
