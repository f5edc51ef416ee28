use gm_core::{ToolContext, ToolInvocationRequest};
use uuid::Uuid;

/// Per-call context handed to a tool: which turn it belongs to and which
/// tool call inside that turn.
#[derive(Debug, Clone)]
pub struct DefaultToolContext {
    function_call_id: String,
    invocation_id: String,
}

impl DefaultToolContext {
    pub fn new(function_call_id: impl Into<String>, invocation_id: impl Into<String>) -> Self {
        Self {
            function_call_id: function_call_id.into(),
            invocation_id: invocation_id.into(),
        }
    }

    /// Context for one model-requested call. The model's `tool_use` id is
    /// kept when present; the legacy completion format carries none, so a
    /// fresh id is minted.
    pub fn for_call(invocation_id: impl Into<String>, call: &ToolInvocationRequest) -> Self {
        let function_call_id = match call.id.as_deref() {
            Some(id) if !id.is_empty() => id.to_string(),
            _ => Uuid::new_v4().to_string(),
        };
        Self::new(function_call_id, invocation_id)
    }

    /// Context for a call made outside any model turn
    pub fn standalone() -> Self {
        let id = Uuid::new_v4().to_string();
        Self::new(id.clone(), id)
    }
}

impl ToolContext for DefaultToolContext {
    fn function_call_id(&self) -> &str {
        &self.function_call_id
    }

    fn invocation_id(&self) -> &str {
        &self.invocation_id
    }
}
