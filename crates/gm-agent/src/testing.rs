//! Shared test doubles for the orchestration loop
//!
//! Used by this crate's unit tests and by the workspace integration tests.

use async_trait::async_trait;
use gm_core::{
    Error, ModelClient, ModelRequest, ModelResponse, Result, Tool, ToolContext,
    ToolInvocationRequest, ToolResponse,
};
use serde_json::{Value, json};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

/// Model that replays queued responses and records every request.
///
/// Once the script runs out every call fails with `ModelUnavailable`.
#[derive(Default)]
pub struct ScriptedModel {
    script: Mutex<VecDeque<Result<ModelResponse>>>,
    requests: Mutex<Vec<ModelRequest>>,
}

impl ScriptedModel {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(self, response: Result<ModelResponse>) -> Self {
        if let Ok(mut script) = self.script.lock() {
            script.push_back(response);
        }
        self
    }

    pub fn then_text(self, text: impl Into<String>) -> Self {
        self.push(Ok(ModelResponse::Text(text.into())))
    }

    pub fn then_tool_calls(self, calls: Vec<ToolInvocationRequest>) -> Self {
        self.push(Ok(ModelResponse::ToolCalls(calls)))
    }

    pub fn then_error(self, error: Error) -> Self {
        self.push(Err(error))
    }

    /// Every request received so far, oldest first
    pub fn requests(&self) -> Vec<ModelRequest> {
        self.requests
            .lock()
            .map(|requests| requests.clone())
            .unwrap_or_default()
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().map(|r| r.len()).unwrap_or_default()
    }
}

#[async_trait]
impl ModelClient for ScriptedModel {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn invoke(&self, request: ModelRequest) -> Result<ModelResponse> {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(request);
        }
        self.script
            .lock()
            .ok()
            .and_then(|mut script| script.pop_front())
            .unwrap_or_else(|| Err(Error::ModelUnavailable("script exhausted".to_string())))
    }
}

/// Tool that records the arguments of every call
pub struct RecordingTool {
    name: String,
    failure: Option<String>,
    calls: Mutex<Vec<Value>>,
}

impl RecordingTool {
    /// Succeeds with `{"ok": true, "call": <n>}`
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            failure: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Fails every call with `message`
    pub fn failing(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            failure: Some(message.into()),
            ..Self::new(name)
        }
    }

    pub fn calls(&self) -> Vec<Value> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().map(|c| c.len()).unwrap_or_default()
    }
}

#[async_trait]
impl Tool for RecordingTool {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        "Records its arguments"
    }

    fn schema(&self) -> Value {
        json!({"type": "object", "properties": {}, "required": []})
    }

    async fn execute(&self, _ctx: Arc<dyn ToolContext>, params: Value) -> Result<ToolResponse> {
        let count = match self.calls.lock() {
            Ok(mut calls) => {
                calls.push(params);
                calls.len()
            }
            Err(_) => 0,
        };

        match &self.failure {
            Some(message) => Err(Error::InvalidInput(message.clone())),
            None => Ok(ToolResponse {
                result: json!({"ok": true, "call": count}),
            }),
        }
    }
}
