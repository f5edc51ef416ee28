use crate::builder::GameMasterBuilder;
use crate::prompt::{follow_up_prompt, synthesize_summary};
use gm_core::{
    Error, ModelClient, ModelRequest, ModelResponse, Result, SamplingParams,
    ToolContext, ToolInvocationRequest, ToolInvocationResult,
};
use gm_telemetry::{ModelSpanAttributes, ToolSpanAttributes, model_call_span, tool_call_span};
use gm_tool::{DefaultToolContext, ToolRegistry};
use serde::Serialize;
use std::sync::Arc;
use tracing::Instrument;

/// Outcome of one user turn
#[derive(Debug, Clone, Serialize)]
pub struct Turn {
    pub invocation_id: String,
    pub reply: String,
    /// One entry per requested tool call, in request order
    pub tool_results: Vec<ToolInvocationResult>,
    /// 1 on the text path, 2 when tools ran
    pub model_calls: usize,
    /// True when `reply` is the synthesized summary rather than model text
    pub fallback: bool,
}

/// Runs turns against a model and a shared tool registry.
///
/// Holds no per-turn state, so one instance serves concurrent requests.
pub struct GameMaster {
    pub(crate) model: Arc<dyn ModelClient>,
    pub(crate) tools: Arc<ToolRegistry>,
    pub(crate) system_prompt: String,
    pub(crate) sampling: SamplingParams,
}

impl GameMaster {
    pub fn builder() -> GameMasterBuilder {
        GameMasterBuilder::new()
    }

    pub fn model(&self) -> &Arc<dyn ModelClient> {
        &self.model
    }

    pub fn tools(&self) -> &Arc<ToolRegistry> {
        &self.tools
    }

    pub fn system_prompt(&self) -> &str {
        &self.system_prompt
    }

    /// Handles one user message.
    ///
    /// # Errors
    ///
    /// - `Error::InvalidInput` for blank input
    /// - any error of the first model call, unchanged
    /// - `Error::ModelResponseFormat` when the model asks for zero tools
    /// - `Error::UpstreamAuth` from the second model call
    ///
    /// Tool failures never fail the turn; they are folded into the results.
    pub async fn respond(&self, input: &str) -> Result<Turn> {
        let user_text = input.trim();
        if user_text.is_empty() {
            return Err(Error::InvalidInput("input must not be empty".to_string()));
        }

        let invocation_id = uuid::Uuid::new_v4().to_string();
        tracing::info!(
            invocation_id = %invocation_id,
            model = %self.model.name(),
            tools = self.tools.len(),
            "Starting turn"
        );

        let request = ModelRequest::single_turn(&self.system_prompt, user_text)
            .with_tools(self.tools.describe_all())
            .with_sampling(self.sampling);

        let calls = match self.call_model(&invocation_id, "initial", request).await? {
            ModelResponse::Text(reply) => {
                tracing::info!(invocation_id = %invocation_id, "Turn completed without tools");
                return Ok(Turn {
                    invocation_id,
                    reply,
                    tool_results: Vec::new(),
                    model_calls: 1,
                    fallback: false,
                });
            }
            ModelResponse::ToolCalls(calls) => calls,
        };

        if calls.is_empty() {
            return Err(Error::ModelResponseFormat(
                "model requested tool use without any tool calls".to_string(),
            ));
        }

        let tool_results = self.execute_tools(&invocation_id, &calls).await;

        let follow_up = ModelRequest::single_turn(
            &self.system_prompt,
            follow_up_prompt(user_text, &tool_results),
        )
        .with_sampling(self.sampling);

        let (reply, fallback) = match self.call_model(&invocation_id, "follow_up", follow_up).await {
            Ok(ModelResponse::Text(reply)) => (reply, false),
            Ok(ModelResponse::ToolCalls(nested)) => {
                tracing::warn!(
                    invocation_id = %invocation_id,
                    requested = nested.len(),
                    "Model asked for more tools after results; using summary"
                );
                (synthesize_summary(&tool_results), true)
            }
            // The tools have already run; their results must reach the caller.
            Err(e) => {
                tracing::warn!(
                    invocation_id = %invocation_id,
                    error = %e,
                    "Follow-up model call failed; using summary"
                );
                (synthesize_summary(&tool_results), true)
            }
        };

        tracing::info!(
            invocation_id = %invocation_id,
            tool_calls = tool_results.len(),
            fallback,
            "Turn completed"
        );

        Ok(Turn {
            invocation_id,
            reply,
            tool_results,
            model_calls: 2,
            fallback,
        })
    }

    async fn call_model(
        &self,
        invocation_id: &str,
        phase: &'static str,
        request: ModelRequest,
    ) -> Result<ModelResponse> {
        let span = model_call_span(&ModelSpanAttributes {
            model: self.model.name().to_string(),
            invocation_id: invocation_id.to_string(),
            phase,
            temperature: f64::from(request.sampling.temperature),
            top_p: f64::from(request.sampling.top_p),
            max_tokens: i64::from(request.sampling.max_tokens),
            tool_count: request.tools.len(),
        });

        let result = self.model.invoke(request).instrument(span).await;
        if let Err(ref e) = result {
            tracing::error!(
                invocation_id = %invocation_id,
                phase,
                error = %e,
                "Model call failed"
            );
        }
        result
    }

    /// Runs every requested tool in order; failures become error results
    async fn execute_tools(
        &self,
        invocation_id: &str,
        calls: &[ToolInvocationRequest],
    ) -> Vec<ToolInvocationResult> {
        let mut results = Vec::with_capacity(calls.len());

        for call in calls {
            let ctx = Arc::new(DefaultToolContext::for_call(invocation_id, call));
            let args_json = serde_json::to_string(&call.arguments).unwrap_or_default();

            let span = tool_call_span(&ToolSpanAttributes {
                tool_name: call.name.clone(),
                tool_call_id: ctx.function_call_id().to_string(),
                invocation_id: invocation_id.to_string(),
                args_json: args_json.clone(),
            });

            let result = match self
                .tools
                .invoke_with(ctx, &call.name, call.arguments.clone())
                .instrument(span)
                .await
            {
                Ok(value) => {
                    tracing::info!(
                        invocation_id = %invocation_id,
                        tool_name = %call.name,
                        input = %args_json,
                        result = %value,
                        "Tool executed"
                    );
                    ToolInvocationResult::success(call, value)
                }
                Err(e) => {
                    tracing::warn!(
                        invocation_id = %invocation_id,
                        tool_name = %call.name,
                        input = %args_json,
                        error = %e,
                        "Tool failed"
                    );
                    ToolInvocationResult::failure(call, e.to_string())
                }
            };
            results.push(result);
        }

        results
    }
}

impl std::fmt::Debug for GameMaster {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GameMaster")
            .field("model", &self.model.name())
            .field("tools", &self.tools)
            .field("sampling", &self.sampling)
            .finish()
    }
}
