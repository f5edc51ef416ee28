//! Rules and lore lookup
//!
//! The lookup is delegated to a language model with its own system prompt.
//! The delegate is asked a single question and must answer in text.

use crate::function_tool::required_str;
use crate::{FunctionTool, ToolSchema};
use gm_core::{Error, ModelClient, ModelRequest, ModelResponse, Result, ToolResponse};
use serde_json::json;
use std::sync::Arc;

pub const LORE_TOOL_NAME: &str = "retrieveLore";

pub const LORE_SYSTEM_PROMPT: &str = "You are a loremaster for a fantasy tabletop \
    role-playing game. Answer questions about rules, monsters, spells, places and \
    history briefly and accurately. If something is not established lore, say so.";

/// Creates the lore lookup tool.
///
/// Without a delegate the tool is still advertised, but every call fails
/// with a clear message so the failure is folded into the turn.
pub fn create_lore_tool(delegate: Option<Arc<dyn ModelClient>>) -> Result<FunctionTool> {
    let schema = ToolSchema::new()
        .property(
            "query",
            "string",
            "The rules question or piece of lore to look up",
        )
        .required("query")
        .build();

    FunctionTool::builder()
        .name(LORE_TOOL_NAME)
        .description(
            "Looks up game rules, monsters, spells and world lore. \
             Use it when you need facts rather than narration.",
        )
        .schema(schema)
        .execute(move |ctx, params| {
            let delegate = delegate.clone();
            async move {
                let query = required_str(&params, "query")?.to_string();
                let delegate = delegate.ok_or_else(|| {
                    Error::ModelUnavailable("lore delegate not configured".to_string())
                })?;

                tracing::debug!(
                    invocation_id = %ctx.invocation_id(),
                    delegate = %delegate.name(),
                    "Looking up lore"
                );

                match delegate
                    .invoke(ModelRequest::single_turn(LORE_SYSTEM_PROMPT, query.clone()))
                    .await?
                {
                    ModelResponse::Text(answer) => Ok(ToolResponse {
                        result: json!({ "query": query, "answer": answer }),
                    }),
                    ModelResponse::ToolCalls(_) => Err(Error::ModelResponseFormat(
                        "lore delegate asked for tools instead of answering".to_string(),
                    )),
                }
            }
        })
        .build()
}
