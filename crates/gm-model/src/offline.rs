//! Degraded-mode model
//!
//! Used only when `model.degraded_mode` is set. Replies are canned and always
//! carry the `[degraded mode]` label so they are never mistaken for real
//! model output.

use async_trait::async_trait;
use gm_core::{ModelClient, ModelRequest, ModelResponse, Result, ToolInvocationRequest};
use serde_json::json;

pub const DEGRADED_PREFIX: &str = "[degraded mode]";

const DICE_TOOL: &str = "diceRoll";
const RESULTS_MARKER: &str = "Tool results:";

#[derive(Debug, Clone, Default)]
pub struct OfflineModel;

impl OfflineModel {
    pub fn new() -> Self {
        Self
    }
}

/// Finds the first `NdM` style token in free text
fn find_dice_notation(text: &str) -> Option<String> {
    text.split(|c: char| c.is_whitespace() || ",.;:!?()".contains(c))
        .map(|word| word.to_lowercase())
        .find(|word| {
            let Some((count, sides)) = word.split_once('d') else {
                return false;
            };
            let sides = sides.split(['+', '-']).next().unwrap_or("");
            count.chars().all(|c| c.is_ascii_digit())
                && !sides.is_empty()
                && sides.chars().all(|c| c.is_ascii_digit())
        })
}

#[async_trait]
impl ModelClient for OfflineModel {
    fn name(&self) -> &str {
        "offline"
    }

    fn is_degraded(&self) -> bool {
        true
    }

    async fn invoke(&self, request: ModelRequest) -> Result<ModelResponse> {
        let text = request.last_user_text().unwrap_or_default();

        if let Some((_, results)) = text.split_once(RESULTS_MARKER) {
            return Ok(ModelResponse::Text(format!(
                "{} The tools reported:\n{}",
                DEGRADED_PREFIX,
                results.trim()
            )));
        }

        if request.offers_tool(DICE_TOOL) {
            if let Some(notation) = find_dice_notation(&text) {
                return Ok(ModelResponse::ToolCalls(vec![ToolInvocationRequest::new(
                    DICE_TOOL,
                    json!({ "notation": notation }),
                )]));
            }
        }

        Ok(ModelResponse::Text(format!(
            "{} The Game Master is resting; the model is not connected. You said: {}",
            DEGRADED_PREFIX,
            text.trim()
        )))
    }
}
