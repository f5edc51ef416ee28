//! Follow-up prompt and fallback summary

use gm_core::{ToolInvocationResult, ToolOutcome};
use std::fmt::Write;

pub const TOOL_RESULTS_HEADER: &str = "Tool results:";

const CLOSING_INSTRUCTION: &str = "Using these tool results, answer the player's request as \
the Game Master. Do not request any further tools.";

fn compact(value: &serde_json::Value) -> String {
    serde_json::to_string(value).unwrap_or_else(|_| value.to_string())
}

/// Original user text, then one line per tool call, then the instruction
/// for the second model call.
pub fn follow_up_prompt(user_text: &str, results: &[ToolInvocationResult]) -> String {
    let mut prompt = format!("{}\n\n{}\n", user_text, TOOL_RESULTS_HEADER);
    for result in results {
        let _ = writeln!(
            prompt,
            "- Tool `{}` was called with input {} and returned: {}",
            result.name,
            compact(&result.arguments),
            compact(&result.result_value())
        );
    }
    prompt.push('\n');
    prompt.push_str(CLOSING_INSTRUCTION);
    prompt
}

/// Reply used when the second model call cannot produce text.
///
/// Depends only on the collected results, so the same results always give
/// the same summary.
pub fn synthesize_summary(results: &[ToolInvocationResult]) -> String {
    let mut summary = String::from("Here is what the tools reported:");
    for result in results {
        match &result.outcome {
            ToolOutcome::Success(value) => {
                let _ = write!(summary, "\n- {}: {}", result.name, compact(value));
            }
            ToolOutcome::Failure(message) => {
                let _ = write!(summary, "\n- {} failed: {}", result.name, message);
            }
        }
    }
    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use gm_core::ToolInvocationRequest;
    use serde_json::json;

    fn results() -> Vec<ToolInvocationResult> {
        let roll = ToolInvocationRequest::new("diceRoll", json!({"notation": "1d20"}));
        let spell = ToolInvocationRequest::new("castSpell", json!({"spell": "fireball"}));
        vec![
            ToolInvocationResult::success(&roll, json!({"total": 14})),
            ToolInvocationResult::failure(&spell, "Unknown tool: castSpell"),
        ]
    }

    #[test]
    fn test_follow_up_prompt_lists_every_result() {
        let prompt = follow_up_prompt("I attack the goblin", &results());

        assert!(prompt.starts_with("I attack the goblin\n\nTool results:\n"));
        assert!(prompt.contains(
            "- Tool `diceRoll` was called with input {\"notation\":\"1d20\"} and returned: {\"total\":14}"
        ));
        assert!(prompt.contains(
            "- Tool `castSpell` was called with input {\"spell\":\"fireball\"} and returned: {\"error\":\"Unknown tool: castSpell\"}"
        ));
        assert!(prompt.ends_with(CLOSING_INSTRUCTION));
    }

    #[test]
    fn test_summary_is_deterministic() {
        let summary = synthesize_summary(&results());
        assert_eq!(
            summary,
            "Here is what the tools reported:\n- diceRoll: {\"total\":14}\n- castSpell failed: Unknown tool: castSpell"
        );
        assert_eq!(summary, synthesize_summary(&results()));
    }
}
