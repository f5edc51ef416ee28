use crate::{FunctionTool, ToolSchema};
use chrono::Utc;
use gm_core::{Result, ToolResponse};
use serde_json::json;

pub const TIME_TOOL_NAME: &str = "getTime";

/// Creates a tool that reports the current UTC time
pub fn create_time_tool() -> Result<FunctionTool> {
    FunctionTool::builder()
        .name(TIME_TOOL_NAME)
        .description("Returns the current date and time in UTC.")
        .schema(ToolSchema::new().build())
        .execute(|_ctx, _params| async move {
            let now = Utc::now();
            Ok(ToolResponse {
                result: json!({
                    "time": now.format("%Y-%m-%d %H:%M:%S").to_string(),
                    "timezone": "UTC",
                }),
            })
        })
        .build()
}
