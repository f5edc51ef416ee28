use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConverseRequest {
    pub input: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConverseResponse {
    pub reply: String,
    /// Names of the tools that ran during the turn
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tools_used: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    /// "configured" or "degraded"; the model endpoint is not probed
    pub model: String,
    pub tools: ToolsHealth,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolsHealth {
    pub count: usize,
    /// "connected", "disconnected" or "local"
    pub remote: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolHostHealth {
    pub status: String,
    pub tools: usize,
}
