//! Remote tool proxy
//!
//! Tools served by a separate tool host are reached over one authenticated
//! JSON endpoint. The envelope is shared with the host side in `gm-server`.

use async_trait::async_trait;
use gm_core::{Error, Result, Tool, ToolContext, ToolDescriptor, ToolResponse};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, instrument, warn};

/// Request envelope accepted by `POST /tools`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum ToolHostRequest {
    CallTool {
        name: String,
        #[serde(default)]
        arguments: Value,
    },
    ListTools,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CallToolResponse {
    pub result: Value,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListToolsResponse {
    pub tools: Vec<ToolDescriptor>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolHostError {
    pub error: String,
}

/// HTTP client for a tool host
#[derive(Debug, Clone)]
pub struct RemoteToolClient {
    url: String,
    token: Option<String>,
    client: reqwest::Client,
}

impl RemoteToolClient {
    /// `base_url` is the host root; requests go to `{base_url}/tools`
    pub fn new(base_url: impl Into<String>, token: Option<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::config_error(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            url: base_url.into().trim_end_matches('/').to_string(),
            token,
            client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.url
    }

    async fn post(&self, label: &str, request: &ToolHostRequest) -> Result<reqwest::Response> {
        let mut builder = self.client.post(format!("{}/tools", self.url)).json(request);
        if let Some(token) = &self.token {
            builder = builder.bearer_auth(token);
        }

        let response = builder.send().await.map_err(|e| {
            let reason = if e.is_timeout() {
                "tool host timed out".to_string()
            } else {
                format!("tool host unreachable: {}", e)
            };
            Error::tool_failed(label, anyhow::anyhow!(reason))
        })?;

        let status = response.status();
        debug!(status = %status, tool = %label, "Tool host responded");
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ToolHostError>(&body)
            .map(|e| e.error)
            .unwrap_or(body);

        match status.as_u16() {
            401 | 403 => Err(Error::upstream_auth(status.as_u16(), message)),
            404 => Err(Error::UnknownTool(label.to_string())),
            code => {
                warn!(status = code, tool = %label, error = %message, "Tool host call failed");
                Err(Error::tool_failed(
                    label,
                    anyhow::anyhow!("tool host returned {}: {}", code, message),
                ))
            }
        }
    }

    /// Calls one tool on the host and returns its result value
    #[instrument(skip(self, arguments), fields(url = %self.url))]
    pub async fn call_tool(&self, name: &str, arguments: Value) -> Result<Value> {
        let request = ToolHostRequest::CallTool {
            name: name.to_string(),
            arguments,
        };
        let response = self.post(name, &request).await?;
        let body: CallToolResponse = response.json().await.map_err(|e| {
            Error::tool_failed(name, anyhow::anyhow!("invalid tool host response: {}", e))
        })?;
        Ok(body.result)
    }

    pub async fn list_tools(&self) -> Result<Vec<ToolDescriptor>> {
        let response = self.post("listTools", &ToolHostRequest::ListTools).await?;
        let body: ListToolsResponse = response.json().await.map_err(|e| {
            Error::tool_failed("listTools", anyhow::anyhow!("invalid tool host response: {}", e))
        })?;
        Ok(body.tools)
    }

    /// Lists the host's tools and wraps each one for local registration
    pub async fn discover(self: &Arc<Self>) -> Result<Vec<Arc<dyn Tool>>> {
        let tools = self.list_tools().await?;
        debug!(count = tools.len(), url = %self.url, "Discovered remote tools");
        Ok(tools
            .into_iter()
            .map(|descriptor| {
                Arc::new(RemoteTool {
                    descriptor,
                    client: Arc::clone(self),
                }) as Arc<dyn Tool>
            })
            .collect())
    }

    /// True when the host answers its health endpoint
    pub async fn ping(&self) -> bool {
        match self.client.get(format!("{}/health", self.url)).send().await {
            Ok(response) => response.status().is_success(),
            Err(_) => false,
        }
    }
}

/// A tool whose handler lives on the tool host
#[derive(Debug, Clone)]
pub struct RemoteTool {
    descriptor: ToolDescriptor,
    client: Arc<RemoteToolClient>,
}

impl RemoteTool {
    pub fn new(descriptor: ToolDescriptor, client: Arc<RemoteToolClient>) -> Self {
        Self { descriptor, client }
    }
}

#[async_trait]
impl Tool for RemoteTool {
    fn name(&self) -> &str {
        &self.descriptor.name
    }

    fn description(&self) -> &str {
        &self.descriptor.description
    }

    fn schema(&self) -> Value {
        self.descriptor.input_schema.clone()
    }

    fn descriptor(&self) -> ToolDescriptor {
        self.descriptor.clone()
    }

    async fn execute(&self, ctx: Arc<dyn ToolContext>, params: Value) -> Result<ToolResponse> {
        debug!(
            invocation_id = %ctx.invocation_id(),
            tool = %self.descriptor.name,
            "Proxying tool call"
        );
        let result = self.client.call_tool(&self.descriptor.name, params).await?;
        Ok(ToolResponse { result })
    }
}
