//! Amazon Bedrock runtime client

use crate::types::{BedrockSettings, build_payload, parse_response};
use async_trait::async_trait;
use gm_core::{Error, ModelClient, ModelConfig, ModelRequest, ModelResponse, Result};
use reqwest::Client;
use tracing::{debug, warn};

/// Bedrock client authenticated with a bearer API key
pub struct BedrockModel {
    settings: BedrockSettings,
    token: String,
    client: Client,
}

impl BedrockModel {
    /// Resolves credentials from the configured chain and builds the client.
    ///
    /// # Errors
    ///
    /// `Error::Credentials` listing every source that was tried, or
    /// `Error::Config` when the HTTP client cannot be built.
    pub fn connect(config: &ModelConfig) -> Result<Self> {
        let credential = config.credentials().resolve()?;
        debug!(
            model = %config.model_id,
            source = %credential.source,
            "Resolved Bedrock credentials"
        );
        Self::new(BedrockSettings::from_config(config), credential.token)
    }

    pub fn new(settings: BedrockSettings, token: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(settings.timeout)
            .build()
            .map_err(|e| Error::config_error(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            settings,
            token: token.into(),
            client,
        })
    }

    pub fn settings(&self) -> &BedrockSettings {
        &self.settings
    }
}

impl std::fmt::Debug for BedrockModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BedrockModel")
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl ModelClient for BedrockModel {
    fn name(&self) -> &str {
        &self.settings.model_id
    }

    async fn invoke(&self, request: ModelRequest) -> Result<ModelResponse> {
        let url = self.settings.invoke_url();
        let payload = build_payload(&request);
        debug!(
            url = %url,
            tools = request.tools.len(),
            turns = payload.messages.len(),
            "Invoking model"
        );

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.token)
            .header("Accept", "application/json")
            .json(&payload)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    Error::ModelUnavailable(format!(
                        "request timed out after {:?}",
                        self.settings.timeout
                    ))
                } else {
                    Error::ModelUnavailable(format!("request failed: {}", e))
                }
            })?;

        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|e| Error::ModelUnavailable(format!("failed to read response: {}", e)))?;

        if !status.is_success() {
            let message = String::from_utf8_lossy(&body).to_string();
            warn!(status = %status, error = %message, "Model call failed");
            return match status.as_u16() {
                401 | 403 => Err(Error::upstream_auth(status.as_u16(), message)),
                code => Err(Error::ModelUnavailable(format!(
                    "Bedrock returned {}: {}",
                    code, message
                ))),
            };
        }

        parse_response(&body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::time::Duration;

    fn model(endpoint: String) -> BedrockModel {
        BedrockModel::new(
            BedrockSettings {
                endpoint,
                model_id: "anthropic.claude-3-haiku".to_string(),
                timeout: Duration::from_secs(5),
            },
            "test-key",
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_invoke_text_response() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/model/anthropic.claude-3-haiku/invoke")
            .match_header("authorization", "Bearer test-key")
            .match_body(mockito::Matcher::PartialJson(json!({
                "anthropic_version": "bedrock-2023-05-31",
                "system": "You are the GM."
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"content": [{"type": "text", "text": "You roll well."}]}"#)
            .create_async()
            .await;

        let reply = model(server.url())
            .invoke(ModelRequest::single_turn("You are the GM.", "roll 2d6"))
            .await
            .unwrap();

        assert_eq!(reply, ModelResponse::Text("You roll well.".to_string()));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_auth_failure_maps_to_upstream_auth() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/model/anthropic.claude-3-haiku/invoke")
            .with_status(403)
            .with_body(r#"{"message": "The security token included in the request is invalid"}"#)
            .create_async()
            .await;

        let err = model(server.url())
            .invoke(ModelRequest::single_turn("sys", "hi"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::UpstreamAuth { status: 403, .. }));
    }

    #[tokio::test]
    async fn test_server_error_maps_to_unavailable() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/model/anthropic.claude-3-haiku/invoke")
            .with_status(503)
            .with_body("throttled")
            .create_async()
            .await;

        let err = model(server.url())
            .invoke(ModelRequest::single_turn("sys", "hi"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::ModelUnavailable(ref m) if m.contains("503")));
    }

    #[tokio::test]
    async fn test_unparseable_body_is_format_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/model/anthropic.claude-3-haiku/invoke")
            .with_status(200)
            .with_body(r#"{"unexpected": true}"#)
            .create_async()
            .await;

        let err = model(server.url())
            .invoke(ModelRequest::single_turn("sys", "hi"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::ModelResponseFormat(_)));
    }

    #[tokio::test]
    async fn test_unreachable_endpoint() {
        let err = model("http://127.0.0.1:1".to_string())
            .invoke(ModelRequest::single_turn("sys", "hi"))
            .await
            .unwrap_err();
        assert!(err.is_model_failure());
    }

    #[test]
    fn test_connect_without_credentials() {
        let config = ModelConfig {
            api_key: None,
            api_key_file: Some("/nonexistent/gm-bedrock-key".into()),
            ..ModelConfig::default()
        };
        // The environment may carry a real key; only check the failure shape.
        if let Err(err) = BedrockModel::connect(&config) {
            assert!(matches!(err, Error::Credentials { .. }));
            assert!(err.to_string().contains("gm-bedrock-key"));
        }
    }
}
