//! Tool host
//!
//! Serves the tool registry over `POST /tools` to authenticated callers.
//! Every tool route requires `Authorization: Bearer <token>`; `/health`
//! does not.

use crate::error::AppError;
use crate::types::ToolHostHealth;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Json, Request, State};
use axum::http::header::AUTHORIZATION;
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::Router;
use gm_tool::remote::{CallToolResponse, ListToolsResponse};
use gm_tool::{ToolHostRequest, ToolRegistry};
use std::sync::Arc;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

#[derive(Clone)]
pub struct ToolHostState {
    pub registry: Arc<ToolRegistry>,
    token: Arc<str>,
}

impl ToolHostState {
    pub fn new(registry: Arc<ToolRegistry>, token: impl Into<String>) -> Self {
        Self {
            registry,
            token: Arc::from(token.into()),
        }
    }
}

pub fn tool_host_router(state: ToolHostState) -> Router {
    Router::new()
        .route("/tools", post(handle_tools))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_bearer))
        .route("/health", get(health_check))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .with_state(state)
}

/// Byte comparison that does not stop at the first mismatch
fn tokens_match(given: &str, expected: &str) -> bool {
    given.len() == expected.len()
        && given
            .bytes()
            .zip(expected.bytes())
            .fold(0u8, |acc, (a, b)| acc | (a ^ b))
            == 0
}

async fn require_bearer(
    State(state): State<ToolHostState>,
    request: Request,
    next: Next,
) -> Response {
    let presented = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "));

    match presented {
        Some(token) if tokens_match(token.trim(), &state.token) => next.run(request).await,
        Some(_) => {
            tracing::warn!("Rejected tool host request with invalid token");
            AppError::unauthorized("invalid bearer token").into_response()
        }
        None => AppError::unauthorized("missing bearer token").into_response(),
    }
}

async fn health_check(State(state): State<ToolHostState>) -> Json<ToolHostHealth> {
    Json(ToolHostHealth {
        status: "ok".to_string(),
        tools: state.registry.len(),
    })
}

async fn handle_tools(
    State(state): State<ToolHostState>,
    payload: Result<Json<ToolHostRequest>, JsonRejection>,
) -> Result<Response, AppError> {
    let Json(request) = payload?;

    match request {
        ToolHostRequest::CallTool { name, arguments } => {
            tracing::info!(tool = %name, "Tool host call");
            let result = state.registry.invoke(&name, arguments).await?;
            Ok(Json(CallToolResponse { result }).into_response())
        }
        ToolHostRequest::ListTools => Ok(Json(ListToolsResponse {
            tools: state.registry.describe_all(),
        })
        .into_response()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::StatusCode;
    use gm_tool::builtin::game_master_tools;
    use gm_tool::InMemoryCharacterStore;
    use http_body_util::BodyExt;
    use serde_json::{Value, json};
    use tower::ServiceExt;

    const TOKEN: &str = "host-secret";

    fn app() -> Router {
        let mut registry = ToolRegistry::new();
        registry
            .register_all(game_master_tools(Arc::new(InMemoryCharacterStore::new()), None).unwrap())
            .unwrap();
        tool_host_router(ToolHostState::new(Arc::new(registry), TOKEN))
    }

    async fn post_tools(app: Router, token: Option<&str>, body: Value) -> (StatusCode, Value) {
        let mut builder = axum::http::Request::builder()
            .method("POST")
            .uri("/tools")
            .header("content-type", "application/json");
        if let Some(token) = token {
            builder = builder.header("authorization", format!("Bearer {}", token));
        }
        let response = app
            .oneshot(builder.body(Body::from(body.to_string())).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
    }

    #[test]
    fn test_tokens_match() {
        assert!(tokens_match("abc", "abc"));
        assert!(!tokens_match("abd", "abc"));
        assert!(!tokens_match("ab", "abc"));
    }

    #[tokio::test]
    async fn test_requires_bearer_token() {
        let request = json!({"action": "listTools"});

        let (status, body) = post_tools(app(), None, request.clone()).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"], "missing bearer token");

        let (status, _) = post_tools(app(), Some("wrong"), request).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_list_tools() {
        let (status, body) = post_tools(app(), Some(TOKEN), json!({"action": "listTools"})).await;
        assert_eq!(status, StatusCode::OK);

        let tools = body["tools"].as_array().unwrap();
        assert_eq!(tools[0]["name"], "diceRoll");
        assert_eq!(tools[0]["input_schema"]["type"], "object");
    }

    #[tokio::test]
    async fn test_call_dice_tool() {
        let (status, body) = post_tools(
            app(),
            Some(TOKEN),
            json!({"action": "callTool", "name": "diceRoll", "arguments": {"dice_type": "d6", "num_dice": 2}}),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["result"]["results"].as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_call_errors() {
        let (status, body) = post_tools(
            app(),
            Some(TOKEN),
            json!({"action": "callTool", "name": "castSpell", "arguments": {}}),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "Unknown tool: castSpell");

        let (status, body) = post_tools(
            app(),
            Some(TOKEN),
            json!({"action": "callTool", "name": "diceRoll", "arguments": {"dice_type": "d3"}}),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(body["error"].as_str().unwrap().contains("d3"));

        let (status, _) = post_tools(app(), Some(TOKEN), json!({"action": "dance"})).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_health_is_public() {
        let response = app()
            .oneshot(
                axum::http::Request::builder()
                    .uri("/health")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
