//! Chat bridge
//!
//! Accepts a user message, runs one Game Master turn and returns the reply.

use crate::error::AppError;
use crate::types::{ConverseRequest, ConverseResponse, HealthResponse, ToolsHealth};
use axum::extract::rejection::JsonRejection;
use axum::extract::{Json, State};
use axum::routing::{get, post};
use axum::Router;
use gm_agent::GameMaster;
use gm_tool::RemoteToolClient;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

#[derive(Clone)]
pub struct ChatState {
    pub game_master: Arc<GameMaster>,
    /// Set when tools are proxied to a tool host
    pub remote: Option<Arc<RemoteToolClient>>,
}

impl ChatState {
    pub fn new(game_master: Arc<GameMaster>) -> Self {
        Self {
            game_master,
            remote: None,
        }
    }

    pub fn with_remote(mut self, remote: Arc<RemoteToolClient>) -> Self {
        self.remote = Some(remote);
        self
    }
}

pub fn chat_router(state: ChatState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/converse", post(converse))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn health_check(State(state): State<ChatState>) -> Json<HealthResponse> {
    let model = if state.game_master.model().is_degraded() {
        "degraded"
    } else {
        "configured"
    };

    let remote = match &state.remote {
        Some(client) if client.ping().await => "connected",
        Some(_) => "disconnected",
        None => "local",
    };

    Json(HealthResponse {
        status: "ok".to_string(),
        model: model.to_string(),
        tools: ToolsHealth {
            count: state.game_master.tools().len(),
            remote: remote.to_string(),
        },
    })
}

async fn converse(
    State(state): State<ChatState>,
    payload: Result<Json<ConverseRequest>, JsonRejection>,
) -> Result<Json<ConverseResponse>, AppError> {
    let Json(request) = payload?;
    let turn = state.game_master.respond(&request.input).await?;

    Ok(Json(ConverseResponse {
        reply: turn.reply,
        tools_used: turn.tool_results.into_iter().map(|r| r.name).collect(),
    }))
}
