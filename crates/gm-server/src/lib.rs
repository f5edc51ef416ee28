//! HTTP surfaces for the Game Master
//!
//! - `chat_router`: the chat bridge (`POST /converse`, `GET /health`)
//! - `tool_host_router`: the authenticated tool host (`POST /tools`,
//!   `GET /health`)

pub mod chat;
pub mod error;
pub mod tool_host;
pub mod types;

pub use chat::{ChatState, chat_router};
pub use error::AppError;
pub use tool_host::{ToolHostState, tool_host_router};
pub use types::*;

use anyhow::Context;
use axum::Router;

/// Binds `addr` and serves `app` until Ctrl+C
pub async fn serve(app: Router, addr: &str) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    tracing::info!(addr = %addr, "Listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::info!("Shutting down");
            }
        })
        .await
        .context("Server failed")?;

    Ok(())
}
