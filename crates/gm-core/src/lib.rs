//! Core traits and types for the Game Master
//!
//! This crate provides the shared vocabulary used by every other crate:
//! conversation turns, tool descriptors and invocations, model responses,
//! the `Tool` and `ModelClient` seams, the error taxonomy, configuration
//! and credential resolution.

pub mod auth;
pub mod config;
pub mod error;
pub mod traits;
pub mod types;

// Re-exports
pub use auth::{CredentialChain, CredentialSource, ResolvedCredential};
pub use config::{GmConfig, ModelConfig, ObservabilityConfig, ServerConfig, ToolsConfig};
pub use error::{Error, Result};
pub use traits::{ModelClient, Tool, ToolContext, ToolResponse};
pub use types::{
    ContentBlock, ConversationTurn, ModelRequest, ModelResponse, Role, SamplingParams,
    ToolDescriptor, ToolInvocationRequest, ToolInvocationResult, ToolOutcome,
};
