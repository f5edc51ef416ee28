//! Tool system for the Game Master
//!
//! This crate provides the tool execution framework, including:
//! - The process-wide `ToolRegistry`
//! - Function tools and a schema builder
//! - Built-in game tools (dice, characters, lore, clock)
//! - A proxy for tools hosted by a remote tool host

pub mod builtin;
pub mod context;
pub mod function_tool;
pub mod registry;
pub mod remote;
pub mod schema;
pub mod store;

// Re-exports
pub use context::DefaultToolContext;
pub use function_tool::FunctionTool;
pub use registry::ToolRegistry;
pub use remote::{RemoteTool, RemoteToolClient, ToolHostRequest};
pub use schema::ToolSchema;
pub use store::{AbilityScores, Character, CharacterStore, InMemoryCharacterStore};

// Re-export core types
pub use gm_core::{Result, Tool, ToolContext, ToolResponse};
