//! Process-wide tool registry
//!
//! Built once at startup, then shared read-only (`Arc<ToolRegistry>`)
//! between concurrent turns.

use crate::context::DefaultToolContext;
use gm_core::{Error, Result, Tool, ToolContext, ToolDescriptor};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

#[derive(Default)]
pub struct ToolRegistry {
    tools: Vec<Arc<dyn Tool>>,
    index: HashMap<String, usize>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a tool.
    ///
    /// # Errors
    ///
    /// `Error::DuplicateTool` when a tool with the same name is already
    /// registered; the existing entry is left untouched.
    pub fn register(&mut self, tool: Arc<dyn Tool>) -> Result<()> {
        let name = tool.name().to_string();
        if self.index.contains_key(&name) {
            return Err(Error::DuplicateTool(name));
        }

        tracing::debug!(tool = %name, "Registered tool");
        self.index.insert(name, self.tools.len());
        self.tools.push(tool);
        Ok(())
    }

    pub fn register_all<I>(&mut self, tools: I) -> Result<()>
    where
        I: IntoIterator<Item = Arc<dyn Tool>>,
    {
        for tool in tools {
            self.register(tool)?;
        }
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&Arc<dyn Tool>> {
        self.index.get(name).map(|&i| &self.tools[i])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Tool names in registration order
    pub fn names(&self) -> Vec<&str> {
        self.tools.iter().map(|t| t.name()).collect()
    }

    /// Descriptors in registration order, in the shape the model expects
    pub fn describe_all(&self) -> Vec<ToolDescriptor> {
        self.tools.iter().map(|t| t.descriptor()).collect()
    }

    /// Runs a tool outside any model turn
    pub async fn invoke(&self, name: &str, arguments: Value) -> Result<Value> {
        self.invoke_with(Arc::new(DefaultToolContext::standalone()), name, arguments)
            .await
    }

    /// Runs a tool with the caller's context.
    ///
    /// # Errors
    ///
    /// - `Error::UnknownTool` when no tool has that name
    /// - `Error::ToolExecution` wrapping whatever the handler failed with
    pub async fn invoke_with(
        &self,
        ctx: Arc<dyn ToolContext>,
        name: &str,
        arguments: Value,
    ) -> Result<Value> {
        let tool = self
            .get(name)
            .ok_or_else(|| Error::UnknownTool(name.to_string()))?;

        match tool.execute(ctx, arguments).await {
            Ok(response) => Ok(response.result),
            Err(err @ Error::ToolExecution { .. }) => Err(err),
            Err(err) => Err(Error::tool_failed(name, err)),
        }
    }
}

impl std::fmt::Debug for ToolRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolRegistry")
            .field("tools", &self.names())
            .finish()
    }
}
