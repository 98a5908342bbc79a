//! Tool trait and catalog — the abstraction over agent capabilities.
//!
//! Tools are arbitrary named handlers with a declared parameter schema. The
//! catalog maps names to handlers, renders definitions for the model, and
//! owns dispatch: resolving a [`ToolCall`] and normalizing both success and
//! failure into a serializable [`ToolResult`].

use crate::envelope::{ToolCall, ToolResult};
use crate::error::{LookupError, ToolError};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::warn;

/// A tool definition offered to the model so it knows what it can call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDefinition {
    /// The tool name (unique catalog key)
    pub name: String,

    /// Description of what the tool does
    pub description: String,

    /// JSON Schema describing the tool's parameters
    pub parameters: serde_json::Value,
}

/// The core Tool trait.
///
/// Each tool implements this trait and is registered in the [`ToolCatalog`].
/// `execute` receives the call's named parameters as a JSON object and
/// returns a serializable value; handlers that do no I/O simply return
/// immediately from the async method, so compute-only and suspending tools
/// share one calling convention.
#[async_trait]
pub trait Tool: Send + Sync {
    /// The unique name of this tool (e.g., "get_weather").
    fn name(&self) -> &str;

    /// A description of what this tool does (sent to the model).
    fn description(&self) -> &str;

    /// JSON Schema describing this tool's parameters.
    fn parameters_schema(&self) -> serde_json::Value;

    /// Execute the tool with the given named arguments.
    async fn execute(
        &self,
        arguments: serde_json::Value,
    ) -> std::result::Result<serde_json::Value, ToolError>;

    /// Convert this tool into a ToolDefinition for sending to the model.
    fn to_definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: self.name().to_string(),
            description: self.description().to_string(),
            parameters: self.parameters_schema(),
        }
    }
}

/// An optional, possibly-remote service that ranks tool definitions by
/// relevance to a prompt. Failures never abort a turn — the catalog degrades
/// to an empty suggestion list.
#[async_trait]
pub trait RelevanceLookup: Send + Sync {
    /// Return up to `top_k` definitions ranked by relevance to `prompt`.
    async fn lookup(
        &self,
        prompt: &str,
        top_k: usize,
    ) -> std::result::Result<Vec<ToolDefinition>, LookupError>;
}

/// The registry of available tools.
///
/// The orchestrator uses this to:
/// 1. Get tool definitions (or per-turn relevance suggestions) for the model
/// 2. Dispatch the single tool call a turn may carry
pub struct ToolCatalog {
    tools: HashMap<String, Box<dyn Tool>>,
    lookup: Option<Arc<dyn RelevanceLookup>>,
}

impl ToolCatalog {
    pub fn new() -> Self {
        Self {
            tools: HashMap::new(),
            lookup: None,
        }
    }

    /// Attach a relevance lookup that narrows the definitions offered per turn.
    pub fn with_lookup(mut self, lookup: Arc<dyn RelevanceLookup>) -> Self {
        self.lookup = Some(lookup);
        self
    }

    /// Register a tool. Replaces any existing tool with the same name.
    pub fn register(&mut self, tool: Box<dyn Tool>) {
        let name = tool.name().to_string();
        self.tools.insert(name, tool);
    }

    /// Get a tool by name.
    pub fn resolve(&self, name: &str) -> Option<&dyn Tool> {
        self.tools.get(name).map(|t| t.as_ref())
    }

    /// Get all tool definitions.
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.tools.values().map(|t| t.to_definition()).collect()
    }

    /// List all registered tool names.
    pub fn names(&self) -> Vec<&str> {
        self.tools.keys().map(|s| s.as_str()).collect()
    }

    /// Definitions to offer the model for this prompt.
    ///
    /// With a lookup attached, asks it for up to `top_k` ranked definitions;
    /// any failure degrades to an empty list (the turn proceeds with no tool
    /// suggestions). Without a lookup the full local catalog is offered.
    pub async fn suggestions(&self, prompt: &str, top_k: usize) -> Vec<ToolDefinition> {
        let Some(lookup) = &self.lookup else {
            return self.definitions();
        };

        match lookup.lookup(prompt, top_k).await {
            Ok(defs) => defs,
            Err(e) => {
                warn!("Tool relevance lookup failed: {e}");
                Vec::new()
            }
        }
    }

    /// Dispatch a tool call, normalizing every outcome into a [`ToolResult`].
    ///
    /// An unknown name, bad arguments, or a handler fault all come back as a
    /// result with `error` set — nothing escapes the dispatcher. A call is
    /// never retried.
    pub async fn dispatch(&self, call: &ToolCall) -> ToolResult {
        let Some(tool) = self.resolve(&call.name) else {
            return ToolResult::fail(ToolError::NotFound(call.name.clone()).to_string());
        };

        let arguments = serde_json::Value::Object(call.parameters.clone());
        match tool.execute(arguments).await {
            Ok(value) => ToolResult::ok(value),
            Err(e) => {
                warn!(tool = %call.name, error = %e, "Tool execution failed");
                ToolResult::fail(e.to_string())
            }
        }
    }
}

impl Default for ToolCatalog {
    fn default() -> Self {
        Self::new()
    }
}
