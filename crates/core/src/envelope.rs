//! The structured output contract between the model and the orchestrator.
//!
//! The model is instructed to emit a JSON object with a `response` string and
//! an optional `tool_call`. The parser produces an [`Envelope`] from whatever
//! text actually came back; the dispatcher turns a [`ToolCall`] into a
//! [`ToolResult`].

use serde::{Deserialize, Serialize};

/// A request to execute a tool, as emitted by the model.
///
/// Only the response parser constructs these — callers never build one by
/// hand, and the dispatcher never has to introspect loose JSON shapes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    /// Name of the tool to execute
    pub name: String,

    /// Named arguments, matching the tool's declared parameter schema
    #[serde(default)]
    pub parameters: serde_json::Map<String, serde_json::Value>,
}

/// The envelope the model is instructed to emit: a natural-language response
/// plus at most one tool call. Multiple simultaneous tool calls are not
/// representable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    /// Natural-language response text (may be empty, never absent)
    pub response: String,

    /// Structured tool call, if the model requested one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_call: Option<ToolCall>,
}

impl Envelope {
    /// An envelope carrying only text.
    pub fn text(response: impl Into<String>) -> Self {
        Self {
            response: response.into(),
            tool_call: None,
        }
    }
}

/// The normalized outcome of a tool dispatch.
///
/// Exactly one of `value`/`error` is meaningful. Both success and failure are
/// serializable so the result can be folded back into conversation memory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolResult {
    /// The handler's return value on success
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<serde_json::Value>,

    /// Failure description when resolution or execution failed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ToolResult {
    /// A successful result.
    pub fn ok(value: serde_json::Value) -> Self {
        Self {
            value: Some(value),
            error: None,
        }
    }

    /// A failed result.
    pub fn fail(error: impl Into<String>) -> Self {
        Self {
            value: None,
            error: Some(error.into()),
        }
    }

    /// Whether the dispatch failed.
    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }

    /// Render the result as plain text for folding into memory.
    ///
    /// String values render bare (no JSON quoting); everything else renders
    /// as compact JSON.
    pub fn render(&self) -> String {
        if let Some(err) = &self.error {
            return format!("error: {err}");
        }
        match &self.value {
            Some(serde_json::Value::String(s)) => s.clone(),
            Some(other) => other.to_string(),
            None => String::new(),
        }
    }
}
