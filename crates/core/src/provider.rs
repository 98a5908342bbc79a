//! Provider trait — the abstraction over the completion endpoint.
//!
//! A Provider knows how to send an ordered list of role-tagged turns to a
//! model endpoint and return the raw completion text. It owns the bounded
//! request timeout; it does **not** retry — retries, if any, belong to the
//! caller so context can be re-rendered between attempts.

use crate::error::CompletionError;
use crate::turn::Turn;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Configuration for a single completion request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionRequest {
    /// The model to use (e.g., "anthropic/claude-sonnet-4")
    pub model: String,

    /// The ordered context; by convention the first turn carries the system
    /// instructions
    pub messages: Vec<Turn>,

    /// Maximum tokens to generate
    pub max_tokens: u32,

    /// Temperature (0.0 = deterministic, 1.0 = creative)
    #[serde(default = "default_temperature")]
    pub temperature: f32,
}

fn default_temperature() -> f32 {
    0.7
}

/// A complete (non-streaming) response from a provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Completion {
    /// The raw completion text, exactly as the endpoint returned it
    /// (whitespace-trimmed); parsing into an envelope happens downstream
    pub text: String,

    /// Which model actually responded (may differ from requested)
    pub model: String,

    /// Token usage statistics, when the endpoint reports them
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<Usage>,
}

/// Token usage information.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Usage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

/// The completion endpoint abstraction.
///
/// The orchestrator calls `complete()` without knowing which backend is in
/// use. A failed request is always reported as an error — never an empty
/// string — so callers can distinguish "the model said nothing" from "the
/// call never happened".
#[async_trait]
pub trait Provider: Send + Sync {
    /// A human-readable name for this provider (e.g., "openrouter").
    fn name(&self) -> &str;

    /// Send a request and get the raw completion text back.
    async fn complete(
        &self,
        request: CompletionRequest,
    ) -> std::result::Result<Completion, CompletionError>;
}
