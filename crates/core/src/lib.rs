//! # Roundtrip Core
//!
//! Domain types, traits, and error definitions for the roundtrip agent
//! orchestrator. This crate has **zero framework dependencies** — it defines
//! the domain model that all other crates implement against.
//!
//! ## Design Philosophy
//!
//! The two network-bound collaborators — the completion endpoint and the tool
//! relevance lookup — are defined as traits here. Implementations live in
//! their respective crates. This enables:
//! - Swapping implementations via configuration
//! - Easy testing with mock/stub implementations
//! - Clean dependency graph (all crates depend inward on core)

pub mod envelope;
pub mod error;
pub mod provider;
pub mod tool;
pub mod turn;

// Re-export key types at crate root for ergonomics
pub use envelope::{Envelope, ToolCall, ToolResult};
pub use error::{CompletionError, Error, LookupError, Result, ToolError};
pub use provider::{Completion, CompletionRequest, Provider, Usage};
pub use tool::{RelevanceLookup, Tool, ToolCatalog, ToolDefinition};
pub use turn::{Role, Turn};
