//! The roundtrip turn orchestrator — the heart of the system.
//!
//! One user turn drives a single cycle:
//!
//! 1. **Build context** (system prompt + tool suggestions + memory window + user message)
//! 2. **Request a completion** and parse the structured envelope out of it
//! 3. **If a tool call is present**: dispatch it exactly once, fold the
//!    result into memory, rebuild context, and request a final completion
//! 4. **Return** the final envelope to the caller
//!
//! Chained tool use within a turn is structurally impossible here — the
//! second completion's tool calls are discarded, not dispatched.

pub mod context;
pub mod orchestrator;
pub mod parser;

pub use context::{FORMAT_CONTRACT, INSTRUCTIONS, build_context, render_system_message};
pub use orchestrator::Agent;
pub use parser::parse;
