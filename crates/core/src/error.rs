//! Error types for the roundtrip domain.
//!
//! Uses `thiserror` for ergonomic error definitions.
//! Each bounded context has its own error enum; the policy split is:
//! failures that are expected noise from non-deterministic model text are
//! recovered locally (the parser falls back, tool faults become
//! [`crate::ToolResult`] errors), while failures that mean the system cannot
//! proceed (transport down, malformed provider payloads, missing
//! configuration) propagate to the caller of the turn.

use thiserror::Error;

/// The top-level error type for all roundtrip operations.
#[derive(Debug, Error)]
pub enum Error {
    // --- Completion client errors ---
    #[error("Completion error: {0}")]
    Completion(#[from] CompletionError),

    // --- Tool errors (only reachable outside dispatch normalization) ---
    #[error("Tool error: {0}")]
    Tool(#[from] ToolError),

    // --- Configuration errors ---
    #[error("Configuration error: {message}")]
    Config { message: String },

    // --- Serialization ---
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    // --- Generic ---
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias using our Error.
pub type Result<T> = std::result::Result<T, Error>;

// --- Bounded context errors ---

/// Failures from the completion endpoint.
///
/// The transport class (network, status, timeout, auth) means the request
/// never produced a usable body; the `Malformed` class means a success
/// response arrived without the expected completion content. Neither is ever
/// swallowed into a sentinel — an empty completion is always an error.
#[derive(Debug, Clone, Error)]
pub enum CompletionError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Completion endpoint returned status {code}: {body}")]
    Status { code: u16, body: String },

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Malformed provider response: {0}")]
    Malformed(String),
}

impl CompletionError {
    /// Whether this is a transport-level failure (the request itself failed)
    /// as opposed to a structurally broken success response.
    pub fn is_transport(&self) -> bool {
        !matches!(self, CompletionError::Malformed(_))
    }
}

/// Failures from tool resolution and execution.
///
/// Dispatch normalizes all of these into a [`crate::ToolResult`] with the
/// error field set; they never cross the dispatcher boundary as `Err`.
#[derive(Debug, Error)]
pub enum ToolError {
    #[error("tool '{0}' not found")]
    NotFound(String),

    #[error("Invalid tool arguments: {0}")]
    InvalidArguments(String),

    #[error("Tool execution failed: {tool_name} — {reason}")]
    ExecutionFailed { tool_name: String, reason: String },
}

/// Failures from the remote tool-relevance lookup.
///
/// Always swallowed by the catalog: a failed lookup degrades to an empty
/// suggestion list, never an aborted turn.
#[derive(Debug, Clone, Error)]
pub enum LookupError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Lookup endpoint returned status {code}: {body}")]
    Status { code: u16, body: String },

    #[error("Malformed lookup response: {0}")]
    Malformed(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn completion_error_displays_status() {
        let err = Error::Completion(CompletionError::Status {
            code: 429,
            body: "Too many requests".into(),
        });
        assert!(err.to_string().contains("429"));
        assert!(err.to_string().contains("Too many requests"));
    }

    #[test]
    fn transport_classification() {
        assert!(CompletionError::Network("refused".into()).is_transport());
        assert!(CompletionError::Timeout("30s".into()).is_transport());
        assert!(
            CompletionError::Status {
                code: 500,
                body: String::new()
            }
            .is_transport()
        );
        assert!(!CompletionError::Malformed("no choices".into()).is_transport());
    }

    #[test]
    fn tool_not_found_message() {
        let err = ToolError::NotFound("get_weather".into());
        assert_eq!(err.to_string(), "tool 'get_weather' not found");
    }
}
