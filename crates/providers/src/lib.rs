//! Network clients for roundtrip's two external collaborators:
//! the completion endpoint and the optional tool-relevance lookup.
//!
//! Both are thin reqwest wrappers behind the traits defined in
//! `roundtrip-core`; neither retries — one attempt with a bounded timeout,
//! with failures reported in full to the caller.

pub mod openrouter;
pub mod relevance;

pub use openrouter::OpenRouterProvider;
pub use relevance::HttpRelevanceLookup;
