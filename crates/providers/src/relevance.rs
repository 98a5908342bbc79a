//! HTTP tool-relevance lookup client.
//!
//! Posts `{prompt, top_k}` to a remote ranking service and maps the reply to
//! `ToolDefinition`s. The client reports every failure honestly; the
//! degrade-to-empty policy lives in the catalog, which owns the decision that
//! a missing ranking never aborts a turn.

use async_trait::async_trait;
use roundtrip_core::error::LookupError;
use roundtrip_core::tool::{RelevanceLookup, ToolDefinition};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// A remote relevance lookup over HTTP.
pub struct HttpRelevanceLookup {
    endpoint: String,
    client: reqwest::Client,
}

impl HttpRelevanceLookup {
    /// Create a client for the given endpoint URL.
    pub fn new(endpoint: impl Into<String>, timeout: std::time::Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .expect("Failed to create HTTP client");

        Self {
            endpoint: endpoint.into(),
            client,
        }
    }
}

#[async_trait]
impl RelevanceLookup for HttpRelevanceLookup {
    async fn lookup(
        &self,
        prompt: &str,
        top_k: usize,
    ) -> std::result::Result<Vec<ToolDefinition>, LookupError> {
        let body = LookupRequest { prompt, top_k };

        debug!(endpoint = %self.endpoint, top_k, "Requesting tool suggestions");

        let response = self
            .client
            .post(&self.endpoint)
            .json(&body)
            .send()
            .await
            .map_err(|e| LookupError::Network(e.to_string()))?;

        let status = response.status().as_u16();
        if status != 200 {
            let error_body = response.text().await.unwrap_or_default();
            return Err(LookupError::Status {
                code: status,
                body: error_body,
            });
        }

        let api_response: LookupResponse = response
            .json()
            .await
            .map_err(|e| LookupError::Malformed(format!("Failed to parse response: {e}")))?;

        Ok(api_response
            .tools
            .into_iter()
            .take(top_k)
            .map(|t| ToolDefinition {
                name: t.name,
                description: t.description,
                parameters: t.parameters,
            })
            .collect())
    }
}

// --- Lookup API types (internal) ---

#[derive(Debug, Serialize)]
struct LookupRequest<'a> {
    prompt: &'a str,
    top_k: usize,
}

#[derive(Debug, Deserialize)]
struct LookupResponse {
    #[serde(default)]
    tools: Vec<LookupTool>,
}

#[derive(Debug, Deserialize)]
struct LookupTool {
    name: String,
    #[serde(default)]
    description: String,
    #[serde(default = "empty_schema")]
    parameters: serde_json::Value,
}

fn empty_schema() -> serde_json::Value {
    serde_json::json!({"type": "object", "properties": {}})
}
