//! Weather tool — returns mock weather data for a city.
//!
//! In production this would call a real weather API (OpenWeatherMap, etc.).
//! The stub returns plausible, deterministic weather so the full turn cycle
//! can be exercised end-to-end without network access.

use async_trait::async_trait;
use roundtrip_core::error::ToolError;
use roundtrip_core::tool::Tool;

pub struct GetWeatherTool;

#[async_trait]
impl Tool for GetWeatherTool {
    fn name(&self) -> &str {
        "get_weather"
    }

    fn description(&self) -> &str {
        "Look up current weather conditions for a city. Returns a short text summary with temperature and conditions."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "city": {
                    "type": "string",
                    "description": "The city name to look up weather for"
                }
            },
            "required": ["city"]
        })
    }

    async fn execute(
        &self,
        arguments: serde_json::Value,
    ) -> Result<serde_json::Value, ToolError> {
        let city = arguments["city"]
            .as_str()
            .ok_or_else(|| ToolError::InvalidArguments("Missing 'city' argument".into()))?;

        Ok(serde_json::json!(describe_weather(city)))
    }
}

/// Deterministic mock weather based on a hash of the city name.
fn describe_weather(city: &str) -> String {
    let hash: u32 = city
        .bytes()
        .fold(0u32, |acc, b| acc.wrapping_mul(31).wrapping_add(b as u32));

    let conditions = [
        "sunny",
        "partly cloudy",
        "overcast",
        "lightly raining",
        "foggy",
    ];

    let temperature = ((hash % 35) as i32) - 5; // -5 to 29°C
    let condition = conditions[(hash as usize / 7) % conditions.len()];

    format!("The weather in {city} is {condition} with {temperature}°C.")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn lookup_returns_summary() {
        let tool = GetWeatherTool;
        let value = tool
            .execute(serde_json::json!({"city": "Rome"}))
            .await
            .unwrap();

        let text = value.as_str().unwrap();
        assert!(text.contains("Rome"));
        assert!(text.contains("°C"));
    }

    #[tokio::test]
    async fn deterministic_results() {
        let tool = GetWeatherTool;
        let first = tool
            .execute(serde_json::json!({"city": "London"}))
            .await
            .unwrap();
        let second = tool
            .execute(serde_json::json!({"city": "London"}))
            .await
            .unwrap();

        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn missing_city_returns_error() {
        let tool = GetWeatherTool;
        let result = tool.execute(serde_json::json!({})).await;
        assert!(matches!(result, Err(ToolError::InvalidArguments(_))));
    }

    #[test]
    fn tool_definition() {
        let def = GetWeatherTool.to_definition();
        assert_eq!(def.name, "get_weather");
        assert_eq!(def.parameters["required"][0], "city");
    }
}
