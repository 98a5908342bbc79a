//! Built-in tool implementations for roundtrip.
//!
//! Tools give the agent the ability to act on a request: check the weather,
//! do math. Each is a handler behind the `Tool` trait; the default catalog
//! wires them all up.

pub mod calculator;
pub mod weather;

use roundtrip_core::tool::ToolCatalog;

/// Create a default tool catalog with all built-in tools.
pub fn default_catalog() -> ToolCatalog {
    let mut catalog = ToolCatalog::new();
    catalog.register(Box::new(weather::GetWeatherTool));
    catalog.register(Box::new(calculator::CalculatorTool));
    catalog
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_catalog_has_builtins() {
        let catalog = default_catalog();
        assert!(catalog.resolve("get_weather").is_some());
        assert!(catalog.resolve("calculator").is_some());
    }
}
