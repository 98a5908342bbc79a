//! Context assembly — the ordered message list sent to the model.
//!
//! Layout per request: system turn (instructions + output-format contract +
//! tool suggestions for this input), then the memory window, then the new
//! user message when there is one. The post-dispatch rebuild passes no user
//! message, so the folded tool result is the latest thing the model sees.

use roundtrip_core::tool::ToolDefinition;
use roundtrip_core::turn::Turn;

/// Fixed instruction text for every turn.
pub const INSTRUCTIONS: &str = "You are an AI assistant with access to tools. \
Use these tools when appropriate to fulfill user requests. \
Always be helpful, accurate, and concise. \
IMPORTANT: You must remember all previously shared information within the conversation. \
If the user shares their name or preferences, remember this information for the duration of the conversation.";

/// The output-format contract imposed on the model. The parser tolerates
/// violations; this text is what makes them rare.
pub const FORMAT_CONTRACT: &str = r#"
You MUST format ALL your responses as valid JSON objects with this structure:
```json
{
    "response": "your helpful response text here",
    "tool_call": null
}
```
When using a tool, set tool_call to a valid object like:
```json
{
    "response": "I'll check that for you",
    "tool_call": {
        "name": "tool_name",
        "parameters": {
            "param1": "value1"
        }
    }
}
```
ALWAYS respond in this JSON format. NEVER respond in plain text."#;

/// Render the full system message: instructions, format contract, and the
/// tool definitions offered for this turn (omitted entirely when empty).
pub fn render_system_message(instructions: &str, tools: &[ToolDefinition]) -> String {
    let mut system = String::with_capacity(instructions.len() + FORMAT_CONTRACT.len());
    system.push_str(instructions);
    system.push_str(FORMAT_CONTRACT);

    if !tools.is_empty() {
        system.push_str("\n\n## Available tools\n");
        for tool in tools {
            system.push_str(&format!(
                "- {}: {}\n  parameters: {}\n",
                tool.name, tool.description, tool.parameters
            ));
        }
    }

    system
}

/// Build the ordered message list for one completion request.
///
/// `user_input` is `Some` for the first request of a turn and `None` for the
/// post-dispatch rebuild.
pub fn build_context(system: &str, window: &[Turn], user_input: Option<&str>) -> Vec<Turn> {
    let mut messages = Vec::with_capacity(window.len() + 2);
    messages.push(Turn::system(system));
    messages.extend(window.iter().cloned());
    if let Some(input) = user_input {
        messages.push(Turn::user(input));
    }
    messages
}

#[cfg(test)]
mod tests {
    use super::*;
    use roundtrip_core::turn::Role;

    fn weather_definition() -> ToolDefinition {
        ToolDefinition {
            name: "get_weather".into(),
            description: "Current weather for a city".into(),
            parameters: serde_json::json!({
                "type": "object",
                "properties": {"city": {"type": "string"}},
                "required": ["city"]
            }),
        }
    }

    #[test]
    fn system_message_carries_format_contract() {
        let system = render_system_message(INSTRUCTIONS, &[]);
        assert!(system.contains("valid JSON objects"));
        assert!(system.contains("tool_call"));
        assert!(!system.contains("## Available tools"));
    }

    #[test]
    fn system_message_renders_tool_definitions() {
        let system = render_system_message(INSTRUCTIONS, &[weather_definition()]);
        assert!(system.contains("## Available tools"));
        assert!(system.contains("get_weather"));
        assert!(system.contains("\"city\""));
    }

    #[test]
    fn context_order_is_system_window_user() {
        let window = vec![Turn::user("earlier"), Turn::assistant("reply")];
        let messages = build_context("sys", &window, Some("now"));

        assert_eq!(messages.len(), 4);
        assert_eq!(messages[0].role, Role::System);
        assert_eq!(messages[1].content, "earlier");
        assert_eq!(messages[2].content, "reply");
        assert_eq!(messages[3].role, Role::User);
        assert_eq!(messages[3].content, "now");
    }

    #[test]
    fn rebuild_has_no_new_user_message() {
        let window = vec![
            Turn::user("what's the weather?"),
            Turn::assistant("checking"),
            Turn::assistant("Tool result (get_weather): sunny"),
        ];
        let messages = build_context("sys", &window, None);

        assert_eq!(messages.len(), 4);
        assert_eq!(messages.last().unwrap().content, "Tool result (get_weather): sunny");
    }

    #[test]
    fn empty_window_yields_system_plus_user() {
        let messages = build_context("sys", &[], Some("hi"));
        assert_eq!(messages.len(), 2);
    }
}
