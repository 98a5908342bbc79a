//! Response parser — extracts a structured envelope from raw model text.
//!
//! The model is *instructed* to emit fenced JSON, but that is a request, not
//! a guarantee. `parse` is therefore total: every input produces an
//! [`Envelope`], with a silent fallback to plain text when the structure
//! isn't there. Malformed model output is expected noise, never a turn
//! failure.

use regex_lite::Regex;
use roundtrip_core::envelope::{Envelope, ToolCall};
use serde::Deserialize;
use std::sync::OnceLock;

/// First fenced JSON object: a `{...}` body wrapped in triple backticks,
/// optionally tagged `json`. Non-greedy, dot-matches-newline.
fn fence_regex() -> &'static Regex {
    static FENCE: OnceLock<Regex> = OnceLock::new();
    FENCE.get_or_init(|| {
        Regex::new(r"(?s)```(?:json)?\s*(\{.*?\})\s*```").expect("fence pattern is valid")
    })
}

/// What a well-behaved model emits. Shape violations (missing `response`,
/// non-object `parameters`, `tool_call` that isn't an object) fail
/// deserialization and route to the fallback.
#[derive(Debug, Deserialize)]
struct WireEnvelope {
    response: String,
    #[serde(default)]
    tool_call: Option<ToolCall>,
}

/// Parse raw model output into an [`Envelope`]. Total over all text input.
///
/// 1. The candidate is the body of the *first* fenced JSON block, or the
///    whole trimmed text when no fence is present (bare JSON still parses).
/// 2. The candidate must decode to an object with a string `response` and an
///    optional `tool_call {name, parameters}`; `tool_call: null` means no
///    call, absent `parameters` default to `{}`.
/// 3. Anything else falls back to the entire raw text as the response, with
///    no tool call — the guaranteed terminal case.
pub fn parse(raw: &str) -> Envelope {
    let candidate = match fence_regex().captures(raw) {
        Some(caps) => caps.get(1).map_or("", |m| m.as_str()),
        None => raw.trim(),
    };

    match serde_json::from_str::<WireEnvelope>(candidate) {
        Ok(wire) => Envelope {
            response: wire.response.trim().to_string(),
            tool_call: wire.tool_call,
        },
        Err(_) => Envelope::text(raw.trim()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fenced_envelope_without_tool_call() {
        let raw = "```json\n{\"response\": \"hi\", \"tool_call\": null}\n```";
        let envelope = parse(raw);
        assert_eq!(envelope.response, "hi");
        assert!(envelope.tool_call.is_none());
    }

    #[test]
    fn fenced_envelope_with_tool_call() {
        let raw = concat!(
            "```json\n",
            "{\"response\": \"check\", \"tool_call\": ",
            "{\"name\": \"get_weather\", \"parameters\": {\"city\": \"Rome\"}}}\n",
            "```"
        );
        let envelope = parse(raw);
        assert_eq!(envelope.response, "check");

        let call = envelope.tool_call.unwrap();
        assert_eq!(call.name, "get_weather");
        assert_eq!(call.parameters["city"], "Rome");
    }

    #[test]
    fn untagged_fence_accepted() {
        let raw = "```\n{\"response\": \"plain fence\", \"tool_call\": null}\n```";
        assert_eq!(parse(raw).response, "plain fence");
    }

    #[test]
    fn bare_json_without_fence_accepted() {
        let raw = r#"{"response": "no fence needed", "tool_call": null}"#;
        let envelope = parse(raw);
        assert_eq!(envelope.response, "no fence needed");
        assert!(envelope.tool_call.is_none());
    }

    #[test]
    fn plain_text_falls_back() {
        let envelope = parse("Hello there");
        assert_eq!(envelope.response, "Hello there");
        assert!(envelope.tool_call.is_none());
    }

    #[test]
    fn invalid_json_in_fence_falls_back_to_whole_text() {
        let raw = "Some preamble\n```json\n{\"response\": oops}\n```";
        let envelope = parse(raw);
        assert_eq!(envelope.response, raw.trim());
        assert!(envelope.tool_call.is_none());
    }

    #[test]
    fn missing_response_key_falls_back() {
        let raw = "```json\n{\"tool_call\": null}\n```";
        let envelope = parse(raw);
        assert_eq!(envelope.response, raw.trim());
    }

    #[test]
    fn non_object_parameters_fall_back() {
        let raw = "```json\n{\"response\": \"x\", \"tool_call\": {\"name\": \"t\", \"parameters\": \"Rome\"}}\n```";
        let envelope = parse(raw);
        assert!(envelope.tool_call.is_none());
        assert_eq!(envelope.response, raw.trim());
    }

    #[test]
    fn absent_parameters_default_to_empty() {
        let raw = "```json\n{\"response\": \"x\", \"tool_call\": {\"name\": \"ping\"}}\n```";
        let call = parse(raw).tool_call.unwrap();
        assert_eq!(call.name, "ping");
        assert!(call.parameters.is_empty());
    }

    #[test]
    fn only_first_fenced_block_considered() {
        let raw = concat!(
            "```json\n{\"response\": \"first\", \"tool_call\": null}\n```\n",
            "```json\n{\"response\": \"second\", \"tool_call\": null}\n```"
        );
        assert_eq!(parse(raw).response, "first");
    }

    #[test]
    fn nested_braces_in_tool_call_survive_fence_matching() {
        let raw = "```json\n{\"response\": \"ok\", \"tool_call\": {\"name\": \"calculator\", \"parameters\": {\"expression\": \"2 + 2\"}}}\n```";
        let call = parse(raw).tool_call.unwrap();
        assert_eq!(call.name, "calculator");
    }

    #[test]
    fn response_field_is_trimmed() {
        let raw = "```json\n{\"response\": \"  padded  \", \"tool_call\": null}\n```";
        assert_eq!(parse(raw).response, "padded");
    }

    #[test]
    fn totality_never_panics() {
        for raw in ["", "{", "```json", "``````", "{\"response\":", "\u{0}\u{1}"] {
            let envelope = parse(raw);
            assert!(envelope.tool_call.is_none());
        }
    }

    #[test]
    fn fallback_is_a_fixed_point() {
        let first = parse("just some prose, no JSON at all");
        let second = parse(&first.response);
        assert_eq!(first, second);
    }
}
