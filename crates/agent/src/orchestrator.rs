//! The per-turn orchestration state machine.
//!
//! One user turn runs:
//! build context → completion → parse → [dispatch → fold result → rebuild
//! context → completion → parse] → done. The bracketed branch runs iff the
//! first envelope carries a tool call, and it runs at most once — a tool
//! call in the second envelope is discarded, never dispatched.
//!
//! Memory is only written after a completion parses, so a transport failure
//! aborts the turn without leaving a half-recorded exchange behind. The
//! machine holds no state across turns except what memory retains.

use crate::{context, parser};
use roundtrip_core::envelope::Envelope;
use roundtrip_core::error::Result;
use roundtrip_core::provider::{CompletionRequest, Provider};
use roundtrip_core::tool::ToolCatalog;
use roundtrip_core::turn::{Role, Turn};
use roundtrip_memory::{ConversationMemory, DEFAULT_WINDOW};
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Phases of a single turn, in order. Used for tracing; the transitions are
/// enforced by control flow, not by runtime checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TurnPhase {
    BuildingContext,
    AwaitingCompletion(u8),
    Parsed(u8),
    Dispatching,
    Done,
}

impl std::fmt::Display for TurnPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TurnPhase::BuildingContext => write!(f, "building_context"),
            TurnPhase::AwaitingCompletion(n) => write!(f, "awaiting_completion_{n}"),
            TurnPhase::Parsed(n) => write!(f, "parsed_{n}"),
            TurnPhase::Dispatching => write!(f, "dispatching"),
            TurnPhase::Done => write!(f, "done"),
        }
    }
}

/// A single conversation's agent: provider, tool catalog, and memory, driven
/// one strictly-sequential turn at a time.
///
/// Independent conversations get independent `Agent` instances and share no
/// mutable state. Within one conversation the caller serializes turns —
/// `chat` takes `&mut self` precisely so two turns cannot interleave.
pub struct Agent {
    /// The completion endpoint
    provider: Arc<dyn Provider>,

    /// Registered tools plus optional relevance lookup
    catalog: ToolCatalog,

    /// This conversation's bounded-window memory
    memory: ConversationMemory,

    /// The model to use
    model: String,

    /// Temperature setting
    temperature: f32,

    /// Max tokens per completion
    max_tokens: u32,

    /// Fixed instruction text (format contract appended at render time)
    instructions: String,

    /// Maximum tool suggestions requested per turn
    suggestion_limit: usize,
}

impl Agent {
    /// Create an agent with default generation settings.
    pub fn new(provider: Arc<dyn Provider>, catalog: ToolCatalog, model: impl Into<String>) -> Self {
        Self {
            provider,
            catalog,
            memory: ConversationMemory::new(DEFAULT_WINDOW),
            model: model.into(),
            temperature: 0.7,
            max_tokens: 500,
            instructions: context::INSTRUCTIONS.to_string(),
            suggestion_limit: 5,
        }
    }

    /// Set the sampling temperature.
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Set the max tokens per completion.
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// Set the memory window size.
    pub fn with_window(mut self, window: usize) -> Self {
        self.memory = ConversationMemory::new(window);
        self
    }

    /// Override the instruction text (the format contract is always appended).
    pub fn with_instructions(mut self, instructions: impl Into<String>) -> Self {
        self.instructions = instructions.into();
        self
    }

    /// Set the maximum tool suggestions requested per turn.
    pub fn with_suggestion_limit(mut self, limit: usize) -> Self {
        self.suggestion_limit = limit;
        self
    }

    /// This conversation's memory (all recorded turns, windowed view).
    pub fn memory(&self) -> &ConversationMemory {
        &self.memory
    }

    /// Run one full turn and return its final envelope.
    ///
    /// At most two completion requests and at most one tool dispatch happen
    /// per call. Transport and provider errors propagate; parse-level noise
    /// does not.
    pub async fn chat(&mut self, user_input: &str) -> Result<Envelope> {
        let turn_id = Uuid::new_v4();
        info!(%turn_id, "Processing turn");

        debug!(%turn_id, phase = %TurnPhase::BuildingContext, "Turn phase");
        let suggestions = self
            .catalog
            .suggestions(user_input, self.suggestion_limit)
            .await;
        let system = context::render_system_message(&self.instructions, &suggestions);
        let messages = context::build_context(&system, self.memory.window(), Some(user_input));

        let first = self.complete_and_parse(turn_id, 1, messages).await?;

        // The completion parsed — now (and only now) the exchange is durable.
        // The recorded user turn is the same canonical text the context
        // carried; nothing is stored twice.
        self.memory.record(Role::User, user_input);
        self.memory.record(Role::Assistant, &first.response);

        let Some(call) = first.tool_call.clone() else {
            debug!(%turn_id, phase = %TurnPhase::Done, "Turn phase");
            return Ok(first);
        };

        debug!(%turn_id, phase = %TurnPhase::Dispatching, tool = %call.name, "Turn phase");
        let result = self.catalog.dispatch(&call).await;
        if result.is_error() {
            warn!(%turn_id, tool = %call.name, "Tool dispatch reported an error result");
        }
        self.memory.record(
            Role::Assistant,
            format!("Tool result ({}): {}", call.name, result.render()),
        );

        // Rebuild with no new user message: the folded tool result is the
        // latest visible turn.
        let messages = context::build_context(&system, self.memory.window(), None);
        let mut last = self.complete_and_parse(turn_id, 2, messages).await?;

        if let Some(nested) = last.tool_call.take() {
            warn!(
                %turn_id,
                tool = %nested.name,
                "Discarding tool call from post-dispatch completion — one dispatch per turn"
            );
        }
        self.memory.record(Role::Assistant, &last.response);

        debug!(%turn_id, phase = %TurnPhase::Done, "Turn phase");
        Ok(last)
    }

    async fn complete_and_parse(
        &self,
        turn_id: Uuid,
        attempt: u8,
        messages: Vec<Turn>,
    ) -> Result<Envelope> {
        debug!(%turn_id, phase = %TurnPhase::AwaitingCompletion(attempt), "Turn phase");
        let completion = self
            .provider
            .complete(CompletionRequest {
                model: self.model.clone(),
                messages,
                max_tokens: self.max_tokens,
                temperature: self.temperature,
            })
            .await?;

        let envelope = parser::parse(&completion.text);
        debug!(
            %turn_id,
            phase = %TurnPhase::Parsed(attempt),
            tool_call = envelope.tool_call.is_some(),
            "Turn phase"
        );
        Ok(envelope)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use roundtrip_core::error::{CompletionError, ToolError};
    use roundtrip_core::provider::Completion;
    use roundtrip_core::tool::Tool;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// A provider that pops scripted responses and counts calls.
    struct ScriptedProvider {
        responses: Mutex<Vec<String>>,
        calls: AtomicUsize,
    }

    impl ScriptedProvider {
        fn new(responses: Vec<&str>) -> Self {
            // Stored reversed so pop() yields them in order.
            let mut responses: Vec<String> = responses.into_iter().map(String::from).collect();
            responses.reverse();
            Self {
                responses: Mutex::new(responses),
                calls: AtomicUsize::new(0),
            }
        }

        fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait::async_trait]
    impl Provider for ScriptedProvider {
        fn name(&self) -> &str {
            "scripted"
        }

        async fn complete(
            &self,
            _request: CompletionRequest,
        ) -> std::result::Result<Completion, CompletionError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let text = self
                .responses
                .lock()
                .unwrap()
                .pop()
                .expect("script exhausted");
            Ok(Completion {
                text,
                model: "scripted-model".into(),
                usage: None,
            })
        }
    }

    /// A provider that always fails at the transport level.
    struct FailingProvider;

    #[async_trait::async_trait]
    impl Provider for FailingProvider {
        fn name(&self) -> &str {
            "failing"
        }

        async fn complete(
            &self,
            _request: CompletionRequest,
        ) -> std::result::Result<Completion, CompletionError> {
            Err(CompletionError::Network("connection refused".into()))
        }
    }

    /// A weather stub that counts dispatches.
    struct CountingWeatherTool {
        dispatches: Arc<AtomicUsize>,
    }

    #[async_trait::async_trait]
    impl Tool for CountingWeatherTool {
        fn name(&self) -> &str {
            "get_weather"
        }
        fn description(&self) -> &str {
            "Current weather for a city"
        }
        fn parameters_schema(&self) -> serde_json::Value {
            serde_json::json!({
                "type": "object",
                "properties": {"city": {"type": "string"}},
                "required": ["city"]
            })
        }
        async fn execute(
            &self,
            arguments: serde_json::Value,
        ) -> std::result::Result<serde_json::Value, ToolError> {
            self.dispatches.fetch_add(1, Ordering::SeqCst);
            let city = arguments["city"].as_str().unwrap_or("somewhere");
            Ok(serde_json::json!(format!("{city}: sunny, 20°C")))
        }
    }

    fn plain_envelope(text: &str) -> String {
        format!("```json\n{{\"response\": \"{text}\", \"tool_call\": null}}\n```")
    }

    fn weather_call_envelope() -> String {
        concat!(
            "```json\n",
            "{\"response\": \"I'll check that for you\", \"tool_call\": ",
            "{\"name\": \"get_weather\", \"parameters\": {\"city\": \"Rome\"}}}\n",
            "```"
        )
        .to_string()
    }

    fn catalog_with_counter(dispatches: Arc<AtomicUsize>) -> ToolCatalog {
        let mut catalog = ToolCatalog::new();
        catalog.register(Box::new(CountingWeatherTool { dispatches }));
        catalog
    }

    #[tokio::test]
    async fn text_only_turn_uses_one_completion() {
        let provider = Arc::new(ScriptedProvider::new(vec![&plain_envelope(
            "Hello! How can I help?",
        )]));
        let mut agent = Agent::new(
            provider.clone(),
            ToolCatalog::new(),
            "scripted-model",
        );

        let envelope = agent.chat("Hello!").await.unwrap();
        assert_eq!(envelope.response, "Hello! How can I help?");
        assert!(envelope.tool_call.is_none());
        assert_eq!(provider.call_count(), 1);

        // User turn then assistant turn, in order.
        let window = agent.memory().window();
        assert_eq!(window.len(), 2);
        assert_eq!(window[0].role, Role::User);
        assert_eq!(window[1].content, "Hello! How can I help?");
    }

    #[tokio::test]
    async fn tool_turn_uses_two_completions_and_one_dispatch() {
        let dispatches = Arc::new(AtomicUsize::new(0));
        let provider = Arc::new(ScriptedProvider::new(vec![
            &weather_call_envelope(),
            &plain_envelope("It's sunny and 20°C in Rome."),
        ]));
        let mut agent = Agent::new(
            provider.clone(),
            catalog_with_counter(dispatches.clone()),
            "scripted-model",
        );

        let envelope = agent.chat("What's the weather in Rome?").await.unwrap();
        assert_eq!(envelope.response, "It's sunny and 20°C in Rome.");
        assert!(envelope.tool_call.is_none());

        assert_eq!(provider.call_count(), 2);
        assert_eq!(dispatches.load(Ordering::SeqCst), 1);

        // user, first response, folded tool result, final response.
        let window = agent.memory().window();
        assert_eq!(window.len(), 4);
        assert!(window[2].content.starts_with("Tool result (get_weather):"));
        assert!(window[2].content.contains("Rome"));
    }

    #[tokio::test]
    async fn nested_tool_call_in_second_envelope_is_discarded() {
        let dispatches = Arc::new(AtomicUsize::new(0));
        let provider = Arc::new(ScriptedProvider::new(vec![
            &weather_call_envelope(),
            &weather_call_envelope(), // the model asks again — ignored
        ]));
        let mut agent = Agent::new(
            provider.clone(),
            catalog_with_counter(dispatches.clone()),
            "scripted-model",
        );

        let envelope = agent.chat("What's the weather in Rome?").await.unwrap();
        assert!(envelope.tool_call.is_none());
        assert_eq!(dispatches.load(Ordering::SeqCst), 1);
        assert_eq!(provider.call_count(), 2);
    }

    #[tokio::test]
    async fn unknown_tool_folds_error_and_still_finishes() {
        // No tools registered — dispatch yields an error result, the turn
        // still completes with a second completion.
        let provider = Arc::new(ScriptedProvider::new(vec![
            &weather_call_envelope(),
            &plain_envelope("I couldn't reach the weather tool."),
        ]));
        let mut agent = Agent::new(provider.clone(), ToolCatalog::new(), "scripted-model");

        let envelope = agent.chat("Weather in Rome?").await.unwrap();
        assert_eq!(envelope.response, "I couldn't reach the weather tool.");

        let window = agent.memory().window();
        assert!(window[2]
            .content
            .contains("error: tool 'get_weather' not found"));
    }

    #[tokio::test]
    async fn failed_completion_leaves_memory_untouched() {
        let mut agent = Agent::new(Arc::new(FailingProvider), ToolCatalog::new(), "m");

        let result = agent.chat("Hello!").await;
        assert!(result.is_err());
        assert!(agent.memory().is_empty());
    }

    #[tokio::test]
    async fn plain_text_reply_falls_back_without_failing_the_turn() {
        let provider = Arc::new(ScriptedProvider::new(vec!["Sorry, plain text today."]));
        let mut agent = Agent::new(provider, ToolCatalog::new(), "scripted-model");

        let envelope = agent.chat("Hi").await.unwrap();
        assert_eq!(envelope.response, "Sorry, plain text today.");
        assert!(envelope.tool_call.is_none());
    }

    #[tokio::test]
    async fn memory_window_feeds_later_turns() {
        let provider = Arc::new(ScriptedProvider::new(vec![
            &plain_envelope("Nice to meet you, Ada!"),
            &plain_envelope("Your name is Ada."),
        ]));
        let mut agent = Agent::new(provider, ToolCatalog::new(), "scripted-model");

        agent.chat("My name is Ada").await.unwrap();
        agent.chat("What's my name?").await.unwrap();

        let window = agent.memory().window();
        assert_eq!(window.len(), 4);
        assert_eq!(window[0].content, "My name is Ada");
        assert_eq!(window[3].content, "Your name is Ada.");
    }
}
