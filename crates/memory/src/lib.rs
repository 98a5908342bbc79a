//! Conversation memory — a bounded-visibility, append-only log of turns.
//!
//! Every turn of a conversation is retained for the life of the process; only
//! the *visible window* (the most recent N turns) is surfaced to the context
//! builder. Storage growth is therefore unbounded even though the context
//! stays bounded — windowing, not eviction.
//!
//! A single instance belongs to a single conversation and is mutated through
//! `&mut self`; the caller serializes turns, so there is no internal locking.
//! Independent conversations hold independent instances and share nothing.

use roundtrip_core::turn::{Role, Turn};
use tracing::trace;

/// Default number of turns surfaced to the context builder.
pub const DEFAULT_WINDOW: usize = 10;

/// Append-only conversation log with a recency window.
#[derive(Debug, Clone)]
pub struct ConversationMemory {
    turns: Vec<Turn>,
    window: usize,
}

impl ConversationMemory {
    /// Create a memory with the given visible window size.
    pub fn new(window: usize) -> Self {
        Self {
            turns: Vec::new(),
            window,
        }
    }

    /// Append a turn. Never fails, never reorders, never truncates the log.
    pub fn record(&mut self, role: Role, content: impl Into<String>) {
        let turn = Turn {
            role,
            content: content.into(),
        };
        trace!(role = %turn.role, "Recording turn");
        self.turns.push(turn);
    }

    /// The most recent turns, in arrival order — at most `window` of them,
    /// all of them if fewer exist.
    pub fn window(&self) -> &[Turn] {
        let start = self.turns.len().saturating_sub(self.window);
        &self.turns[start..]
    }

    /// Total turns retained (including those outside the window).
    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }
}

impl Default for ConversationMemory {
    fn default() -> Self {
        Self::new(DEFAULT_WINDOW)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_appends_in_order() {
        let mut memory = ConversationMemory::default();
        memory.record(Role::User, "first");
        memory.record(Role::Assistant, "second");

        let window = memory.window();
        assert_eq!(window.len(), 2);
        assert_eq!(window[0].content, "first");
        assert_eq!(window[1].content, "second");
    }

    #[test]
    fn window_returns_all_when_under_capacity() {
        let mut memory = ConversationMemory::new(10);
        for i in 0..3 {
            memory.record(Role::User, format!("turn {i}"));
        }
        assert_eq!(memory.window().len(), 3);
    }

    #[test]
    fn window_caps_at_most_recent_n() {
        let mut memory = ConversationMemory::new(10);
        for i in 1..=15 {
            memory.record(Role::User, format!("turn {i}"));
        }

        let window = memory.window();
        assert_eq!(window.len(), 10);
        // Turns 6–15, still in arrival order.
        assert_eq!(window[0].content, "turn 6");
        assert_eq!(window[9].content, "turn 15");
    }

    #[test]
    fn backing_log_is_never_truncated() {
        let mut memory = ConversationMemory::new(2);
        for i in 0..50 {
            memory.record(Role::Assistant, format!("turn {i}"));
        }
        assert_eq!(memory.len(), 50);
        assert_eq!(memory.window().len(), 2);
    }

    #[test]
    fn empty_memory_has_empty_window() {
        let memory = ConversationMemory::default();
        assert!(memory.is_empty());
        assert!(memory.window().is_empty());
    }
}
