//! Test helper utilities for prompt-cache integration tests
//!
//! This module provides reusable conversation fixtures and a recording
//! transport shared across the integration test files.
//!
//! IMPORTANT: These helpers are test-only and should NEVER be used in production code.

// Allow dead code in test utilities - functions are used across different test files
#![allow(dead_code)]

use prompt_cache::{ContentBlock, Message, MessageContent, MessageTransport, MessagesRequest};
use serde_json::{json, Value};
use std::sync::Mutex;

/// Deterministic conversation for a seed
///
/// Cycles through roles, tool invocations and every content shape, so a
/// range of seeds covers short, long, tool-heavy and degenerate inputs.
pub fn generated_conversation(seed: usize) -> Vec<Message> {
    let len = seed % 9;
    (0..len)
        .map(|i| {
            let pick = (seed * 31 + i * 7) % 11;
            let text = format!("turn {i} of conversation {seed}");
            let content: MessageContent = match (seed + i) % 5 {
                0 => MessageContent::Text(text),
                1 => MessageContent::Blocks(vec![
                    ContentBlock::text("prefix"),
                    ContentBlock::text(text),
                ]),
                2 => MessageContent::Block(ContentBlock::text(text)),
                3 if pick % 2 == 0 => MessageContent::Text(String::new()),
                _ => MessageContent::Text(text),
            };
            match pick {
                0 | 1 => Message::system(content),
                2 | 3 => Message::tool(content),
                4 => Message::assistant(content)
                    .with_tool_calls(json!([{"id": format!("call_{i}")}])),
                5 | 6 => Message::assistant(content),
                _ => Message::user(content),
            }
        })
        .collect()
}

/// Concatenated text of a message, independent of content shape
pub fn text_of(message: &Message) -> String {
    match message.content.as_ref() {
        None => String::new(),
        Some(MessageContent::Text(text)) => text.clone(),
        Some(MessageContent::Blocks(blocks)) => blocks
            .iter()
            .filter_map(ContentBlock::text_value)
            .collect::<Vec<_>>()
            .join(""),
        Some(MessageContent::Block(block)) => block.text_value().unwrap_or_default().to_string(),
    }
}

/// Positions of messages that carry a cache marker
pub fn marked_indices(messages: &[Message]) -> Vec<usize> {
    messages
        .iter()
        .enumerate()
        .filter(|(_, m)| m.has_cache_marker())
        .map(|(i, _)| i)
        .collect()
}

/// Anthropic-shaped response body with the given usage numbers
pub fn response_body(input: u64, output: u64, created: u64, read: u64) -> Value {
    json!({
        "id": "msg_test",
        "type": "message",
        "role": "assistant",
        "content": [{"type": "text", "text": "ok"}],
        "usage": {
            "input_tokens": input,
            "output_tokens": output,
            "cache_creation_input_tokens": created,
            "cache_read_input_tokens": read
        }
    })
}

/// Transport that records every request and replays canned bodies in order
pub struct RecordingTransport {
    pub requests: Mutex<Vec<MessagesRequest>>,
    responses: Mutex<Vec<Value>>,
}

impl RecordingTransport {
    pub fn new(mut responses: Vec<Value>) -> Self {
        responses.reverse();
        Self {
            requests: Mutex::new(Vec::new()),
            responses: Mutex::new(responses),
        }
    }

    pub fn recorded(&self) -> Vec<MessagesRequest> {
        self.requests.lock().expect("lock poisoned").clone()
    }
}

#[async_trait::async_trait]
impl MessageTransport for RecordingTransport {
    async fn create_message(&self, request: MessagesRequest) -> anyhow::Result<Value> {
        self.requests.lock().expect("lock poisoned").push(request);
        self.responses
            .lock()
            .expect("lock poisoned")
            .pop()
            .ok_or_else(|| anyhow::anyhow!("no canned response left"))
    }

    fn transport_name(&self) -> &'static str {
        "recording"
    }
}
