//! Transport seam and request types for the Messages API
//!
//! The network call itself lives outside this crate. Whatever performs it
//! implements [`MessageTransport`] and receives a [`MessagesRequest`] whose
//! messages have already been cache-annotated.

use crate::core_types::messages::Message;
use crate::core_types::Result;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Extended thinking settings for the request body
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ThinkingParam {
    /// Always `"enabled"` when present
    #[serde(rename = "type")]
    pub thinking_type: String,
    /// Tokens the model may spend thinking
    pub budget_tokens: u32,
}

impl ThinkingParam {
    pub fn enabled(budget_tokens: u32) -> Self {
        Self {
            thinking_type: "enabled".to_string(),
            budget_tokens,
        }
    }
}

/// Sampling and thinking parameters for one request
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct RequestParams {
    /// Maximum tokens to generate
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    /// Temperature setting for response randomness (0.0 to 1.0)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    /// Top-k sampling parameter; -1 disables it
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_k: Option<i32>,
    /// Top-p sampling parameter (0.0 to 1.0)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f64>,
    /// Extended thinking; sampling parameters are cleared when set
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thinking: Option<ThinkingParam>,
}

/// Messages API request body handed to the transport
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MessagesRequest {
    pub model: String,
    pub messages: Vec<Message>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tools: Option<Vec<Value>>,
    #[serde(flatten)]
    pub params: RequestParams,
}

impl MessagesRequest {
    pub fn new(model: impl Into<String>, messages: Vec<Message>) -> Self {
        Self {
            model: model.into(),
            messages,
            system: None,
            tools: None,
            params: RequestParams::default(),
        }
    }

    pub fn with_params(mut self, params: RequestParams) -> Self {
        self.params = params;
        self
    }

    /// Number of messages currently carrying a cache marker
    pub fn cache_block_count(&self) -> usize {
        self.messages.iter().filter(|m| m.has_cache_marker()).count()
    }
}

/// Token usage information
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct TokenUsage {
    /// Number of tokens in the prompt
    pub prompt_tokens: u64,
    /// Number of tokens in the completion
    pub completion_tokens: u64,
    /// Total tokens used (prompt + completion)
    pub total_tokens: u64,
}

/// The network layer that actually sends a Messages API request
///
/// Implementations receive requests whose messages are final; they must not
/// add or remove cache markers. The returned value is the raw response body,
/// which is inspected for usage statistics.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait MessageTransport: Send + Sync {
    /// Send one request and return the provider's response body
    async fn create_message(&self, request: MessagesRequest) -> Result<Value>;

    /// Transport name for logging
    fn transport_name(&self) -> &'static str;
}
