//! # prompt-cache
//!
//! Prompt-cache breakpoint annotation and request shaping for Anthropic chat models.
//!
//! ## Key Features
//!
//! - **Cache Annotation**: Places at most four `cache_control` breakpoints on a
//!   conversation, choosing the latest system message, the latest tool turn and
//!   the conversation tail in that priority order
//! - **Idempotent**: Existing markers are always cleared before new ones are placed
//! - **Permissive**: Malformed host input is passed through untouched, never rejected
//! - **Usage Accounting**: Cache creation/read statistics from any usage shape
//! - **Transport Seam**: A single wrapper annotates requests before the network layer
//!
//! ## Example
//!
//! ```rust
//! use prompt_cache::{annotate, CachePolicy, Message};
//!
//! let messages = vec![
//!     Message::system("You are a helpful assistant."),
//!     Message::user("Hello!"),
//! ];
//! let policy = CachePolicy {
//!     cache_system_message: true,
//!     cache_messages: true,
//!     ..CachePolicy::default()
//! };
//!
//! let annotated = annotate(messages, &policy);
//! assert!(annotated.iter().all(|m| m.has_cache_marker()));
//! ```

// Allow missing errors documentation - errors are self-documenting via type signatures
#![allow(clippy::missing_errors_doc)]

pub mod core_types;

// Logging utilities (re-exports tracing with log_* naming)
pub mod logging;

pub mod config;
pub mod error;
pub mod providers;

#[cfg(test)]
pub mod tests;

// Re-export main types
pub use config::AnthropicChatConfig;
pub use error::{CacheError, CacheResult};
pub use providers::anthropic::{
    annotate, annotate_value, count_cache_markers, AnnotationReport, CacheAnnotator,
    CachePolicy, CacheStatus, CacheUsage, CachedResponse, CachingTransport, UsageSummary,
    MAX_CACHE_MARKERS,
};

pub use core_types::{
    CacheControl, CacheType, ContentBlock, Message, MessageContent, MessageRole,
    MessageTransport, MessagesRequest, RequestParams, ThinkingParam, TokenUsage,
};
