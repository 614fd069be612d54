//! Core types shared by the annotator and the transport seam
//!
//! ## Organization
//! - `messages` - Conversation message model with role normalization
//! - `provider` - Request types, token usage and the `MessageTransport` trait

pub mod messages;
pub mod provider;

// Re-export commonly used types
pub use messages::{
    CacheControl, CacheType, ContentBlock, Message, MessageContent, MessageRole,
};
pub use provider::{MessageTransport, MessagesRequest, RequestParams, ThinkingParam, TokenUsage};

/// Result type alias at the transport boundary
pub type Result<T> = std::result::Result<T, anyhow::Error>;
