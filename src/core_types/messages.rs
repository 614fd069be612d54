//! Conversation message model for cache annotation
//!
//! Messages arrive from the host runtime as loosely shaped JSON: the role may be
//! carried by a `type` field, a `role` field, or implied by `tool_calls`, and the
//! content may be a string, a single block object, or a list of blocks. This module
//! normalizes the role into [`MessageRole`] while keeping every host field intact,
//! so a message serializes back exactly as it came in apart from its content.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Normalized message roles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    System,
    User,
    Assistant,
    Tool,
    /// Any tag the normalizer does not recognize
    Other,
}

impl MessageRole {
    /// Map a host role/type tag onto a normalized role.
    ///
    /// Accepts provider tags (`system`, `user`, ...) as well as the class-style
    /// names agent frameworks emit (`SystemMessage`, `HumanMessage`, ...).
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "system" | "SystemMessage" => MessageRole::System,
            "tool" | "ToolMessage" | "function" | "FunctionMessage" => MessageRole::Tool,
            "user" | "human" | "HumanMessage" => MessageRole::User,
            "assistant" | "ai" | "AIMessage" => MessageRole::Assistant,
            _ => MessageRole::Other,
        }
    }

    /// Tag written for messages built in Rust; `None` for [`MessageRole::Other`].
    pub fn as_tag(&self) -> Option<&'static str> {
        match self {
            MessageRole::System => Some("system"),
            MessageRole::User => Some("user"),
            MessageRole::Assistant => Some("assistant"),
            MessageRole::Tool => Some("tool"),
            MessageRole::Other => None,
        }
    }
}

impl std::fmt::Display for MessageRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_tag().unwrap_or("other"))
    }
}

/// Cache type for prompt caching
///
/// Controls the time-to-live (TTL) written into emitted markers.
///
/// # Pricing Model
/// - **Ephemeral writes**: 1.25x base input token cost
/// - **Extended writes**: 2x base input token cost
/// - **Cache reads (both)**: 0.1x base input token cost
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum CacheType {
    /// Ephemeral cache (5-minute TTL)
    #[default]
    Ephemeral,

    /// Extended cache (1-hour TTL)
    Extended,
}

impl CacheType {
    /// TTL string understood by the provider
    pub fn ttl(&self) -> &'static str {
        match self {
            CacheType::Ephemeral => "5m",
            CacheType::Extended => "1h",
        }
    }
}

/// Cache breakpoint marker (`cache_control`) attached to a content block
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheControl {
    #[serde(rename = "type", default = "ephemeral_tag")]
    pub cache_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ttl: Option<String>,
}

fn ephemeral_tag() -> String {
    "ephemeral".to_string()
}

impl CacheControl {
    /// Plain `{"type": "ephemeral"}` marker, provider default TTL
    pub fn ephemeral() -> Self {
        Self {
            cache_type: ephemeral_tag(),
            ttl: None,
        }
    }

    /// Marker with an explicit TTL when a cache type is requested
    pub fn for_cache_type(cache_type: Option<CacheType>) -> Self {
        Self {
            cache_type: ephemeral_tag(),
            ttl: cache_type.map(|t| t.ttl().to_string()),
        }
    }
}

impl Default for CacheControl {
    fn default() -> Self {
        Self::ephemeral()
    }
}

/// One structured content block: a `type` discriminator plus arbitrary payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentBlock {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cache_control: Option<CacheControl>,
    /// Every other field of the block, preserved verbatim
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl ContentBlock {
    /// Empty block of the given kind
    pub fn new(kind: impl Into<String>) -> Self {
        let mut fields = Map::new();
        fields.insert("type".to_string(), Value::String(kind.into()));
        Self {
            cache_control: None,
            fields,
        }
    }

    /// `{"type": "text", "text": ...}`
    pub fn text(text: impl Into<String>) -> Self {
        Self::new("text").with_field("text", Value::String(text.into()))
    }

    pub fn with_field(mut self, key: impl Into<String>, value: Value) -> Self {
        self.fields.insert(key.into(), value);
        self
    }

    /// The block's `type` discriminator, if any
    pub fn kind(&self) -> Option<&str> {
        self.fields.get("type").and_then(Value::as_str)
    }

    /// Text payload for text blocks
    pub fn text_value(&self) -> Option<&str> {
        self.fields.get("text").and_then(Value::as_str)
    }

    pub fn has_cache_marker(&self) -> bool {
        self.cache_control.is_some()
    }
}

/// Message content as the provider wire format allows it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MessageContent {
    /// Plain text content
    Text(String),
    /// Ordered list of content blocks
    Blocks(Vec<ContentBlock>),
    /// A single structured block
    Block(ContentBlock),
}

impl MessageContent {
    /// Whether any block of this content carries a cache marker
    pub fn has_cache_marker(&self) -> bool {
        match self {
            MessageContent::Text(_) => false,
            MessageContent::Blocks(blocks) => blocks.iter().any(ContentBlock::has_cache_marker),
            MessageContent::Block(block) => block.has_cache_marker(),
        }
    }

    /// Empty text or an empty block list; a single block is never empty
    pub fn is_empty(&self) -> bool {
        match self {
            MessageContent::Text(text) => text.is_empty(),
            MessageContent::Blocks(blocks) => blocks.is_empty(),
            MessageContent::Block(_) => false,
        }
    }
}

impl From<String> for MessageContent {
    fn from(text: String) -> Self {
        MessageContent::Text(text)
    }
}

impl From<&str> for MessageContent {
    fn from(text: &str) -> Self {
        MessageContent::Text(text.to_string())
    }
}

impl From<Vec<ContentBlock>> for MessageContent {
    fn from(blocks: Vec<ContentBlock>) -> Self {
        MessageContent::Blocks(blocks)
    }
}

impl From<ContentBlock> for MessageContent {
    fn from(block: ContentBlock) -> Self {
        MessageContent::Block(block)
    }
}

/// Wire shape of a message: content plus every other host field
#[derive(Serialize, Deserialize)]
struct RawMessage {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    content: Option<MessageContent>,
    #[serde(flatten)]
    fields: Map<String, Value>,
}

/// One conversation turn
///
/// `role` is derived from the host fields when deserializing and is not
/// serialized on its own; the original `type`/`role` fields round-trip as-is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawMessage", into = "RawMessage")]
pub struct Message {
    /// Normalized role
    pub role: MessageRole,
    /// Message content; `None` when the host sent none or `null`
    pub content: Option<MessageContent>,
    /// Host fields other than `content` (`role`, `type`, `tool_calls`, ...)
    pub fields: Map<String, Value>,
}

impl Message {
    /// Create a message with the given role and content
    pub fn new(role: MessageRole, content: impl Into<MessageContent>) -> Self {
        let mut fields = Map::new();
        if let Some(tag) = role.as_tag() {
            fields.insert("role".to_string(), Value::String(tag.to_string()));
        }
        Self {
            role,
            content: Some(content.into()),
            fields,
        }
    }

    pub fn system(content: impl Into<MessageContent>) -> Self {
        Self::new(MessageRole::System, content)
    }

    pub fn user(content: impl Into<MessageContent>) -> Self {
        Self::new(MessageRole::User, content)
    }

    pub fn assistant(content: impl Into<MessageContent>) -> Self {
        Self::new(MessageRole::Assistant, content)
    }

    pub fn tool(content: impl Into<MessageContent>) -> Self {
        Self::new(MessageRole::Tool, content)
    }

    /// Message with no content at all
    pub fn without_content(role: MessageRole) -> Self {
        let mut message = Self::new(role, "");
        message.content = None;
        message
    }

    /// Attach a `tool_calls` payload (an assistant turn invoking tools)
    pub fn with_tool_calls(mut self, tool_calls: Value) -> Self {
        self.fields.insert("tool_calls".to_string(), tool_calls);
        self
    }

    /// Whether this turn belongs to the tools category: a tool result, or any
    /// message carrying a `tool_calls` field
    ///
    /// Any array or object counts, including the empty `tool_calls: []` agent
    /// frameworks attach to every AI message. `null`, `false`, `0` and `""`
    /// do not.
    pub fn is_tool_related(&self) -> bool {
        if self.role == MessageRole::Tool {
            return true;
        }
        match self.fields.get("tool_calls") {
            None | Some(Value::Null) => false,
            Some(Value::Bool(flag)) => *flag,
            Some(Value::Number(n)) => n.as_f64().is_some_and(|n| n != 0.0),
            Some(Value::String(s)) => !s.is_empty(),
            Some(Value::Array(_) | Value::Object(_)) => true,
        }
    }

    pub fn has_cache_marker(&self) -> bool {
        self.content
            .as_ref()
            .is_some_and(MessageContent::has_cache_marker)
    }
}

/// Role tag from the host fields: a non-empty `type` wins over `role`
fn role_tag(fields: &Map<String, Value>) -> Option<&str> {
    let tag_of = |key: &str| {
        fields
            .get(key)
            .and_then(Value::as_str)
            .filter(|tag| !tag.is_empty())
    };
    tag_of("type").or_else(|| tag_of("role"))
}

impl From<RawMessage> for Message {
    fn from(raw: RawMessage) -> Self {
        let role = role_tag(&raw.fields)
            .map(MessageRole::from_tag)
            .unwrap_or(MessageRole::Other);
        Self {
            role,
            content: raw.content,
            fields: raw.fields,
        }
    }
}

impl From<Message> for RawMessage {
    fn from(message: Message) -> Self {
        let mut fields = message.fields;
        if role_tag(&fields).is_none() {
            if let Some(tag) = message.role.as_tag() {
                fields.insert("role".to_string(), Value::String(tag.to_string()));
            }
        }
        Self {
            content: message.content,
            fields,
        }
    }
}
