//! Prompt cache breakpoint annotation
//!
//! Anthropic accepts at most four `cache_control` breakpoints per request. Given a
//! conversation and a [`CachePolicy`], [`CacheAnnotator`] clears every marker that is
//! already present and then places fresh ones, in a fixed priority order:
//!
//! 1. the most recent system message
//! 2. the most recent tool-related message
//! 3. the last message, then the message three from the end
//!
//! Each position is selected at most once and selection stops at
//! [`CachePolicy::max_markers`]. Clearing first makes the pass idempotent.

use crate::core_types::messages::{
    CacheControl, CacheType, ContentBlock, Message, MessageContent, MessageRole,
};
use crate::error::CacheResult;
use crate::log_cache_request;
use crate::logging::log_debug;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Provider limit on cache breakpoints per request
pub const MAX_CACHE_MARKERS: usize = 4;

/// Distance from the end of the conversation of the second tail breakpoint
const TAIL_LOOKBACK: usize = 3;

/// Which categories of message receive cache breakpoints
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CachePolicy {
    /// Annotate the most recent system message
    pub cache_system_message: bool,
    /// Annotate the most recent tool-related message
    pub cache_tools: bool,
    /// Annotate the conversation tail (last, and third from last)
    pub cache_messages: bool,
    /// Log annotation and usage diagnostics
    pub enable_request_logging: bool,
    /// Hard limit on breakpoints
    pub max_markers: usize,
    /// Optional TTL for emitted markers; provider default when `None`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cache_type: Option<CacheType>,
}

impl Default for CachePolicy {
    fn default() -> Self {
        Self {
            cache_system_message: false,
            cache_tools: false,
            cache_messages: false,
            enable_request_logging: false,
            max_markers: MAX_CACHE_MARKERS,
            cache_type: None,
        }
    }
}

impl CachePolicy {
    /// Policy with every category enabled
    pub fn all() -> Self {
        Self {
            cache_system_message: true,
            cache_tools: true,
            cache_messages: true,
            ..Self::default()
        }
    }

    /// Whether any category is enabled
    pub fn is_enabled(&self) -> bool {
        self.cache_system_message || self.cache_tools || self.cache_messages
    }

    pub fn with_request_logging(mut self, enabled: bool) -> Self {
        self.enable_request_logging = enabled;
        self
    }

    pub fn with_cache_type(mut self, cache_type: CacheType) -> Self {
        self.cache_type = Some(cache_type);
        self
    }
}

/// Outcome of one annotation pass
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AnnotationReport {
    /// Selected positions, in selection order
    pub targets: Vec<usize>,
    /// Markers actually placed
    pub applied: usize,
    /// Markers removed during the clear phase
    pub cleared: usize,
    /// Limit in force for this pass
    pub max_markers: usize,
}

/// Places cache breakpoints on a conversation according to a [`CachePolicy`]
#[derive(Debug, Clone)]
pub struct CacheAnnotator {
    policy: CachePolicy,
    marker: CacheControl,
}

impl CacheAnnotator {
    pub fn new(policy: CachePolicy) -> Self {
        let marker = CacheControl::for_cache_type(policy.cache_type);
        Self { policy, marker }
    }

    pub fn policy(&self) -> &CachePolicy {
        &self.policy
    }

    /// Clear existing markers and place new ones in place
    pub fn annotate(&self, messages: &mut [Message]) -> AnnotationReport {
        let cleared = clear_cache_markers(messages);
        let targets = self.select_targets(messages);

        let mut applied = 0;
        for &index in &targets {
            if applied >= self.policy.max_markers {
                break;
            }
            if place_marker(&mut messages[index], &self.marker) {
                applied += 1;
            } else {
                log_debug!(
                    provider = "anthropic",
                    msg_index = index,
                    "Cache target has no content to mark"
                );
            }
        }

        log_cache_request!(
            self.policy,
            applied = applied,
            max_markers = self.policy.max_markers,
            cleared = cleared,
            targets = ?targets,
            "Final cache control applied"
        );

        AnnotationReport {
            targets,
            applied,
            cleared,
            max_markers: self.policy.max_markers,
        }
    }

    /// Choose breakpoint positions in priority order without touching content
    pub fn select_targets(&self, messages: &[Message]) -> Vec<usize> {
        let limit = self.policy.max_markers;
        let mut targets: Vec<usize> = Vec::with_capacity(limit.min(MAX_CACHE_MARKERS));

        if self.policy.cache_system_message && targets.len() < limit {
            if let Some(index) = messages
                .iter()
                .rposition(|m| m.role == MessageRole::System)
            {
                targets.push(index);
            }
        }

        if self.policy.cache_tools && targets.len() < limit {
            if let Some(index) = (0..messages.len())
                .rev()
                .find(|&i| messages[i].is_tool_related() && !targets.contains(&i))
            {
                targets.push(index);
            }
        }

        if self.policy.cache_messages && !messages.is_empty() {
            let last = messages.len() - 1;
            if targets.len() < limit && !targets.contains(&last) {
                targets.push(last);
            }
            if targets.len() < limit && messages.len() >= TAIL_LOOKBACK {
                let lookback = messages.len() - TAIL_LOOKBACK;
                if !targets.contains(&lookback) {
                    targets.push(lookback);
                }
            }
        }

        targets
    }
}

/// Annotate an owned conversation and return it
///
/// Convenience over [`CacheAnnotator::annotate`] for callers that hold the
/// conversation by value. Keep a deep copy beforehand if the unannotated
/// conversation is still needed, e.g. for a retry.
pub fn annotate(mut messages: Vec<Message>, policy: &CachePolicy) -> Vec<Message> {
    CacheAnnotator::new(policy.clone()).annotate(&mut messages);
    messages
}

/// Annotate host JSON: either a message array or a request body with `messages`
///
/// Returns `None` and leaves `value` untouched when there is no policy or no
/// message array is found. Entries that do not deserialize as a [`Message`]
/// keep their position as an unmarkable message of role
/// [`MessageRole::Other`]; their stale markers are still removed.
pub fn annotate_value(
    value: &mut Value,
    policy: Option<&CachePolicy>,
) -> Option<AnnotationReport> {
    let policy = policy?;
    let slot = if value.is_array() {
        value
    } else {
        value.get_mut("messages").filter(|m| m.is_array())?
    };
    let entries = slot.as_array_mut()?;

    let mut raw_cleared = 0;
    let mut parsed = Vec::with_capacity(entries.len());
    let mut messages = Vec::with_capacity(entries.len());
    for (index, entry) in entries.iter_mut().enumerate() {
        match serde_json::from_value::<Message>(entry.clone()) {
            Ok(message) => {
                parsed.push(true);
                messages.push(message);
            }
            Err(e) => {
                log_debug!(
                    provider = "anthropic",
                    msg_index = index,
                    error = %e,
                    "Message not in a recognized shape, treating it as unmarkable"
                );
                raw_cleared += strip_raw_markers(entry);
                parsed.push(false);
                messages.push(Message::without_content(MessageRole::Other));
            }
        }
    }

    let mut report = CacheAnnotator::new(policy.clone()).annotate(&mut messages);
    report.cleared += raw_cleared;

    for ((entry, message), ok) in entries.iter_mut().zip(&messages).zip(parsed) {
        if !ok {
            continue;
        }
        if let Err(e) = write_back(entry, message) {
            log_debug!(
                provider = "anthropic",
                error = %e,
                "Annotated message failed to serialize, keeping it unmarked"
            );
            strip_raw_markers(entry);
            if message.has_cache_marker() {
                report.applied = report.applied.saturating_sub(1);
            }
        }
    }

    Some(report)
}

fn write_back(entry: &mut Value, message: &Message) -> CacheResult<()> {
    *entry = serde_json::to_value(message)?;
    Ok(())
}

/// Remove `cache_control` from the content of a raw message entry
fn strip_raw_markers(entry: &mut Value) -> usize {
    let strip = |block: &mut Value| -> usize {
        block
            .as_object_mut()
            .and_then(|object| object.remove("cache_control"))
            .map_or(0, |_| 1)
    };
    match entry.get_mut("content") {
        Some(Value::Array(blocks)) => blocks.iter_mut().map(strip).sum(),
        Some(block) => strip(block),
        None => 0,
    }
}

/// Number of messages carrying at least one cache marker
pub fn count_cache_markers(messages: &[Message]) -> usize {
    messages.iter().filter(|m| m.has_cache_marker()).count()
}

/// Remove every marker from every message; returns how many were removed
fn clear_cache_markers(messages: &mut [Message]) -> usize {
    let mut cleared = 0;
    for content in messages.iter_mut().filter_map(|m| m.content.as_mut()) {
        match content {
            MessageContent::Text(_) => {}
            MessageContent::Blocks(blocks) => {
                for block in blocks.iter_mut() {
                    if block.cache_control.take().is_some() {
                        cleared += 1;
                    }
                }
            }
            MessageContent::Block(block) => {
                if block.cache_control.take().is_some() {
                    cleared += 1;
                }
            }
        }
    }
    cleared
}

/// Put `marker` on a message; false when there is nothing to attach it to
fn place_marker(message: &mut Message, marker: &CacheControl) -> bool {
    let Some(content) = message.content.as_mut() else {
        return false;
    };

    match content {
        MessageContent::Blocks(blocks) => match blocks.last_mut() {
            Some(last) => {
                last.cache_control = Some(marker.clone());
                true
            }
            None => false,
        },
        MessageContent::Text(text) if text.is_empty() => false,
        MessageContent::Text(text) => {
            let mut block = ContentBlock::text(std::mem::take(text));
            block.cache_control = Some(marker.clone());
            *content = MessageContent::Blocks(vec![block]);
            true
        }
        MessageContent::Block(block) => {
            block.cache_control = Some(marker.clone());
            true
        }
    }
}
