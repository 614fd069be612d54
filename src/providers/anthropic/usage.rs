//! Cache-aware token usage extraction
//!
//! Depending on which client produced it, an LLM result reports usage in up to
//! three places: `usage_metadata`, the raw Anthropic `usage` object, or a
//! LangChain-style `tokenUsage`. Each counter is read from the first source that
//! reports a non-zero value, in that order.

use crate::core_types::provider::TokenUsage;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Share of input cost saved on every cache-read token
const CACHE_READ_SAVINGS: f64 = 0.9;

/// Where `input_tokens` was found
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UsageSource {
    UsageMetadata,
    AnthropicUsage,
    LangchainUsage,
    Unknown,
}

/// Cache outcome of a single request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CacheStatus {
    /// The request wrote a new cache entry
    Created,
    /// The request read from an existing cache entry
    Hit,
    /// No cache activity
    None,
}

impl std::fmt::Display for CacheStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CacheStatus::Created => write!(f, "cache created"),
            CacheStatus::Hit => write!(f, "cache hit"),
            CacheStatus::None => write!(f, "no cache"),
        }
    }
}

/// Token counts of one request, including prompt-cache activity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct CacheUsage {
    pub input_tokens: u64,
    pub output_tokens: u64,
    pub cache_creation_input_tokens: u64,
    pub cache_read_input_tokens: u64,
}

impl CacheUsage {
    /// Extract usage from an LLM output or raw response body
    ///
    /// Missing sources and non-numeric values count as zero.
    pub fn from_llm_output(output: &Value) -> Self {
        let metadata = output.get("usage_metadata");
        let anthropic = output.get("usage");
        let langchain = output.get("tokenUsage");

        Self {
            input_tokens: first_nonzero(&[
                counter(metadata, &["input_tokens"]),
                counter(anthropic, &["input_tokens"]),
                counter(langchain, &["promptTokens"]),
            ]),
            output_tokens: first_nonzero(&[
                counter(metadata, &["output_tokens"]),
                counter(anthropic, &["output_tokens"]),
                counter(langchain, &["completionTokens"]),
            ]),
            cache_creation_input_tokens: first_nonzero(&[
                counter(metadata, &["cache_creation_input_tokens"]),
                counter(anthropic, &["cache_creation_input_tokens"]),
                counter(anthropic, &["cache_creation"]),
                counter(metadata, &["input_token_details", "cache_creation"]),
            ]),
            cache_read_input_tokens: first_nonzero(&[
                counter(metadata, &["cache_read_input_tokens"]),
                counter(anthropic, &["cache_read_input_tokens"]),
                counter(anthropic, &["cache_read"]),
                counter(metadata, &["input_token_details", "cache_read"]),
            ]),
        }
    }

    /// Which source reported `input_tokens`
    pub fn data_source(output: &Value) -> UsageSource {
        if counter(output.get("usage_metadata"), &["input_tokens"]) > 0 {
            UsageSource::UsageMetadata
        } else if counter(output.get("usage"), &["input_tokens"]) > 0 {
            UsageSource::AnthropicUsage
        } else if counter(output.get("tokenUsage"), &["promptTokens"]) > 0 {
            UsageSource::LangchainUsage
        } else {
            UsageSource::Unknown
        }
    }

    pub fn status(&self) -> CacheStatus {
        if self.cache_creation_input_tokens > 0 {
            CacheStatus::Created
        } else if self.cache_read_input_tokens > 0 {
            CacheStatus::Hit
        } else {
            CacheStatus::None
        }
    }

    /// Approximate input tokens saved by cache reads
    pub fn estimated_savings(&self) -> u64 {
        (self.cache_read_input_tokens as f64 * CACHE_READ_SAVINGS).round() as u64
    }

    /// Prompt/completion totals as reported to the host; cache tokens excluded
    pub fn token_usage(&self) -> TokenUsage {
        TokenUsage {
            prompt_tokens: self.input_tokens,
            completion_tokens: self.output_tokens,
            total_tokens: self.input_tokens + self.output_tokens,
        }
    }
}

fn counter(source: Option<&Value>, path: &[&str]) -> u64 {
    source
        .and_then(|root| path.iter().try_fold(root, |value, key| value.get(*key)))
        .and_then(Value::as_u64)
        .unwrap_or(0)
}

fn first_nonzero(candidates: &[u64]) -> u64 {
    candidates.iter().copied().find(|&n| n > 0).unwrap_or(0)
}

/// Running totals across the LLM calls of one work item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct UsageSummary {
    pub total_calls: usize,
    pub input_tokens: u64,
    pub output_tokens: u64,
    pub total_tokens: u64,
    pub cache_creation_tokens: u64,
    pub cache_read_tokens: u64,
    pub first_call_at: Option<DateTime<Utc>>,
    pub last_call_at: Option<DateTime<Utc>>,
}

impl UsageSummary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one call, timestamped now
    pub fn record(&mut self, usage: &CacheUsage) {
        self.record_at(usage, Utc::now());
    }

    pub fn record_at(&mut self, usage: &CacheUsage, at: DateTime<Utc>) {
        let tokens = usage.token_usage();
        self.total_calls += 1;
        self.input_tokens += tokens.prompt_tokens;
        self.output_tokens += tokens.completion_tokens;
        self.total_tokens += tokens.total_tokens;
        self.cache_creation_tokens += usage.cache_creation_input_tokens;
        self.cache_read_tokens += usage.cache_read_input_tokens;
        self.first_call_at.get_or_insert(at);
        self.last_call_at = Some(at);
    }
}
