//! Anthropic chat model configuration
//!
//! Collects the options a host node exposes for the chat model (model name,
//! sampling, extended thinking, prompt caching) and turns them into request
//! parameters and a [`CachingTransport`].

use crate::core_types::messages::Message;
use crate::core_types::provider::{MessageTransport, MessagesRequest, RequestParams, ThinkingParam};
use crate::error::{CacheError, CacheResult};
use crate::logging::log_debug;
use crate::providers::anthropic::{CachePolicy, CachingTransport};
use serde::{Deserialize, Serialize};

/// Default Anthropic API endpoint
pub const DEFAULT_BASE_URL: &str = "https://api.anthropic.com";

/// Model used when none is configured
pub const DEFAULT_MODEL: &str = "claude-3-5-sonnet-20240620";

/// The provider requires `max_tokens`; used when the config leaves it unset
pub const DEFAULT_MAX_TOKENS: u32 = 4096;

/// Smallest thinking budget the provider accepts
pub const MIN_THINKING_BUDGET: u32 = 1024;

/// Anthropic chat model configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnthropicChatConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
    pub max_tokens: Option<u32>,
    pub temperature: Option<f64>,
    /// -1 disables top-k sampling
    pub top_k: Option<i32>,
    pub top_p: Option<f64>,
    /// Enable extended thinking; sampling parameters are dropped when set
    pub thinking: bool,
    pub thinking_budget: Option<u32>,
    pub prompt_caching: CachePolicy,
}

impl Default for AnthropicChatConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            max_tokens: None,
            temperature: None,
            top_k: None,
            top_p: None,
            thinking: false,
            thinking_budget: None,
            prompt_caching: CachePolicy::default(),
        }
    }
}

impl AnthropicChatConfig {
    /// Validate the configuration is complete and in range
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::ConfigurationError`] if the API key, base URL or
    /// model is missing, and [`CacheError::InvalidParameter`] if a sampling or
    /// thinking parameter is out of range.
    pub fn validate(&self) -> CacheResult<()> {
        if self.api_key.as_deref().map_or(true, str::is_empty) {
            return Err(CacheError::configuration_error(
                "Anthropic API key is required",
            ));
        }
        if self.base_url.is_empty() {
            return Err(CacheError::configuration_error("Base URL is required"));
        }
        if self.model.is_empty() {
            return Err(CacheError::configuration_error("Model name is required"));
        }

        if self.thinking {
            let budget = self.effective_thinking_budget();
            if budget < MIN_THINKING_BUDGET {
                return Err(CacheError::invalid_parameter(
                    "thinking_budget",
                    format!("must be at least {MIN_THINKING_BUDGET}, got {budget}"),
                ));
            }
            let max_tokens = self.effective_max_tokens();
            if max_tokens <= budget {
                return Err(CacheError::invalid_parameter(
                    "max_tokens",
                    format!("must exceed the thinking budget ({max_tokens} <= {budget})"),
                ));
            }
        } else {
            check_unit_range("temperature", self.temperature)?;
            check_unit_range("top_p", self.top_p)?;
        }

        Ok(())
    }

    /// Request parameters for this configuration
    ///
    /// With thinking enabled, temperature, top-k and top-p are left unset.
    pub fn request_params(&self) -> RequestParams {
        let max_tokens = Some(self.effective_max_tokens());
        if self.thinking {
            return RequestParams {
                max_tokens,
                thinking: Some(ThinkingParam::enabled(self.effective_thinking_budget())),
                ..RequestParams::default()
            };
        }

        RequestParams {
            max_tokens,
            temperature: self.temperature,
            top_k: self.top_k.filter(|k| *k >= 0),
            top_p: self.top_p,
            thinking: None,
        }
    }

    /// Request body for a conversation, not yet annotated
    pub fn build_request(&self, messages: Vec<Message>) -> MessagesRequest {
        MessagesRequest::new(self.model.clone(), messages).with_params(self.request_params())
    }

    /// Wrap a transport so every request goes out with this config's cache policy
    pub fn caching_transport<T: MessageTransport>(&self, inner: T) -> CachingTransport<T> {
        CachingTransport::new(inner, self.prompt_caching.clone())
    }

    fn effective_max_tokens(&self) -> u32 {
        self.max_tokens.unwrap_or(DEFAULT_MAX_TOKENS)
    }

    fn effective_thinking_budget(&self) -> u32 {
        self.thinking_budget.unwrap_or(MIN_THINKING_BUDGET)
    }

    /// Load configuration from environment variables
    ///
    /// Reads `ANTHROPIC_API_KEY`, `ANTHROPIC_BASE_URL`, `ANTHROPIC_MODEL`,
    /// `ANTHROPIC_MAX_TOKENS`, `ANTHROPIC_THINKING_BUDGET` (enables thinking) and
    /// the cache flags `ANTHROPIC_CACHE_SYSTEM`, `ANTHROPIC_CACHE_TOOLS`,
    /// `ANTHROPIC_CACHE_MESSAGES`, `ANTHROPIC_CACHE_LOGGING`.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::InvalidParameter`] for unparseable numbers, and any
    /// error from [`validate`](Self::validate).
    pub fn from_env() -> CacheResult<Self> {
        let mut config = Self::default();

        if let Ok(api_key) = std::env::var("ANTHROPIC_API_KEY") {
            config.api_key = Some(api_key);
        }
        if let Ok(base_url) = std::env::var("ANTHROPIC_BASE_URL") {
            config.base_url = base_url;
        }
        if let Ok(model) = std::env::var("ANTHROPIC_MODEL") {
            config.model = model;
        }
        if let Some(max_tokens) = env_number("ANTHROPIC_MAX_TOKENS")? {
            config.max_tokens = Some(max_tokens);
        }
        if let Some(budget) = env_number("ANTHROPIC_THINKING_BUDGET")? {
            config.thinking = true;
            config.thinking_budget = Some(budget);
        }

        let caching = &mut config.prompt_caching;
        caching.cache_system_message = env_flag("ANTHROPIC_CACHE_SYSTEM");
        caching.cache_tools = env_flag("ANTHROPIC_CACHE_TOOLS");
        caching.cache_messages = env_flag("ANTHROPIC_CACHE_MESSAGES");
        caching.enable_request_logging = env_flag("ANTHROPIC_CACHE_LOGGING");

        config.validate()?;

        log_debug!(
            model = %config.model,
            base_url = %config.base_url,
            thinking = config.thinking,
            cache_config = ?config.prompt_caching,
            "Anthropic chat model configuration loaded"
        );

        Ok(config)
    }
}

fn check_unit_range(name: &str, value: Option<f64>) -> CacheResult<()> {
    match value {
        Some(v) if !(0.0..=1.0).contains(&v) => Err(CacheError::invalid_parameter(
            name,
            format!("must be between 0 and 1, got {v}"),
        )),
        _ => Ok(()),
    }
}

fn env_flag(key: &str) -> bool {
    std::env::var(key)
        .map(|v| matches!(v.trim().to_lowercase().as_str(), "1" | "true" | "yes" | "on"))
        .unwrap_or(false)
}

fn env_number(key: &str) -> CacheResult<Option<u32>> {
    match std::env::var(key) {
        Ok(raw) => raw.trim().parse::<u32>().map(Some).map_err(|e| {
            CacheError::invalid_parameter(key, format!("'{raw}' is not a number: {e}"))
        }),
        Err(_) => Ok(None),
    }
}
