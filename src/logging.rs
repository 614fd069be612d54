//! Logging utilities for prompt-cache
//!
//! Re-exports tracing macros with log_* naming convention for consistency,
//! plus the request-logging macro gated by [`CachePolicy::enable_request_logging`].
//!
//! [`CachePolicy::enable_request_logging`]: crate::providers::anthropic::CachePolicy

// Re-export tracing macros with log_* naming
pub use tracing::{
    debug as log_debug,
    error as log_error,
    info as log_info,
    warn as log_warn,
};

/// Target used for all policy-gated request diagnostics.
pub const REQUEST_LOG_TARGET: &str = "prompt_cache::requests";

/// Emit an info-level diagnostic only when the policy asks for request logging.
///
/// Logging never affects annotation; a disabled policy simply skips the event.
#[macro_export]
macro_rules! log_cache_request {
    ($policy:expr, $($arg:tt)+) => {
        if $policy.enable_request_logging {
            ::tracing::info!(target: $crate::logging::REQUEST_LOG_TARGET, $($arg)+);
        }
    };
}
