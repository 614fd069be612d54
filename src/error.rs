//! Error types for prompt-cache operations.
//!
//! Annotation itself never fails: malformed conversations are passed through
//! untouched. Errors only arise around it, when a chat configuration is
//! invalid or the wrapped transport reports a failure.
//!
//! # Error Handling Example
//!
//! ```rust
//! use prompt_cache::{CacheError, error::ErrorCategory};
//!
//! fn handle_error(err: CacheError) {
//!     if err.is_retryable() {
//!         println!("Retryable error: {}", err);
//!     }
//!
//!     match err.category() {
//!         ErrorCategory::Client => println!("Fix the configuration: {}", err.user_message()),
//!         _ => println!("Provider issue: {}", err.user_message()),
//!     }
//! }
//! ```

use crate::logging::{log_error, log_warn};
use thiserror::Error;

// ============================================================================
// Error categorization types
// ============================================================================

/// High-level categorization of errors for routing and handling decisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// External service failures (the wrapped transport or the provider).
    External,

    /// Internal errors (serialization of annotated messages).
    Internal,

    /// Client errors (invalid configuration or parameters).
    ///
    /// The caller made a mistake that they can fix.
    Client,

    /// Temporary failures that should be retried.
    Transient,
}

/// Severity level for logging and alerting decisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    /// Action failed but system is stable.
    Error,

    /// Unexpected but recoverable situation.
    Warning,
}

// ============================================================================
// Cache adapter error types
// ============================================================================

/// Convenient result type for prompt-cache operations.
pub type CacheResult<T> = std::result::Result<T, CacheError>;

/// Errors that can occur while configuring or transporting a cached request.
///
/// # Error Categories
///
/// | Variant | Category | Retryable |
/// |---------|----------|-----------|
/// | `ConfigurationError` | Client | No |
/// | `InvalidParameter` | Client | No |
/// | `RequestFailed` | External | Yes |
/// | `SerializationFailed` | Internal | No |
#[derive(Error, Debug)]
pub enum CacheError {
    /// Chat model configuration is invalid or incomplete.
    ///
    /// Common causes:
    /// - Missing API key
    /// - Empty base URL or model name
    #[error("Configuration error: {message}")]
    ConfigurationError {
        /// Description of the configuration problem.
        message: String,
    },

    /// A sampling or thinking parameter is out of range.
    #[error("Invalid parameter '{name}': {message}")]
    InvalidParameter {
        /// Parameter name as it appears in the configuration.
        name: String,
        /// Why the value was rejected.
        message: String,
    },

    /// The wrapped transport failed to deliver the request.
    #[error("Request failed: {message}")]
    RequestFailed {
        /// Description of the failure.
        message: String,
        /// The underlying error, if available.
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// An annotated message could not be written back as host JSON.
    #[error("Serialization failed: {message}")]
    SerializationFailed {
        /// Details about the serialization failure.
        message: String,
    },
}

impl CacheError {
    /// Get the error category for routing and handling decisions.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::ConfigurationError { .. } => ErrorCategory::Client,
            Self::InvalidParameter { .. } => ErrorCategory::Client,
            Self::RequestFailed { .. } => ErrorCategory::External,
            Self::SerializationFailed { .. } => ErrorCategory::Internal,
        }
    }

    /// Get the error severity for logging and alerting.
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            Self::ConfigurationError { .. } => ErrorSeverity::Error,
            Self::InvalidParameter { .. } => ErrorSeverity::Warning,
            Self::RequestFailed { .. } => ErrorSeverity::Error,
            Self::SerializationFailed { .. } => ErrorSeverity::Error,
        }
    }

    /// Whether this error is transient and the request may be retried.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::RequestFailed { .. })
    }

    /// Convert to a user-friendly message suitable for display.
    pub fn user_message(&self) -> String {
        match self {
            Self::ConfigurationError { .. } => {
                "AI model configuration issue. Please check your settings".to_string()
            }
            Self::InvalidParameter { name, .. } => {
                format!("The model option '{name}' has an invalid value")
            }
            Self::RequestFailed { .. } => {
                "Unable to communicate with AI service. Please try again".to_string()
            }
            Self::SerializationFailed { .. } => {
                "The request could not be prepared for the AI service".to_string()
            }
        }
    }

    // =========================================================================
    // Constructor methods with automatic logging
    // =========================================================================

    /// Create a configuration error (logs at ERROR level).
    pub fn configuration_error(message: impl Into<String>) -> Self {
        let message = message.into();
        log_error!(
            error_type = "configuration_error",
            message = %message,
            "Chat model configuration validation failed"
        );
        Self::ConfigurationError { message }
    }

    /// Create an invalid parameter error (logs at WARN level).
    pub fn invalid_parameter(name: impl Into<String>, message: impl Into<String>) -> Self {
        let name = name.into();
        let message = message.into();
        log_warn!(
            error_type = "invalid_parameter",
            parameter = %name,
            message = %message,
            "Chat model parameter rejected"
        );
        Self::InvalidParameter { name, message }
    }

    pub fn request_failed(
        message: impl Into<String>,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        let message = message.into();
        log_error!(
            error_type = "request_failed",
            message = %message,
            has_source = source.is_some(),
            "Cached request transport failed"
        );
        Self::RequestFailed { message, source }
    }

    pub fn serialization_failed(message: impl Into<String>) -> Self {
        let message = message.into();
        log_error!(
            error_type = "serialization_failed",
            message = %message,
            "Request body serialization failed"
        );
        Self::SerializationFailed { message }
    }
}

impl From<serde_json::Error> for CacheError {
    fn from(err: serde_json::Error) -> Self {
        Self::serialization_failed(err.to_string())
    }
}
