//! Provider-specific request shaping
//!
//! - **anthropic**: prompt-cache breakpoints, usage accounting and the caching transport

pub mod anthropic;

pub use anthropic::{CacheAnnotator, CachePolicy, CachingTransport};
