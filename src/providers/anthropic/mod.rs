//! Anthropic prompt caching
//!
//! ## Module Organization
//!
//! - `caching`: Cache breakpoint selection and placement
//! - `usage`: Cache-aware token usage extraction
//! - `transport`: Annotate-then-forward transport wrapper

mod caching;
mod transport;
mod usage;

#[cfg(test)]
mod tests;

pub use caching::{
    annotate, annotate_value, count_cache_markers, AnnotationReport, CacheAnnotator, CachePolicy,
    MAX_CACHE_MARKERS,
};
pub use transport::{CachedResponse, CachingTransport};
pub use usage::{CacheStatus, CacheUsage, UsageSource, UsageSummary};
