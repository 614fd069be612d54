//! Annotate-then-forward wrapper around a [`MessageTransport`]
//!
//! This is the single place cache markers are applied before a request leaves
//! the process. The inner transport only ever sees final, annotated messages.

use super::caching::{AnnotationReport, CacheAnnotator, CachePolicy};
use super::usage::CacheUsage;
use crate::core_types::provider::{MessageTransport, MessagesRequest};
use crate::error::{CacheError, CacheResult};
use crate::log_cache_request;
use crate::logging::log_debug;
use serde_json::Value;
use uuid::Uuid;

/// Response of a cached request together with what was done to it
#[derive(Debug, Clone)]
pub struct CachedResponse {
    /// Correlates the request and usage log lines
    pub run_id: Uuid,
    /// Raw response body from the inner transport
    pub body: Value,
    /// Usage parsed from the body
    pub usage: CacheUsage,
    /// Annotation outcome; `None` when the policy enables no category
    pub annotation: Option<AnnotationReport>,
}

/// Transport wrapper applying a [`CachePolicy`] to every outgoing request
#[derive(Debug)]
pub struct CachingTransport<T> {
    inner: T,
    annotator: CacheAnnotator,
}

impl<T: MessageTransport> CachingTransport<T> {
    pub fn new(inner: T, policy: CachePolicy) -> Self {
        Self {
            inner,
            annotator: CacheAnnotator::new(policy),
        }
    }

    pub fn policy(&self) -> &CachePolicy {
        self.annotator.policy()
    }

    pub fn inner(&self) -> &T {
        &self.inner
    }

    /// Annotate the request (if any category is enabled) and forward it
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::RequestFailed`] when the inner transport fails.
    pub async fn send(&self, mut request: MessagesRequest) -> CacheResult<CachedResponse> {
        let run_id = Uuid::new_v4();
        let policy = self.annotator.policy();

        let annotation = if policy.is_enabled() {
            let report = self.annotator.annotate(&mut request.messages);
            log_debug!(
                provider = "anthropic",
                run_id = %run_id,
                targets = ?report.targets,
                applied = report.applied,
                "Cache breakpoints placed"
            );
            Some(report)
        } else {
            None
        };

        log_cache_request!(
            policy,
            run_id = %run_id,
            transport = self.inner.transport_name(),
            messages = request.messages.len(),
            model = %request.model,
            max_tokens = ?request.params.max_tokens,
            cache_block_count = request.cache_block_count(),
            "Sending Messages API request"
        );

        let body = self.inner.create_message(request).await.map_err(|e| {
            CacheError::request_failed(
                format!("{} transport failed: {e}", self.inner.transport_name()),
                Some(e.into()),
            )
        })?;

        let usage = CacheUsage::from_llm_output(&body);
        log_cache_request!(
            policy,
            run_id = %run_id,
            input_tokens = usage.input_tokens,
            output_tokens = usage.output_tokens,
            cache_creation_tokens = usage.cache_creation_input_tokens,
            cache_read_tokens = usage.cache_read_input_tokens,
            cache_status = %usage.status(),
            estimated_savings = usage.estimated_savings(),
            data_source = ?CacheUsage::data_source(&body),
            "Anthropic token usage"
        );

        Ok(CachedResponse {
            run_id,
            body,
            usage,
            annotation,
        })
    }
}

#[async_trait::async_trait]
impl<T: MessageTransport> MessageTransport for CachingTransport<T> {
    async fn create_message(&self, request: MessagesRequest) -> crate::core_types::Result<Value> {
        Ok(self.send(request).await?.body)
    }

    fn transport_name(&self) -> &'static str {
        self.inner.transport_name()
    }
}
