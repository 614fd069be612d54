//! Tests for Anthropic Prompt Caching
//!
//! This module contains unit tests for breakpoint annotation, usage
//! extraction and the caching transport wrapper.


// NOTE: Cross-module properties over host JSON are in tests/annotation_properties_tests.rs
