//! Session-scoped cache for API responses
//!
//! This module provides an in-memory cache that holds API responses with
//! configurable TTL (time-to-live) values. Entries live only as long as the
//! process; nothing is ever written to disk. It supports graceful degradation
//! by returning expired cache entries with an `is_expired` flag, allowing the
//! application to show stale data when APIs are unavailable.

mod freshness;

pub use freshness::{CachedData, FreshnessCache, Ttl};
