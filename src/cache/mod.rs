//! Cache module for holding API responses in memory
//!
//! This module provides an expiring cache that keeps values for a fixed interval
//! after they were inserted. Stale entries are removed by a background sweep that
//! runs once per interval, and are also evicted lazily whenever a lookup finds them.

mod expiring;

pub use expiring::{ExpiringCache, DEFAULT_INTERVAL};
