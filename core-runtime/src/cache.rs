//! # Single-Slot TTL Cache
//!
//! Memoises one value for a fixed time window.
//!
//! Expiry is checked lazily on read; there is no background timer and no
//! eviction other than expiry and [`TtlCache::clear`]. Reads never extend the
//! window. Writes always replace the whole value and restart the window.
//!
//! The cache has no internal locking. Its owner decides how access is
//! serialised; two callers that both observe a miss will both resolve and
//! both write.
//!
//! ## Usage
//!
//! ```ignore
//! use core_runtime::cache::TtlCache;
//!
//! let mut cache = TtlCache::new(5 * 60 * 1000);
//! if cache.get().is_none() {
//!     cache.set(resolve().await?);
//! }
//! ```

use bridge_traits::time::{Clock, SystemClock};
use std::sync::Arc;

/// Capture timestamp of an empty cache.
const EMPTY_TIMESTAMP: i64 = 0;

/// Single-slot cache with a fixed time-to-live.
pub struct TtlCache<T> {
    ttl_ms: u64,
    clock: Arc<dyn Clock>,
    value: Option<T>,
    stored_at_ms: i64,
}

impl<T> TtlCache<T> {
    /// Creates an empty cache that reads time from the system clock.
    pub fn new(ttl_ms: u64) -> Self {
        Self::with_clock(ttl_ms, Arc::new(SystemClock))
    }

    pub fn with_clock(ttl_ms: u64, clock: Arc<dyn Clock>) -> Self {
        Self {
            ttl_ms,
            clock,
            value: None,
            stored_at_ms: EMPTY_TIMESTAMP,
        }
    }

    /// Returns the stored value while `now - stored_at < ttl`.
    ///
    /// A cache that was never set and one that expired both read as `None`.
    pub fn get(&self) -> Option<&T> {
        if self.is_live() {
            self.value.as_ref()
        } else {
            None
        }
    }

    /// Replaces the stored value and restarts the window at `now`.
    pub fn set(&mut self, value: T) {
        self.value = Some(value);
        self.stored_at_ms = self.clock.unix_timestamp_millis();
    }

    /// Drops the stored value. Safe to call on an empty cache.
    pub fn clear(&mut self) {
        self.value = None;
        self.stored_at_ms = EMPTY_TIMESTAMP;
    }

    /// Whether a value is present and inside its window.
    pub fn is_live(&self) -> bool {
        if self.value.is_none() {
            return false;
        }
        let elapsed_ms = self
            .clock
            .unix_timestamp_millis()
            .saturating_sub(self.stored_at_ms);
        i128::from(elapsed_ms) < i128::from(self.ttl_ms)
    }

    pub fn ttl_ms(&self) -> u64 {
        self.ttl_ms
    }
}

impl<T> std::fmt::Debug for TtlCache<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TtlCache")
            .field("ttl_ms", &self.ttl_ms)
            .field("occupied", &self.value.is_some())
            .field("stored_at_ms", &self.stored_at_ms)
            .finish()
    }
}
