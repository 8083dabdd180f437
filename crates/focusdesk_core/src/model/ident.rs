//! Creation-time identifier generation.
//!
//! # Responsibility
//! - Provide millisecond timestamps for `updated_at` bookkeeping.
//! - Generate unique, strictly increasing ids for tasks and notes.
//!
//! # Invariants
//! - `IdGenerator::next_id` never returns the same value twice.
//! - Ids remain ordered by creation time: two entities created back to back
//!   within the same millisecond get ids one apart instead of colliding.

use std::sync::atomic::{AtomicI64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

/// Returns the current wall-clock time as epoch milliseconds.
///
/// Clocks set before the unix epoch collapse to 0 rather than failing; id
/// uniqueness is still preserved by the generator's monotonic floor.
pub fn now_epoch_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis() as i64)
        .unwrap_or(0)
}

/// Monotonic timestamp-id source.
///
/// Ids are epoch milliseconds, bumped forward by one whenever the clock has
/// not advanced since the previous id. This keeps the original
/// timestamp-as-id shape while removing the same-millisecond collision.
#[derive(Debug, Default)]
pub struct IdGenerator {
    last: AtomicI64,
}

impl IdGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the next unique id.
    pub fn next_id(&self) -> i64 {
        let now = now_epoch_ms();
        let mut prev = self.last.load(Ordering::Relaxed);
        loop {
            let candidate = now.max(prev + 1);
            match self.last.compare_exchange_weak(
                prev,
                candidate,
                Ordering::Relaxed,
                Ordering::Relaxed,
            ) {
                Ok(_) => return candidate,
                Err(observed) => prev = observed,
            }
        }
    }
}
