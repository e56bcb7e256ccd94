//! Delay simulation
//!
//! Computes a millisecond delay from an operation's configured `[min, max]`
//! range and applies it with a cooperative wait, so in-flight requests never
//! block a runtime worker.

use std::time::Duration;

use rand::Rng;

/// Compute the delay in milliseconds for a `[min, max]` range.
///
/// No bounds: zero. One bound: that value, no randomness. `max < min`:
/// clamped to `min`. Equal bounds: that value. Otherwise a uniform random
/// integer in `[min, max]` inclusive.
pub fn calculate_delay(min: Option<u64>, max: Option<u64>) -> u64 {
    let (min, max) = match (min, max) {
        (None, None) => return 0,
        (Some(min), None) => (min, min),
        (None, Some(max)) => (max, max),
        (Some(min), Some(max)) => (min, max.max(min)),
    };

    if min == max {
        return min;
    }

    rand::thread_rng().gen_range(min..=max)
}

/// Suspend for the given delay without blocking the runtime
pub async fn apply_delay(delay_ms: u64) {
    if delay_ms > 0 {
        tokio::time::sleep(Duration::from_millis(delay_ms)).await;
    }
}
