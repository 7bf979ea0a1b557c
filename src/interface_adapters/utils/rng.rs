use std::sync::OnceLock;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

static NEXT_ID: OnceLock<AtomicU64> = OnceLock::new();

/// Process-unique id for connections and players.
///
/// Counts up from the wall clock at first use, so a restarted process does not
/// hand out the previous run's ids and two calls never collide.
pub fn rand_id() -> u64 {
    NEXT_ID
        .get_or_init(|| {
            let start = SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|d| d.as_nanos() as u64)
                .unwrap_or(1);
            AtomicU64::new(start)
        })
        .fetch_add(1, Ordering::Relaxed)
}
