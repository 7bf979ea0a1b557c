// Background reporter that credits kills to the external progress store.

use crate::domain::ledger::KillLedger;
use crate::domain::ports::{KillCredit, ProgressSink};
use crate::domain::EntityId;
use crate::use_cases::types::KillNotice;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

const LOG_THROTTLE: Duration = Duration::from_secs(2);

impl From<&KillNotice> for KillCredit {
    fn from(notice: &KillNotice) -> Self {
        Self {
            player_id: notice.player_id,
            mob_id: notice.payload.mob_id,
            rarity: notice.payload.rarity,
            stars: notice.payload.stars,
            drop: notice.payload.drop,
        }
    }
}

/// Drains kill notices until every room sender is gone.
///
/// Each (room instance, mob id) is credited at most once. Failures are logged
/// and dropped; the store is never retried.
pub async fn progress_task(
    mut rx: mpsc::Receiver<KillNotice>,
    sink: Arc<dyn ProgressSink>,
    ledger_capacity: usize,
) {
    let mut ledger: KillLedger<(u64, EntityId)> = KillLedger::new(ledger_capacity);
    let mut last_failure_log = Instant::now() - LOG_THROTTLE;
    let mut credited: u64 = 0;
    let mut failed: u64 = 0;

    while let Some(notice) = rx.recv().await {
        if !ledger.record((notice.room_instance, notice.payload.mob_id)) {
            debug!(mob_id = notice.payload.mob_id, "duplicate kill credit ignored");
            continue;
        }

        let credit = KillCredit::from(&notice);
        match sink.credit_kill(&credit).await {
            Ok(()) => credited += 1,
            Err(e) => {
                failed += 1;
                if last_failure_log.elapsed() >= LOG_THROTTLE {
                    last_failure_log = Instant::now();
                    warn!(
                        error = ?e,
                        player_id = credit.player_id,
                        mob_id = credit.mob_id,
                        failed,
                        "failed to credit kill"
                    );
                }
            }
        }
    }
    info!(credited, failed, "progress reporter stopped");
}
