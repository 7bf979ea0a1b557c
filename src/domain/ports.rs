// Outbound ports the simulation depends on.

use crate::domain::rarity::Rarity;
use crate::domain::state::{EntityId, PlayerId};
use async_trait::async_trait;

/// A credited kill as reported to the external progress store.
#[derive(Debug, Clone, PartialEq)]
pub struct KillCredit {
    pub player_id: PlayerId,
    pub mob_id: EntityId,
    pub rarity: Rarity,
    pub stars: u32,
    pub drop: Option<Rarity>,
}

#[derive(Debug)]
pub enum ProgressError {
    /// The store could not be reached or timed out.
    Unavailable,
    /// The store answered with a non-success status.
    Rejected(u16),
}

#[async_trait]
pub trait ProgressSink: Send + Sync {
    async fn credit_kill(&self, credit: &KillCredit) -> Result<(), ProgressError>;
}
