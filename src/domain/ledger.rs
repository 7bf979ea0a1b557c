// Idempotence helpers: snapshot sequence gating and kill de-duplication.

use std::collections::{HashSet, VecDeque};

/// Accepts a snapshot only when its sequence number moves strictly forward.
#[derive(Debug, Default)]
pub struct SeqGate {
    last: Option<u64>,
}

impl SeqGate {
    pub fn accept(&mut self, seq: u64) -> bool {
        match self.last {
            Some(last) if seq <= last => false,
            _ => {
                self.last = Some(seq);
                true
            }
        }
    }

    pub fn last(&self) -> Option<u64> {
        self.last
    }
}

/// Remembers recently credited kills so each is processed at most once.
///
/// Memory is bounded: once `capacity` keys are held the oldest is forgotten.
/// Mob ids are never reused inside a room, so eviction only matters across
/// very long sessions.
#[derive(Debug)]
pub struct KillLedger<K> {
    capacity: usize,
    seen: HashSet<K>,
    order: VecDeque<K>,
}

impl<K> KillLedger<K>
where
    K: Eq + std::hash::Hash + Clone,
{
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            seen: HashSet::new(),
            order: VecDeque::new(),
        }
    }

    /// Returns true the first time `key` is recorded.
    pub fn record(&mut self, key: K) -> bool {
        if self.seen.contains(&key) {
            return false;
        }
        if self.order.len() >= self.capacity {
            if let Some(oldest) = self.order.pop_front() {
                self.seen.remove(&oldest);
            }
        }
        self.seen.insert(key.clone());
        self.order.push_back(key);
        true
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}
