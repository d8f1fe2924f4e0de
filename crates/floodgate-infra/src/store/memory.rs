//! In-memory counter store - single-process stand-in for Redis.

use std::collections::HashMap;
use std::time::Instant;

use async_trait::async_trait;
use tokio::sync::Mutex;

use floodgate_core::ports::{CounterStore, StoreError, StoreOp};

struct ScoredSet {
    members: HashMap<String, i64>,
    expires_at: Option<Instant>,
}

impl ScoredSet {
    fn new() -> Self {
        Self {
            members: HashMap::new(),
            expires_at: None,
        }
    }

    fn is_expired(&self, now: Instant) -> bool {
        self.expires_at.map(|exp| now >= exp).unwrap_or(false)
    }
}

/// In-memory counter store holding one scored set per key.
///
/// A single lock is held for a whole batch, so `execute_atomically` is
/// atomic with respect to every other caller in this process.
/// Note: State is per-process, not shared across instances.
pub struct InMemoryCounterStore {
    sets: Mutex<HashMap<String, ScoredSet>>,
}

impl InMemoryCounterStore {
    pub fn new() -> Self {
        Self {
            sets: Mutex::new(HashMap::new()),
        }
    }

    /// Drop every key whose expiry has passed. Returns how many were dropped.
    pub async fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let mut sets = self.sets.lock().await;
        let before = sets.len();
        sets.retain(|_, set| !set.is_expired(now));
        before - sets.len()
    }

    /// Number of live keys.
    pub async fn len(&self) -> usize {
        let now = Instant::now();
        let sets = self.sets.lock().await;
        sets.values().filter(|set| !set.is_expired(now)).count()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    fn apply(sets: &mut HashMap<String, ScoredSet>, op: &StoreOp, now: Instant) -> i64 {
        // Expired keys behave as absent.
        if sets.get(op.key()).is_some_and(|set| set.is_expired(now)) {
            sets.remove(op.key());
        }

        match op {
            StoreOp::InsertScoredMember { key, member, score } => {
                let set = sets.entry(key.clone()).or_insert_with(ScoredSet::new);
                match set.members.insert(member.clone(), *score) {
                    Some(_) => 0,
                    None => 1,
                }
            }
            StoreOp::RemoveScoredRange { key, min, max } => {
                let Some(set) = sets.get_mut(key) else {
                    return 0;
                };
                let before = set.members.len();
                set.members.retain(|_, score| *score < *min || *score > *max);
                let removed = before - set.members.len();
                if set.members.is_empty() {
                    sets.remove(key);
                }
                removed as i64
            }
            StoreOp::Cardinality { key } => sets
                .get(key)
                .map(|set| set.members.len() as i64)
                .unwrap_or(0),
            StoreOp::SetExpiry { key, ttl } => match sets.get_mut(key) {
                Some(set) => {
                    // A lifetime past what Instant can hold never expires.
                    set.expires_at = now.checked_add(*ttl);
                    1
                }
                None => 0,
            },
        }
    }
}

impl Default for InMemoryCounterStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CounterStore for InMemoryCounterStore {
    async fn execute_atomically(&self, ops: &[StoreOp]) -> Result<Vec<i64>, StoreError> {
        let now = Instant::now();
        let mut sets = self.sets.lock().await;
        Ok(ops.iter().map(|op| Self::apply(&mut sets, op, now)).collect())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }

    fn backend(&self) -> &'static str {
        "memory"
    }
}
