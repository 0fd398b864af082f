//! In-memory snapshot cache for roster reads.
//!
//! Public pages re-read the live roster constantly while it only changes on
//! publish, so HTTP reads are served from a short-lived snapshot. Any write
//! that could change a roster drops the matching entry; a miss or an expired
//! entry falls through to storage.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use dashmap::DashMap;

use crate::db::models::{Roster, RosterTable};
use crate::error::RosterError;
use crate::staging::StagingStore;

#[derive(Debug, Clone)]
struct Snapshot {
    roster: Roster,
    fetched_at: Instant,
}

pub struct SnapshotCache {
    entries: DashMap<RosterTable, Snapshot>,
    ttl: Duration,
    /// Bumped on every invalidation; a fetch that straddles one is not stored.
    generation: AtomicU64,
}

impl SnapshotCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            ttl,
            generation: AtomicU64::new(0),
        }
    }

    /// Cached snapshot if still fresh.
    pub fn get(&self, table: RosterTable) -> Option<Roster> {
        let entry = self.entries.get(&table)?;
        if entry.fetched_at.elapsed() < self.ttl {
            Some(entry.roster.clone())
        } else {
            None
        }
    }

    pub fn put(&self, table: RosterTable, roster: Roster) {
        self.entries.insert(
            table,
            Snapshot {
                roster,
                fetched_at: Instant::now(),
            },
        );
    }

    pub fn invalidate(&self, table: RosterTable) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        self.entries.remove(&table);
    }

    pub fn invalidate_all(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        self.entries.clear();
    }

    /// Serve `table` from cache or fetch and remember it. Failures are never cached.
    pub async fn roster(
        &self,
        store: &StagingStore,
        table: RosterTable,
    ) -> Result<Roster, RosterError> {
        if let Some(hit) = self.get(table) {
            return Ok(hit);
        }
        let seen = self.generation.load(Ordering::SeqCst);
        let fresh = store.list(table).await?;
        if self.generation.load(Ordering::SeqCst) == seen {
            self.put(table, fresh.clone());
        }
        Ok(fresh)
    }
}
