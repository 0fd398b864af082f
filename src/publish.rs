//! Confirmation-gated, single-flight publish / discard.

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};

use crate::cache::SnapshotCache;
use crate::error::RosterError;
use crate::identity::EditorCheck;
use crate::metrics;
use crate::staging::StagingStore;

/// The two wholesale transitions between rosters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BulkOp {
    /// live := draft
    Publish,
    /// draft := live
    Discard,
}

impl BulkOp {
    pub fn as_str(self) -> &'static str {
        match self {
            BulkOp::Publish => "publish",
            BulkOp::Discard => "discard",
        }
    }
}

impl fmt::Display for BulkOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Observable lifecycle of one bulk operation.
///
/// A failed run goes straight back to `Idle`; the failure itself is the
/// error returned to the caller.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "lowercase")]
pub enum OpState {
    Idle,
    Pending,
    Succeeded { at: DateTime<Utc> },
}

pub struct PublishController {
    store: Arc<StagingStore>,
    cache: Arc<SnapshotCache>,
    states: DashMap<BulkOp, OpState>,
}

/// Puts the slot back to `Idle` unless the run completed. Covers both errors
/// and a caller dropping the future mid-flight.
struct PendingGuard<'a> {
    states: &'a DashMap<BulkOp, OpState>,
    op: BulkOp,
    finished: bool,
}

impl PendingGuard<'_> {
    fn succeed(mut self) {
        self.states
            .insert(self.op, OpState::Succeeded { at: Utc::now() });
        self.finished = true;
    }
}

impl Drop for PendingGuard<'_> {
    fn drop(&mut self) {
        if !self.finished {
            self.states.insert(self.op, OpState::Idle);
        }
    }
}

impl PublishController {
    pub fn new(store: Arc<StagingStore>, cache: Arc<SnapshotCache>) -> Self {
        Self {
            store,
            cache,
            states: DashMap::new(),
        }
    }

    pub fn state(&self, op: BulkOp) -> OpState {
        self.states
            .get(&op)
            .map(|s| s.value().clone())
            .unwrap_or(OpState::Idle)
    }

    /// Run `op` once. Rejects unconfirmed requests and overlapping runs of the
    /// same operation; on success both cached rosters are dropped.
    pub async fn run(
        &self,
        op: BulkOp,
        editor: &dyn EditorCheck,
        confirmed: bool,
    ) -> Result<(), RosterError> {
        if !confirmed {
            return Err(RosterError::NotConfirmed { op });
        }

        let guard = self.begin(op)?;
        log::info!("{op}: started");

        let res = match op {
            BulkOp::Publish => self.store.publish(editor).await,
            BulkOp::Discard => self.store.discard(editor).await,
        };
        metrics::record_bulk_op(op.as_str(), &res);

        match res {
            Ok(()) => {
                self.cache.invalidate_all();
                guard.succeed();
                log::info!("{op}: succeeded");
                Ok(())
            }
            Err(e) => {
                log::error!("{op}: failed, rosters unchanged: {e}");
                Err(e)
            }
        }
    }

    /// Atomically flip the slot to `Pending`, or refuse if it already is.
    fn begin(&self, op: BulkOp) -> Result<PendingGuard<'_>, RosterError> {
        let mut slot = self.states.entry(op).or_insert(OpState::Idle);
        if *slot == OpState::Pending {
            return Err(RosterError::AlreadyInProgress { op });
        }
        *slot = OpState::Pending;
        drop(slot);

        Ok(PendingGuard {
            states: &self.states,
            op,
            finished: false,
        })
    }
}
