#![allow(dead_code)]

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use quipboard_server::db::editor_repo::EditorDirectory;
use quipboard_server::db::memory::MemoryRosterStorage;
use quipboard_server::db::models::{PlayerFields, PlayerRecord, RosterTable};
use quipboard_server::db::storage::RosterStorage;
use quipboard_server::error::RosterError;
use quipboard_server::identity::EditorCheck;
use quipboard_server::staging::StagingStore;
use tokio::sync::{Notify, Semaphore};
use uuid::Uuid;

/// Fixed answer to the editor check.
pub struct Editor(pub bool);

#[async_trait]
impl EditorCheck for Editor {
    async fn is_authorized_editor(&self) -> Result<bool, RosterError> {
        Ok(self.0)
    }
}

/// Editor directory whose backing table cannot be reached.
pub struct UnreachableDirectory;

#[async_trait]
impl EditorDirectory for UnreachableDirectory {
    async fn is_editor(&self, _user_id: Uuid) -> Result<bool, RosterError> {
        Err(RosterError::storage("editors table unreachable"))
    }
}

pub const EDITOR: Editor = Editor(true);
pub const VISITOR: Editor = Editor(false);

pub fn record(username: &str, rating: f64) -> PlayerRecord {
    PlayerFields::new(username, rating).into_record(Uuid::new_v4(), Utc::now())
}

pub fn store_with(
    live: Vec<PlayerRecord>,
    draft: Vec<PlayerRecord>,
) -> (Arc<MemoryRosterStorage>, StagingStore) {
    let storage = Arc::new(
        MemoryRosterStorage::new()
            .with_rows(RosterTable::Live, live)
            .with_rows(RosterTable::Draft, draft),
    );
    let store = StagingStore::new(storage.clone());
    (storage, store)
}

/// Memory storage whose `atomic_replace` (or, built with `reads`, whose
/// `select_all`) parks until the test releases it.
pub struct GatedStorage {
    pub inner: MemoryRosterStorage,
    pub entered: Notify,
    pub gate: Semaphore,
    gate_reads: bool,
}

impl GatedStorage {
    pub fn new(inner: MemoryRosterStorage) -> Self {
        Self {
            inner,
            entered: Notify::new(),
            gate: Semaphore::new(0),
            gate_reads: false,
        }
    }

    pub fn reads(inner: MemoryRosterStorage) -> Self {
        Self {
            gate_reads: true,
            ..Self::new(inner)
        }
    }

    pub fn release(&self) {
        self.gate.add_permits(1);
    }

    async fn park(&self) {
        self.entered.notify_one();
        self.gate
            .acquire()
            .await
            .expect("gate semaphore closed")
            .forget();
    }
}

#[async_trait]
impl RosterStorage for GatedStorage {
    async fn select_all(&self, table: RosterTable) -> Result<Vec<PlayerRecord>, RosterError> {
        if self.gate_reads {
            self.park().await;
        }
        self.inner.select_all(table).await
    }

    async fn insert(
        &self,
        table: RosterTable,
        record: &PlayerRecord,
    ) -> Result<PlayerRecord, RosterError> {
        self.inner.insert(table, record).await
    }

    async fn update(
        &self,
        table: RosterTable,
        id: Uuid,
        fields: &PlayerFields,
        updated_at: DateTime<Utc>,
    ) -> Result<PlayerRecord, RosterError> {
        self.inner.update(table, id, fields, updated_at).await
    }

    async fn delete(&self, table: RosterTable, id: Uuid) -> Result<(), RosterError> {
        self.inner.delete(table, id).await
    }

    async fn atomic_replace(
        &self,
        source: RosterTable,
        dest: RosterTable,
    ) -> Result<(), RosterError> {
        if !self.gate_reads {
            self.park().await;
        }
        self.inner.atomic_replace(source, dest).await
    }
}
