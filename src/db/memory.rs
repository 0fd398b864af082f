//! In-memory roster storage for tests and local runs.

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::{Mutex, RwLock};
use uuid::Uuid;

use crate::db::editor_repo::EditorDirectory;
use crate::db::models::{PlayerFields, PlayerRecord, RosterTable};
use crate::db::storage::RosterStorage;
use crate::error::RosterError;

/// Both rosters behind a single mutex, so `atomic_replace` is one critical section.
pub struct MemoryRosterStorage {
    inner: Mutex<Inner>,
    unavailable: AtomicBool,
}

#[derive(Default)]
struct Inner {
    live: Vec<PlayerRecord>,
    draft: Vec<PlayerRecord>,
}

impl Inner {
    fn rows(&self, table: RosterTable) -> &Vec<PlayerRecord> {
        match table {
            RosterTable::Live => &self.live,
            RosterTable::Draft => &self.draft,
        }
    }

    fn rows_mut(&mut self, table: RosterTable) -> &mut Vec<PlayerRecord> {
        match table {
            RosterTable::Live => &mut self.live,
            RosterTable::Draft => &mut self.draft,
        }
    }
}

impl MemoryRosterStorage {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner::default()),
            unavailable: AtomicBool::new(false),
        }
    }

    /// Seed a table directly, bypassing uniqueness checks.
    pub fn with_rows(self, table: RosterTable, rows: Vec<PlayerRecord>) -> Self {
        *self.inner.lock().rows_mut(table) = rows;
        self
    }

    /// Simulate an unreachable backend: every call fails with `StorageUnavailable`.
    pub fn set_unavailable(&self, down: bool) {
        self.unavailable.store(down, Ordering::SeqCst);
    }

    fn check_up(&self) -> Result<(), RosterError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(RosterError::storage("in-memory storage marked unavailable"));
        }
        Ok(())
    }
}

impl Default for MemoryRosterStorage {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RosterStorage for MemoryRosterStorage {
    async fn select_all(&self, table: RosterTable) -> Result<Vec<PlayerRecord>, RosterError> {
        self.check_up()?;
        Ok(self.inner.lock().rows(table).clone())
    }

    async fn insert(
        &self,
        table: RosterTable,
        record: &PlayerRecord,
    ) -> Result<PlayerRecord, RosterError> {
        self.check_up()?;
        let mut inner = self.inner.lock();
        let rows = inner.rows_mut(table);
        if rows.iter().any(|r| r.username == record.username) {
            return Err(RosterError::Conflict {
                table,
                username: record.username.clone(),
            });
        }
        if rows.iter().any(|r| r.id == record.id) {
            return Err(RosterError::storage(format!(
                "duplicate primary key {} in {table}",
                record.id
            )));
        }
        rows.push(record.clone());
        Ok(record.clone())
    }

    async fn update(
        &self,
        table: RosterTable,
        id: Uuid,
        fields: &PlayerFields,
        updated_at: DateTime<Utc>,
    ) -> Result<PlayerRecord, RosterError> {
        self.check_up()?;
        let mut inner = self.inner.lock();
        let rows = inner.rows_mut(table);
        let pos = rows
            .iter()
            .position(|r| r.id == id)
            .ok_or(RosterError::PlayerNotFound { table, id })?;
        if rows
            .iter()
            .any(|r| r.id != id && r.username == fields.username)
        {
            return Err(RosterError::Conflict {
                table,
                username: fields.username.clone(),
            });
        }
        let row = &mut rows[pos];
        row.username = fields.username.clone();
        row.rating = fields.rating;
        row.notes = fields.notes.clone();
        row.updated_at = updated_at;
        Ok(row.clone())
    }

    async fn delete(&self, table: RosterTable, id: Uuid) -> Result<(), RosterError> {
        self.check_up()?;
        let mut inner = self.inner.lock();
        let rows = inner.rows_mut(table);
        let before = rows.len();
        rows.retain(|r| r.id != id);
        if rows.len() == before {
            Err(RosterError::PlayerNotFound { table, id })
        } else {
            Ok(())
        }
    }

    async fn atomic_replace(
        &self,
        source: RosterTable,
        dest: RosterTable,
    ) -> Result<(), RosterError> {
        self.check_up()?;
        if source == dest {
            return Ok(());
        }
        let mut inner = self.inner.lock();
        let copy = inner.rows(source).clone();
        *inner.rows_mut(dest) = copy;
        Ok(())
    }

    async fn ping(&self) -> Result<(), RosterError> {
        self.check_up()
    }
}

/// In-memory editor allow-list.
#[derive(Default)]
pub struct MemoryEditorDirectory {
    editors: RwLock<HashSet<Uuid>>,
}

impl MemoryEditorDirectory {
    pub fn new(editors: impl IntoIterator<Item = Uuid>) -> Self {
        Self {
            editors: RwLock::new(editors.into_iter().collect()),
        }
    }

    pub fn grant(&self, user_id: Uuid) {
        self.editors.write().insert(user_id);
    }

    pub fn revoke(&self, user_id: Uuid) {
        self.editors.write().remove(&user_id);
    }
}

#[async_trait]
impl EditorDirectory for MemoryEditorDirectory {
    async fn is_editor(&self, user_id: Uuid) -> Result<bool, RosterError> {
        Ok(self.editors.read().contains(&user_id))
    }
}
