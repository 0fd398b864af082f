//! Live/draft staging store.
//!
//! Two named rosters sit behind one [`RosterStorage`]. Only the draft can be
//! edited record by record; the live roster changes solely through
//! [`StagingStore::publish`], and the draft can be reset wholesale through
//! [`StagingStore::discard`]. Both bulk transitions are a single
//! `atomic_replace` call, so a failure leaves both rosters as they were.
//!
//! `notes` is part of the record and survives a publish: after publishing,
//! the live roster is exactly the draft that was reviewed.

use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use crate::db::models::{PlayerFields, PlayerRecord, Roster, RosterTable};
use crate::db::storage::RosterStorage;
use crate::error::RosterError;
use crate::identity::EditorCheck;
use crate::metrics;

pub struct StagingStore {
    storage: Arc<dyn RosterStorage>,
}

impl StagingStore {
    pub fn new(storage: Arc<dyn RosterStorage>) -> Self {
        Self { storage }
    }

    pub fn storage(&self) -> &Arc<dyn RosterStorage> {
        &self.storage
    }

    /// Snapshot of either roster.
    pub async fn list(&self, table: RosterTable) -> Result<Roster, RosterError> {
        let rows = self.storage.select_all(table).await.map_err(|e| {
            log::error!("listing {table} roster failed: {e}");
            e
        })?;
        Ok(Roster::new(rows))
    }

    pub async fn list_live(&self) -> Result<Roster, RosterError> {
        self.list(RosterTable::Live).await
    }

    pub async fn list_draft(&self) -> Result<Roster, RosterError> {
        self.list(RosterTable::Draft).await
    }

    /// Exact, case-sensitive lookup by username.
    pub async fn get_by_username(
        &self,
        table: RosterTable,
        username: &str,
    ) -> Result<PlayerRecord, RosterError> {
        self.list(table)
            .await?
            .find_username(username)
            .cloned()
            .ok_or_else(|| RosterError::UsernameNotFound {
                table,
                username: username.to_string(),
            })
    }

    pub async fn create_draft(
        &self,
        editor: &dyn EditorCheck,
        fields: PlayerFields,
    ) -> Result<PlayerRecord, RosterError> {
        ensure_editor(editor).await?;
        let fields = fields.normalized()?;
        let record = fields.into_record(Uuid::new_v4(), Utc::now());

        let res = self.storage.insert(RosterTable::Draft, &record).await;
        metrics::record_draft_write("create", &res);
        let created = res?;
        log::info!("draft: added {} ({})", created.username, created.id);
        Ok(created)
    }

    pub async fn update_draft(
        &self,
        editor: &dyn EditorCheck,
        id: Uuid,
        fields: PlayerFields,
    ) -> Result<PlayerRecord, RosterError> {
        ensure_editor(editor).await?;
        let fields = fields.normalized()?;

        let res = self
            .storage
            .update(RosterTable::Draft, id, &fields, Utc::now())
            .await;
        metrics::record_draft_write("update", &res);
        let updated = res?;
        log::info!(
            "draft: updated {} ({}) rating={}",
            updated.username,
            updated.id,
            updated.rating
        );
        Ok(updated)
    }

    /// Not idempotent: deleting an id that is already gone is `NotFound`.
    pub async fn delete_draft(
        &self,
        editor: &dyn EditorCheck,
        id: Uuid,
    ) -> Result<(), RosterError> {
        ensure_editor(editor).await?;

        let res = self.storage.delete(RosterTable::Draft, id).await;
        metrics::record_draft_write("delete", &res);
        res?;
        log::info!("draft: deleted {id}");
        Ok(())
    }

    /// live := copy(draft)
    pub async fn publish(&self, editor: &dyn EditorCheck) -> Result<(), RosterError> {
        ensure_editor(editor).await?;
        self.storage
            .atomic_replace(RosterTable::Draft, RosterTable::Live)
            .await?;
        log::info!("draft roster published to live");
        Ok(())
    }

    /// draft := copy(live)
    pub async fn discard(&self, editor: &dyn EditorCheck) -> Result<(), RosterError> {
        ensure_editor(editor).await?;
        self.storage
            .atomic_replace(RosterTable::Live, RosterTable::Draft)
            .await?;
        log::info!("draft roster reset to live");
        Ok(())
    }
}

async fn ensure_editor(editor: &dyn EditorCheck) -> Result<(), RosterError> {
    if editor.is_authorized_editor().await? {
        Ok(())
    } else {
        Err(RosterError::Unauthorized)
    }
}
