//! Persistence contract the staging core is written against.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::db::models::{PlayerFields, PlayerRecord, RosterTable};
use crate::error::RosterError;

/// Storage backend for the two roster tables.
///
/// Implementations report a duplicate username as [`RosterError::Conflict`],
/// a missing id as [`RosterError::PlayerNotFound`], and anything else as
/// [`RosterError::StorageUnavailable`].
#[async_trait]
pub trait RosterStorage: Send + Sync {
    /// Every record of `table`, in storage order.
    async fn select_all(&self, table: RosterTable) -> Result<Vec<PlayerRecord>, RosterError>;

    /// Insert a fully stamped record and return it as stored.
    async fn insert(
        &self,
        table: RosterTable,
        record: &PlayerRecord,
    ) -> Result<PlayerRecord, RosterError>;

    /// Overwrite the mutable fields of `id`. Fails if `id` is absent.
    async fn update(
        &self,
        table: RosterTable,
        id: Uuid,
        fields: &PlayerFields,
        updated_at: DateTime<Utc>,
    ) -> Result<PlayerRecord, RosterError>;

    /// Remove `id`. Fails if `id` is absent.
    async fn delete(&self, table: RosterTable, id: Uuid) -> Result<(), RosterError>;

    /// Make `dest` a value copy of `source` in one atomic server-side step.
    ///
    /// Readers of `dest` must observe either the old contents or the new
    /// ones, never a mix, and a failure must leave `dest` untouched.
    async fn atomic_replace(
        &self,
        source: RosterTable,
        dest: RosterTable,
    ) -> Result<(), RosterError>;

    /// Cheap liveness probe.
    async fn ping(&self) -> Result<(), RosterError> {
        Ok(())
    }
}
