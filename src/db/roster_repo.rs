use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::db::models::{PlayerFields, PlayerRecord, RosterTable};
use crate::db::storage::RosterStorage;
use crate::error::RosterError;

const COLUMNS: &str = "id, username, rating, notes, updated_at";

/// Postgres-backed rosters (`players` / `admin_players`).
///
/// Bulk replacement is delegated to the stored functions in
/// `migrations/0001_rosters.sql`, which lock both tables for the duration of
/// the copy.
#[derive(Clone)]
pub struct PgRosterStorage {
    db: PgPool,
}

impl PgRosterStorage {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

/// Unique-violation → `Conflict`, everything else → `StorageUnavailable`.
fn write_error(e: sqlx::Error, table: RosterTable, username: &str) -> RosterError {
    if let sqlx::Error::Database(db_err) = &e {
        if db_err.code().as_deref() == Some("23505") {
            return RosterError::Conflict {
                table,
                username: username.to_string(),
            };
        }
    }
    RosterError::from(e)
}

#[async_trait]
impl RosterStorage for PgRosterStorage {
    async fn select_all(&self, table: RosterTable) -> Result<Vec<PlayerRecord>, RosterError> {
        let sql = format!("SELECT {COLUMNS} FROM {}", table.table_name());
        let rows = sqlx::query_as::<_, PlayerRecord>(&sql)
            .fetch_all(&self.db)
            .await?;
        Ok(rows)
    }

    async fn insert(
        &self,
        table: RosterTable,
        record: &PlayerRecord,
    ) -> Result<PlayerRecord, RosterError> {
        let sql = format!(
            "INSERT INTO {} ({COLUMNS})
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {COLUMNS}",
            table.table_name()
        );
        sqlx::query_as::<_, PlayerRecord>(&sql)
            .bind(record.id)
            .bind(&record.username)
            .bind(record.rating)
            .bind(&record.notes)
            .bind(record.updated_at)
            .fetch_one(&self.db)
            .await
            .map_err(|e| write_error(e, table, &record.username))
    }

    async fn update(
        &self,
        table: RosterTable,
        id: Uuid,
        fields: &PlayerFields,
        updated_at: DateTime<Utc>,
    ) -> Result<PlayerRecord, RosterError> {
        let sql = format!(
            "UPDATE {}
                SET username = $2, rating = $3, notes = $4, updated_at = $5
              WHERE id = $1
          RETURNING {COLUMNS}",
            table.table_name()
        );
        sqlx::query_as::<_, PlayerRecord>(&sql)
            .bind(id)
            .bind(&fields.username)
            .bind(fields.rating)
            .bind(&fields.notes)
            .bind(updated_at)
            .fetch_optional(&self.db)
            .await
            .map_err(|e| write_error(e, table, &fields.username))?
            .ok_or(RosterError::PlayerNotFound { table, id })
    }

    async fn delete(&self, table: RosterTable, id: Uuid) -> Result<(), RosterError> {
        let sql = format!("DELETE FROM {} WHERE id = $1", table.table_name());
        let rows = sqlx::query(&sql)
            .bind(id)
            .execute(&self.db)
            .await?
            .rows_affected();

        if rows == 0 {
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
        let routine = match (source, dest) {
            (RosterTable::Draft, RosterTable::Live) => "replace_players_with_admin_players",
            (RosterTable::Live, RosterTable::Draft) => "replace_admin_players_with_players",
            _ => return Ok(()),
        };
        sqlx::query(&format!("SELECT {routine}()"))
            .execute(&self.db)
            .await?;
        Ok(())
    }

    async fn ping(&self) -> Result<(), RosterError> {
        sqlx::query("SELECT 1").execute(&self.db).await?;
        Ok(())
    }
}
