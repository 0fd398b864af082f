use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::RosterError;

/// Server-side source of truth for who may edit the draft roster.
#[async_trait]
pub trait EditorDirectory: Send + Sync {
    async fn is_editor(&self, user_id: Uuid) -> Result<bool, RosterError>;
}

/// Looks users up in the `editors` table.
#[derive(Clone)]
pub struct PgEditorDirectory {
    db: PgPool,
}

impl PgEditorDirectory {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl EditorDirectory for PgEditorDirectory {
    async fn is_editor(&self, user_id: Uuid) -> Result<bool, RosterError> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM editors WHERE user_id = $1)")
                .bind(user_id)
                .fetch_one(&self.db)
                .await?;
        Ok(exists)
    }
}
