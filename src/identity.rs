//! Per-request editor capability check.

use async_trait::async_trait;
use uuid::Uuid;

use crate::db::editor_repo::EditorDirectory;
use crate::error::RosterError;

/// Answers "may this caller change the draft roster?".
///
/// `Err` means the answer could not be obtained, which is not the same as a no.
#[async_trait]
pub trait EditorCheck: Send + Sync {
    async fn is_authorized_editor(&self) -> Result<bool, RosterError>;
}

/// A caller identified by user id, checked against the editor directory on
/// every call instead of trusting anything carried in the token.
pub struct DirectoryEditor<'a> {
    directory: &'a dyn EditorDirectory,
    user_id: Uuid,
}

impl<'a> DirectoryEditor<'a> {
    pub fn new(directory: &'a dyn EditorDirectory, user_id: Uuid) -> Self {
        Self { directory, user_id }
    }
}

#[async_trait]
impl EditorCheck for DirectoryEditor<'_> {
    async fn is_authorized_editor(&self) -> Result<bool, RosterError> {
        self.directory.is_editor(self.user_id).await.map_err(|e| {
            log::warn!("editor lookup for {} failed: {e}", self.user_id);
            e
        })
    }
}
