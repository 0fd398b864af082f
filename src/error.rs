use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use uuid::Uuid;

use crate::db::models::RosterTable;
use crate::publish::BulkOp;

/// Every failure the roster core can report.
#[derive(Debug, thiserror::Error)]
pub enum RosterError {
    #[error("player {id} not found in {table} roster")]
    PlayerNotFound { table: RosterTable, id: Uuid },

    #[error("no player named {username:?} in {table} roster")]
    UsernameNotFound { table: RosterTable, username: String },

    #[error("username {username:?} already exists in {table} roster")]
    Conflict { table: RosterTable, username: String },

    #[error("caller is not an authorized editor")]
    Unauthorized,

    #[error("{op} is already in progress")]
    AlreadyInProgress { op: BulkOp },

    #[error("{op} must be explicitly confirmed")]
    NotConfirmed { op: BulkOp },

    #[error("invalid input: {reason}")]
    InvalidInput { reason: String },

    #[error("storage unavailable: {reason}")]
    StorageUnavailable {
        reason: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

impl RosterError {
    pub fn storage(reason: impl Into<String>) -> Self {
        RosterError::StorageUnavailable {
            reason: reason.into(),
            source: None,
        }
    }

    /// True for both id and username misses.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            RosterError::PlayerNotFound { .. } | RosterError::UsernameNotFound { .. }
        )
    }
}

impl From<sqlx::Error> for RosterError {
    fn from(e: sqlx::Error) -> Self {
        RosterError::StorageUnavailable {
            reason: e.to_string(),
            source: Some(Box::new(e)),
        }
    }
}

impl ResponseError for RosterError {
    fn status_code(&self) -> StatusCode {
        match self {
            RosterError::PlayerNotFound { .. } | RosterError::UsernameNotFound { .. } => {
                StatusCode::NOT_FOUND
            }
            RosterError::Conflict { .. } | RosterError::AlreadyInProgress { .. } => {
                StatusCode::CONFLICT
            }
            RosterError::Unauthorized => StatusCode::FORBIDDEN,
            RosterError::NotConfirmed { .. } | RosterError::InvalidInput { .. } => {
                StatusCode::BAD_REQUEST
            }
            RosterError::StorageUnavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code())
            .json(serde_json::json!({ "error": self.to_string() }))
    }
}
