use std::collections::HashMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::error::RosterError;

/// The two roster slots. Both share one record shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RosterTable {
    /// Published, publicly visible roster.
    Live,
    /// Editor-only staging roster.
    Draft,
}

impl RosterTable {
    /// Backing Postgres table.
    pub fn table_name(self) -> &'static str {
        match self {
            RosterTable::Live => "players",
            RosterTable::Draft => "admin_players",
        }
    }
}

impl fmt::Display for RosterTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RosterTable::Live => f.write_str("live"),
            RosterTable::Draft => f.write_str("draft"),
        }
    }
}

/// One row of either roster table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct PlayerRecord {
    pub id: Uuid,
    pub username: String,
    pub rating: f64,
    pub notes: Option<String>,
    pub updated_at: DateTime<Utc>,
}

/// Caller-editable fields of a player. `id` and `updated_at` are owned by the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerFields {
    pub username: String,
    pub rating: f64,
    #[serde(default)]
    pub notes: Option<String>,
}

impl PlayerFields {
    pub fn new(username: impl Into<String>, rating: f64) -> Self {
        PlayerFields {
            username: username.into(),
            rating,
            notes: None,
        }
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    /// Trim the username, drop blank notes, reject empty names and non-finite ratings.
    pub fn normalized(self) -> Result<Self, RosterError> {
        let username = self.username.trim().to_string();
        if username.is_empty() {
            return Err(RosterError::InvalidInput {
                reason: "username must not be empty".into(),
            });
        }
        if !self.rating.is_finite() {
            return Err(RosterError::InvalidInput {
                reason: format!("rating must be a finite number, got {}", self.rating),
            });
        }
        let notes = self.notes.filter(|n| !n.trim().is_empty());
        Ok(PlayerFields {
            username,
            rating: self.rating,
            notes,
        })
    }

    /// Stamp the fields into a full record.
    pub fn into_record(self, id: Uuid, updated_at: DateTime<Utc>) -> PlayerRecord {
        PlayerRecord {
            id,
            username: self.username,
            rating: self.rating,
            notes: self.notes,
            updated_at,
        }
    }
}

impl From<&PlayerRecord> for PlayerFields {
    fn from(r: &PlayerRecord) -> Self {
        PlayerFields {
            username: r.username.clone(),
            rating: r.rating,
            notes: r.notes.clone(),
        }
    }
}

/// Point-in-time snapshot of one roster.
///
/// Records keep the order storage returned them in, so stable sorts over a
/// snapshot are deterministic. Equality ignores that order: two rosters are
/// equal when they map the same ids to the same records.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(transparent)]
pub struct Roster {
    records: Vec<PlayerRecord>,
}

impl Roster {
    pub fn new(records: Vec<PlayerRecord>) -> Self {
        Roster { records }
    }

    pub fn records(&self) -> &[PlayerRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Exact, case-sensitive username lookup.
    pub fn find_username(&self, username: &str) -> Option<&PlayerRecord> {
        self.records.iter().find(|r| r.username == username)
    }

    fn by_id(&self) -> HashMap<Uuid, &PlayerRecord> {
        self.records.iter().map(|r| (r.id, r)).collect()
    }
}

impl PartialEq for Roster {
    fn eq(&self, other: &Self) -> bool {
        self.records.len() == other.records.len() && self.by_id() == other.by_id()
    }
}
