use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    pub id: u64,
    pub name: String,
    pub assists: u64,
    pub team: String,
    pub color: String,
    #[serde(rename = "isTracked")]
    pub is_tracked: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One signed change applied to a player's assist total.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub id: u64,
    pub player_id: u64,
    pub date: NaiveDate,
    pub delta: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// A validated entry that has not yet been assigned an id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryDraft {
    pub player_id: u64,
    pub delta: i64,
    pub date: NaiveDate,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AddAssistsRequest {
    pub assists_to_add: i64,
    #[serde(default)]
    pub game_date: Option<NaiveDate>,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ReduceAssistsRequest {
    pub assists_to_remove: i64,
    #[serde(default)]
    pub game_date: Option<NaiveDate>,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SetAssistsRequest {
    pub assists: i64,
}

#[derive(Debug, Deserialize)]
pub struct RecentQuery {
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub success: bool,
    pub data: T,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count: Option<usize>,
}

impl<T> Envelope<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data,
            count: None,
        }
    }
}

impl<T> Envelope<Vec<T>> {
    pub fn list(data: Vec<T>) -> Self {
        Self {
            success: true,
            count: Some(data.len()),
            data,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PlayerMutationResponse {
    pub success: bool,
    pub data: Player,
    #[serde(rename = "assistLogId")]
    pub assist_log_id: Option<u64>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UndoData {
    #[serde(rename = "deletedLogId")]
    pub deleted_log_id: u64,
    #[serde(rename = "assistsSubtracted")]
    pub assists_subtracted: i64,
    #[serde(rename = "playerId")]
    pub player_id: u64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub players: usize,
    pub entries: usize,
}
