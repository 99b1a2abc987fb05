use serde::{Deserialize, Serialize};

use crate::models::{Board, ChecklistItem, Note, ReactionGroup};

// -- Session --

/// Claims carried by the session token issued by the sign-in service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionClaims {
    pub sub: String,
    pub email: String,
    pub name: String,
    pub exp: usize,
}

// -- Errors --

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub details: Vec<FieldError>,
}

// -- Boards --

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CreateBoardRequest {
    pub name: String,
    pub description: Option<String>,
    #[serde(default)]
    pub is_public: bool,
    #[serde(default = "default_true")]
    pub send_slack_updates: bool,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct UpdateBoardRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub is_public: Option<bool>,
    pub send_slack_updates: Option<bool>,
    pub archived: Option<bool>,
}

/// `?archived=true` switches board and note listings to the archive view.
#[derive(Debug, Default, Deserialize)]
pub struct ArchivedQuery {
    #[serde(default)]
    pub archived: bool,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardSummary {
    #[serde(flatten)]
    pub board: Board,
    pub note_count: i64,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicBoardResponse {
    pub board: Board,
    pub notes: Vec<NoteResponse>,
}

// -- Notes --

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CreateNoteRequest {
    pub color: Option<String>,
    #[serde(default)]
    pub checklist_items: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct UpdateNoteRequest {
    pub color: Option<String>,
    pub archived: Option<bool>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NoteResponse {
    #[serde(flatten)]
    pub note: Note,
    pub checklist_items: Vec<ChecklistItem>,
    pub reactions: Vec<ReactionGroup>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BulkAction {
    Archive,
    Unarchive,
    Delete,
}

/// Body of `PUT /boards/{id}/notes/bulk-actions`.
#[derive(Debug, Deserialize)]
#[serde(tag = "action", rename_all = "lowercase", rename_all_fields = "camelCase")]
pub enum BulkActionRequest {
    Archive { note_ids: Vec<String> },
    Unarchive { note_ids: Vec<String> },
    Delete { note_ids: Vec<String> },
}

impl BulkActionRequest {
    pub fn action(&self) -> BulkAction {
        match self {
            Self::Archive { .. } => BulkAction::Archive,
            Self::Unarchive { .. } => BulkAction::Unarchive,
            Self::Delete { .. } => BulkAction::Delete,
        }
    }

    pub fn note_ids(&self) -> &[String] {
        match self {
            Self::Archive { note_ids } | Self::Unarchive { note_ids } | Self::Delete { note_ids } => {
                note_ids
            }
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkActionResponse {
    pub action: BulkAction,
    pub count: usize,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct NoteIdsRequest {
    pub note_ids: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DeletedCount {
    pub deleted: usize,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkDeleteResponse {
    pub deleted: usize,
    pub deleted_ids: Vec<String>,
}

// -- Checklist items --

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CreateItemRequest {
    pub content: String,
    #[serde(default)]
    pub checked: bool,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct UpdateItemRequest {
    pub content: Option<String>,
    pub checked: Option<bool>,
    /// Last item version seen by the client; stale writes are rejected.
    pub version: Option<i64>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ItemPosition {
    pub id: String,
    pub order: i64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ReorderRequest {
    pub items: Vec<ItemPosition>,
    /// Last note version seen by the client.
    pub version: Option<i64>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ItemListQuery {
    pub sort: Option<String>,
}

// -- Comments --

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CommentRequest {
    pub content: String,
}

// -- Reactions --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ToggleReactionRequest {
    pub emoji: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ToggleReactionResponse {
    pub added: bool,
}
