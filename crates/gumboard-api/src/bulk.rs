//! Bulk note transitions. Every request is checked in full before any note
//! changes: either all requested notes transition or none do.

use std::collections::HashSet;

use axum::{
    Extension, Json,
    extract::{Path, State},
    response::IntoResponse,
};
use chrono::Utc;
use tracing::info;

use gumboard_db::models::NoteScope;
use gumboard_db::queries::{boards, notes};
use gumboard_types::api::{
    BulkAction, BulkActionRequest, BulkActionResponse, BulkDeleteResponse, DeletedCount,
    NoteIdsRequest,
};

use crate::access;
use crate::error::{ApiError, ApiResult};
use crate::middleware::Caller;
use crate::state::{AppState, with_db};
use crate::validate::ValidJson;

/// Check a batch against the notes that actually resolved on the board.
/// Returns the deduplicated ids to transition.
pub fn authorize_batch(
    caller: &Caller,
    requested: &[String],
    resolved: &[NoteScope],
) -> ApiResult<Vec<String>> {
    let mut seen = HashSet::new();
    let unique: Vec<String> = requested
        .iter()
        .filter(|id| seen.insert(id.as_str()))
        .cloned()
        .collect();

    if resolved.len() != unique.len() {
        return Err(ApiError::SomeNotFound {
            requested: unique.len(),
            missing: unique.len().saturating_sub(resolved.len()),
        });
    }
    if resolved.iter().any(|s| s.organization_id != caller.organization_id) {
        return Err(ApiError::AccessDenied);
    }
    if resolved.iter().any(|s| !caller.can_modify(&s.note.created_by)) {
        return Err(ApiError::AccessDenied);
    }
    Ok(unique)
}

async fn apply(
    state: &AppState,
    caller: Caller,
    board_id: String,
    requested: Vec<String>,
    action: BulkAction,
) -> ApiResult<Vec<String>> {
    with_db(state, move |db| {
        db.transaction(|tx| {
            access::board_for(tx, &caller, &board_id)?;
            let resolved = notes::live_notes_on_board(tx, &board_id, &requested)?;
            let ids = authorize_batch(&caller, &requested, &resolved)?;

            let now = Utc::now();
            let changed = match action {
                BulkAction::Archive => notes::set_archived(tx, &ids, Some(now), now)?,
                BulkAction::Unarchive => notes::set_archived(tx, &ids, None, now)?,
                BulkAction::Delete => notes::set_deleted(tx, &ids, Some(now), now)?,
            };
            if changed != ids.len() {
                // Resolved rows vanished mid-transaction; abort the whole batch
                return Err(ApiError::SomeNotFound {
                    requested: ids.len(),
                    missing: ids.len() - changed,
                });
            }
            boards::touch_board(tx, &board_id, now)?;
            Ok(ids)
        })
    })
    .await
}

/// PUT /boards/{board_id}/notes/bulk-actions
pub async fn bulk_action(
    State(state): State<AppState>,
    Path(board_id): Path<String>,
    Extension(caller): Extension<Caller>,
    ValidJson(req): ValidJson<BulkActionRequest>,
) -> ApiResult<impl IntoResponse> {
    let action = req.action();
    let ids = apply(&state, caller, board_id, req.note_ids().to_vec(), action).await?;

    info!("Bulk {:?} applied to {} notes", action, ids.len());
    Ok(Json(BulkActionResponse {
        action,
        count: ids.len(),
    }))
}

/// DELETE /boards/{board_id}/notes/bulk-actions
pub async fn bulk_delete_action(
    State(state): State<AppState>,
    Path(board_id): Path<String>,
    Extension(caller): Extension<Caller>,
    ValidJson(req): ValidJson<NoteIdsRequest>,
) -> ApiResult<impl IntoResponse> {
    let ids = apply(&state, caller, board_id, req.note_ids, BulkAction::Delete).await?;
    Ok(Json(DeletedCount { deleted: ids.len() }))
}

/// POST /boards/{board_id}/notes/bulk-delete
pub async fn bulk_delete(
    State(state): State<AppState>,
    Path(board_id): Path<String>,
    Extension(caller): Extension<Caller>,
    ValidJson(req): ValidJson<NoteIdsRequest>,
) -> ApiResult<impl IntoResponse> {
    let ids = apply(&state, caller, board_id, req.note_ids, BulkAction::Delete).await?;
    Ok(Json(BulkDeleteResponse {
        deleted: ids.len(),
        deleted_ids: ids,
    }))
}
