use std::collections::HashMap;

use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::Utc;
use tracing::info;
use uuid::Uuid;

use gumboard_db::Connection;
use gumboard_db::queries::{boards, items, notes, reactions};
use gumboard_types::api::{
    ArchivedQuery, CreateNoteRequest, DeletedCount, NoteResponse, UpdateNoteRequest,
};
use gumboard_types::models::{ChecklistItem, Note, ReactionGroup};

use crate::access;
use crate::error::{ApiError, ApiResult};
use crate::middleware::Caller;
use crate::notify::{Activity, ChecklistEvent};
use crate::state::{AppState, with_db};
use crate::validate::{ValidJson, ValidQuery};

pub const DEFAULT_NOTE_COLOR: &str = "yellow";

/// Attach checklist items and grouped reactions to each note, two queries
/// for the whole batch.
pub(crate) fn note_responses(conn: &Connection, list: Vec<Note>) -> anyhow::Result<Vec<NoteResponse>> {
    let ids: Vec<String> = list.iter().map(|n| n.id.clone()).collect();

    let mut items_by_note: HashMap<String, Vec<ChecklistItem>> = HashMap::new();
    for item in items::items_for_notes(conn, &ids)? {
        items_by_note.entry(item.note_id.clone()).or_default().push(item);
    }

    // Group by emoji, keeping first-reaction order
    let mut reactions_by_note: HashMap<String, Vec<ReactionGroup>> = HashMap::new();
    for row in reactions::reactions_for_notes(conn, &ids)? {
        let groups = reactions_by_note.entry(row.note_id).or_default();
        match groups.iter_mut().find(|g| g.emoji == row.emoji) {
            Some(group) => {
                group.count += 1;
                group.user_ids.push(row.user_id);
            }
            None => groups.push(ReactionGroup {
                emoji: row.emoji,
                count: 1,
                user_ids: vec![row.user_id],
            }),
        }
    }

    Ok(list
        .into_iter()
        .map(|note| NoteResponse {
            checklist_items: items_by_note.remove(&note.id).unwrap_or_default(),
            reactions: reactions_by_note.remove(&note.id).unwrap_or_default(),
            note,
        })
        .collect())
}

fn single_response(conn: &Connection, note_id: &str) -> ApiResult<NoteResponse> {
    let note = notes::get_note(conn, note_id)?.ok_or(ApiError::NotFound("Note"))?;
    note_responses(conn, vec![note])?
        .pop()
        .ok_or(ApiError::NotFound("Note"))
}

/// GET /boards/{board_id}/notes
pub async fn list_notes(
    State(state): State<AppState>,
    Path(board_id): Path<String>,
    ValidQuery(query): ValidQuery<ArchivedQuery>,
    Extension(caller): Extension<Caller>,
) -> ApiResult<impl IntoResponse> {
    let list = with_db(&state, move |db| {
        db.read(|conn| {
            access::board_for(conn, &caller, &board_id)?;
            let list = notes::list_notes(conn, &board_id, query.archived)?;
            Ok::<_, ApiError>(note_responses(conn, list)?)
        })
    })
    .await?;

    Ok(Json(list))
}

/// POST /boards/{board_id}/notes
pub async fn create_note(
    State(state): State<AppState>,
    Path(board_id): Path<String>,
    Extension(caller): Extension<Caller>,
    ValidJson(req): ValidJson<CreateNoteRequest>,
) -> ApiResult<impl IntoResponse> {
    let (response, activity) = with_db(&state, move |db| {
        db.transaction(|tx| {
            let board = access::board_for(tx, &caller, &board_id)?;
            if board.archived_at.is_some() {
                return Err(ApiError::invalid("board", "cannot add notes to an archived board"));
            }

            let now = Utc::now();
            let note_id = Uuid::new_v4().to_string();
            let color = req.color.as_deref().unwrap_or(DEFAULT_NOTE_COLOR);
            notes::insert_note(tx, &note_id, &board_id, &caller.user_id, color, now)?;
            for content in &req.checklist_items {
                items::append_item(tx, &Uuid::new_v4().to_string(), &note_id, content, false, now)?;
            }
            boards::touch_board(tx, &board_id, now)?;

            let headline = req
                .checklist_items
                .iter()
                .find(|c| !c.trim().is_empty())
                .map(String::as_str)
                .unwrap_or_default();
            let activity = Activity::load(tx, &caller, &board_id, ChecklistEvent::NoteAdded, headline)?;

            Ok((single_response(tx, &note_id)?, activity))
        })
    })
    .await?;

    info!("Note {} created on board {}", response.note.id, response.note.board_id);
    if let Some(activity) = activity {
        state.notifier.dispatch(activity);
    }
    Ok((StatusCode::CREATED, Json(response)))
}

/// PUT /boards/{board_id}/notes/{note_id}
pub async fn update_note(
    State(state): State<AppState>,
    Path((board_id, note_id)): Path<(String, String)>,
    Extension(caller): Extension<Caller>,
    ValidJson(req): ValidJson<UpdateNoteRequest>,
) -> ApiResult<impl IntoResponse> {
    let response = with_db(&state, move |db| {
        db.transaction(|tx| {
            let scope = access::board_note_for(tx, &caller, &board_id, &note_id)?;
            access::ensure_can_modify(&caller, &scope.note.created_by)?;

            let now = Utc::now();
            if let Some(color) = &req.color {
                notes::update_color(tx, &note_id, color, now)?;
            }
            if let Some(archived) = req.archived {
                let archived_at = archived.then_some(now);
                notes::set_archived(tx, std::slice::from_ref(&note_id), archived_at, now)?;
            }
            boards::touch_board(tx, &board_id, now)?;

            single_response(tx, &note_id)
        })
    })
    .await?;

    Ok(Json(response))
}

/// DELETE /boards/{board_id}/notes/{note_id}
pub async fn delete_note(
    State(state): State<AppState>,
    Path((board_id, note_id)): Path<(String, String)>,
    Extension(caller): Extension<Caller>,
) -> ApiResult<impl IntoResponse> {
    with_db(&state, move |db| {
        db.transaction(|tx| {
            let scope = access::board_note_for(tx, &caller, &board_id, &note_id)?;
            access::ensure_can_modify(&caller, &scope.note.created_by)?;

            let now = Utc::now();
            notes::set_deleted(tx, std::slice::from_ref(&note_id), Some(now), now)?;
            boards::touch_board(tx, &board_id, now)?;
            Ok::<_, ApiError>(())
        })
    })
    .await?;

    Ok(Json(DeletedCount { deleted: 1 }))
}

/// POST /boards/{board_id}/notes/{note_id}/restore
///
/// A soft-deleted note only comes back on the board it was deleted from.
pub async fn restore_note(
    State(state): State<AppState>,
    Path((board_id, note_id)): Path<(String, String)>,
    Extension(caller): Extension<Caller>,
) -> ApiResult<impl IntoResponse> {
    let response = with_db(&state, move |db| {
        db.transaction(|tx| {
            access::board_for(tx, &caller, &board_id)?;
            let scope = notes::get_note_scope(tx, &note_id)?
                .filter(|scope| scope.note.board_id == board_id)
                .ok_or(ApiError::NotFound("Note"))?;
            if scope.organization_id != caller.organization_id {
                return Err(ApiError::AccessDenied);
            }
            access::ensure_can_modify(&caller, &scope.note.created_by)?;

            let now = Utc::now();
            notes::set_deleted(tx, std::slice::from_ref(&note_id), None, now)?;
            boards::touch_board(tx, &board_id, now)?;

            single_response(tx, &note_id)
        })
    })
    .await?;

    info!("Note {} restored", response.note.id);
    Ok(Json(response))
}
