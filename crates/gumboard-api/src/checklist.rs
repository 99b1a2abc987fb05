//! Checklist items: append, update, delete with compaction, and batch
//! reorder. Within a note, item orders are always `0..N-1`.

use std::collections::HashSet;

use axum::{
    Extension, Json,
    extract::{Path, State},
    response::IntoResponse,
};
use chrono::Utc;
use tracing::info;
use uuid::Uuid;

use gumboard_db::queries::{boards, items, notes};
use gumboard_types::api::{
    CreateItemRequest, DeletedCount, ItemListQuery, ItemPosition, ReorderRequest,
    UpdateItemRequest,
};
use gumboard_types::models::ChecklistItem;

use crate::access;
use crate::error::{ApiError, ApiResult};
use crate::middleware::Caller;
use crate::notify::{Activity, ChecklistEvent};
use crate::state::{AppState, with_db};
use crate::validate::{ValidJson, ValidQuery};

/// Presentation order: unchecked items first, then checked ones, each group
/// by stored order. Never written back.
pub fn display_sort(mut list: Vec<ChecklistItem>) -> Vec<ChecklistItem> {
    list.sort_by_key(|item| (item.checked, item.order));
    list
}

/// A reorder must name every current item exactly once.
pub fn check_reorder(current: &[ChecklistItem], positions: &[ItemPosition]) -> ApiResult<()> {
    if positions.len() != current.len() {
        return Err(ApiError::CountMismatch {
            expected: current.len(),
            actual: positions.len(),
        });
    }

    let known: HashSet<&str> = current.iter().map(|item| item.id.as_str()).collect();
    let unknown: Vec<&str> = positions
        .iter()
        .map(|p| p.id.as_str())
        .filter(|id| !known.contains(id))
        .collect();
    if !unknown.is_empty() {
        return Err(ApiError::invalid(
            "items",
            format!("items not on this note: {}", unknown.join(", ")),
        ));
    }
    Ok(())
}

/// Rank submitted positions by their order value and renumber them
/// `0..N-1`. Equal values keep the sequence they were sent in.
pub fn normalize_positions(positions: &[ItemPosition]) -> Vec<(String, i64)> {
    let mut ranked: Vec<&ItemPosition> = positions.iter().collect();
    ranked.sort_by_key(|p| p.order);
    ranked
        .into_iter()
        .enumerate()
        .map(|(index, p)| (p.id.clone(), index as i64))
        .collect()
}

fn check_version(current: i64, expected: Option<i64>) -> ApiResult<()> {
    match expected {
        Some(v) if v != current => Err(ApiError::VersionConflict { current }),
        _ => Ok(()),
    }
}

/// GET /notes/{note_id}/items
pub async fn list_items(
    State(state): State<AppState>,
    Path(note_id): Path<String>,
    ValidQuery(query): ValidQuery<ItemListQuery>,
    Extension(caller): Extension<Caller>,
) -> ApiResult<impl IntoResponse> {
    let display = match query.sort.as_deref() {
        None | Some("order") => false,
        Some("display") => true,
        Some(other) => {
            return Err(ApiError::invalid(
                "sort",
                format!("unknown sort '{}', expected 'order' or 'display'", other),
            ));
        }
    };

    let list = with_db(&state, move |db| {
        db.read(|conn| {
            access::note_for(conn, &caller, &note_id)?;
            Ok::<_, ApiError>(items::list_items(conn, &note_id)?)
        })
    })
    .await?;

    Ok(Json(if display { display_sort(list) } else { list }))
}

/// POST /notes/{note_id}/items
pub async fn create_item(
    State(state): State<AppState>,
    Path(note_id): Path<String>,
    Extension(caller): Extension<Caller>,
    ValidJson(req): ValidJson<CreateItemRequest>,
) -> ApiResult<impl IntoResponse> {
    let (item, activity) = with_db(&state, move |db| {
        db.transaction(|tx| {
            let scope = access::note_for(tx, &caller, &note_id)?;
            let now = Utc::now();
            let item = items::append_item(
                tx,
                &Uuid::new_v4().to_string(),
                &note_id,
                &req.content,
                req.checked,
                now,
            )?;
            notes::bump_version(tx, &note_id, now)?;
            boards::touch_board(tx, &scope.note.board_id, now)?;

            let activity = Activity::load(
                tx,
                &caller,
                &scope.note.board_id,
                ChecklistEvent::ItemAdded,
                &item.content,
            )?;
            Ok::<_, ApiError>((item, activity))
        })
    })
    .await?;

    if let Some(activity) = activity {
        state.notifier.dispatch(activity);
    }
    Ok(Json(item))
}

/// PUT /notes/{note_id}/items/{item_id}
pub async fn update_item(
    State(state): State<AppState>,
    Path((note_id, item_id)): Path<(String, String)>,
    Extension(caller): Extension<Caller>,
    ValidJson(req): ValidJson<UpdateItemRequest>,
) -> ApiResult<impl IntoResponse> {
    let (item, activity) = with_db(&state, move |db| {
        db.transaction(|tx| {
            let (scope, before) = access::item_for(tx, &caller, &note_id, &item_id)?;
            access::ensure_can_modify(&caller, &scope.note.created_by)?;
            check_version(before.version, req.version)?;

            let now = Utc::now();
            let item = items::update_item(tx, &item_id, req.content.as_deref(), req.checked, now)?;
            notes::bump_version(tx, &note_id, now)?;
            boards::touch_board(tx, &scope.note.board_id, now)?;

            // Only a false -> true transition counts as completion
            let activity = if !before.checked && item.checked {
                Activity::load(
                    tx,
                    &caller,
                    &scope.note.board_id,
                    ChecklistEvent::ItemCompleted,
                    &item.content,
                )?
            } else {
                None
            };
            Ok::<_, ApiError>((item, activity))
        })
    })
    .await?;

    if let Some(activity) = activity {
        state.notifier.dispatch(activity);
    }
    Ok(Json(item))
}

/// DELETE /notes/{note_id}/items/{item_id}
pub async fn delete_item(
    State(state): State<AppState>,
    Path((note_id, item_id)): Path<(String, String)>,
    Extension(caller): Extension<Caller>,
) -> ApiResult<impl IntoResponse> {
    let moved = with_db(&state, move |db| {
        db.transaction(|tx| {
            let (scope, _) = access::item_for(tx, &caller, &note_id, &item_id)?;
            access::ensure_can_modify(&caller, &scope.note.created_by)?;

            let now = Utc::now();
            items::delete_item(tx, &item_id)?;
            let moved = items::compact_orders(tx, &note_id, now)?;
            notes::bump_version(tx, &note_id, now)?;
            boards::touch_board(tx, &scope.note.board_id, now)?;
            Ok::<_, ApiError>(moved)
        })
    })
    .await?;

    info!("Checklist item deleted; {} remaining items renumbered", moved);
    Ok(Json(DeletedCount { deleted: 1 }))
}

/// PUT /notes/{note_id}/items/reorder
pub async fn reorder_items(
    State(state): State<AppState>,
    Path(note_id): Path<String>,
    Extension(caller): Extension<Caller>,
    ValidJson(req): ValidJson<ReorderRequest>,
) -> ApiResult<impl IntoResponse> {
    let list = with_db(&state, move |db| {
        db.transaction(|tx| {
            let scope = access::note_for(tx, &caller, &note_id)?;
            access::ensure_can_modify(&caller, &scope.note.created_by)?;
            check_version(scope.note.version, req.version)?;

            let current = items::list_items(tx, &note_id)?;
            check_reorder(&current, &req.items)?;

            let now = Utc::now();
            items::apply_positions(tx, &note_id, &normalize_positions(&req.items), now)?;
            notes::bump_version(tx, &note_id, now)?;
            boards::touch_board(tx, &scope.note.board_id, now)?;

            Ok::<_, ApiError>(items::list_items(tx, &note_id)?)
        })
    })
    .await?;

    Ok(Json(list))
}
