use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::Utc;
use uuid::Uuid;

use gumboard_db::Connection;
use gumboard_db::queries::comments;
use gumboard_types::api::{CommentRequest, DeletedCount};
use gumboard_types::models::Comment;

use crate::access;
use crate::error::{ApiError, ApiResult};
use crate::middleware::Caller;
use crate::state::{AppState, with_db};
use crate::validate::ValidJson;

/// Only the author may edit or delete a comment; admins get no override.
fn own_comment(
    conn: &Connection,
    caller: &Caller,
    note_id: &str,
    item_id: &str,
    comment_id: &str,
) -> ApiResult<Comment> {
    access::item_for(conn, caller, note_id, item_id)?;
    let comment =
        comments::get_comment(conn, item_id, comment_id)?.ok_or(ApiError::NotFound("Comment"))?;
    if comment.author_id != caller.user_id {
        return Err(ApiError::AccessDenied);
    }
    Ok(comment)
}

/// GET /notes/{note_id}/items/{item_id}/comments
pub async fn list_comments(
    State(state): State<AppState>,
    Path((note_id, item_id)): Path<(String, String)>,
    Extension(caller): Extension<Caller>,
) -> ApiResult<impl IntoResponse> {
    let list = with_db(&state, move |db| {
        db.read(|conn| {
            access::item_for(conn, &caller, &note_id, &item_id)?;
            Ok::<_, ApiError>(comments::list_comments(conn, &item_id)?)
        })
    })
    .await?;
    Ok(Json(list))
}

/// POST /notes/{note_id}/items/{item_id}/comments
pub async fn create_comment(
    State(state): State<AppState>,
    Path((note_id, item_id)): Path<(String, String)>,
    Extension(caller): Extension<Caller>,
    ValidJson(req): ValidJson<CommentRequest>,
) -> ApiResult<impl IntoResponse> {
    let comment = with_db(&state, move |db| {
        db.transaction(|tx| {
            access::item_for(tx, &caller, &note_id, &item_id)?;
            let comment = comments::insert_comment(
                tx,
                &Uuid::new_v4().to_string(),
                &item_id,
                &caller.user_id,
                req.content.trim(),
                Utc::now(),
            )?;
            Ok::<_, ApiError>(comment)
        })
    })
    .await?;
    Ok((StatusCode::CREATED, Json(comment)))
}

/// PUT /notes/{note_id}/items/{item_id}/comments/{comment_id}
pub async fn update_comment(
    State(state): State<AppState>,
    Path((note_id, item_id, comment_id)): Path<(String, String, String)>,
    Extension(caller): Extension<Caller>,
    ValidJson(req): ValidJson<CommentRequest>,
) -> ApiResult<impl IntoResponse> {
    let comment = with_db(&state, move |db| {
        db.transaction(|tx| {
            own_comment(tx, &caller, &note_id, &item_id, &comment_id)?;
            Ok::<_, ApiError>(comments::update_comment(
                tx,
                &comment_id,
                req.content.trim(),
                Utc::now(),
            )?)
        })
    })
    .await?;
    Ok(Json(comment))
}

/// DELETE /notes/{note_id}/items/{item_id}/comments/{comment_id}
pub async fn delete_comment(
    State(state): State<AppState>,
    Path((note_id, item_id, comment_id)): Path<(String, String, String)>,
    Extension(caller): Extension<Caller>,
) -> ApiResult<impl IntoResponse> {
    with_db(&state, move |db| {
        db.transaction(|tx| {
            own_comment(tx, &caller, &note_id, &item_id, &comment_id)?;
            comments::soft_delete_comment(tx, &comment_id, Utc::now())?;
            Ok::<_, ApiError>(())
        })
    })
    .await?;
    Ok(Json(DeletedCount { deleted: 1 }))
}
