use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::Utc;
use tracing::info;
use uuid::Uuid;

use gumboard_db::queries::{boards, notes};
use gumboard_types::api::{
    ArchivedQuery, BoardSummary, CreateBoardRequest, PublicBoardResponse, UpdateBoardRequest,
};
use gumboard_types::models::Board;

use crate::access;
use crate::error::{ApiError, ApiResult};
use crate::middleware::Caller;
use crate::notes::note_responses;
use crate::state::{AppState, with_db};
use crate::validate::{ValidJson, ValidQuery};

/// GET /boards
pub async fn list_boards(
    State(state): State<AppState>,
    ValidQuery(query): ValidQuery<ArchivedQuery>,
    Extension(caller): Extension<Caller>,
) -> ApiResult<impl IntoResponse> {
    let rows = with_db(&state, move |db| {
        Ok(db.with_conn(|conn| boards::list_boards(conn, &caller.organization_id, query.archived))?)
    })
    .await?;

    let summaries: Vec<BoardSummary> = rows
        .into_iter()
        .map(|(board, note_count)| BoardSummary { board, note_count })
        .collect();
    Ok(Json(summaries))
}

/// POST /boards
pub async fn create_board(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    ValidJson(req): ValidJson<CreateBoardRequest>,
) -> ApiResult<impl IntoResponse> {
    let now = Utc::now();
    let board = Board {
        id: Uuid::new_v4().to_string(),
        name: req.name.trim().to_string(),
        description: req.description,
        organization_id: caller.organization_id.clone(),
        created_by: caller.user_id.clone(),
        is_public: req.is_public,
        send_slack_updates: req.send_slack_updates,
        archived_at: None,
        created_at: now,
        updated_at: now,
    };

    let board = with_db(&state, move |db| {
        db.with_conn(|conn| boards::insert_board(conn, &board))?;
        Ok(board)
    })
    .await?;

    info!("Board '{}' created by {}", board.name, caller.user_id);
    Ok((StatusCode::CREATED, Json(board)))
}

/// GET /boards/{board_id}
pub async fn get_board(
    State(state): State<AppState>,
    Path(board_id): Path<String>,
    Extension(caller): Extension<Caller>,
) -> ApiResult<impl IntoResponse> {
    let board = with_db(&state, move |db| {
        db.read(|conn| access::board_for(conn, &caller, &board_id))
    })
    .await?;
    Ok(Json(board))
}

/// PUT /boards/{board_id}
pub async fn update_board(
    State(state): State<AppState>,
    Path(board_id): Path<String>,
    Extension(caller): Extension<Caller>,
    ValidJson(req): ValidJson<UpdateBoardRequest>,
) -> ApiResult<impl IntoResponse> {
    let board = with_db(&state, move |db| {
        db.transaction(|tx| {
            let mut board = access::board_for(tx, &caller, &board_id)?;
            access::ensure_can_modify(&caller, &board.created_by)?;

            let now = Utc::now();
            if let Some(name) = req.name {
                board.name = name.trim().to_string();
            }
            if let Some(description) = req.description {
                board.description = Some(description);
            }
            if let Some(is_public) = req.is_public {
                board.is_public = is_public;
            }
            if let Some(send) = req.send_slack_updates {
                board.send_slack_updates = send;
            }
            match req.archived {
                Some(true) if board.archived_at.is_none() => board.archived_at = Some(now),
                Some(false) => board.archived_at = None,
                _ => {}
            }
            board.updated_at = now;

            boards::update_board(tx, &board)?;
            Ok::<_, ApiError>(board)
        })
    })
    .await?;

    Ok(Json(board))
}

/// GET /public/boards/{board_id}
///
/// Read-only view of a public board. Private and archived boards look
/// exactly like missing ones.
pub async fn public_board(
    State(state): State<AppState>,
    Path(board_id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let response = with_db(&state, move |db| {
        db.read(|conn| {
            let board = boards::get_board(conn, &board_id)?
                .filter(|b| b.is_public && b.archived_at.is_none())
                .ok_or(ApiError::NotFound("Board"))?;
            let list = notes::list_notes(conn, &board.id, false)?;
            let notes = note_responses(conn, list)?;
            Ok::<_, ApiError>(PublicBoardResponse { board, notes })
        })
    })
    .await?;

    Ok(Json(response))
}
