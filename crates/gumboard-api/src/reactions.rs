use axum::{
    Extension, Json,
    extract::{Path, State},
    response::IntoResponse,
};
use chrono::Utc;
use uuid::Uuid;

use gumboard_db::queries::reactions;
use gumboard_types::api::{ToggleReactionRequest, ToggleReactionResponse};

use crate::access;
use crate::error::{ApiError, ApiResult};
use crate::middleware::Caller;
use crate::state::{AppState, with_db};
use crate::validate::ValidJson;

/// POST /notes/{note_id}/reactions
pub async fn toggle_reaction(
    State(state): State<AppState>,
    Path(note_id): Path<String>,
    Extension(caller): Extension<Caller>,
    ValidJson(req): ValidJson<ToggleReactionRequest>,
) -> ApiResult<impl IntoResponse> {
    let added = with_db(&state, move |db| {
        db.transaction(|tx| {
            access::note_for(tx, &caller, &note_id)?;
            let added = reactions::toggle_reaction(
                tx,
                &Uuid::new_v4().to_string(),
                &note_id,
                &caller.user_id,
                req.emoji.trim(),
                Utc::now(),
            )?;
            Ok::<_, ApiError>(added)
        })
    })
    .await?;

    Ok(Json(ToggleReactionResponse { added }))
}
