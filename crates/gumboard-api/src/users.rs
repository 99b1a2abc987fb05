use axum::{Extension, Json, extract::State, response::IntoResponse};
use serde::Serialize;

use gumboard_db::queries::users;
use gumboard_types::models::Organization;

use crate::error::ApiResult;
use crate::middleware::Caller;
use crate::state::{AppState, with_db};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MeResponse {
    #[serde(flatten)]
    pub caller: Caller,
    pub organization: Option<Organization>,
}

/// GET /users/me
pub async fn me(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
) -> ApiResult<impl IntoResponse> {
    let org_id = caller.organization_id.clone();
    let organization = with_db(&state, move |db| {
        Ok(db.with_conn(|conn| users::get_organization(conn, &org_id))?)
    })
    .await?;

    Ok(Json(MeResponse {
        caller,
        organization,
    }))
}
