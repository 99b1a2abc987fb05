use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use axum_extra::headers::{Authorization, HeaderMapExt, authorization::Bearer};
use jsonwebtoken::{DecodingKey, Validation, decode};
use serde::Serialize;
use tracing::debug;

use gumboard_db::queries::users;
use gumboard_types::api::SessionClaims;

use crate::error::ApiError;
use crate::state::{AppState, with_db};

/// The acting user, resolved once per request by [`require_session`].
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Caller {
    pub user_id: String,
    pub name: String,
    pub email: String,
    pub organization_id: String,
    pub is_admin: bool,
}

impl Caller {
    /// Author-or-admin rule shared by notes, checklist items and boards.
    pub fn can_modify(&self, created_by: &str) -> bool {
        self.is_admin || self.user_id == created_by
    }
}

/// Validate the bearer session token and attach the caller's organization
/// context to the request.
pub async fn require_session(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let bearer = req
        .headers()
        .typed_get::<Authorization<Bearer>>()
        .ok_or(ApiError::Unauthenticated)?;

    let claims = decode_session(bearer.token(), &state.session_secret)?;
    let caller = resolve_caller(&state, claims).await?;

    req.extensions_mut().insert(caller);
    Ok(next.run(req).await)
}

pub fn decode_session(token: &str, secret: &str) -> Result<SessionClaims, ApiError> {
    let token_data = decode::<SessionClaims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|e| {
        debug!("Rejected session token: {}", e);
        ApiError::Unauthenticated
    })?;
    Ok(token_data.claims)
}

async fn resolve_caller(state: &AppState, claims: SessionClaims) -> Result<Caller, ApiError> {
    let member = with_db(state, move |db| {
        Ok(db.with_conn(|conn| users::get_member(conn, &claims.sub))?)
    })
    .await?
    .ok_or(ApiError::Unauthenticated)?;

    let is_admin = member.is_org_admin();
    let organization_id = member.user.organization_id.ok_or(ApiError::NoOrganization)?;

    Ok(Caller {
        user_id: member.user.id,
        name: member.user.name,
        email: member.user.email,
        organization_id,
        is_admin,
    })
}
