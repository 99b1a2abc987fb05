use axum::{
    Json, Router, middleware,
    routing::{get, post, put},
};
use serde_json::{Value, json};

use crate::middleware::require_session;
use crate::state::AppState;
use crate::{boards, bulk, checklist, comments, notes, reactions, users};

/// The full HTTP surface. Transport layers (CORS, tracing) are added by the
/// server binary.
pub fn router(state: AppState) -> Router {
    let public_routes = Router::new()
        .route("/health", get(health))
        .route("/public/boards/{board_id}", get(boards::public_board));

    let protected_routes = Router::new()
        .route("/users/me", get(users::me))
        .route("/boards", get(boards::list_boards).post(boards::create_board))
        .route("/boards/{board_id}", get(boards::get_board).put(boards::update_board))
        .route("/boards/{board_id}/notes", get(notes::list_notes).post(notes::create_note))
        .route(
            "/boards/{board_id}/notes/bulk-actions",
            put(bulk::bulk_action).delete(bulk::bulk_delete_action),
        )
        .route("/boards/{board_id}/notes/bulk-delete", post(bulk::bulk_delete))
        .route(
            "/boards/{board_id}/notes/{note_id}",
            put(notes::update_note).delete(notes::delete_note),
        )
        .route("/boards/{board_id}/notes/{note_id}/restore", post(notes::restore_note))
        .route(
            "/notes/{note_id}/items",
            get(checklist::list_items).post(checklist::create_item),
        )
        .route("/notes/{note_id}/items/reorder", put(checklist::reorder_items))
        .route(
            "/notes/{note_id}/items/{item_id}",
            put(checklist::update_item).delete(checklist::delete_item),
        )
        .route(
            "/notes/{note_id}/items/{item_id}/comments",
            get(comments::list_comments).post(comments::create_comment),
        )
        .route(
            "/notes/{note_id}/items/{item_id}/comments/{comment_id}",
            put(comments::update_comment).delete(comments::delete_comment),
        )
        .route("/notes/{note_id}/reactions", post(reactions::toggle_reaction))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_session));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .with_state(state)
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
