mod common;

use axum::http::StatusCode;
use serde_json::json;

use common::{TestApp, ids};

#[tokio::test]
async fn deleted_notes_disappear_from_listings() {
    let app = TestApp::new();
    let keep = app.note("alice", &["keep"]).await;
    let gone = app.note("alice", &["gone"]).await;

    let (status, _) = app.delete(&format!("/boards/b1/notes/{}", gone), "alice").await;
    assert_eq!(status, StatusCode::OK);

    let (_, notes) = app.get("/boards/b1/notes", "alice").await;
    assert_eq!(ids(&notes), vec![keep]);

    // Deleted notes are gone for item routes too
    let (status, _) = app.get(&format!("/notes/{}/items", gone), "alice").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn restore_only_works_on_the_original_board() {
    let app = TestApp::new();
    let note = app.note("alice", &["a"]).await;
    app.delete(&format!("/boards/b1/notes/{}", note), "alice").await;

    let (status, board) = app.post("/boards", "alice", json!({ "name": "Elsewhere" })).await;
    assert_eq!(status, StatusCode::CREATED);
    let other = board["id"].as_str().unwrap();

    let (status, _) = app
        .send("POST", &format!("/boards/{}/notes/{}/restore", other, note), Some("alice"), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, restored) = app
        .send("POST", &format!("/boards/b1/notes/{}/restore", note), Some("alice"), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert!(restored["deletedAt"].is_null());
    assert_eq!(restored["checklistItems"][0]["content"], "a");

    let (_, notes) = app.get("/boards/b1/notes", "alice").await;
    assert_eq!(ids(&notes), vec![note]);
}

#[tokio::test]
async fn non_author_cannot_delete_or_restore() {
    let app = TestApp::new();
    let note = app.note("alice", &[]).await;

    let (status, body) = app.delete(&format!("/boards/b1/notes/{}", note), "bob").await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "ACCESS_DENIED");

    app.delete(&format!("/boards/b1/notes/{}", note), "admin").await;
    let (status, _) = app
        .send("POST", &format!("/boards/b1/notes/{}/restore", note), Some("bob"), None)
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn archived_notes_have_their_own_view() {
    let app = TestApp::new();
    let active = app.note("alice", &[]).await;
    let shelved = app.note("alice", &[]).await;

    let (status, note) = app
        .put(&format!("/boards/b1/notes/{}", shelved), "alice", json!({ "archived": true }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert!(note["archivedAt"].is_string());

    let (_, notes) = app.get("/boards/b1/notes", "alice").await;
    assert_eq!(ids(&notes), vec![active]);
    let (_, archived) = app.get("/boards/b1/notes?archived=true", "alice").await;
    assert_eq!(ids(&archived), vec![shelved]);
}

#[tokio::test]
async fn notes_cannot_be_added_to_archived_boards() {
    let app = TestApp::new();
    let (status, _) = app.put("/boards/b1", "alice", json!({ "archived": true })).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = app.post("/boards/b1/notes", "alice", json!({})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["details"][0]["field"], "board");
}

#[tokio::test]
async fn listing_includes_items_and_reactions() {
    let app = TestApp::new();
    let note = app.note("alice", &["x", "y"]).await;

    let (status, body) = app
        .post(&format!("/notes/{}/reactions", note), "bob", json!({ "emoji": "🎉" }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["added"], true);

    let (_, notes) = app.get("/boards/b1/notes", "alice").await;
    assert_eq!(notes[0]["checklistItems"].as_array().unwrap().len(), 2);
    assert_eq!(notes[0]["reactions"][0]["emoji"], "🎉");
    assert_eq!(notes[0]["reactions"][0]["userIds"][0], "bob");

    // Toggling again removes it
    let (_, body) = app
        .post(&format!("/notes/{}/reactions", note), "bob", json!({ "emoji": "🎉" }))
        .await;
    assert_eq!(body["added"], false);
}

#[tokio::test]
async fn new_note_is_announced_with_its_first_item() {
    let app = TestApp::new();
    app.note("alice", &["", "Plan the launch"]).await;

    let sent = app.messages().await;
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].1, ":memo: Alice added a note to Board b1: Plan the launch");
}

#[tokio::test]
async fn session_is_required() {
    let app = TestApp::new();

    let (status, body) = app.send("GET", "/boards/b1/notes", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "UNAUTHENTICATED");

    let (status, _) = app.get("/boards/b1/notes", "nobody").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = app.get("/boards/b1/notes", "drifter").await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "NO_ORGANIZATION");
}

#[tokio::test]
async fn boards_are_scoped_to_the_organization() {
    let app = TestApp::new();
    app.note("alice", &[]).await;

    let (_, boards) = app.get("/boards", "bob").await;
    assert_eq!(ids(&boards), vec!["b1".to_string()]);
    assert_eq!(boards[0]["noteCount"], 1);

    let (status, _) = app.get("/boards/b-other", "alice").await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = app.put("/boards/b1", "bob", json!({ "name": "Mine now" })).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn public_board_is_readable_without_a_session() {
    let app = TestApp::new();
    app.note("alice", &["visible"]).await;

    let (status, _) = app.send("GET", "/public/boards/b1", None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    app.put("/boards/b1", "alice", json!({ "isPublic": true })).await;
    let (status, body) = app.send("GET", "/public/boards/b1", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["board"]["id"], "b1");
    assert_eq!(body["notes"][0]["checklistItems"][0]["content"], "visible");
}

#[tokio::test]
async fn me_returns_the_resolved_caller() {
    let app = TestApp::new();
    let (status, body) = app.get("/users/me", "admin").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["userId"], "admin");
    assert_eq!(body["isAdmin"], true);
    assert_eq!(body["organization"]["name"], "Acme");
}

#[tokio::test]
async fn deleted_archived_note_is_hidden_from_the_archive_view() {
    let app = TestApp::new();
    let note = app.note("alice", &[]).await;
    app.put(&format!("/boards/b1/notes/{}", note), "alice", json!({ "archived": true }))
        .await;
    app.delete(&format!("/boards/b1/notes/{}", note), "alice").await;

    let (_, archived) = app.get("/boards/b1/notes?archived=true", "alice").await;
    assert!(archived.as_array().unwrap().is_empty());
    let (_, boards) = app.get("/boards", "alice").await;
    assert_eq!(boards[0]["noteCount"], 0);
}

#[tokio::test]
async fn malformed_archived_query_is_a_validation_error() {
    let app = TestApp::new();

    let (status, body) = app.get("/boards/b1/notes?archived=maybe", "alice").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "VALIDATION_FAILED");
    assert_eq!(body["details"][0]["field"], "query");

    let (status, body) = app.get("/boards?archived=maybe", "alice").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "VALIDATION_FAILED");
}

async fn top_board(app: &TestApp) -> String {
    let (_, boards) = app.get("/boards", "alice").await;
    ids(&boards)[0].clone()
}

async fn touch_board(app: &TestApp, board_id: &str) {
    let (status, _) = app
        .post(&format!("/boards/{}/notes", board_id), "alice", json!({}))
        .await;
    assert_eq!(status, StatusCode::CREATED);
}

#[tokio::test]
async fn note_and_item_changes_move_the_board_to_the_top() {
    let app = TestApp::new();
    let note = app.note("alice", &["a", "b"]).await;

    let (status, side) = app.post("/boards", "alice", json!({ "name": "Side" })).await;
    assert_eq!(status, StatusCode::CREATED);
    let side = side["id"].as_str().unwrap().to_string();
    assert_eq!(top_board(&app).await, side);

    // Item create
    let (status, _) = app
        .post(&format!("/notes/{}/items", note), "alice", json!({ "content": "c" }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(top_board(&app).await, "b1");

    // Reorder
    touch_board(&app, &side).await;
    assert_eq!(top_board(&app).await, side);
    let (_, items) = app.get(&format!("/notes/{}/items", note), "alice").await;
    let current = ids(&items);
    let (status, _) = app
        .put(
            &format!("/notes/{}/items/reorder", note),
            "alice",
            json!({ "items": [
                { "id": current[2], "order": 0 },
                { "id": current[0], "order": 1 },
                { "id": current[1], "order": 2 },
            ]}),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(top_board(&app).await, "b1");

    // Bulk archive
    touch_board(&app, &side).await;
    assert_eq!(top_board(&app).await, side);
    let (status, _) = app
        .put(
            "/boards/b1/notes/bulk-actions",
            "alice",
            json!({ "action": "archive", "noteIds": [note] }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(top_board(&app).await, "b1");

    // Restore
    let (status, _) = app.delete(&format!("/boards/b1/notes/{}", note), "alice").await;
    assert_eq!(status, StatusCode::OK);
    touch_board(&app, &side).await;
    assert_eq!(top_board(&app).await, side);
    let (status, _) = app
        .send("POST", &format!("/boards/b1/notes/{}/restore", note), Some("alice"), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(top_board(&app).await, "b1");
}
