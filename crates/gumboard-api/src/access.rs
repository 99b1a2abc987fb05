//! Entity access resolution: load a board, note or checklist item for the
//! caller and enforce organization scoping and the author-or-admin rule.

use gumboard_db::Connection;
use gumboard_db::models::NoteScope;
use gumboard_db::queries::{boards, items, notes};
use gumboard_types::models::{Board, ChecklistItem};

use crate::error::ApiError;
use crate::middleware::Caller;

/// A board of the caller's organization.
pub fn board_for(conn: &Connection, caller: &Caller, board_id: &str) -> Result<Board, ApiError> {
    let board = boards::get_board(conn, board_id)?.ok_or(ApiError::NotFound("Board"))?;
    if board.organization_id != caller.organization_id {
        return Err(ApiError::AccessDenied);
    }
    Ok(board)
}

/// A live (not soft-deleted) note of the caller's organization.
pub fn note_for(conn: &Connection, caller: &Caller, note_id: &str) -> Result<NoteScope, ApiError> {
    let scope = notes::get_note_scope(conn, note_id)?
        .filter(|scope| scope.note.deleted_at.is_none())
        .ok_or(ApiError::NotFound("Note"))?;
    if scope.organization_id != caller.organization_id {
        return Err(ApiError::AccessDenied);
    }
    Ok(scope)
}

/// A live note that must sit on `board_id`; a note on another board is
/// reported as missing.
pub fn board_note_for(
    conn: &Connection,
    caller: &Caller,
    board_id: &str,
    note_id: &str,
) -> Result<NoteScope, ApiError> {
    let scope = note_for(conn, caller, note_id)?;
    if scope.note.board_id != board_id {
        return Err(ApiError::NotFound("Note"));
    }
    Ok(scope)
}

/// A checklist item of a live note of the caller's organization.
pub fn item_for(
    conn: &Connection,
    caller: &Caller,
    note_id: &str,
    item_id: &str,
) -> Result<(NoteScope, ChecklistItem), ApiError> {
    let scope = note_for(conn, caller, note_id)?;
    let item = items::get_item(conn, note_id, item_id)?.ok_or(ApiError::NotFound("Checklist item"))?;
    Ok((scope, item))
}

pub fn ensure_can_modify(caller: &Caller, created_by: &str) -> Result<(), ApiError> {
    if caller.can_modify(created_by) {
        Ok(())
    } else {
        Err(ApiError::AccessDenied)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use gumboard_db::Database;
    use gumboard_db::queries::users;

    fn caller(user_id: &str, org: &str, is_admin: bool) -> Caller {
        Caller {
            user_id: user_id.into(),
            name: user_id.into(),
            email: format!("{}@example.test", user_id),
            organization_id: org.into(),
            is_admin,
        }
    }

    fn seed(db: &Database) {
        let now = Utc::now();
        db.with_conn(|conn| {
            users::create_organization(conn, "org", "Acme", None)?;
            users::create_user(conn, "u1", "Ada", "ada@acme.test", Some("org"), false)?;
            boards::insert_board(
                conn,
                &Board {
                    id: "b1".into(),
                    name: "Sprint".into(),
                    description: None,
                    organization_id: "org".into(),
                    created_by: "u1".into(),
                    is_public: false,
                    send_slack_updates: true,
                    archived_at: None,
                    created_at: now,
                    updated_at: now,
                },
            )?;
            notes::insert_note(conn, "n1", "b1", "u1", "yellow", now)?;
            notes::insert_note(conn, "n2", "b1", "u1", "yellow", now)?;
            notes::set_deleted(conn, &["n2".to_string()], Some(now), now)?;
            items::append_item(conn, "i1", "n1", "ship it", false, now)?;
            Ok(())
        })
        .unwrap();
    }

    #[test]
    fn other_organization_is_denied() {
        let db = Database::open_in_memory().unwrap();
        seed(&db);
        db.with_conn(|conn| {
            let outsider = caller("x", "other-org", true);
            assert!(matches!(board_for(conn, &outsider, "b1"), Err(ApiError::AccessDenied)));
            assert!(matches!(note_for(conn, &outsider, "n1"), Err(ApiError::AccessDenied)));
            Ok(())
        })
        .unwrap();
    }

    #[test]
    fn deleted_and_missing_notes_are_not_found() {
        let db = Database::open_in_memory().unwrap();
        seed(&db);
        db.with_conn(|conn| {
            let member = caller("u1", "org", false);
            assert!(matches!(note_for(conn, &member, "n2"), Err(ApiError::NotFound(_))));
            assert!(matches!(note_for(conn, &member, "nope"), Err(ApiError::NotFound(_))));
            assert!(matches!(
                board_note_for(conn, &member, "other-board", "n1"),
                Err(ApiError::NotFound(_))
            ));
            Ok(())
        })
        .unwrap();
    }

    #[test]
    fn item_must_belong_to_note() {
        let db = Database::open_in_memory().unwrap();
        seed(&db);
        db.with_conn(|conn| {
            let member = caller("u1", "org", false);
            assert!(item_for(conn, &member, "n1", "i1").is_ok());
            assert!(matches!(
                item_for(conn, &member, "n1", "i-missing"),
                Err(ApiError::NotFound(_))
            ));
            Ok(())
        })
        .unwrap();
    }

    #[test]
    fn non_author_member_cannot_modify() {
        let member = caller("u2", "org", false);
        assert!(matches!(ensure_can_modify(&member, "u1"), Err(ApiError::AccessDenied)));
        let admin = caller("u3", "org", true);
        assert!(ensure_can_modify(&admin, "u1").is_ok());
    }
}
