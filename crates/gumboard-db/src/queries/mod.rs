pub mod boards;
pub mod comments;
pub mod items;
pub mod notes;
pub mod reactions;
pub mod users;

use rusqlite::Row;

use gumboard_types::models::{Board, ChecklistItem, Comment, Note};

pub(crate) const BOARD_COLUMNS: &str = "id, name, description, organization_id, created_by, \
     is_public, send_slack_updates, archived_at, created_at, updated_at";

pub(crate) const NOTE_COLUMNS: &str =
    "id, board_id, created_by, color, version, deleted_at, archived_at, created_at, updated_at";

pub(crate) const ITEM_COLUMNS: &str =
    "id, note_id, content, checked, sort_order, version, created_at, updated_at";

pub(crate) const COMMENT_COLUMNS: &str =
    "id, checklist_item_id, author_id, content, deleted_at, created_at, updated_at";

pub(crate) fn board_from_row(row: &Row<'_>) -> rusqlite::Result<Board> {
    Ok(Board {
        id: row.get(0)?,
        name: row.get(1)?,
        description: row.get(2)?,
        organization_id: row.get(3)?,
        created_by: row.get(4)?,
        is_public: row.get(5)?,
        send_slack_updates: row.get(6)?,
        archived_at: row.get(7)?,
        created_at: row.get(8)?,
        updated_at: row.get(9)?,
    })
}

pub(crate) fn note_from_row(row: &Row<'_>) -> rusqlite::Result<Note> {
    Ok(Note {
        id: row.get(0)?,
        board_id: row.get(1)?,
        created_by: row.get(2)?,
        color: row.get(3)?,
        version: row.get(4)?,
        deleted_at: row.get(5)?,
        archived_at: row.get(6)?,
        created_at: row.get(7)?,
        updated_at: row.get(8)?,
    })
}

pub(crate) fn item_from_row(row: &Row<'_>) -> rusqlite::Result<ChecklistItem> {
    Ok(ChecklistItem {
        id: row.get(0)?,
        note_id: row.get(1)?,
        content: row.get(2)?,
        checked: row.get(3)?,
        order: row.get(4)?,
        version: row.get(5)?,
        created_at: row.get(6)?,
        updated_at: row.get(7)?,
    })
}

pub(crate) fn comment_from_row(row: &Row<'_>) -> rusqlite::Result<Comment> {
    Ok(Comment {
        id: row.get(0)?,
        checklist_item_id: row.get(1)?,
        author_id: row.get(2)?,
        content: row.get(3)?,
        deleted_at: row.get(4)?,
        created_at: row.get(5)?,
        updated_at: row.get(6)?,
    })
}
