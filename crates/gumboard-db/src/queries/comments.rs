use anyhow::Result;
use chrono::{DateTime, Utc};
use rusqlite::{Connection, params};

use gumboard_types::models::Comment;

use super::{COMMENT_COLUMNS, comment_from_row};
use crate::OptionalExt;

pub fn insert_comment(
    conn: &Connection,
    id: &str,
    checklist_item_id: &str,
    author_id: &str,
    content: &str,
    now: DateTime<Utc>,
) -> Result<Comment> {
    conn.execute(
        "INSERT INTO comments (id, checklist_item_id, author_id, content, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?5)",
        params![id, checklist_item_id, author_id, content, now],
    )?;
    Ok(Comment {
        id: id.to_string(),
        checklist_item_id: checklist_item_id.to_string(),
        author_id: author_id.to_string(),
        content: content.to_string(),
        deleted_at: None,
        created_at: now,
        updated_at: now,
    })
}

/// Load a live comment, but only if it is attached to `checklist_item_id`.
pub fn get_comment(
    conn: &Connection,
    checklist_item_id: &str,
    comment_id: &str,
) -> Result<Option<Comment>> {
    conn.query_row(
        &format!(
            "SELECT {} FROM comments
             WHERE id = ?1 AND checklist_item_id = ?2 AND deleted_at IS NULL",
            COMMENT_COLUMNS
        ),
        [comment_id, checklist_item_id],
        comment_from_row,
    )
    .optional()
}

pub fn list_comments(conn: &Connection, checklist_item_id: &str) -> Result<Vec<Comment>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM comments
         WHERE checklist_item_id = ?1 AND deleted_at IS NULL
         ORDER BY created_at ASC",
        COMMENT_COLUMNS
    ))?;
    let rows = stmt
        .query_map([checklist_item_id], comment_from_row)?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rows)
}

pub fn update_comment(
    conn: &Connection,
    comment_id: &str,
    content: &str,
    now: DateTime<Utc>,
) -> Result<Comment> {
    let comment = conn.query_row(
        &format!(
            "UPDATE comments SET content = ?2, updated_at = ?3 WHERE id = ?1 RETURNING {}",
            COMMENT_COLUMNS
        ),
        params![comment_id, content, now],
        comment_from_row,
    )?;
    Ok(comment)
}

pub fn soft_delete_comment(conn: &Connection, comment_id: &str, now: DateTime<Utc>) -> Result<()> {
    conn.execute(
        "UPDATE comments SET deleted_at = ?2, updated_at = ?2 WHERE id = ?1",
        params![comment_id, now],
    )?;
    Ok(())
}

