use anyhow::Result;
use chrono::{DateTime, Utc};
use rusqlite::{Connection, params};

use gumboard_types::models::Board;

use super::{BOARD_COLUMNS, board_from_row};
use crate::OptionalExt;

pub fn insert_board(conn: &Connection, board: &Board) -> Result<()> {
    conn.execute(
        &format!(
            "INSERT INTO boards ({}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            BOARD_COLUMNS
        ),
        params![
            board.id,
            board.name,
            board.description,
            board.organization_id,
            board.created_by,
            board.is_public,
            board.send_slack_updates,
            board.archived_at,
            board.created_at,
            board.updated_at,
        ],
    )?;
    Ok(())
}

pub fn get_board(conn: &Connection, id: &str) -> Result<Option<Board>> {
    conn.query_row(
        &format!("SELECT {} FROM boards WHERE id = ?1", BOARD_COLUMNS),
        [id],
        board_from_row,
    )
    .optional()
}

/// Slack channel configured for the organization that owns `board_id`.
pub fn slack_channel_for_board(conn: &Connection, board_id: &str) -> Result<Option<String>> {
    let channel: Option<Option<String>> = conn
        .query_row(
            "SELECT o.slack_channel_id FROM boards b
             JOIN organizations o ON o.id = b.organization_id
             WHERE b.id = ?1",
            [board_id],
            |row| row.get(0),
        )
        .optional()?;
    Ok(channel.flatten())
}

/// Boards of an organization with their live (non-deleted) note counts,
/// most recently active first.
pub fn list_boards(
    conn: &Connection,
    organization_id: &str,
    archived: bool,
) -> Result<Vec<(Board, i64)>> {
    let archive_filter = if archived {
        "b.archived_at IS NOT NULL"
    } else {
        "b.archived_at IS NULL"
    };
    let sql = format!(
        "SELECT b.id, b.name, b.description, b.organization_id, b.created_by, b.is_public,
                b.send_slack_updates, b.archived_at, b.created_at, b.updated_at,
                (SELECT COUNT(*) FROM notes n WHERE n.board_id = b.id AND n.deleted_at IS NULL)
         FROM boards b
         WHERE b.organization_id = ?1 AND {}
         ORDER BY b.updated_at DESC",
        archive_filter
    );

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map([organization_id], |row| Ok((board_from_row(row)?, row.get(10)?)))?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rows)
}

/// Persist the mutable board fields. `organization_id` and `created_by` are
/// never rewritten.
pub fn update_board(conn: &Connection, board: &Board) -> Result<()> {
    conn.execute(
        "UPDATE boards
         SET name = ?2, description = ?3, is_public = ?4, send_slack_updates = ?5,
             archived_at = ?6, updated_at = ?7
         WHERE id = ?1",
        params![
            board.id,
            board.name,
            board.description,
            board.is_public,
            board.send_slack_updates,
            board.archived_at,
            board.updated_at,
        ],
    )?;
    Ok(())
}

/// Bump the board's last-activity timestamp.
pub fn touch_board(conn: &Connection, board_id: &str, now: DateTime<Utc>) -> Result<()> {
    conn.execute(
        "UPDATE boards SET updated_at = ?2 WHERE id = ?1",
        params![board_id, now],
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Database;
    use crate::queries::{notes, users};
    use chrono::Duration;

    fn board(id: &str, updated_at: DateTime<Utc>) -> Board {
        Board {
            id: id.into(),
            name: format!("Board {}", id),
            description: None,
            organization_id: "org".into(),
            created_by: "u1".into(),
            is_public: false,
            send_slack_updates: true,
            archived_at: None,
            created_at: updated_at,
            updated_at,
        }
    }

    #[test]
    fn list_orders_by_activity_and_counts_live_notes() {
        let db = Database::open_in_memory().unwrap();
        let now = Utc::now();
        db.with_conn(|conn| {
            users::create_organization(conn, "org", "Acme", None)?;
            users::create_user(conn, "u1", "Ada", "ada@acme.test", Some("org"), false)?;
            insert_board(conn, &board("old", now - Duration::hours(2)))?;
            insert_board(conn, &board("new", now - Duration::hours(1)))?;

            notes::insert_note(conn, "n1", "old", "u1", "yellow", now)?;
            notes::insert_note(conn, "n2", "old", "u1", "yellow", now)?;
            notes::set_deleted(conn, &["n2".to_string()], Some(now), now)?;

            let listed = list_boards(conn, "org", false)?;
            assert_eq!(listed[0].0.id, "new");
            assert_eq!(listed[1].0.id, "old");
            assert_eq!(listed[1].1, 1);

            touch_board(conn, "old", now)?;
            let listed = list_boards(conn, "org", false)?;
            assert_eq!(listed[0].0.id, "old");
            Ok(())
        })
        .unwrap();
    }

    #[test]
    fn archived_boards_are_listed_separately() {
        let db = Database::open_in_memory().unwrap();
        let now = Utc::now();
        db.with_conn(|conn| {
            users::create_organization(conn, "org", "Acme", None)?;
            users::create_user(conn, "u1", "Ada", "ada@acme.test", Some("org"), false)?;
            let mut b = board("b1", now);
            insert_board(conn, &b)?;
            b.archived_at = Some(now);
            update_board(conn, &b)?;

            assert!(list_boards(conn, "org", false)?.is_empty());
            assert_eq!(list_boards(conn, "org", true)?.len(), 1);
            Ok(())
        })
        .unwrap();
    }
}
