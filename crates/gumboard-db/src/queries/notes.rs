use anyhow::Result;
use chrono::{DateTime, Utc};
use rusqlite::{Connection, params, types::ToSql};

use gumboard_types::models::Note;

use super::{NOTE_COLUMNS, note_from_row};
use crate::models::NoteScope;
use crate::{OptionalExt, placeholders};

const SCOPED_NOTE_COLUMNS: &str = "n.id, n.board_id, n.created_by, n.color, n.version, \
     n.deleted_at, n.archived_at, n.created_at, n.updated_at, b.organization_id";

pub fn insert_note(
    conn: &Connection,
    id: &str,
    board_id: &str,
    created_by: &str,
    color: &str,
    now: DateTime<Utc>,
) -> Result<Note> {
    conn.execute(
        "INSERT INTO notes (id, board_id, created_by, color, version, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, 1, ?5, ?5)",
        params![id, board_id, created_by, color, now],
    )?;
    Ok(Note {
        id: id.to_string(),
        board_id: board_id.to_string(),
        created_by: created_by.to_string(),
        color: color.to_string(),
        version: 1,
        deleted_at: None,
        archived_at: None,
        created_at: now,
        updated_at: now,
    })
}

pub fn get_note(conn: &Connection, id: &str) -> Result<Option<Note>> {
    conn.query_row(
        &format!("SELECT {} FROM notes WHERE id = ?1", NOTE_COLUMNS),
        [id],
        note_from_row,
    )
    .optional()
}

/// Load a note with its board's organization, deleted or not.
pub fn get_note_scope(conn: &Connection, id: &str) -> Result<Option<NoteScope>> {
    conn.query_row(
        &format!(
            "SELECT {} FROM notes n JOIN boards b ON b.id = n.board_id WHERE n.id = ?1",
            SCOPED_NOTE_COLUMNS
        ),
        [id],
        |row| {
            Ok(NoteScope {
                note: note_from_row(row)?,
                organization_id: row.get(9)?,
            })
        },
    )
    .optional()
}

/// Live notes of a board. Deleted notes are never returned; `archived`
/// selects between the archive view and the regular one.
pub fn list_notes(conn: &Connection, board_id: &str, archived: bool) -> Result<Vec<Note>> {
    let archive_filter = if archived {
        "archived_at IS NOT NULL"
    } else {
        "archived_at IS NULL"
    };
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM notes
         WHERE board_id = ?1 AND deleted_at IS NULL AND {}
         ORDER BY created_at ASC",
        NOTE_COLUMNS, archive_filter
    ))?;
    let rows = stmt
        .query_map([board_id], note_from_row)?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rows)
}

/// Resolve the non-deleted notes among `ids` that sit on `board_id`.
pub fn live_notes_on_board(
    conn: &Connection,
    board_id: &str,
    ids: &[String],
) -> Result<Vec<NoteScope>> {
    if ids.is_empty() {
        return Ok(vec![]);
    }

    let sql = format!(
        "SELECT {} FROM notes n JOIN boards b ON b.id = n.board_id
         WHERE n.board_id = ?1 AND n.deleted_at IS NULL AND n.id IN ({})",
        SCOPED_NOTE_COLUMNS,
        placeholders(ids.len(), 1)
    );
    let mut stmt = conn.prepare(&sql)?;
    let mut params: Vec<&dyn ToSql> = vec![&board_id];
    params.extend(ids.iter().map(|id| id as &dyn ToSql));
    let rows = stmt
        .query_map(params.as_slice(), |row| {
            Ok(NoteScope {
                note: note_from_row(row)?,
                organization_id: row.get(9)?,
            })
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rows)
}

/// Set or clear `deleted_at` on every note in `ids`. Returns rows changed.
pub fn set_deleted(
    conn: &Connection,
    ids: &[String],
    deleted_at: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> Result<usize> {
    set_timestamp_column(conn, "deleted_at", ids, deleted_at, now)
}

/// Set or clear `archived_at` on every note in `ids`. Returns rows changed.
pub fn set_archived(
    conn: &Connection,
    ids: &[String],
    archived_at: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> Result<usize> {
    set_timestamp_column(conn, "archived_at", ids, archived_at, now)
}

fn set_timestamp_column(
    conn: &Connection,
    column: &str,
    ids: &[String],
    value: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> Result<usize> {
    if ids.is_empty() {
        return Ok(0);
    }

    let sql = format!(
        "UPDATE notes SET {} = ?1, updated_at = ?2, version = version + 1 WHERE id IN ({})",
        column,
        placeholders(ids.len(), 2)
    );
    let mut params: Vec<&dyn ToSql> = vec![&value, &now];
    params.extend(ids.iter().map(|id| id as &dyn ToSql));
    let changed = conn.execute(&sql, params.as_slice())?;
    Ok(changed)
}

pub fn update_color(conn: &Connection, id: &str, color: &str, now: DateTime<Utc>) -> Result<()> {
    conn.execute(
        "UPDATE notes SET color = ?2, updated_at = ?3, version = version + 1 WHERE id = ?1",
        params![id, color, now],
    )?;
    Ok(())
}

/// Bump the note version after a checklist change. Returns the new version.
pub fn bump_version(conn: &Connection, id: &str, now: DateTime<Utc>) -> Result<i64> {
    let version = conn.query_row(
        "UPDATE notes SET version = version + 1, updated_at = ?2 WHERE id = ?1 RETURNING version",
        params![id, now],
        |row| row.get(0),
    )?;
    Ok(version)
}
