use anyhow::Result;
use chrono::{DateTime, Utc};
use rusqlite::{Connection, params, types::ToSql};

use crate::models::ReactionRow;
use crate::{OptionalExt, placeholders};

/// Toggle a reaction: removes if exists, inserts if not.
/// Returns true when the reaction was added.
pub fn toggle_reaction(
    conn: &Connection,
    id: &str,
    note_id: &str,
    user_id: &str,
    emoji: &str,
    now: DateTime<Utc>,
) -> Result<bool> {
    let existing: Option<String> = conn
        .query_row(
            "SELECT id FROM reactions WHERE note_id = ?1 AND user_id = ?2 AND emoji = ?3",
            params![note_id, user_id, emoji],
            |row| row.get(0),
        )
        .optional()?;

    if let Some(existing_id) = existing {
        conn.execute("DELETE FROM reactions WHERE id = ?1", [&existing_id])?;
        Ok(false)
    } else {
        conn.execute(
            "INSERT INTO reactions (id, note_id, user_id, emoji, created_at) VALUES (?1, ?2, ?3, ?4, ?5)",
            params![id, note_id, user_id, emoji, now],
        )?;
        Ok(true)
    }
}

/// Batch-fetch reactions for a set of note IDs.
pub fn reactions_for_notes(conn: &Connection, note_ids: &[String]) -> Result<Vec<ReactionRow>> {
    if note_ids.is_empty() {
        return Ok(vec![]);
    }

    let sql = format!(
        "SELECT note_id, user_id, emoji FROM reactions WHERE note_id IN ({}) ORDER BY created_at ASC",
        placeholders(note_ids.len(), 0)
    );
    let mut stmt = conn.prepare(&sql)?;
    let params: Vec<&dyn ToSql> = note_ids.iter().map(|id| id as &dyn ToSql).collect();

    let rows = stmt
        .query_map(params.as_slice(), |row| {
            Ok(ReactionRow {
                note_id: row.get(0)?,
                user_id: row.get(1)?,
                emoji: row.get(2)?,
            })
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok(rows)
}
