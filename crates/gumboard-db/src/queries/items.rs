use anyhow::Result;
use chrono::{DateTime, Utc};
use rusqlite::{Connection, params, types::ToSql};

use gumboard_types::models::ChecklistItem;

use super::{ITEM_COLUMNS, item_from_row};
use crate::{OptionalExt, placeholders};

/// Items of a note by persisted order.
pub fn list_items(conn: &Connection, note_id: &str) -> Result<Vec<ChecklistItem>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM checklist_items WHERE note_id = ?1 ORDER BY sort_order ASC, created_at ASC",
        ITEM_COLUMNS
    ))?;
    let rows = stmt
        .query_map([note_id], item_from_row)?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rows)
}

/// Batch-fetch items for a set of notes, grouped by note then order.
pub fn items_for_notes(conn: &Connection, note_ids: &[String]) -> Result<Vec<ChecklistItem>> {
    if note_ids.is_empty() {
        return Ok(vec![]);
    }

    let sql = format!(
        "SELECT {} FROM checklist_items WHERE note_id IN ({})
         ORDER BY note_id, sort_order ASC, created_at ASC",
        ITEM_COLUMNS,
        placeholders(note_ids.len(), 0)
    );
    let mut stmt = conn.prepare(&sql)?;
    let params: Vec<&dyn ToSql> = note_ids.iter().map(|id| id as &dyn ToSql).collect();
    let rows = stmt
        .query_map(params.as_slice(), item_from_row)?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rows)
}

/// Load an item, but only if it belongs to `note_id`.
pub fn get_item(conn: &Connection, note_id: &str, item_id: &str) -> Result<Option<ChecklistItem>> {
    conn.query_row(
        &format!(
            "SELECT {} FROM checklist_items WHERE id = ?1 AND note_id = ?2",
            ITEM_COLUMNS
        ),
        [item_id, note_id],
        item_from_row,
    )
    .optional()
}

/// Insert an item after every existing one: `max(order) + 1`, or `0` on an
/// empty checklist. Existing orders are untouched.
pub fn append_item(
    conn: &Connection,
    id: &str,
    note_id: &str,
    content: &str,
    checked: bool,
    now: DateTime<Utc>,
) -> Result<ChecklistItem> {
    let order: i64 = conn.query_row(
        "SELECT COALESCE(MAX(sort_order) + 1, 0) FROM checklist_items WHERE note_id = ?1",
        [note_id],
        |row| row.get(0),
    )?;

    conn.execute(
        "INSERT INTO checklist_items (id, note_id, content, checked, sort_order, version, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, 1, ?6, ?6)",
        params![id, note_id, content, checked, order, now],
    )?;

    Ok(ChecklistItem {
        id: id.to_string(),
        note_id: note_id.to_string(),
        content: content.to_string(),
        checked,
        order,
        version: 1,
        created_at: now,
        updated_at: now,
    })
}

/// Apply a content and/or checked change. Returns the updated row.
pub fn update_item(
    conn: &Connection,
    item_id: &str,
    content: Option<&str>,
    checked: Option<bool>,
    now: DateTime<Utc>,
) -> Result<ChecklistItem> {
    let item = conn.query_row(
        &format!(
            "UPDATE checklist_items
             SET content = COALESCE(?2, content),
                 checked = COALESCE(?3, checked),
                 version = version + 1,
                 updated_at = ?4
             WHERE id = ?1
             RETURNING {}",
            ITEM_COLUMNS
        ),
        params![item_id, content, checked, now],
        item_from_row,
    )?;
    Ok(item)
}

pub fn delete_item(conn: &Connection, item_id: &str) -> Result<bool> {
    let changed = conn.execute("DELETE FROM checklist_items WHERE id = ?1", [item_id])?;
    Ok(changed > 0)
}

/// Renumber a note's items to `0..N-1`, keeping their relative order.
/// Returns how many rows had to move.
pub fn compact_orders(conn: &Connection, note_id: &str, now: DateTime<Utc>) -> Result<usize> {
    let items = list_items(conn, note_id)?;
    let mut moved = 0;
    for (index, item) in items.iter().enumerate() {
        let index = index as i64;
        if item.order != index {
            conn.execute(
                "UPDATE checklist_items SET sort_order = ?2, version = version + 1, updated_at = ?3
                 WHERE id = ?1",
                params![item.id, index, now],
            )?;
            moved += 1;
        }
    }
    Ok(moved)
}

/// Write `(id, order)` pairs for items of `note_id`. Ids that do not belong
/// to the note are skipped; the return value is the number of rows written.
pub fn apply_positions(
    conn: &Connection,
    note_id: &str,
    positions: &[(String, i64)],
    now: DateTime<Utc>,
) -> Result<usize> {
    let mut stmt = conn.prepare(
        "UPDATE checklist_items SET sort_order = ?3, version = version + 1, updated_at = ?4
         WHERE id = ?1 AND note_id = ?2",
    )?;
    let mut written = 0;
    for (id, order) in positions {
        written += stmt.execute(params![id, note_id, order, now])?;
    }
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Database;
    use crate::queries::{boards, notes, users};
    use gumboard_types::models::Board;

    fn seed(conn: &Connection, now: DateTime<Utc>) -> Result<()> {
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
        Ok(())
    }

    fn orders(conn: &Connection) -> Result<Vec<(String, i64)>> {
        Ok(list_items(conn, "n1")?
            .into_iter()
            .map(|i| (i.id, i.order))
            .collect())
    }

    #[test]
    fn append_starts_at_zero_and_goes_past_max() {
        let db = Database::open_in_memory().unwrap();
        let now = Utc::now();
        db.with_conn(|conn| {
            seed(conn, now)?;
            assert_eq!(append_item(conn, "a", "n1", "first", false, now)?.order, 0);
            assert_eq!(append_item(conn, "b", "n1", "second", false, now)?.order, 1);
            assert_eq!(append_item(conn, "c", "n1", "third", true, now)?.order, 2);
            assert_eq!(append_item(conn, "d", "n1", "fourth", false, now)?.order, 3);
            Ok(())
        })
        .unwrap();
    }

    #[test]
    fn compact_closes_gaps_after_delete() {
        let db = Database::open_in_memory().unwrap();
        let now = Utc::now();
        db.with_conn(|conn| {
            seed(conn, now)?;
            for id in ["a", "b", "c", "d"] {
                append_item(conn, id, "n1", id, false, now)?;
            }
            assert!(delete_item(conn, "b")?);
            assert_eq!(compact_orders(conn, "n1", now)?, 2);
            assert_eq!(
                orders(conn)?,
                vec![("a".into(), 0), ("c".into(), 1), ("d".into(), 2)]
            );
            Ok(())
        })
        .unwrap();
    }

    #[test]
    fn apply_positions_ignores_foreign_items() {
        let db = Database::open_in_memory().unwrap();
        let now = Utc::now();
        db.with_conn(|conn| {
            seed(conn, now)?;
            append_item(conn, "a", "n1", "a", false, now)?;
            append_item(conn, "b", "n1", "b", false, now)?;

            let written = apply_positions(
                conn,
                "n1",
                &[("b".into(), 0), ("a".into(), 1), ("zzz".into(), 2)],
                now,
            )?;
            assert_eq!(written, 2);
            assert_eq!(orders(conn)?, vec![("b".into(), 0), ("a".into(), 1)]);
            Ok(())
        })
        .unwrap();
    }

    #[test]
    fn update_keeps_unset_fields() {
        let db = Database::open_in_memory().unwrap();
        let now = Utc::now();
        db.with_conn(|conn| {
            seed(conn, now)?;
            append_item(conn, "a", "n1", "write tests", false, now)?;

            let item = update_item(conn, "a", None, Some(true), now)?;
            assert_eq!(item.content, "write tests");
            assert!(item.checked);
            assert_eq!(item.version, 2);

            let item = update_item(conn, "a", Some("write more tests"), None, now)?;
            assert_eq!(item.content, "write more tests");
            assert!(item.checked);
            Ok(())
        })
        .unwrap();
    }
}
