use anyhow::Result;
use rusqlite::Connection;
use tracing::info;

pub fn run(conn: &Connection) -> Result<()> {
    conn.execute_batch("CREATE TABLE IF NOT EXISTS schema_version (version INTEGER NOT NULL);")?;

    let version: i64 = conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM schema_version",
        [],
        |r| r.get(0),
    )?;

    if version < 1 {
        info!("Running migration v1 (initial schema)");
        conn.execute_batch(
            "
            CREATE TABLE organizations (
                id                  TEXT PRIMARY KEY,
                name                TEXT NOT NULL,
                slack_channel_id    TEXT
            );

            CREATE TABLE users (
                id                  TEXT PRIMARY KEY,
                name                TEXT NOT NULL,
                email               TEXT NOT NULL UNIQUE,
                organization_id     TEXT REFERENCES organizations(id),
                is_admin            INTEGER NOT NULL DEFAULT 0
            );

            CREATE TABLE memberships (
                organization_id     TEXT NOT NULL REFERENCES organizations(id),
                user_id             TEXT NOT NULL REFERENCES users(id),
                role                TEXT NOT NULL DEFAULT 'MEMBER',
                PRIMARY KEY (organization_id, user_id)
            );

            CREATE TABLE boards (
                id                  TEXT PRIMARY KEY,
                name                TEXT NOT NULL,
                description         TEXT,
                organization_id     TEXT NOT NULL REFERENCES organizations(id),
                created_by          TEXT NOT NULL REFERENCES users(id),
                is_public           INTEGER NOT NULL DEFAULT 0,
                send_slack_updates  INTEGER NOT NULL DEFAULT 1,
                archived_at         TEXT,
                created_at          TEXT NOT NULL,
                updated_at          TEXT NOT NULL
            );

            CREATE INDEX idx_boards_org ON boards(organization_id, updated_at);

            CREATE TABLE notes (
                id                  TEXT PRIMARY KEY,
                board_id            TEXT NOT NULL REFERENCES boards(id),
                created_by          TEXT NOT NULL REFERENCES users(id),
                color               TEXT NOT NULL,
                version             INTEGER NOT NULL DEFAULT 1,
                deleted_at          TEXT,
                archived_at         TEXT,
                created_at          TEXT NOT NULL,
                updated_at          TEXT NOT NULL
            );

            CREATE INDEX idx_notes_board ON notes(board_id, created_at);

            CREATE TABLE checklist_items (
                id                  TEXT PRIMARY KEY,
                note_id             TEXT NOT NULL REFERENCES notes(id) ON DELETE CASCADE,
                content             TEXT NOT NULL,
                checked             INTEGER NOT NULL DEFAULT 0,
                sort_order          INTEGER NOT NULL,
                version             INTEGER NOT NULL DEFAULT 1,
                created_at          TEXT NOT NULL,
                updated_at          TEXT NOT NULL
            );

            CREATE INDEX idx_items_note ON checklist_items(note_id, sort_order);

            CREATE TABLE comments (
                id                  TEXT PRIMARY KEY,
                checklist_item_id   TEXT NOT NULL REFERENCES checklist_items(id) ON DELETE CASCADE,
                author_id           TEXT NOT NULL REFERENCES users(id),
                content             TEXT NOT NULL,
                deleted_at          TEXT,
                created_at          TEXT NOT NULL,
                updated_at          TEXT NOT NULL
            );

            CREATE INDEX idx_comments_item ON comments(checklist_item_id, created_at);

            CREATE TABLE reactions (
                id                  TEXT PRIMARY KEY,
                note_id             TEXT NOT NULL REFERENCES notes(id),
                user_id             TEXT NOT NULL REFERENCES users(id),
                emoji               TEXT NOT NULL,
                created_at          TEXT NOT NULL,
                UNIQUE(note_id, user_id, emoji)
            );

            CREATE INDEX idx_reactions_note ON reactions(note_id);

            INSERT INTO schema_version (version) VALUES (1);
            ",
        )?;
    }

    info!("Database migrations complete");
    Ok(())
}
