use anyhow::Result;
use rusqlite::{Connection, params};

use gumboard_types::models::{MemberRole, Organization, User};

use crate::OptionalExt;
use crate::models::MemberRow;

// -- Organizations --

pub fn create_organization(
    conn: &Connection,
    id: &str,
    name: &str,
    slack_channel_id: Option<&str>,
) -> Result<()> {
    conn.execute(
        "INSERT INTO organizations (id, name, slack_channel_id) VALUES (?1, ?2, ?3)",
        params![id, name, slack_channel_id],
    )?;
    Ok(())
}

pub fn get_organization(conn: &Connection, id: &str) -> Result<Option<Organization>> {
    conn.query_row(
        "SELECT id, name, slack_channel_id FROM organizations WHERE id = ?1",
        [id],
        |row| {
            Ok(Organization {
                id: row.get(0)?,
                name: row.get(1)?,
                slack_channel_id: row.get(2)?,
            })
        },
    )
    .optional()
}

// -- Users --

pub fn create_user(
    conn: &Connection,
    id: &str,
    name: &str,
    email: &str,
    organization_id: Option<&str>,
    is_admin: bool,
) -> Result<()> {
    conn.execute(
        "INSERT INTO users (id, name, email, organization_id, is_admin) VALUES (?1, ?2, ?3, ?4, ?5)",
        params![id, name, email, organization_id, is_admin],
    )?;
    Ok(())
}

pub fn add_membership(
    conn: &Connection,
    organization_id: &str,
    user_id: &str,
    role: MemberRole,
) -> Result<()> {
    conn.execute(
        "INSERT INTO memberships (organization_id, user_id, role) VALUES (?1, ?2, ?3)
         ON CONFLICT(organization_id, user_id) DO UPDATE SET role = excluded.role",
        params![organization_id, user_id, role.as_str()],
    )?;
    Ok(())
}

/// Load a user with the membership role they hold in their own organization.
pub fn get_member(conn: &Connection, user_id: &str) -> Result<Option<MemberRow>> {
    conn.query_row(
        "SELECT u.id, u.name, u.email, u.organization_id, u.is_admin, m.role
         FROM users u
         LEFT JOIN memberships m
           ON m.user_id = u.id AND m.organization_id = u.organization_id
         WHERE u.id = ?1",
        [user_id],
        |row| {
            let role: Option<String> = row.get(5)?;
            Ok(MemberRow {
                user: User {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    email: row.get(2)?,
                    organization_id: row.get(3)?,
                    is_admin: row.get(4)?,
                },
                role: role.as_deref().and_then(MemberRole::parse),
            })
        },
    )
    .optional()
}
