/// Row types for joined lookups. Plain entities come back as the
/// `gumboard_types::models` structs directly.
use gumboard_types::models::{MemberRole, Note, User};

/// A user together with their membership role in their own organization.
pub struct MemberRow {
    pub user: User,
    pub role: Option<MemberRole>,
}

impl MemberRow {
    /// The legacy `is_admin` flag and an `ADMIN` membership both grant
    /// override authority inside the organization.
    pub fn is_org_admin(&self) -> bool {
        self.user.is_admin || self.role == Some(MemberRole::Admin)
    }
}

/// A note joined with the organization that owns its board.
pub struct NoteScope {
    pub note: Note,
    pub organization_id: String,
}

pub struct ReactionRow {
    pub note_id: String,
    pub user_id: String,
    pub emoji: String,
}
