pub mod access;
pub mod boards;
pub mod bulk;
pub mod checklist;
pub mod comments;
pub mod error;
pub mod middleware;
pub mod notes;
pub mod notify;
pub mod reactions;
pub mod routes;
pub mod state;
pub mod users;
pub mod validate;

pub use routes::router;
pub use state::{AppState, AppStateInner};
