//! Result persistence and session history.
//!
//! Layout: `<sessions root>/<project>/run-<run id>/{<task>.json, run.json}`

mod memory;
mod sessions;
mod store;

pub use memory::MemorySink;
pub use sessions::{get_session, list_projects, list_sessions, SessionFilter, SessionInfo};
pub use store::FileStore;
