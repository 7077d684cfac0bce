pub mod auth;
pub mod session;

pub use auth::AuthUser;
pub use session::{clear_session_cookie, resolve_session, RequestIdentity};
