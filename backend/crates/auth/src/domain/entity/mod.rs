//! Entities

pub mod session;
pub mod user;

pub use session::{SessionData, SessionRecord, USER_ID_KEY};
pub use user::{PublicUser, User};
