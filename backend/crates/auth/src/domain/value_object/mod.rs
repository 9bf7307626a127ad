//! Value Objects

pub mod email;
pub mod session_token;
pub mod user_password;

pub use email::Email;
pub use kernel::id::UserId;
pub use session_token::SessionToken;
pub use user_password::{RawPassword, UserPassword};
