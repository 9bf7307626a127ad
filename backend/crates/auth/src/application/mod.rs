//! Application Layer
//!
//! Application services and configuration.

pub mod config;
pub mod session_manager;
pub mod user_service;

// Re-exports
pub use config::AuthConfig;
pub use session_manager::{Session, SessionManager};
pub use user_service::{CreateUserInput, LoginInput, UserService};
