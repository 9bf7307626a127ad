//! Infrastructure Layer
//!
//! Store implementations for the domain repository traits.

pub mod memory;
pub mod sqlite;

pub use memory::MemoryAuthRepository;
pub use sqlite::SqliteAuthRepository;

#[cfg(test)]
pub(crate) mod flaky;
