//! Platform Crate - Technical Infrastructure
//!
//! This crate provides shared technical foundations:
//! - Password hashing (Argon2id, salted per hash, constant-time verification)
//! - Cryptographically random session tokens
//! - Cookie header building and parsing

pub mod cookie;
pub mod crypto;
pub mod password;
