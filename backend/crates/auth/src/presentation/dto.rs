//! HTTP DTOs (Data Transfer Objects)
//!
//! Login and registration arrive as `application/x-www-form-urlencoded`.

use serde::{Deserialize, Serialize};

use crate::domain::entity::user::PublicUser;

// ============================================================================
// Login
// ============================================================================

/// Login form (no `Debug`: carries a password)
#[derive(Clone, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

// ============================================================================
// Register
// ============================================================================

/// Registration form (no `Debug`: carries passwords)
#[derive(Clone, Deserialize)]
pub struct RegisterForm {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub confirm_password: String,
}

// ============================================================================
// Dashboard
// ============================================================================

/// Dashboard response
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardResponse {
    pub user: PublicUser,
}

// ============================================================================
// Health
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}
