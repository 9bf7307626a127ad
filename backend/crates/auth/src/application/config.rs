//! Application Configuration
//!
//! Configuration for the Auth application layer. Built once at startup and
//! shared as `Arc<AuthConfig>`; nothing here reads the environment.

use std::time::Duration;

use platform::cookie::CookieConfig;
/// Re-export SameSite and PasswordPolicy from platform
pub use platform::cookie::SameSite;
pub use platform::password::PasswordPolicy;

/// Longest span a session may be configured for (10 years)
const MAX_SESSION_SPAN: Duration = Duration::from_secs(10 * 365 * 24 * 3600);

/// Auth application configuration
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// Session cookie name
    pub session_cookie_name: String,
    /// Absolute session lifetime, counted from login / creation
    pub session_lifetime: Duration,
    /// Optional sliding inactivity timeout (capped by `session_lifetime`)
    pub session_idle_timeout: Option<Duration>,
    /// Whether to set the Secure cookie attribute (on behind TLS)
    pub cookie_secure: bool,
    /// SameSite policy
    pub cookie_same_site: SameSite,
    /// Cookie Path attribute
    pub cookie_path: String,
    /// Registration password policy
    pub password_policy: PasswordPolicy,
    /// Password pepper (optional, application-wide secret)
    pub password_pepper: Option<Vec<u8>>,
    /// Where anonymous users are sent by `require_auth`
    pub login_path: String,
    /// Where authenticated users are sent by `redirect_if_authenticated`
    pub dashboard_path: String,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            session_cookie_name: "session_id".to_string(),
            session_lifetime: Duration::from_secs(24 * 3600), // 24 hours
            session_idle_timeout: None,
            cookie_secure: false,
            cookie_same_site: SameSite::Lax,
            cookie_path: "/".to_string(),
            password_policy: PasswordPolicy::default(),
            password_pepper: None,
            login_path: "/login".to_string(),
            dashboard_path: "/dashboard".to_string(),
        }
    }
}

impl AuthConfig {
    /// Cookie attributes for the session cookie
    pub fn cookie_config(&self) -> CookieConfig {
        CookieConfig {
            name: self.session_cookie_name.clone(),
            secure: self.cookie_secure,
            http_only: true,
            same_site: self.cookie_same_site,
            path: self.cookie_path.clone(),
        }
    }

    /// Session lifetime as a chrono duration, capped at [`MAX_SESSION_SPAN`]
    pub fn session_lifetime_chrono(&self) -> chrono::Duration {
        to_chrono(self.session_lifetime)
    }

    /// Idle timeout as a chrono duration, capped at [`MAX_SESSION_SPAN`]
    pub fn session_idle_timeout_chrono(&self) -> Option<chrono::Duration> {
        self.session_idle_timeout.map(to_chrono)
    }
}

fn to_chrono(duration: Duration) -> chrono::Duration {
    chrono::Duration::from_std(duration.min(MAX_SESSION_SPAN))
        .unwrap_or_else(|_| chrono::Duration::days(3650))
}
