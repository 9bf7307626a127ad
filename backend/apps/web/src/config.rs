//! Server Configuration
//!
//! Everything the binary reads from the environment, resolved once at
//! startup. Invalid values fall back to their defaults with a warning so a
//! typo never prevents the server from starting.

use std::time::Duration;

use auth::AuthConfig;
use auth::application::config::PasswordPolicy;

const DEFAULT_PORT: u16 = 8080;
const DEFAULT_DATABASE_URL: &str = "sqlite://data.db?mode=rwc";
const DEFAULT_SESSION_LIFETIME: Duration = Duration::from_secs(24 * 3600);
const DEFAULT_CLEANUP_INTERVAL: Duration = Duration::from_secs(3600);
const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub port: u16,
    pub database_url: String,
    /// How often expired sessions are purged
    pub cleanup_interval: Duration,
    pub request_timeout: Duration,
    pub auth: AuthConfig,
}

impl ServerConfig {
    /// Read configuration from the process environment
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read configuration through `lookup` (tests pass a map)
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let var = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let port = parsed(&var, "PORT", DEFAULT_PORT, |v| v.parse().ok());
        let session_lifetime = parsed(
            &var,
            "SESSION_LIFETIME",
            DEFAULT_SESSION_LIFETIME,
            parse_duration,
        );
        let session_idle_timeout = var("SESSION_IDLE_TIMEOUT").and_then(|v| {
            let parsed = parse_duration(&v);
            if parsed.is_none() {
                tracing::warn!(value = %v, "Invalid SESSION_IDLE_TIMEOUT, idle timeout disabled");
            }
            parsed
        });
        let min_length = parsed(
            &var,
            "PASSWORD_MIN_LENGTH",
            PasswordPolicy::default().min_length,
            |v| v.parse().ok().filter(|n| *n > 0),
        );
        let cleanup_interval = parsed(
            &var,
            "SESSION_CLEANUP_INTERVAL",
            DEFAULT_CLEANUP_INTERVAL,
            parse_duration,
        );
        let request_timeout = parsed(
            &var,
            "REQUEST_TIMEOUT_SECS",
            DEFAULT_REQUEST_TIMEOUT,
            |v| v.parse().ok().filter(|n| *n > 0).map(Duration::from_secs),
        );

        let defaults = AuthConfig::default();
        let auth = AuthConfig {
            session_cookie_name: var("SESSION_NAME").unwrap_or(defaults.session_cookie_name),
            session_lifetime,
            session_idle_timeout,
            cookie_secure: var("SESSION_SECURE").is_some_and(|v| v == "true"),
            password_policy: PasswordPolicy { min_length },
            password_pepper: var("PASSWORD_PEPPER").map(String::into_bytes),
            ..defaults
        };

        Self {
            port,
            database_url: var("DATABASE_URL").unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string()),
            cleanup_interval,
            request_timeout,
            auth,
        }
    }
}

fn parsed<T, F>(var: &impl Fn(&str) -> Option<String>, key: &str, default: T, parse: F) -> T
where
    F: Fn(&str) -> Option<T>,
{
    match var(key) {
        None => default,
        Some(raw) => parse(&raw).unwrap_or_else(|| {
            tracing::warn!(key, value = %raw, "Invalid value, using default");
            default
        }),
    }
}

/// Parse `90`, `90s`, `15m`, `24h`, `7d` or a compound such as `1h30m`
///
/// A bare number is seconds and must stand alone. Zero is rejected.
pub fn parse_duration(raw: &str) -> Option<Duration> {
    let raw = raw.trim();
    if !raw.is_empty() && raw.bytes().all(|b| b.is_ascii_digit()) {
        return raw.parse().ok().filter(|n| *n > 0).map(Duration::from_secs);
    }

    let mut rest = raw;
    let mut secs: u64 = 0;
    while !rest.is_empty() {
        let split = rest.find(|c: char| !c.is_ascii_digit())?;
        let (digits, tail) = rest.split_at(split);
        let n: u64 = digits.parse().ok()?;

        let mut chars = tail.chars();
        let scale = match chars.next()? {
            's' => 1,
            'm' => 60,
            'h' => 3600,
            'd' => 86_400,
            _ => return None,
        };
        secs = secs.checked_add(n.checked_mul(scale)?)?;
        rest = chars.as_str();
    }

    (secs > 0).then(|| Duration::from_secs(secs))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(pairs: &[(&str, &str)]) -> ServerConfig {
        let env: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ServerConfig::from_lookup(|key| env.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config(&[]);

        assert_eq!(config.port, 8080);
        assert_eq!(config.database_url, "sqlite://data.db?mode=rwc");
        assert_eq!(config.auth.session_cookie_name, "session_id");
        assert_eq!(config.auth.session_lifetime, Duration::from_secs(86_400));
        assert_eq!(config.auth.session_idle_timeout, None);
        assert!(!config.auth.cookie_secure);
        assert_eq!(config.auth.password_policy.min_length, 1);
        assert!(config.auth.password_pepper.is_none());
        assert_eq!(config.cleanup_interval, Duration::from_secs(3600));
        assert_eq!(config.request_timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_overrides() {
        let config = config(&[
            ("PORT", "3000"),
            ("DATABASE_URL", "sqlite::memory:"),
            ("SESSION_LIFETIME", "2h"),
            ("SESSION_IDLE_TIMEOUT", "15m"),
            ("SESSION_NAME", "sid"),
            ("SESSION_SECURE", "true"),
            ("PASSWORD_MIN_LENGTH", "12"),
            ("PASSWORD_PEPPER", "pepper"),
            ("SESSION_CLEANUP_INTERVAL", "600"),
            ("REQUEST_TIMEOUT_SECS", "5"),
        ]);

        assert_eq!(config.port, 3000);
        assert_eq!(config.database_url, "sqlite::memory:");
        assert_eq!(config.auth.session_lifetime, Duration::from_secs(7200));
        assert_eq!(
            config.auth.session_idle_timeout,
            Some(Duration::from_secs(900))
        );
        assert_eq!(config.auth.session_cookie_name, "sid");
        assert!(config.auth.cookie_secure);
        assert_eq!(config.auth.password_policy.min_length, 12);
        assert_eq!(config.auth.password_pepper.as_deref(), Some(&b"pepper"[..]));
        assert_eq!(config.cleanup_interval, Duration::from_secs(600));
        assert_eq!(config.request_timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_invalid_values_fall_back() {
        let config = config(&[
            ("PORT", "http"),
            ("SESSION_LIFETIME", "forever"),
            ("SESSION_IDLE_TIMEOUT", "soon"),
            ("SESSION_SECURE", "yes"),
            ("PASSWORD_MIN_LENGTH", "0"),
            ("REQUEST_TIMEOUT_SECS", "-1"),
        ]);

        assert_eq!(config.port, 8080);
        assert_eq!(config.auth.session_lifetime, Duration::from_secs(86_400));
        assert_eq!(config.auth.session_idle_timeout, None);
        assert!(!config.auth.cookie_secure);
        assert_eq!(config.auth.password_policy.min_length, 1);
        assert_eq!(config.request_timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_parse_duration() {
        assert_eq!(parse_duration("45"), Some(Duration::from_secs(45)));
        assert_eq!(parse_duration("45s"), Some(Duration::from_secs(45)));
        assert_eq!(parse_duration("24h"), Some(Duration::from_secs(86_400)));
        assert_eq!(parse_duration("7d"), Some(Duration::from_secs(604_800)));
        assert_eq!(parse_duration("0"), None);
        assert_eq!(parse_duration("h"), None);
        assert_eq!(parse_duration("1w"), None);
        assert_eq!(parse_duration(""), None);
    }

    #[test]
    fn test_parse_compound_duration() {
        assert_eq!(parse_duration("1h30m"), Some(Duration::from_secs(5400)));
        assert_eq!(parse_duration("1d12h"), Some(Duration::from_secs(129_600)));
        assert_eq!(parse_duration("2m30s"), Some(Duration::from_secs(150)));
        assert_eq!(parse_duration("0h0m"), None);
        assert_eq!(parse_duration("1h30"), None);
        assert_eq!(parse_duration("1h 30m"), None);
        assert_eq!(parse_duration("18446744073709551615d1s"), None);

        let config = config(&[("SESSION_LIFETIME", "1h30m")]);
        assert_eq!(config.auth.session_lifetime, Duration::from_secs(5400));
    }
}
