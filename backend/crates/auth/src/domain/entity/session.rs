//! Session Entity
//!
//! Server-side session record, referenced from the client by its token.
//! A session whose data carries a non-empty `user_id` is authenticated;
//! otherwise it is anonymous.

use std::collections::BTreeMap;

use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::value_object::session_token::SessionToken;
use kernel::id::UserId;

/// Key under which the authenticated user's id is stored
pub const USER_ID_KEY: &str = "user_id";

/// Session payload: string keys to JSON values
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionData(BTreeMap<String, Value>);

impl SessionData {
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: Value) {
        self.0.insert(key.into(), value);
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.0.remove(key)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Authenticated user, if any
    ///
    /// Empty or unparsable values count as anonymous.
    pub fn user_id(&self) -> Option<UserId> {
        self.get(USER_ID_KEY)?.as_str()?.parse().ok()
    }

    pub fn set_user_id(&mut self, user_id: &UserId) {
        self.insert(USER_ID_KEY, Value::String(user_id.to_string()));
    }
}

/// Persisted session
#[derive(Debug, Clone, PartialEq)]
pub struct SessionRecord {
    pub token: SessionToken,
    pub data: SessionData,
    /// Absolute end of life (Unix timestamp ms)
    pub deadline_ms: i64,
    /// Current expiry (Unix timestamp ms), never after `deadline_ms`
    pub expires_at_ms: i64,
}

impl SessionRecord {
    /// Create an empty (anonymous) session with a fresh token
    ///
    /// Lifetime is provided by the application layer (config).
    pub fn new(lifetime: Duration) -> Self {
        let deadline_ms = (Utc::now() + lifetime).timestamp_millis();

        Self {
            token: SessionToken::generate(),
            data: SessionData::default(),
            deadline_ms,
            expires_at_ms: deadline_ms,
        }
    }

    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp_millis() >= self.expires_at_ms
    }

    /// Slide expiry forward by `idle_timeout`, capped by the deadline
    pub fn touch(&mut self, idle_timeout: Duration) {
        let idle_expiry = (Utc::now() + idle_timeout).timestamp_millis();
        self.expires_at_ms = idle_expiry.min(self.deadline_ms);
    }

    /// Remaining lifetime in whole seconds (for cookie Max-Age)
    pub fn remaining_secs(&self) -> i64 {
        let now_ms = Utc::now().timestamp_millis();
        ((self.expires_at_ms - now_ms) / 1000).max(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_id_roundtrip() {
        let mut data = SessionData::default();
        assert_eq!(data.user_id(), None);

        let user_id = UserId::new();
        data.set_user_id(&user_id);
        assert_eq!(data.user_id(), Some(user_id));

        data.remove(USER_ID_KEY);
        assert_eq!(data.user_id(), None);
    }

    #[test]
    fn test_empty_user_id_is_anonymous() {
        let mut data = SessionData::default();
        data.insert(USER_ID_KEY, Value::String(String::new()));
        assert_eq!(data.user_id(), None);
    }

    #[test]
    fn test_data_serializes_as_plain_map() {
        let mut data = SessionData::default();
        data.insert("theme", Value::String("dark".into()));
        let json = serde_json::to_string(&data).unwrap();
        assert_eq!(json, r#"{"theme":"dark"}"#);
        let back: SessionData = serde_json::from_str(&json).unwrap();
        assert_eq!(back, data);
    }

    #[test]
    fn test_new_record_lifetime() {
        let record = SessionRecord::new(Duration::hours(24));
        assert!(!record.is_expired());
        assert_eq!(record.expires_at_ms, record.deadline_ms);
        assert!(record.remaining_secs() > 23 * 3600);
        assert!(record.data.is_empty());
    }

    #[test]
    fn test_touch_is_capped_by_deadline() {
        let mut record = SessionRecord::new(Duration::minutes(10));
        record.touch(Duration::hours(1));
        assert_eq!(record.expires_at_ms, record.deadline_ms);

        record.touch(Duration::minutes(1));
        assert!(record.expires_at_ms < record.deadline_ms);
    }

    #[test]
    fn test_zero_lifetime_is_expired() {
        let record = SessionRecord::new(Duration::zero());
        assert!(record.is_expired());
    }
}
