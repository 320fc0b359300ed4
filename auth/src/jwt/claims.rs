use std::collections::HashMap;

use chrono::DateTime;
use chrono::Duration;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;

/// Session token claims.
///
/// `sub` carries the account identifier; `exp` and `iat` are Unix timestamps.
/// Anything service-specific goes into `extra`, flattened into the token body.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Claims {
    /// Subject (account identifier)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sub: Option<String>,

    /// Expiration time (Unix timestamp)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exp: Option<i64>,

    /// Issued at (Unix timestamp)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub iat: Option<i64>,

    /// Additional custom fields (flattened into token)
    #[serde(flatten)]
    pub extra: HashMap<String, serde_json::Value>,
}

impl Claims {
    /// Create new empty claims.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create claims for a user, issued now and expiring after `expiration_hours`.
    pub fn for_user(user_id: impl ToString, username: String, expiration_hours: i64) -> Self {
        Self::for_user_at(
            user_id,
            username,
            Utc::now(),
            Duration::hours(expiration_hours),
        )
    }

    /// Create claims for a user with an explicit issue time.
    ///
    /// # Arguments
    /// * `user_id` - Unique user identifier
    /// * `username` - Username (stored in `extra.username`)
    /// * `issued_at` - Issue instant
    /// * `ttl` - Lifetime of the token, counted from `issued_at`
    pub fn for_user_at(
        user_id: impl ToString,
        username: String,
        issued_at: DateTime<Utc>,
        ttl: Duration,
    ) -> Self {
        let mut extra = HashMap::new();
        extra.insert("username".to_string(), serde_json::json!(username));

        Self {
            sub: Some(user_id.to_string()),
            exp: Some((issued_at + ttl).timestamp()),
            iat: Some(issued_at.timestamp()),
            extra,
        }
    }

    /// Set subject.
    pub fn with_subject(mut self, sub: impl ToString) -> Self {
        self.sub = Some(sub.to_string());
        self
    }

    /// Set expiration (Unix timestamp).
    pub fn with_expiration(mut self, exp: i64) -> Self {
        self.exp = Some(exp);
        self
    }

    /// Get username from extra fields.
    pub fn username(&self) -> Option<String> {
        self.extra
            .get("username")
            .and_then(|v| v.as_str())
            .map(|s| s.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_claims() {
        let claims = Claims::new().with_subject("farmer123");
        assert_eq!(claims.sub, Some("farmer123".to_string()));
        assert!(claims.exp.is_none());
    }

    #[test]
    fn test_for_user_expires_after_ttl() {
        let claims = Claims::for_user("farmer123", "alice".to_string(), 1);

        assert_eq!(claims.sub, Some("farmer123".to_string()));
        assert_eq!(claims.username(), Some("alice".to_string()));
        assert_eq!(claims.exp.unwrap() - claims.iat.unwrap(), 60 * 60);
    }

    #[test]
    fn test_for_user_at_uses_issue_time() {
        let issued_at = DateTime::from_timestamp(1_700_000_000, 0).unwrap();
        let claims = Claims::for_user_at("f1", "bob".to_string(), issued_at, Duration::hours(1));

        assert_eq!(claims.iat, Some(1_700_000_000));
        assert_eq!(claims.exp, Some(1_700_003_600));
    }

    #[test]
    fn test_username_flattened_into_json() {
        let claims = Claims::for_user("f1", "carol".to_string(), 1);
        let json = serde_json::to_value(&claims).unwrap();

        assert_eq!(json["username"], "carol");
        assert_eq!(json["sub"], "f1");
    }
}
