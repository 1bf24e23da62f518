/// Token claim sets
///
/// Access tokens carry the full identity; refresh tokens carry only an
/// expiry and a random id, so a refresh token can never pass as an access
/// token (it lacks every identity field and fails to deserialize).

use chrono::Duration;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{Role, User};

/// Anything carrying an absolute expiry (Unix seconds)
pub trait Expiring {
    fn expires_at(&self) -> i64;
}

/// Access token claims
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Claims {
    pub email: String,
    pub name: String,
    pub username: String,
    /// Subject: the account id
    pub uid: String,
    pub user_type: Role,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

impl Claims {
    /// Build claims for `user`, expiring `ttl` after `now` (Unix seconds)
    pub fn for_user(user: &User, ttl: Duration, now: i64) -> Self {
        Self {
            email: user.email.clone(),
            name: user.name.clone(),
            username: user.username.clone(),
            uid: user.id.to_string(),
            user_type: user.role,
            exp: now + ttl.num_seconds(),
        }
    }
}

impl Expiring for Claims {
    fn expires_at(&self) -> i64 {
        self.exp
    }
}

/// Refresh token claims
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct RefreshClaims {
    /// Random token id; keeps two refresh tokens minted in the same second distinct
    pub jti: String,
    pub exp: i64,
}

impl RefreshClaims {
    pub fn new(ttl: Duration, now: i64) -> Self {
        Self {
            jti: Uuid::new_v4().to_string(),
            exp: now + ttl.num_seconds(),
        }
    }
}

impl Expiring for RefreshClaims {
    fn expires_at(&self) -> i64 {
        self.exp
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user() -> User {
        User::new(
            "Test Person".to_string(),
            "tester".to_string(),
            "test@example.com".to_string(),
            "$2b$04$hash".to_string(),
            Role::Admin,
        )
    }

    #[test]
    fn test_claims_creation() {
        let user = user();
        let claims = Claims::for_user(&user, Duration::hours(12), 1_000);

        assert_eq!(claims.uid, user.id.to_string());
        assert_eq!(claims.email, "test@example.com");
        assert_eq!(claims.user_type, Role::Admin);
        assert_eq!(claims.exp, 1_000 + 12 * 3600);
    }

    #[test]
    fn test_claims_wire_field_names() {
        let claims = Claims::for_user(&user(), Duration::minutes(1), 0);
        let value = serde_json::to_value(&claims).unwrap();
        for field in ["email", "name", "username", "uid", "user_type", "exp"] {
            assert!(value.get(field).is_some(), "missing {}", field);
        }
        assert_eq!(value["user_type"], "ADMIN");
    }

    #[test]
    fn test_refresh_claims_are_distinct_within_a_second() {
        let a = RefreshClaims::new(Duration::hours(100), 42);
        let b = RefreshClaims::new(Duration::hours(100), 42);
        assert_eq!(a.exp, b.exp);
        assert_ne!(a.jti, b.jti);
    }
}
