use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// Freshly issued access/refresh pair
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

/// Last issued pair recorded for an account.
///
/// One row per user; a new login overwrites it. This is bookkeeping for the
/// refresh flow, not a revocation list.
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct StoredTokenPair {
    pub user_id: Uuid,
    pub token: String,
    pub refresh_token: String,
    pub updated_at: DateTime<Utc>,
}
