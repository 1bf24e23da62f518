use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Review {
    pub id: Uuid,
    pub movie_id: i32,
    /// Always the authenticated author, never taken from the request body
    pub reviewer_id: Uuid,
    pub review: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Review {
    pub fn new(movie_id: i32, reviewer_id: Uuid, review: String) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            movie_id,
            reviewer_id,
            review,
            created_at: now,
            updated_at: now,
        }
    }
}
