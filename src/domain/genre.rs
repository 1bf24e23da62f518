use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Genre {
    pub genre_id: i32,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Genre {
    pub fn new(genre_id: i32, name: String) -> Self {
        let now = Utc::now();
        Self {
            genre_id,
            name,
            created_at: now,
            updated_at: now,
        }
    }
}
