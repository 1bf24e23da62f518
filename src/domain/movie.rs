use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Movie {
    pub movie_id: i32,
    pub name: String,
    pub topic: String,
    pub genre_id: i32,
    pub movie_url: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Mutable fields of a movie, shared by create and update
#[derive(Debug, Clone, PartialEq)]
pub struct MovieDetails {
    pub name: String,
    pub topic: String,
    pub genre_id: i32,
    pub movie_url: String,
}

impl Movie {
    pub fn new(movie_id: i32, details: MovieDetails) -> Self {
        let now = Utc::now();
        Self {
            movie_id,
            name: details.name,
            topic: details.topic,
            genre_id: details.genre_id,
            movie_url: details.movie_url,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn apply(&mut self, details: MovieDetails) {
        self.name = details.name;
        self.topic = details.topic;
        self.genre_id = details.genre_id;
        self.movie_url = details.movie_url;
        self.updated_at = Utc::now();
    }
}
