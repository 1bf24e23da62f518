/// Persistence seams
///
/// One async trait per concern, implemented by `PgStore` (Postgres) and
/// `InMemoryStore` (tests, local runs). Handlers depend on `CatalogStore`.

mod memory;
mod postgres;

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{Genre, Movie, MovieDetails, Page, Review, StoredTokenPair, User};
use crate::error::StoreError;

pub use memory::InMemoryStore;
pub use postgres::PgStore;

#[async_trait]
pub trait UserStore: Send + Sync {
    /// Fails with `UniqueConstraintViolation` if email or username is taken (case-insensitive)
    async fn insert_user(&self, user: &User) -> Result<(), StoreError>;
    async fn find_user_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError>;
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;
    async fn email_taken(&self, email: &str) -> Result<bool, StoreError>;
    async fn username_taken(&self, username: &str) -> Result<bool, StoreError>;
    async fn list_users(&self, page: Page) -> Result<Vec<User>, StoreError>;
}

#[async_trait]
pub trait TokenStore: Send + Sync {
    /// Insert or overwrite the token pair for `user_id`, stamping `updated_at`
    async fn upsert_tokens(&self, user_id: Uuid, token: &str, refresh_token: &str) -> Result<(), StoreError>;
    async fn find_by_refresh_token(&self, refresh_token: &str) -> Result<Option<StoredTokenPair>, StoreError>;
}

#[async_trait]
pub trait GenreStore: Send + Sync {
    async fn insert_genre(&self, genre: &Genre) -> Result<(), StoreError>;
    async fn find_genre(&self, genre_id: i32) -> Result<Option<Genre>, StoreError>;
    async fn list_genres(&self, page: Page) -> Result<Vec<Genre>, StoreError>;
    /// Returns false when no genre has `genre_id`
    async fn rename_genre(&self, genre_id: i32, name: &str) -> Result<bool, StoreError>;
    async fn delete_genre(&self, genre_id: i32) -> Result<bool, StoreError>;
}

#[async_trait]
pub trait MovieStore: Send + Sync {
    async fn insert_movie(&self, movie: &Movie) -> Result<(), StoreError>;
    async fn find_movie(&self, movie_id: i32) -> Result<Option<Movie>, StoreError>;
    async fn list_movies(&self, page: Page) -> Result<Vec<Movie>, StoreError>;
    /// Case-insensitive substring match on the name
    async fn search_movies(&self, name: &str) -> Result<Vec<Movie>, StoreError>;
    async fn movies_by_genre(&self, genre_id: i32) -> Result<Vec<Movie>, StoreError>;
    async fn update_movie(&self, movie_id: i32, details: &MovieDetails) -> Result<bool, StoreError>;
    async fn delete_movie(&self, movie_id: i32) -> Result<bool, StoreError>;
}

#[async_trait]
pub trait ReviewStore: Send + Sync {
    async fn insert_review(&self, review: &Review) -> Result<(), StoreError>;
    async fn find_review(&self, id: Uuid) -> Result<Option<Review>, StoreError>;
    async fn reviews_for_movie(&self, movie_id: i32) -> Result<Vec<Review>, StoreError>;
    async fn reviews_by_user(&self, reviewer_id: Uuid) -> Result<Vec<Review>, StoreError>;
    async fn delete_review(&self, id: Uuid) -> Result<bool, StoreError>;
}

/// Everything the HTTP layer needs from persistence
pub trait CatalogStore: UserStore + TokenStore + GenreStore + MovieStore + ReviewStore {}

impl<T> CatalogStore for T where T: UserStore + TokenStore + GenreStore + MovieStore + ReviewStore {}

/// Run a store future under a deadline.
///
/// Expiry yields `StoreError::Timeout`; the caller surfaces it, nothing retries.
pub async fn bounded<T, F>(limit: Duration, operation: &'static str, future: F) -> Result<T, StoreError>
where
    F: Future<Output = Result<T, StoreError>>,
{
    match tokio::time::timeout(limit, future).await {
        Ok(result) => result,
        Err(_) => {
            tracing::warn!(operation = operation, limit_ms = limit.as_millis() as u64, "Store call timed out");
            Err(StoreError::Timeout(operation.to_string()))
        }
    }
}

/// Escape `%`, `_` and `\` for use inside an ILIKE pattern
pub(crate) fn escape_like(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_bounded_passes_result_through() {
        let result = bounded(Duration::from_secs(1), "noop", async { Ok::<_, StoreError>(7) }).await;
        assert_eq!(result, Ok(7));
    }

    #[tokio::test]
    async fn test_bounded_times_out() {
        let result = bounded(Duration::from_millis(5), "slow", async {
            tokio::time::sleep(Duration::from_millis(200)).await;
            Ok::<_, StoreError>(())
        })
        .await;
        assert_eq!(result, Err(StoreError::Timeout("slow".to_string())));
    }

    #[test]
    fn test_escape_like() {
        assert_eq!(escape_like("100%_a\\b"), "100\\%\\_a\\\\b");
        assert_eq!(escape_like("matrix"), "matrix");
    }
}
