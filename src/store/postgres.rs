use async_trait::async_trait;
use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use super::{escape_like, GenreStore, MovieStore, ReviewStore, TokenStore, UserStore};
use crate::domain::{Genre, Movie, MovieDetails, Page, Review, StoredTokenPair, User, UserRow};
use crate::error::StoreError;

const USER_COLUMNS: &str = "id, name, username, email, password_hash, user_type, created_at, updated_at";
const MOVIE_COLUMNS: &str = "movie_id, name, topic, genre_id, movie_url, created_at, updated_at";
const REVIEW_COLUMNS: &str = "id, movie_id, reviewer_id, review, created_at, updated_at";

/// Postgres-backed store over a shared connection pool
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Apply pending migrations from `./migrations`
    pub async fn migrate(&self) -> Result<(), StoreError> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| StoreError::Unexpected(format!("migration failed: {}", e)))
    }
}

fn into_user(row: UserRow) -> Result<User, StoreError> {
    User::try_from(row).map_err(|e| StoreError::Unexpected(format!("corrupt user row: {}", e)))
}

#[async_trait]
impl UserStore for PgStore {
    async fn insert_user(&self, user: &User) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO users (id, name, username, email, password_hash, user_type, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(user.id)
        .bind(&user.name)
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.role.as_str())
        .bind(user.created_at)
        .bind(user.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn find_user_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        let row = sqlx::query_as::<_, UserRow>(&format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.map(into_user).transpose()
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {} FROM users WHERE lower(email) = lower($1)",
            USER_COLUMNS
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        row.map(into_user).transpose()
    }

    async fn email_taken(&self, email: &str) -> Result<bool, StoreError> {
        let taken = sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM users WHERE lower(email) = lower($1))")
            .bind(email)
            .fetch_one(&self.pool)
            .await?;
        Ok(taken)
    }

    async fn username_taken(&self, username: &str) -> Result<bool, StoreError> {
        let taken =
            sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM users WHERE lower(username) = lower($1))")
                .bind(username)
                .fetch_one(&self.pool)
                .await?;
        Ok(taken)
    }

    async fn list_users(&self, page: Page) -> Result<Vec<User>, StoreError> {
        let rows = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {} FROM users ORDER BY created_at, id OFFSET $1 LIMIT $2",
            USER_COLUMNS
        ))
        .bind(page.offset)
        .bind(page.limit)
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(into_user).collect()
    }
}

#[async_trait]
impl TokenStore for PgStore {
    async fn upsert_tokens(&self, user_id: Uuid, token: &str, refresh_token: &str) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO user_tokens (user_id, token, refresh_token, updated_at)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (user_id)
            DO UPDATE SET token = EXCLUDED.token,
                          refresh_token = EXCLUDED.refresh_token,
                          updated_at = EXCLUDED.updated_at
            "#,
        )
        .bind(user_id)
        .bind(token)
        .bind(refresh_token)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn find_by_refresh_token(&self, refresh_token: &str) -> Result<Option<StoredTokenPair>, StoreError> {
        let pair = sqlx::query_as::<_, StoredTokenPair>(
            "SELECT user_id, token, refresh_token, updated_at FROM user_tokens WHERE refresh_token = $1",
        )
        .bind(refresh_token)
        .fetch_optional(&self.pool)
        .await?;
        Ok(pair)
    }
}

#[async_trait]
impl GenreStore for PgStore {
    async fn insert_genre(&self, genre: &Genre) -> Result<(), StoreError> {
        sqlx::query("INSERT INTO genres (genre_id, name, created_at, updated_at) VALUES ($1, $2, $3, $4)")
            .bind(genre.genre_id)
            .bind(&genre.name)
            .bind(genre.created_at)
            .bind(genre.updated_at)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn find_genre(&self, genre_id: i32) -> Result<Option<Genre>, StoreError> {
        let genre = sqlx::query_as::<_, Genre>(
            "SELECT genre_id, name, created_at, updated_at FROM genres WHERE genre_id = $1",
        )
        .bind(genre_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(genre)
    }

    async fn list_genres(&self, page: Page) -> Result<Vec<Genre>, StoreError> {
        let genres = sqlx::query_as::<_, Genre>(
            "SELECT genre_id, name, created_at, updated_at FROM genres ORDER BY genre_id OFFSET $1 LIMIT $2",
        )
        .bind(page.offset)
        .bind(page.limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(genres)
    }

    async fn rename_genre(&self, genre_id: i32, name: &str) -> Result<bool, StoreError> {
        let result = sqlx::query("UPDATE genres SET name = $2, updated_at = $3 WHERE genre_id = $1")
            .bind(genre_id)
            .bind(name)
            .bind(Utc::now())
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete_genre(&self, genre_id: i32) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM genres WHERE genre_id = $1")
            .bind(genre_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl MovieStore for PgStore {
    async fn insert_movie(&self, movie: &Movie) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO movies (movie_id, name, topic, genre_id, movie_url, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(movie.movie_id)
        .bind(&movie.name)
        .bind(&movie.topic)
        .bind(movie.genre_id)
        .bind(&movie.movie_url)
        .bind(movie.created_at)
        .bind(movie.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn find_movie(&self, movie_id: i32) -> Result<Option<Movie>, StoreError> {
        let movie = sqlx::query_as::<_, Movie>(&format!("SELECT {} FROM movies WHERE movie_id = $1", MOVIE_COLUMNS))
            .bind(movie_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(movie)
    }

    async fn list_movies(&self, page: Page) -> Result<Vec<Movie>, StoreError> {
        let movies = sqlx::query_as::<_, Movie>(&format!(
            "SELECT {} FROM movies ORDER BY movie_id OFFSET $1 LIMIT $2",
            MOVIE_COLUMNS
        ))
        .bind(page.offset)
        .bind(page.limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(movies)
    }

    async fn search_movies(&self, name: &str) -> Result<Vec<Movie>, StoreError> {
        let pattern = format!("%{}%", escape_like(name));
        let movies = sqlx::query_as::<_, Movie>(&format!(
            r"SELECT {} FROM movies WHERE name ILIKE $1 ESCAPE '\' ORDER BY movie_id",
            MOVIE_COLUMNS
        ))
        .bind(pattern)
        .fetch_all(&self.pool)
        .await?;
        Ok(movies)
    }

    async fn movies_by_genre(&self, genre_id: i32) -> Result<Vec<Movie>, StoreError> {
        let movies = sqlx::query_as::<_, Movie>(&format!(
            "SELECT {} FROM movies WHERE genre_id = $1 ORDER BY movie_id",
            MOVIE_COLUMNS
        ))
        .bind(genre_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(movies)
    }

    async fn update_movie(&self, movie_id: i32, details: &MovieDetails) -> Result<bool, StoreError> {
        let result = sqlx::query(
            r#"
            UPDATE movies
            SET name = $2, topic = $3, genre_id = $4, movie_url = $5, updated_at = $6
            WHERE movie_id = $1
            "#,
        )
        .bind(movie_id)
        .bind(&details.name)
        .bind(&details.topic)
        .bind(details.genre_id)
        .bind(&details.movie_url)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete_movie(&self, movie_id: i32) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM movies WHERE movie_id = $1")
            .bind(movie_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl ReviewStore for PgStore {
    async fn insert_review(&self, review: &Review) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO reviews (id, movie_id, reviewer_id, review, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(review.id)
        .bind(review.movie_id)
        .bind(review.reviewer_id)
        .bind(&review.review)
        .bind(review.created_at)
        .bind(review.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn find_review(&self, id: Uuid) -> Result<Option<Review>, StoreError> {
        let review = sqlx::query_as::<_, Review>(&format!("SELECT {} FROM reviews WHERE id = $1", REVIEW_COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(review)
    }

    async fn reviews_for_movie(&self, movie_id: i32) -> Result<Vec<Review>, StoreError> {
        let reviews = sqlx::query_as::<_, Review>(&format!(
            "SELECT {} FROM reviews WHERE movie_id = $1 ORDER BY created_at",
            REVIEW_COLUMNS
        ))
        .bind(movie_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(reviews)
    }

    async fn reviews_by_user(&self, reviewer_id: Uuid) -> Result<Vec<Review>, StoreError> {
        let reviews = sqlx::query_as::<_, Review>(&format!(
            "SELECT {} FROM reviews WHERE reviewer_id = $1 ORDER BY created_at",
            REVIEW_COLUMNS
        ))
        .bind(reviewer_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(reviews)
    }

    async fn delete_review(&self, id: Uuid) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM reviews WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
