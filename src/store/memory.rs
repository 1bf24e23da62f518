use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{GenreStore, MovieStore, ReviewStore, TokenStore, UserStore};
use crate::domain::{Genre, Movie, MovieDetails, Page, Review, StoredTokenPair, User};
use crate::error::StoreError;

/// Process-local store with the same semantics as `PgStore`
#[derive(Default)]
pub struct InMemoryStore {
    users: RwLock<Vec<User>>,
    tokens: RwLock<HashMap<Uuid, StoredTokenPair>>,
    genres: RwLock<BTreeMap<i32, Genre>>,
    movies: RwLock<BTreeMap<i32, Movie>>,
    reviews: RwLock<Vec<Review>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of accounts with a recorded token pair
    pub async fn token_record_count(&self) -> usize {
        self.tokens.read().await.len()
    }
}

fn same_text(a: &str, b: &str) -> bool {
    a.to_lowercase() == b.to_lowercase()
}

#[async_trait]
impl UserStore for InMemoryStore {
    async fn insert_user(&self, user: &User) -> Result<(), StoreError> {
        let mut users = self.users.write().await;
        if users.iter().any(|u| same_text(&u.email, &user.email)) {
            return Err(StoreError::UniqueConstraintViolation("email already exists".to_string()));
        }
        if users.iter().any(|u| same_text(&u.username, &user.username)) {
            return Err(StoreError::UniqueConstraintViolation("username already exists".to_string()));
        }
        users.push(user.clone());
        Ok(())
    }

    async fn find_user_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        Ok(self.users.read().await.iter().find(|u| u.id == id).cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        Ok(self
            .users
            .read()
            .await
            .iter()
            .find(|u| same_text(&u.email, email))
            .cloned())
    }

    async fn email_taken(&self, email: &str) -> Result<bool, StoreError> {
        Ok(self.users.read().await.iter().any(|u| same_text(&u.email, email)))
    }

    async fn username_taken(&self, username: &str) -> Result<bool, StoreError> {
        Ok(self.users.read().await.iter().any(|u| same_text(&u.username, username)))
    }

    async fn list_users(&self, page: Page) -> Result<Vec<User>, StoreError> {
        Ok(page.window(&self.users.read().await))
    }
}

#[async_trait]
impl TokenStore for InMemoryStore {
    async fn upsert_tokens(&self, user_id: Uuid, token: &str, refresh_token: &str) -> Result<(), StoreError> {
        self.tokens.write().await.insert(
            user_id,
            StoredTokenPair {
                user_id,
                token: token.to_string(),
                refresh_token: refresh_token.to_string(),
                updated_at: Utc::now(),
            },
        );
        Ok(())
    }

    async fn find_by_refresh_token(&self, refresh_token: &str) -> Result<Option<StoredTokenPair>, StoreError> {
        Ok(self
            .tokens
            .read()
            .await
            .values()
            .find(|pair| pair.refresh_token == refresh_token)
            .cloned())
    }
}

#[async_trait]
impl GenreStore for InMemoryStore {
    async fn insert_genre(&self, genre: &Genre) -> Result<(), StoreError> {
        let mut genres = self.genres.write().await;
        if genres.contains_key(&genre.genre_id) || genres.values().any(|g| same_text(&g.name, &genre.name)) {
            return Err(StoreError::UniqueConstraintViolation("genre already exists".to_string()));
        }
        genres.insert(genre.genre_id, genre.clone());
        Ok(())
    }

    async fn find_genre(&self, genre_id: i32) -> Result<Option<Genre>, StoreError> {
        Ok(self.genres.read().await.get(&genre_id).cloned())
    }

    async fn list_genres(&self, page: Page) -> Result<Vec<Genre>, StoreError> {
        let genres: Vec<Genre> = self.genres.read().await.values().cloned().collect();
        Ok(page.window(&genres))
    }

    async fn rename_genre(&self, genre_id: i32, name: &str) -> Result<bool, StoreError> {
        let mut genres = self.genres.write().await;
        if genres
            .values()
            .any(|g| g.genre_id != genre_id && same_text(&g.name, name))
        {
            return Err(StoreError::UniqueConstraintViolation("genre already exists".to_string()));
        }
        match genres.get_mut(&genre_id) {
            Some(genre) => {
                genre.name = name.to_string();
                genre.updated_at = Utc::now();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete_genre(&self, genre_id: i32) -> Result<bool, StoreError> {
        Ok(self.genres.write().await.remove(&genre_id).is_some())
    }
}

#[async_trait]
impl MovieStore for InMemoryStore {
    async fn insert_movie(&self, movie: &Movie) -> Result<(), StoreError> {
        let mut movies = self.movies.write().await;
        if movies.contains_key(&movie.movie_id) || movies.values().any(|m| same_text(&m.name, &movie.name)) {
            return Err(StoreError::UniqueConstraintViolation("movie already exists".to_string()));
        }
        movies.insert(movie.movie_id, movie.clone());
        Ok(())
    }

    async fn find_movie(&self, movie_id: i32) -> Result<Option<Movie>, StoreError> {
        Ok(self.movies.read().await.get(&movie_id).cloned())
    }

    async fn list_movies(&self, page: Page) -> Result<Vec<Movie>, StoreError> {
        let movies: Vec<Movie> = self.movies.read().await.values().cloned().collect();
        Ok(page.window(&movies))
    }

    async fn search_movies(&self, name: &str) -> Result<Vec<Movie>, StoreError> {
        let needle = name.to_lowercase();
        Ok(self
            .movies
            .read()
            .await
            .values()
            .filter(|m| m.name.to_lowercase().contains(&needle))
            .cloned()
            .collect())
    }

    async fn movies_by_genre(&self, genre_id: i32) -> Result<Vec<Movie>, StoreError> {
        Ok(self
            .movies
            .read()
            .await
            .values()
            .filter(|m| m.genre_id == genre_id)
            .cloned()
            .collect())
    }

    async fn update_movie(&self, movie_id: i32, details: &MovieDetails) -> Result<bool, StoreError> {
        let mut movies = self.movies.write().await;
        if movies
            .values()
            .any(|m| m.movie_id != movie_id && same_text(&m.name, &details.name))
        {
            return Err(StoreError::UniqueConstraintViolation("movie already exists".to_string()));
        }
        match movies.get_mut(&movie_id) {
            Some(movie) => {
                movie.apply(details.clone());
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete_movie(&self, movie_id: i32) -> Result<bool, StoreError> {
        Ok(self.movies.write().await.remove(&movie_id).is_some())
    }
}

#[async_trait]
impl ReviewStore for InMemoryStore {
    async fn insert_review(&self, review: &Review) -> Result<(), StoreError> {
        self.reviews.write().await.push(review.clone());
        Ok(())
    }

    async fn find_review(&self, id: Uuid) -> Result<Option<Review>, StoreError> {
        Ok(self.reviews.read().await.iter().find(|r| r.id == id).cloned())
    }

    async fn reviews_for_movie(&self, movie_id: i32) -> Result<Vec<Review>, StoreError> {
        Ok(self
            .reviews
            .read()
            .await
            .iter()
            .filter(|r| r.movie_id == movie_id)
            .cloned()
            .collect())
    }

    async fn reviews_by_user(&self, reviewer_id: Uuid) -> Result<Vec<Review>, StoreError> {
        Ok(self
            .reviews
            .read()
            .await
            .iter()
            .filter(|r| r.reviewer_id == reviewer_id)
            .cloned()
            .collect())
    }

    async fn delete_review(&self, id: Uuid) -> Result<bool, StoreError> {
        let mut reviews = self.reviews.write().await;
        let before = reviews.len();
        reviews.retain(|r| r.id != id);
        Ok(reviews.len() != before)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Role;

    fn user(email: &str, username: &str) -> User {
        User::new(
            "Some Person".to_string(),
            username.to_string(),
            email.to_string(),
            "$2b$04$hash".to_string(),
            Role::User,
        )
    }

    fn details(name: &str, genre_id: i32) -> MovieDetails {
        MovieDetails {
            name: name.to_string(),
            topic: "topic".to_string(),
            genre_id,
            movie_url: "https://example.com/movie".to_string(),
        }
    }

    #[tokio::test]
    async fn test_user_uniqueness_is_case_insensitive() {
        let store = InMemoryStore::new();
        store.insert_user(&user("jane@example.com", "jane")).await.unwrap();

        let dup_email = store.insert_user(&user("JANE@example.com", "other")).await;
        assert!(matches!(dup_email, Err(StoreError::UniqueConstraintViolation(_))));

        let dup_username = store.insert_user(&user("other@example.com", "JANE")).await;
        assert!(matches!(dup_username, Err(StoreError::UniqueConstraintViolation(_))));

        assert!(store.email_taken("Jane@Example.com").await.unwrap());
        assert!(store.find_user_by_email("JANE@EXAMPLE.COM").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_genre_crud() {
        let store = InMemoryStore::new();
        store.insert_genre(&Genre::new(1, "Action".to_string())).await.unwrap();
        assert!(store.insert_genre(&Genre::new(2, "action".to_string())).await.is_err());
        assert!(store.insert_genre(&Genre::new(1, "Drama".to_string())).await.is_err());

        assert!(store.rename_genre(1, "Adventure").await.unwrap());
        assert!(!store.rename_genre(9, "Nothing").await.unwrap());
        assert_eq!(store.find_genre(1).await.unwrap().unwrap().name, "Adventure");

        assert!(store.delete_genre(1).await.unwrap());
        assert!(!store.delete_genre(1).await.unwrap());
    }

    #[tokio::test]
    async fn test_movie_search_and_filter() {
        let store = InMemoryStore::new();
        store.insert_movie(&Movie::new(1, details("The Matrix", 1))).await.unwrap();
        store.insert_movie(&Movie::new(2, details("Matrix Reloaded", 1))).await.unwrap();
        store.insert_movie(&Movie::new(3, details("Amelie", 2))).await.unwrap();

        assert_eq!(store.search_movies("matrix").await.unwrap().len(), 2);
        assert_eq!(store.movies_by_genre(2).await.unwrap().len(), 1);

        let page = store.list_movies(Page { offset: 1, limit: 1 }).await.unwrap();
        assert_eq!(page.len(), 1);
        assert_eq!(page[0].movie_id, 2);
    }

    #[tokio::test]
    async fn test_review_lifecycle() {
        let store = InMemoryStore::new();
        let reviewer = Uuid::new_v4();
        let review = Review::new(7, reviewer, "Great".to_string());
        store.insert_review(&review).await.unwrap();

        assert_eq!(store.reviews_for_movie(7).await.unwrap().len(), 1);
        assert_eq!(store.reviews_by_user(reviewer).await.unwrap().len(), 1);
        assert!(store.delete_review(review.id).await.unwrap());
        assert!(store.find_review(review.id).await.unwrap().is_none());
    }
}
