use actix_web::dev::Server;
use actix_web::{middleware::Logger, web, App, HttpResponse, HttpServer};
use std::net::TcpListener;
use std::sync::Arc;
use std::time::Duration;

use crate::auth::{CredentialHasher, TokenCodec};
use crate::error::{AppError, ValidationError};
use crate::logger::LoggerMiddleware;
use crate::middleware::JwtMiddleware;
use crate::routes::{
    add_review, create_genre, create_movie, delete_genre, delete_movie, delete_review, filter_movies_by_genre,
    get_genre, get_genres, get_movie, get_movies, get_user, get_users, health_check, login, refresh,
    reviews_by_user, reviews_for_movie, search_movies, signup, update_genre, update_movie, welcome,
};
use crate::store::CatalogStore;

/// Shared, read-only state handed to every worker
pub struct AppState {
    pub store: Arc<dyn CatalogStore>,
    pub tokens: TokenCodec,
    pub hasher: CredentialHasher,
    /// Bound for each store round-trip and each password hash/verify
    pub store_timeout: Duration,
}

/// Turn an extractor rejection into the JSON validation error body
fn extractor_error(err: impl std::fmt::Display) -> actix_web::Error {
    AppError::Validation(ValidationError::InvalidFormat(err.to_string())).into()
}

pub fn run(listener: TcpListener, state: AppState) -> Result<Server, std::io::Error> {
    let tokens = state.tokens.clone();
    let state = web::Data::new(state);

    let server = HttpServer::new(move || {
        App::new()
            // Global middleware
            .wrap(LoggerMiddleware)
            .wrap(Logger::default())

            // Shared state
            .app_data(state.clone())
            .app_data(web::JsonConfig::default().error_handler(|err, _req| extractor_error(err)))
            .app_data(web::QueryConfig::default().error_handler(|err, _req| extractor_error(err)))
            .app_data(web::PathConfig::default().error_handler(|err, _req| extractor_error(err)))

            // Public routes (no authentication required)
            .route("/health_check", web::get().to(health_check))
            .route("/api", web::get().to(welcome))
            .route("/users/signup", web::post().to(signup))
            .route("/users/login", web::post().to(login))
            .route("/users/refresh", web::post().to(refresh))

            // Protected routes (require a verified access token)
            .service(
                web::scope("")
                    .wrap(JwtMiddleware::new(tokens.clone()))
                    .route("/users", web::get().to(get_users))
                    .route("/users/{user_id}", web::get().to(get_user))
                    .route("/genres", web::post().to(create_genre))
                    .route("/genres", web::get().to(get_genres))
                    .route("/genres/{genre_id}", web::get().to(get_genre))
                    .route("/genres/{genre_id}", web::put().to(update_genre))
                    .route("/genres/{genre_id}", web::delete().to(delete_genre))
                    .route("/movies", web::post().to(create_movie))
                    .route("/movies", web::get().to(get_movies))
                    .route("/movies/search", web::get().to(search_movies))
                    .route("/movies/filter", web::get().to(filter_movies_by_genre))
                    .route("/movies/{movie_id}", web::get().to(get_movie))
                    .route("/movies/{movie_id}", web::put().to(update_movie))
                    .route("/movies/{movie_id}", web::delete().to(delete_movie))
                    .route("/reviews", web::post().to(add_review))
                    .route("/reviews/filter", web::get().to(reviews_for_movie))
                    .route("/reviews/user/{reviewer_id}", web::get().to(reviews_by_user))
                    .route("/reviews/{id}", web::delete().to(delete_review)),
            )
            .default_service(web::to(|| async {
                HttpResponse::NotFound().json(serde_json::json!({ "message": "route not found" }))
            }))
    })
    .listen(listener)?
    .run();

    Ok(server)
}
