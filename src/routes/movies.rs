use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};

use crate::auth::{require_role, IdentityContext};
use crate::domain::{Movie, MovieDetails, Page, PageParams, Role};
use crate::error::{AppError, StoreError, ValidationError};
use crate::startup::AppState;
use crate::store::bounded;
use crate::validators::{is_valid_id, is_valid_text};

/// Body of `PUT /movies/{movie_id}`; `POST /movies` adds the id
#[derive(Deserialize)]
pub struct MovieRequest {
    pub name: String,
    pub topic: String,
    pub genre_id: i32,
    pub movie_url: String,
}

#[derive(Deserialize)]
pub struct CreateMovieRequest {
    pub movie_id: i32,
    #[serde(flatten)]
    pub details: MovieRequest,
}

#[derive(Deserialize)]
pub struct SearchQuery {
    pub name: Option<String>,
}

#[derive(Deserialize)]
pub struct GenreFilter {
    pub genre_id: i32,
}

#[derive(Serialize)]
pub struct MoviesResponse {
    pub movies: Vec<Movie>,
}

impl TryFrom<&MovieRequest> for MovieDetails {
    type Error = ValidationError;

    fn try_from(request: &MovieRequest) -> Result<Self, Self::Error> {
        Ok(MovieDetails {
            name: is_valid_text("name", &request.name)?,
            topic: is_valid_text("topic", &request.topic)?,
            genre_id: is_valid_id("genre_id", request.genre_id)?,
            movie_url: is_valid_text("movie_url", &request.movie_url)?,
        })
    }
}

fn movie_not_found() -> AppError {
    AppError::Store(StoreError::NotFound("movie not found".to_string()))
}

/// POST /movies (admin)
pub async fn create_movie(
    identity: web::ReqData<IdentityContext>,
    form: web::Json<CreateMovieRequest>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    require_role(&identity, Role::Admin)?;

    let movie_id = is_valid_id("movie_id", form.movie_id)?;
    let details = MovieDetails::try_from(&form.details)?;

    let movie = Movie::new(movie_id, details);
    bounded(state.store_timeout, "insert_movie", state.store.insert_movie(&movie)).await?;

    tracing::info!(movie_id = movie.movie_id, created_by = %identity.uid, "Movie created");

    Ok(HttpResponse::Created().json(serde_json::json!({
        "message": "movie created successfully",
        "movie_id": movie.movie_id,
    })))
}

/// GET /movies/{movie_id}
pub async fn get_movie(
    path: web::Path<i32>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let movie = bounded(state.store_timeout, "find_movie", state.store.find_movie(path.into_inner()))
        .await?
        .ok_or_else(movie_not_found)?;

    Ok(HttpResponse::Ok().json(movie))
}

/// GET /movies?page=&limit=
pub async fn get_movies(
    query: web::Query<PageParams>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let page = Page::try_from(&*query)?;
    let movies = bounded(state.store_timeout, "list_movies", state.store.list_movies(page)).await?;

    Ok(HttpResponse::Ok().json(MoviesResponse { movies }))
}

/// GET /movies/search?name=
///
/// Case-insensitive substring match; `name` is required.
pub async fn search_movies(
    query: web::Query<SearchQuery>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let name = query.name.as_deref().map(str::trim).unwrap_or_default();
    if name.is_empty() {
        return Err(ValidationError::EmptyField("name".to_string()).into());
    }

    let movies = bounded(state.store_timeout, "search_movies", state.store.search_movies(name)).await?;

    Ok(HttpResponse::Ok().json(MoviesResponse { movies }))
}

/// GET /movies/filter?genre_id=
pub async fn filter_movies_by_genre(
    query: web::Query<GenreFilter>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let genre_id = is_valid_id("genre_id", query.genre_id)?;
    let movies = bounded(state.store_timeout, "movies_by_genre", state.store.movies_by_genre(genre_id)).await?;

    Ok(HttpResponse::Ok().json(MoviesResponse { movies }))
}

/// PUT /movies/{movie_id} (admin)
pub async fn update_movie(
    identity: web::ReqData<IdentityContext>,
    path: web::Path<i32>,
    form: web::Json<MovieRequest>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    require_role(&identity, Role::Admin)?;

    let movie_id = path.into_inner();
    let details = MovieDetails::try_from(&*form)?;

    if !bounded(state.store_timeout, "update_movie", state.store.update_movie(movie_id, &details)).await? {
        return Err(movie_not_found());
    }

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "movie updated successfully",
        "movie_id": movie_id,
    })))
}

/// DELETE /movies/{movie_id} (admin)
pub async fn delete_movie(
    identity: web::ReqData<IdentityContext>,
    path: web::Path<i32>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    require_role(&identity, Role::Admin)?;

    let movie_id = path.into_inner();
    if !bounded(state.store_timeout, "delete_movie", state.store.delete_movie(movie_id)).await? {
        return Err(movie_not_found());
    }

    tracing::info!(movie_id = movie_id, deleted_by = %identity.uid, "Movie deleted");

    Ok(HttpResponse::Ok().json(serde_json::json!({ "message": "movie deleted successfully" })))
}
