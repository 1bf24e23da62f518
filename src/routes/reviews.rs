use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::{require_role, require_self_or_admin, IdentityContext};
use crate::domain::{Review, Role};
use crate::error::{AppError, AuthError, StoreError};
use crate::startup::AppState;
use crate::store::bounded;
use crate::validators::{is_valid_id, is_valid_text};

/// The reviewer is always the caller; a `reviewer_id` in the body is ignored
#[derive(Deserialize)]
pub struct AddReviewRequest {
    pub movie_id: i32,
    pub review: String,
}

#[derive(Deserialize)]
pub struct MovieFilter {
    pub movie_id: i32,
}

#[derive(Serialize)]
pub struct ReviewsResponse {
    pub reviews: Vec<Review>,
}

fn review_not_found() -> AppError {
    AppError::Store(StoreError::NotFound("review not found".to_string()))
}

/// POST /reviews (USER role)
pub async fn add_review(
    identity: web::ReqData<IdentityContext>,
    form: web::Json<AddReviewRequest>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    require_role(&identity, Role::User)?;
    let reviewer_id = identity.user_id().ok_or(AuthError::TokenMalformed)?;

    let movie_id = is_valid_id("movie_id", form.movie_id)?;
    let text = is_valid_text("review", &form.review)?;

    bounded(state.store_timeout, "find_movie", state.store.find_movie(movie_id))
        .await?
        .ok_or_else(|| AppError::Store(StoreError::NotFound("movie not found".to_string())))?;

    let review = Review::new(movie_id, reviewer_id, text);
    bounded(state.store_timeout, "insert_review", state.store.insert_review(&review)).await?;

    tracing::info!(review_id = %review.id, movie_id = movie_id, reviewer_id = %reviewer_id, "Review added");

    Ok(HttpResponse::Created().json(serde_json::json!({
        "message": "review added successfully",
        "review_id": review.id.to_string(),
    })))
}

/// GET /reviews/filter?movie_id=
pub async fn reviews_for_movie(
    query: web::Query<MovieFilter>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let movie_id = is_valid_id("movie_id", query.movie_id)?;
    let reviews = bounded(state.store_timeout, "reviews_for_movie", state.store.reviews_for_movie(movie_id)).await?;

    Ok(HttpResponse::Ok().json(ReviewsResponse { reviews }))
}

/// GET /reviews/user/{reviewer_id} (self or admin)
pub async fn reviews_by_user(
    identity: web::ReqData<IdentityContext>,
    path: web::Path<String>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let reviewer_id = path.into_inner();
    require_self_or_admin(&identity, &reviewer_id)?;

    let reviews = match Uuid::parse_str(&reviewer_id) {
        Ok(id) => bounded(state.store_timeout, "reviews_by_user", state.store.reviews_by_user(id)).await?,
        Err(_) => Vec::new(),
    };

    Ok(HttpResponse::Ok().json(ReviewsResponse { reviews }))
}

/// DELETE /reviews/{id} (author or admin)
pub async fn delete_review(
    identity: web::ReqData<IdentityContext>,
    path: web::Path<String>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let id = Uuid::parse_str(&path.into_inner()).map_err(|_| review_not_found())?;

    let review = bounded(state.store_timeout, "find_review", state.store.find_review(id))
        .await?
        .ok_or_else(review_not_found)?;
    require_self_or_admin(&identity, &review.reviewer_id.to_string())?;

    if !bounded(state.store_timeout, "delete_review", state.store.delete_review(id)).await? {
        return Err(review_not_found());
    }

    tracing::info!(review_id = %id, deleted_by = %identity.uid, "Review deleted");

    Ok(HttpResponse::Ok().json(serde_json::json!({ "message": "review deleted successfully" })))
}
