use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};

use crate::auth::{require_role, IdentityContext};
use crate::domain::{Genre, Page, PageParams, Role};
use crate::error::{AppError, StoreError};
use crate::startup::AppState;
use crate::store::bounded;
use crate::validators::{is_valid_id, is_valid_name};

#[derive(Deserialize)]
pub struct CreateGenreRequest {
    pub genre_id: i32,
    pub name: String,
}

#[derive(Deserialize)]
pub struct UpdateGenreRequest {
    pub name: String,
}

#[derive(Serialize)]
pub struct GenresResponse {
    pub genres: Vec<Genre>,
}

fn genre_not_found() -> AppError {
    AppError::Store(StoreError::NotFound("genre not found".to_string()))
}

/// POST /genres (admin)
pub async fn create_genre(
    identity: web::ReqData<IdentityContext>,
    form: web::Json<CreateGenreRequest>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    require_role(&identity, Role::Admin)?;

    let genre_id = is_valid_id("genre_id", form.genre_id)?;
    let name = is_valid_name("name", &form.name)?;

    let genre = Genre::new(genre_id, name);
    bounded(state.store_timeout, "insert_genre", state.store.insert_genre(&genre)).await?;

    tracing::info!(genre_id = genre.genre_id, created_by = %identity.uid, "Genre created");

    Ok(HttpResponse::Created().json(serde_json::json!({
        "message": "genre created successfully",
        "genre_id": genre.genre_id,
    })))
}

/// GET /genres/{genre_id}
pub async fn get_genre(
    path: web::Path<i32>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let genre = bounded(state.store_timeout, "find_genre", state.store.find_genre(path.into_inner()))
        .await?
        .ok_or_else(genre_not_found)?;

    Ok(HttpResponse::Ok().json(genre))
}

/// GET /genres?page=&limit=
pub async fn get_genres(
    query: web::Query<PageParams>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let page = Page::try_from(&*query)?;
    let genres = bounded(state.store_timeout, "list_genres", state.store.list_genres(page)).await?;

    Ok(HttpResponse::Ok().json(GenresResponse { genres }))
}

/// PUT /genres/{genre_id} (admin)
pub async fn update_genre(
    identity: web::ReqData<IdentityContext>,
    path: web::Path<i32>,
    form: web::Json<UpdateGenreRequest>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    require_role(&identity, Role::Admin)?;

    let genre_id = path.into_inner();
    let name = is_valid_name("name", &form.name)?;

    let updated = bounded(state.store_timeout, "rename_genre", state.store.rename_genre(genre_id, &name)).await?;
    if !updated {
        return Err(genre_not_found());
    }

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "genre updated successfully",
        "genre_id": genre_id,
    })))
}

/// DELETE /genres/{genre_id} (admin)
pub async fn delete_genre(
    identity: web::ReqData<IdentityContext>,
    path: web::Path<i32>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    require_role(&identity, Role::Admin)?;

    let genre_id = path.into_inner();
    if !bounded(state.store_timeout, "delete_genre", state.store.delete_genre(genre_id)).await? {
        return Err(genre_not_found());
    }

    tracing::info!(genre_id = genre_id, deleted_by = %identity.uid, "Genre deleted");

    Ok(HttpResponse::Ok().json(serde_json::json!({ "message": "genre deleted successfully" })))
}
