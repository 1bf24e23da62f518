use actix_web::HttpResponse;

pub async fn health_check() -> HttpResponse {
    tracing::debug!("Health check endpoint called");
    HttpResponse::Ok().finish()
}

/// GET /api
pub async fn welcome() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({ "message": "Welcome to the movie review API" }))
}
