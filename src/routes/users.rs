/// Account routes
///
/// Signup, login and token refresh are public; reading accounts requires a
/// verified identity.

use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::{persist_token_pair, require_role, require_self_or_admin, IdentityContext};
use crate::domain::{Page, PageParams, Role, TokenPair, User, UserResponse};
use crate::error::{AppError, AuthError, ErrorContext, StoreError};
use crate::startup::AppState;
use crate::store::bounded;
use crate::validators::{is_valid_email, is_valid_name, is_valid_password};

/// User registration request
#[derive(Deserialize)]
pub struct SignupRequest {
    pub name: String,
    pub username: String,
    pub email: String,
    pub password: String,
    pub user_type: String,
}

#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

#[derive(Serialize)]
pub struct SignupResponse {
    pub message: String,
    pub user_id: String,
}

/// Response carrying a freshly issued token pair
#[derive(Serialize)]
pub struct AuthResponse {
    pub message: String,
    pub token: String,
    pub refresh_token: String,
    pub token_type: String,
    pub expires_in: i64,
}

#[derive(Serialize)]
pub struct UsersResponse {
    pub users: Vec<UserResponse>,
}

impl AuthResponse {
    fn new(message: &str, pair: TokenPair, state: &AppState) -> Self {
        Self {
            message: message.to_string(),
            token: pair.access_token,
            refresh_token: pair.refresh_token,
            token_type: "Bearer".to_string(),
            expires_in: state.tokens.access_ttl().num_seconds(),
        }
    }
}

/// POST /users/signup
///
/// # Errors
/// - 400: invalid name, username, email, password or user_type
/// - 409: email or username already registered
/// - 500: the password could not be hashed
pub async fn signup(
    form: web::Json<SignupRequest>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let context = ErrorContext::new("user_signup");
    let limit = state.store_timeout;

    let name = is_valid_name("name", &form.name)?;
    let username = is_valid_name("username", &form.username)?;
    let email = is_valid_email(&form.email)?;
    is_valid_password(&form.password)?;
    let role: Role = form.user_type.trim().parse()?;

    if bounded(limit, "email_taken", state.store.email_taken(&email)).await? {
        return Err(StoreError::UniqueConstraintViolation("email already exists".to_string()).into());
    }
    if bounded(limit, "username_taken", state.store.username_taken(&username)).await? {
        return Err(StoreError::UniqueConstraintViolation("username already exists".to_string()).into());
    }

    let password_hash = state.hasher.hash_bounded(&form.password, limit).await.map_err(|e| {
        context.log_error(&e);
        e
    })?;

    let user = User::new(name, username, email, password_hash, role);
    bounded(limit, "insert_user", state.store.insert_user(&user)).await?;

    let pair = state.tokens.issue_token_pair(&user)?;
    persist_token_pair(state.store.as_ref(), user.id, &pair, limit).await?;

    tracing::info!(
        request_id = %context.request_id,
        user_id = %user.id,
        user_type = %user.role,
        "User registered successfully"
    );

    Ok(HttpResponse::Created().json(SignupResponse {
        message: "user created successfully".to_string(),
        user_id: user.id.to_string(),
    }))
}

/// POST /users/login
///
/// Unknown email and wrong password produce the same 401 body.
pub async fn login(
    form: web::Json<LoginRequest>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let context = ErrorContext::new("user_login");
    let limit = state.store_timeout;

    let email = is_valid_email(&form.email)?;

    let user = bounded(limit, "find_user_by_email", state.store.find_user_by_email(&email)).await?;

    // Unknown emails pay the same bcrypt cost as wrong passwords
    let matches = state
        .hasher
        .verify_or_burn(user.as_ref().map(|u| u.password_hash.as_str()), &form.password, limit)
        .await?;
    let user = match user {
        Some(user) if matches => user,
        Some(user) => {
            let err = AppError::Auth(AuthError::InvalidCredentials);
            context.clone().with_user_id(user.id.to_string()).log_error(&err);
            return Err(err);
        }
        None => {
            let err = AppError::Auth(AuthError::InvalidCredentials);
            context.log_error(&err);
            return Err(err);
        }
    };

    let pair = state.tokens.issue_token_pair(&user)?;
    persist_token_pair(state.store.as_ref(), user.id, &pair, limit).await?;

    tracing::info!(
        request_id = %context.request_id,
        user_id = %user.id,
        "User logged in successfully"
    );

    Ok(HttpResponse::Ok().json(AuthResponse::new("login successful", pair, &state)))
}

/// POST /users/refresh
///
/// Exchanges the most recently issued refresh token for a new pair. A refresh
/// token that verifies but is no longer the recorded one is rejected.
pub async fn refresh(
    form: web::Json<RefreshRequest>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let context = ErrorContext::new("token_refresh");
    let limit = state.store_timeout;

    state.tokens.verify_refresh(&form.refresh_token)?;

    let stored = bounded(
        limit,
        "find_by_refresh_token",
        state.store.find_by_refresh_token(&form.refresh_token),
    )
    .await?
    .ok_or(AuthError::TokenMalformed)?;

    let user = bounded(limit, "find_user_by_id", state.store.find_user_by_id(stored.user_id))
        .await?
        .ok_or(AuthError::TokenMalformed)?;

    let pair = state.tokens.issue_token_pair(&user)?;
    persist_token_pair(state.store.as_ref(), user.id, &pair, limit).await?;

    tracing::info!(
        request_id = %context.request_id,
        user_id = %user.id,
        "Token refreshed successfully"
    );

    Ok(HttpResponse::Ok().json(AuthResponse::new("token refreshed", pair, &state)))
}

/// GET /users/{user_id}
///
/// The caller must be the account owner or an admin.
pub async fn get_user(
    identity: web::ReqData<IdentityContext>,
    path: web::Path<String>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let user_id = path.into_inner();
    require_self_or_admin(&identity, &user_id)?;

    let not_found = || AppError::Store(StoreError::NotFound("user not found".to_string()));
    let id = Uuid::parse_str(&user_id).map_err(|_| not_found())?;

    let user = bounded(state.store_timeout, "find_user_by_id", state.store.find_user_by_id(id))
        .await?
        .ok_or_else(not_found)?;

    Ok(HttpResponse::Ok().json(UserResponse::from(&user)))
}

/// GET /users?page=&limit=
///
/// Admin only.
pub async fn get_users(
    identity: web::ReqData<IdentityContext>,
    query: web::Query<PageParams>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    require_role(&identity, Role::Admin)?;
    let page = Page::try_from(&*query)?;

    let users = bounded(state.store_timeout, "list_users", state.store.list_users(page)).await?;

    Ok(HttpResponse::Ok().json(UsersResponse {
        users: users.iter().map(UserResponse::from).collect(),
    }))
}
