//! Account endpoints: registration, login, profile, password change, and
//! the admin-only user listing.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde_json::{json, Value};
use shared::{
    AuthResponse, ChangePasswordRequest, LoginRequest, RegisterRequest, UserDto, UserListResponse,
};
use tracing::info;

use crate::auth::tokens;
use crate::auth::{ensure_owner, require_role, AuthUser};
use crate::domain::models::user::ROLE_ADMIN;
use crate::domain::models::User;
use crate::rest::{ApiError, AppState};

fn auth_response(state: &AppState, user: &User) -> Result<AuthResponse, ApiError> {
    let token = tokens::issue(&user.id, state.jwt_secret())?;
    Ok(AuthResponse {
        user: UserDto::from(user),
        token,
        token_type: tokens::TOKEN_TYPE.to_string(),
        expires_in: tokens::EXPIRES_IN.to_string(),
    })
}

pub async fn register(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), ApiError> {
    let user = state.user_service.register(request).await?;
    let response = auth_response(&state, &user)?;
    Ok((StatusCode::CREATED, Json(response)))
}

pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    let user = state
        .user_service
        .authenticate(&request.email, &request.password)
        .await?;
    info!("user {} logged in", user.id);
    Ok(Json(auth_response(&state, &user)?))
}

pub async fn profile(AuthUser(user): AuthUser) -> Json<UserDto> {
    Json(UserDto::from(&user))
}

pub async fn change_password(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Json(request): Json<ChangePasswordRequest>,
) -> Result<Json<UserDto>, ApiError> {
    let updated = state
        .user_service
        .change_password(&user.id, &request.current_password, &request.new_password)
        .await?;
    Ok(Json(UserDto::from(&updated)))
}

/// Token invalidation is the client's job with stateless bearer tokens;
/// the endpoint exists so clients have a uniform logout call.
pub async fn logout(AuthUser(user): AuthUser) -> Json<Value> {
    info!("user {} logged out", user.id);
    Json(json!({ "success": true, "message": "logged out" }))
}

pub async fn list_users(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> Result<Json<UserListResponse>, ApiError> {
    require_role(&user, &[ROLE_ADMIN])?;
    let users: Vec<UserDto> = state
        .user_service
        .list_users()
        .await?
        .iter()
        .map(UserDto::from)
        .collect();
    let count = users.len();
    Ok(Json(UserListResponse { users, count }))
}

pub async fn delete_user(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let target = state.user_service.get_user(&id).await?;
    ensure_owner(Some(&user), &target.id)?;
    state.user_service.delete_user(&target.id).await?;
    Ok(Json(json!({ "success": true, "message": "user deleted" })))
}
