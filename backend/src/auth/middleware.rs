//! Per-request gates.
//!
//! Authentication is an extractor: handlers that take [`AuthUser`] only run
//! once the bearer credential has been verified and resolved to a live user
//! through the identity codec and the user lookup. [`MaybeAuthUser`] is the
//! optional variant: it never rejects, any failure just means no identity.
//!
//! Authorization is two plain functions over the already resolved identity:
//! a role allow-list check and an ownership check.

use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;

use crate::domain::errors::{AuthFailure, Denial, DomainError};
use crate::domain::identity;
use crate::domain::models::User;
use crate::rest::{ApiError, AppState};

/// The authenticated user attached to the request context.
#[derive(Debug, Clone)]
pub struct AuthUser(pub User);

/// Optional-authentication variant: `None` when no usable credential was
/// presented.
#[derive(Debug, Clone)]
pub struct MaybeAuthUser(pub Option<User>);

fn bearer_token(parts: &Parts) -> Option<&str> {
    parts
        .headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

async fn resolve_user(state: &AppState, token: &str) -> Result<User, DomainError> {
    let claims = super::tokens::verify(token, state.jwt_secret())?;
    let subject =
        identity::canonical(&claims.sub).ok_or(DomainError::Auth(AuthFailure::TokenInvalid))?;

    // A token can outlive its user; treat that exactly like a bad token
    match state.user_service.get_user(&subject).await {
        Ok(user) => Ok(user),
        Err(DomainError::NotFound(_)) => Err(DomainError::Auth(AuthFailure::TokenInvalid)),
        Err(other) => Err(other),
    }
}

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let token =
            bearer_token(parts).ok_or(DomainError::Auth(AuthFailure::TokenMissing))?;
        let user = resolve_user(state, token).await?;
        Ok(AuthUser(user))
    }
}

#[async_trait]
impl FromRequestParts<AppState> for MaybeAuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let user = match bearer_token(parts) {
            Some(token) => resolve_user(state, token).await.ok(),
            None => None,
        };
        Ok(MaybeAuthUser(user))
    }
}

/// Role allow-list check. An empty allow-list means the endpoint has no
/// role restriction.
pub fn require_role(user: &User, allowed: &[&str]) -> Result<(), DomainError> {
    if allowed.is_empty() || allowed.contains(&user.role.as_str()) {
        Ok(())
    } else {
        Err(DomainError::Forbidden(Denial::InsufficientPermissions))
    }
}

/// Ownership check: the authenticated identity must own the target
/// resource. Admins pass; a missing identity is an authentication failure,
/// not an authorization one.
pub fn ensure_owner(user: Option<&User>, owner_id: &str) -> Result<(), DomainError> {
    let user = user.ok_or(DomainError::Auth(AuthFailure::Required))?;
    if user.is_admin() || identity::same(&user.id, owner_id) {
        Ok(())
    } else {
        Err(DomainError::Forbidden(Denial::AccessDenied))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::tokens;
    use crate::domain::models::user::{ROLE_ADMIN, ROLE_USER};
    use crate::domain::{TodoService, UserService};
    use crate::storage::sqlite::{DbConnection, TodoRepository, UserRepository};
    use axum::http::Request;
    use chrono::Utc;
    use shared::RegisterRequest;
    use std::sync::Arc;

    const SECRET: &str = "test-secret";

    fn user_with_role(id: &str, role: &str) -> User {
        let now = Utc::now();
        User {
            id: id.to_string(),
            username: "alice".into(),
            email: "alice@example.com".into(),
            password_hash: "$2b$12$hash".into(),
            role: role.to_string(),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn role_check_honors_the_allow_list() {
        let user = user_with_role("u1", ROLE_USER);
        assert!(require_role(&user, &[]).is_ok());
        assert!(require_role(&user, &[ROLE_USER, ROLE_ADMIN]).is_ok());
        assert_eq!(
            require_role(&user, &[ROLE_ADMIN]).unwrap_err().error_code(),
            "INSUFFICIENT_PERMISSIONS"
        );
    }

    #[test]
    fn ownership_check_compares_canonical_ids() {
        let owner = user_with_role("550e8400e29b41d4a716446655440000", ROLE_USER);
        // Hyphenated form of the same id still passes
        assert!(ensure_owner(Some(&owner), "550e8400-e29b-41d4-a716-446655440000").is_ok());

        let stranger = user_with_role("feedfacefeedfacefeedfacefeedface", ROLE_USER);
        assert_eq!(
            ensure_owner(Some(&stranger), &owner.id).unwrap_err().error_code(),
            "ACCESS_DENIED"
        );

        let admin = user_with_role("adminid", ROLE_ADMIN);
        assert!(ensure_owner(Some(&admin), &owner.id).is_ok());

        assert_eq!(
            ensure_owner(None, &owner.id).unwrap_err().error_code(),
            "AUTHENTICATION_REQUIRED"
        );
    }

    async fn test_state() -> AppState {
        let db = DbConnection::init_test().await.unwrap();
        let users: Arc<dyn crate::storage::UserStorage> = Arc::new(UserRepository::new(db.clone()));
        let todos: Arc<dyn crate::storage::TodoStorage> = Arc::new(TodoRepository::new(db));
        AppState::new(
            UserService::new(users.clone(), todos.clone()),
            TodoService::new(todos, users),
            SECRET.to_string(),
        )
    }

    async fn registered_user(state: &AppState) -> User {
        state
            .user_service
            .register(RegisterRequest {
                username: "alice".into(),
                email: "alice@example.com".into(),
                password: "Secret1x".into(),
            })
            .await
            .unwrap()
    }

    fn parts_with_auth(value: Option<&str>) -> Parts {
        let mut builder = Request::builder().uri("/api/todos");
        if let Some(v) = value {
            builder = builder.header("authorization", v);
        }
        builder.body(()).unwrap().into_parts().0
    }

    #[tokio::test]
    async fn gate_resolves_a_valid_token_to_the_live_user() {
        let state = test_state().await;
        let user = registered_user(&state).await;
        let token = tokens::issue(&user.id, SECRET).unwrap();

        let mut parts = parts_with_auth(Some(&format!("Bearer {}", token)));
        let AuthUser(resolved) = AuthUser::from_request_parts(&mut parts, &state)
            .await
            .unwrap();
        assert_eq!(resolved.id, user.id);
    }

    #[tokio::test]
    async fn gate_rejects_missing_and_malformed_credentials() {
        let state = test_state().await;

        let mut parts = parts_with_auth(None);
        let err = AuthUser::from_request_parts(&mut parts, &state)
            .await
            .unwrap_err();
        assert_eq!(err.error_code(), "TOKEN_MISSING");

        let mut parts = parts_with_auth(Some("Bearer garbage.token.here"));
        let err = AuthUser::from_request_parts(&mut parts, &state)
            .await
            .unwrap_err();
        assert_eq!(err.error_code(), "INVALID_TOKEN");
    }

    #[tokio::test]
    async fn gate_rejects_a_token_for_a_deleted_user() {
        let state = test_state().await;
        let user = registered_user(&state).await;
        let token = tokens::issue(&user.id, SECRET).unwrap();

        state.user_service.delete_user(&user.id).await.unwrap();

        let mut parts = parts_with_auth(Some(&format!("Bearer {}", token)));
        let err = AuthUser::from_request_parts(&mut parts, &state)
            .await
            .unwrap_err();
        assert_eq!(err.error_code(), "INVALID_TOKEN");
    }

    #[tokio::test]
    async fn optional_gate_never_rejects() {
        let state = test_state().await;

        let mut parts = parts_with_auth(None);
        let MaybeAuthUser(none) = MaybeAuthUser::from_request_parts(&mut parts, &state)
            .await
            .unwrap();
        assert!(none.is_none());

        let mut parts = parts_with_auth(Some("Bearer garbage"));
        let MaybeAuthUser(none) = MaybeAuthUser::from_request_parts(&mut parts, &state)
            .await
            .unwrap();
        assert!(none.is_none());

        let user = registered_user(&state).await;
        let token = tokens::issue(&user.id, SECRET).unwrap();
        let mut parts = parts_with_auth(Some(&format!("Bearer {}", token)));
        let MaybeAuthUser(some) = MaybeAuthUser::from_request_parts(&mut parts, &state)
            .await
            .unwrap();
        assert_eq!(some.unwrap().id, user.id);
    }
}
