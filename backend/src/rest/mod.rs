//! REST interface layer.
//!
//! Pure translation: DTOs in, DTOs out, domain errors mapped onto the
//! HTTP status / error-code contract. No business logic lives here.

pub mod auth_apis;
pub mod todo_apis;

use axum::http::{header, Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use shared::ErrorBody;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tracing::error;

use crate::domain::errors::{AuthFailure, Denial, DomainError};
use crate::domain::{TodoService, UserService};

/// Application state shared by every handler and the auth extractors.
#[derive(Clone)]
pub struct AppState {
    pub user_service: UserService,
    pub todo_service: TodoService,
    jwt_secret: Arc<String>,
}

impl AppState {
    pub fn new(user_service: UserService, todo_service: TodoService, jwt_secret: String) -> Self {
        Self {
            user_service,
            todo_service,
            jwt_secret: Arc::new(jwt_secret),
        }
    }

    pub fn jwt_secret(&self) -> &str {
        &self.jwt_secret
    }
}

/// Domain error carried to the HTTP boundary. The status/code mapping here
/// is the only place it exists.
#[derive(Debug)]
pub struct ApiError(DomainError);

impl ApiError {
    pub fn error_code(&self) -> &'static str {
        self.0.error_code()
    }

    fn status(&self) -> StatusCode {
        match &self.0 {
            DomainError::Validation(_)
            | DomainError::Uniqueness(_)
            | DomainError::Referential(_) => StatusCode::BAD_REQUEST,
            DomainError::NotFound(_) => StatusCode::NOT_FOUND,
            DomainError::Auth(
                AuthFailure::TokenMissing
                | AuthFailure::TokenInvalid
                | AuthFailure::TokenExpired
                | AuthFailure::InvalidCredentials
                | AuthFailure::Required,
            ) => StatusCode::UNAUTHORIZED,
            DomainError::Forbidden(Denial::InsufficientPermissions | Denial::AccessDenied) => {
                StatusCode::FORBIDDEN
            }
            DomainError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        ApiError(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        // Internal detail stays in the log, not the response body
        let message = if status == StatusCode::INTERNAL_SERVER_ERROR {
            error!("request failed: {:?}", self.0);
            "internal server error".to_string()
        } else {
            self.0.to_string()
        };

        let body = ErrorBody {
            success: false,
            message,
            error_code: self.error_code().to_string(),
        };
        (status, Json(body)).into_response()
    }
}

/// Build the application router.
pub fn create_router(app_state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE]);

    let auth_routes = Router::new()
        .route("/register", post(auth_apis::register))
        .route("/login", post(auth_apis::login))
        .route("/profile", get(auth_apis::profile))
        .route("/password", axum::routing::put(auth_apis::change_password))
        .route("/logout", post(auth_apis::logout));

    let user_routes = Router::new()
        .route("/", get(auth_apis::list_users))
        .route("/:id", delete(auth_apis::delete_user));

    let todo_routes = Router::new()
        .route("/", get(todo_apis::list_todos).post(todo_apis::create_todo))
        .route("/status/:status", get(todo_apis::list_by_status))
        .route("/overdue", get(todo_apis::list_overdue))
        .route(
            "/:id",
            get(todo_apis::get_todo)
                .put(todo_apis::update_todo)
                .delete(todo_apis::delete_todo),
        )
        .route("/:id/status", axum::routing::patch(todo_apis::set_status));

    let api_routes = Router::new()
        .nest("/auth", auth_routes)
        .nest("/users", user_routes)
        .nest("/todos", todo_routes);

    Router::new()
        .nest("/api", api_routes)
        .layer(cors)
        .with_state(app_state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::errors::{Resource, UniqueField};

    fn status_of(err: DomainError) -> StatusCode {
        ApiError::from(err).status()
    }

    #[test]
    fn status_mapping_matches_the_contract() {
        assert_eq!(
            status_of(DomainError::Validation("bad".into())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(DomainError::Uniqueness(UniqueField::Email)),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(DomainError::Referential("ghost".into())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(DomainError::NotFound(Resource::Todo)),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status_of(DomainError::Auth(AuthFailure::TokenMissing)),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            status_of(DomainError::Forbidden(Denial::AccessDenied)),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            status_of(DomainError::Storage(anyhow::anyhow!("down"))),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
