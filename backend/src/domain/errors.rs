//! Error taxonomy surfaced to the route-handler boundary.
//!
//! Every variant maps to a stable error code; the REST layer owns the
//! HTTP status mapping. Storage faults propagate unmodified inside the
//! `Storage` variant and are never retried here.

use thiserror::Error;

/// Which unique User field a write collided on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UniqueField {
    Username,
    Email,
}

/// Which entity a by-id lookup failed to resolve.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    User,
    Todo,
}

/// Authentication failure states of the token gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthFailure {
    /// No bearer credential on the request
    TokenMissing,
    /// Malformed signature, or subject no longer resolves to a live user
    TokenInvalid,
    TokenExpired,
    /// Login with unknown email or wrong password
    InvalidCredentials,
    /// An endpoint needing identity was reached without one
    Required,
}

/// Authorization failure states, checked after authentication.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Denial {
    /// Authenticated role is outside the endpoint's allow-list
    InsufficientPermissions,
    /// Authenticated identity does not own the target resource
    AccessDenied,
}

#[derive(Debug, Error)]
pub enum DomainError {
    #[error("validation failed: {0}")]
    Validation(String),

    #[error("{0:?} is already in use")]
    Uniqueness(UniqueField),

    #[error("owner {0} does not exist")]
    Referential(String),

    #[error("{0:?} not found")]
    NotFound(Resource),

    #[error("authentication failed: {0:?}")]
    Auth(AuthFailure),

    #[error("authorization failed: {0:?}")]
    Forbidden(Denial),

    #[error(transparent)]
    Storage(#[from] anyhow::Error),
}

impl DomainError {
    /// Stable code string consumed by clients. Prose messages may change;
    /// these never do.
    pub fn error_code(&self) -> &'static str {
        match self {
            DomainError::Validation(_) => "VALIDATION_ERROR",
            DomainError::Uniqueness(UniqueField::Username) => "USERNAME_EXISTS",
            DomainError::Uniqueness(UniqueField::Email) => "EMAIL_EXISTS",
            DomainError::Referential(_) => "OWNER_NOT_FOUND",
            DomainError::NotFound(Resource::User) => "USER_NOT_FOUND",
            DomainError::NotFound(Resource::Todo) => "TODO_NOT_FOUND",
            DomainError::Auth(AuthFailure::TokenMissing) => "TOKEN_MISSING",
            DomainError::Auth(AuthFailure::TokenInvalid) => "INVALID_TOKEN",
            DomainError::Auth(AuthFailure::TokenExpired) => "TOKEN_EXPIRED",
            DomainError::Auth(AuthFailure::InvalidCredentials) => "INVALID_CREDENTIALS",
            DomainError::Auth(AuthFailure::Required) => "AUTHENTICATION_REQUIRED",
            DomainError::Forbidden(Denial::InsufficientPermissions) => "INSUFFICIENT_PERMISSIONS",
            DomainError::Forbidden(Denial::AccessDenied) => "ACCESS_DENIED",
            DomainError::Storage(_) => "SERVER_ERROR",
        }
    }
}
