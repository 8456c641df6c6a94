//! Domain user: the only place the password hash lives. Conversions to the
//! wire DTO drop it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use shared::UserDto;

use crate::domain::errors::DomainError;

pub const ROLE_USER: &str = "user";
pub const ROLE_ADMIN: &str = "admin";

const USERNAME_MIN: usize = 3;
const USERNAME_MAX: usize = 50;
const PASSWORD_MIN: usize = 6;
const PASSWORD_MAX: usize = 255;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    /// Canonical identifier, immutable after creation
    pub id: String,
    pub username: String,
    /// Stored lowercased
    pub email: String,
    pub password_hash: String,
    pub role: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn is_admin(&self) -> bool {
        self.role == ROLE_ADMIN
    }
}

impl From<&User> for UserDto {
    fn from(user: &User) -> Self {
        UserDto {
            id: user.id.clone(),
            username: user.username.clone(),
            email: user.email.clone(),
            role: user.role.clone(),
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

/// 3-50 characters, letters/digits/underscore only.
pub fn validate_username(username: &str) -> Result<(), DomainError> {
    let len = username.chars().count();
    if len < USERNAME_MIN || len > USERNAME_MAX {
        return Err(DomainError::Validation(format!(
            "username must be between {} and {} characters",
            USERNAME_MIN, USERNAME_MAX
        )));
    }
    if !username.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err(DomainError::Validation(
            "username may only contain letters, digits and underscores".to_string(),
        ));
    }
    Ok(())
}

/// Syntactic email check and case normalization. Returns the normalized
/// (lowercased, trimmed) form used for storage and uniqueness.
pub fn normalize_email(email: &str) -> Result<String, DomainError> {
    let normalized = email.trim().to_ascii_lowercase();
    let mut parts = normalized.splitn(2, '@');
    let local = parts.next().unwrap_or("");
    let domain = parts.next().unwrap_or("");
    let domain_ok = {
        let labels: Vec<&str> = domain.split('.').collect();
        labels.len() >= 2 && labels.iter().all(|l| !l.is_empty())
    };
    if local.is_empty() || !domain_ok || normalized.contains(char::is_whitespace) {
        return Err(DomainError::Validation("a valid email address is required".to_string()));
    }
    Ok(normalized)
}

/// 6-255 characters. Checked before the plaintext ever reaches the hasher.
pub fn validate_password(password: &str) -> Result<(), DomainError> {
    let len = password.chars().count();
    if len < PASSWORD_MIN || len > PASSWORD_MAX {
        return Err(DomainError::Validation(format!(
            "password must be between {} and {} characters",
            PASSWORD_MIN, PASSWORD_MAX
        )));
    }
    Ok(())
}
