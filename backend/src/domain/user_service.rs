//! User operations and the User half of the relationship invariants:
//! uniqueness is checked before every write, and deleting a user cascades
//! to its todos before the user record goes away, so no reader ever sees
//! an orphaned todo.

use std::sync::Arc;

use chrono::Utc;
use shared::RegisterRequest;
use tracing::{info, warn};

use crate::domain::errors::{AuthFailure, DomainError, Resource, UniqueField};
use crate::domain::models::user::{
    normalize_email, validate_password, validate_username, ROLE_USER,
};
use crate::domain::models::User;
use crate::domain::{identity, password};
use crate::storage::{TodoStorage, UserStorage};

#[derive(Clone)]
pub struct UserService {
    users: Arc<dyn UserStorage>,
    todos: Arc<dyn TodoStorage>,
}

impl UserService {
    pub fn new(users: Arc<dyn UserStorage>, todos: Arc<dyn TodoStorage>) -> Self {
        Self { users, todos }
    }

    /// Register a new user: validate, enforce uniqueness, hash the
    /// password, persist. The plaintext never leaves this function.
    pub async fn register(&self, request: RegisterRequest) -> Result<User, DomainError> {
        validate_username(&request.username)?;
        let email = normalize_email(&request.email)?;
        validate_password(&request.password)?;

        if self.users.find_by_username(&request.username).await?.is_some() {
            warn!("registration rejected: username {} taken", request.username);
            return Err(DomainError::Uniqueness(UniqueField::Username));
        }
        if self.users.find_by_email(&email).await?.is_some() {
            warn!("registration rejected: email already registered");
            return Err(DomainError::Uniqueness(UniqueField::Email));
        }

        let now = Utc::now();
        let user = User {
            id: identity::new_id(),
            username: request.username,
            email,
            password_hash: password::hash(&request.password)?,
            role: ROLE_USER.to_string(),
            created_at: now,
            updated_at: now,
        };

        self.users.store_user(&user).await?;
        info!("registered user {} ({})", user.username, user.id);
        Ok(user)
    }

    /// Credential check for login. Unknown email and wrong password are
    /// deliberately indistinguishable.
    pub async fn authenticate(&self, email: &str, plaintext: &str) -> Result<User, DomainError> {
        let email = normalize_email(email)
            .map_err(|_| DomainError::Auth(AuthFailure::InvalidCredentials))?;

        let user = self
            .users
            .find_by_email(&email)
            .await?
            .ok_or(DomainError::Auth(AuthFailure::InvalidCredentials))?;

        if !password::verify(plaintext, &user.password_hash) {
            warn!("failed login attempt for user {}", user.id);
            return Err(DomainError::Auth(AuthFailure::InvalidCredentials));
        }
        Ok(user)
    }

    /// Resolve an id token to a live user.
    pub async fn get_user(&self, token: &str) -> Result<User, DomainError> {
        let id = identity::canonical(token).ok_or(DomainError::NotFound(Resource::User))?;
        self.users
            .get_user(&id)
            .await?
            .ok_or(DomainError::NotFound(Resource::User))
    }

    pub async fn list_users(&self) -> Result<Vec<User>, DomainError> {
        Ok(self.users.list_users().await?)
    }

    /// Change a user's password after re-verifying the current one. The
    /// replacement is hashed before the write, like every password set.
    pub async fn change_password(
        &self,
        user_id: &str,
        current: &str,
        replacement: &str,
    ) -> Result<User, DomainError> {
        let mut user = self.get_user(user_id).await?;

        if !password::verify(current, &user.password_hash) {
            return Err(DomainError::Auth(AuthFailure::InvalidCredentials));
        }
        validate_password(replacement)?;

        user.password_hash = password::hash(replacement)?;
        user.updated_at = Utc::now();
        self.users.update_user(&user).await?;
        info!("password changed for user {}", user.id);
        Ok(user)
    }

    /// Delete a user and everything it owns. Todos go first so a
    /// concurrent reader never finds a todo whose owner is already gone.
    pub async fn delete_user(&self, token: &str) -> Result<(), DomainError> {
        let user = self.get_user(token).await?;

        let removed = self.todos.delete_by_owner(&user.id).await?;
        if !self.users.delete_user(&user.id).await? {
            return Err(DomainError::NotFound(Resource::User));
        }
        info!("deleted user {} and {} owned todos", user.id, removed);
        Ok(())
    }
}
