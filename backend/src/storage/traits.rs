//! Storage abstraction traits.
//!
//! These traits are the single contract both backends satisfy. The domain
//! layer only ever sees `Arc<dyn UserStorage>` / `Arc<dyn TodoStorage>`;
//! which variant sits behind them is decided once at startup.
//!
//! Conventions: lookups that match nothing return `Ok(None)` or an empty
//! vec, never an error; deletes report whether anything was removed; all
//! ids are already in canonical form when they reach a repository.

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use shared::TodoStatus;

use crate::domain::models::{Todo, User};

#[async_trait]
pub trait UserStorage: Send + Sync {
    /// Persist a new user. The caller has already checked uniqueness; the
    /// backend may enforce it again with its own constraints.
    async fn store_user(&self, user: &User) -> Result<()>;

    /// Retrieve a user by canonical id
    async fn get_user(&self, user_id: &str) -> Result<Option<User>>;

    /// Unique-field lookup by username
    async fn find_by_username(&self, username: &str) -> Result<Option<User>>;

    /// Unique-field lookup by (normalized) email
    async fn find_by_email(&self, email: &str) -> Result<Option<User>>;

    /// List all users ordered by username
    async fn list_users(&self) -> Result<Vec<User>>;

    /// Overwrite an existing user record
    async fn update_user(&self, user: &User) -> Result<()>;

    /// Delete a user; returns true if a record was removed
    async fn delete_user(&self, user_id: &str) -> Result<bool>;
}

#[async_trait]
pub trait TodoStorage: Send + Sync {
    async fn store_todo(&self, todo: &Todo) -> Result<()>;

    async fn get_todo(&self, todo_id: &str) -> Result<Option<Todo>>;

    /// All todos owned by the given user, newest first
    async fn list_by_owner(&self, owner_id: &str) -> Result<Vec<Todo>>;

    /// Todos in the given status, optionally restricted to one owner
    async fn list_by_status(&self, owner_id: Option<&str>, status: TodoStatus)
        -> Result<Vec<Todo>>;

    /// Todos with a due date strictly before `now` whose status is not
    /// DONE, optionally restricted to one owner. The ownership predicate is
    /// part of the query, not an after-the-fact filter.
    async fn list_overdue(&self, owner_id: Option<&str>, now: DateTime<Utc>) -> Result<Vec<Todo>>;

    async fn update_todo(&self, todo: &Todo) -> Result<()>;

    /// Delete a todo; returns true if a record was removed
    async fn delete_todo(&self, todo_id: &str) -> Result<bool>;

    /// Remove every todo owned by the given user; returns how many were
    /// removed. Called before the owner itself is deleted.
    async fn delete_by_owner(&self, owner_id: &str) -> Result<u32>;
}
