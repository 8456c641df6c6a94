//! Todo operations and the Todo half of the relationship invariants: every
//! write names an owner that must resolve to a live user before anything
//! reaches storage. The relational backend would also catch a dangling
//! owner through its foreign key, the document backend would not, so the
//! check lives here for both.

use std::sync::Arc;

use chrono::Utc;
use shared::{CreateTodoRequest, TodoStatus, UpdateTodoRequest};
use tracing::{info, warn};

use crate::domain::errors::{DomainError, Resource};
use crate::domain::identity;
use crate::domain::models::todo::validate_title;
use crate::domain::models::Todo;
use crate::storage::{TodoStorage, UserStorage};

#[derive(Clone)]
pub struct TodoService {
    todos: Arc<dyn TodoStorage>,
    users: Arc<dyn UserStorage>,
}

impl TodoService {
    pub fn new(todos: Arc<dyn TodoStorage>, users: Arc<dyn UserStorage>) -> Self {
        Self { todos, users }
    }

    /// Owner token must resolve to a live user, otherwise the write is
    /// rejected before reaching storage.
    async fn resolve_owner(&self, owner_token: &str) -> Result<String, DomainError> {
        let owner_id = identity::canonical(owner_token)
            .ok_or_else(|| DomainError::Referential(owner_token.to_string()))?;
        match self.users.get_user(&owner_id).await? {
            Some(_) => Ok(owner_id),
            None => {
                warn!("todo write rejected: owner {} does not exist", owner_id);
                Err(DomainError::Referential(owner_id))
            }
        }
    }

    pub async fn create(
        &self,
        owner_token: &str,
        request: CreateTodoRequest,
    ) -> Result<Todo, DomainError> {
        let title = validate_title(&request.title)?;
        let owner_id = self.resolve_owner(owner_token).await?;

        let now = Utc::now();
        let todo = Todo {
            id: identity::new_id(),
            title,
            description: request.description,
            status: request.status.unwrap_or_default(),
            due_date: request.due_date,
            owner_id,
            created_at: now,
            updated_at: now,
        };

        self.todos.store_todo(&todo).await?;
        info!("created todo {} for owner {}", todo.id, todo.owner_id);
        Ok(todo)
    }

    pub async fn get(&self, token: &str) -> Result<Todo, DomainError> {
        let id = identity::canonical(token).ok_or(DomainError::NotFound(Resource::Todo))?;
        self.todos
            .get_todo(&id)
            .await?
            .ok_or(DomainError::NotFound(Resource::Todo))
    }

    pub async fn list_for_owner(&self, owner_token: &str) -> Result<Vec<Todo>, DomainError> {
        let owner_id = match identity::canonical(owner_token) {
            Some(id) => id,
            None => return Ok(Vec::new()),
        };
        Ok(self.todos.list_by_owner(&owner_id).await?)
    }

    pub async fn list_by_status(
        &self,
        owner_token: Option<&str>,
        status: TodoStatus,
    ) -> Result<Vec<Todo>, DomainError> {
        let owner_id = owner_token.and_then(identity::canonical);
        Ok(self.todos.list_by_status(owner_id.as_deref(), status).await?)
    }

    /// Overdue todos: due strictly before now and not DONE. The ownership
    /// restriction is part of the storage query, not a post-filter.
    pub async fn list_overdue(&self, owner_token: Option<&str>) -> Result<Vec<Todo>, DomainError> {
        let owner_id = owner_token.and_then(identity::canonical);
        Ok(self
            .todos
            .list_overdue(owner_id.as_deref(), Utc::now())
            .await?)
    }

    /// Partial update: only supplied fields are applied, `updated_at` is
    /// bumped on every successful call.
    pub async fn update(
        &self,
        token: &str,
        request: UpdateTodoRequest,
    ) -> Result<Todo, DomainError> {
        let mut todo = self.get(token).await?;

        if let Some(title) = request.title {
            todo.title = validate_title(&title)?;
        }
        if let Some(description) = request.description {
            todo.description = Some(description);
        }
        if let Some(status) = request.status {
            todo.status = status;
        }
        if let Some(due_date) = request.due_date {
            todo.due_date = Some(due_date);
        }
        todo.updated_at = Utc::now();

        self.todos.update_todo(&todo).await?;
        Ok(todo)
    }

    pub async fn set_status(&self, token: &str, status: TodoStatus) -> Result<Todo, DomainError> {
        let mut todo = self.get(token).await?;
        todo.status = status;
        todo.updated_at = Utc::now();
        self.todos.update_todo(&todo).await?;
        info!("todo {} moved to {}", todo.id, todo.status);
        Ok(todo)
    }

    pub async fn delete(&self, token: &str) -> Result<(), DomainError> {
        let id = identity::canonical(token).ok_or(DomainError::NotFound(Resource::Todo))?;
        if !self.todos.delete_todo(&id).await? {
            return Err(DomainError::NotFound(Resource::Todo));
        }
        info!("deleted todo {}", id);
        Ok(())
    }
}
