use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use shared::TodoStatus;

use super::DocumentConnection;
use crate::domain::models::Todo;
use crate::storage::traits::TodoStorage;

const COLLECTION: &str = "todos";

/// Document-store todo repository. Predicate queries scan the collection
/// with the owner restriction applied during the scan, mirroring what the
/// relational variant does in SQL.
#[derive(Clone)]
pub struct TodoRepository {
    connection: DocumentConnection,
}

impl TodoRepository {
    pub fn new(connection: DocumentConnection) -> Self {
        Self { connection }
    }

    fn scan(&self) -> Result<Vec<Todo>> {
        self.connection.scan_collection(COLLECTION)
    }
}

#[async_trait]
impl TodoStorage for TodoRepository {
    async fn store_todo(&self, todo: &Todo) -> Result<()> {
        self.connection.write_document(COLLECTION, &todo.id, todo)
    }

    async fn get_todo(&self, todo_id: &str) -> Result<Option<Todo>> {
        self.connection.read_document(COLLECTION, todo_id)
    }

    async fn list_by_owner(&self, owner_id: &str) -> Result<Vec<Todo>> {
        let mut todos: Vec<Todo> = self
            .scan()?
            .into_iter()
            .filter(|t| t.owner_id == owner_id)
            .collect();
        todos.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(todos)
    }

    async fn list_by_status(
        &self,
        owner_id: Option<&str>,
        status: TodoStatus,
    ) -> Result<Vec<Todo>> {
        let mut todos: Vec<Todo> = self
            .scan()?
            .into_iter()
            .filter(|t| t.status == status)
            .filter(|t| owner_id.map_or(true, |owner| t.owner_id == owner))
            .collect();
        todos.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(todos)
    }

    async fn list_overdue(&self, owner_id: Option<&str>, now: DateTime<Utc>) -> Result<Vec<Todo>> {
        let mut todos: Vec<Todo> = self
            .scan()?
            .into_iter()
            .filter(|t| t.is_overdue(now))
            .filter(|t| owner_id.map_or(true, |owner| t.owner_id == owner))
            .collect();
        todos.sort_by(|a, b| a.due_date.cmp(&b.due_date));
        Ok(todos)
    }

    async fn update_todo(&self, todo: &Todo) -> Result<()> {
        self.connection.write_document(COLLECTION, &todo.id, todo)
    }

    async fn delete_todo(&self, todo_id: &str) -> Result<bool> {
        self.connection.delete_document(COLLECTION, todo_id)
    }

    async fn delete_by_owner(&self, owner_id: &str) -> Result<u32> {
        let owned: Vec<Todo> = self
            .scan()?
            .into_iter()
            .filter(|t| t.owner_id == owner_id)
            .collect();

        let mut deleted = 0u32;
        for todo in owned {
            if self.connection.delete_document(COLLECTION, &todo.id)? {
                deleted += 1;
            }
        }
        Ok(deleted)
    }
}
