use anyhow::{anyhow, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use shared::TodoStatus;
use sqlx::sqlite::SqliteRow;
use sqlx::Row;

use super::{format_timestamp, parse_timestamp, DbConnection};
use crate::domain::models::Todo;
use crate::storage::traits::TodoStorage;

/// Relational todo repository. Status and ownership predicates run in SQL
/// against the indexed columns.
#[derive(Clone)]
pub struct TodoRepository {
    db: DbConnection,
}

const SELECT_COLUMNS: &str =
    "id, title, description, status, due_date, owner_id, created_at, updated_at";

impl TodoRepository {
    pub fn new(db: DbConnection) -> Self {
        Self { db }
    }

    fn map_row(row: &SqliteRow) -> Result<Todo> {
        let status_raw: String = row.get("status");
        let status = status_raw
            .parse::<TodoStatus>()
            .map_err(|e| anyhow!("invalid stored status: {}", e))?;
        let due_date: Option<String> = row.get("due_date");

        Ok(Todo {
            id: row.get("id"),
            title: row.get("title"),
            description: row.get("description"),
            status,
            due_date: due_date.as_deref().map(parse_timestamp).transpose()?,
            owner_id: row.get("owner_id"),
            created_at: parse_timestamp(row.get("created_at"))?,
            updated_at: parse_timestamp(row.get("updated_at"))?,
        })
    }
}

#[async_trait]
impl TodoStorage for TodoRepository {
    async fn store_todo(&self, todo: &Todo) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO todos (id, title, description, status, due_date, owner_id, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&todo.id)
        .bind(&todo.title)
        .bind(&todo.description)
        .bind(todo.status.as_str())
        .bind(todo.due_date.map(format_timestamp))
        .bind(&todo.owner_id)
        .bind(format_timestamp(todo.created_at))
        .bind(format_timestamp(todo.updated_at))
        .execute(self.db.pool())
        .await?;
        Ok(())
    }

    async fn get_todo(&self, todo_id: &str) -> Result<Option<Todo>> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM todos WHERE id = ?",
            SELECT_COLUMNS
        ))
        .bind(todo_id)
        .fetch_optional(self.db.pool())
        .await?;

        row.as_ref().map(Self::map_row).transpose()
    }

    async fn list_by_owner(&self, owner_id: &str) -> Result<Vec<Todo>> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM todos WHERE owner_id = ? ORDER BY created_at DESC",
            SELECT_COLUMNS
        ))
        .bind(owner_id)
        .fetch_all(self.db.pool())
        .await?;

        rows.iter().map(Self::map_row).collect()
    }

    async fn list_by_status(
        &self,
        owner_id: Option<&str>,
        status: TodoStatus,
    ) -> Result<Vec<Todo>> {
        let rows = match owner_id {
            Some(owner) => {
                sqlx::query(&format!(
                    "SELECT {} FROM todos WHERE owner_id = ? AND status = ? ORDER BY created_at DESC",
                    SELECT_COLUMNS
                ))
                .bind(owner)
                .bind(status.as_str())
                .fetch_all(self.db.pool())
                .await?
            }
            None => {
                sqlx::query(&format!(
                    "SELECT {} FROM todos WHERE status = ? ORDER BY created_at DESC",
                    SELECT_COLUMNS
                ))
                .bind(status.as_str())
                .fetch_all(self.db.pool())
                .await?
            }
        };

        rows.iter().map(Self::map_row).collect()
    }

    async fn list_overdue(&self, owner_id: Option<&str>, now: DateTime<Utc>) -> Result<Vec<Todo>> {
        // Fixed-width RFC 3339 text makes the < comparison chronological
        let cutoff = format_timestamp(now);
        let rows = match owner_id {
            Some(owner) => {
                sqlx::query(&format!(
                    "SELECT {} FROM todos \
                     WHERE owner_id = ? AND due_date IS NOT NULL AND due_date < ? AND status != 'DONE' \
                     ORDER BY due_date ASC",
                    SELECT_COLUMNS
                ))
                .bind(owner)
                .bind(&cutoff)
                .fetch_all(self.db.pool())
                .await?
            }
            None => {
                sqlx::query(&format!(
                    "SELECT {} FROM todos \
                     WHERE due_date IS NOT NULL AND due_date < ? AND status != 'DONE' \
                     ORDER BY due_date ASC",
                    SELECT_COLUMNS
                ))
                .bind(&cutoff)
                .fetch_all(self.db.pool())
                .await?
            }
        };

        rows.iter().map(Self::map_row).collect()
    }

    async fn update_todo(&self, todo: &Todo) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE todos
            SET title = ?, description = ?, status = ?, due_date = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&todo.title)
        .bind(&todo.description)
        .bind(todo.status.as_str())
        .bind(todo.due_date.map(format_timestamp))
        .bind(format_timestamp(todo.updated_at))
        .bind(&todo.id)
        .execute(self.db.pool())
        .await?;
        Ok(())
    }

    async fn delete_todo(&self, todo_id: &str) -> Result<bool> {
        let result = sqlx::query(
            r#"
            DELETE FROM todos WHERE id = ?
            "#,
        )
        .bind(todo_id)
        .execute(self.db.pool())
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete_by_owner(&self, owner_id: &str) -> Result<u32> {
        let result = sqlx::query(
            r#"
            DELETE FROM todos WHERE owner_id = ?
            "#,
        )
        .bind(owner_id)
        .execute(self.db.pool())
        .await?;
        Ok(result.rows_affected() as u32)
    }
}
