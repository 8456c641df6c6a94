use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use shared::{TodoDto, TodoStatus};

use crate::domain::errors::DomainError;

const TITLE_MAX: usize = 255;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Todo {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub status: TodoStatus,
    pub due_date: Option<DateTime<Utc>>,
    /// Canonical id of the owning user; must resolve to a live user at
    /// creation time
    pub owner_id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Todo {
    /// Overdue means a due date strictly in the past on a todo that is not
    /// DONE. A todo without a due date is never overdue.
    pub fn is_overdue(&self, now: DateTime<Utc>) -> bool {
        match self.due_date {
            Some(due) => due < now && self.status != TodoStatus::Done,
            None => false,
        }
    }
}

impl From<&Todo> for TodoDto {
    fn from(todo: &Todo) -> Self {
        TodoDto {
            id: todo.id.clone(),
            title: todo.title.clone(),
            description: todo.description.clone(),
            status: todo.status,
            due_date: todo.due_date,
            owner_id: todo.owner_id.clone(),
            created_at: todo.created_at,
            updated_at: todo.updated_at,
        }
    }
}

/// 1-255 characters after trimming. Returns the trimmed title.
pub fn validate_title(title: &str) -> Result<String, DomainError> {
    let trimmed = title.trim();
    if trimmed.is_empty() {
        return Err(DomainError::Validation("title is required".to_string()));
    }
    if trimmed.chars().count() > TITLE_MAX {
        return Err(DomainError::Validation(format!(
            "title must be at most {} characters",
            TITLE_MAX
        )));
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn todo_with(status: TodoStatus, due_date: Option<DateTime<Utc>>) -> Todo {
        let now = Utc::now();
        Todo {
            id: "t1".into(),
            title: "Write report".into(),
            description: None,
            status,
            due_date,
            owner_id: "u1".into(),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn past_due_and_not_done_is_overdue() {
        let now = Utc::now();
        let todo = todo_with(TodoStatus::Todo, Some(now - Duration::hours(1)));
        assert!(todo.is_overdue(now));
        let todo = todo_with(TodoStatus::InProgress, Some(now - Duration::hours(1)));
        assert!(todo.is_overdue(now));
    }

    #[test]
    fn done_todos_are_never_overdue() {
        let now = Utc::now();
        let todo = todo_with(TodoStatus::Done, Some(now - Duration::days(7)));
        assert!(!todo.is_overdue(now));
    }

    #[test]
    fn future_or_missing_due_date_is_not_overdue() {
        let now = Utc::now();
        assert!(!todo_with(TodoStatus::Todo, Some(now + Duration::hours(1))).is_overdue(now));
        assert!(!todo_with(TodoStatus::Todo, None).is_overdue(now));
        // Strictly before: a due date equal to "now" is not overdue
        assert!(!todo_with(TodoStatus::Todo, Some(now)).is_overdue(now));
    }

    #[test]
    fn title_is_trimmed_and_bounded() {
        assert_eq!(validate_title("  Write report  ").unwrap(), "Write report");
        assert!(validate_title("   ").is_err());
        assert!(validate_title(&"x".repeat(256)).is_err());
        assert!(validate_title(&"x".repeat(255)).is_ok());
    }
}
