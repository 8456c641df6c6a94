use anyhow::Result;
use async_trait::async_trait;
use sqlx::sqlite::SqliteRow;
use sqlx::Row;

use super::{format_timestamp, parse_timestamp, DbConnection};
use crate::domain::models::User;
use crate::storage::traits::UserStorage;

/// Relational user repository.
#[derive(Clone)]
pub struct UserRepository {
    db: DbConnection,
}

impl UserRepository {
    pub fn new(db: DbConnection) -> Self {
        Self { db }
    }

    fn map_row(row: &SqliteRow) -> Result<User> {
        Ok(User {
            id: row.get("id"),
            username: row.get("username"),
            email: row.get("email"),
            password_hash: row.get("password_hash"),
            role: row.get("role"),
            created_at: parse_timestamp(row.get("created_at"))?,
            updated_at: parse_timestamp(row.get("updated_at"))?,
        })
    }
}

#[async_trait]
impl UserStorage for UserRepository {
    async fn store_user(&self, user: &User) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO users (id, username, email, password_hash, role, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&user.id)
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(&user.role)
        .bind(format_timestamp(user.created_at))
        .bind(format_timestamp(user.updated_at))
        .execute(self.db.pool())
        .await?;
        Ok(())
    }

    async fn get_user(&self, user_id: &str) -> Result<Option<User>> {
        let row = sqlx::query(
            r#"
            SELECT id, username, email, password_hash, role, created_at, updated_at
            FROM users
            WHERE id = ?
            "#,
        )
        .bind(user_id)
        .fetch_optional(self.db.pool())
        .await?;

        row.as_ref().map(Self::map_row).transpose()
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>> {
        let row = sqlx::query(
            r#"
            SELECT id, username, email, password_hash, role, created_at, updated_at
            FROM users
            WHERE username = ?
            "#,
        )
        .bind(username)
        .fetch_optional(self.db.pool())
        .await?;

        row.as_ref().map(Self::map_row).transpose()
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        let row = sqlx::query(
            r#"
            SELECT id, username, email, password_hash, role, created_at, updated_at
            FROM users
            WHERE email = ?
            "#,
        )
        .bind(email)
        .fetch_optional(self.db.pool())
        .await?;

        row.as_ref().map(Self::map_row).transpose()
    }

    async fn list_users(&self) -> Result<Vec<User>> {
        let rows = sqlx::query(
            r#"
            SELECT id, username, email, password_hash, role, created_at, updated_at
            FROM users
            ORDER BY username ASC
            "#,
        )
        .fetch_all(self.db.pool())
        .await?;

        rows.iter().map(Self::map_row).collect()
    }

    async fn update_user(&self, user: &User) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE users
            SET username = ?, email = ?, password_hash = ?, role = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(&user.role)
        .bind(format_timestamp(user.updated_at))
        .bind(&user.id)
        .execute(self.db.pool())
        .await?;
        Ok(())
    }

    async fn delete_user(&self, user_id: &str) -> Result<bool> {
        let result = sqlx::query(
            r#"
            DELETE FROM users WHERE id = ?
            "#,
        )
        .bind(user_id)
        .execute(self.db.pool())
        .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn sample_user(id: &str, username: &str, email: &str) -> User {
        let now = Utc::now();
        User {
            id: id.to_string(),
            username: username.to_string(),
            email: email.to_string(),
            password_hash: "$2b$12$hash".to_string(),
            role: "user".to_string(),
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn store_and_lookup_by_each_unique_field() {
        let db = DbConnection::init_test().await.unwrap();
        let repo = UserRepository::new(db);

        let user = sample_user("u1", "alice", "alice@example.com");
        repo.store_user(&user).await.unwrap();

        assert_eq!(repo.get_user("u1").await.unwrap().unwrap().username, "alice");
        assert_eq!(
            repo.find_by_username("alice").await.unwrap().unwrap().id,
            "u1"
        );
        assert_eq!(
            repo.find_by_email("alice@example.com").await.unwrap().unwrap().id,
            "u1"
        );
        assert!(repo.get_user("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn unique_indexes_reject_duplicates() {
        let db = DbConnection::init_test().await.unwrap();
        let repo = UserRepository::new(db);

        repo.store_user(&sample_user("u1", "alice", "alice@example.com"))
            .await
            .unwrap();

        // Same username, different everything else
        let dup = sample_user("u2", "alice", "other@example.com");
        assert!(repo.store_user(&dup).await.is_err());

        // Same email
        let dup = sample_user("u3", "bob", "alice@example.com");
        assert!(repo.store_user(&dup).await.is_err());

        // Failed inserts left no partial state
        assert_eq!(repo.list_users().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn delete_reports_whether_a_row_was_removed() {
        let db = DbConnection::init_test().await.unwrap();
        let repo = UserRepository::new(db);

        repo.store_user(&sample_user("u1", "alice", "alice@example.com"))
            .await
            .unwrap();

        assert!(repo.delete_user("u1").await.unwrap());
        assert!(!repo.delete_user("u1").await.unwrap());
        assert!(repo.get_user("u1").await.unwrap().is_none());
    }
}
