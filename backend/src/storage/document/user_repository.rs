use anyhow::Result;
use async_trait::async_trait;

use super::DocumentConnection;
use crate::domain::models::User;
use crate::storage::traits::UserStorage;

const COLLECTION: &str = "users";

/// Document-store user repository. Unique-field lookups are collection
/// scans; the service layer's pre-write checks are the real uniqueness
/// enforcement on this backend.
#[derive(Clone)]
pub struct UserRepository {
    connection: DocumentConnection,
}

impl UserRepository {
    pub fn new(connection: DocumentConnection) -> Self {
        Self { connection }
    }
}

#[async_trait]
impl UserStorage for UserRepository {
    async fn store_user(&self, user: &User) -> Result<()> {
        self.connection.write_document(COLLECTION, &user.id, user)
    }

    async fn get_user(&self, user_id: &str) -> Result<Option<User>> {
        self.connection.read_document(COLLECTION, user_id)
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>> {
        let users: Vec<User> = self.connection.scan_collection(COLLECTION)?;
        Ok(users.into_iter().find(|u| u.username == username))
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        let users: Vec<User> = self.connection.scan_collection(COLLECTION)?;
        Ok(users.into_iter().find(|u| u.email == email))
    }

    async fn list_users(&self) -> Result<Vec<User>> {
        let mut users: Vec<User> = self.connection.scan_collection(COLLECTION)?;
        users.sort_by(|a, b| a.username.cmp(&b.username));
        Ok(users)
    }

    async fn update_user(&self, user: &User) -> Result<()> {
        self.connection.write_document(COLLECTION, &user.id, user)
    }

    async fn delete_user(&self, user_id: &str) -> Result<bool> {
        self.connection.delete_document(COLLECTION, user_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use tempfile::TempDir;

    fn setup() -> (UserRepository, TempDir) {
        let dir = TempDir::new().unwrap();
        let conn = DocumentConnection::new(dir.path()).unwrap();
        (UserRepository::new(conn), dir)
    }

    fn sample_user(id: &str, username: &str) -> User {
        let now = Utc::now();
        User {
            id: id.to_string(),
            username: username.to_string(),
            email: format!("{}@example.com", username),
            password_hash: "$2b$12$hash".to_string(),
            role: "user".to_string(),
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn store_and_find_by_unique_fields() {
        let (repo, _dir) = setup();
        repo.store_user(&sample_user("u1", "alice")).await.unwrap();

        assert!(repo.get_user("u1").await.unwrap().is_some());
        assert_eq!(
            repo.find_by_username("alice").await.unwrap().unwrap().id,
            "u1"
        );
        assert_eq!(
            repo.find_by_email("alice@example.com").await.unwrap().unwrap().id,
            "u1"
        );
        assert!(repo.find_by_username("bob").await.unwrap().is_none());
        assert!(repo.get_user("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn listing_orders_by_username() {
        let (repo, _dir) = setup();
        repo.store_user(&sample_user("u2", "bob")).await.unwrap();
        repo.store_user(&sample_user("u1", "alice")).await.unwrap();

        let users = repo.list_users().await.unwrap();
        assert_eq!(users.len(), 2);
        assert_eq!(users[0].username, "alice");
        assert_eq!(users[1].username, "bob");
    }

    #[tokio::test]
    async fn update_overwrites_in_place() {
        let (repo, _dir) = setup();
        let mut user = sample_user("u1", "alice");
        repo.store_user(&user).await.unwrap();

        user.password_hash = "$2b$12$newhash".to_string();
        repo.update_user(&user).await.unwrap();

        let read = repo.get_user("u1").await.unwrap().unwrap();
        assert_eq!(read.password_hash, "$2b$12$newhash");
        assert_eq!(repo.list_users().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn delete_reports_whether_a_document_was_removed() {
        let (repo, _dir) = setup();
        repo.store_user(&sample_user("u1", "alice")).await.unwrap();

        assert!(repo.delete_user("u1").await.unwrap());
        assert!(!repo.delete_user("u1").await.unwrap());
    }
}
