//! User repository for treevault.

use sqlx::SqlitePool;

use super::user::{NewUser, User};
use crate::{Result, VaultError};

/// Repository for user CRUD operations.
pub struct UserRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> UserRepository<'a> {
    /// Create a new UserRepository with the given database pool reference.
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a new user in the database.
    ///
    /// Returns `VaultError::Conflict` if the username is already taken
    /// (case-insensitive).
    pub async fn create(&self, new_user: &NewUser) -> Result<User> {
        let result = sqlx::query("INSERT INTO users (username, password) VALUES (?, ?)")
            .bind(&new_user.username)
            .bind(&new_user.password)
            .execute(self.pool)
            .await
            .map_err(|e| match e {
                sqlx::Error::Database(ref db_err) if db_err.is_unique_violation() => {
                    VaultError::Conflict("username already exists".to_string())
                }
                e => VaultError::Database(e.to_string()),
            })?;

        let id = result.last_insert_rowid();
        self.get_by_id(id)
            .await?
            .ok_or_else(|| VaultError::NotFound("user".to_string()))
    }

    /// Get a user by ID.
    pub async fn get_by_id(&self, id: i64) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, username, password, created_at FROM users WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(user)
    }

    /// Get a user by username (case-insensitive).
    pub async fn get_by_username(&self, username: &str) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, username, password, created_at
             FROM users WHERE username = ? COLLATE NOCASE",
        )
        .bind(username)
        .fetch_optional(self.pool)
        .await?;

        Ok(user)
    }

    /// Check if a username is already taken (case-insensitive).
    pub async fn username_exists(&self, username: &str) -> Result<bool> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE username = ? COLLATE NOCASE")
                .bind(username)
                .fetch_one(self.pool)
                .await?;
        Ok(count > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Database;

    async fn setup_db() -> Database {
        Database::open_in_memory().await.unwrap()
    }

    #[tokio::test]
    async fn test_create_user() {
        let db = setup_db().await;
        let repo = UserRepository::new(db.pool());

        let user = repo.create(&NewUser::new("testuser", "hashedpw")).await.unwrap();

        assert_eq!(user.id, 1);
        assert_eq!(user.username, "testuser");
        assert_eq!(user.password, "hashedpw");
        assert!(!user.created_at.is_empty());
    }

    #[tokio::test]
    async fn test_create_duplicate_username_case_insensitive() {
        let db = setup_db().await;
        let repo = UserRepository::new(db.pool());

        repo.create(&NewUser::new("alice", "hash")).await.unwrap();
        let result = repo.create(&NewUser::new("ALICE", "hash")).await;

        assert!(matches!(result, Err(VaultError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_get_by_username_case_insensitive() {
        let db = setup_db().await;
        let repo = UserRepository::new(db.pool());

        let created = repo.create(&NewUser::new("Alice", "hash")).await.unwrap();
        let found = repo.get_by_username("alice").await.unwrap().unwrap();

        assert_eq!(found.id, created.id);
        assert_eq!(found.username, "Alice");
    }

    #[tokio::test]
    async fn test_get_missing_user() {
        let db = setup_db().await;
        let repo = UserRepository::new(db.pool());

        assert!(repo.get_by_id(999).await.unwrap().is_none());
        assert!(repo.get_by_username("nobody").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_username_exists() {
        let db = setup_db().await;
        let repo = UserRepository::new(db.pool());

        assert!(!repo.username_exists("bob").await.unwrap());
        repo.create(&NewUser::new("bob", "hash")).await.unwrap();
        assert!(repo.username_exists("BOB").await.unwrap());
    }
}
