//! User registration and credential checks.

use tracing::{debug, info};

use crate::auth::{hash_password, verify_password, PasswordError};
use crate::db::{NewUser, User, UserRepository};
use crate::{Result, VaultError};

/// Minimum username length.
pub const MIN_USERNAME_LENGTH: usize = 3;

/// Maximum username length.
pub const MAX_USERNAME_LENGTH: usize = 32;

/// Message returned for every failed login, whatever the cause.
const INVALID_CREDENTIALS: &str = "invalid username or password";

/// Validate a username: 3-32 characters of ASCII letters, digits, `_` or `-`.
pub fn validate_username(username: &str) -> Result<()> {
    let len = username.chars().count();
    if !(MIN_USERNAME_LENGTH..=MAX_USERNAME_LENGTH).contains(&len) {
        return Err(VaultError::Validation(format!(
            "username must be {MIN_USERNAME_LENGTH}-{MAX_USERNAME_LENGTH} characters"
        )));
    }
    if !username
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
    {
        return Err(VaultError::Validation(
            "username may only contain letters, digits, '_' and '-'".to_string(),
        ));
    }
    Ok(())
}

/// Register a new user.
///
/// Validates the username and password, rejects taken usernames
/// (case-insensitive) with `VaultError::Conflict`, hashes the password and
/// stores the user.
pub async fn register(repo: &UserRepository<'_>, username: &str, password: &str) -> Result<User> {
    validate_username(username)?;

    if repo.username_exists(username).await? {
        return Err(VaultError::Conflict("username already exists".to_string()));
    }

    let password_hash = hash_password(password).map_err(|e| match e {
        PasswordError::TooShort | PasswordError::TooLong => VaultError::Validation(e.to_string()),
        e => VaultError::Auth(e.to_string()),
    })?;

    let user = repo.create(&NewUser::new(username, password_hash)).await?;
    info!(user_id = user.id, username = %user.username, "User registered");

    Ok(user)
}

/// Check a username/password pair.
///
/// Unknown users and wrong passwords produce the same `VaultError::Auth`.
pub async fn authenticate(
    repo: &UserRepository<'_>,
    username: &str,
    password: &str,
) -> Result<User> {
    let user = repo
        .get_by_username(username)
        .await?
        .ok_or_else(|| VaultError::Auth(INVALID_CREDENTIALS.to_string()))?;

    verify_password(password, &user.password).map_err(|e| {
        debug!(username = %username, error = %e, "Password check failed");
        VaultError::Auth(INVALID_CREDENTIALS.to_string())
    })?;

    Ok(user)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Database;

    #[test]
    fn test_validate_username() {
        assert!(validate_username("bob").is_ok());
        assert!(validate_username("john_doe-2").is_ok());
        assert!(validate_username(&"a".repeat(32)).is_ok());

        assert!(validate_username("ab").is_err());
        assert!(validate_username(&"a".repeat(33)).is_err());
        assert!(validate_username("has space").is_err());
        assert!(validate_username("slash/name").is_err());
    }

    #[tokio::test]
    async fn test_register_and_authenticate() {
        let db = Database::open_in_memory().await.unwrap();
        let repo = UserRepository::new(db.pool());

        let user = register(&repo, "alice", "password123").await.unwrap();
        assert_eq!(user.username, "alice");
        assert!(user.password.starts_with("$argon2id$"));

        let authed = authenticate(&repo, "alice", "password123").await.unwrap();
        assert_eq!(authed.id, user.id);
    }

    #[tokio::test]
    async fn test_register_duplicate() {
        let db = Database::open_in_memory().await.unwrap();
        let repo = UserRepository::new(db.pool());

        register(&repo, "alice", "password123").await.unwrap();
        let result = register(&repo, "Alice", "password456").await;

        assert!(matches!(result, Err(VaultError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_register_short_password() {
        let db = Database::open_in_memory().await.unwrap();
        let repo = UserRepository::new(db.pool());

        let result = register(&repo, "alice", "short").await;
        assert!(matches!(result, Err(VaultError::Validation(_))));
    }

    #[tokio::test]
    async fn test_authenticate_failures_are_uniform() {
        let db = Database::open_in_memory().await.unwrap();
        let repo = UserRepository::new(db.pool());
        register(&repo, "alice", "password123").await.unwrap();

        let wrong_password = authenticate(&repo, "alice", "wrongpass1").await.unwrap_err();
        let unknown_user = authenticate(&repo, "mallory", "password123").await.unwrap_err();

        assert_eq!(wrong_password.to_string(), unknown_user.to_string());
        assert!(matches!(wrong_password, VaultError::Auth(_)));
    }
}
