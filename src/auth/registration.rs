//! Account registration for imgstation.

use thiserror::Error;
use tracing::info;

use crate::auth::validation::{validate_username, ValidationError};
use crate::auth::{hash_password, PasswordError};
use crate::db::{NewUser, Role, User, UserRepository};
use crate::StationError;

/// Registration-specific errors.
#[derive(Error, Debug)]
pub enum RegistrationError {
    /// Username validation failed.
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Username already exists.
    #[error("username already exists")]
    UsernameExists,

    /// Password rejected or hashing failed.
    #[error("password error: {0}")]
    Password(#[from] PasswordError),

    /// Database error.
    #[error("database error: {0}")]
    Database(String),
}

impl From<RegistrationError> for StationError {
    fn from(e: RegistrationError) -> Self {
        match e {
            RegistrationError::Validation(v) => StationError::Validation(v.to_string()),
            RegistrationError::UsernameExists => StationError::Conflict("username".to_string()),
            RegistrationError::Password(PasswordError::HashError(msg)) => {
                StationError::Internal(format!("password hashing failed: {msg}"))
            }
            RegistrationError::Password(p) => StationError::Validation(p.to_string()),
            RegistrationError::Database(msg) => StationError::Database(msg),
        }
    }
}

/// Register a new account with the given role.
///
/// Validates the username and password, rejects taken usernames, hashes the
/// password and stores the user.
pub async fn register(
    repo: &UserRepository<'_>,
    username: &str,
    password: &str,
    role: Role,
) -> Result<User, RegistrationError> {
    validate_username(username)?;
    let hash = hash_password(password)?;

    if repo
        .username_exists(username)
        .await
        .map_err(|e| RegistrationError::Database(e.to_string()))?
    {
        return Err(RegistrationError::UsernameExists);
    }

    let user = repo
        .create(&NewUser::new(username, hash).with_role(role))
        .await
        .map_err(|e| match e {
            StationError::Conflict(_) => RegistrationError::UsernameExists,
            other => RegistrationError::Database(other.to_string()),
        })?;

    info!(user_id = user.id, username = %user.username, role = %user.role, "Registered user");
    Ok(user)
}

/// Create the configured super admin unless a super admin already exists.
///
/// Returns the created user, or `None` when nothing had to be done.
pub async fn ensure_super_admin(
    repo: &UserRepository<'_>,
    username: &str,
    password: &str,
) -> crate::Result<Option<User>> {
    if username.is_empty() {
        return Ok(None);
    }
    if repo.count_by_role(Role::SuperAdmin).await? > 0 {
        return Ok(None);
    }

    if let Some(existing) = repo.get_by_username(username).await? {
        let hash = hash_password(password).map_err(|e| StationError::Validation(e.to_string()))?;
        let update = crate::db::UserUpdate::new()
            .password(hash)
            .role(Role::SuperAdmin);
        let promoted = repo.update(existing.id, &update).await?;
        info!(username = %username, "Promoted existing user to super admin");
        return Ok(promoted);
    }

    let user = register(repo, username, password, Role::SuperAdmin).await?;
    info!(username = %user.username, "Created initial super admin");
    Ok(Some(user))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::verify_password;
    use crate::Database;

    #[tokio::test]
    async fn test_register_success() {
        let db = Database::open_in_memory().await.unwrap();
        let repo = UserRepository::new(db.pool());

        let user = register(&repo, "alice", "password123", Role::User)
            .await
            .unwrap();

        assert_eq!(user.username, "alice");
        assert_eq!(user.role, Role::User);
        assert!(verify_password("password123", &user.password).is_ok());
    }

    #[tokio::test]
    async fn test_register_duplicate() {
        let db = Database::open_in_memory().await.unwrap();
        let repo = UserRepository::new(db.pool());

        register(&repo, "alice", "password123", Role::User)
            .await
            .unwrap();
        let result = register(&repo, "Alice", "password123", Role::User).await;

        assert!(matches!(result, Err(RegistrationError::UsernameExists)));
    }

    #[tokio::test]
    async fn test_register_invalid_input() {
        let db = Database::open_in_memory().await.unwrap();
        let repo = UserRepository::new(db.pool());

        let result = register(&repo, "a b", "password123", Role::User).await;
        assert!(matches!(result, Err(RegistrationError::Validation(_))));

        let result = register(&repo, "alice", "short", Role::User).await;
        assert!(matches!(result, Err(RegistrationError::Password(_))));
    }

    #[test]
    fn test_registration_error_mapping() {
        let err: StationError = RegistrationError::UsernameExists.into();
        assert!(matches!(err, StationError::Conflict(_)));

        let err: StationError = RegistrationError::Password(PasswordError::TooShort).into();
        assert!(matches!(err, StationError::Validation(_)));
    }

    #[tokio::test]
    async fn test_ensure_super_admin_creates_once() {
        let db = Database::open_in_memory().await.unwrap();
        let repo = UserRepository::new(db.pool());

        let created = ensure_super_admin(&repo, "root", "changeme123")
            .await
            .unwrap();
        assert!(created.unwrap().is_super_admin());

        let again = ensure_super_admin(&repo, "root", "changeme123")
            .await
            .unwrap();
        assert!(again.is_none());
        assert_eq!(repo.count_by_role(Role::SuperAdmin).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_ensure_super_admin_promotes_existing() {
        let db = Database::open_in_memory().await.unwrap();
        let repo = UserRepository::new(db.pool());

        register(&repo, "root", "oldpassword", Role::User)
            .await
            .unwrap();
        let promoted = ensure_super_admin(&repo, "root", "newpassword")
            .await
            .unwrap()
            .unwrap();

        assert!(promoted.is_super_admin());
        assert!(verify_password("newpassword", &promoted.password).is_ok());
    }

    #[tokio::test]
    async fn test_ensure_super_admin_unconfigured() {
        let db = Database::open_in_memory().await.unwrap();
        let repo = UserRepository::new(db.pool());

        assert!(ensure_super_admin(&repo, "", "").await.unwrap().is_none());
        assert_eq!(repo.count_by_role(Role::SuperAdmin).await.unwrap(), 0);
    }
}
