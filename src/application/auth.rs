//! Session authentication: signup, login, logout, and session resolution.
//!
//! Passwords are hashed with argon2id; sessions are opaque tokens persisted
//! by the store and carried in a cookie by the HTTP layer.

use std::sync::Arc;

use argon2::{
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
    password_hash::{SaltString, rand_core::OsRng},
};
use thiserror::Error;

use crate::application::repos::{RepoError, SessionsRepo, UsersRepo};
use crate::domain::entities::UserRecord;

const USERNAME_MAX_CHARS: usize = 150;
const PASSWORD_MIN_CHARS: usize = 8;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("validation failed: {0}")]
    Validation(String),
    #[error("username is already taken")]
    UsernameTaken,
    #[error("invalid username or password")]
    InvalidCredentials,
    #[error("password hashing failed: {0}")]
    Hashing(String),
    #[error(transparent)]
    Repo(#[from] RepoError),
}

/// A freshly established session.
#[derive(Debug, Clone)]
pub struct SignedIn {
    pub user: UserRecord,
    pub token: String,
}

pub struct AuthService {
    users: Arc<dyn UsersRepo>,
    sessions: Arc<dyn SessionsRepo>,
}

impl AuthService {
    pub fn new(users: Arc<dyn UsersRepo>, sessions: Arc<dyn SessionsRepo>) -> Self {
        Self { users, sessions }
    }

    /// Register a new account and open a session for it.
    pub async fn signup(&self, username: &str, password: &str) -> Result<SignedIn, AuthError> {
        let username = username.trim();
        validate_username(username)?;
        validate_password(password)?;
        let hash = hash_password(password)?;
        let user = match self.users.create_user(username, &hash).await {
            Ok(user) => user,
            Err(RepoError::Duplicate { .. }) => return Err(AuthError::UsernameTaken),
            Err(err) => return Err(err.into()),
        };
        let token = self.sessions.create_session(user.id).await?;
        Ok(SignedIn { user, token })
    }

    /// Verify credentials and open a session.
    pub async fn login(&self, username: &str, password: &str) -> Result<SignedIn, AuthError> {
        let user = self
            .users
            .find_by_username(username.trim())
            .await?
            .ok_or(AuthError::InvalidCredentials)?;
        if !verify_password(password, &user.password_hash)? {
            return Err(AuthError::InvalidCredentials);
        }
        let token = self.sessions.create_session(user.id).await?;
        Ok(SignedIn { user, token })
    }

    /// Close the session behind a token. Unknown tokens are a no-op.
    pub async fn logout(&self, token: &str) -> Result<(), AuthError> {
        self.sessions.delete_session(token).await?;
        Ok(())
    }

    /// Resolve a session token to its user, if the session is still live.
    pub async fn resolve(&self, token: &str) -> Result<Option<UserRecord>, AuthError> {
        Ok(self.sessions.find_user_by_session(token).await?)
    }
}

fn validate_username(username: &str) -> Result<(), AuthError> {
    if username.is_empty() {
        return Err(AuthError::Validation("username must not be empty".into()));
    }
    if username.chars().count() > USERNAME_MAX_CHARS {
        return Err(AuthError::Validation(format!(
            "username must not exceed {USERNAME_MAX_CHARS} characters"
        )));
    }
    let allowed = |c: char| c.is_alphanumeric() || matches!(c, '@' | '.' | '+' | '-' | '_');
    if !username.chars().all(allowed) {
        return Err(AuthError::Validation(
            "username may contain letters, digits and @/./+/-/_ only".into(),
        ));
    }
    Ok(())
}

fn validate_password(password: &str) -> Result<(), AuthError> {
    if password.chars().count() < PASSWORD_MIN_CHARS {
        return Err(AuthError::Validation(format!(
            "password must be at least {PASSWORD_MIN_CHARS} characters"
        )));
    }
    Ok(())
}

fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|err| AuthError::Hashing(err.to_string()))
}

fn verify_password(password: &str, stored_hash: &str) -> Result<bool, AuthError> {
    let parsed = PasswordHash::new(stored_hash).map_err(|err| AuthError::Hashing(err.to_string()))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn password_round_trip_verifies() {
        let hash = hash_password("correct horse battery").unwrap();
        assert!(verify_password("correct horse battery", &hash).unwrap());
        assert!(!verify_password("wrong password", &hash).unwrap());
    }

    #[test]
    fn username_charset_is_enforced() {
        assert!(validate_username("leo.tolstoy_1828").is_ok());
        assert!(validate_username("has space").is_err());
        assert!(validate_username("").is_err());
    }

    #[test]
    fn short_password_is_rejected() {
        assert!(validate_password("short").is_err());
        assert!(validate_password("longenough").is_ok());
    }
}
