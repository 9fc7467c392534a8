//! User model and related functionality

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use thiserror::Error;
use uuid::Uuid;

use crate::password;

/// User entity, identified by its normalized email address
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub is_active: bool,
    pub is_staff: bool,
    pub is_superuser: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Check a plain-text password against the stored hash
    pub fn check_password(&self, password: &str) -> bool {
        password::verify_password(password, &self.password_hash)
    }
}

impl fmt::Display for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.email)
    }
}

/// Errors raised while building a new user
#[derive(Error, Debug)]
pub enum UserError {
    #[error("Users must have an email address")]
    MissingEmail,

    #[error("Failed to hash password: {0}")]
    PasswordHash(String),
}

/// Lowercase and trim an email address
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// New user creation payload, with the password already hashed
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub name: String,
    pub password_hash: String,
    pub is_staff: bool,
    pub is_superuser: bool,
}

impl NewUser {
    /// Build a regular user
    pub fn new(email: Option<&str>, password: &str, name: &str) -> Result<Self, UserError> {
        let email = email
            .map(normalize_email)
            .filter(|email| !email.is_empty())
            .ok_or(UserError::MissingEmail)?;

        let password_hash = password::hash_password(password)
            .map_err(|e| UserError::PasswordHash(e.to_string()))?;

        Ok(Self {
            email,
            name: name.trim().to_string(),
            password_hash,
            is_staff: false,
            is_superuser: false,
        })
    }

    /// Build a user with staff and superuser rights
    pub fn superuser(email: Option<&str>, password: &str) -> Result<Self, UserError> {
        let mut user = Self::new(email, password, "")?;
        user.is_staff = true;
        user.is_superuser = true;
        Ok(user)
    }
}

/// User update payload
#[derive(Debug, Clone, Default)]
pub struct UpdateUser {
    pub name: Option<String>,
    pub password_hash: Option<String>,
}

/// Request body for registration
#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub email: Option<String>,
    pub password: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

/// Request body for profile updates
#[derive(Debug, Deserialize)]
pub struct UpdateProfileRequest {
    pub name: Option<String>,
    pub password: Option<String>,
}

/// Request body for token issuance
#[derive(Debug, Deserialize)]
pub struct TokenRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Response for token issuance
#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub token: String,
    pub token_type: String,
    pub expires_in: u64,
}

/// Public representation of a user
#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub email: String,
    pub name: String,
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            email: user.email.clone(),
            name: user.name.clone(),
        }
    }
}
