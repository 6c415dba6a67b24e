use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// User model representing the database schema
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct User {
    /// Unique identifier for the user
    pub id: Uuid,
    /// Display name, unique across the application
    pub username: String,
    /// Hashed password of the user
    pub password_hash: String,
    /// Timestamp when the user was created
    pub created_at: DateTime<Utc>,
}

/// Request structure for user registration
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterForm {
    /// Desired username
    #[validate(length(min = 3, max = 30, message = "Username must be 3-30 characters"))]
    pub username: String,

    /// Password for the account
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,
}

/// Request structure for user login
#[derive(Debug, Deserialize, Validate)]
pub struct LoginForm {
    /// Username of the account
    #[validate(length(min = 1, message = "Username is required"))]
    pub username: String,

    /// Password for the account
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Claims carried by the signed session cookie
#[derive(Debug, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Session identifier
    pub sub: String,
    /// Expiration timestamp of the cookie
    pub exp: usize,
    /// Issued at timestamp
    pub iat: usize,
}

/// Custom error type for authentication-related errors
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// The username is already registered
    #[error("Username already taken")]
    UsernameTaken,

    /// The provided credentials are invalid
    #[error("Invalid username or password")]
    InvalidCredentials,

    /// An internal database error occurred
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// An error occurred while hashing the password
    #[error("Password hashing error: {0}")]
    PasswordHash(#[from] bcrypt::BcryptError),

    /// The session cookie could not be signed or verified
    #[error("Session cookie error: {0}")]
    Cookie(#[from] jsonwebtoken::errors::Error),

    /// An error occurred while validating input data
    #[error("Validation error: {0}")]
    Validation(String),
}
