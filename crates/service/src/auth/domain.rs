use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Registration input
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterInput {
    pub name: String,
    pub email: String,
    pub password: String,
}

/// Login input
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginInput {
    pub email: String,
    pub password: String,
}

/// Domain user (business view, never carries the password hash)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthUser {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A signed token plus its expiry instant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenWithExpiry {
    pub token: String,
    pub expires: DateTime<Utc>,
}

/// Access + refresh pair returned by register/login/refresh.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenPair {
    pub access: TokenWithExpiry,
    pub refresh: TokenWithExpiry,
}

/// Login result (session)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthSession {
    pub user: AuthUser,
    pub tokens: TokenPair,
}

/// Persisted refresh-token row as the repository sees it.
#[derive(Debug, Clone)]
pub struct StoredToken {
    pub id: Uuid,
    pub user_id: Uuid,
    pub expires_at: DateTime<Utc>,
}

/// JWT payload for both access and refresh tokens.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// user id
    pub sub: String,
    pub role: String,
    /// unique token id; keeps a rotated pair distinct from its predecessor
    pub jti: String,
    pub iat: usize,
    pub exp: usize,
}
