use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::domain::{AuthUser, StoredToken};
use super::errors::AuthError;

/// Repository abstraction for auth-related persistence.
#[async_trait]
pub trait AuthRepository: Send + Sync {
    async fn find_user_by_email(&self, email: &str) -> Result<Option<AuthUser>, AuthError>;
    async fn find_user_by_id(&self, id: Uuid) -> Result<Option<AuthUser>, AuthError>;
    async fn create_user(
        &self,
        name: &str,
        email: &str,
        password_hash: &str,
        role: &str,
    ) -> Result<AuthUser, AuthError>;

    async fn get_password_hash(&self, user_id: Uuid) -> Result<Option<String>, AuthError>;

    async fn save_refresh_token(
        &self,
        user_id: Uuid,
        token: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<(), AuthError>;
    /// Find a persisted refresh token that has not expired.
    async fn find_valid_refresh_token(&self, token: &str) -> Result<Option<StoredToken>, AuthError>;
    async fn delete_refresh_token(&self, id: Uuid) -> Result<(), AuthError>;
}

/// Simple in-memory mock repository for tests
pub mod mock {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    #[derive(Default)]
    pub struct MockAuthRepository {
        users: Mutex<HashMap<String, (AuthUser, String)>>, // key: email, value: (user, hash)
        tokens: Mutex<HashMap<String, StoredToken>>,       // key: refresh token
    }

    #[async_trait]
    impl AuthRepository for MockAuthRepository {
        async fn find_user_by_email(&self, email: &str) -> Result<Option<AuthUser>, AuthError> {
            let users = self.users.lock().unwrap();
            Ok(users.get(email).map(|(u, _)| u.clone()))
        }

        async fn find_user_by_id(&self, id: Uuid) -> Result<Option<AuthUser>, AuthError> {
            let users = self.users.lock().unwrap();
            Ok(users.values().find(|(u, _)| u.id == id).map(|(u, _)| u.clone()))
        }

        async fn create_user(
            &self,
            name: &str,
            email: &str,
            password_hash: &str,
            role: &str,
        ) -> Result<AuthUser, AuthError> {
            let mut users = self.users.lock().unwrap();
            if users.contains_key(email) {
                return Err(AuthError::Conflict);
            }
            let now = Utc::now();
            let user = AuthUser {
                id: Uuid::new_v4(),
                name: name.to_string(),
                email: email.to_string(),
                role: role.to_string(),
                created_at: now,
                updated_at: now,
            };
            users.insert(email.to_string(), (user.clone(), password_hash.to_string()));
            Ok(user)
        }

        async fn get_password_hash(&self, user_id: Uuid) -> Result<Option<String>, AuthError> {
            let users = self.users.lock().unwrap();
            Ok(users.values().find(|(u, _)| u.id == user_id).map(|(_, h)| h.clone()))
        }

        async fn save_refresh_token(
            &self,
            user_id: Uuid,
            token: &str,
            expires_at: DateTime<Utc>,
        ) -> Result<(), AuthError> {
            let mut tokens = self.tokens.lock().unwrap();
            tokens.insert(
                token.to_string(),
                StoredToken { id: Uuid::new_v4(), user_id, expires_at },
            );
            Ok(())
        }

        async fn find_valid_refresh_token(
            &self,
            token: &str,
        ) -> Result<Option<StoredToken>, AuthError> {
            let tokens = self.tokens.lock().unwrap();
            Ok(tokens.get(token).filter(|t| t.expires_at > Utc::now()).cloned())
        }

        async fn delete_refresh_token(&self, id: Uuid) -> Result<(), AuthError> {
            let mut tokens = self.tokens.lock().unwrap();
            tokens.retain(|_, t| t.id != id);
            Ok(())
        }
    }
}
