use chrono::{DateTime, Utc};
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter};
use uuid::Uuid;

use crate::auth::domain::{AuthUser, StoredToken};
use crate::auth::errors::AuthError;
use crate::auth::repository::AuthRepository;

pub struct SeaOrmAuthRepository {
    pub db: DatabaseConnection,
}

/// Input problems stay client-facing; everything else is a repository fault.
fn model_err(e: models::errors::ModelError) -> AuthError {
    match e {
        models::errors::ModelError::Validation(msg) => AuthError::Validation(msg),
        models::errors::ModelError::Db(msg) => AuthError::Repository(msg),
    }
}

fn to_auth_user(u: models::user::Model) -> AuthUser {
    AuthUser {
        id: u.id,
        name: u.name,
        email: u.email,
        role: u.role,
        created_at: u.created_at.with_timezone(&Utc),
        updated_at: u.updated_at.with_timezone(&Utc),
    }
}

#[async_trait::async_trait]
impl AuthRepository for SeaOrmAuthRepository {
    async fn find_user_by_email(&self, email: &str) -> Result<Option<AuthUser>, AuthError> {
        let res = models::user::Entity::find()
            .filter(models::user::Column::Email.eq(email.to_string()))
            .one(&self.db)
            .await
            .map_err(|e| AuthError::Repository(e.to_string()))?;
        Ok(res.map(to_auth_user))
    }

    async fn find_user_by_id(&self, id: Uuid) -> Result<Option<AuthUser>, AuthError> {
        let res = models::user::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| AuthError::Repository(e.to_string()))?;
        Ok(res.map(to_auth_user))
    }

    async fn create_user(
        &self,
        name: &str,
        email: &str,
        password_hash: &str,
        role: &str,
    ) -> Result<AuthUser, AuthError> {
        let created = models::user::create(&self.db, name, email, password_hash, role)
            .await
            .map_err(model_err)?;
        Ok(to_auth_user(created))
    }

    async fn get_password_hash(&self, user_id: Uuid) -> Result<Option<String>, AuthError> {
        let res = models::user::Entity::find_by_id(user_id)
            .one(&self.db)
            .await
            .map_err(|e| AuthError::Repository(e.to_string()))?;
        Ok(res.map(|u| u.password_hash))
    }

    async fn save_refresh_token(
        &self,
        user_id: Uuid,
        token: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<(), AuthError> {
        models::token::create(&self.db, user_id, token, expires_at.into())
            .await
            .map_err(|e| AuthError::Repository(e.to_string()))?;
        Ok(())
    }

    async fn find_valid_refresh_token(&self, token: &str) -> Result<Option<StoredToken>, AuthError> {
        let res = models::token::find_valid(&self.db, token)
            .await
            .map_err(|e| AuthError::Repository(e.to_string()))?;
        Ok(res.map(|t| StoredToken {
            id: t.id,
            user_id: t.user_id,
            expires_at: t.expires_at.with_timezone(&Utc),
        }))
    }

    async fn delete_refresh_token(&self, id: Uuid) -> Result<(), AuthError> {
        models::token::delete(&self.db, id)
            .await
            .map_err(|e| AuthError::Repository(e.to_string()))?;
        Ok(())
    }
}
