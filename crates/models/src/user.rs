use chrono::Utc;
use sea_orm::{entity::prelude::*, DatabaseConnection, Set};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::ModelError;
use crate::{client, token};

pub const ROLES: &[&str] = &["admin", "user"];

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "user")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    pub role: String,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation {
    Client,
    Token,
}

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::Client => Entity::has_many(client::Entity).into(),
            Relation::Token => Entity::has_many(token::Entity).into(),
        }
    }
}

impl Related<client::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Client.def()
    }
}

impl Related<token::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Token.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

pub fn validate_email(email: &str) -> Result<(), ModelError> {
    if !email.contains('@') {
        return Err(ModelError::Validation("invalid email".into()));
    }
    Ok(())
}

pub fn validate_name(name: &str) -> Result<(), ModelError> {
    if name.trim().is_empty() {
        return Err(ModelError::Validation("name required".into()));
    }
    Ok(())
}

pub fn validate_role(role: &str) -> Result<(), ModelError> {
    if !ROLES.contains(&role) {
        return Err(ModelError::Validation(format!(
            "role must be one of: {}",
            ROLES.join(", ")
        )));
    }
    Ok(())
}

pub async fn create(
    db: &DatabaseConnection,
    name: &str,
    email: &str,
    password_hash: &str,
    role: &str,
) -> Result<Model, ModelError> {
    validate_name(name)?;
    validate_email(email)?;
    validate_role(role)?;
    let now = Utc::now().into();
    let am = ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set(name.to_string()),
        email: Set(email.to_string()),
        password_hash: Set(password_hash.to_string()),
        role: Set(role.to_string()),
        created_at: Set(now),
        updated_at: Set(now),
    };
    am.insert(db).await.map_err(|e| ModelError::Db(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_needs_at_sign() {
        assert!(validate_email("nurse.example.com").is_err());
        assert!(validate_email("nurse@example.com").is_ok());
    }

    #[test]
    fn role_is_whitelisted() {
        assert!(validate_role("admin").is_ok());
        assert!(validate_role("user").is_ok());
        assert!(validate_role("superuser").is_err());
    }

    #[test]
    fn name_must_not_be_blank() {
        assert!(validate_name("  ").is_err());
        assert!(validate_name("Asha").is_ok());
    }
}
