use chrono::Utc;
use sea_orm::{entity::prelude::*, DatabaseConnection, QueryFilter, Set};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::ModelError;
use crate::user;

/// Persisted refresh token. Access tokens are never stored.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "token")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub user_id: Uuid,
    pub token: String,
    pub expires_at: DateTimeWithTimeZone,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation {
    User,
}

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::User => Entity::belongs_to(user::Entity)
                .from(Column::UserId)
                .to(user::Column::Id)
                .into(),
        }
    }
}

impl Related<user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

pub async fn create(
    db: &DatabaseConnection,
    user_id: Uuid,
    token: &str,
    expires_at: DateTimeWithTimeZone,
) -> Result<Model, ModelError> {
    let am = ActiveModel {
        id: Set(Uuid::new_v4()),
        user_id: Set(user_id),
        token: Set(token.to_string()),
        expires_at: Set(expires_at),
        created_at: Set(Utc::now().into()),
    };
    am.insert(db).await.map_err(|e| ModelError::Db(e.to_string()))
}

/// Look up a stored refresh token that has not yet expired.
pub async fn find_valid(db: &DatabaseConnection, token: &str) -> Result<Option<Model>, ModelError> {
    Entity::find()
        .filter(Column::Token.eq(token))
        .filter(Column::ExpiresAt.gt(Utc::now()))
        .one(db)
        .await
        .map_err(|e| ModelError::Db(e.to_string()))
}

pub async fn delete(db: &DatabaseConnection, id: Uuid) -> Result<(), ModelError> {
    Entity::delete_by_id(id)
        .exec(db)
        .await
        .map_err(|e| ModelError::Db(e.to_string()))?;
    Ok(())
}
