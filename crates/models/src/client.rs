use chrono::{NaiveDate, Utc};
use sea_orm::{entity::prelude::*, DatabaseConnection, Set};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::ModelError;
use crate::{enrollment, user};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "client")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub full_name: String,
    pub dob: Date,
    pub gender: String,
    pub contact: String,
    pub notes: Option<String>,
    pub user_id: Uuid,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation {
    User,
    Enrollment,
}

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::User => Entity::belongs_to(user::Entity)
                .from(Column::UserId)
                .to(user::Column::Id)
                .into(),
            Relation::Enrollment => Entity::has_many(enrollment::Entity).into(),
        }
    }
}

impl Related<user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl Related<enrollment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Enrollment.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

pub fn validate_full_name(full_name: &str) -> Result<(), ModelError> {
    if full_name.trim().is_empty() {
        return Err(ModelError::Validation("fullName required".into()));
    }
    Ok(())
}

pub fn validate_contact(contact: &str) -> Result<(), ModelError> {
    if contact.trim().is_empty() {
        return Err(ModelError::Validation("contact required".into()));
    }
    Ok(())
}

pub fn validate_gender(gender: &str) -> Result<(), ModelError> {
    if gender.trim().is_empty() {
        return Err(ModelError::Validation("gender required".into()));
    }
    Ok(())
}

#[allow(clippy::too_many_arguments)]
pub async fn create(
    db: &DatabaseConnection,
    full_name: &str,
    dob: NaiveDate,
    gender: &str,
    contact: &str,
    notes: Option<String>,
    user_id: Uuid,
) -> Result<Model, ModelError> {
    validate_full_name(full_name)?;
    validate_gender(gender)?;
    validate_contact(contact)?;
    let now = Utc::now().into();
    let am = ActiveModel {
        id: Set(Uuid::new_v4()),
        full_name: Set(full_name.to_string()),
        dob: Set(dob),
        gender: Set(gender.to_string()),
        contact: Set(contact.to_string()),
        notes: Set(notes),
        user_id: Set(user_id),
        created_at: Set(now),
        updated_at: Set(now),
    };
    am.insert(db).await.map_err(|e| ModelError::Db(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_fields_rejected() {
        assert!(validate_full_name("").is_err());
        assert!(validate_contact(" ").is_err());
        assert!(validate_gender("").is_err());
        assert!(validate_full_name("Jane Wambui").is_ok());
    }
}
