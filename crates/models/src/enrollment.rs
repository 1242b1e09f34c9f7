use chrono::Utc;
use sea_orm::{entity::prelude::*, DatabaseConnection, Set};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::ModelError;
use crate::{client, health_program};

pub const STATUSES: &[&str] = &["active", "completed", "dropped"];

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "enrollment")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub client_id: Uuid,
    pub program_id: Uuid,
    pub status: String,
    pub notes: Option<String>,
    pub enrolled_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation {
    Client,
    HealthProgram,
}

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::Client => Entity::belongs_to(client::Entity)
                .from(Column::ClientId)
                .to(client::Column::Id)
                .into(),
            Relation::HealthProgram => Entity::belongs_to(health_program::Entity)
                .from(Column::ProgramId)
                .to(health_program::Column::Id)
                .into(),
        }
    }
}

impl Related<client::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Client.def()
    }
}

impl Related<health_program::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::HealthProgram.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

pub fn validate_status(status: &str) -> Result<(), ModelError> {
    if !STATUSES.contains(&status) {
        return Err(ModelError::Validation(format!(
            "status must be one of: {}",
            STATUSES.join(", ")
        )));
    }
    Ok(())
}

pub async fn create(
    db: &DatabaseConnection,
    client_id: Uuid,
    program_id: Uuid,
    status: &str,
    notes: Option<String>,
) -> Result<Model, ModelError> {
    validate_status(status)?;
    let am = ActiveModel {
        id: Set(Uuid::new_v4()),
        client_id: Set(client_id),
        program_id: Set(program_id),
        status: Set(status.to_string()),
        notes: Set(notes),
        enrolled_at: Set(Utc::now().into()),
    };
    am.insert(db).await.map_err(|e| ModelError::Db(e.to_string()))
}
