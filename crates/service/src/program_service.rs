use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, Order, PaginatorTrait,
    QueryFilter, QueryOrder, Set,
};
use serde::Deserialize;
use uuid::Uuid;

use models::health_program;

use crate::errors::ServiceError;
use crate::pagination::{Page, Pagination};
use crate::sort;

const SORTABLE: &[(&str, health_program::Column)] = &[
    ("name", health_program::Column::Name),
    ("createdAt", health_program::Column::CreatedAt),
    ("updatedAt", health_program::Column::UpdatedAt),
];

#[derive(Debug, Clone, Deserialize)]
pub struct ProgramCreate {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProgramUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
}

async fn find_by_name(
    db: &DatabaseConnection,
    name: &str,
) -> Result<Option<health_program::Model>, ServiceError> {
    health_program::Entity::find()
        .filter(health_program::Column::Name.eq(name))
        .one(db)
        .await
        .map_err(|e| ServiceError::Db(e.to_string()))
}

/// Create a program; names are unique across the registry.
pub async fn create_program(
    db: &DatabaseConnection,
    input: ProgramCreate,
) -> Result<health_program::Model, ServiceError> {
    if find_by_name(db, &input.name).await?.is_some() {
        return Err(ServiceError::Conflict("program name already exists".into()));
    }
    let created = health_program::create(db, &input.name, input.description).await?;
    Ok(created)
}

/// List programs with an optional name search.
pub async fn query_programs(
    db: &DatabaseConnection,
    search: Option<&str>,
    opts: Pagination,
    sort_by: Option<&str>,
) -> Result<Page<health_program::Model>, ServiceError> {
    let (page_idx, per_page) = opts.normalize();
    let (column, order) =
        sort::resolve(sort_by, SORTABLE, (health_program::Column::CreatedAt, Order::Desc))?;

    let mut query = health_program::Entity::find();
    if let Some(term) = search {
        if !term.trim().is_empty() {
            query = query.filter(health_program::Column::Name.contains(term));
        }
    }

    let paginator = query.order_by(column, order).paginate(db, per_page);
    let total = paginator.num_items().await.map_err(|e| ServiceError::Db(e.to_string()))?;
    let results = paginator
        .fetch_page(page_idx)
        .await
        .map_err(|e| ServiceError::Db(e.to_string()))?;
    Ok(Page::assemble(results, total, page_idx, per_page))
}

pub async fn get_program(
    db: &DatabaseConnection,
    id: Uuid,
) -> Result<health_program::Model, ServiceError> {
    health_program::Entity::find_by_id(id)
        .one(db)
        .await
        .map_err(|e| ServiceError::Db(e.to_string()))?
        .ok_or_else(|| ServiceError::not_found("health program"))
}

/// Update a program, re-checking name uniqueness when the name changes.
pub async fn update_program(
    db: &DatabaseConnection,
    id: Uuid,
    update: ProgramUpdate,
) -> Result<health_program::Model, ServiceError> {
    let existing = get_program(db, id).await?;

    if let Some(name) = update.name.as_deref() {
        health_program::validate_name(name)?;
        if name != existing.name && find_by_name(db, name).await?.is_some() {
            return Err(ServiceError::Conflict("program name already exists".into()));
        }
    }

    let mut am: health_program::ActiveModel = existing.into();
    if let Some(name) = update.name {
        am.name = Set(name);
    }
    if let Some(description) = update.description {
        am.description = Set(Some(description));
    }
    am.updated_at = Set(Utc::now().into());
    am.update(db).await.map_err(|e| ServiceError::Db(e.to_string()))
}

/// Delete a program; enrollments referencing it cascade away.
pub async fn delete_program(db: &DatabaseConnection, id: Uuid) -> Result<(), ServiceError> {
    let existing = get_program(db, id).await?;
    health_program::Entity::delete_by_id(existing.id)
        .exec(db)
        .await
        .map_err(|e| ServiceError::Db(e.to_string()))?;
    Ok(())
}
