use std::collections::HashMap;

use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, Order, PaginatorTrait,
    QueryFilter, QueryOrder, Set,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use models::{client, enrollment, health_program};

use crate::errors::ServiceError;
use crate::pagination::{Page, Pagination};
use crate::sort;

const SORTABLE: &[(&str, enrollment::Column)] = &[
    ("enrolledAt", enrollment::Column::EnrolledAt),
    ("status", enrollment::Column::Status),
];

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrollmentCreate {
    pub client_id: Uuid,
    pub program_id: Uuid,
    pub status: String,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct EnrollmentUpdate {
    pub status: Option<String>,
    pub notes: Option<String>,
}

/// Filters for the enrollment listing.
#[derive(Debug, Clone, Default)]
pub struct EnrollmentQuery {
    pub client_id: Option<Uuid>,
    pub program_id: Option<Uuid>,
    pub status: Option<String>,
}

/// An enrollment joined with its client and program.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrollmentDetail {
    #[serde(flatten)]
    pub enrollment: enrollment::Model,
    pub client: Option<client::Model>,
    pub health_program: Option<health_program::Model>,
}

/// Enroll a client into a program. Both sides must exist and the pair must
/// not already be enrolled.
pub async fn create_enrollment(
    db: &DatabaseConnection,
    input: EnrollmentCreate,
) -> Result<enrollment::Model, ServiceError> {
    let client_exists = client::Entity::find_by_id(input.client_id)
        .one(db)
        .await
        .map_err(|e| ServiceError::Db(e.to_string()))?;
    if client_exists.is_none() {
        return Err(ServiceError::not_found("client"));
    }

    let program_exists = health_program::Entity::find_by_id(input.program_id)
        .one(db)
        .await
        .map_err(|e| ServiceError::Db(e.to_string()))?;
    if program_exists.is_none() {
        return Err(ServiceError::not_found("health program"));
    }

    let existing = enrollment::Entity::find()
        .filter(enrollment::Column::ClientId.eq(input.client_id))
        .filter(enrollment::Column::ProgramId.eq(input.program_id))
        .one(db)
        .await
        .map_err(|e| ServiceError::Db(e.to_string()))?;
    if existing.is_some() {
        return Err(ServiceError::Conflict("client is already enrolled in this program".into()));
    }

    let created =
        enrollment::create(db, input.client_id, input.program_id, &input.status, input.notes)
            .await?;
    Ok(created)
}

/// Query enrollments with optional client/program/status filters. Results
/// carry the joined client and program, loaded in one batch per page.
pub async fn query_enrollments(
    db: &DatabaseConnection,
    filter: EnrollmentQuery,
    opts: Pagination,
    sort_by: Option<&str>,
) -> Result<Page<EnrollmentDetail>, ServiceError> {
    let (page_idx, per_page) = opts.normalize();
    let (column, order) =
        sort::resolve(sort_by, SORTABLE, (enrollment::Column::EnrolledAt, Order::Desc))?;

    let mut query = enrollment::Entity::find();
    if let Some(client_id) = filter.client_id {
        query = query.filter(enrollment::Column::ClientId.eq(client_id));
    }
    if let Some(program_id) = filter.program_id {
        query = query.filter(enrollment::Column::ProgramId.eq(program_id));
    }
    if let Some(status) = filter.status.as_deref() {
        enrollment::validate_status(status)?;
        query = query.filter(enrollment::Column::Status.eq(status));
    }

    let paginator = query.order_by(column, order).paginate(db, per_page);
    let total = paginator.num_items().await.map_err(|e| ServiceError::Db(e.to_string()))?;
    let rows = paginator
        .fetch_page(page_idx)
        .await
        .map_err(|e| ServiceError::Db(e.to_string()))?;

    let details = attach_relations(db, rows).await?;
    Ok(Page::assemble(details, total, page_idx, per_page))
}

/// List enrollments for one client, failing when the client is unknown.
pub async fn enrollments_for_client(
    db: &DatabaseConnection,
    client_id: Uuid,
    mut filter: EnrollmentQuery,
    opts: Pagination,
    sort_by: Option<&str>,
) -> Result<Page<EnrollmentDetail>, ServiceError> {
    let exists = client::Entity::find_by_id(client_id)
        .one(db)
        .await
        .map_err(|e| ServiceError::Db(e.to_string()))?;
    if exists.is_none() {
        return Err(ServiceError::not_found("client"));
    }
    filter.client_id = Some(client_id);
    query_enrollments(db, filter, opts, sort_by).await
}

pub async fn get_enrollment(
    db: &DatabaseConnection,
    id: Uuid,
) -> Result<EnrollmentDetail, ServiceError> {
    let found = enrollment::Entity::find_by_id(id)
        .one(db)
        .await
        .map_err(|e| ServiceError::Db(e.to_string()))?
        .ok_or_else(|| ServiceError::not_found("enrollment"))?;
    let mut details = attach_relations(db, vec![found]).await?;
    Ok(details.remove(0))
}

pub async fn update_enrollment(
    db: &DatabaseConnection,
    id: Uuid,
    update: EnrollmentUpdate,
) -> Result<enrollment::Model, ServiceError> {
    let existing = enrollment::Entity::find_by_id(id)
        .one(db)
        .await
        .map_err(|e| ServiceError::Db(e.to_string()))?
        .ok_or_else(|| ServiceError::not_found("enrollment"))?;

    let mut am: enrollment::ActiveModel = existing.into();
    if let Some(status) = update.status {
        enrollment::validate_status(&status)?;
        am.status = Set(status);
    }
    if let Some(notes) = update.notes {
        am.notes = Set(Some(notes));
    }
    am.update(db).await.map_err(|e| ServiceError::Db(e.to_string()))
}

pub async fn delete_enrollment(db: &DatabaseConnection, id: Uuid) -> Result<(), ServiceError> {
    let existing = enrollment::Entity::find_by_id(id)
        .one(db)
        .await
        .map_err(|e| ServiceError::Db(e.to_string()))?
        .ok_or_else(|| ServiceError::not_found("enrollment"))?;
    enrollment::Entity::delete_by_id(existing.id)
        .exec(db)
        .await
        .map_err(|e| ServiceError::Db(e.to_string()))?;
    Ok(())
}

/// Batch-load the clients and programs referenced by a page of enrollments.
async fn attach_relations(
    db: &DatabaseConnection,
    rows: Vec<enrollment::Model>,
) -> Result<Vec<EnrollmentDetail>, ServiceError> {
    let client_ids: Vec<Uuid> = rows.iter().map(|e| e.client_id).collect();
    let program_ids: Vec<Uuid> = rows.iter().map(|e| e.program_id).collect();

    let clients: HashMap<Uuid, client::Model> = client::Entity::find()
        .filter(client::Column::Id.is_in(client_ids))
        .all(db)
        .await
        .map_err(|e| ServiceError::Db(e.to_string()))?
        .into_iter()
        .map(|c| (c.id, c))
        .collect();

    let programs: HashMap<Uuid, health_program::Model> = health_program::Entity::find()
        .filter(health_program::Column::Id.is_in(program_ids))
        .all(db)
        .await
        .map_err(|e| ServiceError::Db(e.to_string()))?
        .into_iter()
        .map(|p| (p.id, p))
        .collect();

    Ok(rows
        .into_iter()
        .map(|e| {
            let client = clients.get(&e.client_id).cloned();
            let health_program = programs.get(&e.program_id).cloned();
            EnrollmentDetail { enrollment: e, client, health_program }
        })
        .collect())
}
