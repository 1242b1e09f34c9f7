use std::collections::HashMap;

use chrono::{NaiveDate, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, Order,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use models::{client, enrollment, health_program};

use crate::errors::ServiceError;
use crate::pagination::{Page, Pagination};
use crate::sort;

const SORTABLE: &[(&str, client::Column)] = &[
    ("fullName", client::Column::FullName),
    ("dob", client::Column::Dob),
    ("gender", client::Column::Gender),
    ("contact", client::Column::Contact),
    ("createdAt", client::Column::CreatedAt),
    ("updatedAt", client::Column::UpdatedAt),
];

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientCreate {
    pub full_name: String,
    pub dob: NaiveDate,
    pub gender: String,
    pub contact: String,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientUpdate {
    pub full_name: Option<String>,
    pub dob: Option<NaiveDate>,
    pub gender: Option<String>,
    pub contact: Option<String>,
    pub notes: Option<String>,
}

/// An enrollment together with its program, as shown on the client profile.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrollmentWithProgram {
    #[serde(flatten)]
    pub enrollment: enrollment::Model,
    pub health_program: Option<health_program::Model>,
}

/// Client profile: the record plus every program enrollment.
#[derive(Debug, Serialize)]
pub struct ClientProfile {
    #[serde(flatten)]
    pub client: client::Model,
    pub programs: Vec<EnrollmentWithProgram>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecentClient {
    pub id: Uuid,
    pub full_name: String,
    pub created_at: sea_orm::prelude::DateTimeWithTimeZone,
}

#[derive(Debug, Serialize)]
pub struct ClientStats {
    pub total: u64,
    pub recent: Vec<RecentClient>,
}

#[derive(Debug, Serialize)]
pub struct ProgramStats {
    pub total: u64,
}

#[derive(Debug, Serialize)]
pub struct StatusDistribution {
    pub active: u64,
    pub completed: u64,
    pub dropped: u64,
}

#[derive(Debug, Serialize)]
pub struct EnrollmentStats {
    pub total: u64,
    pub distribution: StatusDistribution,
}

/// Dashboard counters across clients, programs and enrollments.
#[derive(Debug, Serialize)]
pub struct Statistics {
    pub client: ClientStats,
    pub programs: ProgramStats,
    pub enrollments: EnrollmentStats,
}

/// Number of entries in the recent-clients widget.
const RECENT_CLIENTS: u64 = 5;

/// Create a client. The same full name with the same contact number is
/// treated as a duplicate record.
pub async fn create_client(
    db: &DatabaseConnection,
    input: ClientCreate,
    user_id: Uuid,
) -> Result<client::Model, ServiceError> {
    let existing = client::Entity::find()
        .filter(client::Column::FullName.eq(input.full_name.clone()))
        .filter(client::Column::Contact.eq(input.contact.clone()))
        .one(db)
        .await
        .map_err(|e| ServiceError::Db(e.to_string()))?;
    if existing.is_some() {
        return Err(ServiceError::Conflict(
            "client with this name and contact number already exists".into(),
        ));
    }

    let created = client::create(
        db,
        &input.full_name,
        input.dob,
        &input.gender,
        &input.contact,
        input.notes,
        user_id,
    )
    .await?;
    Ok(created)
}

/// Search clients: `search` matches full name or contact, `gender` filters
/// exactly.
pub async fn search_clients(
    db: &DatabaseConnection,
    search: Option<&str>,
    gender: Option<&str>,
    opts: Pagination,
    sort_by: Option<&str>,
) -> Result<Page<client::Model>, ServiceError> {
    let (page_idx, per_page) = opts.normalize();
    let (column, order) =
        sort::resolve(sort_by, SORTABLE, (client::Column::CreatedAt, Order::Desc))?;

    let mut query = client::Entity::find();
    if let Some(term) = search {
        if !term.trim().is_empty() {
            query = query.filter(
                Condition::any()
                    .add(client::Column::FullName.contains(term))
                    .add(client::Column::Contact.contains(term)),
            );
        }
    }
    if let Some(g) = gender {
        if !g.trim().is_empty() {
            query = query.filter(client::Column::Gender.eq(g));
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

/// Fetch a client with all enrollments and their programs.
pub async fn get_client_profile(
    db: &DatabaseConnection,
    id: Uuid,
) -> Result<ClientProfile, ServiceError> {
    let found = client::Entity::find_by_id(id)
        .one(db)
        .await
        .map_err(|e| ServiceError::Db(e.to_string()))?
        .ok_or_else(|| ServiceError::not_found("client"))?;

    let enrollments = enrollment::Entity::find()
        .filter(enrollment::Column::ClientId.eq(id))
        .order_by(enrollment::Column::EnrolledAt, Order::Desc)
        .all(db)
        .await
        .map_err(|e| ServiceError::Db(e.to_string()))?;

    let program_ids: Vec<Uuid> = enrollments.iter().map(|e| e.program_id).collect();
    let mut programs: HashMap<Uuid, health_program::Model> = health_program::Entity::find()
        .filter(health_program::Column::Id.is_in(program_ids))
        .all(db)
        .await
        .map_err(|e| ServiceError::Db(e.to_string()))?
        .into_iter()
        .map(|p| (p.id, p))
        .collect();

    let programs = enrollments
        .into_iter()
        .map(|e| {
            let health_program = programs.remove(&e.program_id);
            EnrollmentWithProgram { enrollment: e, health_program }
        })
        .collect();

    Ok(ClientProfile { client: found, programs })
}

async fn get_client(db: &DatabaseConnection, id: Uuid) -> Result<client::Model, ServiceError> {
    client::Entity::find_by_id(id)
        .one(db)
        .await
        .map_err(|e| ServiceError::Db(e.to_string()))?
        .ok_or_else(|| ServiceError::not_found("client"))
}

pub async fn update_client(
    db: &DatabaseConnection,
    id: Uuid,
    update: ClientUpdate,
) -> Result<client::Model, ServiceError> {
    let existing = get_client(db, id).await?;

    let mut am: client::ActiveModel = existing.into();
    if let Some(full_name) = update.full_name {
        client::validate_full_name(&full_name)?;
        am.full_name = Set(full_name);
    }
    if let Some(dob) = update.dob {
        am.dob = Set(dob);
    }
    if let Some(gender) = update.gender {
        client::validate_gender(&gender)?;
        am.gender = Set(gender);
    }
    if let Some(contact) = update.contact {
        client::validate_contact(&contact)?;
        am.contact = Set(contact);
    }
    if let Some(notes) = update.notes {
        am.notes = Set(Some(notes));
    }
    am.updated_at = Set(Utc::now().into());
    am.update(db).await.map_err(|e| ServiceError::Db(e.to_string()))
}

/// Delete a client; enrollments go with it via the FK cascade.
pub async fn delete_client(db: &DatabaseConnection, id: Uuid) -> Result<(), ServiceError> {
    let existing = get_client(db, id).await?;
    client::Entity::delete_by_id(existing.id)
        .exec(db)
        .await
        .map_err(|e| ServiceError::Db(e.to_string()))?;
    Ok(())
}

/// Dashboard statistics: totals plus the newest clients and the enrollment
/// status breakdown.
pub async fn statistics(db: &DatabaseConnection) -> Result<Statistics, ServiceError> {
    let total_clients = client::Entity::find()
        .count(db)
        .await
        .map_err(|e| ServiceError::Db(e.to_string()))?;

    let recent = client::Entity::find()
        .order_by(client::Column::CreatedAt, Order::Desc)
        .limit(RECENT_CLIENTS)
        .all(db)
        .await
        .map_err(|e| ServiceError::Db(e.to_string()))?
        .into_iter()
        .map(|c| RecentClient { id: c.id, full_name: c.full_name, created_at: c.created_at })
        .collect();

    let total_programs = health_program::Entity::find()
        .count(db)
        .await
        .map_err(|e| ServiceError::Db(e.to_string()))?;

    let total_enrollments = enrollment::Entity::find()
        .count(db)
        .await
        .map_err(|e| ServiceError::Db(e.to_string()))?;

    let mut by_status = [0u64; 3];
    for (i, status) in ["active", "completed", "dropped"].iter().enumerate() {
        by_status[i] = enrollment::Entity::find()
            .filter(enrollment::Column::Status.eq(*status))
            .count(db)
            .await
            .map_err(|e| ServiceError::Db(e.to_string()))?;
    }

    Ok(Statistics {
        client: ClientStats { total: total_clients, recent },
        programs: ProgramStats { total: total_programs },
        enrollments: EnrollmentStats {
            total: total_enrollments,
            distribution: StatusDistribution {
                active: by_status[0],
                completed: by_status[1],
                dropped: by_status[2],
            },
        },
    })
}
