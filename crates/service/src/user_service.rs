use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, Order, PaginatorTrait,
    QueryFilter, QueryOrder, Set,
};
use serde::Deserialize;
use uuid::Uuid;

use models::user;

use crate::errors::ServiceError;
use crate::pagination::{Page, Pagination};
use crate::sort;

const SORTABLE: &[(&str, user::Column)] = &[
    ("name", user::Column::Name),
    ("email", user::Column::Email),
    ("role", user::Column::Role),
    ("createdAt", user::Column::CreatedAt),
    ("updatedAt", user::Column::UpdatedAt),
];

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserFilter {
    pub name: Option<String>,
    pub role: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserUpdate {
    pub name: Option<String>,
    pub email: Option<String>,
    pub role: Option<String>,
}

/// List users with optional name/role filters.
pub async fn query_users(
    db: &DatabaseConnection,
    filter: UserFilter,
    opts: Pagination,
    sort_by: Option<&str>,
) -> Result<Page<user::Model>, ServiceError> {
    let (page_idx, per_page) = opts.normalize();
    let (column, order) =
        sort::resolve(sort_by, SORTABLE, (user::Column::CreatedAt, Order::Desc))?;

    let mut query = user::Entity::find();
    if let Some(name) = filter.name.as_deref() {
        query = query.filter(user::Column::Name.contains(name));
    }
    if let Some(role) = filter.role.as_deref() {
        user::validate_role(role)?;
        query = query.filter(user::Column::Role.eq(role));
    }

    let paginator = query.order_by(column, order).paginate(db, per_page);
    let total = paginator.num_items().await.map_err(|e| ServiceError::Db(e.to_string()))?;
    let results = paginator
        .fetch_page(page_idx)
        .await
        .map_err(|e| ServiceError::Db(e.to_string()))?;
    Ok(Page::assemble(results, total, page_idx, per_page))
}

/// Get a user by id.
pub async fn get_user(db: &DatabaseConnection, id: Uuid) -> Result<user::Model, ServiceError> {
    user::Entity::find_by_id(id)
        .one(db)
        .await
        .map_err(|e| ServiceError::Db(e.to_string()))?
        .ok_or_else(|| ServiceError::not_found("user"))
}

/// Update name/email/role. A changed email must not collide with another user.
pub async fn update_user(
    db: &DatabaseConnection,
    id: Uuid,
    update: UserUpdate,
) -> Result<user::Model, ServiceError> {
    let existing = get_user(db, id).await?;

    if let Some(email) = update.email.as_deref() {
        user::validate_email(email)?;
        if email != existing.email {
            let taken = user::Entity::find()
                .filter(user::Column::Email.eq(email))
                .one(db)
                .await
                .map_err(|e| ServiceError::Db(e.to_string()))?;
            if taken.is_some() {
                return Err(ServiceError::Conflict("email already taken".into()));
            }
        }
    }

    let mut am: user::ActiveModel = existing.into();
    if let Some(name) = update.name {
        user::validate_name(&name)?;
        am.name = Set(name);
    }
    if let Some(email) = update.email {
        am.email = Set(email);
    }
    if let Some(role) = update.role {
        user::validate_role(&role)?;
        am.role = Set(role);
    }
    am.updated_at = Set(Utc::now().into());
    am.update(db).await.map_err(|e| ServiceError::Db(e.to_string()))
}

/// Hard-delete a user.
pub async fn delete_user(db: &DatabaseConnection, id: Uuid) -> Result<(), ServiceError> {
    let existing = get_user(db, id).await?;
    user::Entity::delete_by_id(existing.id)
        .exec(db)
        .await
        .map_err(|e| ServiceError::Db(e.to_string()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::get_db;

    #[tokio::test]
    async fn user_crud_service() -> Result<(), anyhow::Error> {
        if std::env::var("SKIP_DB_TESTS").is_ok() {
            return Ok(());
        }
        let db = match get_db().await {
            Ok(db) => db,
            Err(e) => {
                eprintln!("skip: cannot connect to db: {}", e);
                return Ok(());
            }
        };

        let email = format!("svc_{}@example.com", Uuid::new_v4());
        let u = user::create(&db, "Svc User", &email, "hash", "user").await?;

        let found = get_user(&db, u.id).await?;
        assert_eq!(found.id, u.id);

        let updated =
            update_user(&db, u.id, UserUpdate { name: Some("New Name".into()), ..Default::default() })
                .await?;
        assert_eq!(updated.name, "New Name");

        let page = query_users(
            &db,
            UserFilter { name: Some("New Name".into()), role: None },
            Pagination::default(),
            Some("createdAt:desc"),
        )
        .await?;
        assert!(page.total_results >= 1);

        delete_user(&db, u.id).await?;
        assert!(matches!(get_user(&db, u.id).await, Err(ServiceError::NotFound(_))));
        Ok(())
    }
}
