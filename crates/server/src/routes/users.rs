use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use service::pagination::{Page, Pagination};
use service::user_service::{self, UserFilter, UserUpdate};

use super::auth::ServerState;
use crate::errors::JsonApiError;

#[derive(Debug, Default, Deserialize, utoipa::IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct ListUsersQuery {
    pub name: Option<String>,
    pub role: Option<String>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub sort_by: Option<String>,
}

impl ListUsersQuery {
    fn pagination(&self) -> Pagination {
        let defaults = Pagination::default();
        Pagination {
            page: self.page.unwrap_or(defaults.page),
            per_page: self.limit.unwrap_or(defaults.per_page),
        }
    }
}

#[utoipa::path(get, path = "/v1/users", tag = "users",
    params(ListUsersQuery),
    responses((status = 200, description = "Paginated users")))]
pub async fn list(
    State(state): State<ServerState>,
    Query(q): Query<ListUsersQuery>,
) -> Result<Json<Page<models::user::Model>>, JsonApiError> {
    let filter = UserFilter { name: q.name.clone(), role: q.role.clone() };
    let page =
        user_service::query_users(&state.db, filter, q.pagination(), q.sort_by.as_deref()).await?;
    Ok(Json(page))
}

#[utoipa::path(get, path = "/v1/users/{user_id}", tag = "users",
    responses(
        (status = 200, description = "User found"),
        (status = 404, description = "Not Found")
    ))]
pub async fn get(
    State(state): State<ServerState>,
    Path(user_id): Path<Uuid>,
) -> Result<Json<models::user::Model>, JsonApiError> {
    let found = user_service::get_user(&state.db, user_id).await?;
    Ok(Json(found))
}

#[utoipa::path(patch, path = "/v1/users/{user_id}", tag = "users",
    responses(
        (status = 200, description = "User updated"),
        (status = 404, description = "Not Found")
    ))]
pub async fn update(
    State(state): State<ServerState>,
    Path(user_id): Path<Uuid>,
    Json(input): Json<UserUpdate>,
) -> Result<Json<models::user::Model>, JsonApiError> {
    let updated = user_service::update_user(&state.db, user_id, input).await?;
    Ok(Json(updated))
}

#[utoipa::path(delete, path = "/v1/users/{user_id}", tag = "users",
    responses(
        (status = 204, description = "User deleted"),
        (status = 404, description = "Not Found")
    ))]
pub async fn remove(
    State(state): State<ServerState>,
    Path(user_id): Path<Uuid>,
) -> Result<StatusCode, JsonApiError> {
    user_service::delete_user(&state.db, user_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
