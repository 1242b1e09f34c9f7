use axum::{
    extract::{Extension, Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use service::client_service::{self, ClientCreate, ClientProfile, ClientUpdate, Statistics};
use service::pagination::{Page, Pagination};

use super::auth::{AuthContext, ServerState};
use crate::errors::JsonApiError;

#[derive(Debug, Default, Deserialize, utoipa::IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct ListClientsQuery {
    /// Matches against full name or contact number.
    pub search: Option<String>,
    pub gender: Option<String>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub sort_by: Option<String>,
}

impl ListClientsQuery {
    fn pagination(&self) -> Pagination {
        let defaults = Pagination::default();
        Pagination {
            page: self.page.unwrap_or(defaults.page),
            per_page: self.limit.unwrap_or(defaults.per_page),
        }
    }
}

#[utoipa::path(post, path = "/v1/clients", tag = "clients",
    request_body = crate::openapi::ClientRequest,
    responses(
        (status = 201, description = "Client registered"),
        (status = 400, description = "Validation Error")
    ))]
pub async fn create(
    State(state): State<ServerState>,
    Extension(ctx): Extension<AuthContext>,
    Json(input): Json<ClientCreate>,
) -> Result<(StatusCode, Json<models::client::Model>), JsonApiError> {
    let created = client_service::create_client(&state.db, input, ctx.user_id).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

#[utoipa::path(get, path = "/v1/clients", tag = "clients",
    params(ListClientsQuery),
    responses((status = 200, description = "Paginated clients")))]
pub async fn list(
    State(state): State<ServerState>,
    Query(q): Query<ListClientsQuery>,
) -> Result<Json<Page<models::client::Model>>, JsonApiError> {
    let page = client_service::search_clients(
        &state.db,
        q.search.as_deref(),
        q.gender.as_deref(),
        q.pagination(),
        q.sort_by.as_deref(),
    )
    .await?;
    Ok(Json(page))
}

#[utoipa::path(get, path = "/v1/clients/statistics", tag = "clients",
    responses((status = 200, description = "Registry statistics")))]
pub async fn stats(State(state): State<ServerState>) -> Result<Json<Statistics>, JsonApiError> {
    let stats = client_service::statistics(&state.db).await?;
    Ok(Json(stats))
}

#[utoipa::path(get, path = "/v1/clients/{client_id}", tag = "clients",
    responses(
        (status = 200, description = "Client profile with enrollments"),
        (status = 404, description = "Not Found")
    ))]
pub async fn get(
    State(state): State<ServerState>,
    Path(client_id): Path<Uuid>,
) -> Result<Json<ClientProfile>, JsonApiError> {
    let profile = client_service::get_client_profile(&state.db, client_id).await?;
    Ok(Json(profile))
}

#[utoipa::path(patch, path = "/v1/clients/{client_id}", tag = "clients",
    responses(
        (status = 200, description = "Client updated"),
        (status = 404, description = "Not Found")
    ))]
pub async fn update(
    State(state): State<ServerState>,
    Path(client_id): Path<Uuid>,
    Json(input): Json<ClientUpdate>,
) -> Result<Json<models::client::Model>, JsonApiError> {
    let updated = client_service::update_client(&state.db, client_id, input).await?;
    Ok(Json(updated))
}

#[utoipa::path(delete, path = "/v1/clients/{client_id}", tag = "clients",
    responses(
        (status = 204, description = "Client deleted"),
        (status = 404, description = "Not Found")
    ))]
pub async fn remove(
    State(state): State<ServerState>,
    Path(client_id): Path<Uuid>,
) -> Result<StatusCode, JsonApiError> {
    client_service::delete_client(&state.db, client_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
