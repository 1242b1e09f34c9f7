use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use service::pagination::{Page, Pagination};
use service::program_service::{self, ProgramCreate, ProgramUpdate};

use super::auth::ServerState;
use crate::errors::JsonApiError;

#[derive(Debug, Default, Deserialize, utoipa::IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct ListProgramsQuery {
    pub search: Option<String>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub sort_by: Option<String>,
}

impl ListProgramsQuery {
    fn pagination(&self) -> Pagination {
        let defaults = Pagination::default();
        Pagination {
            page: self.page.unwrap_or(defaults.page),
            per_page: self.limit.unwrap_or(defaults.per_page),
        }
    }
}

#[utoipa::path(post, path = "/v1/programs", tag = "programs",
    request_body = crate::openapi::ProgramRequest,
    responses(
        (status = 201, description = "Program created"),
        (status = 400, description = "Validation Error")
    ))]
pub async fn create(
    State(state): State<ServerState>,
    Json(input): Json<ProgramCreate>,
) -> Result<(StatusCode, Json<models::health_program::Model>), JsonApiError> {
    let created = program_service::create_program(&state.db, input).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

#[utoipa::path(get, path = "/v1/programs", tag = "programs",
    params(ListProgramsQuery),
    responses((status = 200, description = "Paginated programs")))]
pub async fn list(
    State(state): State<ServerState>,
    Query(q): Query<ListProgramsQuery>,
) -> Result<Json<Page<models::health_program::Model>>, JsonApiError> {
    let page = program_service::query_programs(
        &state.db,
        q.search.as_deref(),
        q.pagination(),
        q.sort_by.as_deref(),
    )
    .await?;
    Ok(Json(page))
}

#[utoipa::path(get, path = "/v1/programs/{program_id}", tag = "programs",
    responses(
        (status = 200, description = "Program found"),
        (status = 404, description = "Not Found")
    ))]
pub async fn get(
    State(state): State<ServerState>,
    Path(program_id): Path<Uuid>,
) -> Result<Json<models::health_program::Model>, JsonApiError> {
    let found = program_service::get_program(&state.db, program_id).await?;
    Ok(Json(found))
}

#[utoipa::path(patch, path = "/v1/programs/{program_id}", tag = "programs",
    responses(
        (status = 200, description = "Program updated"),
        (status = 404, description = "Not Found")
    ))]
pub async fn update(
    State(state): State<ServerState>,
    Path(program_id): Path<Uuid>,
    Json(input): Json<ProgramUpdate>,
) -> Result<Json<models::health_program::Model>, JsonApiError> {
    let updated = program_service::update_program(&state.db, program_id, input).await?;
    Ok(Json(updated))
}

#[utoipa::path(delete, path = "/v1/programs/{program_id}", tag = "programs",
    responses(
        (status = 204, description = "Program deleted"),
        (status = 404, description = "Not Found")
    ))]
pub async fn remove(
    State(state): State<ServerState>,
    Path(program_id): Path<Uuid>,
) -> Result<StatusCode, JsonApiError> {
    program_service::delete_program(&state.db, program_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
