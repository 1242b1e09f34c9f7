use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use service::enrollment_service::{
    self, EnrollmentCreate, EnrollmentDetail, EnrollmentQuery, EnrollmentUpdate,
};
use service::pagination::{Page, Pagination};

use super::auth::ServerState;
use crate::errors::JsonApiError;

#[derive(Debug, Default, Deserialize, utoipa::IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct ListEnrollmentsQuery {
    pub client_id: Option<Uuid>,
    pub program_id: Option<Uuid>,
    pub status: Option<String>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub sort_by: Option<String>,
}

impl ListEnrollmentsQuery {
    fn pagination(&self) -> Pagination {
        let defaults = Pagination::default();
        Pagination {
            page: self.page.unwrap_or(defaults.page),
            per_page: self.limit.unwrap_or(defaults.per_page),
        }
    }

    fn filter(&self) -> EnrollmentQuery {
        EnrollmentQuery {
            client_id: self.client_id,
            program_id: self.program_id,
            status: self.status.clone(),
        }
    }
}

#[utoipa::path(post, path = "/v1/enrollments", tag = "enrollments",
    request_body = crate::openapi::EnrollmentRequest,
    responses(
        (status = 201, description = "Client enrolled"),
        (status = 400, description = "Validation Error"),
        (status = 404, description = "Not Found")
    ))]
pub async fn create(
    State(state): State<ServerState>,
    Json(input): Json<EnrollmentCreate>,
) -> Result<(StatusCode, Json<models::enrollment::Model>), JsonApiError> {
    let created = enrollment_service::create_enrollment(&state.db, input).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

#[utoipa::path(get, path = "/v1/enrollments", tag = "enrollments",
    params(ListEnrollmentsQuery),
    responses((status = 200, description = "Paginated enrollments")))]
pub async fn list(
    State(state): State<ServerState>,
    Query(q): Query<ListEnrollmentsQuery>,
) -> Result<Json<Page<EnrollmentDetail>>, JsonApiError> {
    let page = enrollment_service::query_enrollments(
        &state.db,
        q.filter(),
        q.pagination(),
        q.sort_by.as_deref(),
    )
    .await?;
    Ok(Json(page))
}

#[utoipa::path(get, path = "/v1/enrollments/client/{client_id}", tag = "enrollments",
    params(ListEnrollmentsQuery),
    responses(
        (status = 200, description = "Enrollments for a client"),
        (status = 404, description = "Not Found")
    ))]
pub async fn for_client(
    State(state): State<ServerState>,
    Path(client_id): Path<Uuid>,
    Query(q): Query<ListEnrollmentsQuery>,
) -> Result<Json<Page<EnrollmentDetail>>, JsonApiError> {
    let page = enrollment_service::enrollments_for_client(
        &state.db,
        client_id,
        q.filter(),
        q.pagination(),
        q.sort_by.as_deref(),
    )
    .await?;
    Ok(Json(page))
}

#[utoipa::path(get, path = "/v1/enrollments/{enrollment_id}", tag = "enrollments",
    responses(
        (status = 200, description = "Enrollment found"),
        (status = 404, description = "Not Found")
    ))]
pub async fn get(
    State(state): State<ServerState>,
    Path(enrollment_id): Path<Uuid>,
) -> Result<Json<EnrollmentDetail>, JsonApiError> {
    let found = enrollment_service::get_enrollment(&state.db, enrollment_id).await?;
    Ok(Json(found))
}

#[utoipa::path(patch, path = "/v1/enrollments/{enrollment_id}", tag = "enrollments",
    responses(
        (status = 200, description = "Enrollment updated"),
        (status = 404, description = "Not Found")
    ))]
pub async fn update(
    State(state): State<ServerState>,
    Path(enrollment_id): Path<Uuid>,
    Json(input): Json<EnrollmentUpdate>,
) -> Result<Json<models::enrollment::Model>, JsonApiError> {
    let updated = enrollment_service::update_enrollment(&state.db, enrollment_id, input).await?;
    Ok(Json(updated))
}

#[utoipa::path(delete, path = "/v1/enrollments/{enrollment_id}", tag = "enrollments",
    responses(
        (status = 204, description = "Enrollment deleted"),
        (status = 404, description = "Not Found")
    ))]
pub async fn remove(
    State(state): State<ServerState>,
    Path(enrollment_id): Path<Uuid>,
) -> Result<StatusCode, JsonApiError> {
    enrollment_service::delete_enrollment(&state.db, enrollment_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
