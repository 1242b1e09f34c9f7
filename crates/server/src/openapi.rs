//! Swagger document served at `/docs` (spec at `/api-docs/openapi.json`).

use serde::Deserialize;
use utoipa::{OpenApi, ToSchema};

#[derive(Deserialize, ToSchema)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

#[derive(Deserialize, ToSchema)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RefreshRequest {
    pub refresh_token: String,
}

#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ClientRequest {
    pub full_name: String,
    /// ISO date, e.g. 1990-04-12.
    pub dob: String,
    pub gender: String,
    pub contact: String,
    pub notes: Option<String>,
}

#[derive(Deserialize, ToSchema)]
pub struct ProgramRequest {
    pub name: String,
    pub description: Option<String>,
}

#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EnrollmentRequest {
    pub client_id: uuid::Uuid,
    pub program_id: uuid::Uuid,
    pub status: String,
    pub notes: Option<String>,
}

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::routes::auth::register,
        crate::routes::auth::login,
        crate::routes::auth::refresh_tokens,
        crate::routes::clients::create,
        crate::routes::clients::list,
        crate::routes::clients::stats,
        crate::routes::clients::get,
        crate::routes::clients::update,
        crate::routes::clients::remove,
        crate::routes::programs::create,
        crate::routes::programs::list,
        crate::routes::programs::get,
        crate::routes::programs::update,
        crate::routes::programs::remove,
        crate::routes::enrollments::create,
        crate::routes::enrollments::list,
        crate::routes::enrollments::for_client,
        crate::routes::enrollments::get,
        crate::routes::enrollments::update,
        crate::routes::enrollments::remove,
        crate::routes::users::list,
        crate::routes::users::get,
        crate::routes::users::update,
        crate::routes::users::remove,
    ),
    components(schemas(
        RegisterRequest,
        LoginRequest,
        RefreshRequest,
        ClientRequest,
        ProgramRequest,
        EnrollmentRequest,
    )),
    tags(
        (name = "auth", description = "Registration, login and token rotation"),
        (name = "clients", description = "Client registry"),
        (name = "programs", description = "Health program catalogue"),
        (name = "enrollments", description = "Client program enrollments"),
        (name = "users", description = "System user administration"),
    )
)]
pub struct ApiDoc;
