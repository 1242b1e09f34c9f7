pub mod auth;
pub mod clients;
pub mod enrollments;
pub mod programs;
pub mod users;

use axum::{
    middleware,
    routing::{get, post},
    Json, Router,
};
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::openapi::ApiDoc;
use auth::ServerState;

async fn health() -> Json<common::types::Health> {
    Json(common::types::Health { status: "ok" })
}

fn auth_routes() -> Router<ServerState> {
    Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .route("/refresh-tokens", post(auth::refresh_tokens))
}

fn client_routes() -> Router<ServerState> {
    // `/statistics` must be registered alongside `/:client_id`; axum matches
    // the literal segment first.
    Router::new()
        .route("/", post(clients::create).get(clients::list))
        .route("/statistics", get(clients::stats))
        .route(
            "/:client_id",
            get(clients::get).patch(clients::update).delete(clients::remove),
        )
}

fn program_routes() -> Router<ServerState> {
    Router::new()
        .route("/", post(programs::create).get(programs::list))
        .route(
            "/:program_id",
            get(programs::get).patch(programs::update).delete(programs::remove),
        )
}

fn enrollment_routes() -> Router<ServerState> {
    Router::new()
        .route("/", post(enrollments::create).get(enrollments::list))
        .route("/client/:client_id", get(enrollments::for_client))
        .route(
            "/:enrollment_id",
            get(enrollments::get).patch(enrollments::update).delete(enrollments::remove),
        )
}

fn user_routes() -> Router<ServerState> {
    Router::new().route("/", get(users::list)).route(
        "/:user_id",
        get(users::get).patch(users::update).delete(users::remove),
    )
}

pub fn build_router(cors: CorsLayer, state: ServerState) -> Router {
    let api = Router::new()
        .nest("/auth", auth_routes())
        .nest("/clients", client_routes())
        .nest("/programs", program_routes())
        .nest("/enrollments", enrollment_routes())
        .nest("/users", user_routes());

    Router::new()
        .route("/health", get(health))
        .nest("/v1", api)
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth::require_bearer_token_state,
        ))
        .layer(cors)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .with_state(state)
}
