use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use tracing::error;

use models::errors::ModelError;
use service::auth::errors::AuthError;
use service::errors::ServiceError;

/// JSON error body: `{ "error": ..., "detail": ... }`
#[derive(Debug)]
pub struct JsonApiError {
    pub status: StatusCode,
    pub error: String,
    pub detail: Option<String>,
}

impl JsonApiError {
    pub fn new(status: StatusCode, error: &str, detail: Option<String>) -> Self {
        Self { status, error: error.to_string(), detail }
    }
}

impl IntoResponse for JsonApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            error!(status = %self.status, error = %self.error, detail = ?self.detail, "request failed");
        }
        let body = serde_json::json!({ "error": self.error, "detail": self.detail });
        (self.status, Json(body)).into_response()
    }
}

impl From<ServiceError> for JsonApiError {
    fn from(e: ServiceError) -> Self {
        match &e {
            ServiceError::Validation(_) | ServiceError::Model(ModelError::Validation(_)) => {
                JsonApiError::new(StatusCode::BAD_REQUEST, "Validation Error", Some(e.to_string()))
            }
            // Model-layer Db failures are server faults, same as ServiceError::Db
            ServiceError::Model(ModelError::Db(_)) => JsonApiError::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal Server Error",
                Some(e.to_string()),
            ),
            // Duplicates are reported as bad requests, matching the wire contract
            ServiceError::Conflict(_) => {
                JsonApiError::new(StatusCode::BAD_REQUEST, "Conflict", Some(e.to_string()))
            }
            ServiceError::NotFound(_) => {
                JsonApiError::new(StatusCode::NOT_FOUND, "Not Found", Some(e.to_string()))
            }
            ServiceError::Db(_) => JsonApiError::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal Server Error",
                Some(e.to_string()),
            ),
        }
    }
}

impl From<AuthError> for JsonApiError {
    fn from(e: AuthError) -> Self {
        match &e {
            AuthError::Validation(_) | AuthError::Conflict => {
                JsonApiError::new(StatusCode::BAD_REQUEST, "Validation Error", Some(e.to_string()))
            }
            AuthError::Unauthorized | AuthError::NotFound | AuthError::TokenError(_) => {
                JsonApiError::new(StatusCode::UNAUTHORIZED, "Unauthorized", Some(e.to_string()))
            }
            AuthError::HashError(_) | AuthError::Repository(_) => JsonApiError::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal Server Error",
                Some(e.to_string()),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_maps_to_404() {
        let e: JsonApiError = ServiceError::not_found("client").into();
        assert_eq!(e.status, StatusCode::NOT_FOUND);
    }

    #[test]
    fn conflict_maps_to_400() {
        let e: JsonApiError = ServiceError::Conflict("email already taken".into()).into();
        assert_eq!(e.status, StatusCode::BAD_REQUEST);
    }

    #[test]
    fn auth_token_errors_map_to_401() {
        let e: JsonApiError = AuthError::TokenError("expired".into()).into();
        assert_eq!(e.status, StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn model_db_error_maps_to_500() {
        let e: JsonApiError = ServiceError::Model(ModelError::Db("connection reset".into())).into();
        assert_eq!(e.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(e.error, "Internal Server Error");
    }

    #[test]
    fn model_validation_error_maps_to_400() {
        let e: JsonApiError =
            ServiceError::Model(ModelError::Validation("invalid email".into())).into();
        assert_eq!(e.status, StatusCode::BAD_REQUEST);
    }
}
