use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::Response,
    Json,
};
use axum_extra::extract::cookie::{Cookie, CookieJar};
use sea_orm::DatabaseConnection;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use service::auth::domain::{AuthSession, LoginInput, RegisterInput, TokenPair};
use service::auth::repo::seaorm::SeaOrmAuthRepository;
use service::auth::service::{decode_token, AuthConfig, AuthService};

use crate::errors::JsonApiError;

#[derive(Clone)]
pub struct ServerAuthConfig {
    pub jwt_secret: String,
    pub access_ttl_minutes: i64,
    pub refresh_ttl_days: i64,
}

#[derive(Clone)]
pub struct ServerState {
    pub db: DatabaseConnection,
    pub auth: ServerAuthConfig,
}

/// Verified caller identity, injected into request extensions by the
/// bearer-token middleware.
#[derive(Clone, Debug)]
pub struct AuthContext {
    pub user_id: Uuid,
    pub role: String,
}

fn auth_service(state: &ServerState) -> AuthService<SeaOrmAuthRepository> {
    AuthService::new(
        Arc::new(SeaOrmAuthRepository { db: state.db.clone() }),
        AuthConfig {
            jwt_secret: state.auth.jwt_secret.clone(),
            access_ttl_minutes: state.auth.access_ttl_minutes,
            refresh_ttl_days: state.auth.refresh_ttl_days,
        },
    )
}

fn auth_cookie(token: &str) -> Cookie<'static> {
    let mut cookie = Cookie::new("auth_token", token.to_string());
    cookie.set_path("/");
    cookie.set_http_only(true);
    cookie.set_same_site(axum_extra::extract::cookie::SameSite::Lax);
    cookie
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshInput {
    pub refresh_token: String,
}

#[derive(Serialize)]
pub struct RefreshOutput {
    pub tokens: TokenPair,
}

#[utoipa::path(post, path = "/v1/auth/register", tag = "auth",
    request_body = crate::openapi::RegisterRequest,
    responses(
        (status = 201, description = "Registered"),
        (status = 400, description = "Validation Error")
    ))]
pub async fn register(
    State(state): State<ServerState>,
    jar: CookieJar,
    Json(input): Json<RegisterInput>,
) -> Result<(StatusCode, CookieJar, Json<AuthSession>), JsonApiError> {
    models::user::validate_email(&input.email)
        .map_err(|e| JsonApiError::new(StatusCode::BAD_REQUEST, "Validation Error", Some(e.to_string())))?;
    models::user::validate_name(&input.name)
        .map_err(|e| JsonApiError::new(StatusCode::BAD_REQUEST, "Validation Error", Some(e.to_string())))?;

    let session = auth_service(&state).register(input).await?;
    let jar = jar.add(auth_cookie(&session.tokens.access.token));
    Ok((StatusCode::CREATED, jar, Json(session)))
}

#[utoipa::path(post, path = "/v1/auth/login", tag = "auth",
    request_body = crate::openapi::LoginRequest,
    responses(
        (status = 200, description = "Logged In"),
        (status = 401, description = "Unauthorized")
    ))]
pub async fn login(
    State(state): State<ServerState>,
    jar: CookieJar,
    Json(input): Json<LoginInput>,
) -> Result<(CookieJar, Json<AuthSession>), JsonApiError> {
    let session = auth_service(&state).login(input).await?;
    let jar = jar.add(auth_cookie(&session.tokens.access.token));
    Ok((jar, Json(session)))
}

#[utoipa::path(post, path = "/v1/auth/refresh-tokens", tag = "auth",
    request_body = crate::openapi::RefreshRequest,
    responses(
        (status = 200, description = "Rotated"),
        (status = 401, description = "Unauthorized")
    ))]
pub async fn refresh_tokens(
    State(state): State<ServerState>,
    Json(input): Json<RefreshInput>,
) -> Result<Json<RefreshOutput>, JsonApiError> {
    let tokens = auth_service(&state).refresh(&input.refresh_token).await?;
    Ok(Json(RefreshOutput { tokens }))
}

fn unauthorized() -> JsonApiError {
    JsonApiError::new(
        StatusCode::UNAUTHORIZED,
        "Unauthorized",
        Some("Please authenticate".to_string()),
    )
}

/// Global middleware: outside the whitelist, require a valid
/// `Authorization: Bearer <token>` (with an `auth_token` cookie fallback)
/// and stash the verified identity in request extensions.
pub async fn require_bearer_token_state(
    State(state): State<ServerState>,
    mut req: Request,
    next: Next,
) -> Result<Response, JsonApiError> {
    let path = req.uri().path();
    let method = req.method().clone();

    // Whitelist: health check, auth endpoints, API docs, CORS preflight
    if path == "/health"
        || path.starts_with("/v1/auth/")
        || path.starts_with("/docs")
        || path.starts_with("/api-docs")
        || method == axum::http::Method::OPTIONS
    {
        return Ok(next.run(req).await);
    }

    // Read the Authorization header; fall back to the auth_token cookie
    let token = {
        let authz = req
            .headers()
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok());

        if let Some(h) = authz {
            match h.strip_prefix("Bearer ") {
                Some(rest) => rest.to_string(),
                None => {
                    tracing::warn!(path = %path, "invalid Authorization format (expect Bearer)");
                    return Err(unauthorized());
                }
            }
        } else {
            let cookie_header = req
                .headers()
                .get(axum::http::header::COOKIE)
                .and_then(|v| v.to_str().ok())
                .unwrap_or("");

            let mut token_val: Option<String> = None;
            for part in cookie_header.split(';') {
                let kv = part.trim();
                if let Some(rest) = kv.strip_prefix("auth_token=") {
                    token_val = Some(rest.to_string());
                    break;
                }
            }

            match token_val {
                Some(t) if !t.is_empty() => t,
                _ => {
                    tracing::warn!(path = %path, "missing Authorization header and auth_token cookie");
                    return Err(unauthorized());
                }
            }
        }
    };

    let claims = match decode_token(&state.auth.jwt_secret, &token) {
        Ok(claims) => claims,
        Err(e) => {
            tracing::warn!(path = %path, err = %e, "token validation failed");
            return Err(unauthorized());
        }
    };

    let user_id = match Uuid::parse_str(&claims.sub) {
        Ok(id) => id,
        Err(_) => {
            tracing::warn!(path = %path, "token subject is not a user id");
            return Err(unauthorized());
        }
    };

    req.extensions_mut().insert(AuthContext { user_id, role: claims.role });
    Ok(next.run(req).await)
}
