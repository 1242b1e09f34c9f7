use std::{env, net::SocketAddr};

use axum::Router;
use common::utils::logging;
use dotenvy::dotenv;
use migration::{Migrator, MigratorTrait};
use tower_http::cors::CorsLayer;
use tracing::info;

use crate::routes::{self, auth};

/// Initialize logging via shared common utils
fn init_logging() {
    logging::init_logging();
}

fn build_cors() -> CorsLayer {
    CorsLayer::very_permissive()
}

/// Load host/port from configs or env vars, with sensible fallbacks
fn load_bind_addr() -> anyhow::Result<SocketAddr> {
    let (host, port) = match configs::load_default() {
        Ok(cfg) => {
            let s = cfg.server;
            (s.host, s.port)
        }
        Err(_) => {
            let host = env::var("SERVER_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
            let port = env::var("SERVER_PORT")
                .ok()
                .and_then(|p| p.parse::<u16>().ok())
                .unwrap_or(8080);
            (host, port)
        }
    };
    Ok(format!("{}:{}", host, port).parse()?)
}

fn auth_config_from_env() -> auth::ServerAuthConfig {
    auth::ServerAuthConfig {
        jwt_secret: env::var("JWT_SECRET").unwrap_or_else(|_| "dev-secret-change-me".to_string()),
        access_ttl_minutes: env::var("JWT_ACCESS_TTL_MINUTES")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(30),
        refresh_ttl_days: env::var("JWT_REFRESH_TTL_DAYS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(30),
    }
}

/// Public entry: build the app and run the HTTP server
pub async fn run() -> anyhow::Result<()> {
    dotenv().ok();
    init_logging();

    // Config file is optional; env vars cover everything it would set
    let cfg = configs::AppConfig::load_and_validate().ok();

    let db = match &cfg {
        Some(c) => models::db::connect_with_config(&c.database).await?,
        None => models::db::connect().await?,
    };

    // Schema is applied on boot; migrations are idempotent
    Migrator::up(&db, None).await?;

    let auth_cfg = match cfg {
        Some(c) => auth::ServerAuthConfig {
            jwt_secret: c.jwt.secret,
            access_ttl_minutes: c.jwt.access_ttl_minutes,
            refresh_ttl_days: c.jwt.refresh_ttl_days,
        },
        None => auth_config_from_env(),
    };
    let state = auth::ServerState { db, auth: auth_cfg };

    let cors = build_cors();
    let app: Router = routes::build_router(cors, state);

    let addr = load_bind_addr()?;
    info!(%addr, "starting health registry server");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
