//! End to end exercise of the registry surface: register a user, create a
//! client and a program, enroll one in the other, then walk the read side.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use migration::MigratorTrait;
use serde_json::{json, Value};
use tower::Service;
use uuid::Uuid;

use server::routes::{self, auth};

fn cors() -> tower_http::cors::CorsLayer {
    tower_http::cors::CorsLayer::very_permissive()
}

async fn build_app() -> anyhow::Result<Option<Router>> {
    if std::env::var("SKIP_DB_TESTS").is_ok() {
        return Ok(None);
    }
    let db = match models::db::connect().await {
        Ok(db) => db,
        Err(e) => {
            eprintln!("skipping: no database available: {}", e);
            return Ok(None);
        }
    };
    if let Err(e) = migration::Migrator::up(&db, None).await {
        let msg = format!("{}", e);
        if msg.contains("duplicate key value violates unique constraint") {
            eprintln!("migrations already applied, continue: {}", msg);
        } else {
            return Err(e.into());
        }
    }
    let state = auth::ServerState {
        db,
        auth: auth::ServerAuthConfig {
            jwt_secret: "test-secret".into(),
            access_ttl_minutes: 30,
            refresh_ttl_days: 30,
        },
    };
    Ok(Some(routes::build_router(cors(), state)))
}

async fn body_json(resp: axum::response::Response) -> anyhow::Result<Value> {
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await?;
    Ok(serde_json::from_slice(&bytes)?)
}

fn post(uri: &str, token: Option<&str>, body: &Value) -> anyhow::Result<Request<Body>> {
    let mut builder =
        Request::builder().method("POST").uri(uri).header("content-type", "application/json");
    if let Some(t) = token {
        builder = builder.header("authorization", format!("Bearer {}", t));
    }
    Ok(builder.body(Body::from(serde_json::to_vec(body)?))?)
}

fn get(uri: &str, token: &str) -> anyhow::Result<Request<Body>> {
    Ok(Request::builder()
        .method("GET")
        .uri(uri)
        .header("authorization", format!("Bearer {}", token))
        .body(Body::empty())?)
}

async fn register(app: &mut Router) -> anyhow::Result<String> {
    let email = format!("worker_{}@example.com", Uuid::new_v4());
    let req = post(
        "/v1/auth/register",
        None,
        &json!({"name": "Field Worker", "email": email, "password": "FieldPass123"}),
    )?;
    let resp = app.call(req).await?;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body = body_json(resp).await?;
    Ok(body["tokens"]["access"]["token"].as_str().unwrap().to_string())
}

#[tokio::test]
async fn test_full_registry_flow() -> anyhow::Result<()> {
    let Some(app) = build_app().await? else { return Ok(()) };
    let mut app = app;

    let token = register(&mut app).await?;
    let suffix = Uuid::new_v4().simple().to_string();

    // Create a client
    let req = post(
        "/v1/clients",
        Some(&token),
        &json!({
            "fullName": format!("Amina Yusuf {}", suffix),
            "dob": "1991-06-02",
            "gender": "female",
            "contact": format!("+2547{}", &suffix[..8]),
            "notes": "prefers morning visits"
        }),
    )?;
    let resp = app.call(req).await?;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let client = body_json(resp).await?;
    let client_id = client["id"].as_str().unwrap().to_string();

    // Duplicate name + contact is rejected
    let req = post(
        "/v1/clients",
        Some(&token),
        &json!({
            "fullName": format!("Amina Yusuf {}", suffix),
            "dob": "1991-06-02",
            "gender": "female",
            "contact": format!("+2547{}", &suffix[..8])
        }),
    )?;
    let resp = app.call(req).await?;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    // Create a program
    let req = post(
        "/v1/programs",
        Some(&token),
        &json!({"name": format!("TB Outreach {}", suffix), "description": "community screening"}),
    )?;
    let resp = app.call(req).await?;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let program = body_json(resp).await?;
    let program_id = program["id"].as_str().unwrap().to_string();

    // Enroll
    let req = post(
        "/v1/enrollments",
        Some(&token),
        &json!({"clientId": client_id, "programId": program_id, "status": "active"}),
    )?;
    let resp = app.call(req).await?;
    assert_eq!(resp.status(), StatusCode::CREATED);

    // Enrolling twice is rejected
    let req = post(
        "/v1/enrollments",
        Some(&token),
        &json!({"clientId": client_id, "programId": program_id, "status": "active"}),
    )?;
    let resp = app.call(req).await?;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    // Profile carries the enrollment with its program
    let req = get(&format!("/v1/clients/{}", client_id), &token)?;
    let resp = app.call(req).await?;
    assert_eq!(resp.status(), StatusCode::OK);
    let profile = body_json(resp).await?;
    let programs = profile["programs"].as_array().unwrap();
    assert_eq!(programs.len(), 1);
    assert_eq!(programs[0]["healthProgram"]["id"], json!(program_id));

    // Search by name fragment
    let req = get(&format!("/v1/clients?search=Amina%20Yusuf%20{}", suffix), &token)?;
    let resp = app.call(req).await?;
    assert_eq!(resp.status(), StatusCode::OK);
    let page = body_json(resp).await?;
    assert_eq!(page["totalResults"], json!(1));
    assert_eq!(page["page"], json!(1));
    assert_eq!(page["hasNextPage"], json!(false));

    // Enrollments for the client
    let req = get(&format!("/v1/enrollments/client/{}", client_id), &token)?;
    let resp = app.call(req).await?;
    assert_eq!(resp.status(), StatusCode::OK);
    let page = body_json(resp).await?;
    assert_eq!(page["results"][0]["client"]["id"], json!(client_id));

    // Statistics respond with the expected shape
    let req = get("/v1/clients/statistics", &token)?;
    let resp = app.call(req).await?;
    assert_eq!(resp.status(), StatusCode::OK);
    let stats = body_json(resp).await?;
    assert!(stats["client"]["total"].as_u64().unwrap() >= 1);
    assert!(stats["enrollments"]["distribution"]["active"].as_u64().unwrap() >= 1);
    assert!(stats["client"]["recent"].is_array());

    Ok(())
}

#[tokio::test]
async fn test_unknown_client_profile_is_404() -> anyhow::Result<()> {
    let Some(app) = build_app().await? else { return Ok(()) };
    let mut app = app;

    let token = register(&mut app).await?;
    let req = get(&format!("/v1/clients/{}", Uuid::new_v4()), &token)?;
    let resp = app.call(req).await?;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn test_bad_sort_field_is_400() -> anyhow::Result<()> {
    let Some(app) = build_app().await? else { return Ok(()) };
    let mut app = app;

    let token = register(&mut app).await?;
    let req = get("/v1/clients?sortBy=password:asc", &token)?;
    let resp = app.call(req).await?;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn test_program_update_and_delete() -> anyhow::Result<()> {
    let Some(app) = build_app().await? else { return Ok(()) };
    let mut app = app;

    let token = register(&mut app).await?;
    let suffix = Uuid::new_v4().simple().to_string();

    let req = post(
        "/v1/programs",
        Some(&token),
        &json!({"name": format!("Malaria Net {}", suffix)}),
    )?;
    let resp = app.call(req).await?;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let program = body_json(resp).await?;
    let program_id = program["id"].as_str().unwrap().to_string();

    let req = Request::builder()
        .method("PATCH")
        .uri(format!("/v1/programs/{}", program_id))
        .header("content-type", "application/json")
        .header("authorization", format!("Bearer {}", token))
        .body(Body::from(serde_json::to_vec(&json!({"description": "net distribution"}))?))?;
    let resp = app.call(req).await?;
    assert_eq!(resp.status(), StatusCode::OK);
    let updated = body_json(resp).await?;
    assert_eq!(updated["description"], json!("net distribution"));

    let req = Request::builder()
        .method("DELETE")
        .uri(format!("/v1/programs/{}", program_id))
        .header("authorization", format!("Bearer {}", token))
        .body(Body::empty())?;
    let resp = app.call(req).await?;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);

    let req = get(&format!("/v1/programs/{}", program_id), &token)?;
    let resp = app.call(req).await?;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    Ok(())
}
