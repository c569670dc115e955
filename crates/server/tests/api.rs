use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Method, Request, StatusCode, header},
};
use database::{cache::Cache, services::seed::SeedService};
use migration::{Migrator, MigratorTrait};
use models::user_type::UserType;
use sea_orm::{ConnectOptions, Database};
use serde_json::{Value, json};
use server::{app, auth::JwtKeys, state::AppState};
use tower::ServiceExt; // for `oneshot`

const SECRET: &str = "test-secret";

async fn test_app() -> Router {
    let mut options = ConnectOptions::new("sqlite::memory:");
    options.max_connections(1).min_connections(1);
    let db = Database::connect(options).await.unwrap();
    Migrator::up(&db, None).await.unwrap();
    SeedService::init_users(&db).await.unwrap();

    app(AppState::new(db, Cache::local(), JwtKeys::new(SECRET)))
}

fn token(user_id: &str, user_type: UserType) -> String {
    JwtKeys::new(SECRET)
        .generate_token(user_id, user_type, Some(1))
        .unwrap()
}

async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut request = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        request = request.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let request = match body {
        Some(body) => request
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string())),
        None => request.body(Body::empty()),
    }
    .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);

    (status, value)
}

#[tokio::test]
async fn test_health_reports_cache_mode() {
    let app = test_app().await;
    let (status, body) = send(&app, Method::GET, "/api/v1/health", None, None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["cache"], "local");
    assert_eq!(body["database"], true);
}

#[tokio::test]
async fn test_missing_or_bad_token_is_unauthorized() {
    let app = test_app().await;

    let (status, body) = send(&app, Method::GET, "/api/v1/users/me", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], 401);

    let (status, _) = send(&app, Method::GET, "/api/v1/users/me", Some("garbage"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_me_returns_seeded_student() {
    let app = test_app().await;
    let student = token("2023001", UserType::Student);

    let (status, body) = send(&app, Method::GET, "/api/v1/users/me", Some(student.as_str()), None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["id"], "2023001");
    assert_eq!(body["data"]["user_type"], "student");
    assert_eq!(body["data"]["lab_name"], "L1");
}

#[tokio::test]
async fn test_laboratory_writes_require_admin() {
    let app = test_app().await;
    let student = token("2023001", UserType::Student);
    let admin = token("admin", UserType::Admin);
    let lab = json!({"name": "Optics", "location": "Building C"});

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/v1/laboratories",
        Some(student.as_str()),
        Some(lab.clone()),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], 403);

    let (status, body) =
        send(&app, Method::POST, "/api/v1/laboratories", Some(admin.as_str()), Some(lab)).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["name"], "Optics");
}

#[tokio::test]
async fn test_rename_then_delete_guard() {
    let app = test_app().await;
    let admin = token("admin", UserType::Admin);
    let student = token("2023001", UserType::Student);

    let (status, _) = send(
        &app,
        Method::PUT,
        "/api/v1/laboratories/1",
        Some(admin.as_str()),
        Some(json!({"name": "L1-renamed"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, me) = send(&app, Method::GET, "/api/v1/users/me", Some(student.as_str()), None).await;
    assert_eq!(me["data"]["lab_name"], "L1-renamed");

    let (status, body) =
        send(&app, Method::DELETE, "/api/v1/laboratories/1", Some(admin.as_str()), None).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["data"], json!({"students": 1}));
}

#[tokio::test]
async fn test_reservation_flow() {
    let app = test_app().await;
    let admin = token("admin", UserType::Admin);
    let student = token("2023001", UserType::Student);
    let teacher = token("T001", UserType::Teacher);

    let (status, equipment) = send(
        &app,
        Method::POST,
        "/api/v1/admin/equipments",
        Some(admin.as_str()),
        Some(json!({"name": "Spectrometer", "lab_id": 1, "category": 2})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let equip_id = equipment["data"]["id"].as_i64().unwrap();

    let (status, slot) = send(
        &app,
        Method::POST,
        &format!("/api/v1/admin/equipments/{equip_id}/time-slots"),
        Some(admin.as_str()),
        Some(json!({"start_time": "2099-01-01T09:00:00", "end_time": "2099-01-01T11:00:00"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let slot_id = slot["data"]["id"].as_i64().unwrap();

    let request = json!({"equip_id": equip_id, "slot_id": slot_id});
    let (status, reservation) = send(
        &app,
        Method::POST,
        "/api/v1/reservations",
        Some(student.as_str()),
        Some(request.clone()),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(reservation["data"]["teacher_id"], "T001");
    let reservation_id = reservation["data"]["id"].as_i64().unwrap();

    let (status, body) =
        send(&app, Method::POST, "/api/v1/reservations", Some(student.as_str()), Some(request)).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["data"], json!({"field": "slot_id"}));

    let (status, reviewed) = send(
        &app,
        Method::PUT,
        &format!("/api/v1/reservations/{reservation_id}/review"),
        Some(teacher.as_str()),
        Some(json!({"decision": "approve"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(reviewed["data"]["status"], "approved");

    let (status, listed) =
        send(&app, Method::GET, "/api/v1/reservations", Some(teacher.as_str()), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listed["data"].as_array().map(Vec::len), Some(1));
}
