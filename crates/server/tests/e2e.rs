//! Full journey through the API: register, verify, manage a herd, clean up.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use migration::MigratorTrait;
use serde_json::{json, Value};
use tower::Service;
use uuid::Uuid;

use server::auth::ServerState;
use server::routes;
use service::media::ImageStore;
use service::notify::recording::RecordingNotifier;
use service::session::MemorySessionStore;

struct TestApp {
    app: Router,
    notifier: Arc<RecordingNotifier>,
}

async fn build_app() -> anyhow::Result<TestApp> {
    let tag = Uuid::new_v4().simple().to_string();
    let db_path = std::env::temp_dir().join(format!("herdbook_e2e_{tag}.sqlite"));
    let uploads = std::env::temp_dir().join(format!("herdbook_e2e_uploads_{tag}"));
    std::fs::create_dir_all(&uploads)?;

    let db = models::db::connect_to(&format!("sqlite://{}?mode=rwc", db_path.display())).await?;
    migration::Migrator::up(&db, None).await?;

    let notifier = Arc::new(RecordingNotifier::default());
    let state = ServerState {
        db,
        sessions: Arc::new(MemorySessionStore::default()),
        notifier: notifier.clone(),
        images: Arc::new(ImageStore::new(uploads.as_path())),
    };
    let app = routes::build_router(state, tower_http::cors::CorsLayer::very_permissive(), uploads.to_str().unwrap());
    Ok(TestApp { app, notifier })
}

async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    body: Option<Value>,
    cookie: Option<&str>,
) -> anyhow::Result<(StatusCode, Value, Option<String>)> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(c) = cookie {
        builder = builder.header("cookie", c);
    }
    let req = match body {
        Some(b) => builder
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_vec(&b)?))?,
        None => builder.body(Body::empty())?,
    };
    let resp = app.clone().call(req).await?;
    let status = resp.status();
    let session = resp
        .headers()
        .get("set-cookie")
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.split(';').next())
        .map(|s| s.to_string());
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await?;
    let value = if bytes.is_empty() { Value::Null } else { serde_json::from_slice(&bytes)? };
    Ok((status, value, session))
}

#[tokio::test]
async fn test_full_journey() -> anyhow::Result<()> {
    if std::env::var("SKIP_DB_TESTS").is_ok() { return Ok(()); }
    let t = build_app().await?;

    // register("a@x.com", "pw123456", "Alice")
    let (status, body, _) = send(
        &t.app,
        "POST",
        "/register",
        Some(json!({"email": "a@x.com", "password": "pw123456", "name": "Alice"})),
        None,
    )
    .await?;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["requires_verification"], json!(true));
    let user_id = body["user_id"].as_str().unwrap().to_string();

    // verify with the issued code
    let code = t.notifier.last_code().unwrap();
    let (status, body, cookie) = send(
        &t.app,
        "POST",
        "/verify",
        Some(json!({"user_id": user_id, "code": code})),
        None,
    )
    .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["is_verified"], json!(true));
    let cookie = cookie.unwrap();

    // createAnimal
    let (status, body, _) = send(
        &t.app,
        "POST",
        "/animals",
        Some(json!({"name": "Bessie", "type": "cow", "inseminatedDate": "2024-01-10"})),
        Some(&cookie),
    )
    .await?;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["animal"]["inseminated_date"], json!("2024-01-10"));
    let animal_id = body["animal"]["id"].as_str().unwrap().to_string();

    // updateAnimal with an injection list
    let (status, body, _) = send(
        &t.app,
        "PUT",
        &format!("/animals/{animal_id}"),
        Some(json!({"injections": [{"date": "2024-02-01", "details": "dose A"}]})),
        Some(&cookie),
    )
    .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["animal"]["injections"].as_array().unwrap().len(), 1);

    // deleteAnimal, then the list no longer contains it
    let (status, _, _) = send(&t.app, "DELETE", &format!("/animals/{animal_id}"), None, Some(&cookie)).await?;
    assert_eq!(status, StatusCode::OK);
    let (status, body, _) = send(&t.app, "GET", "/animals", None, Some(&cookie)).await?;
    assert_eq!(status, StatusCode::OK);
    assert!(body["animals"].as_array().unwrap().is_empty());

    Ok(())
}
