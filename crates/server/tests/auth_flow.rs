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
    let db_path = std::env::temp_dir().join(format!("herdbook_auth_{tag}.sqlite"));
    let uploads = std::env::temp_dir().join(format!("herdbook_auth_uploads_{tag}"));
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
async fn test_register_verify_login_flow() -> anyhow::Result<()> {
    if std::env::var("SKIP_DB_TESTS").is_ok() { return Ok(()); }
    let t = build_app().await?;

    let email = format!("user_{}@example.com", Uuid::new_v4().simple());

    // Register
    let (status, body, _) = send(
        &t.app,
        "POST",
        "/register",
        Some(json!({"email": email, "password": "pw123456", "name": "Alice"})),
        None,
    )
    .await?;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["requires_verification"], json!(true));
    let user_id = body["user_id"].as_str().unwrap().to_string();

    // Verify with the code the notifier captured
    let code = t.notifier.last_code().expect("code delivered");
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
    assert!(cookie.is_some(), "verify must establish a session");

    // The code is single-use
    let (status, _, _) = send(
        &t.app,
        "POST",
        "/verify",
        Some(json!({"user_id": user_id, "code": code})),
        None,
    )
    .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // Login
    let (status, body, cookie) = send(
        &t.app,
        "POST",
        "/login",
        Some(json!({"email": email, "password": "pw123456"})),
        None,
    )
    .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["email"], json!(email));
    let cookie = cookie.expect("login must set a session cookie");

    // Session resolves
    let (status, body, _) = send(&t.app, "GET", "/current-user", None, Some(&cookie)).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["name"], json!("Alice"));

    // Logout is idempotent and kills the session
    let (status, _, _) = send(&t.app, "POST", "/logout", None, Some(&cookie)).await?;
    assert_eq!(status, StatusCode::OK);
    let (status, _, _) = send(&t.app, "GET", "/current-user", None, Some(&cookie)).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    let (status, _, _) = send(&t.app, "POST", "/logout", None, Some(&cookie)).await?;
    assert_eq!(status, StatusCode::OK);

    Ok(())
}

#[tokio::test]
async fn test_register_validation() -> anyhow::Result<()> {
    if std::env::var("SKIP_DB_TESTS").is_ok() { return Ok(()); }
    let t = build_app().await?;

    // Missing fields
    let (status, body, _) = send(&t.app, "POST", "/register", Some(json!({"email": "a@x.com"})), None).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], json!("validation_error"));

    // Malformed email
    let (status, _, _) = send(
        &t.app,
        "POST",
        "/register",
        Some(json!({"email": "nope", "password": "pw123456", "name": "A"})),
        None,
    )
    .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // Duplicate email
    let email = format!("dup_{}@example.com", Uuid::new_v4().simple());
    let payload = json!({"email": email, "password": "pw123456", "name": "A"});
    let (status, _, _) = send(&t.app, "POST", "/register", Some(payload.clone()), None).await?;
    assert_eq!(status, StatusCode::CREATED);
    let (status, body, _) = send(&t.app, "POST", "/register", Some(payload), None).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], json!("email already registered"));

    Ok(())
}

#[tokio::test]
async fn test_login_before_verification_is_403() -> anyhow::Result<()> {
    if std::env::var("SKIP_DB_TESTS").is_ok() { return Ok(()); }
    let t = build_app().await?;

    let email = format!("unv_{}@example.com", Uuid::new_v4().simple());
    let (status, body, _) = send(
        &t.app,
        "POST",
        "/register",
        Some(json!({"email": email, "password": "pw123456", "name": "A"})),
        None,
    )
    .await?;
    assert_eq!(status, StatusCode::CREATED);
    let user_id = body["user_id"].as_str().unwrap().to_string();

    let (status, body, cookie) = send(
        &t.app,
        "POST",
        "/login",
        Some(json!({"email": email, "password": "pw123456"})),
        None,
    )
    .await?;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["requires_verification"], json!(true));
    assert_eq!(body["user_id"], json!(user_id));
    assert!(cookie.is_none());

    Ok(())
}

#[tokio::test]
async fn test_login_errors_are_uniform() -> anyhow::Result<()> {
    if std::env::var("SKIP_DB_TESTS").is_ok() { return Ok(()); }
    let t = build_app().await?;

    let email = format!("uni_{}@example.com", Uuid::new_v4().simple());
    let (_, body, _) = send(
        &t.app,
        "POST",
        "/register",
        Some(json!({"email": email, "password": "pw123456", "name": "A"})),
        None,
    )
    .await?;
    let user_id = body["user_id"].as_str().unwrap().to_string();
    let code = t.notifier.last_code().unwrap();
    send(&t.app, "POST", "/verify", Some(json!({"user_id": user_id, "code": code})), None).await?;

    let (unknown_status, unknown_body, _) = send(
        &t.app,
        "POST",
        "/login",
        Some(json!({"email": "ghost@example.com", "password": "pw123456"})),
        None,
    )
    .await?;
    let (wrong_status, wrong_body, _) = send(
        &t.app,
        "POST",
        "/login",
        Some(json!({"email": email, "password": "wrong-password"})),
        None,
    )
    .await?;

    assert_eq!(unknown_status, StatusCode::UNAUTHORIZED);
    assert_eq!(wrong_status, StatusCode::UNAUTHORIZED);
    // identical bodies, no account probing
    assert_eq!(unknown_body, wrong_body);

    Ok(())
}

#[tokio::test]
async fn test_resend_code_rotates() -> anyhow::Result<()> {
    if std::env::var("SKIP_DB_TESTS").is_ok() { return Ok(()); }
    let t = build_app().await?;

    let email = format!("rot_{}@example.com", Uuid::new_v4().simple());
    let (_, body, _) = send(
        &t.app,
        "POST",
        "/register",
        Some(json!({"email": email, "password": "pw123456", "name": "A"})),
        None,
    )
    .await?;
    let user_id = body["user_id"].as_str().unwrap().to_string();
    let first = t.notifier.last_code().unwrap();

    let (status, _, _) = send(&t.app, "POST", "/resend-code", Some(json!({"user_id": user_id})), None).await?;
    assert_eq!(status, StatusCode::OK);
    let second = t.notifier.last_code().unwrap();

    if first != second {
        let (status, _, _) = send(
            &t.app,
            "POST",
            "/verify",
            Some(json!({"user_id": user_id, "code": first})),
            None,
        )
        .await?;
        assert_eq!(status, StatusCode::BAD_REQUEST, "stale code must be rejected");
    }
    let (status, _, _) = send(
        &t.app,
        "POST",
        "/verify",
        Some(json!({"user_id": user_id, "code": second})),
        None,
    )
    .await?;
    assert_eq!(status, StatusCode::OK);

    // Unknown user -> 404
    let (status, _, _) = send(
        &t.app,
        "POST",
        "/resend-code",
        Some(json!({"user_id": Uuid::new_v4()})),
        None,
    )
    .await?;
    assert_eq!(status, StatusCode::NOT_FOUND);

    Ok(())
}

#[tokio::test]
async fn test_session_required_endpoints() -> anyhow::Result<()> {
    if std::env::var("SKIP_DB_TESTS").is_ok() { return Ok(()); }
    let t = build_app().await?;

    let (status, body, _) = send(&t.app, "GET", "/current-user", None, None).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], json!("auth_error"));

    let (status, _, _) = send(&t.app, "GET", "/animals", None, None).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // A made-up cookie is as good as none
    let (status, _, _) = send(&t.app, "GET", "/animals", None, Some("herdbook_session=forged")).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    Ok(())
}

#[tokio::test]
async fn test_health_and_banner() -> anyhow::Result<()> {
    if std::env::var("SKIP_DB_TESTS").is_ok() { return Ok(()); }
    let t = build_app().await?;

    let (status, body, _) = send(&t.app, "GET", "/health", None, None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], json!("ok"));

    let (status, body, _) = send(&t.app, "GET", "/", None, None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], json!("running"));

    Ok(())
}
