use axum::extract::DefaultBodyLimit;
use axum::{
    routing::{get, post, put},
    Json, Router,
};
use tower_http::{
    cors::CorsLayer,
    services::ServeDir,
    trace::{DefaultMakeSpan, DefaultOnFailure, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use common::types::Health;

use crate::animals;
use crate::auth::{self, ServerState};

/// Embedded photo payloads arrive base64-encoded in the JSON body.
const MAX_BODY_BYTES: usize = 16 * 1024 * 1024;

pub async fn health() -> Json<Health> {
    Json(Health { status: "ok" })
}

async fn index() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "message": "Herdbook Farm Animal Tracker API",
        "status": "running",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// Build the full application router: public banner/health/uploads plus the
/// account and animal endpoints
pub fn build_router(state: ServerState, cors: CorsLayer, upload_dir: &str) -> Router {
    // Public routes (banner, health, stored photos)
    let public = Router::new()
        .route("/", get(index))
        .route("/health", get(health))
        .nest_service("/uploads", ServeDir::new(upload_dir));

    // Account + animal API; session checks happen inside the handlers
    let api = Router::new()
        .route("/register", post(auth::register))
        .route("/verify", post(auth::verify))
        .route("/resend-code", post(auth::resend_code))
        .route("/login", post(auth::login))
        .route("/logout", post(auth::logout))
        .route("/current-user", get(auth::current_user))
        .route("/animals", get(animals::list_animals).post(animals::create_animal))
        .route("/animals/:id", put(animals::update_animal).delete(animals::delete_animal));

    // Compose
    public
        .merge(api)
        .with_state(state)
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(cors)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(
                    DefaultMakeSpan::new()
                        .level(Level::INFO)
                        .include_headers(false),
                )
                .on_request(
                    DefaultOnRequest::new()
                        .level(Level::INFO),
                )
                .on_response(
                    DefaultOnResponse::new()
                        .level(Level::INFO)
                        .include_headers(false),
                )
                .on_failure(
                    DefaultOnFailure::new()
                        .level(Level::ERROR),
                ),
        )
}
