use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use sea_orm::DatabaseConnection;
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use service::animal::repo::seaorm::SeaOrmAnimalRepository;
use service::animal::AnimalService;
use service::auth::domain::RegisterInput;
use service::auth::repo::seaorm::SeaOrmAuthRepository;
use service::auth::AuthService;
use service::media::ImageStore;
use service::notify::Notifier;
use service::session::SessionStore;

use crate::errors::ApiError;

pub const SESSION_COOKIE: &str = "herdbook_session";

#[derive(Clone)]
pub struct ServerState {
    pub db: DatabaseConnection,
    pub sessions: Arc<dyn SessionStore>,
    pub notifier: Arc<dyn Notifier>,
    pub images: Arc<ImageStore>,
}

impl ServerState {
    pub(crate) fn auth_service(&self) -> AuthService<SeaOrmAuthRepository> {
        AuthService::new(
            Arc::new(SeaOrmAuthRepository { db: self.db.clone() }),
            Arc::clone(&self.notifier),
        )
    }

    pub(crate) fn animal_service(&self) -> AnimalService<SeaOrmAnimalRepository> {
        AnimalService::new(
            Arc::new(SeaOrmAnimalRepository { db: self.db.clone() }),
            Arc::clone(&self.images),
        )
    }

    /// Resolve the session cookie to a user id or fail with 401.
    pub(crate) async fn session_user(&self, jar: &CookieJar) -> Result<Uuid, ApiError> {
        let token = jar
            .get(SESSION_COOKIE)
            .ok_or_else(|| ApiError::Auth("not authenticated".into()))?;
        self.sessions
            .resolve(token.value())
            .await
            .ok_or_else(|| ApiError::Auth("not authenticated".into()))
    }
}

fn session_cookie(token: String) -> Cookie<'static> {
    let mut cookie = Cookie::new(SESSION_COOKIE, token);
    cookie.set_path("/");
    cookie.set_http_only(true);
    cookie.set_secure(false);
    cookie.set_same_site(SameSite::Lax);
    cookie
}

#[derive(Deserialize)]
pub struct VerifyRequest {
    pub user_id: Option<String>,
    pub code: Option<String>,
}

#[derive(Deserialize)]
pub struct ResendRequest {
    pub user_id: Option<String>,
}

#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

fn parse_user_id(raw: Option<String>) -> Result<Uuid, ApiError> {
    let raw = raw.ok_or_else(|| ApiError::Validation("missing user_id".into()))?;
    Uuid::parse_str(&raw).map_err(|_| ApiError::Validation("invalid user_id".into()))
}

pub async fn register(
    State(state): State<ServerState>,
    Json(input): Json<RegisterInput>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let registration = state.auth_service().register(input).await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "verification code sent",
            "user_id": registration.user_id,
            "requires_verification": registration.requires_verification,
        })),
    ))
}

pub async fn verify(
    State(state): State<ServerState>,
    jar: CookieJar,
    Json(req): Json<VerifyRequest>,
) -> Result<(CookieJar, Json<Value>), ApiError> {
    let user_id = parse_user_id(req.user_id)?;
    let code = req.code.ok_or_else(|| ApiError::Validation("missing code".into()))?;

    let user = state.auth_service().verify(user_id, &code).await?;

    let token = state.sessions.open(user.id).await;
    let jar = jar.add(session_cookie(token));
    Ok((jar, Json(json!({"message": "verification successful", "user": user}))))
}

pub async fn resend_code(
    State(state): State<ServerState>,
    Json(req): Json<ResendRequest>,
) -> Result<Json<Value>, ApiError> {
    let user_id = parse_user_id(req.user_id)?;
    let message = state.auth_service().resend_code(user_id).await?;
    Ok(Json(json!({"message": message})))
}

pub async fn login(
    State(state): State<ServerState>,
    jar: CookieJar,
    Json(req): Json<LoginRequest>,
) -> Result<(CookieJar, Json<Value>), ApiError> {
    let (email, password) = match (req.email, req.password) {
        (Some(e), Some(p)) if !e.is_empty() && !p.is_empty() => (e, p),
        _ => return Err(ApiError::Validation("missing email or password".into())),
    };

    let user = state.auth_service().login(&email, &password).await?;

    let token = state.sessions.open(user.id).await;
    let jar = jar.add(session_cookie(token));
    Ok((jar, Json(json!({"message": "login successful", "user": user}))))
}

/// Clears the session unconditionally; logging out twice is fine.
pub async fn logout(State(state): State<ServerState>, jar: CookieJar) -> (CookieJar, Json<Value>) {
    if let Some(cookie) = jar.get(SESSION_COOKIE) {
        state.sessions.close(cookie.value()).await;
    }
    let jar = jar.remove(Cookie::from(SESSION_COOKIE));
    (jar, Json(json!({"message": "logout successful"})))
}

pub async fn current_user(
    State(state): State<ServerState>,
    jar: CookieJar,
) -> Result<Json<Value>, ApiError> {
    let user_id = state.session_user(&jar).await?;
    let user = state.auth_service().current_user(user_id).await?;
    Ok(Json(json!({"user": user})))
}
