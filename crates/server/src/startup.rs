use std::{env, net::SocketAddr, sync::Arc};

use axum::Router;
use common::utils::logging::init_logging_default;
use dotenvy::dotenv;
use migration::MigratorTrait;
use tower_http::cors::CorsLayer;
use tracing::info;

use service::media::ImageStore;
use service::notify::LogNotifier;
use service::session::MemorySessionStore;

use crate::auth::ServerState;
use crate::routes;

/// Initialize logging via shared common utils
fn init_logging() {
    init_logging_default();
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

fn load_uploads() -> configs::UploadsConfig {
    let mut uploads = match configs::load_default() {
        Ok(cfg) => cfg.uploads,
        Err(_) => configs::UploadsConfig::default(),
    };
    if let Ok(dir) = env::var("UPLOAD_DIR") {
        uploads.dir = dir;
    }
    uploads
}

/// Public entry: build the app and run the HTTP server
pub async fn run() -> anyhow::Result<()> {
    dotenv().ok();
    init_logging();

    let uploads = load_uploads();
    common::env::ensure_env(&uploads.dir).await?;

    // DB connection + schema
    let db = models::db::connect().await?;
    migration::Migrator::up(&db, None).await?;

    let state = ServerState {
        db,
        sessions: Arc::new(MemorySessionStore::default()),
        notifier: Arc::new(LogNotifier),
        images: Arc::new(ImageStore::with_limits(uploads.dir.as_str(), uploads.max_width, uploads.jpeg_quality)),
    };

    // Build router
    let app: Router = routes::build_router(state, build_cors(), &uploads.dir);

    // Bind and serve
    let addr = load_bind_addr()?;
    info!(%addr, "starting herdbook server");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
